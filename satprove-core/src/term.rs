/*!

Terms (4.C): hash-consed first-order (and, in shape only, higher-order) terms.

A term is one of:

  - `FreeVar(id)`    -- a first-order variable, meaningful only paired with a [`crate::subst::Scope`].
  - `Const(symbol)`  -- a 0-ary function symbol applied to nothing.
  - `App(head, args)` -- `head` applied to one or more arguments. `head` is almost always a
    `Const`/`FreeVar` id in first-order terms; it may be an arbitrary term once higher-order
    application is supported.
  - `BoundVar(index)` -- a de Bruijn-indexed variable bound by an enclosing `Lambda`.
  - `Lambda(param_sort, body)` -- a binder. No inference rule in this crate produces or consumes
    `Lambda` nodes yet (Open Question 1: the data shape exists so a higher-order extension is a
    matter of adding rules, not redesigning the term representation; see `SPEC_FULL.md` 4.C).

Terms are immutable once interned: `Context::intern_term` is the only way to obtain a `TermId`, and
structurally equal terms always intern to the same id, so `==` on `TermId` is a sound structural
equality check without walking the tree.

*/

use smallvec::SmallVec;

use crate::ids::{SymbolId, TermId};

pub type Args = SmallVec<[TermId; 4]>;

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum TermData {
  FreeVar(u32),
  BoundVar(u32),
  Const(SymbolId),
  App { head: TermId, args: Args },
  Lambda { param_sort: crate::ids::TypeId, body: TermId },
}

impl TermData {
  pub fn is_variable(&self) -> bool {
    matches!(self, TermData::FreeVar(_))
  }

  pub fn is_const(&self) -> bool {
    matches!(self, TermData::Const(_))
  }

  pub fn is_application(&self) -> bool {
    matches!(self, TermData::App { .. })
  }

  /// The head symbol, if this term is a `Const` or an `App` whose head resolves (transitively, in
  /// the caller's term table) to a `Const`. Returns `None` for variables, bound variables, and
  /// lambdas -- there is no single symbol identifying them.
  pub fn root_symbol<'a>(&'a self, table: &'a dyn Fn(TermId) -> &'a TermData) -> Option<SymbolId> {
    match self {
      TermData::Const(symbol) => Some(*symbol),
      TermData::App { head, .. } => table(*head).root_symbol(table),
      _ => None,
    }
  }
}

/// One step of a term address: which argument of an `App` node to descend into. Lambda bodies are
/// addressed with a dedicated `Body` step since they are not an indexed argument list.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum PositionStep {
  Arg(u32),
  Body,
}

/// A root-to-node address into a term, used by superposition (4.K) to name the rewritten
/// subterm and by the index (4.J) to record where a matched subterm lives.
pub type Position = SmallVec<[PositionStep; 4]>;

/// Returns the subterm of `root` at `position`, or `None` if the position runs off the term (an
/// argument index or `Body` step that doesn't exist at some node along the path).
pub fn subterm_at<'a>(
  root: TermId,
  position: &[PositionStep],
  table: &'a dyn Fn(TermId) -> &'a TermData,
) -> Option<TermId> {
  let mut current = root;
  for step in position {
    current = match (step, table(current)) {
      (PositionStep::Arg(i), TermData::App { args, .. }) => *args.get(*i as usize)?,
      (PositionStep::Body, TermData::Lambda { body, .. }) => *body,
      _ => return None,
    };
  }
  Some(current)
}

/// Enumerates every position in `root`, including the root position (the empty path) itself, in
/// prefix order. Used by demodulation (4.L) and superposition (4.K) to find rewrite/overlap sites.
pub fn all_positions<'a>(root: TermId, table: &'a dyn Fn(TermId) -> &'a TermData) -> Vec<Position> {
  let mut positions = Vec::new();
  collect_positions(root, Position::new(), table, &mut positions);
  positions
}

fn collect_positions<'a>(
  current: TermId,
  prefix: Position,
  table: &'a dyn Fn(TermId) -> &'a TermData,
  out: &mut Vec<Position>,
) {
  out.push(prefix.clone());
  match table(current) {
    TermData::App { args, .. } => {
      for (i, _) in args.iter().enumerate() {
        let mut next = prefix.clone();
        next.push(PositionStep::Arg(i as u32));
        collect_positions(args[i], next, table, out);
      }
    }
    TermData::Lambda { body, .. } => {
      let mut next = prefix.clone();
      next.push(PositionStep::Body);
      collect_positions(*body, next, table, out);
    }
    _ => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn table(store: &[TermData]) -> impl Fn(TermId) -> &TermData + '_ {
    move |id: TermId| &store[id.index()]
  }

  #[test]
  fn subterm_at_empty_position_is_root() {
    let store = vec![TermData::Const(SymbolId::from_usize(0))];
    let lookup = table(&store);
    let root = TermId::from_usize(0);
    assert_eq!(subterm_at(root, &[], &lookup), Some(root));
  }

  #[test]
  fn subterm_at_descends_into_args() {
    // f(a, b): store[0] = a, store[1] = b, store[2] = App(f, [a, b])
    let store = vec![
      TermData::Const(SymbolId::from_usize(10)),
      TermData::Const(SymbolId::from_usize(11)),
      TermData::App { head: TermId::from_usize(12), args: Args::from_slice(&[TermId::from_usize(0), TermId::from_usize(1)]) },
    ];
    let lookup = table(&store);
    let root = TermId::from_usize(2);
    assert_eq!(subterm_at(root, &[PositionStep::Arg(0)], &lookup), Some(TermId::from_usize(0)));
    assert_eq!(subterm_at(root, &[PositionStep::Arg(1)], &lookup), Some(TermId::from_usize(1)));
    assert_eq!(subterm_at(root, &[PositionStep::Arg(2)], &lookup), None);
  }

  #[test]
  fn all_positions_enumerates_root_and_args() {
    let store = vec![
      TermData::Const(SymbolId::from_usize(10)),
      TermData::App { head: TermId::from_usize(12), args: Args::from_slice(&[TermId::from_usize(0)]) },
    ];
    let lookup = table(&store);
    let root = TermId::from_usize(1);
    let positions = all_positions(root, &lookup);
    assert_eq!(positions.len(), 2);
    assert!(positions.contains(&Position::new()));
    assert!(positions.contains(&Position::from_slice(&[PositionStep::Arg(0)])));
  }
}
