/*!

Term orderings (4.F): a reduction ordering, total on ground terms and well-founded, used to orient
equations and to restrict superposition to the maximal side of a literal. Two orderings are
provided, both parameterized by a [`Precedence`] over symbols:

  - [`kbo`]: Knuth-Bendix ordering, via symbol weights plus a precedence tie-break.
  - [`rpo`]: Recursive path ordering, via precedence plus per-symbol argument status
    (lexicographic or multiset).

Both return `Option<std::cmp::Ordering>` (`None` means incomparable) rather than a three-valued
custom enum, since `satprove-abs::PartialOrdering` is exactly `Option<Ordering>` under the hood and
callers already work with `Option<Ordering>` elsewhere (e.g. `Subst`/unification results).

*/

use std::cmp::Ordering;
use satprove_abs::{reverse, FxHashMap};

use crate::context::Context;
use crate::ids::SymbolId;
use crate::term::TermData;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Status {
  Lexicographic,
  Multiset,
}

/// Which of the two orderings this module provides a `Prover` is configured to use. Threaded
/// explicitly (rather than a free-standing `bool`) so call sites read as "compare under the
/// chosen ordering" instead of a bare `true`/`false` whose meaning isn't visible at the call site.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum OrderingKind {
  Kbo,
  Rpo,
}

impl OrderingKind {
  #[inline]
  pub fn is_kbo(&self) -> bool {
    matches!(self, OrderingKind::Kbo)
  }

  pub fn compare(&self, ctx: &Context, precedence: &Precedence, left: crate::ids::TermId, right: crate::ids::TermId) -> Option<Ordering> {
    match self {
      OrderingKind::Kbo => kbo(ctx, precedence, left, right),
      OrderingKind::Rpo => rpo(ctx, precedence, left, right),
    }
  }
}

impl Default for OrderingKind {
  fn default() -> Self {
    OrderingKind::Kbo
  }
}

/// A total order on symbols (used by both KBO and RPO as the tie-breaker / base comparison) plus,
/// for KBO, a per-symbol weight, and for RPO, a per-symbol argument [`Status`].
pub struct Precedence {
  rank    : FxHashMap<SymbolId, u32>,
  weight  : FxHashMap<SymbolId, u32>,
  status  : FxHashMap<SymbolId, Status>,
  /// The weight assigned to every variable; KBO requires this to be a fixed positive constant no
  /// greater than any symbol's weight for the ordering to stay well-founded.
  variable_weight: u32,
}

impl Default for Precedence {
  fn default() -> Self {
    Precedence { rank: FxHashMap::default(), weight: FxHashMap::default(), status: FxHashMap::default(), variable_weight: 1 }
  }
}

impl Precedence {
  pub fn new() -> Self {
    Self::default()
  }

  /// Symbols not explicitly ranked compare below every ranked symbol, in the order they were first
  /// seen by `rank_after`, via a rank assigned lazily here.
  pub fn set_rank(&mut self, symbol: SymbolId, rank: u32) {
    self.rank.insert(symbol, rank);
  }

  pub fn rank(&self, symbol: SymbolId) -> u32 {
    *self.rank.get(&symbol).unwrap_or(&0)
  }

  pub fn set_weight(&mut self, symbol: SymbolId, weight: u32) {
    self.weight.insert(symbol, weight);
  }

  pub fn weight(&self, symbol: SymbolId) -> u32 {
    *self.weight.get(&symbol).unwrap_or(&1)
  }

  pub fn set_status(&mut self, symbol: SymbolId, status: Status) {
    self.status.insert(symbol, status);
  }

  pub fn status(&self, symbol: SymbolId) -> Status {
    *self.status.get(&symbol).unwrap_or(&Status::Lexicographic)
  }
}

/// Counts how many times each free variable occurs in `term`, for the KBO variable-dominance test.
fn variable_counts(ctx: &Context, term: crate::ids::TermId, counts: &mut FxHashMap<u32, u32>) {
  match ctx.term(term) {
    TermData::FreeVar(id) => {
      *counts.entry(*id).or_insert(0) += 1;
    }
    TermData::App { head, args } => {
      variable_counts(ctx, *head, counts);
      for arg in args {
        variable_counts(ctx, *arg, counts);
      }
    }
    TermData::Lambda { body, .. } => variable_counts(ctx, *body, counts),
    TermData::BoundVar(_) | TermData::Const(_) => {}
  }
}

fn weight(ctx: &Context, precedence: &Precedence, term: crate::ids::TermId) -> u32 {
  match ctx.term(term) {
    TermData::FreeVar(_) | TermData::BoundVar(_) => precedence.variable_weight,
    TermData::Const(symbol) => precedence.weight(*symbol),
    TermData::App { head, args } => {
      let head_weight = match ctx.term(*head) {
        TermData::Const(symbol) => precedence.weight(*symbol),
        _ => weight(ctx, precedence, *head),
      };
      head_weight + args.iter().map(|a| weight(ctx, precedence, *a)).sum::<u32>()
    }
    TermData::Lambda { body, .. } => weight(ctx, precedence, *body),
  }
}

/// `true` if every variable's count in `dominant` is `>=` its count in `other` (the variable
/// condition KBO requires before a weight/precedence comparison can decide `dominant > other`).
fn dominates_variables(dominant: &FxHashMap<u32, u32>, other: &FxHashMap<u32, u32>) -> bool {
  other.iter().all(|(v, count)| dominant.get(v).copied().unwrap_or(0) >= *count)
}

/// Knuth-Bendix ordering comparison of `left` and `right`.
pub fn kbo(ctx: &Context, precedence: &Precedence, left: crate::ids::TermId, right: crate::ids::TermId) -> Option<Ordering> {
  if left == right {
    return Some(Ordering::Equal);
  }

  let mut left_vars = FxHashMap::default();
  let mut right_vars = FxHashMap::default();
  variable_counts(ctx, left, &mut left_vars);
  variable_counts(ctx, right, &mut right_vars);

  let left_dominates = dominates_variables(&left_vars, &right_vars);
  let right_dominates = dominates_variables(&right_vars, &left_vars);

  if let TermData::FreeVar(_) = ctx.term(left) {
    return if right_dominates && contains_variable(ctx, right, left) { Some(Ordering::Less) } else { None };
  }
  if let TermData::FreeVar(_) = ctx.term(right) {
    return if left_dominates && contains_variable(ctx, left, right) { Some(Ordering::Greater) } else { None };
  }

  if !left_dominates && !right_dominates {
    return None;
  }

  let wl = weight(ctx, precedence, left);
  let wr = weight(ctx, precedence, right);

  match wl.cmp(&wr) {
    Ordering::Greater if left_dominates => Some(Ordering::Greater),
    Ordering::Less if right_dominates => Some(Ordering::Less),
    Ordering::Equal => kbo_tiebreak(ctx, precedence, left, right, left_dominates, right_dominates),
    _ => None,
  }
}

fn contains_variable(ctx: &Context, term: crate::ids::TermId, var_term: crate::ids::TermId) -> bool {
  if term == var_term {
    return true;
  }
  match ctx.term(term) {
    TermData::App { head, args } => contains_variable(ctx, *head, var_term) || args.iter().any(|a| contains_variable(ctx, *a, var_term)),
    TermData::Lambda { body, .. } => contains_variable(ctx, *body, var_term),
    _ => false,
  }
}

fn kbo_tiebreak(
  ctx: &Context,
  precedence: &Precedence,
  left: crate::ids::TermId,
  right: crate::ids::TermId,
  left_dominates: bool,
  right_dominates: bool,
) -> Option<Ordering> {
  let (left_head, left_args) = head_and_args(ctx, left)?;
  let (right_head, right_args) = head_and_args(ctx, right)?;

  if left_head == right_head {
    return lexicographic_args(ctx, precedence, left_args, right_args);
  }

  match precedence.rank(left_head).cmp(&precedence.rank(right_head)) {
    Ordering::Greater if left_dominates => Some(Ordering::Greater),
    Ordering::Less if right_dominates => Some(Ordering::Less),
    _ => None,
  }
}

fn head_and_args(ctx: &Context, term: crate::ids::TermId) -> Option<(SymbolId, &[crate::ids::TermId])> {
  match ctx.term(term) {
    TermData::Const(symbol) => Some((*symbol, &[])),
    TermData::App { head, args } => match ctx.term(*head) {
      TermData::Const(symbol) => Some((*symbol, args.as_slice())),
      _ => None,
    },
    _ => None,
  }
}

fn lexicographic_args(ctx: &Context, precedence: &Precedence, left: &[crate::ids::TermId], right: &[crate::ids::TermId]) -> Option<Ordering> {
  for (l, r) in left.iter().zip(right.iter()) {
    match kbo(ctx, precedence, *l, *r) {
      Some(Ordering::Equal) => continue,
      other => return other,
    }
  }
  Some(left.len().cmp(&right.len()))
}

/// Recursive path ordering comparison of `left` and `right`.
pub fn rpo(ctx: &Context, precedence: &Precedence, left: crate::ids::TermId, right: crate::ids::TermId) -> Option<Ordering> {
  if left == right {
    return Some(Ordering::Equal);
  }
  match (ctx.term(left), ctx.term(right)) {
    (TermData::FreeVar(_), _) => {
      if contains_variable(ctx, right, left) { Some(Ordering::Less) } else { None }
    }
    (_, TermData::FreeVar(_)) => {
      if contains_variable(ctx, left, right) { Some(Ordering::Greater) } else { None }
    }
    _ => {
      let (lh, largs) = head_and_args(ctx, left)?;
      let (rh, rargs) = head_and_args(ctx, right)?;

      // (RPO-1/2): left >= some argument of right, or vice versa.
      if largs.iter().any(|a| *a == right || rpo(ctx, precedence, *a, right) == Some(Ordering::Greater)) {
        return Some(Ordering::Greater);
      }
      if rargs.iter().any(|a| *a == left || rpo(ctx, precedence, *a, left) == Some(Ordering::Greater)) {
        return Some(Ordering::Less);
      }

      match precedence.rank(lh).cmp(&precedence.rank(rh)) {
        Ordering::Greater => {
          if rargs.iter().all(|a| rpo(ctx, precedence, left, *a) == Some(Ordering::Greater)) {
            Some(Ordering::Greater)
          } else {
            None
          }
        }
        Ordering::Less => {
          if largs.iter().all(|a| rpo(ctx, precedence, right, *a) == Some(Ordering::Greater)) {
            Some(Ordering::Less)
          } else {
            None
          }
        }
        Ordering::Equal => match precedence.status(lh) {
          Status::Lexicographic => lexicographic_rpo(ctx, precedence, lh, largs, rargs),
          Status::Multiset => multiset_rpo(ctx, precedence, largs, rargs),
        },
      }
    }
  }
}

fn lexicographic_rpo(ctx: &Context, precedence: &Precedence, _head: SymbolId, left: &[crate::ids::TermId], right: &[crate::ids::TermId]) -> Option<Ordering> {
  for (l, r) in left.iter().zip(right.iter()) {
    match rpo(ctx, precedence, *l, *r) {
      Some(Ordering::Equal) => continue,
      Some(Ordering::Greater) => {
        return if right.iter().all(|a| rpo(ctx, precedence, *l, *a) == Some(Ordering::Greater)) { Some(Ordering::Greater) } else { None };
      }
      Some(Ordering::Less) => {
        return if left.iter().all(|a| rpo(ctx, precedence, *r, *a) == Some(Ordering::Greater)) { Some(Ordering::Less) } else { None };
      }
      None => return None,
    }
  }
  Some(left.len().cmp(&right.len()))
}

/// Multiset extension of RPO: `left` beats `right` iff every element of `right` is dominated by
/// some not-yet-matched element of `left`. Implemented by greedy removal rather than a full
/// bipartite matching, which is sufficient because `rpo` on the underlying elements is a strict
/// partial order (no ties to arbitrate between equally-good matches).
fn multiset_rpo(ctx: &Context, precedence: &Precedence, left: &[crate::ids::TermId], right: &[crate::ids::TermId]) -> Option<Ordering> {
  let mut remaining_left: Vec<bool> = vec![true; left.len()];
  for r in right {
    let mut dominated = false;
    for (i, l) in left.iter().enumerate() {
      if remaining_left[i] && rpo(ctx, precedence, *l, *r) == Some(Ordering::Greater) {
        remaining_left[i] = false;
        dominated = true;
        break;
      }
    }
    if !dominated {
      return None;
    }
  }
  Some(Ordering::Greater)
}

/// Flips an `Option<Ordering>` the way every caller comparing `(b, a)` instead of `(a, b)` needs;
/// re-exported so callers don't need to depend on `satprove_abs` directly just for this.
pub fn flip(cmp: Option<Ordering>) -> Option<Ordering> {
  reverse(cmp)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ids::TypeId;
  use crate::symbol::Symbol;
  use satprove_abs::IString;

  fn setup() -> (Context, Precedence, SymbolId, SymbolId, SymbolId) {
    let mut ctx = Context::new();
    let f = ctx.intern_symbol(Symbol::new(IString::from("f"), 1, TypeId::NONE));
    let g = ctx.intern_symbol(Symbol::new(IString::from("g"), 1, TypeId::NONE));
    let a = ctx.intern_symbol(Symbol::new(IString::from("a"), 0, TypeId::NONE));
    let mut precedence = Precedence::new();
    precedence.set_rank(f, 2);
    precedence.set_rank(g, 1);
    precedence.set_rank(a, 0);
    precedence.set_weight(f, 1);
    precedence.set_weight(g, 1);
    precedence.set_weight(a, 1);
    (ctx, precedence, f, g, a)
  }

  #[test]
  fn kbo_orders_by_weight_when_variables_allow() {
    let (mut ctx, precedence, f, _g, a) = setup();
    let a_term = ctx.intern_term(TermData::Const(a));
    let fa = ctx.intern_term(TermData::App { head: ctx.intern_term(TermData::Const(f)), args: smallvec::smallvec![a_term] });
    assert_eq!(kbo(&ctx, &precedence, fa, a_term), Some(Ordering::Greater));
  }

  #[test]
  fn kbo_variable_is_less_than_term_containing_it() {
    let (mut ctx, precedence, f, _g, _a) = setup();
    let x = ctx.intern_term(TermData::FreeVar(0));
    let f_const = ctx.intern_term(TermData::Const(f));
    let fx = ctx.intern_term(TermData::App { head: f_const, args: smallvec::smallvec![x] });
    assert_eq!(kbo(&ctx, &precedence, x, fx), Some(Ordering::Less));
  }

  #[test]
  fn kbo_incomparable_when_variable_not_dominated() {
    let (mut ctx, precedence, _f, _g, _a) = setup();
    let x = ctx.intern_term(TermData::FreeVar(0));
    let y = ctx.intern_term(TermData::FreeVar(1));
    assert_eq!(kbo(&ctx, &precedence, x, y), None);
  }

  #[test]
  fn rpo_orders_by_precedence_on_equal_weight_terms() {
    let (mut ctx, precedence, f, g, a) = setup();
    let a_term = ctx.intern_term(TermData::Const(a));
    let f_const = ctx.intern_term(TermData::Const(f));
    let g_const = ctx.intern_term(TermData::Const(g));
    let fa = ctx.intern_term(TermData::App { head: f_const, args: smallvec::smallvec![a_term] });
    let ga = ctx.intern_term(TermData::App { head: g_const, args: smallvec::smallvec![a_term] });
    assert_eq!(rpo(&ctx, &precedence, fa, ga), Some(Ordering::Greater));
  }
}
