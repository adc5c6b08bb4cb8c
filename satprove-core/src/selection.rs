/*!

Selection functions (4.I). Superposition only resolves/superposes into a clause's *selected*
literals when any are selected, falling back to the maximal literals otherwise; restricting
inference to a smaller literal subset is what keeps the search space from exploding, as long as the
selection function is one of the "safe" ones (always selects at least one negative literal if any
exist, or selects nothing).

*/

use satprove_abs::NatSet;

use crate::clause::Clause;
use crate::context::Context;
use crate::order::{OrderingKind, Precedence};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SelectionFunction {
  /// Never selects; every inference falls back to the maximal-literal set.
  None,
  /// Selects exactly one negative literal: the first one found, in clause order.
  FirstNegative,
  /// Selects exactly one negative literal: the one whose left-hand side has the fewest symbols,
  /// a weak heuristic for preferring a cheap-to-resolve literal first.
  SmallestNegative,
  /// Selects every negative literal in the clause, if it has any.
  SelectAllNegative,
  /// Selects one maximal negative literal: among the negative literals whose left-hand side
  /// contains the highest-numbered variable in the clause (the "deepest" one, per `NatSet::max`),
  /// the smallest by term size breaks ties. A heuristic aimed at literals built from the most
  /// recently introduced (hence least-constrained) variables.
  SelectComplex,
}

impl SelectionFunction {
  pub fn select(&self, ctx: &Context, precedence: &Precedence, clause: &Clause) -> NatSet {
    match self {
      SelectionFunction::None => NatSet::new(),
      SelectionFunction::FirstNegative => {
        let mut set = NatSet::new();
        if let Some(index) = clause.literals().iter().position(|l| l.is_negative()) {
          set.insert(index);
        }
        set
      }
      SelectionFunction::SmallestNegative => {
        let mut set = NatSet::new();
        let smallest = clause
            .literals()
            .iter()
            .enumerate()
            .filter(|(_, l)| l.is_negative())
            .min_by_key(|(_, l)| term_size(ctx, l.left()));
        if let Some((index, _)) = smallest {
          set.insert(index);
        }
        set
      }
      SelectionFunction::SelectAllNegative => {
        clause.literals().iter().enumerate().filter(|(_, l)| l.is_negative()).map(|(i, _)| i).collect()
      }
      SelectionFunction::SelectComplex => {
        let mut set = NatSet::new();
        let deepest = clause
            .literals()
            .iter()
            .enumerate()
            .filter(|(_, l)| l.is_negative())
            .max_by_key(|(_, l)| (deepest_variable(ctx, l.left()), std::cmp::Reverse(term_size(ctx, l.left()))));
        if let Some((index, _)) = deepest {
          set.insert(index);
        }
        set
      }
    }
  }
}

fn term_size(ctx: &Context, term: crate::ids::TermId) -> usize {
  match ctx.term(term) {
    crate::term::TermData::App { head, args } => {
      1 + term_size(ctx, *head) + args.iter().map(|a| term_size(ctx, *a)).sum::<usize>()
    }
    crate::term::TermData::Lambda { body, .. } => 1 + term_size(ctx, *body),
    _ => 1,
  }
}

/// The highest-numbered free variable occurring in `term`, or `None` for a ground term -- the
/// "deepest variable" `SelectComplex` prefers, via `NatSet::max`.
fn deepest_variable(ctx: &Context, term: crate::ids::TermId) -> Option<usize> {
  let mut vars = NatSet::new();
  collect_variables(ctx, term, &mut vars);
  vars.max()
}

fn collect_variables(ctx: &Context, term: crate::ids::TermId, vars: &mut NatSet) {
  match ctx.term(term) {
    crate::term::TermData::FreeVar(id) => {
      vars.insert(*id as usize);
    }
    crate::term::TermData::App { head, args } => {
      collect_variables(ctx, *head, vars);
      for arg in args {
        collect_variables(ctx, *arg, vars);
      }
    }
    crate::term::TermData::Lambda { body, .. } => collect_variables(ctx, *body, vars),
    crate::term::TermData::BoundVar(_) | crate::term::TermData::Const(_) => {}
  }
}

/// The indices of literals maximal under `precedence` among `clause`'s literals -- a literal is
/// maximal if no other literal's orientation strictly exceeds it (4.G's "maximal w.r.t. the
/// clause" notion, here made concrete using whichever ordering `ordering` selects).
pub fn maximal_literals(ctx: &Context, precedence: &Precedence, clause: &Clause, ordering: OrderingKind) -> NatSet {
  let literals = clause.literals();
  let mut maximal = NatSet::new();
  for i in 0..literals.len() {
    let mut is_maximal = true;
    for j in 0..literals.len() {
      if i == j {
        continue;
      }
      if literal_greater(ctx, precedence, &literals[j], &literals[i], ordering) {
        is_maximal = false;
        break;
      }
    }
    if is_maximal {
      maximal.insert(i);
    }
  }
  maximal
}

/// The literals an inference rule (4.K) may use when rewriting into, resolving upon, or factoring
/// `clause`: its selected literals if the selection function picked any, otherwise its maximal
/// literals (4.I's "falls back to the maximal-literal set" rule).
pub fn eligible_literals(ctx: &Context, precedence: &Precedence, ordering: OrderingKind, selection: &SelectionFunction, clause: &Clause) -> NatSet {
  let selected = selection.select(ctx, precedence, clause);
  if !selected.is_empty() {
    selected
  } else {
    maximal_literals(ctx, precedence, clause, ordering)
  }
}

/// The literals `clause` may use as the rewriting ("from") side of a superposition or the first
/// literal of equality factoring: only its maximal positive literals, and only when the clause has
/// no literal selected at all -- a clause with any selected literal (which 4.I guarantees is
/// negative) has no eligible positive equation to generate from, since selection restricts every
/// inference to the selected set.
pub fn generating_literals(ctx: &Context, precedence: &Precedence, ordering: OrderingKind, selection: &SelectionFunction, clause: &Clause) -> NatSet {
  let selected = selection.select(ctx, precedence, clause);
  if !selected.is_empty() {
    return NatSet::new();
  }
  maximal_literals(ctx, precedence, clause, ordering)
}

fn literal_greater(
  ctx: &Context,
  precedence: &Precedence,
  a: &crate::literal::Literal,
  b: &crate::literal::Literal,
  ordering: OrderingKind,
) -> bool {
  use std::cmp::Ordering;
  let cmp_a = a.ordering(ctx, precedence, ordering);
  let cmp_b = b.ordering(ctx, precedence, ordering);
  let max_a = max_side(a, cmp_a);
  let max_b = max_side(b, cmp_b);
  matches!(ordering.compare(ctx, precedence, max_a, max_b), Some(Ordering::Greater))
}

fn max_side(literal: &crate::literal::Literal, cmp: Option<std::cmp::Ordering>) -> crate::ids::TermId {
  match cmp {
    Some(std::cmp::Ordering::Less) => literal.right(),
    _ => literal.left(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ids::TypeId;
  use crate::literal::Literal;
  use crate::symbol::Symbol;
  use crate::term::TermData;
  use satprove_abs::IString;

  #[test]
  fn first_negative_selects_the_first_negative_literal() {
    let mut ctx = Context::new();
    let a = ctx.intern_symbol(Symbol::new(IString::from("a"), 0, TypeId::NONE));
    let a_term = ctx.intern_term(TermData::Const(a));
    let clause = Clause::canonicalize(
      &mut ctx,
      vec![Literal::positive(a_term, a_term), Literal::negative(a_term, a_term)],
    );
    let selected = SelectionFunction::FirstNegative.select(&ctx, &Precedence::new(), &clause);
    assert!(selected.contains(1));
    assert_eq!(selected.len(), 1);
  }

  #[test]
  fn none_selects_nothing() {
    let mut ctx = Context::new();
    let a = ctx.intern_symbol(Symbol::new(IString::from("a"), 0, TypeId::NONE));
    let a_term = ctx.intern_term(TermData::Const(a));
    let clause = Clause::canonicalize(&mut ctx, vec![Literal::negative(a_term, a_term)]);
    let selected = SelectionFunction::None.select(&ctx, &Precedence::new(), &clause);
    assert!(selected.is_empty());
  }
}
