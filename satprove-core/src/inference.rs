/*!

The superposition-family inference rules (4.K): superposition (paramodulation restricted to
maximal sides of maximal, selected-or-unselected literals), equality resolution, and equality
factoring. Each rule is total given two (or one) parent clauses and specific literal/position
choices -- it either produces the unique resolvent those choices determine, or returns `None`/an
empty `Vec` because an ordering or selection side condition rejects the combination. "Does not
apply" is never an error (see `error.rs`); only a genuine invariant violation is.

The driver functions (`superposition_from_given`, `superposition_into_given`,
`equality_resolution_candidates`, `equality_factoring_candidates`) do the literal/position
enumeration a real prover's given-clause loop needs; `crate::saturation` calls them once per
newly-activated clause.

*/

use smallvec::smallvec;

use crate::clause::Clause;
use crate::context::Context;
use crate::ids::{ClauseId, TermId};
use crate::literal::Literal;
use crate::order::{OrderingKind, Precedence};
use crate::selection::{self, SelectionFunction};
use crate::subst::{ScopedTerm, Scope, Subst};
use crate::term::{self, PositionStep, TermData};
use crate::unify;

const FROM_SCOPE: Scope = Scope(0);
const INTO_SCOPE: Scope = Scope(1);

fn is_non_variable(ctx: &Context, term: TermId) -> bool {
  !matches!(ctx.term(term), TermData::FreeVar(_))
}

/// Replaces the subterm at `position` in `root` with `replacement`, rebuilding the spine of `App`
/// nodes from the replaced leaf back up to the root and interning each freshly-built node.
fn replace_at(ctx: &mut Context, root: TermId, position: &[PositionStep], replacement: TermId) -> TermId {
  match position.split_first() {
    None => replacement,
    Some((PositionStep::Arg(i), rest)) => match ctx.term(root).clone() {
      TermData::App { head, args } => {
        let mut new_args = args.clone();
        let new_child = replace_at(ctx, args[*i as usize], rest, replacement);
        new_args[*i as usize] = new_child;
        ctx.intern_term(TermData::App { head, args: new_args })
      }
      _ => unreachable!("replace_at: Arg step into a non-application term"),
    },
    Some((PositionStep::Body, rest)) => match ctx.term(root).clone() {
      TermData::Lambda { param_sort, body } => {
        let new_body = replace_at(ctx, body, rest, replacement);
        ctx.intern_term(TermData::Lambda { param_sort, body: new_body })
      }
      _ => unreachable!("replace_at: Body step into a non-lambda term"),
    },
  }
}

/// One successful superposition: `from` clause's maximal equation rewrites a non-variable subterm
/// of `into` clause's literal `into_literal` at `position`, producing `result`.
pub struct Superposition {
  pub from_clause  : ClauseId,
  pub from_literal : usize,
  pub into_clause  : ClauseId,
  pub into_literal : usize,
  pub position     : term::Position,
  pub substitution : Subst,
  pub result       : Clause,
}

/// Attempts superposition of `from`'s literal `from_literal` (which must be a positive equation)
/// into `into`'s literal `into_literal` at `position`. Returns `None` if the literal isn't a usable
/// positive equation, the position is a variable, the two sides don't unify, or the unifier would
/// violate the ordering restriction that the equation's matched side not become smaller than its
/// other side.
pub fn superposition(
  ctx: &mut Context,
  precedence: &Precedence,
  ordering: OrderingKind,
  from: ClauseId,
  from_literal: usize,
  into: ClauseId,
  into_literal: usize,
  position: &[PositionStep],
) -> Option<Clause> {
  superposition_with_subst(ctx, precedence, ordering, from, from_literal, into, into_literal, position).map(|(clause, _)| clause)
}

/// As `superposition`, but also returns the unifier the step used, for proof bookkeeping (4.N).
pub fn superposition_with_subst(
  ctx: &mut Context,
  precedence: &Precedence,
  ordering: OrderingKind,
  from: ClauseId,
  from_literal: usize,
  into: ClauseId,
  into_literal: usize,
  position: &[PositionStep],
) -> Option<(Clause, Subst)> {
  let from_clause = ctx.clause(from).clone();
  let into_clause = ctx.clause(into).clone();

  let equation = from_clause.literal(from_literal);
  if equation.is_negative() {
    return None;
  }
  let (equation_left, equation_right) = (equation.left(), equation.right());

  // Simplification: only the literal's left side is searched for rewrite sites (the driver in
  // `rewrite_sites` only emits left-side positions); a literal `t = s` that should be rewritten on
  // its right side needs to be stored/considered with its sides swapped by the caller.
  let rewritten_literal = into_clause.literal(into_literal);
  let target_term = term::subterm_at(rewritten_literal.left(), position, &ctx.term_table_fn())?;

  if !is_non_variable(ctx, target_term) {
    return None;
  }

  let mut subst = Subst::new();
  let lhs = ScopedTerm { term: equation_left, scope: FROM_SCOPE };
  let rhs = ScopedTerm { term: target_term, scope: INTO_SCOPE };
  if !unify::unify(ctx, lhs, rhs, &mut subst) {
    return None;
  }

  let new_left_side = unify::apply(ctx, &subst, ScopedTerm { term: equation_left, scope: FROM_SCOPE });
  let new_right_side = unify::apply(ctx, &subst, ScopedTerm { term: equation_right, scope: FROM_SCOPE });
  // Ordering restriction: the rewrite must narrow, not widen, the equation's orientation.
  if matches!(ordering.compare(ctx, precedence, new_left_side, new_right_side), Some(std::cmp::Ordering::Less)) {
    return None;
  }

  let rewritten_root = unify::apply(ctx, &subst, ScopedTerm { term: rewritten_literal.left(), scope: INTO_SCOPE });
  let rewritten_side = replace_at(ctx, rewritten_root, position, new_right_side);
  let other_side = unify::apply(ctx, &subst, ScopedTerm { term: rewritten_literal.right(), scope: INTO_SCOPE });

  let mut literals = Vec::with_capacity(from_clause.len() + into_clause.len() - 1);
  for (i, literal) in from_clause.literals().iter().enumerate() {
    if i == from_literal {
      continue;
    }
    literals.push(apply_literal(ctx, &subst, literal, FROM_SCOPE));
  }
  for (i, literal) in into_clause.literals().iter().enumerate() {
    if i == into_literal {
      literals.push(Literal::new(rewritten_literal.is_positive(), rewritten_side, other_side));
      continue;
    }
    literals.push(apply_literal(ctx, &subst, literal, INTO_SCOPE));
  }

  Some((Clause::canonicalize(ctx, literals), subst))
}

fn apply_literal(ctx: &mut Context, subst: &Subst, literal: &Literal, scope: Scope) -> Literal {
  let left = unify::apply(ctx, subst, ScopedTerm { term: literal.left(), scope });
  let right = unify::apply(ctx, subst, ScopedTerm { term: literal.right(), scope });
  Literal::new(literal.is_positive(), left, right)
}

/// Equality resolution: a clause containing a negative literal `s != t` where `s` and `t` unify is
/// replaced by the clause with that literal removed and the unifier applied to the rest -- the
/// unified literal is unsatisfiable (`s = t` and `s != t` can't both hold) so it contributes nothing.
pub fn equality_resolution(ctx: &mut Context, clause_id: ClauseId, literal_index: usize) -> Option<Clause> {
  equality_resolution_with_subst(ctx, clause_id, literal_index).map(|(clause, _)| clause)
}

/// As `equality_resolution`, but also returns the unifier the step used.
pub fn equality_resolution_with_subst(ctx: &mut Context, clause_id: ClauseId, literal_index: usize) -> Option<(Clause, Subst)> {
  let clause = ctx.clause(clause_id).clone();
  let literal = clause.literal(literal_index);
  if literal.is_positive() {
    return None;
  }

  let mut subst = Subst::new();
  let scope = Scope(0);
  let lhs = ScopedTerm { term: literal.left(), scope };
  let rhs = ScopedTerm { term: literal.right(), scope };
  if !unify::unify(ctx, lhs, rhs, &mut subst) {
    return None;
  }

  let literals: Vec<Literal> = clause
      .literals()
      .iter()
      .enumerate()
      .filter(|(i, _)| *i != literal_index)
      .map(|(_, l)| apply_literal(ctx, &subst, l, scope))
      .collect();

  Some((Clause::canonicalize(ctx, literals), subst))
}

/// Equality factoring: a clause with two positive equations `s = t` and `u = v` sharing a unifiable
/// left side (`s` and `u`) is replaced by a clause asserting `t = v` alongside a negated copy of the
/// second equation and the rest of the clause, under the unifier. This handles the case
/// superposition alone can't: merging two equations about the same (unified) term within one clause.
pub fn equality_factoring(ctx: &mut Context, clause_id: ClauseId, first: usize, second: usize) -> Option<Clause> {
  equality_factoring_with_subst(ctx, clause_id, first, second).map(|(clause, _)| clause)
}

/// As `equality_factoring`, but also returns the unifier the step used.
pub fn equality_factoring_with_subst(ctx: &mut Context, clause_id: ClauseId, first: usize, second: usize) -> Option<(Clause, Subst)> {
  if first == second {
    return None;
  }
  let clause = ctx.clause(clause_id).clone();
  let (l1, l2) = (clause.literal(first), clause.literal(second));
  if l1.is_negative() || l2.is_negative() {
    return None;
  }

  let mut subst = Subst::new();
  let scope = Scope(0);
  if !unify::unify(ctx, ScopedTerm { term: l1.left(), scope }, ScopedTerm { term: l2.left(), scope }, &mut subst) {
    return None;
  }

  let t = unify::apply(ctx, &subst, ScopedTerm { term: l1.right(), scope });
  let v = unify::apply(ctx, &subst, ScopedTerm { term: l2.right(), scope });

  let mut literals: Vec<Literal> = clause
      .literals()
      .iter()
      .enumerate()
      .filter(|(i, _)| *i != first && *i != second)
      .map(|(_, l)| apply_literal(ctx, &subst, l, scope))
      .collect();

  literals.push(Literal::positive(t, v));
  literals.push(Literal::negative(unify::apply(ctx, &subst, ScopedTerm { term: l2.left(), scope }), v));

  Some((Clause::canonicalize(ctx, literals), subst))
}

/// Every non-variable position of the left side of every eligible literal -- the enumeration
/// `superposition_into_given` walks when brute-forcing overlaps into the given clause.
fn rewrite_sites(ctx: &Context, clause: &Clause, eligible: &satprove_abs::NatSet) -> Vec<(usize, term::Position)> {
  let mut sites = Vec::new();
  for literal_index in eligible.iter() {
    let root = clause.literal(literal_index).left();
    for position in term::all_positions(root, &ctx.term_table_fn()) {
      if let Some(sub) = term::subterm_at(root, &position, &ctx.term_table_fn()) {
        if is_non_variable(ctx, sub) {
          sites.push((literal_index, position));
        }
      }
    }
  }
  sites
}

/// Every non-variable rewrite site of `clause`, regardless of selection -- used to populate
/// `index.rs`'s persistent per-active-set fingerprint index, which every active clause's sites must
/// be findable through (an inference may rewrite into a literal the clause's own selection function
/// didn't mark eligible in isolation, since eligibility here is about the rewritten-into side, not a
/// generating side).
pub fn all_rewrite_sites(ctx: &Context, clause: &Clause) -> Vec<(usize, term::Position)> {
  let mut sites = Vec::new();
  for (literal_index, literal) in clause.literals().iter().enumerate() {
    let root = literal.left();
    for position in term::all_positions(root, &ctx.term_table_fn()) {
      if let Some(sub) = term::subterm_at(root, &position, &ctx.term_table_fn()) {
        if is_non_variable(ctx, sub) {
          sites.push((literal_index, position));
        }
      }
    }
  }
  sites
}

/// Superpositions of `given`'s generating (maximal, unselected) positive equations into any site
/// the persistent `subterm_index` (4.J) reports as compatible -- the indexed direction review #3
/// asks for, replacing a brute-force scan of every active clause's positions with a fingerprint
/// lookup per equation.
pub fn superposition_from_given(
  ctx: &mut Context,
  precedence: &Precedence,
  ordering: OrderingKind,
  selection: &SelectionFunction,
  given: ClauseId,
  subterm_index: &crate::index::FingerprintIndex<(ClauseId, usize, term::Position)>,
) -> Vec<Superposition> {
  let mut results = Vec::new();
  let given_clause = ctx.clause(given).clone();
  let generating = selection::generating_literals(ctx, precedence, ordering, selection, &given_clause);

  for from_literal in generating.iter() {
    let literal = given_clause.literal(from_literal);
    if literal.is_negative() {
      continue;
    }
    for (_, (into_clause, into_literal, position)) in subterm_index.candidates(ctx, literal.left()) {
      if into_clause == given {
        continue;
      }
      if let Some((result, substitution)) =
          superposition_with_subst(ctx, precedence, ordering, given, from_literal, into_clause, into_literal, &position)
      {
        results.push(Superposition { from_clause: given, from_literal, into_clause, into_literal, position, substitution, result });
      }
    }
  }
  results
}

/// Superpositions of `other`'s generating equations into `given`'s eligible rewrite sites -- the
/// brute-force direction: `given` is not yet in `subterm_index` when this runs (it's only inserted
/// once activated), so its sites are enumerated directly rather than looked up.
pub fn superposition_into_given(
  ctx: &mut Context,
  precedence: &Precedence,
  ordering: OrderingKind,
  selection: &SelectionFunction,
  given: ClauseId,
  other: ClauseId,
) -> Vec<Superposition> {
  let mut results = Vec::new();
  let other_clause = ctx.clause(other).clone();
  let given_clause = ctx.clause(given).clone();
  let generating = selection::generating_literals(ctx, precedence, ordering, selection, &other_clause);
  let eligible = selection::eligible_literals(ctx, precedence, ordering, selection, &given_clause);

  for from_literal in generating.iter() {
    let literal = other_clause.literal(from_literal);
    if literal.is_negative() {
      continue;
    }
    for (into_literal, position) in rewrite_sites(ctx, &given_clause, &eligible) {
      if let Some((result, substitution)) =
          superposition_with_subst(ctx, precedence, ordering, other, from_literal, given, into_literal, &position)
      {
        results.push(Superposition { from_clause: other, from_literal, into_clause: given, into_literal, position, substitution, result });
      }
    }
  }
  results
}

pub fn equality_resolution_candidates(ctx: &mut Context, given: ClauseId) -> Vec<(Clause, Subst)> {
  let clause = ctx.clause(given).clone();
  (0..clause.len()).filter_map(|i| equality_resolution_with_subst(ctx, given, i)).collect()
}

pub fn equality_factoring_candidates(
  ctx: &mut Context,
  precedence: &Precedence,
  ordering: OrderingKind,
  selection: &SelectionFunction,
  given: ClauseId,
) -> Vec<(Clause, Subst)> {
  let clause = ctx.clause(given).clone();
  let generating = selection::generating_literals(ctx, precedence, ordering, selection, &clause);
  let mut results = Vec::new();
  for i in generating.iter() {
    for j in generating.iter() {
      if i != j {
        if let Some(result) = equality_factoring_with_subst(ctx, given, i, j) {
          results.push(result);
        }
      }
    }
  }
  results
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ids::TypeId;
  use crate::symbol::Symbol;
  use satprove_abs::IString;

  fn setup_const(ctx: &mut Context, name: &str) -> TermId {
    let symbol = ctx.intern_symbol(Symbol::new(IString::from(name), 0, TypeId::NONE));
    ctx.intern_term(TermData::Const(symbol))
  }

  #[test]
  fn equality_resolution_removes_a_self_unifying_negative_literal() {
    let mut ctx = Context::new();
    let x = ctx.intern_term(TermData::FreeVar(0));
    let a = setup_const(&mut ctx, "a");
    let clause = Clause::canonicalize(&mut ctx, vec![Literal::negative(x, a), Literal::positive(a, a)]);
    let id = ctx.intern_clause(clause);

    let result = equality_resolution(&mut ctx, id, 0).expect("resolution should apply");
    assert_eq!(result.len(), 1);
  }

  #[test]
  fn equality_resolution_rejects_positive_literal() {
    let mut ctx = Context::new();
    let a = setup_const(&mut ctx, "a");
    let clause = Clause::canonicalize(&mut ctx, vec![Literal::positive(a, a)]);
    let id = ctx.intern_clause(clause);
    assert!(equality_resolution(&mut ctx, id, 0).is_none());
  }

  #[test]
  fn superposition_rewrites_a_matching_subterm() {
    let mut ctx = Context::new();
    let a = setup_const(&mut ctx, "a");
    let b = setup_const(&mut ctx, "b");
    let g_sym = ctx.intern_symbol(Symbol::new(IString::from("g"), 1, TypeId::NONE));
    let g_const = ctx.intern_term(TermData::Const(g_sym));
    let ga = ctx.intern_term(TermData::App { head: g_const, args: smallvec![a] });

    // from: a = b
    let from = Clause::canonicalize(&mut ctx, vec![Literal::positive(a, b)]);
    let from_id = ctx.intern_clause(from);
    // into: g(a) = a
    let into = Clause::canonicalize(&mut ctx, vec![Literal::positive(ga, a)]);
    let into_id = ctx.intern_clause(into);

    let precedence = Precedence::new();
    let result = superposition(&mut ctx, &precedence, OrderingKind::Kbo, from_id, 0, into_id, 0, &[PositionStep::Arg(0)]);
    assert!(result.is_some());
  }
}
