/*!

Forward and backward simplification (4.L): demodulation, simplify-reflect, subsumption, and
tautology elimination. These rules never grow the search space the way `inference.rs`'s generating
rules do -- each either deletes a clause outright (tautology, subsumed) or rewrites it to something
the ordering guarantees is no larger (demodulation, simplify-reflect) -- so the given-clause loop
(4.M) runs them to a fixpoint on every newly-activated clause before it's allowed to generate
anything from it, and re-runs them against the active set whenever a new unit equation appears.

*/

use crate::clause::Clause;
use crate::context::Context;
use crate::ids::{ClauseId, TermId};
use crate::index::FingerprintIndex;
use crate::literal::Literal;
use crate::order::{OrderingKind, Precedence};
use crate::subst::{ScopedTerm, Scope, Subst};
use crate::term::{self, PositionStep};
use crate::unify;

/// A positive unit clause `l = r` with `l` oriented greater than `r`, the only shape a rewrite rule
/// used by demodulation/simplify-reflect may have.
#[derive(Copy, Clone)]
pub struct RewriteRule {
  pub clause: ClauseId,
  pub left  : TermId,
  pub right : TermId,
}

/// Indexes every active unit equation's oriented left-hand side, for fast demodulation candidate
/// lookup. Rebuilt (incrementally, via `insert`/`remove`) as clauses are activated/retracted.
#[derive(Default)]
pub struct RewriteIndex {
  index: FingerprintIndex<RewriteRule>,
}

impl RewriteIndex {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers `clause`'s unit equation as a rewrite rule if it's a single positive literal whose
  /// sides are strictly ordered; does nothing otherwise (e.g. for non-unit or non-equational
  /// clauses, which demodulation never uses as rewrite rules).
  pub fn try_insert(&mut self, ctx: &Context, precedence: &Precedence, ordering: OrderingKind, clause_id: ClauseId) {
    let clause = ctx.clause(clause_id);
    if clause.len() != 1 || clause.literal(0).is_negative() {
      return;
    }
    let literal = clause.literal(0);
    match literal.ordering(ctx, precedence, ordering) {
      Some(std::cmp::Ordering::Greater) => {
        self.index.insert(ctx, literal.left(), RewriteRule { clause: clause_id, left: literal.left(), right: literal.right() })
      }
      Some(std::cmp::Ordering::Less) => {
        self.index.insert(ctx, literal.right(), RewriteRule { clause: clause_id, left: literal.right(), right: literal.left() })
      }
      _ => {}
    }
  }

  pub fn remove(&mut self, ctx: &Context, clause_id: ClauseId) {
    let clause = ctx.clause(clause_id);
    if clause.len() != 1 {
      return;
    }
    let literal = clause.literal(0);
    self.index.remove(ctx, literal.left(), |rule| rule.clause == clause_id);
    self.index.remove(ctx, literal.right(), |rule| rule.clause == clause_id);
  }

  fn candidates(&self, ctx: &Context, term: TermId) -> Vec<RewriteRule> {
    self.index.candidates(ctx, term).into_iter().map(|(_, rule)| rule).collect()
  }
}

const RULE_SCOPE: Scope = Scope(0);
const TARGET_SCOPE: Scope = Scope(1);

/// Finds one rewrite step applicable at or below `term`: a rule whose left side matches some
/// subterm, with the matched instance strictly smaller on the rule's right-hand side (guaranteed by
/// construction, since `RewriteRule::left`/`right` are already ordered, but re-checked against the
/// ground instance since the ordering on variables doesn't imply the ordering on every instance).
fn rewrite_step(ctx: &mut Context, precedence: &Precedence, ordering: OrderingKind, index: &RewriteIndex, term: TermId) -> Option<TermId> {
  for position in term::all_positions(term, &ctx.term_table_fn()) {
    let subterm = term::subterm_at(term, &position, &ctx.term_table_fn())?;
    for rule in index.candidates(ctx, subterm) {
      let mut subst = Subst::new();
      let pattern = ScopedTerm { term: rule.left, scope: RULE_SCOPE };
      let target = ScopedTerm { term: subterm, scope: TARGET_SCOPE };
      if unify::matches(ctx, pattern, target, &mut subst) {
        let new_left = unify::apply(ctx, &subst, pattern);
        let new_right = unify::apply(ctx, &subst, ScopedTerm { term: rule.right, scope: RULE_SCOPE });
        if matches!(ordering.compare(ctx, precedence, new_left, new_right), Some(std::cmp::Ordering::Less)) {
          continue;
        }
        return Some(replace_and_rebuild(ctx, term, &position, new_right));
      }
    }
  }
  None
}

fn replace_and_rebuild(ctx: &mut Context, root: TermId, position: &[PositionStep], replacement: TermId) -> TermId {
  match position.split_first() {
    None => replacement,
    Some((PositionStep::Arg(i), rest)) => match ctx.term(root).clone() {
      crate::term::TermData::App { head, args } => {
        let mut new_args = args.clone();
        new_args[*i as usize] = replace_and_rebuild(ctx, args[*i as usize], rest, replacement);
        ctx.intern_term(crate::term::TermData::App { head, args: new_args })
      }
      _ => unreachable!(),
    },
    Some((PositionStep::Body, rest)) => match ctx.term(root).clone() {
      crate::term::TermData::Lambda { param_sort, body } => {
        let new_body = replace_and_rebuild(ctx, body, rest, replacement);
        ctx.intern_term(crate::term::TermData::Lambda { param_sort, body: new_body })
      }
      _ => unreachable!(),
    },
  }
}

/// Rewrites `term` to a fixpoint against `index`'s rules. Bounded by `max_steps` as a termination
/// guard: a confluent, well-founded rule set never needs it, but a buggy or adversarial rule set
/// (e.g. a user-supplied hook clause, see 4.O) shouldn't be able to hang the loop.
fn normalize(ctx: &mut Context, precedence: &Precedence, ordering: OrderingKind, index: &RewriteIndex, mut term: TermId, max_steps: usize) -> (TermId, bool) {
  let mut rewritten = false;
  for _ in 0..max_steps {
    match rewrite_step(ctx, precedence, ordering, index, term) {
      Some(next) => {
        term = next;
        rewritten = true;
      }
      None => break,
    }
  }
  (term, rewritten)
}

/// Demodulates every literal of `clause` against `index`'s unit equations, returning the simplified
/// clause if any rewrite fired (`None` means `clause` was already fully normalized).
pub fn demodulate(ctx: &mut Context, precedence: &Precedence, ordering: OrderingKind, index: &RewriteIndex, clause: &Clause) -> Option<Clause> {
  let mut any = false;
  let mut literals = Vec::with_capacity(clause.len());
  for literal in clause.literals() {
    let (left, left_changed) = normalize(ctx, precedence, ordering, index, literal.left(), 10_000);
    let (right, right_changed) = normalize(ctx, precedence, ordering, index, literal.right(), 10_000);
    any |= left_changed || right_changed;
    literals.push(Literal::new(literal.is_positive(), left, right));
  }
  if any {
    Some(Clause::canonicalize(ctx, literals))
  } else {
    None
  }
}

/// Simplify-reflect (4.L): a negative literal `s != t` is removed, and the whole clause replaced by
/// a unit consequence, if some *other* unit equation in `index` makes `s` and `t` identical under
/// matching alone (a cheaper, strictly-matching-only special case of equality resolution that
/// doesn't require a full unification search). Implemented here as positive/negative in one pass:
/// a positive literal `s = t` is handled symmetrically by deleting the whole clause if `s` and `t`
/// already demodulate to the same normal form.
pub fn simplify_reflect(ctx: &mut Context, precedence: &Precedence, ordering: OrderingKind, index: &RewriteIndex, clause: &Clause) -> Option<Clause> {
  let mut literals = Vec::with_capacity(clause.len());
  let mut changed = false;
  for literal in clause.literals() {
    let (left, _) = normalize(ctx, precedence, ordering, index, literal.left(), 10_000);
    let (right, _) = normalize(ctx, precedence, ordering, index, literal.right(), 10_000);
    if left == right {
      if literal.is_negative() {
        changed = true;
        continue;
      }
      // A positive literal that reduces to `t = t` makes the whole clause a tautology.
      return Some(Clause::canonicalize(ctx, vec![Literal::positive(left, left)]));
    }
    literals.push(literal.clone());
  }
  if changed {
    Some(Clause::canonicalize(ctx, literals))
  } else {
    None
  }
}

/// `true` if `clause` is a tautology: it contains both polarities of the same literal, or a
/// positive reflexive equation `t = t`.
pub fn is_tautology(clause: &Clause) -> bool {
  let literals = clause.literals();
  if literals.iter().any(|l| l.is_positive() && l.is_syntactically_reflexive()) {
    return true;
  }
  for i in 0..literals.len() {
    for j in (i + 1)..literals.len() {
      if literals[i].is_positive() != literals[j].is_positive()
          && literals[i].left() == literals[j].left()
          && literals[i].right() == literals[j].right()
      {
        return true;
      }
    }
  }
  false
}

/// `true` if `subsumer` subsumes `subsumed`: there is a substitution, applied to `subsumer`'s
/// variables only, under which every literal of `subsumer` matches some literal of `subsumed`
/// (multiple subsumer literals may match the same subsumed literal). Backtracks across literal
/// assignments since matching literal `i` can constrain which subsumed literals remain available
/// (through shared variable bindings) for literal `i + 1`.
pub fn subsumes(ctx: &Context, subsumer: &Clause, subsumed: &Clause) -> bool {
  let mut subst = Subst::new();
  try_subsume(ctx, subsumer, subsumed, 0, &mut subst)
}

fn try_subsume(ctx: &Context, subsumer: &Clause, subsumed: &Clause, index: usize, subst: &mut Subst) -> bool {
  if index == subsumer.len() {
    return true;
  }
  let literal = subsumer.literal(index);
  for candidate in subsumed.literals() {
    if literal.is_positive() != candidate.is_positive() {
      continue;
    }
    let mut trial = subst.clone();
    let pattern_left = ScopedTerm { term: literal.left(), scope: Scope(0) };
    let pattern_right = ScopedTerm { term: literal.right(), scope: Scope(0) };
    let target_left = ScopedTerm { term: candidate.left(), scope: Scope(1) };
    let target_right = ScopedTerm { term: candidate.right(), scope: Scope(1) };

    if unify::matches(ctx, pattern_left, target_left, &mut trial) && unify::matches(ctx, pattern_right, target_right, &mut trial) {
      if try_subsume(ctx, subsumer, subsumed, index + 1, &mut trial) {
        *subst = trial;
        return true;
      }
    }

    // An equation's two sides are unordered data, so also try the swapped matching.
    let mut swapped = subst.clone();
    if unify::matches(ctx, pattern_left, target_right, &mut swapped) && unify::matches(ctx, pattern_right, target_left, &mut swapped) {
      if try_subsume(ctx, subsumer, subsumed, index + 1, &mut swapped) {
        *subst = swapped;
        return true;
      }
    }
  }
  false
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ids::TypeId;
  use crate::symbol::Symbol;
  use crate::term::TermData;
  use satprove_abs::IString;

  fn constant(ctx: &mut Context, name: &str) -> TermId {
    let symbol = ctx.intern_symbol(Symbol::new(IString::from(name), 0, TypeId::NONE));
    ctx.intern_term(TermData::Const(symbol))
  }

  #[test]
  fn reflexive_positive_literal_is_a_tautology() {
    let mut ctx = Context::new();
    let a = constant(&mut ctx, "a");
    let clause = Clause::canonicalize(&mut ctx, vec![Literal::positive(a, a)]);
    assert!(is_tautology(&clause));
  }

  #[test]
  fn complementary_literals_make_a_tautology() {
    let mut ctx = Context::new();
    let a = constant(&mut ctx, "a");
    let b = constant(&mut ctx, "b");
    let clause = Clause::canonicalize(&mut ctx, vec![Literal::positive(a, b), Literal::negative(a, b)]);
    assert!(is_tautology(&clause));
  }

  #[test]
  fn unit_clause_subsumes_itself() {
    let mut ctx = Context::new();
    let a = constant(&mut ctx, "a");
    let clause = Clause::canonicalize(&mut ctx, vec![Literal::positive(a, a)]);
    assert!(subsumes(&ctx, &clause, &clause));
  }

  #[test]
  fn general_clause_subsumes_a_specific_instance() {
    let mut ctx = Context::new();
    let x = ctx.intern_term(TermData::FreeVar(0));
    let a = constant(&mut ctx, "a");
    let general = Clause::canonicalize(&mut ctx, vec![Literal::positive(x, x)]);
    let specific = Clause::canonicalize(&mut ctx, vec![Literal::positive(a, a)]);
    assert!(subsumes(&ctx, &general, &specific));
  }

  #[test]
  fn demodulation_rewrites_using_a_unit_equation() {
    let mut ctx = Context::new();
    let precedence = Precedence::new();
    let a = constant(&mut ctx, "a");
    let b = constant(&mut ctx, "b");
    let rule_clause = Clause::canonicalize(&mut ctx, vec![Literal::positive(a, b)]);
    let rule_id = ctx.intern_clause(rule_clause);

    let mut index = RewriteIndex::new();
    // Force orientation deterministically for the test: a > b under the default (empty)
    // precedence falls back to symbol-count/weight ties, so we insert the rule directly rather
    // than rely on `try_insert`'s ordering check picking the direction the test expects.
    index.index.insert(&ctx, a, RewriteRule { clause: rule_id, left: a, right: b });

    let target = Clause::canonicalize(&mut ctx, vec![Literal::positive(a, a)]);
    let result = demodulate(&mut ctx, &precedence, OrderingKind::Kbo, &index, &target);
    assert!(result.is_some());
  }
}
