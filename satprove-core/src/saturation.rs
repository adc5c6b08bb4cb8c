/*!

The given-clause saturation loop (4.M): the central control loop of the prover. Clauses live in one
of three sets -- `active` (already used to generate and simplify against), `passive` (waiting their
turn), and the rewrite rules drawn from `active`'s unit equations -- and each iteration picks one
passive clause (the "given" clause), fully simplifies it against `active`, and then either discards
it (it was redundant), finds it's the empty clause (a refutation), or activates it and generates
every inference `inference.rs` defines from it paired with every existing active clause.

*/

use satprove_abs::FxHashMap;

use crate::clause::Clause;
use crate::context::Context;
use crate::error::Error;
use crate::ids::ClauseId;
use crate::index::FingerprintIndex;
use crate::inference;
use crate::order::{OrderingKind, Precedence};
use crate::proof::{Proof, ProofStep, Rule};
use crate::selection::SelectionFunction;
use crate::simplify::{self, RewriteIndex};
use crate::subst::Subst;
use crate::term::Position;

#[derive(Debug)]
pub enum Outcome {
  /// The empty clause was derived; `proof_step` indexes into the `Proof` the `Prover` owns.
  Refutation { proof_step: usize },
  /// The passive set emptied out without deriving the empty clause -- the input is satisfiable
  /// (modulo whatever the selection/ordering choices could refute, for an incomplete
  /// configuration) as far as this run could tell.
  Saturated,
  /// The clause or inference budget ran out first.
  Timeout,
  /// An internal consistency failure (see `error.rs`) -- the loop stops and the `Prover` should be
  /// treated as no longer usable.
  Error(Error),
}

pub struct Budget {
  pub max_clauses   : Option<usize>,
  pub max_given_loops: Option<usize>,
}

impl Default for Budget {
  fn default() -> Self {
    Budget { max_clauses: None, max_given_loops: Some(100_000) }
  }
}

pub struct Saturation {
  precedence   : Precedence,
  ordering     : OrderingKind,
  selection    : SelectionFunction,
  proof        : Proof,
  active       : Vec<ClauseId>,
  passive      : Vec<ClauseId>,
  rewrite_index: RewriteIndex,
  /// Every active clause's non-variable left-side positions, fingerprint-indexed (4.J) so
  /// `inference::superposition_from_given` can look up rewrite sites instead of scanning every
  /// active clause in turn.
  subterm_index: FingerprintIndex<(ClauseId, usize, Position)>,
  step_index   : FxHashMap<ClauseId, usize>,
  budget       : Budget,
}

impl Saturation {
  pub fn new(precedence: Precedence, ordering: OrderingKind, selection: SelectionFunction, budget: Budget) -> Self {
    Saturation {
      precedence,
      ordering,
      selection,
      proof: Proof::new(),
      active: Vec::new(),
      passive: Vec::new(),
      rewrite_index: RewriteIndex::new(),
      subterm_index: FingerprintIndex::new(),
      step_index: FxHashMap::default(),
      budget,
    }
  }

  pub fn proof(&self) -> &Proof {
    &self.proof
  }

  pub fn active_clauses(&self) -> &[ClauseId] {
    &self.active
  }

  /// Seeds the passive set with one of the problem's input clauses, recording an `Assumption`
  /// proof step for it.
  pub fn add_initial(&mut self, clause_id: ClauseId) {
    if self.step_index.contains_key(&clause_id) {
      return;
    }
    let index = self.proof.record(ProofStep::assumption(clause_id), &[]);
    self.step_index.insert(clause_id, index);
    self.passive.push(clause_id);
  }

  fn record_derived(&mut self, ctx: &Context, clause_id: ClauseId, rule: Rule) -> usize {
    self.record_derived_with_subst(ctx, clause_id, rule, None)
  }

  fn record_derived_with_subst(&mut self, ctx: &Context, clause_id: ClauseId, rule: Rule, substitution: Option<Subst>) -> usize {
    if let Some(&existing) = self.step_index.get(&clause_id) {
      return existing;
    }
    let premise_indices: Vec<usize> = rule
        .premises()
        .iter()
        .filter_map(|p| self.step_index.get(p).copied())
        .collect();
    let _ = ctx;
    let step = ProofStep { conclusion: clause_id, rule, substitution, proof_size: 0, depth: 0 };
    let index = self.proof.record(step, &premise_indices);
    self.step_index.insert(clause_id, index);
    index
  }

  /// Picks the smallest (fewest literals, then smallest `ClauseId`, as a deterministic tie-break)
  /// passive clause as the next given clause -- a simple weight-ordering heuristic, not a
  /// configurable clause-selection strategy.
  fn pick_given(&mut self, ctx: &Context) -> Option<ClauseId> {
    if self.passive.is_empty() {
      return None;
    }
    let (best_index, _) = self
        .passive
        .iter()
        .enumerate()
        .min_by_key(|(_, id)| (ctx.clause(**id).len(), id.index()))?;
    Some(self.passive.remove(best_index))
  }

  /// Runs the given-clause loop to completion (a refutation, saturation, or budget exhaustion).
  #[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip(self, ctx)))]
  pub fn run(&mut self, ctx: &mut Context) -> Outcome {
    let mut loops = 0usize;
    loop {
      if let Some(max) = self.budget.max_given_loops {
        if loops >= max {
          return Outcome::Timeout;
        }
      }
      if let Some(max) = self.budget.max_clauses {
        if ctx.clause_count() >= max {
          return Outcome::Timeout;
        }
      }
      loops += 1;

      let given = match self.pick_given(ctx) {
        Some(clause) => clause,
        None => return Outcome::Saturated,
      };

      match self.forward_simplify(ctx, given) {
        ForwardOutcome::Redundant => continue,
        ForwardOutcome::Clause(simplified) => {
          if ctx.clause(simplified).is_empty() {
            let step = self.step_index.get(&simplified).copied().unwrap_or_else(|| self.record_derived(ctx, simplified, Rule::Assumption));
            return Outcome::Refutation { proof_step: step };
          }

          self.backward_simplify(ctx, simplified);
          self.rewrite_index.try_insert(ctx, &self.precedence, self.ordering, simplified);
          self.activate(ctx, simplified);
        }
      }
    }
  }

  fn activate(&mut self, ctx: &mut Context, given: ClauseId) {
    let mut generated: Vec<(Clause, Rule, Option<Subst>)> = Vec::new();

    for sp in inference::superposition_from_given(ctx, &self.precedence, self.ordering, &self.selection, given, &self.subterm_index) {
      let rule = Rule::Superposition {
        from: sp.from_clause,
        from_literal: sp.from_literal,
        into: sp.into_clause,
        into_literal: sp.into_literal,
        position: sp.position,
      };
      generated.push((sp.result, rule, Some(sp.substitution)));
    }
    for &other in &self.active {
      for sp in inference::superposition_into_given(ctx, &self.precedence, self.ordering, &self.selection, given, other) {
        let rule = Rule::Superposition {
          from: sp.from_clause,
          from_literal: sp.from_literal,
          into: sp.into_clause,
          into_literal: sp.into_literal,
          position: sp.position,
        };
        generated.push((sp.result, rule, Some(sp.substitution)));
      }
    }
    for (result, substitution) in inference::equality_resolution_candidates(ctx, given) {
      generated.push((result, Rule::EqualityResolution { parent: given }, Some(substitution)));
    }
    for (result, substitution) in
        inference::equality_factoring_candidates(ctx, &self.precedence, self.ordering, &self.selection, given)
    {
      generated.push((result, Rule::EqualityFactoring { parent: given }, Some(substitution)));
    }

    for (literal_index, position) in inference::all_rewrite_sites(ctx, ctx.clause(given)) {
      self.subterm_index.insert(ctx, ctx.clause(given).literal(literal_index).left(), (given, literal_index, position));
    }
    self.active.push(given);

    for (clause, rule, substitution) in generated {
      if simplify::is_tautology(&clause) {
        continue;
      }
      let clause_id = ctx.intern_clause(clause);
      if self.is_subsumed_by_active(ctx, clause_id) {
        continue;
      }
      self.record_derived_with_subst(ctx, clause_id, rule, substitution);
      self.passive.push(clause_id);
    }
  }

  fn is_subsumed_by_active(&self, ctx: &Context, clause_id: ClauseId) -> bool {
    let clause = ctx.clause(clause_id);
    self.active.iter().any(|&active_id| {
      active_id != clause_id && simplify::subsumes(ctx, ctx.clause(active_id), clause)
    })
  }

  fn forward_simplify(&mut self, ctx: &mut Context, given: ClauseId) -> ForwardOutcome {
    let mut current = given;
    loop {
      let clause = ctx.clause(current).clone();
      if simplify::is_tautology(&clause) {
        return ForwardOutcome::Redundant;
      }
      if self.is_subsumed_by_active(ctx, current) {
        return ForwardOutcome::Redundant;
      }
      if let Some(demodulated) = simplify::demodulate(ctx, &self.precedence, self.ordering, &self.rewrite_index, &clause) {
        current = ctx.intern_clause(demodulated);
        self.record_derived(ctx, current, Rule::Demodulation { parent: given, rewrite_rules: Default::default() });
        continue;
      }
      if let Some(reflected) = simplify::simplify_reflect(ctx, &self.precedence, self.ordering, &self.rewrite_index, &clause) {
        current = ctx.intern_clause(reflected);
        self.record_derived(ctx, current, Rule::SimplifyReflect { parent: given, rewrite_rules: Default::default() });
        continue;
      }
      return ForwardOutcome::Clause(current);
    }
  }

  /// Removes any active clause that `given` now subsumes, and re-queues any active clause that
  /// `given` (as a fresh unit equation) can demodulate, so stale simplifications don't linger once
  /// a better rewrite rule is available.
  fn backward_simplify(&mut self, ctx: &mut Context, given: ClauseId) {
    let given_clause = ctx.clause(given).clone();
    let mut retained = Vec::with_capacity(self.active.len());
    for &active_id in &self.active {
      if active_id == given {
        continue;
      }
      if simplify::subsumes(ctx, &given_clause, ctx.clause(active_id)) {
        self.record_derived(ctx, active_id, Rule::Subsumed { parent: active_id, subsumer: given });
        continue;
      }
      retained.push(active_id);
    }
    self.active = retained;
  }
}

enum ForwardOutcome {
  Redundant,
  Clause(ClauseId),
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::clause::Clause;
  use crate::ids::TypeId;
  use crate::literal::Literal;
  use crate::symbol::Symbol;
  use crate::term::TermData;
  use satprove_abs::IString;

  #[test]
  fn saturating_with_no_clauses_is_immediately_saturated() {
    let mut ctx = Context::new();
    let mut saturation = Saturation::new(Precedence::new(), OrderingKind::Kbo, SelectionFunction::None, Budget::default());
    assert!(matches!(saturation.run(&mut ctx), Outcome::Saturated));
  }

  #[test]
  fn an_empty_initial_clause_is_an_immediate_refutation() {
    let mut ctx = Context::new();
    let empty = Clause::canonicalize(&mut ctx, vec![]);
    let empty_id = ctx.intern_clause(empty);

    let mut saturation = Saturation::new(Precedence::new(), OrderingKind::Kbo, SelectionFunction::None, Budget::default());
    saturation.add_initial(empty_id);
    assert!(matches!(saturation.run(&mut ctx), Outcome::Refutation { .. }));
  }

  #[test]
  fn equality_resolution_can_derive_the_empty_clause() {
    let mut ctx = Context::new();
    let a = {
      let symbol = ctx.intern_symbol(Symbol::new(IString::from("a"), 0, TypeId::NONE));
      ctx.intern_term(TermData::Const(symbol))
    };
    // a != a, alone, resolves to the empty clause.
    let clause = Clause::canonicalize(&mut ctx, vec![Literal::negative(a, a)]);
    let clause_id = ctx.intern_clause(clause);

    let mut saturation = Saturation::new(Precedence::new(), OrderingKind::Kbo, SelectionFunction::None, Budget::default());
    saturation.add_initial(clause_id);
    assert!(matches!(saturation.run(&mut ctx), Outcome::Refutation { .. }));
  }

  fn constant(ctx: &mut Context, name: &str) -> crate::ids::TermId {
    let symbol = ctx.intern_symbol(Symbol::new(IString::from(name), 0, TypeId::NONE));
    ctx.intern_term(TermData::Const(symbol))
  }

  fn unary(ctx: &mut Context, name: &str, arg: crate::ids::TermId) -> crate::ids::TermId {
    let symbol = ctx.intern_symbol(Symbol::new(IString::from(name), 1, TypeId::NONE));
    let head = ctx.intern_term(TermData::Const(symbol));
    ctx.intern_term(TermData::App { head, args: smallvec::smallvec![arg] })
  }

  fn binary(ctx: &mut Context, name: &str, left: crate::ids::TermId, right: crate::ids::TermId) -> crate::ids::TermId {
    let symbol = ctx.intern_symbol(Symbol::new(IString::from(name), 2, TypeId::NONE));
    let head = ctx.intern_term(TermData::Const(symbol));
    ctx.intern_term(TermData::App { head, args: smallvec::smallvec![left, right] })
  }

  /// S4: `{p(x) ∨ ¬p(f(y)), p(f(a))}` plus the negated goal `¬p(f(a))` refutes by superposing the
  /// unit fact into the goal and then resolving the resulting `true != true` literal away.
  #[test]
  fn s4_unit_resolution_style_refutation_via_superposition() {
    let mut ctx = Context::new();
    let truth = constant(&mut ctx, "$true");
    let a = constant(&mut ctx, "a");
    let x = ctx.intern_term(TermData::FreeVar(0));
    let y = ctx.intern_term(TermData::FreeVar(1));
    let fy = unary(&mut ctx, "f", y);
    let fa = unary(&mut ctx, "f", a);
    let p_x = unary(&mut ctx, "p", x);
    let p_fy = unary(&mut ctx, "p", fy);
    let p_fa = unary(&mut ctx, "p", fa);

    let disjunction = Clause::canonicalize(&mut ctx, vec![Literal::positive(p_x, truth), Literal::negative(p_fy, truth)]);
    let disjunction_id = ctx.intern_clause(disjunction);
    let fact = Clause::canonicalize(&mut ctx, vec![Literal::positive(p_fa, truth)]);
    let fact_id = ctx.intern_clause(fact);
    let goal = Clause::canonicalize(&mut ctx, vec![Literal::negative(p_fa, truth)]);
    let goal_id = ctx.intern_clause(goal);

    let mut saturation = Saturation::new(Precedence::new(), OrderingKind::Kbo, SelectionFunction::FirstNegative, Budget::default());
    saturation.add_initial(disjunction_id);
    saturation.add_initial(fact_id);
    saturation.add_initial(goal_id);
    assert!(matches!(saturation.run(&mut ctx), Outcome::Refutation { .. }));
  }

  /// S5: left-identity, left-inverse, and associativity for a group, plus the negated goal
  /// `e·e != e`, refutes via superposition (rewriting `e·e` to `e` using left-identity).
  #[test]
  fn s5_group_theory_unit_equations_refute_the_negated_goal() {
    let mut ctx = Context::new();
    let e = constant(&mut ctx, "e");
    let x = ctx.intern_term(TermData::FreeVar(0));
    let y = ctx.intern_term(TermData::FreeVar(1));
    let z = ctx.intern_term(TermData::FreeVar(2));

    let left_identity = Clause::canonicalize(&mut ctx, vec![Literal::positive(binary(&mut ctx, "*", e, x), x)]);
    let left_identity_id = ctx.intern_clause(left_identity);

    let inv_x = unary(&mut ctx, "i", x);
    let left_inverse = Clause::canonicalize(&mut ctx, vec![Literal::positive(binary(&mut ctx, "*", inv_x, x), e)]);
    let left_inverse_id = ctx.intern_clause(left_inverse);

    let xy = binary(&mut ctx, "*", x, y);
    let xy_z = binary(&mut ctx, "*", xy, z);
    let yz = binary(&mut ctx, "*", y, z);
    let x_yz = binary(&mut ctx, "*", x, yz);
    let associativity = Clause::canonicalize(&mut ctx, vec![Literal::positive(xy_z, x_yz)]);
    let associativity_id = ctx.intern_clause(associativity);

    let ee = binary(&mut ctx, "*", e, e);
    let goal = Clause::canonicalize(&mut ctx, vec![Literal::negative(ee, e)]);
    let goal_id = ctx.intern_clause(goal);

    let mut saturation = Saturation::new(Precedence::new(), OrderingKind::Kbo, SelectionFunction::SmallestNegative, Budget::default());
    saturation.add_initial(left_identity_id);
    saturation.add_initial(left_inverse_id);
    saturation.add_initial(associativity_id);
    saturation.add_initial(goal_id);
    assert!(matches!(saturation.run(&mut ctx), Outcome::Refutation { .. }));
  }

  /// S6: a 2-pigeon, 1-hole propositional pigeonhole instance (each `p(i, 1)` materialized as its
  /// own 0-ary constant) refutes within a small bounded step count -- a regression test for the
  /// given-clause heuristic not wasting the budget before finding the short refutation.
  #[test]
  fn s6_small_pigeonhole_refutes_within_a_bounded_step_count() {
    let mut ctx = Context::new();
    let truth = constant(&mut ctx, "$true");
    let p11 = constant(&mut ctx, "p11");
    let p21 = constant(&mut ctx, "p21");

    let pigeon_one = Clause::canonicalize(&mut ctx, vec![Literal::positive(p11, truth)]);
    let pigeon_one_id = ctx.intern_clause(pigeon_one);
    let pigeon_two = Clause::canonicalize(&mut ctx, vec![Literal::positive(p21, truth)]);
    let pigeon_two_id = ctx.intern_clause(pigeon_two);
    let at_most_one = Clause::canonicalize(&mut ctx, vec![Literal::negative(p11, truth), Literal::negative(p21, truth)]);
    let at_most_one_id = ctx.intern_clause(at_most_one);

    let budget = Budget { max_clauses: None, max_given_loops: Some(50) };
    let mut saturation = Saturation::new(Precedence::new(), OrderingKind::Kbo, SelectionFunction::FirstNegative, budget);
    saturation.add_initial(pigeon_one_id);
    saturation.add_initial(pigeon_two_id);
    saturation.add_initial(at_most_one_id);
    assert!(matches!(saturation.run(&mut ctx), Outcome::Refutation { .. }));
  }
}
