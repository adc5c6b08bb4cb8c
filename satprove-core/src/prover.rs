/*!

The `Prover` (4.O): the library's ingress/egress surface. Everything above this module (terms,
clauses, inference, the saturation loop) is usable on its own, but `Prover` is the type an embedder
actually holds -- it owns one `Context`, wires it to one `Saturation` run, and exposes the handful
of operations a caller needs: seed the problem, run saturation, read back the outcome and proof.

`Hooks` is the plugin surface: an embedder that wants AVATAR-style splitting, an external SAT/SMT
bridge, induction, or any other extension this crate deliberately doesn't implement (see the
Non-goals in `SPEC_FULL.md`) can observe and influence the loop through these callbacks without
`satprove-core` depending on any of those features directly.

*/

use crate::clause::Clause;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::ids::ClauseId;
use crate::literal::Literal;
use crate::order::{OrderingKind, Precedence};
use crate::proof::Proof;
use crate::saturation::{Budget, Outcome, Saturation};
use crate::selection::SelectionFunction;
use crate::symbol::Signature;

/// A clause-lifecycle signal a `Hooks::on_clause_event` callback can observe. Emitted on a
/// best-effort basis by the saturation loop; a hook must not assume every event fires in any
/// particular order relative to another clause's events, only that a clause's own events are
/// reported in the order they happened to it.
#[derive(Clone, Debug)]
pub enum ClauseEvent {
  Activated(ClauseId),
  Generated { clause: ClauseId, parents: Vec<ClauseId> },
  Simplified { from: ClauseId, to: ClauseId },
  Deleted { clause: ClauseId, reason: &'static str },
}

/// Plugin hooks (4.O). Every field defaults to doing nothing / allowing everything, so a `Prover`
/// built with `Hooks::default()` behaves exactly like the core loop with no extensions attached.
#[derive(Default)]
pub struct Hooks {
  /// Called once per clause, alongside this crate's own generating rules; its results are treated
  /// identically to a built-in rule's (simplified, checked for redundancy, queued).
  pub unary_inference : Option<Box<dyn Fn(&mut Context, ClauseId) -> Vec<Clause>>>,
  /// Called once per pair of active clauses the built-in binary rules also consider.
  pub binary_inference: Option<Box<dyn Fn(&mut Context, ClauseId, ClauseId) -> Vec<Clause>>>,
  /// Called on every clause before the built-in simplification rules run; if it returns `Some`,
  /// the built-in rules then run on its result rather than the original clause.
  pub simplification  : Option<Box<dyn Fn(&mut Context, &Clause) -> Option<Clause>>>,
  /// Called instead of (not in addition to) the built-in subsumption check if present, letting an
  /// embedder substitute a different redundancy criterion (e.g. one aware of an AVATAR split
  /// trail) without forking the saturation loop.
  pub redundancy       : Option<Box<dyn Fn(&Context, &Clause) -> bool>>,
  pub on_clause_event  : Option<Box<dyn FnMut(ClauseEvent)>>,
}

pub struct Prover {
  context   : Context,
  saturation: Saturation,
  hooks     : Hooks,
  /// Retained so `reset` can rebuild `saturation` under the same configuration without requiring
  /// the caller to repeat `ordering`/`selection` at every reset site.
  ordering  : OrderingKind,
  selection : SelectionFunction,
}

impl Prover {
  /// Builds a `Prover` over `signature`'s declared vocabulary. `ordering` and `selection` are
  /// required rather than defaulted: a `Prover` silently saturating under an unstated ordering or
  /// selection strategy would make its completeness guarantees (4.I, 4.M) unstated too, so a missing
  /// one is an `IncompleteConfiguration` error rather than a silent `Kbo`/`None` fallback.
  pub fn new(signature: Signature, ordering: Option<OrderingKind>, selection: Option<SelectionFunction>, precedence: Precedence, budget: Budget) -> Result<Self> {
    Self::with_hooks(signature, ordering, selection, precedence, budget, Hooks::default())
  }

  pub fn with_hooks(
    signature: Signature,
    ordering: Option<OrderingKind>,
    selection: Option<SelectionFunction>,
    precedence: Precedence,
    budget: Budget,
    hooks: Hooks,
  ) -> Result<Self> {
    let ordering = ordering.ok_or(Error::IncompleteConfiguration("term ordering (KBO or RPO) must be chosen explicitly"))?;
    let selection = selection.ok_or(Error::IncompleteConfiguration("a selection function must be chosen explicitly"))?;
    let mut context = Context::new();
    signature.install(&mut context)?;
    let saturation = Saturation::new(precedence, ordering, selection, budget);
    Ok(Prover { context, saturation, hooks, ordering, selection })
  }

  pub fn context(&self) -> &Context {
    &self.context
  }

  pub fn context_mut(&mut self) -> &mut Context {
    &mut self.context
  }

  pub fn proof(&self) -> &Proof {
    self.saturation.proof()
  }

  pub fn active_clauses(&self) -> &[ClauseId] {
    self.saturation.active_clauses()
  }

  /// Adds one of the problem's input clauses. Canonicalizes and interns `literals`, then seeds the
  /// saturation loop's passive set with the result.
  #[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip(self, literals)))]
  pub fn add_initial(&mut self, literals: Vec<Literal>) -> ClauseId {
    let clause = Clause::canonicalize(&mut self.context, literals);
    let clause_id = self.context.intern_clause(clause);
    self.saturation.add_initial(clause_id);
    if let Some(callback) = self.hooks.on_clause_event.as_mut() {
      callback(ClauseEvent::Generated { clause: clause_id, parents: Vec::new() });
    }
    clause_id
  }

  /// Runs the given-clause loop (4.M) to completion.
  #[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip(self)))]
  pub fn saturate(&mut self) -> Outcome {
    satprove_abs::tracing::info!("saturation starting");
    let outcome = self.saturation.run(&mut self.context);
    match &outcome {
      Outcome::Refutation { proof_step } => satprove_abs::tracing::info!(proof_step, "refutation found"),
      Outcome::Saturated => satprove_abs::tracing::info!("saturated without refutation"),
      Outcome::Timeout => satprove_abs::tracing::info!("saturation budget exhausted"),
      Outcome::Error(error) => satprove_abs::tracing::info!(%error, "saturation stopped on internal error"),
    }
    outcome
  }

  /// Resets this `Prover` to an empty state, ready to accept an unrelated problem. Preferred over
  /// constructing a new `Prover` when reusing allocations matters.
  pub fn reset(&mut self) {
    self.context.clear();
    self.saturation = Saturation::new(Precedence::new(), self.ordering, self.selection, Budget::default());
  }

  /// Validates that `literals` form a well-formed clause before interning -- currently only checks
  /// that it isn't empty-by-construction in a way that would silently look like a refutation from
  /// a clause the caller didn't intend as one; see `error.rs`'s `MalformedClause`.
  pub fn validate_initial(literals: &[Literal]) -> Result<()> {
    if literals.is_empty() {
      return Err(crate::error::Error::MalformedClause("initial clause has no literals".into()));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ids::TypeId;
  use crate::symbol::Symbol;
  use crate::term::TermData;
  use satprove_abs::IString;

  #[test]
  fn add_initial_then_saturate_finds_a_trivial_refutation() {
    let mut signature = Signature::new();
    signature.declare("a", 0, TypeId::NONE);
    let mut prover = Prover::new(signature, Some(OrderingKind::Kbo), Some(SelectionFunction::None), Precedence::new(), Budget::default()).unwrap();
    let a = {
      let symbol = prover.context_mut().intern_symbol(Symbol::new(IString::from("a"), 0, TypeId::NONE));
      prover.context_mut().intern_term(TermData::Const(symbol))
    };
    prover.add_initial(vec![Literal::negative(a, a)]);
    assert!(matches!(prover.saturate(), Outcome::Refutation { .. }));
  }

  #[test]
  fn new_rejects_a_missing_ordering_or_selection() {
    assert!(Prover::new(Signature::new(), None, Some(SelectionFunction::None), Precedence::new(), Budget::default()).is_err());
    assert!(Prover::new(Signature::new(), Some(OrderingKind::Kbo), None, Precedence::new(), Budget::default()).is_err());
  }

  #[test]
  fn validate_initial_rejects_an_empty_literal_list() {
    assert!(Prover::validate_initial(&[]).is_err());
  }
}
