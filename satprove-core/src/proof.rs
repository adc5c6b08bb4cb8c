/*!

The proof DAG (4.N): every interned clause that has ever been derived keeps a [`ProofStep`]
recording which rule produced it and from which parent clauses, so a refutation (the derivation of
the empty clause) can be walked back to the initial clauses that caused it. Clause content itself
(4.H) carries no parentage -- two different derivations of the same clause content still intern to
one `ClauseId`, but each derivation gets its own `ProofStep` if this is the first time that content
was produced via that particular rule and parent set, matching the teacher's distinction between
"the data" and "how the data arose."

Modeled closely on the proof-step design used by Vampire-family and Lean-adjacent resolution
provers: a small closed `Rule` enum naming every way a clause can be derived, `premises()` exposing
the parent clauses generically (so proof search/printing code doesn't need a `match` per rule), and
running `proof_size`/`depth` counters so the saturation loop can prefer shallow, small proofs when
more than one refutation is available.

*/

use smallvec::SmallVec;

use crate::ids::ClauseId;
use crate::subst::Subst;
use crate::term::Position;

#[derive(Clone, Debug)]
pub enum Rule {
  /// Not derived; one of the clauses the problem was seeded with (4.O's `add_initial`).
  Assumption,
  /// `from`'s literal `from_literal` (an equation) rewrote `into`'s literal `into_literal` at
  /// `position`; `ProofStep::substitution` carries the unifier the step used.
  Superposition { from: ClauseId, from_literal: usize, into: ClauseId, into_literal: usize, position: Position },
  EqualityResolution { parent: ClauseId },
  EqualityFactoring { parent: ClauseId },
  Demodulation { parent: ClauseId, rewrite_rules: SmallVec<[ClauseId; 2]> },
  SimplifyReflect { parent: ClauseId, rewrite_rules: SmallVec<[ClauseId; 2]> },
  /// Retained for bookkeeping even though a subsumed clause is dropped rather than kept active --
  /// recording it lets a proof/trace consumer explain why a clause disappeared.
  Subsumed { parent: ClauseId, subsumer: ClauseId },
  /// A clause produced or approved by a plugin hook (4.O) rather than a rule in this crate.
  External { parents: SmallVec<[ClauseId; 4]>, description: String },
}

impl Rule {
  /// The clauses this rule consumed to produce its conclusion, in no particular order.
  pub fn premises(&self) -> SmallVec<[ClauseId; 4]> {
    match self {
      Rule::Assumption => SmallVec::new(),
      Rule::Superposition { from, into, .. } => SmallVec::from_slice(&[*from, *into]),
      Rule::EqualityResolution { parent } | Rule::EqualityFactoring { parent } => SmallVec::from_slice(&[*parent]),
      Rule::Demodulation { parent, rewrite_rules } | Rule::SimplifyReflect { parent, rewrite_rules } => {
        let mut premises = SmallVec::from_slice(&[*parent]);
        premises.extend(rewrite_rules.iter().copied());
        premises
      }
      Rule::Subsumed { parent, subsumer } => SmallVec::from_slice(&[*parent, *subsumer]),
      Rule::External { parents, .. } => parents.clone(),
    }
  }

  pub fn name(&self) -> &'static str {
    match self {
      Rule::Assumption => "assumption",
      Rule::Superposition { .. } => "superposition",
      Rule::EqualityResolution { .. } => "equality_resolution",
      Rule::EqualityFactoring { .. } => "equality_factoring",
      Rule::Demodulation { .. } => "demodulation",
      Rule::SimplifyReflect { .. } => "simplify_reflect",
      Rule::Subsumed { .. } => "subsumed",
      Rule::External { .. } => "external",
    }
  }
}

#[derive(Clone, Debug)]
pub struct ProofStep {
  pub conclusion : ClauseId,
  pub rule       : Rule,
  /// The unifier/matcher computed by the rule, kept for proof-checking/pretty-printing hooks (4.O)
  /// that want to replay or display the exact instantiation, not just the rule name and premises.
  pub substitution: Option<Subst>,
  pub proof_size : u32,
  pub depth      : u32,
}

impl ProofStep {
  pub fn assumption(conclusion: ClauseId) -> Self {
    ProofStep { conclusion, rule: Rule::Assumption, substitution: None, proof_size: 1, depth: 0 }
  }

  pub fn premises(&self) -> SmallVec<[ClauseId; 4]> {
    self.rule.premises()
  }
}

/// The full derivation history of a saturation run: every `ProofStep` ever produced, indexed by
/// conclusion. Unlike `Context`'s intern tables, a `Proof` only ever grows during one `saturate`
/// call -- it's cleared only by `Context::clear`, alongside everything else.
#[derive(Default)]
pub struct Proof {
  steps: Vec<ProofStep>,
}

impl Proof {
  pub fn new() -> Self {
    Self::default()
  }

  /// Records `step`, computing its `proof_size`/`depth` from the already-recorded steps at
  /// `premise_indices` (every premise must have been recorded first -- the saturation loop never
  /// reorders this).
  pub fn record(&mut self, mut step: ProofStep, premise_indices: &[usize]) -> usize {
    let proof_size: u32 = 1 + premise_indices.iter().map(|&i| self.steps[i].proof_size).sum::<u32>();
    let depth = 1 + premise_indices.iter().map(|&i| self.steps[i].depth).max().unwrap_or(0);
    step.proof_size = proof_size;
    step.depth = depth;
    let index = self.steps.len();
    self.steps.push(step);
    index
  }

  pub fn step(&self, index: usize) -> &ProofStep {
    &self.steps[index]
  }

  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }

  /// Walks back from `conclusion`'s step to every transitive premise, returning the set of
  /// `ProofStep` indices involved -- the subset a refutation's proof consists of, once a consumer
  /// (4.O's pretty-printing hook, out of scope here) wants to render only the relevant steps.
  pub fn ancestry(&self, conclusion_index: usize) -> Vec<usize> {
    let mut visited = std::collections::BTreeSet::new();
    let mut stack = vec![conclusion_index];
    while let Some(index) = stack.pop() {
      if !visited.insert(index) {
        continue;
      }
      let step = &self.steps[index];
      for premise in step.premises() {
        if let Some(premise_index) = self.steps.iter().position(|s| s.conclusion == premise) {
          stack.push(premise_index);
        }
      }
    }
    visited.into_iter().collect()
  }
}
