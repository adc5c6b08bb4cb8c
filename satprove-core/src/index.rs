/*!

The fingerprint term index (4.J), grounded in the "fingerprint unification" technique used by
production superposition provers: instead of testing every stored term against a query term with
full unification, each stored term is pre-summarized by a short vector of cheap *features* sampled
at a fixed set of tree positions, and a query term is summarized the same way. Two terms can only
unify (or match) if their feature vectors are *compatible* at every sampled position, so the index
only needs to return candidates whose feature vector passes a compatibility check -- an O(1)-ish
filter per candidate instead of a full unification attempt.

This is a filter, not a decision procedure: compatibility is necessary but not sufficient, so every
caller re-verifies each candidate with the real [`crate::unify`] routines. False positives just cost
a wasted unification attempt; false negatives would be unsound, so the feature comparison is
deliberately conservative (anything touching a variable is always "maybe compatible").

*/

use satprove_abs::FxHashMap;

use crate::context::Context;
use crate::ids::{SymbolId, TermId};
use crate::term::{PositionStep, TermData};

/// One sampled tree position's contribution to a term's fingerprint.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Feature {
  /// The subterm at this position is headed by this symbol.
  Symbol(SymbolId),
  /// The subterm at this position is a variable -- compatible with anything.
  Variable,
  /// This position does not exist in the term (an ancestor was a leaf) -- only compatible with
  /// `Variable` or another `NotExist`.
  NotExist,
}

impl Feature {
  fn compatible(&self, other: &Feature) -> bool {
    match (self, other) {
      (Feature::Variable, _) | (_, Feature::Variable) => true,
      (Feature::Symbol(a), Feature::Symbol(b)) => a == b,
      (Feature::NotExist, Feature::NotExist) => true,
      _ => false,
    }
  }
}

/// The fixed set of positions every fingerprint samples. Sampling the root, each of the first two
/// argument positions, and one level deeper under each catches most of the discriminating power a
/// larger position set would, at a fraction of the cost; the index degrades gracefully (it just
/// returns more false-positive candidates) if real terms are deeper than this set reaches.
fn sample_positions() -> Vec<Vec<PositionStep>> {
  vec![
    vec![],
    vec![PositionStep::Arg(0)],
    vec![PositionStep::Arg(1)],
    vec![PositionStep::Arg(0), PositionStep::Arg(0)],
    vec![PositionStep::Arg(1), PositionStep::Arg(0)],
  ]
}

pub type Fingerprint = smallvec::SmallVec<[Feature; 5]>;

fn feature_at(ctx: &Context, term: TermId, position: &[PositionStep]) -> Feature {
  match crate::term::subterm_at(term, position, &ctx.term_table_fn()) {
    None => Feature::NotExist,
    Some(subterm) => match ctx.term(subterm) {
      TermData::FreeVar(_) => Feature::Variable,
      TermData::Const(symbol) => Feature::Symbol(*symbol),
      TermData::App { head, .. } => match ctx.term(*head) {
        TermData::Const(symbol) => Feature::Symbol(*symbol),
        _ => Feature::Variable,
      },
      TermData::BoundVar(_) | TermData::Lambda { .. } => Feature::Variable,
    },
  }
}

pub fn fingerprint(ctx: &Context, term: TermId) -> Fingerprint {
  sample_positions().iter().map(|position| feature_at(ctx, term, position)).collect()
}

/// An index from fingerprinted terms to arbitrary payloads `V` (in this crate, always a
/// `(ClauseId, literal index, within-literal side)` triple identifying where the indexed term
/// lives). Organized as one bucket per distinct fingerprint rather than a trie, trading a larger
/// bucket count for a much simpler (and, for the small fixed-size fingerprints used here, just as
/// fast) implementation.
#[derive(Default)]
pub struct FingerprintIndex<V> {
  buckets: FxHashMap<Fingerprint, Vec<(TermId, V)>>,
}

impl<V: Clone> FingerprintIndex<V> {
  pub fn new() -> Self {
    Self { buckets: FxHashMap::default() }
  }

  pub fn insert(&mut self, ctx: &Context, term: TermId, value: V) {
    let key = fingerprint(ctx, term);
    self.buckets.entry(key).or_default().push((term, value));
  }

  pub fn remove(&mut self, ctx: &Context, term: TermId, matches: impl Fn(&V) -> bool) {
    let key = fingerprint(ctx, term);
    if let Some(bucket) = self.buckets.get_mut(&key) {
      bucket.retain(|(t, v)| !(*t == term && matches(v)));
    }
  }

  /// All `(term, value)` pairs whose fingerprint is *compatible* with `query`'s -- a superset of
  /// the terms that actually unify/match with `query`. Every result still needs real verification.
  pub fn candidates(&self, ctx: &Context, query: TermId) -> Vec<(TermId, V)> {
    let query_fp = fingerprint(ctx, query);
    let mut result = Vec::new();
    for (key, bucket) in &self.buckets {
      if key.iter().zip(query_fp.iter()).all(|(a, b)| a.compatible(b)) {
        result.extend(bucket.iter().cloned());
      }
    }
    result
  }

  pub fn len(&self) -> usize {
    self.buckets.values().map(|b| b.len()).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn clear(&mut self) {
    self.buckets.clear();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ids::TypeId;
  use crate::symbol::Symbol;
  use satprove_abs::IString;

  #[test]
  fn variable_query_is_compatible_with_any_symbol() {
    let mut ctx = Context::new();
    let f = ctx.intern_symbol(Symbol::new(IString::from("f"), 0, TypeId::NONE));
    let f_term = ctx.intern_term(TermData::Const(f));
    let var_term = ctx.intern_term(TermData::FreeVar(0));

    let mut index = FingerprintIndex::new();
    index.insert(&ctx, f_term, 1u32);
    let candidates = index.candidates(&ctx, var_term);
    assert_eq!(candidates.len(), 1);
  }

  #[test]
  fn distinct_ground_symbols_are_filtered_out() {
    let mut ctx = Context::new();
    let f = ctx.intern_symbol(Symbol::new(IString::from("f"), 0, TypeId::NONE));
    let g = ctx.intern_symbol(Symbol::new(IString::from("g"), 0, TypeId::NONE));
    let f_term = ctx.intern_term(TermData::Const(f));
    let g_term = ctx.intern_term(TermData::Const(g));

    let mut index = FingerprintIndex::new();
    index.insert(&ctx, f_term, 1u32);
    let candidates = index.candidates(&ctx, g_term);
    assert!(candidates.is_empty());
  }

  #[test]
  fn remove_drops_only_the_matching_entry() {
    let mut ctx = Context::new();
    let f = ctx.intern_symbol(Symbol::new(IString::from("f"), 0, TypeId::NONE));
    let f_term = ctx.intern_term(TermData::Const(f));

    let mut index = FingerprintIndex::new();
    index.insert(&ctx, f_term, 1u32);
    index.insert(&ctx, f_term, 2u32);
    index.remove(&ctx, f_term, |v| *v == 1u32);
    assert_eq!(index.len(), 1);
  }
}
