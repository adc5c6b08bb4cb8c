/*!

Literals (4.G): an oriented equation `left (=|!=) right`, where an ordinary atom `P(t1, ..., tn)` is
represented as the equation `P(t1, ..., tn) = $true` (negated atoms as `!=`). This "everything is an
equation" encoding is what lets superposition, equality resolution, and equality factoring be the
only inference rules needed to handle both equality and ordinary predicate reasoning.

A literal caches its two sides' term-ordering comparison (computed by whichever ordering the
`Context`'s active `Precedence` implements) because it's recomputed on every maximality check during
selection and superposition; the cache is invalidated whenever `Context::precedence_generation`
changes underneath it, so a stale comparison is never silently reused after symbols are reordered.

*/

use std::cell::Cell;
use std::cmp::Ordering;

use crate::context::Context;
use crate::ids::TermId;
use crate::order::{OrderingKind, Precedence};

#[derive(Clone, Debug)]
pub struct Literal {
  polarity: bool,
  left    : TermId,
  right   : TermId,
  /// `(precedence_generation, cached comparison of left vs. right)`.
  order_cache: Cell<Option<(u64, Option<Ordering>)>>,
}

impl Literal {
  pub fn new(polarity: bool, left: TermId, right: TermId) -> Self {
    Literal { polarity, left, right, order_cache: Cell::new(None) }
  }

  pub fn positive(left: TermId, right: TermId) -> Self {
    Literal::new(true, left, right)
  }

  pub fn negative(left: TermId, right: TermId) -> Self {
    Literal::new(false, left, right)
  }

  #[inline(always)]
  pub fn is_positive(&self) -> bool {
    self.polarity
  }

  #[inline(always)]
  pub fn is_negative(&self) -> bool {
    !self.polarity
  }

  #[inline(always)]
  pub fn left(&self) -> TermId {
    self.left
  }

  #[inline(always)]
  pub fn right(&self) -> TermId {
    self.right
  }

  pub fn negate(&self) -> Literal {
    Literal::new(!self.polarity, self.left, self.right)
  }

  /// A literal `t = t` (reflexive, any polarity) is trivially true when positive and trivially
  /// false when negative; positive reflexive literals make their whole clause a tautology (4.L),
  /// negative ones are removed by equality resolution against nothing (4.K).
  pub fn is_syntactically_reflexive(&self) -> bool {
    self.left == self.right
  }

  /// Compares `left` and `right` under `precedence`, using and refreshing the cache as needed.
  pub fn ordering(&self, ctx: &Context, precedence: &Precedence, ordering: OrderingKind) -> Option<Ordering> {
    let generation = ctx.precedence_generation();
    if let Some((cached_generation, cached)) = self.order_cache.get() {
      if cached_generation == generation {
        return cached;
      }
    }
    let cmp = ordering.compare(ctx, precedence, self.left, self.right);
    self.order_cache.set(Some((generation, cmp)));
    cmp
  }
}

impl PartialEq for Literal {
  fn eq(&self, other: &Self) -> bool {
    self.polarity == other.polarity && self.left == other.left && self.right == other.right
  }
}
impl Eq for Literal {}

impl std::hash::Hash for Literal {
  fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
    self.polarity.hash(state);
    self.left.hash(state);
    self.right.hash(state);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn negate_flips_polarity_and_keeps_sides() {
    let left = TermId::from_usize(1);
    let right = TermId::from_usize(2);
    let literal = Literal::positive(left, right);
    let negated = literal.negate();
    assert!(negated.is_negative());
    assert_eq!(negated.left(), left);
    assert_eq!(negated.right(), right);
  }

  #[test]
  fn reflexive_literal_is_detected() {
    let t = TermId::from_usize(5);
    assert!(Literal::positive(t, t).is_syntactically_reflexive());
    assert!(!Literal::positive(t, TermId::from_usize(6)).is_syntactically_reflexive());
  }

  #[test]
  fn equality_ignores_order_cache_state() {
    let a = Literal::positive(TermId::from_usize(1), TermId::from_usize(2));
    let b = Literal::positive(TermId::from_usize(1), TermId::from_usize(2));
    assert_eq!(a, b);
  }
}
