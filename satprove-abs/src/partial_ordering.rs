/*!

The orderings in `satprove-core` (KBO, RPO, the literal/clause multiset order) are not total, so
we represent a comparison result as `Option<std::cmp::Ordering>`: `None` means *incomparable*, not
*unknown* — for a reduction ordering restricted to ground terms it is total, but non-ground terms
routinely compare incomparably, and callers must treat that as a real outcome, not a missing
computation.

This module gives that convention a name (`PartialOrdering`) instead of threading raw
`Option<Ordering>` through every signature unannotated.

*/

use std::cmp::Ordering;

#[allow(non_snake_case)]
pub mod PartialOrdering {
  #![allow(non_upper_case_globals)]

  use std::cmp::Ordering;

  pub const Greater     : Option<Ordering> = Some(Ordering::Greater);
  pub const Less        : Option<Ordering> = Some(Ordering::Less);
  pub const Equal       : Option<Ordering> = Some(Ordering::Equal);
  pub const Incomparable: Option<Ordering> = None;

  #[inline(always)]
  pub fn from_ordering(value: Ordering) -> Option<Ordering> {
    Some(value)
  }
}

/// Flip a comparison as seen from the other argument order: `Less` becomes `Greater` and vice
/// versa, `Equal`/`Incomparable` are unaffected.
#[inline(always)]
pub fn reverse(cmp: Option<Ordering>) -> Option<Ordering> {
  cmp.map(Ordering::reverse)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reverse_flips_less_and_greater() {
    assert_eq!(reverse(PartialOrdering::Less), PartialOrdering::Greater);
    assert_eq!(reverse(PartialOrdering::Greater), PartialOrdering::Less);
    assert_eq!(reverse(PartialOrdering::Equal), PartialOrdering::Equal);
    assert_eq!(reverse(PartialOrdering::Incomparable), PartialOrdering::Incomparable);
  }
}
