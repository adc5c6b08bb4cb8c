/*!

A `SpecialIndex<N, E, const RESERVED: u8>`, where `N` is an unsigned integer type and `E` is an
enum that implements `From<N>`/`TryFrom<N>`, acts like the integer type `N` but can encode the
variants of `E` in the largest values representable by `N` (`N::MAX`, `N::MAX - 1`, ...).

The idea is that `SpecialIndex<N, E, RESERVED>` can represent `N::MAX - RESERVED + 1` ordinary
index values, where `RESERVED` is the number of variants of `E`. A value `e: E` converts to some
number in `0..RESERVED`; internally `e` is stored as `N::MAX - e.into()`.

`satprove-core` uses this for `VariableIndex` (an ordinary variable slot, or the sentinel `None`)
and for `TermId`/`ClauseId` style handles that want a distinguished "not yet assigned" value
without growing to `Option<Handle>` (which on some of these types would double the size).

*/

use std::{
  cmp::Ordering,
  fmt::{Debug, Display, Formatter},
  marker::PhantomData,
};
use num_traits::{Bounded, ConstOne, ConstZero, Unsigned};

pub trait InnerIndexType:
  Unsigned + Bounded + PartialOrd + Ord + PartialEq + Eq + From<u8> + Copy + Into<u64> + ConstZero + ConstOne
{}

impl<T> InnerIndexType for T
    where T: Unsigned + Bounded + PartialOrd + Ord + PartialEq + Eq + From<u8> + Copy + Into<u64> + ConstZero + ConstOne
{}

pub trait OuterEnumType<N: InnerIndexType>: TryFrom<N> + Into<N> + Copy + PartialEq + Eq {}

/// Parameterized by an integral type `N` and an enum `E` convertible to/from `N`,
/// `SpecialIndex<N, E, RESERVED>` represents either an `N` (for most values of `N`) or an `E`.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct SpecialIndex<N, E, const RESERVED: u8>
    where E: OuterEnumType<N>, N: InnerIndexType
{
  inner   : N,
  _phantom: PhantomData<E>,
}

impl<N, E, const RESERVED: u8> SpecialIndex<N, E, RESERVED>
    where E: OuterEnumType<N>, N: InnerIndexType
{
  /// Unchecked creation from an index of type `N`. Safe, but may alias an enum-variant
  /// representation if `index` falls within the reserved top `RESERVED` values.
  #[inline(always)]
  pub const fn new(index: N) -> Self {
    SpecialIndex { inner: index, _phantom: PhantomData }
  }

  pub fn from_variant(variant: E) -> Self {
    SpecialIndex { inner: Self::encode_enum(variant), _phantom: PhantomData }
  }

  /// Checks if `self` represents variant `variant` of `E`.
  #[inline(always)]
  pub fn is(&self, variant: E) -> bool {
    self.inner == Self::encode_enum(variant)
  }

  #[inline(always)]
  pub fn is_index(&self) -> bool {
    self.inner < N::max_value() - RESERVED.into() + N::ONE
  }

  /// Checked access to the index value.
  #[inline(always)]
  pub fn get(&self) -> Option<N> {
    if self.is_index() { Some(self.inner) } else { None }
  }

  /// Unchecked access to the index value as a `usize`.
  #[inline(always)]
  pub fn idx(&self) -> usize {
    debug_assert!(self.is_index(), "called idx() on a non-index SpecialIndex");
    self.inner.into() as usize
  }

  #[inline(always)]
  fn encode_enum(variant: E) -> N {
    N::max_value() - variant.into()
  }

  /// Checked conversion into an enum variant.
  pub fn variant(&self) -> Option<E> {
    E::try_from(N::max_value() - self.inner).ok()
  }
}

impl<N, E, const RESERVED: u8> SpecialIndex<N, E, RESERVED>
    where E: OuterEnumType<N>, N: InnerIndexType + TryFrom<usize>
{
  /// Creation from a `usize`. Debug-asserts that the value fits in `N` and is a true index (not
  /// one of the top `RESERVED` sentinel values).
  #[inline(always)]
  pub fn from_usize(index: usize) -> Self {
    let result: Result<N, _> = index.try_into();
    debug_assert!(result.is_ok(), "SpecialIndex::from_usize: value does not fit in N");
    let inner = result.ok().unwrap();
    debug_assert!(inner < N::max_value() - RESERVED.into() + N::ONE, "SpecialIndex::from_usize: value collides with a reserved sentinel");
    SpecialIndex { inner, _phantom: PhantomData }
  }
}

impl<N, E, const RESERVED: u8> Display for SpecialIndex<N, E, RESERVED>
    where E: OuterEnumType<N> + Display, N: InnerIndexType + Display
{
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.variant() {
      Some(variant) => Display::fmt(&variant, f),
      None          => Display::fmt(&self.inner, f),
    }
  }
}

impl<N, E, const RESERVED: u8> Debug for SpecialIndex<N, E, RESERVED>
    where E: OuterEnumType<N> + Debug, N: InnerIndexType + Debug
{
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.variant() {
      Some(variant) => Debug::fmt(&variant, f),
      None          => Debug::fmt(&self.inner, f),
    }
  }
}

impl<N, E, const RESERVED: u8> Ord for SpecialIndex<N, E, RESERVED>
    where E: OuterEnumType<N> + Ord, N: InnerIndexType
{
  fn cmp(&self, other: &Self) -> Ordering {
    // Every index is greater than every sentinel variant.
    match (self.variant(), other.variant()) {
      (Some(a), Some(b)) => a.cmp(&b),
      (Some(_), None)    => Ordering::Less,
      (None, Some(_))    => Ordering::Greater,
      (None, None)       => self.inner.cmp(&other.inner),
    }
  }
}

impl<N, E, const RESERVED: u8> PartialOrd for SpecialIndex<N, E, RESERVED>
    where E: OuterEnumType<N> + Ord, N: InnerIndexType
{
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl<N, E, const RESERVED: u8> Default for SpecialIndex<N, E, RESERVED>
    where E: OuterEnumType<N>, N: InnerIndexType
{
  /// Defaults to the first reserved sentinel value (conventionally "unset").
  fn default() -> Self {
    Self { inner: N::max_value(), _phantom: PhantomData }
  }
}

impl<N, E, const RESERVED: u8> From<E> for SpecialIndex<N, E, RESERVED>
    where E: OuterEnumType<N>, N: InnerIndexType
{
  #[inline(always)]
  fn from(value: E) -> Self {
    Self::from_variant(value)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Copy, Clone, PartialEq, Eq, Debug, Ord, PartialOrd)]
  enum Sentinel { None }

  impl TryFrom<u32> for Sentinel {
    type Error = ();
    fn try_from(value: u32) -> Result<Self, Self::Error> {
      if value == 0 { Ok(Sentinel::None) } else { Err(()) }
    }
  }
  impl From<Sentinel> for u32 {
    fn from(_: Sentinel) -> Self { 0 }
  }
  impl OuterEnumType<u32> for Sentinel {}

  type Idx = SpecialIndex<u32, Sentinel, 1>;

  #[test]
  fn index_round_trips() {
    let i = Idx::from_usize(42);
    assert!(i.is_index());
    assert_eq!(i.idx(), 42);
  }

  #[test]
  fn sentinel_is_not_an_index() {
    let s = Idx::from_variant(Sentinel::None);
    assert!(!s.is_index());
    assert!(s.is(Sentinel::None));
    assert_eq!(s.variant(), Some(Sentinel::None));
  }

  #[test]
  fn default_is_sentinel() {
    let d = Idx::default();
    assert!(d.is(Sentinel::None));
  }

  #[test]
  fn ordering_places_sentinels_before_indices() {
    let s = Idx::from_variant(Sentinel::None);
    let i = Idx::from_usize(0);
    assert!(s < i);
  }
}
