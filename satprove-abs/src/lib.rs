/*!

Types and type aliases that abstract over the implementing backing type, shared between
`satprove-core` and (eventually) its external collaborators.

# Background and Motivation

A motivating example is the `IString` type, an interned string type. A number of external crates
could provide this functionality. This module redirects to whatever chosen implementation we want.
For types or infrastructure with very different backing implementations, we define an abstraction
layer over the implementation rather than redirect a single alias — `NatSet` is implemented in
terms of `bit_set::BitSet` here, but nothing outside this module needs to know that.

*/

mod index_set;
mod istring;
mod nat_set;
mod partial_ordering;
mod special_index;

pub use index_set::IndexSet;
pub use istring::IString;
pub use nat_set::NatSet;
pub use partial_ordering::{reverse, PartialOrdering};
pub use special_index::{InnerIndexType, OuterEnumType, SpecialIndex};

// Re-exported so dependent crates do not need to depend on `tracing` directly just to write
// `#[tracing::instrument]` or call `tracing::debug!` inside `satprove-core`.
pub use tracing;

// A fast, non-cryptographic hasher used for intern tables. Equivalent-content terms/clauses are
// deduplicated by full `Eq`, so the only property this hasher needs is speed and reasonably low
// collision rates on integer/enum-shaped keys -- it's never adversary-facing.
pub use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
