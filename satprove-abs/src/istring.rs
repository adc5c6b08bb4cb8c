/*!

Interned string type. A number of external crates could provide this functionality; this module
redirects to whatever chosen implementation we want. We use the [`ustr` crate](https://crates.io/crates/ustr),
whose `Ustr` is `Copy`, globally cached, and compares in O(1).

If we wanted to swap backing crates later (e.g. to `string_cache`), only this module changes.

*/

pub use ustr::Ustr as IString;
