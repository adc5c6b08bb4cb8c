/*!

Symbols (4.A): the named function/predicate/constant vocabulary of a problem. A `Symbol` pairs an
interned name with an arity and a small set of attributes that influence ordering, selection, and
clause normalization but never the symbol's identity -- two symbols with the same name and arity
are the same symbol, attributes and all, because attributes are set once at declaration time and
`Context::declare_symbol` merges rather than shadows.

*/

use std::hash::{Hash, Hasher};
use enumflags2::{bitflags, BitFlags};
use satprove_abs::{FxHasher, IString};

use crate::context::Context;
use crate::error::Result;
use crate::ids::{SymbolId, TypeId};

/// Function/predicate/constant arity. `Predicate` symbols have a dedicated boolean-sort result type
/// rather than carrying a distinguished `Arity::Predicate` variant -- arity alone is just "how many
/// arguments", as the spec's glossary intends.
pub type Arity = u32;

#[bitflags]
#[repr(u8)]
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SymbolAttribute {
  /// Introduced by Skolemization; never chosen as the maximal side of an oriented equation if
  /// avoidable, and a natural candidate for special selection treatment.
  Skolem,
  /// Introduced by clause splitting (for an AVATAR-style hook; the core loop never sets this
  /// itself, only the bit exists so a splitting hook can mark its output).
  Split,
  /// A binder symbol (e.g. a higher-order lambda/forall encoding), relevant only once higher-order
  /// inference rules exist; the bit is recognized now so term construction can validate it.
  Binder,
  /// Rendered/parsed infix; purely a presentation hint, never consulted by any inference rule.
  Infix,
  /// Associative-commutative; AC symbols require AC-aware unification and ordering extensions that
  /// are out of scope, but the flag is retained so a plugin can detect and reject/handle them.
  AC,
  /// Commutative (but not necessarily associative).
  Commutative,
  /// A fresh constant introduced during proof search (e.g. by equality factoring bookkeeping or a
  /// splitting hook), distinct from a constant appearing in the original problem.
  FreshConstant,
}

pub type SymbolAttributes = BitFlags<SymbolAttribute>;

#[derive(Clone, Debug)]
pub struct Symbol {
  name      : IString,
  arity     : Arity,
  sort      : TypeId,
  attributes: SymbolAttributes,
  /// Precomputed so that `Symbol` comparisons used by interning and by ordering's precedence
  /// lookups are O(1) rather than re-hashing `name` every time.
  hash_value: u64,
}

impl Symbol {
  pub fn new(name: IString, arity: Arity, sort: TypeId) -> Self {
    Symbol::with_attributes(name, arity, sort, SymbolAttributes::empty())
  }

  pub fn with_attributes(name: IString, arity: Arity, sort: TypeId, attributes: SymbolAttributes) -> Self {
    let mut hasher = FxHasher::default();
    name.hash(&mut hasher);
    arity.hash(&mut hasher);
    let hash_value = hasher.finish();
    Symbol { name, arity, sort, attributes, hash_value }
  }

  #[inline(always)]
  pub fn name(&self) -> IString {
    self.name
  }

  #[inline(always)]
  pub fn arity(&self) -> Arity {
    self.arity
  }

  #[inline(always)]
  pub fn sort(&self) -> TypeId {
    self.sort
  }

  #[inline(always)]
  pub fn attributes(&self) -> SymbolAttributes {
    self.attributes
  }

  #[inline(always)]
  pub fn has_attribute(&self, attribute: SymbolAttribute) -> bool {
    self.attributes.contains(attribute)
  }

  pub fn set_attribute(&mut self, attribute: SymbolAttribute) {
    self.attributes.insert(attribute);
  }

  #[inline(always)]
  pub fn is_constant(&self) -> bool {
    self.arity == 0
  }
}

impl PartialEq for Symbol {
  fn eq(&self, other: &Self) -> bool {
    self.hash_value == other.hash_value && self.name == other.name && self.arity == other.arity
  }
}
impl Eq for Symbol {}

impl Hash for Symbol {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.hash_value.hash(state);
  }
}

/// A problem's declared vocabulary (4.A): a map from symbol name/arity/sort to `SymbolId`, built up
/// before a `Prover` is constructed and installed into its `Context` in one pass. `Prover::new`
/// requires a `Signature` rather than leaving every symbol to be declared ad hoc through
/// `Context::declare_symbol` directly, so malformed-problem errors (`SignatureConflict`) surface
/// at construction time instead of partway through adding initial clauses.
#[derive(Default)]
pub struct Signature {
  declarations: Vec<Symbol>,
}

impl Signature {
  pub fn new() -> Self {
    Self::default()
  }

  /// Queues a symbol for declaration; does not touch a `Context` until `install` runs.
  pub fn declare(&mut self, name: impl Into<IString>, arity: Arity, sort: TypeId) -> &mut Self {
    self.declarations.push(Symbol::new(name.into(), arity, sort));
    self
  }

  /// Declares every queued symbol into `ctx`, in the order `declare` was called, stopping at the
  /// first `SignatureConflict`.
  pub fn install(&self, ctx: &mut Context) -> Result<Vec<SymbolId>> {
    self.declarations.iter().map(|symbol| ctx.declare_symbol(symbol.clone())).collect()
  }

  pub fn len(&self) -> usize {
    self.declarations.len()
  }

  pub fn is_empty(&self) -> bool {
    self.declarations.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ids::TypeId;
  use crate::types::TypeData;

  #[test]
  fn same_name_and_arity_compare_equal() {
    let a = Symbol::new(IString::from("f"), 2, TypeId::NONE);
    let b = Symbol::new(IString::from("f"), 2, TypeId::NONE);
    assert_eq!(a, b);
  }

  #[test]
  fn attributes_do_not_affect_equality() {
    let a = Symbol::new(IString::from("sk1"), 0, TypeId::NONE);
    let mut b = a.clone();
    b.set_attribute(SymbolAttribute::Skolem);
    assert_eq!(a, b);
    assert!(b.has_attribute(SymbolAttribute::Skolem));
    assert!(!a.has_attribute(SymbolAttribute::Skolem));
  }

  #[test]
  fn arity_zero_is_constant() {
    let c = Symbol::new(IString::from("c"), 0, TypeId::NONE);
    assert!(c.is_constant());
  }

  #[test]
  fn signature_installs_every_declared_symbol() {
    let mut ctx = Context::new();
    let mut signature = Signature::new();
    signature.declare("f", 1, TypeId::NONE).declare("g", 2, TypeId::NONE);
    let ids = signature.install(&mut ctx).unwrap();
    assert_eq!(ids.len(), 2);
  }

  #[test]
  fn signature_surfaces_a_conflict_on_install() {
    let mut ctx = Context::new();
    let individual = ctx.intern_type(TypeData::Sort(IString::from("$i")));
    let boolean = ctx.intern_type(TypeData::Sort(IString::from("$o")));
    let mut signature = Signature::new();
    signature.declare("f", 1, individual).declare("f", 1, boolean);
    assert!(signature.install(&mut ctx).is_err());
  }
}
