/*!

The `Context` (4.P) owns every intern table the prover uses: symbols, types, terms, and clauses.
Nothing in this crate keeps a table of its own or reaches for a process-global -- every function
that needs to resolve a `TermId` to its `TermData`, or intern a new term, takes `&Context` or
`&mut Context` explicitly. This is a deliberate departure from a global mutable table: it makes two
`Context`s usable side by side (e.g. one problem per worker thread) and makes `Context::clear`
a real, total reset rather than a best-effort one.

*/

use satprove_abs::{FxHashMap, IndexSet};

use crate::clause::Clause;
use crate::error::{Error, Result};
use crate::ids::{ClauseId, SymbolId, TermId, TypeId};
use crate::symbol::Symbol;
use crate::term::TermData;
use crate::types::TypeData;

#[derive(Default)]
pub struct Context {
  symbols: IndexSet<Symbol, Symbol>,
  types  : IndexSet<TypeData, TypeData>,
  terms  : IndexSet<TermData, TermData>,
  clauses: IndexSet<Clause, Clause>,

  /// Bumped every time a symbol's attributes or the overall symbol precedence changes, so cached
  /// per-literal ordering comparisons (4.G) know to recompute rather than trust a stale cache.
  precedence_generation: u64,

  /// Sidecar map from a free variable's term (a `TermData::FreeVar`-headed `TermId`) to its
  /// declared sort. Kept alongside `terms` rather than folded into `TermData::FreeVar` itself,
  /// since `TermData` is the structural-equality key every hash-cons lookup uses -- adding a type
  /// field there would make two occurrences of the same raw variable id intern to different
  /// `TermId`s whenever their types differ, which nothing else in this crate expects. Populated by
  /// an ingress API (4.O) as it builds a problem's initial clauses; never consulted by unification
  /// itself, only by `declare_symbol`'s signature check and any well-typedness validation a hook
  /// wants to run.
  term_types: FxHashMap<TermId, TypeId>,
}

impl Context {
  pub fn new() -> Self {
    Self::default()
  }

  /// Resets every table to empty and bumps the precedence generation, invalidating any `TermId`,
  /// `TypeId`, `SymbolId`, or `ClauseId` obtained before the call. Intended for reusing a `Prover`
  /// across independent problems without reallocating its tables from scratch.
  pub fn clear(&mut self) {
    self.symbols.clear();
    self.types.clear();
    self.terms.clear();
    self.clauses.clear();
    self.term_types.clear();
    self.precedence_generation += 1;
  }

  pub fn precedence_generation(&self) -> u64 {
    self.precedence_generation
  }

  // --- Symbols -------------------------------------------------------------------------------

  pub fn intern_symbol(&mut self, symbol: Symbol) -> SymbolId {
    SymbolId::from_usize(self.symbols.insert(symbol))
  }

  pub fn symbol(&self, id: SymbolId) -> &Symbol {
    self.symbols.index_to_value(id.index()).expect("dangling SymbolId")
  }

  pub fn declare_symbol(&mut self, symbol: Symbol) -> Result<SymbolId> {
    if let Some(index) = self.symbols.value_to_index(&symbol) {
      let existing = self.symbols.index_to_value(index).unwrap();
      if existing.arity() != symbol.arity() {
        return Err(Error::SignatureConflict { name: symbol.name().to_string() });
      }
      if existing.sort() != TypeId::NONE && symbol.sort() != TypeId::NONE && existing.sort() != symbol.sort() {
        return Err(Error::SignatureConflict { name: symbol.name().to_string() });
      }
      return Ok(SymbolId::from_usize(index));
    }
    Ok(self.intern_symbol(symbol))
  }

  /// Records `term`'s (a free-variable term) declared sort, for `declare_symbol`'s signature check
  /// and any well-typedness validation a hook (4.O) wants to perform. See the `term_types` field
  /// doc for why this is a sidecar map rather than a field on `TermData`.
  pub fn set_term_type(&mut self, term: TermId, sort: TypeId) {
    self.term_types.insert(term, sort);
  }

  pub fn term_type(&self, term: TermId) -> Option<TypeId> {
    self.term_types.get(&term).copied()
  }

  pub fn mark_precedence_dirty(&mut self) {
    self.precedence_generation += 1;
  }

  // --- Types -----------------------------------------------------------------------------------

  pub fn intern_type(&mut self, type_data: TypeData) -> TypeId {
    TypeId::from_usize(self.types.insert(type_data))
  }

  pub fn get_type(&self, id: TypeId) -> &TypeData {
    self.types.index_to_value(id.index()).expect("dangling TypeId")
  }

  // --- Terms -----------------------------------------------------------------------------------

  pub fn intern_term(&mut self, term_data: TermData) -> TermId {
    TermId::from_usize(self.terms.insert(term_data))
  }

  pub fn term(&self, id: TermId) -> &TermData {
    self.terms.index_to_value(id.index()).expect("dangling TermId")
  }

  pub fn term_table_fn(&self) -> impl Fn(TermId) -> &TermData {
    move |id: TermId| self.term(id)
  }

  // --- Clauses ---------------------------------------------------------------------------------

  pub fn intern_clause(&mut self, clause: Clause) -> ClauseId {
    ClauseId::from_usize(self.clauses.insert(clause))
  }

  pub fn clause(&self, id: ClauseId) -> &Clause {
    self.clauses.index_to_value(id.index()).expect("dangling ClauseId")
  }

  pub fn clause_count(&self) -> usize {
    self.clauses.len()
  }
}
