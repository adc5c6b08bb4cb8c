/*!

A saturation-based first-order theorem prover library, built around the given-clause algorithm and
the superposition calculus: hash-consed terms, scoped unification, KBO/RPO term orderings,
superposition-family inference rules, and forward/backward simplification, all driven by the
given-clause loop in [`saturation`] and exposed through the [`prover::Prover`] ingress API.

Parsing a problem into clauses, converting arbitrary formulas to CNF, and pretty-printing a proof
are all out of scope here -- they belong upstream and downstream of this crate, respectively.
[`prover::Hooks`] is where an embedder plugs in that surrounding machinery, along with anything this
crate doesn't implement on its own (AVATAR-style clause splitting, induction, an external SAT/SMT
bridge, and so on).

*/

pub mod clause;
pub mod context;
pub mod error;
pub mod ids;
pub mod index;
pub mod inference;
pub mod literal;
pub mod order;
pub mod proof;
pub mod prover;
pub mod saturation;
pub mod selection;
pub mod simplify;
pub mod subst;
pub mod symbol;
pub mod term;
pub mod types;

pub use clause::Clause;
pub use context::Context;
pub use error::{Error, Result};
pub use ids::{ClauseId, SymbolId, TermId, TypeId};
pub use literal::Literal;
pub use order::{kbo, rpo, OrderingKind, Precedence, Status};
pub use proof::{Proof, ProofStep, Rule};
pub use prover::{ClauseEvent, Hooks, Prover};
pub use saturation::{Budget, Outcome, Saturation};
pub use selection::SelectionFunction;
pub use symbol::{Signature, Symbol, SymbolAttribute, SymbolAttributes};
pub use term::TermData;
pub use types::TypeData;
