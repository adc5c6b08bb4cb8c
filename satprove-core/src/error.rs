/*!

The error taxonomy described in the design: user errors are surfaced and recoverable, budget
exhaustion is reported as `Outcome::Timeout` (not an `Error` at all), and internal consistency
failures are `Error::Internal`, which make the `Prover` irrecoverable.

Within an inference, "this rule does not apply" is never an `Error` — it's `None` or an empty
`Vec`. Only genuine invariant violations reach this type.

*/

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
  #[error("symbol `{name}` redeclared with an incompatible type")]
  SignatureConflict { name: String },

  #[error("type mismatch: expected {expected}, found {found}")]
  TypeMismatch { expected: String, found: String },

  #[error("de Bruijn index {index} unbound at depth {depth}")]
  DeBruijnUnbound { index: u32, depth: u32 },

  #[error("attempted to mutate a frozen (already-interned) clause")]
  Frozen,

  #[error("inconsistent variable binding during {context}")]
  InconsistentBinding { context: &'static str },

  #[error("missing required configuration: {0}")]
  IncompleteConfiguration(&'static str),

  #[error("unknown symbol `{0}`")]
  UnknownSymbol(String),

  #[error("malformed initial clause: {0}")]
  MalformedClause(String),

  #[error("internal error (saturation is no longer usable): {0}")]
  Internal(String),
}

impl Error {
  /// True for the subset of errors that leave the `Prover` irrecoverable (4.Q: "internal
  /// consistency failures"). User errors and configuration errors do not set this.
  pub fn is_internal(&self) -> bool {
    matches!(self, Error::Internal(_))
  }
}
