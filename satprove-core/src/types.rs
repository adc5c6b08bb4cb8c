/*!

Types (4.B): base sorts and the function-type arrow chains built from them. Types are hash-consed
alongside symbols and terms -- a `TypeId` is cheap to copy and compare, and two occurrences of
`individual -> individual -> $o` intern to the same handle.

The prover does not type-check a problem; it assumes the ingress API handed it well-typed clauses
(4.O) and only uses `TypeId` to reject unification/superposition between terms of different sort.

*/

use smallvec::SmallVec;
use satprove_abs::IString;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::ids::TypeId;

/// The distinguished boolean sort every predicate symbol's result type is. Never user-declared.
pub const BOOL_SORT_NAME: &str = "$o";

/// The default sort assigned to constants/variables whose type annotation is omitted; matches
/// the untyped-first-order convention most resolution-style inputs use.
pub const INDIVIDUAL_SORT_NAME: &str = "$i";

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum TypeData {
  /// An atomic, user- or system-declared sort (`$i`, `$o`, or a problem-specific sort name).
  Sort(IString),
  /// A curried function type `params[0] -> params[1] -> ... -> result`. Stored uncurried (as a
  /// flat parameter list plus a result) rather than as nested binary arrows, matching how a
  /// symbol's signature is naturally read off a declaration.
  Function { params: SmallVec<[TypeId; 4]>, result: TypeId },
}

impl TypeData {
  pub fn is_sort(&self) -> bool {
    matches!(self, TypeData::Sort(_))
  }

  pub fn arity(&self) -> usize {
    match self {
      TypeData::Sort(_) => 0,
      TypeData::Function { params, .. } => params.len(),
    }
  }

  pub fn result(&self, self_id: TypeId) -> TypeId {
    match self {
      TypeData::Sort(_) => self_id,
      TypeData::Function { result, .. } => *result,
    }
  }
}

/// Applies a function type to a list of argument types (4.B): checks `args` pointwise against
/// `function`'s parameter types, returning the result type, or `TypeMismatch` at the first
/// disagreement (or on an arity mismatch, reported against the first missing/extra parameter).
pub fn apply_function_type(ctx: &Context, function: TypeId, args: &[TypeId]) -> Result<TypeId> {
  let data = match ctx.get_type(function) {
    TypeData::Function { params, result } => (params.clone(), *result),
    TypeData::Sort(_) => {
      return Err(Error::TypeMismatch { expected: describe(ctx, function), found: "an applied function type".into() });
    }
  };
  let (params, result) = data;
  if params.len() != args.len() {
    return Err(Error::TypeMismatch {
      expected: format!("{} argument(s)", params.len()),
      found: format!("{} argument(s)", args.len()),
    });
  }
  for (param, arg) in params.iter().zip(args.iter()) {
    if param != arg {
      return Err(Error::TypeMismatch { expected: describe(ctx, *param), found: describe(ctx, *arg) });
    }
  }
  Ok(result)
}

/// A short human-readable rendering of a type, for `TypeMismatch` messages only -- not a parser
/// round-trip format.
fn describe(ctx: &Context, type_id: TypeId) -> String {
  match ctx.get_type(type_id) {
    TypeData::Sort(name) => name.to_string(),
    TypeData::Function { params, result } => {
      let param_names: Vec<String> = params.iter().map(|p| describe(ctx, *p)).collect();
      format!("({}) -> {}", param_names.join(", "), describe(ctx, *result))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sort_has_arity_zero() {
    let t = TypeData::Sort(IString::from(INDIVIDUAL_SORT_NAME));
    assert_eq!(t.arity(), 0);
    assert!(t.is_sort());
  }

  #[test]
  fn function_type_reports_param_count() {
    let i = TypeId::from_usize(0);
    let o = TypeId::from_usize(1);
    let t = TypeData::Function { params: SmallVec::from_slice(&[i, i]), result: o };
    assert_eq!(t.arity(), 2);
    assert_eq!(t.result(TypeId::from_usize(2)), o);
  }

  #[test]
  fn apply_function_type_accepts_matching_arguments() {
    let mut ctx = Context::new();
    let individual = ctx.intern_type(TypeData::Sort(IString::from(INDIVIDUAL_SORT_NAME)));
    let boolean = ctx.intern_type(TypeData::Sort(IString::from(BOOL_SORT_NAME)));
    let function = ctx.intern_type(TypeData::Function { params: SmallVec::from_slice(&[individual, individual]), result: boolean });
    let result = apply_function_type(&ctx, function, &[individual, individual]).unwrap();
    assert_eq!(result, boolean);
  }

  #[test]
  fn apply_function_type_rejects_mismatched_argument() {
    let mut ctx = Context::new();
    let individual = ctx.intern_type(TypeData::Sort(IString::from(INDIVIDUAL_SORT_NAME)));
    let boolean = ctx.intern_type(TypeData::Sort(IString::from(BOOL_SORT_NAME)));
    let function = ctx.intern_type(TypeData::Function { params: SmallVec::from_slice(&[individual]), result: boolean });
    let result = apply_function_type(&ctx, function, &[boolean]);
    assert!(matches!(result, Err(Error::TypeMismatch { .. })));
  }

  #[test]
  fn apply_function_type_rejects_arity_mismatch() {
    let mut ctx = Context::new();
    let individual = ctx.intern_type(TypeData::Sort(IString::from(INDIVIDUAL_SORT_NAME)));
    let boolean = ctx.intern_type(TypeData::Sort(IString::from(BOOL_SORT_NAME)));
    let function = ctx.intern_type(TypeData::Function { params: SmallVec::from_slice(&[individual]), result: boolean });
    assert!(apply_function_type(&ctx, function, &[individual, individual]).is_err());
  }
}
