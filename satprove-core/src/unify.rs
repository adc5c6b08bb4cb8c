/*!

Unification, matching, and variant-checking (4.E). All three share one recursive walk over a pair
of scoped terms; they differ only in which side's variables may be bound and whether an occurs
check runs, so they are expressed here as one `walk` function parameterized by a [`BindPolicy`]
rather than as three independent algorithms that would otherwise drift out of sync.

  - **Unify**: either side's variables may bind to the other side (or to each other); an occurs
    check rejects a binding that would create a cyclic term.
  - **Match**: only the pattern's (left) variables may bind; the target's (right) variables are
    treated as opaque constants. No occurs check is needed -- the target never grows a binding that
    could loop back into itself.
  - **Variant**: neither side's variables may bind to a non-variable; two variables may only line up
    with each other, and the pairing must be a bijection (checked by recording both directions in
    the substitution and rejecting a second, different pairing for a variable already mapped).

*/

use crate::context::Context;
use crate::ids::TermId;
use crate::subst::{ScopedTerm, ScopedVar, Subst};
use crate::term::TermData;

#[derive(Copy, Clone, PartialEq, Eq)]
enum BindPolicy {
  Unify,
  Match,
  Variant,
}

fn as_free_var(term: &TermData) -> Option<u32> {
  match term {
    TermData::FreeVar(id) => Some(*id),
    _ => None,
  }
}

fn deref(ctx: &Context, subst: &Subst, mut term: ScopedTerm) -> ScopedTerm {
  loop {
    match as_free_var(ctx.term(term.term)) {
      Some(var) => {
        let scoped_var = ScopedVar { var, scope: term.scope };
        match subst.lookup(scoped_var) {
          Some(bound) => term = bound,
          None => return term,
        }
      }
      None => return term,
    }
  }
}

fn occurs(ctx: &Context, subst: &Subst, var: ScopedVar, term: ScopedTerm) -> bool {
  let term = deref(ctx, subst, term);
  match ctx.term(term.term) {
    TermData::FreeVar(id) => ScopedVar { var: *id, scope: term.scope } == var,
    TermData::App { head, args } => {
      occurs(ctx, subst, var, ScopedTerm { term: *head, scope: term.scope })
          || args.iter().any(|a| occurs(ctx, subst, var, ScopedTerm { term: *a, scope: term.scope }))
    }
    TermData::Lambda { body, .. } => occurs(ctx, subst, var, ScopedTerm { term: *body, scope: term.scope }),
    TermData::BoundVar(_) | TermData::Const(_) => false,
  }
}

fn walk(ctx: &Context, left: ScopedTerm, right: ScopedTerm, subst: &mut Subst, policy: BindPolicy) -> bool {
  let left = deref(ctx, subst, left);
  let right = if policy == BindPolicy::Match { right } else { deref(ctx, subst, right) };

  let left_var = as_free_var(ctx.term(left.term));
  let right_var = as_free_var(ctx.term(right.term));

  match (left_var, right_var, policy) {
    (Some(a), Some(b), BindPolicy::Variant) => {
      let lv = ScopedVar { var: a, scope: left.scope };
      let rv = ScopedVar { var: b, scope: right.scope };
      match subst.lookup(lv) {
        Some(existing) => existing.term == right.term && existing.scope == right.scope,
        None => {
          // Enforce the bijection by also recording the reverse mapping under a distinguishable
          // variable identity; callers only ever read the forward direction back out.
          if subst.is_bound(rv) {
            return false;
          }
          subst.bind(lv, right).is_ok() && subst.bind(rv, left).is_ok()
        }
      }
    }
    (Some(_), _, BindPolicy::Variant) | (_, Some(_), BindPolicy::Variant) => false,

    (Some(a), _, BindPolicy::Unify) => {
      let lv = ScopedVar { var: a, scope: left.scope };
      if left.term == right.term && left.scope == right.scope {
        return true;
      }
      if occurs(ctx, subst, lv, right) {
        return false;
      }
      subst.bind(lv, right).is_ok()
    }
    (_, Some(b), BindPolicy::Unify) => {
      let rv = ScopedVar { var: b, scope: right.scope };
      if occurs(ctx, subst, rv, left) {
        return false;
      }
      subst.bind(rv, left).is_ok()
    }

    (Some(a), _, BindPolicy::Match) => {
      let lv = ScopedVar { var: a, scope: left.scope };
      match subst.lookup(lv) {
        Some(existing) => existing.term == right.term && existing.scope == right.scope,
        None => subst.bind(lv, right).is_ok(),
      }
    }
    (_, Some(_), BindPolicy::Match) => false,

    (None, None, _) => structural_walk(ctx, left, right, subst, policy),
  }
}

fn structural_walk(ctx: &Context, left: ScopedTerm, right: ScopedTerm, subst: &mut Subst, policy: BindPolicy) -> bool {
  match (ctx.term(left.term), ctx.term(right.term)) {
    (TermData::Const(a), TermData::Const(b)) => a == b,
    (TermData::BoundVar(a), TermData::BoundVar(b)) => a == b,
    (
      TermData::App { head: h1, args: a1 },
      TermData::App { head: h2, args: a2 },
    ) => {
      if a1.len() != a2.len() {
        return false;
      }
      if !walk(ctx, ScopedTerm { term: *h1, scope: left.scope }, ScopedTerm { term: *h2, scope: right.scope }, subst, policy) {
        return false;
      }
      a1.iter().zip(a2.iter()).all(|(x, y)| {
        walk(ctx, ScopedTerm { term: *x, scope: left.scope }, ScopedTerm { term: *y, scope: right.scope }, subst, policy)
      })
    }
    (
      TermData::Lambda { param_sort: s1, body: b1 },
      TermData::Lambda { param_sort: s2, body: b2 },
    ) => {
      s1 == s2 && walk(ctx, ScopedTerm { term: *b1, scope: left.scope }, ScopedTerm { term: *b2, scope: right.scope }, subst, policy)
    }
    _ => false,
  }
}

/// Most general unifier of `left` and `right` under their respective scopes, extending `subst` in
/// place. Returns `false` (leaving `subst` partially extended -- callers discard it wholesale on
/// failure, never attempt to "undo" individual bindings) if no unifier exists.
pub fn unify(ctx: &Context, left: ScopedTerm, right: ScopedTerm, subst: &mut Subst) -> bool {
  walk(ctx, left, right, subst, BindPolicy::Unify)
}

/// Finds a substitution for `pattern`'s variables alone that makes `pattern` syntactically equal to
/// `target`. `target`'s variables are never bound.
pub fn matches(ctx: &Context, pattern: ScopedTerm, target: ScopedTerm, subst: &mut Subst) -> bool {
  walk(ctx, pattern, target, subst, BindPolicy::Match)
}

/// True if `left` and `right` are equal up to a bijective variable renaming.
pub fn variant(ctx: &Context, left: ScopedTerm, right: ScopedTerm, subst: &mut Subst) -> bool {
  walk(ctx, left, right, subst, BindPolicy::Variant)
}

/// Builds `term`'s image under `subst`, interning any newly-constructed compound nodes into `ctx`.
/// Variables left unbound by `subst` are passed through unchanged (scope-free, i.e. as if bound to
/// themselves).
pub fn apply(ctx: &mut Context, subst: &Subst, term: ScopedTerm) -> TermId {
  let resolved = resolve_shallow(ctx, subst, term);
  match ctx.term(resolved.term).clone() {
    TermData::FreeVar(_) | TermData::BoundVar(_) | TermData::Const(_) => resolved.term,
    TermData::App { head, args } => {
      let new_head = apply(ctx, subst, ScopedTerm { term: head, scope: resolved.scope });
      let new_args: smallvec::SmallVec<[TermId; 4]> =
        args.iter().map(|a| apply(ctx, subst, ScopedTerm { term: *a, scope: resolved.scope })).collect();
      ctx.intern_term(TermData::App { head: new_head, args: new_args })
    }
    TermData::Lambda { param_sort, body } => {
      let new_body = apply(ctx, subst, ScopedTerm { term: body, scope: resolved.scope });
      ctx.intern_term(TermData::Lambda { param_sort, body: new_body })
    }
  }
}

fn resolve_shallow(ctx: &Context, subst: &Subst, term: ScopedTerm) -> ScopedTerm {
  deref(ctx, subst, term)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ids::TypeId;
  use crate::symbol::Symbol;
  use satprove_abs::IString;

  fn scoped(term: TermId, scope: u32) -> ScopedTerm {
    ScopedTerm { term, scope: crate::subst::Scope(scope) }
  }

  #[test]
  fn unify_variable_with_constant() {
    let mut ctx = Context::new();
    let c = ctx.intern_symbol(Symbol::new(IString::from("a"), 0, TypeId::NONE));
    let const_term = ctx.intern_term(TermData::Const(c));
    let var_term = ctx.intern_term(TermData::FreeVar(0));

    let mut subst = Subst::new();
    assert!(unify(&ctx, scoped(var_term, 1), scoped(const_term, 2), &mut subst));
    assert_eq!(subst.len(), 1);
  }

  #[test]
  fn unify_fails_occurs_check() {
    let mut ctx = Context::new();
    let f = ctx.intern_symbol(Symbol::new(IString::from("f"), 1, TypeId::NONE));
    let x = ctx.intern_term(TermData::FreeVar(0));
    let fx = ctx.intern_term(TermData::App { head: f_const(&mut ctx, f), args: smallvec::smallvec![x] });

    let mut subst = Subst::new();
    assert!(!unify(&ctx, scoped(x, 1), scoped(fx, 1), &mut subst));
  }

  fn f_const(ctx: &mut Context, symbol: crate::ids::SymbolId) -> TermId {
    ctx.intern_term(TermData::Const(symbol))
  }

  #[test]
  fn matching_does_not_bind_target_variables() {
    let mut ctx = Context::new();
    let pattern_var = ctx.intern_term(TermData::FreeVar(0));
    let target_var = ctx.intern_term(TermData::FreeVar(0));

    let mut subst = Subst::new();
    // pattern variable (scope 1) may bind; target variable (scope 2) is opaque, so matching a
    // bare pattern variable against it should still succeed by binding the pattern side.
    assert!(matches(&ctx, scoped(pattern_var, 1), scoped(target_var, 2), &mut subst));
    assert_eq!(subst.len(), 1);
  }

  #[test]
  fn variant_rejects_non_bijective_mapping() {
    let mut ctx = Context::new();
    let f = ctx.intern_symbol(Symbol::new(IString::from("f"), 2, TypeId::NONE));
    let fconst = f_const(&mut ctx, f);
    let x0 = ctx.intern_term(TermData::FreeVar(0));
    let x1 = ctx.intern_term(TermData::FreeVar(1));
    // f(x0, x0) vs f(x0, x1): second argument forces x0 -> x0 then x0 -> x1, not a bijection.
    let left = ctx.intern_term(TermData::App { head: fconst, args: smallvec::smallvec![x0, x0] });
    let right = ctx.intern_term(TermData::App { head: fconst, args: smallvec::smallvec![x0, x1] });

    let mut subst = Subst::new();
    assert!(!variant(&ctx, scoped(left, 1), scoped(right, 1), &mut subst));
  }

  #[test]
  fn variant_accepts_consistent_renaming() {
    let mut ctx = Context::new();
    let f = ctx.intern_symbol(Symbol::new(IString::from("f"), 2, TypeId::NONE));
    let fconst = f_const(&mut ctx, f);
    let x0 = ctx.intern_term(TermData::FreeVar(0));
    let x1 = ctx.intern_term(TermData::FreeVar(1));
    let left = ctx.intern_term(TermData::App { head: fconst, args: smallvec::smallvec![x0, x1] });
    let right = ctx.intern_term(TermData::App { head: fconst, args: smallvec::smallvec![x1, x0] });

    let mut subst = Subst::new();
    assert!(variant(&ctx, scoped(left, 1), scoped(right, 2), &mut subst));
  }
}
