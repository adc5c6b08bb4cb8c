/*!

Scoped substitutions (4.D). Unifying two clauses never renames their variables up front: instead
each clause's variables are tagged with a `Scope`, and a `Subst` binds `(variable, scope)` pairs to
`(term, scope)` pairs. Two clauses can therefore share the same raw variable ids (`FreeVar(0)` in
one clause and `FreeVar(0)` in another) without colliding, as long as they're unified under distinct
scopes -- this is the same trick the teacher's own substitution core uses to avoid a renaming pass
before every unification attempt.

A `Renaming` is the scratch structure used only when a substitution needs to be "flattened" into a
fresh, scope-free clause (e.g. when a resolvent is interned): each `(variable, scope)` pair seen is
assigned a fresh variable id exactly once.

*/

use satprove_abs::FxHashMap;

use crate::error::{Error, Result};
use crate::ids::TermId;

/// Identifies one "copy" of a set of variables, so the same raw variable id can appear in two
/// different clauses being unified against each other without aliasing.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct Scope(pub u32);

impl Scope {
  pub const EMPTY: Scope = Scope(0);
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ScopedVar {
  pub var  : u32,
  pub scope: Scope,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ScopedTerm {
  pub term : TermId,
  pub scope: Scope,
}

/// A binding environment mapping scoped variables to scoped terms. Bindings are never removed
/// individually -- a `Subst` is built up during one unification/matching attempt and then either
/// committed (its bindings read off to build a result) or dropped in full on backtracking.
#[derive(Default, Clone, Debug)]
pub struct Subst {
  bindings: FxHashMap<ScopedVar, ScopedTerm>,
}

impl Subst {
  pub fn new() -> Self {
    Self::default()
  }

  /// Binds `var` to `term`. A variable already bound to a *different* term in this `Subst` is an
  /// `InconsistentBinding` (4.D) rather than a silent overwrite -- every call site that can
  /// actually reach a second, different binding for the same variable is a bug, not a legitimate
  /// "rebind" (callers that only ever bind a fresh variable, such as `unify::walk`, look the
  /// variable up first and never reach the `Err` arm in practice).
  pub fn bind(&mut self, var: ScopedVar, term: ScopedTerm) -> Result<()> {
    if let Some(existing) = self.bindings.get(&var) {
      if *existing != term {
        return Err(Error::InconsistentBinding { context: "Subst::bind" });
      }
      return Ok(());
    }
    self.bindings.insert(var, term);
    Ok(())
  }

  pub fn is_bound(&self, var: ScopedVar) -> bool {
    self.bindings.contains_key(&var)
  }

  pub fn lookup(&self, var: ScopedVar) -> Option<ScopedTerm> {
    self.bindings.get(&var).copied()
  }

  /// Follows a chain of variable-to-variable bindings to the final binding (a non-variable term, or
  /// an unbound variable). Does not walk into the interior of a bound compound term -- callers that
  /// need a fully dereferenced term walk recursively using the term table plus this primitive, the
  /// way unification's `occurs_check` and `apply` do.
  pub fn resolve(&self, mut var: ScopedVar, is_variable: impl Fn(TermId) -> Option<u32>) -> Option<ScopedTerm> {
    let mut seen = 0usize;
    loop {
      let bound = self.lookup(var)?;
      match is_variable(bound.term) {
        Some(next_var) => {
          var = ScopedVar { var: next_var, scope: bound.scope };
          seen += 1;
          debug_assert!(seen < 10_000, "Subst::resolve: suspiciously long variable chain, possible cycle");
        }
        None => return Some(bound),
      }
    }
  }

  pub fn len(&self) -> usize {
    self.bindings.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bindings.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&ScopedVar, &ScopedTerm)> {
    self.bindings.iter()
  }
}

/// The union of `s1` and `s2`'s bindings, or `InconsistentBinding` if they disagree on any shared
/// variable. Not used by any hot path in this crate (every inference rule threads one `Subst`
/// through a single unification attempt rather than building two substitutions to combine), but
/// provided as the general operation 4.D names, for a hook (4.O) that composes substitutions built
/// independently -- e.g. one covering each parent clause of a binary inference.
pub fn merge(s1: &Subst, s2: &Subst) -> Result<Subst> {
  let mut merged = s1.clone();
  for (&var, &term) in s2.iter() {
    merged.bind(var, term)?;
  }
  Ok(merged)
}

/// Assigns each distinct `(variable, scope)` pair encountered a fresh, scope-free variable id, used
/// when flattening a `Subst`'s image into a single new clause (4.H's interning pipeline calls this
/// after every inference that introduces fresh variables, such as equality factoring's premises).
#[derive(Default)]
pub struct Renaming {
  assigned: FxHashMap<ScopedVar, u32>,
  next     : u32,
}

impl Renaming {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn rename(&mut self, var: ScopedVar) -> u32 {
    *self.assigned.entry(var).or_insert_with(|| {
      let id = self.next;
      self.next += 1;
      id
    })
  }

  pub fn len(&self) -> usize {
    self.assigned.len()
  }
}
