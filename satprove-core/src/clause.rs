/*!

Clauses (4.H): a disjunction of literals (4.G), interned the same way terms are. Two clauses that
are variants of each other -- same literals up to a renaming of their variables and up to literal
order -- must intern to the same `ClauseId`, otherwise the saturation loop (4.M) would keep deriving
and re-deriving "new" clauses that are really duplicates, which both wastes work and can stall
termination.

`Clause::canonicalize` is the pipeline that makes that guarantee hold: it dedupes identical
literals, renumbers variables to a canonical `0, 1, 2, ...` naming in first-occurrence order, and
sorts literals into a canonical order, before the result is ever handed to
[`crate::context::Context::intern_clause`]. Parent-clause/rule bookkeeping is deliberately not part
of `Clause` itself -- two different inferences can derive the same clause content, and that content
should still intern once; the parentage lives in the proof DAG (4.N), keyed by `ClauseId`.

*/

use smallvec::SmallVec;

use crate::context::Context;
use crate::ids::TermId;
use crate::literal::Literal;
use crate::subst::{ScopedTerm, Scope};
use crate::term::TermData;
use satprove_abs::FxHashMap;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Clause {
  literals: SmallVec<[Literal; 4]>,
}

impl Clause {
  /// Builds the canonical interned form of a clause from an arbitrary (possibly duplicate- or
  /// non-canonically-numbered) literal list. This is the only supported way to construct a
  /// `Clause` headed for `Context::intern_clause`.
  pub fn canonicalize(ctx: &mut Context, mut literals: Vec<Literal>) -> Clause {
    literals.sort_by(|a, b| (a.is_positive(), a.left(), a.right()).cmp(&(b.is_positive(), b.left(), b.right())));
    literals.dedup();

    // Variables are renumbered in first-occurrence order over this (already sorted) literal list,
    // so two derivations that produce the same clause with literals in the same relative order
    // intern identically regardless of which raw variable ids they happened to use. Renumbering
    // can still perturb the sort key (a literal's canonical ordering is not renaming-invariant in
    // general), so the sort runs a second time over the renamed literals before interning.
    let mut renaming: FxHashMap<u32, u32> = FxHashMap::default();
    let mut next_var = 0u32;
    let mut renamed: Vec<Literal> = literals
        .into_iter()
        .map(|literal| {
          let left = rename_variables(ctx, literal.left(), &mut renaming, &mut next_var);
          let right = rename_variables(ctx, literal.right(), &mut renaming, &mut next_var);
          Literal::new(literal.is_positive(), left, right)
        })
        .collect();

    renamed.sort_by(|a, b| (a.is_positive(), a.left(), a.right()).cmp(&(b.is_positive(), b.left(), b.right())));
    renamed.dedup();

    Clause { literals: renamed.into() }
  }

  pub fn literals(&self) -> &[Literal] {
    &self.literals
  }

  pub fn len(&self) -> usize {
    self.literals.len()
  }

  pub fn is_empty(&self) -> bool {
    self.literals.is_empty()
  }

  pub fn literal(&self, index: usize) -> &Literal {
    &self.literals[index]
  }

  /// The number of distinct variables used in this clause, after canonical renumbering -- the
  /// variables are exactly `0..variable_count`.
  pub fn variable_count(&self, ctx: &Context) -> u32 {
    let mut max = None;
    for literal in &self.literals {
      max_var(ctx, literal.left(), &mut max);
      max_var(ctx, literal.right(), &mut max);
    }
    max.map_or(0, |m| m + 1)
  }

  /// Every variable in this clause, scoped under `scope`, as the pair `(Scope, TermId)`-shaped
  /// input `unify`/`matches` expect -- used when a clause is activated against the index or matched
  /// by a simplification rule.
  pub fn scoped_literal(&self, index: usize, scope: Scope) -> (ScopedTerm, bool, ScopedTerm) {
    let literal = &self.literals[index];
    (
      ScopedTerm { term: literal.left(), scope },
      literal.is_positive(),
      ScopedTerm { term: literal.right(), scope },
    )
  }
}

fn max_var(ctx: &Context, term: TermId, current: &mut Option<u32>) {
  match ctx.term(term) {
    TermData::FreeVar(id) => {
      *current = Some(current.map_or(*id, |m| m.max(*id)));
    }
    TermData::App { head, args } => {
      max_var(ctx, *head, current);
      for arg in args {
        max_var(ctx, *arg, current);
      }
    }
    TermData::Lambda { body, .. } => max_var(ctx, *body, current),
    TermData::BoundVar(_) | TermData::Const(_) => {}
  }
}

fn rename_variables(ctx: &mut Context, term: TermId, renaming: &mut FxHashMap<u32, u32>, next_var: &mut u32) -> TermId {
  match ctx.term(term).clone() {
    TermData::FreeVar(id) => {
      let renamed = *renaming.entry(id).or_insert_with(|| {
        let fresh = *next_var;
        *next_var += 1;
        fresh
      });
      ctx.intern_term(TermData::FreeVar(renamed))
    }
    TermData::BoundVar(_) | TermData::Const(_) => term,
    TermData::App { head, args } => {
      let new_head = rename_variables(ctx, head, renaming, next_var);
      let new_args: SmallVec<[TermId; 4]> = args.iter().map(|a| rename_variables(ctx, *a, renaming, next_var)).collect();
      ctx.intern_term(TermData::App { head: new_head, args: new_args })
    }
    TermData::Lambda { param_sort, body } => {
      let new_body = rename_variables(ctx, body, renaming, next_var);
      ctx.intern_term(TermData::Lambda { param_sort, body: new_body })
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ids::TypeId;
  use crate::symbol::Symbol;
  use satprove_abs::IString;

  #[test]
  fn canonicalize_dedupes_identical_literals() {
    let mut ctx = Context::new();
    let c = ctx.intern_symbol(Symbol::new(IString::from("c"), 0, TypeId::NONE));
    let c_term = ctx.intern_term(TermData::Const(c));
    let literals = vec![Literal::positive(c_term, c_term), Literal::positive(c_term, c_term)];
    let clause = Clause::canonicalize(&mut ctx, literals);
    assert_eq!(clause.len(), 1);
  }

  #[test]
  fn canonicalize_renumbers_variables_from_zero() {
    let mut ctx = Context::new();
    let v5 = ctx.intern_term(TermData::FreeVar(5));
    let v9 = ctx.intern_term(TermData::FreeVar(9));
    let literals = vec![Literal::positive(v5, v9)];
    let clause = Clause::canonicalize(&mut ctx, literals);
    match (ctx.term(clause.literal(0).left()).clone(), ctx.term(clause.literal(0).right()).clone()) {
      (TermData::FreeVar(a), TermData::FreeVar(b)) => {
        assert_eq!(a, 0);
        assert_eq!(b, 1);
      }
      _ => panic!("expected free variables"),
    }
  }

  #[test]
  fn variant_clauses_canonicalize_to_the_same_content() {
    let mut ctx = Context::new();
    let a1 = ctx.intern_term(TermData::FreeVar(3));
    let b1 = ctx.intern_term(TermData::FreeVar(7));
    let clause1 = Clause::canonicalize(&mut ctx, vec![Literal::positive(a1, b1)]);

    let a2 = ctx.intern_term(TermData::FreeVar(20));
    let b2 = ctx.intern_term(TermData::FreeVar(41));
    let clause2 = Clause::canonicalize(&mut ctx, vec![Literal::positive(a2, b2)]);

    assert_eq!(clause1, clause2);
  }
}
