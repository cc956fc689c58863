//! Type unification engine.
//!
//! Link-based unification with path compression: variables are linked
//! directly to their unified type, with no substitution maps. Records are
//! rows: unifying two rows unifies the shared fields and hands each side's
//! extra fields to the other side's tail variable.

mod error;
mod rank;

pub use error::UnifyError;
pub use rank::Rank;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::pool::{Name, TypeData, VarState};
use crate::{Idx, Pool, Scheme, VarKind};

/// The unification engine for one inference run.
pub struct UnifyEngine<'pool> {
    pool: &'pool mut Pool,
    current_rank: Rank,
}

/// End of a flattened row.
enum RowTail {
    Closed,
    Open(Idx),
    Error,
}

impl<'pool> UnifyEngine<'pool> {
    pub fn new(pool: &'pool mut Pool) -> Self {
        Self {
            pool,
            current_rank: Rank::FIRST,
        }
    }

    #[inline]
    pub fn current_rank(&self) -> Rank {
        self.current_rank
    }

    /// Enter a let scope. Variables created inside may be generalized when
    /// it is left.
    pub fn enter_scope(&mut self) {
        self.current_rank = self.current_rank.next();
    }

    /// Leave a let scope; call [`generalize`](Self::generalize) first.
    pub fn exit_scope(&mut self) {
        self.current_rank = self.current_rank.prev().max(Rank::FIRST);
    }

    pub fn fresh_var(&mut self) -> Idx {
        self.pool.fresh_var(self.current_rank, VarKind::Flex, None)
    }

    /// Fresh variable carrying a constraint: the type of an integer literal
    /// is a fresh `number`.
    pub fn fresh_constrained(&mut self, kind: VarKind) -> Idx {
        self.pool.fresh_var(self.current_rank, kind, None)
    }

    #[inline]
    pub fn pool(&self) -> &Pool {
        self.pool
    }

    #[inline]
    pub fn pool_mut(&mut self) -> &mut Pool {
        self.pool
    }

    // Resolution

    /// Follow links, compressing the path.
    pub fn resolve(&mut self, idx: Idx) -> Idx {
        let Some(id) = self.pool.var_id(idx) else {
            return idx;
        };
        match self.pool.var_state(id) {
            VarState::Link { target } => {
                let target = *target;
                let resolved = self.resolve(target);
                if resolved != target {
                    *self.pool.var_state_mut(id) = VarState::Link { target: resolved };
                }
                resolved
            }
            _ => idx,
        }
    }

    // Unification

    /// Make `expected` and `found` equal.
    ///
    /// On failure some links may already be in place; the caller reports
    /// the error and carries on with whatever was unified.
    pub fn unify(&mut self, expected: Idx, found: Idx) -> Result<(), UnifyError> {
        elm_ir::ensure_sufficient_stack(|| self.unify_inner(expected, found))
    }

    fn unify_inner(&mut self, a: Idx, b: Idx) -> Result<(), UnifyError> {
        if a == b {
            return Ok(());
        }
        let a = self.resolve(a);
        let b = self.resolve(b);
        if a == b || a.is_error() || b.is_error() {
            return Ok(());
        }

        match (self.pool.var_id(a), self.pool.var_id(b)) {
            (Some(va), Some(vb)) => self.unify_vars(a, va, b, vb),
            (Some(va), None) => self.bind(a, va, b),
            (None, Some(vb)) => self.bind(b, vb, a),
            (None, None) => self.unify_structural(a, b),
        }
    }

    fn unify_vars(&mut self, a: Idx, va: u32, b: Idx, vb: u32) -> Result<(), UnifyError> {
        let state_a = self.pool.var_state(va).clone();
        let state_b = self.pool.var_state(vb).clone();
        match (state_a, state_b) {
            (
                VarState::Unbound {
                    rank: rank_a,
                    kind: kind_a,
                    name: name_a,
                },
                VarState::Unbound {
                    rank: rank_b,
                    kind: kind_b,
                    name: name_b,
                },
            ) => {
                let kind = kind_a.merge(kind_b).ok_or(UnifyError::Mismatch {
                    expected: a,
                    found: b,
                })?;
                // Keep the outer variable; link the inner one to it.
                let (keep, keep_id, drop_id) = if rank_b <= rank_a {
                    (b, vb, va)
                } else {
                    (a, va, vb)
                };
                *self.pool.var_state_mut(keep_id) = VarState::Unbound {
                    rank: rank_a.min(rank_b),
                    kind,
                    name: if keep_id == vb {
                        name_b.or(name_a)
                    } else {
                        name_a.or(name_b)
                    },
                };
                *self.pool.var_state_mut(drop_id) = VarState::Link { target: keep };
                Ok(())
            }
            (VarState::Unbound { kind, .. }, VarState::Rigid { name, kind: rigid }) => {
                if rigid.satisfies(kind) {
                    *self.pool.var_state_mut(va) = VarState::Link { target: b };
                    Ok(())
                } else {
                    Err(UnifyError::RigidMismatch { name, found: a })
                }
            }
            (VarState::Rigid { name, kind: rigid }, VarState::Unbound { kind, .. }) => {
                if rigid.satisfies(kind) {
                    *self.pool.var_state_mut(vb) = VarState::Link { target: a };
                    Ok(())
                } else {
                    Err(UnifyError::RigidMismatch { name, found: b })
                }
            }
            (VarState::Rigid { .. }, VarState::Rigid { .. }) => Err(UnifyError::Mismatch {
                expected: a,
                found: b,
            }),
            (VarState::Generalized { .. }, _) => {
                tracing::error!(var = va, "unifying a generalized variable");
                Err(UnifyError::UninstantiatedGeneralized { var: a })
            }
            (_, VarState::Generalized { .. }) => {
                tracing::error!(var = vb, "unifying a generalized variable");
                Err(UnifyError::UninstantiatedGeneralized { var: b })
            }
            // `resolve` never stops at a link.
            (VarState::Link { target }, _) => self.unify_inner(target, b),
            (_, VarState::Link { target }) => self.unify_inner(a, target),
        }
    }

    /// Bind variable `var` to the non-variable term `other`.
    fn bind(&mut self, var: Idx, id: u32, other: Idx) -> Result<(), UnifyError> {
        match self.pool.var_state(id).clone() {
            VarState::Unbound { rank, kind, .. } => {
                if self.occurs(id, other) {
                    return Err(UnifyError::InfiniteType { var, ty: other });
                }
                self.satisfy(kind, other)?;
                self.update_ranks(other, rank);
                *self.pool.var_state_mut(id) = VarState::Link { target: other };
                Ok(())
            }
            VarState::Rigid { name, .. } => Err(UnifyError::RigidMismatch { name, found: other }),
            VarState::Generalized { .. } => {
                tracing::error!(var = id, "binding a generalized variable");
                Err(UnifyError::UninstantiatedGeneralized { var })
            }
            VarState::Link { target } => self.unify_inner(target, other),
        }
    }

    fn unify_structural(&mut self, a: Idx, b: Idx) -> Result<(), UnifyError> {
        let mismatch = UnifyError::Mismatch {
            expected: a,
            found: b,
        };
        match (self.pool.get(a).clone(), self.pool.get(b).clone()) {
            (TypeData::Unit, TypeData::Unit) => Ok(()),
            (
                TypeData::App {
                    name: name_a,
                    args: args_a,
                },
                TypeData::App {
                    name: name_b,
                    args: args_b,
                },
            ) => {
                if name_a != name_b || args_a.len() != args_b.len() {
                    return Err(mismatch);
                }
                for (x, y) in args_a.into_iter().zip(args_b) {
                    self.unify_inner(x, y)?;
                }
                Ok(())
            }
            (
                TypeData::Function {
                    param: pa,
                    ret: ra,
                },
                TypeData::Function {
                    param: pb,
                    ret: rb,
                },
            ) => {
                self.unify_inner(pa, pb)?;
                self.unify_inner(ra, rb)
            }
            (TypeData::Tuple(xs), TypeData::Tuple(ys)) => {
                if xs.len() != ys.len() {
                    return Err(mismatch);
                }
                for (x, y) in xs.into_iter().zip(ys) {
                    self.unify_inner(x, y)?;
                }
                Ok(())
            }
            (TypeData::Record { .. }, TypeData::Record { .. }) => self.unify_records(a, b),
            _ => Err(mismatch),
        }
    }

    // Rows

    /// Collect all fields along a row chain and the chain's tail.
    fn flatten_row(&mut self, idx: Idx) -> (Vec<(Name, Idx)>, RowTail) {
        let mut fields: Vec<(Name, Idx)> = Vec::new();
        let mut current = idx;
        let tail = loop {
            let resolved = self.resolve(current);
            match self.pool.get(resolved) {
                TypeData::Record { fields: row, ext } => {
                    for (name, ty) in row {
                        if !fields.iter().any(|(n, _)| n == name) {
                            fields.push((name.clone(), *ty));
                        }
                    }
                    match ext {
                        Some(ext) => current = *ext,
                        None => break RowTail::Closed,
                    }
                }
                TypeData::Var(_) => break RowTail::Open(resolved),
                TypeData::Error => break RowTail::Error,
                _ => break RowTail::Closed,
            }
        };
        fields.sort_by(|x, y| x.0.cmp(&y.0));
        (fields, tail)
    }

    fn unify_records(&mut self, a: Idx, b: Idx) -> Result<(), UnifyError> {
        let (fields_a, tail_a) = self.flatten_row(a);
        let (fields_b, tail_b) = self.flatten_row(b);

        let mut only_a = Vec::new();
        let mut only_b = Vec::new();
        let mut shared = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < fields_a.len() || j < fields_b.len() {
            match (fields_a.get(i), fields_b.get(j)) {
                (Some(x), Some(y)) if x.0 == y.0 => {
                    shared.push((x.1, y.1));
                    i += 1;
                    j += 1;
                }
                (Some(x), Some(y)) if x.0 < y.0 => {
                    only_a.push(x.clone());
                    i += 1;
                }
                (Some(_), Some(y)) | (None, Some(y)) => {
                    only_b.push(y.clone());
                    j += 1;
                }
                (Some(x), None) => {
                    only_a.push(x.clone());
                    i += 1;
                }
                (None, None) => break,
            }
        }

        for (x, y) in shared {
            self.unify_inner(x, y)?;
        }

        match (tail_a, tail_b) {
            (RowTail::Error, _) | (_, RowTail::Error) => Ok(()),
            (RowTail::Closed, RowTail::Closed) => {
                if let Some((field, _)) = only_a.into_iter().next() {
                    return Err(UnifyError::MissingField { field, record: b });
                }
                if let Some((field, _)) = only_b.into_iter().next() {
                    return Err(UnifyError::MissingField { field, record: a });
                }
                Ok(())
            }
            (RowTail::Open(ext_a), RowTail::Closed) => {
                if let Some((field, _)) = only_a.into_iter().next() {
                    return Err(UnifyError::MissingField { field, record: b });
                }
                let rest = self.pool.record(only_b, None);
                self.unify_inner(ext_a, rest)
            }
            (RowTail::Closed, RowTail::Open(ext_b)) => {
                if let Some((field, _)) = only_b.into_iter().next() {
                    return Err(UnifyError::MissingField { field, record: a });
                }
                let rest = self.pool.record(only_a, None);
                self.unify_inner(ext_b, rest)
            }
            (RowTail::Open(ext_a), RowTail::Open(ext_b)) => {
                if only_a.is_empty() && only_b.is_empty() {
                    return self.unify_inner(ext_a, ext_b);
                }
                if ext_a == ext_b {
                    return Err(UnifyError::Mismatch {
                        expected: a,
                        found: b,
                    });
                }
                let rank = self.var_rank(ext_a).min(self.var_rank(ext_b));
                let tail = self.pool.fresh_var(rank, VarKind::Flex, None);
                let for_a = self.pool.record(only_b, Some(tail));
                self.unify_inner(ext_a, for_a)?;
                let for_b = self.pool.record(only_a, Some(tail));
                self.unify_inner(ext_b, for_b)
            }
        }
    }

    fn var_rank(&self, idx: Idx) -> Rank {
        match self.pool.var_id(idx).map(|id| self.pool.var_state(id)) {
            Some(VarState::Unbound { rank, .. }) => *rank,
            _ => self.current_rank,
        }
    }

    // Constraints

    /// Check that the non-variable term `ty` satisfies `kind`, pushing the
    /// constraint into element variables where needed.
    fn satisfy(&mut self, kind: VarKind, ty: Idx) -> Result<(), UnifyError> {
        let violation = UnifyError::ConstraintViolation { kind, found: ty };
        if kind == VarKind::Flex || ty.is_error() {
            return Ok(());
        }
        match kind {
            VarKind::Flex => Ok(()),
            VarKind::Number => {
                if ty == Idx::INT || ty == Idx::FLOAT {
                    Ok(())
                } else {
                    Err(violation)
                }
            }
            VarKind::Comparable => {
                if [Idx::INT, Idx::FLOAT, Idx::CHAR, Idx::STRING].contains(&ty) {
                    return Ok(());
                }
                match self.pool.get(ty).clone() {
                    TypeData::App { name, args } if &*name == crate::names::LIST => match args.first() {
                        Some(&elem) => self.constrain(elem, VarKind::Comparable),
                        None => Ok(()),
                    },
                    TypeData::Tuple(items) if items.len() <= 3 => {
                        for item in items {
                            self.constrain(item, VarKind::Comparable)?;
                        }
                        Ok(())
                    }
                    _ => Err(violation),
                }
            }
            VarKind::Appendable | VarKind::CompAppend => {
                if ty == Idx::STRING {
                    return Ok(());
                }
                match self.pool.get(ty).clone() {
                    TypeData::App { name, args } if &*name == crate::names::LIST => {
                        match (kind, args.first()) {
                            (VarKind::CompAppend, Some(&elem)) => {
                                self.constrain(elem, VarKind::Comparable)
                            }
                            _ => Ok(()),
                        }
                    }
                    _ => Err(violation),
                }
            }
        }
    }

    /// Require `ty` (variable or not) to satisfy `kind`.
    fn constrain(&mut self, ty: Idx, kind: VarKind) -> Result<(), UnifyError> {
        let ty = self.resolve(ty);
        let Some(id) = self.pool.var_id(ty) else {
            return self.satisfy(kind, ty);
        };
        match self.pool.var_state(id).clone() {
            VarState::Unbound { rank, kind: own, name } => {
                let merged = own
                    .merge(kind)
                    .ok_or(UnifyError::ConstraintViolation { kind, found: ty })?;
                *self.pool.var_state_mut(id) = VarState::Unbound {
                    rank,
                    kind: merged,
                    name,
                };
                Ok(())
            }
            VarState::Rigid { name, kind: own } => {
                if own.satisfies(kind) {
                    Ok(())
                } else {
                    Err(UnifyError::RigidMismatch { name, found: ty })
                }
            }
            VarState::Generalized { .. } | VarState::Link { .. } => Ok(()),
        }
    }

    // Occurs check and ranks

    /// Whether variable `id` occurs in `ty`. Skipped when `ty` has no
    /// variables at all.
    fn occurs(&self, id: u32, ty: Idx) -> bool {
        if !self.pool.flags(ty).has_vars() {
            return false;
        }
        match self.pool.get(ty) {
            TypeData::Var(other) => {
                if *other == id {
                    return true;
                }
                match self.pool.var_state(*other) {
                    VarState::Link { target } => self.occurs(id, *target),
                    _ => false,
                }
            }
            TypeData::App { args, .. } => args.iter().any(|&t| self.occurs(id, t)),
            TypeData::Tuple(items) => items.iter().any(|&t| self.occurs(id, t)),
            TypeData::Function { param, ret } => self.occurs(id, *param) || self.occurs(id, *ret),
            TypeData::Record { fields, ext } => {
                fields.iter().any(|(_, t)| self.occurs(id, *t))
                    || ext.is_some_and(|e| self.occurs(id, e))
            }
            TypeData::Error | TypeData::Unit => false,
        }
    }

    /// Lower the rank of every unbound variable in `ty` to at most `max`.
    fn update_ranks(&mut self, ty: Idx, max: Rank) {
        if !self.pool.flags(ty).has_vars() {
            return;
        }
        match self.pool.get(ty).clone() {
            TypeData::Var(id) => match self.pool.var_state_mut(id) {
                VarState::Unbound { rank, .. } => {
                    if *rank > max {
                        *rank = max;
                    }
                }
                VarState::Link { target } => {
                    let target = *target;
                    self.update_ranks(target, max);
                }
                _ => {}
            },
            TypeData::App { args, .. } => args.into_iter().for_each(|t| self.update_ranks(t, max)),
            TypeData::Tuple(items) => items.into_iter().for_each(|t| self.update_ranks(t, max)),
            TypeData::Function { param, ret } => {
                self.update_ranks(param, max);
                self.update_ranks(ret, max);
            }
            TypeData::Record { fields, ext } => {
                for (_, t) in fields {
                    self.update_ranks(t, max);
                }
                if let Some(ext) = ext {
                    self.update_ranks(ext, max);
                }
            }
            TypeData::Error | TypeData::Unit => {}
        }
    }

    // Generalization

    /// Quantify every unbound variable of `ty` created at or below the
    /// current scope.
    pub fn generalize(&mut self, ty: Idx) -> Scheme {
        let ty = self.resolve(ty);
        if !self.pool.flags(ty).has_vars() {
            return Scheme::mono(ty);
        }
        let mut vars = SmallVec::new();
        self.collect_free_vars(ty, self.current_rank, &mut vars);
        for &id in &vars {
            if let VarState::Unbound { kind, name, .. } = self.pool.var_state(id).clone() {
                *self.pool.var_state_mut(id) = VarState::Generalized { kind, name };
            }
        }
        Scheme { vars, body: ty }
    }

    fn collect_free_vars(&self, ty: Idx, min_rank: Rank, vars: &mut SmallVec<[u32; 4]>) {
        if !self.pool.flags(ty).has_vars() {
            return;
        }
        match self.pool.get(ty) {
            TypeData::Var(id) => match self.pool.var_state(*id) {
                VarState::Unbound { rank, .. } if rank.can_generalize_at(min_rank) => {
                    if !vars.contains(id) {
                        vars.push(*id);
                    }
                }
                VarState::Link { target } => self.collect_free_vars(*target, min_rank, vars),
                _ => {}
            },
            TypeData::App { args, .. } => {
                args.iter().for_each(|&t| self.collect_free_vars(t, min_rank, vars));
            }
            TypeData::Tuple(items) => {
                items.iter().for_each(|&t| self.collect_free_vars(t, min_rank, vars));
            }
            TypeData::Function { param, ret } => {
                self.collect_free_vars(*param, min_rank, vars);
                self.collect_free_vars(*ret, min_rank, vars);
            }
            TypeData::Record { fields, ext } => {
                for (_, t) in fields {
                    self.collect_free_vars(*t, min_rank, vars);
                }
                if let Some(ext) = ext {
                    self.collect_free_vars(*ext, min_rank, vars);
                }
            }
            TypeData::Error | TypeData::Unit => {}
        }
    }

    /// Replace the scheme's quantified variables with fresh ones at the
    /// current rank, keeping their constraints and preferred names.
    pub fn instantiate(&mut self, scheme: &Scheme) -> Idx {
        if scheme.vars.is_empty() {
            return scheme.body;
        }
        let mut subst: FxHashMap<u32, Idx> = FxHashMap::default();
        for &id in &scheme.vars {
            let (kind, name) = match self.pool.var_state(id) {
                VarState::Generalized { kind, name } | VarState::Unbound { kind, name, .. } => {
                    (*kind, name.clone())
                }
                VarState::Rigid { kind, name } => (*kind, Some(name.clone())),
                VarState::Link { .. } => (VarKind::Flex, None),
            };
            let fresh = self.pool.fresh_var(self.current_rank, kind, name);
            subst.insert(id, fresh);
        }
        self.substitute(scheme.body, &subst)
    }

    fn substitute(&mut self, ty: Idx, subst: &FxHashMap<u32, Idx>) -> Idx {
        if !self.pool.flags(ty).has_vars() {
            return ty;
        }
        match self.pool.get(ty).clone() {
            TypeData::Var(id) => {
                if let Some(&replacement) = subst.get(&id) {
                    return replacement;
                }
                match self.pool.var_state(id) {
                    VarState::Link { target } => {
                        let target = *target;
                        self.substitute(target, subst)
                    }
                    _ => ty,
                }
            }
            TypeData::App { name, args } => {
                let new_args: SmallVec<[Idx; 2]> =
                    args.iter().map(|&t| self.substitute(t, subst)).collect();
                if new_args == args {
                    ty
                } else {
                    self.pool.app(&name, &new_args)
                }
            }
            TypeData::Function { param, ret } => {
                let new_param = self.substitute(param, subst);
                let new_ret = self.substitute(ret, subst);
                self.pool.function(new_param, new_ret)
            }
            TypeData::Tuple(items) => {
                let new_items: SmallVec<[Idx; 3]> =
                    items.iter().map(|&t| self.substitute(t, subst)).collect();
                self.pool.tuple(&new_items)
            }
            TypeData::Record { fields, ext } => {
                let new_fields = fields
                    .iter()
                    .map(|(n, t)| (n.clone(), self.substitute(*t, subst)))
                    .collect();
                let new_ext = ext.map(|e| self.substitute(e, subst));
                self.pool.record(new_fields, new_ext)
            }
            TypeData::Error | TypeData::Unit => ty,
        }
    }
}

#[cfg(test)]
mod tests;
