//! Type pool: the arena every inference run allocates its terms in.
//!
//! Structural terms are hash-consed, so two equal constructor applications
//! share one `Idx`. Variables are never shared: each `fresh_var` call makes
//! a new one, and its mutable state lives in a side table indexed by
//! variable id.

mod construct;
mod export;

use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::{names, Idx, Rank, TypeFlags, VarKind};

pub use export::{ImportMode, VarNamer};

/// Interned field and type names.
pub type Name = Arc<str>;

/// Structure of one pool entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Error,
    Unit,
    /// Type constructor application with a canonical name.
    App {
        name: Name,
        args: SmallVec<[Idx; 2]>,
    },
    /// Curried: `a -> b -> c` is `Function(a, Function(b, c))`.
    Function {
        param: Idx,
        ret: Idx,
    },
    Tuple(SmallVec<[Idx; 3]>),
    /// A row: fields sorted by name, then an optional tail. An absent tail
    /// closes the record; a tail resolves to a variable or another record.
    Record {
        fields: Vec<(Name, Idx)>,
        ext: Option<Idx>,
    },
    /// Variable with the given id; its state lives in the variable table.
    Var(u32),
}

/// Mutable state of a type variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VarState {
    /// Flexible: may be unified with anything its kind allows.
    Unbound {
        rank: Rank,
        kind: VarKind,
        /// Preferred display name.
        name: Option<Name>,
    },
    /// From an annotation: unifies only with itself or flexible variables.
    Rigid { name: Name, kind: VarKind },
    /// Unified with `target`.
    Link { target: Idx },
    /// Quantified by a scheme; must be instantiated before use.
    Generalized { kind: VarKind, name: Option<Name> },
}

pub struct Pool {
    items: Vec<TypeData>,
    flags: Vec<TypeFlags>,
    interned: FxHashMap<TypeData, Idx>,
    vars: Vec<VarState>,
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl Pool {
    pub fn new() -> Self {
        let mut pool = Pool {
            items: Vec::with_capacity(64),
            flags: Vec::with_capacity(64),
            interned: FxHashMap::default(),
            vars: Vec::new(),
        };
        let builtins = [
            (Idx::ERROR, TypeData::Error),
            (Idx::UNIT, TypeData::Unit),
            (Idx::INT, Self::nullary(names::INT)),
            (Idx::FLOAT, Self::nullary(names::FLOAT)),
            (Idx::BOOL, Self::nullary(names::BOOL)),
            (Idx::STRING, Self::nullary(names::STRING)),
            (Idx::CHAR, Self::nullary(names::CHAR)),
        ];
        for (expected, data) in builtins {
            let idx = pool.intern(data);
            debug_assert_eq!(idx, expected);
        }
        pool
    }

    fn nullary(name: &str) -> TypeData {
        TypeData::App {
            name: Name::from(name),
            args: SmallVec::new(),
        }
    }

    /// Number of entries, builtins included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn get(&self, idx: Idx) -> &TypeData {
        &self.items[idx.index()]
    }

    #[inline]
    pub fn flags(&self, idx: Idx) -> TypeFlags {
        self.flags[idx.index()]
    }

    /// Intern a structural term.
    pub(crate) fn intern(&mut self, data: TypeData) -> Idx {
        if let Some(&idx) = self.interned.get(&data) {
            return idx;
        }
        let flags = self.compute_flags(&data);
        let idx = self.push(data.clone(), flags);
        self.interned.insert(data, idx);
        idx
    }

    fn push(&mut self, data: TypeData, flags: TypeFlags) -> Idx {
        let raw = u32::try_from(self.items.len()).unwrap_or(u32::MAX);
        self.items.push(data);
        self.flags.push(flags);
        Idx::from_raw(raw)
    }

    fn compute_flags(&self, data: &TypeData) -> TypeFlags {
        let inherit = |idxs: &mut dyn Iterator<Item = Idx>| {
            idxs.fold(TypeFlags::empty(), |acc, i| acc | self.flags(i).propagated())
        };
        match data {
            TypeData::Error => TypeFlags::HAS_ERROR,
            TypeData::Unit => TypeFlags::empty(),
            TypeData::App { args, .. } => inherit(&mut args.iter().copied()),
            TypeData::Function { param, ret } => {
                inherit(&mut [*param, *ret].into_iter()) | TypeFlags::IS_FUNCTION
            }
            TypeData::Tuple(items) => inherit(&mut items.iter().copied()),
            TypeData::Record { fields, ext } => {
                inherit(&mut fields.iter().map(|(_, t)| *t).chain(*ext)) | TypeFlags::IS_RECORD
            }
            TypeData::Var(_) => TypeFlags::HAS_VAR | TypeFlags::IS_VAR,
        }
    }

    // Variables

    /// Create a flexible variable.
    pub fn fresh_var(&mut self, rank: Rank, kind: VarKind, name: Option<Name>) -> Idx {
        self.new_var(VarState::Unbound { rank, kind, name }, TypeFlags::empty())
    }

    /// Create a rigid variable for an annotation type variable.
    pub fn rigid_var(&mut self, name: Name) -> Idx {
        let kind = VarKind::from_var_name(&name);
        self.new_var(VarState::Rigid { name, kind }, TypeFlags::HAS_RIGID)
    }

    fn new_var(&mut self, state: VarState, extra: TypeFlags) -> Idx {
        let id = u32::try_from(self.vars.len()).unwrap_or(u32::MAX);
        self.vars.push(state);
        self.push(
            TypeData::Var(id),
            TypeFlags::HAS_VAR | TypeFlags::IS_VAR | extra,
        )
    }

    /// Variable id of `idx`, if it is a variable.
    #[inline]
    pub fn var_id(&self, idx: Idx) -> Option<u32> {
        match self.get(idx) {
            TypeData::Var(id) => Some(*id),
            _ => None,
        }
    }

    #[inline]
    pub fn var_state(&self, id: u32) -> &VarState {
        &self.vars[id as usize]
    }

    #[inline]
    pub fn var_state_mut(&mut self, id: u32) -> &mut VarState {
        &mut self.vars[id as usize]
    }

    /// Number of variables created so far.
    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    /// Follow links without path compression.
    pub fn resolve(&self, mut idx: Idx) -> Idx {
        while let Some(id) = self.var_id(idx) {
            match self.var_state(id) {
                VarState::Link { target } => idx = *target,
                _ => break,
            }
        }
        idx
    }

    /// Canonical name and arguments if `idx` resolves to a constructor
    /// application.
    pub fn as_app(&self, idx: Idx) -> Option<(&str, &[Idx])> {
        match self.get(self.resolve(idx)) {
            TypeData::App { name, args } => Some((name, args)),
            _ => None,
        }
    }

    /// Parameter and result if `idx` resolves to a function.
    pub fn as_function(&self, idx: Idx) -> Option<(Idx, Idx)> {
        match self.get(self.resolve(idx)) {
            TypeData::Function { param, ret } => Some((*param, *ret)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests;
