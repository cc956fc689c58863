//! Conversion between pool terms and exported [`Ty`] trees.

use rustc_hash::{FxHashMap, FxHashSet};

use super::{Name, Pool, TypeData, VarState};
use crate::{Idx, Rank, Ty, VarKind};

/// Assigns display names to pool variables.
///
/// Names requested by rigid variables are always honored; preferred names
/// of flexible variables are used when free; everything else gets `a`,
/// `b`, ... or `number`, `number1`, ... for constrained variables.
#[derive(Default)]
pub struct VarNamer {
    assigned: FxHashMap<u32, String>,
    used: FxHashSet<String>,
    next_letter: u32,
}

impl VarNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `name` so no anonymous variable receives it.
    pub fn reserve(&mut self, name: &str) {
        self.used.insert(name.to_string());
    }

    fn name_for(&mut self, id: u32, kind: VarKind, preferred: Option<&str>) -> String {
        if let Some(name) = self.assigned.get(&id) {
            return name.clone();
        }
        let name = match preferred {
            Some(p) if !self.used.contains(p) && VarKind::from_var_name(p) == kind => p.to_string(),
            _ => self.fresh_name(kind),
        };
        self.used.insert(name.clone());
        self.assigned.insert(id, name.clone());
        name
    }

    fn fresh_name(&mut self, kind: VarKind) -> String {
        if let Some(base) = kind.base_name() {
            if !self.used.contains(base) {
                return base.to_string();
            }
            return (1..)
                .map(|n| format!("{base}{n}"))
                .find(|candidate| !self.used.contains(candidate))
                .unwrap_or_else(|| base.to_string());
        }
        loop {
            let n = self.next_letter;
            self.next_letter += 1;
            let letter = char::from(b'a' + u8::try_from(n % 26).unwrap_or(0));
            let candidate = if n < 26 {
                letter.to_string()
            } else {
                format!("{letter}{}", n / 26)
            };
            // Skip names that would read as constrained.
            if !self.used.contains(&candidate)
                && VarKind::from_var_name(&candidate) == VarKind::Flex
            {
                return candidate;
            }
        }
    }
}

/// How [`Pool::import`] turns exported variables into pool variables.
#[derive(Copy, Clone, Debug)]
pub enum ImportMode {
    /// Fresh flexible variables at the given rank: instantiation.
    Flexible(Rank),
    /// Rigid variables: checking a body against its annotation.
    Rigid,
}

impl Pool {
    /// Export `idx` with fresh variable names.
    pub fn export(&self, idx: Idx) -> Ty {
        let mut namer = VarNamer::new();
        self.reserve_rigid_names(idx, &mut namer);
        self.export_with(idx, &mut namer)
    }

    /// Export several types with one consistent variable naming.
    pub fn export_all(&self, idxs: &[Idx]) -> Vec<Ty> {
        let mut namer = VarNamer::new();
        for &idx in idxs {
            self.reserve_rigid_names(idx, &mut namer);
        }
        idxs.iter().map(|&i| self.export_with(i, &mut namer)).collect()
    }

    /// Human-readable form of `idx`.
    pub fn format_type(&self, idx: Idx) -> String {
        self.export(idx).to_string()
    }

    fn reserve_rigid_names(&self, idx: Idx, namer: &mut VarNamer) {
        let mut stack = vec![idx];
        let mut seen = FxHashSet::default();
        while let Some(idx) = stack.pop() {
            let idx = self.resolve(idx);
            if !seen.insert(idx) || !self.flags(idx).has_vars() {
                continue;
            }
            match self.get(idx) {
                TypeData::Var(id) => {
                    if let VarState::Rigid { name, .. } = self.var_state(*id) {
                        namer.reserve(name);
                        namer.assigned.insert(*id, name.to_string());
                    }
                }
                TypeData::App { args, .. } => stack.extend(args.iter().copied()),
                TypeData::Tuple(items) => stack.extend(items.iter().copied()),
                TypeData::Function { param, ret } => stack.extend([*param, *ret]),
                TypeData::Record { fields, ext } => {
                    stack.extend(fields.iter().map(|(_, t)| *t));
                    stack.extend(*ext);
                }
                TypeData::Error | TypeData::Unit => {}
            }
        }
    }

    /// Export using (and extending) an existing naming.
    pub fn export_with(&self, idx: Idx, namer: &mut VarNamer) -> Ty {
        elm_ir::ensure_sufficient_stack(|| self.export_inner(idx, namer))
    }

    fn export_inner(&self, idx: Idx, namer: &mut VarNamer) -> Ty {
        let idx = self.resolve(idx);
        match self.get(idx) {
            TypeData::Error => Ty::Error,
            TypeData::Unit => Ty::Unit,
            TypeData::App { name, args } => Ty::App {
                name: name.to_string(),
                args: args.iter().map(|&a| self.export_with(a, namer)).collect(),
            },
            TypeData::Function { param, ret } => Ty::Function(
                Box::new(self.export_with(*param, namer)),
                Box::new(self.export_with(*ret, namer)),
            ),
            TypeData::Tuple(items) => {
                Ty::Tuple(items.iter().map(|&t| self.export_with(t, namer)).collect())
            }
            TypeData::Record { .. } => self.export_record(idx, namer),
            TypeData::Var(id) => Ty::Var(self.var_name(*id, namer)),
        }
    }

    fn var_name(&self, id: u32, namer: &mut VarNamer) -> String {
        match self.var_state(id) {
            VarState::Unbound { kind, name, .. } | VarState::Generalized { kind, name } => {
                namer.name_for(id, *kind, name.as_deref())
            }
            VarState::Rigid { name, kind } => namer.name_for(id, *kind, Some(name)),
            // Unreachable after `resolve`.
            VarState::Link { target } => match self.export_inner(*target, namer) {
                Ty::Var(name) => name,
                _ => String::from("?"),
            },
        }
    }

    /// Flatten a row chain into one record.
    fn export_record(&self, idx: Idx, namer: &mut VarNamer) -> Ty {
        let mut fields: Vec<(String, Ty)> = Vec::new();
        let mut current = Some(idx);
        let mut ext = None;
        while let Some(segment) = current.take() {
            let segment = self.resolve(segment);
            match self.get(segment) {
                TypeData::Record {
                    fields: row,
                    ext: tail,
                } => {
                    for (name, ty) in row {
                        if !fields.iter().any(|(n, _)| n.as_str() == &**name) {
                            fields.push((name.to_string(), self.export_with(*ty, namer)));
                        }
                    }
                    current = *tail;
                }
                TypeData::Var(id) => ext = Some(self.var_name(*id, namer)),
                _ => {}
            }
        }
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        match (fields.is_empty(), ext) {
            (true, Some(ext)) => Ty::Var(ext),
            (_, ext) => Ty::Record { fields, ext },
        }
    }

    /// Bring an exported type into this pool. Variables with the same name
    /// map to the same pool variable, across calls sharing `vars`.
    pub fn import(&mut self, ty: &Ty, mode: ImportMode, vars: &mut FxHashMap<String, Idx>) -> Idx {
        match ty {
            Ty::Error => Idx::ERROR,
            Ty::Unit => Idx::UNIT,
            Ty::Var(name) => self.import_var(name, mode, vars),
            Ty::App { name, args } => {
                let args: Vec<Idx> = args.iter().map(|a| self.import(a, mode, vars)).collect();
                self.app(name, &args)
            }
            Ty::Function(param, ret) => {
                let param = self.import(param, mode, vars);
                let ret = self.import(ret, mode, vars);
                self.function(param, ret)
            }
            Ty::Tuple(items) => {
                let items: Vec<Idx> = items.iter().map(|t| self.import(t, mode, vars)).collect();
                self.tuple(&items)
            }
            Ty::Record { fields, ext } => {
                let fields: Vec<(Name, Idx)> = fields
                    .iter()
                    .map(|(n, t)| (Name::from(n.as_str()), self.import(t, mode, vars)))
                    .collect();
                let ext = ext.as_ref().map(|e| self.import_var(e, mode, vars));
                self.record(fields, ext)
            }
        }
    }

    fn import_var(&mut self, name: &str, mode: ImportMode, vars: &mut FxHashMap<String, Idx>) -> Idx {
        if let Some(&idx) = vars.get(name) {
            return idx;
        }
        let idx = match mode {
            ImportMode::Flexible(rank) => self.fresh_var(
                rank,
                VarKind::from_var_name(name),
                Some(Name::from(name)),
            ),
            ImportMode::Rigid => self.rigid_var(Name::from(name)),
        };
        vars.insert(name.to_string(), idx);
        idx
    }
}
