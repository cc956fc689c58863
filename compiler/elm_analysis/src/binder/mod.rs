//! Name binding: export tables, scope tables and the reference index.
//!
//! - [`exports`]: what a module declares and exposes, from its own tree only
//! - [`scope`]: the names visible in a file, one table per namespace
//! - [`resolve`]: every occurrence in a file tied to its definition

pub mod exports;
pub mod resolve;
pub mod scope;

pub use exports::{Declared, InfixInfo, ModuleInterface};
pub use resolve::{resolve_file, RefRole, Reference, ResolvedFile, ResolvedImport, Target};
pub use scope::{Definition, ImportSource, Origin, QualifiedLookup, QualifiedModule, ScopeEntry, ScopeTable};

use elm_ir::Namespace;

/// One value per namespace.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PerNamespace<T> {
    pub values: T,
    pub types: T,
    pub constructors: T,
    pub operators: T,
    pub modules: T,
}

impl<T> PerNamespace<T> {
    pub fn get(&self, namespace: Namespace) -> &T {
        match namespace {
            Namespace::Value => &self.values,
            Namespace::Type => &self.types,
            Namespace::Constructor => &self.constructors,
            Namespace::Operator => &self.operators,
            Namespace::ModuleAlias => &self.modules,
        }
    }

    pub fn get_mut(&mut self, namespace: Namespace) -> &mut T {
        match namespace {
            Namespace::Value => &mut self.values,
            Namespace::Type => &mut self.types,
            Namespace::Constructor => &mut self.constructors,
            Namespace::Operator => &mut self.operators,
            Namespace::ModuleAlias => &mut self.modules,
        }
    }
}

#[cfg(test)]
mod tests;
