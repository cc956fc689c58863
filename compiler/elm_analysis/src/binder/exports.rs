//! Export tables.
//!
//! An interface depends on its own file's tree and nothing else, so it is
//! cached per file revision and shared by every importer.

use elm_diagnostic::{Diagnostic, DiagnosticData, ErrorCode};
use elm_ir::ast::{Associativity, Decl, ExposedKind, Exposing, ParsedModule};
use elm_ir::{FileUri, Namespace, Span};
use rustc_hash::{FxHashMap, FxHashSet};

use super::PerNamespace;

/// A top-level name a module declares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declared {
    pub name: String,
    pub namespace: Namespace,
    /// Span of the defining name.
    pub span: Span,
    /// Owning type of a constructor.
    pub parent: Option<String>,
    pub exposed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InfixInfo {
    pub operator: String,
    pub assoc: Associativity,
    pub precedence: u8,
    /// Implementing function, declared in the same module.
    pub function: String,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct ModuleInterface {
    pub module: String,
    pub uri: FileUri,
    pub is_virtual: bool,
    declared: PerNamespace<FxHashMap<String, Declared>>,
    /// Union type → variant names in declaration order.
    unions: FxHashMap<String, Vec<String>>,
    record_aliases: FxHashSet<String>,
    infixes: FxHashMap<String, InfixInfo>,
    /// `E2007` and `E2008` findings.
    pub diagnostics: Vec<Diagnostic>,
}

impl ModuleInterface {
    pub fn build(uri: &FileUri, tree: &ParsedModule, is_virtual: bool) -> Self {
        let mut interface = ModuleInterface {
            module: tree.module_name().to_string(),
            uri: uri.clone(),
            is_virtual,
            declared: PerNamespace::default(),
            unions: FxHashMap::default(),
            record_aliases: FxHashSet::default(),
            infixes: FxHashMap::default(),
            diagnostics: Vec::new(),
        };
        for decl in &tree.decls {
            interface.declare_decl(decl);
        }
        match tree.header.as_ref().map(|h| &h.exposing) {
            None | Some(Exposing::All(_)) => interface.expose_everything(),
            Some(exposing) => interface.expose_listed(exposing),
        }
        interface
    }

    fn declare_decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Value(value) => {
                self.declare(Namespace::Value, &value.name.name, value.name.span, None);
            }
            Decl::Union(union) => {
                if !self.declare(Namespace::Type, &union.name.name, union.name.span, None) {
                    return;
                }
                let mut variants = Vec::with_capacity(union.variants.len());
                for variant in &union.variants {
                    if self.declare(
                        Namespace::Constructor,
                        &variant.name.name,
                        variant.name.span,
                        Some(&union.name.name),
                    ) {
                        variants.push(variant.name.name.clone());
                    }
                }
                self.unions.insert(union.name.name.clone(), variants);
            }
            Decl::Alias(alias) => {
                if !self.declare(Namespace::Type, &alias.name.name, alias.name.span, None) {
                    return;
                }
                if alias.is_record()
                    && self.declare(
                        Namespace::Constructor,
                        &alias.name.name,
                        alias.name.span,
                        Some(&alias.name.name),
                    )
                {
                    self.record_aliases.insert(alias.name.name.clone());
                }
            }
            Decl::Infix(infix) => {
                let op = &infix.operator;
                if self.declare(Namespace::Operator, &op.name, op.span, None) {
                    self.infixes.insert(
                        op.name.clone(),
                        InfixInfo {
                            operator: op.name.clone(),
                            assoc: infix.assoc,
                            precedence: infix.precedence,
                            function: infix.function.name.clone(),
                            span: op.span,
                        },
                    );
                }
            }
            Decl::Error(_) => {}
        }
    }

    /// Returns `false` (and reports `E2008`) when the name is taken.
    fn declare(&mut self, namespace: Namespace, name: &str, span: Span, parent: Option<&str>) -> bool {
        let table = self.declared.get_mut(namespace);
        if let Some(first) = table.get(name) {
            let first_span = first.span;
            self.diagnostics.push(
                Diagnostic::error(ErrorCode::E2008)
                    .with_message(format!("`{name}` is defined more than once"))
                    .with_label(span, "redefined here")
                    .with_secondary_label(first_span, "first defined here")
                    .with_data(DiagnosticData::DuplicateDefinition {
                        name: name.to_string(),
                    }),
            );
            return false;
        }
        table.insert(
            name.to_string(),
            Declared {
                name: name.to_string(),
                namespace,
                span,
                parent: parent.map(str::to_string),
                exposed: false,
            },
        );
        true
    }

    fn expose_everything(&mut self) {
        for namespace in Namespace::ALL {
            for declared in self.declared.get_mut(namespace).values_mut() {
                declared.exposed = true;
            }
        }
    }

    fn expose_listed(&mut self, exposing: &Exposing) {
        for item in exposing.items() {
            let found = match item.kind {
                ExposedKind::Value => self.mark(Namespace::Value, &item.name),
                ExposedKind::Operator => self.mark(Namespace::Operator, &item.name),
                ExposedKind::Type { open } => {
                    let found = self.mark(Namespace::Type, &item.name);
                    if found && (open.is_some() || self.record_aliases.contains(&item.name)) {
                        for ctor in self.declared.constructors.values_mut() {
                            if ctor.parent.as_deref() == Some(item.name.as_str()) {
                                ctor.exposed = true;
                            }
                        }
                    }
                    found
                }
            };
            if !found {
                self.diagnostics.push(
                    Diagnostic::error(ErrorCode::E2007)
                        .with_message(format!("`{}` is exposed but never defined", item.name))
                        .with_label(item.name_span, "not defined in this module")
                        .with_data(DiagnosticData::ExposedNameNotDefined {
                            name: item.name.clone(),
                        }),
                );
            }
        }
    }

    fn mark(&mut self, namespace: Namespace, name: &str) -> bool {
        match self.declared.get_mut(namespace).get_mut(name) {
            Some(declared) => {
                declared.exposed = true;
                true
            }
            None => false,
        }
    }

    pub fn definition(&self, namespace: Namespace, name: &str) -> Option<&Declared> {
        self.declared.get(namespace).get(name)
    }

    /// The definition if importers may see it.
    pub fn exposed(&self, namespace: Namespace, name: &str) -> Option<&Declared> {
        self.definition(namespace, name).filter(|d| d.exposed)
    }

    pub fn declared(&self, namespace: Namespace) -> impl Iterator<Item = &Declared> {
        self.declared.get(namespace).values()
    }

    pub fn exposed_in(&self, namespace: Namespace) -> impl Iterator<Item = &Declared> {
        self.declared(namespace).filter(|d| d.exposed)
    }

    /// Constructors a `Type(..)` import brings in: union variants, or the
    /// constructor of a record alias.
    pub fn constructors_of(&self, type_name: &str) -> Vec<&Declared> {
        if let Some(variants) = self.unions.get(type_name) {
            return variants
                .iter()
                .filter_map(|v| self.definition(Namespace::Constructor, v))
                .collect();
        }
        if self.record_aliases.contains(type_name) {
            return self
                .definition(Namespace::Constructor, type_name)
                .into_iter()
                .collect();
        }
        Vec::new()
    }

    /// Variant names of a union type, in declaration order.
    pub fn variants(&self, type_name: &str) -> Option<&[String]> {
        self.unions.get(type_name).map(Vec::as_slice)
    }

    pub fn is_record_alias(&self, name: &str) -> bool {
        self.record_aliases.contains(name)
    }

    pub fn infix(&self, operator: &str) -> Option<&InfixInfo> {
        self.infixes.get(operator)
    }

    /// Top-level declaration whose name span touches `offset`.
    pub fn declared_at(&self, offset: u32) -> Option<&Declared> {
        Namespace::ALL
            .iter()
            .flat_map(|&ns| self.declared(ns))
            .find(|d| d.span.touches(offset))
    }
}
