//! Scope tables.
//!
//! One lookup table per namespace. Each name maps to every entry that
//! provides it, in priority order: local declarations, then explicit
//! imports in source order, then the implicit imports. The first entry
//! wins; the rest are kept so ambiguity can be reported.

use std::sync::Arc;

use elm_diagnostic::{Diagnostic, DiagnosticData, ErrorCode};
use elm_ir::ast::{ExposedKind, Exposing, Import};
use elm_ir::{FileUri, Namespace, Span};
use rustc_hash::FxHashMap;

use super::exports::{Declared, ModuleInterface};
use super::PerNamespace;

/// A top-level definition somewhere in the forest.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Definition {
    pub uri: FileUri,
    pub module: String,
    pub name: String,
    pub namespace: Namespace,
    /// Span of the defining name in `uri`.
    pub span: Span,
    pub parent: Option<String>,
}

impl Definition {
    pub fn new(interface: &ModuleInterface, declared: &Declared) -> Self {
        Definition {
            uri: interface.uri.clone(),
            module: interface.module.clone(),
            name: declared.name.clone(),
            namespace: declared.namespace,
            span: declared.span,
            parent: declared.parent.clone(),
        }
    }

    /// Same symbol: a record alias and its constructor share a name span
    /// and rename together.
    pub fn same_symbol(&self, other: &Definition) -> bool {
        self.uri == other.uri && self.span == other.span && self.name == other.name
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Origin {
    Local,
    Imported {
        module: String,
        /// Index into the file's explicit imports; `None` for implicit ones.
        import: Option<usize>,
        qualified_only: bool,
    },
}

impl Origin {
    pub fn import(&self) -> Option<usize> {
        match self {
            Origin::Imported { import, .. } => *import,
            Origin::Local => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopeEntry {
    pub definition: Definition,
    pub origin: Origin,
}

/// A module reachable through a qualifier.
#[derive(Clone, Debug)]
pub struct QualifiedModule {
    pub interface: Arc<ModuleInterface>,
    pub import: Option<usize>,
}

impl PartialEq for QualifiedModule {
    fn eq(&self, other: &Self) -> bool {
        self.import == other.import
            && self.interface.uri == other.interface.uri
            && self.interface.module == other.interface.module
    }
}

impl Eq for QualifiedModule {}

/// Outcome of a qualified lookup such as `List.map`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QualifiedLookup {
    Found {
        definition: Definition,
        import: Option<usize>,
    },
    /// The module defines the name but does not expose it.
    NotExposed { module: String },
    /// No module answers to the qualifier.
    UnknownQualifier,
    NotFound,
}

/// One import as seen by scope construction.
pub struct ImportSource<'a> {
    pub import: &'a Import,
    /// Explicit import index, `None` for an implicit import.
    pub index: Option<usize>,
    /// `None` when the module could not be found.
    pub interface: Option<Arc<ModuleInterface>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopeTable {
    unqualified: PerNamespace<FxHashMap<String, Vec<ScopeEntry>>>,
    qualifiers: FxHashMap<String, Vec<QualifiedModule>>,
}

impl ScopeTable {
    /// Build the scope of a module. Returns `E2002` findings for import
    /// exposing items the target module does not expose.
    pub fn build(own: &ModuleInterface, imports: &[ImportSource<'_>]) -> (Self, Vec<Diagnostic>) {
        let mut table = ScopeTable::default();
        let mut diagnostics = Vec::new();

        for namespace in Namespace::ALL {
            for declared in own.declared(namespace) {
                table.push(
                    namespace,
                    &declared.name,
                    ScopeEntry {
                        definition: Definition::new(own, declared),
                        origin: Origin::Local,
                    },
                );
            }
        }

        for source in imports {
            let Some(interface) = &source.interface else {
                continue;
            };
            let hidden = source.index.is_none()
                && imports.iter().any(|other| {
                    other.index.is_some() && other.import.module.name == source.import.module.name
                });
            if !hidden {
                for qualifier in source.import.qualifiers() {
                    table.add_qualifier(qualifier, interface, source.index);
                }
            }
            match &source.import.exposing {
                None => {}
                Some(Exposing::All(_)) => {
                    for namespace in [
                        Namespace::Value,
                        Namespace::Type,
                        Namespace::Constructor,
                        Namespace::Operator,
                    ] {
                        for declared in interface.exposed_in(namespace) {
                            table.push_import(interface, declared, source.index);
                        }
                    }
                }
                Some(Exposing::Explicit { items, .. }) => {
                    for item in items {
                        let namespace = match item.kind {
                            ExposedKind::Value => Namespace::Value,
                            ExposedKind::Operator => Namespace::Operator,
                            ExposedKind::Type { .. } => Namespace::Type,
                        };
                        let Some(declared) = interface.exposed(namespace, &item.name) else {
                            diagnostics.push(not_exposed(
                                &interface.module,
                                &item.name,
                                namespace,
                                item.name_span,
                            ));
                            continue;
                        };
                        table.push_import(interface, declared, source.index);
                        if let ExposedKind::Type { open } = item.kind {
                            if open.is_some() || interface.is_record_alias(&item.name) {
                                for ctor in interface.constructors_of(&item.name) {
                                    if ctor.exposed {
                                        table.push_import(interface, ctor, source.index);
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
        (table, diagnostics)
    }

    fn push(&mut self, namespace: Namespace, name: &str, entry: ScopeEntry) {
        self.unqualified
            .get_mut(namespace)
            .entry(name.to_string())
            .or_default()
            .push(entry);
    }

    fn push_import(&mut self, interface: &ModuleInterface, declared: &Declared, index: Option<usize>) {
        self.push(
            declared.namespace,
            &declared.name,
            ScopeEntry {
                definition: Definition::new(interface, declared),
                origin: Origin::Imported {
                    module: interface.module.clone(),
                    import: index,
                    qualified_only: false,
                },
            },
        );
    }

    fn add_qualifier(&mut self, qualifier: &str, interface: &Arc<ModuleInterface>, index: Option<usize>) {
        let modules = self.qualifiers.entry(qualifier.to_string()).or_default();
        if modules.iter().any(|m| m.interface.uri == interface.uri) {
            return;
        }
        modules.push(QualifiedModule {
            interface: Arc::clone(interface),
            import: index,
        });
        self.push(
            Namespace::ModuleAlias,
            qualifier,
            ScopeEntry {
                definition: Definition {
                    uri: interface.uri.clone(),
                    module: interface.module.clone(),
                    name: qualifier.to_string(),
                    namespace: Namespace::ModuleAlias,
                    span: Span::DUMMY,
                    parent: None,
                },
                origin: Origin::Imported {
                    module: interface.module.clone(),
                    import: index,
                    qualified_only: true,
                },
            },
        );
    }

    /// Every entry for an unqualified name, winner first.
    pub fn entries(&self, namespace: Namespace, name: &str) -> &[ScopeEntry] {
        self.unqualified
            .get(namespace)
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn lookup(&self, namespace: Namespace, name: &str) -> Option<&ScopeEntry> {
        self.entries(namespace, name).first()
    }

    /// Modules of the explicit imports competing for an unqualified name,
    /// the winner first, when there are at least two of them and no local
    /// declaration settles it.
    pub fn ambiguity(&self, namespace: Namespace, name: &str) -> Option<Vec<String>> {
        let entries = self.entries(namespace, name);
        if entries.first().map_or(true, |e| e.origin == Origin::Local) {
            return None;
        }
        let mut modules: Vec<String> = Vec::new();
        for entry in entries {
            if let Origin::Imported {
                module,
                import: Some(_),
                ..
            } = &entry.origin
            {
                if !modules.contains(module) {
                    modules.push(module.clone());
                }
            }
        }
        (modules.len() >= 2).then_some(modules)
    }

    pub fn qualified(&self, namespace: Namespace, qualifier: &str, name: &str) -> QualifiedLookup {
        let Some(modules) = self.qualifiers.get(qualifier) else {
            return QualifiedLookup::UnknownQualifier;
        };
        let mut hidden = None;
        for module in modules {
            match module.interface.definition(namespace, name) {
                Some(declared) if declared.exposed => {
                    return QualifiedLookup::Found {
                        definition: Definition::new(&module.interface, declared),
                        import: module.import,
                    };
                }
                Some(_) => hidden = hidden.or_else(|| Some(module.interface.module.clone())),
                None => {}
            }
        }
        match hidden {
            Some(module) => QualifiedLookup::NotExposed { module },
            None => QualifiedLookup::NotFound,
        }
    }

    /// Modules reachable through `qualifier`.
    pub fn qualifier_modules(&self, qualifier: &str) -> &[QualifiedModule] {
        self.qualifiers
            .get(qualifier)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether `module` is imported under any qualifier.
    pub fn imports_module(&self, module: &str) -> bool {
        self.qualifiers
            .values()
            .flatten()
            .any(|m| m.interface.module == module)
    }

    /// Unqualified names visible in `namespace`.
    pub fn names(&self, namespace: Namespace) -> impl Iterator<Item = &str> {
        self.unqualified.get(namespace).keys().map(String::as_str)
    }
}

pub(crate) fn not_exposed(module: &str, name: &str, namespace: Namespace, span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2002)
        .with_message(format!("module `{module}` does not expose {namespace} `{name}`"))
        .with_label(span, "not exposed")
        .with_data(DiagnosticData::NameNotExposed {
            module: module.to_string(),
            name: name.to_string(),
            namespace,
        })
}
