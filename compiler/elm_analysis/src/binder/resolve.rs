//! Reference resolution.
//!
//! Walks a file once, with a stack of local scopes, and records every
//! occurrence of a name together with what it resolves to. Definitions,
//! references, rename, unused-name checks and inference all read this
//! index instead of re-resolving.

use std::sync::Arc;

use elm_diagnostic::{unknown_name, Diagnostic, DiagnosticData, ErrorCode};
use elm_ir::ast::{
    Decl, ExposedKind, Exposing, Expr, ExprKind, LetDecl, ParsedModule, Pattern, QualName,
    TypeExpr, ValueDecl,
};
use elm_ir::{FileUri, Namespace, Span};
use rustc_hash::FxHashMap;

use super::exports::ModuleInterface;
use super::scope::{Definition, ImportSource, QualifiedLookup, ScopeTable};
use crate::prelude;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RefRole {
    /// An occurrence in an expression, pattern, type or infix declaration.
    Use,
    /// An item of the module's or an import's exposing list.
    Exposing,
    /// The name in front of a type annotation.
    Annotation,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// A parameter, pattern or `let` binding; `span` is the binding site.
    Local { span: Span },
    TopLevel(Definition),
    Unresolved,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    /// The unqualified name: `map` in `List.map`.
    pub span: Span,
    /// The whole occurrence as written.
    pub full_span: Span,
    pub namespace: Namespace,
    pub target: Target,
    /// Explicit import the name came through.
    pub import: Option<usize>,
    pub qualified: bool,
    pub role: RefRole,
}

impl Reference {
    pub fn definition(&self) -> Option<&Definition> {
        match &self.target {
            Target::TopLevel(def) => Some(def),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedImport {
    pub module: String,
    pub qualifier: String,
    pub span: Span,
    pub found: bool,
}

/// Binder facts of one file.
#[derive(Debug)]
pub struct ResolvedFile {
    pub uri: FileUri,
    pub module: String,
    pub interface: Arc<ModuleInterface>,
    pub scope: ScopeTable,
    /// Sorted by position.
    pub references: Vec<Reference>,
    by_span: FxHashMap<(Span, Namespace), usize>,
    /// Binding sites of every local name.
    pub locals: Vec<Span>,
    pub imports: Vec<ResolvedImport>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ResolvedFile {
    /// The occurrence written at exactly `full_span`.
    pub fn reference(&self, full_span: Span, namespace: Namespace) -> Option<&Reference> {
        self.by_span
            .get(&(full_span, namespace))
            .and_then(|&i| self.references.get(i))
    }

    /// Innermost occurrence under a cursor.
    pub fn reference_at(&self, offset: u32) -> Option<&Reference> {
        self.references
            .iter()
            .filter(|r| r.full_span.touches(offset))
            .min_by_key(|r| r.full_span.len())
    }

    pub fn local_at(&self, offset: u32) -> Option<Span> {
        self.locals.iter().copied().find(|s| s.touches(offset))
    }

    /// Occurrences of a top-level symbol.
    pub fn references_to<'a>(&'a self, def: &'a Definition) -> impl Iterator<Item = &'a Reference> {
        self.references
            .iter()
            .filter(move |r| r.definition().is_some_and(|d| d.same_symbol(def)))
    }

    /// Occurrences of the local bound at `binding`.
    pub fn references_to_local(&self, binding: Span) -> impl Iterator<Item = &Reference> {
        self.references
            .iter()
            .filter(move |r| r.target == Target::Local { span: binding })
    }

    pub fn definition_of(&self, namespace: Namespace, name: &str) -> Option<Definition> {
        self.interface
            .definition(namespace, name)
            .map(|declared| Definition::new(&self.interface, declared))
    }
}

/// Resolve one file. `lookup` maps a module name to its interface.
pub fn resolve_file(
    uri: &FileUri,
    tree: &ParsedModule,
    own: Arc<ModuleInterface>,
    lookup: &dyn Fn(&str) -> Option<Arc<ModuleInterface>>,
    duplicate_module: bool,
) -> ResolvedFile {
    let module = own.module.clone();
    let mut sources: Vec<ImportSource<'_>> = tree
        .imports
        .iter()
        .enumerate()
        .map(|(index, import)| ImportSource {
            import,
            index: Some(index),
            interface: lookup(&import.module.name).filter(|i| i.module != module),
        })
        .collect();
    sources.extend(prelude::default_imports_for(&module).map(|import| ImportSource {
        import,
        index: None,
        interface: lookup(&import.module.name),
    }));

    let (scope, scope_diagnostics) = ScopeTable::build(&own, &sources);
    let mut diagnostics = own.diagnostics.clone();
    diagnostics.extend(scope_diagnostics);

    let mut imports = Vec::with_capacity(tree.imports.len());
    for source in sources.iter().filter(|s| s.index.is_some()) {
        let import = source.import;
        if source.interface.is_none() {
            diagnostics.push(
                Diagnostic::error(ErrorCode::E2001)
                    .with_message(format!("cannot find module `{}`", import.module.name))
                    .with_label(import.module.span, "not found in the workspace")
                    .with_data(DiagnosticData::UnresolvedImport {
                        module: import.module.name.clone(),
                    }),
            );
        }
        imports.push(ResolvedImport {
            module: import.module.name.clone(),
            qualifier: import.qualifier().to_string(),
            span: import.span,
            found: source.interface.is_some(),
        });
    }

    if duplicate_module {
        if let Some(header) = &tree.header {
            diagnostics.push(
                Diagnostic::error(ErrorCode::E2006)
                    .with_message(format!(
                        "module `{}` is declared by more than one file",
                        header.name.name
                    ))
                    .with_label(header.name.span, "duplicate module")
                    .with_data(DiagnosticData::DuplicateModule {
                        module: header.name.name.clone(),
                    }),
            );
        }
    }

    let mut resolver = Resolver {
        own: &own,
        scope: &scope,
        scopes: Vec::new(),
        references: Vec::new(),
        locals: Vec::new(),
        diagnostics: Vec::new(),
    };
    resolver.exposing_lists(tree, &sources);
    for decl in &tree.decls {
        resolver.decl(decl);
    }
    let Resolver {
        mut references,
        locals,
        diagnostics: walk_diagnostics,
        ..
    } = resolver;
    diagnostics.extend(walk_diagnostics);

    references.sort_by_key(|r| (r.full_span.start, r.full_span.end));
    let by_span = references
        .iter()
        .enumerate()
        .map(|(i, r)| ((r.full_span, r.namespace), i))
        .collect();

    tracing::debug!(
        uri = %uri,
        references = references.len(),
        diagnostics = diagnostics.len(),
        "resolved file"
    );
    ResolvedFile {
        uri: uri.clone(),
        module,
        interface: own,
        scope,
        references,
        by_span,
        locals,
        imports,
        diagnostics,
    }
}

struct Resolver<'a> {
    own: &'a ModuleInterface,
    scope: &'a ScopeTable,
    scopes: Vec<FxHashMap<String, Span>>,
    references: Vec<Reference>,
    locals: Vec<Span>,
    diagnostics: Vec<Diagnostic>,
}

impl Resolver<'_> {
    fn exposing_lists(&mut self, tree: &ParsedModule, sources: &[ImportSource<'_>]) {
        if let Some(Exposing::Explicit { items, .. }) = tree.header.as_ref().map(|h| &h.exposing) {
            for item in items {
                let namespace = item_namespace(item.kind);
                let target = self
                    .own
                    .definition(namespace, &item.name)
                    .map_or(Target::Unresolved, |d| {
                        Target::TopLevel(Definition::new(self.own, d))
                    });
                self.record(item.name_span, item.name_span, namespace, target, None, false, RefRole::Exposing);
            }
        }
        for source in sources.iter().filter(|s| s.index.is_some()) {
            let (Some(interface), Some(Exposing::Explicit { items, .. })) =
                (&source.interface, &source.import.exposing)
            else {
                continue;
            };
            for item in items {
                let namespace = item_namespace(item.kind);
                let target = interface
                    .exposed(namespace, &item.name)
                    .map_or(Target::Unresolved, |d| {
                        Target::TopLevel(Definition::new(interface, d))
                    });
                self.record(
                    item.name_span,
                    item.name_span,
                    namespace,
                    target,
                    source.index,
                    false,
                    RefRole::Exposing,
                );
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn record(
        &mut self,
        span: Span,
        full_span: Span,
        namespace: Namespace,
        target: Target,
        import: Option<usize>,
        qualified: bool,
        role: RefRole,
    ) {
        self.references.push(Reference {
            span,
            full_span,
            namespace,
            target,
            import,
            qualified,
            role,
        });
    }

    fn decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Value(value) => {
                let own = self
                    .own
                    .definition(Namespace::Value, &value.name.name)
                    .map(|d| Definition::new(self.own, d));
                self.value_decl(value, own.map(Target::TopLevel));
            }
            Decl::Union(union) => {
                for variant in &union.variants {
                    for arg in &variant.args {
                        self.type_expr(arg);
                    }
                }
            }
            Decl::Alias(alias) => self.type_expr(&alias.ty),
            Decl::Infix(infix) => {
                let name = QualName {
                    qualifier: None,
                    name: infix.function.name.clone(),
                    span: infix.function.span,
                };
                self.name(&name, Namespace::Value, RefRole::Use);
            }
            Decl::Error(_) => {}
        }
    }

    /// `annotation_target` is what the annotation name refers to.
    fn value_decl(&mut self, value: &ValueDecl, annotation_target: Option<Target>) {
        if let Some(annotation) = &value.annotation {
            if let Some(target) = annotation_target {
                let span = annotation.name.span;
                self.record(span, span, Namespace::Value, target, None, false, RefRole::Annotation);
            }
            self.type_expr(&annotation.ty);
        }
        self.scopes.push(FxHashMap::default());
        for param in &value.params {
            self.bind_pattern(param);
        }
        self.expr(&value.body);
        self.scopes.pop();
    }

    fn type_expr(&mut self, ty: &TypeExpr) {
        let mut names = Vec::new();
        ty.for_each_named(&mut |name| names.push(name.clone()));
        for name in &names {
            self.name(name, Namespace::Type, RefRole::Use);
        }
    }

    fn bind_pattern(&mut self, pattern: &Pattern) {
        let mut ctors = Vec::new();
        pattern.for_each_ctor(&mut |name| ctors.push(name.clone()));
        for ctor in &ctors {
            self.name(ctor, Namespace::Constructor, RefRole::Use);
        }
        for binding in pattern.bindings() {
            self.bind(&binding.name, binding.span);
        }
    }

    fn bind(&mut self, name: &str, span: Span) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), span);
        }
        self.locals.push(span);
    }

    fn lookup_local(&self, name: &str) -> Option<Span> {
        self.scopes.iter().rev().find_map(|s| s.get(name).copied())
    }

    fn expr(&mut self, expr: &Expr) {
        elm_ir::ensure_sufficient_stack(|| self.expr_inner(expr));
    }

    fn expr_inner(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Var(name) => self.name(name, Namespace::Value, RefRole::Use),
            ExprKind::Ctor(name) => self.name(name, Namespace::Constructor, RefRole::Use),
            ExprKind::OperatorRef(op) => {
                let name = QualName {
                    qualifier: None,
                    name: op.name.clone(),
                    span: op.span,
                };
                self.name(&name, Namespace::Operator, RefRole::Use);
            }
            ExprKind::BinOps { first, rest } => {
                self.expr(first);
                for (op, operand) in rest {
                    let name = QualName {
                        qualifier: None,
                        name: op.name.clone(),
                        span: op.span,
                    };
                    self.name(&name, Namespace::Operator, RefRole::Use);
                    self.expr(operand);
                }
            }
            ExprKind::Lambda { params, body } => {
                self.scopes.push(FxHashMap::default());
                for param in params {
                    self.bind_pattern(param);
                }
                self.expr(body);
                self.scopes.pop();
            }
            ExprKind::Case {
                scrutinee,
                branches,
            } => {
                self.expr(scrutinee);
                for branch in branches {
                    self.scopes.push(FxHashMap::default());
                    self.bind_pattern(&branch.pattern);
                    self.expr(&branch.body);
                    self.scopes.pop();
                }
            }
            ExprKind::Let { decls, body } => {
                self.scopes.push(FxHashMap::default());
                for decl in decls {
                    match decl {
                        LetDecl::Value(value) => self.bind(&value.name.name, value.name.span),
                        LetDecl::Destructure { pattern, .. } => self.bind_pattern(pattern),
                    }
                }
                for decl in decls {
                    match decl {
                        LetDecl::Value(value) => {
                            let target = Target::Local {
                                span: value.name.span,
                            };
                            self.value_decl(value, Some(target));
                        }
                        LetDecl::Destructure { body, .. } => self.expr(body),
                    }
                }
                self.expr(body);
                self.scopes.pop();
            }
            ExprKind::RecordUpdate { base, fields } => {
                let name = QualName {
                    qualifier: None,
                    name: base.name.clone(),
                    span: base.span,
                };
                self.name(&name, Namespace::Value, RefRole::Use);
                for field in fields {
                    self.expr(&field.value);
                }
            }
            _ => expr.for_each_child(&mut |child| self.expr(child)),
        }
    }

    /// Resolve one occurrence and record it.
    fn name(&mut self, name: &QualName, namespace: Namespace, role: RefRole) {
        let span = name.name_span();
        let Some(qualifier) = &name.qualifier else {
            if namespace == Namespace::Value {
                if let Some(binding) = self.lookup_local(&name.name) {
                    self.record(span, name.span, namespace, Target::Local { span: binding }, None, false, role);
                    return;
                }
            }
            let (target, import) = match self.scope.lookup(namespace, &name.name) {
                Some(entry) => (
                    Target::TopLevel(entry.definition.clone()),
                    entry.origin.import(),
                ),
                None => {
                    if namespace != Namespace::Operator {
                        self.diagnostics
                            .push(unknown_name(name.span, &name.name, None, namespace));
                    }
                    (Target::Unresolved, None)
                }
            };
            if let Some(candidates) = self.scope.ambiguity(namespace, &name.name) {
                self.diagnostics.push(ambiguous(name, namespace, candidates));
            }
            self.record(span, name.span, namespace, target, import, false, role);
            return;
        };

        let (target, import) = match self.scope.qualified(namespace, qualifier, &name.name) {
            QualifiedLookup::Found { definition, import } => (Target::TopLevel(definition), import),
            QualifiedLookup::NotExposed { module } => {
                self.diagnostics.push(super::scope::not_exposed(
                    &module, &name.name, namespace, name.span,
                ));
                (Target::Unresolved, None)
            }
            QualifiedLookup::UnknownQualifier | QualifiedLookup::NotFound => {
                self.diagnostics
                    .push(unknown_name(name.span, &name.name, Some(qualifier), namespace));
                (Target::Unresolved, None)
            }
        };
        self.record(span, name.span, namespace, target, import, true, role);
    }
}

fn item_namespace(kind: ExposedKind) -> Namespace {
    match kind {
        ExposedKind::Value => Namespace::Value,
        ExposedKind::Operator => Namespace::Operator,
        ExposedKind::Type { .. } => Namespace::Type,
    }
}

fn ambiguous(name: &QualName, namespace: Namespace, candidates: Vec<String>) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2003)
        .with_message(format!(
            "{namespace} `{}` is exposed by several imports: {}",
            name.name,
            candidates.join(", ")
        ))
        .with_label(
            name.span,
            format!("resolved to `{}`", candidates.first().map_or("", String::as_str)),
        )
        .with_note("the first import wins; qualify the name to pick another")
        .with_data(DiagnosticData::AmbiguousName {
            name: name.name.clone(),
            namespace,
            candidates,
        })
}
