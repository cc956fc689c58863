//! Expression and pattern inference for one top-level declaration.

use elm_diagnostic::{Diagnostic, DiagnosticData, ErrorCode};
use elm_ir::ast::{CaseBranch, Expr, ExprKind, Ident, LetDecl, Pattern, PatternKind, ValueDecl};
use elm_ir::{Namespace, Span};
use elm_types::{Idx, ImportMode, Name, Pool, Scheme, Ty, UnifyEngine, UnifyError, VarKind, VarNamer};
use rustc_hash::FxHashMap;

use super::annotation::{annotation_type, constructor_type};
use super::operators::{reassociate, Fixity, OpTree};
use super::{exhaustive, InferredDecl, TypeOracle};
use crate::binder::{Definition, ResolvedFile, Target};
use crate::forest::SourceFile;

/// Infer (or check against its annotation) the declaration `decl` of
/// `source`.
///
/// Library files are trusted: an annotated declaration there is not
/// checked, its annotation is its type.
pub fn infer_decl(
    oracle: &dyn TypeOracle,
    file: &ResolvedFile,
    source: &SourceFile,
    decl: &ValueDecl,
) -> InferredDecl {
    let annotation = decl
        .annotation
        .as_ref()
        .map(|a| annotation_type(oracle, file, &a.ty));
    if source.is_virtual {
        if let Some(ty) = annotation {
            return InferredDecl {
                name: decl.name.name.clone(),
                ty,
                annotated: true,
                diagnostics: Vec::new(),
                expr_types: FxHashMap::default(),
                binding_types: FxHashMap::default(),
                expected_types: FxHashMap::default(),
            };
        }
    }

    let mut pool = Pool::new();
    let mut inferer = Inferer::new(oracle, file, &mut pool);
    let decl_ty = match &annotation {
        Some(ty) => {
            let expected = inferer.import(ty, ImportMode::Rigid);
            inferer.check_function(&decl.params, &decl.body, expected, decl.name.span);
            expected
        }
        None => {
            let own = file.definition_of(Namespace::Value, &decl.name.name);
            let self_var = inferer.engine.fresh_var();
            inferer.self_ref = own.map(|def| (def, self_var));
            let ty = inferer.infer_function(&decl.params, &decl.body);
            inferer.unify_at(self_var, ty, decl.name.span);
            ty
        }
    };
    inferer.finish(decl, decl_ty, annotation)
}

struct Inferer<'a, 'p> {
    oracle: &'a dyn TypeOracle,
    file: &'a ResolvedFile,
    engine: UnifyEngine<'p>,
    /// Type of every local binding site in scope so far.
    locals: FxHashMap<Span, Scheme>,
    /// The declaration being inferred and its monomorphic type.
    self_ref: Option<(Definition, Idx)>,
    diagnostics: Vec<Diagnostic>,
    expr_types: Vec<(Span, Idx)>,
    binding_types: Vec<(Span, Idx)>,
    expected_types: Vec<(Span, Idx)>,
}

impl<'a, 'p> Inferer<'a, 'p> {
    fn new(oracle: &'a dyn TypeOracle, file: &'a ResolvedFile, pool: &'p mut Pool) -> Self {
        Inferer {
            oracle,
            file,
            engine: UnifyEngine::new(pool),
            locals: FxHashMap::default(),
            self_ref: None,
            diagnostics: Vec::new(),
            expr_types: Vec::new(),
            binding_types: Vec::new(),
            expected_types: Vec::new(),
        }
    }

    fn finish(self, decl: &ValueDecl, decl_ty: Idx, annotation: Option<Ty>) -> InferredDecl {
        let pool = self.engine.pool();
        let mut namer = VarNamer::new();
        // The declaration's type is named first so expression types agree
        // with it.
        let inferred = pool.export_with(decl_ty, &mut namer);
        let expr_types = self
            .expr_types
            .iter()
            .map(|&(span, ty)| (span, pool.export_with(ty, &mut namer)))
            .collect();
        let binding_types = self
            .binding_types
            .iter()
            .map(|&(span, ty)| (span, pool.export_with(ty, &mut namer)))
            .collect();
        let expected_types = self
            .expected_types
            .iter()
            .map(|&(span, ty)| (span, pool.export_with(ty, &mut namer)))
            .collect();
        tracing::trace!(decl = %decl.name.name, ty = %inferred, "inferred");
        InferredDecl {
            name: decl.name.name.clone(),
            annotated: annotation.is_some(),
            ty: annotation.unwrap_or(inferred),
            diagnostics: self.diagnostics,
            expr_types,
            binding_types,
            expected_types,
        }
    }

    fn import(&mut self, ty: &Ty, mode: ImportMode) -> Idx {
        self.engine
            .pool_mut()
            .import(ty, mode, &mut FxHashMap::default())
    }

    fn instantiate(&mut self, ty: &Ty) -> Idx {
        let rank = self.engine.current_rank();
        self.import(ty, ImportMode::Flexible(rank))
    }

    // Unification and reporting

    fn unify_at(&mut self, expected: Idx, found: Idx, span: Span) -> bool {
        match self.engine.unify(expected, found) {
            Ok(()) => true,
            Err(err) => {
                let diagnostic = self.describe(&err, expected, found, span);
                self.diagnostics.push(diagnostic);
                false
            }
        }
    }

    fn describe(&self, err: &UnifyError, expected: Idx, found: Idx, span: Span) -> Diagnostic {
        let pool = self.engine.pool();
        match err {
            UnifyError::InfiniteType { var, ty } => {
                let shown = pool.export_all(&[*var, *ty]);
                let (var, ty) = (shown[0].to_string(), shown[1].to_string());
                Diagnostic::error(ErrorCode::E3002)
                    .with_message(format!("infinite type: `{var}` would have to contain itself in `{ty}`"))
                    .with_label(span, "this expression needs an infinite type")
                    .with_data(DiagnosticData::InfiniteType { var, ty })
            }
            UnifyError::MissingField { field, record } => {
                let record = pool.format_type(*record);
                Diagnostic::error(ErrorCode::E3004)
                    .with_message(format!("record `{record}` has no field `{field}`"))
                    .with_label(span, format!("no field `{field}`"))
                    .with_data(DiagnosticData::RecordFieldMissing {
                        field: field.to_string(),
                        record,
                    })
            }
            UnifyError::Mismatch { .. }
            | UnifyError::RigidMismatch { .. }
            | UnifyError::ConstraintViolation { .. }
            | UnifyError::UninstantiatedGeneralized { .. } => {
                let shown = pool.export_all(&[expected, found]);
                elm_diagnostic::type_mismatch(span, &shown[0].to_string(), &shown[1].to_string())
            }
        }
    }

    fn note(&mut self, span: Span, ty: Idx) {
        self.expr_types.push((span, ty));
    }

    fn bind(&mut self, span: Span, ty: Idx) {
        self.locals.insert(span, Scheme::mono(ty));
        self.binding_types.push((span, ty));
    }

    // Declarations

    fn infer_function(&mut self, params: &[Pattern], body: &Expr) -> Idx {
        let param_tys: Vec<Idx> = params
            .iter()
            .map(|param| {
                let ty = self.engine.fresh_var();
                self.check_pattern(param, ty);
                ty
            })
            .collect();
        let ret = self.infer(body);
        self.engine.pool_mut().function_n(&param_tys, ret)
    }

    /// Check parameters and body against `expected`, peeling one arrow per
    /// parameter.
    fn check_function(&mut self, params: &[Pattern], body: &Expr, expected: Idx, name_span: Span) {
        let mut current = expected;
        for param in params {
            let resolved = self.engine.resolve(current);
            let (param_ty, ret) = match self.engine.pool().as_function(resolved) {
                Some(parts) => parts,
                None => {
                    let param_ty = self.engine.fresh_var();
                    let ret = self.engine.fresh_var();
                    let function = self.engine.pool_mut().function(param_ty, ret);
                    self.unify_at(current, function, name_span);
                    (param_ty, ret)
                }
            };
            self.check_pattern(param, param_ty);
            current = ret;
        }
        self.check(body, current);
    }

    fn let_decls(&mut self, decls: &[LetDecl]) {
        for decl in decls {
            match decl {
                LetDecl::Value(value) => self.let_value(value),
                LetDecl::Destructure { pattern, body, .. } => {
                    let ty = self.infer(body);
                    self.check_pattern(pattern, ty);
                }
            }
        }
    }

    fn let_value(&mut self, value: &ValueDecl) {
        self.engine.enter_scope();
        let placeholder = self.engine.fresh_var();
        self.locals.insert(value.name.span, Scheme::mono(placeholder));
        if let Some(annotation) = &value.annotation {
            let ty = annotation_type(self.oracle, self.file, &annotation.ty);
            let expected = self.instantiate(&ty);
            self.unify_at(placeholder, expected, annotation.span);
        }
        let ty = self.infer_function(&value.params, &value.body);
        self.unify_at(placeholder, ty, value.name.span);
        let scheme = self.engine.generalize(ty);
        self.engine.exit_scope();
        self.binding_types.push((value.name.span, ty));
        self.locals.insert(value.name.span, scheme);
    }

    // Expressions

    fn check(&mut self, expr: &Expr, expected: Idx) {
        elm_ir::ensure_sufficient_stack(|| match &expr.kind {
            ExprKind::Paren(inner) => {
                self.check(inner, expected);
                self.note(expr.span, expected);
            }
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.check(cond, Idx::BOOL);
                self.check(then_branch, expected);
                self.check(else_branch, expected);
                self.note(expr.span, expected);
            }
            ExprKind::Case {
                scrutinee,
                branches,
            } => {
                self.case(scrutinee, branches, expected, expr.span);
                self.note(expr.span, expected);
            }
            ExprKind::Let { decls, body } => {
                self.let_decls(decls);
                self.check(body, expected);
                self.note(expr.span, expected);
            }
            _ => {
                self.expected_types.push((expr.span, expected));
                let found = self.infer(expr);
                self.unify_at(expected, found, expr.span);
            }
        });
    }

    fn infer(&mut self, expr: &Expr) -> Idx {
        let ty = elm_ir::ensure_sufficient_stack(|| self.infer_inner(expr));
        self.note(expr.span, ty);
        ty
    }

    fn infer_inner(&mut self, expr: &Expr) -> Idx {
        match &expr.kind {
            ExprKind::Int(_) => self.engine.fresh_constrained(VarKind::Number),
            ExprKind::Float(_) => Idx::FLOAT,
            ExprKind::Str(_) => Idx::STRING,
            ExprKind::Char(_) => Idx::CHAR,
            ExprKind::Unit => Idx::UNIT,
            ExprKind::Error => Idx::ERROR,
            ExprKind::Var(name) => self.reference_type(name.span, Namespace::Value),
            ExprKind::Ctor(name) => self.reference_type(name.span, Namespace::Constructor),
            ExprKind::OperatorRef(op) => {
                if self.fixity(op).is_none() {
                    self.diagnostics
                        .push(elm_diagnostic::unknown_operator(op.span, &op.name));
                }
                self.operator_type(op).unwrap_or(Idx::ERROR)
            }
            ExprKind::Paren(inner) => self.infer(inner),
            ExprKind::Accessor(field) => {
                let (record, field_ty) = self.open_record(field);
                self.engine.pool_mut().function(record, field_ty)
            }
            ExprKind::Access { record, field } => {
                let found = self.infer(record);
                let (expected, field_ty) = self.open_record(field);
                if self.unify_at(expected, found, record.span) {
                    field_ty
                } else {
                    Idx::ERROR
                }
            }
            ExprKind::Call { func, args } => {
                let func_ty = self.infer(func);
                self.apply(func_ty, args, func.span)
            }
            ExprKind::BinOps { first, rest } => {
                let fixities: Vec<Option<Fixity>> = rest.iter().map(|(op, _)| self.fixity(op)).collect();
                let (tree, diagnostics) = reassociate(first, rest, &fixities);
                self.diagnostics.extend(diagnostics);
                self.infer_tree(&tree, rest)
            }
            ExprKind::Negate(inner) => {
                let number = self.engine.fresh_constrained(VarKind::Number);
                self.check(inner, number);
                number
            }
            ExprKind::Lambda { params, body } => self.infer_function(params, body),
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.check(cond, Idx::BOOL);
                let ty = self.infer(then_branch);
                self.check(else_branch, ty);
                ty
            }
            ExprKind::Case {
                scrutinee,
                branches,
            } => {
                let result = self.engine.fresh_var();
                self.case(scrutinee, branches, result, expr.span);
                result
            }
            ExprKind::Let { decls, body } => {
                self.let_decls(decls);
                self.infer(body)
            }
            ExprKind::Record(fields) => {
                let fields: Vec<(Name, Idx)> = fields
                    .iter()
                    .map(|f| (Name::from(f.name.name.as_str()), self.infer(&f.value)))
                    .collect();
                self.engine.pool_mut().record(fields, None)
            }
            ExprKind::RecordUpdate { base, fields } => {
                let base_ty = self.reference_type(base.span, Namespace::Value);
                let mut ok = true;
                for field in fields {
                    let value = self.infer(&field.value);
                    let ext = self.engine.fresh_var();
                    let expected = self
                        .engine
                        .pool_mut()
                        .record(vec![(Name::from(field.name.name.as_str()), value)], Some(ext));
                    ok &= self.unify_at(expected, base_ty, field.name.span);
                }
                if ok {
                    base_ty
                } else {
                    Idx::ERROR
                }
            }
            ExprKind::Tuple(items) => {
                let items: Vec<Idx> = items.iter().map(|item| self.infer(item)).collect();
                self.engine.pool_mut().tuple(&items)
            }
            ExprKind::List(items) => {
                let elem = self.engine.fresh_var();
                for item in items {
                    self.check(item, elem);
                }
                self.engine.pool_mut().list(elem)
            }
        }
    }

    /// `{ r | field : t }` and `t`.
    fn open_record(&mut self, field: &Ident) -> (Idx, Idx) {
        let field_ty = self.engine.fresh_var();
        let ext = self.engine.fresh_var();
        let record = self
            .engine
            .pool_mut()
            .record(vec![(Name::from(field.name.as_str()), field_ty)], Some(ext));
        (record, field_ty)
    }

    /// Apply a function of type `func` to `args`, one argument at a time.
    fn apply(&mut self, func: Idx, args: &[Expr], callee: Span) -> Idx {
        let mut current = func;
        for arg in args {
            let resolved = self.engine.resolve(current);
            if resolved.is_error() {
                self.infer(arg);
                continue;
            }
            let (param, ret) = match self.engine.pool().as_function(resolved) {
                Some(parts) => parts,
                None => {
                    let param = self.engine.fresh_var();
                    let ret = self.engine.fresh_var();
                    let function = self.engine.pool_mut().function(param, ret);
                    if !self.unify_at(function, resolved, callee) {
                        self.infer(arg);
                        current = Idx::ERROR;
                        continue;
                    }
                    (param, ret)
                }
            };
            self.check(arg, param);
            current = ret;
        }
        current
    }

    fn case(&mut self, scrutinee: &Expr, branches: &[CaseBranch], result: Idx, span: Span) {
        let subject = self.infer(scrutinee);
        for branch in branches {
            self.check_pattern(&branch.pattern, subject);
            self.check(&branch.body, result);
        }
        if branches.is_empty() {
            return;
        }
        let subject_ty = self.engine.pool().export(subject);
        let patterns: Vec<&Pattern> = branches.iter().map(|b| &b.pattern).collect();
        let file = self.file;
        let spell = |module: &str, ctor: &str| constructor_spelling(file, module, ctor);
        let missing = exhaustive::missing_patterns(self.oracle, &spell, &subject_ty, &patterns);
        if !missing.is_empty() {
            self.diagnostics.push(
                Diagnostic::error(ErrorCode::E3003)
                    .with_message(format!(
                        "this `case` does not have branches for: {}",
                        missing.join(", ")
                    ))
                    .with_label(span, "missing branches")
                    .with_data(DiagnosticData::MissingCaseBranches { missing }),
            );
        }
    }

    // Names

    fn reference_type(&mut self, span: Span, namespace: Namespace) -> Idx {
        let Some(reference) = self.file.reference(span, namespace) else {
            return Idx::ERROR;
        };
        match &reference.target {
            Target::Local { span: binding } => match self.locals.get(binding).cloned() {
                Some(scheme) => self.engine.instantiate(&scheme),
                None => self.engine.fresh_var(),
            },
            Target::TopLevel(def) => {
                let def = def.clone();
                self.top_level_type(&def)
            }
            Target::Unresolved => Idx::ERROR,
        }
    }

    fn top_level_type(&mut self, def: &Definition) -> Idx {
        if let Some((own, self_var)) = &self.self_ref {
            if own.same_symbol(def) {
                return *self_var;
            }
        }
        let ty = match def.namespace {
            Namespace::Constructor => constructor_type(self.oracle, def),
            _ => self.oracle.value_type(def).or_else(|| {
                tracing::debug!(name = %def.name, "recursive reference typed monomorphically");
                None
            }),
        };
        match ty {
            Some(ty) => self.instantiate(&ty),
            None if def.namespace == Namespace::Constructor => Idx::ERROR,
            None => self.engine.fresh_var(),
        }
    }

    /// Declaration behind an operator occurrence.
    fn operator_definition(&self, op: &Ident) -> Option<Definition> {
        self.file
            .reference(op.span, Namespace::Operator)?
            .definition()
            .cloned()
    }

    fn fixity(&self, op: &Ident) -> Option<Fixity> {
        let def = self.operator_definition(op)?;
        let info = self.oracle.resolved(&def.uri)?.interface.infix(&def.name)?.clone();
        Some(Fixity {
            precedence: i8::try_from(info.precedence).unwrap_or(i8::MAX),
            assoc: info.assoc,
        })
    }

    fn operator_type(&mut self, op: &Ident) -> Option<Idx> {
        let def = self.operator_definition(op)?;
        let home = self.oracle.resolved(&def.uri)?;
        let function = home.interface.infix(&def.name)?.function.clone();
        let function = home.definition_of(Namespace::Value, &function)?;
        Some(self.top_level_type(&function))
    }

    fn infer_tree(&mut self, tree: &OpTree<'_>, rest: &[(Ident, Expr)]) -> Idx {
        match tree {
            OpTree::Operand(expr) => self.infer(expr),
            OpTree::Binary { op, left, right } => {
                let operator = rest.get(*op).map(|(ident, _)| ident);
                let op_ty = operator.and_then(|ident| self.operator_type(ident));
                let ty = match op_ty {
                    Some(op_ty) => {
                        let mut current = op_ty;
                        for side in [left, right] {
                            let resolved = self.engine.resolve(current);
                            match self.engine.pool().as_function(resolved) {
                                Some((param, ret)) => {
                                    self.check_tree(side, rest, param);
                                    current = ret;
                                }
                                None => {
                                    self.infer_tree(side, rest);
                                    current = Idx::ERROR;
                                }
                            }
                        }
                        current
                    }
                    None => {
                        self.infer_tree(left, rest);
                        self.infer_tree(right, rest);
                        Idx::ERROR
                    }
                };
                self.note(tree.span(), ty);
                ty
            }
        }
    }

    fn check_tree(&mut self, tree: &OpTree<'_>, rest: &[(Ident, Expr)], expected: Idx) {
        match tree {
            OpTree::Operand(expr) => self.check(expr, expected),
            OpTree::Binary { .. } => {
                let found = self.infer_tree(tree, rest);
                self.unify_at(expected, found, tree.span());
            }
        }
    }

    // Patterns

    fn check_pattern(&mut self, pattern: &Pattern, expected: Idx) {
        elm_ir::ensure_sufficient_stack(|| self.check_pattern_inner(pattern, expected));
    }

    fn check_pattern_inner(&mut self, pattern: &Pattern, expected: Idx) {
        let span = pattern.span;
        self.expected_types.push((span, expected));
        match &pattern.kind {
            PatternKind::Wildcard | PatternKind::Error => {}
            PatternKind::Var(_) => self.bind(span, expected),
            PatternKind::Alias { pattern, name } => {
                self.check_pattern(pattern, expected);
                self.bind(name.span, expected);
            }
            PatternKind::Int(_) => {
                let number = self.engine.fresh_constrained(VarKind::Number);
                self.unify_at(expected, number, span);
            }
            PatternKind::Str(_) => {
                self.unify_at(expected, Idx::STRING, span);
            }
            PatternKind::Char(_) => {
                self.unify_at(expected, Idx::CHAR, span);
            }
            PatternKind::Unit => {
                self.unify_at(expected, Idx::UNIT, span);
            }
            PatternKind::Tuple(items) => {
                let tys: Vec<Idx> = items.iter().map(|_| self.engine.fresh_var()).collect();
                let tuple = self.engine.pool_mut().tuple(&tys);
                self.unify_at(expected, tuple, span);
                for (item, ty) in items.iter().zip(tys) {
                    self.check_pattern(item, ty);
                }
            }
            PatternKind::List(items) => {
                let elem = self.engine.fresh_var();
                let list = self.engine.pool_mut().list(elem);
                self.unify_at(expected, list, span);
                for item in items {
                    self.check_pattern(item, elem);
                }
            }
            PatternKind::Cons { head, tail } => {
                let elem = self.engine.fresh_var();
                let list = self.engine.pool_mut().list(elem);
                self.unify_at(expected, list, span);
                self.check_pattern(head, elem);
                self.check_pattern(tail, list);
            }
            PatternKind::Record(fields) => {
                let tys: Vec<(Name, Idx)> = fields
                    .iter()
                    .map(|f| (Name::from(f.name.as_str()), self.engine.fresh_var()))
                    .collect();
                let ext = self.engine.fresh_var();
                let record = self.engine.pool_mut().record(tys.clone(), Some(ext));
                self.unify_at(expected, record, span);
                for (field, (_, ty)) in fields.iter().zip(tys) {
                    self.bind(field.span, ty);
                }
            }
            PatternKind::Ctor { name, args } => {
                let mut current = self.reference_type(name.span, Namespace::Constructor);
                for arg in args {
                    let resolved = self.engine.resolve(current);
                    match self.engine.pool().as_function(resolved) {
                        Some((param, ret)) => {
                            self.check_pattern(arg, param);
                            current = ret;
                        }
                        None => {
                            self.check_pattern(arg, Idx::ERROR);
                            current = Idx::ERROR;
                        }
                    }
                }
                self.unify_at(expected, current, span);
            }
        }
    }
}

/// How `file` can write constructor `ctor` of `module`: bare when the
/// unqualified name reaches it, otherwise through an import's qualifier.
fn constructor_spelling(file: &ResolvedFile, module: &str, ctor: &str) -> String {
    let unqualified = file
        .scope
        .lookup(Namespace::Constructor, ctor)
        .is_some_and(|entry| entry.definition.module == module);
    if unqualified || file.interface.module == module {
        return ctor.to_string();
    }
    let qualifier = file
        .imports
        .iter()
        .find(|import| import.module == module)
        .map_or(module, |import| import.qualifier.as_str());
    format!("{qualifier}.{ctor}")
}
