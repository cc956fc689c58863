//! Written types to [`Ty`].
//!
//! Type names are resolved through the references the binder recorded, so
//! `Dict.Dict`, `D.Dict` and an exposed `Dict` all become the canonical
//! `Dict.Dict`. Aliases are expanded in their defining module, with their
//! parameters substituted.

use elm_ir::ast::{Decl, ParsedModule, TypeExpr, TypeExprKind, UnionDecl};
use elm_ir::Namespace;
use elm_types::{names, Ty};
use rustc_hash::FxHashMap;

use super::TypeOracle;
use crate::binder::{Definition, Reference, ResolvedFile};

/// Alias expansion deeper than this is treated as a cycle.
const MAX_ALIAS_DEPTH: u32 = 32;

type Subst = FxHashMap<String, Ty>;

/// Convert a type written in `file`.
pub fn annotation_type(oracle: &dyn TypeOracle, file: &ResolvedFile, ty: &TypeExpr) -> Ty {
    convert(oracle, file, ty, &Subst::default(), 0)
}

fn convert(oracle: &dyn TypeOracle, file: &ResolvedFile, ty: &TypeExpr, subst: &Subst, depth: u32) -> Ty {
    elm_ir::ensure_sufficient_stack(|| match &ty.kind {
        TypeExprKind::Var(name) => subst
            .get(name)
            .cloned()
            .unwrap_or_else(|| Ty::Var(name.clone())),
        TypeExprKind::Unit => Ty::Unit,
        TypeExprKind::Error => Ty::Error,
        TypeExprKind::Function { from, to } => Ty::Function(
            Box::new(convert(oracle, file, from, subst, depth)),
            Box::new(convert(oracle, file, to, subst, depth)),
        ),
        TypeExprKind::Tuple(items) => Ty::Tuple(
            items
                .iter()
                .map(|item| convert(oracle, file, item, subst, depth))
                .collect(),
        ),
        TypeExprKind::Record { extension, fields } => {
            let fields: Vec<(String, Ty)> = fields
                .iter()
                .map(|f| (f.name.name.clone(), convert(oracle, file, &f.ty, subst, depth)))
                .collect();
            match extension {
                None => record(fields, None),
                Some(ext) => match subst.get(&ext.name) {
                    None => record(fields, Some(ext.name.clone())),
                    Some(Ty::Var(var)) => record(fields, Some(var.clone())),
                    Some(Ty::Record {
                        fields: more,
                        ext,
                    }) => record(fields.into_iter().chain(more.iter().cloned()).collect(), ext.clone()),
                    Some(_) => Ty::Error,
                },
            }
        }
        TypeExprKind::Named { name, args } => {
            let Some(def) = file
                .reference(name.span, Namespace::Type)
                .and_then(Reference::definition)
            else {
                return Ty::Error;
            };
            let args = args
                .iter()
                .map(|arg| convert(oracle, file, arg, subst, depth))
                .collect();
            named(oracle, def, args, depth)
        }
    })
}

/// Record with sorted fields; the first occurrence of a field wins.
fn record(mut fields: Vec<(String, Ty)>, ext: Option<String>) -> Ty {
    let mut seen = rustc_hash::FxHashSet::default();
    fields.retain(|(name, _)| seen.insert(name.clone()));
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    Ty::Record { fields, ext }
}

fn named(oracle: &dyn TypeOracle, def: &Definition, args: Vec<Ty>, depth: u32) -> Ty {
    let Some(source) = oracle.source(&def.uri) else {
        return Ty::Error;
    };
    let alias = source.tree.decls.iter().find_map(|decl| match decl {
        Decl::Alias(alias) if alias.name.name == def.name => Some(alias),
        _ => None,
    });
    let Some(alias) = alias else {
        return Ty::App {
            name: names::canonical(&def.module, &def.name),
            args,
        };
    };
    if depth >= MAX_ALIAS_DEPTH || alias.params.len() != args.len() {
        tracing::debug!(alias = %def.name, depth, "alias not expanded");
        return Ty::Error;
    }
    let Some(alias_file) = oracle.resolved(&def.uri) else {
        return Ty::Error;
    };
    let subst: Subst = alias
        .params
        .iter()
        .map(|p| p.name.clone())
        .zip(args)
        .collect();
    convert(oracle, &alias_file, &alias.ty, &subst, depth + 1)
}

fn find_union<'t>(tree: &'t ParsedModule, name: &str) -> Option<&'t UnionDecl> {
    tree.decls.iter().find_map(|decl| match decl {
        Decl::Union(union) if union.name.name == name => Some(union),
        _ => None,
    })
}

/// Type of a constructor: a union variant or a record alias constructor.
pub fn constructor_type(oracle: &dyn TypeOracle, def: &Definition) -> Option<Ty> {
    let source = oracle.source(&def.uri)?;
    let file = oracle.resolved(&def.uri)?;
    let parent = def.parent.as_deref()?;

    if let Some(union) = find_union(&source.tree, parent) {
        let variant = union.variants.iter().find(|v| v.name.name == def.name)?;
        let result = Ty::App {
            name: names::canonical(&def.module, &union.name.name),
            args: union.params.iter().map(|p| Ty::Var(p.name.clone())).collect(),
        };
        let args: Vec<Ty> = variant
            .args
            .iter()
            .map(|arg| annotation_type(oracle, &file, arg))
            .collect();
        return Some(Ty::function(args, result));
    }

    let alias = source.tree.decls.iter().find_map(|decl| match decl {
        Decl::Alias(alias) if alias.name.name == def.name => Some(alias),
        _ => None,
    })?;
    let TypeExprKind::Record { fields, .. } = &alias.ty.kind else {
        return None;
    };
    // Constructor arguments follow the declaration order of the fields.
    let params: Vec<Ty> = fields
        .iter()
        .map(|f| annotation_type(oracle, &file, &f.ty))
        .collect();
    Some(Ty::function(params, annotation_type(oracle, &file, &alias.ty)))
}

/// Variants of the union `canonical` applied to `args`: name and argument
/// types of each, in declaration order.
pub fn union_variants(oracle: &dyn TypeOracle, canonical: &str, args: &[Ty]) -> Option<Vec<(String, Vec<Ty>)>> {
    let (module, name) = names::split(canonical);
    let uri = oracle.module_uri(module)?;
    let source = oracle.source(&uri)?;
    let file = oracle.resolved(&uri)?;
    let union = find_union(&source.tree, name)?;
    let subst: Subst = union
        .params
        .iter()
        .map(|p| p.name.clone())
        .zip(args.iter().cloned())
        .collect();
    Some(
        union
            .variants
            .iter()
            .map(|variant| {
                let args = variant
                    .args
                    .iter()
                    .map(|arg| convert(oracle, &file, arg, &subst, 0))
                    .collect();
                (variant.name.name.clone(), args)
            })
            .collect(),
    )
}
