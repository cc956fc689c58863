//! Pool-independent type trees.
//!
//! Inference runs in a per-declaration [`Pool`](crate::Pool); results that
//! outlive the run (declaration types, diagnostic payloads, inferred
//! signatures) are exported as `Ty`. Variables are named; their constraint
//! follows from the name (see [`VarKind::from_var_name`]).

use std::fmt;

use crate::VarKind;

/// An exported type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ty {
    Var(String),
    /// Type constructor application. `name` is canonical: `Module.Type`.
    App {
        name: String,
        args: Vec<Ty>,
    },
    Function(Box<Ty>, Box<Ty>),
    Tuple(Vec<Ty>),
    /// Fields are sorted by name.
    Record {
        fields: Vec<(String, Ty)>,
        ext: Option<String>,
    },
    Unit,
    Error,
}

impl Ty {
    pub fn app(name: impl Into<String>, args: Vec<Ty>) -> Self {
        Ty::App {
            name: name.into(),
            args,
        }
    }

    pub fn var(name: impl Into<String>) -> Self {
        Ty::Var(name.into())
    }

    /// `a -> b -> c` from parameters and a result.
    pub fn function(params: impl IntoIterator<Item = Ty>, ret: Ty) -> Self {
        let params: Vec<Ty> = params.into_iter().collect();
        params
            .into_iter()
            .rev()
            .fold(ret, |acc, param| Ty::Function(Box::new(param), Box::new(acc)))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Ty::Error)
    }

    /// Whether the error type appears anywhere inside.
    pub fn contains_error(&self) -> bool {
        match self {
            Ty::Error => true,
            Ty::Var(_) | Ty::Unit => false,
            Ty::App { args, .. } | Ty::Tuple(args) => args.iter().any(Ty::contains_error),
            Ty::Function(a, b) => a.contains_error() || b.contains_error(),
            Ty::Record { fields, .. } => fields.iter().any(|(_, t)| t.contains_error()),
        }
    }

    /// Number of arrows at the top level.
    pub fn arity(&self) -> usize {
        match self {
            Ty::Function(_, rest) => 1 + rest.arity(),
            _ => 0,
        }
    }

    /// Parameter types and the final result.
    pub fn split_function(&self) -> (Vec<&Ty>, &Ty) {
        let mut params = Vec::new();
        let mut current = self;
        while let Ty::Function(param, rest) = current {
            params.push(param.as_ref());
            current = rest;
        }
        (params, current)
    }

    /// Variable names in order of first appearance.
    pub fn vars(&self) -> Vec<&str> {
        fn walk<'a>(ty: &'a Ty, out: &mut Vec<&'a str>) {
            match ty {
                Ty::Var(name) => {
                    if !out.contains(&name.as_str()) {
                        out.push(name);
                    }
                }
                Ty::App { args, .. } | Ty::Tuple(args) => {
                    args.iter().for_each(|a| walk(a, out));
                }
                Ty::Function(a, b) => {
                    walk(a, out);
                    walk(b, out);
                }
                Ty::Record { fields, ext } => {
                    if let Some(ext) = ext {
                        if !out.contains(&ext.as_str()) {
                            out.push(ext);
                        }
                    }
                    fields.iter().for_each(|(_, t)| walk(t, out));
                }
                Ty::Unit | Ty::Error => {}
            }
        }
        let mut out = Vec::new();
        walk(self, &mut out);
        out
    }

    /// Constraint of a variable name.
    pub fn var_kind(name: &str) -> VarKind {
        VarKind::from_var_name(name)
    }

    /// Equality up to a consistent renaming of variables.
    pub fn alpha_eq(&self, other: &Ty) -> bool {
        fn go<'a>(a: &'a Ty, b: &'a Ty, map: &mut Vec<(&'a str, &'a str)>) -> bool {
            match (a, b) {
                (Ty::Var(x), Ty::Var(y)) => same_var(x, y, map),
                (Ty::App { name: n1, args: a1 }, Ty::App { name: n2, args: a2 }) => {
                    n1 == n2 && a1.len() == a2.len() && a1.iter().zip(a2).all(|(x, y)| go(x, y, map))
                }
                (Ty::Function(p1, r1), Ty::Function(p2, r2)) => go(p1, p2, map) && go(r1, r2, map),
                (Ty::Tuple(a1), Ty::Tuple(a2)) => {
                    a1.len() == a2.len() && a1.iter().zip(a2).all(|(x, y)| go(x, y, map))
                }
                (
                    Ty::Record {
                        fields: f1,
                        ext: e1,
                    },
                    Ty::Record {
                        fields: f2,
                        ext: e2,
                    },
                ) => {
                    let exts = match (e1, e2) {
                        (None, None) => true,
                        (Some(x), Some(y)) => same_var(x, y, map),
                        _ => false,
                    };
                    exts && f1.len() == f2.len()
                        && f1
                            .iter()
                            .zip(f2)
                            .all(|((n1, t1), (n2, t2))| n1 == n2 && go(t1, t2, map))
                }
                (Ty::Unit, Ty::Unit) | (Ty::Error, Ty::Error) => true,
                _ => false,
            }
        }
        fn same_var<'a>(x: &'a str, y: &'a str, map: &mut Vec<(&'a str, &'a str)>) -> bool {
            if VarKind::from_var_name(x) != VarKind::from_var_name(y) {
                return false;
            }
            match map.iter().find(|(l, r)| *l == x || *r == y) {
                Some((l, r)) => *l == x && *r == y,
                None => {
                    map.push((x, y));
                    true
                }
            }
        }
        go(self, other, &mut Vec::new())
    }
}

/// Display name of a canonical type name: `Maybe.Maybe` prints as `Maybe`.
pub fn short_name(canonical: &str) -> &str {
    canonical.rsplit('.').next().unwrap_or(canonical)
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_ty(self, Prec::Top, f)
    }
}

/// Context a type is printed in, to decide on parentheses.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    Top,
    /// Left of an arrow.
    FunctionParam,
    /// Argument of a type constructor.
    AppArg,
}

fn write_ty(ty: &Ty, prec: Prec, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match ty {
        Ty::Var(name) => f.write_str(name),
        Ty::Unit => f.write_str("()"),
        Ty::Error => f.write_str("?"),
        Ty::App { name, args } => {
            if args.is_empty() {
                return f.write_str(short_name(name));
            }
            let parens = prec == Prec::AppArg;
            if parens {
                f.write_str("(")?;
            }
            f.write_str(short_name(name))?;
            for arg in args {
                f.write_str(" ")?;
                write_ty(arg, Prec::AppArg, f)?;
            }
            if parens {
                f.write_str(")")?;
            }
            Ok(())
        }
        Ty::Function(param, ret) => {
            let parens = prec >= Prec::FunctionParam;
            if parens {
                f.write_str("(")?;
            }
            write_ty(param, Prec::FunctionParam, f)?;
            f.write_str(" -> ")?;
            write_ty(ret, Prec::Top, f)?;
            if parens {
                f.write_str(")")?;
            }
            Ok(())
        }
        Ty::Tuple(items) => {
            f.write_str("( ")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_ty(item, Prec::Top, f)?;
            }
            f.write_str(" )")
        }
        Ty::Record { fields, ext } => {
            if fields.is_empty() {
                return match ext {
                    Some(ext) => f.write_str(ext),
                    None => f.write_str("{}"),
                };
            }
            f.write_str("{ ")?;
            if let Some(ext) = ext {
                write!(f, "{ext} | ")?;
            }
            for (i, (name, field)) in fields.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{name} : ")?;
                write_ty(field, Prec::Top, f)?;
            }
            f.write_str(" }")
        }
    }
}
