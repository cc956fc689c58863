//! Case exhaustiveness.
//!
//! Patterns are flattened into constructor applications (list literals
//! become `::`/`[]` chains, tuples a single anonymous constructor) and
//! checked column by column. When a column's constructors cover the whole
//! type every constructor is specialized; otherwise only the rows with a
//! wildcard in that column matter, and the uncovered constructors become
//! part of the missing patterns.

use elm_ir::ast::{Pattern, PatternKind};
use elm_types::{names, Ty};

use super::annotation::union_variants;
use super::TypeOracle;

const NIL: &str = "[]";
const CONS: &str = "::";
const TUPLE: &str = "#tuple";
const UNIT: &str = "()";

/// Bound on reported patterns per `case`.
const MAX_MISSING: usize = 16;

#[derive(Clone, Debug)]
enum Pat {
    Any,
    Ctor(String, Vec<Pat>),
}

/// Constructors of a type, as far as exhaustiveness is concerned.
enum Domain {
    /// Constructors with their argument types; `home` is the defining
    /// module for union types.
    Finite {
        ctors: Vec<(String, Vec<Ty>)>,
        home: Option<String>,
    },
    /// Literals: never covered without a wildcard.
    Infinite,
    /// Unresolved or erroneous; nothing is reported for it.
    Unknown,
}

/// Patterns a `case` on `scrutinee` with the given branches does not
/// cover, rendered as Elm source. Empty when the case is exhaustive or the
/// scrutinee type is not known.
///
/// `spell(module, ctor)` writes a union constructor the way the file
/// containing the `case` can refer to it.
pub fn missing_patterns(
    oracle: &dyn TypeOracle,
    spell: &dyn Fn(&str, &str) -> String,
    scrutinee: &Ty,
    patterns: &[&Pattern],
) -> Vec<String> {
    if matches!(scrutinee, Ty::Var(_) | Ty::Error) {
        return Vec::new();
    }
    let rows: Vec<Vec<Pat>> = patterns.iter().map(|p| vec![flatten(p)]).collect();
    let checker = Checker { oracle, spell };
    let mut missing: Vec<String> = checker
        .missing(&rows, std::slice::from_ref(scrutinee), 0)
        .into_iter()
        .filter_map(|mut witness| witness.pop())
        .collect();
    missing.dedup();
    missing.truncate(MAX_MISSING);
    missing
}

fn flatten(pattern: &Pattern) -> Pat {
    match &pattern.kind {
        PatternKind::Wildcard
        | PatternKind::Var(_)
        | PatternKind::Record(_)
        | PatternKind::Error => Pat::Any,
        PatternKind::Alias { pattern, .. } => flatten(pattern),
        PatternKind::Unit => Pat::Ctor(UNIT.to_string(), Vec::new()),
        PatternKind::Int(value) => Pat::Ctor(format!("#int {value}"), Vec::new()),
        PatternKind::Str(value) => Pat::Ctor(format!("#str {value}"), Vec::new()),
        PatternKind::Char(value) => Pat::Ctor(format!("#char {value}"), Vec::new()),
        PatternKind::Ctor { name, args } => {
            Pat::Ctor(name.name.clone(), args.iter().map(flatten).collect())
        }
        PatternKind::Tuple(items) => Pat::Ctor(TUPLE.to_string(), items.iter().map(flatten).collect()),
        PatternKind::Cons { head, tail } => {
            Pat::Ctor(CONS.to_string(), vec![flatten(head), flatten(tail)])
        }
        PatternKind::List(items) => items
            .iter()
            .rev()
            .fold(Pat::Ctor(NIL.to_string(), Vec::new()), |tail, item| {
                Pat::Ctor(CONS.to_string(), vec![flatten(item), tail])
            }),
    }
}

struct Checker<'o> {
    oracle: &'o dyn TypeOracle,
    spell: &'o dyn Fn(&str, &str) -> String,
}

impl Checker<'_> {
    fn domain(&self, ty: &Ty) -> Domain {
        let builtin = |ctors| Domain::Finite { ctors, home: None };
        match ty {
            Ty::Unit => builtin(vec![(UNIT.to_string(), Vec::new())]),
            Ty::Tuple(items) => builtin(vec![(TUPLE.to_string(), items.clone())]),
            Ty::App { name, args } if name == names::LIST => {
                let elem = args.first().cloned().unwrap_or(Ty::Error);
                builtin(vec![
                    (NIL.to_string(), Vec::new()),
                    (CONS.to_string(), vec![elem, ty.clone()]),
                ])
            }
            Ty::App { name, .. }
                if [names::INT, names::FLOAT, names::STRING, names::CHAR].contains(&name.as_str()) =>
            {
                Domain::Infinite
            }
            Ty::App { name, args } => match union_variants(self.oracle, name, args) {
                Some(ctors) => Domain::Finite {
                    ctors,
                    home: Some(names::split(name).0.to_string()),
                },
                None => Domain::Unknown,
            },
            Ty::Var(_) | Ty::Error | Ty::Function(..) | Ty::Record { .. } => Domain::Unknown,
        }
    }

    /// Uncovered value vectors for `rows`, one string per column.
    fn missing(&self, rows: &[Vec<Pat>], tys: &[Ty], depth: u32) -> Vec<Vec<String>> {
        let Some((ty, rest_tys)) = tys.split_first() else {
            return if rows.is_empty() { vec![Vec::new()] } else { Vec::new() };
        };
        if depth > 64 {
            return Vec::new();
        }

        let present: Vec<&str> = rows
            .iter()
            .filter_map(|row| match row.first() {
                Some(Pat::Ctor(name, _)) => Some(name.as_str()),
                _ => None,
            })
            .collect();

        let domain = self.domain(ty);
        if let Domain::Unknown = domain {
            if !present.is_empty() {
                return Vec::new();
            }
        }

        if let Domain::Finite { ctors, home } = &domain {
            let complete = ctors.iter().all(|(name, _)| present.contains(&name.as_str()));
            if complete {
                let mut out = Vec::new();
                for (name, arg_tys) in ctors {
                    let specialized = specialize(rows, name, arg_tys.len());
                    let tys: Vec<Ty> = arg_tys.iter().chain(rest_tys).cloned().collect();
                    for witness in self.missing(&specialized, &tys, depth + 1) {
                        let (args, rest) = witness.split_at(arg_tys.len().min(witness.len()));
                        let mut vector = vec![render(&self.display(home.as_deref(), name), args)];
                        vector.extend_from_slice(rest);
                        out.push(vector);
                        if out.len() >= MAX_MISSING {
                            return out;
                        }
                    }
                }
                return out;
            }
        }

        let defaults: Vec<Vec<Pat>> = rows
            .iter()
            .filter(|row| matches!(row.first(), Some(Pat::Any)))
            .map(|row| row[1..].to_vec())
            .collect();
        let witnesses = self.missing(&defaults, rest_tys, depth + 1);
        if witnesses.is_empty() {
            return Vec::new();
        }
        let heads: Vec<String> = match &domain {
            Domain::Finite { ctors, home } if !present.is_empty() => ctors
                .iter()
                .filter(|(name, _)| !present.contains(&name.as_str()))
                .map(|(name, args)| {
                    render(&self.display(home.as_deref(), name), &vec![String::from("_"); args.len()])
                })
                .collect(),
            _ => vec![String::from("_")],
        };
        let mut out = Vec::new();
        for witness in &witnesses {
            for head in &heads {
                let mut vector = vec![head.clone()];
                vector.extend_from_slice(witness);
                out.push(vector);
            }
        }
        out.truncate(MAX_MISSING);
        out
    }

    fn display(&self, home: Option<&str>, ctor: &str) -> String {
        match home {
            Some(module) => (self.spell)(module, ctor),
            None => ctor.to_string(),
        }
    }
}

/// Rows whose first column matches `name`, with its arguments spliced in.
fn specialize(rows: &[Vec<Pat>], name: &str, arity: usize) -> Vec<Vec<Pat>> {
    rows.iter()
        .filter_map(|row| {
            let (head, tail) = row.split_first()?;
            let mut out = match head {
                Pat::Any => vec![Pat::Any; arity],
                Pat::Ctor(ctor, args) if ctor == name => {
                    let mut args = args.clone();
                    args.resize(arity, Pat::Any);
                    args
                }
                Pat::Ctor(..) => return None,
            };
            out.extend_from_slice(tail);
            Some(out)
        })
        .collect()
}

fn render(name: &str, args: &[String]) -> String {
    match name {
        NIL | UNIT => name.to_string(),
        CONS => match args {
            [head, tail] => format!("{} :: {tail}", parenthesize(head)),
            _ => String::from("_ :: _"),
        },
        TUPLE => format!("( {} )", args.join(", ")),
        _ if args.is_empty() => name.to_string(),
        _ => {
            let args: Vec<String> = args.iter().map(|a| parenthesize(a)).collect();
            format!("{name} {}", args.join(" "))
        }
    }
}

fn parenthesize(pattern: &str) -> String {
    let bracketed = pattern.starts_with('(') || pattern.starts_with('[');
    if pattern.contains(' ') && !bracketed {
        format!("({pattern})")
    } else {
        pattern.to_string()
    }
}
