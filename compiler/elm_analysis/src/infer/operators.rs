//! Infix re-association.
//!
//! The parser keeps `a + b * c` as a flat chain. Here the chain becomes a
//! tree using the precedence and associativity declared by each operator's
//! `infix` declaration. Operators without one are reported (E2005) and
//! treated as lowest-precedence, non-associative, so the rest of the
//! expression still gets a shape. Declared non-associative operators of
//! equal precedence side by side are reported (E2009) and grouped to the
//! left.

use elm_diagnostic::Diagnostic;
use elm_ir::ast::{Associativity, Expr, Ident};
use elm_ir::Span;

/// Fixity of one operator occurrence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Fixity {
    pub precedence: i8,
    pub assoc: Associativity,
}

impl Fixity {
    /// Fixity given to operators with no infix declaration in scope.
    pub const UNKNOWN: Fixity = Fixity {
        precedence: -1,
        assoc: Associativity::Non,
    };
}

/// A re-associated operator chain.
#[derive(Debug)]
pub enum OpTree<'a> {
    Operand(&'a Expr),
    Binary {
        /// Position of the operator in the chain.
        op: usize,
        left: Box<OpTree<'a>>,
        right: Box<OpTree<'a>>,
    },
}

impl OpTree<'_> {
    pub fn span(&self) -> Span {
        match self {
            OpTree::Operand(expr) => expr.span,
            OpTree::Binary { left, right, .. } => left.span().merge(right.span()),
        }
    }
}

/// Build the tree for `first op0 e0 op1 e1 ...`.
///
/// `fixities[i]` is the fixity of `rest[i].0`, `None` when the operator has
/// no infix declaration.
pub fn reassociate<'a>(
    first: &'a Expr,
    rest: &'a [(Ident, Expr)],
    fixities: &[Option<Fixity>],
) -> (OpTree<'a>, Vec<Diagnostic>) {
    let mut diagnostics: Vec<Diagnostic> = rest
        .iter()
        .zip(fixities)
        .filter(|(_, fixity)| fixity.is_none())
        .map(|((op, _), _)| elm_diagnostic::unknown_operator(op.span, &op.name))
        .collect();
    let mut climber = Climber {
        first,
        rest,
        fixities,
        next: 0,
        chained: Vec::new(),
    };
    let tree = climber.climb(i8::MIN);
    diagnostics.extend(climber.chained);
    (tree, diagnostics)
}

struct Climber<'a, 'f> {
    first: &'a Expr,
    rest: &'a [(Ident, Expr)],
    fixities: &'f [Option<Fixity>],
    /// Index of the next unconsumed operator.
    next: usize,
    chained: Vec<Diagnostic>,
}

impl<'a> Climber<'a, '_> {
    fn fixity(&self, op: usize) -> Fixity {
        self.fixities
            .get(op)
            .copied()
            .flatten()
            .unwrap_or(Fixity::UNKNOWN)
    }

    /// Operand to the left of operator `op`.
    fn operand_before(&self, op: usize) -> &'a Expr {
        match op.checked_sub(1) {
            None => self.first,
            Some(prev) => &self.rest[prev].1,
        }
    }

    fn climb(&mut self, min_precedence: i8) -> OpTree<'a> {
        let mut left = OpTree::Operand(self.operand_before(self.next));
        let mut previous: Option<usize> = None;
        while self.next < self.rest.len() {
            let op = self.next;
            let fixity = self.fixity(op);
            if fixity.precedence < min_precedence {
                break;
            }
            if let Some(prev) = previous {
                self.check_chain(prev, op);
            }
            previous = Some(op);
            self.next += 1;
            let right_min = match fixity.assoc {
                Associativity::Right => fixity.precedence,
                Associativity::Left | Associativity::Non => fixity.precedence.saturating_add(1),
            };
            let right = self.climb(right_min);
            left = OpTree::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        left
    }

    /// Report `prev` and `op` meeting at one level when both are declared
    /// non-associative with the same precedence.
    fn check_chain(&mut self, prev: usize, op: usize) {
        let declared = |i: usize| self.fixities.get(i).copied().flatten();
        let (Some(a), Some(b)) = (declared(prev), declared(op)) else {
            return;
        };
        if a.assoc == Associativity::Non
            && b.assoc == Associativity::Non
            && a.precedence == b.precedence
        {
            let (left, right) = (&self.rest[prev].0, &self.rest[op].0);
            self.chained.push(elm_diagnostic::non_associative_chain(
                right.span,
                &left.name,
                &right.name,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use elm_diagnostic::ErrorCode;
    use elm_ir::ast::{ExprKind, ParsedModule};
    use pretty_assertions::assert_eq;

    use super::*;

    fn chain(source: &str) -> ParsedModule {
        elm_parse::parse(source)
    }

    fn operands(module: &ParsedModule) -> (&Expr, &[(Ident, Expr)]) {
        let decl = module.value_decl("main").unwrap_or_else(|| panic!("no main"));
        match &decl.body.kind {
            ExprKind::BinOps { first, rest } => (first, rest),
            other => panic!("not an operator chain: {other:?}"),
        }
    }

    /// Render a tree with explicit parentheses, operands by source text.
    fn render(tree: &OpTree<'_>, source: &str, rest: &[(Ident, Expr)]) -> String {
        match tree {
            OpTree::Operand(expr) => expr.span.slice(source).to_string(),
            OpTree::Binary { op, left, right } => format!(
                "({} {} {})",
                render(left, source, rest),
                rest[*op].0.name,
                render(right, source, rest)
            ),
        }
    }

    fn fixity(op: &str) -> Option<Fixity> {
        let (precedence, assoc) = match op {
            "+" | "-" => (6, Associativity::Left),
            "*" => (7, Associativity::Left),
            "::" | "++" => (5, Associativity::Right),
            "|>" => (0, Associativity::Left),
            "<|" => (0, Associativity::Right),
            "==" => (4, Associativity::Non),
            _ => return None,
        };
        Some(Fixity { precedence, assoc })
    }

    fn shape(source: &str) -> (String, Vec<ErrorCode>) {
        let module = chain(source);
        let (first, rest) = operands(&module);
        let fixities: Vec<_> = rest.iter().map(|(op, _)| fixity(&op.name)).collect();
        let (tree, diagnostics) = reassociate(first, rest, &fixities);
        (
            render(&tree, source, rest),
            diagnostics.iter().map(|d| d.code).collect(),
        )
    }

    #[test]
    fn precedence_binds_tighter_operators_first() {
        assert_eq!(shape("main = a + b * c\n").0, "(a + (b * c))");
        assert_eq!(shape("main = a * b + c\n").0, "((a * b) + c)");
    }

    #[test]
    fn associativity_decides_equal_precedence() {
        assert_eq!(shape("main = a - b - c\n").0, "((a - b) - c)");
        assert_eq!(shape("main = a :: b :: c\n").0, "(a :: (b :: c))");
        assert_eq!(shape("main = f <| g <| x\n").0, "(f <| (g <| x))");
        assert_eq!(shape("main = x |> f |> g\n").0, "((x |> f) |> g)");
    }

    #[test]
    fn mixed_chain() {
        assert_eq!(
            shape("main = a ++ b :: c == d + e * f\n").0,
            "((a ++ (b :: c)) == (d + (e * f)))"
        );
    }

    #[test]
    fn chained_non_associative_operators_are_reported() {
        let (tree, codes) = shape("main = a == b == c\n");
        assert_eq!(tree, "((a == b) == c)");
        assert_eq!(codes, vec![ErrorCode::E2009]);

        // Parenthesized or separated by a tighter operator: fine.
        assert_eq!(shape("main = a == b + c\n").1, vec![]);
        assert_eq!(shape("main = (a == b) == c\n").1, vec![]);
        // Unknown operators get E2005 only.
        assert_eq!(
            shape("main = a +++ b +++ c\n").1,
            vec![ErrorCode::E2005, ErrorCode::E2005]
        );
    }

    #[test]
    fn unknown_operators_are_reported_once_and_still_associate() {
        let (tree, codes) = shape("main = a +++ b + c\n");
        assert_eq!(tree, "(a +++ (b + c))");
        assert_eq!(codes, vec![ErrorCode::E2005]);
    }
}
