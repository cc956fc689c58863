//! Core diagnostic types.
//!
//! Every stage of the pipeline reports through one shape: [`Diagnostic`].
//! The structured [`DiagnosticData`] payload carries exactly what the
//! matching code actions need, so providers never re-derive facts from the
//! message text.

use std::fmt;

use elm_ir::{Namespace, Span};

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Information => write!(f, "info"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

/// The pipeline stage a diagnostic belongs to. `diagnose` concatenates the
/// tiers in declaration order.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticTier {
    Syntactic,
    Semantic,
    Suggestion,
}

/// A labeled span with a message.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Label {
    pub span: Span,
    pub message: String,
    pub is_primary: bool,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: false,
        }
    }
}

/// A literal replacement proposed by an external linter.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct LintFix {
    pub span: Span,
    pub replacement: String,
}

/// Structured payload attached to a diagnostic.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DiagnosticData {
    #[default]
    None,
    UnresolvedImport {
        module: String,
    },
    NameNotExposed {
        module: String,
        name: String,
        namespace: Namespace,
    },
    AmbiguousName {
        name: String,
        namespace: Namespace,
        /// Candidate modules, the chosen one first.
        candidates: Vec<String>,
    },
    UnknownName {
        name: String,
        qualifier: Option<String>,
        namespace: Namespace,
    },
    UnknownOperator {
        operator: String,
    },
    NonAssociativeChain {
        left: String,
        right: String,
    },
    DuplicateModule {
        module: String,
    },
    ExposedNameNotDefined {
        name: String,
    },
    DuplicateDefinition {
        name: String,
    },
    TypeMismatch {
        expected: String,
        found: String,
    },
    InfiniteType {
        var: String,
        ty: String,
    },
    MissingCaseBranches {
        /// Missing patterns, e.g. `Blue` or `Just _`, in declaration order.
        missing: Vec<String>,
    },
    RecordFieldMissing {
        field: String,
        record: String,
    },
    UnusedImport {
        module: String,
    },
    UnusedImportedName {
        module: String,
        name: String,
    },
    UnusedTopLevel {
        name: String,
    },
    MissingTypeAnnotation {
        name: String,
        inferred: String,
    },
    ExternalLint {
        rule: String,
        fixes: Vec<LintFix>,
    },
}

/// A diagnostic with all the context code actions and clients need.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    /// Primary location.
    pub span: Span,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    pub data: DiagnosticData,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            span: Span::DUMMY,
            labels: Vec::new(),
            notes: Vec::new(),
            data: DiagnosticData::None,
        }
    }

    #[cold]
    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    #[cold]
    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    pub fn hint(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Hint)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the primary span and label it.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.span = span;
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Set the primary span without a label.
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_data(mut self, data: DiagnosticData) -> Self {
        self.data = data;
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn tier(&self) -> DiagnosticTier {
        self.code.tier()
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.code, self.message)?;
        for label in &self.labels {
            let marker = if label.is_primary { "-->" } else { "   " };
            write!(f, "\n  {} {:?}: {}", marker, label.span, label.message)?;
        }
        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }
        Ok(())
    }
}

/// Create a "type mismatch" diagnostic.
pub fn type_mismatch(span: Span, expected: &str, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E3001)
        .with_message(format!(
            "type mismatch: expected `{expected}`, found `{found}`"
        ))
        .with_label(span, format!("this is `{found}`"))
        .with_data(DiagnosticData::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        })
}

/// Create an "unknown name" diagnostic.
pub fn unknown_name(
    span: Span,
    name: &str,
    qualifier: Option<&str>,
    namespace: Namespace,
) -> Diagnostic {
    let shown = match qualifier {
        Some(q) => format!("{q}.{name}"),
        None => name.to_string(),
    };
    Diagnostic::error(ErrorCode::E2004)
        .with_message(format!("cannot find {namespace} `{shown}`"))
        .with_label(span, "not found in this scope")
        .with_data(DiagnosticData::UnknownName {
            name: name.to_string(),
            qualifier: qualifier.map(str::to_string),
            namespace,
        })
}

/// Create an "unknown operator" diagnostic.
pub fn unknown_operator(span: Span, operator: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2005)
        .with_message(format!("no infix declaration for `{operator}` is in scope"))
        .with_label(span, "unknown operator")
        .with_data(DiagnosticData::UnknownOperator {
            operator: operator.to_string(),
        })
}

/// Create a diagnostic for `a == b == c`: two non-associative operators of
/// equal precedence with no parentheses between them.
pub fn non_associative_chain(span: Span, left: &str, right: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2009)
        .with_message(format!(
            "`{left}` and `{right}` are non-associative and cannot be chained"
        ))
        .with_label(span, "add parentheses to group these operators")
        .with_data(DiagnosticData::NonAssociativeChain {
            left: left.to_string(),
            right: right.to_string(),
        })
}
