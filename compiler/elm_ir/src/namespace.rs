//! Name kinds.

use std::fmt;

/// The kind of thing a name refers to. Each namespace has its own lookup
/// table; the same spelling may live in several at once (`type alias User`
/// is both a type and a constructor).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Namespace {
    Value,
    Type,
    Constructor,
    Operator,
    ModuleAlias,
}

impl Namespace {
    pub const ALL: [Namespace; 5] = [
        Namespace::Value,
        Namespace::Type,
        Namespace::Constructor,
        Namespace::Operator,
        Namespace::ModuleAlias,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Namespace::Value => "value",
            Namespace::Type => "type",
            Namespace::Constructor => "constructor",
            Namespace::Operator => "operator",
            Namespace::ModuleAlias => "module",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
