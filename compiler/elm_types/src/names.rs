//! Canonical names of the types inference needs to know about.
//!
//! A canonical name is `Module.Type` with the defining module's full name.

pub const INT: &str = "Basics.Int";
pub const FLOAT: &str = "Basics.Float";
pub const BOOL: &str = "Basics.Bool";
pub const ORDER: &str = "Basics.Order";
pub const NEVER: &str = "Basics.Never";
pub const STRING: &str = "String.String";
pub const CHAR: &str = "Char.Char";
pub const LIST: &str = "List.List";
pub const MAYBE: &str = "Maybe.Maybe";
pub const RESULT: &str = "Result.Result";

/// Build a canonical name.
pub fn canonical(module: &str, name: &str) -> String {
    format!("{module}.{name}")
}

/// Split a canonical name into module and type name.
pub fn split(canonical: &str) -> (&str, &str) {
    match canonical.rfind('.') {
        Some(dot) => (&canonical[..dot], &canonical[dot + 1..]),
        None => ("", canonical),
    }
}
