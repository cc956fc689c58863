//! Library modules every program sees, and the implicit import set.
//!
//! The modules are ordinary Elm source with kernel-backed bodies. They are
//! loaded into the forest as virtual files: resolved and typed like any
//! other module, never diagnosed, never edited.

use std::sync::OnceLock;

use elm_ir::ast::Import;
use elm_ir::FileUri;

/// `(module name, source)` for every library module.
pub const MODULES: &[(&str, &str)] = &[
    ("Basics", include_str!("Basics.elm")),
    ("List", include_str!("List.elm")),
    ("Maybe", include_str!("Maybe.elm")),
    ("Result", include_str!("Result.elm")),
    ("String", include_str!("String.elm")),
    ("Char", include_str!("Char.elm")),
    ("Tuple", include_str!("Tuple.elm")),
    ("Debug", include_str!("Debug.elm")),
    ("Platform", include_str!("Platform.elm")),
    ("Platform.Cmd", include_str!("Platform/Cmd.elm")),
    ("Platform.Sub", include_str!("Platform/Sub.elm")),
];

/// Imports every module starts with.
const DEFAULT_IMPORTS: &str = "\
module DefaultImports__ exposing (..)

import Basics exposing (..)
import List exposing (List, (::))
import Maybe exposing (Maybe(..))
import Result exposing (Result(..))
import String exposing (String)
import Char exposing (Char)
import Tuple
import Debug
import Platform exposing (Program)
import Platform.Cmd as Cmd exposing (Cmd)
import Platform.Sub as Sub exposing (Sub)
";

/// The implicit import set, parsed once. Spans point into a private
/// snippet and are meaningless to callers.
pub fn default_imports() -> &'static [Import] {
    static IMPORTS: OnceLock<Vec<Import>> = OnceLock::new();
    IMPORTS.get_or_init(|| elm_parse::parse(DEFAULT_IMPORTS).imports)
}

/// Implicit imports that apply to `module`: a library module does not
/// import itself.
pub fn default_imports_for(module: &str) -> impl Iterator<Item = &'static Import> + '_ {
    default_imports()
        .iter()
        .filter(move |import| import.module.name != module)
}

pub fn uri_for(module: &str) -> FileUri {
    FileUri::virtual_module(module)
}
