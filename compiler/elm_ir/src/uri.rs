//! Canonical file identifiers.

use std::fmt;
use std::sync::Arc;

/// Canonical URI of a workspace file (`file:///src/Main.elm`), or of a
/// virtual prelude module (`elm-prelude:///Basics.elm`).
///
/// Cheap to clone; compared and ordered by its text.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct FileUri(Arc<str>);

impl FileUri {
    /// Scheme used for the implicitly imported core modules.
    pub const VIRTUAL_SCHEME: &'static str = "elm-prelude://";

    pub fn new(uri: impl AsRef<str>) -> Self {
        FileUri(Arc::from(uri.as_ref()))
    }

    pub fn virtual_module(module_name: &str) -> Self {
        FileUri::new(format!(
            "{}/{}.elm",
            Self::VIRTUAL_SCHEME,
            module_name.replace('.', "/")
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_virtual(&self) -> bool {
        self.0.starts_with(Self::VIRTUAL_SCHEME)
    }
}

impl fmt::Debug for FileUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

impl fmt::Display for FileUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileUri {
    fn from(value: &str) -> Self {
        FileUri::new(value)
    }
}
