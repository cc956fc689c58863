//! Analysis configuration.
//!
//! Clients send it as JSON in their initialization options. Every field has
//! a default, so `{}` is a valid configuration.

use serde::Deserialize;

use crate::AnalysisError;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisConfig {
    /// Drop diagnostics with the same span and code as an earlier one.
    pub deduplicate_diagnostics: bool,
    pub suggestions: SuggestionConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            deduplicate_diagnostics: true,
            suggestions: SuggestionConfig::default(),
        }
    }
}

/// Per-rule switches for the suggestion tier.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct SuggestionConfig {
    pub unused_imports: bool,
    pub unused_imported_names: bool,
    pub unused_top_level: bool,
    pub missing_type_annotation: bool,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        SuggestionConfig {
            unused_imports: true,
            unused_imported_names: true,
            unused_top_level: true,
            missing_type_annotation: true,
        }
    }
}

impl AnalysisConfig {
    /// Parse the client's initialization options.
    pub fn from_json(text: &str) -> Result<Self, AnalysisError> {
        Ok(serde_json::from_str(text)?)
    }
}
