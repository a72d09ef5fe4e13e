use std::path::Path;

use serde::Deserialize;

use crate::brackets::DEFAULT_BRACKETS;
use crate::runtime::values::Record;
use crate::runtime::Value;
use crate::TmplError;

/// Compiler settings, usually read from a `tmpl.toml` file.
///
/// ```toml
/// brackets = "[[ ]]"
/// report_errors = false
///
/// [globals]
/// site = "docs"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TmplConfig {
    #[serde(default = "default_brackets")]
    pub brackets: String,
    /// When false, guarded runtime failures are dropped unless a handler is set.
    #[serde(default = "default_report_errors")]
    pub report_errors: bool,
    /// Extra global-scope values; they shadow builtins of the same name.
    #[serde(default)]
    pub globals: serde_json::Map<String, serde_json::Value>,
}

impl Default for TmplConfig {
    fn default() -> Self {
        Self {
            brackets: default_brackets(),
            report_errors: default_report_errors(),
            globals: serde_json::Map::new(),
        }
    }
}

fn default_brackets() -> String {
    DEFAULT_BRACKETS.to_string()
}

fn default_report_errors() -> bool {
    true
}

impl TmplConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, TmplError> {
        toml::from_str(text).map_err(|err| TmplError::Config(err.to_string()))
    }

    pub(crate) fn global_record(&self) -> Record {
        self.globals
            .iter()
            .map(|(name, value)| (name.clone(), Value::from(value.clone())))
            .collect()
    }
}

pub fn read_config(path: &Path) -> Result<TmplConfig, TmplError> {
    let text = std::fs::read_to_string(path)?;
    toml::from_str(&text)
        .map_err(|err| TmplError::Config(format!("failed to parse {}: {err}", path.display())))
}
