//! Translation configuration.
//!
//! Example `codetrans.toml`:
//! ```toml
//! target = "kotlin"
//! indent = "    "
//! entry_method = "start"
//!
//! [classification]
//! api_annotations = ["io.vertx.codegen.annotations.VertxGen"]
//! ```

use crate::output::Target;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Error raised while loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslateConfig {
    /// Output language.
    pub target: Target,
    /// Indentation unit used by the writers.
    pub indent: String,
    /// Method whose body is the program of a unit.
    pub entry_method: String,
    /// Split single-parameter async-result callbacks into success/failure bodies.
    pub async_result_idiom: bool,
    /// Keep blank lines and line comments found between statements.
    pub preserve_fragments: bool,
    pub classification: Classification,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            target: Target::default(),
            indent: "  ".to_string(),
            entry_method: "start".to_string(),
            async_result_idiom: true,
            preserve_fragments: true,
            classification: Classification::default(),
        }
    }
}

impl TranslateConfig {
    pub fn for_target(target: Target) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// Qualified names that decide which capability a type reference gets.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Classification {
    pub api_annotations: Vec<String>,
    pub data_object_annotations: Vec<String>,
    pub json_object_class: String,
    pub json_array_class: String,
    pub async_result_class: String,
    pub throwable_class: String,
    pub console_class: String,
    pub arrays_class: String,
    pub map_classes: Vec<String>,
    pub list_classes: Vec<String>,
}

impl Default for Classification {
    fn default() -> Self {
        Self {
            api_annotations: vec!["io.vertx.codegen.annotations.VertxGen".to_string()],
            data_object_annotations: vec!["io.vertx.codegen.annotations.DataObject".to_string()],
            json_object_class: "io.vertx.core.json.JsonObject".to_string(),
            json_array_class: "io.vertx.core.json.JsonArray".to_string(),
            async_result_class: "io.vertx.core.AsyncResult".to_string(),
            throwable_class: "java.lang.Throwable".to_string(),
            console_class: "java.lang.System".to_string(),
            arrays_class: "java.util.Arrays".to_string(),
            map_classes: vec![
                "java.util.Map".to_string(),
                "java.util.HashMap".to_string(),
                "java.util.LinkedHashMap".to_string(),
            ],
            list_classes: vec![
                "java.util.List".to_string(),
                "java.util.ArrayList".to_string(),
                "java.util.LinkedList".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let config = TranslateConfig::from_toml_str("").unwrap();
        assert_eq!(config, TranslateConfig::default());
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let config = TranslateConfig::from_toml_str(
            r#"
target = "ruby"
async_result_idiom = false

[classification]
json_object_class = "org.example.Json"
"#,
        )
        .unwrap();
        assert_eq!(config.target, Target::Ruby);
        assert!(!config.async_result_idiom);
        assert!(config.preserve_fragments);
        assert_eq!(config.classification.json_object_class, "org.example.Json");
        assert_eq!(config.classification.json_array_class, "io.vertx.core.json.JsonArray");
    }

    #[test]
    fn unknown_target_is_rejected() {
        let err = TranslateConfig::from_toml_str("target = \"cobol\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
