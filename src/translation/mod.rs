//! Translation table for user-facing error text

use crate::error::{ResponderError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

pub const ERROR_TITLE: &str = "messages.error.title";
pub const ERROR_DESCRIPTION: &str = "messages.error.description";
pub const ERROR_NOT_FOUND: &str = "messages.error.not_found";

/// Key/value translation table with dotted keys
#[derive(Debug, Clone)]
pub struct Translator {
    lines: HashMap<String, String>,
}

impl Default for Translator {
    fn default() -> Self {
        let mut translator = Self::empty();
        translator.insert(ERROR_TITLE, "Something went wrong");
        translator.insert(
            ERROR_DESCRIPTION,
            "We could not process your request. Please try again later.",
        );
        translator.insert(
            ERROR_NOT_FOUND,
            "The page you are looking for could not be found.",
        );
        translator
    }
}

impl Translator {
    pub fn empty() -> Self {
        Self {
            lines: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, line: impl Into<String>) -> &mut Self {
        self.lines.insert(key.into(), line.into());
        self
    }

    /// Look up a line. Missing keys translate to themselves.
    pub fn trans(&self, key: &str) -> String {
        self.lines
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    pub fn has(&self, key: &str) -> bool {
        self.lines.contains_key(key)
    }

    /// Merge a JSON object into the table.
    ///
    /// Nested objects flatten into dotted keys, so
    /// `{"messages": {"error": {"title": "Oops"}}}` sets `messages.error.title`.
    pub fn merge_json(&mut self, value: &Value) -> Result<()> {
        let Value::Object(map) = value else {
            return Err(ResponderError::config("translation file must hold a JSON object"));
        };
        for (key, value) in map {
            self.flatten(key.clone(), value)?;
        }
        Ok(())
    }

    pub fn load_json_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ResponderError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let value: Value = serde_json::from_str(&raw).map_err(|e| {
            ResponderError::config(format!("invalid JSON in {}: {}", path.display(), e))
        })?;
        self.merge_json(&value)?;
        tracing::debug!(path = %path.display(), lines = self.lines.len(), "loaded translations");
        Ok(())
    }

    fn flatten(&mut self, prefix: String, value: &Value) -> Result<()> {
        match value {
            Value::String(line) => {
                self.lines.insert(prefix, line.clone());
            }
            Value::Object(map) => {
                for (key, nested) in map {
                    self.flatten(format!("{}.{}", prefix, key), nested)?;
                }
            }
            other => {
                return Err(ResponderError::config(format!(
                    "translation {} must be a string, got {}",
                    prefix, other
                )));
            }
        }
        Ok(())
    }
}
