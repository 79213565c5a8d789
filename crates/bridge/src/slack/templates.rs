//! Message template sources.
//!
//! Templates are JSON documents containing `${name}` placeholders. They are
//! looked up by file name (e.g. `success.json`); the empty name selects
//! [`DEFAULT_TEMPLATE`].

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;

/// Template used when no template is configured for a status.
pub const DEFAULT_TEMPLATE: &str = "default.json";

/// Compiled-in copy of `templates/default.json`.
const BUILTIN_DEFAULT: &str = include_str!("../../templates/default.json");

/// Errors loading or expanding a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// No template with this name exists.
    #[error("Template not found: {0}")]
    NotFound(String),

    /// Template names are plain file names.
    #[error("Invalid template name: {0}")]
    InvalidName(String),

    /// The expanded template is not a valid message.
    #[error("Template {name} did not produce a valid message: {source}")]
    Invalid {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// Reading the template failed.
    #[error("Failed to read template {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Key to template text lookup.
pub trait TemplateSource: Send + Sync {
    /// Load the raw text of a template.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::NotFound` if the template does not exist.
    fn load(&self, name: &str) -> Result<String, TemplateError>;
}

/// Templates read from a directory on disk.
///
/// `default.json` falls back to the compiled-in template when the directory
/// does not provide one.
#[derive(Debug, Clone)]
pub struct DirectoryTemplates {
    dir: PathBuf,
}

impl DirectoryTemplates {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl TemplateSource for DirectoryTemplates {
    fn load(&self, name: &str) -> Result<String, TemplateError> {
        validate_name(name)?;

        match std::fs::read_to_string(self.dir.join(name)) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if name == DEFAULT_TEMPLATE {
                    Ok(BUILTIN_DEFAULT.to_string())
                } else {
                    Err(TemplateError::NotFound(name.to_string()))
                }
            }
            Err(source) => Err(TemplateError::Io {
                name: name.to_string(),
                source,
            }),
        }
    }
}

/// Templates held in memory.
///
/// Always includes the built-in `default.json` unless overridden.
#[derive(Debug, Clone)]
pub struct StaticTemplates {
    templates: HashMap<String, String>,
}

impl Default for StaticTemplates {
    fn default() -> Self {
        Self {
            templates: HashMap::from([(DEFAULT_TEMPLATE.to_string(), BUILTIN_DEFAULT.to_string())]),
        }
    }
}

impl StaticTemplates {
    /// Add or replace a template.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.templates.insert(name.into(), text.into());
        self
    }
}

impl TemplateSource for StaticTemplates {
    fn load(&self, name: &str) -> Result<String, TemplateError> {
        self.templates
            .get(name)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))
    }
}

fn validate_name(name: &str) -> Result<(), TemplateError> {
    let is_plain = !name.is_empty()
        && !name.contains(['/', '\\'])
        && name != "."
        && name != "..";
    if is_plain {
        Ok(())
    } else {
        Err(TemplateError::InvalidName(name.to_string()))
    }
}
