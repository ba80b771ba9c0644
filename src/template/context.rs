//! Evaluation context for variables and deferred redirect targets

use std::path::Path;

use thiserror::Error;
use toml::{Table, Value};

use crate::parser::ast::VarPath;

#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Failed to read context file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse context TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid variable assignment '{0}', expected KEY=VALUE")]
    InvalidAssignment(String),
}

/// Values visible to `{{ ... }}` outputs and `{% override variable %}`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    values: Table,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a context from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ContextError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load a context from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ContextError> {
        let values: Table = toml::from_str(content)?;
        Ok(Self { values })
    }

    /// Set a top-level value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder form of [`Context::insert`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Apply a `KEY=VALUE` assignment; the value is always a string
    pub fn assign(&mut self, assignment: &str) -> Result<(), ContextError> {
        match assignment.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                self.insert(key.trim(), value.to_string());
                Ok(())
            }
            _ => Err(ContextError::InvalidAssignment(assignment.to_string())),
        }
    }

    /// Walk a dotted path through tables and arrays
    pub fn lookup(&self, path: &VarPath) -> Option<&Value> {
        let mut segments = path.segments();
        let mut current = self.values.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Value::Table(table) => table.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Text shown for a variable; missing values render empty
    pub fn display(&self, path: &VarPath) -> String {
        self.lookup(path).map(display_value).unwrap_or_default()
    }
}

/// Strings render verbatim, everything else through its TOML form
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Datetime(d) => d.to_string(),
        other => other.to_string(),
    }
}
