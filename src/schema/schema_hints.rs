use std::{fmt, fs, path::Path};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::SchemaProvider;

/// Ordered column names of one leaf table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaDict {
    pub columns: Vec<String>,
}

impl SchemaDict {
    pub fn new(columns: &[&str]) -> Self {
        Self { columns: columns.iter().map(|c| c.to_string()).collect() }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}

/// Best-effort schema hints: table name -> ordered column list.
///
/// Deserializes from a JSON object such as `{"x": ["a", "b"], "db.y": ["c"]}`.
/// Insertion order of tables is kept, but only column order matters to the pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaHints {
    pub tables: IndexMap<String, SchemaDict>,
}

impl SchemaHints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: &str, columns: &[&str]) -> Self {
        self.insert(name, SchemaDict::new(columns));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, schema: SchemaDict) {
        self.tables.insert(name.into(), schema);
    }

    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_value(value: Value) -> Result<Self, SchemaError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

impl SchemaProvider for SchemaHints {
    /// Exact name first, then case-insensitive, then the last segment of a
    /// dotted name (`db.schema.x` falls back to `x`).
    fn schema_of(&self, table: &str) -> Option<&SchemaDict> {
        if let Some(schema) = self.tables.get(table) {
            return Some(schema);
        }
        if let Some((_, schema)) = self.tables.iter().find(|(name, _)| name.eq_ignore_ascii_case(table)) {
            return Some(schema);
        }
        match table.rsplit_once('.') {
            Some((_, last)) => self.schema_of(last),
            None => None,
        }
    }
}

#[derive(Debug)]
pub enum SchemaError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Io(err) => write!(f, "cannot read schema hints: {}", err),
            SchemaError::Json(err) => write!(f, "invalid schema hints: {}", err),
        }
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SchemaError::Io(err) => Some(err),
            SchemaError::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for SchemaError {
    fn from(value: std::io::Error) -> Self {
        SchemaError::Io(value)
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(value: serde_json::Error) -> Self {
        SchemaError::Json(value)
    }
}
