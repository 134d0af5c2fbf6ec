use crate::ast::{Query, write_identifier, write_identifier_list};
use std::fmt;

/// One `name AS (query)` binding of a `WITH` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Cte {
    pub name: String,
    pub column_aliases: Vec<String>,
    pub query: Query,
}

impl Cte {
    pub fn new(name: impl Into<String>, query: impl Into<Query>) -> Self {
        Self { name: name.into(), column_aliases: vec![], query: query.into() }
    }

    pub fn with_column_aliases(mut self, names: &[&str]) -> Self {
        self.column_aliases = names.iter().map(|name| name.to_string()).collect();
        self
    }

    pub(crate) fn write_with(f: &mut fmt::Formatter<'_>, ctes: &[Cte]) -> fmt::Result {
        if ctes.is_empty() {
            return Ok(());
        }
        f.write_str("WITH ")?;
        for (i, cte) in ctes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", cte)?;
        }
        f.write_str(" ")
    }
}

impl fmt::Display for Cte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_identifier(f, &self.name)?;
        if !self.column_aliases.is_empty() {
            f.write_str("(")?;
            write_identifier_list(f, &self.column_aliases)?;
            f.write_str(")")?;
        }
        write!(f, " AS ({})", self.query)
    }
}
