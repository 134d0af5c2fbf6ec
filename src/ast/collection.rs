use crate::ast::{Function, Query, ScalarExpr, write_dotted, write_list, write_source_alias};
use std::fmt;

/// A source listed in `FROM` or `JOIN`.
#[derive(Debug, Clone, PartialEq)]
pub enum Collection {
    /// Leaf table, or a reference to a CTE by name.
    Table { name: String, alias: Option<String>, column_aliases: Vec<String> },
    /// Derived table; `lateral` bodies may see the sources listed before them.
    Query { query: Box<Query>, alias: Option<String>, column_aliases: Vec<String>, lateral: bool },
    /// Table-valued call such as `UNNEST(...)`. Its arguments are opaque to the pass.
    Function { function: Function, alias: Option<String>, column_aliases: Vec<String> },
    /// Row constructor `(VALUES (...), (...))`. Opaque like `Function`.
    Values { rows: Vec<Vec<ScalarExpr>>, alias: Option<String>, column_aliases: Vec<String> },
}

impl Collection {
    pub fn table(name: impl Into<String>) -> Self {
        Collection::Table { name: name.into(), alias: None, column_aliases: vec![] }
    }

    pub fn table_as(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Collection::Table { name: name.into(), alias: Some(alias.into()), column_aliases: vec![] }
    }

    pub fn derived(query: impl Into<Query>) -> Self {
        Collection::Query { query: Box::new(query.into()), alias: None, column_aliases: vec![], lateral: false }
    }

    pub fn derived_as(query: impl Into<Query>, alias: impl Into<String>) -> Self {
        Collection::Query { query: Box::new(query.into()), alias: Some(alias.into()), column_aliases: vec![], lateral: false }
    }

    pub fn lateral(query: impl Into<Query>, alias: impl Into<String>) -> Self {
        Collection::Query { query: Box::new(query.into()), alias: Some(alias.into()), column_aliases: vec![], lateral: true }
    }

    pub fn function(function: Function) -> Self {
        Collection::Function { function, alias: None, column_aliases: vec![] }
    }

    pub fn values(rows: Vec<Vec<ScalarExpr>>) -> Self {
        Collection::Values { rows, alias: None, column_aliases: vec![] }
    }

    /// Sets the source alias, keeping any column alias list.
    pub fn with_alias(mut self, value: impl Into<String>) -> Self {
        self.set_alias(value.into());
        self
    }

    /// Sets the explicit column alias list (`AS q(c1, c2)`).
    pub fn with_column_aliases(mut self, names: &[&str]) -> Self {
        let names = names.iter().map(|name| name.to_string()).collect();
        match &mut self {
            Collection::Table { column_aliases, .. }
            | Collection::Query { column_aliases, .. }
            | Collection::Function { column_aliases, .. }
            | Collection::Values { column_aliases, .. } => *column_aliases = names,
        }
        self
    }

    pub fn alias(&self) -> Option<&str> {
        match self {
            Collection::Table { alias, .. }
            | Collection::Query { alias, .. }
            | Collection::Function { alias, .. }
            | Collection::Values { alias, .. } => alias.as_deref(),
        }
    }

    pub fn set_alias(&mut self, value: String) {
        match self {
            Collection::Table { alias, .. }
            | Collection::Query { alias, .. }
            | Collection::Function { alias, .. }
            | Collection::Values { alias, .. } => *alias = Some(value),
        }
    }

    pub fn column_aliases(&self) -> &[String] {
        match self {
            Collection::Table { column_aliases, .. }
            | Collection::Query { column_aliases, .. }
            | Collection::Function { column_aliases, .. }
            | Collection::Values { column_aliases, .. } => column_aliases,
        }
    }

    /// Name the rest of the query uses for this source.
    pub fn visible_name(&self) -> Option<&str> {
        match self {
            Collection::Table { name, alias, .. } => Some(alias.as_deref().unwrap_or(name)),
            _ => self.alias(),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collection::Table { name, alias, column_aliases } => {
                write_dotted(f, name)?;
                write_source_alias(f, alias.as_deref(), column_aliases)
            }
            Collection::Query { query, alias, column_aliases, lateral } => {
                if *lateral {
                    f.write_str("LATERAL ")?;
                }
                write!(f, "({})", query)?;
                write_source_alias(f, alias.as_deref(), column_aliases)
            }
            Collection::Function { function, alias, column_aliases } => {
                write!(f, "{}", function)?;
                write_source_alias(f, alias.as_deref(), column_aliases)
            }
            Collection::Values { rows, alias, column_aliases } => {
                f.write_str("(VALUES ")?;
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str("(")?;
                    write_list(f, row)?;
                    f.write_str(")")?;
                }
                f.write_str(")")?;
                write_source_alias(f, alias.as_deref(), column_aliases)
            }
        }
    }
}
