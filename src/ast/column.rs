use crate::ast::write_identifier;
use std::fmt;

#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Column {
    Name { name: String },
    WithCollection { collection: String, name: String },
}

impl Column {
    pub fn named(name: impl Into<String>) -> Self {
        Column::Name { name: name.into() }
    }

    pub fn qualified(collection: impl Into<String>, name: impl Into<String>) -> Self {
        Column::WithCollection { collection: collection.into(), name: name.into() }
    }

    pub fn name(&self) -> &str {
        match self {
            Column::Name { name } | Column::WithCollection { name, .. } => name,
        }
    }

    pub fn collection(&self) -> Option<&str> {
        match self {
            Column::Name { .. } => None,
            Column::WithCollection { collection, .. } => Some(collection),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Name { name } => write_identifier(f, name),
            Column::WithCollection { collection, name } => {
                write_identifier(f, collection)?;
                f.write_str(".")?;
                write_identifier(f, name)
            }
        }
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Name { .. } => write!(f, "Column::Name({})", self),
            Column::WithCollection { .. } => write!(f, "Column::WithCollection({})", self),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::Column;

    #[test]
    pub fn test_column_name() {
        let column = Column::named("column_01");

        assert_eq!(column.name(), "column_01");
        assert_eq!(column.collection(), None);
        assert_eq!(column.to_string(), "column_01");
    }

    #[test]
    pub fn test_column_with_collection() {
        let column = Column::qualified("collection", "column");

        assert_eq!(column.name(), "column");
        assert_eq!(column.collection(), Some("collection"));
        assert_eq!(column.to_string(), "collection.column");
    }

    #[test]
    pub fn test_column_quoted_parts() {
        let column = Column::qualified("my table", "full name");

        assert_eq!(column.to_string(), "\"my table\".\"full name\"");
    }
}
