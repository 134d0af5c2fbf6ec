use crate::ast::{ScalarExpr, write_identifier};
use std::fmt;

/// One entry of a select list: an expression and its optional output name.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub expression: ScalarExpr,
    pub alias: Option<String>,
}

impl Identifier {
    pub fn new(expression: ScalarExpr) -> Self {
        Self { expression, alias: None }
    }

    pub fn aliased(expression: ScalarExpr, alias: impl Into<String>) -> Self {
        Self { expression, alias: Some(alias.into()) }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)?;
        if let Some(alias) = &self.alias {
            f.write_str(" AS ")?;
            write_identifier(f, alias)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Identifier, ScalarExpr};

    #[test]
    pub fn test_identifier() {
        let result = Identifier::new(ScalarExpr::column("column"));

        assert_eq!(result.alias, None);
        assert_eq!(result.to_string(), "column");
    }

    #[test]
    pub fn test_identifier_with_alias() {
        let result = Identifier::aliased(ScalarExpr::qualified("x", "column"), "alias");

        assert_eq!(result.alias.as_deref(), Some("alias"));
        assert_eq!(result.to_string(), "x.column AS alias");
    }
}
