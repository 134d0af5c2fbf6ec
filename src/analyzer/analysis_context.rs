use crate::{analyzer::ScopeId, config::PushdownConfig, schema::SchemaProvider};

/// A CTE name visible at the current point of the walk.
#[derive(Debug, Clone, PartialEq)]
pub struct CteBinding {
    pub name: String,
    pub scope: ScopeId,
    pub column_aliases: Vec<String>,
}

pub struct AnalysisContext<'a> {
    /// access to schemas
    pub schemas: &'a dyn SchemaProvider,
    pub config: &'a PushdownConfig,
    /// CTEs in definition order; inner `WITH` clauses shadow outer ones
    pub ctes: Vec<CteBinding>,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(schemas: &'a dyn SchemaProvider, config: &'a PushdownConfig) -> Self {
        Self { schemas, config, ctes: vec![] }
    }

    pub fn add_cte(&mut self, name: impl Into<String>, scope: ScopeId, column_aliases: Vec<String>) {
        self.ctes.push(CteBinding { name: name.into(), scope, column_aliases });
    }

    pub fn find_cte(&self, name: &str) -> Option<&CteBinding> {
        self.ctes.iter().rev().find(|cte| cte.name == name)
    }

    /// Drops the CTEs a finished `WITH` clause introduced.
    pub fn leave_ctes(&mut self, mark: usize) {
        self.ctes.truncate(mark);
    }

    pub fn table_columns(&self, name: &str) -> Option<Vec<String>> {
        self.schemas.schema_of(name).map(|schema| schema.columns.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaHints;

    #[test]
    fn test_inner_cte_shadows_outer() {
        let hints = SchemaHints::new().with_table("x", &["a"]);
        let config = PushdownConfig::new();
        let mut ctx = AnalysisContext::new(&hints, &config);

        ctx.add_cte("c", 1, vec![]);
        let mark = ctx.ctes.len();
        ctx.add_cte("c", 4, vec!["z".into()]);
        assert_eq!(ctx.find_cte("c").map(|c| c.scope), Some(4));

        ctx.leave_ctes(mark);
        assert_eq!(ctx.find_cte("c").map(|c| c.scope), Some(1));
        assert_eq!(ctx.find_cte("x"), None);
        assert_eq!(ctx.table_columns("x"), Some(vec!["a".to_string()]));
    }
}
