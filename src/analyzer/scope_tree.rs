use crate::{
    analyzer::{ColumnId, Correlation, Scope, ScopeBuilder, ScopeId, Source, SourceKind},
    ast::Query,
    config::PushdownConfig,
    schema::SchemaProvider,
};

/// Arena of every scope of one query. Scopes refer to each other by id only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeTree {
    pub scopes: Vec<Scope>,
    pub correlations: Vec<Correlation>,
    /// Reverse post-order: a scope comes before every scope it reads from.
    pub consumer_order: Vec<ScopeId>,
}

impl ScopeTree {
    pub fn build(query: &Query, schemas: &dyn SchemaProvider, config: &PushdownConfig) -> Self {
        ScopeBuilder::new(schemas, config).build(query)
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id]
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Output columns of a scope source that carry `name`.
    pub fn targets_of(&self, source: &Source, name: &str) -> Vec<ColumnId> {
        match (&source.kind, &source.columns) {
            (SourceKind::Scope(scope), Some(columns)) => columns
                .iter()
                .enumerate()
                .filter(|(_, column)| *column == name)
                .map(|(index, _)| ColumnId { scope: *scope, index })
                .collect(),
            _ => vec![],
        }
    }

    /// Enclosing scopes a name may bind to, innermost first, each with the
    /// number of its sources visible from below.
    pub fn enclosing_levels(&self, id: ScopeId) -> Vec<(ScopeId, usize)> {
        let mut levels = vec![];
        let mut current = &self.scopes[id];
        while current.kind.sees_enclosing() {
            let Some(parent_id) = current.parent else { break };
            let parent = &self.scopes[parent_id];
            levels.push((parent_id, current.outer_visible.unwrap_or(parent.sources.len())));
            current = parent;
        }
        levels
    }

    pub fn correlations_from(&self, id: ScopeId) -> impl Iterator<Item = &Correlation> {
        self.correlations.iter().filter(move |c| c.from == id)
    }
}
