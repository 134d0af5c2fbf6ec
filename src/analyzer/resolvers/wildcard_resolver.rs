use crate::{
    analyzer::{AnalyzerError, Scope},
    ast::ScalarExpr,
};

/// One column produced by a wildcard: source name, position in the source, column name.
pub type ExpandedColumn = (String, usize, String);

pub struct WildcardResolver;

impl WildcardResolver {
    /// Expands `*` over every source of the scope in order, or `src.*` over
    /// one source. Fails when a source involved has no known column list.
    pub fn expand_wildcard(expr: &ScalarExpr, scope: &Scope) -> Result<Vec<ExpandedColumn>, AnalyzerError> {
        match expr {
            ScalarExpr::WildCard => {
                if scope.sources.is_empty() {
                    return Err(AnalyzerError::UnexpandableWildcard { scope: scope.id, source: None });
                }
                let mut result = Vec::new();
                for (visible, source) in &scope.sources {
                    let columns = source.columns.as_ref().ok_or_else(|| AnalyzerError::UnexpandableWildcard {
                        scope: scope.id,
                        source: Some(visible.clone()),
                    })?;
                    for (position, column) in columns.iter().enumerate() {
                        result.push((visible.clone(), position, column.clone()));
                    }
                }
                Ok(result)
            }
            ScalarExpr::WildCardWithCollection(collection) => {
                let source = scope.sources.get(collection)
                    .ok_or_else(|| AnalyzerError::UnknownCollection(collection.clone()))?;
                let columns = source.columns.as_ref().ok_or_else(|| AnalyzerError::UnexpandableWildcard {
                    scope: scope.id,
                    source: Some(collection.clone()),
                })?;
                Ok(columns.iter().enumerate().map(|(position, column)| (collection.clone(), position, column.clone())).collect())
            }
            _ => Ok(vec![]),
        }
    }

    /// Sources a wildcard reads from, whether or not it can be expanded.
    pub fn covered_sources(expr: &ScalarExpr, scope: &Scope) -> Vec<String> {
        match expr {
            ScalarExpr::WildCard => scope.sources.keys().cloned().collect(),
            ScalarExpr::WildCardWithCollection(collection) if scope.sources.contains_key(collection) => vec![collection.clone()],
            _ => vec![],
        }
    }
}
