use crate::{
    analyzer::{AnalyzerError, Clause, ColumnId, Resolution, ScopeId, ScopeTree, Source},
    ast::Column,
};

pub struct ColumnResolver;

impl ColumnResolver {
    /// Binds a column reference made in `scope` while walking `clause`.
    ///
    /// Qualified names look at the local sources, then at enclosing scopes
    /// the current one can see. Unqualified names bind to the single local
    /// source exposing them; failing that to the single local source with
    /// unknown columns, then to an output alias (outside the projection),
    /// then to the single exposing source of an enclosing scope. In `ORDER BY`
    /// an output alias wins over everything.
    pub fn resolve(tree: &ScopeTree, scope: ScopeId, column: &Column, clause: Clause) -> Result<Resolution, AnalyzerError> {
        let current = tree.scope(scope);
        match column {
            Column::WithCollection { collection, name } => {
                if let Some(source) = current.sources.get(collection) {
                    let targets = Self::bind(tree, collection, source, name)?;
                    return Ok(Resolution::Source { source: collection.clone(), targets });
                }
                for (level, visible) in tree.enclosing_levels(scope) {
                    let outer = tree.scope(level);
                    let found = outer.sources.get_full(collection).filter(|(index, _, _)| *index < visible);
                    if let Some((_, _, source)) = found {
                        let targets = Self::bind(tree, collection, source, name)?;
                        return Ok(Resolution::Outer { scope: level, source: collection.clone(), targets });
                    }
                }
                Err(AnalyzerError::UnknownCollection(collection.clone()))
            }
            Column::Name { name } => {
                if clause == Clause::OrderBy && current.has_output(name) {
                    return Ok(Resolution::OutputAlias(name.clone()));
                }
                if let Some((source, targets)) = Self::unique(tree, current.sources.iter(), name)? {
                    return Ok(Resolution::Source { source, targets });
                }

                let unknown: Vec<&String> = current.sources.iter()
                    .filter(|(_, source)| source.columns.is_none())
                    .map(|(key, _)| key)
                    .collect();
                match unknown.as_slice() {
                    [] => {}
                    [only] => return Ok(Resolution::Source { source: (*only).clone(), targets: vec![] }),
                    _ => {
                        return Err(AnalyzerError::AmbiguousColumn {
                            name: name.clone(),
                            matches: unknown.iter().map(|key| (*key).clone()).collect(),
                        })
                    }
                }

                if clause != Clause::Projection && current.has_output(name) {
                    return Ok(Resolution::OutputAlias(name.clone()));
                }

                for (level, visible) in tree.enclosing_levels(scope) {
                    let outer = tree.scope(level);
                    if let Some((source, targets)) = Self::unique(tree, outer.sources.iter().take(visible), name)? {
                        return Ok(Resolution::Outer { scope: level, source, targets });
                    }
                }

                Err(AnalyzerError::UnknownColumn {
                    name: name.clone(),
                    candidates: current.sources.values()
                        .filter_map(|source| source.columns.as_ref())
                        .flatten()
                        .cloned()
                        .collect(),
                })
            }
        }
    }

    /// Every scope source the reference could mean, local first. Used to keep
    /// columns alive when a reference cannot be bound.
    pub fn candidates(tree: &ScopeTree, scope: ScopeId, column: &Column) -> Vec<(ScopeId, String, Vec<ColumnId>)> {
        let mut levels = vec![(scope, tree.scope(scope).sources.len())];
        levels.extend(tree.enclosing_levels(scope));

        let mut result = vec![];
        for (level, visible) in levels {
            for (key, source) in tree.scope(level).sources.iter().take(visible) {
                if source.scope().is_none() {
                    continue;
                }
                let matches = match column.collection() {
                    Some(collection) => collection == key.as_str(),
                    None => source.columns.is_none() || source.exposes(column.name()),
                };
                if matches {
                    result.push((level, key.clone(), tree.targets_of(source, column.name())));
                }
            }
        }
        result
    }

    fn unique<'s>(
        tree: &ScopeTree,
        sources: impl Iterator<Item = (&'s String, &'s Source)>,
        name: &str,
    ) -> Result<Option<(String, Vec<ColumnId>)>, AnalyzerError> {
        let matches: Vec<(&String, &Source)> = sources.filter(|(_, source)| source.exposes(name)).collect();
        match matches.as_slice() {
            [] => Ok(None),
            [(key, source)] => Ok(Some(((*key).clone(), tree.targets_of(source, name)))),
            _ => Err(AnalyzerError::AmbiguousColumn {
                name: name.to_string(),
                matches: matches.iter().map(|(key, _)| (*key).clone()).collect(),
            }),
        }
    }

    fn bind(tree: &ScopeTree, key: &str, source: &Source, name: &str) -> Result<Vec<ColumnId>, AnalyzerError> {
        match &source.columns {
            Some(columns) if !columns.iter().any(|c| c == name) => Err(AnalyzerError::UnknownColumn {
                name: format!("{}.{}", key, name),
                candidates: columns.clone(),
            }),
            _ => Ok(tree.targets_of(source, name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::{Collection, Predicate, ScalarExpr, Select},
        config::PushdownConfig,
        schema::SchemaHints,
    };

    fn hints() -> SchemaHints {
        SchemaHints::new()
            .with_table("x", &["a", "b"])
            .with_table("y", &["b", "c"])
    }

    fn tree(select: Select) -> ScopeTree {
        ScopeTree::build(&select.into(), &hints(), &PushdownConfig::new())
    }

    #[test]
    fn test_unqualified_binds_to_single_exposing_source() {
        let tree = tree(Select::new().project_all().from_table("x").from_table("y"));

        let resolved = ColumnResolver::resolve(&tree, 0, &Column::named("c"), Clause::Where).unwrap();
        assert_eq!(resolved, Resolution::Source { source: "y".into(), targets: vec![] });

        let ambiguous = ColumnResolver::resolve(&tree, 0, &Column::named("b"), Clause::Where);
        assert_eq!(
            ambiguous,
            Err(AnalyzerError::AmbiguousColumn { name: "b".into(), matches: vec!["x".into(), "y".into()] })
        );
    }

    #[test]
    fn test_qualified_targets_derived_outputs() {
        let inner = Select::new().project(ScalarExpr::column("a")).project(ScalarExpr::column("b")).from_table("x");
        let tree = tree(Select::new().project_all().from(Collection::derived_as(inner, "q")));

        let resolved = ColumnResolver::resolve(&tree, 0, &Column::qualified("q", "b"), Clause::Projection).unwrap();
        assert_eq!(resolved, Resolution::Source { source: "q".into(), targets: vec![ColumnId { scope: 1, index: 1 }] });

        let missing = ColumnResolver::resolve(&tree, 0, &Column::qualified("q", "z"), Clause::Projection);
        assert!(matches!(missing, Err(AnalyzerError::UnknownColumn { .. })));
    }

    #[test]
    fn test_unknown_schema_fallback_and_output_alias() {
        let tree = tree(Select::new().project_as(ScalarExpr::column("a"), "total").from_table("t"));

        let resolved = ColumnResolver::resolve(&tree, 0, &Column::named("anything"), Clause::Where).unwrap();
        assert_eq!(resolved, Resolution::Source { source: "t".into(), targets: vec![] });

        let alias = ColumnResolver::resolve(&tree, 0, &Column::named("total"), Clause::OrderBy).unwrap();
        assert_eq!(alias, Resolution::OutputAlias("total".into()));
    }

    #[test]
    fn test_correlated_reference_resolves_outward() {
        let sub = Select::new().project(ScalarExpr::column("c")).from_table("y");
        let tree = tree(
            Select::new()
                .project(ScalarExpr::column("a"))
                .from_table("x")
                .filter(Predicate::exists(sub)),
        );

        let resolved = ColumnResolver::resolve(&tree, 1, &Column::named("a"), Clause::Where).unwrap();
        assert_eq!(resolved, Resolution::Outer { scope: 0, source: "x".into(), targets: vec![] });

        let local = ColumnResolver::resolve(&tree, 1, &Column::named("b"), Clause::Where).unwrap();
        assert_eq!(local, Resolution::Source { source: "y".into(), targets: vec![] });
    }
}
