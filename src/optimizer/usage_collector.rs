use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::trace;

use crate::{
    analyzer::{ColumnId, Origin, OutputOrigin, Resolution, ScopeBody, ScopeId, ScopeTree, Source},
    optimizer::ProjectionPruner,
};

/// Columns a scope's consumers read from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Usage {
    All,
    Columns(BTreeSet<usize>),
}

impl Usage {
    pub fn none() -> Self {
        Usage::Columns(BTreeSet::new())
    }

    pub fn add(&mut self, index: usize) {
        if let Usage::Columns(columns) = self {
            columns.insert(index);
        }
    }

    pub fn merge(&mut self, other: &Usage) {
        match (&mut *self, other) {
            (Usage::All, _) => {}
            (_, Usage::All) => *self = Usage::All,
            (Usage::Columns(columns), Usage::Columns(more)) => columns.extend(more.iter().copied()),
        }
    }
}

/// Output positions that survive pruning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Retained {
    All,
    Positions(BTreeSet<usize>),
}

impl Retained {
    pub fn contains(&self, position: usize) -> bool {
        match self {
            Retained::All => true,
            Retained::Positions(positions) => positions.contains(&position),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Retained::All)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageMap {
    /// Missing entries mean nobody references the scope by column: it keeps all.
    pub usage: HashMap<ScopeId, Usage>,
    pub retained: HashMap<ScopeId, Retained>,
    /// Scopes sitting inside pruned projection items.
    pub dead: HashSet<ScopeId>,
}

impl UsageMap {
    pub fn usage_of(&self, id: ScopeId) -> Usage {
        self.usage.get(&id).cloned().unwrap_or(Usage::All)
    }

    pub fn retained(&self, id: ScopeId) -> &Retained {
        self.retained.get(&id).unwrap_or(&Retained::All)
    }

    pub fn is_dead(&self, id: ScopeId) -> bool {
        self.dead.contains(&id)
    }
}

/// Computes usage scope by scope, consumers first, so every provider has
/// heard from all of its readers before its own reads are propagated.
pub struct UsageCollector<'t> {
    tree: &'t ScopeTree,
    map: UsageMap,
}

impl<'t> UsageCollector<'t> {
    pub fn collect(tree: &'t ScopeTree) -> UsageMap {
        let mut collector = Self { tree, map: UsageMap::default() };
        for &id in &tree.consumer_order {
            collector.visit(id);
        }
        collector.map
    }

    fn visit(&mut self, id: ScopeId) {
        let tree = self.tree;
        let scope = tree.scope(id);
        if self.map.is_dead(id) {
            self.map.dead.extend(scope.children.iter().copied());
            return;
        }

        let retained = ProjectionPruner::retained(scope, self.map.usage.get(&id));
        trace!(scope = id, usage = ?self.map.usage.get(&id), ?retained, "usage");
        let live = |origin: Origin| match origin {
            Origin::Output(position) => retained.contains(position),
            Origin::Clause(_) => true,
        };

        for &child in &scope.children {
            if !live(tree.scope(child).origin) {
                self.map.dead.insert(child);
            }
        }

        match &scope.body {
            ScopeBody::SetOperation { branches, .. } => {
                // every branch keeps what any branch's own ORDER BY names, so widths match
                let usage = match &retained {
                    Retained::All => Usage::All,
                    Retained::Positions(positions) => {
                        let mut positions = positions.clone();
                        for &branch in branches {
                            self.alias_positions(branch, &mut positions);
                        }
                        Usage::Columns(positions)
                    }
                };
                for &branch in branches {
                    self.require(branch, &usage);
                }
            }
            ScopeBody::Select { .. } => {
                for child in scope.sources.values().filter_map(Source::scope) {
                    let usage = if scope.error.is_some() { Usage::All } else { Usage::none() };
                    self.require(child, &usage);
                }
                for reference in scope.references.iter().filter(|r| live(r.origin)) {
                    if let Resolution::Source { targets, .. } = &reference.resolution {
                        self.use_columns(targets);
                    }
                }
                for output in scope.outputs.iter().flatten().filter(|o| retained.contains(o.id.index)) {
                    if let OutputOrigin::Expanded { source, position, .. } = &output.origin {
                        if let Some(child) = scope.sources.get(source).and_then(Source::scope) {
                            self.use_columns(&[ColumnId { scope: child, index: *position }]);
                        }
                    }
                }
                for (source, origin) in &scope.whole_sources {
                    if let Some(child) = scope.sources.get(source).and_then(Source::scope).filter(|_| live(*origin)) {
                        self.require(child, &Usage::All);
                    }
                }
            }
        }

        for correlation in tree.correlations_from(id).filter(|c| live(c.origin)) {
            self.use_columns(&correlation.targets);
        }

        self.map.retained.insert(id, retained);
    }

    /// Output positions named by bare references inside a branch, nested
    /// set operations included.
    fn alias_positions(&self, id: ScopeId, positions: &mut BTreeSet<usize>) {
        let scope = self.tree.scope(id);
        for output in scope.outputs.iter().flatten().filter(|o| scope.alias_refs.contains(&o.name)) {
            positions.insert(output.id.index);
        }
        if let ScopeBody::SetOperation { branches, .. } = &scope.body {
            for &branch in branches {
                self.alias_positions(branch, positions);
            }
        }
    }

    fn require(&mut self, scope: ScopeId, usage: &Usage) {
        self.map.usage.entry(scope).or_insert_with(Usage::none).merge(usage);
    }

    fn use_columns(&mut self, targets: &[ColumnId]) {
        for target in targets {
            self.map.usage.entry(target.scope).or_insert_with(Usage::none).add(target.index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::{Collection, Cte, Predicate, Query, ScalarExpr, Select},
        config::PushdownConfig,
        schema::SchemaHints,
    };

    fn collect(query: impl Into<Query>) -> (ScopeTree, UsageMap) {
        let hints = SchemaHints::new().with_table("x", &["a", "b"]).with_table("y", &["b", "c"]);
        let tree = ScopeTree::build(&query.into(), &hints, &PushdownConfig::new());
        let usage = UsageCollector::collect(&tree);
        (tree, usage)
    }

    fn columns(list: &[usize]) -> Usage {
        Usage::Columns(list.iter().copied().collect())
    }

    #[test]
    fn test_usage_merge() {
        let mut usage = columns(&[1]);
        usage.merge(&columns(&[0, 3]));
        assert_eq!(usage, columns(&[0, 1, 3]));

        usage.merge(&Usage::All);
        usage.add(7);
        assert_eq!(usage, Usage::All);
    }

    #[test]
    fn test_root_and_unreferenced_scopes_keep_all() {
        let (tree, usage) = collect(
            Select::new()
                .with(Cte::new("unused", Select::new().project_all().from_table("x")))
                .project(ScalarExpr::column("a"))
                .from_table("x"),
        );

        assert_eq!(tree.consumer_order, vec![0, 1]);
        assert_eq!(usage.usage_of(0), Usage::All);
        assert_eq!(usage.usage_of(1), Usage::All);
        assert!(usage.retained(1).is_all());
    }

    #[test]
    fn test_derived_table_usage_follows_references() {
        let inner = Select::new().project_all().from_table("x");
        let (_, usage) = collect(
            Select::new()
                .project(ScalarExpr::column("a"))
                .from(Collection::derived_as(inner, "q")),
        );

        assert_eq!(usage.usage_of(1), columns(&[0]));
        assert_eq!(usage.retained(1), &Retained::Positions([0].into_iter().collect()));
    }

    #[test]
    fn test_correlated_reference_counts_as_usage() {
        let inner = Select::new().project_all().from_table("x");
        let sub = Select::new()
            .project(ScalarExpr::column("c"))
            .from_table("y")
            .filter(Predicate::eq(ScalarExpr::qualified("q", "b"), ScalarExpr::qualified("y", "b")));
        let (tree, usage) = collect(
            Select::new()
                .project(ScalarExpr::subquery(sub))
                .from(Collection::derived_as(inner, "q")),
        );

        assert_eq!(tree.correlations.len(), 1);
        assert_eq!(tree.correlations[0].resolved_in, 0);
        assert_eq!(usage.usage_of(1), columns(&[1]));
    }

    #[test]
    fn test_referenced_but_unused_gets_empty_usage() {
        let inner = Select::new().project(ScalarExpr::column("a")).from_table("x");
        let (_, usage) = collect(
            Select::new()
                .project(ScalarExpr::function("COUNT", vec![ScalarExpr::WildCard]))
                .from(Collection::derived_as(inner, "q")),
        );

        assert_eq!(usage.usage_of(1), Usage::none());
        assert_eq!(usage.retained(1), &Retained::Positions(BTreeSet::new()));
    }
}
