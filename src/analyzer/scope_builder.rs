use tracing::{debug, trace};

use crate::{
    analyzer::{
        AggregateResolver, AnalysisContext, AnalyzerError, Clause, ColumnId, ColumnRef, ColumnResolver, Correlation,
        IdentifierResolver, Origin, OutputColumn, OutputOrigin, Pin, Resolution, Scope, ScopeBody, ScopeId, ScopeKind,
        ScopeTree, Source, SourceKind, WildcardResolver,
    },
    ast::{Collection, Column, Cte, Distinct, Identifier, Literal, Predicate, Query, ScalarExpr, Select, SetOperation, SetOperator},
    config::PushdownConfig,
    schema::SchemaProvider,
};

/// Walks a query once, depth first, and records one scope per `Select` or
/// set operation body with its sources, outputs and resolved references.
pub struct ScopeBuilder<'a> {
    ctx: AnalysisContext<'a>,
    tree: ScopeTree,
    post_order: Vec<ScopeId>,
}

impl<'a> ScopeBuilder<'a> {
    pub fn new(schemas: &'a dyn SchemaProvider, config: &'a PushdownConfig) -> Self {
        Self { ctx: AnalysisContext::new(schemas, config), tree: ScopeTree::default(), post_order: vec![] }
    }

    pub fn build(mut self, query: &Query) -> ScopeTree {
        self.query(query, ScopeKind::Root, None, Origin::Clause(Clause::From), None);
        self.post_order.reverse();
        self.tree.consumer_order = self.post_order;
        self.tree
    }

    fn open(&mut self, kind: ScopeKind, parent: Option<ScopeId>, origin: Origin, outer_visible: Option<usize>) -> ScopeId {
        let id = self.tree.scopes.len();
        trace!(scope = id, ?kind, ?parent, "open scope");
        let mut scope = Scope::new(id, kind, parent, origin);
        scope.outer_visible = outer_visible;
        self.tree.scopes.push(scope);
        if let Some(parent) = parent {
            self.tree.scopes[parent].children.push(id);
        }
        id
    }

    fn close(&mut self, id: ScopeId) {
        let scope = &self.tree.scopes[id];
        if let Some(pin) = scope.pin {
            trace!(scope = id, ?pin, "scope keeps all columns");
        }
        self.post_order.push(id);
    }

    fn query(&mut self, query: &Query, kind: ScopeKind, parent: Option<ScopeId>, origin: Origin, outer_visible: Option<usize>) -> ScopeId {
        match query {
            Query::Select(select) => self.select(select, kind, parent, origin, outer_visible),
            Query::SetOperation(operation) => self.set_operation(operation, kind, parent, origin, outer_visible),
        }
    }

    fn select(&mut self, select: &Select, kind: ScopeKind, parent: Option<ScopeId>, origin: Origin, outer_visible: Option<usize>) -> ScopeId {
        let id = self.open(kind, parent, origin, outer_visible);
        let mark = self.ctx.ctes.len();
        self.ctes(id, &select.with);

        for collection in &select.collections {
            self.source(id, collection);
        }
        for join in &select.joins {
            self.source(id, &join.collection);
        }

        let positions = self.outputs(id, &select.projection);
        for (ident, position) in select.projection.iter().zip(positions) {
            if !ident.expression.is_wildcard() {
                self.scalar(id, &ident.expression, Origin::Output(position), Clause::Projection);
            }
        }
        if let Distinct::On(exprs) = &select.distinct {
            for expr in exprs {
                self.scalar(id, expr, Origin::Clause(Clause::DistinctOn), Clause::DistinctOn);
            }
        }
        for join in &select.joins {
            if let Some(predicate) = &join.predicate {
                self.predicate(id, predicate, Clause::JoinCondition);
            }
        }
        if let Some(criteria) = &select.criteria {
            self.predicate(id, criteria, Clause::Where);
        }
        for expr in &select.group_by {
            self.positional(id, expr);
            self.scalar(id, expr, Origin::Clause(Clause::GroupBy), Clause::GroupBy);
        }
        if let Some(having) = &select.having {
            self.predicate(id, having, Clause::Having);
        }
        for order in &select.order_by {
            self.positional(id, &order.expr);
            self.scalar(id, &order.expr, Origin::Clause(Clause::OrderBy), Clause::OrderBy);
        }

        let distinct = select.distinct.is_distinct();
        let scope = &mut self.tree.scopes[id];
        scope.body = ScopeBody::Select { distinct, aggregate: AggregateResolver::select_aggregates(select) };
        if distinct {
            scope.pin(Pin::Distinct);
        }

        self.ctx.leave_ctes(mark);
        self.close(id);
        id
    }

    fn set_operation(&mut self, operation: &SetOperation, kind: ScopeKind, parent: Option<ScopeId>, origin: Origin, outer_visible: Option<usize>) -> ScopeId {
        let id = self.open(kind, parent, origin, outer_visible);
        let mark = self.ctx.ctes.len();
        self.ctes(id, &operation.with);

        let branch = Origin::Clause(Clause::From);
        let left = self.query(&operation.left, ScopeKind::Branch, Some(id), branch, None);
        let right = self.query(&operation.right, ScopeKind::Branch, Some(id), branch, None);

        let left_scope = &self.tree.scopes[left];
        let right_scope = &self.tree.scopes[right];
        let misaligned = match (&left_scope.outputs, &right_scope.outputs) {
            (Some(l), Some(r)) if l.len() != r.len() => {
                Some(AnalyzerError::ArityMismatch { scope: id, left: l.len(), right: r.len() })
            }
            _ => None,
        };
        let pinned_branch = left_scope.keeps_all() || right_scope.keeps_all();
        let outputs = left_scope.outputs.as_ref().map(|outputs| {
            outputs.iter()
                .enumerate()
                .map(|(index, output)| OutputColumn {
                    id: ColumnId { scope: id, index },
                    name: output.name.clone(),
                    origin: OutputOrigin::Branch,
                })
                .collect::<Vec<_>>()
        });

        let scope = &mut self.tree.scopes[id];
        scope.body = ScopeBody::SetOperation { op: operation.op, all: operation.all, branches: [left, right] };
        scope.outputs = outputs;
        if let Some(err) = misaligned {
            debug!(scope = id, %err, "set operation left as is");
            scope.pin(Pin::Misaligned);
        }
        if operation.op != SetOperator::Union || !operation.all {
            scope.pin(Pin::SetOperation);
        }
        if pinned_branch {
            scope.pin(Pin::PinnedBranch);
        }

        for order in &operation.order_by {
            self.positional(id, &order.expr);
            self.scalar(id, &order.expr, Origin::Clause(Clause::OrderBy), Clause::OrderBy);
        }

        self.ctx.leave_ctes(mark);
        self.close(id);
        id
    }

    fn ctes(&mut self, id: ScopeId, ctes: &[Cte]) {
        for cte in ctes {
            let kind = ScopeKind::Cte { name: cte.name.clone() };
            let body = self.query(&cte.query, kind, Some(id), Origin::Clause(Clause::From), None);
            if !cte.column_aliases.is_empty() {
                self.tree.scopes[body].pin(Pin::ColumnAliases);
            }
            self.ctx.add_cte(cte.name.clone(), body, cte.column_aliases.clone());
        }
    }

    /// Registers one `FROM`/`JOIN` entry, building its scope first.
    fn source(&mut self, id: ScopeId, collection: &Collection) {
        let position = self.tree.scopes[id].sources.len();
        let key = collection.visible_name().map(str::to_string).unwrap_or_else(|| position.to_string());
        let column_aliases = collection.column_aliases();
        let aliased = (!column_aliases.is_empty()).then(|| column_aliases.to_vec());

        let source = match collection {
            Collection::Table { name, .. } => match self.ctx.find_cte(name).cloned() {
                Some(cte) if !name.contains('.') => {
                    if aliased.is_some() {
                        self.tree.scopes[cte.scope].pin(Pin::ColumnAliases);
                    }
                    let defined = (!cte.column_aliases.is_empty()).then_some(cte.column_aliases);
                    let columns = aliased.or(defined).or_else(|| self.exposed(cte.scope));
                    Source { kind: SourceKind::Scope(cte.scope), columns }
                }
                _ => Source {
                    kind: SourceKind::Table { name: name.clone() },
                    columns: aliased.or_else(|| self.ctx.table_columns(name)),
                },
            },
            Collection::Query { query, lateral, .. } => {
                let outer_visible = lateral.then_some(position);
                let body = self.query(query, ScopeKind::DerivedTable { lateral: *lateral }, Some(id), Origin::Clause(Clause::From), outer_visible);
                if aliased.is_some() {
                    self.tree.scopes[body].pin(Pin::ColumnAliases);
                }
                Source { kind: SourceKind::Scope(body), columns: aliased.or_else(|| self.exposed(body)) }
            }
            Collection::Function { function, .. } => {
                for arg in &function.args {
                    self.arguments(id, arg);
                }
                Source { kind: SourceKind::TableValued, columns: aliased }
            }
            Collection::Values { rows, .. } => {
                for expr in rows.iter().flatten() {
                    self.arguments(id, expr);
                }
                Source { kind: SourceKind::TableValued, columns: aliased }
            }
        };
        self.tree.scopes[id].sources.insert(key, source);
    }

    fn exposed(&self, scope: ScopeId) -> Option<Vec<String>> {
        self.tree.scopes[scope].output_names().map(|names| names.into_iter().map(str::to_string).collect())
    }

    /// Computes the output list, expanding wildcards. Returns the position of
    /// the first output of every projection item.
    fn outputs(&mut self, id: ScopeId, projection: &[Identifier]) -> Vec<usize> {
        let config = self.ctx.config;
        let scope = &mut self.tree.scopes[id];
        let mut outputs = Vec::with_capacity(projection.len());
        let mut positions = Vec::with_capacity(projection.len());
        let mut failure = None;

        for (item, ident) in projection.iter().enumerate() {
            positions.push(outputs.len());
            if !ident.expression.is_wildcard() {
                let name = IdentifierResolver::output_name(ident, outputs.len(), config);
                outputs.push(OutputColumn { id: ColumnId { scope: id, index: outputs.len() }, name, origin: OutputOrigin::Item(item) });
                continue;
            }
            match WildcardResolver::expand_wildcard(&ident.expression, scope) {
                Ok(columns) => {
                    for (source, position, name) in columns {
                        let origin = OutputOrigin::Expanded { item, source, position };
                        outputs.push(OutputColumn { id: ColumnId { scope: id, index: outputs.len() }, name, origin });
                    }
                }
                Err(err) => {
                    let covered = WildcardResolver::covered_sources(&ident.expression, scope);
                    scope.whole_sources.extend(covered.into_iter().map(|source| (source, Origin::Clause(Clause::Projection))));
                    failure.get_or_insert(err);
                }
            }
        }

        match failure {
            Some(err) => {
                debug!(scope = id, %err, "wildcard left unexpanded");
                scope.pin(Pin::Wildcard);
                scope.outputs = None;
                // without an output list, items keep their own index
                (0..projection.len()).collect()
            }
            None => {
                IdentifierResolver::dedupe_synthetic(&mut outputs, projection, config);
                scope.outputs = Some(outputs);
                positions
            }
        }
    }

    fn positional(&mut self, id: ScopeId, expr: &ScalarExpr) {
        if let ScalarExpr::Literal(Literal::Int(_)) = expr {
            self.tree.scopes[id].pin(Pin::Positional);
        }
    }

    fn scalar(&mut self, id: ScopeId, expr: &ScalarExpr, origin: Origin, clause: Clause) {
        match expr {
            ScalarExpr::Column(column) => self.column(id, column, origin, clause),
            ScalarExpr::Function(function) => {
                for arg in &function.args {
                    self.scalar(id, arg, origin, clause);
                }
            }
            ScalarExpr::Binary { left, right, .. } => {
                self.scalar(id, left, origin, clause);
                self.scalar(id, right, origin, clause);
            }
            ScalarExpr::Subquery(query) => {
                self.query(query, ScopeKind::Subquery, Some(id), origin, None);
            }
            ScalarExpr::Literal(_) | ScalarExpr::WildCard | ScalarExpr::WildCardWithCollection(_) => {}
        }
    }

    fn predicate(&mut self, id: ScopeId, predicate: &Predicate, clause: Clause) {
        let origin = Origin::Clause(clause);
        match predicate {
            Predicate::And(list) | Predicate::Or(list) => {
                for p in list {
                    self.predicate(id, p, clause);
                }
            }
            Predicate::Not(inner) => self.predicate(id, inner, clause),
            Predicate::Compare { left, right, .. } => {
                self.scalar(id, left, origin, clause);
                self.scalar(id, right, origin, clause);
            }
            Predicate::IsNull { expr, .. } => self.scalar(id, expr, origin, clause),
            Predicate::InList { expr, list, .. } => {
                self.scalar(id, expr, origin, clause);
                for e in list {
                    self.scalar(id, e, origin, clause);
                }
            }
            Predicate::Like { expr, pattern, .. } => {
                self.scalar(id, expr, origin, clause);
                self.scalar(id, pattern, origin, clause);
            }
            Predicate::InSubquery { expr, query, .. } => {
                self.scalar(id, expr, origin, clause);
                self.query(query, ScopeKind::Subquery, Some(id), origin, None);
            }
            Predicate::Exists { query, .. } => {
                self.query(query, ScopeKind::Subquery, Some(id), origin, None);
            }
        }
    }

    /// Column references inside table function arguments and `VALUES` rows.
    /// They are never rewritten, and never open scopes, but still count as usage.
    fn arguments(&mut self, id: ScopeId, expr: &ScalarExpr) {
        match expr {
            ScalarExpr::Column(column) => self.column(id, column, Origin::Clause(Clause::Arguments), Clause::Arguments),
            ScalarExpr::Function(function) => function.args.iter().for_each(|arg| self.arguments(id, arg)),
            ScalarExpr::Binary { left, right, .. } => {
                self.arguments(id, left);
                self.arguments(id, right);
            }
            _ => {}
        }
    }

    fn column(&mut self, id: ScopeId, column: &Column, origin: Origin, clause: Clause) {
        let resolution = match ColumnResolver::resolve(&self.tree, id, column, clause) {
            Ok(resolution) => resolution,
            Err(err) => {
                debug!(scope = id, %err, ?clause, "reference left unresolved");
                if clause != Clause::Arguments {
                    self.tree.scopes[id].fail(err);
                }
                self.keep_candidates(id, column, origin);
                Resolution::Unresolved
            }
        };

        match &resolution {
            Resolution::Outer { scope, source, targets } => self.tree.correlations.push(Correlation {
                from: id,
                resolved_in: *scope,
                origin,
                source: source.clone(),
                column: column.name().to_string(),
                targets: targets.clone(),
            }),
            Resolution::OutputAlias(name) => {
                self.tree.scopes[id].alias_refs.insert(name.clone());
            }
            Resolution::Source { .. } | Resolution::Unresolved => {}
        }
        self.tree.scopes[id].references.push(ColumnRef { column: column.clone(), resolution, origin });
    }

    /// An unbound reference may mean any scope source carrying its name; keep
    /// that column in each of them.
    fn keep_candidates(&mut self, id: ScopeId, column: &Column, origin: Origin) {
        for (level, source, targets) in ColumnResolver::candidates(&self.tree, id, column) {
            if level == id {
                let resolution = Resolution::Source { source, targets };
                self.tree.scopes[id].references.push(ColumnRef { column: column.clone(), resolution, origin });
            } else {
                self.tree.correlations.push(Correlation {
                    from: id,
                    resolved_in: level,
                    origin,
                    source,
                    column: column.name().to_string(),
                    targets,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        analyzer::{Clause, Origin, OutputOrigin, Pin, Resolution, ScopeKind, ScopeTree},
        ast::{Collection, Cte, OrderBy, Predicate, Query, ScalarExpr, Select},
        config::PushdownConfig,
        schema::SchemaHints,
    };

    fn build(query: impl Into<Query>) -> ScopeTree {
        let hints = SchemaHints::new().with_table("x", &["a", "b"]).with_table("y", &["b", "c"]);
        ScopeTree::build(&query.into(), &hints, &PushdownConfig::new())
    }

    #[test]
    fn test_scope_ids_follow_pre_order() {
        let tree = build(
            Select::new()
                .with(Cte::new("c", Select::new().project_all().from_table("y")))
                .project(ScalarExpr::subquery(Select::new().project(ScalarExpr::int(1))))
                .from(Collection::derived_as(Select::new().project_all().from_table("x"), "q"))
                .filter(Predicate::exists(Select::new().project_all().from_table("c"))),
        );

        let kinds: Vec<&ScopeKind> = tree.scopes.iter().map(|s| &s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                &ScopeKind::Root,
                &ScopeKind::Cte { name: "c".into() },
                &ScopeKind::DerivedTable { lateral: false },
                &ScopeKind::Subquery,
                &ScopeKind::Subquery,
            ]
        );
        assert_eq!(tree.scope(3).origin, Origin::Output(0));
        assert_eq!(tree.scope(4).origin, Origin::Clause(Clause::Where));
        assert_eq!(tree.consumer_order, vec![0, 4, 3, 2, 1]);
    }

    #[test]
    fn test_wildcard_outputs_remember_their_source() {
        let tree = build(Select::new().project_all().from_table("x").from_table("y"));
        let outputs = tree.scope(0).outputs.clone().unwrap();

        assert_eq!(outputs.iter().map(|o| o.name.as_str()).collect::<Vec<_>>(), vec!["a", "b", "b", "c"]);
        assert_eq!(outputs[2].origin, OutputOrigin::Expanded { item: 0, source: "y".into(), position: 0 });
    }

    #[test]
    fn test_pins() {
        let distinct = build(Select::new().project(ScalarExpr::column("a")).from_table("x").distinct());
        assert_eq!(distinct.scope(0).pin, Some(Pin::Distinct));

        let union = build(Query::union(
            Select::new().project(ScalarExpr::column("a")).from_table("x"),
            Select::new().project(ScalarExpr::column("b")).from_table("y"),
        ));
        assert_eq!(union.scope(0).pin, Some(Pin::SetOperation));
        assert_eq!(union.scope(1).pin, None);

        let misaligned = build(Query::union_all(
            Select::new().project_all().from_table("x"),
            Select::new().project(ScalarExpr::column("b")).from_table("y"),
        ));
        assert_eq!(misaligned.scope(0).pin, Some(Pin::Misaligned));

        let positional = build(Select::new().project_all().from_table("x").order_by(OrderBy::asc(ScalarExpr::int(1))));
        assert_eq!(positional.scope(0).pin, Some(Pin::Positional));

        let aliased_reference = build(
            Select::new()
                .with(Cte::new("c", Select::new().project_all().from_table("x")))
                .project_all()
                .from(Collection::table("c").with_column_aliases(&["p", "q"])),
        );
        assert_eq!(aliased_reference.scope(1).pin, Some(Pin::ColumnAliases));
        assert_eq!(aliased_reference.scope(0).output_names(), Some(vec!["p", "q"]));
    }

    #[test]
    fn test_order_by_alias_is_recorded() {
        let tree = build(
            Select::new()
                .project_as(ScalarExpr::column("a"), "k")
                .from_table("x")
                .order_by(OrderBy::desc(ScalarExpr::column("k"))),
        );

        assert!(tree.scope(0).alias_refs.contains("k"));
        assert_eq!(tree.scope(0).references[1].resolution, Resolution::OutputAlias("k".into()));
    }

    #[test]
    fn test_lateral_sees_only_earlier_sources() {
        let lateral = Select::new()
            .project(ScalarExpr::column("c"))
            .from_table("y")
            .filter(Predicate::eq(ScalarExpr::qualified("y", "b"), ScalarExpr::qualified("q", "b")));
        let tree = build(
            Select::new()
                .project_all()
                .from(Collection::lateral(lateral.clone(), "l"))
                .from(Collection::derived_as(Select::new().project_all().from_table("x"), "q")),
        );

        assert_eq!(tree.scope(1).outer_visible, Some(0));
        assert!(tree.scope(1).error.is_some());
        assert!(tree.correlations.is_empty());

        let tree = build(
            Select::new()
                .project_all()
                .from(Collection::derived_as(Select::new().project_all().from_table("x"), "q"))
                .from(Collection::lateral(lateral, "l")),
        );
        assert_eq!(tree.correlations.len(), 1);
        assert_eq!(tree.correlations[0].from, 2);
        assert_eq!(tree.correlations[0].resolved_in, 0);
    }
}
