use crate::{
    analyzer::{Clause, OutputOrigin, ScopeId, ScopeTree},
    ast::{Collection, Cte, Distinct, Identifier, Join, OrderBy, Query, ScalarExpr, Select, SetOperation},
    config::PushdownConfig,
    optimizer::{ProjectionPruner, UsageMap},
};

/// Rebuilds the query from the analysed scopes. Walks the tree in the same
/// pre-order the scope builder used, so the n-th body met is scope `n`.
pub struct Rewriter<'t> {
    pub(super) tree: &'t ScopeTree,
    pub(super) usage: &'t UsageMap,
    pub(super) config: &'t PushdownConfig,
    next: ScopeId,
}

impl<'t> Rewriter<'t> {
    pub fn new(tree: &'t ScopeTree, usage: &'t UsageMap, config: &'t PushdownConfig) -> Self {
        Self { tree, usage, config, next: 0 }
    }

    pub fn rewrite(mut self, query: Query) -> Query {
        self.query(query)
    }

    fn enter(&mut self) -> ScopeId {
        let id = self.next;
        self.next += 1;
        id
    }

    pub(super) fn query(&mut self, query: Query) -> Query {
        match query {
            Query::Select(select) => Query::Select(Box::new(self.select(*select))),
            Query::SetOperation(operation) => Query::SetOperation(Box::new(self.set_operation(*operation))),
        }
    }

    fn select(&mut self, select: Select) -> Select {
        let id = self.enter();
        let tree = self.tree;
        let scope = tree.scope(id);
        // failed scopes are passed through, only their nested scopes are rewritten
        let rewrite = scope.error.is_none();

        let Select { with, distinct, projection, collections, joins, criteria, group_by, having, order_by, limit, offset } = select;

        let with = self.ctes(with);
        let collections = collections.into_iter().map(|c| self.collection(c)).collect();
        let joins: Vec<Join> = joins.into_iter()
            .map(|join| Join { collection: self.collection(join.collection), ..join })
            .collect();

        let mut items = Vec::with_capacity(projection.len());
        for (item, ident) in projection.into_iter().enumerate() {
            let position = scope.item_position(item);
            if ident.expression.is_wildcard() {
                match (&scope.outputs, rewrite) {
                    (Some(outputs), true) => {
                        for output in outputs {
                            match &output.origin {
                                OutputOrigin::Expanded { item: from, source, .. } if *from == item => {
                                    let expression = ScalarExpr::qualified(source.clone(), output.name.clone());
                                    items.push((output.id.index, Identifier::aliased(expression, output.name.clone())));
                                }
                                _ => {}
                            }
                        }
                    }
                    _ => items.push((position, ident)),
                }
                continue;
            }

            let expression = self.scalar(ident.expression, id, Clause::Projection, rewrite);
            let alias = match &scope.outputs {
                Some(outputs) if rewrite => outputs.get(position).map(|o| o.name.clone()).or(ident.alias),
                _ => ident.alias,
            };
            items.push((position, Identifier { expression, alias }));
        }
        let projection = ProjectionPruner::prune(items, self.usage.retained(id), scope.is_aggregate(), self.config);

        let distinct = match distinct {
            Distinct::On(exprs) => Distinct::On(
                exprs.into_iter().map(|e| self.scalar(e, id, Clause::DistinctOn, rewrite)).collect(),
            ),
            other => other,
        };
        let joins = joins.into_iter()
            .map(|join| Join {
                predicate: join.predicate.map(|p| self.predicate(p, id, Clause::JoinCondition, rewrite)),
                ..join
            })
            .collect();
        let criteria = criteria.map(|p| self.predicate(p, id, Clause::Where, rewrite));
        let group_by = group_by.into_iter().map(|e| self.scalar(e, id, Clause::GroupBy, rewrite)).collect();
        let having = having.map(|p| self.predicate(p, id, Clause::Having, rewrite));
        let order_by = self.order_by(order_by, id, rewrite);

        Select { with, distinct, projection, collections, joins, criteria, group_by, having, order_by, limit, offset }
    }

    fn set_operation(&mut self, operation: SetOperation) -> SetOperation {
        let id = self.enter();
        let rewrite = self.tree.scope(id).error.is_none();
        let SetOperation { with, op, all, left, right, order_by, limit, offset } = operation;

        let with = self.ctes(with);
        let left = self.query(left);
        let right = self.query(right);
        let order_by = self.order_by(order_by, id, rewrite);

        SetOperation { with, op, all, left, right, order_by, limit, offset }
    }

    fn ctes(&mut self, ctes: Vec<Cte>) -> Vec<Cte> {
        ctes.into_iter()
            .map(|cte| {
                let query = self.query(cte.query);
                Cte { query, ..cte }
            })
            .collect()
    }

    fn collection(&mut self, collection: Collection) -> Collection {
        match collection {
            Collection::Query { query, alias, column_aliases, lateral } => Collection::Query {
                query: Box::new(self.query(*query)),
                alias,
                column_aliases,
                lateral,
            },
            other => other,
        }
    }

    fn order_by(&mut self, order_by: Vec<OrderBy>, id: ScopeId, rewrite: bool) -> Vec<OrderBy> {
        order_by.into_iter()
            .map(|order| OrderBy { expr: self.scalar(order.expr, id, Clause::OrderBy, rewrite), ..order })
            .collect()
    }
}
