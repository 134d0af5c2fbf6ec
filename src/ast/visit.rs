//! Collection-level walks over a query tree.
//!
//! Both walks visit sources in pre-order: CTE bodies, `FROM` collections,
//! join collections, then subqueries embedded in expressions. A collection is
//! handed to the callback before the query nested inside it is walked.
//! Arguments of table functions and `VALUES` rows are opaque and never walked.

use crate::ast::{Collection, Cte, Distinct, Join, OrderBy, Predicate, Query, ScalarExpr, Select, SetOperation};

impl Query {
    /// Rebuilds the tree, passing every collection through `f`.
    pub fn map_collections<F: FnMut(Collection) -> Collection>(self, f: &mut F) -> Query {
        match self {
            Query::Select(select) => Query::Select(Box::new(map_select(*select, f))),
            Query::SetOperation(operation) => {
                let SetOperation { with, op, all, left, right, order_by, limit, offset } = *operation;
                let with = map_ctes(with, f);
                let left = left.map_collections(f);
                let right = right.map_collections(f);
                let order_by = map_order_by(order_by, f);
                Query::SetOperation(Box::new(SetOperation { with, op, all, left, right, order_by, limit, offset }))
            }
        }
    }

    /// Visits every collection without rebuilding.
    pub fn for_each_collection<F: FnMut(&Collection)>(&self, f: &mut F) {
        match self {
            Query::Select(select) => visit_select(select, f),
            Query::SetOperation(operation) => {
                for cte in &operation.with {
                    cte.query.for_each_collection(f);
                }
                operation.left.for_each_collection(f);
                operation.right.for_each_collection(f);
                for order in &operation.order_by {
                    visit_scalar(&order.expr, f);
                }
            }
        }
    }
}

fn map_ctes<F: FnMut(Collection) -> Collection>(ctes: Vec<Cte>, f: &mut F) -> Vec<Cte> {
    ctes.into_iter()
        .map(|cte| Cte { query: cte.query.map_collections(f), ..cte })
        .collect()
}

fn map_collection<F: FnMut(Collection) -> Collection>(collection: Collection, f: &mut F) -> Collection {
    match f(collection) {
        Collection::Query { query, alias, column_aliases, lateral } => Collection::Query {
            query: Box::new(query.map_collections(f)),
            alias,
            column_aliases,
            lateral,
        },
        other => other,
    }
}

fn map_select<F: FnMut(Collection) -> Collection>(select: Select, f: &mut F) -> Select {
    let Select { with, distinct, projection, collections, joins, criteria, group_by, having, order_by, limit, offset } = select;

    let with = map_ctes(with, f);
    let collections = collections.into_iter().map(|c| map_collection(c, f)).collect();
    let joins: Vec<Join> = joins
        .into_iter()
        .map(|join| Join { collection: map_collection(join.collection, f), ..join })
        .collect();

    let projection = projection
        .into_iter()
        .map(|mut id| {
            id.expression = map_scalar(id.expression, f);
            id
        })
        .collect();
    let distinct = match distinct {
        Distinct::On(exprs) => Distinct::On(exprs.into_iter().map(|e| map_scalar(e, f)).collect()),
        other => other,
    };
    let joins = joins
        .into_iter()
        .map(|join| Join { predicate: join.predicate.map(|p| map_predicate(p, f)), ..join })
        .collect();
    let criteria = criteria.map(|p| map_predicate(p, f));
    let group_by = group_by.into_iter().map(|e| map_scalar(e, f)).collect();
    let having = having.map(|p| map_predicate(p, f));
    let order_by = map_order_by(order_by, f);

    Select { with, distinct, projection, collections, joins, criteria, group_by, having, order_by, limit, offset }
}

fn map_order_by<F: FnMut(Collection) -> Collection>(order_by: Vec<OrderBy>, f: &mut F) -> Vec<OrderBy> {
    order_by
        .into_iter()
        .map(|order| OrderBy { expr: map_scalar(order.expr, f), ..order })
        .collect()
}

fn map_scalar<F: FnMut(Collection) -> Collection>(expr: ScalarExpr, f: &mut F) -> ScalarExpr {
    match expr {
        ScalarExpr::Function(mut function) => {
            function.args = function.args.into_iter().map(|a| map_scalar(a, f)).collect();
            ScalarExpr::Function(function)
        }
        ScalarExpr::Binary { left, op, right } => {
            let left = map_scalar(*left, f);
            let right = map_scalar(*right, f);
            ScalarExpr::Binary { left: Box::new(left), op, right: Box::new(right) }
        }
        ScalarExpr::Subquery(query) => ScalarExpr::Subquery(Box::new(query.map_collections(f))),
        other => other,
    }
}

fn map_predicate<F: FnMut(Collection) -> Collection>(predicate: Predicate, f: &mut F) -> Predicate {
    match predicate {
        Predicate::And(list) => Predicate::And(list.into_iter().map(|p| map_predicate(p, f)).collect()),
        Predicate::Or(list) => Predicate::Or(list.into_iter().map(|p| map_predicate(p, f)).collect()),
        Predicate::Not(inner) => Predicate::Not(Box::new(map_predicate(*inner, f))),
        Predicate::Compare { left, op, right } => {
            let left = map_scalar(left, f);
            let right = map_scalar(right, f);
            Predicate::Compare { left, op, right }
        }
        Predicate::IsNull { expr, negated } => Predicate::IsNull { expr: map_scalar(expr, f), negated },
        Predicate::InList { expr, list, negated } => {
            let expr = map_scalar(expr, f);
            let list = list.into_iter().map(|e| map_scalar(e, f)).collect();
            Predicate::InList { expr, list, negated }
        }
        Predicate::Like { expr, pattern, negated } => {
            let expr = map_scalar(expr, f);
            let pattern = map_scalar(pattern, f);
            Predicate::Like { expr, pattern, negated }
        }
        Predicate::InSubquery { expr, query, negated } => {
            let expr = map_scalar(expr, f);
            Predicate::InSubquery { expr, query: Box::new(query.map_collections(f)), negated }
        }
        Predicate::Exists { query, negated } => Predicate::Exists { query: Box::new(query.map_collections(f)), negated },
    }
}

fn visit_collection<F: FnMut(&Collection)>(collection: &Collection, f: &mut F) {
    f(collection);
    if let Collection::Query { query, .. } = collection {
        query.for_each_collection(f);
    }
}

fn visit_select<F: FnMut(&Collection)>(select: &Select, f: &mut F) {
    for cte in &select.with {
        cte.query.for_each_collection(f);
    }
    for collection in &select.collections {
        visit_collection(collection, f);
    }
    for join in &select.joins {
        visit_collection(&join.collection, f);
    }
    for id in &select.projection {
        visit_scalar(&id.expression, f);
    }
    if let Distinct::On(exprs) = &select.distinct {
        exprs.iter().for_each(|e| visit_scalar(e, f));
    }
    for join in &select.joins {
        if let Some(predicate) = &join.predicate {
            visit_predicate(predicate, f);
        }
    }
    if let Some(criteria) = &select.criteria {
        visit_predicate(criteria, f);
    }
    select.group_by.iter().for_each(|e| visit_scalar(e, f));
    if let Some(having) = &select.having {
        visit_predicate(having, f);
    }
    select.order_by.iter().for_each(|o| visit_scalar(&o.expr, f));
}

fn visit_scalar<F: FnMut(&Collection)>(expr: &ScalarExpr, f: &mut F) {
    match expr {
        ScalarExpr::Function(function) => function.args.iter().for_each(|a| visit_scalar(a, f)),
        ScalarExpr::Binary { left, right, .. } => {
            visit_scalar(left, f);
            visit_scalar(right, f);
        }
        ScalarExpr::Subquery(query) => query.for_each_collection(f),
        ScalarExpr::Literal(_) | ScalarExpr::Column(_) | ScalarExpr::WildCard | ScalarExpr::WildCardWithCollection(_) => {}
    }
}

fn visit_predicate<F: FnMut(&Collection)>(predicate: &Predicate, f: &mut F) {
    match predicate {
        Predicate::And(list) | Predicate::Or(list) => list.iter().for_each(|p| visit_predicate(p, f)),
        Predicate::Not(inner) => visit_predicate(inner, f),
        Predicate::Compare { left, right, .. } => {
            visit_scalar(left, f);
            visit_scalar(right, f);
        }
        Predicate::IsNull { expr, .. } => visit_scalar(expr, f),
        Predicate::InList { expr, list, .. } => {
            visit_scalar(expr, f);
            list.iter().for_each(|e| visit_scalar(e, f));
        }
        Predicate::Like { expr, pattern, .. } => {
            visit_scalar(expr, f);
            visit_scalar(pattern, f);
        }
        Predicate::InSubquery { expr, query, .. } => {
            visit_scalar(expr, f);
            query.for_each_collection(f);
        }
        Predicate::Exists { query, .. } => query.for_each_collection(f),
    }
}
