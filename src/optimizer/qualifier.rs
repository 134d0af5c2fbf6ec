use crate::{
    analyzer::{Clause, ColumnResolver, Resolution, ScopeId},
    ast::{Column, Predicate, ScalarExpr},
    optimizer::Rewriter,
};

/// Expression rewriting: every column that binds to a source is written as
/// `source.column`; output aliases and unbound names stay as they are.
/// Nested queries are handed back to the rewriter.
impl<'t> Rewriter<'t> {
    pub(super) fn scalar(&mut self, expr: ScalarExpr, id: ScopeId, clause: Clause, qualify: bool) -> ScalarExpr {
        match expr {
            ScalarExpr::Column(column) if qualify => ScalarExpr::Column(self.qualify(column, id, clause)),
            ScalarExpr::Function(mut function) => {
                function.args = function.args.into_iter().map(|arg| self.scalar(arg, id, clause, qualify)).collect();
                ScalarExpr::Function(function)
            }
            ScalarExpr::Binary { left, op, right } => {
                let left = self.scalar(*left, id, clause, qualify);
                let right = self.scalar(*right, id, clause, qualify);
                ScalarExpr::Binary { left: Box::new(left), op, right: Box::new(right) }
            }
            ScalarExpr::Subquery(query) => ScalarExpr::Subquery(Box::new(self.query(*query))),
            other => other,
        }
    }

    pub(super) fn predicate(&mut self, predicate: Predicate, id: ScopeId, clause: Clause, qualify: bool) -> Predicate {
        match predicate {
            Predicate::And(list) => Predicate::And(list.into_iter().map(|p| self.predicate(p, id, clause, qualify)).collect()),
            Predicate::Or(list) => Predicate::Or(list.into_iter().map(|p| self.predicate(p, id, clause, qualify)).collect()),
            Predicate::Not(inner) => Predicate::Not(Box::new(self.predicate(*inner, id, clause, qualify))),
            Predicate::Compare { left, op, right } => {
                let left = self.scalar(left, id, clause, qualify);
                let right = self.scalar(right, id, clause, qualify);
                Predicate::Compare { left, op, right }
            }
            Predicate::IsNull { expr, negated } => Predicate::IsNull { expr: self.scalar(expr, id, clause, qualify), negated },
            Predicate::InList { expr, list, negated } => {
                let expr = self.scalar(expr, id, clause, qualify);
                let list = list.into_iter().map(|e| self.scalar(e, id, clause, qualify)).collect();
                Predicate::InList { expr, list, negated }
            }
            Predicate::Like { expr, pattern, negated } => {
                let expr = self.scalar(expr, id, clause, qualify);
                let pattern = self.scalar(pattern, id, clause, qualify);
                Predicate::Like { expr, pattern, negated }
            }
            Predicate::InSubquery { expr, query, negated } => {
                let expr = self.scalar(expr, id, clause, qualify);
                Predicate::InSubquery { expr, query: Box::new(self.query(*query)), negated }
            }
            Predicate::Exists { query, negated } => Predicate::Exists { query: Box::new(self.query(*query)), negated },
        }
    }

    fn qualify(&self, column: Column, id: ScopeId, clause: Clause) -> Column {
        match ColumnResolver::resolve(self.tree, id, &column, clause) {
            Ok(Resolution::Source { source, .. }) | Ok(Resolution::Outer { source, .. }) => {
                Column::qualified(source, column.name())
            }
            _ => column,
        }
    }
}
