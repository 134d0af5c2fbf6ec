use crate::ast::{ScalarExpr, Select};

pub struct AggregateResolver;

impl AggregateResolver {
    pub fn is_aggregate_name(name: &str) -> bool {
        matches!(
            name.to_ascii_lowercase().as_str(),
            "count" | "sum" | "avg" | "min" | "max" | "array_agg" | "string_agg" | "group_concat" | "bool_and" | "bool_or"
        )
    }

    pub fn contains_aggregate(expr: &ScalarExpr) -> bool {
        match expr {
            ScalarExpr::Function(f) if Self::is_aggregate_name(&f.name) => true,
            ScalarExpr::Function(f) => f.args.iter().any(Self::contains_aggregate),
            ScalarExpr::Binary { left, right, .. } => Self::contains_aggregate(left) || Self::contains_aggregate(right),
            _ => false, // subqueries aggregate on their own
        }
    }

    /// Whether the select folds its rows into groups: aggregate calls in the
    /// projection or a `HAVING` clause. Such a select must keep an aggregate
    /// when every column is pruned.
    pub fn select_aggregates(select: &Select) -> bool {
        select.projection.iter().any(|ident| Self::contains_aggregate(&ident.expression))
            || select.having.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ArithmeticOp, ComparatorOp, Predicate};

    #[test]
    fn test_contains_aggregate() {
        let sum = ScalarExpr::function("Sum", vec![ScalarExpr::column("b")]);
        assert!(AggregateResolver::contains_aggregate(&sum));

        let nested = ScalarExpr::binary(ScalarExpr::int(1), ArithmeticOp::Add, ScalarExpr::function("COALESCE", vec![sum]));
        assert!(AggregateResolver::contains_aggregate(&nested));

        assert!(!AggregateResolver::contains_aggregate(&ScalarExpr::function("UPPER", vec![ScalarExpr::column("a")])));
    }

    #[test]
    fn test_select_aggregates() {
        let plain = Select::new().project(ScalarExpr::column("a")).from_table("x");
        assert!(!AggregateResolver::select_aggregates(&plain));

        let grouped = plain.clone().project(ScalarExpr::function("COUNT", vec![ScalarExpr::WildCard]));
        assert!(AggregateResolver::select_aggregates(&grouped));

        let having = plain.group_by(ScalarExpr::column("a"))
            .having(Predicate::compare(ScalarExpr::column("a"), ComparatorOp::Gt, ScalarExpr::int(3)));
        assert!(AggregateResolver::select_aggregates(&having));
    }
}
