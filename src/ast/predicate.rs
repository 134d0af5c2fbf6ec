use crate::ast::{ComparatorOp, Query, ScalarExpr, write_list};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),

    // Predicates that *embed* scalars:
    Compare { left: ScalarExpr, op: ComparatorOp, right: ScalarExpr }, // =, <, <=, >, >=, <>
    IsNull  { expr: ScalarExpr, negated: bool },
    InList  { expr: ScalarExpr, list: Vec<ScalarExpr>, negated: bool },
    Like    { expr: ScalarExpr, pattern: ScalarExpr, negated: bool },

    // Predicates that *embed* queries:
    InSubquery { expr: ScalarExpr, query: Box<Query>, negated: bool },
    Exists     { query: Box<Query>, negated: bool },
}

impl Predicate {
    pub fn compare(left: ScalarExpr, op: ComparatorOp, right: ScalarExpr) -> Self {
        Predicate::Compare { left, op, right }
    }

    pub fn eq(left: ScalarExpr, right: ScalarExpr) -> Self {
        Predicate::Compare { left, op: ComparatorOp::Eq, right }
    }

    pub fn exists(query: impl Into<Query>) -> Self {
        Predicate::Exists { query: Box::new(query.into()), negated: false }
    }

    pub fn in_subquery(expr: ScalarExpr, query: impl Into<Query>) -> Self {
        Predicate::InSubquery { expr, query: Box::new(query.into()), negated: false }
    }

    fn write_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::And(_) | Predicate::Or(_) => write!(f, "({})", self),
            _ => write!(f, "{}", self),
        }
    }

    fn write_joined(f: &mut fmt::Formatter<'_>, predicates: &[Predicate], keyword: &str) -> fmt::Result {
        for (i, predicate) in predicates.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", keyword)?;
            }
            predicate.write_nested(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::And(predicates) => Self::write_joined(f, predicates, "AND"),
            Predicate::Or(predicates) => Self::write_joined(f, predicates, "OR"),
            Predicate::Not(inner) => {
                f.write_str("NOT ")?;
                inner.write_nested(f)
            }
            Predicate::Compare { left, op, right } => write!(f, "{} {} {}", left, op, right),
            Predicate::IsNull { expr, negated } => {
                write!(f, "{} IS {}NULL", expr, if *negated { "NOT " } else { "" })
            }
            Predicate::InList { expr, list, negated } => {
                write!(f, "{} {}IN (", expr, if *negated { "NOT " } else { "" })?;
                write_list(f, list)?;
                f.write_str(")")
            }
            Predicate::Like { expr, pattern, negated } => {
                write!(f, "{} {}LIKE {}", expr, if *negated { "NOT " } else { "" }, pattern)
            }
            Predicate::InSubquery { expr, query, negated } => {
                write!(f, "{} {}IN ({})", expr, if *negated { "NOT " } else { "" }, query)
            }
            Predicate::Exists { query, negated } => {
                write!(f, "{}EXISTS ({})", if *negated { "NOT " } else { "" }, query)
            }
        }
    }
}
