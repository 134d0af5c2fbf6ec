use crate::ast::{ArithmeticOp, Column, Function, Literal, Query, write_identifier};
use std::fmt;

#[derive(Clone, PartialEq)]
pub enum ScalarExpr {
    Literal(Literal),
    Column(Column),
    Function(Function),
    Binary { left: Box<ScalarExpr>, op: ArithmeticOp, right: Box<ScalarExpr> },
    Subquery(Box<Query>),
    WildCard,
    WildCardWithCollection(String),
}

impl ScalarExpr {
    pub fn column(name: impl Into<String>) -> Self {
        ScalarExpr::Column(Column::named(name))
    }

    pub fn qualified(collection: impl Into<String>, name: impl Into<String>) -> Self {
        ScalarExpr::Column(Column::qualified(collection, name))
    }

    pub fn int(value: i64) -> Self {
        ScalarExpr::Literal(Literal::Int(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        ScalarExpr::Literal(Literal::String(value.into()))
    }

    pub fn function(name: impl Into<String>, args: Vec<ScalarExpr>) -> Self {
        ScalarExpr::Function(Function::new(name, args))
    }

    pub fn binary(left: ScalarExpr, op: ArithmeticOp, right: ScalarExpr) -> Self {
        ScalarExpr::Binary { left: Box::new(left), op, right: Box::new(right) }
    }

    pub fn subquery(query: impl Into<Query>) -> Self {
        ScalarExpr::Subquery(Box::new(query.into()))
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, ScalarExpr::WildCard | ScalarExpr::WildCardWithCollection(_))
    }

    fn write_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarExpr::Binary { .. } => write!(f, "({})", self),
            _ => write!(f, "{}", self),
        }
    }
}

impl fmt::Display for ScalarExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarExpr::Literal(l) => write!(f, "{}", l),
            ScalarExpr::Column(c) => write!(f, "{}", c),
            ScalarExpr::Function(fun) => write!(f, "{}", fun),
            ScalarExpr::Binary { left, op, right } => {
                left.write_operand(f)?;
                write!(f, " {} ", op)?;
                right.write_operand(f)
            }
            ScalarExpr::Subquery(query) => write!(f, "({})", query),
            ScalarExpr::WildCard => write!(f, "*"),
            ScalarExpr::WildCardWithCollection(coll) => {
                write_identifier(f, coll)?;
                f.write_str(".*")
            }
        }
    }
}

impl fmt::Debug for ScalarExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarExpr::Literal(_) => write!(f, "Literal({})", self),
            ScalarExpr::Column(_) => write!(f, "Column({})", self),
            ScalarExpr::Function(_) => write!(f, "Function({})", self),
            ScalarExpr::Binary { .. } => write!(f, "Binary({})", self),
            ScalarExpr::Subquery(_) => write!(f, "Subquery({})", self),
            ScalarExpr::WildCard => write!(f, "WildCard(*)"),
            ScalarExpr::WildCardWithCollection(coll) => write!(f, "WildCardWithCollection({}.*)", coll),
        }
    }
}

impl From<Column> for ScalarExpr {
    fn from(value: Column) -> Self {
        ScalarExpr::Column(value)
    }
}

impl From<Literal> for ScalarExpr {
    fn from(value: Literal) -> Self {
        ScalarExpr::Literal(value)
    }
}
