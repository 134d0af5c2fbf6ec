use crate::ast::{Cte, OrderBy, Select, SetOperator, write_list};
use std::fmt;

#[derive(Clone, PartialEq)]
pub enum Query {
    Select(Box<Select>),
    SetOperation(Box<SetOperation>),
}

/// `left <op> [ALL] right`, with optional trailing ORDER BY / LIMIT / OFFSET.
#[derive(Debug, Clone, PartialEq)]
pub struct SetOperation {
    pub with: Vec<Cte>,
    pub op: SetOperator,
    pub all: bool,
    pub left: Query,
    pub right: Query,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SetOperation {
    pub fn new(op: SetOperator, all: bool, left: impl Into<Query>, right: impl Into<Query>) -> Self {
        Self {
            with: vec![],
            op,
            all,
            left: left.into(),
            right: right.into(),
            order_by: vec![],
            limit: None,
            offset: None,
        }
    }

    pub fn with(mut self, cte: Cte) -> Self {
        self.with.push(cte);
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl From<SetOperation> for Query {
    fn from(value: SetOperation) -> Self {
        Query::SetOperation(Box::new(value))
    }
}

impl Query {
    pub fn union(left: impl Into<Query>, right: impl Into<Query>) -> Self {
        SetOperation::new(SetOperator::Union, false, left, right).into()
    }

    pub fn union_all(left: impl Into<Query>, right: impl Into<Query>) -> Self {
        SetOperation::new(SetOperator::Union, true, left, right).into()
    }

    pub fn intersect(left: impl Into<Query>, right: impl Into<Query>) -> Self {
        SetOperation::new(SetOperator::Intersect, false, left, right).into()
    }

    pub fn except(left: impl Into<Query>, right: impl Into<Query>) -> Self {
        SetOperation::new(SetOperator::Except, false, left, right).into()
    }

    pub fn as_select(&self) -> Option<&Select> {
        match self {
            Query::Select(select) => Some(select),
            Query::SetOperation(_) => None,
        }
    }
}

impl fmt::Display for SetOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Cte::write_with(f, &self.with)?;
        write_branch(f, &self.left, false)?;
        write!(f, " {}", self.op)?;
        if self.all {
            f.write_str(" ALL")?;
        }
        f.write_str(" ")?;
        write_branch(f, &self.right, true)?;
        if !self.order_by.is_empty() {
            f.write_str(" ORDER BY ")?;
            write_list(f, &self.order_by)?;
        }
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {}", limit)?;
        }
        if let Some(offset) = self.offset {
            write!(f, " OFFSET {}", offset)?;
        }
        Ok(())
    }
}

/// Branches carrying their own `WITH`, `ORDER BY`, `LIMIT` or `OFFSET` are
/// parenthesised so those clauses stay attached to the branch. A set operation
/// on the right is always parenthesised.
fn write_branch(f: &mut fmt::Formatter<'_>, branch: &Query, right: bool) -> fmt::Result {
    let nested = match branch {
        Query::Select(select) => {
            !select.with.is_empty() || !select.order_by.is_empty() || select.limit.is_some() || select.offset.is_some()
        }
        Query::SetOperation(operation) => {
            right || !operation.with.is_empty() || !operation.order_by.is_empty()
                || operation.limit.is_some() || operation.offset.is_some()
        }
    };
    if nested {
        write!(f, "({})", branch)
    } else {
        write!(f, "{}", branch)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Select(select) => write!(f, "{}", select),
            Query::SetOperation(operation) => write!(f, "{}", operation),
        }
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Query({})", self)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{OrderBy, Query, ScalarExpr, Select, SetOperation, SetOperator};

    fn branch(table: &str) -> Select {
        Select::new().project(ScalarExpr::column("a")).from_table(table)
    }

    #[test]
    pub fn test_union() {
        assert_eq!(Query::union(branch("x"), branch("y")).to_string(), "SELECT a FROM x UNION SELECT a FROM y");
        assert_eq!(Query::union_all(branch("x"), branch("y")).to_string(), "SELECT a FROM x UNION ALL SELECT a FROM y");
    }

    #[test]
    pub fn test_nested_set_operation_on_the_right() {
        let right = Query::except(branch("y"), branch("z"));
        let query = Query::intersect(branch("x"), right);

        assert_eq!(query.to_string(), "SELECT a FROM x INTERSECT (SELECT a FROM y EXCEPT SELECT a FROM z)");
    }

    #[test]
    pub fn test_set_operation_order_and_limit() {
        let query: Query = SetOperation::new(SetOperator::Union, true, branch("x"), branch("y"))
            .order_by(OrderBy::desc(ScalarExpr::column("a")))
            .limit(5)
            .into();

        assert_eq!(query.to_string(), "SELECT a FROM x UNION ALL SELECT a FROM y ORDER BY a DESC LIMIT 5");
        assert!(query.as_select().is_none());
    }

    #[test]
    pub fn test_branch_with_own_clauses_is_parenthesised() {
        let top = branch("y").order_by(OrderBy::asc(ScalarExpr::column("a"))).limit(3);
        assert_eq!(
            Query::union_all(branch("x"), top.clone()).to_string(),
            "SELECT a FROM x UNION ALL (SELECT a FROM y ORDER BY a LIMIT 3)",
        );
        assert_eq!(
            Query::union_all(top, branch("x")).to_string(),
            "(SELECT a FROM y ORDER BY a LIMIT 3) UNION ALL SELECT a FROM x",
        );

        let ordered: Query = SetOperation::new(SetOperator::Union, false, branch("x"), branch("y"))
            .order_by(OrderBy::asc(ScalarExpr::column("a")))
            .into();
        assert_eq!(
            Query::except(ordered, branch("z")).to_string(),
            "(SELECT a FROM x UNION SELECT a FROM y ORDER BY a) EXCEPT SELECT a FROM z",
        );
    }
}
