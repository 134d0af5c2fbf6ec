use crate::ast::ScalarExpr;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub expr: ScalarExpr,
    pub ascending: bool,
}

impl OrderBy {
    pub fn asc(expr: ScalarExpr) -> Self {
        Self { expr, ascending: true }
    }

    pub fn desc(expr: ScalarExpr) -> Self {
        Self { expr, ascending: false }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if !self.ascending {
            f.write_str(" DESC")?;
        }
        Ok(())
    }
}
