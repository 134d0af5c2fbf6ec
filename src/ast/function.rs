use crate::ast::{write_list, ScalarExpr};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub args: Vec<ScalarExpr>,
    pub distinct: bool,
}

impl Function {
    pub fn new(name: impl Into<String>, args: Vec<ScalarExpr>) -> Self {
        Self { name: name.into(), args, distinct: false }
    }

    pub fn distinct(name: impl Into<String>, args: Vec<ScalarExpr>) -> Self {
        Self { name: name.into(), args, distinct: true }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        if self.distinct {
            f.write_str("DISTINCT ")?;
        }
        write_list(f, &self.args)?;
        f.write_str(")")
    }
}
