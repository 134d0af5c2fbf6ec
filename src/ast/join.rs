use crate::ast::{Collection, Predicate};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinType::Inner => write!(f, "JOIN"),
            JoinType::Left => write!(f, "LEFT JOIN"),
            JoinType::Right => write!(f, "RIGHT JOIN"),
            JoinType::Full => write!(f, "FULL JOIN"),
            JoinType::Cross => write!(f, "CROSS JOIN"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub collection: Collection,
    pub predicate: Option<Predicate>,
}

impl Join {
    pub fn inner(collection: Collection, predicate: Predicate) -> Self {
        Self { join_type: JoinType::Inner, collection, predicate: Some(predicate) }
    }

    pub fn left(collection: Collection, predicate: Predicate) -> Self {
        Self { join_type: JoinType::Left, collection, predicate: Some(predicate) }
    }

    pub fn cross(collection: Collection) -> Self {
        Self { join_type: JoinType::Cross, collection, predicate: None }
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.join_type, self.collection)?;
        if let Some(predicate) = &self.predicate {
            write!(f, " ON {}", predicate)?;
        }
        Ok(())
    }
}
