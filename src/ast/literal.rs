use ordered_float::NotNan;
use std::fmt::{self, Display};

#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    String(String),
    Int(i64),
    Float(NotNan<f64>),
    Bool(bool),
    Null,
}

impl Literal {
    /// Float literal; NaN has no SQL spelling and becomes NULL.
    pub fn float(value: f64) -> Self {
        NotNan::new(value).map(Literal::Float).unwrap_or(Literal::Null)
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Int(i) => write!(f, "{}", i),
            Literal::Float(n) => write!(f, "{}", n.into_inner()),
            Literal::Bool(true) => write!(f, "TRUE"),
            Literal::Bool(false) => write!(f, "FALSE"),
            Literal::Null => write!(f, "NULL"),
        }
    }
}

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(_) => write!(f, "String({})", self),
            Literal::Int(_) => write!(f, "Int({})", self),
            Literal::Float(_) => write!(f, "Float({})", self),
            Literal::Bool(_) => write!(f, "Bool({})", self),
            Literal::Null => write!(f, "Null(NULL)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_literal_escapes_quote() {
        assert_eq!(Literal::String("O'Neil".into()).to_string(), "'O''Neil'");
    }

    #[test]
    fn test_float_literal() {
        assert_eq!(Literal::float(1.5).to_string(), "1.5");
        assert_eq!(Literal::float(f64::NAN), Literal::Null);
    }

    #[test]
    fn test_bool_and_null_literal() {
        assert_eq!(Literal::Bool(true).to_string(), "TRUE");
        assert_eq!(Literal::Bool(false).to_string(), "FALSE");
        assert_eq!(Literal::Null.to_string(), "NULL");
    }
}
