use std::fmt;

use crate::analyzer::ScopeId;

#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzerError {
    UnknownCollection(String),
    UnknownColumn { name: String, candidates: Vec<String> },
    AmbiguousColumn { name: String, matches: Vec<String> }, // visible source names
    UnexpandableWildcard { scope: ScopeId, source: Option<String> },
    ArityMismatch { scope: ScopeId, left: usize, right: usize },
}

impl fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzerError::UnknownCollection(name) => write!(f, "unknown source '{}'", name),
            AnalyzerError::UnknownColumn { name, candidates } if candidates.is_empty() => {
                write!(f, "unknown column '{}'", name)
            }
            AnalyzerError::UnknownColumn { name, candidates } => {
                write!(f, "unknown column '{}' (visible: {})", name, candidates.join(", "))
            }
            AnalyzerError::AmbiguousColumn { name, matches } => {
                write!(f, "column '{}' is ambiguous between {}", name, matches.join(", "))
            }
            AnalyzerError::UnexpandableWildcard { scope, source: Some(source) } => {
                write!(f, "cannot expand '{}.*' in scope {}: columns unknown", source, scope)
            }
            AnalyzerError::UnexpandableWildcard { scope, source: None } => {
                write!(f, "cannot expand '*' in scope {}: columns unknown", scope)
            }
            AnalyzerError::ArityMismatch { scope, left, right } => {
                write!(f, "set operation {} has {} columns on the left and {} on the right", scope, left, right)
            }
        }
    }
}

impl std::error::Error for AnalyzerError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = AnalyzerError::AmbiguousColumn { name: "a".into(), matches: vec!["x".into(), "y".into()] };
        assert_eq!(err.to_string(), "column 'a' is ambiguous between x, y");

        let err = AnalyzerError::UnexpandableWildcard { scope: 2, source: Some("t".into()) };
        assert_eq!(err.to_string(), "cannot expand 't.*' in scope 2: columns unknown");

        let err = AnalyzerError::UnknownColumn { name: "z".into(), candidates: vec![] };
        assert_eq!(err.to_string(), "unknown column 'z'");
    }
}
