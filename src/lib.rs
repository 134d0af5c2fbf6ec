pub mod ast;

pub mod schema;
pub use schema::{SchemaDict, SchemaError, SchemaHints, SchemaProvider};

pub mod config;
pub use config::PushdownConfig;

pub mod analyzer;
pub use analyzer::{AnalyzerError, ScopeTree};

pub mod optimizer;
pub use optimizer::{pushdown_projections, pushdown_projections_with, UsageCollector, UsageMap};
