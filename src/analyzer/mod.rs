pub mod analyzer_error;
pub use analyzer_error::*;

pub mod analysis_context;
pub use analysis_context::*;

pub mod scope;
pub use scope::*;

pub mod scope_tree;
pub use scope_tree::*;

pub mod scope_builder;
pub use scope_builder::*;

pub mod resolvers;
pub use resolvers::*;
