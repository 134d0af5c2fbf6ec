pub mod column_resolver;
pub use column_resolver::*;

pub mod identifier_resolver;
pub use identifier_resolver::*;

pub mod wildcard_resolver;
pub use wildcard_resolver::*;

pub mod aggregate_resolver;
pub use aggregate_resolver::*;
