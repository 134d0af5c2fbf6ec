pub mod schema_hints;
pub use schema_hints::*;

pub trait SchemaProvider {
    /// Given a leaf table name as written in the query (possibly dotted),
    /// return its ordered column list if known.
    fn schema_of(&self, table: &str) -> Option<&SchemaDict>;
}
