use tracing::{debug, debug_span};

use crate::{analyzer::ScopeTree, ast::Query, config::PushdownConfig, schema::SchemaProvider};

pub mod alias_namer;
pub use alias_namer::*;

pub mod usage_collector;
pub use usage_collector::*;

pub mod projection_pruner;
pub use projection_pruner::*;

pub mod rewriter;
pub use rewriter::*;

pub mod qualifier;


/// Rewrites every nested query to project only the columns its consumers
/// read. Sources get aliases, wildcards are expanded, references qualified
/// and outputs named. Never fails: scopes that cannot be analysed are left
/// as they are.
pub fn pushdown_projections(query: Query, schemas: &dyn SchemaProvider) -> Query {
    pushdown_projections_with(query, schemas, &PushdownConfig::default())
}

pub fn pushdown_projections_with(query: Query, schemas: &dyn SchemaProvider, config: &PushdownConfig) -> Query {
    let span = debug_span!("pushdown_projections");
    let _guard = span.enter();

    let query = AliasNamer::name_sources(query, config);
    let tree = ScopeTree::build(&query, schemas, config);
    let usage = UsageCollector::collect(&tree);
    debug!(
        scopes = tree.len(),
        correlations = tree.correlations.len(),
        failed = tree.scopes.iter().filter(|s| s.error.is_some()).count(),
        "scopes analysed"
    );

    Rewriter::new(&tree, &usage, config).rewrite(query)
}
