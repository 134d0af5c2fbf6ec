use std::collections::HashSet;

use crate::{
    ast::{Collection, Query},
    config::PushdownConfig,
};

/// Gives every source of a query an alias: tables their own (last) name,
/// anything else a fresh synthetic name handed out in pre-order.
pub struct AliasNamer<'c> {
    config: &'c PushdownConfig,
    taken: HashSet<String>,
    next: usize,
}

impl<'c> AliasNamer<'c> {
    pub fn name_sources(query: Query, config: &'c PushdownConfig) -> Query {
        let mut taken = HashSet::new();
        query.for_each_collection(&mut |collection| {
            match (collection.alias(), collection) {
                (Some(alias), _) => taken.insert(alias.to_string()),
                (None, Collection::Table { name, .. }) => taken.insert(Self::table_alias(name)),
                (None, _) => false,
            };
        });

        let mut namer = Self { config, taken, next: 0 };
        query.map_collections(&mut |collection| namer.name(collection))
    }

    fn name(&mut self, collection: Collection) -> Collection {
        if collection.alias().is_some() {
            return collection;
        }
        let alias = match &collection {
            Collection::Table { name, .. } => Self::table_alias(name),
            _ => self.fresh(),
        };
        collection.with_alias(alias)
    }

    fn fresh(&mut self) -> String {
        loop {
            let candidate = format!("{}{}", self.config.source_alias_prefix, self.next);
            self.next += 1;
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    fn table_alias(name: &str) -> String {
        name.rsplit('.').next().unwrap_or(name).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Collection, Function, Predicate, ScalarExpr, Select};

    #[test]
    fn test_names_in_pre_order() {
        let inner = Select::new().project_all().from(Collection::derived(Select::new().project_all().from_table("db.x")));
        let query: Query = Select::new()
            .project(ScalarExpr::column("a"))
            .from(Collection::derived(inner))
            .filter(Predicate::exists(Select::new().project(ScalarExpr::int(1)).from(Collection::function(Function::new("UNNEST", vec![])))))
            .into();

        let result = AliasNamer::name_sources(query, &PushdownConfig::new());

        assert_eq!(
            result.to_string(),
            "SELECT a FROM (SELECT * FROM (SELECT * FROM db.x AS x) AS _q_1) AS _q_0 \
             WHERE EXISTS (SELECT 1 FROM UNNEST() AS _q_2)"
        );
    }

    #[test]
    fn test_skips_aliases_already_taken() {
        let query: Query = Select::new()
            .project_all()
            .from(Collection::derived(Select::new().project_all().from_table("x")))
            .from(Collection::table_as("y", "_q_0"))
            .into();

        let result = AliasNamer::name_sources(query, &PushdownConfig::new());

        assert_eq!(result.to_string(), "SELECT * FROM (SELECT * FROM x AS x) AS _q_1, y AS _q_0");
    }

    #[test]
    fn test_renaming_is_stable() {
        let query: Query = Select::new().project_all().from(Collection::derived(Select::new().project_all().from_table("x"))).into();
        let config = PushdownConfig::new();

        let once = AliasNamer::name_sources(query, &config);
        let twice = AliasNamer::name_sources(once.clone(), &config);

        assert_eq!(once, twice);
    }
}
