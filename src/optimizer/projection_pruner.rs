use crate::{
    analyzer::Scope,
    ast::{Identifier, ScalarExpr},
    config::PushdownConfig,
    optimizer::{Retained, Usage},
};

pub struct ProjectionPruner;

impl ProjectionPruner {
    /// Output positions a scope has to keep given what its consumers use.
    ///
    /// Pinned, failed and unexpanded scopes keep everything, as do scopes no
    /// consumer reads by column (the root, unreferenced CTEs, expression
    /// subqueries). Outputs named by the scope's own bare references survive.
    pub fn retained(scope: &Scope, usage: Option<&Usage>) -> Retained {
        if scope.keeps_all() {
            return Retained::All;
        }
        match usage {
            None | Some(Usage::All) => Retained::All,
            Some(Usage::Columns(columns)) => {
                let mut positions = columns.clone();
                for output in scope.outputs.iter().flatten() {
                    if scope.alias_refs.contains(&output.name) {
                        positions.insert(output.id.index);
                    }
                }
                Retained::Positions(positions)
            }
        }
    }

    /// Constant kept when nothing else survives: `1 AS _`, or `MAX(1) AS _`
    /// for an aggregating select so it still yields a single row.
    pub fn placeholder(aggregate: bool, config: &PushdownConfig) -> Identifier {
        let expression = if aggregate {
            ScalarExpr::function("MAX", vec![ScalarExpr::int(1)])
        } else {
            ScalarExpr::int(1)
        };
        Identifier::aliased(expression, config.placeholder_alias.clone())
    }

    /// Drops the items whose output position is not retained.
    pub fn prune(items: Vec<(usize, Identifier)>, retained: &Retained, aggregate: bool, config: &PushdownConfig) -> Vec<Identifier> {
        if retained.is_all() || !config.remove_unused_selections {
            return items.into_iter().map(|(_, ident)| ident).collect();
        }
        let kept: Vec<Identifier> = items.into_iter()
            .filter(|(position, _)| retained.contains(*position))
            .map(|(_, ident)| ident)
            .collect();
        if kept.is_empty() {
            vec![Self::placeholder(aggregate, config)]
        } else {
            kept
        }
    }
}
