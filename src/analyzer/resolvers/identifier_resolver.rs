use std::collections::HashSet;

use crate::{
    analyzer::{OutputColumn, OutputOrigin},
    ast::{Identifier, ScalarExpr},
    config::PushdownConfig,
};

pub struct IdentifierResolver;

impl IdentifierResolver {
    /// Name a projection item exposes: its alias, the column it reads, or a
    /// synthetic name built from its output position.
    pub fn output_name(ident: &Identifier, position: usize, config: &PushdownConfig) -> String {
        if let Some(alias) = &ident.alias {
            return alias.clone();
        }
        match &ident.expression {
            ScalarExpr::Column(column) => column.name().to_string(),
            _ => config.synthetic_column(position),
        }
    }

    /// Whether the item's output name is generated rather than written.
    pub fn is_synthetic(ident: &Identifier) -> bool {
        ident.alias.is_none() && !matches!(ident.expression, ScalarExpr::Column(_))
    }

    /// Moves generated names off the names the select already writes out,
    /// taking the next free `_col_N`.
    pub fn dedupe_synthetic(outputs: &mut [OutputColumn], projection: &[Identifier], config: &PushdownConfig) {
        let synthetic = |output: &OutputColumn| match output.origin {
            OutputOrigin::Item(item) => projection.get(item).is_some_and(Self::is_synthetic),
            _ => false,
        };
        let mut taken: HashSet<String> = outputs.iter()
            .filter(|output| !synthetic(output))
            .map(|output| output.name.clone())
            .collect();

        for output in outputs.iter_mut() {
            if !synthetic(&*output) {
                continue;
            }
            let mut position = output.id.index;
            while taken.contains(&config.synthetic_column(position)) {
                position += 1;
            }
            output.name = config.synthetic_column(position);
            taken.insert(output.name.clone());
        }
    }

    /// Same item with its output name written out.
    pub fn named(ident: Identifier, position: usize, config: &PushdownConfig) -> Identifier {
        let alias = Self::output_name(&ident, position, config);
        Identifier { expression: ident.expression, alias: Some(alias) }
    }
}
