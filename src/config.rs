use serde::Deserialize;

/// Knobs of the pushdown pass.
///
/// - `source_alias_prefix` prefixes synthetic source aliases (`_q_0`, `_q_1`, ...).
/// - `column_alias_prefix` prefixes synthetic output names (`_col_0`, ...), followed by the item position.
/// - `placeholder_alias` names the constant kept when every column of a scope is pruned.
/// - `remove_unused_selections` set to `false` only names, expands and qualifies.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PushdownConfig {
    pub source_alias_prefix: String,
    pub column_alias_prefix: String,
    pub placeholder_alias: String,
    pub remove_unused_selections: bool,
}

impl Default for PushdownConfig {
    fn default() -> Self {
        Self {
            source_alias_prefix: "_q_".to_string(),
            column_alias_prefix: "_col_".to_string(),
            placeholder_alias: "_".to_string(),
            remove_unused_selections: true,
        }
    }
}

impl PushdownConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Naming, wildcard expansion and qualification without pruning.
    pub fn qualify_only() -> Self {
        Self { remove_unused_selections: false, ..Self::default() }
    }

    pub fn with_prefixes(source_alias_prefix: &str, column_alias_prefix: &str) -> Self {
        Self {
            source_alias_prefix: source_alias_prefix.to_string(),
            column_alias_prefix: column_alias_prefix.to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn synthetic_column(&self, position: usize) -> String {
        format!("{}{}", self.column_alias_prefix, position)
    }
}
