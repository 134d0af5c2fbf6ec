use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::{
    analyzer::AnalyzerError,
    ast::{Column, SetOperator},
};

/// Index of a scope inside its `ScopeTree`. Ids follow pre-order.
pub type ScopeId = usize;

/// Identity of one exposed output column: the scope that produces it and its
/// position in that scope's output list. Two outputs sharing a display name
/// keep distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnId {
    pub scope: ScopeId,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeKind {
    Root,
    DerivedTable { lateral: bool },
    Cte { name: String },
    /// Scalar, `EXISTS` or `IN` subquery.
    Subquery,
    /// One side of a set operation.
    Branch,
}

impl ScopeKind {
    /// Whether names that fail to resolve locally may bind in the parent scope.
    pub fn sees_enclosing(&self) -> bool {
        matches!(self, ScopeKind::Subquery | ScopeKind::Branch | ScopeKind::DerivedTable { lateral: true })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeBody {
    Select { distinct: bool, aggregate: bool },
    SetOperation { op: SetOperator, all: bool, branches: [ScopeId; 2] },
}

/// Reason a scope must keep every output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pin {
    Distinct,
    SetOperation,
    PinnedBranch,
    Misaligned,
    Wildcard,
    Positional,
    ColumnAliases,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Table { name: String },
    Scope(ScopeId),
    /// Table function or `VALUES`.
    TableValued,
}

/// A named entry of a scope's `FROM`/`JOIN` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub kind: SourceKind,
    /// Exposed column names in order, `None` when unknown.
    pub columns: Option<Vec<String>>,
}

impl Source {
    pub fn scope(&self) -> Option<ScopeId> {
        match self.kind {
            SourceKind::Scope(id) => Some(id),
            _ => None,
        }
    }

    pub fn exposes(&self, name: &str) -> bool {
        self.columns.as_ref().is_some_and(|columns| columns.iter().any(|c| c == name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputOrigin {
    /// Non-wildcard projection item.
    Item(usize),
    /// One column produced by expanding the wildcard at `item`.
    Expanded { item: usize, source: String, position: usize },
    /// Output of a set operation, taken from its left branch.
    Branch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputColumn {
    pub id: ColumnId,
    pub name: String,
    pub origin: OutputOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clause {
    From,
    Projection,
    DistinctOn,
    JoinCondition,
    Where,
    GroupBy,
    Having,
    OrderBy,
    /// Table function arguments and `VALUES` rows.
    Arguments,
}

/// Where inside a scope something appears. References made from a projection
/// item only count while that output survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    Output(usize),
    Clause(Clause),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Source { source: String, targets: Vec<ColumnId> },
    Outer { scope: ScopeId, source: String, targets: Vec<ColumnId> },
    OutputAlias(String),
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub column: Column,
    pub resolution: Resolution,
    pub origin: Origin,
}

/// A reference made in scope `from` that binds to a source of the enclosing
/// scope `resolved_in`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correlation {
    pub from: ScopeId,
    pub resolved_in: ScopeId,
    pub origin: Origin,
    pub source: String,
    pub column: String,
    pub targets: Vec<ColumnId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    /// Position of this scope inside its parent.
    pub origin: Origin,
    /// Number of the parent's sources visible from here (`LATERAL` sees only
    /// the ones listed before it). `None` means all of them.
    pub outer_visible: Option<usize>,
    pub body: ScopeBody,
    pub sources: IndexMap<String, Source>,
    /// `None` when a wildcard could not be expanded.
    pub outputs: Option<Vec<OutputColumn>>,
    pub references: Vec<ColumnRef>,
    /// Bare names that bind to this scope's own output aliases.
    pub alias_refs: BTreeSet<String>,
    /// Sources consumed as a whole (unexpandable wildcard over them).
    pub whole_sources: Vec<(String, Origin)>,
    pub children: Vec<ScopeId>,
    pub pin: Option<Pin>,
    /// First failure met while analysing; the scope is passed through.
    pub error: Option<AnalyzerError>,
}

impl Scope {
    pub fn new(id: ScopeId, kind: ScopeKind, parent: Option<ScopeId>, origin: Origin) -> Self {
        Self {
            id,
            kind,
            parent,
            origin,
            outer_visible: None,
            body: ScopeBody::Select { distinct: false, aggregate: false },
            sources: IndexMap::new(),
            outputs: None,
            references: vec![],
            alias_refs: BTreeSet::new(),
            whole_sources: vec![],
            children: vec![],
            pin: None,
            error: None,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self.body, ScopeBody::Select { aggregate: true, .. })
    }

    pub fn output_names(&self) -> Option<Vec<&str>> {
        self.outputs.as_ref().map(|outputs| outputs.iter().map(|o| o.name.as_str()).collect())
    }

    pub fn has_output(&self, name: &str) -> bool {
        self.outputs.as_ref().is_some_and(|outputs| outputs.iter().any(|o| o.name == name))
    }

    /// Output position of the first column produced by projection item `item`.
    pub fn item_position(&self, item: usize) -> usize {
        self.outputs.as_ref()
            .and_then(|outputs| outputs.iter().position(|output| match output.origin {
                OutputOrigin::Item(i) | OutputOrigin::Expanded { item: i, .. } => i == item,
                OutputOrigin::Branch => false,
            }))
            .unwrap_or(item)
    }

    /// Keeps the first reason only.
    pub fn pin(&mut self, pin: Pin) {
        self.pin.get_or_insert(pin);
    }

    pub fn fail(&mut self, error: AnalyzerError) {
        self.error.get_or_insert(error);
    }

    /// Whether the scope must expose every output it has.
    pub fn keeps_all(&self) -> bool {
        self.pin.is_some() || self.error.is_some() || self.outputs.is_none()
    }
}
