//! Column vocabulary shared by the matching stages
//!
//! Input flow lists use the raw column names (`Flowable`, `Context`,
//! `Flow UUID`, `Unit`). Joins suffix colliding columns with `_source` /
//! `_target`, and a [`RenameTable`] turns those suffixed names into the
//! canonical mapping fields listed by [`CanonicalField`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const FLOWABLE: &str = "Flowable";
pub const CONTEXT: &str = "Context";
pub const FLOW_UUID: &str = "Flow UUID";
pub const UNIT: &str = "Unit";

/// Columns every input flow list must carry
pub const REQUIRED_COLUMNS: [&str; 4] = [FLOWABLE, CONTEXT, FLOW_UUID, UNIT];

/// Suffix pair applied to colliding columns when two lists are joined
pub const JOIN_SUFFIXES: (&str, &str) = ("_source", "_target");

/// Marker for a confirmed correspondence
pub const MATCHED: &str = "=";
/// Marker for an unresolved residue
pub const UNMATCHED: &str = "!";
/// Conversion factor stamped on confirmed matches
pub const IDENTITY_FACTOR: f64 = 1.0;

const STANDARD_RENAMES: &[(&str, &str)] = &[
    ("Context_source", "SourceFlowContext"),
    ("Context_target", "TargetFlowContext"),
    ("Flow UUID_source", "SourceFlowUUID"),
    ("Flow UUID_target", "TargetFlowUUID"),
    ("Flowable_source", "SourceFlowName"),
    ("Flowable_target", "TargetFlowName"),
    ("Unit_source", "SourceUnit"),
    ("Unit_target", "TargetUnit"),
];

/// Which nomenclature a table or a field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Source,
    Target,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Source => Side::Target,
            Side::Target => Side::Source,
        }
    }

    /// List name field for this side
    pub fn list_name(self) -> CanonicalField {
        match self {
            Side::Source => CanonicalField::SourceListName,
            Side::Target => CanonicalField::TargetListName,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => write!(f, "source"),
            Side::Target => write!(f, "target"),
        }
    }
}

/// Per-flow attributes that exist on both sides of a mapping row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowAttribute {
    Name,
    Uuid,
    Context,
    Unit,
}

impl FlowAttribute {
    pub const ALL: [FlowAttribute; 4] = [
        FlowAttribute::Name,
        FlowAttribute::Uuid,
        FlowAttribute::Context,
        FlowAttribute::Unit,
    ];

    /// Column name in an input flow list
    pub fn input_column(self) -> &'static str {
        match self {
            FlowAttribute::Name => FLOWABLE,
            FlowAttribute::Uuid => FLOW_UUID,
            FlowAttribute::Context => CONTEXT,
            FlowAttribute::Unit => UNIT,
        }
    }

    /// Canonical mapping field holding this attribute for `side`
    pub fn field(self, side: Side) -> CanonicalField {
        use CanonicalField::*;
        match (self, side) {
            (FlowAttribute::Name, Side::Source) => SourceFlowName,
            (FlowAttribute::Name, Side::Target) => TargetFlowName,
            (FlowAttribute::Uuid, Side::Source) => SourceFlowUUID,
            (FlowAttribute::Uuid, Side::Target) => TargetFlowUUID,
            (FlowAttribute::Context, Side::Source) => SourceFlowContext,
            (FlowAttribute::Context, Side::Target) => TargetFlowContext,
            (FlowAttribute::Unit, Side::Source) => SourceUnit,
            (FlowAttribute::Unit, Side::Target) => TargetUnit,
        }
    }
}

/// Output fields of a mapping table, declared in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalField {
    SourceListName,
    SourceFlowName,
    SourceFlowUUID,
    SourceFlowContext,
    SourceUnit,
    MatchCondition,
    ConversionFactor,
    TargetListName,
    TargetFlowName,
    TargetFlowUUID,
    TargetFlowContext,
    TargetUnit,
    Mapper,
    Verifier,
    LastUpdated,
    MemoMapper,
    MemoVerifier,
    MemoSource,
    MemoTarget,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 19] = [
        CanonicalField::SourceListName,
        CanonicalField::SourceFlowName,
        CanonicalField::SourceFlowUUID,
        CanonicalField::SourceFlowContext,
        CanonicalField::SourceUnit,
        CanonicalField::MatchCondition,
        CanonicalField::ConversionFactor,
        CanonicalField::TargetListName,
        CanonicalField::TargetFlowName,
        CanonicalField::TargetFlowUUID,
        CanonicalField::TargetFlowContext,
        CanonicalField::TargetUnit,
        CanonicalField::Mapper,
        CanonicalField::Verifier,
        CanonicalField::LastUpdated,
        CanonicalField::MemoMapper,
        CanonicalField::MemoVerifier,
        CanonicalField::MemoSource,
        CanonicalField::MemoTarget,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CanonicalField::SourceListName => "SourceListName",
            CanonicalField::SourceFlowName => "SourceFlowName",
            CanonicalField::SourceFlowUUID => "SourceFlowUUID",
            CanonicalField::SourceFlowContext => "SourceFlowContext",
            CanonicalField::SourceUnit => "SourceUnit",
            CanonicalField::MatchCondition => "MatchCondition",
            CanonicalField::ConversionFactor => "ConversionFactor",
            CanonicalField::TargetListName => "TargetListName",
            CanonicalField::TargetFlowName => "TargetFlowName",
            CanonicalField::TargetFlowUUID => "TargetFlowUUID",
            CanonicalField::TargetFlowContext => "TargetFlowContext",
            CanonicalField::TargetUnit => "TargetUnit",
            CanonicalField::Mapper => "Mapper",
            CanonicalField::Verifier => "Verifier",
            CanonicalField::LastUpdated => "LastUpdated",
            CanonicalField::MemoMapper => "MemoMapper",
            CanonicalField::MemoVerifier => "MemoVerifier",
            CanonicalField::MemoSource => "MemoSource",
            CanonicalField::MemoTarget => "MemoTarget",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.name() == name)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Translation from joined column names to canonical field names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenameTable(IndexMap<String, String>);

impl RenameTable {
    /// The translation used for `Flowable`/`Context`/`Flow UUID`/`Unit` joins
    pub fn standard() -> Self {
        Self::from_pairs(STANDARD_RENAMES)
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self(
            pairs
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        )
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(from, to)| (from.as_str(), to.as_str()))
    }
}

impl Default for RenameTable {
    fn default() -> Self {
        Self::standard()
    }
}
