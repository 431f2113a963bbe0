//! Exact matchers pairing source flows with target flows

use crate::error::Result;
use crate::schema::{CanonicalField, RenameTable, CONTEXT, FLOWABLE, FLOW_UUID, JOIN_SUFFIXES};
use crate::table::Table;

/// Pair flows whose `Flow UUID` is identical on both sides.
///
/// Every matched row keeps all columns of both inputs. The identifier is
/// copied into `SourceFlowUUID` and `TargetFlowUUID`, suffixed columns are
/// translated through `renames`, and the bare `Flow UUID` column is dropped.
pub fn match_by_identifier(source: &Table, target: &Table, renames: &RenameTable) -> Result<Table> {
    let mut merged = source.inner_join(target, &[FLOW_UUID], JOIN_SUFFIXES)?;

    merged.copy_column(FLOW_UUID, CanonicalField::SourceFlowUUID.name())?;
    merged.copy_column(FLOW_UUID, CanonicalField::TargetFlowUUID.name())?;
    merged.rename_columns(renames);
    merged.drop_columns(&[FLOW_UUID]);

    log::debug!("Identifier matcher paired {} flows", merged.len());
    Ok(merged)
}

/// Pair flows whose `Flowable` and `Context` are both identical.
///
/// Callers pass only flows not already claimed by [`match_by_identifier`];
/// this matcher knows nothing about earlier matches.
pub fn match_by_name_context(source: &Table, target: &Table, renames: &RenameTable) -> Result<Table> {
    let mut extra = source.inner_join(target, &[FLOWABLE, CONTEXT], JOIN_SUFFIXES)?;

    extra.copy_column(FLOWABLE, CanonicalField::TargetFlowName.name())?;
    extra.copy_column(FLOWABLE, CanonicalField::SourceFlowName.name())?;
    extra.copy_column(CONTEXT, CanonicalField::TargetFlowContext.name())?;
    extra.copy_column(CONTEXT, CanonicalField::SourceFlowContext.name())?;
    extra.rename_columns(renames);
    extra.drop_columns(&[FLOWABLE, CONTEXT]);

    log::debug!("Name/context matcher paired {} flows", extra.len());
    Ok(extra)
}
