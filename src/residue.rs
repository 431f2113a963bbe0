//! Detection of flows left without a counterpart after matching

use crate::error::Result;
use crate::schema::{CanonicalField, FlowAttribute, Side, CONTEXT, FLOWABLE, FLOW_UUID, UNMATCHED};
use crate::table::Table;

/// Turn the flows of one side that no matched row claims into residue rows.
///
/// A flow is claimed when its `Flow UUID` appears in the matched table's
/// identifier field for `side`, or when its (`Flowable`, `Context`) pair
/// appears in that side's name and context fields. Survivors keep their
/// original columns and gain `MatchCondition = "!"`, a missing
/// `ConversionFactor`, this side's list name and flow fields, and empty
/// strings for the opposite side.
pub fn detect_residue(flows: &Table, matched: &Table, list_name: &str, side: Side) -> Result<Table> {
    let opposite = side.opposite();

    let unclaimed_by_id = flows.filter_by_columns(
        matched,
        &[FLOW_UUID],
        &[FlowAttribute::Uuid.field(side).name()],
    )?;
    let mut residue = unclaimed_by_id.filter_by_columns(
        matched,
        &[FLOWABLE, CONTEXT],
        &[
            FlowAttribute::Name.field(side).name(),
            FlowAttribute::Context.field(side).name(),
        ],
    )?;

    residue.fill_column(CanonicalField::MatchCondition.name(), Some(UNMATCHED.to_string()));
    residue.fill_column(CanonicalField::ConversionFactor.name(), None);
    residue.fill_column(side.list_name().name(), Some(list_name.to_string()));
    residue.fill_column(opposite.list_name().name(), Some(String::new()));

    for attribute in FlowAttribute::ALL {
        residue.copy_column(attribute.input_column(), attribute.field(side).name())?;
        residue.fill_column(attribute.field(opposite).name(), Some(String::new()));
    }

    log::debug!("{} {} flows have no counterpart", residue.len(), side);
    Ok(residue)
}
