//! Handler generator - HTTP handler set for one table

use crate::config::CodegenConfig;
use crate::parser::ParsedTable;

use super::code_generator::table_slots;
use super::template::Slots;

/// Slots for `handler.tmpl` and `handler_aggregate.tmpl`
///
/// Handlers only talk to the service layer, so the shared table slots
/// (entity, route, id_param, ...) are all they need.
pub fn handler_slots(table: &ParsedTable, config: &CodegenConfig) -> Slots {
    table_slots(table, config)
}
