//! Service generator - gRPC service wrapper for one table

use crate::config::CodegenConfig;
use crate::parser::ParsedTable;

use super::code_generator::table_slots;
use super::template::Slots;

/// Slots for `service.tmpl` and `service_aggregate.tmpl`
pub fn service_slots(table: &ParsedTable, config: &CodegenConfig) -> Slots {
    table_slots(table, config)
}
