//! Proto generator - message definitions for one table

use crate::config::CodegenConfig;
use crate::parser::{Column, ColumnRole, ParsedTable};

use super::code_generator::table_slots;
use super::naming::to_entity_name;
use super::template::Slots;

/// Slots for `proto.tmpl` and `proto_aggregate.tmpl`
pub fn proto_slots(table: &ParsedTable, config: &CodegenConfig) -> Slots {
    let entity = to_entity_name(&table.name);
    let mut slots = table_slots(table, config);

    let all: Vec<&Column> = table.columns.iter().collect();
    let create: Vec<&Column> = table
        .columns
        .iter()
        .filter(|c| c.role() == ColumnRole::Regular)
        .collect();
    let update: Vec<&Column> = table
        .columns
        .iter()
        .filter(|c| matches!(c.role(), ColumnRole::Identity | ColumnRole::Regular))
        .collect();

    slots
        .insert("entity_message", build_message(&entity, &all))
        .insert(
            "create_message",
            build_message(&format!("Create{}Request", entity), &create),
        )
        .insert(
            "update_message",
            build_message(&format!("Update{}Request", entity), &update),
        );
    slots
}

/// A proto3 message with one field per column, numbered from 1
pub fn build_message(name: &str, columns: &[&Column]) -> String {
    let mut message = format!("message {} {{\n", name);
    for (index, column) in columns.iter().enumerate() {
        message.push_str(&format!(
            "    {} {} = {};\n",
            column.mapped_type.proto_type(),
            column.name,
            index + 1
        ));
    }
    message.push('}');
    message
}
