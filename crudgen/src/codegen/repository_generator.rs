//! Repository generator - Postgres repository for one table

use tracing::warn;

use crate::config::CodegenConfig;
use crate::parser::ParsedTable;

use super::code_generator::table_slots;
use super::column_set::{ColumnSet, GeneratedFragments};
use super::template::Slots;

/// Slots for `repository.tmpl` and `repository_aggregate.tmpl`
pub fn repository_slots(table: &ParsedTable, config: &CodegenConfig) -> Slots {
    let missing = table.missing_conventional_columns();
    if !missing.is_empty() {
        warn!(
            "Table {} has no {:?} column(s); the generated repository still references them",
            table.name, missing
        );
    }

    let fragments = ColumnSet::build(table).fragments();
    let mut slots = table_slots(table, config);
    insert_fragments(&mut slots, fragments);
    slots
}

fn insert_fragments(slots: &mut Slots, fragments: GeneratedFragments) {
    slots
        .insert("insert_columns", fragments.insert_column_list.join(",\n"))
        .insert(
            "insert_values",
            fragments.insert_value_placeholders.join(", "),
        )
        .insert(
            "insert_exec_args",
            fragments.exec_argument_expressions.join("\n"),
        )
        .insert("select_columns", fragments.select_column_list.join(",\n"))
        .insert("update_set", fragments.update_set_clause.join("\n"))
        .insert("update_bindings", fragments.update_exec_bindings.join("\n"))
        .insert(
            "scan_declarations",
            fragments.scan_variable_declarations.join("\n"),
        )
        .insert("scan_targets", fragments.scan_target_refs.join("\n"))
        .insert(
            "response_fields",
            fragments.response_field_assignments.join("\n"),
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Column;

    #[test]
    fn test_repository_slots() {
        let table = ParsedTable {
            name: "client".to_string(),
            columns: vec![
                Column::new("id", "uuid"),
                Column::new("first_name", "varchar"),
                Column::new("balance", "numeric"),
                Column::new("created_at", "timestamp"),
                Column::new("updated_at", "timestamp"),
            ],
        };
        let slots = repository_slots(&table, &CodegenConfig::default());

        assert_eq!(
            slots.get("insert_columns"),
            Some("\t\t\tid,\n\t\t\tfirst_name,\n\t\t\tbalance,\n\t\t\tupdated_at")
        );
        assert_eq!(slots.get("insert_values"), Some("$1, $2, $3, now()"));
        assert_eq!(
            slots.get("insert_exec_args"),
            Some("\t\treq.GetFirstName(),\n\t\treq.GetBalance(),")
        );
        assert_eq!(
            slots.get("select_columns"),
            Some("\t\t\tid,\n\t\t\tfirst_name,\n\t\t\tbalance")
        );
        assert_eq!(
            slots.get("scan_declarations"),
            Some("\t\tfirstName sql.NullString\n\t\tbalance sql.NullFloat64")
        );
        assert_eq!(slots.get("entity"), Some("Client"));
    }
}
