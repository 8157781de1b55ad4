//! Per-column fragment records and the statement lists projected from them

use tracing::debug;

use super::naming::{snake_to_camel, to_go_var_name, upper_head};
use super::type_mapper::ScanWrapper;
use crate::parser::{ColumnRole, ParsedTable};

/// Everything generated code needs to know about one column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFragment {
    /// Column name in SQL
    pub column: String,
    pub role: ColumnRole,
    /// Local Go variable used when scanning
    pub var_name: String,
    /// Exported field on the generated proto message
    pub field_name: String,
    pub scan: ScanWrapper,
}

impl ColumnFragment {
    fn new(column: &crate::parser::Column) -> Self {
        Self {
            column: column.name.clone(),
            role: column.role(),
            var_name: to_go_var_name(&column.name),
            field_name: upper_head(&snake_to_camel(&column.name)),
            scan: column.mapped_type.scan_wrapper(),
        }
    }

    pub fn insert_column(&self) -> String {
        format!("\t\t\t{}", self.column)
    }

    pub fn select_column(&self) -> String {
        format!("\t\t\t{}", self.column)
    }

    pub fn exec_argument(&self) -> String {
        format!("\t\treq.Get{}(),", self.field_name)
    }

    pub fn update_set(&self) -> String {
        format!("\t\t\t{} = :{},", self.column, self.column)
    }

    pub fn update_binding(&self) -> String {
        format!("\t\t\"{}\": req.Get{}(),", self.column, self.field_name)
    }

    pub fn scan_declaration(&self) -> String {
        format!("\t\t{} {}", self.var_name, self.scan.go_type())
    }

    pub fn scan_target(&self) -> String {
        format!("\t\t&{},", self.var_name)
    }

    pub fn response_assignment(&self) -> String {
        format!(
            "\t\t{}: {}.{},",
            self.field_name,
            self.var_name,
            self.scan.accessor()
        )
    }
}

/// Fragment records for one table, in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSet {
    columns: Vec<ColumnFragment>,
}

/// Statement pieces substituted into the repository template
///
/// The body lists (`exec_argument_expressions` through
/// `response_field_assignments`) are all projections of the regular columns,
/// so entry `i` of each refers to the same column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedFragments {
    pub insert_column_list: Vec<String>,
    pub insert_value_placeholders: Vec<String>,
    pub exec_argument_expressions: Vec<String>,
    pub select_column_list: Vec<String>,
    pub update_set_clause: Vec<String>,
    pub update_exec_bindings: Vec<String>,
    pub scan_variable_declarations: Vec<String>,
    pub scan_target_refs: Vec<String>,
    pub response_field_assignments: Vec<String>,
}

impl ColumnSet {
    pub fn build(table: &ParsedTable) -> Self {
        let columns: Vec<ColumnFragment> = table.columns.iter().map(ColumnFragment::new).collect();
        debug!(
            "Column set for {}: {} columns, {} regular",
            table.name,
            columns.len(),
            columns
                .iter()
                .filter(|c| c.role == ColumnRole::Regular)
                .count()
        );
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnFragment] {
        &self.columns
    }

    /// Columns that are neither the identity nor an audit timestamp
    pub fn regular(&self) -> impl Iterator<Item = &ColumnFragment> {
        self.with_role(ColumnRole::Regular)
    }

    /// Columns bound to an INSERT placeholder: identity first, then regular columns
    pub fn bound(&self) -> impl Iterator<Item = &ColumnFragment> {
        self.with_role(ColumnRole::Identity).chain(self.regular())
    }

    fn with_role(&self, role: ColumnRole) -> impl Iterator<Item = &ColumnFragment> {
        self.columns.iter().filter(move |c| c.role == role)
    }

    pub fn fragments(&self) -> GeneratedFragments {
        let bound: Vec<&ColumnFragment> = self.bound().collect();
        let regular: Vec<&ColumnFragment> = self.regular().collect();
        let stamped = self.with_role(ColumnRole::UpdatedAt).next();

        let mut insert_column_list: Vec<String> = bound.iter().map(|c| c.insert_column()).collect();
        let mut insert_value_placeholders: Vec<String> =
            (1..=bound.len()).map(|n| format!("${}", n)).collect();
        if let Some(updated_at) = stamped {
            insert_column_list.push(updated_at.insert_column());
            insert_value_placeholders.push("now()".to_string());
        }

        let project = |render: fn(&ColumnFragment) -> String| -> Vec<String> {
            regular.iter().copied().map(render).collect()
        };

        GeneratedFragments {
            insert_column_list,
            insert_value_placeholders,
            exec_argument_expressions: project(ColumnFragment::exec_argument),
            select_column_list: bound.iter().map(|c| c.select_column()).collect(),
            update_set_clause: project(ColumnFragment::update_set),
            update_exec_bindings: project(ColumnFragment::update_binding),
            scan_variable_declarations: project(ColumnFragment::scan_declaration),
            scan_target_refs: project(ColumnFragment::scan_target),
            response_field_assignments: project(ColumnFragment::response_assignment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_table, Column};
    use proptest::prelude::*;

    fn table(name: &str, columns: &[(&str, &str)]) -> ParsedTable {
        ParsedTable {
            name: name.to_string(),
            columns: columns
                .iter()
                .map(|(name, ty)| Column::new(*name, *ty))
                .collect(),
        }
    }

    #[test]
    fn test_branch_fragments() {
        let table = parse_table(
            r#"CREATE TABLE IF NOT EXISTS "branch" (
                "id" uuid PRIMARY KEY,
                "name" varchar(100) NOT NULL,
                "created_at" timestamp DEFAULT now(),
                "updated_at" timestamp
            )"#,
        )
        .unwrap();
        let fragments = ColumnSet::build(&table).fragments();

        assert_eq!(
            fragments.insert_column_list,
            vec!["\t\t\tid", "\t\t\tname", "\t\t\tupdated_at"]
        );
        assert_eq!(fragments.insert_value_placeholders, vec!["$1", "$2", "now()"]);
        assert_eq!(fragments.exec_argument_expressions, vec!["\t\treq.GetName(),"]);
        assert_eq!(fragments.select_column_list, vec!["\t\t\tid", "\t\t\tname"]);
        assert_eq!(fragments.update_set_clause, vec!["\t\t\tname = :name,"]);
        assert_eq!(
            fragments.update_exec_bindings,
            vec!["\t\t\"name\": req.GetName(),"]
        );
        assert_eq!(
            fragments.scan_variable_declarations,
            vec!["\t\tname sql.NullString"]
        );
        assert_eq!(fragments.scan_target_refs, vec!["\t\t&name,"]);
        assert_eq!(
            fragments.response_field_assignments,
            vec!["\t\tName: name.String,"]
        );
    }

    #[test]
    fn test_audit_and_identity_exclusions() {
        let table = table(
            "client",
            &[
                ("created_at", "timestamp"),
                ("first_name", "varchar"),
                ("id", "uuid"),
                ("balance", "numeric"),
                ("updated_at", "timestamp"),
            ],
        );
        let fragments = ColumnSet::build(&table).fragments();

        let all: Vec<&String> = [
            &fragments.insert_column_list,
            &fragments.select_column_list,
            &fragments.exec_argument_expressions,
            &fragments.update_set_clause,
            &fragments.update_exec_bindings,
            &fragments.scan_variable_declarations,
            &fragments.scan_target_refs,
            &fragments.response_field_assignments,
        ]
        .into_iter()
        .flatten()
        .collect();
        assert!(all.iter().all(|f| !f.contains("created_at") && !f.contains("createdAt")));

        // updated_at only as the final insert column, with now()
        assert_eq!(
            fragments.insert_column_list.last().map(String::as_str),
            Some("\t\t\tupdated_at")
        );
        assert_eq!(
            fragments.insert_value_placeholders,
            vec!["$1", "$2", "$3", "now()"]
        );
        assert_eq!(
            all.iter().filter(|f| f.contains("updated_at")).count(),
            1
        );

        // identity leads the insert list even when declared later
        assert_eq!(fragments.insert_column_list[0], "\t\t\tid");
        assert!(fragments
            .exec_argument_expressions
            .iter()
            .all(|f| !f.contains("GetId()")));
        assert!(fragments.update_set_clause.iter().all(|f| !f.contains("id =")));

        assert_eq!(
            fragments.response_field_assignments,
            vec![
                "\t\tFirstName: firstName.String,",
                "\t\tBalance: balance.Float64,"
            ]
        );
    }

    #[test]
    fn test_scan_wrappers_follow_mapped_type() {
        let table = table(
            "stock",
            &[("amount", "bigint"), ("price", "double precision"), ("flag", "boolean")],
        );
        let fragments = ColumnSet::build(&table).fragments();
        assert_eq!(
            fragments.scan_variable_declarations,
            vec![
                "\t\tamount sql.NullInt64",
                "\t\tprice sql.NullFloat64",
                "\t\tflag sql.NullString"
            ]
        );
        assert_eq!(fragments.response_field_assignments[0], "\t\tAmount: amount.Int64,");
    }

    #[test]
    fn test_keyword_column_gets_safe_variable() {
        let table = table("machine", &[("type", "varchar")]);
        let fragments = ColumnSet::build(&table).fragments();
        assert_eq!(fragments.scan_target_refs, vec!["\t\t&type_,"]);
        assert_eq!(fragments.response_field_assignments, vec!["\t\tType: type_.String,"]);
        assert_eq!(fragments.update_set_clause, vec!["\t\t\ttype = :type,"]);
    }

    #[test]
    fn test_table_without_conventional_columns() {
        let table = table("tag", &[("label", "text")]);
        let fragments = ColumnSet::build(&table).fragments();
        assert_eq!(fragments.insert_column_list, vec!["\t\t\tlabel"]);
        assert_eq!(fragments.insert_value_placeholders, vec!["$1"]);
    }

    fn column_strategy() -> impl Strategy<Value = Vec<(String, &'static str)>> {
        let name = prop_oneof![
            4 => "[a-z]{1,6}(_[a-z]{1,6}){0,2}",
            1 => Just("id".to_string()),
            1 => Just("created_at".to_string()),
            1 => Just("updated_at".to_string()),
        ];
        let ty = prop_oneof![
            Just("uuid"),
            Just("varchar"),
            Just("bigint"),
            Just("numeric"),
            Just("boolean"),
            Just("jsonb"),
        ];
        prop::collection::vec((name, ty), 0..12).prop_map(|mut cols| {
            let mut seen = std::collections::HashSet::new();
            cols.retain(|(name, _)| seen.insert(name.clone()));
            cols
        })
    }

    proptest! {
        #[test]
        fn body_lists_stay_aligned(columns in column_strategy()) {
            let parsed = ParsedTable {
                name: "t".to_string(),
                columns: columns.iter().map(|(n, ty)| Column::new(n.as_str(), *ty)).collect(),
            };
            let set = ColumnSet::build(&parsed);
            let fragments = set.fragments();
            let regular: Vec<&ColumnFragment> = set.regular().collect();

            let n = regular.len();
            prop_assert_eq!(fragments.exec_argument_expressions.len(), n);
            prop_assert_eq!(fragments.update_set_clause.len(), n);
            prop_assert_eq!(fragments.update_exec_bindings.len(), n);
            prop_assert_eq!(fragments.scan_variable_declarations.len(), n);
            prop_assert_eq!(fragments.scan_target_refs.len(), n);
            prop_assert_eq!(fragments.response_field_assignments.len(), n);

            for (i, col) in regular.iter().enumerate() {
                let getter = format!("Get{}()", col.field_name);
                let set_head = format!("\t\t\t{} =", col.column);
                let binding = format!("\"{}\"", col.column);
                let declaration = format!("\t\t{} ", col.var_name);
                let target = format!("\t\t&{},", col.var_name);
                let response = format!("\t\t{}: {}.", col.field_name, col.var_name);

                prop_assert!(fragments.exec_argument_expressions[i].contains(&getter));
                prop_assert!(fragments.update_set_clause[i].starts_with(&set_head));
                prop_assert!(fragments.update_exec_bindings[i].contains(&binding));
                prop_assert!(fragments.scan_variable_declarations[i].starts_with(&declaration));
                prop_assert_eq!(&fragments.scan_target_refs[i], &target);
                prop_assert!(fragments.response_field_assignments[i].starts_with(&response));
            }

            // one placeholder per bound column, numbered from 1
            let bound = set.bound().count();
            let placeholders: Vec<&String> = fragments
                .insert_value_placeholders
                .iter()
                .filter(|p| p.starts_with('$'))
                .collect();
            prop_assert_eq!(placeholders.len(), bound);
            for (i, p) in placeholders.iter().enumerate() {
                let expected = format!("${}", i + 1);
                prop_assert_eq!(p.as_str(), expected.as_str());
            }
            prop_assert_eq!(fragments.insert_column_list.len(), fragments.insert_value_placeholders.len());
        }
    }
}
