//! Metadata structures for parsed table DDL

use serde::{Deserialize, Serialize};

use crate::codegen::MappedType;

/// Name of the identity column
pub const IDENTITY_COLUMN: &str = "id";

/// Server-assigned creation timestamp
pub const CREATED_AT_COLUMN: &str = "created_at";

/// Server-maintained last-update timestamp
pub const UPDATED_AT_COLUMN: &str = "updated_at";

/// A table recovered from one `CREATE TABLE IF NOT EXISTS` statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTable {
    /// Table name, without quotes or schema prefix
    pub name: String,

    /// Columns in declaration order
    pub columns: Vec<Column>,
}

/// A single column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,

    /// Type as written, length/precision suffix removed (e.g. "varchar", "double precision")
    pub sql_type: String,

    /// Scalar type the column maps to
    pub mapped_type: MappedType,

    /// Constraints that followed the type. Kept for `inspect`, ignored by generation.
    pub constraints: Vec<ColumnConstraint>,
}

/// Column-level constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnConstraint {
    NotNull,
    Null,
    PrimaryKey,
    Unique,
    /// Default expression, as written
    Default(String),
    References {
        table: String,
        column: Option<String>,
    },
}

/// How a column takes part in generated statements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnRole {
    /// The `id` column: bound on insert from a generated key, used as the lookup key
    Identity,
    /// `created_at`: server-assigned, never written by generated code
    CreatedAt,
    /// `updated_at`: set to `now()` on insert and update
    UpdatedAt,
    /// Everything else
    Regular,
}

impl Column {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        let sql_type = sql_type.into();
        Self {
            name: name.into(),
            mapped_type: MappedType::from_sql(&sql_type),
            sql_type,
            constraints: Vec::new(),
        }
    }

    pub fn with_constraints(mut self, constraints: Vec<ColumnConstraint>) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn role(&self) -> ColumnRole {
        match self.name.as_str() {
            IDENTITY_COLUMN => ColumnRole::Identity,
            CREATED_AT_COLUMN => ColumnRole::CreatedAt,
            UPDATED_AT_COLUMN => ColumnRole::UpdatedAt,
            _ => ColumnRole::Regular,
        }
    }

    pub fn is_not_null(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c, ColumnConstraint::NotNull | ColumnConstraint::PrimaryKey))
    }

    pub fn is_primary_key(&self) -> bool {
        self.constraints.contains(&ColumnConstraint::PrimaryKey)
    }

    pub fn default_value(&self) -> Option<&str> {
        self.constraints.iter().find_map(|c| match c {
            ColumnConstraint::Default(expr) => Some(expr.as_str()),
            _ => None,
        })
    }
}

impl ParsedTable {
    /// Get a column by name
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Conventional columns the default templates rely on but the table does not declare
    pub fn missing_conventional_columns(&self) -> Vec<&'static str> {
        [IDENTITY_COLUMN, CREATED_AT_COLUMN, UPDATED_AT_COLUMN]
            .into_iter()
            .filter(|name| self.get_column(name).is_none())
            .collect()
    }
}
