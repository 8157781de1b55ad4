//! PostgreSQL to generated-code type mapping

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scalar type a column maps to in the generated Go and proto code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MappedType {
    String,
    Int32,
    Int64,
    Double,
    Bool,
    /// JSON and anything unrecognised
    Any,
}

/// Nullable wrapper from Go's `database/sql` used to scan a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanWrapper {
    NullString,
    NullInt64,
    NullFloat64,
}

impl MappedType {
    /// Map a SQL type name. Total: unknown names map to [`MappedType::Any`].
    ///
    /// Matching ignores case and collapses inner whitespace, so
    /// "DOUBLE   PRECISION" and "double precision" are the same type. A
    /// `with time zone` / `without time zone` qualifier is ignored.
    pub fn from_sql(sql_type: &str) -> Self {
        let normalized = sql_type
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        let base = normalized
            .strip_suffix(" without time zone")
            .or_else(|| normalized.strip_suffix(" with time zone"))
            .unwrap_or(&normalized);

        match base {
            "uuid" | "varchar" | "text" | "char" | "character varying" => MappedType::String,
            "date" | "timestamp" | "time" => MappedType::String,
            "integer" | "int" | "smallint" | "number" => MappedType::Int32,
            "bigint" => MappedType::Int64,
            "float" | "double precision" | "numeric" | "decimal" | "real" => MappedType::Double,
            "boolean" => MappedType::Bool,
            // json, jsonb
            _ => MappedType::Any,
        }
    }

    /// proto3 scalar name
    pub fn proto_type(&self) -> &'static str {
        match self {
            MappedType::String | MappedType::Any => "string",
            MappedType::Int32 => "int32",
            MappedType::Int64 => "int64",
            MappedType::Double => "double",
            MappedType::Bool => "bool",
        }
    }

    pub fn scan_wrapper(&self) -> ScanWrapper {
        match self {
            MappedType::Double => ScanWrapper::NullFloat64,
            MappedType::Int64 => ScanWrapper::NullInt64,
            _ => ScanWrapper::NullString,
        }
    }
}

impl fmt::Display for MappedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MappedType::String => "string",
            MappedType::Int32 => "int32",
            MappedType::Int64 => "int64",
            MappedType::Double => "double",
            MappedType::Bool => "bool",
            MappedType::Any => "interface{}",
        };
        f.write_str(name)
    }
}

impl ScanWrapper {
    /// Go type of the scan variable
    pub fn go_type(&self) -> &'static str {
        match self {
            ScanWrapper::NullString => "sql.NullString",
            ScanWrapper::NullInt64 => "sql.NullInt64",
            ScanWrapper::NullFloat64 => "sql.NullFloat64",
        }
    }

    /// Field holding the scanned value
    pub fn accessor(&self) -> &'static str {
        match self {
            ScanWrapper::NullString => "String",
            ScanWrapper::NullInt64 => "Int64",
            ScanWrapper::NullFloat64 => "Float64",
        }
    }
}
