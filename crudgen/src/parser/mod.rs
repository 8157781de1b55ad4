//! DDL parser module built on the sqlparser tokenizer

mod metadata;
mod schema_parser;

pub use metadata::*;
pub use schema_parser::*;
