//! Code generation module

mod code_generator;
mod column_set;
mod handler_generator;
mod naming;
mod proto_generator;
mod repository_generator;
mod service_generator;
mod template;
mod type_mapper;

pub use code_generator::*;
pub use column_set::*;
pub use naming::*;
pub use proto_generator::build_message;
pub use template::*;
pub use type_mapper::*;

use std::path::Path;

/// Best-effort gofmt on a generated file.
pub(crate) fn format_file(path: &Path) {
    let _ = std::process::Command::new("gofmt").arg("-w").arg(path).status();
}
