//! crudgen: Generate proto messages, HTTP handlers, gRPC services and Postgres
//! repositories from `CREATE TABLE IF NOT EXISTS` DDL
//!
//! This crate provides both a CLI tool and a library. It reads a schema file of
//! `;`-separated table definitions and, for every table, renders four artifacts
//! from templates:
//!
//! - `<table>.proto`: entity message, create/update requests and the service
//! - `handlers/<table>.go`: gin handlers delegating to the service layer
//! - `service/<table>.go`: gRPC service forwarding to the repository
//! - `storage/<table>.go`: pgx repository with create/get/list/update/delete
//!
//! Each artifact kind also gets one combined file (`<proto_package>.proto`,
//! `api.go`, `services.go`, `storage.go`) collecting a snippet per table.
//!
//! # Library Usage
//!
//! ```rust,ignore
//! crudgen::CodegenBuilder::new("schema.sql")
//!     .output_dir("./generates")
//!     .proto_package("storehouse_service")
//!     .generate()
//!     .expect("Failed to generate code");
//! ```
//!
//! # Template overrides
//!
//! The default templates are compiled in. Point `template_dir` at a directory
//! holding any of `proto.tmpl`, `handler.tmpl`, `service.tmpl`,
//! `repository.tmpl` (and their `*_aggregate.tmpl` snippets) to replace them.
//! Slots are written `{{ entity }}`, `{{ table }}`, `{{ route }}` and so on.
//!
//! # CLI Usage
//!
//! ```bash
//! crudgen --schema schema.sql --output ./generates generate
//! ```

pub mod codegen;
pub mod config;
pub mod error;
pub mod parser;

use std::path::Path;

use tracing::info;

pub use codegen::{ArtifactKind, CodeGenerator, GenerationReport};
pub use config::CodegenConfig;
pub use error::{CodegenError, Result};

/// Main entry point for code generation
pub fn generate(config: &CodegenConfig) -> Result<GenerationReport> {
    info!("Parsing schema: {:?}", config.schema_file);
    let schema_sql = std::fs::read_to_string(&config.schema_file)?;
    let report = CodeGenerator::new(config).run(&schema_sql)?;
    info!("Code generation complete");
    Ok(report)
}

/// Builder for programmatic configuration
pub struct CodegenBuilder {
    config: CodegenConfig,
}

impl CodegenBuilder {
    /// Create a new builder with the given schema file
    pub fn new(schema_file: impl AsRef<Path>) -> Self {
        Self {
            config: CodegenConfig::default_with_schema(schema_file.as_ref().to_path_buf()),
        }
    }

    /// Set the root output directory; each artifact kind goes in a sub-directory
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.output_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the output directory for one artifact kind
    pub fn artifact_dir(mut self, kind: ArtifactKind, dir: impl AsRef<Path>) -> Self {
        let dir = Some(dir.as_ref().to_path_buf());
        match kind {
            ArtifactKind::Proto => self.config.proto_dir = dir,
            ArtifactKind::Handler => self.config.handler_dir = dir,
            ArtifactKind::Service => self.config.service_dir = dir,
            ArtifactKind::Repository => self.config.repository_dir = dir,
        }
        self
    }

    /// Read templates from a directory instead of the built-in ones
    pub fn template_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.template_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Set tables to include
    pub fn include_tables(mut self, tables: &[&str]) -> Self {
        self.config.include_tables = tables.join(",");
        self
    }

    /// Set tables to exclude
    pub fn exclude_tables(mut self, tables: &[&str]) -> Self {
        self.config.exclude_tables = tables.join(",");
        self
    }

    /// Generate only one artifact kind
    pub fn only(mut self, kind: ArtifactKind) -> Self {
        self.config.only(kind);
        self
    }

    /// Skip one artifact kind
    pub fn skip(mut self, kind: ArtifactKind) -> Self {
        self.config.set_enabled(kind, false);
        self
    }

    /// Go module path used in generated imports
    pub fn go_module(mut self, module: &str) -> Self {
        self.config.go_module = module.to_string();
        self
    }

    /// Protobuf package of the generated messages
    pub fn proto_package(mut self, package: &str) -> Self {
        self.config.proto_package = package.to_string();
        self
    }

    /// Run gofmt on generated Go files
    pub fn format_go(mut self) -> Self {
        self.config.format_go = true;
        self
    }

    /// Enable dry run mode (render everything, write nothing)
    pub fn dry_run(mut self) -> Self {
        self.config.dry_run = true;
        self
    }

    pub fn config(&self) -> &CodegenConfig {
        &self.config
    }

    /// Validate the configuration and generate the code
    pub fn generate(self) -> Result<GenerationReport> {
        self.config.validate()?;
        generate(&self.config)
    }
}
