//! Configuration settings for crudgen

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::defaults;
use crate::codegen::ArtifactKind;
use crate::error::{CodegenError, Result};

/// Main configuration struct for code generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodegenConfig {
    /// Path to the SQL schema file
    #[serde(default)]
    pub schema_file: PathBuf,

    /// Root output directory; per-kind directories default to sub-directories of it
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Output directory for `.proto` files (defaults to `<output_dir>/protos`)
    #[serde(default)]
    pub proto_dir: Option<PathBuf>,

    /// Output directory for HTTP handlers (defaults to `<output_dir>/handlers`)
    #[serde(default)]
    pub handler_dir: Option<PathBuf>,

    /// Output directory for service wrappers (defaults to `<output_dir>/service`)
    #[serde(default)]
    pub service_dir: Option<PathBuf>,

    /// Output directory for repositories (defaults to `<output_dir>/storage`)
    #[serde(default)]
    pub repository_dir: Option<PathBuf>,

    /// Directory with template overrides; embedded templates are used when unset
    #[serde(default)]
    pub template_dir: Option<PathBuf>,

    /// Tables to include (comma-separated, or "*" for all)
    #[serde(default = "default_include_tables")]
    pub include_tables: String,

    /// Tables to exclude (comma-separated)
    #[serde(default = "default_exclude_tables")]
    pub exclude_tables: String,

    #[serde(default = "default_generate_proto")]
    pub generate_proto: bool,

    #[serde(default = "default_generate_handlers")]
    pub generate_handlers: bool,

    #[serde(default = "default_generate_services")]
    pub generate_services: bool,

    #[serde(default = "default_generate_repositories")]
    pub generate_repositories: bool,

    /// Go module path used by generated imports
    #[serde(default = "default_go_module")]
    pub go_module: String,

    /// Protobuf package of the generated messages
    #[serde(default = "default_proto_package")]
    pub proto_package: String,

    /// Run `gofmt -w` on every generated Go file
    #[serde(default = "default_format_go")]
    pub format_go: bool,

    /// Dry run mode - render everything but write nothing
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    /// Can be overridden by RUST_LOG env var
    #[serde(default)]
    pub log_level: Option<String>,
}

// Default value functions for serde
fn default_output_dir() -> PathBuf {
    PathBuf::from(defaults::OUTPUT_DIR)
}
fn default_include_tables() -> String {
    defaults::INCLUDE_TABLES.to_string()
}
fn default_exclude_tables() -> String {
    defaults::EXCLUDE_TABLES.to_string()
}
fn default_generate_proto() -> bool {
    defaults::GENERATE_PROTO
}
fn default_generate_handlers() -> bool {
    defaults::GENERATE_HANDLERS
}
fn default_generate_services() -> bool {
    defaults::GENERATE_SERVICES
}
fn default_generate_repositories() -> bool {
    defaults::GENERATE_REPOSITORIES
}
fn default_go_module() -> String {
    defaults::GO_MODULE.to_string()
}
fn default_proto_package() -> String {
    defaults::PROTO_PACKAGE.to_string()
}
fn default_format_go() -> bool {
    defaults::FORMAT_GO
}
fn default_dry_run() -> bool {
    defaults::DRY_RUN
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            schema_file: PathBuf::new(),
            output_dir: default_output_dir(),
            proto_dir: None,
            handler_dir: None,
            service_dir: None,
            repository_dir: None,
            template_dir: None,
            include_tables: default_include_tables(),
            exclude_tables: default_exclude_tables(),
            generate_proto: default_generate_proto(),
            generate_handlers: default_generate_handlers(),
            generate_services: default_generate_services(),
            generate_repositories: default_generate_repositories(),
            go_module: default_go_module(),
            proto_package: default_proto_package(),
            format_go: default_format_go(),
            dry_run: default_dry_run(),
            log_level: None,
        }
    }
}

impl CodegenConfig {
    /// Create a default config with the given schema file
    pub fn default_with_schema(schema_file: PathBuf) -> Self {
        Self {
            schema_file,
            ..Default::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CodegenConfig = toml::from_str(&content).map_err(|e| {
            CodegenError::ConfigError(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(config)
    }

    /// Load configuration using config-rs (file + environment variables)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        } else {
            builder = builder.add_source(File::with_name(defaults::CONFIG_FILE).required(false));
        }

        // CRUDGEN_OUTPUT_DIR -> output_dir
        builder = builder.add_source(
            Environment::with_prefix(defaults::ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: CodegenConfig = builder.build()?.try_deserialize()?;

        Ok(config)
    }

    /// Whether the given artifact kind is switched on
    pub fn is_enabled(&self, kind: ArtifactKind) -> bool {
        match kind {
            ArtifactKind::Proto => self.generate_proto,
            ArtifactKind::Handler => self.generate_handlers,
            ArtifactKind::Service => self.generate_services,
            ArtifactKind::Repository => self.generate_repositories,
        }
    }

    /// Enabled artifact kinds, in generation order
    pub fn enabled_kinds(&self) -> Vec<ArtifactKind> {
        ArtifactKind::ALL
            .into_iter()
            .filter(|kind| self.is_enabled(*kind))
            .collect()
    }

    /// Turn off every artifact kind except `kind`
    pub fn only(&mut self, kind: ArtifactKind) {
        for other in ArtifactKind::ALL {
            self.set_enabled(other, other == kind);
        }
    }

    pub fn set_enabled(&mut self, kind: ArtifactKind, enabled: bool) {
        match kind {
            ArtifactKind::Proto => self.generate_proto = enabled,
            ArtifactKind::Handler => self.generate_handlers = enabled,
            ArtifactKind::Service => self.generate_services = enabled,
            ArtifactKind::Repository => self.generate_repositories = enabled,
        }
    }

    /// Output directory for an artifact kind
    pub fn artifact_dir(&self, kind: ArtifactKind) -> PathBuf {
        let explicit = match kind {
            ArtifactKind::Proto => &self.proto_dir,
            ArtifactKind::Handler => &self.handler_dir,
            ArtifactKind::Service => &self.service_dir,
            ArtifactKind::Repository => &self.repository_dir,
        };
        explicit
            .clone()
            .unwrap_or_else(|| self.output_dir.join(kind.default_subdir()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.schema_file.as_os_str().is_empty() {
            return Err(CodegenError::ValidationError(
                "schema_file is required".into(),
            ));
        }

        if !self.schema_file.exists() {
            return Err(CodegenError::ValidationError(format!(
                "Schema file not found: {}",
                self.schema_file.display()
            )));
        }

        if self.enabled_kinds().is_empty() {
            return Err(CodegenError::ValidationError(
                "at least one of generate_proto, generate_handlers, generate_services, generate_repositories must be true".into(),
            ));
        }

        if self.proto_package.trim().is_empty() {
            return Err(CodegenError::ValidationError(
                "proto_package must not be empty".into(),
            ));
        }

        if self.go_module.trim().is_empty() {
            return Err(CodegenError::ValidationError(
                "go_module must not be empty".into(),
            ));
        }

        if let Some(dir) = &self.template_dir {
            if !dir.is_dir() {
                return Err(CodegenError::ValidationError(format!(
                    "Template directory not found: {}",
                    dir.display()
                )));
            }
        }

        Ok(())
    }
}
