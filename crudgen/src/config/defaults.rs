//! Default configuration values - single source of truth

/// Default include tables pattern (all tables)
pub const INCLUDE_TABLES: &str = "*";

/// Default exclude tables pattern (none)
pub const EXCLUDE_TABLES: &str = "";

/// Root directory for everything crudgen writes
pub const OUTPUT_DIR: &str = "./generates";

/// Sub-directories under the output root, one per artifact kind
pub const PROTO_SUBDIR: &str = "protos";
pub const HANDLER_SUBDIR: &str = "handlers";
pub const SERVICE_SUBDIR: &str = "service";
pub const REPOSITORY_SUBDIR: &str = "storage";

/// Whether each artifact kind is generated by default
pub const GENERATE_PROTO: bool = true;
pub const GENERATE_HANDLERS: bool = true;
pub const GENERATE_SERVICES: bool = true;
pub const GENERATE_REPOSITORIES: bool = true;

/// Go module path used in generated import statements
pub const GO_MODULE: &str = "warehouse/warehouse_go_storehouse_service";

/// Protobuf package shared by every generated message
pub const PROTO_PACKAGE: &str = "storehouse_service";

/// Run gofmt on generated Go files
pub const FORMAT_GO: bool = false;

/// Whether to run in dry-run mode by default
pub const DRY_RUN: bool = false;

/// Config file looked up by `CodegenConfig::load` when none is given
pub const CONFIG_FILE: &str = "crudgen";

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "CRUDGEN";
