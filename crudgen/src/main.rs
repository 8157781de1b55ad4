//! CLI entry point for crudgen

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crudgen::codegen::{remove_empty_rows, ArtifactKind};
use crudgen::config::CodegenConfig;
use crudgen::parser::{is_blank_statement, parse_table, split_statements, ColumnConstraint};

#[derive(Parser)]
#[command(name = "crudgen")]
#[command(about = "Generate proto messages, HTTP handlers, services and Postgres repositories from table DDL")]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML format); defaults to ./crudgen.toml if present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to SQL schema file (overrides config)
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Root output directory (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory with template overrides (overrides config)
    #[arg(short, long)]
    templates: Option<PathBuf>,

    /// Dry run - show what would be generated without writing files
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate all enabled artifacts
    Generate,
    /// Generate only .proto files
    Proto,
    /// Generate only HTTP handlers
    Handlers,
    /// Generate only service wrappers
    Services,
    /// Generate only repositories
    Repositories,
    /// Inspect schema (show parsed tables for debugging)
    Inspect,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (before logging, so we can use config.log_level)
    let mut config = CodegenConfig::load(cli.config.as_deref())?;

    // Initialize logging
    // Priority: RUST_LOG env var > config.log_level > default (debug for dev, info for release)
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };
    let log_level = config.log_level.as_deref().unwrap_or(default_level);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .init();

    // Apply CLI overrides
    if let Some(schema) = cli.schema {
        config.schema_file = schema;
    }
    if let Some(output) = cli.output {
        config.output_dir = output;
    }
    if let Some(templates) = cli.templates {
        config.template_dir = Some(templates);
    }
    if cli.dry_run {
        config.dry_run = true;
    }

    // Apply command-specific settings
    match &cli.command {
        Some(Commands::Proto) => config.only(ArtifactKind::Proto),
        Some(Commands::Handlers) => config.only(ArtifactKind::Handler),
        Some(Commands::Services) => config.only(ArtifactKind::Service),
        Some(Commands::Repositories) => config.only(ArtifactKind::Repository),
        Some(Commands::Inspect) => {
            return inspect_schema(&config);
        }
        Some(Commands::Generate) | None => {}
    }

    // Validate configuration
    config.validate()?;

    info!("Generating code from schema: {:?}", config.schema_file);
    let report = crudgen::generate(&config)?;

    if config.dry_run {
        println!("Dry run mode - would generate:");
        for file in &report.files {
            println!("  {}", file.display());
        }
        return Ok(());
    }

    info!(
        "Code generation completed successfully: {} tables, {} files",
        report.tables.len(),
        report.files.len()
    );
    Ok(())
}

fn inspect_schema(config: &CodegenConfig) -> Result<()> {
    let schema_sql = std::fs::read_to_string(&config.schema_file)?;

    let mut count = 0;
    for statement in split_statements(&schema_sql)? {
        let ddl = remove_empty_rows(statement);
        if ddl.is_empty() || is_blank_statement(&ddl) {
            continue;
        }
        let table = parse_table(&ddl)?;
        count += 1;

        println!("Table: {}", table.name);
        println!("  Columns:");
        for col in &table.columns {
            let constraints: Vec<String> = col.constraints.iter().map(describe).collect();
            println!(
                "    - {} {} -> {} [{:?}] {}",
                col.name,
                col.sql_type,
                col.mapped_type,
                col.role(),
                constraints.join(" ")
            );
        }
        let missing = table.missing_conventional_columns();
        if !missing.is_empty() {
            println!("  Missing conventional columns: {:?}", missing);
        }
        println!();
    }
    println!("Parsed {} tables", count);

    Ok(())
}

fn describe(constraint: &ColumnConstraint) -> String {
    match constraint {
        ColumnConstraint::NotNull => "NOT NULL".to_string(),
        ColumnConstraint::Null => "NULL".to_string(),
        ColumnConstraint::PrimaryKey => "PRIMARY KEY".to_string(),
        ColumnConstraint::Unique => "UNIQUE".to_string(),
        ColumnConstraint::Default(expr) => format!("DEFAULT {}", expr),
        ColumnConstraint::References { table, column } => match column {
            Some(column) => format!("REFERENCES {}({})", table, column),
            None => format!("REFERENCES {}", table),
        },
    }
}
