//! Main code generator orchestrator

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::config::{defaults, CodegenConfig};
use crate::error::{CodegenError, Result};
use crate::parser::{is_blank_statement, parse_table, split_statements, ParsedTable};

use super::handler_generator::handler_slots;
use super::naming::{
    pluralize, remove_empty_rows, to_entity_name, to_go_var_name, to_id_param, to_route_segment,
};
use super::proto_generator::proto_slots;
use super::repository_generator::repository_slots;
use super::service_generator::service_slots;
use super::template::{Slots, TemplateEngine, TemplateSource};

/// The four files generated per table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Proto,
    Handler,
    Service,
    Repository,
}

impl ArtifactKind {
    /// Generation order
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::Proto,
        ArtifactKind::Handler,
        ArtifactKind::Service,
        ArtifactKind::Repository,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ArtifactKind::Proto => "proto",
            ArtifactKind::Handler => "handler",
            ArtifactKind::Service => "service",
            ArtifactKind::Repository => "repository",
        }
    }

    /// Directory under `output_dir` used when no explicit directory is configured
    pub fn default_subdir(&self) -> &'static str {
        match self {
            ArtifactKind::Proto => defaults::PROTO_SUBDIR,
            ArtifactKind::Handler => defaults::HANDLER_SUBDIR,
            ArtifactKind::Service => defaults::SERVICE_SUBDIR,
            ArtifactKind::Repository => defaults::REPOSITORY_SUBDIR,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::Proto => "proto",
            _ => "go",
        }
    }

    pub fn template_name(&self) -> String {
        format!("{}.tmpl", self.name())
    }

    pub fn aggregate_template_name(&self) -> String {
        format!("{}_aggregate.tmpl", self.name())
    }

    /// Name of the combined file collecting every table's snippet
    pub fn aggregate_file_name(&self, config: &CodegenConfig) -> String {
        match self {
            ArtifactKind::Proto => format!("{}.proto", config.proto_package),
            ArtifactKind::Handler => "api.go".to_string(),
            ArtifactKind::Service => "services.go".to_string(),
            ArtifactKind::Repository => "storage.go".to_string(),
        }
    }

    /// Slot values for both templates of this kind
    pub fn slots(&self, table: &ParsedTable, config: &CodegenConfig) -> Slots {
        match self {
            ArtifactKind::Proto => proto_slots(table, config),
            ArtifactKind::Handler => handler_slots(table, config),
            ArtifactKind::Service => service_slots(table, config),
            ArtifactKind::Repository => repository_slots(table, config),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Slots shared by every template
pub fn table_slots(table: &ParsedTable, config: &CodegenConfig) -> Slots {
    let entity = to_entity_name(&table.name);
    let mut slots = Slots::new();
    slots
        .insert("entity_plural", pluralize(&entity))
        .insert("entity", entity)
        .insert("entity_camel", to_go_var_name(&table.name))
        .insert("table", table.name.as_str())
        .insert("table_plural", pluralize(&table.name))
        .insert("route", to_route_segment(&table.name))
        .insert("id_param", to_id_param(&table.name))
        .insert("go_module", config.go_module.as_str())
        .insert("proto_package", config.proto_package.as_str());
    slots
}

/// Snippets of one artifact kind, one per processed table, in input order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateBuffer {
    kind: ArtifactKind,
    snippets: Vec<String>,
}

impl AggregateBuffer {
    pub fn new(kind: ArtifactKind) -> Self {
        Self {
            kind,
            snippets: Vec::new(),
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn push(&mut self, snippet: String) {
        self.snippets.push(snippet);
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    /// Combined file contents: every snippet followed by a newline
    pub fn contents(&self) -> String {
        self.snippets.iter().fold(String::new(), |mut out, snippet| {
            out.push_str(snippet);
            out.push('\n');
            out
        })
    }
}

/// Outcome of a generation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Tables processed, in input order
    pub tables: Vec<String>,
    /// Files written (or that would have been written in dry-run mode)
    pub files: Vec<PathBuf>,
}

/// Include/exclude lists from the configuration
#[derive(Debug, Clone, Default)]
pub struct TableFilter {
    include: Option<HashSet<String>>,
    exclude: HashSet<String>,
}

impl TableFilter {
    /// `include` is comma-separated or "*"; `exclude` is comma-separated
    pub fn new(include: &str, exclude: &str) -> Self {
        let include_all = include.trim() == "*" || include.trim().is_empty();
        let include = (!include_all).then(|| split_list(include));
        Self {
            include,
            exclude: split_list(exclude),
        }
    }

    pub fn matches(&self, table: &str) -> bool {
        let included = self
            .include
            .as_ref()
            .map_or(true, |set| set.contains(table));
        included && !self.exclude.contains(table)
    }
}

fn split_list(list: &str) -> HashSet<String> {
    list.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Main code generator: parse, render and write every table of a schema
pub struct CodeGenerator<'a> {
    config: &'a CodegenConfig,
    engine: TemplateEngine,
    filter: TableFilter,
}

impl<'a> CodeGenerator<'a> {
    /// Create a new code generator with the given configuration
    pub fn new(config: &'a CodegenConfig) -> Self {
        let source = match &config.template_dir {
            Some(dir) => TemplateSource::Directory(dir.clone()),
            None => TemplateSource::Embedded,
        };
        Self::with_engine(config, TemplateEngine::new(source))
    }

    pub fn with_engine(config: &'a CodegenConfig, engine: TemplateEngine) -> Self {
        Self {
            config,
            engine,
            filter: TableFilter::new(&config.include_tables, &config.exclude_tables),
        }
    }

    /// Generate every enabled artifact for every table in `sql`
    ///
    /// The first failure stops the run. Files written before it stay on disk.
    pub fn run(&self, sql: &str) -> Result<GenerationReport> {
        let kinds = self.config.enabled_kinds();
        info!("Generating {:?}", kinds);

        let mut aggregates: Vec<AggregateBuffer> =
            kinds.iter().map(|kind| AggregateBuffer::new(*kind)).collect();
        let mut report = GenerationReport::default();

        let statements = split_statements(sql).map_err(|e| {
            error!("Failed to split schema into statements: {}", e);
            CodegenError::from(e)
        })?;

        for (index, statement) in statements.into_iter().enumerate() {
            let ddl = remove_empty_rows(statement);
            if ddl.is_empty() || is_blank_statement(&ddl) {
                continue;
            }

            let table = parse_table(&ddl).map_err(|e| {
                error!("Statement {}: failed to parse: {}", index + 1, e);
                CodegenError::from(e)
            })?;

            if !self.filter.matches(&table.name) {
                debug!("Skipping table {} (filtered)", table.name);
                continue;
            }

            debug!(
                "Statement {}: table {} with {} columns",
                index + 1,
                table.name,
                table.columns.len()
            );
            self.check_collisions(&table).map_err(|e| {
                error!("Statement {}: {}", index + 1, e);
                e
            })?;
            for buffer in aggregates.iter_mut() {
                let kind = buffer.kind();
                self.generate_table(&table, buffer, &mut report)
                    .map_err(|e| {
                        error!(
                            "Statement {}: failed to generate {} for table {}: {}",
                            index + 1,
                            kind,
                            table.name,
                            e
                        );
                        e
                    })?;
            }
            report.tables.push(table.name);
        }

        for buffer in &aggregates {
            let path = self.aggregate_path(buffer.kind());
            self.write(&path, &buffer.contents()).map_err(|e| {
                error!("Failed to write combined {} file: {}", buffer.kind(), e);
                e
            })?;
            report.files.push(path);
        }

        info!(
            "Generated {} tables, {} files",
            report.tables.len(),
            report.files.len()
        );
        Ok(report)
    }

    /// Render and write one artifact, then queue its aggregate snippet
    fn generate_table(
        &self,
        table: &ParsedTable,
        buffer: &mut AggregateBuffer,
        report: &mut GenerationReport,
    ) -> Result<()> {
        let kind = buffer.kind();
        let slots = kind.slots(table, self.config);

        let code = self.engine.render(&kind.template_name(), &slots)?;
        let path = self.artifact_path(kind, &table.name);
        self.write(&path, &code)?;
        report.files.push(path);

        let snippet = self.engine.render(&kind.aggregate_template_name(), &slots)?;
        buffer.push(snippet);
        Ok(())
    }

    /// Per-table output file of one kind
    pub fn artifact_path(&self, kind: ArtifactKind, table: &str) -> PathBuf {
        self.config
            .artifact_dir(kind)
            .join(format!("{}.{}", table, kind.extension()))
    }

    /// Combined output file of one kind
    pub fn aggregate_path(&self, kind: ArtifactKind) -> PathBuf {
        self.config
            .artifact_dir(kind)
            .join(kind.aggregate_file_name(self.config))
    }

    /// A table whose file would be replaced by a combined file is rejected
    /// before any of its artifacts are written.
    fn check_collisions(&self, table: &ParsedTable) -> Result<()> {
        for kind in self.config.enabled_kinds() {
            let path = self.artifact_path(kind, &table.name);
            if path == self.aggregate_path(kind) {
                return Err(CodegenError::ValidationError(format!(
                    "table {} would overwrite the combined {} file {}",
                    table.name,
                    kind,
                    path.display()
                )));
            }
        }
        Ok(())
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        if self.config.dry_run {
            info!("Dry run - would write {}", path.display());
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| CodegenError::write(parent, e))?;
        }
        fs::write(path, contents).map_err(|e| CodegenError::write(path, e))?;
        debug!("Wrote {}", path.display());

        if self.config.format_go && path.extension().is_some_and(|ext| ext == "go") {
            super::format_file(path);
        }
        Ok(())
    }
}
