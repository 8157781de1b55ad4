//! Template loading and named-slot rendering

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::PathBuf;

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use tracing::debug;

use crate::error::{CodegenError, Result};

/// Templates compiled into the binary, by file name
const EMBEDDED: &[(&str, &str)] = &[
    ("proto.tmpl", include_str!("../../templates/proto.tmpl")),
    (
        "proto_aggregate.tmpl",
        include_str!("../../templates/proto_aggregate.tmpl"),
    ),
    ("handler.tmpl", include_str!("../../templates/handler.tmpl")),
    (
        "handler_aggregate.tmpl",
        include_str!("../../templates/handler_aggregate.tmpl"),
    ),
    ("service.tmpl", include_str!("../../templates/service.tmpl")),
    (
        "service_aggregate.tmpl",
        include_str!("../../templates/service_aggregate.tmpl"),
    ),
    (
        "repository.tmpl",
        include_str!("../../templates/repository.tmpl"),
    ),
    (
        "repository_aggregate.tmpl",
        include_str!("../../templates/repository_aggregate.tmpl"),
    ),
];

/// Where template text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Defaults shipped with the crate
    Embedded,
    /// Override directory, read on every render
    Directory(PathBuf),
}

/// Named replacement values for one render
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct Slots(BTreeMap<String, String>);

impl Slots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Renders `{{ slot }}` templates
///
/// Every slot is resolved in a single pass: text substituted for one slot is
/// never scanned for further slots. A slot the template names but the caller
/// did not supply is an error.
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    source: TemplateSource,
}

impl TemplateEngine {
    pub fn new(source: TemplateSource) -> Self {
        Self { source }
    }

    pub fn embedded() -> Self {
        Self::new(TemplateSource::Embedded)
    }

    /// Raw text of a template
    pub fn load(&self, name: &str) -> Result<Cow<'static, str>> {
        match &self.source {
            TemplateSource::Embedded => EMBEDDED
                .iter()
                .find(|(file, _)| *file == name)
                .map(|(_, text)| Cow::Borrowed(*text))
                .ok_or_else(|| CodegenError::Asset {
                    path: PathBuf::from(name),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "no embedded template with this name",
                    ),
                }),
            TemplateSource::Directory(dir) => {
                let path = dir.join(name);
                debug!("Reading template {}", path.display());
                std::fs::read_to_string(&path)
                    .map(Cow::Owned)
                    .map_err(|source| CodegenError::Asset { path, source })
            }
        }
    }

    pub fn render(&self, name: &str, slots: &Slots) -> Result<String> {
        let text = self.load(name)?;
        render_str(name, &text, slots)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::embedded()
    }
}

/// Render template text against `slots`
pub fn render_str(name: &str, text: &str, slots: &Slots) -> Result<String> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_keep_trailing_newline(true);
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.add_template(name, text)?;
    let template = env.get_template(name)?;
    Ok(template.render(slots)?)
}

impl From<minijinja::Error> for CodegenError {
    fn from(err: minijinja::Error) -> Self {
        CodegenError::Template {
            name: err.name().unwrap_or("<unnamed>").to_string(),
            message: err.to_string(),
        }
    }
}
