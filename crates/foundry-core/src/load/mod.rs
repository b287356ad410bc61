pub mod merge;

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml_ng::{Mapping, Value};

use crate::error::SpecError;

pub use merge::deep_merge;

/// One spec fragment, before it is parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecSource {
    /// An already structured document.
    Document(Value),
    /// Inline YAML (or JSON) text.
    Text(String),
    /// A `.yaml`, `.yml` or `.json` file on disk.
    File(PathBuf),
}

impl SpecSource {
    /// Treat `s` as a file if it names an existing file or looks like a spec
    /// file path, otherwise as inline text. A missing `.yaml` path then fails
    /// to read instead of parsing as a bare YAML string.
    pub fn detect(s: &str) -> Self {
        let path = Path::new(s);
        if !s.contains('\n') && (path.is_file() || looks_like_spec_path(s)) {
            SpecSource::File(path.to_path_buf())
        } else {
            SpecSource::Text(s.to_string())
        }
    }

    /// Parse the source into a mapping-rooted tree.
    pub fn load(&self) -> Result<Mapping, SpecError> {
        let value = match self {
            SpecSource::Document(value) => value.clone(),
            SpecSource::Text(text) => from_yaml(text)?,
            SpecSource::File(path) => from_file(path)?,
        };
        into_root_mapping(value, self)
    }

    fn describe(&self) -> String {
        match self {
            SpecSource::Document(_) => "document".to_string(),
            SpecSource::Text(text) => {
                let first = text.lines().next().unwrap_or_default();
                format!("text starting with '{}'", first)
            }
            SpecSource::File(path) => format!("file {}", path.display()),
        }
    }
}

impl From<&str> for SpecSource {
    fn from(s: &str) -> Self {
        SpecSource::detect(s)
    }
}

impl From<String> for SpecSource {
    fn from(s: String) -> Self {
        SpecSource::detect(&s)
    }
}

impl From<PathBuf> for SpecSource {
    fn from(path: PathBuf) -> Self {
        SpecSource::File(path)
    }
}

impl From<Value> for SpecSource {
    fn from(value: Value) -> Self {
        SpecSource::Document(value)
    }
}

/// What the editor accepts: a single fragment or an ordered list of fragments
/// merged left to right.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecInput {
    Single(SpecSource),
    Many(Vec<SpecSource>),
}

impl SpecInput {
    pub fn sources(&self) -> &[SpecSource] {
        match self {
            SpecInput::Single(source) => std::slice::from_ref(source),
            SpecInput::Many(sources) => sources,
        }
    }

    /// Load every fragment in order and merge them into one tree.
    pub fn load_merged(&self) -> Result<Mapping, SpecError> {
        let mut merged = Mapping::new();
        for source in self.sources() {
            deep_merge(&mut merged, source.load()?);
        }
        Ok(merged)
    }
}

impl From<SpecSource> for SpecInput {
    fn from(source: SpecSource) -> Self {
        SpecInput::Single(source)
    }
}

impl From<&str> for SpecInput {
    fn from(s: &str) -> Self {
        SpecInput::Single(SpecSource::detect(s))
    }
}

impl From<String> for SpecInput {
    fn from(s: String) -> Self {
        SpecInput::Single(SpecSource::detect(&s))
    }
}

impl From<PathBuf> for SpecInput {
    fn from(path: PathBuf) -> Self {
        SpecInput::Single(SpecSource::File(path))
    }
}

impl From<Value> for SpecInput {
    fn from(value: Value) -> Self {
        SpecInput::Single(SpecSource::Document(value))
    }
}

impl From<Vec<SpecSource>> for SpecInput {
    fn from(sources: Vec<SpecSource>) -> Self {
        SpecInput::Many(sources)
    }
}

impl From<Vec<&str>> for SpecInput {
    fn from(items: Vec<&str>) -> Self {
        SpecInput::Many(items.into_iter().map(SpecSource::detect).collect())
    }
}

impl From<Vec<String>> for SpecInput {
    fn from(items: Vec<String>) -> Self {
        SpecInput::Many(items.iter().map(|s| SpecSource::detect(s)).collect())
    }
}

/// Parse an OpenAPI fragment from YAML.
pub fn from_yaml(input: &str) -> Result<Value, SpecError> {
    Ok(serde_yaml_ng::from_str(input)?)
}

/// Parse an OpenAPI fragment from JSON.
pub fn from_json(input: &str) -> Result<Value, SpecError> {
    Ok(serde_json::from_str(input)?)
}

/// Read a fragment from disk, choosing the parser by file extension.
pub fn from_file(path: &Path) -> Result<Value, SpecError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let parse: fn(&str) -> Result<Value, SpecError> = match ext {
        "yaml" | "yml" => from_yaml,
        "json" => from_json,
        _ => return Err(SpecError::UnsupportedFormat(path.to_path_buf())),
    };
    let content = fs::read_to_string(path).map_err(|source| SpecError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&content)
}

fn looks_like_spec_path(s: &str) -> bool {
    let s = s.trim();
    let inline = s.starts_with('{') || s.contains(": ");
    let ext = Path::new(s).extension().and_then(|e| e.to_str());
    !inline && matches!(ext, Some("yaml" | "yml" | "json"))
}

fn into_root_mapping(value: Value, source: &SpecSource) -> Result<Mapping, SpecError> {
    match value {
        Value::Mapping(mapping) => Ok(mapping),
        other => Err(SpecError::InvalidSpecInput(format!(
            "{} must contain a mapping at the root, found {}",
            source.describe(),
            kind_name(&other)
        ))),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "an empty document",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
