use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("invalid spec input: {0}")]
    InvalidSpecInput(String),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to render YAML: {0}")]
    RenderYaml(#[source] serde_yaml_ng::Error),

    #[error("failed to render JSON: {0}")]
    RenderJson(#[source] serde_json::Error),

    #[error("unsupported file format: {} (use .json, .yaml, or .yml)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("part '{0}' does not exist in the spec")]
    SpecPathNotFound(String),

    #[error("path '{0}' not found in OpenAPI spec")]
    PathNotFound(String),

    #[error("method '{method}' not found for path '{path}' in OpenAPI spec")]
    MethodNotFound { path: String, method: String },

    #[error("part '{0}' is not a mapping")]
    NotAMapping(String),
}

impl AccessError {
    /// True for both causes of a failed operation lookup.
    pub fn is_operation_not_found(&self) -> bool {
        matches!(
            self,
            AccessError::PathNotFound(_) | AccessError::MethodNotFound { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum PatchError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("unsupported authorizer kind '{kind}' for security scheme '{name}'")]
    UnsupportedAuthorizerKind { name: String, kind: String },

    #[error("{what}: expected {expected} resolved values, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid attribute pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}
