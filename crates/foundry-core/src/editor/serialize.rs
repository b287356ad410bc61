use serde::Deserialize;

use super::SpecEditor;
use crate::error::SpecError;

/// Output serialization for the finished document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    #[default]
    Yaml,
    Json,
}

impl SpecEditor {
    /// Render the document as YAML.
    pub fn to_yaml(&self) -> Result<String, SpecError> {
        serde_yaml_ng::to_string(self.document()).map_err(SpecError::RenderYaml)
    }

    /// Render the document as pretty-printed JSON. Fails if the tree holds
    /// keys JSON cannot represent.
    pub fn to_json(&self) -> Result<String, SpecError> {
        serde_json::to_string_pretty(self.document()).map_err(SpecError::RenderJson)
    }

    pub fn to_text(&self, format: TextFormat) -> Result<String, SpecError> {
        match format {
            TextFormat::Yaml => self.to_yaml(),
            TextFormat::Json => self.to_json(),
        }
    }
}
