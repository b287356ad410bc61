use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::aws::{AuthorizerKind, ContentRoute};
use crate::editor::TextFormat;

/// Project configuration loaded from `.foundry.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FoundryConfig {
    /// API name; used for the stage name and exported host.
    pub name: String,
    /// Spec fragments merged in order.
    pub specs: Vec<String>,
    pub output: String,
    pub format: TextFormat,
    pub region: String,
    pub localstack: bool,
    pub logging: bool,
    /// Keys matching this pattern are stripped after patching.
    pub strip_pattern: Option<String>,
    pub gateway_role_arn: String,
    pub integrations: Vec<IntegrationConfig>,
    pub authorizers: Vec<AuthorizerConfig>,
    pub content: Vec<ContentRoute>,
    /// Already deployed functions, keyed by the name used in declarations.
    pub functions: IndexMap<String, FunctionConfig>,
}

impl Default for FoundryConfig {
    fn default() -> Self {
        Self {
            name: "api".to_string(),
            specs: vec!["openapi.yaml".to_string()],
            output: "build/api.yaml".to_string(),
            format: TextFormat::Yaml,
            region: "us-east-1".to_string(),
            localstack: false,
            logging: false,
            strip_pattern: None,
            gateway_role_arn: String::new(),
            integrations: Vec::new(),
            authorizers: Vec::new(),
            content: Vec::new(),
            functions: IndexMap::new(),
        }
    }
}

/// Wires `path`/`method` to the function registered as `function`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IntegrationConfig {
    pub path: String,
    pub method: String,
    pub function: String,
}

/// A security scheme backed by the function registered as `function`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthorizerConfig {
    pub name: String,
    #[serde(rename = "type", alias = "kind", default = "default_kind")]
    pub kind: AuthorizerKind,
    pub function: String,
}

fn default_kind() -> AuthorizerKind {
    AuthorizerKind::Token
}

/// Resolved identifiers for one deployed function.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FunctionConfig {
    pub invoke_arn: String,
    pub function_name: String,
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".foundry.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<FoundryConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: FoundryConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# foundry configuration
name: api
specs:
  - openapi.yaml
  # - overrides.yaml        # later fragments append lists and win on conflicts
output: build/api.yaml
format: yaml               # yaml | json
region: us-east-1
localstack: false
logging: false
# strip_pattern: "x-internal"

gateway_role_arn: arn:aws:iam::000000000000:role/api-gw-role

integrations: []
  # - path: /greet
  #   method: get
  #   function: greet

authorizers: []
  # - name: auth
  #   type: token
  #   function: authorizer

content: []
  # - path: /index.html
  #   bucket_name: my-site-bucket

functions: {}
  # greet:
  #   invoke_arn: arn:aws:apigateway:us-east-1:lambda:path/2015-03-31/functions/arn:aws:lambda:us-east-1:000000000000:function:greet/invocations
  #   function_name: greet
"#
}
