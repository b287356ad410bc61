//! API Gateway specific patching: Lambda proxy integrations, token
//! authorizers, S3 content routes and function-name discovery.

pub mod authorizer;
pub mod content;
pub mod function_names;
pub mod integration;

use std::fmt;

use serde::Deserialize;

pub const FUNCTION_NAME_EXT: &str = "x-function-name";
pub const INTEGRATION_EXT: &str = "x-amazon-apigateway-integration";
pub const AUTHORIZER_EXT: &str = "x-amazon-apigateway-authorizer";
pub const AUTHTYPE_EXT: &str = "x-amazon-apigateway-authtype";

/// A (path, method) coordinate in the spec.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OperationTarget {
    pub path: String,
    pub method: String,
}

impl OperationTarget {
    pub fn new(path: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: method.into().to_lowercase(),
        }
    }
}

impl fmt::Display for OperationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method.to_uppercase(), self.path)
    }
}

/// Kind of Lambda authorizer behind a security scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizerKind {
    Token,
    Request,
}

impl AuthorizerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorizerKind::Token => "token",
            AuthorizerKind::Request => "request",
        }
    }
}

/// A named entry under `components.securitySchemes`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthorizerTarget {
    pub name: String,
    #[serde(rename = "type", alias = "kind", default = "default_authorizer_kind")]
    pub kind: AuthorizerKind,
}

impl AuthorizerTarget {
    pub fn token(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AuthorizerKind::Token,
        }
    }
}

fn default_authorizer_kind() -> AuthorizerKind {
    AuthorizerKind::Token
}

/// A route served straight out of an S3 bucket through the gateway role.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentRoute {
    pub path: String,
    #[serde(default = "default_content_method")]
    pub method: String,
    pub bucket_name: String,
    /// Object key inside the bucket; defaults to the route path.
    #[serde(default)]
    pub object_key: Option<String>,
    #[serde(default = "default_region")]
    pub region: String,
}

impl ContentRoute {
    pub fn new(path: impl Into<String>, bucket_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: default_content_method(),
            bucket_name: bucket_name.into(),
            object_key: None,
            region: default_region(),
        }
    }
}

fn default_content_method() -> String {
    "get".to_string()
}

pub(crate) fn default_region() -> String {
    "us-east-1".to_string()
}
