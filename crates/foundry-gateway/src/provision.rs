use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::ProvisionError;

/// What the provisioning engine needs to create the REST API resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestApiRequest {
    pub name: String,
    /// The final OpenAPI document, as YAML.
    pub body: String,
    pub stage: StageSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageSettings {
    pub name: String,
    /// Access log line format; `None` disables access logging.
    pub access_log_format: Option<Value>,
}

/// Identifiers reported back once the REST API exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedApi {
    pub id: String,
    pub execution_arn: String,
}

/// The external engine that turns a rendered spec into a live gateway.
#[async_trait]
pub trait Provisioner: Send + Sync {
    async fn create_rest_api(&self, request: RestApiRequest) -> Result<ProvisionedApi, ProvisionError>;
}

/// Where the API ends up being reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEndpoint {
    Aws { region: String },
    Localstack,
}

impl GatewayEndpoint {
    pub fn host(&self) -> String {
        match self {
            GatewayEndpoint::Aws { region } => format!("execute-api.{region}.amazonaws.com"),
            GatewayEndpoint::Localstack => "execute-api.localhost.localstack.cloud:4566".to_string(),
        }
    }
}

/// `<api id>.<endpoint host>/<stage>`
pub fn api_host(api_id: &str, stage: &str, endpoint: &GatewayEndpoint) -> String {
    format!("{api_id}.{}/{stage}", endpoint.host())
}

/// Stage access log format with the usual request context fields.
pub fn access_log_format() -> Value {
    json!({
        "requestId": "$context.requestId",
        "ip": "$context.identity.sourceIp",
        "caller": "$context.identity.caller",
        "user": "$context.identity.user",
        "requestTime": "$context.requestTime",
        "httpMethod": "$context.httpMethod",
        "resourcePath": "$context.resourcePath",
        "status": "$context.status",
        "protocol": "$context.protocol",
        "responseLength": "$context.responseLength",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_host() {
        let aws = GatewayEndpoint::Aws {
            region: "us-east-1".to_string(),
        };
        assert_eq!(
            api_host("abc123", "greet", &aws),
            "abc123.execute-api.us-east-1.amazonaws.com/greet"
        );
        assert_eq!(
            api_host("abc123", "greet", &GatewayEndpoint::Localstack),
            "abc123.execute-api.localhost.localstack.cloud:4566/greet"
        );
    }
}
