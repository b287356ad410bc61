//! IAM documents and Lambda permissions the gateway needs.

use serde::Serialize;
use serde_json::{Value, json};

const POLICY_VERSION: &str = "2012-10-17";
const GATEWAY_PRINCIPAL: &str = "apigateway.amazonaws.com";

/// Permission for API Gateway to invoke one Lambda function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LambdaPermission {
    pub resource_name: String,
    pub action: String,
    pub function_name: String,
    pub principal: String,
    pub source_arn: String,
}

/// One permission per distinct function name, in first-seen order, scoped to
/// every stage and method of the API.
pub fn lambda_permissions(function_names: &[String], execution_arn: &str) -> Vec<LambdaPermission> {
    let mut seen: Vec<&str> = Vec::new();
    let mut permissions = Vec::new();
    for name in function_names {
        if seen.contains(&name.as_str()) {
            continue;
        }
        seen.push(name);
        permissions.push(LambdaPermission {
            resource_name: format!("{name}-lambda-permission"),
            action: "lambda:InvokeFunction".to_string(),
            function_name: name.clone(),
            principal: GATEWAY_PRINCIPAL.to_string(),
            source_arn: format!("{execution_arn}/*/*"),
        });
    }
    permissions
}

/// Trust policy letting API Gateway assume the gateway role.
pub fn gateway_assume_role_policy() -> Value {
    json!({
        "Version": POLICY_VERSION,
        "Statement": [
            {
                "Effect": "Allow",
                "Principal": { "Service": GATEWAY_PRINCIPAL },
                "Action": "sts:AssumeRole",
            }
        ],
    })
}

/// Read access to each bucket and the objects inside it.
pub fn s3_read_policy(bucket_names: &[String]) -> Value {
    let resources: Vec<String> = bucket_names
        .iter()
        .flat_map(|bucket| [format!("arn:aws:s3:::{bucket}"), format!("arn:aws:s3:::{bucket}/*")])
        .collect();
    json!({
        "Version": POLICY_VERSION,
        "Statement": [
            {
                "Effect": "Allow",
                "Action": ["s3:GetObject", "s3:ListBucket"],
                "Resource": resources,
            }
        ],
    })
}
