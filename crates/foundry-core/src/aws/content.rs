use serde_yaml_ng::{Mapping, Value};

use super::{ContentRoute, INTEGRATION_EXT};
use crate::editor::SpecEditor;
use crate::error::PatchError;

const PROXY_SEGMENT: &str = "{proxy+}";

/// The S3 service integration for a content route, signed with `credentials_arn`.
pub fn s3_content_integration(route: &ContentRoute, credentials_arn: &str) -> Value {
    let key = object_key(route);

    let mut ok = Mapping::new();
    ok.insert("statusCode".into(), "200".into());
    let mut responses = Mapping::new();
    responses.insert("default".into(), Value::Mapping(ok));

    let mut integration = Mapping::new();
    integration.insert("type".into(), "aws".into());
    integration.insert("httpMethod".into(), "GET".into());
    integration.insert(
        "uri".into(),
        format!(
            "arn:aws:apigateway:{}:s3:path/{}/{}",
            route.region, route.bucket_name, key
        )
        .into(),
    );
    integration.insert("credentials".into(), credentials_arn.into());
    integration.insert("passthroughBehavior".into(), "when_no_match".into());
    integration.insert("responses".into(), Value::Mapping(responses));

    if route.path.contains(PROXY_SEGMENT) {
        let mut params = Mapping::new();
        params.insert(
            "integration.request.path.proxy".into(),
            "method.request.path.proxy".into(),
        );
        integration.insert("requestParameters".into(), Value::Mapping(params));
    }
    Value::Mapping(integration)
}

fn object_key(route: &ContentRoute) -> String {
    let key = match &route.object_key {
        Some(key) => key.clone(),
        None => route.path.trim_start_matches('/').to_string(),
    };
    key.replace(PROXY_SEGMENT, "{proxy}")
}

impl SpecEditor {
    /// Point every content route at its bucket, all sharing the single
    /// gateway role ARN.
    pub fn process_content(
        &mut self,
        routes: &[ContentRoute],
        credentials_arn: &str,
    ) -> Result<&mut Self, PatchError> {
        self.diagnostics()
            .info(&format!("process content with role {credentials_arn}"));
        for route in routes {
            self.add_operation_attribute(
                &route.path,
                &route.method,
                INTEGRATION_EXT,
                s3_content_integration(route, credentials_arn),
            )?;
        }
        Ok(self)
    }
}
