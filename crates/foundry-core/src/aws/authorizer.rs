use serde_yaml_ng::{Mapping, Value};

use super::integration::check_aligned;
use super::{AUTHORIZER_EXT, AUTHTYPE_EXT, AuthorizerKind, AuthorizerTarget, FUNCTION_NAME_EXT};
use crate::editor::SpecEditor;
use crate::error::{AccessError, PatchError};

pub const TOKEN_VALIDATION_EXPRESSION: &str = "^Bearer [-0-9a-zA-Z._]*$";
pub const TOKEN_IDENTITY_SOURCE: &str = "method.request.header.Authorization";
pub const AUTHORIZER_RESULT_TTL_SECONDS: u64 = 60;

/// The full security scheme entry for a Lambda token authorizer.
pub fn token_authorizer_scheme(function_name: &str, invoke_arn: &str) -> Value {
    let mut authorizer = Mapping::new();
    authorizer.insert("type".into(), "token".into());
    authorizer.insert("authorizerUri".into(), invoke_arn.into());
    authorizer.insert(
        "identityValidationExpression".into(),
        TOKEN_VALIDATION_EXPRESSION.into(),
    );
    authorizer.insert("identitySource".into(), TOKEN_IDENTITY_SOURCE.into());
    authorizer.insert(
        "authorizerResultTtlInSeconds".into(),
        AUTHORIZER_RESULT_TTL_SECONDS.into(),
    );

    let mut scheme = Mapping::new();
    scheme.insert("type".into(), "apiKey".into());
    scheme.insert("name".into(), "Authorization".into());
    scheme.insert("in".into(), "header".into());
    scheme.insert(FUNCTION_NAME_EXT.into(), function_name.into());
    scheme.insert(AUTHTYPE_EXT.into(), "custom".into());
    scheme.insert(AUTHORIZER_EXT.into(), Value::Mapping(authorizer));
    Value::Mapping(scheme)
}

impl SpecEditor {
    /// Install (or replace) a token authorizer security scheme.
    pub fn add_token_authorizer(
        &mut self,
        name: &str,
        function_name: &str,
        invoke_arn: &str,
    ) -> Result<&mut Self, PatchError> {
        let schemes = self
            .get_or_create(&["components", "securitySchemes"], true)?
            .as_mapping_mut()
            .ok_or_else(|| AccessError::NotAMapping("components.securitySchemes".to_string()))?;
        schemes.insert(
            Value::String(name.to_string()),
            token_authorizer_scheme(function_name, invoke_arn),
        );
        Ok(self)
    }

    /// Patch each authorizer with its positionally aligned invoke ARN and
    /// function name. Only token authorizers are supported; any other kind
    /// fails before the tree is touched.
    pub fn process_authorizers(
        &mut self,
        targets: &[AuthorizerTarget],
        invoke_arns: &[String],
        function_names: &[String],
    ) -> Result<&mut Self, PatchError> {
        check_aligned("authorizer invoke ARNs", targets.len(), invoke_arns.len())?;
        check_aligned("authorizer function names", targets.len(), function_names.len())?;

        let tokens = targets
            .iter()
            .map(|target| match target.kind {
                AuthorizerKind::Token => Ok(target.name.as_str()),
                AuthorizerKind::Request => Err(PatchError::UnsupportedAuthorizerKind {
                    name: target.name.clone(),
                    kind: target.kind.as_str().to_string(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.diagnostics()
            .info(&format!("process authorizers: {invoke_arns:?}"));
        for ((name, invoke_arn), function_name) in tokens.into_iter().zip(invoke_arns).zip(function_names) {
            self.diagnostics()
                .debug(&format!("add token authorizer: {name}"));
            self.add_token_authorizer(name, function_name, invoke_arn)?;
        }
        Ok(self)
    }

    /// Same as [`SpecEditor::process_authorizers`]; token validators are
    /// token authorizers.
    pub fn process_token_validators(
        &mut self,
        targets: &[AuthorizerTarget],
        invoke_arns: &[String],
        function_names: &[String],
    ) -> Result<&mut Self, PatchError> {
        self.process_authorizers(targets, invoke_arns, function_names)
    }
}
