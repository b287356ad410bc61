use serde_yaml_ng::{Mapping, Value};

use super::{FUNCTION_NAME_EXT, INTEGRATION_EXT, OperationTarget};
use crate::editor::SpecEditor;
use crate::error::PatchError;

/// The `x-amazon-apigateway-integration` object for a Lambda proxy call.
pub fn lambda_proxy_integration(invoke_arn: &str) -> Value {
    let mut integration = Mapping::new();
    integration.insert("type".into(), "aws_proxy".into());
    integration.insert("uri".into(), invoke_arn.into());
    integration.insert("httpMethod".into(), "POST".into());
    Value::Mapping(integration)
}

impl SpecEditor {
    /// Wire one operation to a Lambda function.
    pub fn add_integration(
        &mut self,
        target: &OperationTarget,
        function_name: &str,
        invoke_arn: &str,
    ) -> Result<&mut Self, PatchError> {
        self.add_operation_attribute(&target.path, &target.method, FUNCTION_NAME_EXT, function_name)?
            .add_operation_attribute(
                &target.path,
                &target.method,
                INTEGRATION_EXT,
                lambda_proxy_integration(invoke_arn),
            )?;
        Ok(self)
    }

    /// Patch each target with its positionally aligned invoke ARN and
    /// function name. All three slices must be the same length.
    pub fn process_integrations(
        &mut self,
        targets: &[OperationTarget],
        invoke_arns: &[String],
        function_names: &[String],
    ) -> Result<&mut Self, PatchError> {
        check_aligned("integration invoke ARNs", targets.len(), invoke_arns.len())?;
        check_aligned("integration function names", targets.len(), function_names.len())?;
        for target in targets {
            self.get_operation(&target.path, &target.method)?;
        }

        self.diagnostics()
            .info(&format!("process integrations: {invoke_arns:?}"));
        for ((target, invoke_arn), function_name) in
            targets.iter().zip(invoke_arns).zip(function_names)
        {
            self.diagnostics()
                .debug(&format!("add integration {target} -> {function_name}"));
            self.add_integration(target, function_name, invoke_arn)?;
        }
        Ok(self)
    }
}

pub(crate) fn check_aligned(
    what: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), PatchError> {
    if expected != actual {
        return Err(PatchError::LengthMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}
