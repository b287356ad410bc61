use crate::deferred::Deferred;

/// A deployable compute unit an operation or authorizer invokes.
pub trait BackendUnit: Send + Sync {
    /// The URI API Gateway uses to invoke the unit.
    fn invoke_arn(&self) -> Deferred;

    /// The stable, deployed name of the unit.
    fn function_name(&self) -> Deferred;
}

/// A Lambda function as seen by the gateway.
#[derive(Debug, Clone)]
pub struct Function {
    name: String,
    invoke_arn: Deferred,
    function_name: Deferred,
}

impl Function {
    pub fn new(name: impl Into<String>, invoke_arn: Deferred, function_name: Deferred) -> Self {
        Self {
            name: name.into(),
            invoke_arn,
            function_name,
        }
    }

    /// A function that already exists, with both identifiers known.
    pub fn resolved(name: impl Into<String>, invoke_arn: &str, function_name: &str) -> Self {
        let name = name.into();
        Self {
            invoke_arn: Deferred::resolved(format!("{name} invoke ARN"), invoke_arn),
            function_name: Deferred::resolved(format!("{name} function name"), function_name),
            name,
        }
    }

    /// Logical name used in declarations.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl BackendUnit for Function {
    fn invoke_arn(&self) -> Deferred {
        self.invoke_arn.clone()
    }

    fn function_name(&self) -> Deferred {
        self.function_name.clone()
    }
}

/// `arn:aws:apigateway:<region>:lambda:path/2015-03-31/functions/<function arn>/invocations`
pub fn lambda_invoke_arn(region: &str, function_arn: &str) -> String {
    format!("arn:aws:apigateway:{region}:lambda:path/2015-03-31/functions/{function_arn}/invocations")
}
