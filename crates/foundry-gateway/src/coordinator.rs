//! Builds a REST API once every deferred identifier is known.
//!
//! The build moves through three states, each its own type so a build can
//! never go backwards:
//!
//! `PendingBuild` --resolve--> `ResolvedBuild` --provision--> `BuiltApi`
//!
//! Resolution is a single fan-in over every integration, every authorizer,
//! every content bucket and the gateway role. Each resolved record keeps its own declaration, so results
//! are never matched back to declarations by position.

use std::sync::Arc;

use foundry_core::aws::{AuthorizerTarget, ContentRoute, OperationTarget};
use foundry_core::{Diagnostics, SpecEditor, SpecInput};
use futures::future::try_join_all;

use crate::declaration::{Authorizer, ContentEntry, Integration};
use crate::deferred::Deferred;
use crate::error::{BuildError, ResolutionFailure};
use crate::iam::{LambdaPermission, lambda_permissions};
use crate::provision::{
    GatewayEndpoint, Provisioner, RestApiRequest, StageSettings, access_log_format, api_host,
};

/// Everything needed to build one REST API.
#[derive(Debug, Clone)]
pub struct RestApiArgs {
    pub name: String,
    pub specs: SpecInput,
    pub integrations: Vec<Integration>,
    pub authorizers: Vec<Authorizer>,
    pub content: Vec<ContentEntry>,
    /// Role the gateway assumes to read content buckets.
    pub gateway_role_arn: Deferred,
    /// Keys matching this pattern are removed after patching.
    pub strip_pattern: Option<String>,
    pub logging: bool,
}

impl RestApiArgs {
    pub fn new(name: impl Into<String>, specs: impl Into<SpecInput>, gateway_role_arn: Deferred) -> Self {
        Self {
            name: name.into(),
            specs: specs.into(),
            integrations: Vec::new(),
            authorizers: Vec::new(),
            content: Vec::new(),
            gateway_role_arn,
            strip_pattern: None,
            logging: false,
        }
    }
}

/// Spec loaded, identifiers not yet resolved.
pub struct PendingBuild {
    name: String,
    editor: SpecEditor,
    integrations: Vec<Integration>,
    authorizers: Vec<Authorizer>,
    content: Vec<ContentEntry>,
    gateway_role_arn: Deferred,
    strip_pattern: Option<String>,
    logging: bool,
    diagnostics: Arc<dyn Diagnostics>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIntegration {
    pub target: OperationTarget,
    pub invoke_arn: String,
    pub function_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAuthorizer {
    pub target: AuthorizerTarget,
    pub invoke_arn: String,
    pub function_name: String,
}

/// Every identifier known; the spec is still unpatched.
pub struct ResolvedBuild {
    name: String,
    editor: SpecEditor,
    integrations: Vec<ResolvedIntegration>,
    authorizers: Vec<ResolvedAuthorizer>,
    content: Vec<ContentRoute>,
    gateway_role_arn: String,
    strip_pattern: Option<String>,
    logging: bool,
    diagnostics: Arc<dyn Diagnostics>,
}

/// The provisioned API and what was sent to create it.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltApi {
    pub name: String,
    pub id: String,
    pub execution_arn: String,
    pub body: String,
    pub function_names: Vec<String>,
    pub permissions: Vec<LambdaPermission>,
}

impl BuiltApi {
    pub fn host(&self, endpoint: &GatewayEndpoint) -> String {
        api_host(&self.id, &self.name, endpoint)
    }
}

impl PendingBuild {
    /// Load and merge the spec. Spec problems surface here, before any waiting.
    pub fn new(args: RestApiArgs, diagnostics: Arc<dyn Diagnostics>) -> Result<Self, BuildError> {
        let editor = SpecEditor::with_diagnostics(args.specs, diagnostics.clone())?;
        diagnostics.info(&format!(
            "{}: pending ({} integrations, {} authorizers, {} content routes)",
            args.name,
            args.integrations.len(),
            args.authorizers.len(),
            args.content.len()
        ));
        Ok(Self {
            name: args.name,
            editor,
            integrations: args.integrations,
            authorizers: args.authorizers,
            content: args.content,
            gateway_role_arn: args.gateway_role_arn,
            strip_pattern: args.strip_pattern,
            logging: args.logging,
            diagnostics,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn editor(&self) -> &SpecEditor {
        &self.editor
    }

    /// Wait for every identifier. Any single failure fails the whole build.
    pub async fn resolve(self) -> Result<ResolvedBuild, BuildError> {
        let integrations = try_join_all(self.integrations.into_iter().map(resolve_integration));
        let authorizers = try_join_all(self.authorizers.into_iter().map(resolve_authorizer));
        let content = try_join_all(self.content.into_iter().map(ContentEntry::resolve));
        let role = self.gateway_role_arn.get();

        let result = futures::try_join!(integrations, authorizers, content, role);
        let (integrations, authorizers, content, gateway_role_arn) = match result {
            Ok(resolved) => resolved,
            Err(failure) => {
                self.diagnostics
                    .warn(&format!("{}: resolution failed: {failure}", self.name));
                return Err(failure.into());
            }
        };

        self.diagnostics
            .info(&format!("{}: all identifiers resolved", self.name));
        Ok(ResolvedBuild {
            name: self.name,
            editor: self.editor,
            integrations,
            authorizers,
            content,
            gateway_role_arn,
            strip_pattern: self.strip_pattern,
            logging: self.logging,
            diagnostics: self.diagnostics,
        })
    }
}

async fn resolve_integration(integration: Integration) -> Result<ResolvedIntegration, ResolutionFailure> {
    let (invoke_arn, function_name) = futures::try_join!(
        integration.function.invoke_arn().get(),
        integration.function.function_name().get()
    )?;
    Ok(ResolvedIntegration {
        target: integration.target,
        invoke_arn,
        function_name,
    })
}

async fn resolve_authorizer(authorizer: Authorizer) -> Result<ResolvedAuthorizer, ResolutionFailure> {
    let (invoke_arn, function_name) = futures::try_join!(
        authorizer.function.invoke_arn().get(),
        authorizer.function.function_name().get()
    )?;
    Ok(ResolvedAuthorizer {
        target: authorizer.target,
        invoke_arn,
        function_name,
    })
}

impl ResolvedBuild {
    pub fn integrations(&self) -> &[ResolvedIntegration] {
        &self.integrations
    }

    pub fn authorizers(&self) -> &[ResolvedAuthorizer] {
        &self.authorizers
    }

    pub fn gateway_role_arn(&self) -> &str {
        &self.gateway_role_arn
    }

    /// Integration functions first, then authorizer functions.
    pub fn function_names(&self) -> Vec<String> {
        self.integrations
            .iter()
            .map(|i| i.function_name.clone())
            .chain(self.authorizers.iter().map(|a| a.function_name.clone()))
            .collect()
    }

    /// Patch and render the spec without provisioning anything.
    pub fn render(mut self) -> Result<String, BuildError> {
        self.patch()
    }

    /// Patch the spec, hand it to `provisioner`, and report the result.
    pub async fn provision(mut self, provisioner: &dyn Provisioner) -> Result<BuiltApi, BuildError> {
        let body = self.patch()?;
        let function_names = self.function_names();

        let request = RestApiRequest {
            name: self.name.clone(),
            body: body.clone(),
            stage: StageSettings {
                name: self.name.clone(),
                access_log_format: self.logging.then(access_log_format),
            },
        };
        self.diagnostics
            .info(&format!("{}: creating rest api", self.name));
        let api = provisioner.create_rest_api(request).await?;

        let permissions = lambda_permissions(&function_names, &api.execution_arn);
        self.diagnostics
            .info(&format!("{}: built as {}", self.name, api.id));
        Ok(BuiltApi {
            name: self.name,
            id: api.id,
            execution_arn: api.execution_arn,
            body,
            function_names,
            permissions,
        })
    }

    fn patch(&mut self) -> Result<String, BuildError> {
        let (targets, (arns, names)): (Vec<_>, (Vec<_>, Vec<_>)) = self
            .integrations
            .iter()
            .map(|i| (i.target.clone(), (i.invoke_arn.clone(), i.function_name.clone())))
            .unzip();
        self.editor.process_integrations(&targets, &arns, &names)?;

        let (targets, (arns, names)): (Vec<_>, (Vec<_>, Vec<_>)) = self
            .authorizers
            .iter()
            .map(|a| (a.target.clone(), (a.invoke_arn.clone(), a.function_name.clone())))
            .unzip();
        self.editor.process_authorizers(&targets, &arns, &names)?;

        self.editor
            .process_content(&self.content, &self.gateway_role_arn)?;

        if let Some(pattern) = &self.strip_pattern {
            self.editor.remove_attributes_by_pattern(pattern)?;
        }
        Ok(self.editor.to_yaml()?)
    }
}

/// Load, resolve, patch and provision in one go.
pub async fn build(
    args: RestApiArgs,
    provisioner: &dyn Provisioner,
    diagnostics: Arc<dyn Diagnostics>,
) -> Result<BuiltApi, BuildError> {
    PendingBuild::new(args, diagnostics)?
        .resolve()
        .await?
        .provision(provisioner)
        .await
}
