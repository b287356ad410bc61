use foundry_core::error::{PatchError, SpecError};
use thiserror::Error;

/// A deferred identifier that could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to resolve {label}: {reason}")]
pub struct ResolutionFailure {
    pub label: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ProvisionError(pub String);

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("spec error: {0}")]
    Spec(#[from] SpecError),

    #[error("patch error: {0}")]
    Patch(#[from] PatchError),

    #[error("resolution failed: {0}")]
    ResolutionFailed(#[from] ResolutionFailure),

    #[error("provisioning failed: {0}")]
    Provision(#[from] ProvisionError),

    #[error("invalid bucket or origin type '{0}': expected 'bucket' or 'site_bucket'")]
    InvalidBucketOrOriginType(String),
}
