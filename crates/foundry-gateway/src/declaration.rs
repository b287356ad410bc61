//! Typed integration, authorizer and content declarations.

use std::fmt;
use std::sync::Arc;

use foundry_core::aws::{AuthorizerKind, AuthorizerTarget, ContentRoute, OperationTarget};

use crate::backend::BackendUnit;
use crate::deferred::Deferred;
use crate::error::ResolutionFailure;
use crate::origin::StorageBacking;

/// Wire the operation at `target` to `function`.
#[derive(Clone)]
pub struct Integration {
    pub target: OperationTarget,
    pub function: Arc<dyn BackendUnit>,
}

impl Integration {
    pub fn new(path: &str, method: &str, function: Arc<dyn BackendUnit>) -> Self {
        Self {
            target: OperationTarget::new(path, method),
            function,
        }
    }
}

impl fmt::Debug for Integration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Integration")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// Back the security scheme `target.name` with `function`.
#[derive(Clone)]
pub struct Authorizer {
    pub target: AuthorizerTarget,
    pub function: Arc<dyn BackendUnit>,
}

impl Authorizer {
    pub fn new(name: &str, kind: AuthorizerKind, function: Arc<dyn BackendUnit>) -> Self {
        Self {
            target: AuthorizerTarget {
                name: name.to_string(),
                kind,
            },
            function,
        }
    }

    pub fn token(name: &str, function: Arc<dyn BackendUnit>) -> Self {
        Self::new(name, AuthorizerKind::Token, function)
    }
}

impl fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorizer")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// Serve `route` from a bucket whose name may not be known yet.
#[derive(Debug, Clone)]
pub struct ContentEntry {
    /// Path, method, key and region. Its `bucket_name` is replaced on resolve.
    pub route: ContentRoute,
    pub bucket_name: Deferred,
}

impl ContentEntry {
    pub fn new(path: &str, bucket_name: Deferred) -> Self {
        Self {
            route: ContentRoute::new(path, String::new()),
            bucket_name,
        }
    }

    /// Serve `path` out of `backing`, keyed by its bucket id.
    pub fn backed_by(path: &str, backing: &dyn StorageBacking) -> Self {
        Self::new(path, backing.id())
    }

    /// A route whose bucket already exists.
    pub fn from_route(route: ContentRoute) -> Self {
        let bucket_name = Deferred::resolved("content bucket name", route.bucket_name.clone());
        Self { route, bucket_name }
    }

    pub(crate) async fn resolve(self) -> Result<ContentRoute, ResolutionFailure> {
        let bucket_name = self.bucket_name.get().await?;
        Ok(ContentRoute {
            bucket_name,
            ..self.route
        })
    }
}

impl From<ContentRoute> for ContentEntry {
    fn from(route: ContentRoute) -> Self {
        Self::from_route(route)
    }
}
