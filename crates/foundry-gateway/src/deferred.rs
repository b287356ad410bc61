use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};

use crate::error::ResolutionFailure;

/// A future for a deferred value; every clone yields the same result.
pub type Resolution = Shared<BoxFuture<'static, Result<String, ResolutionFailure>>>;

/// An identifier the provisioning engine will only know after some resource
/// exists (an invoke ARN, a function name, a role ARN).
///
/// Cloning is cheap and every clone observes the same single resolution.
#[derive(Clone)]
pub struct Deferred {
    label: Arc<str>,
    value: Resolution,
}

impl Deferred {
    /// A value that is already known.
    pub fn resolved(label: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self::from_future(label, async move { Ok(value) })
    }

    /// A value whose resolution has already failed.
    pub fn failed(label: impl Into<String>, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::from_future(label, async move { Err(reason) })
    }

    /// Wrap any future that eventually yields the identifier or an error message.
    pub fn from_future<F>(label: impl Into<String>, future: F) -> Self
    where
        F: Future<Output = Result<String, String>> + Send + 'static,
    {
        let label: Arc<str> = Arc::from(label.into());
        let failure_label = label.clone();
        let value = async move {
            future.await.map_err(|reason| ResolutionFailure {
                label: failure_label.to_string(),
                reason,
            })
        }
        .boxed()
        .shared();
        Self { label, value }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// A future for the resolved value. It owns its state, so it can be
    /// joined with others without borrowing `self`.
    pub fn get(&self) -> Resolution {
        self.value.clone()
    }

    /// Derive a new deferred value once this one resolves.
    pub fn map<F>(&self, label: impl Into<String>, f: F) -> Deferred
    where
        F: FnOnce(String) -> String + Send + 'static,
    {
        let source = self.get();
        Self::from_future(label, async move {
            source.await.map(f).map_err(|failure| failure.to_string())
        })
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.value.peek() {
            Some(Ok(value)) => format!("resolved({value})"),
            Some(Err(failure)) => format!("failed({})", failure.reason),
            None => "pending".to_string(),
        };
        f.debug_struct("Deferred")
            .field("label", &self.label)
            .field("state", &state)
            .finish()
    }
}
