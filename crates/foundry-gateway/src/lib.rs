pub mod backend;
pub mod coordinator;
pub mod declaration;
pub mod deferred;
pub mod error;
pub mod iam;
pub mod origin;
pub mod provision;

pub use backend::{BackendUnit, Function};
pub use coordinator::{BuiltApi, PendingBuild, ResolvedBuild, RestApiArgs, build};
pub use declaration::{Authorizer, ContentEntry, Integration};
pub use deferred::Deferred;
pub use error::{BuildError, ProvisionError, ResolutionFailure};
pub use provision::{ProvisionedApi, Provisioner, RestApiRequest};
