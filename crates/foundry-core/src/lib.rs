pub mod aws;
pub mod config;
pub mod diagnostics;
pub mod editor;
pub mod error;
pub mod load;

pub use diagnostics::{CollectingDiagnostics, Diagnostics, LogDiagnostics};
pub use editor::{SpecEditor, TextFormat};
pub use load::{SpecInput, SpecSource};

/// Re-exported tree types so callers don't need a direct `serde_yaml_ng` dependency.
pub use serde_yaml_ng::{Mapping, Value};
