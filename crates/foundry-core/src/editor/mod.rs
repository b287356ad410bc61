mod access;
mod prune;
mod serialize;

use std::fmt;
use std::sync::Arc;

use serde_yaml_ng::{Mapping, Value};

use crate::diagnostics::{Diagnostics, LogDiagnostics};
use crate::error::SpecError;
use crate::load::{SpecInput, deep_merge};

pub use serialize::TextFormat;

/// An OpenAPI document held as a mutable tree, built from one or more merged
/// fragments. All accessors and patchers operate on this tree in place.
pub struct SpecEditor {
    spec: Mapping,
    diagnostics: Arc<dyn Diagnostics>,
}

impl SpecEditor {
    /// Load and merge `input`, reporting through the `log` facade.
    pub fn new(input: impl Into<SpecInput>) -> Result<Self, SpecError> {
        Self::with_diagnostics(input, LogDiagnostics::shared("foundry::editor"))
    }

    pub fn with_diagnostics(
        input: impl Into<SpecInput>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self, SpecError> {
        let input = input.into();
        let mut spec = Mapping::new();
        for source in input.sources() {
            diagnostics.debug(&format!("merge spec: {:?}", source));
            deep_merge(&mut spec, source.load()?);
        }
        diagnostics.info(&format!(
            "loaded spec from {} source(s)",
            input.sources().len()
        ));
        Ok(Self { spec, diagnostics })
    }

    /// Start from an already built tree without going through a loader.
    pub fn from_mapping(spec: Mapping, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self { spec, diagnostics }
    }

    /// Merge another spec into this one; the new spec wins conflicts.
    pub fn merge_with(&mut self, input: impl Into<SpecInput>) -> Result<&mut Self, SpecError> {
        let merged = input.into().load_merged()?;
        deep_merge(&mut self.spec, merged);
        Ok(self)
    }

    pub fn document(&self) -> &Mapping {
        &self.spec
    }

    pub fn into_document(self) -> Mapping {
        self.spec
    }

    pub fn diagnostics(&self) -> &Arc<dyn Diagnostics> {
        &self.diagnostics
    }

    pub(crate) fn replace_document(&mut self, spec: Mapping) {
        self.spec = spec;
    }

    pub(crate) fn root_mut(&mut self) -> &mut Mapping {
        &mut self.spec
    }
}

impl fmt::Debug for SpecEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecEditor")
            .field("spec", &Value::Mapping(self.spec.clone()))
            .finish_non_exhaustive()
    }
}
