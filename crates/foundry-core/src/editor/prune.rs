use regex::Regex;
use serde_yaml_ng::{Mapping, Value};

use super::SpecEditor;
use crate::error::PatchError;

impl SpecEditor {
    /// Drop every mapping key, at any depth, that `pattern` matches from the
    /// start of the key. `"x-"` strips `x-function-name` but keeps `functionName`.
    pub fn remove_attributes_by_pattern(&mut self, pattern: &str) -> Result<&mut Self, PatchError> {
        let anchored = Regex::new(&format!("^(?:{pattern})"))?;
        let spec = std::mem::take(self.root_mut());
        self.replace_document(prune_mapping(spec, &anchored));
        self.diagnostics().info(&format!(
            "attributes matching '{pattern}' have been removed from the spec"
        ));
        Ok(self)
    }
}

fn prune_mapping(mapping: Mapping, pattern: &Regex) -> Mapping {
    mapping
        .into_iter()
        .filter(|(key, _)| !key.as_str().is_some_and(|k| pattern.is_match(k)))
        .map(|(key, value)| (key, prune_value(value, pattern)))
        .collect()
}

fn prune_value(value: Value, pattern: &Regex) -> Value {
    match value {
        Value::Mapping(mapping) => Value::Mapping(prune_mapping(mapping, pattern)),
        Value::Sequence(items) => Value::Sequence(
            items
                .into_iter()
                .map(|item| prune_value(item, pattern))
                .collect(),
        ),
        other => other,
    }
}
