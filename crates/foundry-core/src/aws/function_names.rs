use serde_yaml_ng::{Mapping, Value};

use super::FUNCTION_NAME_EXT;
use crate::editor::SpecEditor;

impl SpecEditor {
    /// Every `x-function-name` under `paths.*.*`, then under
    /// `components.securitySchemes.*`, in document order.
    pub fn get_function_names(&self) -> Vec<String> {
        let mut names = Vec::new();

        if let Some(paths) = self.get(&["paths"]).and_then(Value::as_mapping) {
            for operations in paths.values().filter_map(Value::as_mapping) {
                names.extend(operations.values().filter_map(function_name));
            }
        }

        if let Some(schemes) = self
            .get(&["components", "securitySchemes"])
            .and_then(Value::as_mapping)
        {
            names.extend(schemes.values().filter_map(function_name));
        }

        self.diagnostics()
            .debug(&format!("function names: {names:?}"));
        names
    }
}

fn function_name(node: &Value) -> Option<String> {
    node.as_mapping()
        .and_then(|m: &Mapping| m.get(FUNCTION_NAME_EXT))
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
