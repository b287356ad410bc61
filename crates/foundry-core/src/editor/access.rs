use serde_yaml_ng::{Mapping, Value};

use super::SpecEditor;
use crate::error::AccessError;

impl SpecEditor {
    /// Walk the tree along `keys`. With `create`, missing segments are added
    /// as empty mappings; without it, a missing segment is an error.
    pub fn get_or_create(&mut self, keys: &[&str], create: bool) -> Result<&mut Value, AccessError> {
        let joined = || keys.join(".");
        let Some((first, rest)) = keys.split_first() else {
            return Err(AccessError::SpecPathNotFound(String::new()));
        };

        let mut part = step(self.root_mut(), first, create)
            .ok_or_else(|| AccessError::SpecPathNotFound(joined()))?;
        for key in rest {
            let mapping = part
                .as_mapping_mut()
                .ok_or_else(|| AccessError::SpecPathNotFound(joined()))?;
            part = step(mapping, key, create)
                .ok_or_else(|| AccessError::SpecPathNotFound(joined()))?;
        }
        Ok(part)
    }

    /// Non-creating, non-failing lookup.
    pub fn get(&self, keys: &[&str]) -> Option<&Value> {
        let (first, rest) = keys.split_first()?;
        let mut part = self.document().get(*first)?;
        for key in rest {
            part = part.as_mapping()?.get(*key)?;
        }
        Some(part)
    }

    /// Look up `paths[path][method]`; `method` is matched lowercase.
    pub fn get_operation(&self, path: &str, method: &str) -> Result<&Mapping, AccessError> {
        let method = method.to_lowercase();
        let operations = self
            .document()
            .get("paths")
            .and_then(Value::as_mapping)
            .and_then(|paths| paths.get(path))
            .and_then(Value::as_mapping)
            .ok_or_else(|| AccessError::PathNotFound(path.to_string()))?;
        operations
            .get(method.as_str())
            .ok_or_else(|| AccessError::MethodNotFound {
                path: path.to_string(),
                method: method.clone(),
            })?
            .as_mapping()
            .ok_or_else(|| AccessError::NotAMapping(format!("paths.{path}.{method}")))
    }

    pub fn get_operation_mut(&mut self, path: &str, method: &str) -> Result<&mut Mapping, AccessError> {
        let method = method.to_lowercase();
        let operations = self
            .root_mut()
            .get_mut("paths")
            .and_then(Value::as_mapping_mut)
            .and_then(|paths| paths.get_mut(path))
            .and_then(Value::as_mapping_mut)
            .ok_or_else(|| AccessError::PathNotFound(path.to_string()))?;
        let location = format!("paths.{path}.{method}");
        operations
            .get_mut(method.as_str())
            .ok_or_else(|| AccessError::MethodNotFound {
                path: path.to_string(),
                method: method.clone(),
            })?
            .as_mapping_mut()
            .ok_or(AccessError::NotAMapping(location))
    }

    /// Set a whole operation object, creating `paths[path]` if needed.
    pub fn add_operation(
        &mut self,
        path: &str,
        method: &str,
        operation: Mapping,
    ) -> Result<&mut Self, AccessError> {
        let path_item = self
            .get_or_create(&["paths", path], true)?
            .as_mapping_mut()
            .ok_or_else(|| AccessError::NotAMapping(format!("paths.{path}")))?;
        path_item.insert(
            Value::String(method.to_lowercase()),
            Value::Mapping(operation),
        );
        Ok(self)
    }

    /// Set `operation[attribute] = value` on an existing operation.
    pub fn add_operation_attribute(
        &mut self,
        path: &str,
        method: &str,
        attribute: &str,
        value: impl Into<Value>,
    ) -> Result<&mut Self, AccessError> {
        let operation = self.get_operation_mut(path, method)?;
        operation.insert(Value::String(attribute.to_string()), value.into());
        Ok(self)
    }
}

fn step<'a>(mapping: &'a mut Mapping, key: &str, create: bool) -> Option<&'a mut Value> {
    if create && !mapping.contains_key(key) {
        mapping.insert(Value::String(key.to_string()), Value::Mapping(Mapping::new()));
    }
    mapping.get_mut(key)
}

#[cfg(test)]
mod tests {
    use crate::SpecEditor;
    use crate::error::AccessError;

    const GREET: &str = r#"
openapi: 3.0.1
info:
  title: Greeting
  version: "1.0"
paths:
  /greet:
    get:
      summary: say hello
"#;

    #[test]
    fn test_get_or_create_builds_missing_mappings() {
        let mut editor = SpecEditor::new(GREET).unwrap();
        let schemes = editor
            .get_or_create(&["components", "securitySchemes"], true)
            .unwrap();
        assert!(schemes.is_mapping());
        assert!(editor.get(&["components", "securitySchemes"]).is_some());
    }

    #[test]
    fn test_get_or_create_without_create_fails() {
        let mut editor = SpecEditor::new(GREET).unwrap();
        let err = editor.get_or_create(&["components", "schemas"], false).unwrap_err();
        assert!(matches!(err, AccessError::SpecPathNotFound(ref p) if p == "components.schemas"));
    }

    #[test]
    fn test_get_returns_none_for_missing() {
        let editor = SpecEditor::new(GREET).unwrap();
        assert!(editor.get(&["paths", "/missing"]).is_none());
        assert_eq!(
            editor.get(&["info", "title"]).and_then(|v| v.as_str()),
            Some("Greeting")
        );
    }

    #[test]
    fn test_get_operation_is_case_insensitive() {
        let editor = SpecEditor::new(GREET).unwrap();
        let op = editor.get_operation("/greet", "GET").unwrap();
        assert_eq!(op.get("summary").and_then(|v| v.as_str()), Some("say hello"));
    }

    #[test]
    fn test_get_operation_distinguishes_causes() {
        let editor = SpecEditor::new(GREET).unwrap();
        let missing_path = editor.get_operation("/missing", "get").unwrap_err();
        assert!(matches!(missing_path, AccessError::PathNotFound(_)));
        assert!(missing_path.is_operation_not_found());

        let missing_method = editor.get_operation("/greet", "post").unwrap_err();
        assert!(matches!(missing_method, AccessError::MethodNotFound { .. }));
        assert!(missing_method.is_operation_not_found());
        assert_ne!(missing_path.to_string(), missing_method.to_string());
    }

    #[test]
    fn test_add_operation_creates_path() {
        let mut editor = SpecEditor::new(GREET).unwrap();
        let operation: serde_yaml_ng::Mapping =
            serde_yaml_ng::from_str("summary: new token").unwrap();
        editor.add_operation("/token", "POST", operation).unwrap();
        assert!(editor.get_operation("/token", "post").is_ok());
    }

    #[test]
    fn test_add_operation_attribute_chains() {
        let mut editor = SpecEditor::new(GREET).unwrap();
        editor
            .add_operation_attribute("/greet", "get", "x-function-name", "fn1")
            .unwrap()
            .add_operation_attribute("/greet", "get", "operationId", "greet")
            .unwrap();
        let op = editor.get_operation("/greet", "get").unwrap();
        assert_eq!(op.get("x-function-name").and_then(|v| v.as_str()), Some("fn1"));
        assert_eq!(op.get("operationId").and_then(|v| v.as_str()), Some("greet"));
    }
}
