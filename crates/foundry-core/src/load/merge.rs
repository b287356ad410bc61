use serde_yaml_ng::{Mapping, Value};

/// Deep merge `incoming` into `destination`; `incoming` wins conflicts.
///
/// - mapping over mapping recurses
/// - an empty sequence replaces whatever was there (explicit clear)
/// - a non-empty sequence is appended to an existing sequence, otherwise replaces
/// - anything else replaces the destination value
pub fn deep_merge(destination: &mut Mapping, incoming: Mapping) {
    for (key, value) in incoming {
        match value {
            Value::Mapping(incoming_map) => match destination.get_mut(&key) {
                Some(Value::Mapping(existing)) => deep_merge(existing, incoming_map),
                _ => {
                    destination.insert(key, Value::Mapping(incoming_map));
                }
            },
            Value::Sequence(items) if items.is_empty() => {
                destination.insert(key, Value::Sequence(items));
            }
            Value::Sequence(mut items) => match destination.get_mut(&key) {
                Some(Value::Sequence(existing)) => existing.append(&mut items),
                _ => {
                    destination.insert(key, Value::Sequence(items));
                }
            },
            other => {
                destination.insert(key, other);
            }
        }
    }
}
