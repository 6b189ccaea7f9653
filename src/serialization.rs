use crate::Data;
use serde_json::Value;

/// Adds the keys of `fragment` that `value` does not already have.
///
/// Absent output becomes the fragment itself when it has any keys. Output
/// that is not a mapping cannot take extra keys; they are dropped.
pub(crate) fn merge_fragment(value: Option<Value>, fragment: Data) -> Option<Value> {
    if fragment.is_empty() {
        return value;
    }

    match value {
        None => Some(Value::Object(fragment)),
        Some(Value::Object(mut map)) => {
            for (key, extra) in fragment {
                map.entry(key).or_insert(extra);
            }
            Some(Value::Object(map))
        }
        Some(other) => {
            log::warn!(
                "dropping keys {:?}: serializer output is not a mapping",
                fragment.keys().collect::<Vec<_>>()
            );
            Some(other)
        }
    }
}
