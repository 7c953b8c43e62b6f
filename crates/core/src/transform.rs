//! Small payload transformations shared by actions.

use serde_json::{Map, Value};

/// Flatten nested records into a single level with dot-joined keys.
///
/// `{"a": {"b": 1}, "c": [1, 2]}` becomes `{"a.b": 1, "c": [1, 2]}`. An empty
/// nested record contributes no keys.
pub fn flatten(map: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    flatten_into(map, &mut Vec::new(), &mut out);
    out
}

fn flatten_into<'a>(
    map: &'a Map<String, Value>,
    prefix: &mut Vec<&'a str>,
    out: &mut Map<String, Value>,
) {
    for (key, value) in map {
        prefix.push(key.as_str());
        match value {
            // Only JSON objects are records; arrays and scalars are leaves.
            Value::Object(nested) => flatten_into(nested, prefix, out),
            leaf => {
                out.insert(prefix.join("."), leaf.clone());
            }
        }
        prefix.pop();
    }
}

/// Copy of `map` without any of `keys`.
pub fn omit(map: &Map<String, Value>, keys: &[&str]) -> Map<String, Value> {
    map.iter()
        .filter(|(k, _)| !keys.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
