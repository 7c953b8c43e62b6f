//! Payload extraction: resolves each declared field of an action against a raw
//! event and validates the result before it reaches `perform`.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ActionError, ActionResult};
use crate::types::{ActionDefinition, DefaultBinding, FieldDescriptor, FieldSchema};

/// Resolve a `$`-rooted dot path (`$.properties.products.0`) against `event`.
pub fn resolve_path<'a>(event: &'a Value, path: &str) -> Option<&'a Value> {
    let trimmed = path.strip_prefix('$').unwrap_or(path);
    let trimmed = trimmed.strip_prefix('.').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Some(event);
    }

    trimmed.split('.').try_fold(event, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Build the payload object for `schema` from `event`.
///
/// `overrides` holds per-subscription bindings that replace a field's
/// declared default.
pub fn build_payload(
    schema: &FieldSchema,
    event: &Value,
    overrides: Option<&Map<String, Value>>,
) -> ActionResult<Map<String, Value>> {
    let mut payload = Map::new();

    for field in schema.iter() {
        let binding = match overrides.and_then(|o| o.get(&field.name)) {
            Some(raw) => Some(serde_json::from_value::<DefaultBinding>(raw.clone())?),
            None => field.default.clone(),
        };

        let value = match binding {
            Some(DefaultBinding::Path { path }) => resolve_path(event, &path).cloned(),
            Some(DefaultBinding::Literal(literal)) => Some(literal),
            None => None,
        };

        match value {
            Some(value) if !value.is_null() => {
                check_field(field, &value, &field.name)?;
                payload.insert(field.name.clone(), value);
            }
            _ if field.required => {
                return Err(ActionError::Validation(format!(
                    "missing required field `{}`",
                    field.name
                )));
            }
            _ => {
                debug!(field = %field.name, "optional field absent");
            }
        }
    }

    Ok(payload)
}

/// Build and deserialize the typed payload for `definition`.
pub fn payload_from_event<P: DeserializeOwned>(
    definition: &ActionDefinition,
    event: &Value,
    overrides: Option<&Map<String, Value>>,
) -> ActionResult<P> {
    let payload = build_payload(&definition.fields, event, overrides)?;
    serde_json::from_value(Value::Object(payload)).map_err(|e| {
        ActionError::Validation(format!("payload for `{}` is malformed: {}", definition.slug, e))
    })
}

fn check_field(field: &FieldDescriptor, value: &Value, at: &str) -> ActionResult<()> {
    if field.multiple {
        let items = value.as_array().ok_or_else(|| {
            ActionError::Validation(format!("field `{}` must be a list", at))
        })?;
        for (i, item) in items.iter().enumerate() {
            check_single(field, item, &format!("{}[{}]", at, i))?;
        }
        Ok(())
    } else {
        check_single(field, value, at)
    }
}

fn check_single(field: &FieldDescriptor, value: &Value, at: &str) -> ActionResult<()> {
    if !field.kind.accepts(value) {
        return Err(ActionError::Validation(format!(
            "field `{}` must be of type {:?}",
            at, field.kind
        )));
    }

    if let (Some(properties), Some(object)) = (&field.properties, value.as_object()) {
        for sub in properties.iter() {
            let sub_at = format!("{}.{}", at, sub.name);
            match object.get(&sub.name) {
                Some(v) if !v.is_null() => check_field(sub, v, &sub_at)?,
                _ if sub.required => {
                    return Err(ActionError::Validation(format!(
                        "missing required field `{}`",
                        sub_at
                    )));
                }
                _ => {}
            }
        }
    }

    Ok(())
}
