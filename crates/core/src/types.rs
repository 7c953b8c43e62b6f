use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

/// Runtime an action executes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Runs against a session-bound SDK client in the browser.
    Web,
    /// Runs server-side and issues HTTP requests.
    Cloud,
}

/// Declared type of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    String,
    Number,
    Integer,
    Boolean,
    Object,
}

impl ValueKind {
    /// Whether a single (non-repeated) JSON value is acceptable for this kind.
    ///
    /// String fields also take numbers: upstream identifiers arrive either way
    /// and are coerced through [`Identifier`].
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ValueKind::String => value.is_string() || value.is_number(),
            ValueKind::Number => value.is_number(),
            ValueKind::Integer => value.is_i64() || value.is_u64(),
            ValueKind::Boolean => value.is_boolean(),
            ValueKind::Object => value.is_object(),
        }
    }
}

/// Identifier sent upstream as either a string or a number. Always rendered
/// and serialized as a string; integral numbers lose any `.0` suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Identifier(s.to_string())
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Identifier(s)
    }
}

impl From<&Number> for Identifier {
    fn from(n: &Number) -> Self {
        let rendered = if let Some(i) = n.as_i64() {
            i.to_string()
        } else if let Some(u) = n.as_u64() {
            u.to_string()
        } else {
            // f64 Display drops the fraction of integral values: 42.0 -> "42".
            n.as_f64().map(|f| f.to_string()).unwrap_or_else(|| n.to_string())
        };
        Identifier(rendered)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Numeric(Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Identifier(s),
            Raw::Numeric(n) => Identifier::from(&n),
        })
    }
}

/// Where a field's value comes from when no override is configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultBinding {
    /// Read from the source event, e.g. `{"@path": "$.properties.products"}`.
    Path {
        #[serde(rename = "@path")]
        path: String,
    },
    Literal(Value),
}

impl DefaultBinding {
    pub fn path(path: impl Into<String>) -> Self {
        DefaultBinding::Path { path: path.into() }
    }
}

/// Descriptor for one field of an action's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ValueKind,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<FieldSchema>,
}

impl FieldDescriptor {
    pub fn new(name: &str, label: &str, kind: ValueKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            description: String::new(),
            kind,
            multiple: false,
            required: false,
            default: None,
            properties: None,
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn default_path(mut self, path: &str) -> Self {
        self.default = Some(DefaultBinding::path(path));
        self
    }

    pub fn default_literal(mut self, value: Value) -> Self {
        self.default = Some(DefaultBinding::Literal(value));
        self
    }

    pub fn properties(mut self, properties: FieldSchema) -> Self {
        self.properties = Some(properties);
        self
    }
}

/// Ordered set of field descriptors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSchema {
    fields: Vec<FieldDescriptor>,
}

impl FieldSchema {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Static descriptor of a destination action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub platform: Platform,
    /// Filter expression the pipeline evaluates to decide when to invoke
    /// this action. See [`crate::subscription::Subscription`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_subscription: Option<String>,
    pub fields: FieldSchema,
}
