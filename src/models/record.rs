use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved key carrying the form-type tag in inbound payloads.
pub const FORM_TYPE_KEY: &str = "_formType";

/// Tag used when a payload carries no usable `_formType`.
pub const UNKNOWN_FORM_TYPE: &str = "unknown";

/// A single submitted value: plain text, or the checked values of a checkbox group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Cell/email rendering: lists are joined with `", "`.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::List(items) => items.join(", "),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(items) => items.iter().all(|s| s.is_empty()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::List(_) => None,
        }
    }

    fn from_json(value: Value) -> Self {
        match value {
            Value::Array(items) => FieldValue::List(items.into_iter().map(scalar_text).collect()),
            other => FieldValue::Text(scalar_text(other)),
        }
    }
}

fn scalar_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// One submission: the form-type tag plus its fields in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub form_type: String,
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new(form_type: impl Into<String>) -> Self {
        Self {
            form_type: form_type.into(),
            fields: Vec::new(),
        }
    }

    /// Normalize a parsed payload. Field order follows the JSON object.
    pub fn from_json(value: Value) -> Result<Self, String> {
        let Value::Object(obj) = value else {
            return Err("Expected a JSON object".to_string());
        };

        let mut record = Record::new(UNKNOWN_FORM_TYPE);
        for (key, value) in obj {
            if key == FORM_TYPE_KEY {
                let tag = scalar_text(value);
                if !tag.is_empty() {
                    record.form_type = tag;
                }
                continue;
            }
            record.insert(key, FieldValue::from_json(value));
        }

        Ok(record)
    }

    /// JSON payload as posted by the capture client; `_formType` comes first.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert(FORM_TYPE_KEY.to_string(), Value::String(self.form_type.clone()));
        for (key, value) in &self.fields {
            let json = match value {
                FieldValue::Text(s) => Value::String(s.clone()),
                FieldValue::List(items) => {
                    Value::Array(items.iter().cloned().map(Value::String).collect())
                }
            };
            map.insert(key.clone(), json);
        }
        Value::Object(map)
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut FieldValue> {
        self.fields.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Overwrites in place when the key exists, otherwise appends.
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        match self.get_mut(&key) {
            Some(slot) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        let pos = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(pos).1)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
