//! Record abstraction
//!
//! The engine never knows the concrete shape of a record. It reads fields by
//! name (the names come from column descriptors) and identifies records by a
//! stable key.

use std::borrow::Cow;
use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Result, TabulaError, Value};

/// Read access to named fields.
///
/// Object safe, so custom cell renderers can receive any record as `&dyn Fields`.
pub trait Fields {
    /// Look up a field by name. `None` means the record has no such field.
    fn field(&self, name: &str) -> Option<Cow<'_, Value>>;
}

/// A record displayed by the grid.
pub trait Record: Fields {
    /// Stable identity used by selection tracking
    type Key: Clone + Eq + Hash + Debug;

    fn key(&self) -> Self::Key;
}

/// A record backed by an ordered field map.
///
/// Identity is the stringified value of the configured key field, which makes
/// it a good fit for JSON payloads coming from a REST backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapRecord {
    key_field: String,
    fields: IndexMap<String, Value>,
}

impl MapRecord {
    /// Create an empty record whose identity is read from `key_field`
    pub fn new(key_field: impl Into<String>) -> Self {
        Self {
            key_field: key_field.into(),
            fields: IndexMap::new(),
        }
    }

    /// Builder-style field setter
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Build a record from a JSON object.
    ///
    /// The object must carry a non-null `key_field`, otherwise every such
    /// record would share the empty identity.
    pub fn from_json(key_field: impl Into<String>, json: &serde_json::Value) -> Result<Self> {
        let mut record = Self::new(key_field);
        if let serde_json::Value::Object(map) = json {
            for (name, value) in map {
                record.fields.insert(name.clone(), Value::from_json(value));
            }
        }
        if record.get(&record.key_field).is_none_or(Value::is_null) {
            return Err(TabulaError::MissingRecordKey(record.key_field));
        }
        Ok(record)
    }
}

impl Fields for MapRecord {
    fn field(&self, name: &str) -> Option<Cow<'_, Value>> {
        self.fields.get(name).map(Cow::Borrowed)
    }
}

impl Record for MapRecord {
    type Key = String;

    /// A record built with [`MapRecord::new`] and no key field set has the
    /// empty key, and shares it with every other such record.
    fn key(&self) -> String {
        self.fields
            .get(&self.key_field)
            .map(|v| v.to_string())
            .unwrap_or_default()
    }
}

impl Value {
    /// Convert a JSON value into a cell value.
    ///
    /// Nested objects stay as JSON; arrays are converted element-wise.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::Array(items.iter().map(Value::from_json).collect())
            }
            obj @ serde_json::Value::Object(_) => Value::Json(obj.clone()),
        }
    }
}
