//! Declarative connection model shared by discovery, parsing and lookups.
//!
//! A `ConfigDocument` maps connection names to `ConnectionConfigEntry` values.
//! Each entry carries a backend discriminator (`is` on the wire) and a bag of
//! properties; every property holds exactly one `ConfigValue` form.

use crate::constants::{CONNECTIONS_KEY, ENV_REFERENCE_KEY, KIND_KEY, SECRET_REFERENCE_KEY};
use crate::errors::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A single connection property value
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    /// A value used as written. Scalars, plus arrays and objects that are not
    /// reference shapes (backend-specific option maps).
    Literal(Value),
    /// `{"env": NAME}`: read from the process environment by the factory
    Env(String),
    /// `{"secretKey": ID}`: resolved through an injected secret resolver
    Secret(String),
}

impl ConfigValue {
    pub fn literal(value: impl Into<Value>) -> Self {
        ConfigValue::Literal(value.into())
    }

    /// Classify a raw JSON property value.
    ///
    /// An object mentioning `env` or `secretKey` must consist of exactly that key
    /// with a string value; anything else mixing reference keys is rejected.
    pub fn from_json(property: &str, value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Ok(ConfigValue::Literal(value));
        };

        let is_env = map.contains_key(ENV_REFERENCE_KEY);
        let is_secret = map.contains_key(SECRET_REFERENCE_KEY);
        if !is_env && !is_secret {
            return Ok(ConfigValue::Literal(Value::Object(map)));
        }

        if map.len() != 1 {
            return Err(Error::parse(
                property,
                format!("reference must contain only '{ENV_REFERENCE_KEY}' or '{SECRET_REFERENCE_KEY}'"),
            ));
        }

        let Some((key, Value::String(target))) = map.into_iter().next() else {
            return Err(Error::parse(property, "reference target must be a string"));
        };

        if key == ENV_REFERENCE_KEY {
            Ok(ConfigValue::Env(target))
        } else {
            Ok(ConfigValue::Secret(target))
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ConfigValue::Literal(value) => value.clone(),
            ConfigValue::Env(name) => single_key_object(ENV_REFERENCE_KEY, name),
            ConfigValue::Secret(key) => single_key_object(SECRET_REFERENCE_KEY, key),
        }
    }

    pub fn as_secret_key(&self) -> Option<&str> {
        match self {
            ConfigValue::Secret(key) => Some(key),
            _ => None,
        }
    }
}

fn single_key_object(key: &str, value: &str) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), Value::String(value.to_string()));
    Value::Object(map)
}

/// A named, declarative description of how to construct a connection
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionConfigEntry {
    /// Backend discriminator, `is` in the file format
    pub kind: String,
    pub properties: BTreeMap<String, ConfigValue>,
}

impl ConnectionConfigEntry {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            properties: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: ConfigValue) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    pub fn property(&self, name: &str) -> Option<&ConfigValue> {
        self.properties.get(name)
    }

    /// Build an entry from the JSON object stored under its connection name
    pub fn from_json(name: &str, value: Value) -> Result<Self> {
        let Value::Object(mut map) = value else {
            return Err(Error::parse(name, "connection entry must be an object"));
        };

        let kind = match map.remove(KIND_KEY) {
            Some(Value::String(kind)) if !kind.is_empty() => kind,
            Some(_) => {
                return Err(Error::parse(
                    name,
                    format!("'{KIND_KEY}' must be a non-empty string"),
                ))
            }
            None => return Err(Error::parse(name, format!("missing '{KIND_KEY}' field"))),
        };

        let mut properties = BTreeMap::new();
        for (property, raw) in map {
            let value = ConfigValue::from_json(&format!("{name}.{property}"), raw)?;
            properties.insert(property, value);
        }

        Ok(Self { kind, properties })
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert(KIND_KEY.to_string(), Value::String(self.kind.clone()));
        for (name, value) in &self.properties {
            map.insert(name.clone(), value.to_json());
        }
        Value::Object(map)
    }
}

impl Serialize for ConnectionConfigEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ConnectionConfigEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json("<entry>", value).map_err(serde::de::Error::custom)
    }
}

/// Mapping from unique connection name to its entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    connections: BTreeMap<String, ConnectionConfigEntry>,
}

impl ConfigDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from the top-level JSON value of a configuration file.
    /// A missing `connections` key yields an empty document.
    pub fn from_json(origin: &str, value: Value) -> Result<Self> {
        let Value::Object(mut root) = value else {
            return Err(Error::parse(origin, "top level must be an object"));
        };

        let connections = match root.remove(CONNECTIONS_KEY) {
            None | Some(Value::Null) => return Ok(Self::new()),
            Some(Value::Object(connections)) => connections,
            Some(_) => {
                return Err(Error::parse(
                    origin,
                    format!("'{CONNECTIONS_KEY}' must be an object"),
                ))
            }
        };

        let mut document = Self::new();
        for (name, raw) in connections {
            let entry = ConnectionConfigEntry::from_json(&name, raw).map_err(|e| match e {
                Error::Parse { message, .. } => {
                    Error::parse(origin, format!("connection '{name}': {message}"))
                }
                other => other,
            })?;
            document.insert(name, entry);
        }
        Ok(document)
    }

    pub fn to_json(&self) -> Value {
        let connections: Map<String, Value> = self
            .connections
            .iter()
            .map(|(name, entry)| (name.clone(), entry.to_json()))
            .collect();
        let mut root = Map::new();
        root.insert(CONNECTIONS_KEY.to_string(), Value::Object(connections));
        Value::Object(root)
    }

    pub fn get(&self, name: &str) -> Option<&ConnectionConfigEntry> {
        self.connections.get(name)
    }

    /// Insert or replace the entry for `name`
    pub fn insert(&mut self, name: impl Into<String>, entry: ConnectionConfigEntry) {
        self.connections.insert(name.into(), entry);
    }

    #[must_use]
    pub fn with_connection(mut self, name: impl Into<String>, entry: ConnectionConfigEntry) -> Self {
        self.insert(name, entry);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.connections.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConnectionConfigEntry)> {
        self.connections.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl Serialize for ConfigDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ConfigDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json("<document>", value).map_err(serde::de::Error::custom)
    }
}

/// What configuration discovery found for a target file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryResult {
    pub config_text: String,
    pub config_dir: PathBuf,
}

/// Shared, mutable row limit read by factories at connection-creation time
#[derive(Clone)]
pub struct RowLimit(Arc<AtomicU64>);

impl RowLimit {
    pub fn new(limit: u64) -> Self {
        Self(Arc::new(AtomicU64::new(limit)))
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, limit: u64) {
        self.0.store(limit, Ordering::Relaxed);
    }
}

impl Default for RowLimit {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_ROW_LIMIT)
    }
}

impl fmt::Debug for RowLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RowLimit").field(&self.get()).finish()
    }
}

/// Options handed to a connection factory alongside the entry
#[derive(Debug, Clone, Default)]
pub struct ConnectionOptions {
    pub row_limit: RowLimit,
    /// Directory relative paths in the entry are resolved against
    pub working_directory: Option<PathBuf>,
}
