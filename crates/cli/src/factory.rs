//! A connection factory that describes connections instead of opening them
//!
//! `malloy-conn` has no database drivers. Its "connections" record the entry a
//! real driver would receive after every indirection has been applied, which is
//! what the tool prints.

use async_trait::async_trait;
use dashmap::DashMap;
use malloy_conn_config::{ConfigDiscovery, FsConfigDiscovery};
use malloy_conn_core::{ConfigValue, ConnectionConfigEntry, ConnectionOptions, Error, Result};
use malloy_conn_lookup::{Connection, ConnectionFactory};
use serde::Serialize;
use std::any::Any;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Backend kinds with zero-config defaults
pub const REGISTERED_KINDS: &[&str] = &[
    "bigquery",
    "duckdb",
    "mysql",
    "postgres",
    "presto",
    "snowflake",
    "trino",
];

/// Property names whose values are never printed
const SENSITIVE_PROPERTIES: &[&str] = &["password", "token", "secret", "privatekey", "apikey"];

const MASK: &str = "********";

fn is_sensitive(property: &str) -> bool {
    let lowered = property.to_ascii_lowercase();
    SENSITIVE_PROPERTIES
        .iter()
        .any(|sensitive| lowered.contains(sensitive))
}

/// Printable description of a resolved connection
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribedConnection {
    pub name: String,
    pub kind: String,
    pub properties: BTreeMap<String, String>,
    pub row_limit: u64,
    pub working_directory: Option<PathBuf>,
    #[serde(skip)]
    entry: ConnectionConfigEntry,
}

impl DescribedConnection {
    fn describe(
        name: &str,
        entry: &ConnectionConfigEntry,
        options: &ConnectionOptions,
    ) -> Result<Self> {
        let mut properties = BTreeMap::new();
        for (property, value) in &entry.properties {
            let shown = match value {
                ConfigValue::Env(var) => std::env::var(var).map_err(|_| {
                    Error::factory(
                        &entry.kind,
                        format!("environment variable '{var}' for '{name}.{property}' is not set"),
                    )
                })?,
                ConfigValue::Secret(key) => format!("<unresolved secret '{key}'>"),
                ConfigValue::Literal(serde_json::Value::String(text)) => text.clone(),
                ConfigValue::Literal(other) => other.to_string(),
            };
            let shown = if is_sensitive(property) && value.as_secret_key().is_none() {
                MASK.to_string()
            } else {
                shown
            };
            properties.insert(property.clone(), shown);
        }

        Ok(Self {
            name: name.to_string(),
            kind: entry.kind.clone(),
            properties,
            row_limit: options.row_limit.get(),
            working_directory: options.working_directory.clone(),
            entry: entry.clone(),
        })
    }
}

impl Connection for DescribedConnection {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        &self.kind
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

type CacheKey = (String, Option<PathBuf>);

/// Factory producing [`DescribedConnection`]s, with filesystem discovery.
///
/// Descriptions are memoised per name and working directory until `reset`, and
/// rebuilt whenever the entry or row limit they were made from changes.
pub struct DescriptorFactory {
    discovery: FsConfigDiscovery,
    kinds: Vec<String>,
    live: DashMap<CacheKey, Arc<DescribedConnection>>,
}

impl DescriptorFactory {
    pub fn new() -> Self {
        Self {
            discovery: FsConfigDiscovery::new(),
            kinds: REGISTERED_KINDS.iter().map(|kind| kind.to_string()).collect(),
            live: DashMap::new(),
        }
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

impl Default for DescriptorFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionFactory for DescriptorFactory {
    async fn create(
        &self,
        name: &str,
        entry: &ConnectionConfigEntry,
        options: &ConnectionOptions,
    ) -> Result<Arc<dyn Connection>> {
        if !self.kinds.iter().any(|kind| kind == &entry.kind) {
            return Err(Error::factory(&entry.kind, "unsupported connection kind"));
        }

        let key = (name.to_string(), options.working_directory.clone());
        let cached = self.live.get(&key).map(|live| Arc::clone(live.value()));
        if let Some(live) = cached {
            if live.entry == *entry && live.row_limit == options.row_limit.get() {
                return Ok(live);
            }
        }

        let described = Arc::new(DescribedConnection::describe(name, entry, options)?);
        debug!(name = %name, kind = %entry.kind, "Described connection");
        self.live.insert(key, Arc::clone(&described));
        Ok(described)
    }

    fn reset(&self) {
        self.live.clear();
    }

    fn registered_kinds(&self) -> Vec<String> {
        self.kinds.clone()
    }

    fn discovery(&self) -> Option<&dyn ConfigDiscovery> {
        Some(&self.discovery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use malloy_conn_core::RowLimit;
    use serial_test::serial;

    fn options() -> ConnectionOptions {
        ConnectionOptions {
            row_limit: RowLimit::new(25),
            working_directory: Some(PathBuf::from("/proj")),
        }
    }

    fn described(connection: &Arc<dyn Connection>) -> &DescribedConnection {
        connection.as_any().downcast_ref().unwrap()
    }

    #[tokio::test]
    async fn test_describes_literals_and_masks_sensitive_values() {
        let factory = DescriptorFactory::new();
        let entry = ConnectionConfigEntry::new("postgres")
            .with_property("host", ConfigValue::literal("db.internal"))
            .with_property("port", ConfigValue::literal(5432))
            .with_property("password", ConfigValue::literal("hunter2"));

        let connection = factory.create("pg", &entry, &options()).await.unwrap();
        let d = described(&connection);

        assert_eq!(d.properties["host"], "db.internal");
        assert_eq!(d.properties["port"], "5432");
        assert_eq!(d.properties["password"], MASK);
        assert_eq!(d.row_limit, 25);
    }

    #[tokio::test]
    async fn test_unresolved_secret_is_reported() {
        let factory = DescriptorFactory::new();
        let entry = ConnectionConfigEntry::new("snowflake")
            .with_property("password", ConfigValue::Secret("sf".to_string()));

        let connection = factory.create("sf", &entry, &options()).await.unwrap();

        assert_eq!(
            described(&connection).properties["password"],
            "<unresolved secret 'sf'>"
        );
    }

    #[tokio::test]
    #[serial]
    async fn test_env_reference_expanded_or_rejected() {
        let factory = DescriptorFactory::new();
        let entry = ConnectionConfigEntry::new("mysql")
            .with_property("host", ConfigValue::Env("MALLOY_CONN_TEST_HOST".to_string()));

        std::env::remove_var("MALLOY_CONN_TEST_HOST");
        let err = factory.create("my", &entry, &options()).await.unwrap_err();
        assert!(matches!(err, Error::Factory { .. }));

        std::env::set_var("MALLOY_CONN_TEST_HOST", "mysql.local");
        let connection = factory.create("my", &entry, &options()).await.unwrap();
        std::env::remove_var("MALLOY_CONN_TEST_HOST");
        assert_eq!(described(&connection).properties["host"], "mysql.local");
    }

    #[tokio::test]
    async fn test_unknown_kind_rejected() {
        let factory = DescriptorFactory::new();
        let err = factory
            .create("x", &ConnectionConfigEntry::new("oracle"), &options())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("oracle"));
    }

    #[tokio::test]
    async fn test_memoised_until_reset() {
        let factory = DescriptorFactory::new();
        let entry = ConnectionConfigEntry::new("duckdb");

        let first = factory.create("d", &entry, &options()).await.unwrap();
        let second = factory.create("d", &entry, &options()).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.live_count(), 1);

        factory.reset();
        assert_eq!(factory.live_count(), 0);
        let third = factory.create("d", &entry, &options()).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }
}
