//! Secret indirection for settings-based connections

use async_trait::async_trait;
use malloy_conn_core::{ConfigValue, ConnectionConfigEntry, Result};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Resolves an opaque secret key to its value
#[async_trait]
pub trait SecretResolver: Send + Sync {
    /// Resolve `key`
    ///
    /// # Returns
    /// * `Ok(Some(value))` - the secret is set
    /// * `Ok(None)` - the secret is unset
    /// * `Err(error)` - the store could not be queried
    async fn resolve(&self, key: &str) -> Result<Option<String>>;
}

/// Replace every `{secretKey}` property of `entry` with its resolved value.
///
/// Unset secrets remove the property; a resolver error is logged and treated as
/// unset. Literal and `{env}` properties are left alone and never reach the
/// resolver. Secrets are resolved concurrently.
pub async fn resolve_entry_secrets(
    entry: &ConnectionConfigEntry,
    resolver: &dyn SecretResolver,
) -> ConnectionConfigEntry {
    let mut properties = BTreeMap::new();
    let mut pending = Vec::new();

    for (property, value) in &entry.properties {
        match value.as_secret_key() {
            Some(key) => pending.push(async move {
                let resolved = match resolver.resolve(key).await {
                    Ok(resolved) => resolved,
                    Err(e) => {
                        warn!(property = %property, error = %e, "Failed to resolve secret");
                        None
                    }
                };
                (property, resolved)
            }),
            None => {
                properties.insert(property.clone(), value.clone());
            }
        }
    }

    for (property, resolved) in futures::future::join_all(pending).await {
        match resolved {
            Some(secret) => {
                properties.insert(property.clone(), ConfigValue::literal(secret));
            }
            None => debug!(property = %property, "Secret unset, omitting property"),
        }
    }

    ConnectionConfigEntry {
        kind: entry.kind.clone(),
        properties,
    }
}
