use crate::connection::{Connection, LookupConnection};
use crate::factory::ConnectionFactory;
use crate::secrets::{resolve_entry_secrets, SecretResolver};
use async_trait::async_trait;
use malloy_conn_core::{ConfigDocument, ConnectionOptions, Error, Result};
use std::sync::Arc;
use tracing::debug;

/// Lookup over the settings document that resolves `{secretKey}` properties
/// through a [`SecretResolver`] before handing the entry to the factory.
///
/// Resolution happens on every lookup; nothing is cached here.
pub struct SettingsConnectionLookup {
    document: Arc<ConfigDocument>,
    resolver: Arc<dyn SecretResolver>,
    factory: Arc<dyn ConnectionFactory>,
    options: ConnectionOptions,
}

impl SettingsConnectionLookup {
    pub fn new(
        document: Arc<ConfigDocument>,
        resolver: Arc<dyn SecretResolver>,
        factory: Arc<dyn ConnectionFactory>,
        options: ConnectionOptions,
    ) -> Self {
        Self {
            document,
            resolver,
            factory,
            options,
        }
    }
}

#[async_trait]
impl LookupConnection for SettingsConnectionLookup {
    async fn lookup_connection(&self, name: &str) -> Result<Arc<dyn Connection>> {
        let entry = self.document.get(name).ok_or_else(|| Error::not_found(name))?;
        let resolved = resolve_entry_secrets(entry, self.resolver.as_ref()).await;
        debug!(
            name = %name,
            kind = %resolved.kind,
            properties = resolved.properties.len(),
            "Creating settings connection"
        );
        self.factory.create(name, &resolved, &self.options).await
    }
}
