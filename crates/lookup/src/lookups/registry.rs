use crate::connection::{Connection, LookupConnection};
use crate::factory::ConnectionFactory;
use async_trait::async_trait;
use malloy_conn_core::{ConfigDocument, ConnectionOptions, Error, Result};
use std::sync::Arc;
use tracing::debug;

/// Lookup that hands document entries to the factory as written
pub struct RegistryConnectionLookup {
    document: Arc<ConfigDocument>,
    factory: Arc<dyn ConnectionFactory>,
    options: ConnectionOptions,
}

impl RegistryConnectionLookup {
    pub fn new(
        document: Arc<ConfigDocument>,
        factory: Arc<dyn ConnectionFactory>,
        options: ConnectionOptions,
    ) -> Self {
        Self {
            document,
            factory,
            options,
        }
    }
}

#[async_trait]
impl LookupConnection for RegistryConnectionLookup {
    async fn lookup_connection(&self, name: &str) -> Result<Arc<dyn Connection>> {
        let entry = self.document.get(name).ok_or_else(|| Error::not_found(name))?;
        debug!(name = %name, kind = %entry.kind, "Creating connection");
        self.factory.create(name, entry, &self.options).await
    }
}
