use crate::connection::{Connection, LookupConnection};
use async_trait::async_trait;
use malloy_conn_core::Result;
use std::sync::Arc;
use tracing::debug;

/// Try `primary`, fall back to `secondary` on any primary failure.
///
/// The two are awaited strictly in sequence. When both fail the secondary's
/// error is returned unchanged and the primary's is dropped.
pub struct MergedConnectionLookup {
    primary: Arc<dyn LookupConnection>,
    secondary: Arc<dyn LookupConnection>,
}

impl MergedConnectionLookup {
    pub fn new(primary: Arc<dyn LookupConnection>, secondary: Arc<dyn LookupConnection>) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl LookupConnection for MergedConnectionLookup {
    async fn lookup_connection(&self, name: &str) -> Result<Arc<dyn Connection>> {
        match self.primary.lookup_connection(name).await {
            Ok(connection) => Ok(connection),
            Err(e) => {
                debug!(name = %name, error = %e, "Primary lookup failed, trying fallback");
                self.secondary.lookup_connection(name).await
            }
        }
    }
}
