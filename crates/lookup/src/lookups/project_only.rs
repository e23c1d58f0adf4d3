use crate::connection::{Connection, LookupConnection};
use async_trait::async_trait;
use malloy_conn_core::{Error, Result};
use std::sync::Arc;

/// Lookup returned in project-only mode when no project configuration exists.
/// Every name is refused; there is no fallback.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProjectOnlyLookup;

#[async_trait]
impl LookupConnection for ProjectOnlyLookup {
    async fn lookup_connection(&self, name: &str) -> Result<Arc<dyn Connection>> {
        Err(Error::project_only_violation(name))
    }
}
