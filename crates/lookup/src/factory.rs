//! The connection factory capability consumed by lookups and the manager

use crate::connection::Connection;
use async_trait::async_trait;
use malloy_conn_config::ConfigDiscovery;
use malloy_conn_core::{ConnectionConfigEntry, ConnectionOptions, Result};
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

/// Builds live connections from resolved entries.
///
/// Implementations own the lifecycle of everything they create, including any
/// memoisation of live connections; `reset` drops those.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// Create a connection for `name` from a fully resolved entry.
    ///
    /// `options.row_limit` should be read here, not captured earlier.
    async fn create(
        &self,
        name: &str,
        entry: &ConnectionConfigEntry,
        options: &ConnectionOptions,
    ) -> Result<Arc<dyn Connection>>;

    /// Invalidate any cached live connections
    fn reset(&self);

    /// Backend kinds known well enough to synthesize zero-config defaults
    fn registered_kinds(&self) -> Vec<String>;

    /// Working directory for connections serving `file`
    fn working_directory(&self, file: &Url) -> Option<PathBuf> {
        file.to_file_path()
            .ok()
            .and_then(|path| path.parent().map(|dir| dir.to_path_buf()))
    }

    /// Project configuration discovery, if this factory can see a filesystem.
    ///
    /// Returning `None` routes every resolution to settings-based connections.
    fn discovery(&self) -> Option<&dyn ConfigDiscovery> {
        None
    }
}
