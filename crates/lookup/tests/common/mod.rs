//! Shared fixtures for the lookup integration tests

use async_trait::async_trait;
use malloy_conn_config::{ConfigDiscovery, FsConfigDiscovery};
use malloy_conn_core::{ConnectionConfigEntry, ConnectionOptions, Result};
use malloy_conn_lookup::{Connection, ConnectionFactory};
use std::any::Any;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
pub struct RecordedConnection {
    pub name: String,
    pub entry: ConnectionConfigEntry,
    pub working_directory: Option<PathBuf>,
}

impl Connection for RecordedConnection {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        &self.entry.kind
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Factory with real filesystem discovery that records what it creates
pub struct FsFactory {
    discovery: FsConfigDiscovery,
    pub creates: AtomicUsize,
}

impl FsFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            discovery: FsConfigDiscovery::new(),
            creates: AtomicUsize::new(0),
        })
    }

    pub fn create_count(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionFactory for FsFactory {
    async fn create(
        &self,
        name: &str,
        entry: &ConnectionConfigEntry,
        options: &ConnectionOptions,
    ) -> Result<Arc<dyn Connection>> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(RecordedConnection {
            name: name.to_string(),
            entry: entry.clone(),
            working_directory: options.working_directory.clone(),
        }))
    }

    fn reset(&self) {}

    fn registered_kinds(&self) -> Vec<String> {
        vec!["duckdb".to_string(), "bigquery".to_string()]
    }

    fn discovery(&self) -> Option<&dyn ConfigDiscovery> {
        Some(&self.discovery)
    }
}

pub fn recorded(connection: &Arc<dyn Connection>) -> &RecordedConnection {
    connection
        .as_any()
        .downcast_ref::<RecordedConnection>()
        .expect("connection created by FsFactory")
}
