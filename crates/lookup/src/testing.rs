//! Recording fakes shared by the unit tests

use crate::connection::{Connection, LookupConnection};
use crate::factory::ConnectionFactory;
use crate::secrets::SecretResolver;
use async_trait::async_trait;
use malloy_conn_config::discovery::owning_root;
use malloy_conn_config::ConfigDiscovery;
use malloy_conn_core::{
    ConnectionConfigEntry, ConnectionOptions, DiscoveryResult, Error, Result,
};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

#[derive(Debug)]
pub struct StubConnection {
    pub name: String,
    pub entry: ConnectionConfigEntry,
    pub row_limit: u64,
    pub working_directory: Option<PathBuf>,
}

impl StubConnection {
    pub fn downcast(connection: &Arc<dyn Connection>) -> &StubConnection {
        connection
            .as_any()
            .downcast_ref::<StubConnection>()
            .expect("connection built by a stub")
    }
}

impl Connection for StubConnection {
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

/// Discovery over an in-memory map of root directory to config text
#[derive(Default)]
pub struct StaticDiscovery {
    configs: Mutex<HashMap<PathBuf, String>>,
    globals_seen: Mutex<Vec<Option<String>>>,
    finds: AtomicUsize,
}

impl StaticDiscovery {
    pub fn set_config(&self, dir: impl Into<PathBuf>, text: &str) {
        self.configs.lock().insert(dir.into(), text.to_string());
    }

    pub fn globals_seen(&self) -> Vec<Option<String>> {
        self.globals_seen.lock().clone()
    }

    pub fn find_count(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigDiscovery for StaticDiscovery {
    async fn find(
        &self,
        file: &Url,
        workspace_roots: &[Url],
        global_config_dir: Option<&str>,
    ) -> Option<DiscoveryResult> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.globals_seen
            .lock()
            .push(global_config_dir.map(str::to_string));

        let file_dir = file.to_file_path().ok()?.parent()?.to_path_buf();
        let roots: Vec<PathBuf> = workspace_roots
            .iter()
            .filter_map(|root| root.to_file_path().ok())
            .collect();
        let root = owning_root(&file_dir, &roots);

        let configs = self.configs.lock();
        if let Some(text) = configs.get(&root) {
            return Some(DiscoveryResult {
                config_text: text.clone(),
                config_dir: root,
            });
        }
        let global = PathBuf::from(global_config_dir.filter(|dir| !dir.is_empty())?);
        configs.get(&global).map(|text| DiscoveryResult {
            config_text: text.clone(),
            config_dir: global,
        })
    }
}

pub struct StubFactory {
    kinds: Vec<String>,
    failing: HashSet<String>,
    discovery: Option<Arc<StaticDiscovery>>,
    creates: AtomicUsize,
    resets: AtomicUsize,
    kinds_calls: AtomicUsize,
}

impl StubFactory {
    pub fn new() -> Self {
        Self {
            kinds: vec!["duckdb".to_string(), "postgres".to_string()],
            failing: HashSet::new(),
            discovery: None,
            creates: AtomicUsize::new(0),
            resets: AtomicUsize::new(0),
            kinds_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_discovery(mut self, discovery: Arc<StaticDiscovery>) -> Self {
        self.discovery = Some(discovery);
        self
    }

    pub fn failing_kind(mut self, kind: &str) -> Self {
        self.failing.insert(kind.to_string());
        self
    }

    pub fn create_count(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn reset_count(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }

    pub fn kinds_calls(&self) -> usize {
        self.kinds_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionFactory for StubFactory {
    async fn create(
        &self,
        name: &str,
        entry: &ConnectionConfigEntry,
        options: &ConnectionOptions,
    ) -> Result<Arc<dyn Connection>> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&entry.kind) {
            return Err(Error::factory(&entry.kind, format!("cannot open {name}")));
        }
        Ok(Arc::new(StubConnection {
            name: name.to_string(),
            entry: entry.clone(),
            row_limit: options.row_limit.get(),
            working_directory: options.working_directory.clone(),
        }))
    }

    fn reset(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }

    fn registered_kinds(&self) -> Vec<String> {
        self.kinds_calls.fetch_add(1, Ordering::SeqCst);
        self.kinds.clone()
    }

    fn discovery(&self) -> Option<&dyn ConfigDiscovery> {
        self.discovery
            .as_deref()
            .map(|discovery| discovery as &dyn ConfigDiscovery)
    }
}

pub struct MapResolver {
    values: HashMap<String, String>,
    fail: bool,
    requested: Mutex<Vec<String>>,
}

impl MapResolver {
    pub fn new<'a>(values: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            fail: false,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new([] as [(&str, &str); 0])
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().clone()
    }
}

#[async_trait]
impl SecretResolver for MapResolver {
    async fn resolve(&self, key: &str) -> Result<Option<String>> {
        self.requested.lock().push(key.to_string());
        if self.fail {
            return Err(Error::secret_resolution(key, "store unavailable"));
        }
        Ok(self.values.get(key).cloned())
    }
}

type FailureFn = Box<dyn Fn(&str) -> Error + Send + Sync>;

/// Lookup with a fixed outcome per name, counting calls
pub struct ScriptedLookup {
    label: String,
    served: HashSet<String>,
    failure: Option<FailureFn>,
    calls: AtomicUsize,
}

impl ScriptedLookup {
    /// Serve `names` as connections of kind `label`; anything else is NotFound
    pub fn serving<'a>(label: &str, names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            label: label.to_string(),
            served: names.into_iter().map(str::to_string).collect(),
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(failure: impl Fn(&str) -> Error + Send + Sync + 'static) -> Self {
        Self {
            label: String::new(),
            served: HashSet::new(),
            failure: Some(Box::new(failure)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LookupConnection for ScriptedLookup {
    async fn lookup_connection(&self, name: &str) -> Result<Arc<dyn Connection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = &self.failure {
            return Err(failure(name));
        }
        if !self.served.contains(name) {
            return Err(Error::not_found(name));
        }
        Ok(Arc::new(StubConnection {
            name: name.to_string(),
            entry: ConnectionConfigEntry::new(self.label.clone()),
            row_limit: 0,
            working_directory: None,
        }))
    }
}
