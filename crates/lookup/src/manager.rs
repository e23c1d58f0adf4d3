//! Connection manager
//!
//! The manager owns everything that changes over an editing session: the
//! settings document, the per-directory configuration cache, the secret
//! resolver, the workspace roots and the mode flags. `resolve` turns a target
//! file into the lookup governing it:
//!
//! | mode | project file found | route |
//! |---|---|---|
//! | project-only | yes | project lookup alone |
//! | project-only | no | every name rejected |
//! | default | yes | project, falling back to settings |
//! | default | no, or malformed | settings |
//!
//! Registered defaults live in the settings layer only, so a project file never
//! shadows a settings entry it does not define. Only `set_connections_config`
//! invalidates caches; the other setters take effect for lookups materialised
//! afterwards.

use crate::cache::{CacheStats, ConfigCache, ConfigCacheEntry};
use crate::connection::LookupConnection;
use crate::factory::ConnectionFactory;
use crate::lookups::{
    MergedConnectionLookup, ProjectOnlyLookup, RegistryConnectionLookup,
    SettingsConnectionLookup,
};
use crate::secrets::SecretResolver;
use malloy_conn_config::{merge_with_defaults, parse};
use malloy_conn_core::{ConfigDocument, ConnectionOptions, DiscoveryResult, Result, RowLimit};
use parking_lot::RwLock;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Which configuration sources a resolved lookup consults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupRoute {
    /// The project configuration file only
    Project,
    /// The project configuration file, then settings
    Merged,
    /// Settings and registered defaults only
    Settings,
    /// Project-only mode without a project configuration file
    ProjectOnlyViolation,
}

impl fmt::Display for LookupRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LookupRoute::Project => "project",
            LookupRoute::Merged => "project+settings",
            LookupRoute::Settings => "settings",
            LookupRoute::ProjectOnlyViolation => "project-only (no project configuration)",
        };
        f.write_str(label)
    }
}

/// A lookup together with how it was chosen
pub struct ResolvedLookup {
    pub route: LookupRoute,
    /// Directory of the project configuration in use, if any
    pub config_dir: Option<PathBuf>,
    pub lookup: Arc<dyn LookupConnection>,
}

impl fmt::Debug for ResolvedLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedLookup")
            .field("route", &self.route)
            .field("config_dir", &self.config_dir)
            .finish_non_exhaustive()
    }
}

/// Settings merged with defaults, captured with the resolver current at the time
#[derive(Clone)]
struct SettingsLayer {
    document: Arc<ConfigDocument>,
    resolver: Option<Arc<dyn SecretResolver>>,
}

pub struct ConnectionManager {
    factory: Arc<dyn ConnectionFactory>,
    cache: ConfigCache,
    settings: RwLock<Arc<ConfigDocument>>,
    settings_layer: RwLock<Option<SettingsLayer>>,
    secret_resolver: RwLock<Option<Arc<dyn SecretResolver>>>,
    workspace_roots: RwLock<Vec<Url>>,
    global_config_dir: RwLock<Option<String>>,
    project_connections_only: AtomicBool,
    row_limit: RowLimit,
}

impl ConnectionManager {
    pub fn new(factory: Arc<dyn ConnectionFactory>) -> Self {
        Self {
            factory,
            cache: ConfigCache::new(),
            settings: RwLock::new(Arc::new(ConfigDocument::new())),
            settings_layer: RwLock::new(None),
            secret_resolver: RwLock::new(None),
            workspace_roots: RwLock::new(Vec::new()),
            global_config_dir: RwLock::new(None),
            project_connections_only: AtomicBool::new(false),
            row_limit: RowLimit::default(),
        }
    }

    /// The lookup governing connections referenced from `file`
    pub async fn get_connection_lookup(&self, file: &Url) -> Result<Arc<dyn LookupConnection>> {
        Ok(self.resolve(file).await?.lookup)
    }

    /// Like [`get_connection_lookup`](Self::get_connection_lookup), also reporting
    /// the route taken.
    ///
    /// Only fails in project-only mode, when the project configuration exists but
    /// cannot be parsed.
    pub async fn resolve(&self, file: &Url) -> Result<ResolvedLookup> {
        let roots = self.workspace_roots.read().clone();

        if self.project_connections_only() {
            let found = match self.factory.discovery() {
                Some(discovery) => discovery.find(file, &roots, None).await,
                None => None,
            };
            let Some(found) = found else {
                debug!(file = %file, "No project configuration in project-only mode");
                return Ok(ResolvedLookup {
                    route: LookupRoute::ProjectOnlyViolation,
                    config_dir: None,
                    lookup: Arc::new(ProjectOnlyLookup),
                });
            };
            let entry = self.project_entry(&found)?;
            return Ok(ResolvedLookup {
                route: LookupRoute::Project,
                config_dir: Some(found.config_dir),
                lookup: Arc::clone(&entry.lookup),
            });
        }

        let settings_lookup = self.settings_lookup(self.factory.working_directory(file));
        let settings_only = ResolvedLookup {
            route: LookupRoute::Settings,
            config_dir: None,
            lookup: Arc::clone(&settings_lookup),
        };

        let Some(discovery) = self.factory.discovery() else {
            return Ok(settings_only);
        };
        let global = self.global_config_dir.read().clone();
        let Some(found) = discovery.find(file, &roots, global.as_deref()).await else {
            debug!(file = %file, "No project configuration, using settings");
            return Ok(settings_only);
        };

        match self.project_entry(&found) {
            Ok(entry) => Ok(ResolvedLookup {
                route: LookupRoute::Merged,
                config_dir: Some(found.config_dir),
                lookup: Arc::new(MergedConnectionLookup::new(
                    Arc::clone(&entry.lookup),
                    settings_lookup,
                )),
            }),
            Err(e) => {
                warn!(
                    dir = %found.config_dir.display(),
                    error = %e,
                    "Ignoring malformed project configuration"
                );
                Ok(settings_only)
            }
        }
    }

    /// Parse and cache the discovered project configuration
    fn project_entry(&self, found: &DiscoveryResult) -> Result<Arc<ConfigCacheEntry>> {
        self.cache.get_or_build(found, |text| {
            let document = Arc::new(parse(text)?);
            let options = ConnectionOptions {
                row_limit: self.row_limit.clone(),
                working_directory: Some(found.config_dir.clone()),
            };
            let lookup: Arc<dyn LookupConnection> = Arc::new(RegistryConnectionLookup::new(
                Arc::clone(&document),
                Arc::clone(&self.factory),
                options,
            ));
            debug!(
                dir = %found.config_dir.display(),
                connections = document.len(),
                "Parsed project configuration"
            );
            Ok((document, lookup))
        })
    }

    /// The settings layer, merged with defaults on first use
    fn settings_layer(&self) -> SettingsLayer {
        if let Some(layer) = self.settings_layer.read().as_ref() {
            return layer.clone();
        }

        let mut slot = self.settings_layer.write();
        let layer = slot.get_or_insert_with(|| {
            let kinds = self.factory.registered_kinds();
            debug!(kinds = kinds.len(), "Materialising settings layer");
            SettingsLayer {
                document: Arc::new(merge_with_defaults(&self.settings.read(), &kinds)),
                resolver: self.secret_resolver.read().clone(),
            }
        });
        layer.clone()
    }

    /// The settings-based lookup for a working directory
    fn settings_lookup(&self, working_directory: Option<PathBuf>) -> Arc<dyn LookupConnection> {
        let SettingsLayer { document, resolver } = self.settings_layer();
        let options = ConnectionOptions {
            row_limit: self.row_limit.clone(),
            working_directory,
        };
        match resolver {
            Some(resolver) => Arc::new(SettingsConnectionLookup::new(
                document,
                resolver,
                Arc::clone(&self.factory),
                options,
            )),
            None => Arc::new(RegistryConnectionLookup::new(
                document,
                Arc::clone(&self.factory),
                options,
            )),
        }
    }

    /// Replace the settings document, dropping every cache and every live
    /// connection the factory holds
    pub fn set_connections_config(&self, document: ConfigDocument) {
        info!(connections = document.len(), "Connections configuration replaced");
        *self.settings.write() = Arc::new(document);
        self.cache.clear();
        *self.settings_layer.write() = None;
        self.factory.reset();
    }

    /// Drop parsed project configuration; settings are kept
    pub fn clear_config_caches(&self) {
        debug!(entries = self.cache.len(), "Clearing configuration caches");
        self.cache.clear();
    }

    pub fn set_secret_resolver(&self, resolver: Option<Arc<dyn SecretResolver>>) {
        *self.secret_resolver.write() = resolver;
    }

    pub fn set_project_connections_only(&self, enabled: bool) {
        self.project_connections_only.store(enabled, Ordering::SeqCst);
    }

    pub fn set_workspace_roots(&self, roots: Vec<Url>) {
        *self.workspace_roots.write() = roots;
    }

    pub fn set_global_config_directory(&self, dir: Option<String>) {
        *self.global_config_dir.write() = dir;
    }

    pub fn set_current_row_limit(&self, limit: u64) {
        self.row_limit.set(limit);
    }

    pub fn project_connections_only(&self) -> bool {
        self.project_connections_only.load(Ordering::SeqCst)
    }

    pub fn current_row_limit(&self) -> u64 {
        self.row_limit.get()
    }

    pub fn settings_document(&self) -> Arc<ConfigDocument> {
        self.settings.read().clone()
    }

    /// The settings document as lookups see it, defaults included
    pub fn effective_settings_document(&self) -> ConfigDocument {
        merge_with_defaults(&self.settings.read(), &self.factory.registered_kinds())
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
