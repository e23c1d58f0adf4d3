//! Project configuration discovery
//!
//! Discovery is total: every failure (unreadable file, permission error, a URL
//! that is not a local file) folds into "absent". The configuration file is
//! looked for exactly at the owning workspace root, never in the directories in
//! between, and then in the global configuration directory if one is given.

use async_trait::async_trait;
use malloy_conn_core::{DiscoveryResult, CONFIG_FILENAME};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use url::Url;

/// Locates the project configuration governing a target file
#[async_trait]
pub trait ConfigDiscovery: Send + Sync {
    /// Find the configuration for `file`.
    ///
    /// `global_config_dir` may start with `~`. `None` or an empty string disables
    /// the global fallback.
    async fn find(
        &self,
        file: &Url,
        workspace_roots: &[Url],
        global_config_dir: Option<&str>,
    ) -> Option<DiscoveryResult>;
}

/// Discovery backed by the local filesystem
#[derive(Debug, Clone)]
pub struct FsConfigDiscovery {
    file_name: String,
}

impl FsConfigDiscovery {
    pub fn new() -> Self {
        Self::with_file_name(CONFIG_FILENAME)
    }

    /// Look for a differently named configuration file
    pub fn with_file_name(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    async fn read_config(&self, dir: &Path) -> Option<DiscoveryResult> {
        let candidate = dir.join(&self.file_name);
        match tokio::fs::read_to_string(&candidate).await {
            Ok(config_text) => {
                debug!(path = %candidate.display(), "Found project configuration");
                Some(DiscoveryResult {
                    config_text,
                    config_dir: dir.to_path_buf(),
                })
            }
            Err(e) => {
                trace!(path = %candidate.display(), error = %e, "No configuration");
                None
            }
        }
    }
}

impl Default for FsConfigDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigDiscovery for FsConfigDiscovery {
    async fn find(
        &self,
        file: &Url,
        workspace_roots: &[Url],
        global_config_dir: Option<&str>,
    ) -> Option<DiscoveryResult> {
        let Ok(file_path) = file.to_file_path() else {
            trace!(url = %file, "Not a local file, skipping discovery");
            return None;
        };
        let file_dir = file_path.parent()?.to_path_buf();

        let roots: Vec<PathBuf> = workspace_roots
            .iter()
            .filter_map(|root| root.to_file_path().ok())
            .collect();
        let root = owning_root(&file_dir, &roots);

        if let Some(found) = self.read_config(&root).await {
            return Some(found);
        }

        let global = global_config_dir.filter(|dir| !dir.is_empty())?;
        self.read_config(&expand_home(global)).await
    }
}

/// The first workspace root containing `file_dir`, else `file_dir` itself.
///
/// Containment is checked per path component, so `/proj` does not own
/// `/project/src`.
pub fn owning_root(file_dir: &Path, workspace_roots: &[PathBuf]) -> PathBuf {
    workspace_roots
        .iter()
        .find(|root| file_dir.starts_with(root))
        .cloned()
        .unwrap_or_else(|| file_dir.to_path_buf())
}

/// Expand a leading `~` to the home directory
pub fn expand_home(dir: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(dir).into_owned())
}
