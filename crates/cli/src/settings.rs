//! Host settings for the `malloy-conn` tool
//!
//! Settings stand in for an editor's configuration: the connections defined
//! outside any project, workspace roots and the mode flags. They are read from
//! a JSON file (`<config dir>/malloy/settings.json` unless `--settings` is given)
//! and command-line flags override them.

use malloy_conn_core::{ConfigDocument, Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default settings file location
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("malloy").join("settings.json"))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostSettings {
    /// Parsed separately from the same JSON object
    #[serde(skip)]
    pub connections: ConfigDocument,
    pub workspace_roots: Vec<PathBuf>,
    pub global_config_directory: Option<String>,
    pub project_connections_only: bool,
    pub row_limit: Option<u64>,
    /// Command line used to resolve `secretKey` references, key appended
    pub secret_command: Vec<String>,
}

impl HostSettings {
    /// Parse settings JSON. `origin` labels parse errors.
    pub fn from_json_str(origin: &str, text: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| Error::parse_json(origin, e))?;
        let mut settings: HostSettings =
            serde_json::from_value(value.clone()).map_err(|e| Error::parse_json(origin, e))?;
        settings.connections = ConfigDocument::from_json(origin, value)?;
        Ok(settings)
    }

    /// Load settings from `path`, or from the default location.
    ///
    /// An explicit path must exist; a missing default file yields empty settings.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match default_settings_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        match std::fs::read_to_string(&path) {
            Ok(text) => {
                debug!(path = %path.display(), "Loaded settings");
                Self::from_json_str(&path.display().to_string(), &text)
            }
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No settings file");
                Ok(Self::default())
            }
            Err(e) => Err(Error::file_system(path, "read", e)),
        }
    }
}
