use crate::factory::DescriptorFactory;
use crate::secrets::{ChainResolver, CommandResolver, EnvSecretResolver};
use crate::settings::HostSettings;
use clap::Subcommand;
use eyre::{eyre, Result, WrapErr};
use malloy_conn_config::ConfigDiscovery;
use malloy_conn_lookup::{ConnectionFactory, ConnectionManager};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

pub mod discover;
pub mod resolve;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show which project configuration file governs a document
    Discover {
        /// Malloy document to resolve for
        file: PathBuf,
    },

    /// Resolve connections the way the compiler would for a document
    #[command(visible_alias = "r")]
    Resolve {
        /// Malloy document to resolve for
        file: PathBuf,

        /// Connection names to look up
        names: Vec<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List the registered backend kinds
    Kinds,

    /// Print the settings connections with built-in defaults merged in
    Defaults,
}

/// Everything a command needs, assembled from settings and flags
pub struct Session {
    pub manager: ConnectionManager,
    pub factory: Arc<DescriptorFactory>,
    pub workspace_roots: Vec<Url>,
    pub global_config_dir: Option<String>,
}

impl Session {
    /// Configure a manager from host settings
    pub fn new(settings: HostSettings) -> Result<Self> {
        let factory = Arc::new(DescriptorFactory::new());
        let manager = ConnectionManager::new(factory.clone());

        let workspace_roots = settings
            .workspace_roots
            .iter()
            .map(|root| directory_url(root))
            .collect::<Result<Vec<_>>>()?;

        let mut resolver = ChainResolver::new().with(Arc::new(EnvSecretResolver::new()));
        if !settings.secret_command.is_empty() {
            resolver = resolver.with(Arc::new(CommandResolver::from_command_line(
                &settings.secret_command,
            )?));
        }

        manager.set_connections_config(settings.connections);
        manager.set_workspace_roots(workspace_roots.clone());
        manager.set_global_config_directory(settings.global_config_directory.clone());
        manager.set_project_connections_only(settings.project_connections_only);
        manager.set_secret_resolver(Some(Arc::new(resolver)));
        if let Some(limit) = settings.row_limit {
            manager.set_current_row_limit(limit);
        }

        Ok(Self {
            manager,
            factory,
            workspace_roots,
            global_config_dir: settings.global_config_directory,
        })
    }

    /// The discovery capability of this session's factory
    pub fn discovery(&self) -> Result<&dyn ConfigDiscovery> {
        self.factory
            .discovery()
            .ok_or_else(|| eyre!("connection factory has no configuration discovery"))
    }
}

impl Commands {
    pub async fn execute(self, session: &Session) -> Result<()> {
        match self {
            Commands::Discover { file } => discover::execute(session, &file).await,
            Commands::Resolve { file, names, json } => {
                resolve::execute(session, &file, &names, json).await
            }
            Commands::Kinds => {
                for kind in session.factory.registered_kinds() {
                    println!("{kind}");
                }
                Ok(())
            }
            Commands::Defaults => {
                let document = session.manager.effective_settings_document();
                println!("{}", serde_json::to_string_pretty(&document)?);
                Ok(())
            }
        }
    }
}

/// `file://` URL for a document path, made absolute against the current directory
pub fn file_url(path: &Path) -> Result<Url> {
    let absolute = absolute(path)?;
    Url::from_file_path(&absolute).map_err(|()| eyre!("not a valid file path: {}", absolute.display()))
}

/// `file://` URL for a directory path, made absolute against the current directory
pub fn directory_url(path: &Path) -> Result<Url> {
    let absolute = absolute(path)?;
    Url::from_directory_path(&absolute)
        .map_err(|()| eyre!("not a valid directory path: {}", absolute.display()))
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().wrap_err("failed to determine current directory")?;
    Ok(cwd.join(path))
}
