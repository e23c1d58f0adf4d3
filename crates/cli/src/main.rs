use clap::Parser;
use malloy_conn::commands::{Commands, Session};
use malloy_conn::{logging, HostSettings};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "malloy-conn")]
#[command(about = "Inspect how Malloy documents resolve their database connections", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (defaults to <config dir>/malloy/settings.json)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Workspace root; may be given several times and replaces the settings value
    #[arg(long = "workspace-root", global = true)]
    workspace_roots: Vec<PathBuf>,

    /// Directory searched for a global malloy-config.json
    #[arg(long, global = true)]
    global_config_dir: Option<String>,

    /// Only allow connections from the project configuration file
    #[arg(long, global = true)]
    project_only: bool,

    /// Row limit handed to created connections
    #[arg(long, global = true)]
    row_limit: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Command-line flags take precedence over the settings file
    fn apply_overrides(&self, settings: &mut HostSettings) {
        if !self.workspace_roots.is_empty() {
            settings.workspace_roots = self.workspace_roots.clone();
        }
        if let Some(dir) = &self.global_config_dir {
            settings.global_config_directory = Some(dir.clone());
        }
        if self.project_only {
            settings.project_connections_only = true;
        }
        if let Some(limit) = self.row_limit {
            settings.row_limit = Some(limit);
        }
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    logging::init().map_err(|e| eyre::eyre!("failed to initialize logging: {e}"))?;

    let cli = Cli::parse();
    let mut settings = HostSettings::load(cli.settings.as_deref())?;
    cli.apply_overrides(&mut settings);

    let session = Session::new(settings)?;
    cli.command.execute(&session).await
}
