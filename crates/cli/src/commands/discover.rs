use super::{file_url, Session};
use eyre::Result;
use std::path::Path;

/// Print the directory of the configuration file governing `file`, or `none`
pub async fn execute(session: &Session, file: &Path) -> Result<()> {
    let url = file_url(file)?;
    let global = if session.manager.project_connections_only() {
        None
    } else {
        session.global_config_dir.as_deref()
    };

    match session
        .discovery()?
        .find(&url, &session.workspace_roots, global)
        .await
    {
        Some(found) => println!("{}", found.config_dir.display()),
        None => println!("none"),
    }
    Ok(())
}
