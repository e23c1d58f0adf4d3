use super::{file_url, Session};
use crate::factory::DescribedConnection;
use eyre::Result;
use malloy_conn_lookup::ResolvedLookup;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolutionReport {
    route: String,
    config_dir: Option<String>,
    connections: Vec<ConnectionReport>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ConnectionReport {
    Resolved(DescribedConnection),
    Failed { name: String, error: String },
}

pub async fn execute(session: &Session, file: &Path, names: &[String], json: bool) -> Result<()> {
    let url = file_url(file)?;
    let resolved = session.manager.resolve(&url).await?;
    let report = build_report(&resolved, names).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

async fn build_report(resolved: &ResolvedLookup, names: &[String]) -> ResolutionReport {
    let mut connections = Vec::with_capacity(names.len());
    for name in names {
        let report = match resolved.lookup.lookup_connection(name).await {
            Ok(connection) => match connection.as_any().downcast_ref::<DescribedConnection>() {
                Some(described) => ConnectionReport::Resolved(described.clone()),
                None => ConnectionReport::Failed {
                    name: name.clone(),
                    error: format!("unexpected connection type for '{}'", connection.kind()),
                },
            },
            Err(e) => ConnectionReport::Failed {
                name: name.clone(),
                error: e.to_string(),
            },
        };
        connections.push(report);
    }

    ResolutionReport {
        route: resolved.route.to_string(),
        config_dir: resolved
            .config_dir
            .as_ref()
            .map(|dir| dir.display().to_string()),
        connections,
    }
}

fn print_report(report: &ResolutionReport) {
    println!("route: {}", report.route);
    if let Some(dir) = &report.config_dir {
        println!("config: {dir}");
    }
    for connection in &report.connections {
        match connection {
            ConnectionReport::Resolved(described) => {
                println!("{} ({})", described.name, described.kind);
                for (property, value) in &described.properties {
                    println!("  {property} = {value}");
                }
                println!("  rowLimit = {}", described.row_limit);
            }
            ConnectionReport::Failed { name, error } => {
                println!("{name}: error: {error}");
            }
        }
    }
}
