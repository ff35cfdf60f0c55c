//! Command handlers.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

use opsmgr_client::OpsClient;
use opsmgr_core::{ConnectionSettings, QueryRequest};

use crate::cli::{Cli, Commands};

pub async fn handle(cli: Cli) -> Result<()> {
    let settings = ConnectionSettings::new(&cli.url, &cli.username, &cli.password)
        .context("invalid connection settings")?
        .with_skip_tls_verify(cli.insecure);

    match cli.command {
        Commands::Health => {
            let status = OpsClient::check_health(&settings).await;
            if status.ok {
                println!("{} {}", "ok".green().bold(), status.message);
            } else {
                println!("{} {}", "error".red().bold(), status.message);
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Classes { filter } => {
            let client = OpsClient::connect(settings).await?;
            print_json(&client.get_classes(&filter).await?)
        }
        Commands::Objects { class, ids } => {
            let client = OpsClient::connect(settings).await?;
            match class {
                Some(class) => print_json(&client.get_objects_by_class(&class).await?),
                None => print_json(&client.get_objects(&ids).await?),
            }
        }
        Commands::Counters { ids } => {
            let client = OpsClient::connect(settings).await?;
            print_json(&client.get_performance_counters(&ids).await?)
        }
        Commands::Groups => {
            let client = OpsClient::connect(settings).await?;
            print_json(&client.get_groups().await?)
        }
        Commands::GroupMembers { group, class } => {
            let client = OpsClient::connect(settings).await?;
            print_json(&client.get_state(&group, &class).await?.rows)
        }
        Commands::Alerts { criteria } => {
            let client = OpsClient::connect(settings).await?;
            let criteria = if criteria.trim().is_empty() {
                opsmgr_core::query::DEFAULT_ALERT_CRITERIA
            } else {
                criteria.trim()
            };
            print_json(&client.get_alerts(criteria).await?.rows)
        }
        Commands::Query { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let requests: Vec<QueryRequest> =
                serde_json::from_str(&raw).context("parsing query batch")?;

            let client = OpsClient::connect(settings).await?;
            tracing::debug!(queries = requests.len(), "running query batch");
            let responses = client.run_queries(requests).await;

            let mut refs: Vec<&String> = responses.keys().collect();
            refs.sort();
            for ref_id in refs {
                let response = &responses[ref_id];
                match &response.error {
                    None => println!("{} {}", ref_id.green().bold(), summarize(response)),
                    Some(error) => println!("{} {}", ref_id.red().bold(), error),
                }
            }
            Ok(())
        }
    }
}

fn summarize(response: &opsmgr_client::QueryResponse) -> String {
    let frames = response.frames.len();
    let rows: usize = response.frames.iter().map(|frame| frame.row_count()).sum();
    format!("{frames} frame(s), {rows} row(s)")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
