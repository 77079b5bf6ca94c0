//! Command-line entry point: MCP stdio server plus one-shot tool calls.

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use lifetracker::config::{ConfigLoadOptions, LifeTrackerConfig};
use lifetracker::{Backend, LifeTrackerServer, Service};
use log::{debug, info};
use serde_json::{Value, json};
use std::path::PathBuf;

/// Command-line options for the LifeTracker server.
#[derive(Parser)]
#[command(name = "lifetracker", version)]
struct Cli {
    /// Optional path to a lifetracker.json5 config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Table store backend
    #[arg(long, global = true, value_enum, default_value_t = Backend::default_for_build())]
    backend: Backend,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the MCP server over stdio
    Serve,
    /// Print the tool catalogue as JSON
    Tools,
    /// Run one tool and print its response envelope
    Call {
        /// Tool name, e.g. get_activity_logs
        tool: String,
        /// JSON object of tool arguments
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    lifetracker::init_logging();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    debug!(
        "config loaded (region={}, page_size={})",
        config.storage.region, config.storage.page_size
    );
    let service = Service::connect(&config, cli.backend).await?;

    match cli.command {
        Command::Serve => LifeTrackerServer::new(service).serve_stdio().await,
        Command::Tools => {
            let specs: Vec<Value> = service
                .tools()
                .specs()
                .into_iter()
                .map(|spec| {
                    json!({
                        "name": spec.name,
                        "description": spec.description,
                        "inputSchema": spec.args_schema,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&specs)?);
            Ok(())
        }
        Command::Call { tool, args } => {
            let args: Value = serde_json::from_str(&args).context("--args must be valid JSON")?;
            if !args.is_object() {
                bail!("--args must be a JSON object");
            }
            let response = service.call_tool(&tool, args).await;
            println!("{}", serde_json::to_string_pretty(&response.to_value())?);
            if !response.success {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<LifeTrackerConfig> {
    let options = match &cli.config {
        Some(path) => {
            info!("loading config (path={})", path.display());
            ConfigLoadOptions::with_path(path)
        }
        None => ConfigLoadOptions {
            use_default_path: true,
            ..ConfigLoadOptions::default()
        },
    };
    LifeTrackerConfig::load(options).context("failed to load config")
}
