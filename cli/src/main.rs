//! Entitize command-line tool
//!
//! Loads a registry from a JSON config file and runs one entity graph
//! through it:
//!   entitize show      --config app.json --type Table --input table.json
//!   entitize roundtrip --config app.json --type Table --input table.json
//!   entitize save      --config app.json --type Table --input table.json
//!
//! `entitize sample-config` prints a config to start from.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use entitize_cli::{describe_types, load_config, load_entity, sample_config};
use entitize_transport::SaveClient;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "entitize")]
#[command(about = "Materialize, round-trip and save JSON entity graphs")]
struct Cli {
    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the materialized entity graph, unmapped fields included
    Show(EntityArgs),
    /// Print the wire payload the entity would be saved as
    Roundtrip(EntityArgs),
    /// Post the entity to its type's update endpoint
    Save(EntityArgs),
    /// List registered types
    Types {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print a sample config file
    SampleConfig,
}

#[derive(Args, Debug)]
struct EntityArgs {
    /// Path to the JSON config file
    #[arg(short, long)]
    config: PathBuf,

    /// Registered type of the root object
    #[arg(short = 't', long = "type")]
    entity_type: String,

    /// Path to the JSON document to materialize
    #[arg(short, long)]
    input: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    match cli.command {
        Command::Show(args) => {
            let config = load_config(&args.config)?;
            let registry = config.build_registry()?;
            let entity = load_entity(&registry, &args.input, &args.entity_type)?;
            println!("{}", serde_json::to_string_pretty(&entity.to_value()?)?);
        }
        Command::Roundtrip(args) => {
            let config = load_config(&args.config)?;
            let registry = config.build_registry()?;
            let entity = load_entity(&registry, &args.input, &args.entity_type)?;
            let payload = entity.dematerialize(&registry)?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Command::Save(args) => {
            let config = load_config(&args.config)?;
            let registry = config.build_registry()?;
            let entity = load_entity(&registry, &args.input, &args.entity_type)?;
            let client = SaveClient::new(config.transport.clone())?;
            info!("Saving {} to {}", args.entity_type, client.endpoint_for(&registry, &entity)?);
            // wait so the response is logged before the process exits
            client
                .save(&registry, &entity)?
                .await
                .context("save task panicked")?;
        }
        Command::Types { config } => {
            let registry = load_config(&config)?.build_registry()?;
            for line in describe_types(&registry) {
                println!("{line}");
            }
        }
        Command::SampleConfig => {
            println!("{}", serde_json::to_string_pretty(&sample_config())?);
        }
    }

    Ok(())
}
