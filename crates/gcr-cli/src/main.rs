//! GCR CLI
//!
//! Initialise and inspect a cluster-state recorder database

use clap::{Parser, Subcommand};
use gcr_core::logging_facility::{self, Profile};
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "gcr")]
#[command(about = "Cluster-state recorder - inspect recorded snapshots", long_about = None)]
struct Cli {
    /// Database file
    #[arg(long, global = true, env = "GCR_DB_PATH")]
    db: Option<PathBuf>,

    /// Human-readable debug logs on stderr
    #[arg(long, global = true, conflicts_with = "log_json")]
    verbose: bool,

    /// JSON logs on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create the schema, or verify an existing one
    Init,
    /// Node snapshots recorded before a point in time
    Nodes(commands::query::NodesArgs),
    /// Pod snapshots recorded before a point in time
    Pods(commands::query::PodsArgs),
    /// Latest snapshot of one machine deployment
    MachineDeployment(commands::query::MachineDeploymentArgs),
    /// Every recorded event, oldest first
    Events,
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if cli.verbose {
        logging_facility::init(Profile::Development);
    } else if cli.log_json {
        logging_facility::init(Profile::Production);
    }

    let result = commands::open_store(cli.db).and_then(|store| match cli.command {
        Commands::Init => commands::init::execute(&store),
        Commands::Nodes(args) => commands::query::nodes(&store, args),
        Commands::Pods(args) => commands::query::pods(&store, args),
        Commands::MachineDeployment(args) => commands::query::machine_deployment(&store, args),
        Commands::Events => commands::query::events(&store),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
