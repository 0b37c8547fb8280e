mod commands;
mod schema_file;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{plan::PlanArgs, roundtrip::RoundtripArgs, schema::SchemaArgs};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "propplan", about = "Inspect and exercise propcodec record codecs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the serialize/deserialize transform chosen for every prop
    Plan(PlanArgs),
    /// Pretty-print the declared props of records
    Schema(SchemaArgs),
    /// Read a stored JSON document as a record and write it back
    Roundtrip(RoundtripArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Plan(args) => args.run(),
        Commands::Schema(args) => args.run(),
        Commands::Roundtrip(args) => args.run(),
    }
}
