use std::path::PathBuf;

use clap::{Parser, Subcommand};
use stowage_strategy::ResourceRequest;

mod commands;
mod fleet_file;

use commands::place::Format;
use fleet_file::FleetFile;

#[derive(Parser)]
#[command(
    name = "stowage",
    about = "Stowage — bin-packing placement for container schedulers",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Arguments shared by every placement command.
#[derive(clap::Args)]
struct RequestArgs {
    /// Path to the fleet description (TOML)
    #[arg(short, long, default_value = "fleet.toml")]
    fleet: PathBuf,
    /// Requested memory, in the same unit as node memory. 0 = unconstrained.
    #[arg(short, long, default_value_t = 0)]
    memory: u64,
    /// Requested CPU shares. 0 = unconstrained.
    #[arg(short, long, default_value_t = 0)]
    cpu: u64,
    /// Override the strategy from the fleet file, as name[:opts] (e.g. binpack:0.05)
    #[arg(short, long)]
    strategy: Option<String>,
    /// Output format: text or json
    #[arg(long, default_value = "text")]
    format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Choose the node a workload should be placed on
    Place(RequestArgs),
    /// Show every candidate node with its score, best first
    Rank(RequestArgs),
}

type Handler = fn(&FleetFile, Option<&str>, ResourceRequest, Format) -> anyhow::Result<String>;

fn run(args: RequestArgs, handler: Handler) -> anyhow::Result<()> {
    let fleet = FleetFile::from_file(&args.fleet)?;
    let format = Format::parse(&args.format)?;
    let request = ResourceRequest::new(args.memory, args.cpu);

    let output = handler(&fleet, args.strategy.as_deref(), request, format)?;
    println!("{output}");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stowage=info".parse()?)
                .add_directive("stowage_strategy=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Place(args) => run(args, commands::place::place),
        Commands::Rank(args) => run(args, commands::place::rank),
    }
}
