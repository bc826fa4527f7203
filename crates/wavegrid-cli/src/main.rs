//! wavegrid CLI - offline rendering and lookup table tools.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "wavegrid")]
#[command(author, version, about = "wavegrid synth engine CLI", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a patch's note sequence to a WAV file
    Render(commands::render::RenderArgs),

    /// List engines and their parameters
    Params(commands::params::ParamsArgs),

    /// Show the shape and value range of a lookup table
    TableInfo(commands::table_info::TableInfoArgs),

    /// Generate a demo lookup table
    MakeTable(commands::make_table::MakeTableArgs),
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Params(args) => commands::params::run(args),
        Commands::TableInfo(args) => commands::table_info::run(args),
        Commands::MakeTable(args) => commands::make_table::run(args),
    }
}
