//! pk3skin CLI - browse player models in PK3 archives and stage them for import

pub mod commands;
pub mod progress;

use clap::Parser;
use commands::Commands;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pk3skin")]
#[command(version, about = "pk3skin: PK3 model browser and skin resolver", long_about = None)]
struct Cli {
    /// Game folder to scan (overrides the saved setting for this run)
    #[arg(short, long, global = true)]
    game_path: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Run the pk3skin CLI
pub fn run_cli() -> anyhow::Result<()> {
    // Setup logging; RUST_LOG overrides the quiet default
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    cli.command.execute(cli.game_path.as_deref())?;

    Ok(())
}
