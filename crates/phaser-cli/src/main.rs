//! Phaser CLI - command-line tooling for the Phaser datapath model.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "phaser")]
#[command(author, version, about = "Phaser RF signal-generation datapath CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a frame stream through the simulated datapath
    Run(commands::run::RunArgs),

    /// Build frames (register access, samples, FFT loads) into a frame file
    Frame(commands::frame::FrameArgs),

    /// Print the named register map's byte-address layout
    Registers(commands::registers::RegistersArgs),

    /// Manage pipeline configuration files
    Config(commands::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    tracing::debug!(command = ?std::mem::discriminant(&cli.command), "dispatching command");

    match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Frame(args) => commands::frame::run(args),
        Commands::Registers(args) => commands::registers::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
