//! Headless battle simulator.
//!
//! Loads combatants from a content directory and runs seeded
//! controller-vs-controller battles, logging each result.

mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{ParrySim, WindUpSim};

/// Run seeded battles between content-defined combatants
#[derive(Parser)]
#[command(name = "battle-sim")]
#[command(about = "Headless two-combatant battle simulator", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Dice battles with parries and charges
    Parry(ParrySim),

    /// Wind-up battles with move attributes and stacks
    Windup(WindUpSim),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Parry(cmd) => cmd.execute(),
        Command::Windup(cmd) => cmd.execute(),
    }
}
