mod parry;
mod windup;

pub use parry::ParrySim;
pub use windup::WindUpSim;

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use battle_content::ContentFactory;
use battle_core::BattleConfig;
use clap::Args;
use serde::Serialize;

/// Options shared by every simulation.
#[derive(Args)]
pub struct SimArgs {
    /// Content directory (defaults to the bundled sample data)
    #[arg(short, long, value_name = "DIR")]
    content: Option<PathBuf>,

    /// Battle config TOML (defaults to battle.toml in the content directory)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed of the first battle; battle `n` uses `seed + n`
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Number of battles to run
    #[arg(short, long, default_value_t = 1)]
    battles: u32,

    /// Print every battle's event log to stdout as JSON lines
    #[arg(long)]
    json: bool,

    /// First combatant id
    #[arg(value_name = "FIRST")]
    first: String,

    /// Second combatant id
    #[arg(value_name = "SECOND")]
    second: String,
}

impl SimArgs {
    fn factory(&self) -> ContentFactory {
        match &self.content {
            Some(dir) => ContentFactory::new(dir),
            None => ContentFactory::bundled(),
        }
    }

    fn load_config(&self, factory: &ContentFactory) -> Result<BattleConfig> {
        match &self.config {
            Some(path) => battle_content::ConfigLoader::load(path)
                .with_context(|| format!("Failed to load config {}", path.display())),
            None => factory.load_config().context("Failed to load content config"),
        }
    }

    fn seeds(&self) -> impl Iterator<Item = u64> + '_ {
        (0..u64::from(self.battles)).map(|n| self.seed.wrapping_add(n))
    }
}

/// Wins per combatant id across a run.
#[derive(Default)]
struct Tally {
    wins: BTreeMap<String, u32>,
    battles: u32,
}

impl Tally {
    fn record(&mut self, winner: &str) {
        self.battles += 1;
        *self.wins.entry(winner.to_owned()).or_default() += 1;
    }

    fn report(&self, first: &str, second: &str) {
        for id in [first, second] {
            let wins = self.wins.get(id).copied().unwrap_or(0);
            tracing::info!(combatant = id, wins, battles = self.battles, "tally");
        }
    }
}

fn write_json_lines<T: Serialize>(events: &[T]) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for event in events {
        serde_json::to_writer(&mut out, event).context("Failed to serialize event")?;
        writeln!(out).context("Failed to write event log")?;
    }
    Ok(())
}
