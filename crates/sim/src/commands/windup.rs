//! Wind-up simulation command.

use anyhow::{Context, Result};
use battle_core::{Battle, PcgRandom, StrategyController, WindUpBattle, run_windup_battle};
use clap::Parser;
use tracing::info;

use super::{SimArgs, Tally, write_json_lines};

/// Run wind-up battles between two roster combatants
#[derive(Parser)]
pub struct WindUpSim {
    #[command(flatten)]
    args: SimArgs,
}

impl WindUpSim {
    pub fn execute(self) -> Result<()> {
        let factory = self.args.factory();
        let config = self.args.load_config(&factory)?;
        let roster = factory
            .load_windup_roster()
            .with_context(|| format!("Failed to load content from {}", factory.data_dir().display()))?;
        let first = roster.require(&self.args.first)?;
        let second = roster.require(&self.args.second)?;

        let mut tally = Tally::default();
        for seed in self.args.seeds() {
            let mut battle = WindUpBattle::new(first.clone(), second.clone(), PcgRandom::seeded(seed))
                .with_config(config.clone());
            let mut left = StrategyController::new(first.strategy);
            let mut right = StrategyController::new(second.strategy);

            let outcome = run_windup_battle(&mut battle, &mut [&mut left, &mut right])
                .with_context(|| format!("Battle with seed {seed} did not finish"))?;
            let winner = &battle.state(outcome.winner)?.attributes().id;
            info!(seed, %winner, events = battle.events().len(), "battle finished");
            tally.record(winner);

            if self.args.json {
                write_json_lines(battle.events())?;
            }
        }

        tally.report(&first.id, &second.id);
        Ok(())
    }
}
