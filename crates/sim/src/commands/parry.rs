//! Dice/parry simulation command.

use anyhow::{Context, Result};
use battle_core::{Battle, ParryBattle, PcgRandom, RandomParryController, run_parry_battle};
use clap::Parser;
use tracing::info;

use super::{SimArgs, Tally, write_json_lines};

/// Run dice/parry battles between two roster combatants
#[derive(Parser)]
pub struct ParrySim {
    #[command(flatten)]
    args: SimArgs,

    /// Parry odds threshold for both controllers
    #[arg(long, default_value_t = RandomParryController::DEFAULT_THRESHOLD)]
    threshold: f32,
}

impl ParrySim {
    pub fn execute(self) -> Result<()> {
        let factory = self.args.factory();
        let config = self.args.load_config(&factory)?;
        let roster = factory
            .load_parry_roster()
            .with_context(|| format!("Failed to load content from {}", factory.data_dir().display()))?;
        let first = roster.require(&self.args.first)?;
        let second = roster.require(&self.args.second)?;

        let mut tally = Tally::default();
        for seed in self.args.seeds() {
            let mut battle = ParryBattle::new(
                first.clone(),
                second.clone(),
                PcgRandom::seeded(seed),
            )
            .with_config(config.clone());
            let mut left = RandomParryController::new(PcgRandom::seeded(seed.wrapping_mul(2).wrapping_add(1)))
                .with_threshold(self.threshold);
            let mut right = RandomParryController::new(PcgRandom::seeded(seed.wrapping_mul(2).wrapping_add(2)))
                .with_threshold(self.threshold);

            let outcome = run_parry_battle(&mut battle, &mut [&mut left, &mut right])
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
