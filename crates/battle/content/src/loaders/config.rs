//! Battle configuration loader.

use std::path::Path;

use battle_core::BattleConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for battle tunables from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a [`BattleConfig`] from a TOML file. Missing keys keep their
    /// default values.
    pub fn load(path: &Path) -> LoadResult<BattleConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<BattleConfig> {
        let config: BattleConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse battle config TOML: {}", e))?;

        if config.max_initiative_rolls == 0 {
            anyhow::bail!("max_initiative_rolls must be at least 1");
        }
        if config.turn_delay == 0 {
            anyhow::bail!("turn_delay must be at least 1");
        }
        if !(0.0..1.0).contains(&config.follower_tie_break) {
            anyhow::bail!(
                "follower_tie_break must be in [0, 1), got {}",
                config.follower_tie_break
            );
        }
        Ok(config)
    }
}
