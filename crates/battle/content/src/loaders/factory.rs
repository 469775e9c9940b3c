//! Content factory for loading a whole data directory.

use std::path::{Path, PathBuf};

use battle_core::{BattleConfig, ParryAttributes, WindUpAttributes};

use crate::loaders::{
    ConfigLoader, LoadResult, MoveCatalog, MoveCatalogLoader, ParryRosterLoader, Roster,
    WindUpRosterLoader,
};

/// Loads battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── battle.toml
/// ├── parry_roster.ron
/// ├── windup_moves.ron
/// └── windup_roster.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub const CONFIG_FILE: &'static str = "battle.toml";
    pub const PARRY_ROSTER_FILE: &'static str = "parry_roster.ron";
    pub const MOVES_FILE: &'static str = "windup_moves.ron";
    pub const WINDUP_ROSTER_FILE: &'static str = "windup_roster.ron";

    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Factory over the sample content shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
    }

    /// Load `battle.toml`, or defaults when the file is absent.
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        let path = self.data_dir.join(Self::CONFIG_FILE);
        if !path.exists() {
            return Ok(BattleConfig::default());
        }
        ConfigLoader::load(&path)
    }

    pub fn load_parry_roster(&self) -> LoadResult<Roster<ParryAttributes>> {
        ParryRosterLoader::load(&self.data_dir.join(Self::PARRY_ROSTER_FILE))
    }

    pub fn load_moves(&self) -> LoadResult<MoveCatalog> {
        MoveCatalogLoader::load(&self.data_dir.join(Self::MOVES_FILE))
    }

    /// Load the move catalog and then the wind-up roster against it.
    pub fn load_windup_roster(&self) -> LoadResult<Roster<WindUpAttributes>> {
        let catalog = self.load_moves()?;
        WindUpRosterLoader::load(&self.data_dir.join(Self::WINDUP_ROSTER_FILE), &catalog)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let factory = ContentFactory::new("/nonexistent/battle-content");
        assert_eq!(factory.load_config().unwrap(), BattleConfig::default());
        assert!(factory.load_parry_roster().is_err());
    }
}
