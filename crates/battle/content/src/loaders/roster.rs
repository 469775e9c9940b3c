//! Combatant roster loaders.
//!
//! Dice/parry combatants are fully described inline. Wind-up combatants
//! reference moves by id, resolved against a [`MoveCatalog`] at load time.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use battle_core::{MoveStrategy, ParryAttributes, WindUpAttributes};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::loaders::{LoadResult, MoveCatalog, read_file};

/// Combatants indexed by id, in file order.
#[derive(Debug, Clone)]
pub struct Roster<T> {
    entries: Vec<Arc<T>>,
    index: HashMap<String, usize>,
}

impl<T> Default for Roster<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> Roster<T> {
    fn insert(&mut self, id: &str, entry: T) -> LoadResult<()> {
        if id.trim().is_empty() {
            anyhow::bail!("Combatant has an empty id");
        }
        if self.index.contains_key(id) {
            anyhow::bail!("Duplicate combatant id '{}'", id);
        }
        self.index.insert(id.to_owned(), self.entries.len());
        self.entries.push(Arc::new(entry));
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Arc<T>> {
        self.index.get(id).and_then(|&i| self.entries.get(i))
    }

    /// Like [`Roster::get`], but names the missing id in the error.
    pub fn require(&self, id: &str) -> LoadResult<Arc<T>> {
        self.get(id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Unknown combatant '{}'", id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<T>> {
        self.entries.iter()
    }
}

/// Dice/parry roster structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ParryRosterFile {
    combatants: Vec<ParryAttributes>,
}

/// Loader for dice/parry rosters from RON files.
pub struct ParryRosterLoader;

impl ParryRosterLoader {
    /// Load a roster from a RON file.
    ///
    /// RON format: `(combatants: [ParryAttributes, ...])`, dice as notation
    /// strings such as `"1d6"` or `"2d4+1"`.
    pub fn load(path: &Path) -> LoadResult<Roster<ParryAttributes>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Roster<ParryAttributes>> {
        let file: ParryRosterFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse parry roster RON: {}", e))?;

        let mut roster = Roster::default();
        for combatant in file.combatants {
            if combatant.max_hp == 0 {
                anyhow::bail!("Combatant '{}' has zero max HP", combatant.id);
            }
            let id = combatant.id.clone();
            roster.insert(&id, combatant)?;
        }
        Ok(roster)
    }
}

/// A wind-up combatant as written in content files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindUpEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub max_hp: u32,
    #[serde(default)]
    pub strategy: MoveStrategy,
    /// Move ids from the catalog.
    pub moves: Vec<String>,
}

impl WindUpEntry {
    /// Resolves move ids against `catalog`.
    pub fn resolve(self, catalog: &MoveCatalog) -> LoadResult<WindUpAttributes> {
        if self.max_hp == 0 {
            anyhow::bail!("Combatant '{}' has zero max HP", self.id);
        }

        let mut attributes = WindUpAttributes::new(self.id.clone(), self.name, self.max_hp)
            .with_strategy(self.strategy);
        attributes.description = self.description;
        for move_id in &self.moves {
            let mv = catalog.get(move_id).ok_or_else(|| {
                anyhow::anyhow!(
                    "Combatant '{}' references unknown move '{}'",
                    self.id,
                    move_id
                )
            })?;
            attributes = attributes.with_move(Arc::clone(mv));
        }

        if attributes.usable_moves().next().is_none() {
            warn!(combatant = %self.id, "combatant has no move usable in battle");
        }
        Ok(attributes)
    }
}

/// Wind-up roster structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WindUpRosterFile {
    combatants: Vec<WindUpEntry>,
}

/// Loader for wind-up rosters from RON files.
pub struct WindUpRosterLoader;

impl WindUpRosterLoader {
    /// Load a roster from a RON file, resolving move ids against `catalog`.
    ///
    /// RON format: `(combatants: [WindUpEntry, ...])`
    pub fn load(path: &Path, catalog: &MoveCatalog) -> LoadResult<Roster<WindUpAttributes>> {
        let content = read_file(path)?;
        Self::parse(&content, catalog)
    }

    pub fn parse(content: &str, catalog: &MoveCatalog) -> LoadResult<Roster<WindUpAttributes>> {
        let file: WindUpRosterFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse wind-up roster RON: {}", e))?;

        let mut roster = Roster::default();
        for entry in file.combatants {
            let id = entry.id.clone();
            let attributes = entry.resolve(catalog)?;
            roster.insert(&id, attributes)?;
        }
        Ok(roster)
    }
}

#[cfg(test)]
mod tests {
    use battle_core::{Dice, Move};

    use super::*;

    #[test]
    fn parry_roster_reads_dice_notation() {
        let roster = ParryRosterLoader::parse(
            r#"(
                combatants: [
                    (
                        id: "knight",
                        name: "Knight",
                        max_hp: 24,
                        attack: "1d8",
                        defend: "2d4",
                        agility: "1d10",
                        parry: "1d6+1",
                    ),
                ],
            )"#,
        )
        .unwrap();
        let knight = roster.require("knight").unwrap();
        assert_eq!(knight.attack, Dice::new(1, 8));
        assert_eq!(knight.parry, Dice::new(1, 6).with_modifier(1));
        assert!(roster.require("rogue").is_err());
    }

    #[test]
    fn parry_roster_rejects_bad_dice() {
        let result = ParryRosterLoader::parse(
            r#"(combatants: [(id: "x", name: "X", max_hp: 5,
                attack: "six", defend: "1d4", agility: "1d4", parry: "1d4")])"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn parry_roster_rejects_oversized_dice() {
        let result = ParryRosterLoader::parse(
            r#"(combatants: [(id: "x", name: "X", max_hp: 5,
                attack: "100000d100000", defend: "1d4", agility: "1d4", parry: "1d4")])"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn windup_entries_resolve_catalog_moves() {
        let catalog = MoveCatalog::from_moves([
            Move::new("jab", "Jab").with_stats(3, 1, 2),
            Move::new("tough", "Tough").with_attribute(battle_core::Attribute::MaxHpBoost {
                amount: 5,
            }),
        ])
        .unwrap();
        let roster = WindUpRosterLoader::parse(
            r#"(combatants: [
                (id: "pit", name: "Pit Fighter", max_hp: 30, strategy: Cycle, moves: ["jab", "tough"]),
            ])"#,
            &catalog,
        )
        .unwrap();

        let pit = roster.require("pit").unwrap();
        assert_eq!(pit.strategy, MoveStrategy::Cycle);
        assert_eq!(pit.moves.len(), 2);
        assert_eq!(pit.effective_max_hp(), 35);
        assert!(Arc::ptr_eq(&pit.moves[0], catalog.get("jab").unwrap()));
    }

    #[test]
    fn windup_roster_rejects_unknown_moves() {
        let catalog = MoveCatalog::default();
        let error = WindUpRosterLoader::parse(
            r#"(combatants: [(id: "pit", name: "Pit", max_hp: 30, moves: ["jab"])])"#,
            &catalog,
        )
        .unwrap_err();
        assert!(error.to_string().contains("unknown move 'jab'"));
    }

    #[test]
    fn duplicate_combatants_are_rejected() {
        let catalog = MoveCatalog::default();
        let result = WindUpRosterLoader::parse(
            r#"(combatants: [
                (id: "pit", name: "Pit", max_hp: 30, moves: []),
                (id: "pit", name: "Pit", max_hp: 30, moves: []),
            ])"#,
            &catalog,
        );
        assert!(result.is_err());
    }
}
