//! Wind-up move catalog loader.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use battle_core::{Attribute, Move};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Move catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MoveCatalogFile {
    moves: Vec<Move>,
}

/// Moves indexed by id, in file order.
#[derive(Debug, Clone, Default)]
pub struct MoveCatalog {
    moves: Vec<Arc<Move>>,
    index: HashMap<String, usize>,
}

impl MoveCatalog {
    /// Builds a catalog, rejecting duplicate or empty ids and attributes
    /// that could never take effect.
    pub fn from_moves(moves: impl IntoIterator<Item = Move>) -> LoadResult<Self> {
        let mut catalog = Self::default();
        for mv in moves {
            if mv.id.trim().is_empty() {
                anyhow::bail!("Move '{}' has an empty id", mv.name);
            }
            validate_attribute(&mv)?;
            if catalog.index.contains_key(&mv.id) {
                anyhow::bail!("Duplicate move id '{}'", mv.id);
            }
            catalog.index.insert(mv.id.clone(), catalog.moves.len());
            catalog.moves.push(Arc::new(mv));
        }
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Move>> {
        self.index.get(id).and_then(|&i| self.moves.get(i))
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Move>> {
        self.moves.iter()
    }
}

fn validate_attribute(mv: &Move) -> LoadResult<()> {
    match mv.attribute {
        Attribute::Bleed { stacks: 0, .. } | Attribute::Poison { stacks: 0, .. } => {
            anyhow::bail!("Move '{}' applies zero stacks", mv.id)
        }
        Attribute::Poison {
            tick_frequency: 0, ..
        } => anyhow::bail!("Move '{}' has a zero poison tick frequency", mv.id),
        Attribute::MaxHpBoost { .. } if mv.is_usable() => {
            anyhow::bail!("Move '{}' boosts max HP but also has battle stats", mv.id)
        }
        _ => Ok(()),
    }
}

/// Loader for wind-up move catalogs from RON files.
pub struct MoveCatalogLoader;

impl MoveCatalogLoader {
    /// Load a move catalog from a RON file.
    ///
    /// RON format: `(moves: [Move, ...])`
    pub fn load(path: &Path) -> LoadResult<MoveCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<MoveCatalog> {
        let file: MoveCatalogFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse move catalog RON: {}", e))?;
        MoveCatalog::from_moves(file.moves)
    }
}

#[cfg(test)]
mod tests {
    use battle_core::AttributeKind;

    use super::*;

    const CATALOG: &str = r#"(
        moves: [
            (id: "jab", name: "Jab", stats: Some((effect: 4, defense: 2, delay: 2))),
            (
                id: "gash",
                name: "Gash",
                stats: Some((effect: 5, defense: 0, delay: 4)),
                attribute: Bleed(stacks: 2, damage: 3),
            ),
            (id: "tough", name: "Tough", attribute: MaxHpBoost(amount: 10)),
        ],
    )"#;

    #[test]
    fn parses_moves_in_order() {
        let catalog = MoveCatalogLoader::parse(CATALOG).unwrap();
        let ids: Vec<&str> = catalog.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["jab", "gash", "tough"]);

        let gash = catalog.get("gash").unwrap();
        assert_eq!(gash.kind(), AttributeKind::Bleed);
        assert_eq!(gash.effect(), 5);
        assert!(!catalog.get("tough").unwrap().is_usable());
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let moves = [Move::new("jab", "Jab"), Move::new("jab", "Jab Again")];
        let error = MoveCatalog::from_moves(moves).unwrap_err();
        assert!(error.to_string().contains("Duplicate move id 'jab'"));
    }

    #[test]
    fn rejects_zero_stacks() {
        let mv = Move::new("nick", "Nick")
            .with_stats(1, 0, 1)
            .with_attribute(Attribute::Bleed {
                stacks: 0,
                damage: 2,
            });
        assert!(MoveCatalog::from_moves([mv]).is_err());
    }
}
