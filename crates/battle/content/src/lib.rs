//! Data-driven battle content and loaders.
//!
//! Combatants and moves live in data files rather than code:
//! - Dice/parry rosters (RON)
//! - Wind-up move catalogs (RON)
//! - Wind-up rosters that reference moves by id (RON)
//! - Battle tunables (TOML)
//!
//! All loaders deserialize straight into `battle-core` types and validate
//! what serde cannot check on its own.

pub mod loaders;

pub use loaders::{
    ConfigLoader, ContentFactory, LoadResult, MoveCatalog, MoveCatalogLoader, ParryRosterLoader,
    Roster, WindUpEntry, WindUpRosterLoader,
};
