//! # ARTISAN Professions
//!
//! Gathering, crafting and skill progression for one player.
//!
//! ## Design Principles
//!
//! 1. **Host-driven ticks** - nothing runs on its own; the host calls `update`
//! 2. **Reserve up front** - materials leave the bank when a craft is queued
//! 3. **Injected randomness** - one seeded source per manager, replayable
//! 4. **External configuration** - balance and catalogue data in TOML files
//!
//! ## Threading
//!
//! A [`ProfessionManager`] is single-threaded and synchronous. All state is
//! owned; wrap it in the host's own lock if it must be shared.
//!
//! ## Example
//!
//! ```rust,ignore
//! use artisan_professions::{ProfessionManager, ProfessionManagerConfig, SeededRandom};
//!
//! let mut manager = ProfessionManager::new(ProfessionManagerConfig {
//!     catalog: ProfessionCatalog::from_toml_str(&catalog_toml)?,
//!     balance: ProfessionBalance::from_toml_str(&balance_toml)?,
//!     zone_level: 1,
//!     rng: Box::new(SeededRandom::new(seed)),
//! })?;
//!
//! manager.learn_profession(ProfessionId::Mining, 0)?;
//! manager.update(250);
//! for event in manager.drain_events() {
//!     host.publish(event);
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod catalog;
pub mod config;
pub mod context;
pub mod crafting;
pub mod error;
pub mod events;
pub mod gathering;
pub mod manager;
pub mod material_bank;
pub mod offline;
pub mod rng;
pub mod roster;
pub mod skill;
pub mod types;

pub use catalog::ProfessionCatalog;
pub use config::ProfessionBalance;
pub use context::TickContext;
pub use crafting::{CraftingEngine, CraftingEngineSave};
pub use error::{ProfessionError, ProfessionResult};
pub use events::ProfessionEvent;
pub use gathering::GatheringSystem;
pub use manager::{
    ActiveProfessions, ProfessionManager, ProfessionManagerConfig, ProfessionManagerSave,
    RestoreReport,
};
pub use material_bank::{MaterialBank, DEFAULT_BANK_SLOTS};
pub use offline::{estimate_offline_progress, OfflineProfessionParams, OfflineProfessionResult};
pub use rng::{RandomSource, SeededRandom};
pub use roster::{ProfessionRoster, PRIMARY_SLOTS};
pub use types::{
    CraftingQueueEntry, CraftingResult, GatheringResult, MaterialBankEntry, MaterialDefinition,
    MaterialId, MaterialSource, MaterialTier, ProfessionDefinition, ProfessionId, ProfessionKind,
    ProfessionState, Recipe, RecipeDifficulty, RecipeId, RecipeMaterial, RecipeOutput,
    SkillBracket, SkillUpChances,
};
