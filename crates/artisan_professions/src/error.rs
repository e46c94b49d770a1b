//! # Profession Error Types
//!
//! All expected, recoverable failures of the profession system.
//!
//! Callers branch on these routinely (a UI greys out a button, a command
//! handler replies with the reason), so every variant carries a
//! human-readable `Display` message.

use thiserror::Error;

use crate::types::{MaterialId, ProfessionId, RecipeId};

/// Errors that can occur in the profession system.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfessionError {
    /// Primary slot index outside `0..=1`.
    #[error("invalid slot {0}: must be 0 or 1")]
    InvalidSlot(usize),

    /// Profession id is not in the catalogue.
    #[error("unknown profession: {0}")]
    UnknownProfession(ProfessionId),

    /// Secondary professions are always known and never occupy a primary slot.
    #[error("secondary profession {0} cannot be placed in a primary slot")]
    SecondaryInPrimarySlot(ProfessionId),

    /// The requested primary slot already holds a profession.
    #[error("slot {0} is already occupied")]
    SlotOccupied(usize),

    /// The requested primary slot holds nothing to unlearn.
    #[error("slot {0} is already empty")]
    SlotEmpty(usize),

    /// The profession is already learned (primary or secondary).
    #[error("profession {0} is already learned")]
    AlreadyLearned(ProfessionId),

    /// The profession is not currently learned.
    #[error("profession {0} is not learned")]
    ProfessionNotLearned(ProfessionId),

    /// The profession is not learned or has no crafting queue.
    #[error("profession {0} is not learned or has no crafting engine")]
    NoCraftingEngine(ProfessionId),

    /// Recipe id does not resolve.
    #[error("unknown recipe: {0}")]
    UnknownRecipe(RecipeId),

    /// The recipe is already in the profession's known list.
    #[error("recipe {0} is already known")]
    RecipeAlreadyKnown(RecipeId),

    /// The recipe belongs to a different profession.
    #[error("recipe {recipe_id} belongs to {owner}, not {profession_id}")]
    RecipeProfessionMismatch {
        /// The recipe that was requested.
        recipe_id: RecipeId,
        /// The profession that owns the recipe.
        owner: ProfessionId,
        /// The profession it was requested for.
        profession_id: ProfessionId,
    },

    /// The crafting queue is at its configured maximum length.
    #[error("crafting queue is full: capacity {capacity}")]
    QueueFull {
        /// Maximum queue length.
        capacity: usize,
    },

    /// Not enough of a material in the bank.
    #[error("insufficient materials: need {required} of {material_id}, have {available}")]
    InsufficientMaterials {
        /// The first material that was short.
        material_id: MaterialId,
        /// The amount required.
        required: u32,
        /// The amount available.
        available: u32,
    },

    /// Queue index outside the current queue.
    #[error("invalid queue index {index}: queue holds {len} entries")]
    InvalidQueueIndex {
        /// The requested index.
        index: usize,
        /// Current queue length.
        len: usize,
    },

    /// The profession is already at the top bracket.
    #[error("profession {0} is already at the highest bracket")]
    MaxBracketReached(ProfessionId),

    /// Invalid balance configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid static catalogue data.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
}

/// Result type for profession operations.
pub type ProfessionResult<T> = Result<T, ProfessionError>;
