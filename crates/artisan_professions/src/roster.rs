//! # Profession Roster
//!
//! The one record of every learned profession: two primary slots and the
//! always-present secondary professions. Owned by the manager; gathering and
//! crafting look states up by [`ProfessionId`] on every call.

use serde::{Deserialize, Serialize};

use crate::error::{ProfessionError, ProfessionResult};
use crate::types::{ProfessionId, ProfessionState};

/// Number of primary profession slots.
pub const PRIMARY_SLOTS: usize = 2;

/// Primary slots plus secondary professions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionRoster {
    primary: [Option<ProfessionState>; PRIMARY_SLOTS],
    secondary: Vec<ProfessionState>,
}

impl ProfessionRoster {
    /// Creates a roster with empty primary slots.
    #[must_use]
    pub fn new(secondary: Vec<ProfessionState>) -> Self {
        Self {
            primary: [None, None],
            secondary,
        }
    }

    /// Rebuilds a roster from saved slots.
    #[must_use]
    pub fn from_parts(
        primary: [Option<ProfessionState>; PRIMARY_SLOTS],
        secondary: Vec<ProfessionState>,
    ) -> Self {
        Self { primary, secondary }
    }

    /// Both primary slots.
    #[inline]
    #[must_use]
    pub const fn primary(&self) -> &[Option<ProfessionState>; PRIMARY_SLOTS] {
        &self.primary
    }

    /// Secondary professions.
    #[inline]
    #[must_use]
    pub fn secondary(&self) -> &[ProfessionState] {
        &self.secondary
    }

    /// Contents of one primary slot.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSlot` for a slot outside `0..PRIMARY_SLOTS`.
    pub fn slot(&self, slot: usize) -> ProfessionResult<Option<&ProfessionState>> {
        self.primary
            .get(slot)
            .map(Option::as_ref)
            .ok_or(ProfessionError::InvalidSlot(slot))
    }

    /// Replaces one primary slot, returning what was there.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSlot` for a slot outside `0..PRIMARY_SLOTS`.
    pub fn set_slot(
        &mut self,
        slot: usize,
        state: Option<ProfessionState>,
    ) -> ProfessionResult<Option<ProfessionState>> {
        let entry = self
            .primary
            .get_mut(slot)
            .ok_or(ProfessionError::InvalidSlot(slot))?;
        Ok(std::mem::replace(entry, state))
    }

    /// Every learned profession, primaries first.
    pub fn iter(&self) -> impl Iterator<Item = &ProfessionState> {
        self.primary.iter().flatten().chain(&self.secondary)
    }

    /// State of a learned profession.
    #[must_use]
    pub fn get(&self, id: ProfessionId) -> Option<&ProfessionState> {
        self.iter().find(|state| state.profession_id == id)
    }

    /// Mutable state of a learned profession.
    pub fn get_mut(&mut self, id: ProfessionId) -> Option<&mut ProfessionState> {
        self.primary
            .iter_mut()
            .flatten()
            .chain(&mut self.secondary)
            .find(|state| state.profession_id == id)
    }

    /// Whether the profession is learned in any slot.
    #[inline]
    #[must_use]
    pub fn is_learned(&self, id: ProfessionId) -> bool {
        self.get(id).is_some()
    }
}
