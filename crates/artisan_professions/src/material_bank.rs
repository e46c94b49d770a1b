//! # Material Bank
//!
//! Quantity ledger for raw materials, shared by gathering and every crafting
//! queue of one manager.
//!
//! ## Invariants
//!
//! - Every stored quantity is in `1..=stack_size` of its material.
//! - The number of stored materials never exceeds `capacity`, except after a
//!   [`MaterialBank::restore`] of reserved materials whose slot was taken in
//!   the meantime. New materials stay refused until the count drops back.
//!
//! Capacity is only checked when a *new* material enters the bank. Topping up
//! an existing stack always works, even when every slot is taken.

use std::collections::{BTreeMap, HashMap};

use crate::types::{MaterialBankEntry, MaterialDefinition, MaterialId, RecipeMaterial};

/// Default number of unique material slots.
pub const DEFAULT_BANK_SLOTS: usize = 100;

/// Stack- and capacity-limited material storage.
#[derive(Clone, Debug)]
pub struct MaterialBank {
    /// material id -> quantity. Absent means zero.
    store: BTreeMap<MaterialId, u32>,
    /// Material definitions, for stack sizes.
    registry: HashMap<MaterialId, MaterialDefinition>,
    /// Maximum number of unique materials.
    capacity: usize,
}

impl MaterialBank {
    /// Creates an empty bank over the given material catalogue.
    #[must_use]
    pub fn new<'a>(
        materials: impl IntoIterator<Item = &'a MaterialDefinition>,
        capacity: usize,
    ) -> Self {
        Self {
            store: BTreeMap::new(),
            registry: materials
                .into_iter()
                .map(|m| (m.id.clone(), m.clone()))
                .collect(),
            capacity,
        }
    }

    /// Maximum number of unique materials.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of unique materials currently stored.
    #[inline]
    #[must_use]
    pub fn unique_count(&self) -> usize {
        self.store.len()
    }

    /// Definition of a material, if it is in the catalogue.
    #[must_use]
    pub fn definition(&self, material_id: &str) -> Option<&MaterialDefinition> {
        self.registry.get(material_id)
    }

    /// Adds up to `quantity` of a material.
    ///
    /// Returns the amount actually stored: zero for unknown materials, a zero
    /// quantity, a full stack, or a new material when every slot is taken;
    /// otherwise `min(quantity, stack_size - current)`.
    pub fn add(&mut self, material_id: &str, quantity: u32) -> u32 {
        if quantity == 0 {
            return 0;
        }
        let Some(definition) = self.registry.get(material_id) else {
            return 0;
        };

        let current = self.get_quantity(material_id);
        if current == 0 && self.store.len() >= self.capacity {
            return 0;
        }

        let room = definition.stack_size.saturating_sub(current);
        let added = quantity.min(room);
        if added > 0 {
            self.store.insert(material_id.to_string(), current + added);
        }
        added
    }

    /// Returns previously reserved materials to the bank.
    ///
    /// Like [`Self::add`] but never refused for lack of a free slot: the
    /// materials held a slot when they were reserved. Still clamped to the
    /// stack size. Returns the amount stored.
    pub fn restore(&mut self, material_id: &str, quantity: u32) -> u32 {
        if quantity == 0 {
            return 0;
        }
        let Some(definition) = self.registry.get(material_id) else {
            return 0;
        };

        let current = self.get_quantity(material_id);
        let added = quantity.min(definition.stack_size.saturating_sub(current));
        if added > 0 {
            self.store.insert(material_id.to_string(), current + added);
        }
        added
    }

    /// Removes exactly `quantity` of a material, or nothing.
    ///
    /// Returns `false` (and leaves the bank untouched) for a zero quantity or
    /// insufficient stock. Removing the last unit frees the slot.
    pub fn remove(&mut self, material_id: &str, quantity: u32) -> bool {
        if quantity == 0 {
            return false;
        }
        let Some(current) = self.store.get_mut(material_id) else {
            return false;
        };
        if *current < quantity {
            return false;
        }

        *current -= quantity;
        if *current == 0 {
            self.store.remove(material_id);
        }
        true
    }

    /// Whether every requirement is covered. True for an empty list.
    #[must_use]
    pub fn has_materials(&self, requirements: &[RecipeMaterial]) -> bool {
        self.first_shortfall(requirements).is_none()
    }

    /// First requirement the bank cannot cover, with the amount available.
    #[must_use]
    pub fn first_shortfall<'a>(
        &self,
        requirements: &'a [RecipeMaterial],
    ) -> Option<(&'a RecipeMaterial, u32)> {
        requirements.iter().find_map(|req| {
            let available = self.get_quantity(&req.material_id);
            (available < req.quantity).then_some((req, available))
        })
    }

    /// Quantity held, zero when absent.
    #[inline]
    #[must_use]
    pub fn get_quantity(&self, material_id: &str) -> u32 {
        self.store.get(material_id).copied().unwrap_or(0)
    }

    /// All stored materials, ordered by material id.
    #[must_use]
    pub fn get_all(&self) -> Vec<MaterialBankEntry> {
        self.store
            .iter()
            .map(|(material_id, &quantity)| MaterialBankEntry {
                material_id: material_id.clone(),
                quantity,
            })
            .collect()
    }

    /// Save data for the bank.
    #[must_use]
    pub fn serialize(&self) -> Vec<MaterialBankEntry> {
        self.get_all()
    }

    /// Replaces all contents with saved entries.
    ///
    /// Entries naming unknown materials are dropped, as are new materials once
    /// `capacity` entries are stored. Quantities are clamped to the stack
    /// size, zero quantities are skipped. The restore never fails as
    /// a whole; the number of dropped entries is returned.
    pub fn deserialize(&mut self, entries: &[MaterialBankEntry]) -> usize {
        self.store.clear();
        let mut dropped = 0;

        for entry in entries {
            let Some(definition) = self.registry.get(&entry.material_id) else {
                tracing::warn!(
                    "Dropping saved bank entry for unknown material {} (x{})",
                    entry.material_id,
                    entry.quantity
                );
                dropped += 1;
                continue;
            };
            if !self.store.contains_key(&entry.material_id) && self.store.len() >= self.capacity {
                tracing::warn!(
                    "Dropping saved bank entry {} (x{}): bank capacity {} reached",
                    entry.material_id,
                    entry.quantity,
                    self.capacity
                );
                dropped += 1;
                continue;
            }

            let clamped = entry.quantity.min(definition.stack_size);
            if clamped < entry.quantity {
                tracing::warn!(
                    "Clamping saved {} from {} to stack size {}",
                    entry.material_id,
                    entry.quantity,
                    definition.stack_size
                );
            }
            if clamped > 0 {
                let total = self.get_quantity(&entry.material_id).saturating_add(clamped);
                self.store
                    .insert(entry.material_id.clone(), total.min(definition.stack_size));
            }
        }

        dropped
    }
}
