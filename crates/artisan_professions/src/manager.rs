//! # Profession Manager
//!
//! Top-level orchestrator of the profession system.
//!
//! Owns the material bank, the profession roster, the optional gathering
//! system and one crafting engine per crafting-capable profession. The host
//! drives it:
//!
//! 1. `update(delta_ms)` once per simulation tick: gathering first, then every
//!    crafting engine in profession id order.
//! 2. Action calls (`learn_profession`, `queue_recipe`, ...) between ticks.
//! 3. `drain_events()` to collect what happened.
//!
//! The gathering system and the engine map are derived from the primary
//! slots and rebuilt on every slot change. Engines of professions that stay
//! learned carry over with their queue and progress.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::ProfessionCatalog;
use crate::config::ProfessionBalance;
use crate::context::TickContext;
use crate::crafting::{CraftingEngine, CraftingEngineSave};
use crate::error::{ProfessionError, ProfessionResult};
use crate::events::ProfessionEvent;
use crate::gathering::GatheringSystem;
use crate::material_bank::MaterialBank;
use crate::offline::{estimate_offline_progress, OfflineProfessionParams, OfflineProfessionResult};
use crate::rng::RandomSource;
use crate::roster::{ProfessionRoster, PRIMARY_SLOTS};
use crate::skill::{get_bracket_max_skill, get_bracket_training_cost, next_bracket};
use crate::types::{
    CraftingQueueEntry, GatheringResult, MaterialBankEntry, ProfessionId, ProfessionKind,
    ProfessionState,
};

/// Everything a manager needs at construction.
pub struct ProfessionManagerConfig {
    /// Static professions, materials and recipes.
    pub catalog: ProfessionCatalog,
    /// Balance block.
    pub balance: ProfessionBalance,
    /// Starting zone level.
    pub zone_level: u32,
    /// Source of every roll the manager makes.
    pub rng: Box<dyn RandomSource>,
}

/// Borrowed view of every learned profession.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveProfessions<'a> {
    /// Primary slots.
    pub primary: [Option<&'a ProfessionState>; PRIMARY_SLOTS],
    /// Secondary professions.
    pub secondary: &'a [ProfessionState],
}

/// Save data of a manager. Plain arrays and string-keyed maps only.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionManagerSave {
    /// Primary slots.
    pub primary: [Option<ProfessionState>; PRIMARY_SLOTS],
    /// Secondary professions.
    pub secondary: Vec<ProfessionState>,
    /// Bank contents.
    pub material_bank: Vec<MaterialBankEntry>,
    /// Engine state per profession.
    pub crafting_engines: BTreeMap<ProfessionId, CraftingEngineSave>,
}

/// What a restore had to repair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Bank entries naming unknown materials or past the bank capacity.
    pub dropped_bank_entries: usize,
    /// Engine saves for professions that have no engine after the restore.
    pub dropped_engine_saves: usize,
    /// Profession states that cannot be where the save put them: unknown,
    /// duplicated, a Secondary in a primary slot or a non-Secondary in the
    /// secondary list.
    pub dropped_profession_states: usize,
    /// Catalogue Secondary professions missing from the save, re-created fresh.
    pub restored_secondaries: usize,
}

/// Profession system of one player.
pub struct ProfessionManager {
    catalog: ProfessionCatalog,
    balance: ProfessionBalance,
    rng: Box<dyn RandomSource>,
    bank: MaterialBank,
    roster: ProfessionRoster,
    gathering: Option<GatheringSystem>,
    crafting_engines: BTreeMap<ProfessionId, CraftingEngine>,
    events: Vec<ProfessionEvent>,
    zone_level: u32,
}

impl ProfessionManager {
    /// Creates a manager with empty primary slots and every Secondary
    /// profession of the catalogue learned.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` or `InvalidCatalog` if either input fails
    /// validation.
    pub fn new(config: ProfessionManagerConfig) -> ProfessionResult<Self> {
        let ProfessionManagerConfig {
            catalog,
            balance,
            zone_level,
            rng,
        } = config;
        balance.validate()?;
        catalog.validate()?;
        catalog.validate_brackets(&balance.bracket_thresholds)?;

        let bank = MaterialBank::new(&catalog.materials, balance.material_bank_slots);
        let secondary = catalog
            .secondary_professions()
            .map(|def| ProfessionState::new(def.id, balance.initial_max_skill()))
            .collect();

        let mut manager = Self {
            catalog,
            balance,
            rng,
            bank,
            roster: ProfessionRoster::new(secondary),
            gathering: None,
            crafting_engines: BTreeMap::new(),
            events: Vec::new(),
            zone_level,
        };
        manager.rebuild_subsystems();
        Ok(manager)
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Advances gathering by one tick and every crafting queue by `delta_ms`.
    ///
    /// Gathering emits events for its returned result only. When two
    /// tick-mode professions both gather on the same tick, the earlier one
    /// still reaches the bank but raises no `MaterialGathered`.
    pub fn update(&mut self, delta_ms: u64) {
        let mut ctx = TickContext {
            bank: &mut self.bank,
            materials: &self.catalog.materials,
            balance: &self.balance,
            rng: &mut *self.rng,
        };

        if let Some(gathering) = self.gathering.as_mut() {
            if let Some(result) = gathering.tick(&mut self.roster, &mut ctx) {
                push_gathered(&mut self.events, &result);
            }
        }

        for (&profession_id, engine) in &mut self.crafting_engines {
            let Some(state) = self.roster.get_mut(profession_id) else {
                continue;
            };
            for result in engine.update(delta_ms, state, &mut ctx) {
                let skill_up = result.skill_up;
                let new_skill = result.new_skill;
                self.events.push(ProfessionEvent::ItemCrafted {
                    profession_id,
                    recipe_id: result.recipe_id,
                    output_item_id: result.output_item_id,
                    skill_up,
                    new_skill,
                });
                if skill_up {
                    self.events.push(ProfessionEvent::SkillUp {
                        profession_id,
                        new_skill,
                    });
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Learn / unlearn
    // ------------------------------------------------------------------

    /// Learns a Gathering or Crafting profession into a primary slot.
    ///
    /// # Errors
    ///
    /// In order of checking: `InvalidSlot`, `UnknownProfession`,
    /// `SecondaryInPrimarySlot`, `SlotOccupied`, `AlreadyLearned`.
    pub fn learn_profession(
        &mut self,
        profession_id: ProfessionId,
        slot: usize,
    ) -> ProfessionResult<()> {
        let occupied = self.roster.slot(slot)?.is_some();
        let def = self
            .catalog
            .profession(profession_id)
            .ok_or(ProfessionError::UnknownProfession(profession_id))?;
        if def.kind == ProfessionKind::Secondary {
            return Err(ProfessionError::SecondaryInPrimarySlot(profession_id));
        }
        if occupied {
            return Err(ProfessionError::SlotOccupied(slot));
        }
        if self.roster.is_learned(profession_id) {
            return Err(ProfessionError::AlreadyLearned(profession_id));
        }

        let state = ProfessionState::new(profession_id, self.balance.initial_max_skill());
        self.roster.set_slot(slot, Some(state))?;
        tracing::info!("Learned {} in slot {}", profession_id, slot);

        self.rebuild_subsystems();
        Ok(())
    }

    /// Clears a primary slot.
    ///
    /// The profession's crafting queue is discarded without refunds.
    ///
    /// # Errors
    ///
    /// `InvalidSlot` or `SlotEmpty`.
    pub fn unlearn_profession(&mut self, slot: usize) -> ProfessionResult<()> {
        let profession_id = self
            .roster
            .slot(slot)?
            .map(|state| state.profession_id)
            .ok_or(ProfessionError::SlotEmpty(slot))?;

        if let Some(engine) = self.crafting_engines.remove(&profession_id) {
            if !engine.queue().is_empty() {
                tracing::info!(
                    "Discarding {} queued crafts of {}",
                    engine.queue().len(),
                    profession_id
                );
            }
        }
        self.roster.set_slot(slot, None)?;
        tracing::info!("Unlearned {} from slot {}", profession_id, slot);

        self.rebuild_subsystems();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Every learned profession.
    #[must_use]
    pub fn get_active_professions(&self) -> ActiveProfessions<'_> {
        let [first, second] = self.roster.primary();
        ActiveProfessions {
            primary: [first.as_ref(), second.as_ref()],
            secondary: self.roster.secondary(),
        }
    }

    /// State of one learned profession.
    #[must_use]
    pub fn profession(&self, profession_id: ProfessionId) -> Option<&ProfessionState> {
        self.roster.get(profession_id)
    }

    /// Bank contents, ordered by material id.
    #[must_use]
    pub fn get_material_bank(&self) -> Vec<MaterialBankEntry> {
        self.bank.get_all()
    }

    /// The bank itself.
    #[inline]
    #[must_use]
    pub const fn material_bank(&self) -> &MaterialBank {
        &self.bank
    }

    /// Queue of one profession; empty without an engine.
    #[must_use]
    pub fn get_crafting_queue(&self, profession_id: ProfessionId) -> Vec<CraftingQueueEntry> {
        self.crafting_engines
            .get(&profession_id)
            .map(|engine| engine.queue().iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Gathering system, if a gathering profession is held.
    #[must_use]
    pub fn gathering_system(&self) -> Option<&GatheringSystem> {
        self.gathering.as_ref()
    }

    /// Current zone level.
    #[inline]
    #[must_use]
    pub const fn zone_level(&self) -> u32 {
        self.zone_level
    }

    /// The balance block.
    #[must_use]
    pub const fn balance(&self) -> &ProfessionBalance {
        &self.balance
    }

    /// The static catalogue.
    #[must_use]
    pub const fn catalog(&self) -> &ProfessionCatalog {
        &self.catalog
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    /// Queues a craft for a learned crafting-capable profession.
    ///
    /// # Errors
    ///
    /// `NoCraftingEngine`, then the engine's `UnknownRecipe`, `QueueFull` or
    /// `InsufficientMaterials`.
    pub fn queue_recipe(
        &mut self,
        profession_id: ProfessionId,
        recipe_id: &str,
    ) -> ProfessionResult<()> {
        let engine = self
            .crafting_engines
            .get_mut(&profession_id)
            .ok_or(ProfessionError::NoCraftingEngine(profession_id))?;
        engine.queue_recipe(recipe_id, &mut self.bank, self.balance.max_crafting_queue)
    }

    /// Cancels a queued craft and refunds its materials.
    ///
    /// # Errors
    ///
    /// `NoCraftingEngine` or `InvalidQueueIndex`.
    pub fn cancel_recipe(
        &mut self,
        profession_id: ProfessionId,
        index: usize,
    ) -> ProfessionResult<()> {
        let engine = self
            .crafting_engines
            .get_mut(&profession_id)
            .ok_or(ProfessionError::NoCraftingEngine(profession_id))?;
        let len = engine.queue().len();
        if engine.cancel(index, &mut self.bank) {
            Ok(())
        } else {
            Err(ProfessionError::InvalidQueueIndex { index, len })
        }
    }

    /// Adds a recipe to a learned profession's known list.
    ///
    /// # Errors
    ///
    /// In order of checking: `ProfessionNotLearned`, `UnknownRecipe`,
    /// `RecipeProfessionMismatch`, `RecipeAlreadyKnown`.
    pub fn learn_recipe(
        &mut self,
        profession_id: ProfessionId,
        recipe_id: &str,
    ) -> ProfessionResult<()> {
        let state = self
            .roster
            .get_mut(profession_id)
            .ok_or(ProfessionError::ProfessionNotLearned(profession_id))?;
        let recipe = self
            .catalog
            .recipe(recipe_id)
            .ok_or_else(|| ProfessionError::UnknownRecipe(recipe_id.to_string()))?;
        if recipe.profession_id != profession_id {
            return Err(ProfessionError::RecipeProfessionMismatch {
                recipe_id: recipe.id.clone(),
                owner: recipe.profession_id,
                profession_id,
            });
        }
        if state.known_recipes.iter().any(|known| known == recipe_id) {
            return Err(ProfessionError::RecipeAlreadyKnown(recipe.id.clone()));
        }

        state.known_recipes.push(recipe.id.clone());
        self.events.push(ProfessionEvent::RecipeLearned {
            profession_id,
            recipe_id: recipe.id.clone(),
        });
        Ok(())
    }

    /// Advances a learned profession to its next bracket, raising its skill
    /// ceiling. Returns the training cost for the caller to charge.
    ///
    /// Character level gates are the caller's job, see
    /// [`crate::skill::can_train_bracket`].
    ///
    /// # Errors
    ///
    /// `ProfessionNotLearned` or `MaxBracketReached`.
    pub fn train_next_bracket(&mut self, profession_id: ProfessionId) -> ProfessionResult<u32> {
        let state = self
            .roster
            .get_mut(profession_id)
            .ok_or(ProfessionError::ProfessionNotLearned(profession_id))?;
        let bracket = next_bracket(state.current_bracket)
            .ok_or(ProfessionError::MaxBracketReached(profession_id))?;

        let max_skill = get_bracket_max_skill(bracket, &self.balance.bracket_thresholds);
        let training_cost = get_bracket_training_cost(bracket);
        state.current_bracket = bracket;
        state.max_skill = max_skill;

        tracing::info!(
            "{} trained to {:?} (max skill {}, cost {})",
            profession_id,
            bracket,
            max_skill,
            training_cost
        );
        self.events.push(ProfessionEvent::BracketTrained {
            profession_id,
            bracket,
            max_skill,
            training_cost,
        });
        Ok(training_cost)
    }

    /// Adds materials from outside the profession system (quest rewards,
    /// drops). Returns the amount stored.
    pub fn add_material_to_bank(&mut self, material_id: &str, quantity: u32) -> u32 {
        self.bank.add(material_id, quantity)
    }

    /// Combat hook: skins beasts when Skinning is held.
    pub fn on_monster_kill(
        &mut self,
        monster_id: &str,
        monster_level: u32,
        is_beast: bool,
    ) -> Option<GatheringResult> {
        let gathering = self.gathering.as_mut()?;
        let mut ctx = TickContext {
            bank: &mut self.bank,
            materials: &self.catalog.materials,
            balance: &self.balance,
            rng: &mut *self.rng,
        };
        let result =
            gathering.on_monster_kill(monster_id, monster_level, is_beast, &mut self.roster, &mut ctx)?;
        push_gathered(&mut self.events, &result);
        Some(result)
    }

    /// Moves the player to another zone.
    pub fn set_zone_level(&mut self, level: u32) {
        self.zone_level = level;
        if let Some(gathering) = self.gathering.as_mut() {
            gathering.set_zone_level(level);
        }
    }

    /// Returns and clears every pending event, oldest first.
    pub fn drain_events(&mut self) -> Vec<ProfessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Offline estimate for the current professions and queues.
    #[must_use]
    pub fn estimate_offline_progress(&self, offline_seconds: u64) -> OfflineProfessionResult {
        let active_gathering_professions = self
            .gathering
            .as_ref()
            .map_or(0, |g| u32::try_from(g.professions().len()).unwrap_or(u32::MAX));
        let crafting_queue_len = self
            .crafting_engines
            .values()
            .map(|engine| engine.queue().len())
            .sum();

        estimate_offline_progress(
            &OfflineProfessionParams {
                offline_seconds,
                active_gathering_professions,
                crafting_queue_len,
            },
            &self.balance,
        )
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Save data for the whole profession system.
    #[must_use]
    pub fn serialize(&self) -> ProfessionManagerSave {
        ProfessionManagerSave {
            primary: self.roster.primary().clone(),
            secondary: self.roster.secondary().to_vec(),
            material_bank: self.bank.serialize(),
            crafting_engines: self
                .crafting_engines
                .iter()
                .map(|(&id, engine)| (id, engine.serialize()))
                .collect(),
        }
    }

    /// Replaces all state with saved data.
    ///
    /// Slots and bank are restored first, subsystems rebuilt from scratch,
    /// then saved queues pushed into the matching engines. Unknown materials,
    /// misplaced profession states and engine saves without an engine are
    /// dropped and counted; missing Secondary professions are re-created.
    pub fn deserialize(&mut self, save: &ProfessionManagerSave) -> RestoreReport {
        let (roster, dropped_profession_states, restored_secondaries) = self.repaired_roster(save);
        self.roster = roster;
        let dropped_bank_entries = self.bank.deserialize(&save.material_bank);

        self.crafting_engines.clear();
        self.rebuild_subsystems();

        let mut dropped_engine_saves = 0;
        for (profession_id, engine_save) in &save.crafting_engines {
            match self.crafting_engines.get_mut(profession_id) {
                Some(engine) => engine.deserialize(engine_save),
                None => {
                    tracing::warn!(
                        "Dropping saved crafting queue of {} ({} entries): no engine",
                        profession_id,
                        engine_save.queue.len()
                    );
                    dropped_engine_saves += 1;
                }
            }
        }

        RestoreReport {
            dropped_bank_entries,
            dropped_engine_saves,
            dropped_profession_states,
            restored_secondaries,
        }
    }

    // ------------------------------------------------------------------
    // Private
    // ------------------------------------------------------------------

    /// Roster from save data, keeping only states the catalogue allows where
    /// they were saved. Returns the roster, the dropped count and the number
    /// of re-created secondaries.
    fn repaired_roster(&self, save: &ProfessionManagerSave) -> (ProfessionRoster, usize, usize) {
        let mut seen = BTreeSet::new();
        let mut dropped = 0;

        let mut primary: [Option<ProfessionState>; PRIMARY_SLOTS] = Default::default();
        for (slot, saved) in save.primary.iter().enumerate() {
            let Some(state) = saved else {
                continue;
            };
            let id = state.profession_id;
            let allowed = matches!(
                self.catalog.kind_of(id),
                Some(ProfessionKind::Gathering | ProfessionKind::Crafting)
            );
            if !allowed || !seen.insert(id) {
                tracing::warn!("Dropping saved profession {} from primary slot {}", id, slot);
                dropped += 1;
                continue;
            }
            primary[slot] = Some(state.clone());
        }

        let mut secondary = Vec::new();
        for state in &save.secondary {
            let id = state.profession_id;
            if self.catalog.kind_of(id) != Some(ProfessionKind::Secondary) || !seen.insert(id) {
                tracing::warn!("Dropping saved secondary profession {}", id);
                dropped += 1;
                continue;
            }
            secondary.push(state.clone());
        }

        let mut restored = 0;
        for def in self.catalog.secondary_professions() {
            if seen.insert(def.id) {
                tracing::warn!("Save has no state for secondary {}, starting fresh", def.id);
                secondary.push(ProfessionState::new(def.id, self.balance.initial_max_skill()));
                restored += 1;
            }
        }

        (ProfessionRoster::from_parts(primary, secondary), dropped, restored)
    }

    /// Rebuilds the gathering system and the engine map from the roster.
    fn rebuild_subsystems(&mut self) {
        let mut gathering_ids = Vec::new();
        let mut crafting_ids = Vec::new();
        for state in self.roster.iter() {
            let id = state.profession_id;
            match self.catalog.kind_of(id) {
                Some(ProfessionKind::Gathering) => gathering_ids.push(id),
                Some(ProfessionKind::Crafting | ProfessionKind::Secondary) => crafting_ids.push(id),
                None => tracing::warn!("Learned profession {} is not in the catalogue", id),
            }
        }

        self.gathering = if gathering_ids.is_empty() {
            None
        } else {
            Some(GatheringSystem::new(gathering_ids, self.zone_level))
        };

        let mut previous = std::mem::take(&mut self.crafting_engines);
        let mut reused = 0;
        for id in crafting_ids {
            let engine = match previous.remove(&id) {
                Some(engine) => {
                    reused += 1;
                    engine
                }
                None => CraftingEngine::new(id, self.catalog.recipes_for(id)),
            };
            self.crafting_engines.insert(id, engine);
        }

        tracing::debug!(
            "Rebuilt professions: gathering {}, {} crafting engines ({} reused)",
            self.gathering.is_some(),
            self.crafting_engines.len(),
            reused
        );
    }
}

fn push_gathered(events: &mut Vec<ProfessionEvent>, result: &GatheringResult) {
    events.push(ProfessionEvent::MaterialGathered {
        profession_id: result.profession_id,
        material_id: result.material_id.clone(),
        quantity: result.quantity,
    });
    if result.skill_up {
        events.push(ProfessionEvent::SkillUp {
            profession_id: result.profession_id,
            new_skill: result.new_skill,
        });
    }
}
