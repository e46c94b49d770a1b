//! # Crafting Queue
//!
//! **Timed FIFO crafting with up-front material reservation**
//!
//! One [`CraftingEngine`] exists per active crafting-capable profession. It
//! guarantees:
//!
//! 1. **Reserved at enqueue**: materials leave the bank when a craft is
//!    queued, so a queued craft can never fail later.
//! 2. **Exact refunds**: cancelling returns exactly what was taken.
//! 3. **Variable time steps**: one `update` may complete any number of crafts;
//!    leftover time carries into the new queue head.
//!
//! Progress is a single `elapsed_ms` counter for the queue head only.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut engine = CraftingEngine::new(ProfessionId::Blacksmithing, &catalog.recipes);
//! engine.queue_recipe("recipe_copper_bar", &mut bank, balance.max_crafting_queue)?;
//!
//! let results = engine.update(3000, &mut state, &mut ctx);
//! assert_eq!(results[0].output_item_id.as_deref(), Some("item_copper_bar"));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::ProfessionBalance;
use crate::context::TickContext;
use crate::error::{ProfessionError, ProfessionResult};
use crate::material_bank::MaterialBank;
use crate::rng::RandomSource;
use crate::skill::{get_recipe_difficulty, roll_craft_skill_up};
use crate::types::{
    CraftingQueueEntry, CraftingResult, ProfessionId, ProfessionState, Recipe, RecipeId,
    RecipeMaterial, RecipeOutput,
};

/// Persisted state of one engine: the queue and the head's progress.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftingEngineSave {
    /// Queue entries, head first.
    pub queue: Vec<CraftingQueueEntry>,
    /// Progress of the head entry.
    pub elapsed_ms: u64,
}

/// Crafting queue of one profession.
#[derive(Clone, Debug)]
pub struct CraftingEngine {
    profession_id: ProfessionId,
    /// Recipes owned by the profession, by id.
    recipes: HashMap<RecipeId, Recipe>,
    queue: VecDeque<CraftingQueueEntry>,
    elapsed_ms: u64,
}

impl CraftingEngine {
    /// Creates an empty engine over the profession's recipes.
    ///
    /// Recipes owned by other professions are ignored.
    #[must_use]
    pub fn new<'a>(
        profession_id: ProfessionId,
        recipes: impl IntoIterator<Item = &'a Recipe>,
    ) -> Self {
        Self {
            profession_id,
            recipes: recipes
                .into_iter()
                .filter(|r| r.profession_id == profession_id)
                .map(|r| (r.id.clone(), r.clone()))
                .collect(),
            queue: VecDeque::new(),
            elapsed_ms: 0,
        }
    }

    /// The owning profession.
    #[inline]
    #[must_use]
    pub const fn profession_id(&self) -> ProfessionId {
        self.profession_id
    }

    /// A recipe this engine can craft.
    #[must_use]
    pub fn recipe(&self, recipe_id: &str) -> Option<&Recipe> {
        self.recipes.get(recipe_id)
    }

    /// Queued crafts, head first.
    #[must_use]
    pub fn queue(&self) -> &VecDeque<CraftingQueueEntry> {
        &self.queue
    }

    /// Progress of the head entry.
    #[inline]
    #[must_use]
    pub const fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Queues a craft, taking its materials from the bank.
    ///
    /// # Errors
    ///
    /// In order of checking:
    /// - `UnknownRecipe` if the recipe is not one of this profession's
    /// - `QueueFull` if `max_queue` entries are already queued
    /// - `InsufficientMaterials` naming the first short material
    ///
    /// Nothing changes on failure.
    pub fn queue_recipe(
        &mut self,
        recipe_id: &str,
        bank: &mut MaterialBank,
        max_queue: usize,
    ) -> ProfessionResult<()> {
        let recipe = self
            .recipes
            .get(recipe_id)
            .ok_or_else(|| ProfessionError::UnknownRecipe(recipe_id.to_string()))?;

        if self.queue.len() >= max_queue {
            return Err(ProfessionError::QueueFull {
                capacity: max_queue,
            });
        }

        // Same material listed twice must be checked as one total
        let requirements = merged_requirements(&recipe.materials);
        if let Some((req, available)) = bank.first_shortfall(&requirements) {
            return Err(ProfessionError::InsufficientMaterials {
                material_id: req.material_id.clone(),
                required: req.quantity,
                available,
            });
        }

        for req in &requirements {
            let removed = bank.remove(&req.material_id, req.quantity);
            debug_assert!(removed, "shortfall check passed but remove failed");
        }

        let started_at = now_ms();
        self.queue.push_back(CraftingQueueEntry {
            recipe_id: recipe.id.clone(),
            started_at,
            completes_at: started_at.saturating_add(recipe.craft_time_ms),
        });

        tracing::debug!(
            "{} queued {} ({} in queue)",
            self.profession_id,
            recipe.id,
            self.queue.len()
        );
        Ok(())
    }

    /// Advances the queue by `delta_ms`.
    ///
    /// Completes as many crafts as the time covers, in FIFO order; leftover
    /// time goes to the new head. Entries whose recipe no longer resolves are
    /// dropped.
    pub fn update(
        &mut self,
        delta_ms: u64,
        state: &mut ProfessionState,
        ctx: &mut TickContext<'_>,
    ) -> Vec<CraftingResult> {
        let mut results = Vec::new();
        let mut remaining = delta_ms;

        while remaining > 0 {
            let Some(head) = self.queue.front() else {
                break;
            };

            let Some(recipe) = self.recipes.get(&head.recipe_id) else {
                tracing::warn!(
                    "{} dropping queued craft for unknown recipe {}",
                    self.profession_id,
                    head.recipe_id
                );
                self.queue.pop_front();
                self.elapsed_ms = 0;
                continue;
            };

            let needed = recipe.craft_time_ms.saturating_sub(self.elapsed_ms);
            if remaining < needed {
                self.elapsed_ms += remaining;
                break;
            }

            remaining -= needed;
            self.elapsed_ms = 0;
            self.queue.pop_front();
            results.push(complete_craft(recipe, state, ctx.balance, ctx.rng));
        }

        results
    }

    /// Cancels the entry at `index` and refunds its materials.
    ///
    /// Returns `false` for an out-of-range index. Head progress is reset only
    /// when the head is cancelled.
    pub fn cancel(&mut self, index: usize, bank: &mut MaterialBank) -> bool {
        let Some(entry) = self.queue.remove(index) else {
            return false;
        };
        if index == 0 {
            self.elapsed_ms = 0;
        }

        match self.recipes.get(&entry.recipe_id) {
            Some(recipe) => {
                for req in &recipe.materials {
                    let refunded = bank.restore(&req.material_id, req.quantity);
                    if refunded < req.quantity {
                        tracing::warn!(
                            "Refund of {} clipped: {} of {} returned",
                            req.material_id,
                            refunded,
                            req.quantity
                        );
                    }
                }
            }
            None => tracing::warn!(
                "{} cancelled craft for unknown recipe {}, nothing to refund",
                self.profession_id,
                entry.recipe_id
            ),
        }

        tracing::debug!("{} cancelled {} at {}", self.profession_id, entry.recipe_id, index);
        true
    }

    /// Save data for this engine.
    #[must_use]
    pub fn serialize(&self) -> CraftingEngineSave {
        CraftingEngineSave {
            queue: self.queue.iter().cloned().collect(),
            elapsed_ms: self.elapsed_ms,
        }
    }

    /// Restores the queue and head progress verbatim.
    pub fn deserialize(&mut self, save: &CraftingEngineSave) {
        self.queue = save.queue.iter().cloned().collect();
        self.elapsed_ms = save.elapsed_ms;
    }
}

/// Resolves a finished craft: difficulty, skill-up roll, output.
fn complete_craft(
    recipe: &Recipe,
    state: &mut ProfessionState,
    balance: &ProfessionBalance,
    rng: &mut dyn RandomSource,
) -> CraftingResult {
    let difficulty = get_recipe_difficulty(recipe.skill_required, state.skill);
    let chances = recipe.skill_up_chance.unwrap_or(balance.skill_up_chances);

    let mut skill_up = false;
    if state.can_skill_up() {
        skill_up = roll_craft_skill_up(difficulty, &chances, rng.next_f64());
        if skill_up {
            state.gain_skill_point();
        }
    }

    let mut result = CraftingResult {
        recipe_id: recipe.id.clone(),
        output_item_id: None,
        consumable_effect: None,
        enchant_effect: None,
        skill_up,
        new_skill: state.skill,
    };
    match &recipe.output {
        RecipeOutput::Item {
            item_template_id, ..
        } => result.output_item_id = Some(item_template_id.clone()),
        RecipeOutput::Consumable { effect, .. } => result.consumable_effect = Some(effect.clone()),
        RecipeOutput::Enchantment { effect } => result.enchant_effect = Some(effect.clone()),
    }

    tracing::debug!(
        "{} crafted {} ({:?}), skill {}{}",
        state.profession_id,
        recipe.id,
        difficulty,
        state.skill,
        if skill_up { " (+1)" } else { "" }
    );
    result
}

/// Sums repeated materials into one requirement each, first-seen order.
fn merged_requirements(materials: &[RecipeMaterial]) -> Vec<RecipeMaterial> {
    let mut order = Vec::new();
    let mut totals: BTreeMap<&str, u32> = BTreeMap::new();
    for req in materials {
        let total = totals.entry(req.material_id.as_str()).or_insert_with(|| {
            order.push(req.material_id.as_str());
            0
        });
        *total = total.saturating_add(req.quantity);
    }
    order
        .into_iter()
        .map(|id| RecipeMaterial::new(id, totals.get(id).copied().unwrap_or(0)))
        .collect()
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        ConsumableEffect, MaterialDefinition, MaterialSource, MaterialTier, SkillUpChances,
    };

    const COPPER: &str = "mat_copper_ore";
    const TIN: &str = "mat_tin_ore";

    fn material(id: &str) -> MaterialDefinition {
        MaterialDefinition {
            id: id.to_string(),
            name: id.to_string(),
            tier: MaterialTier::T1,
            stack_size: 200,
            vendor_price: 1,
            source: MaterialSource::Gathering,
            gathering_profession: Some(ProfessionId::Mining),
        }
    }

    fn item_recipe(id: &str, materials: Vec<RecipeMaterial>, craft_time_ms: u64) -> Recipe {
        Recipe {
            id: id.to_string(),
            profession_id: ProfessionId::Blacksmithing,
            name: id.to_string(),
            skill_required: 1,
            skill_up_chance: None,
            materials,
            craft_time_ms,
            output: RecipeOutput::Item {
                item_template_id: format!("item_{id}"),
                quantity: 1,
                item_level: None,
                quality: None,
            },
        }
    }

    fn create_test_recipes() -> Vec<Recipe> {
        vec![
            // 3 Copper -> Copper Bar
            item_recipe("copper_bar", vec![RecipeMaterial::new(COPPER, 3)], 3000),
            // 1 Copper + 1 Tin -> Bronze Bar
            item_recipe(
                "bronze_bar",
                vec![RecipeMaterial::new(COPPER, 1), RecipeMaterial::new(TIN, 1)],
                3000,
            ),
            Recipe {
                id: "spiced_wolf".to_string(),
                profession_id: ProfessionId::Cooking,
                name: "Spiced Wolf".to_string(),
                skill_required: 1,
                skill_up_chance: None,
                materials: vec![],
                craft_time_ms: 1000,
                output: RecipeOutput::Consumable {
                    effect: ConsumableEffect {
                        id: "food_spiced_wolf".to_string(),
                        name: "Well Fed".to_string(),
                        duration_ms: 60_000,
                        stat_bonuses: BTreeMap::new(),
                        description: String::new(),
                    },
                    quantity: 1,
                },
            },
        ]
    }

    struct Fixture {
        materials: Vec<MaterialDefinition>,
        bank: MaterialBank,
        balance: ProfessionBalance,
        state: ProfessionState,
        engine: CraftingEngine,
    }

    impl Fixture {
        fn new() -> Self {
            let materials = vec![material(COPPER), material(TIN)];
            let mut bank = MaterialBank::new(&materials, 100);
            bank.add(COPPER, 10);
            bank.add(TIN, 10);
            Self {
                materials,
                bank,
                balance: ProfessionBalance::default(),
                state: ProfessionState::new(ProfessionId::Blacksmithing, 75),
                engine: CraftingEngine::new(ProfessionId::Blacksmithing, &create_test_recipes()),
            }
        }

        fn queue(&mut self, recipe_id: &str) -> ProfessionResult<()> {
            self.engine.queue_recipe(recipe_id, &mut self.bank, self.balance.max_crafting_queue)
        }

        fn update(&mut self, delta_ms: u64, random: f64) -> Vec<CraftingResult> {
            let mut rng = move || random;
            let mut ctx = TickContext {
                bank: &mut self.bank,
                materials: &self.materials,
                balance: &self.balance,
                rng: &mut rng,
            };
            self.engine.update(delta_ms, &mut self.state, &mut ctx)
        }
    }

    #[test]
    fn test_engine_only_takes_own_recipes() {
        let fx = Fixture::new();
        assert!(fx.engine.recipe("copper_bar").is_some());
        assert!(fx.engine.recipe("spiced_wolf").is_none());
    }

    #[test]
    fn test_queue_deducts_materials_up_front() {
        let mut fx = Fixture::new();
        fx.queue("copper_bar").unwrap();

        assert_eq!(fx.bank.get_quantity(COPPER), 7); // 10 - 3
        assert_eq!(fx.engine.queue().len(), 1);
        let entry = &fx.engine.queue()[0];
        assert_eq!(entry.completes_at - entry.started_at, 3000);
    }

    #[test]
    fn test_single_completion_at_exact_time() {
        let mut fx = Fixture::new();
        fx.queue("copper_bar").unwrap();

        assert!(fx.update(2999, 0.0).is_empty());
        assert_eq!(fx.engine.elapsed_ms(), 2999);

        let results = fx.update(1, 0.0);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].output_item_id.as_deref(), Some("item_copper_bar"));
        assert!(fx.engine.queue().is_empty());
        assert_eq!(fx.engine.elapsed_ms(), 0);
    }

    #[test]
    fn test_multiple_completions_in_one_update() {
        let mut fx = Fixture::new();
        fx.queue("copper_bar").unwrap();
        fx.queue("bronze_bar").unwrap();

        let results = fx.update(6000, 0.0);
        let ids: Vec<_> = results.iter().map(|r| r.recipe_id.as_str()).collect();
        assert_eq!(ids, vec!["copper_bar", "bronze_bar"]);
    }

    #[test]
    fn test_leftover_time_carries_to_next_head() {
        let mut fx = Fixture::new();
        fx.queue("copper_bar").unwrap();
        fx.queue("copper_bar").unwrap();

        assert_eq!(fx.update(4500, 0.0).len(), 1);
        assert_eq!(fx.engine.elapsed_ms(), 1500);
        assert_eq!(fx.update(1500, 0.0).len(), 1);
    }

    #[test]
    fn test_queue_rejections_leave_state_untouched() {
        let mut fx = Fixture::new();

        assert_eq!(
            fx.queue("mithril_spurs"),
            Err(ProfessionError::UnknownRecipe("mithril_spurs".to_string()))
        );

        fx.bank.remove(TIN, 10);
        assert_eq!(
            fx.queue("bronze_bar"),
            Err(ProfessionError::InsufficientMaterials {
                material_id: TIN.to_string(),
                required: 1,
                available: 0,
            })
        );
        // Copper was not touched by the failed attempt
        assert_eq!(fx.bank.get_quantity(COPPER), 10);
        assert!(fx.engine.queue().is_empty());
    }

    #[test]
    fn test_queue_full() {
        let mut fx = Fixture::new();
        fx.balance.max_crafting_queue = 2;
        fx.queue("bronze_bar").unwrap();
        fx.queue("bronze_bar").unwrap();

        assert_eq!(
            fx.queue("bronze_bar"),
            Err(ProfessionError::QueueFull { capacity: 2 })
        );
        assert_eq!(fx.bank.get_quantity(COPPER), 8);
    }

    #[test]
    fn test_duplicate_material_lines_checked_as_total() {
        let materials = vec![material(COPPER)];
        let mut bank = MaterialBank::new(&materials, 100);
        bank.add(COPPER, 4);
        let recipe = item_recipe(
            "double_copper",
            vec![RecipeMaterial::new(COPPER, 3), RecipeMaterial::new(COPPER, 3)],
            1000,
        );
        let mut engine = CraftingEngine::new(ProfessionId::Blacksmithing, [&recipe]);

        let err = engine.queue_recipe("double_copper", &mut bank, 10).unwrap_err();
        assert!(matches!(err, ProfessionError::InsufficientMaterials { required: 6, .. }));
        assert_eq!(bank.get_quantity(COPPER), 4);
    }

    #[test]
    fn test_cancel_refunds_exactly() {
        let mut fx = Fixture::new();
        fx.queue("copper_bar").unwrap();
        fx.queue("bronze_bar").unwrap();
        fx.update(1000, 0.0);

        // Cancelling a non-head entry keeps head progress
        assert!(fx.engine.cancel(1, &mut fx.bank));
        assert_eq!(fx.engine.elapsed_ms(), 1000);
        assert_eq!(fx.bank.get_quantity(TIN), 10);

        // Cancelling the head resets it
        assert!(fx.engine.cancel(0, &mut fx.bank));
        assert_eq!(fx.engine.elapsed_ms(), 0);
        assert_eq!(fx.bank.get_quantity(COPPER), 10);

        assert!(!fx.engine.cancel(0, &mut fx.bank));
    }

    #[test]
    fn test_cancel_refunds_into_full_bank() {
        let materials = vec![material(COPPER), material(TIN)];
        let mut bank = MaterialBank::new(&materials, 1);
        bank.add(COPPER, 3);
        let mut engine = CraftingEngine::new(ProfessionId::Blacksmithing, &create_test_recipes());

        // Queueing takes the last copper and frees the only slot
        engine.queue_recipe("copper_bar", &mut bank, 10).unwrap();
        assert_eq!(bank.add(TIN, 1), 1);

        assert!(engine.cancel(0, &mut bank));
        assert_eq!(bank.get_quantity(COPPER), 3);
        assert_eq!(bank.get_quantity(TIN), 1);
    }

    #[test]
    fn test_unknown_recipe_entry_dropped() {
        let mut fx = Fixture::new();
        fx.queue("copper_bar").unwrap();
        let mut save = fx.engine.serialize();
        save.queue.insert(
            0,
            CraftingQueueEntry {
                recipe_id: "removed_recipe".to_string(),
                started_at: 0,
                completes_at: 0,
            },
        );
        save.elapsed_ms = 500;
        fx.engine.deserialize(&save);

        let results = fx.update(3000, 0.0);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].recipe_id, "copper_bar");
    }

    #[test]
    fn test_skill_up_respects_difficulty_and_cap() {
        let mut fx = Fixture::new();
        fx.state.skill = 100;
        fx.state.max_skill = 150;
        // skill_required 1 vs skill 100: Gray, never skills up
        fx.queue("copper_bar").unwrap();
        let results = fx.update(3000, 0.0);
        assert!(!results[0].skill_up);
        assert_eq!(results[0].new_skill, 100);

        // Orange at the cap: no roll, no gain
        fx.state.skill = 1;
        fx.state.max_skill = 1;
        fx.queue("copper_bar").unwrap();
        let results = fx.update(3000, 0.0);
        assert!(!results[0].skill_up);
        assert_eq!(fx.state.skill, 1);
    }

    #[test]
    fn test_recipe_chance_overrides_balance() {
        let materials = vec![material(COPPER)];
        let mut bank = MaterialBank::new(&materials, 100);
        let mut recipe = item_recipe("free_bar", vec![], 10);
        recipe.skill_up_chance = Some(SkillUpChances {
            orange: 0.0,
            ..SkillUpChances::default()
        });
        let mut engine = CraftingEngine::new(ProfessionId::Blacksmithing, [&recipe]);
        let mut state = ProfessionState::new(ProfessionId::Blacksmithing, 75);
        let balance = ProfessionBalance::default();
        let mut rng = || 0.0;

        engine.queue_recipe("free_bar", &mut bank, 10).unwrap();
        let mut ctx = TickContext {
            bank: &mut bank,
            materials: &materials,
            balance: &balance,
            rng: &mut rng,
        };
        let results = engine.update(10, &mut state, &mut ctx);
        assert!(!results[0].skill_up);
    }

    #[test]
    fn test_consumable_output() {
        let materials = vec![material(COPPER)];
        let mut bank = MaterialBank::new(&materials, 100);
        let mut engine = CraftingEngine::new(ProfessionId::Cooking, &create_test_recipes());
        let mut state = ProfessionState::new(ProfessionId::Cooking, 75);
        let balance = ProfessionBalance::default();
        let mut rng = || 0.5;

        engine.queue_recipe("spiced_wolf", &mut bank, 10).unwrap();
        let mut ctx = TickContext {
            bank: &mut bank,
            materials: &materials,
            balance: &balance,
            rng: &mut rng,
        };
        let results = engine.update(1000, &mut state, &mut ctx);
        assert_eq!(results[0].output_item_id, None);
        assert_eq!(
            results[0].consumable_effect.as_ref().map(|e| e.id.as_str()),
            Some("food_spiced_wolf")
        );
        assert!(results[0].skill_up);
        assert_eq!(state.skill, 2);
    }

    #[test]
    fn test_serialize_roundtrip() {
        let mut fx = Fixture::new();
        fx.queue("copper_bar").unwrap();
        fx.queue("bronze_bar").unwrap();
        fx.update(1234, 0.0);
        let save = fx.engine.serialize();

        let mut restored = CraftingEngine::new(ProfessionId::Blacksmithing, &create_test_recipes());
        restored.deserialize(&save);
        assert_eq!(restored.serialize(), save);
        assert_eq!(restored.elapsed_ms(), 1234);
    }
}
