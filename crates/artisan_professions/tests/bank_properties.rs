//! Property-based tests for material bank invariants
//!
//! Validates:
//! - Quantities never exceed the material's stack size
//! - Unique materials never exceed the bank capacity
//! - A failed `remove` changes nothing; a depleting one frees the slot
//! - Enqueue/cancel through a crafting engine conserves materials

use artisan_professions::types::{MaterialSource, MaterialTier, RecipeOutput};
use artisan_professions::{
    CraftingEngine, MaterialBank, MaterialDefinition, ProfessionId, Recipe, RecipeMaterial,
};
use proptest::prelude::*;

const MATERIAL_IDS: [&str; 6] = [
    "mat_copper_ore",
    "mat_tin_ore",
    "mat_iron_ore",
    "mat_peacebloom",
    "mat_silverleaf",
    "mat_light_leather",
];

fn materials() -> Vec<MaterialDefinition> {
    MATERIAL_IDS
        .iter()
        .zip([200, 200, 50, 20, 20, 10])
        .map(|(&id, stack_size)| MaterialDefinition {
            id: id.to_string(),
            name: id.to_string(),
            tier: MaterialTier::T1,
            stack_size,
            vendor_price: 1,
            source: MaterialSource::Gathering,
            gathering_profession: None,
        })
        .collect()
}

#[derive(Clone, Debug)]
enum BankOp {
    Add(usize, u32),
    Remove(usize, u32),
}

fn bank_op() -> impl Strategy<Value = BankOp> {
    prop_oneof![
        (0..MATERIAL_IDS.len(), 0u32..300).prop_map(|(i, q)| BankOp::Add(i, q)),
        (0..MATERIAL_IDS.len(), 0u32..300).prop_map(|(i, q)| BankOp::Remove(i, q)),
    ]
}

proptest! {
    /// Property: stack and capacity bounds hold after any operation sequence
    #[test]
    fn bank_bounds_hold(
        capacity in 1usize..6,
        ops in prop::collection::vec(bank_op(), 0..200),
    ) {
        let materials = materials();
        let mut bank = MaterialBank::new(&materials, capacity);

        for op in ops {
            match op {
                BankOp::Add(i, q) => {
                    let before = bank.get_quantity(MATERIAL_IDS[i]);
                    let added = bank.add(MATERIAL_IDS[i], q);
                    prop_assert!(added <= q);
                    prop_assert_eq!(bank.get_quantity(MATERIAL_IDS[i]), before + added);
                }
                BankOp::Remove(i, q) => {
                    let before = bank.get_quantity(MATERIAL_IDS[i]);
                    let removed = bank.remove(MATERIAL_IDS[i], q);
                    let after = bank.get_quantity(MATERIAL_IDS[i]);
                    if removed {
                        prop_assert_eq!(after, before - q);
                    } else {
                        prop_assert_eq!(after, before, "failed remove mutated the bank");
                    }
                }
            }

            prop_assert!(bank.unique_count() <= capacity);
            for entry in bank.get_all() {
                let stack_size = bank.definition(&entry.material_id).map(|d| d.stack_size);
                prop_assert!(entry.quantity > 0);
                prop_assert!(Some(entry.quantity) <= stack_size);
            }
        }
    }

    /// Property: removing a full stack deletes the entry
    #[test]
    fn depleting_remove_frees_slot(index in 0..MATERIAL_IDS.len(), quantity in 1u32..10) {
        let materials = materials();
        let mut bank = MaterialBank::new(&materials, 1);
        let id = MATERIAL_IDS[index];

        prop_assert_eq!(bank.add(id, quantity), quantity);
        prop_assert!(bank.remove(id, quantity));
        prop_assert_eq!(bank.unique_count(), 0);
        prop_assert!(bank.get_all().is_empty());
    }

    /// Property: queue then cancel returns the bank to where it started
    #[test]
    fn queue_cancel_conserves_materials(
        copper in 0u32..200,
        tin in 0u32..200,
        attempts in 1usize..15,
    ) {
        let materials = materials();
        let mut bank = MaterialBank::new(&materials, 10);
        bank.add("mat_copper_ore", copper);
        bank.add("mat_tin_ore", tin);
        let before = bank.get_all();

        let recipe = Recipe {
            id: "recipe_bronze_bar".to_string(),
            profession_id: ProfessionId::Blacksmithing,
            name: "Bronze Bar".to_string(),
            skill_required: 1,
            skill_up_chance: None,
            materials: vec![
                RecipeMaterial::new("mat_copper_ore", 3),
                RecipeMaterial::new("mat_tin_ore", 2),
            ],
            craft_time_ms: 3000,
            output: RecipeOutput::Item {
                item_template_id: "item_bronze_bar".to_string(),
                quantity: 1,
                item_level: None,
                quality: None,
            },
        };
        let mut engine = CraftingEngine::new(ProfessionId::Blacksmithing, [&recipe]);

        let mut queued = 0_u32;
        for _ in 0..attempts {
            if engine.queue_recipe("recipe_bronze_bar", &mut bank, 10).is_ok() {
                queued += 1;
            }
        }
        prop_assert_eq!(bank.get_quantity("mat_copper_ore") + 3 * queued, copper);
        prop_assert_eq!(bank.get_quantity("mat_tin_ore") + 2 * queued, tin);

        while engine.cancel(0, &mut bank) {}
        prop_assert_eq!(bank.get_all(), before);
    }
}
