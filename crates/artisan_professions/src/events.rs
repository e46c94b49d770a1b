//! Events produced by the manager, drained by the host.
//!
//! Serialized as `{"type": ..., "payload": {...}}` records.

use serde::{Deserialize, Serialize};

use crate::types::{MaterialId, ProfessionId, RecipeId, SkillBracket};

/// One profession event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ProfessionEvent {
    /// A gather attempt produced a material.
    MaterialGathered {
        /// Gathering profession.
        profession_id: ProfessionId,
        /// Material produced.
        material_id: MaterialId,
        /// Yield of the attempt.
        quantity: u32,
    },
    /// A profession gained a skill point.
    SkillUp {
        /// The profession.
        profession_id: ProfessionId,
        /// Skill after the gain.
        new_skill: u32,
    },
    /// A queued craft completed.
    ItemCrafted {
        /// Crafting profession.
        profession_id: ProfessionId,
        /// Completed recipe.
        recipe_id: RecipeId,
        /// Item template to generate, for item recipes.
        output_item_id: Option<String>,
        /// Whether the craft raised skill.
        skill_up: bool,
        /// Skill after the craft.
        new_skill: u32,
    },
    /// A recipe was added to a profession's known list.
    RecipeLearned {
        /// The profession.
        profession_id: ProfessionId,
        /// The recipe.
        recipe_id: RecipeId,
    },
    /// A profession advanced to the next bracket.
    BracketTrained {
        /// The profession.
        profession_id: ProfessionId,
        /// New bracket.
        bracket: SkillBracket,
        /// New skill ceiling.
        max_skill: u32,
        /// Gold the caller should charge.
        training_cost: u32,
    },
}

impl ProfessionEvent {
    /// Wire name of the event type.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MaterialGathered { .. } => "material_gathered",
            Self::SkillUp { .. } => "skill_up",
            Self::ItemCrafted { .. } => "item_crafted",
            Self::RecipeLearned { .. } => "recipe_learned",
            Self::BracketTrained { .. } => "bracket_trained",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let event = ProfessionEvent::SkillUp {
            profession_id: ProfessionId::FirstAid,
            new_skill: 12,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "skill_up");
        assert_eq!(json["payload"]["profession_id"], "first_aid");
        assert_eq!(json["payload"]["new_skill"], 12);
        assert_eq!(json["type"], event.kind());
    }
}
