//! # Static Catalogue
//!
//! Profession definitions, the material catalogue and the recipe catalogue.
//! Loaded from TOML and integrity-checked once; read-only afterwards.
//!
//! ```toml
//! [[professions]]
//! id = "mining"
//! type = "gathering"
//!
//! [[materials]]
//! id = "mat_copper_ore"
//! tier = 1
//! stack_size = 200
//! source = "gathering"
//! gathering_profession = "mining"
//!
//! [[recipes]]
//! id = "recipe_copper_bar"
//! profession_id = "blacksmithing"
//! skill_required = 1
//! craft_time_ms = 3000
//! materials = [{ material_id = "mat_copper_ore", quantity = 3 }]
//! output = { type = "item", item_template_id = "item_copper_bar" }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{ProfessionError, ProfessionResult};
use crate::skill::{
    get_bracket_max_skill, get_bracket_required_level, get_bracket_training_cost,
};
use crate::types::{
    MaterialDefinition, ProfessionDefinition, ProfessionId, ProfessionKind, Recipe, SkillBracket,
};

/// All static data the profession system reads.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfessionCatalog {
    /// Profession definitions.
    pub professions: Vec<ProfessionDefinition>,
    /// Material catalogue.
    pub materials: Vec<MaterialDefinition>,
    /// Recipe catalogue.
    pub recipes: Vec<Recipe>,
}

impl ProfessionCatalog {
    /// Parses and validates a TOML catalogue.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCatalog` on a parse error or a failed [`Self::validate`].
    pub fn from_toml_str(text: &str) -> ProfessionResult<Self> {
        let catalog: Self =
            toml::from_str(text).map_err(|e| ProfessionError::InvalidCatalog(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Checks cross-references between professions, materials and recipes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCatalog` on duplicate ids, recipes naming an unknown
    /// material or profession, gathered materials owned by a non-gathering
    /// profession, recipes owned by a gathering profession, or zero stack
    /// sizes.
    pub fn validate(&self) -> ProfessionResult<()> {
        let mut profession_ids = HashSet::new();
        for def in &self.professions {
            if !profession_ids.insert(def.id) {
                return Err(invalid(format!("duplicate profession {}", def.id)));
            }
        }

        let mut material_ids = HashSet::new();
        for material in &self.materials {
            if !material_ids.insert(material.id.as_str()) {
                return Err(invalid(format!("duplicate material {}", material.id)));
            }
            if material.stack_size == 0 {
                return Err(invalid(format!("material {} has stack_size 0", material.id)));
            }
            if let Some(owner) = material.gathering_profession {
                if self.kind_of(owner) != Some(ProfessionKind::Gathering) {
                    return Err(invalid(format!(
                        "material {} is gathered by {owner}, which is not a gathering profession",
                        material.id
                    )));
                }
            }
        }

        let mut recipe_ids = HashSet::new();
        for recipe in &self.recipes {
            if !recipe_ids.insert(recipe.id.as_str()) {
                return Err(invalid(format!("duplicate recipe {}", recipe.id)));
            }
            match self.kind_of(recipe.profession_id) {
                None => {
                    return Err(invalid(format!(
                        "recipe {} belongs to unknown profession {}",
                        recipe.id, recipe.profession_id
                    )))
                }
                Some(ProfessionKind::Gathering) => {
                    return Err(invalid(format!(
                        "recipe {} belongs to gathering profession {}",
                        recipe.id, recipe.profession_id
                    )))
                }
                Some(ProfessionKind::Crafting | ProfessionKind::Secondary) => {}
            }
            if let Some(req) = recipe
                .materials
                .iter()
                .find(|req| !material_ids.contains(req.material_id.as_str()))
            {
                return Err(invalid(format!(
                    "recipe {} requires unknown material {}",
                    recipe.id, req.material_id
                )));
            }
        }

        Ok(())
    }

    /// Checks every non-empty `skill_brackets` table against the thresholds
    /// and the fixed cost and level tables the engine applies.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCatalog` naming the first profession and bracket that
    /// differ.
    pub fn validate_brackets(&self, bracket_thresholds: &[u32]) -> ProfessionResult<()> {
        for def in self.professions.iter().filter(|def| !def.skill_brackets.is_empty()) {
            if def.skill_brackets.len() != SkillBracket::ALL.len() {
                return Err(invalid(format!(
                    "profession {} lists {} brackets, expected {}",
                    def.id,
                    def.skill_brackets.len(),
                    SkillBracket::ALL.len()
                )));
            }
            for (row, bracket) in def.skill_brackets.iter().zip(SkillBracket::ALL) {
                let matches = row.bracket == bracket
                    && Some(row.skill_min) == bracket_thresholds.get(bracket.index()).copied()
                    && row.skill_max == get_bracket_max_skill(bracket, bracket_thresholds)
                    && row.required_level == get_bracket_required_level(bracket)
                    && row.training_cost == get_bracket_training_cost(bracket);
                if !matches {
                    return Err(invalid(format!(
                        "profession {} bracket table disagrees at {:?}",
                        def.id, bracket
                    )));
                }
            }
        }
        Ok(())
    }

    /// Definition of a profession.
    #[must_use]
    pub fn profession(&self, id: ProfessionId) -> Option<&ProfessionDefinition> {
        self.professions.iter().find(|def| def.id == id)
    }

    /// Category of a profession, if defined.
    #[must_use]
    pub fn kind_of(&self, id: ProfessionId) -> Option<ProfessionKind> {
        self.profession(id).map(|def| def.kind)
    }

    /// A recipe by id.
    #[must_use]
    pub fn recipe(&self, recipe_id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|recipe| recipe.id == recipe_id)
    }

    /// Every recipe owned by a profession.
    pub fn recipes_for(&self, id: ProfessionId) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter().filter(move |recipe| recipe.profession_id == id)
    }

    /// Every Secondary profession, in catalogue order.
    pub fn secondary_professions(&self) -> impl Iterator<Item = &ProfessionDefinition> {
        self.professions
            .iter()
            .filter(|def| def.kind == ProfessionKind::Secondary)
    }
}

fn invalid(reason: String) -> ProfessionError {
    ProfessionError::InvalidCatalog(reason)
}
