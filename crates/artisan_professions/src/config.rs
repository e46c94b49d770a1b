//! # Balance Configuration
//!
//! Every tunable number of the profession system, loaded once at startup from
//! a TOML file and passed explicitly to the manager. Missing keys fall back to
//! the canonical defaults.
//!
//! ```toml
//! gathering_interval_ticks = 12
//! max_crafting_queue = 10
//! bracket_thresholds = [0, 75, 150, 225, 275, 300]
//!
//! [skill_up_chances]
//! orange = 1.0
//! yellow = 0.75
//! green = 0.25
//! gray = 0.0
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ProfessionError, ProfessionResult};
use crate::types::{SkillBracket, SkillUpChances};

/// Profession balance block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfessionBalance {
    /// Ticks between passive gather attempts.
    pub gathering_interval_ticks: u32,
    /// Flat yield of a gather attempt.
    pub gathering_base_yield: u32,
    /// Extra yield per skill point (floored after multiplying).
    pub gathering_skill_bonus_per_point: f64,
    /// Average craft time used by offline estimates.
    pub craft_time_base_ms: u64,
    /// Craft time growth per recipe complexity step. Reserved for catalogue
    /// authoring; recipes carry their own `craft_time_ms` and the engine
    /// never reads this.
    pub craft_time_complexity_multiplier: f64,
    /// Maximum entries per crafting queue.
    pub max_crafting_queue: usize,
    /// Maximum unique materials in the bank.
    pub material_bank_slots: usize,
    /// Skill-up chance per difficulty colour.
    pub skill_up_chances: SkillUpChances,
    /// Ascending bracket thresholds, one per bracket.
    pub bracket_thresholds: Vec<u32>,
    /// Host tick length, used to convert ticks to seconds offline.
    pub tick_interval_ms: u64,
}

impl Default for ProfessionBalance {
    fn default() -> Self {
        Self {
            gathering_interval_ticks: 12,
            gathering_base_yield: 1,
            gathering_skill_bonus_per_point: 0.005,
            craft_time_base_ms: 3000,
            craft_time_complexity_multiplier: 1.5,
            max_crafting_queue: 10,
            material_bank_slots: 100,
            skill_up_chances: SkillUpChances::default(),
            bracket_thresholds: vec![0, 75, 150, 225, 275, 300],
            tick_interval_ms: 250,
        }
    }
}

impl ProfessionBalance {
    /// Parses and validates a TOML balance block.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` on a parse error or a failed [`Self::validate`].
    pub fn from_toml_str(text: &str) -> ProfessionResult<Self> {
        let balance: Self =
            toml::from_str(text).map_err(|e| ProfessionError::InvalidConfig(e.to_string()))?;
        balance.validate()?;
        Ok(balance)
    }

    /// Checks the invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the first offending key.
    pub fn validate(&self) -> ProfessionResult<()> {
        if self.gathering_interval_ticks == 0 {
            return Err(invalid("gathering_interval_ticks must be at least 1"));
        }
        if self.max_crafting_queue == 0 {
            return Err(invalid("max_crafting_queue must be at least 1"));
        }
        if self.material_bank_slots == 0 {
            return Err(invalid("material_bank_slots must be at least 1"));
        }
        if !self.gathering_skill_bonus_per_point.is_finite()
            || self.gathering_skill_bonus_per_point < 0.0
        {
            return Err(invalid("gathering_skill_bonus_per_point must be a non-negative number"));
        }
        if self.bracket_thresholds.len() != SkillBracket::ALL.len() {
            return Err(invalid(&format!(
                "bracket_thresholds must have {} entries, got {}",
                SkillBracket::ALL.len(),
                self.bracket_thresholds.len()
            )));
        }
        if self.bracket_thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(invalid("bracket_thresholds must be strictly ascending"));
        }

        let chances = self.skill_up_chances;
        for (name, chance) in [
            ("orange", chances.orange),
            ("yellow", chances.yellow),
            ("green", chances.green),
            ("gray", chances.gray),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(invalid(&format!(
                    "skill_up_chances.{name} must be within [0, 1], got {chance}"
                )));
            }
        }

        Ok(())
    }

    /// Skill ceiling of a freshly learned profession.
    #[must_use]
    pub fn initial_max_skill(&self) -> u32 {
        self.bracket_thresholds.get(1).copied().unwrap_or(75)
    }
}

fn invalid(reason: &str) -> ProfessionError {
    ProfessionError::InvalidConfig(reason.to_string())
}
