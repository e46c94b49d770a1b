//! # Skill Progression
//!
//! Pure functions: recipe difficulty colour, craft skill-up rolls, bracket
//! membership and bracket costs. Gathering skill-ups use their own formula in
//! [`crate::gathering::roll_skill_up`].

use crate::types::{RecipeDifficulty, SkillBracket, SkillUpChances};

/// Training cost (gold) per bracket, strictly increasing.
const BRACKET_TRAINING_COSTS: [u32; 6] = [10, 50, 100, 250, 500, 1000];

/// Minimum character level per bracket, strictly increasing.
const BRACKET_REQUIRED_LEVELS: [u32; 6] = [1, 10, 20, 35, 45, 55];

/// Fallback ceiling when the threshold table is empty.
const DEFAULT_MAX_SKILL: u32 = 300;

/// Difficulty colour of a recipe at the given skill.
///
/// Orange when `recipe_skill_req >= skill`, Yellow down to `skill - 25`,
/// Green down to `skill - 50`, Gray below. Each boundary is inclusive.
#[must_use]
pub const fn get_recipe_difficulty(recipe_skill_req: u32, skill: u32) -> RecipeDifficulty {
    if recipe_skill_req >= skill {
        RecipeDifficulty::Orange
    } else if recipe_skill_req >= skill.saturating_sub(25) {
        RecipeDifficulty::Yellow
    } else if recipe_skill_req >= skill.saturating_sub(50) {
        RecipeDifficulty::Green
    } else {
        RecipeDifficulty::Gray
    }
}

/// Rolls a craft skill-up. `random` is a draw in `[0, 1)`.
#[must_use]
pub fn roll_craft_skill_up(
    difficulty: RecipeDifficulty,
    chances: &SkillUpChances,
    random: f64,
) -> bool {
    roll_chance(chances.for_difficulty(difficulty), random)
}

/// `random < chance`, with exact answers at the ends of the range.
#[inline]
#[must_use]
pub(crate) fn roll_chance(chance: f64, random: f64) -> bool {
    if chance <= 0.0 {
        return false;
    }
    if chance >= 1.0 {
        return true;
    }
    random < chance
}

/// Highest bracket whose threshold is at or below `skill`.
#[must_use]
pub fn get_bracket_for_skill(skill: u32, bracket_thresholds: &[u32]) -> SkillBracket {
    bracket_thresholds
        .iter()
        .zip(SkillBracket::ALL)
        .rev()
        .find(|&(&threshold, _)| skill >= threshold)
        .map_or(SkillBracket::Apprentice, |(_, bracket)| bracket)
}

/// Skill ceiling of a bracket: the next bracket's threshold, or the last
/// threshold for the top bracket.
#[must_use]
pub fn get_bracket_max_skill(bracket: SkillBracket, bracket_thresholds: &[u32]) -> u32 {
    bracket_thresholds
        .get(bracket.index() + 1)
        .or_else(|| bracket_thresholds.last())
        .copied()
        .unwrap_or(DEFAULT_MAX_SKILL)
}

/// Gold needed to train a bracket.
#[must_use]
pub const fn get_bracket_training_cost(bracket: SkillBracket) -> u32 {
    BRACKET_TRAINING_COSTS[bracket.index()]
}

/// Character level needed to train a bracket.
#[must_use]
pub const fn get_bracket_required_level(bracket: SkillBracket) -> u32 {
    BRACKET_REQUIRED_LEVELS[bracket.index()]
}

/// Whether a character of `character_level` may train `bracket`.
#[must_use]
pub const fn can_train_bracket(bracket: SkillBracket, character_level: u32) -> bool {
    character_level >= get_bracket_required_level(bracket)
}

/// The bracket after `bracket`, or `None` at Grandmaster.
#[must_use]
pub fn next_bracket(bracket: SkillBracket) -> Option<SkillBracket> {
    SkillBracket::ALL.get(bracket.index() + 1).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLDS: [u32; 6] = [0, 75, 150, 225, 275, 300];

    #[test]
    fn test_difficulty_boundaries() {
        assert_eq!(get_recipe_difficulty(100, 100), RecipeDifficulty::Orange);
        assert_eq!(get_recipe_difficulty(120, 100), RecipeDifficulty::Orange);
        assert_eq!(get_recipe_difficulty(99, 100), RecipeDifficulty::Yellow);
        assert_eq!(get_recipe_difficulty(75, 100), RecipeDifficulty::Yellow);
        assert_eq!(get_recipe_difficulty(74, 100), RecipeDifficulty::Green);
        assert_eq!(get_recipe_difficulty(50, 100), RecipeDifficulty::Green);
        assert_eq!(get_recipe_difficulty(49, 100), RecipeDifficulty::Gray);
        assert_eq!(get_recipe_difficulty(0, 100), RecipeDifficulty::Gray);
    }

    #[test]
    fn test_difficulty_at_low_skill_never_gray() {
        // skill - 25 and skill - 50 underflow to 0, so every recipe >= 0 qualifies
        assert_eq!(get_recipe_difficulty(0, 10), RecipeDifficulty::Yellow);
        assert_eq!(get_recipe_difficulty(0, 30), RecipeDifficulty::Green);
        assert_eq!(get_recipe_difficulty(1, 1), RecipeDifficulty::Orange);
    }

    #[test]
    fn test_difficulty_monotone() {
        let rank = |d: RecipeDifficulty| match d {
            RecipeDifficulty::Orange => 3,
            RecipeDifficulty::Yellow => 2,
            RecipeDifficulty::Green => 1,
            RecipeDifficulty::Gray => 0,
        };
        let skill = 200;
        let mut previous = rank(get_recipe_difficulty(skill + 10, skill));
        for req in (0..=skill + 10).rev() {
            let current = rank(get_recipe_difficulty(req, skill));
            assert!(current <= previous, "difficulty rose as recipe got easier at {req}");
            previous = current;
        }
    }

    #[test]
    fn test_craft_roll_uses_chance_table() {
        let chances = SkillUpChances::default();
        assert!(roll_craft_skill_up(RecipeDifficulty::Orange, &chances, 0.999));
        assert!(roll_craft_skill_up(RecipeDifficulty::Yellow, &chances, 0.74));
        assert!(!roll_craft_skill_up(RecipeDifficulty::Yellow, &chances, 0.75));
        assert!(roll_craft_skill_up(RecipeDifficulty::Green, &chances, 0.24));
        assert!(!roll_craft_skill_up(RecipeDifficulty::Green, &chances, 0.25));
        assert!(!roll_craft_skill_up(RecipeDifficulty::Gray, &chances, 0.0));
    }

    #[test]
    fn test_bracket_for_skill() {
        assert_eq!(get_bracket_for_skill(0, &THRESHOLDS), SkillBracket::Apprentice);
        assert_eq!(get_bracket_for_skill(74, &THRESHOLDS), SkillBracket::Apprentice);
        assert_eq!(get_bracket_for_skill(75, &THRESHOLDS), SkillBracket::Journeyman);
        assert_eq!(get_bracket_for_skill(224, &THRESHOLDS), SkillBracket::Expert);
        assert_eq!(get_bracket_for_skill(275, &THRESHOLDS), SkillBracket::Master);
        assert_eq!(get_bracket_for_skill(300, &THRESHOLDS), SkillBracket::Grandmaster);
        assert_eq!(get_bracket_for_skill(999, &THRESHOLDS), SkillBracket::Grandmaster);
    }

    #[test]
    fn test_bracket_max_skill() {
        assert_eq!(get_bracket_max_skill(SkillBracket::Apprentice, &THRESHOLDS), 75);
        assert_eq!(get_bracket_max_skill(SkillBracket::Artisan, &THRESHOLDS), 275);
        assert_eq!(get_bracket_max_skill(SkillBracket::Master, &THRESHOLDS), 300);
        assert_eq!(get_bracket_max_skill(SkillBracket::Grandmaster, &THRESHOLDS), 300);
        assert_eq!(get_bracket_max_skill(SkillBracket::Expert, &[]), DEFAULT_MAX_SKILL);
    }

    #[test]
    fn test_costs_and_levels_strictly_increase() {
        for pair in SkillBracket::ALL.windows(2) {
            assert!(get_bracket_training_cost(pair[0]) < get_bracket_training_cost(pair[1]));
            assert!(get_bracket_required_level(pair[0]) < get_bracket_required_level(pair[1]));
        }
        assert_eq!(get_bracket_training_cost(SkillBracket::Grandmaster), 1000);
        assert_eq!(get_bracket_required_level(SkillBracket::Artisan), 35);
    }

    #[test]
    fn test_training_gates() {
        assert!(can_train_bracket(SkillBracket::Journeyman, 10));
        assert!(!can_train_bracket(SkillBracket::Journeyman, 9));
        assert_eq!(next_bracket(SkillBracket::Apprentice), Some(SkillBracket::Journeyman));
        assert_eq!(next_bracket(SkillBracket::Grandmaster), None);
    }
}
