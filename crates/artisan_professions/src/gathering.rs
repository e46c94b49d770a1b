//! # Gathering
//!
//! Produces raw materials into the bank.
//!
//! Mining and Herbalism gather on a tick counter: every
//! `gathering_interval_ticks` calls to [`GatheringSystem::tick`] each of them
//! makes one attempt at the current zone level. Skinning only gathers from
//! [`GatheringSystem::on_monster_kill`], at the monster's level.
//!
//! An attempt resolves the level to a tier, filters the material catalogue to
//! what the profession can reach at its skill, picks one material uniformly,
//! adds `base + floor(skill * bonus)` to the bank and rolls a skill-up.

use crate::context::TickContext;
use crate::roster::ProfessionRoster;
use crate::skill::roll_chance;
use crate::types::{
    GatheringMode, GatheringResult, MaterialDefinition, MaterialSource, MaterialTier,
    ProfessionId,
};

/// Skill points over a tier's threshold across which the gathering skill-up
/// chance decays from 1 to 0.
pub const SKILLUP_RANGE_PER_TIER: f64 = 75.0;

/// Material tier of a zone (or monster) level. Levels outside 1-60 clamp.
#[must_use]
pub const fn get_zone_material_tier(level: u32) -> MaterialTier {
    match level {
        0..=10 => MaterialTier::T1,
        11..=20 => MaterialTier::T2,
        21..=30 => MaterialTier::T3,
        31..=40 => MaterialTier::T4,
        41..=50 => MaterialTier::T5,
        _ => MaterialTier::T6,
    }
}

/// Gathering skill needed to harvest materials of a tier.
#[must_use]
pub const fn tier_skill_threshold(tier: MaterialTier) -> u32 {
    match tier {
        MaterialTier::T1 => 1,
        MaterialTier::T2 => 50,
        MaterialTier::T3 => 125,
        MaterialTier::T4 => 200,
        MaterialTier::T5 => 250,
        MaterialTier::T6 => 275,
    }
}

/// Materials a profession can gather at `zone_tier` with `skill`.
///
/// Includes every lower tier the skill reaches, in catalogue order.
#[must_use]
pub fn get_available_materials(
    materials: &[MaterialDefinition],
    profession_id: ProfessionId,
    zone_tier: MaterialTier,
    skill: u32,
) -> Vec<&MaterialDefinition> {
    materials
        .iter()
        .filter(|m| {
            m.source == MaterialSource::Gathering
                && m.gathering_profession == Some(profession_id)
                && m.tier <= zone_tier
                && tier_skill_threshold(m.tier) <= skill
        })
        .collect()
}

/// Uniform pick from `pool` with one draw in `[0, 1)`.
#[must_use]
pub fn select_gathered_material<'a>(
    pool: &[&'a MaterialDefinition],
    random: f64,
) -> Option<&'a MaterialDefinition> {
    let last = pool.len().checked_sub(1)?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let index = ((random * pool.len() as f64).floor() as usize).min(last);
    pool.get(index).copied()
}

/// Rolls a gathering skill-up.
///
/// Chance is `1 - (skill - threshold) / 75` clamped to `[0, 1]`: certain at
/// the tier's threshold, gone 75 points above it.
#[must_use]
pub fn roll_skill_up(skill: u32, material_tier: MaterialTier, random: f64) -> bool {
    let threshold = f64::from(tier_skill_threshold(material_tier));
    let progress = (f64::from(skill) - threshold) / SKILLUP_RANGE_PER_TIER;
    roll_chance((1.0 - progress).clamp(0.0, 1.0), random)
}

/// Gathering state for the primary gathering professions of one manager.
#[derive(Clone, Debug)]
pub struct GatheringSystem {
    /// Gathering professions held in primary slots.
    professions: Vec<ProfessionId>,
    zone_level: u32,
    tick_counter: u32,
    last_result: Option<GatheringResult>,
}

impl GatheringSystem {
    /// Creates a system for the given gathering professions.
    #[must_use]
    pub fn new(professions: Vec<ProfessionId>, zone_level: u32) -> Self {
        Self {
            professions,
            zone_level,
            tick_counter: 0,
            last_result: None,
        }
    }

    /// Gathering professions this system serves.
    #[must_use]
    pub fn professions(&self) -> &[ProfessionId] {
        &self.professions
    }

    /// Current zone level.
    #[inline]
    #[must_use]
    pub const fn zone_level(&self) -> u32 {
        self.zone_level
    }

    /// Moves the player to another zone.
    pub fn set_zone_level(&mut self, level: u32) {
        self.zone_level = level;
    }

    /// Result of the most recent tick that reached the interval, or of the
    /// most recent successful skinning.
    #[must_use]
    pub fn last_gather_result(&self) -> Option<&GatheringResult> {
        self.last_result.as_ref()
    }

    /// Advances one tick.
    ///
    /// On the interval tick, every tick-mode profession makes one attempt. All
    /// attempts touch the bank; only the last successful one is returned.
    pub fn tick(
        &mut self,
        roster: &mut ProfessionRoster,
        ctx: &mut TickContext<'_>,
    ) -> Option<GatheringResult> {
        self.tick_counter += 1;
        if self.tick_counter < ctx.balance.gathering_interval_ticks {
            return None;
        }
        self.tick_counter = 0;

        let mut last = None;
        for &profession_id in &self.professions {
            if profession_id.gathering_mode() != Some(GatheringMode::Tick) {
                continue;
            }
            if let Some(result) = gather(profession_id, self.zone_level, roster, ctx) {
                last = Some(result);
            }
        }

        self.last_result.clone_from(&last);
        last
    }

    /// Skins a killed monster, if it is a beast and Skinning is held.
    pub fn on_monster_kill(
        &mut self,
        monster_id: &str,
        monster_level: u32,
        is_beast: bool,
        roster: &mut ProfessionRoster,
        ctx: &mut TickContext<'_>,
    ) -> Option<GatheringResult> {
        if !is_beast || !self.professions.contains(&ProfessionId::Skinning) {
            return None;
        }

        tracing::debug!("Skinning {} (level {})", monster_id, monster_level);
        let result = gather(ProfessionId::Skinning, monster_level, roster, ctx)?;
        self.last_result = Some(result.clone());
        Some(result)
    }
}

/// One gather attempt at `level`.
fn gather(
    profession_id: ProfessionId,
    level: u32,
    roster: &mut ProfessionRoster,
    ctx: &mut TickContext<'_>,
) -> Option<GatheringResult> {
    let state = roster.get_mut(profession_id)?;
    let tier = get_zone_material_tier(level);
    let pool = get_available_materials(ctx.materials, profession_id, tier, state.skill);
    if pool.is_empty() {
        return None;
    }
    let material = select_gathered_material(&pool, ctx.rng.next_f64())?;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let bonus = (f64::from(state.skill) * ctx.balance.gathering_skill_bonus_per_point).floor() as u32;
    let quantity = ctx.balance.gathering_base_yield.saturating_add(bonus);
    let stored = ctx.bank.add(&material.id, quantity);

    let mut skill_up = false;
    if state.can_skill_up() {
        skill_up = roll_skill_up(state.skill, material.tier, ctx.rng.next_f64());
        if skill_up {
            state.gain_skill_point();
        }
    }

    tracing::debug!(
        "{} gathered {} x{} (stored {}), skill {}{}",
        profession_id,
        material.id,
        quantity,
        stored,
        state.skill,
        if skill_up { " (+1)" } else { "" }
    );

    Some(GatheringResult {
        profession_id,
        material_id: material.id.clone(),
        quantity,
        skill_up,
        new_skill: state.skill,
    })
}
