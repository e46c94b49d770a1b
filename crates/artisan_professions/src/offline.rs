//! # Offline Progress Estimate
//!
//! Statistical estimate of what an absent player's professions would have
//! produced. Nothing is simulated and no state changes; the host decides
//! whether and how to grant the estimate.

use serde::{Deserialize, Serialize};

use crate::config::ProfessionBalance;

/// Inputs to [`estimate_offline_progress`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OfflineProfessionParams {
    /// Seconds the player was away.
    pub offline_seconds: u64,
    /// Gathering professions held in primary slots.
    pub active_gathering_professions: u32,
    /// Total entries across every crafting queue.
    pub crafting_queue_len: usize,
}

/// Estimated offline output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineProfessionResult {
    /// Materials gathered across all gathering professions.
    pub materials_gathered: u64,
    /// Queued crafts that would have completed.
    pub crafting_queue_completed: usize,
}

/// Estimates offline profession output.
///
/// Gathering: one `base_yield` per profession per gathering interval
/// (`interval_ticks * tick_interval_ms`). Crafting: one completion per
/// `craft_time_base_ms`, at most the queue length.
#[must_use]
pub fn estimate_offline_progress(
    params: &OfflineProfessionParams,
    balance: &ProfessionBalance,
) -> OfflineProfessionResult {
    if params.offline_seconds == 0 {
        return OfflineProfessionResult::default();
    }
    let offline_ms = params.offline_seconds.saturating_mul(1000);

    let interval_ms =
        u64::from(balance.gathering_interval_ticks).saturating_mul(balance.tick_interval_ms);
    let materials_gathered = match offline_ms.checked_div(interval_ms) {
        Some(gathers) if params.active_gathering_professions > 0 => gathers
            .saturating_mul(u64::from(params.active_gathering_professions))
            .saturating_mul(u64::from(balance.gathering_base_yield)),
        _ => 0,
    };

    let crafting_queue_completed = offline_ms
        .checked_div(balance.craft_time_base_ms)
        .map_or(0, |crafts| {
            usize::try_from(crafts)
                .unwrap_or(usize::MAX)
                .min(params.crafting_queue_len)
        });

    OfflineProfessionResult {
        materials_gathered,
        crafting_queue_completed,
    }
}
