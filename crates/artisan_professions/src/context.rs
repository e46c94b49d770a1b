//! Per-call borrows handed from the manager to its subsystems.

use crate::config::ProfessionBalance;
use crate::material_bank::MaterialBank;
use crate::rng::RandomSource;
use crate::types::MaterialDefinition;

/// Shared state a gather attempt or craft completion may touch.
///
/// Built by the manager for the duration of one call; subsystems never keep
/// it.
pub struct TickContext<'a> {
    /// The manager's only material bank.
    pub bank: &'a mut MaterialBank,
    /// Material catalogue.
    pub materials: &'a [MaterialDefinition],
    /// Balance block.
    pub balance: &'a ProfessionBalance,
    /// The manager's only random source.
    pub rng: &'a mut dyn RandomSource,
}
