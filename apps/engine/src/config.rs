//! Rule tunables shared by every service.
//!
//! The struct rides inside the persisted aggregate so an in-flight game keeps
//! the rules it started with.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRules {
    /// Game ends after this many turns without a victor.
    pub max_turns: u32,
    /// Strongholds a faction must solely control to win.
    pub strongholds_to_win: usize,
    /// Charity tops a claimant's spice up to this floor.
    pub charity_floor: u32,
    /// Largest storm movement roll (die is 1..=storm_die).
    pub storm_die: u32,
    /// Spice paid per force revived.
    pub revival_cost_per_force: u32,
    /// Forces revivable per faction per Revival phase.
    pub revival_force_cap: u32,
    /// Flat cost to revive a dead leader.
    pub leader_revival_cost: u32,
    /// Spice per force shipped into a stronghold.
    pub shipment_rate_stronghold: u32,
    /// Spice per force shipped anywhere else.
    pub shipment_rate_open: u32,
    /// Spice awarded to a battle winner.
    pub battle_spice_award: u32,
    /// Score bonus for a surviving leader.
    pub leader_survival_bonus: u32,
    /// Spice paid by a blow in a high-value territory.
    pub high_value_blow: u32,
    /// Spice paid by a blow anywhere else.
    pub standard_blow: u32,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            max_turns: 10,
            strongholds_to_win: 3,
            charity_floor: 2,
            storm_die: 6,
            revival_cost_per_force: 2,
            revival_force_cap: 3,
            leader_revival_cost: 2,
            shipment_rate_stronghold: 1,
            shipment_rate_open: 2,
            battle_spice_award: 5,
            leader_survival_bonus: 5,
            high_value_blow: 10,
            standard_blow: 6,
        }
    }
}
