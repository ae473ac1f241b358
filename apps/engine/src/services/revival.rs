//! Revival of forces and leaders from the tanks.

use tracing::info;

use crate::domain::factions::Faction;
use crate::domain::state::{GameState, Phase};
use crate::error::{EngineError, NotFoundKind};

#[derive(Default)]
pub struct RevivalService;

impl RevivalService {
    /// Revive up to the per-phase cap of forces at 2 spice each; the Fremen
    /// revive free.
    pub fn revive_forces(
        &self,
        state: &mut GameState,
        faction: Faction,
        count: u32,
    ) -> Result<(), EngineError> {
        if state.phase != Phase::Revival {
            return Err(EngineError::invalid_phase(
                "forces can only be revived during Revival",
            ));
        }
        if count == 0 {
            return Err(EngineError::rule_violation("cannot revive zero forces"));
        }

        let cap = state.rules.revival_force_cap;
        let per_force = if faction == Faction::Fremen {
            0
        } else {
            state.rules.revival_cost_per_force
        };
        let cost = count * per_force;

        let fs = state.faction_state_mut(faction)?;
        if fs.revived_troops_this_turn + count > cap {
            return Err(EngineError::rule_violation(format!(
                "at most {cap} forces per Revival phase ({} already revived)",
                fs.revived_troops_this_turn
            )));
        }
        if fs.forces_in_tanks < count {
            return Err(EngineError::insufficient(format!(
                "only {} forces in the tanks",
                fs.forces_in_tanks
            )));
        }
        if fs.spice < cost {
            return Err(EngineError::insufficient(format!(
                "revival costs {cost} spice, {} held",
                fs.spice
            )));
        }

        fs.spice -= cost;
        fs.forces_in_tanks -= count;
        fs.reserves += count;
        fs.revived_troops_this_turn += count;

        state.log_action(format!(
            "{} revives {count} forces for {cost} spice.",
            faction.display_name()
        ));
        info!(faction = faction.display_name(), count, cost, "Forces revived");
        Ok(())
    }

    /// Revive a dead leader for a flat fee.
    pub fn revive_leader(
        &self,
        state: &mut GameState,
        faction: Faction,
        leader: &str,
    ) -> Result<(), EngineError> {
        if state.phase != Phase::Revival {
            return Err(EngineError::invalid_phase(
                "leaders can only be revived during Revival",
            ));
        }

        let cost = state.rules.leader_revival_cost;
        let fs = state.faction_state_mut(faction)?;
        let Some(pos) = fs.dead_leaders.iter().position(|l| l == leader) else {
            return Err(EngineError::not_found(
                NotFoundKind::Leader,
                format!("{leader} is not among the dead of {}", faction.display_name()),
            ));
        };
        if fs.spice < cost {
            return Err(EngineError::insufficient(format!(
                "leader revival costs {cost} spice, {} held",
                fs.spice
            )));
        }

        fs.spice -= cost;
        fs.dead_leaders.remove(pos);

        state.log_action(format!(
            "{} revives {leader} for {cost} spice.",
            faction.display_name()
        ));
        info!(faction = faction.display_name(), leader, cost, "Leader revived");
        Ok(())
    }
}
