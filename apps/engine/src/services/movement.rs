//! Shipment and movement: one of each per faction per phase.

use tracing::info;

use crate::domain::factions::Faction;
use crate::domain::map::ORNITHOPTER_BASES;
use crate::domain::state::{GameState, Phase};
use crate::error::{EngineError, NotFoundKind};
use crate::services::map::MapService;

#[derive(Default)]
pub struct MovementService {
    map: MapService,
}

impl MovementService {
    /// Ship `count` forces from reserves onto the board.
    ///
    /// Cost is 1 spice per force into a stronghold, 2 elsewhere; the Guild
    /// pays half rounded up, and everyone else's payment goes to the Guild.
    pub fn ship_forces(
        &self,
        state: &mut GameState,
        faction: Faction,
        territory: &str,
        count: u32,
    ) -> Result<(), EngineError> {
        if state.phase != Phase::ShipmentAndMovement {
            return Err(EngineError::invalid_phase(
                "shipments are only allowed during Shipment and Movement",
            ));
        }
        if count == 0 {
            return Err(EngineError::rule_violation("cannot ship zero forces"));
        }

        let (dest_sector, is_stronghold) = {
            let dest = state.map.territory(territory).ok_or_else(|| {
                EngineError::not_found(
                    NotFoundKind::Territory,
                    format!("no territory named {territory}"),
                )
            })?;
            (dest.sector, dest.is_stronghold)
        };
        if dest_sector == state.storm_location {
            return Err(EngineError::invalid_target(format!(
                "{territory} lies under the storm"
            )));
        }

        let rate = if is_stronghold {
            state.rules.shipment_rate_stronghold
        } else {
            state.rules.shipment_rate_open
        };
        let full = count * rate;
        let cost = if faction == Faction::SpacingGuild {
            full.div_ceil(2)
        } else {
            full
        };

        {
            let shipper = state.faction_state_mut(faction)?;
            if shipper.has_shipped {
                return Err(EngineError::rule_violation(
                    "already shipped this phase",
                ));
            }
            if shipper.reserves < count {
                return Err(EngineError::insufficient(format!(
                    "only {} forces in reserve",
                    shipper.reserves
                )));
            }
            if shipper.spice < cost {
                return Err(EngineError::insufficient(format!(
                    "shipment costs {cost} spice, {} held",
                    shipper.spice
                )));
            }
            shipper.spice -= cost;
            shipper.reserves -= count;
            shipper.has_shipped = true;
        }

        // Shipping payments fund the Guild, unless the Guild is shipping.
        if faction != Faction::SpacingGuild {
            if let Ok(guild) = state.faction_state_mut(Faction::SpacingGuild) {
                guild.spice += cost;
            }
        }

        state
            .map
            .territory_mut(territory)
            .expect("destination checked above")
            .add_forces(faction, count);

        state.log_action(format!(
            "{} ships {count} forces to {territory} for {cost} spice.",
            faction.display_name()
        ));
        info!(
            faction = faction.display_name(),
            territory, count, cost, "Forces shipped"
        );
        Ok(())
    }

    /// Move forces already on the board.
    ///
    /// Range is 1 hop, 3 with forces in an ornithopter base, and never less
    /// than 2 for the Fremen.
    pub fn move_forces(
        &self,
        state: &mut GameState,
        faction: Faction,
        from: &str,
        to: &str,
        count: u32,
    ) -> Result<(), EngineError> {
        if state.phase != Phase::ShipmentAndMovement {
            return Err(EngineError::invalid_phase(
                "movement is only allowed during Shipment and Movement",
            ));
        }
        if count == 0 {
            return Err(EngineError::rule_violation("cannot move zero forces"));
        }
        if from == to {
            return Err(EngineError::invalid_target(
                "origin and destination are the same territory",
            ));
        }

        let origin_sector = state
            .map
            .territory(from)
            .ok_or_else(|| {
                EngineError::not_found(NotFoundKind::Territory, format!("no territory named {from}"))
            })?
            .sector;
        let dest_sector = state
            .map
            .territory(to)
            .ok_or_else(|| {
                EngineError::not_found(NotFoundKind::Territory, format!("no territory named {to}"))
            })?
            .sector;
        if origin_sector == state.storm_location {
            return Err(EngineError::invalid_target(format!(
                "{from} lies under the storm"
            )));
        }
        if dest_sector == state.storm_location {
            return Err(EngineError::invalid_target(format!(
                "{to} lies under the storm"
            )));
        }

        {
            let mover = state.faction_state(faction)?;
            if mover.has_moved {
                return Err(EngineError::rule_violation("already moved this phase"));
            }
        }
        let present = state
            .map
            .territory(from)
            .expect("origin checked above")
            .forces_of(faction);
        if present < count {
            return Err(EngineError::insufficient(format!(
                "only {present} forces in {from}"
            )));
        }

        let range = self.movement_range(state, faction);
        if !self.map.is_reachable(&state.map, from, to, range)? {
            return Err(EngineError::invalid_target(format!(
                "{to} is out of range ({range} hops) from {from}"
            )));
        }

        state
            .map
            .territory_mut(from)
            .expect("origin checked above")
            .remove_forces(faction, count);
        state
            .map
            .territory_mut(to)
            .expect("destination checked above")
            .add_forces(faction, count);
        state.faction_state_mut(faction)?.has_moved = true;

        state.log_action(format!(
            "{} moves {count} forces from {from} to {to}.",
            faction.display_name()
        ));
        info!(faction = faction.display_name(), from, to, count, "Forces moved");
        Ok(())
    }

    /// Decline both the shipment and the move for this phase.
    pub fn pass_shipment(
        &self,
        state: &mut GameState,
        faction: Faction,
    ) -> Result<(), EngineError> {
        if state.phase != Phase::ShipmentAndMovement {
            return Err(EngineError::invalid_phase(
                "nothing to pass outside Shipment and Movement",
            ));
        }
        let fs = state.faction_state_mut(faction)?;
        fs.has_passed = true;
        state.log_action(format!("{} passes.", faction.display_name()));
        Ok(())
    }

    fn movement_range(&self, state: &GameState, faction: Faction) -> u32 {
        let has_ornithopters = ORNITHOPTER_BASES.iter().any(|base| {
            state
                .map
                .territory(base)
                .is_some_and(|t| t.forces_of(faction) > 0)
        });
        let mut range = if has_ornithopters { 3 } else { 1 };
        if faction == Faction::Fremen {
            range = range.max(2);
        }
        range
    }
}
