//! Spice blow resolution and per-turn spice collection.

use tracing::{debug, info};

use crate::domain::cards::SpiceCard;
use crate::domain::factions::Faction;
use crate::domain::map::HIGH_VALUE_BLOWS;
use crate::domain::state::{GameState, Phase};
use crate::error::EngineError;
use crate::services::deck::DeckService;

/// What a spice blow resolution did, and where the machine goes next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpiceBlowResult {
    pub territory: Option<String>,
    pub amount: u32,
    pub worm_appeared: bool,
    pub next_phase: Phase,
}

#[derive(Default)]
pub struct SpiceService {
    deck: DeckService,
}

impl SpiceService {
    /// Draw from the spice deck until a territory card lands or the deck is
    /// exhausted. Worms devour the most recently exposed territory and keep
    /// the draw going; a territory card pays out unless it is under storm.
    pub fn resolve_spice_blow(&self, state: &mut GameState) -> Result<SpiceBlowResult, EngineError> {
        let mut worm_appeared = false;
        let mut blown: Option<String> = None;
        let mut amount = 0;

        loop {
            let seed = state.next_shuffle_seed();
            let Some(card) =
                self.deck
                    .draw(&mut state.spice_deck, &mut state.spice_discard, seed)
            else {
                debug!("Spice deck exhausted with no territory card");
                break;
            };

            match card {
                SpiceCard::ShaiHulud => {
                    worm_appeared = true;
                    let devoured = state
                        .spice_discard
                        .iter()
                        .rev()
                        .find_map(|c| c.territory_name().map(str::to_string));
                    state.spice_discard.push(SpiceCard::ShaiHulud);
                    if let Some(name) = devoured {
                        self.devour_territory(state, &name);
                    } else {
                        state.log_action("Shai-Hulud surfaces, but finds nothing to devour.");
                    }
                }
                SpiceCard::Territory { territory } => {
                    let (sector, paid) = {
                        let rules = state.rules.clone();
                        let t = state.map.territory_mut(&territory).ok_or_else(|| {
                            EngineError::not_found(
                                crate::error::NotFoundKind::Territory,
                                format!("spice card names unknown territory {territory}"),
                            )
                        })?;
                        if t.sector == state.storm_location {
                            (t.sector, 0)
                        } else {
                            let paid = if HIGH_VALUE_BLOWS.contains(&territory.as_str()) {
                                rules.high_value_blow
                            } else {
                                rules.standard_blow
                            };
                            t.spice_blow_amount += paid;
                            (t.sector, paid)
                        }
                    };

                    if paid == 0 {
                        state.log_action(format!(
                            "The storm over sector {sector} smothers the spice blow in {territory}."
                        ));
                    } else {
                        state.log_action(format!("Spice blow: {paid} spice appears in {territory}."));
                    }
                    amount = paid;
                    state.spice_discard.push(SpiceCard::Territory {
                        territory: territory.clone(),
                    });
                    blown = Some(territory);
                    break;
                }
            }
        }

        let nexus = worm_appeared && state.turn > 1;
        state.nexus_triggered = nexus;
        let next_phase = if nexus {
            Phase::Nexus
        } else {
            Phase::ChoamCharity
        };

        info!(
            turn = state.turn,
            worm = worm_appeared,
            territory = blown.as_deref().unwrap_or("-"),
            "Spice blow resolved"
        );

        Ok(SpiceBlowResult {
            territory: blown,
            amount,
            worm_appeared,
            next_phase,
        })
    }

    /// Shai-Hulud clears a territory: all spice, and every non-Fremen force
    /// goes to the tanks.
    fn devour_territory(&self, state: &mut GameState, name: &str) {
        let Some(territory) = state.map.territory_mut(name) else {
            return;
        };
        if territory.is_storm_immune() {
            state.log_action(format!("Shai-Hulud cannot breach {name}."));
            return;
        }
        territory.spice_blow_amount = 0;
        let victims: Vec<(Faction, u32)> = territory
            .forces
            .iter()
            .filter(|(f, _)| **f != Faction::Fremen)
            .map(|(f, n)| (*f, *n))
            .collect();
        for (faction, count) in &victims {
            territory.remove_forces(*faction, *count);
        }
        for (faction, count) in victims {
            if let Ok(fs) = state.faction_state_mut(faction) {
                fs.forces_in_tanks += count;
            }
            state.log_action(format!(
                "Shai-Hulud devours {count} {} forces in {name}.",
                faction.display_name()
            ));
        }
        state.log_action(format!("Shai-Hulud devours the spice in {name}."));
    }

    /// Each territory with spice and exactly one occupying faction pays that
    /// faction min(available, forces x 2). Contested territories pay nothing.
    pub fn collect_spice(&self, state: &mut GameState) -> Result<(), EngineError> {
        let collections: Vec<(Faction, String, u32)> = state
            .map
            .territories
            .values()
            .filter(|t| t.spice_blow_amount > 0 && t.forces.len() == 1)
            .map(|t| {
                let (&faction, &forces) = t.forces.iter().next().expect("one occupant");
                let take = t.spice_blow_amount.min(forces * 2);
                (faction, t.name.clone(), take)
            })
            .filter(|(_, _, take)| *take > 0)
            .collect();

        for (faction, territory, take) in collections {
            if let Some(t) = state.map.territory_mut(&territory) {
                t.spice_blow_amount -= take;
            }
            state.faction_state_mut(faction)?.spice += take;
            state.log_action(format!(
                "{} harvests {take} spice from {territory}.",
                faction.display_name()
            ));
            debug!(faction = faction.display_name(), territory = %territory, take, "Spice collected");
        }
        Ok(())
    }
}
