//! Battle detection, plan submission, the Voice and Prescience abilities,
//! storm damage, and the resolution algorithm.

use tracing::{debug, info};

use crate::domain::battle::{
    BattlePlan, BattleState, PrescienceField, PrescienceRequest, VoiceRestriction,
};
use crate::domain::cards::{card_kind, CardKind, LASGUN, SHIELD};
use crate::domain::factions::Faction;
use crate::domain::state::{GameState, Phase};
use crate::error::{EngineError, NotFoundKind};
use crate::services::map::MapService;

/// A prescience reveal owed to the requester, delivered privately by the
/// caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disclosure {
    pub to: Faction,
    pub about: Faction,
    pub field: PrescienceField,
    pub revealed: String,
}

/// The settled result of a battle. `winner` is `None` on a tie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleResolution {
    pub territory: String,
    pub winner: Option<Faction>,
}

/// What a plan submission produced beyond storing the plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub disclosure: Option<Disclosure>,
    pub resolution: Option<BattleResolution>,
}

#[derive(Default)]
pub struct BattleService {
    map: MapService,
}

impl BattleService {
    /// Queue a battle for every territory occupied by two or more factions.
    /// The first two occupants encountered become the combatants; battles
    /// never involve more than two factions.
    pub fn detect_battles(&self, state: &mut GameState) {
        let contested: Vec<BattleState> = state
            .map
            .territories
            .values()
            .filter(|t| t.forces.len() >= 2)
            .map(|t| {
                let occupants = t.occupants();
                BattleState::new(t.name.clone(), occupants[0], occupants[1])
            })
            .collect();
        for battle in contested {
            state.log_action(format!(
                "Battle brewing in {} between {} and {}.",
                battle.territory,
                battle.attacker.display_name(),
                battle.defender.display_name()
            ));
            debug!(territory = %battle.territory, "Battle queued");
            state.pending_battles.push_back(battle);
        }
    }

    /// Whether any territory currently holds two or more factions.
    pub fn battles_exist(&self, state: &GameState) -> bool {
        state.map.territories.values().any(|t| t.forces.len() >= 2)
    }

    /// Commit (or overwrite) a battle plan. When the second combatant
    /// commits, the battle resolves synchronously.
    pub fn submit_battle_plan(
        &self,
        state: &mut GameState,
        faction: Faction,
        plan: BattlePlan,
    ) -> Result<SubmitOutcome, EngineError> {
        if state.phase != Phase::Battle {
            return Err(EngineError::invalid_phase(
                "battle plans are only accepted during Battle",
            ));
        }
        let battle = state
            .current_battle
            .clone()
            .filter(|b| b.is_active)
            .ok_or_else(|| {
                EngineError::not_found(NotFoundKind::Battle, "no battle awaits a plan")
            })?;
        if !battle.is_combatant(faction) {
            return Err(EngineError::rule_violation(format!(
                "{} is not a combatant in {}",
                faction.display_name(),
                battle.territory
            )));
        }

        self.validate_plan(state, &battle, faction, &plan)?;

        let (territory, prescience, both_committed) = {
            let battle = state
                .current_battle
                .as_mut()
                .expect("current battle checked above");
            battle.plans.insert(faction, plan.clone());
            (
                battle.territory.clone(),
                battle.prescience.clone(),
                battle.both_plans_committed(),
            )
        };
        state.log_action(format!(
            "{} commits a battle plan for {territory}.",
            faction.display_name()
        ));

        let mut outcome = SubmitOutcome::default();

        // The instant the opponent's plan exists, a standing prescience
        // request is answered.
        if let Some(request) = prescience {
            if request.requester != faction {
                outcome.disclosure =
                    Some(self.disclose(request.requester, faction, request.field, &plan));
            }
        }

        if both_committed {
            outcome.resolution = Some(self.resolve_battle(state)?);
        }

        Ok(outcome)
    }

    fn validate_plan(
        &self,
        state: &GameState,
        battle: &BattleState,
        faction: Faction,
        plan: &BattlePlan,
    ) -> Result<(), EngineError> {
        if !plan.leader.is_empty() {
            if !faction.leader_roster().contains(&plan.leader.as_str()) {
                return Err(EngineError::invalid_target(format!(
                    "{} is not a {} leader",
                    plan.leader,
                    faction.display_name()
                )));
            }
            if state.leader_unavailable(&plan.leader) {
                return Err(EngineError::invalid_target(format!(
                    "{} is dead or captured",
                    plan.leader
                )));
            }
        }

        let stake = state
            .map
            .territory(&battle.territory)
            .map(|t| t.forces_of(faction))
            .unwrap_or(0);
        if plan.dial > stake {
            return Err(EngineError::rule_violation(format!(
                "dial of {} exceeds the {stake} forces in {}",
                plan.dial, battle.territory
            )));
        }

        let fs = state.faction_state(faction)?;
        for card in [plan.weapon.as_deref(), plan.defense.as_deref()]
            .into_iter()
            .flatten()
            .filter(|name| !name.is_empty())
        {
            if !fs.holds_card(card) {
                return Err(EngineError::rule_violation(format!(
                    "{} does not hold {card}",
                    faction.display_name()
                )));
            }
        }

        // A standing Voice binds the author's own plan.
        if let Some(voice) = &battle.voice {
            if voice.target == faction {
                self.enforce_voice(fs.treachery_cards.iter(), voice, plan)?;
            }
        }
        Ok(())
    }

    fn enforce_voice<'a>(
        &self,
        mut held: impl Iterator<Item = &'a crate::domain::cards::TreacheryCard>,
        voice: &VoiceRestriction,
        plan: &BattlePlan,
    ) -> Result<(), EngineError> {
        let in_plan = self.plan_has_kind(plan, voice.card_kind);
        if voice.must_play {
            // A compulsion only binds a faction that can actually comply.
            let holds_kind = held.any(|c| c.kind == voice.card_kind);
            if holds_kind && !in_plan {
                return Err(EngineError::rule_violation(format!(
                    "the Voice compels a {:?} card in this plan",
                    voice.card_kind
                )));
            }
        } else if in_plan {
            return Err(EngineError::rule_violation(format!(
                "the Voice forbids playing a {:?} card",
                voice.card_kind
            )));
        }
        Ok(())
    }

    fn plan_has_kind(&self, plan: &BattlePlan, kind: CardKind) -> bool {
        [plan.weapon.as_deref(), plan.defense.as_deref()]
            .into_iter()
            .flatten()
            .filter(|name| !name.is_empty())
            .any(|name| card_kind(name) == Some(kind))
    }

    /// Bene Gesserit, once per battle: compel or forbid a kind of card in
    /// the opponent's plan.
    pub fn use_voice(
        &self,
        state: &mut GameState,
        faction: Faction,
        kind: CardKind,
        must_play: bool,
    ) -> Result<(), EngineError> {
        if state.phase != Phase::Battle {
            return Err(EngineError::invalid_phase("the Voice only speaks in Battle"));
        }
        if faction != Faction::BeneGesserit {
            return Err(EngineError::rule_violation(
                "only the Bene Gesserit command the Voice",
            ));
        }
        let battle = state
            .current_battle
            .as_mut()
            .filter(|b| b.is_active)
            .ok_or_else(|| EngineError::not_found(NotFoundKind::Battle, "no battle in progress"))?;
        if !battle.is_combatant(faction) {
            return Err(EngineError::rule_violation(
                "the Voice only reaches a battle the Bene Gesserit fight in",
            ));
        }
        if battle.voice.is_some() {
            return Err(EngineError::rule_violation(
                "the Voice has already spoken this battle",
            ));
        }

        let target = battle.opponent_of(faction);
        battle.voice = Some(VoiceRestriction {
            target,
            card_kind: kind,
            must_play,
        });
        let demand = if must_play { "must play" } else { "may not play" };
        state.log_action(format!(
            "The Voice: {} {demand} a {kind:?} card.",
            target.display_name()
        ));
        Ok(())
    }

    /// Atreides, once per battle: ask to see one component of the opponent's
    /// plan. If that plan already exists the reveal is immediate.
    pub fn use_prescience(
        &self,
        state: &mut GameState,
        faction: Faction,
        field: PrescienceField,
    ) -> Result<Option<Disclosure>, EngineError> {
        if state.phase != Phase::Battle {
            return Err(EngineError::invalid_phase("prescience only works in Battle"));
        }
        if faction != Faction::Atreides {
            return Err(EngineError::rule_violation(
                "only the Atreides possess prescience",
            ));
        }
        let battle = state
            .current_battle
            .as_mut()
            .filter(|b| b.is_active)
            .ok_or_else(|| EngineError::not_found(NotFoundKind::Battle, "no battle in progress"))?;
        if !battle.is_combatant(faction) {
            return Err(EngineError::rule_violation(
                "prescience only reaches a battle the Atreides fight in",
            ));
        }
        if battle.prescience.is_some() {
            return Err(EngineError::rule_violation(
                "prescience has already been used this battle",
            ));
        }

        battle.prescience = Some(PrescienceRequest {
            requester: faction,
            field,
        });
        let opponent = battle.opponent_of(faction);
        let disclosure = battle
            .plans
            .get(&opponent)
            .cloned()
            .map(|plan| self.disclose(faction, opponent, field, &plan));
        state.log_action(format!(
            "{} peers into the future of the battle.",
            faction.display_name()
        ));
        Ok(disclosure)
    }

    fn disclose(
        &self,
        to: Faction,
        about: Faction,
        field: PrescienceField,
        plan: &BattlePlan,
    ) -> Disclosure {
        let revealed = match field {
            PrescienceField::Leader => {
                if plan.leader.is_empty() {
                    "no leader".to_string()
                } else {
                    plan.leader.clone()
                }
            }
            PrescienceField::Dial => plan.dial.to_string(),
            PrescienceField::Weapon => plan.weapon.clone().unwrap_or_else(|| "none".to_string()),
            PrescienceField::Defense => plan.defense.clone().unwrap_or_else(|| "none".to_string()),
        };
        Disclosure {
            to,
            about,
            field,
            revealed,
        }
    }

    /// Resolve the current battle. First matching special case wins:
    /// traitors, then the atomic explosion, then cheap heroes; otherwise
    /// leaders fall to unanswered weapons and the higher dial-plus-bonus
    /// score takes the territory.
    fn resolve_battle(&self, state: &mut GameState) -> Result<BattleResolution, EngineError> {
        let battle = state
            .current_battle
            .clone()
            .ok_or_else(|| EngineError::not_found(NotFoundKind::Battle, "no battle to resolve"))?;
        let territory = battle.territory.clone();
        let (a, b) = (battle.attacker, battle.defender);
        let pa = battle.plans.get(&a).cloned().unwrap_or_default();
        let pb = battle.plans.get(&b).cloned().unwrap_or_default();

        state.log_action(format!(
            "Battle for {territory}: {} ({}, dial {}) vs {} ({}, dial {}).",
            a.display_name(),
            display_leader(&pa),
            pa.dial,
            b.display_name(),
            display_leader(&pb),
            pb.dial
        ));

        let a_calls_traitor = !pb.leader.is_empty()
            && state.faction_state(a)?.traitors.iter().any(|t| *t == pb.leader);
        let b_calls_traitor = !pa.leader.is_empty()
            && state.faction_state(b)?.traitors.iter().any(|t| *t == pa.leader);

        let resolution = if a_calls_traitor && b_calls_traitor {
            state.log_action(format!(
                "{} and {} both stand revealed as traitors! Both armies are lost. Tie!",
                pb.leader, pa.leader
            ));
            self.clear_to_tanks(state, &territory, a)?;
            self.clear_to_tanks(state, &territory, b)?;
            BattleResolution {
                territory: territory.clone(),
                winner: None,
            }
        } else if a_calls_traitor || b_calls_traitor {
            let (winner, loser, lp) = if a_calls_traitor {
                (a, b, &pb)
            } else {
                (b, a, &pa)
            };
            state.log_action(format!("{} stands revealed as a traitor!", lp.leader));
            self.settle_win(state, &territory, winner, loser, 0)?;
            self.try_capture(state, winner, loser, lp, true)?;
            state.log_action(format!("{} wins!", winner.display_name()));
            BattleResolution {
                territory: territory.clone(),
                winner: Some(winner),
            }
        } else if self.is_atomic(&pa, &pb) {
            state.log_action(
                "Lasgun meets shield: an atomic explosion consumes the battlefield!".to_string(),
            );
            self.kill_leader(state, a, &pa.leader)?;
            self.kill_leader(state, b, &pb.leader)?;
            self.clear_to_tanks(state, &territory, a)?;
            self.clear_to_tanks(state, &territory, b)?;
            state.log_action("Nothing remains to claim the spoils. Tie!".to_string());
            BattleResolution {
                territory: territory.clone(),
                winner: None,
            }
        } else if pa.is_cheap_hero() && pb.is_cheap_hero() {
            state.log_action(format!(
                "{} and {} are both thrown away as cheap heroes. Tie!",
                pa.leader, pb.leader
            ));
            self.kill_leader(state, a, &pa.leader)?;
            self.kill_leader(state, b, &pb.leader)?;
            BattleResolution {
                territory: territory.clone(),
                winner: None,
            }
        } else if pa.is_cheap_hero() || pb.is_cheap_hero() {
            let (winner, loser, wp, lp) = if pa.is_cheap_hero() {
                (a, b, &pa, &pb)
            } else {
                (b, a, &pb, &pa)
            };
            state.log_action(format!(
                "{} is sacrificed as a cheap hero.",
                wp.leader
            ));
            self.kill_leader(state, winner, &wp.leader)?;
            let loser_leader_survives = !self.leader_dies(lp, wp);
            if !loser_leader_survives {
                self.kill_leader(state, loser, &lp.leader)?;
            }
            self.settle_win(state, &territory, winner, loser, 0)?;
            self.try_capture(state, winner, loser, lp, loser_leader_survives)?;
            state.log_action(format!("{} wins!", winner.display_name()));
            BattleResolution {
                territory: territory.clone(),
                winner: Some(winner),
            }
        } else {
            let a_dies = self.leader_dies(&pa, &pb);
            let b_dies = self.leader_dies(&pb, &pa);
            if a_dies {
                state.log_action(format!("{} falls in battle.", pa.leader));
                self.kill_leader(state, a, &pa.leader)?;
            }
            if b_dies {
                state.log_action(format!("{} falls in battle.", pb.leader));
                self.kill_leader(state, b, &pb.leader)?;
            }

            let bonus = state.rules.leader_survival_bonus;
            let a_score = pa.dial + if !pa.leader.is_empty() && !a_dies { bonus } else { 0 };
            let b_score = pb.dial + if !pb.leader.is_empty() && !b_dies { bonus } else { 0 };
            state.log_action(format!(
                "{} scores {a_score}, {} scores {b_score}.",
                a.display_name(),
                b.display_name()
            ));

            if a_score == b_score {
                self.send_to_tanks(state, &territory, a, pa.dial)?;
                self.send_to_tanks(state, &territory, b, pb.dial)?;
                state.log_action(format!(
                    "Both armies bleed for nothing; {territory} remains contested. Tie!"
                ));
                BattleResolution {
                    territory: territory.clone(),
                    winner: None,
                }
            } else {
                let (winner, loser, wp, lp, loser_died) = if a_score > b_score {
                    (a, b, &pa, &pb, b_dies)
                } else {
                    (b, a, &pb, &pa, a_dies)
                };
                self.settle_win(state, &territory, winner, loser, wp.dial)?;
                self.try_capture(state, winner, loser, lp, !loser_died)?;
                state.log_action(format!("{} wins!", winner.display_name()));
                BattleResolution {
                    territory: territory.clone(),
                    winner: Some(winner),
                }
            }
        };

        if let Some(current) = state.current_battle.as_mut() {
            current.is_active = false;
        }
        info!(
            territory = %territory,
            winner = resolution
                .winner
                .map(|w| w.display_name())
                .unwrap_or("tie"),
            "Battle resolved"
        );
        Ok(resolution)
    }

    /// Lasgun on one side against a shield on the other, in either direction.
    fn is_atomic(&self, pa: &BattlePlan, pb: &BattlePlan) -> bool {
        (pa.weapon_name() == LASGUN && pb.defense_name() == SHIELD)
            || (pb.weapon_name() == LASGUN && pa.defense_name() == SHIELD)
    }

    /// A leader dies iff the opponent played any weapon and the leader's own
    /// side played no defense. Card-type matching is not enforced beyond
    /// non-emptiness.
    fn leader_dies(&self, own: &BattlePlan, opponent: &BattlePlan) -> bool {
        !own.leader.is_empty() && opponent.has_weapon() && !own.has_defense()
    }

    /// Winner pays exactly the dialed forces; the loser's entire stake goes
    /// to the tanks; the winner collects the fixed spice award.
    fn settle_win(
        &self,
        state: &mut GameState,
        territory: &str,
        winner: Faction,
        loser: Faction,
        winner_cost: u32,
    ) -> Result<(), EngineError> {
        let paid = self.send_to_tanks(state, territory, winner, winner_cost)?;
        let lost = self.clear_to_tanks(state, territory, loser)?;
        let award = state.rules.battle_spice_award;
        state.faction_state_mut(winner)?.spice += award;
        state.log_action(format!(
            "{} loses {paid} forces; {} loses {lost}; {} claims {award} spice.",
            winner.display_name(),
            loser.display_name(),
            winner.display_name()
        ));
        Ok(())
    }

    /// Harkonnen take a surviving, named enemy leader prisoner.
    fn try_capture(
        &self,
        state: &mut GameState,
        winner: Faction,
        loser: Faction,
        loser_plan: &BattlePlan,
        loser_leader_survives: bool,
    ) -> Result<(), EngineError> {
        if winner != Faction::Harkonnen
            || loser_plan.leader.is_empty()
            || !loser_leader_survives
        {
            return Ok(());
        }
        let leader = loser_plan.leader.clone();
        state
            .faction_state_mut(winner)?
            .captured_leaders
            .push(leader.clone());
        state.log_action(format!(
            "The Harkonnen take {leader} of the {} prisoner.",
            loser.display_name()
        ));
        Ok(())
    }

    fn kill_leader(
        &self,
        state: &mut GameState,
        owner: Faction,
        leader: &str,
    ) -> Result<(), EngineError> {
        if leader.is_empty() {
            return Ok(());
        }
        let fs = state.faction_state_mut(owner)?;
        if !fs.dead_leaders.iter().any(|l| l == leader) {
            fs.dead_leaders.push(leader.to_string());
        }
        Ok(())
    }

    fn send_to_tanks(
        &self,
        state: &mut GameState,
        territory: &str,
        faction: Faction,
        count: u32,
    ) -> Result<u32, EngineError> {
        let removed = state
            .map
            .territory_mut(territory)
            .ok_or_else(|| {
                EngineError::not_found(
                    NotFoundKind::Territory,
                    format!("no territory named {territory}"),
                )
            })?
            .remove_forces(faction, count);
        state.faction_state_mut(faction)?.forces_in_tanks += removed;
        Ok(removed)
    }

    fn clear_to_tanks(
        &self,
        state: &mut GameState,
        territory: &str,
        faction: Faction,
    ) -> Result<u32, EngineError> {
        let removed = state
            .map
            .territory_mut(territory)
            .ok_or_else(|| {
                EngineError::not_found(
                    NotFoundKind::Territory,
                    format!("no territory named {territory}"),
                )
            })?
            .clear_forces(faction);
        state.faction_state_mut(faction)?.forces_in_tanks += removed;
        Ok(removed)
    }

    /// Sweep the storm across `amount` sectors ahead of `start`: spice is
    /// destroyed and non-Fremen forces go to the tanks, except in the
    /// storm-immune territories.
    pub fn apply_storm_damage(
        &self,
        state: &mut GameState,
        start: u8,
        amount: u32,
    ) -> Result<(), EngineError> {
        for sector in self.map.storm_path(start, amount) {
            let victims: Vec<(String, Faction, u32)> = state
                .map
                .territories
                .values()
                .filter(|t| t.sector == sector && !t.is_storm_immune())
                .flat_map(|t| {
                    t.forces
                        .iter()
                        .filter(|(f, _)| **f != Faction::Fremen)
                        .map(|(f, n)| (t.name.clone(), *f, *n))
                        .collect::<Vec<_>>()
                })
                .collect();

            for (territory, faction, count) in victims {
                if let Some(t) = state.map.territory_mut(&territory) {
                    t.remove_forces(faction, count);
                }
                state.faction_state_mut(faction)?.forces_in_tanks += count;
                state.log_action(format!(
                    "The storm destroys {count} {} forces in {territory}.",
                    faction.display_name()
                ));
            }

            for t in state.map.territories_in_sector(sector) {
                if !t.is_storm_immune() && t.spice_blow_amount > 0 {
                    t.spice_blow_amount = 0;
                }
            }
        }
        Ok(())
    }
}

fn display_leader(plan: &BattlePlan) -> &str {
    if plan.leader.is_empty() {
        "no leader"
    } else {
        &plan.leader
    }
}
