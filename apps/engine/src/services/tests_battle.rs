//! Battle plan validation and the resolution algorithm.

use crate::domain::battle::{BattlePlan, PrescienceField};
use crate::domain::cards::CardKind;
use crate::domain::factions::Faction;
use crate::domain::state::{GameState, Phase};
use crate::domain::test_state_helpers::{
    give_card, make_game_state, place_forces, start_battle, MakeGameStateArgs,
};
use crate::error::EngineError;
use crate::services::battle::BattleService;

const FIELD: &str = "Funeral Plain";

fn battle_state(attacker: Faction, defender: Faction) -> GameState {
    let mut state = make_game_state(MakeGameStateArgs {
        phase: Phase::Battle,
        factions: vec![attacker, defender, Faction::Emperor],
        ..Default::default()
    });
    place_forces(&mut state, attacker, FIELD, 10);
    place_forces(&mut state, defender, FIELD, 5);
    start_battle(&mut state, FIELD, attacker, defender);
    state
}

fn plan(leader: &str, dial: u32) -> BattlePlan {
    BattlePlan {
        leader: leader.to_string(),
        dial,
        weapon: None,
        defense: None,
    }
}

fn plan_with(leader: &str, dial: u32, weapon: Option<&str>, defense: Option<&str>) -> BattlePlan {
    BattlePlan {
        leader: leader.to_string(),
        dial,
        weapon: weapon.map(str::to_string),
        defense: defense.map(str::to_string),
    }
}

#[test]
fn higher_score_takes_the_territory() {
    // Dial 5 with a surviving leader (10) beats dial 3 with a dead one (3).
    let mut state = battle_state(Faction::Atreides, Faction::Harkonnen);
    give_card(&mut state, Faction::Atreides, "Crysknife");
    let battle = BattleService::default();

    battle
        .submit_battle_plan(
            &mut state,
            Faction::Atreides,
            plan_with("Duncan Idaho", 5, Some("Crysknife"), None),
        )
        .unwrap();
    let outcome = battle
        .submit_battle_plan(&mut state, Faction::Harkonnen, plan("Feyd-Rautha", 3))
        .unwrap();

    let resolution = outcome.resolution.expect("both plans in, battle resolves");
    assert_eq!(resolution.winner, Some(Faction::Atreides));

    // Winner pays its dial, loser loses its whole stake, winner gains 5.
    let field = state.map.territory(FIELD).unwrap();
    assert_eq!(field.forces_of(Faction::Atreides), 5);
    assert_eq!(field.forces_of(Faction::Harkonnen), 0);
    assert_eq!(state.faction_state(Faction::Atreides).unwrap().spice, 15);
    assert_eq!(state.faction_state(Faction::Atreides).unwrap().forces_in_tanks, 5);
    assert_eq!(state.faction_state(Faction::Harkonnen).unwrap().forces_in_tanks, 5);

    // The unanswered weapon killed Feyd-Rautha; Duncan survived.
    let harkonnen = state.faction_state(Faction::Harkonnen).unwrap();
    assert!(harkonnen.dead_leaders.contains(&"Feyd-Rautha".to_string()));
    let atreides = state.faction_state(Faction::Atreides).unwrap();
    assert!(atreides.dead_leaders.is_empty());

    assert!(state.action_log.iter().any(|l| l.contains("wins!")));
    assert!(!state.current_battle.as_ref().unwrap().is_active);
}

#[test]
fn exact_tie_bleeds_both_sides_and_stays_contested() {
    let mut state = battle_state(Faction::Atreides, Faction::Harkonnen);
    let battle = BattleService::default();

    battle
        .submit_battle_plan(&mut state, Faction::Atreides, plan("Duncan Idaho", 2))
        .unwrap();
    let outcome = battle
        .submit_battle_plan(&mut state, Faction::Harkonnen, plan("Feyd-Rautha", 2))
        .unwrap();

    assert_eq!(outcome.resolution.unwrap().winner, None);
    let field = state.map.territory(FIELD).unwrap();
    assert_eq!(field.forces_of(Faction::Atreides), 8);
    assert_eq!(field.forces_of(Faction::Harkonnen), 3);
    // No spice award on a tie.
    assert_eq!(state.faction_state(Faction::Atreides).unwrap().spice, 10);
    assert!(state.action_log.iter().any(|l| l.contains("Tie!")));
}

#[test]
fn lasgun_and_shield_obliterate_everyone() {
    let mut state = battle_state(Faction::Atreides, Faction::Harkonnen);
    give_card(&mut state, Faction::Atreides, "Lasgun");
    give_card(&mut state, Faction::Harkonnen, "Shield");
    let battle = BattleService::default();

    battle
        .submit_battle_plan(
            &mut state,
            Faction::Atreides,
            plan_with("Duncan Idaho", 7, Some("Lasgun"), None),
        )
        .unwrap();
    let outcome = battle
        .submit_battle_plan(
            &mut state,
            Faction::Harkonnen,
            plan_with("Feyd-Rautha", 1, None, Some("Shield")),
        )
        .unwrap();

    assert_eq!(outcome.resolution.unwrap().winner, None);
    let field = state.map.territory(FIELD).unwrap();
    assert_eq!(field.forces_of(Faction::Atreides), 0);
    assert_eq!(field.forces_of(Faction::Harkonnen), 0);
    assert!(state
        .faction_state(Faction::Atreides)
        .unwrap()
        .dead_leaders
        .contains(&"Duncan Idaho".to_string()));
    assert!(state
        .faction_state(Faction::Harkonnen)
        .unwrap()
        .dead_leaders
        .contains(&"Feyd-Rautha".to_string()));
    // No spice changes hands in the blast.
    assert_eq!(state.faction_state(Faction::Atreides).unwrap().spice, 10);
    assert_eq!(state.faction_state(Faction::Harkonnen).unwrap().spice, 10);
    assert!(state.action_log.iter().any(|l| l.contains("Tie!")));
}

#[test]
fn solo_cheap_hero_wins_at_zero_cost() {
    let mut state = battle_state(Faction::Atreides, Faction::Harkonnen);
    let battle = BattleService::default();

    battle
        .submit_battle_plan(&mut state, Faction::Atreides, plan("Gurney Halleck", 0))
        .unwrap();
    let outcome = battle
        .submit_battle_plan(&mut state, Faction::Harkonnen, plan("Feyd-Rautha", 4))
        .unwrap();

    assert_eq!(outcome.resolution.unwrap().winner, Some(Faction::Atreides));
    let field = state.map.territory(FIELD).unwrap();
    // The sacrifice costs no forces; the loser is swept from the field.
    assert_eq!(field.forces_of(Faction::Atreides), 10);
    assert_eq!(field.forces_of(Faction::Harkonnen), 0);
    assert!(state
        .faction_state(Faction::Atreides)
        .unwrap()
        .dead_leaders
        .contains(&"Gurney Halleck".to_string()));
    assert_eq!(state.faction_state(Faction::Atreides).unwrap().spice, 15);
}

#[test]
fn double_cheap_hero_is_a_bloodless_tie() {
    let mut state = battle_state(Faction::Atreides, Faction::Harkonnen);
    let battle = BattleService::default();

    battle
        .submit_battle_plan(&mut state, Faction::Atreides, plan("Gurney Halleck", 0))
        .unwrap();
    let outcome = battle
        .submit_battle_plan(&mut state, Faction::Harkonnen, plan("Feyd-Rautha", 0))
        .unwrap();

    assert_eq!(outcome.resolution.unwrap().winner, None);
    // Both leaders die, but no forces move.
    let field = state.map.territory(FIELD).unwrap();
    assert_eq!(field.forces_of(Faction::Atreides), 10);
    assert_eq!(field.forces_of(Faction::Harkonnen), 5);
    assert!(state
        .faction_state(Faction::Atreides)
        .unwrap()
        .dead_leaders
        .contains(&"Gurney Halleck".to_string()));
    assert!(state
        .faction_state(Faction::Harkonnen)
        .unwrap()
        .dead_leaders
        .contains(&"Feyd-Rautha".to_string()));
}

#[test]
fn a_traitor_hands_the_battle_to_its_true_master() {
    let mut state = battle_state(Faction::Atreides, Faction::Harkonnen);
    state
        .faction_state_mut(Faction::Harkonnen)
        .unwrap()
        .traitors
        .push("Duncan Idaho".to_string());
    let battle = BattleService::default();

    battle
        .submit_battle_plan(&mut state, Faction::Atreides, plan("Duncan Idaho", 8))
        .unwrap();
    let outcome = battle
        .submit_battle_plan(&mut state, Faction::Harkonnen, plan("Feyd-Rautha", 1))
        .unwrap();

    assert_eq!(outcome.resolution.unwrap().winner, Some(Faction::Harkonnen));
    let field = state.map.territory(FIELD).unwrap();
    assert_eq!(field.forces_of(Faction::Atreides), 0);
    // The winner pays nothing at all.
    assert_eq!(field.forces_of(Faction::Harkonnen), 5);
    assert_eq!(state.faction_state(Faction::Harkonnen).unwrap().spice, 15);
    // The revealed traitor survives and, Harkonnen being Harkonnen, is taken.
    assert!(state
        .faction_state(Faction::Harkonnen)
        .unwrap()
        .captured_leaders
        .contains(&"Duncan Idaho".to_string()));
}

#[test]
fn matched_traitors_annihilate_both_armies() {
    let mut state = battle_state(Faction::Atreides, Faction::Harkonnen);
    state
        .faction_state_mut(Faction::Harkonnen)
        .unwrap()
        .traitors
        .push("Duncan Idaho".to_string());
    state
        .faction_state_mut(Faction::Atreides)
        .unwrap()
        .traitors
        .push("Feyd-Rautha".to_string());
    let battle = BattleService::default();

    battle
        .submit_battle_plan(&mut state, Faction::Atreides, plan("Duncan Idaho", 8))
        .unwrap();
    let outcome = battle
        .submit_battle_plan(&mut state, Faction::Harkonnen, plan("Feyd-Rautha", 1))
        .unwrap();

    assert_eq!(outcome.resolution.unwrap().winner, None);
    let field = state.map.territory(FIELD).unwrap();
    assert_eq!(field.forces_of(Faction::Atreides), 0);
    assert_eq!(field.forces_of(Faction::Harkonnen), 0);
    // No award on mutual treachery.
    assert_eq!(state.faction_state(Faction::Harkonnen).unwrap().spice, 10);
    assert!(state.action_log.iter().any(|l| l.contains("Tie!")));
}

#[test]
fn harkonnen_capture_only_takes_confirmed_survivors() {
    // Winner Harkonnen, loser's leader survives: captured, not dead.
    let mut state = battle_state(Faction::Harkonnen, Faction::Atreides);
    let battle = BattleService::default();
    battle
        .submit_battle_plan(&mut state, Faction::Harkonnen, plan("Feyd-Rautha", 5))
        .unwrap();
    let outcome = battle
        .submit_battle_plan(&mut state, Faction::Atreides, plan("Duncan Idaho", 1))
        .unwrap();

    assert_eq!(outcome.resolution.unwrap().winner, Some(Faction::Harkonnen));
    assert!(state
        .faction_state(Faction::Harkonnen)
        .unwrap()
        .captured_leaders
        .contains(&"Duncan Idaho".to_string()));
    assert!(state
        .faction_state(Faction::Atreides)
        .unwrap()
        .dead_leaders
        .is_empty());
}

#[test]
fn harkonnen_cannot_capture_the_dead() {
    let mut state = battle_state(Faction::Harkonnen, Faction::Atreides);
    give_card(&mut state, Faction::Harkonnen, "Stunner");
    let battle = BattleService::default();
    battle
        .submit_battle_plan(
            &mut state,
            Faction::Harkonnen,
            plan_with("Feyd-Rautha", 5, Some("Stunner"), None),
        )
        .unwrap();
    let outcome = battle
        .submit_battle_plan(&mut state, Faction::Atreides, plan("Duncan Idaho", 1))
        .unwrap();

    assert_eq!(outcome.resolution.unwrap().winner, Some(Faction::Harkonnen));
    assert!(state
        .faction_state(Faction::Harkonnen)
        .unwrap()
        .captured_leaders
        .is_empty());
    assert!(state
        .faction_state(Faction::Atreides)
        .unwrap()
        .dead_leaders
        .contains(&"Duncan Idaho".to_string()));
}

#[test]
fn plans_are_validated_before_they_are_stored() {
    let mut state = battle_state(Faction::Atreides, Faction::Harkonnen);
    let battle = BattleService::default();

    // Dial beyond the stake.
    let err = battle
        .submit_battle_plan(&mut state, Faction::Atreides, plan("Duncan Idaho", 11))
        .unwrap_err();
    assert!(matches!(err, EngineError::RuleViolation { .. }));

    // A card the faction does not hold.
    let err = battle
        .submit_battle_plan(
            &mut state,
            Faction::Atreides,
            plan_with("Duncan Idaho", 3, Some("Lasgun"), None),
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::RuleViolation { .. }));

    // A leader from someone else's roster.
    let err = battle
        .submit_battle_plan(&mut state, Faction::Atreides, plan("Feyd-Rautha", 3))
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTarget { .. }));

    // A dead leader.
    state
        .faction_state_mut(Faction::Atreides)
        .unwrap()
        .dead_leaders
        .push("Duncan Idaho".to_string());
    let err = battle
        .submit_battle_plan(&mut state, Faction::Atreides, plan("Duncan Idaho", 3))
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTarget { .. }));

    // A bystander.
    let err = battle
        .submit_battle_plan(&mut state, Faction::Emperor, plan("Bashar", 0))
        .unwrap_err();
    assert!(matches!(err, EngineError::RuleViolation { .. }));

    // Nothing was stored.
    assert!(state.current_battle.unwrap().plans.is_empty());
}

#[test]
fn a_captured_leader_fights_for_no_one() {
    let mut state = battle_state(Faction::Atreides, Faction::Harkonnen);
    state
        .faction_state_mut(Faction::Harkonnen)
        .unwrap()
        .captured_leaders
        .push("Duncan Idaho".to_string());

    let err = BattleService::default()
        .submit_battle_plan(&mut state, Faction::Atreides, plan("Duncan Idaho", 3))
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTarget { .. }));
}

#[test]
fn the_voice_forbids_and_compels() {
    let mut state = battle_state(Faction::BeneGesserit, Faction::Harkonnen);
    give_card(&mut state, Faction::Harkonnen, "Stunner");
    let battle = BattleService::default();

    battle
        .use_voice(&mut state, Faction::BeneGesserit, CardKind::Weapon, false)
        .unwrap();

    // The target may not play a weapon now.
    let err = battle
        .submit_battle_plan(
            &mut state,
            Faction::Harkonnen,
            plan_with("Feyd-Rautha", 2, Some("Stunner"), None),
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::RuleViolation { .. }));

    // Without the weapon the plan is accepted.
    battle
        .submit_battle_plan(&mut state, Faction::Harkonnen, plan("Feyd-Rautha", 2))
        .unwrap();

    // Only once per battle.
    let err = battle
        .use_voice(&mut state, Faction::BeneGesserit, CardKind::Defense, true)
        .unwrap_err();
    assert!(matches!(err, EngineError::RuleViolation { .. }));
}

#[test]
fn a_compulsion_binds_only_those_who_can_comply() {
    let mut state = battle_state(Faction::BeneGesserit, Faction::Harkonnen);
    give_card(&mut state, Faction::Harkonnen, "Shield");
    let battle = BattleService::default();

    battle
        .use_voice(&mut state, Faction::BeneGesserit, CardKind::Defense, true)
        .unwrap();

    // Holding a defense and omitting it violates the Voice.
    let err = battle
        .submit_battle_plan(&mut state, Faction::Harkonnen, plan("Feyd-Rautha", 2))
        .unwrap_err();
    assert!(matches!(err, EngineError::RuleViolation { .. }));

    battle
        .submit_battle_plan(
            &mut state,
            Faction::Harkonnen,
            plan_with("Feyd-Rautha", 2, None, Some("Shield")),
        )
        .unwrap();
}

#[test]
fn only_the_bene_gesserit_speak_the_voice() {
    let mut state = battle_state(Faction::Atreides, Faction::Harkonnen);
    let err = BattleService::default()
        .use_voice(&mut state, Faction::Atreides, CardKind::Weapon, false)
        .unwrap_err();
    assert!(matches!(err, EngineError::RuleViolation { .. }));
}

#[test]
fn prescience_reveals_the_moment_the_plan_exists() {
    let mut state = battle_state(Faction::Atreides, Faction::Harkonnen);
    give_card(&mut state, Faction::Harkonnen, "Stunner");
    let battle = BattleService::default();

    // Request lands before the opponent commits: nothing yet.
    let disclosure = battle
        .use_prescience(&mut state, Faction::Atreides, PrescienceField::Weapon)
        .unwrap();
    assert!(disclosure.is_none());

    // The moment the plan arrives the field is disclosed.
    let outcome = battle
        .submit_battle_plan(
            &mut state,
            Faction::Harkonnen,
            plan_with("Feyd-Rautha", 2, Some("Stunner"), None),
        )
        .unwrap();
    let disclosure = outcome.disclosure.expect("prescience answered");
    assert_eq!(disclosure.to, Faction::Atreides);
    assert_eq!(disclosure.about, Faction::Harkonnen);
    assert_eq!(disclosure.revealed, "Stunner");
}

#[test]
fn prescience_on_an_existing_plan_answers_immediately() {
    let mut state = battle_state(Faction::Harkonnen, Faction::Atreides);
    let battle = BattleService::default();
    battle
        .submit_battle_plan(&mut state, Faction::Harkonnen, plan("Feyd-Rautha", 4))
        .unwrap();

    let disclosure = battle
        .use_prescience(&mut state, Faction::Atreides, PrescienceField::Dial)
        .unwrap()
        .expect("opponent plan already committed");
    assert_eq!(disclosure.revealed, "4");
}

#[test]
fn detection_queues_one_battle_per_contested_territory() {
    let mut state = make_game_state(MakeGameStateArgs {
        phase: Phase::Battle,
        factions: vec![Faction::Atreides, Faction::Harkonnen, Faction::Emperor],
        ..Default::default()
    });
    place_forces(&mut state, Faction::Atreides, "Arrakeen", 2);
    place_forces(&mut state, Faction::Harkonnen, "Arrakeen", 2);
    place_forces(&mut state, Faction::Emperor, "Arrakeen", 2);
    place_forces(&mut state, Faction::Atreides, "Carthag", 1);
    place_forces(&mut state, Faction::Harkonnen, "Carthag", 1);
    place_forces(&mut state, Faction::Emperor, "Red Chasm", 3);

    let battle = BattleService::default();
    assert!(battle.battles_exist(&state));
    battle.detect_battles(&mut state);

    assert_eq!(state.pending_battles.len(), 2);
    // Three occupants still produce a single two-faction battle.
    let arrakeen = state
        .pending_battles
        .iter()
        .find(|b| b.territory == "Arrakeen")
        .unwrap();
    assert_eq!(
        (arrakeen.attacker, arrakeen.defender),
        (Faction::Atreides, Faction::Emperor)
    );
}
