//! Battle records: pending battles, committed plans, and the Bene Gesserit /
//! Atreides battle abilities.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::cards::CardKind;
use crate::domain::factions::Faction;

/// A committed battle plan. An empty `leader` means no leader was sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattlePlan {
    pub leader: String,
    pub dial: u32,
    pub weapon: Option<String>,
    pub defense: Option<String>,
}

impl BattlePlan {
    /// A named leader at dial zero is a sacrifice that wins outright.
    pub fn is_cheap_hero(&self) -> bool {
        self.dial == 0 && !self.leader.is_empty()
    }

    pub fn weapon_name(&self) -> &str {
        self.weapon.as_deref().unwrap_or("")
    }

    pub fn defense_name(&self) -> &str {
        self.defense.as_deref().unwrap_or("")
    }

    pub fn has_weapon(&self) -> bool {
        self.weapon.as_deref().is_some_and(|w| !w.is_empty())
    }

    pub fn has_defense(&self) -> bool {
        self.defense.as_deref().is_some_and(|d| !d.is_empty())
    }
}

/// The Voice: compels or forbids one kind of card in the target's plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceRestriction {
    pub target: Faction,
    pub card_kind: CardKind,
    pub must_play: bool,
}

/// Which component of the opponent's plan Prescience reveals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrescienceField {
    Leader,
    Dial,
    Weapon,
    Defense,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescienceRequest {
    pub requester: Faction,
    pub field: PrescienceField,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleState {
    pub territory: String,
    pub attacker: Faction,
    pub defender: Faction,
    pub plans: BTreeMap<Faction, BattlePlan>,
    pub voice: Option<VoiceRestriction>,
    pub prescience: Option<PrescienceRequest>,
    pub is_active: bool,
}

impl BattleState {
    pub fn new(territory: impl Into<String>, attacker: Faction, defender: Faction) -> Self {
        Self {
            territory: territory.into(),
            attacker,
            defender,
            plans: BTreeMap::new(),
            voice: None,
            prescience: None,
            is_active: true,
        }
    }

    pub fn is_combatant(&self, faction: Faction) -> bool {
        faction == self.attacker || faction == self.defender
    }

    /// The other combatant. Callers must pass a combatant.
    pub fn opponent_of(&self, faction: Faction) -> Faction {
        if faction == self.attacker {
            self.defender
        } else {
            self.attacker
        }
    }

    pub fn both_plans_committed(&self) -> bool {
        self.plans.contains_key(&self.attacker) && self.plans.contains_key(&self.defender)
    }
}
