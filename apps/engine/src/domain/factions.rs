//! The six playable factions: identities, leader rosters, and starting
//! positions used by the initial deal.

use serde::{Deserialize, Serialize};

/// One of the six playable powers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Faction {
    Atreides,
    BeneGesserit,
    Emperor,
    Fremen,
    Harkonnen,
    SpacingGuild,
}

pub const ALL_FACTIONS: [Faction; 6] = [
    Faction::Atreides,
    Faction::BeneGesserit,
    Faction::Emperor,
    Faction::Fremen,
    Faction::Harkonnen,
    Faction::SpacingGuild,
];

impl Faction {
    pub fn display_name(&self) -> &'static str {
        match self {
            Faction::Atreides => "Atreides",
            Faction::BeneGesserit => "Bene Gesserit",
            Faction::Emperor => "Emperor",
            Faction::Fremen => "Fremen",
            Faction::Harkonnen => "Harkonnen",
            Faction::SpacingGuild => "Spacing Guild",
        }
    }

    /// The five leaders each faction can send into battle.
    pub fn leader_roster(&self) -> &'static [&'static str] {
        match self {
            Faction::Atreides => &[
                "Lady Jessica",
                "Thufir Hawat",
                "Gurney Halleck",
                "Duncan Idaho",
                "Dr. Wellington Yueh",
            ],
            Faction::BeneGesserit => &[
                "Alia",
                "Margot Lady Fenring",
                "Princess Irulan",
                "Wanna Marcus",
                "Mother Ramallo",
            ],
            Faction::Emperor => &[
                "Hasimir Fenring",
                "Captain Aramsham",
                "Caid",
                "Bashar",
                "Burseg",
            ],
            Faction::Fremen => &["Stilgar", "Chani", "Otheym", "Shadout Mapes", "Jamis"],
            Faction::Harkonnen => &[
                "Feyd-Rautha",
                "Beast Rabban",
                "Piter de Vries",
                "Captain Iakin Nefud",
                "Umman Kudu",
            ],
            Faction::SpacingGuild => &[
                "Staban Tuek",
                "Esmar Tuek",
                "Master Bewt",
                "Soo-Soo Sook",
                "Guild Representative",
            ],
        }
    }

    /// Spice held at the start of the game.
    pub fn starting_spice(&self) -> u32 {
        match self {
            Faction::Atreides => 10,
            Faction::BeneGesserit => 5,
            Faction::Emperor => 10,
            Faction::Fremen => 3,
            Faction::Harkonnen => 10,
            Faction::SpacingGuild => 5,
        }
    }

    /// Off-planet reserves after the initial garrison is placed.
    pub fn starting_reserves(&self) -> u32 {
        match self {
            Faction::Atreides => 10,
            Faction::BeneGesserit => 19,
            Faction::Emperor => 20,
            Faction::Fremen => 10,
            Faction::Harkonnen => 10,
            Faction::SpacingGuild => 15,
        }
    }

    /// Initial on-board garrison: (territory, force count), if any.
    pub fn starting_garrison(&self) -> Option<(&'static str, u32)> {
        match self {
            Faction::Atreides => Some(("Arrakeen", 10)),
            Faction::BeneGesserit => Some(("Polar Sink", 1)),
            Faction::Emperor => None,
            Faction::Fremen => Some(("Sietch Tabr", 10)),
            Faction::Harkonnen => Some(("Carthag", 10)),
            Faction::SpacingGuild => Some(("Tuek's Sietch", 5)),
        }
    }
}

/// Which faction's roster a leader name belongs to, if any.
pub fn faction_of_leader(leader: &str) -> Option<Faction> {
    ALL_FACTIONS
        .into_iter()
        .find(|f| f.leader_roster().contains(&leader))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rosters_are_five_unique_leaders() {
        let mut all: Vec<&str> = Vec::new();
        for faction in ALL_FACTIONS {
            let roster = faction.leader_roster();
            assert_eq!(roster.len(), 5);
            all.extend(roster);
        }
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 30, "leader names must be globally unique");
    }

    #[test]
    fn leader_lookup_round_trips() {
        assert_eq!(faction_of_leader("Stilgar"), Some(Faction::Fremen));
        assert_eq!(faction_of_leader("Feyd-Rautha"), Some(Faction::Harkonnen));
        assert_eq!(faction_of_leader("Nobody"), None);
    }
}
