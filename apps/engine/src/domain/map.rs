//! Board territories and the static topology.
//!
//! Every territory occupies a single storm sector (1..=18). The Polar Sink
//! sits at sector 0, which the storm never enters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::factions::Faction;

/// Number of storm sectors around the board.
pub const SECTORS: u8 = 18;

/// Sector reserved for the Polar Sink; the storm track is 1..=18.
pub const POLAR_SECTOR: u8 = 0;

/// Territories that the storm and worms never touch.
pub const STORM_IMMUNE: [&str; 2] = ["Arrakeen", "Carthag"];

/// Holding forces in either of these extends movement range to 3 hops.
pub const ORNITHOPTER_BASES: [&str; 2] = ["Arrakeen", "Carthag"];

/// Spice blows here pay 10 instead of 6.
pub const HIGH_VALUE_BLOWS: [&str; 3] = ["South Mesa", "Red Chasm", "The Great Flat"];

/// Sand territories with a spice blow site; the spice deck has one card per
/// entry.
pub const SPICE_BLOW_TERRITORIES: [&str; 12] = [
    "Cielago North",
    "Cielago South",
    "South Mesa",
    "Red Chasm",
    "The Minor Erg",
    "Hagga Basin",
    "Funeral Plain",
    "The Great Flat",
    "Habbanya Erg",
    "Wind Pass North",
    "Old Gap",
    "Broken Land",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Territory {
    pub name: String,
    pub sector: u8,
    pub is_stronghold: bool,
    pub is_sietch: bool,
    pub spice_blow_amount: u32,
    /// Occupying forces per faction; zero entries are removed.
    pub forces: BTreeMap<Faction, u32>,
    pub controlling_faction: Option<Faction>,
}

impl Territory {
    fn new(name: &str, sector: u8, is_stronghold: bool, is_sietch: bool) -> Self {
        Self {
            name: name.to_string(),
            sector,
            is_stronghold,
            is_sietch,
            spice_blow_amount: 0,
            forces: BTreeMap::new(),
            controlling_faction: None,
        }
    }

    /// Storm and worms pass over this territory without effect.
    pub fn is_storm_immune(&self) -> bool {
        STORM_IMMUNE.contains(&self.name.as_str()) || self.name.contains("Imperial Basin")
    }

    pub fn forces_of(&self, faction: Faction) -> u32 {
        self.forces.get(&faction).copied().unwrap_or(0)
    }

    /// Add forces for a faction.
    pub fn add_forces(&mut self, faction: Faction, count: u32) {
        if count > 0 {
            *self.forces.entry(faction).or_insert(0) += count;
        }
    }

    /// Remove up to `count` forces for a faction, dropping the entry at zero.
    /// Returns the number actually removed.
    pub fn remove_forces(&mut self, faction: Faction, count: u32) -> u32 {
        let Some(present) = self.forces.get_mut(&faction) else {
            return 0;
        };
        let removed = count.min(*present);
        *present -= removed;
        if *present == 0 {
            self.forces.remove(&faction);
        }
        removed
    }

    /// Remove every force a faction has here.
    pub fn clear_forces(&mut self, faction: Faction) -> u32 {
        self.forces.remove(&faction).unwrap_or(0)
    }

    pub fn occupants(&self) -> Vec<Faction> {
        self.forces.keys().copied().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Map {
    pub territories: BTreeMap<String, Territory>,
}

impl Map {
    pub fn territory(&self, name: &str) -> Option<&Territory> {
        self.territories.get(name)
    }

    pub fn territory_mut(&mut self, name: &str) -> Option<&mut Territory> {
        self.territories.get_mut(name)
    }

    /// All territories whose sector matches.
    pub fn territories_in_sector(&mut self, sector: u8) -> Vec<&mut Territory> {
        self.territories
            .values_mut()
            .filter(|t| t.sector == sector)
            .collect()
    }

    /// The standard board.
    pub fn standard() -> Self {
        let mut territories = BTreeMap::new();
        for t in [
            Territory::new("Polar Sink", POLAR_SECTOR, false, false),
            Territory::new("Cielago West", 1, false, false),
            Territory::new("Cielago North", 2, false, false),
            Territory::new("Cielago South", 2, false, false),
            Territory::new("Cielago East", 3, false, false),
            Territory::new("South Mesa", 4, false, false),
            Territory::new("Tuek's Sietch", 4, true, true),
            Territory::new("Red Chasm", 6, false, false),
            Territory::new("The Minor Erg", 7, false, false),
            Territory::new("False Wall East", 7, false, false),
            Territory::new("Imperial Basin", 8, false, false),
            Territory::new("Hole in the Rock", 8, false, false),
            Territory::new("Arrakeen", 9, true, false),
            Territory::new("Old Gap", 9, false, false),
            Territory::new("Carthag", 10, true, false),
            Territory::new("Hagga Basin", 11, false, false),
            Territory::new("Broken Land", 11, false, false),
            Territory::new("Rock Outcroppings", 12, false, false),
            Territory::new("Sietch Tabr", 13, true, true),
            Territory::new("Funeral Plain", 14, false, false),
            Territory::new("The Great Flat", 15, false, false),
            Territory::new("Habbanya Sietch", 16, true, true),
            Territory::new("Habbanya Erg", 17, false, false),
            Territory::new("Wind Pass North", 18, false, false),
        ] {
            territories.insert(t.name.clone(), t);
        }
        Self { territories }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_map_has_five_strongholds() {
        let map = Map::standard();
        let strongholds: Vec<_> = map
            .territories
            .values()
            .filter(|t| t.is_stronghold)
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(strongholds.len(), 5);
        assert!(strongholds.contains(&"Arrakeen"));
        assert!(strongholds.contains(&"Carthag"));
    }

    #[test]
    fn spice_blow_territories_exist_on_the_board() {
        let map = Map::standard();
        for name in SPICE_BLOW_TERRITORIES {
            assert!(map.territory(name).is_some(), "missing {name}");
        }
    }

    #[test]
    fn force_entries_drop_at_zero() {
        let mut t = Territory::new("South Mesa", 4, false, false);
        t.add_forces(Faction::Fremen, 3);
        assert_eq!(t.remove_forces(Faction::Fremen, 5), 3);
        assert!(t.forces.is_empty());
    }

    #[test]
    fn imperial_basin_is_immune_by_name() {
        let t = Territory::new("Imperial Basin", 8, false, false);
        assert!(t.is_storm_immune());
        let t = Territory::new("Funeral Plain", 14, false, false);
        assert!(!t.is_storm_immune());
    }
}
