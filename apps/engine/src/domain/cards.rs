//! Treachery and spice deck card types plus the static deck contents.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Card names with rule weight. Everything else in the treachery deck is
/// flavor that only matters at auction time.
pub const LASGUN: &str = "Lasgun";
pub const SHIELD: &str = "Shield";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CardKind {
    Weapon,
    Defense,
    Special,
    Worthless,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreacheryCard {
    pub name: String,
    pub kind: CardKind,
}

impl TreacheryCard {
    pub fn new(name: impl Into<String>, kind: CardKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A card in the spice deck: either a territory blow or Shai-Hulud.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpiceCard {
    Territory { territory: String },
    ShaiHulud,
}

impl SpiceCard {
    pub fn territory_name(&self) -> Option<&str> {
        match self {
            SpiceCard::Territory { territory } => Some(territory),
            SpiceCard::ShaiHulud => None,
        }
    }

    pub fn is_worm(&self) -> bool {
        matches!(self, SpiceCard::ShaiHulud)
    }
}

/// Full treachery deck contents before the setup shuffle.
pub static TREACHERY_DECK: Lazy<Vec<TreacheryCard>> = Lazy::new(|| {
    use CardKind::*;

    let mut deck = Vec::new();
    for (name, kind, copies) in [
        (LASGUN, Weapon, 1),
        ("Crysknife", Weapon, 1),
        ("Maula Pistol", Weapon, 2),
        ("Slip Tip", Weapon, 1),
        ("Stunner", Weapon, 2),
        ("Chaumas", Weapon, 2),
        ("Chaumurky", Weapon, 2),
        ("Gom Jabbar", Weapon, 1),
        ("Ellaca Drug", Weapon, 1),
        (SHIELD, Defense, 4),
        ("Snooper", Defense, 4),
        ("Cheap Hero", Special, 2),
        ("Cheap Heroine", Special, 1),
        ("Karama", Special, 2),
        ("Truthtrance", Special, 2),
        ("Tleilaxu Ghola", Special, 1),
        ("Weather Control", Special, 1),
        ("Family Atomics", Special, 1),
        ("Hajr", Special, 1),
        ("Baliset", Worthless, 1),
        ("Jubba Cloak", Worthless, 1),
        ("Kulon", Worthless, 1),
        ("La, La, La", Worthless, 1),
        ("Trip to Gamont", Worthless, 1),
    ] {
        for _ in 0..copies {
            deck.push(TreacheryCard::new(name, kind));
        }
    }
    deck
});

/// The kind printed on a named treachery card, if the name is known.
pub fn card_kind(name: &str) -> Option<CardKind> {
    TREACHERY_DECK
        .iter()
        .find(|c| c.name == name)
        .map(|c| c.kind)
}

/// Full spice deck contents before the setup shuffle: one card per sand
/// territory with a spice blow site, plus six worms.
pub static SPICE_DECK: Lazy<Vec<SpiceCard>> = Lazy::new(|| {
    let mut deck: Vec<SpiceCard> = crate::domain::map::SPICE_BLOW_TERRITORIES
        .iter()
        .map(|name| SpiceCard::Territory {
            territory: (*name).to_string(),
        })
        .collect();
    for _ in 0..6 {
        deck.push(SpiceCard::ShaiHulud);
    }
    deck
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deck_has_atomic_ingredients() {
        assert!(TREACHERY_DECK
            .iter()
            .any(|c| c.name == LASGUN && c.kind == CardKind::Weapon));
        assert!(TREACHERY_DECK
            .iter()
            .any(|c| c.name == SHIELD && c.kind == CardKind::Defense));
    }

    #[test]
    fn spice_deck_has_six_worms() {
        assert_eq!(SPICE_DECK.iter().filter(|c| c.is_worm()).count(), 6);
    }
}
