//! Playable characters and the instrument each one collects

use serde::{Deserialize, Serialize};

/// Collectible pickup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    Bass,
    Drumsticks,
    Guitar,
    Mic,
}

impl Instrument {
    pub fn as_str(&self) -> &'static str {
        match self {
            Instrument::Bass => "bass",
            Instrument::Drumsticks => "drumsticks",
            Instrument::Guitar => "guitar",
            Instrument::Mic => "mic",
        }
    }
}

/// Band member chosen on the character select screen.
///
/// Physics are identical for every character; the choice only decides the
/// sprite and which instrument shows up as a collectible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Character {
    #[default]
    Fonso,
    Mauro,
    Diego,
    Rocky,
}

impl Character {
    /// Selection order on the character screen
    pub const ALL: [Character; 4] = [
        Character::Fonso,
        Character::Mauro,
        Character::Diego,
        Character::Rocky,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Character::Fonso => "fonso",
            Character::Mauro => "mauro",
            Character::Diego => "diego",
            Character::Rocky => "rocky",
        }
    }

    /// Parse a character key. Unknown keys fall back to the default character.
    pub fn from_key(key: &str) -> Self {
        match key.to_lowercase().as_str() {
            "mauro" => Character::Mauro,
            "diego" => Character::Diego,
            "rocky" => Character::Rocky,
            _ => Character::Fonso,
        }
    }

    /// Character at a 0-based position on the select screen
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Character::Fonso => "FONSO",
            Character::Mauro => "MAURO",
            Character::Diego => "DIEGO",
            Character::Rocky => "ROCKY",
        }
    }

    pub fn tagline(&self) -> &'static str {
        match self {
            Character::Fonso => "HOPPUS",
            Character::Mauro => "DE LOURO",
            Character::Diego => "DOBRE BREAK",
            Character::Rocky => "O BERRIDOS",
        }
    }

    pub fn instrument(&self) -> Instrument {
        match self {
            Character::Fonso => Instrument::Bass,
            Character::Mauro => Instrument::Drumsticks,
            Character::Diego => Instrument::Guitar,
            Character::Rocky => Instrument::Mic,
        }
    }
}
