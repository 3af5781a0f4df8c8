use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two fixed player positions in a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    P1,
    P2,
}

impl Slot {
    /// Both slots in seating order
    pub const ALL: [Slot; 2] = [Slot::P1, Slot::P2];

    /// Turn number stored in `state.currentPlayer`
    pub fn number(self) -> u8 {
        match self {
            Slot::P1 => 1,
            Slot::P2 => 2,
        }
    }

    /// Key used for this slot in the per-slot maps of the room document
    pub fn key(self) -> &'static str {
        match self {
            Slot::P1 => "p1",
            Slot::P2 => "p2",
        }
    }

    /// Display label, also written to `winner`
    pub fn label(self) -> &'static str {
        match self {
            Slot::P1 => "Player 1",
            Slot::P2 => "Player 2",
        }
    }

    pub fn opponent(self) -> Slot {
        match self {
            Slot::P1 => Slot::P2,
            Slot::P2 => Slot::P1,
        }
    }

    pub fn from_number(number: u8) -> Option<Slot> {
        match number {
            1 => Some(Slot::P1),
            2 => Some(Slot::P2),
            _ => None,
        }
    }

    pub fn from_key(key: &str) -> Option<Slot> {
        Slot::ALL.into_iter().find(|slot| slot.key() == key)
    }

    pub fn from_label(label: &str) -> Option<Slot> {
        Slot::ALL.into_iter().find(|slot| slot.label() == label)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Serde adapter storing a [`Slot`] as its turn number (1 or 2)
pub mod as_number {
    use super::Slot;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(slot: &Slot, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(slot.number())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Slot, D::Error> {
        let number = u8::deserialize(deserializer)?;
        Slot::from_number(number)
            .ok_or_else(|| D::Error::custom(format!("player number must be 1 or 2, got {number}")))
    }
}

/// A value kept once per slot, serialized as `{ "p1": .., "p2": .. }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerSlot<T: Default> {
    pub p1: T,
    pub p2: T,
}

impl<T: Default> PerSlot<T> {
    pub fn new(p1: T, p2: T) -> Self {
        Self { p1, p2 }
    }

    pub fn get(&self, slot: Slot) -> &T {
        match slot {
            Slot::P1 => &self.p1,
            Slot::P2 => &self.p2,
        }
    }

    pub fn get_mut(&mut self, slot: Slot) -> &mut T {
        match slot {
            Slot::P1 => &mut self.p1,
            Slot::P2 => &mut self.p2,
        }
    }
}
