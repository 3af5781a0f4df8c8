use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    slot::{self, PerSlot, Slot},
    DICE_FACES, FINISH_POSITION, TOKENS_PER_PLAYER,
};

/// Positions of one player's four tokens on the 64-cell track
///
/// Every position is in `[0, 63]`; 0 is the start square and 63 is finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct TokenSet([u8; TOKENS_PER_PLAYER]);

impl TokenSet {
    /// Build a token set, rejecting positions past the finish
    pub fn new(positions: [u8; TOKENS_PER_PLAYER]) -> Result<Self, String> {
        if let Some(bad) = positions.iter().find(|&&p| p > FINISH_POSITION) {
            return Err(format!(
                "token position {} is past the finish ({})",
                bad, FINISH_POSITION
            ));
        }
        Ok(Self(positions))
    }

    pub fn positions(&self) -> [u8; TOKENS_PER_PLAYER] {
        self.0
    }

    pub fn get(&self, index: usize) -> Option<u8> {
        self.0.get(index).copied()
    }

    /// Index of the first token that has not finished
    pub fn first_movable(&self) -> Option<usize> {
        self.0.iter().position(|&p| p < FINISH_POSITION)
    }

    pub fn all_finished(&self) -> bool {
        self.0.iter().all(|&p| p == FINISH_POSITION)
    }

    /// Move a token forward, absorbing any overshoot at the finish
    ///
    /// Returns the new position.
    pub fn advance(&mut self, index: usize, steps: u8) -> u8 {
        let position = &mut self.0[index];
        *position = position.saturating_add(steps).min(FINISH_POSITION);
        *position
    }

    /// Send a token back to the start square
    pub fn reset(&mut self, index: usize) {
        self.0[index] = 0;
    }
}

impl TryFrom<Vec<u8>> for TokenSet {
    type Error = String;

    fn try_from(positions: Vec<u8>) -> Result<Self, Self::Error> {
        let positions: [u8; TOKENS_PER_PLAYER] = positions.try_into().map_err(|v: Vec<u8>| {
            format!("expected {} token positions, got {}", TOKENS_PER_PLAYER, v.len())
        })?;
        Self::new(positions)
    }
}

impl From<TokenSet> for Vec<u8> {
    fn from(tokens: TokenSet) -> Self {
        tokens.0.to_vec()
    }
}

/// Last rolled dice value; 0 means nothing has been rolled yet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DiceValue(u8);

impl DiceValue {
    pub const NONE: DiceValue = DiceValue(0);

    pub fn new(value: u8) -> Result<Self, String> {
        if value > DICE_FACES {
            return Err(format!("dice value must be 0-{}, got {}", DICE_FACES, value));
        }
        Ok(Self(value))
    }

    /// A fresh roll, clamped into `1..=6`
    pub fn from_roll(roll: u8) -> Self {
        Self(roll.clamp(1, DICE_FACES))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// The rolled value, or `None` before the first roll
    pub fn rolled(self) -> Option<u8> {
        (self.0 != 0).then_some(self.0)
    }
}

impl TryFrom<u8> for DiceValue {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DiceValue> for u8 {
    fn from(dice: DiceValue) -> Self {
        dice.0
    }
}

/// The `state` section of a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TurnState {
    /// Slot whose turn is authoritative
    #[serde(with = "slot::as_number")]
    pub current_player: Slot,
    pub dice: DiceValue,
    /// Set once both players are ready
    pub started: bool,
}

impl Default for TurnState {
    fn default() -> Self {
        Self {
            current_player: Slot::P1,
            dice: DiceValue::NONE,
            started: false,
        }
    }
}

/// The complete shared state of one room
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoomDocument {
    /// Participant identity per slot
    pub players: PerSlot<Option<String>>,
    pub state: TurnState,
    pub tokens: PerSlot<TokenSet>,
    pub points: PerSlot<u32>,
    pub ready: PerSlot<bool>,
    /// Label of the winning slot, terminal once set
    pub winner: Option<String>,
    /// Last announcement, e.g. "Game started"
    pub message: Option<String>,
    /// Set by the one-time room initializer
    pub init_check: bool,
}

impl RoomDocument {
    /// A freshly initialized room keeping whoever has already claimed a seat
    pub fn initialized(players: PerSlot<Option<String>>) -> Self {
        Self {
            players,
            init_check: true,
            ..Self::default()
        }
    }

    /// Parse a store snapshot; a missing room reads as an empty one
    pub fn from_value(value: Option<Value>) -> Result<Self, serde_json::Error> {
        match value {
            Some(value) => serde_json::from_value(value),
            None => Ok(Self::default()),
        }
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Slot occupied by `identity`, checking `p1` first
    pub fn slot_of(&self, identity: &str) -> Option<Slot> {
        seat_of(&self.players, identity)
    }

    /// Winning slot, if the game is over
    pub fn winner_slot(&self) -> Option<Slot> {
        self.winner.as_deref().and_then(Slot::from_label)
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    pub fn both_ready(&self) -> bool {
        self.ready.p1 && self.ready.p2
    }
}

/// Slot occupied by `identity` in a players map, checking `p1` first
pub fn seat_of(players: &PerSlot<Option<String>>, identity: &str) -> Option<Slot> {
    Slot::ALL
        .into_iter()
        .find(|&slot| players.get(slot).as_deref() == Some(identity))
}
