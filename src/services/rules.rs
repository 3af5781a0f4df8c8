use serde::Serialize;

use crate::core::{
    constants::{CAPTURE_BONUS, START_POSITION},
    room::{DiceValue, RoomDocument, TokenSet},
    slot::{PerSlot, Slot},
};

/// A single token step taken during a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Movement {
    pub token_index: usize,
    pub from: u8,
    pub to: u8,
}

/// Everything a turn changes, computed before anything is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Slot that rolled
    pub slot: Slot,
    pub dice: u8,
    /// `None` when every token had already finished
    pub movement: Option<Movement>,
    /// Opponent token indices sent back to start
    pub captured: Vec<usize>,
    /// Mover's tokens after the move
    pub tokens: TokenSet,
    /// Opponent's tokens after captures
    pub opponent_tokens: TokenSet,
    /// Both scores after the turn
    pub points: PerSlot<u32>,
    pub points_gained: u32,
    /// Turn owner after the turn
    pub next_player: Slot,
    pub winner: Option<Slot>,
}

/// Pick the token to move: the lowest index that has not finished
///
/// # Arguments
///
/// * `tokens` - The mover's tokens
///
/// # Returns
///
/// Token index, or None if all four are on the finish square
pub fn select_token(tokens: &TokenSet) -> Option<usize> {
    tokens.first_movable()
}

/// Send every opponent token sitting on `landing` back to start
///
/// The start square is never a capture site.
///
/// # Arguments
///
/// * `landing` - Position the mover's token just reached
/// * `opponent` - The opponent's tokens, updated in place
///
/// # Returns
///
/// Indices of the captured tokens
pub fn apply_captures(landing: u8, opponent: &mut TokenSet) -> Vec<usize> {
    if landing == START_POSITION {
        return Vec::new();
    }

    let captured: Vec<usize> = opponent
        .positions()
        .iter()
        .enumerate()
        .filter(|(_, &position)| position == landing)
        .map(|(index, _)| index)
        .collect();

    for &index in &captured {
        opponent.reset(index);
    }

    captured
}

/// Check if a slot has brought all four tokens home
///
/// # Arguments
///
/// * `tokens` - The slot's tokens
/// * `slot` - The slot that owns them
///
/// # Returns
///
/// The slot if it has won, None otherwise
pub fn check_winner(tokens: &TokenSet, slot: Slot) -> Option<Slot> {
    tokens.all_finished().then_some(slot)
}

/// Resolve one roll for `slot` against the current room
///
/// Moves the first unfinished token by `dice` (clamped at the finish), adds
/// the roll to the mover's score, captures any opponent tokens on the landing
/// square for a flat bonus each, hands the turn to the opponent and detects a
/// win. With no movable token only the dice value changes and the turn stays
/// with the roller.
pub fn resolve_turn(room: &RoomDocument, slot: Slot, dice: u8) -> TurnOutcome {
    let opponent = slot.opponent();
    let mut tokens = *room.tokens.get(slot);
    let mut opponent_tokens = *room.tokens.get(opponent);
    let mut points = room.points.clone();

    let Some(token_index) = select_token(&tokens) else {
        return TurnOutcome {
            slot,
            dice,
            movement: None,
            captured: Vec::new(),
            tokens,
            opponent_tokens,
            points,
            points_gained: 0,
            next_player: slot,
            winner: None,
        };
    };

    let from = tokens.positions()[token_index];
    let to = tokens.advance(token_index, dice);
    let captured = apply_captures(to, &mut opponent_tokens);

    let points_gained = u32::from(dice) + CAPTURE_BONUS * captured.len() as u32;
    *points.get_mut(slot) += points_gained;

    TurnOutcome {
        slot,
        dice,
        movement: Some(Movement {
            token_index,
            from,
            to,
        }),
        captured,
        tokens,
        opponent_tokens,
        points,
        points_gained,
        next_player: opponent,
        winner: check_winner(&tokens, slot),
    }
}

impl TurnOutcome {
    pub fn passes_turn(&self) -> bool {
        self.next_player != self.slot
    }

    /// Write the turn into `room`
    ///
    /// Without a movement only the dice value changes.
    pub fn apply(&self, room: &mut RoomDocument) {
        room.state.dice = DiceValue::from_roll(self.dice);
        if self.movement.is_none() {
            return;
        }

        *room.tokens.get_mut(self.slot) = self.tokens;
        *room.tokens.get_mut(self.slot.opponent()) = self.opponent_tokens;
        room.points = self.points.clone();
        room.state.current_player = self.next_player;
        if let Some(winner) = self.winner {
            room.winner = Some(winner.label().to_string());
        }
    }
}
