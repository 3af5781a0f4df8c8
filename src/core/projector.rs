use serde::Serialize;

use super::{
    room::{RoomDocument, TokenSet},
    slot::{PerSlot, Slot},
};

/// What one viewer's screen shows for a room snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    /// The viewer's own slot
    pub my_slot: Slot,
    /// Turn owner as displayed (1 or 2)
    pub current_player: u8,
    /// Last roll, None before the first roll
    pub dice: Option<u8>,
    pub p1_points: u32,
    pub p2_points: u32,
    /// e.g. "Player 1 wins!"
    pub win_message: Option<String>,
    /// Whether the roll action is available to this viewer
    pub roll_enabled: bool,
    pub started: bool,
    pub tokens: PerSlot<TokenSet>,
    pub message: Option<String>,
}

/// Project a room snapshot for the viewer sitting in `my_slot`
///
/// Rolling is enabled only when the game has started, nobody has won, and
/// the turn belongs to the viewer.
pub fn project(room: &RoomDocument, my_slot: Slot) -> ViewModel {
    let win_message = room.winner.as_ref().map(|label| format!("{} wins!", label));
    let roll_enabled =
        room.state.started && win_message.is_none() && room.state.current_player == my_slot;

    ViewModel {
        my_slot,
        current_player: room.state.current_player.number(),
        dice: room.state.dice.rolled(),
        p1_points: room.points.p1,
        p2_points: room.points.p2,
        win_message,
        roll_enabled,
        started: room.state.started,
        tokens: room.tokens.clone(),
        message: room.message.clone(),
    }
}
