use crate::core::slot::{PerSlot, Slot};
use crate::error::GameError;

/// How a caller ends up in a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatClaim {
    /// The slot was empty and is now taken by the caller
    Claim(Slot),
    /// The caller already held this slot (reconnection)
    Reattach(Slot),
}

impl SeatClaim {
    pub fn slot(self) -> Slot {
        match self {
            SeatClaim::Claim(slot) | SeatClaim::Reattach(slot) => slot,
        }
    }
}

/// Decide which slot a caller gets
///
/// Checked in order: empty `p1`, empty `p2` (unless the caller already is
/// `p1`), the caller's existing slot, otherwise the room is full.
///
/// # Arguments
///
/// * `players` - Current players map of the room
/// * `identity` - The caller's identity
///
/// # Returns
///
/// The seat claim, or `GameError::RoomFull`
pub fn assign_seat(players: &PerSlot<Option<String>>, identity: &str) -> Result<SeatClaim, GameError> {
    let holds = |slot: Slot| players.get(slot).as_deref() == Some(identity);

    if players.p1.is_none() {
        return Ok(SeatClaim::Claim(Slot::P1));
    }
    if players.p2.is_none() && !holds(Slot::P1) {
        return Ok(SeatClaim::Claim(Slot::P2));
    }
    if holds(Slot::P1) {
        return Ok(SeatClaim::Reattach(Slot::P1));
    }
    if holds(Slot::P2) {
        return Ok(SeatClaim::Reattach(Slot::P2));
    }
    Err(GameError::RoomFull)
}

/// Trim and check a human-supplied room id
///
/// # Arguments
///
/// * `room_id` - Raw room id input
///
/// # Returns
///
/// The trimmed id, or `GameError::InvalidRoomId` if nothing is left
pub fn normalize_room_id(room_id: &str) -> Result<String, GameError> {
    let cleaned = room_id.trim();
    if cleaned.is_empty() {
        return Err(GameError::InvalidRoomId);
    }
    Ok(cleaned.to_string())
}

/// Generate an identity for a caller that did not bring one
pub fn generate_identity() -> String {
    format!("u_{}", uuid::Uuid::new_v4().simple())
}
