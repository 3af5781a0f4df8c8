use serde::{Deserialize, Serialize};

use crate::core::{ReadyOutcome, SessionHandle, Slot};

/// Response to a successful join
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinResponse {
    pub room_id: String,
    pub slot: Slot,
    /// Turn number of the slot (1 or 2)
    pub player_number: u8,
    /// Identity to send when reconnecting
    pub identity: String,
    /// Signed session token, also set as a cookie
    pub token: String,
}

impl JoinResponse {
    pub fn new(session: &SessionHandle, token: String) -> Self {
        Self {
            room_id: session.room_id().to_string(),
            slot: session.slot(),
            player_number: session.slot().number(),
            identity: session.identity().to_string(),
            token,
        }
    }
}

/// Response to pressing ready
#[derive(Debug, Clone, Serialize)]
pub struct ReadyResponse {
    pub status: ReadyOutcome,
    pub message: String,
}

impl From<ReadyOutcome> for ReadyResponse {
    fn from(status: ReadyOutcome) -> Self {
        let message = match status {
            ReadyOutcome::Started => "Game started",
            ReadyOutcome::AlreadyStarted => "Game already in progress",
            ReadyOutcome::WaitingForOpponent => "Waiting for the other player to press ready",
        };
        Self {
            status,
            message: message.to_string(),
        }
    }
}
