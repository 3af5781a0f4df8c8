use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::store::StoreError;

/// Everything a room action can fail with
///
/// None of these are retried; the action is aborted and the room keeps its
/// last committed state.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Room is full (only 2 players allowed). Use a different room id")]
    RoomFull,
    #[error("It is not your turn")]
    NotYourTurn,
    #[error("Game has not started yet; both players must press ready")]
    GameNotStarted,
    #[error("Game is already over")]
    GameFinished,
    #[error("Room id cannot be empty")]
    InvalidRoomId,
    #[error("Player identity cannot be empty")]
    InvalidIdentity,
    #[error("Room document is malformed: {0}")]
    CorruptDocument(#[from] serde_json::Error),
    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),
}

impl GameError {
    /// HTTP status used when the error reaches a client
    pub fn status_code(&self) -> StatusCode {
        match self {
            GameError::RoomFull
            | GameError::NotYourTurn
            | GameError::GameNotStarted
            | GameError::GameFinished => StatusCode::CONFLICT,
            GameError::InvalidRoomId | GameError::InvalidIdentity => StatusCode::BAD_REQUEST,
            GameError::CorruptDocument(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GameError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Short machine-readable name of the error
    pub fn kind(&self) -> &'static str {
        match self {
            GameError::RoomFull => "room_full",
            GameError::NotYourTurn => "not_your_turn",
            GameError::GameNotStarted => "game_not_started",
            GameError::GameFinished => "game_finished",
            GameError::InvalidRoomId => "invalid_room_id",
            GameError::InvalidIdentity => "invalid_identity",
            GameError::CorruptDocument(_) => "corrupt_document",
            GameError::StoreUnavailable(_) => "store_unavailable",
        }
    }
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Room action failed: {}", self);
        }
        (
            status,
            Json(serde_json::json!({
                "error": self.kind(),
                "message": self.to_string(),
            })),
        )
            .into_response()
    }
}
