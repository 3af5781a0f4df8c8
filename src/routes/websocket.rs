use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};

use crate::{
    auth::AuthenticatedSession,
    core::{RoomFeed, SessionHandle, ViewModel},
    error::GameError,
    state::AppState,
};

/// Wrap a view in the message format sent over the socket
pub fn state_update_message(view: &ViewModel) -> serde_json::Value {
    serde_json::json!({
        "type": "state_update",
        "data": view,
    })
}

/// WebSocket endpoint streaming the caller's view of a room
///
/// # Flow
///
/// 1. Authenticate via the room's session cookie
/// 2. Subscribe to the room before upgrading, so no revision is missed
/// 3. Send one `state_update` per room revision, in revision order
/// 4. Stop when either side closes
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    auth: AuthenticatedSession,
) -> Result<impl IntoResponse, GameError> {
    let session = auth.session;
    let feed = state.sessions.subscribe(&session).await?;

    tracing::info!(
        "WebSocket accepted: room={} slot={}",
        session.room_id(),
        session.slot()
    );

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, session, feed)))
}

/// Pump room snapshots to the socket until either side goes away
async fn handle_socket(socket: WebSocket, session: SessionHandle, mut feed: RoomFeed) {
    let (mut sender, mut receiver) = socket.split();

    let room_id = session.room_id().to_string();
    let mut send_task = tokio::spawn(async move {
        while let Some(next) = feed.next_view().await {
            let view = match next {
                Ok(view) => view,
                Err(err) => {
                    tracing::warn!("Skipping unreadable snapshot for room={}: {}", room_id, err);
                    continue;
                }
            };
            let text = state_update_message(&view).to_string();
            if sender.send(Message::Text(text)).await.is_err() {
                tracing::debug!("Client went away for room={}", room_id);
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    tracing::info!(
        "WebSocket connection closed: room={} slot={}",
        session.room_id(),
        session.slot()
    );
}
