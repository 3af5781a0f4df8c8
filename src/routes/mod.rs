pub mod health;
pub mod rooms;
pub mod websocket;

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the application router with all routes and layers
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `allowed_origins` - Origins allowed to call the API with credentials
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    // Credentials rule out wildcard headers and methods
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health::health_check))
        // Rooms
        .route("/api/rooms/:room_id/join", post(rooms::join_room))
        .route("/api/rooms/:room_id/ready", post(rooms::mark_ready))
        .route("/api/rooms/:room_id/roll", post(rooms::roll_dice))
        .route("/api/rooms/:room_id/view", get(rooms::show_view))
        // Live snapshots
        .route("/ws/:room_id", get(websocket::websocket_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}
