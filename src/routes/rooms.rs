use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{
    auth::{generate_session_token, session_cookie_name, AuthenticatedSession},
    core::{project, TurnReport, ViewModel},
    error::GameError,
    models::{JoinResponse, JoinRoomRequest, ReadyResponse},
    state::AppState,
};

/// Join a room, claiming a slot for the caller
///
/// # Arguments
///
/// * `room_id` - The room id from path
/// * `state` - Shared application state
/// * `jar` - Cookie jar for setting the session cookie
/// * `form` - Form data with an optional identity
///
/// # Returns
///
/// JSON with the assigned slot and session token, plus the session cookie
pub async fn join_room(
    Path(room_id): Path<String>,
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<JoinRoomRequest>,
) -> Result<impl IntoResponse, Response> {
    let identity = form
        .resolve_identity()
        .map_err(|e| (StatusCode::BAD_REQUEST, e).into_response())?;

    let session = state
        .sessions
        .join_room(&room_id, &identity)
        .await
        .map_err(IntoResponse::into_response)?;

    let token = generate_session_token(&session, &state.secret_key)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e).into_response())?;

    // One cookie per room so a browser can sit in several rooms
    let cookie = Cookie::build((session_cookie_name(session.room_id()), token.clone()))
        .path("/")
        .http_only(true)
        .secure(state.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(24))
        .build();

    Ok((jar.add(cookie), Json(JoinResponse::new(&session, token))))
}

/// Mark the caller ready; starts the game once both players are
pub async fn mark_ready(
    State(state): State<AppState>,
    auth: AuthenticatedSession,
) -> Result<Json<ReadyResponse>, GameError> {
    let outcome = state.engine.mark_ready(&auth.session).await?;
    Ok(Json(ReadyResponse::from(outcome)))
}

/// Roll the dice and play the caller's turn
pub async fn roll_dice(
    State(state): State<AppState>,
    auth: AuthenticatedSession,
) -> Result<Json<TurnReport>, GameError> {
    let report = state.engine.roll_and_move(&auth.session).await?;
    Ok(Json(report))
}

/// Current room as seen by the caller
pub async fn show_view(
    State(state): State<AppState>,
    auth: AuthenticatedSession,
) -> Result<Json<ViewModel>, GameError> {
    let room = state.sessions.load(auth.session.room_id()).await?;
    Ok(Json(project(&room, auth.session.slot())))
}
