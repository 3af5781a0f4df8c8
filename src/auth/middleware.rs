use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::{request::Parts, StatusCode},
};
use axum_extra::extract::cookie::CookieJar;

use super::token::{session_cookie_name, verify_session_token};
use crate::{core::SessionHandle, state::AppState};

/// Session of the caller, recovered from the room's cookie
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub session: SessionHandle,
    pub expiry: i64,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedSession {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(room_id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| (StatusCode::BAD_REQUEST, "Missing room id"))?;
        let room_id = room_id.trim();

        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to extract cookies",
                )
            })?;

        let token = jar
            .get(&session_cookie_name(room_id))
            .ok_or((StatusCode::UNAUTHORIZED, "Missing session token, join the room first"))?
            .value();

        let (session, expiry) = verify_session_token(Some(token), &state.secret_key).ok_or((
            StatusCode::UNAUTHORIZED,
            "Invalid or expired session token",
        ))?;

        let authenticated = AuthenticatedSession { session, expiry };
        authenticated.verify_room(room_id)?;
        Ok(authenticated)
    }
}

impl AuthenticatedSession {
    /// Verify that the token was issued for `room_id`
    ///
    /// # Returns
    ///
    /// Ok if match, Err with HTTP status and message otherwise
    pub fn verify_room(&self, room_id: &str) -> Result<(), (StatusCode, &'static str)> {
        if self.session.room_id() != room_id {
            return Err((
                StatusCode::FORBIDDEN,
                "Session token does not match room",
            ));
        }
        Ok(())
    }
}
