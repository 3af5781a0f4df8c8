use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use time::OffsetDateTime;

use crate::core::{SessionHandle, Slot};

type HmacSha256 = Hmac<Sha256>;

const TOKEN_EXPIRY_SECONDS: i64 = 86400; // 24 hours

/// Cookie carrying the session token for one room
///
/// The room id is base64-encoded because it is free text.
pub fn session_cookie_name(room_id: &str) -> String {
    format!("room_token_{}", URL_SAFE_NO_PAD.encode(room_id))
}

/// Generate a signed token for a joined session
///
/// # Arguments
///
/// * `session` - The session to encode
/// * `secret_key` - Secret key for signing
///
/// # Returns
///
/// Signed token string in format: `room:slot:identity:expiry.signature`,
/// with room and identity base64-encoded
///
/// # Errors
///
/// Returns an error if HMAC initialization fails
pub fn generate_session_token(session: &SessionHandle, secret_key: &str) -> Result<String, String> {
    let expiry = OffsetDateTime::now_utc().unix_timestamp() + TOKEN_EXPIRY_SECONDS;

    let payload = format!(
        "{}:{}:{}:{}",
        URL_SAFE_NO_PAD.encode(session.room_id()),
        session.slot().key(),
        URL_SAFE_NO_PAD.encode(session.identity()),
        expiry
    );

    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .map_err(|e| format!("HMAC initialization error: {}", e))?;
    mac.update(payload.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", payload, signature))
}

/// Verify a session token and rebuild the session it stands for
///
/// # Arguments
///
/// * `token` - The token to verify
/// * `secret_key` - Secret key used for signing
///
/// # Returns
///
/// The session and expiry timestamp if valid, None otherwise
///
/// Uses constant-time comparison to prevent timing attacks
pub fn verify_session_token(token: Option<&str>, secret_key: &str) -> Option<(SessionHandle, i64)> {
    let (payload, signature_b64) = token?.split_once('.')?;

    let provided_signature = URL_SAFE_NO_PAD.decode(signature_b64).ok()?;
    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes()).ok()?;
    mac.update(payload.as_bytes());
    mac.verify_slice(&provided_signature).ok()?;

    let parts: Vec<&str> = payload.split(':').collect();
    let [room_b64, slot_key, identity_b64, expiry_str] = parts.as_slice() else {
        return None;
    };

    let expiry: i64 = expiry_str.parse().ok()?;
    if OffsetDateTime::now_utc().unix_timestamp() > expiry {
        return None; // Token expired
    }

    let room_id = String::from_utf8(URL_SAFE_NO_PAD.decode(room_b64).ok()?).ok()?;
    let identity = String::from_utf8(URL_SAFE_NO_PAD.decode(identity_b64).ok()?).ok()?;
    let slot = Slot::from_key(slot_key)?;

    Some((SessionHandle::new(room_id, slot, identity), expiry))
}
