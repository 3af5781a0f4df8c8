pub mod middleware;
pub mod token;

pub use middleware::AuthenticatedSession;
pub use token::{generate_session_token, session_cookie_name, verify_session_token};
