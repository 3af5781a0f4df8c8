pub mod requests;
pub mod responses;

pub use requests::JoinRoomRequest;
pub use responses::{JoinResponse, ReadyResponse};
