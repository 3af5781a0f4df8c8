pub mod rules;
pub mod seating;

pub use rules::{apply_captures, check_winner, resolve_turn, select_token, Movement, TurnOutcome};
pub use seating::{assign_seat, generate_identity, normalize_room_id, SeatClaim};
