pub mod constants;
pub mod dice;
pub mod engine;
pub mod projector;
pub mod room;
pub mod session;
pub mod slot;

pub use constants::*;
pub use dice::{DiceRoller, RandomDice, ScriptedDice, SeededDice};
pub use engine::{ReadyOutcome, TurnEngine, TurnReport};
pub use projector::{project, ViewModel};
pub use room::{DiceValue, RoomDocument, TokenSet, TurnState};
pub use session::{room_path, RoomFeed, RoomSessionManager, RoomSnapshot, SessionHandle};
pub use slot::{PerSlot, Slot};
