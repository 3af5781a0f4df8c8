// Board
pub const TRACK_CELLS: u8 = 64;
pub const FINISH_POSITION: u8 = TRACK_CELLS - 1;
pub const START_POSITION: u8 = 0;
pub const TOKENS_PER_PLAYER: usize = 4;

// Dice and scoring
pub const DICE_FACES: u8 = 6;
pub const CAPTURE_BONUS: u32 = 10;

// Document layout
pub const ROOMS_ROOT: &str = "rooms";
pub const INIT_MARKER: &str = "initCheck";
pub const PLAYERS_FIELD: &str = "players";
pub const STATE_FIELD: &str = "state";
pub const TOKENS_FIELD: &str = "tokens";
pub const POINTS_FIELD: &str = "points";
pub const READY_FIELD: &str = "ready";
pub const WINNER_FIELD: &str = "winner";
pub const MESSAGE_FIELD: &str = "message";
pub const CURRENT_PLAYER_FIELD: &str = "currentPlayer";
pub const DICE_FIELD: &str = "dice";
pub const STARTED_FIELD: &str = "started";

pub const GAME_STARTED_MESSAGE: &str = "Game started";
