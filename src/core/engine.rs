use serde::Serialize;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, PoisonError};

use super::{
    dice::DiceRoller,
    room::{DiceValue, RoomDocument},
    session::SessionHandle,
    slot::Slot,
    CURRENT_PLAYER_FIELD, DICE_FIELD, GAME_STARTED_MESSAGE, MESSAGE_FIELD, READY_FIELD,
    STARTED_FIELD, STATE_FIELD,
};
use crate::{
    error::GameError,
    services::rules::{resolve_turn, Movement, TurnOutcome},
    store::{DocPath, SharedStore, StoreError, TransactionOutcome},
};

/// Result of pressing ready
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadyOutcome {
    /// Both players are ready and this call started the game
    Started,
    /// The game was already running
    AlreadyStarted,
    /// Waiting for the other player to press ready
    WaitingForOpponent,
}

/// What a committed turn did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnReport {
    pub slot: Slot,
    pub dice: u8,
    pub movement: Option<Movement>,
    pub captured: Vec<usize>,
    pub points_gained: u32,
    pub turn_passed: bool,
    pub next_player: Slot,
    pub winner: Option<Slot>,
    /// Store revision holding the turn
    pub revision: u64,
}

impl TurnReport {
    fn new(outcome: TurnOutcome, revision: u64) -> Self {
        Self {
            turn_passed: outcome.passes_turn(),
            slot: outcome.slot,
            dice: outcome.dice,
            movement: outcome.movement,
            captured: outcome.captured,
            points_gained: outcome.points_gained,
            next_player: outcome.next_player,
            winner: outcome.winner,
            revision,
        }
    }
}

/// Authoritative game rules applied against the shared room document
#[derive(Debug, Clone)]
pub struct TurnEngine {
    store: Arc<dyn SharedStore>,
    dice: Arc<dyn DiceRoller>,
}

impl TurnEngine {
    pub fn new(store: Arc<dyn SharedStore>, dice: Arc<dyn DiceRoller>) -> Self {
        Self { store, dice }
    }

    /// Mark the caller ready and start the game once both players are
    ///
    /// Both clients may see "both ready" at the same moment and both issue
    /// the start update. The values are identical, so the second write is a
    /// no-op in effect.
    ///
    /// # Errors
    ///
    /// `GameFinished` once a winner is recorded, store failures otherwise
    pub async fn mark_ready(&self, session: &SessionHandle) -> Result<ReadyOutcome, GameError> {
        let room_path = session.room_path();
        let slot = session.slot();

        if self.load(&room_path).await?.is_finished() {
            return Err(GameError::GameFinished);
        }

        self.store
            .write(&room_path.child(READY_FIELD).child(slot.key()), json!(true))
            .await?;

        let room = self.load(&room_path).await?;
        if room.state.started {
            return Ok(ReadyOutcome::AlreadyStarted);
        }
        if !room.both_ready() {
            tracing::info!(
                "Room {}: {} is ready, waiting for {}",
                session.room_id(),
                slot,
                slot.opponent()
            );
            return Ok(ReadyOutcome::WaitingForOpponent);
        }

        let state = room_path.child(STATE_FIELD);
        self.store
            .update(vec![
                (state.child(STARTED_FIELD), json!(true)),
                (state.child(CURRENT_PLAYER_FIELD), json!(Slot::P1.number())),
                (state.child(DICE_FIELD), json!(0)),
                (room_path.child(MESSAGE_FIELD), json!(GAME_STARTED_MESSAGE)),
            ])
            .await?;

        tracing::info!("🎲 Room {} started", session.room_id());
        Ok(ReadyOutcome::Started)
    }

    /// Roll the dice for the caller and commit the resulting turn
    ///
    /// The turn (token moves, captures, scores, dice, next turn owner and
    /// winner) is committed as one transaction on the room, so observers
    /// never see part of it. The turn checks run again inside the
    /// transaction, so two rolls racing from the same seat cannot both land.
    ///
    /// # Errors
    ///
    /// `NotYourTurn`, `GameNotStarted` and `GameFinished` are checked before
    /// anything is written
    pub async fn roll_and_move(&self, session: &SessionHandle) -> Result<TurnReport, GameError> {
        let room_path = session.room_path();
        let slot = session.slot();

        // Rejected rolls never consume a dice value
        let room = self.load(&room_path).await?;
        if let Err(err) = check_turn(&room, slot) {
            tracing::warn!("Room {}: roll by {} rejected ({})", session.room_id(), slot, err);
            return Err(err);
        }

        let dice = DiceValue::from_roll(self.dice.roll()).value();
        let verdict: Verdict = Arc::default();
        let recorded = verdict.clone();
        let transaction = self
            .store
            .transact(
                &room_path,
                Box::new(move |current: Option<&Value>| {
                    let (next, result) = play_turn(current, slot, dice);
                    record(&recorded, result);
                    next
                }),
            )
            .await?;

        let (revision, outcome) = match (transaction, take(&verdict)) {
            (_, Some(Err(err))) => {
                tracing::warn!("Room {}: roll by {} rejected ({})", session.room_id(), slot, err);
                return Err(err);
            }
            (TransactionOutcome::Committed { revision, .. }, Some(Ok(outcome))) => {
                (revision, outcome)
            }
            _ => {
                let err = StoreError::Unavailable("turn transaction was not applied".to_string());
                return Err(err.into());
            }
        };

        match &outcome.movement {
            Some(movement) => tracing::info!(
                "Room {}: {} rolled {} and moved token {} from {} to {} (captured {})",
                session.room_id(),
                slot,
                dice,
                movement.token_index,
                movement.from,
                movement.to,
                outcome.captured.len()
            ),
            None => tracing::info!(
                "Room {}: {} rolled {} with no movable token, turn retained",
                session.room_id(),
                slot,
                dice
            ),
        }
        if let Some(winner) = outcome.winner {
            tracing::info!("🏆 Room {}: {} wins", session.room_id(), winner.label());
        }

        Ok(TurnReport::new(outcome, revision))
    }

    async fn load(&self, room_path: &DocPath) -> Result<RoomDocument, GameError> {
        let value = self.store.read(room_path).await?;
        Ok(RoomDocument::from_value(value)?)
    }
}

/// Result of the last run of a turn transaction
type Verdict = Arc<Mutex<Option<Result<TurnOutcome, GameError>>>>;

fn record(verdict: &Verdict, result: Result<TurnOutcome, GameError>) {
    let mut slot = verdict.lock().unwrap_or_else(PoisonError::into_inner);
    *slot = Some(result);
}

fn take(verdict: &Verdict) -> Option<Result<TurnOutcome, GameError>> {
    verdict.lock().unwrap_or_else(PoisonError::into_inner).take()
}

/// Resolve a roll against the room as the store holds it right now
///
/// Returns the document to commit (None aborts) and what happened.
fn play_turn(
    current: Option<&Value>,
    slot: Slot,
    dice: u8,
) -> (Option<Value>, Result<TurnOutcome, GameError>) {
    let mut room = match RoomDocument::from_value(current.cloned()) {
        Ok(room) => room,
        Err(err) => return (None, Err(err.into())),
    };
    if let Err(err) = check_turn(&room, slot) {
        return (None, Err(err));
    }

    let outcome = resolve_turn(&room, slot, dice);
    outcome.apply(&mut room);
    match room.to_value() {
        Ok(next) => (Some(next), Ok(outcome)),
        Err(err) => (None, Err(err.into())),
    }
}

/// Preconditions for a roll, checked in order
fn check_turn(room: &RoomDocument, slot: Slot) -> Result<(), GameError> {
    if room.state.current_player != slot {
        return Err(GameError::NotYourTurn);
    }
    if !room.state.started {
        return Err(GameError::GameNotStarted);
    }
    if room.is_finished() {
        return Err(GameError::GameFinished);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dice::ScriptedDice;
    use crate::core::session::RoomSessionManager;
    use crate::store::MemoryStore;

    async fn seated(rolls: Vec<u8>) -> (Arc<MemoryStore>, TurnEngine, SessionHandle, SessionHandle) {
        let store = Arc::new(MemoryStore::new());
        let manager = RoomSessionManager::new(store.clone());
        let engine = TurnEngine::new(store.clone(), Arc::new(ScriptedDice::new(rolls)));
        let a = manager.join_room("table", "alice").await.unwrap();
        let b = manager.join_room("table", "bob").await.unwrap();
        (store, engine, a, b)
    }

    #[tokio::test]
    async fn test_ready_waits_for_opponent() {
        let (_, engine, a, _) = seated(vec![]).await;

        let outcome = engine.mark_ready(&a).await.unwrap();

        assert_eq!(outcome, ReadyOutcome::WaitingForOpponent);
        let room = engine.load(&a.room_path()).await.unwrap();
        assert!(room.ready.p1);
        assert!(!room.ready.p2);
        assert!(!room.state.started);
    }

    #[tokio::test]
    async fn test_second_ready_starts_game() {
        let (_, engine, a, b) = seated(vec![]).await;

        engine.mark_ready(&a).await.unwrap();
        let outcome = engine.mark_ready(&b).await.unwrap();

        assert_eq!(outcome, ReadyOutcome::Started);
        let room = engine.load(&a.room_path()).await.unwrap();
        assert!(room.state.started);
        assert_eq!(room.state.current_player, Slot::P1);
        assert_eq!(room.message.as_deref(), Some(GAME_STARTED_MESSAGE));

        assert_eq!(engine.mark_ready(&a).await.unwrap(), ReadyOutcome::AlreadyStarted);
    }

    #[tokio::test]
    async fn test_roll_before_start_is_rejected() {
        let (store, engine, a, _) = seated(vec![3]).await;
        let revision = store.revision().await;

        let result = engine.roll_and_move(&a).await;

        assert!(matches!(result, Err(GameError::GameNotStarted)));
        assert_eq!(store.revision().await, revision);
    }

    #[tokio::test]
    async fn test_roll_out_of_turn_is_rejected() {
        let (_, engine, a, b) = seated(vec![3]).await;
        engine.mark_ready(&a).await.unwrap();
        engine.mark_ready(&b).await.unwrap();

        let result = engine.roll_and_move(&b).await;

        assert!(matches!(result, Err(GameError::NotYourTurn)));
    }

    #[tokio::test]
    async fn test_roll_moves_and_passes_turn() {
        let (_, engine, a, b) = seated(vec![4]).await;
        engine.mark_ready(&a).await.unwrap();
        engine.mark_ready(&b).await.unwrap();

        let report = engine.roll_and_move(&a).await.unwrap();

        assert_eq!(report.dice, 4);
        assert!(report.turn_passed);
        assert_eq!(report.next_player, Slot::P2);

        let room = engine.load(&a.room_path()).await.unwrap();
        assert_eq!(room.tokens.p1.positions(), [4, 0, 0, 0]);
        assert_eq!(room.points.p1, 4);
        assert_eq!(room.state.current_player, Slot::P2);
        assert_eq!(room.state.dice.value(), 4);
    }

    #[tokio::test]
    async fn test_store_failure_during_roll_leaves_room_untouched() {
        let (store, engine, a, b) = seated(vec![4]).await;
        engine.mark_ready(&a).await.unwrap();
        engine.mark_ready(&b).await.unwrap();
        let before = engine.load(&a.room_path()).await.unwrap();

        store.set_available(false);
        let result = engine.roll_and_move(&a).await;
        store.set_available(true);

        assert!(matches!(result, Err(GameError::StoreUnavailable(_))));
        assert_eq!(engine.load(&a.room_path()).await.unwrap(), before);
    }

    #[test]
    fn test_play_turn_rechecks_live_room() {
        let mut room = RoomDocument::default();
        room.state.started = true;
        let live = room.to_value().unwrap();

        let (next, result) = play_turn(Some(&live), Slot::P1, 6);
        let next = RoomDocument::from_value(next).unwrap();
        assert_eq!(next.tokens.p1.positions(), [6, 0, 0, 0]);
        assert_eq!(next.state.current_player, Slot::P2);
        assert_eq!(result.unwrap().points_gained, 6);

        // The same seat rolling against the already committed turn
        let (next, result) = play_turn(Some(&next.to_value().unwrap()), Slot::P1, 2);
        assert!(next.is_none());
        assert!(matches!(result, Err(GameError::NotYourTurn)));
    }

    #[test]
    fn test_play_turn_rejects_corrupt_room() {
        let corrupt = json!({ "tokens": { "p1": [1, 2, 3] } });

        let (next, result) = play_turn(Some(&corrupt), Slot::P1, 3);

        assert!(next.is_none());
        assert!(matches!(result, Err(GameError::CorruptDocument(_))));
    }

    #[test]
    fn test_check_turn_order() {
        let mut room = RoomDocument::default();
        room.state.current_player = Slot::P2;

        assert!(matches!(check_turn(&room, Slot::P1), Err(GameError::NotYourTurn)));
        assert!(matches!(check_turn(&room, Slot::P2), Err(GameError::GameNotStarted)));

        room.state.started = true;
        assert!(check_turn(&room, Slot::P2).is_ok());

        room.winner = Some("Player 1".to_string());
        assert!(matches!(check_turn(&room, Slot::P2), Err(GameError::GameFinished)));
    }
}
