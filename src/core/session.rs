use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::{
    projector::{project, ViewModel},
    room::{seat_of, RoomDocument},
    slot::{PerSlot, Slot},
    INIT_MARKER, PLAYERS_FIELD, ROOMS_ROOT,
};
use crate::{
    error::GameError,
    services::seating::{assign_seat, normalize_room_id, SeatClaim},
    store::{DocPath, SharedStore, Subscription},
};

/// Path of a room document in the store
pub fn room_path(room_id: &str) -> DocPath {
    DocPath::parse(ROOMS_ROOT).child(room_id)
}

/// Identity of one participant in one room
///
/// Handed out by [`RoomSessionManager::join_room`] and required by every
/// turn engine call. It never changes once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHandle {
    room_id: String,
    slot: Slot,
    identity: String,
}

impl SessionHandle {
    pub fn new(room_id: impl Into<String>, slot: Slot, identity: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            slot,
            identity: identity.into(),
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn room_path(&self) -> DocPath {
        room_path(&self.room_id)
    }
}

/// A room document together with the store revision it was read at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub revision: u64,
    pub room: RoomDocument,
}

/// Live feed of room snapshots for one viewer
#[derive(Debug)]
pub struct RoomFeed {
    subscription: Subscription,
    slot: Slot,
}

impl RoomFeed {
    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// Wait for the next revision of the room
    ///
    /// Snapshots where the room does not exist yet are skipped. Returns
    /// `None` once the store has shut down.
    pub async fn next_snapshot(&mut self) -> Option<Result<RoomSnapshot, GameError>> {
        loop {
            let snapshot = self.subscription.next().await?;
            if snapshot.value.is_none() {
                continue;
            }
            let revision = snapshot.revision;
            return Some(
                RoomDocument::from_value(snapshot.value)
                    .map(|room| RoomSnapshot { revision, room })
                    .map_err(GameError::from),
            );
        }
    }

    /// Wait for the next revision and project it for this viewer
    pub async fn next_view(&mut self) -> Option<Result<ViewModel, GameError>> {
        let slot = self.slot;
        self.next_snapshot()
            .await
            .map(|result| result.map(|snapshot| project(&snapshot.room, slot)))
    }
}

/// Resolves room ids to sessions and sets up room documents
#[derive(Debug, Clone)]
pub struct RoomSessionManager {
    store: Arc<dyn SharedStore>,
}

impl RoomSessionManager {
    pub fn new(store: Arc<dyn SharedStore>) -> Self {
        Self { store }
    }

    /// Join a room, claiming a slot for `identity`
    ///
    /// # Arguments
    ///
    /// * `room_id` - Human-supplied room id, trimmed before use
    /// * `identity` - The caller's identity
    ///
    /// # Returns
    ///
    /// A session bound to the room and the caller's slot
    ///
    /// # Errors
    ///
    /// `RoomFull` when both slots belong to someone else, validation errors
    /// for empty input, and store failures
    pub async fn join_room(&self, room_id: &str, identity: &str) -> Result<SessionHandle, GameError> {
        let room_id = normalize_room_id(room_id)?;
        let identity = identity.trim();
        if identity.is_empty() {
            return Err(GameError::InvalidIdentity);
        }

        let room = room_path(&room_id);
        let claim = match self.claim_seat(&room, identity).await {
            Ok(claim) => claim,
            Err(err) => {
                tracing::warn!("Join rejected: room={} identity={} ({})", room_id, identity, err);
                return Err(err);
            }
        };
        let initialized = self.initialize_room(&room).await?;

        match claim {
            SeatClaim::Claim(slot) => tracing::info!(
                "Player {} joined room {} as {} (initialized: {})",
                identity,
                room_id,
                slot,
                initialized
            ),
            SeatClaim::Reattach(slot) => {
                tracing::info!("Player {} reattached to room {} as {}", identity, room_id, slot)
            }
        }

        Ok(SessionHandle::new(room_id, claim.slot(), identity))
    }

    /// Subscribe a session to its room
    ///
    /// The first item is the room as it is right now; after that one item
    /// arrives per store revision touching the room, in revision order.
    pub async fn subscribe(&self, session: &SessionHandle) -> Result<RoomFeed, GameError> {
        let subscription = self.store.subscribe(&session.room_path()).await?;
        Ok(RoomFeed {
            subscription,
            slot: session.slot(),
        })
    }

    /// Read the current room document
    pub async fn load(&self, room_id: &str) -> Result<RoomDocument, GameError> {
        let value = self.store.read(&room_path(room_id)).await?;
        Ok(RoomDocument::from_value(value)?)
    }

    /// Claim a slot inside a transaction on the players map
    async fn claim_seat(&self, room: &DocPath, identity: &str) -> Result<SeatClaim, GameError> {
        let caller = identity.to_string();
        let outcome = self
            .store
            .transact(
                &room.child(PLAYERS_FIELD),
                Box::new(move |current: Option<&Value>| {
                    let mut players = parse_players(current).ok()?;
                    match assign_seat(&players, &caller).ok()? {
                        SeatClaim::Claim(slot) => {
                            *players.get_mut(slot) = Some(caller.clone());
                            serde_json::to_value(&players).ok()
                        }
                        SeatClaim::Reattach(_) => None,
                    }
                }),
            )
            .await?;

        let players = parse_players(outcome.value())?;
        match seat_of(&players, identity) {
            Some(slot) if outcome.committed() => Ok(SeatClaim::Claim(slot)),
            Some(slot) => Ok(SeatClaim::Reattach(slot)),
            None => Err(GameError::RoomFull),
        }
    }

    /// Write the default room document unless the room was already set up
    ///
    /// Returns true if this call did the initialization.
    async fn initialize_room(&self, room: &DocPath) -> Result<bool, GameError> {
        let outcome = self
            .store
            .transact(
                room,
                Box::new(|current: Option<&Value>| {
                    let already = current
                        .and_then(|v| v.get(INIT_MARKER))
                        .and_then(Value::as_bool)
                        .unwrap_or(false);
                    if already {
                        return None;
                    }
                    let players = parse_players(current.and_then(|v| v.get(PLAYERS_FIELD))).ok()?;
                    RoomDocument::initialized(players).to_value().ok()
                }),
            )
            .await?;

        Ok(outcome.committed())
    }
}

fn parse_players(value: Option<&Value>) -> Result<PerSlot<Option<String>>, serde_json::Error> {
    match value {
        Some(value) => PerSlot::deserialize(value),
        None => Ok(PerSlot::default()),
    }
}
