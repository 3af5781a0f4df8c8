//! Shared document store abstraction
//!
//! The room state lives in a key-path addressed JSON document that every
//! client reads from and writes to. Implementations must provide per-path
//! last-write-wins writes, multi-path updates applied as one revision, a
//! compare-and-set transaction, and ordered change notifications.

pub mod memory;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use tokio::sync::mpsc;

pub use memory::MemoryStore;

/// Errors reported by a store implementation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached or refused the operation
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// A multi-path update named a path and one of its ancestors
    #[error("multi-path update has overlapping paths {first} and {second}")]
    OverlappingPaths { first: DocPath, second: DocPath },
}

/// Address of a node inside the shared document
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocPath(Vec<String>);

impl DocPath {
    /// The document root
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a `/`-separated path literal, ignoring empty segments
    pub fn parse(path: &str) -> Self {
        Self(
            path.split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Extend the path by one segment, taken verbatim
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// Extend the path by every segment of a relative path literal
    pub fn join(&self, relative: &str) -> Self {
        let mut segments = self.0.clone();
        segments.extend(DocPath::parse(relative).0);
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// True if `self` equals `other` or is one of its ancestors
    pub fn is_prefix_of(&self, other: &DocPath) -> bool {
        self.0.len() <= other.0.len() && self.0.iter().zip(&other.0).all(|(a, b)| a == b)
    }

    /// True if a change at one path can affect the value read at the other
    pub fn overlaps(&self, other: &DocPath) -> bool {
        self.is_prefix_of(other) || other.is_prefix_of(self)
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0.join("/"))
    }
}

/// Value observed at a subscribed path after a given revision
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Store revision that produced this value
    pub revision: u64,
    /// The subscribed path
    pub path: DocPath,
    /// Current value, `None` if nothing is stored there
    pub value: Option<Value>,
}

/// Result of a compare-and-set transaction
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionOutcome {
    /// The update function produced a value and it was stored
    Committed { revision: u64, value: Option<Value> },
    /// The update function declined; the stored value was left untouched
    Aborted { current: Option<Value> },
}

impl TransactionOutcome {
    pub fn committed(&self) -> bool {
        matches!(self, TransactionOutcome::Committed { .. })
    }

    /// Value stored at the transaction path once the transaction finished
    pub fn value(&self) -> Option<&Value> {
        match self {
            TransactionOutcome::Committed { value, .. } => value.as_ref(),
            TransactionOutcome::Aborted { current } => current.as_ref(),
        }
    }
}

/// Update function for [`SharedStore::transact`]
///
/// Receives the current value and returns the value to store, or `None` to
/// abort. Backends with optimistic retries may call it more than once.
pub type TransactFn = Box<dyn FnMut(Option<&Value>) -> Option<Value> + Send>;

/// Ordered stream of snapshots for one subscribed path
#[derive(Debug)]
pub struct Subscription {
    path: DocPath,
    rx: mpsc::UnboundedReceiver<Snapshot>,
}

impl Subscription {
    pub fn new(path: DocPath, rx: mpsc::UnboundedReceiver<Snapshot>) -> Self {
        Self { path, rx }
    }

    pub fn path(&self) -> &DocPath {
        &self.path
    }

    /// Wait for the next snapshot; `None` once the store has gone away
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }

    /// Return an already delivered snapshot without waiting
    pub fn try_next(&mut self) -> Option<Snapshot> {
        self.rx.try_recv().ok()
    }
}

/// Remote shared document with atomic multi-path update and CAS primitives
#[async_trait]
pub trait SharedStore: Send + Sync + fmt::Debug {
    /// Read the value stored at `path`
    async fn read(&self, path: &DocPath) -> Result<Option<Value>, StoreError>;

    /// Replace the value at `path`; `null` deletes it
    async fn write(&self, path: &DocPath, value: Value) -> Result<u64, StoreError>;

    /// Apply every `(path, value)` pair as a single revision
    async fn update(&self, updates: Vec<(DocPath, Value)>) -> Result<u64, StoreError>;

    /// Atomically read-modify-write the value at `path`
    async fn transact(
        &self,
        path: &DocPath,
        apply: TransactFn,
    ) -> Result<TransactionOutcome, StoreError>;

    /// Subscribe to the value at `path`, starting with its current value
    async fn subscribe(&self, path: &DocPath) -> Result<Subscription, StoreError>;
}
