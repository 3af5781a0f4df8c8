use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{mpsc, RwLock};

use super::{DocPath, SharedStore, Snapshot, StoreError, Subscription, TransactFn, TransactionOutcome};

/// In-process shared document store
///
/// All mutations happen under one write lock, so every write, multi-path
/// update and transaction is a single revision. Subscribers are notified
/// while the lock is still held, which keeps delivery in revision order.
#[derive(Debug)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    available: AtomicBool,
}

#[derive(Debug)]
struct Inner {
    root: Value,
    revision: u64,
    subscribers: Vec<Subscriber>,
}

#[derive(Debug)]
struct Subscriber {
    path: DocPath,
    tx: mpsc::UnboundedSender<Snapshot>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                root: Value::Object(Map::new()),
                revision: 0,
                subscribers: Vec::new(),
            }),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate the backend going away (or coming back)
    ///
    /// While unavailable every operation fails with [`StoreError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Latest committed revision
    pub async fn revision(&self) -> u64 {
        self.inner.read().await.revision
    }

    /// Number of live subscriptions
    pub async fn subscriber_count(&self) -> usize {
        let inner = self.inner.read().await;
        inner
            .subscribers
            .iter()
            .filter(|s| !s.tx.is_closed())
            .count()
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store is offline".to_string()))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    fn read(&self, path: &DocPath) -> Option<Value> {
        let mut node = &self.root;
        for segment in path.segments() {
            node = node.as_object()?.get(segment)?;
        }
        normalize(node.clone())
    }

    /// Apply a batch of writes as one revision and notify affected subscribers
    fn commit(&mut self, writes: Vec<(DocPath, Value)>) -> u64 {
        let changed: Vec<DocPath> = writes.iter().map(|(path, _)| path.clone()).collect();
        for (path, value) in writes {
            set_at(&mut self.root, &path, value);
        }
        self.revision += 1;

        tracing::debug!(
            "Committed revision {} ({} path(s), first {})",
            self.revision,
            changed.len(),
            changed.first().map(ToString::to_string).unwrap_or_default()
        );

        let revision = self.revision;
        let mut subscribers = std::mem::take(&mut self.subscribers);
        subscribers.retain(|sub| {
            if sub.tx.is_closed() {
                return false;
            }
            if !changed.iter().any(|path| path.overlaps(&sub.path)) {
                return true;
            }
            let snapshot = Snapshot {
                revision,
                path: sub.path.clone(),
                value: self.read(&sub.path),
            };
            sub.tx.send(snapshot).is_ok()
        });
        self.subscribers = subscribers;

        revision
    }
}

#[async_trait]
impl SharedStore for MemoryStore {
    async fn read(&self, path: &DocPath) -> Result<Option<Value>, StoreError> {
        self.ensure_available()?;
        Ok(self.inner.read().await.read(path))
    }

    async fn write(&self, path: &DocPath, value: Value) -> Result<u64, StoreError> {
        self.ensure_available()?;
        let mut inner = self.inner.write().await;
        Ok(inner.commit(vec![(path.clone(), value)]))
    }

    async fn update(&self, updates: Vec<(DocPath, Value)>) -> Result<u64, StoreError> {
        self.ensure_available()?;

        for (i, (first, _)) in updates.iter().enumerate() {
            if let Some((second, _)) = updates[i + 1..].iter().find(|(p, _)| p.overlaps(first)) {
                return Err(StoreError::OverlappingPaths {
                    first: first.clone(),
                    second: second.clone(),
                });
            }
        }

        let mut inner = self.inner.write().await;
        if updates.is_empty() {
            return Ok(inner.revision);
        }
        Ok(inner.commit(updates))
    }

    async fn transact(
        &self,
        path: &DocPath,
        mut apply: TransactFn,
    ) -> Result<TransactionOutcome, StoreError> {
        self.ensure_available()?;
        let mut inner = self.inner.write().await;

        let current = inner.read(path);
        match apply(current.as_ref()) {
            Some(next) => {
                let revision = inner.commit(vec![(path.clone(), next)]);
                Ok(TransactionOutcome::Committed {
                    revision,
                    value: inner.read(path),
                })
            }
            None => Ok(TransactionOutcome::Aborted { current }),
        }
    }

    async fn subscribe(&self, path: &DocPath) -> Result<Subscription, StoreError> {
        self.ensure_available()?;
        let mut inner = self.inner.write().await;

        let (tx, rx) = mpsc::unbounded_channel();
        let initial = Snapshot {
            revision: inner.revision,
            path: path.clone(),
            value: inner.read(path),
        };
        // The receiver is alive, so the initial send cannot fail
        let _ = tx.send(initial);
        inner.subscribers.push(Subscriber {
            path: path.clone(),
            tx,
        });

        Ok(Subscription::new(path.clone(), rx))
    }
}

/// Drop nulls and empty objects, the way a realtime database stores values
fn normalize(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(map) => {
            let cleaned: Map<String, Value> = map
                .into_iter()
                .filter_map(|(k, v)| normalize(v).map(|v| (k, v)))
                .collect();
            if cleaned.is_empty() {
                None
            } else {
                Some(Value::Object(cleaned))
            }
        }
        Value::Array(items) => Some(Value::Array(
            items
                .into_iter()
                .map(|v| normalize(v).unwrap_or(Value::Null))
                .collect(),
        )),
        other => Some(other),
    }
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced with an object"),
    }
}

fn set_at(root: &mut Value, path: &DocPath, value: Value) {
    let value = normalize(value);

    let Some((last, parents)) = path.segments().split_last() else {
        *root = value.unwrap_or_else(|| Value::Object(Map::new()));
        return;
    };

    match value {
        Some(value) => {
            let mut node = root;
            for segment in parents {
                node = ensure_object(node)
                    .entry(segment.clone())
                    .or_insert(Value::Null);
            }
            ensure_object(node).insert(last.clone(), value);
        }
        None => {
            let mut node = root;
            for segment in parents {
                match node.as_object_mut().and_then(|map| map.get_mut(segment)) {
                    Some(child) => node = child,
                    None => return,
                }
            }
            if let Some(map) = node.as_object_mut() {
                map.remove(last);
            }
        }
    }
}
