//! In-memory fakes for storage traits (testing only)
//!
//! Provides `MemoryRemoteStore` and `MemoryLocalStore` that satisfy the trait
//! contracts without any external dependencies. The remote fake can be told
//! to fail, either once or until healed, with a chosen error kind.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::{RemoteError, RemoteErrorKind};
use crate::storage_traits::*;

// ---------------------------------------------------------------------------
// MemoryRemoteStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct FaultPlan {
    queued: VecDeque<RemoteErrorKind>,
    persistent: Option<RemoteErrorKind>,
}

impl FaultPlan {
    fn next(&mut self) -> Option<RemoteErrorKind> {
        self.queued.pop_front().or(self.persistent)
    }
}

/// In-memory document store backed by `collection -> (id -> document)`.
///
/// Collections are `BTreeMap`s, so listing is ordered by document id.
#[derive(Debug, Default)]
pub struct MemoryRemoteStore {
    collections: Mutex<HashMap<String, BTreeMap<String, Value>>>,
    faults: Mutex<FaultPlan>,
    calls: AtomicUsize,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next call with `kind`. Queued failures are consumed in order.
    pub fn fail_next(&self, kind: RemoteErrorKind) {
        self.faults.lock().unwrap().queued.push_back(kind);
    }

    /// Fail every call with `kind` until [`heal`](Self::heal) is called.
    pub fn fail_always(&self, kind: RemoteErrorKind) {
        self.faults.lock().unwrap().persistent = Some(kind);
    }

    /// Drop all queued and persistent failures.
    pub fn heal(&self) {
        let mut faults = self.faults.lock().unwrap();
        faults.queued.clear();
        faults.persistent = None;
    }

    /// Number of calls attempted, including failed ones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of documents currently stored in `collection`.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    fn enter(&self, op: &str, collection: &str) -> RemoteResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.faults.lock().unwrap().next() {
            Some(kind) => Err(RemoteError::new(
                kind,
                format!("injected {} failure on {} {}", kind, op, collection),
            )),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn list(&self, collection: &str) -> RemoteResult<Vec<Document>> {
        self.enter("list", collection)?;
        let collections = self.collections.lock().unwrap();
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> RemoteResult<()> {
        self.enter("set", collection)?;
        let mut collections = self.collections.lock().unwrap();
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data);
        Ok(())
    }

    async fn add(&self, collection: &str, data: Value) -> RemoteResult<String> {
        self.enter("add", collection)?;
        let id = uuid::Uuid::new_v4().simple().to_string();
        let mut collections = self.collections.lock().unwrap();
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), data);
        Ok(id)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> RemoteResult<()> {
        self.enter("update", collection)?;
        let mut collections = self.collections.lock().unwrap();
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| {
                RemoteError::not_found(format!("no document {}/{} to update", collection, id))
            })?;
        match doc {
            Value::Object(body) => body.extend(fields),
            other => *other = Value::Object(fields),
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> RemoteResult<()> {
        self.enter("delete", collection)?;
        let mut collections = self.collections.lock().unwrap();
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryLocalStore
// ---------------------------------------------------------------------------

/// In-memory key-value store backed by a `HashMap<key, value>`.
#[derive(Debug, Default)]
pub struct MemoryLocalStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryLocalStore {
    fn get(&self, key: &str) -> LocalResult<Option<String>> {
        Ok(self.slots.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> LocalResult<()> {
        self.slots
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> LocalResult<()> {
        self.slots.lock().unwrap().remove(key);
        Ok(())
    }
}
