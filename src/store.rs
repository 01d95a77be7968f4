// Object Store - the persistence contract the core consumes
//
// Stores hold JSON documents keyed by (kind, id). They do not stamp
// timestamps or validate anything: the core decides what gets written.
// Each store serialises its own access; callers never lock.

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::entities::{Entity, EntityKind};

// ============================================================================
// STORE CONTRACT
// ============================================================================

pub trait ObjectStore: Send + Sync {
    /// Full scan of one kind. No ordering contract.
    fn all(&self, kind: EntityKind) -> Result<Vec<Value>>;

    fn get(&self, kind: EntityKind, id: &str) -> Result<Option<Value>>;

    /// Create or overwrite
    fn put(&self, kind: EntityKind, id: &str, document: Value) -> Result<()>;

    /// Returns false when nothing was stored under the id
    fn delete(&self, kind: EntityKind, id: &str) -> Result<bool>;

    /// Flush pending writes. Idempotent.
    fn commit(&self) -> Result<()>;

    fn count(&self, kind: EntityKind) -> Result<usize> {
        Ok(self.all(kind)?.len())
    }
}

/// Typed access on top of the document contract.
pub trait StoreExt: ObjectStore {
    fn fetch_all<E: Entity>(&self) -> Result<Vec<E>> {
        self.all(E::KIND)?
            .into_iter()
            .map(|doc| {
                serde_json::from_value(doc)
                    .with_context(|| format!("corrupt {} document", E::KIND))
            })
            .collect()
    }

    fn fetch<E: Entity>(&self, id: &str) -> Result<Option<E>> {
        match self.get(E::KIND, id)? {
            Some(doc) => {
                let entity = serde_json::from_value(doc)
                    .with_context(|| format!("corrupt {} document: {}", E::KIND, id))?;
                Ok(Some(entity))
            }
            None => Ok(None),
        }
    }

    fn contains(&self, kind: EntityKind, id: &str) -> Result<bool> {
        Ok(self.get(kind, id)?.is_some())
    }

    fn save<E: Entity>(&self, entity: &E) -> Result<()> {
        let document = serde_json::to_value(entity)?;
        self.put(E::KIND, entity.id(), document)
    }

    fn remove<E: Entity>(&self, id: &str) -> Result<bool> {
        self.delete(E::KIND, id)
    }
}

impl<S: ObjectStore + ?Sized> StoreExt for S {}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// Process-local store. Scans come back in (kind, id) order.
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<BTreeMap<(EntityKind, String), Value>>,
    scans: AtomicUsize,
    writes: AtomicUsize,
    commits: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of full-kind scans (`all`) served
    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    /// Number of put/delete calls that reached the store
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("memory store lock poisoned")
}

impl ObjectStore for MemoryStore {
    fn all(&self, kind: EntityKind) -> Result<Vec<Value>> {
        let documents = self.documents.read().map_err(poisoned)?;
        self.scans.fetch_add(1, Ordering::SeqCst);
        Ok(documents
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .map(|(_, doc)| doc.clone())
            .collect())
    }

    fn get(&self, kind: EntityKind, id: &str) -> Result<Option<Value>> {
        let documents = self.documents.read().map_err(poisoned)?;
        Ok(documents.get(&(kind, id.to_string())).cloned())
    }

    fn put(&self, kind: EntityKind, id: &str, document: Value) -> Result<()> {
        let mut documents = self.documents.write().map_err(poisoned)?;
        documents.insert((kind, id.to_string()), document);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn delete(&self, kind: EntityKind, id: &str) -> Result<bool> {
        let mut documents = self.documents.write().map_err(poisoned)?;
        let removed = documents.remove(&(kind, id.to_string())).is_some();
        if removed {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(removed)
    }

    fn commit(&self) -> Result<()> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
