// Mutation Guard - applies partial updates while protecting immutable fields
//
// The same rules run for every entity type:
// - id / created_at / updated_at are never taken from a payload
// - per-type foreign keys (see `Descriptor::protected`) are never taken either
// - anything else is applied, unknown keys included (they land in `extra`)
// - protected keys are dropped silently, not reported
//
// `updated_at` is always bumped by the guard itself, once per call.

use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

use crate::entities::Entity;
use crate::error::{ResourceError, ResourceResult};
use crate::store::{ObjectStore, StoreExt};

/// Next `updated_at`: now, but always strictly after the previous stamp.
pub fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

/// Merge `changes` into `entity`, skipping protected fields.
///
/// Returns the merged entity and the keys that were dropped. Fails only when
/// a known field receives a value of the wrong type.
pub fn merge<E: Entity>(
    entity: &E,
    changes: &Map<String, Value>,
) -> ResourceResult<(E, Vec<String>)> {
    let descriptor = E::descriptor();

    let mut document = match serde_json::to_value(entity).map_err(anyhow::Error::from)? {
        Value::Object(map) => map,
        _ => {
            return Err(ResourceError::Store(anyhow::anyhow!(
                "{} did not serialize to an object",
                E::KIND
            )))
        }
    };

    let mut dropped = Vec::new();
    for (key, value) in changes {
        if descriptor.is_protected(key) {
            dropped.push(key.clone());
            continue;
        }
        document.insert(key.clone(), value.clone());
    }

    let stamp = next_timestamp(entity.updated_at());
    let stamp = serde_json::to_value(stamp).map_err(anyhow::Error::from)?;
    document.insert("updated_at".to_string(), stamp);

    let merged = serde_json::from_value(Value::Object(document))
        .map_err(|e| ResourceError::Validation(format!("Invalid {}: {}", E::KIND, e)))?;

    Ok((merged, dropped))
}

/// Applies merges and persists the result.
pub struct MutationGuard {
    store: Arc<dyn ObjectStore>,
}

impl MutationGuard {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        MutationGuard { store }
    }

    /// Merge and persist exactly once, however many fields changed.
    pub fn update<E: Entity>(&self, entity: &E, changes: &Map<String, Value>) -> ResourceResult<E> {
        let (merged, dropped) = merge(entity, changes)?;

        if !dropped.is_empty() {
            debug!(
                kind = %E::KIND,
                id = entity.id(),
                dropped = ?dropped,
                "Ignored protected fields in update"
            );
        }

        self.store.save(&merged)?;
        self.store.commit()?;

        Ok(merged)
    }
}
