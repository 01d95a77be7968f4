// Resource Controller - one generic CRUD implementation for every entity type
//
// The per-type differences (required fields, protected fields, parent key,
// payload references) all come from the entity's `Descriptor`.

use serde_json::{Map, Value};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::info;

use crate::entities::{new_identity, Entity};
use crate::error::{ResourceError, ResourceResult};
use crate::guard::MutationGuard;
use crate::store::{ObjectStore, StoreExt};

/// A payload is usable only when it is a non-empty JSON object.
pub fn require_object(payload: Option<Value>) -> ResourceResult<Map<String, Value>> {
    match payload {
        Some(Value::Object(map)) if !map.is_empty() => Ok(map),
        _ => Err(ResourceError::not_json()),
    }
}

pub struct ResourceController<E: Entity> {
    store: Arc<dyn ObjectStore>,
    guard: MutationGuard,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> ResourceController<E> {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        ResourceController {
            guard: MutationGuard::new(store.clone()),
            store,
            _entity: PhantomData,
        }
    }

    /// Every entity of the type, in store scan order
    pub fn list(&self) -> ResourceResult<Vec<E>> {
        Ok(self.store.fetch_all::<E>()?)
    }

    /// Entities scoped to an existing parent (e.g. the Listings of a Locality)
    pub fn list_under(&self, parent_id: &str) -> ResourceResult<Vec<E>> {
        self.require_parent(parent_id)?;

        Ok(self
            .store
            .fetch_all::<E>()?
            .into_iter()
            .filter(|entity| entity.parent_id() == Some(parent_id))
            .collect())
    }

    pub fn get(&self, id: &str) -> ResourceResult<E> {
        self.store
            .fetch::<E>(id)?
            .ok_or_else(|| ResourceError::not_found(E::KIND, id))
    }

    /// Create from a payload, linking to `parent_id` for child types.
    ///
    /// Checks run in this order: parent exists, payload is a JSON object,
    /// each required field is present (and, for payload references, resolves).
    /// Nothing is written unless every check passes.
    pub fn create(&self, parent_id: Option<&str>, payload: Option<Value>) -> ResourceResult<E> {
        let descriptor = E::descriptor();

        if let Some(parent_id) = parent_id {
            self.require_parent(parent_id)?;
        }

        let mut document = require_object(payload)?;

        for field in descriptor.required {
            let value = document
                .get(*field)
                .ok_or_else(|| ResourceError::missing(field))?;

            if let Some(reference) = descriptor.reference(field) {
                let target_id = value
                    .as_str()
                    .ok_or_else(|| ResourceError::Validation(format!("Invalid {}", field)))?;
                if !self.store.contains(reference.target, target_id)? {
                    return Err(ResourceError::not_found(reference.target, target_id));
                }
            }
        }

        for relation in descriptor.relations {
            document.remove(*relation);
        }

        match (descriptor.parent, parent_id) {
            (Some(parent), Some(parent_id)) => {
                document.insert(parent.field.to_string(), Value::String(parent_id.to_string()));
            }
            (Some(parent), None) => return Err(ResourceError::missing(parent.field)),
            (None, _) => {}
        }

        let (id, now) = new_identity();
        let stamp = serde_json::to_value(now).map_err(anyhow::Error::from)?;
        document.insert("id".to_string(), Value::String(id));
        document.insert("created_at".to_string(), stamp.clone());
        document.insert("updated_at".to_string(), stamp);

        let entity: E = serde_json::from_value(Value::Object(document))
            .map_err(|e| ResourceError::Validation(format!("Invalid {}: {}", E::KIND, e)))?;

        self.store.save(&entity)?;
        self.store.commit()?;

        info!(kind = %E::KIND, id = entity.id(), "Created");
        Ok(entity)
    }

    pub fn update(&self, id: &str, payload: Option<Value>) -> ResourceResult<E> {
        let current = self.get(id)?;
        let changes = require_object(payload)?;

        self.guard.update(&current, &changes)
    }

    /// Remove the entity. Dependents are left in place.
    pub fn delete(&self, id: &str) -> ResourceResult<()> {
        if !self.store.remove::<E>(id)? {
            return Err(ResourceError::not_found(E::KIND, id));
        }
        self.store.commit()?;

        info!(kind = %E::KIND, id, "Deleted");
        Ok(())
    }

    fn require_parent(&self, parent_id: &str) -> ResourceResult<()> {
        let parent = E::descriptor().parent.ok_or_else(|| {
            ResourceError::Validation(format!("{} has no parent collection", E::KIND))
        })?;

        if self.store.contains(parent.target, parent_id)? {
            Ok(())
        } else {
            Err(ResourceError::not_found(parent.target, parent_id))
        }
    }
}
