// Error taxonomy shared by controllers, associations and search.
//
// There is deliberately no conflict/version kind: concurrent overwrites are
// last-write-wins.

use crate::entities::EntityKind;
use thiserror::Error;

/// Errors surfaced by every resource operation.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Absent or malformed payload, or a missing/invalid field.
    #[error("{0}")]
    Validation(String),

    /// Unknown identifier for the primary entity or a referenced one.
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// The backing object store failed.
    #[error("store failure: {0}")]
    Store(#[from] anyhow::Error),
}

impl ResourceError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        ResourceError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn missing(field: &str) -> Self {
        ResourceError::Validation(format!("Missing {}", field))
    }

    pub fn not_json() -> Self {
        ResourceError::Validation("Not a JSON".to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ResourceError::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ResourceError::Validation(_))
    }
}

pub type ResourceResult<T> = Result<T, ResourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message() {
        let err = ResourceError::missing("name");
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Missing name");
    }

    #[test]
    fn test_not_found_names_kind_and_id() {
        let err = ResourceError::not_found(EntityKind::Locality, "abc");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "locality not found: abc");
    }
}
