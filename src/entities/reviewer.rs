// Reviewer - a user account. Owns Listings (as owner) and Reviews.
//
// The password is stored exactly as given; hashing belongs to an outer layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{new_identity, EntityKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reviewer {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub email: String,
    pub password: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Reviewer {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        let (id, now) = new_identity();

        Reviewer {
            id,
            created_at: now,
            updated_at: now,
            email: email.into(),
            password: password.into(),
            first_name: None,
            last_name: None,
            extra: Map::new(),
        }
    }
}

impl_entity!(Reviewer, EntityKind::Reviewer);
