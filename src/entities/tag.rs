// Tag - free-standing label linked many-to-many with Listings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{new_identity, EntityKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub name: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        let (id, now) = new_identity();

        Tag {
            id,
            created_at: now,
            updated_at: now,
            name: name.into(),
            extra: Map::new(),
        }
    }
}

impl_entity!(Tag, EntityKind::Tag);
