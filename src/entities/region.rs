// Region - top of the hierarchy, owns Localities through `Locality::region_id`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{new_identity, EntityKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub name: String,

    /// Attributes outside the known schema
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Region {
    pub fn new(name: impl Into<String>) -> Self {
        let (id, now) = new_identity();

        Region {
            id,
            created_at: now,
            updated_at: now,
            name: name.into(),
            extra: Map::new(),
        }
    }
}

impl_entity!(Region, EntityKind::Region);
