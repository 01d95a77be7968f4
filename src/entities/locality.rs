// Locality - belongs to a Region, owns Listings through `Listing::locality_id`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{new_identity, EntityKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Locality {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub name: String,

    /// Owning Region. Set from path context on create, immutable afterwards.
    pub region_id: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Locality {
    pub fn new(name: impl Into<String>, region_id: impl Into<String>) -> Self {
        let (id, now) = new_identity();

        Locality {
            id,
            created_at: now,
            updated_at: now,
            name: name.into(),
            region_id: region_id.into(),
            extra: Map::new(),
        }
    }
}

impl_entity!(Locality, EntityKind::Locality, parent = region_id);
