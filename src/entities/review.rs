// Review - text written by a Reviewer about a Listing

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{new_identity, EntityKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub text: String,

    /// Author; must reference an existing Reviewer at creation time
    pub owner_id: String,

    /// Reviewed Listing, from path context
    pub listing_id: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Review {
    pub fn new(
        text: impl Into<String>,
        owner_id: impl Into<String>,
        listing_id: impl Into<String>,
    ) -> Self {
        let (id, now) = new_identity();

        Review {
            id,
            created_at: now,
            updated_at: now,
            text: text.into(),
            owner_id: owner_id.into(),
            listing_id: listing_id.into(),
            extra: Map::new(),
        }
    }
}

impl_entity!(Review, EntityKind::Review, parent = listing_id);
