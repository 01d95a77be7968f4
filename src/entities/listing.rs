// Listing - a place offered in a Locality by an owning Reviewer
//
// `tag_ids` is the Listing side of the many-to-many Tag relation. It is a set
// (no duplicates) and only the association manager mutates it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{new_identity, EntityKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub name: String,

    /// Owning Reviewer, taken from the creation payload
    pub owner_id: String,

    /// Containing Locality, taken from path context
    pub locality_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub tag_ids: Vec<String>,

    /// Open-ended attributes (rooms, price, coordinates, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Listing {
    pub fn new(
        name: impl Into<String>,
        owner_id: impl Into<String>,
        locality_id: impl Into<String>,
    ) -> Self {
        let (id, now) = new_identity();

        Listing {
            id,
            created_at: now,
            updated_at: now,
            name: name.into(),
            owner_id: owner_id.into(),
            locality_id: locality_id.into(),
            description: None,
            tag_ids: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tag_ids.iter().any(|id| id == tag_id)
    }

    /// Add a tag id. Returns false when already present.
    pub fn add_tag(&mut self, tag_id: &str) -> bool {
        if self.has_tag(tag_id) {
            return false;
        }
        self.tag_ids.push(tag_id.to_string());
        true
    }

    /// Remove a tag id. Returns false when it was not present.
    pub fn remove_tag(&mut self, tag_id: &str) -> bool {
        let before = self.tag_ids.len();
        self.tag_ids.retain(|id| id != tag_id);
        self.tag_ids.len() != before
    }

    /// True when every id in `required` is linked to this listing
    pub fn has_all_tags<'a, I>(&self, required: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        required.into_iter().all(|tag_id| self.has_tag(tag_id))
    }
}

impl_entity!(Listing, EntityKind::Listing, parent = locality_id);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_tag_set_has_no_duplicates() {
        let mut listing = Listing::new("Loft", "owner-1", "locality-1");

        assert!(listing.add_tag("wifi"));
        assert!(!listing.add_tag("wifi"));
        assert_eq!(listing.tag_ids, vec!["wifi".to_string()]);
    }

    #[test]
    fn test_listing_remove_tag() {
        let mut listing = Listing::new("Loft", "owner-1", "locality-1");
        listing.add_tag("wifi");

        assert!(listing.remove_tag("wifi"));
        assert!(!listing.remove_tag("wifi"));
        assert!(listing.tag_ids.is_empty());
    }

    #[test]
    fn test_listing_has_all_tags() {
        let mut listing = Listing::new("Loft", "owner-1", "locality-1");
        listing.add_tag("wifi");
        listing.add_tag("pool");

        assert!(listing.has_all_tags(["wifi", "pool"]));
        assert!(listing.has_all_tags(["wifi"]));
        assert!(listing.has_all_tags(std::iter::empty()));
        assert!(!listing.has_all_tags(["wifi", "parking"]));
    }

    #[test]
    fn test_listing_extra_attributes_roundtrip_through_json() {
        let value = serde_json::json!({
            "id": "p1",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
            "name": "Cabin",
            "owner_id": "u1",
            "locality_id": "c1",
            "number_rooms": 3,
            "price_by_night": 120
        });

        let listing: Listing = serde_json::from_value(value).unwrap();
        assert!(listing.tag_ids.is_empty());
        assert_eq!(listing.extra.get("number_rooms"), Some(&serde_json::json!(3)));
        assert_eq!(listing.description, None);
    }
}
