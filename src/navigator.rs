// Relationship Navigator - read-only traversal of the entity graph
//
// Every traversal is a full scan filtered by the child's foreign key. A
// parent that was deleted (or never existed) simply has no children here;
// dangling references are not errors.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::entities::{Listing, Locality, Review, Tag};
use crate::store::{ObjectStore, StoreExt};

pub struct Navigator {
    store: Arc<dyn ObjectStore>,
}

impl Navigator {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Navigator { store }
    }

    pub fn localities_of(&self, region_id: &str) -> anyhow::Result<Vec<Locality>> {
        Ok(self
            .store
            .fetch_all::<Locality>()?
            .into_iter()
            .filter(|locality| locality.region_id == region_id)
            .collect())
    }

    pub fn listings_of(&self, locality_id: &str) -> anyhow::Result<Vec<Listing>> {
        Ok(self
            .store
            .fetch_all::<Listing>()?
            .into_iter()
            .filter(|listing| listing.locality_id == locality_id)
            .collect())
    }

    /// Listings under any of `locality_ids`, in one scan
    pub fn listings_in(&self, locality_ids: &BTreeSet<String>) -> anyhow::Result<Vec<Listing>> {
        Ok(self
            .store
            .fetch_all::<Listing>()?
            .into_iter()
            .filter(|listing| locality_ids.contains(&listing.locality_id))
            .collect())
    }

    /// Linked Tags that still exist, in link order
    pub fn tags_of(&self, listing: &Listing) -> anyhow::Result<Vec<Tag>> {
        let mut tags = Vec::with_capacity(listing.tag_ids.len());
        for tag_id in &listing.tag_ids {
            if let Some(tag) = self.store.fetch::<Tag>(tag_id)? {
                tags.push(tag);
            }
        }
        Ok(tags)
    }

    pub fn reviews_of(&self, listing_id: &str) -> anyhow::Result<Vec<Review>> {
        Ok(self
            .store
            .fetch_all::<Review>()?
            .into_iter()
            .filter(|review| review.listing_id == listing_id)
            .collect())
    }

    pub fn listings_owned_by(&self, reviewer_id: &str) -> anyhow::Result<Vec<Listing>> {
        Ok(self
            .store
            .fetch_all::<Listing>()?
            .into_iter()
            .filter(|listing| listing.owner_id == reviewer_id)
            .collect())
    }

    pub fn reviews_by(&self, reviewer_id: &str) -> anyhow::Result<Vec<Review>> {
        Ok(self
            .store
            .fetch_all::<Review>()?
            .into_iter()
            .filter(|review| review.owner_id == reviewer_id)
            .collect())
    }
}
