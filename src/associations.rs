// Association Manager - mutates the Listing <-> Tag many-to-many relation
//
// The relation lives on the Listing (`tag_ids`) and is kept as a set:
// re-linking is a successful no-op that performs no store write.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::entities::{Entity, Listing, Tag};
use crate::error::{ResourceError, ResourceResult};
use crate::guard::next_timestamp;
use crate::navigator::Navigator;
use crate::store::{ObjectStore, StoreExt};

/// Outcome of a link request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    /// The tag was newly attached
    Created,
    /// The tag was already attached; nothing changed
    AlreadyLinked,
}

pub struct AssociationManager {
    store: Arc<dyn ObjectStore>,
    navigator: Navigator,
}

impl AssociationManager {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        AssociationManager {
            navigator: Navigator::new(store.clone()),
            store,
        }
    }

    /// Tags linked to an existing listing
    pub fn tags(&self, listing_id: &str) -> ResourceResult<Vec<Tag>> {
        let listing = self.listing(listing_id)?;
        Ok(self.navigator.tags_of(&listing)?)
    }

    pub fn link(&self, listing_id: &str, tag_id: &str) -> ResourceResult<(Tag, LinkStatus)> {
        let (mut listing, tag) = self.resolve(listing_id, tag_id)?;

        if !listing.add_tag(&tag.id) {
            debug!(listing = listing_id, tag = tag_id, "Tag already linked");
            return Ok((tag, LinkStatus::AlreadyLinked));
        }

        listing.updated_at = next_timestamp(listing.updated_at);
        self.store.save(&listing)?;
        self.store.commit()?;

        info!(listing = listing_id, tag = tag_id, "Linked tag");
        Ok((tag, LinkStatus::Created))
    }

    pub fn unlink(&self, listing_id: &str, tag_id: &str) -> ResourceResult<()> {
        let (mut listing, tag) = self.resolve(listing_id, tag_id)?;

        if !listing.remove_tag(&tag.id) {
            return Err(ResourceError::not_found(Tag::KIND, tag_id));
        }

        listing.updated_at = next_timestamp(listing.updated_at);
        self.store.save(&listing)?;
        self.store.commit()?;

        info!(listing = listing_id, tag = tag_id, "Unlinked tag");
        Ok(())
    }

    fn listing(&self, listing_id: &str) -> ResourceResult<Listing> {
        self.store
            .fetch::<Listing>(listing_id)?
            .ok_or_else(|| ResourceError::not_found(Listing::KIND, listing_id))
    }

    fn resolve(&self, listing_id: &str, tag_id: &str) -> ResourceResult<(Listing, Tag)> {
        let listing = self.listing(listing_id)?;
        let tag = self
            .store
            .fetch::<Tag>(tag_id)?
            .ok_or_else(|| ResourceError::not_found(Tag::KIND, tag_id))?;
        Ok((listing, tag))
    }
}
