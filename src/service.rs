// Lodging service - one store handle shared by every component
//
// Transports (HTTP, CLI) hold a `Lodging` and call straight into its parts.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::associations::AssociationManager;
use crate::controller::ResourceController;
use crate::entities::{EntityKind, Listing, Locality, Region, Review, Reviewer, Tag};
use crate::error::ResourceResult;
use crate::navigator::Navigator;
use crate::search::SearchEngine;
use crate::store::ObjectStore;

pub struct Lodging {
    store: Arc<dyn ObjectStore>,
    pub regions: ResourceController<Region>,
    pub localities: ResourceController<Locality>,
    pub listings: ResourceController<Listing>,
    pub reviewers: ResourceController<Reviewer>,
    pub tags: ResourceController<Tag>,
    pub reviews: ResourceController<Review>,
    pub associations: AssociationManager,
    pub navigator: Navigator,
    pub search: SearchEngine,
}

impl Lodging {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Lodging {
            regions: ResourceController::new(store.clone()),
            localities: ResourceController::new(store.clone()),
            listings: ResourceController::new(store.clone()),
            reviewers: ResourceController::new(store.clone()),
            tags: ResourceController::new(store.clone()),
            reviews: ResourceController::new(store.clone()),
            associations: AssociationManager::new(store.clone()),
            navigator: Navigator::new(store.clone()),
            search: SearchEngine::new(store.clone()),
            store,
        }
    }

    /// Entity count per collection ("regions" => 3, ...)
    pub fn stats(&self) -> ResourceResult<BTreeMap<&'static str, usize>> {
        let mut stats = BTreeMap::new();
        for kind in EntityKind::ALL {
            stats.insert(kind.plural(), self.store.count(kind)?);
        }
        Ok(stats)
    }
}
