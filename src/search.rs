// Relational Search Engine - composite listing filter
//
// 1. Location: union of the listings under every resolvable region (through
//    its localities) and every resolvable locality. No location criteria at
//    all means no location restriction.
// 2. Tags: intersection. A listing must carry every resolvable tag.
// Results are keyed by listing id, so overlapping criteria never duplicate.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

use crate::entities::{EntityKind, Listing};
use crate::error::ResourceResult;
use crate::navigator::Navigator;
use crate::store::{ObjectStore, StoreExt};

/// Search request body; every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regions: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localities: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

fn ids(list: &Option<Vec<String>>) -> &[String] {
    list.as_deref().unwrap_or(&[])
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions = Some(regions.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_localities<I, S>(mut self, localities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.localities = Some(localities.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// True when no criterion carries any id
    pub fn is_empty(&self) -> bool {
        ids(&self.regions).is_empty()
            && ids(&self.localities).is_empty()
            && ids(&self.tags).is_empty()
    }

    fn has_location(&self) -> bool {
        !ids(&self.regions).is_empty() || !ids(&self.localities).is_empty()
    }
}

pub struct SearchEngine {
    store: Arc<dyn ObjectStore>,
    navigator: Navigator,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        SearchEngine {
            navigator: Navigator::new(store.clone()),
            store,
        }
    }

    /// Listings matching `criteria`, in id order. `None` or empty criteria
    /// return every listing.
    pub fn search(&self, criteria: Option<&SearchCriteria>) -> ResourceResult<Vec<Listing>> {
        let criteria = match criteria {
            Some(criteria) if !criteria.is_empty() => criteria,
            _ => return Ok(self.all_listings()?.into_values().collect()),
        };

        let candidates = if criteria.has_location() {
            self.by_location(criteria)?
        } else {
            self.all_listings()?
        };

        let required = self.resolve_tags(ids(&criteria.tags))?;
        let results: Vec<Listing> = candidates
            .into_values()
            .filter(|listing| listing.has_all_tags(required.iter().map(String::as_str)))
            .collect();

        debug!(
            regions = ids(&criteria.regions).len(),
            localities = ids(&criteria.localities).len(),
            tags = required.len(),
            matched = results.len(),
            "Listing search"
        );

        Ok(results)
    }

    fn all_listings(&self) -> anyhow::Result<BTreeMap<String, Listing>> {
        Ok(self
            .store
            .fetch_all::<Listing>()?
            .into_iter()
            .map(|listing| (listing.id.clone(), listing))
            .collect())
    }

    fn by_location(&self, criteria: &SearchCriteria) -> anyhow::Result<BTreeMap<String, Listing>> {
        let mut locality_ids = BTreeSet::new();

        for region_id in ids(&criteria.regions) {
            if !self.store.contains(EntityKind::Region, region_id)? {
                continue;
            }
            for locality in self.navigator.localities_of(region_id)? {
                locality_ids.insert(locality.id);
            }
        }

        for locality_id in ids(&criteria.localities) {
            if self.store.contains(EntityKind::Locality, locality_id)? {
                locality_ids.insert(locality_id.clone());
            }
        }

        if locality_ids.is_empty() {
            return Ok(BTreeMap::new());
        }

        Ok(self
            .navigator
            .listings_in(&locality_ids)?
            .into_iter()
            .map(|listing| (listing.id.clone(), listing))
            .collect())
    }

    /// Known tag ids among `tag_ids`; unknown ids are dropped
    fn resolve_tags(&self, tag_ids: &[String]) -> anyhow::Result<BTreeSet<String>> {
        let mut resolved = BTreeSet::new();
        for tag_id in tag_ids {
            if self.store.contains(EntityKind::Tag, tag_id)? {
                resolved.insert(tag_id.clone());
            }
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Locality, Region, Tag};
    use crate::store::MemoryStore;

    struct World {
        store: Arc<MemoryStore>,
        engine: SearchEngine,
        r1: Region,
        r2: Region,
        l1: Locality,
        l2: Locality,
        l3: Locality,
        wifi: Tag,
        pool: Tag,
    }

    // R1 -> {L1: [P1 {wifi, pool}, P2 {}], L2: [P3 {wifi}]}
    // R2 -> {L3: [P4 {pool}]}
    fn world() -> World {
        let store = Arc::new(MemoryStore::new());
        let engine = SearchEngine::new(store.clone());

        let r1 = Region::new("R1");
        let r2 = Region::new("R2");
        let l1 = Locality::new("L1", &r1.id);
        let l2 = Locality::new("L2", &r1.id);
        let l3 = Locality::new("L3", &r2.id);
        let wifi = Tag::new("wifi");
        let pool = Tag::new("pool");

        let mut p1 = Listing::new("P1", "u1", &l1.id);
        p1.add_tag(&wifi.id);
        p1.add_tag(&pool.id);
        let p2 = Listing::new("P2", "u1", &l1.id);
        let mut p3 = Listing::new("P3", "u1", &l2.id);
        p3.add_tag(&wifi.id);
        let mut p4 = Listing::new("P4", "u1", &l3.id);
        p4.add_tag(&pool.id);

        store.save(&r1).unwrap();
        store.save(&r2).unwrap();
        for locality in [&l1, &l2, &l3] {
            store.save(locality).unwrap();
        }
        store.save(&wifi).unwrap();
        store.save(&pool).unwrap();
        for listing in [&p1, &p2, &p3, &p4] {
            store.save(listing).unwrap();
        }

        World {
            store,
            engine,
            r1,
            r2,
            l1,
            l2,
            l3,
            wifi,
            pool,
        }
    }

    fn names(listings: Vec<Listing>) -> BTreeSet<String> {
        listings.into_iter().map(|l| l.name).collect()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_criteria_returns_everything() {
        let w = world();

        let all = set(&["P1", "P2", "P3", "P4"]);
        assert_eq!(names(w.engine.search(None).unwrap()), all);
        assert_eq!(names(w.engine.search(Some(&SearchCriteria::new())).unwrap()), all);

        let empty_lists = SearchCriteria::new()
            .with_regions(Vec::<String>::new())
            .with_localities(Vec::<String>::new())
            .with_tags(Vec::<String>::new());
        assert_eq!(names(w.engine.search(Some(&empty_lists)).unwrap()), all);
    }

    #[test]
    fn test_search_on_empty_store_is_empty() {
        let engine = SearchEngine::new(Arc::new(MemoryStore::new()));
        assert!(engine.search(None).unwrap().is_empty());
    }

    #[test]
    fn test_region_equals_union_of_its_localities() {
        let w = world();

        let by_region = names(
            w.engine
                .search(Some(&SearchCriteria::new().with_regions([&w.r1.id])))
                .unwrap(),
        );

        let mut union = BTreeSet::new();
        for locality in [&w.l1, &w.l2] {
            union.extend(names(
                w.engine
                    .search(Some(&SearchCriteria::new().with_localities([&locality.id])))
                    .unwrap(),
            ));
        }

        assert_eq!(by_region, union);
        assert_eq!(by_region, set(&["P1", "P2", "P3"]));
    }

    #[test]
    fn test_region_and_locality_criteria_are_unioned_without_duplicates() {
        let w = world();

        let criteria = SearchCriteria::new()
            .with_regions([&w.r2.id])
            .with_localities([&w.l1.id, &w.l3.id]);
        let results = w.engine.search(Some(&criteria)).unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(names(results), set(&["P1", "P2", "P4"]));
    }

    #[test]
    fn test_location_search_scans_listings_once() {
        let w = world();

        let criteria = SearchCriteria::new()
            .with_regions([&w.r1.id, &w.r2.id])
            .with_localities([&w.l1.id, &w.l2.id, &w.l3.id]);
        let before = w.store.scan_count();
        let results = w.engine.search(Some(&criteria)).unwrap();

        assert_eq!(results.len(), 4);
        // One locality scan per region, one listing scan in total
        assert_eq!(w.store.scan_count() - before, 3);
    }

    #[test]
    fn test_tags_require_every_tag() {
        let w = world();

        let wifi_only = names(
            w.engine
                .search(Some(&SearchCriteria::new().with_tags([&w.wifi.id])))
                .unwrap(),
        );
        let both = names(
            w.engine
                .search(Some(
                    &SearchCriteria::new().with_tags([&w.wifi.id, &w.pool.id]),
                ))
                .unwrap(),
        );

        assert_eq!(wifi_only, set(&["P1", "P3"]));
        assert_eq!(both, set(&["P1"]));
        assert!(both.is_subset(&wifi_only));
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let w = world();

        let unknown_tag = SearchCriteria::new().with_tags([w.pool.id.as_str(), "ghost"]);
        assert_eq!(
            names(w.engine.search(Some(&unknown_tag)).unwrap()),
            set(&["P1", "P4"])
        );

        // Only unknown location ids: the location filter still applies
        let unknown_region = SearchCriteria::new().with_regions(["ghost"]);
        assert!(w.engine.search(Some(&unknown_region)).unwrap().is_empty());
    }

    #[test]
    fn test_region_with_tags_scenario() {
        let w = world();

        let criteria = SearchCriteria::new()
            .with_regions([&w.r1.id])
            .with_tags([&w.wifi.id]);
        assert_eq!(
            names(w.engine.search(Some(&criteria)).unwrap()),
            set(&["P1", "P3"])
        );
    }

    #[test]
    fn test_deleted_locality_drops_out_of_region_search() {
        let w = world();
        let nav = Navigator::new(w.store.clone());

        w.store.remove::<Locality>(&w.l1.id).unwrap();

        // Children are not cascaded
        assert_eq!(
            names(nav.listings_of(&w.l1.id).unwrap()),
            set(&["P1", "P2"])
        );
        // But the region no longer reaches them
        assert_eq!(
            names(
                w.engine
                    .search(Some(&SearchCriteria::new().with_regions([&w.r1.id])))
                    .unwrap()
            ),
            set(&["P3"])
        );
        // And a locality criterion for the deleted id resolves to nothing
        assert!(w
            .engine
            .search(Some(&SearchCriteria::new().with_localities([&w.l1.id])))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_criteria_deserialize_with_missing_keys() {
        let criteria: SearchCriteria =
            serde_json::from_value(serde_json::json!({"tags": ["t1"]})).unwrap();

        assert_eq!(criteria.regions, None);
        assert_eq!(criteria.tags, Some(vec!["t1".to_string()]));
        assert!(!criteria.is_empty());
    }
}
