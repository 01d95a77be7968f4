// End-to-end behaviour across controllers, associations and search,
// against both store backends.

use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::{
    Listing, Lodging, MemoryStore, ObjectStore, SearchCriteria, SqliteStore, StoreExt,
};

fn names(listings: Vec<Listing>) -> BTreeSet<String> {
    listings.into_iter().map(|l| l.name).collect()
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Region R1 has Locality L1; L1 has P1 tagged {wifi} and P2 untagged.
fn run_scenario(store: Arc<dyn ObjectStore>) {
    let lodging = Lodging::new(store);

    let r1 = lodging.regions.create(None, Some(json!({"name": "R1"}))).unwrap();
    let l1 = lodging
        .localities
        .create(Some(&r1.id), Some(json!({"name": "L1"})))
        .unwrap();
    let owner = lodging
        .reviewers
        .create(None, Some(json!({"email": "host@example.com", "password": "pw"})))
        .unwrap();
    let p1 = lodging
        .listings
        .create(Some(&l1.id), Some(json!({"name": "P1", "owner_id": owner.id})))
        .unwrap();
    lodging
        .listings
        .create(Some(&l1.id), Some(json!({"name": "P2", "owner_id": owner.id})))
        .unwrap();
    let wifi = lodging.tags.create(None, Some(json!({"name": "wifi"}))).unwrap();
    lodging.associations.link(&p1.id, &wifi.id).unwrap();

    let by_region_and_tag = SearchCriteria::new()
        .with_regions([&r1.id])
        .with_tags([&wifi.id]);
    assert_eq!(
        names(lodging.search.search(Some(&by_region_and_tag)).unwrap()),
        set(&["P1"])
    );

    let by_region = SearchCriteria::new().with_regions([&r1.id]);
    assert_eq!(
        names(lodging.search.search(Some(&by_region)).unwrap()),
        set(&["P1", "P2"])
    );

    lodging.localities.delete(&l1.id).unwrap();

    assert_eq!(
        names(lodging.navigator.listings_of(&l1.id).unwrap()),
        set(&["P1", "P2"])
    );
    assert!(lodging.search.search(Some(&by_region)).unwrap().is_empty());

    // Listings survive their locality and still show up unfiltered
    assert_eq!(
        names(lodging.search.search(None).unwrap()),
        set(&["P1", "P2"])
    );
}

#[test]
fn test_scenario_memory_store() {
    run_scenario(Arc::new(MemoryStore::new()));
}

#[test]
fn test_scenario_sqlite_store() {
    run_scenario(Arc::new(SqliteStore::open_in_memory().unwrap()));
}

#[test]
fn test_review_with_unknown_owner_leaves_listing_reviews_unchanged() {
    let store = Arc::new(MemoryStore::new());
    let lodging = Lodging::new(store.clone());

    let region = lodging.regions.create(None, Some(json!({"name": "R"}))).unwrap();
    let locality = lodging
        .localities
        .create(Some(&region.id), Some(json!({"name": "L"})))
        .unwrap();
    let owner = lodging
        .reviewers
        .create(None, Some(json!({"email": "a@b.c", "password": "pw"})))
        .unwrap();
    let listing = lodging
        .listings
        .create(Some(&locality.id), Some(json!({"name": "P", "owner_id": owner.id})))
        .unwrap();
    lodging
        .reviews
        .create(Some(&listing.id), Some(json!({"owner_id": owner.id, "text": "ok"})))
        .unwrap();

    let writes = store.write_count();
    let err = lodging
        .reviews
        .create(Some(&listing.id), Some(json!({"owner_id": "ghost", "text": "bad"})))
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(store.write_count(), writes);
    assert_eq!(lodging.navigator.reviews_of(&listing.id).unwrap().len(), 1);
}

#[test]
fn test_update_keeps_identity_across_backends() {
    let sqlite: Arc<dyn ObjectStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
    let lodging = Lodging::new(sqlite.clone());

    let tag = lodging.tags.create(None, Some(json!({"name": "pool"}))).unwrap();
    let updated = lodging
        .tags
        .update(
            &tag.id,
            Some(json!({"id": "x", "created_at": "2001-01-01T00:00:00Z", "name": "Pool"})),
        )
        .unwrap();

    let stored: crate::Tag = sqlite.fetch(&tag.id).unwrap().unwrap();
    assert_eq!(stored, updated);
    assert_eq!(stored.created_at, tag.created_at);
    assert!(stored.updated_at > tag.updated_at);
}
