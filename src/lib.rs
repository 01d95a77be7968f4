// Lodging Graph - Core Library
// Exposes all modules for use in CLI, API server, and tests
//
// Region -> Locality -> Listing, plus Reviewers, Tags (many-to-many with
// Listings) and Reviews, over a pluggable object store.

pub mod error;
pub mod entities;
pub mod store;
pub mod db;
pub mod guard;       // Mutation Guard - immutable-field protection
pub mod controller;  // Generic CRUD per entity type
pub mod navigator;   // Read-only relationship traversal
pub mod associations; // Listing <-> Tag links
pub mod search;      // Relational listing search
pub mod service;
pub mod config;
pub mod import;       // CSV import through the controllers

#[cfg(feature = "server")]
pub mod api;

#[cfg(test)]
mod lib_tests;

// Re-export commonly used types
pub use error::{ResourceError, ResourceResult};
pub use entities::{
    Descriptor, Entity, EntityKind, ForeignKey,
    Region, Locality, Listing, Reviewer, Tag, Review,
};
pub use store::{MemoryStore, ObjectStore, StoreExt};
pub use db::SqliteStore;
pub use guard::MutationGuard;
pub use controller::ResourceController;
pub use navigator::Navigator;
pub use associations::{AssociationManager, LinkStatus};
pub use search::{SearchCriteria, SearchEngine};
pub use service::Lodging;
pub use config::{AppConfig, ConfigError, LoggingConfig, StorageKind};
pub use import::ImportReport;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
