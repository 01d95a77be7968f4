// Entity Models
//
// Six entity types sharing one shape:
// - Stable identity (UUID) assigned on create, NEVER changes
// - created_at / updated_at stamped by the core, never by payloads
// - Typed known fields + an `extra` map for open-ended attributes
//
// Each type is described by a static `Descriptor` so one generic controller
// can serve all of them.

/// Implements `Entity` for a struct with `id`, `created_at`, `updated_at`
/// fields and an optional parent-key field.
macro_rules! impl_entity {
    ($ty:ty, $kind:expr) => {
        impl $crate::entities::Entity for $ty {
            const KIND: $crate::entities::EntityKind = $kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
                self.created_at
            }

            fn updated_at(&self) -> chrono::DateTime<chrono::Utc> {
                self.updated_at
            }
        }
    };
    ($ty:ty, $kind:expr, parent = $parent:ident) => {
        impl $crate::entities::Entity for $ty {
            const KIND: $crate::entities::EntityKind = $kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
                self.created_at
            }

            fn updated_at(&self) -> chrono::DateTime<chrono::Utc> {
                self.updated_at
            }

            fn parent_id(&self) -> Option<&str> {
                Some(&self.$parent)
            }
        }
    };
}

pub mod region;
pub mod locality;
pub mod listing;
pub mod reviewer;
pub mod tag;
pub mod review;

pub use region::Region;
pub use locality::Locality;
pub use listing::Listing;
pub use reviewer::Reviewer;
pub use tag::Tag;
pub use review::Review;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ENTITY KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Region,
    Locality,
    Listing,
    Reviewer,
    Tag,
    Review,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Region,
        EntityKind::Locality,
        EntityKind::Listing,
        EntityKind::Reviewer,
        EntityKind::Tag,
        EntityKind::Review,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Region => "region",
            EntityKind::Locality => "locality",
            EntityKind::Listing => "listing",
            EntityKind::Reviewer => "reviewer",
            EntityKind::Tag => "tag",
            EntityKind::Review => "review",
        }
    }

    /// Collection name used in routes and stats ("regions", "localities", ...)
    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Region => "regions",
            EntityKind::Locality => "localities",
            EntityKind::Listing => "listings",
            EntityKind::Reviewer => "reviewers",
            EntityKind::Tag => "tags",
            EntityKind::Review => "reviews",
        }
    }

    pub fn descriptor(&self) -> &'static Descriptor {
        match self {
            EntityKind::Region => &REGION,
            EntityKind::Locality => &LOCALITY,
            EntityKind::Listing => &LISTING,
            EntityKind::Reviewer => &REVIEWER,
            EntityKind::Tag => &TAG,
            EntityKind::Review => &REVIEW,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        EntityKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == lower || kind.plural() == lower)
            .ok_or_else(|| format!("unknown entity kind: {}", s))
    }
}

// ============================================================================
// DESCRIPTORS
// ============================================================================

/// Fields every entity protects from update payloads.
pub const COMMON_PROTECTED: [&str; 3] = ["id", "created_at", "updated_at"];

/// A foreign key: the field holding the id, and the kind it points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub field: &'static str,
    pub target: EntityKind,
}

/// Per-type rules driving the generic controller and the mutation guard.
#[derive(Debug)]
pub struct Descriptor {
    pub kind: EntityKind,
    /// Checked in order on create
    pub required: &'static [&'static str],
    /// Dropped from update payloads, on top of `COMMON_PROTECTED`
    pub protected: &'static [&'static str],
    /// Parent linkage, supplied by path context and never by payload
    pub parent: Option<ForeignKey>,
    /// Foreign keys supplied by the payload that must resolve on create
    pub references: &'static [ForeignKey],
    /// Relation state managed elsewhere; ignored in create payloads
    pub relations: &'static [&'static str],
}

impl Descriptor {
    pub fn is_protected(&self, field: &str) -> bool {
        COMMON_PROTECTED.contains(&field) || self.protected.contains(&field)
    }

    pub fn reference(&self, field: &str) -> Option<&ForeignKey> {
        self.references.iter().find(|fk| fk.field == field)
    }
}

static REGION: Descriptor = Descriptor {
    kind: EntityKind::Region,
    required: &["name"],
    protected: &[],
    parent: None,
    references: &[],
    relations: &[],
};

// TODO: revisit whether region_id / owner_id / locality_id need to stay
// immutable or were only protected alongside id and timestamps.
static LOCALITY: Descriptor = Descriptor {
    kind: EntityKind::Locality,
    required: &["name"],
    protected: &["region_id"],
    parent: Some(ForeignKey {
        field: "region_id",
        target: EntityKind::Region,
    }),
    references: &[],
    relations: &[],
};

static LISTING: Descriptor = Descriptor {
    kind: EntityKind::Listing,
    required: &["owner_id", "name"],
    protected: &["owner_id", "locality_id", "tag_ids"],
    parent: Some(ForeignKey {
        field: "locality_id",
        target: EntityKind::Locality,
    }),
    references: &[ForeignKey {
        field: "owner_id",
        target: EntityKind::Reviewer,
    }],
    relations: &["tag_ids"],
};

static REVIEWER: Descriptor = Descriptor {
    kind: EntityKind::Reviewer,
    required: &["email", "password"],
    protected: &[],
    parent: None,
    references: &[],
    relations: &[],
};

static TAG: Descriptor = Descriptor {
    kind: EntityKind::Tag,
    required: &["name"],
    protected: &[],
    parent: None,
    references: &[],
    relations: &[],
};

static REVIEW: Descriptor = Descriptor {
    kind: EntityKind::Review,
    required: &["owner_id", "text"],
    protected: &["owner_id", "listing_id"],
    parent: Some(ForeignKey {
        field: "listing_id",
        target: EntityKind::Listing,
    }),
    references: &[ForeignKey {
        field: "owner_id",
        target: EntityKind::Reviewer,
    }],
    relations: &[],
};

// ============================================================================
// ENTITY TRAIT
// ============================================================================

/// Implemented by every stored entity type.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;

    fn updated_at(&self) -> DateTime<Utc>;

    /// Value of the parent key, for child types
    fn parent_id(&self) -> Option<&str> {
        None
    }

    fn descriptor() -> &'static Descriptor {
        Self::KIND.descriptor()
    }
}

/// Fresh identity and timestamp for a new entity
pub(crate) fn new_identity() -> (String, DateTime<Utc>) {
    (uuid::Uuid::new_v4().to_string(), Utc::now())
}
