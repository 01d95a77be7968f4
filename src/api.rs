// REST API - axum router over the lodging service
//
// Routes live under /api/v1. Bodies are read as raw bytes and parsed here so
// that a missing or non-JSON body becomes a 400 "Not a JSON" instead of an
// extractor rejection.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::associations::LinkStatus;
use crate::controller::ResourceController;
use crate::entities::{Entity, Listing, Locality, Region, Review, Reviewer, Tag};
use crate::error::ResourceError;
use crate::search::SearchCriteria;
use crate::service::Lodging;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub lodging: Arc<Lodging>,
}

type ApiResult<T> = Result<T, ResourceError>;

impl IntoResponse for ResourceError {
    fn into_response(self) -> Response {
        match self {
            ResourceError::Validation(reason) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": reason }))).into_response()
            }
            ResourceError::NotFound { .. } => not_found().into_response(),
            ResourceError::Store(e) => {
                warn!(error = %e, "Store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal error" })),
                )
                    .into_response()
            }
        }
    }
}

fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

/// `None` for an empty or unparseable body
fn payload(body: &Bytes) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice(body).ok()
}

/// Maps an entity type to its controller on the service
trait Collection: Entity {
    fn controller(lodging: &Lodging) -> &ResourceController<Self>;
}

macro_rules! collection {
    ($ty:ty, $field:ident) => {
        impl Collection for $ty {
            fn controller(lodging: &Lodging) -> &ResourceController<Self> {
                &lodging.$field
            }
        }
    };
}

collection!(Region, regions);
collection!(Locality, localities);
collection!(Listing, listings);
collection!(Reviewer, reviewers);
collection!(Tag, tags);
collection!(Review, reviews);

// ============================================================================
// Generic resource handlers
// ============================================================================

async fn list_all<E: Collection>(State(state): State<AppState>) -> ApiResult<Json<Vec<E>>> {
    Ok(Json(E::controller(&state.lodging).list()?))
}

async fn list_children<E: Collection>(
    State(state): State<AppState>,
    Path(parent_id): Path<String>,
) -> ApiResult<Json<Vec<E>>> {
    Ok(Json(E::controller(&state.lodging).list_under(&parent_id)?))
}

async fn get_one<E: Collection>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<E>> {
    Ok(Json(E::controller(&state.lodging).get(&id)?))
}

async fn create_top<E: Collection>(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<E>)> {
    let entity = E::controller(&state.lodging).create(None, payload(&body))?;
    Ok((StatusCode::CREATED, Json(entity)))
}

async fn create_child<E: Collection>(
    State(state): State<AppState>,
    Path(parent_id): Path<String>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<E>)> {
    let entity = E::controller(&state.lodging).create(Some(&parent_id), payload(&body))?;
    Ok((StatusCode::CREATED, Json(entity)))
}

async fn update_one<E: Collection>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<E>> {
    Ok(Json(E::controller(&state.lodging).update(&id, payload(&body))?))
}

async fn delete_one<E: Collection>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    E::controller(&state.lodging).delete(&id)?;
    Ok(Json(json!({})))
}

// ============================================================================
// Relation, search and status handlers
// ============================================================================

/// GET /listings/:id/tags
async fn listing_tags(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Tag>>> {
    Ok(Json(state.lodging.associations.tags(&id)?))
}

/// POST /listings/:id/tags/:tag_id - 201 when linked, 200 when already linked
async fn link_tag(
    State(state): State<AppState>,
    Path((id, tag_id)): Path<(String, String)>,
) -> ApiResult<(StatusCode, Json<Tag>)> {
    let (tag, status) = state.lodging.associations.link(&id, &tag_id)?;
    let code = match status {
        LinkStatus::Created => StatusCode::CREATED,
        LinkStatus::AlreadyLinked => StatusCode::OK,
    };
    Ok((code, Json(tag)))
}

/// DELETE /listings/:id/tags/:tag_id
async fn unlink_tag(
    State(state): State<AppState>,
    Path((id, tag_id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    state.lodging.associations.unlink(&id, &tag_id)?;
    Ok(Json(json!({})))
}

/// GET /reviewers/:id/listings
async fn reviewer_listings(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Listing>>> {
    state.lodging.reviewers.get(&id)?;
    Ok(Json(state.lodging.navigator.listings_owned_by(&id)?))
}

/// GET /reviewers/:id/reviews
async fn reviewer_reviews(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Review>>> {
    state.lodging.reviewers.get(&id)?;
    Ok(Json(state.lodging.navigator.reviews_by(&id)?))
}

/// POST /listings_search
async fn search_listings(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<Vec<Listing>>> {
    let criteria = if body.is_empty() {
        None
    } else {
        let value: Value = serde_json::from_slice(&body).map_err(|_| ResourceError::not_json())?;
        match value {
            Value::Null => None,
            Value::Array(ref items) if items.is_empty() => None,
            object @ Value::Object(_) => Some(
                serde_json::from_value::<SearchCriteria>(object).map_err(|e| {
                    ResourceError::Validation(format!("Invalid search criteria: {}", e))
                })?,
            ),
            _ => {
                return Err(ResourceError::Validation(
                    "Invalid search criteria: expected an object".to_string(),
                ))
            }
        }
    };

    Ok(Json(state.lodging.search.search(criteria.as_ref())?))
}

/// GET /status
async fn status() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}

/// GET /stats
async fn stats(State(state): State<AppState>) -> ApiResult<Json<BTreeMap<&'static str, usize>>> {
    Ok(Json(state.lodging.stats()?))
}

async fn fallback() -> impl IntoResponse {
    not_found()
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(lodging: Arc<Lodging>) -> Router {
    let state = AppState { lodging };

    let api_routes = Router::new()
        .route("/status", get(status))
        .route("/stats", get(stats))
        // Regions
        .route("/regions", get(list_all::<Region>).post(create_top::<Region>))
        .route(
            "/regions/:id",
            get(get_one::<Region>)
                .put(update_one::<Region>)
                .delete(delete_one::<Region>),
        )
        // Localities
        .route(
            "/regions/:id/localities",
            get(list_children::<Locality>).post(create_child::<Locality>),
        )
        .route(
            "/localities/:id",
            get(get_one::<Locality>)
                .put(update_one::<Locality>)
                .delete(delete_one::<Locality>),
        )
        // Listings
        .route(
            "/localities/:id/listings",
            get(list_children::<Listing>).post(create_child::<Listing>),
        )
        .route(
            "/listings/:id",
            get(get_one::<Listing>)
                .put(update_one::<Listing>)
                .delete(delete_one::<Listing>),
        )
        .route("/listings_search", post(search_listings))
        // Reviewers
        .route(
            "/reviewers",
            get(list_all::<Reviewer>).post(create_top::<Reviewer>),
        )
        .route(
            "/reviewers/:id",
            get(get_one::<Reviewer>)
                .put(update_one::<Reviewer>)
                .delete(delete_one::<Reviewer>),
        )
        .route("/reviewers/:id/listings", get(reviewer_listings))
        .route("/reviewers/:id/reviews", get(reviewer_reviews))
        // Tags
        .route("/tags", get(list_all::<Tag>).post(create_top::<Tag>))
        .route(
            "/tags/:id",
            get(get_one::<Tag>)
                .put(update_one::<Tag>)
                .delete(delete_one::<Tag>),
        )
        // Listing <-> Tag
        .route("/listings/:id/tags", get(listing_tags))
        .route(
            "/listings/:id/tags/:tag_id",
            post(link_tag).delete(unlink_tag),
        )
        // Reviews
        .route(
            "/listings/:id/reviews",
            get(list_children::<Review>).post(create_child::<Review>),
        )
        .route(
            "/reviews/:id",
            get(get_one::<Review>)
                .put(update_one::<Review>)
                .delete(delete_one::<Review>),
        )
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
