//! JSON REST API for the buddy system.
//!
//! Exposes an axum [`Router`] backed by a [`BuddyService`] over any
//! [`flare_core::store::BuddyStore`]. Authentication is the caller's
//! responsibility: whatever sits in front of this router must insert a
//! [`Caller`] into the request extensions.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", flare_api::api_router(service.clone()))
//! ```

pub mod caller;
pub mod check_ins;
pub mod error;
pub mod flares;
pub mod invites;
pub mod relationships;

use std::sync::Arc;

use axum::{
  Json, Router,
  extract::rejection::JsonRejection,
  routing::{delete, get, post, put},
};
use flare_core::{BuddyService, store::BuddyStore};

pub use caller::Caller;
pub use error::ApiError;

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(service: Arc<BuddyService<S>>) -> Router<()>
where
  S: BuddyStore + 'static,
{
  Router::new()
    // Invites
    .route("/buddy/invite", post(invites::generate::<S>))
    .route("/buddy/join", post(invites::join::<S>))
    .route("/buddy/decline", post(invites::decline::<S>))
    // Relationships
    .route("/buddy/list", get(relationships::list::<S>))
    .route(
      "/buddy/relationships/{id}/permissions",
      put(relationships::update_permissions::<S>),
    )
    // Buddy ids are opaque and may collide with the static segments above.
    .route("/buddy/buddies/{buddy_id}", delete(relationships::remove::<S>))
    .route("/buddy/buddies/{buddy_id}/block", post(relationships::block::<S>))
    // Flares
    .route("/buddy/flare", post(flares::send::<S>))
    .route("/buddy/flares", get(flares::list::<S>))
    .route("/buddy/flares/{id}/respond", put(flares::respond::<S>))
    // Check-ins
    .route(
      "/buddy/check-ins",
      get(check_ins::list::<S>).post(check_ins::share::<S>),
    )
    .route("/buddy/check-ins/{id}/viewed", put(check_ins::viewed::<S>))
    .with_state(service)
}

/// Unwrap a JSON body, reporting any rejection as a `400`.
pub(crate) fn json_body<T>(
  payload: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiError> {
  payload.map(|Json(body)| body).map_err(ApiError::from)
}
