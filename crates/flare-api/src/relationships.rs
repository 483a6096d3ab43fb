//! Handlers for the buddy list and per-relationship endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/buddy/list` | Accepted relationships only |
//! | `PUT`    | `/buddy/relationships/{id}/permissions` | Body: [`PermissionsBody`] |
//! | `DELETE` | `/buddy/buddies/{buddy_id}` | Idempotent |
//! | `POST`   | `/buddy/buddies/{buddy_id}/block` | |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  response::IntoResponse,
};
use flare_core::{
  BuddyService,
  permissions::{PermissionPatch, Permissions},
  relationship::BuddyView,
  store::BuddyStore,
  user::UserId,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{caller::Caller, error::ApiError, json_body};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /buddy/list`
pub async fn list<S: BuddyStore>(
  State(service): State<Arc<BuddyService<S>>>,
  Caller(user): Caller,
) -> Result<Json<Vec<BuddyView>>, ApiError> {
  Ok(Json(service.list_relationships(user).await?))
}

// ─── Permissions ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermissionsBody {
  pub permissions: PermissionPatch,
}

#[derive(Debug, Serialize)]
pub struct PermissionsResponse {
  pub permissions: Permissions,
}

/// `PUT /buddy/relationships/{id}/permissions`
pub async fn update_permissions<S: BuddyStore>(
  State(service): State<Arc<BuddyService<S>>>,
  Caller(user): Caller,
  Path(id): Path<Uuid>,
  payload: Result<Json<PermissionsBody>, JsonRejection>,
) -> Result<Json<PermissionsResponse>, ApiError> {
  let body = json_body(payload)?;
  let permissions = service.update_permissions(user, id, body.permissions).await?;
  tracing::info!(relationship_id = %id, "permissions updated");
  Ok(Json(PermissionsResponse { permissions }))
}

// ─── Remove / block ───────────────────────────────────────────────────────────

/// `DELETE /buddy/buddies/{buddy_id}`
pub async fn remove<S: BuddyStore>(
  State(service): State<Arc<BuddyService<S>>>,
  Caller(user): Caller,
  Path(buddy_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
  let buddy = UserId::new(buddy_id)?;
  service.remove_relationship(user, buddy.clone()).await?;
  tracing::info!(%buddy, "relationship removed");
  Ok(Json(json!({ "ok": true })))
}

/// `POST /buddy/buddies/{buddy_id}/block`
pub async fn block<S: BuddyStore>(
  State(service): State<Arc<BuddyService<S>>>,
  Caller(user): Caller,
  Path(buddy_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
  let buddy = UserId::new(buddy_id)?;
  let relationship_id = service.block_buddy(user, buddy).await?;
  tracing::info!(%relationship_id, "relationship blocked");
  Ok(Json(json!({ "relationship_id": relationship_id })))
}
