//! Handlers for shared daily check-ins.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use flare_core::{
  BuddyService, check_in::CheckInShare, store::BuddyStore, user::UserId,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{caller::Caller, error::ApiError, json_body};

#[derive(Debug, Deserialize)]
pub struct ShareBody {
  pub buddy_id:      String,
  pub mood_entry_id: String,
}

/// `POST /buddy/check-ins`
pub async fn share<S: BuddyStore>(
  State(service): State<Arc<BuddyService<S>>>,
  Caller(user): Caller,
  payload: Result<Json<ShareBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let body = json_body(payload)?;
  let buddy = UserId::new(body.buddy_id)?;
  let share_id = service
    .share_check_in(user, buddy, &body.mood_entry_id)
    .await?;
  tracing::info!(%share_id, "check-in shared");
  Ok((StatusCode::CREATED, Json(json!({ "share_id": share_id }))))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub unviewed_only: bool,
}

/// `GET /buddy/check-ins[?unviewed_only=true]`
pub async fn list<S: BuddyStore>(
  State(service): State<Arc<BuddyService<S>>>,
  Caller(user): Caller,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<CheckInShare>>, ApiError> {
  Ok(Json(service.list_check_ins(user, params.unviewed_only).await?))
}

/// `PUT /buddy/check-ins/{id}/viewed`
pub async fn viewed<S: BuddyStore>(
  State(service): State<Arc<BuddyService<S>>>,
  Caller(user): Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<CheckInShare>, ApiError> {
  Ok(Json(service.mark_check_in_viewed(user, id).await?))
}
