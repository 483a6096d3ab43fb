//! Handlers for flare signals.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/buddy/flare` | Body: [`SendFlareBody`]; returns 201 |
//! | `GET`  | `/buddy/flares` | Optional `unread_only`; newest first, at most 50 |
//! | `PUT`  | `/buddy/flares/{id}/respond` | Body: [`RespondBody`], may be empty |

use std::sync::Arc;

use axum::{
  Json,
  body::Bytes,
  extract::{Path, Query, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use flare_core::{
  BuddyService,
  flare::{FlareSignal, Urgency},
  store::BuddyStore,
  user::UserId,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{caller::Caller, error::ApiError, json_body};

// ─── Send ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SendFlareBody {
  pub buddy_id:      String,
  pub message:       Option<String>,
  #[serde(default)]
  pub urgency_level: Urgency,
}

/// `POST /buddy/flare`
pub async fn send<S: BuddyStore>(
  State(service): State<Arc<BuddyService<S>>>,
  Caller(user): Caller,
  payload: Result<Json<SendFlareBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let body = json_body(payload)?;
  let buddy = UserId::new(body.buddy_id)?;
  let flare_id = service
    .send_flare(user, buddy, body.message.as_deref(), body.urgency_level)
    .await?;
  tracing::info!(%flare_id, urgency = %body.urgency_level, "flare sent");
  Ok((StatusCode::CREATED, Json(json!({ "flare_id": flare_id }))))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub unread_only: bool,
}

/// `GET /buddy/flares[?unread_only=true]`
pub async fn list<S: BuddyStore>(
  State(service): State<Arc<BuddyService<S>>>,
  Caller(user): Caller,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<FlareSignal>>, ApiError> {
  Ok(Json(service.list_flares(user, params.unread_only).await?))
}

// ─── Respond ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct RespondBody {
  pub response: Option<String>,
}

/// `PUT /buddy/flares/{id}/respond`
///
/// An empty body acknowledges the flare without a response.
pub async fn respond<S: BuddyStore>(
  State(service): State<Arc<BuddyService<S>>>,
  Caller(user): Caller,
  Path(id): Path<Uuid>,
  body: Bytes,
) -> Result<Json<FlareSignal>, ApiError> {
  let body = parse_respond_body(&body)?;
  let flare = service
    .respond_flare(user, id, body.response.as_deref())
    .await?;
  tracing::info!(flare_id = %id, "flare responded");
  Ok(Json(flare))
}

fn parse_respond_body(raw: &[u8]) -> Result<RespondBody, ApiError> {
  if raw.iter().all(u8::is_ascii_whitespace) {
    return Ok(RespondBody::default());
  }
  serde_json::from_slice(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}
