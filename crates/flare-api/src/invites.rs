//! Handlers for the invite endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/buddy/invite` | Returns 201 + [`IssuedInvite`] |
//! | `POST` | `/buddy/join` | Body: [`InviteCodeBody`]; returns [`JoinedBuddy`] |
//! | `POST` | `/buddy/decline` | Body: [`InviteCodeBody`] |

use std::sync::Arc;

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use flare_core::{
  BuddyService,
  invite::{IssuedInvite, JoinedBuddy},
  store::BuddyStore,
};
use serde::Deserialize;
use serde_json::json;

use crate::{caller::Caller, error::ApiError, json_body};

#[derive(Debug, Deserialize)]
pub struct InviteCodeBody {
  pub invite_code: String,
}

/// `POST /buddy/invite`
pub async fn generate<S: BuddyStore>(
  State(service): State<Arc<BuddyService<S>>>,
  Caller(user): Caller,
) -> Result<impl IntoResponse, ApiError> {
  let issued: IssuedInvite = service.generate_invite(user).await?;
  tracing::info!(relationship_id = %issued.relationship_id, "invite issued");
  Ok((StatusCode::CREATED, Json(issued)))
}

/// `POST /buddy/join`
pub async fn join<S: BuddyStore>(
  State(service): State<Arc<BuddyService<S>>>,
  Caller(user): Caller,
  payload: Result<Json<InviteCodeBody>, JsonRejection>,
) -> Result<Json<JoinedBuddy>, ApiError> {
  let body = json_body(payload)?;
  let joined = service.consume_invite(user, &body.invite_code).await?;
  tracing::info!(relationship_id = %joined.relationship_id, "invite consumed");
  Ok(Json(joined))
}

/// `POST /buddy/decline`
pub async fn decline<S: BuddyStore>(
  State(service): State<Arc<BuddyService<S>>>,
  Caller(user): Caller,
  payload: Result<Json<InviteCodeBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let body = json_body(payload)?;
  let relationship_id = service.decline_invite(user, &body.invite_code).await?;
  tracing::info!(%relationship_id, "invite declined");
  Ok(Json(json!({ "relationship_id": relationship_id })))
}
