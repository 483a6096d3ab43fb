//! HTTP server for the buddy system.
//!
//! Wraps the [`flare_api`] router in Basic authentication and request
//! tracing, backed by any [`BuddyStore`].

pub mod auth;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware};
use flare_core::{
  BuddyService,
  permissions::{PermissionPatch, Permissions},
  store::BuddyStore,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, UserEntry};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub store_path:          PathBuf,
  #[serde(default)]
  pub users:               Vec<UserEntry>,
  /// Overrides applied to [`Permissions::DEFAULT`] for new relationships.
  #[serde(default)]
  pub default_permissions: Option<PermissionPatch>,
}

impl ServerConfig {
  pub fn default_permissions(&self) -> Permissions {
    match &self.default_permissions {
      Some(patch) => Permissions::DEFAULT.merged(patch),
      None => Permissions::DEFAULT,
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the router.
pub struct AppState<S> {
  pub service: Arc<BuddyService<S>>,
  pub auth:    Arc<AuthConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      service: Arc::clone(&self.service),
      auth:    Arc::clone(&self.auth),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router: `/api/*` behind Basic auth.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: BuddyStore + 'static,
{
  let api = flare_api::api_router(state.service).layer(
    middleware::from_fn_with_state(state.auth, auth::require_auth),
  );
  Router::new()
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
