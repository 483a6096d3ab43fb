//! HTTP Basic authentication against the configured user table.
//!
//! A request that verifies gets its [`Caller`] inserted into the request
//! extensions before it reaches the API router.

use std::{collections::HashMap, sync::Arc};

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{Request, State},
  http::HeaderMap,
  middleware::Next,
  response::Response,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use flare_api::{ApiError, Caller};
use flare_core::user::UserId;
use serde::Deserialize;

/// One row of the `users` table in `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserEntry {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub user_id:       String,
}

struct Account {
  password_hash: String,
  user_id:       UserId,
}

/// Credentials accepted by this server instance, keyed by username.
pub struct AuthConfig {
  accounts: HashMap<String, Account>,
}

impl AuthConfig {
  /// Build the lookup table. Fails on a blank `user_id` or a username
  /// listed twice.
  pub fn new(users: &[UserEntry]) -> Result<Self, flare_core::Error> {
    let mut accounts = HashMap::with_capacity(users.len());
    for entry in users {
      let account = Account {
        password_hash: entry.password_hash.clone(),
        user_id:       UserId::new(entry.user_id.clone())?,
      };
      if accounts.insert(entry.username.clone(), account).is_some() {
        return Err(flare_core::Error::Conflict(format!(
          "user {:?} configured twice",
          entry.username
        )));
      }
    }
    Ok(Self { accounts })
  }

  pub fn is_empty(&self) -> bool { self.accounts.is_empty() }
}

/// Verify Basic credentials from `headers` and return the user they belong
/// to.
pub fn verify_auth(
  headers: &HeaderMap,
  config: &AuthConfig,
) -> Result<UserId, ApiError> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds = std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

  let (username, password) =
    creds.split_once(':').ok_or(ApiError::Unauthorized)?;

  let account = config
    .accounts
    .get(username)
    .ok_or(ApiError::Unauthorized)?;

  let parsed_hash = PasswordHash::new(&account.password_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Ok(account.user_id.clone())
}

/// Middleware: reject unauthenticated requests, otherwise attach the
/// [`Caller`].
pub async fn require_auth(
  State(config): State<Arc<AuthConfig>>,
  mut req: Request,
  next: Next,
) -> Result<Response, ApiError> {
  let user = verify_auth(req.headers(), &config)?;
  req.extensions_mut().insert(Caller(user));
  Ok(next.run(req).await)
}
