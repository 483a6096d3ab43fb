//! The authenticated caller, as established by whatever sits in front of
//! the router.

use axum::{extract::FromRequestParts, http::request::Parts};
use flare_core::user::UserId;

use crate::error::ApiError;

/// The verified identity of the user making the request.
///
/// The authentication layer inserts this into the request extensions; the
/// router trusts it unconditionally. A request without one is rejected with
/// `401`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub UserId);

impl<St> FromRequestParts<St> for Caller
where
  St: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &St,
  ) -> Result<Self, Self::Rejection> {
    parts
      .extensions
      .get::<Caller>()
      .cloned()
      .ok_or(ApiError::Unauthorized)
  }
}
