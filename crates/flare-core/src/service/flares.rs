//! Sending, listing and answering flare signals.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
  Error, Result,
  flare::{
    FlareSignal, LIST_LIMIT, NewFlare, Urgency, normalize_message,
    normalize_response,
  },
  permissions::Capability,
  service::PermissionGate,
  store::BuddyStore,
  user::UserId,
};

pub struct FlareDispatcher<S> {
  store: Arc<S>,
  gate:  PermissionGate<S>,
}

impl<S> Clone for FlareDispatcher<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), gate: self.gate.clone() }
  }
}

impl<S: BuddyStore> FlareDispatcher<S> {
  pub fn new(store: Arc<S>, gate: PermissionGate<S>) -> Self {
    Self { store, gate }
  }

  /// Record a signal from `sender` to `recipient`. Fails with
  /// [`Error::NotFound`] unless the two are buddies with flare signals
  /// allowed; a disabled flag is indistinguishable from no relationship.
  pub async fn send(
    &self,
    sender: UserId,
    recipient: UserId,
    message: Option<&str>,
    urgency_level: Urgency,
  ) -> Result<Uuid> {
    if !self
      .gate
      .has_capability(&sender, &recipient, Capability::AllowFlareSignals)
      .await?
    {
      return Err(Error::not_found("buddy relationship allowing flares"));
    }

    let flare = self
      .store
      .insert_flare(NewFlare {
        sender,
        recipient,
        message: normalize_message(message),
        urgency_level,
      })
      .await
      .map_err(Error::store)?;
    Ok(flare.flare_id)
  }

  /// Signals addressed to `recipient`, newest first.
  pub async fn list(
    &self,
    recipient: UserId,
    unread_only: bool,
  ) -> Result<Vec<FlareSignal>> {
    self
      .store
      .list_flares(recipient, unread_only, LIST_LIMIT)
      .await
      .map_err(Error::store)
  }

  /// Mark a signal read, optionally with a response. Calling this again
  /// overwrites the earlier response.
  pub async fn respond(
    &self,
    flare_id: Uuid,
    recipient: UserId,
    response: Option<&str>,
  ) -> Result<FlareSignal> {
    self
      .store
      .respond_flare(flare_id, recipient, normalize_response(response))
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::not_found("flare signal"))
  }
}
