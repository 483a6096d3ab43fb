//! Core types and trait definitions for Flare buddy pairing.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the domain types, the [`store::BuddyStore`] persistence trait, and the
//! components in [`service`] that enforce pairing and signalling rules on top
//! of any store.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod check_in;
pub mod error;
pub mod flare;
pub mod invite;
pub mod permissions;
pub mod relationship;
pub mod service;
pub mod store;
pub mod user;

pub use error::{Error, Forbidden, Result};
pub use service::BuddyService;
