//! SQLite backend for the Flare buddy store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Uniqueness and single-use rules are
//! expressed as constraints and conditional `UPDATE … RETURNING` statements,
//! so they hold even when callers race.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
