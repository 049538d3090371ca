//! SQLite backend for the Haven housing store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Multi-step occupancy writes run inside
//! a single SQLite transaction.

mod encode;
mod occupancy;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
