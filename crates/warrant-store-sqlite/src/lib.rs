//! SQLite backend for the Warrant argument store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Justification reads compose their SQL
//! from the fragments in [`query`], rebuild entities from denormalized rows,
//! and hydrate the rest of the graph with batched lookups.

mod encode;
mod materialize;
mod reconstruct;
mod resolve;
mod schema;
mod store;

pub mod error;
pub mod query;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
