//! Core types and trait definitions for the Warrant argument store.
//!
//! This crate is deliberately free of database dependencies. It holds the
//! justification graph types, the request types for reading it, and the pure
//! auto-confirmation status derivation.

pub mod auto_confirmation;
pub mod entity;
pub mod error;
pub mod justification;
pub mod query;
pub mod store;

pub use error::{Error, Result};
