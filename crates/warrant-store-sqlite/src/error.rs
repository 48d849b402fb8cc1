//! Error type for `warrant-store-sqlite`.

use thiserror::Error;
use warrant_core::entity::EntityKind;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] warrant_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

impl Error {
  pub fn impossible(message: impl Into<String>) -> Self {
    Self::Core(warrant_core::Error::impossible(message))
  }

  pub fn not_found(kind: EntityKind, id: i64) -> Self {
    Self::Core(warrant_core::Error::not_found(kind, id))
  }

  /// Whether this is a typed not-found condition the caller can surface.
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::Core(warrant_core::Error::EntityNotFound { .. }))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
