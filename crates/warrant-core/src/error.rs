//! Error types for `warrant-core`.

use thiserror::Error;

use crate::entity::EntityKind;

#[derive(Debug, Error)]
pub enum Error {
  /// A state that referential integrity should make unreachable.
  #[error("impossible: {0}")]
  Impossible(String),

  /// A stored discriminator this build has no variant for.
  #[error("unhandled {enum_name} value: {value:?}")]
  ExhaustedEnum {
    enum_name: &'static str,
    value:     String,
  },

  #[error("{kind} not found: {id}")]
  EntityNotFound { kind: EntityKind, id: i64 },

  #[error("invalid filter: {0}")]
  InvalidFilter(String),

  #[error("invalid sort: {0}")]
  InvalidSort(String),
}

impl Error {
  pub fn impossible(message: impl Into<String>) -> Self {
    Self::Impossible(message.into())
  }

  pub fn not_found(kind: EntityKind, id: i64) -> Self {
    Self::EntityNotFound { kind, id }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
