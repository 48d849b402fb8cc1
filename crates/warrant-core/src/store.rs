//! The `ArgumentStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `warrant-store-sqlite`).
//! Callers above the persistence layer depend on this abstraction, not on any
//! concrete backend.

use std::{collections::HashMap, future::Future};

use crate::{
  auto_confirmation::{
    AutoConfirmationResult, AutoConfirmationStatus, NewAutoConfirmationResult,
  },
  entity::{MediaExcerpt, Statement, Url, UrlTarget, UserBlurb},
  justification::Justification,
  query::ReadJustificationsRequest,
};

/// Abstraction over a Warrant argument store backend.
///
/// Reads never observe soft-deleted rows. The batched readers assert that
/// every requested id was found: a miss means broken referential integrity,
/// not a user error.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait ArgumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Justifications ────────────────────────────────────────────────────

  /// Read a filtered, sorted, keyset-paginated page of justifications with
  /// their bases, targets, creators and counter-justifications hydrated.
  fn read_justifications<'a>(
    &'a self,
    request: &'a ReadJustificationsRequest,
  ) -> impl Future<Output = Result<Vec<Justification>, Self::Error>> + Send + 'a;

  /// Read one justification. Fails with a not-found error if it does not
  /// exist or has been deleted.
  fn read_justification(
    &self,
    justification_id: i64,
  ) -> impl Future<Output = Result<Justification, Self::Error>> + Send + '_;

  // ── Batched readers ───────────────────────────────────────────────────

  fn read_statements_for_ids<'a>(
    &'a self,
    ids: &'a [i64],
  ) -> impl Future<Output = Result<HashMap<i64, Statement>, Self::Error>> + Send + 'a;

  fn read_media_excerpts_for_ids<'a>(
    &'a self,
    ids: &'a [i64],
  ) -> impl Future<Output = Result<HashMap<i64, MediaExcerpt>, Self::Error>> + Send + 'a;

  /// URLs attached to each writ quote. Writ quotes without URLs map to an
  /// empty list.
  fn read_urls_for_writ_quote_ids<'a>(
    &'a self,
    writ_quote_ids: &'a [i64],
  ) -> impl Future<Output = Result<HashMap<i64, Vec<Url>>, Self::Error>> + Send + 'a;

  /// Confirmed targets keyed by `(writ_quote_id, url_id)`. Pairs without a
  /// confirmed target are absent from the map.
  fn read_url_targets_for_writ_quote_urls<'a>(
    &'a self,
    pairs: &'a [(i64, i64)],
  ) -> impl Future<Output = Result<HashMap<(i64, i64), UrlTarget>, Self::Error>> + Send + 'a;

  fn read_user_blurbs_for_ids<'a>(
    &'a self,
    ids: &'a [i64],
  ) -> impl Future<Output = Result<HashMap<i64, UserBlurb>, Self::Error>> + Send + 'a;

  // ── Auto-confirmation ─────────────────────────────────────────────────

  /// Append one attempt to a locator's history. Results are never updated.
  fn record_auto_confirmation_result(
    &self,
    input: NewAutoConfirmationResult,
  ) -> impl Future<Output = Result<AutoConfirmationResult, Self::Error>> + Send + '_;

  /// Derive a locator's current status from its full attempt history.
  fn read_auto_confirmation_status(
    &self,
    url_locator_id: i64,
  ) -> impl Future<Output = Result<AutoConfirmationStatus, Self::Error>> + Send + '_;
}
