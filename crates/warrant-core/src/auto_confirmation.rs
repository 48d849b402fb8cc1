//! URL-locator auto-confirmation: the append-only attempt log and the status
//! derived from it.
//!
//! Each attempt to find a media excerpt's quotation at a URL locator is
//! recorded once and never changed. A locator's status is never stored; it is
//! always computed from its full history by [`derive_auto_confirmation_status`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

// ─── Log records ─────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AutoConfirmationResultStatus {
  Found,
  NotFound,
  Error,
}

/// One completed auto-confirmation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoConfirmationResult {
  pub result_id:        i64,
  pub url_locator_id:   i64,
  pub complete_at:      DateTime<Utc>,
  pub status:           AutoConfirmationResultStatus,
  /// The quotation the attempt searched for.
  pub quotation:        String,
  /// The text actually found, when it differs in normalization.
  pub found_quotation:  Option<String>,
  pub error_message:    Option<String>,
}

/// Input to [`crate::store::ArgumentStore::record_auto_confirmation_result`].
#[derive(Debug, Clone)]
pub struct NewAutoConfirmationResult {
  pub url_locator_id:  i64,
  pub complete_at:     DateTime<Utc>,
  pub status:          AutoConfirmationResultStatus,
  pub quotation:       String,
  pub found_quotation: Option<String>,
  pub error_message:   Option<String>,
}

// ─── Derived status ──────────────────────────────────────────────────────────

/// The bounds of a maximal run of same-status attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptWindow {
  pub earliest: DateTime<Utc>,
  pub latest:   DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutoConfirmationStatus {
  NeverTried,
  NeverFound {
    not_found: AttemptWindow,
  },
  Found {
    found_quotation: Option<String>,
    found:           AttemptWindow,
  },
  PreviouslyFound {
    found_quotation: Option<String>,
    found:           AttemptWindow,
    not_found:       AttemptWindow,
  },
}

struct Run<'a> {
  status:     AutoConfirmationResultStatus,
  window:     AttemptWindow,
  last_found: Option<&'a AutoConfirmationResult>,
}

impl Run<'_> {
  fn quotation(&self) -> Option<String> {
    self
      .last_found
      .map(|r| r.found_quotation.clone().unwrap_or_else(|| r.quotation.clone()))
  }
}

/// Reduce one locator's attempt history to its status.
///
/// The history is ordered by `complete_at`; at equal timestamps a NOT_FOUND is
/// ordered before a FOUND, so a FOUND wins the tie. ERROR attempts are skipped
/// and never break a run.
pub fn derive_auto_confirmation_status(
  history: &[AutoConfirmationResult],
) -> AutoConfirmationStatus {
  let mut ordered: Vec<&AutoConfirmationResult> = history
    .iter()
    .filter(|r| r.status != AutoConfirmationResultStatus::Error)
    .collect();
  ordered.sort_by_key(|r| (r.complete_at, r.status == AutoConfirmationResultStatus::Found));

  // The run in progress and the last completed FOUND run before it.
  let mut current: Option<Run<'_>> = None;
  let mut previous_found: Option<Run<'_>> = None;

  for result in ordered {
    let is_found = result.status == AutoConfirmationResultStatus::Found;

    if let Some(run) = current.as_mut().filter(|run| run.status == result.status) {
      run.window.latest = result.complete_at;
      if is_found {
        run.last_found = Some(result);
      }
      continue;
    }

    let started = Run {
      status:     result.status,
      window:     AttemptWindow {
        earliest: result.complete_at,
        latest:   result.complete_at,
      },
      last_found: is_found.then_some(result),
    };
    if let Some(ended) = current.replace(started)
      && ended.status == AutoConfirmationResultStatus::Found
    {
      previous_found = Some(ended);
    }
  }

  let Some(trailing) = current else {
    if !history.is_empty() {
      tracing::warn!(
        url_locator_id = history[0].url_locator_id,
        attempts = history.len(),
        "auto-confirmation history contains only errors"
      );
    }
    return AutoConfirmationStatus::NeverTried;
  };

  match (trailing.status, previous_found) {
    (AutoConfirmationResultStatus::Found, _) => AutoConfirmationStatus::Found {
      found_quotation: trailing.quotation(),
      found:           trailing.window,
    },
    (_, Some(found)) => AutoConfirmationStatus::PreviouslyFound {
      found_quotation: found.quotation(),
      found:           found.window,
      not_found:       trailing.window,
    },
    (_, None) => AutoConfirmationStatus::NeverFound { not_found: trailing.window },
  }
}
