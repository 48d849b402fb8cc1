//! Encoding and decoding helpers between the domain types and the plain
//! values stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Discriminators are stored as
//! SCREAMING_SNAKE_CASE text and parsed at the row boundary.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use warrant_core::{
  auto_confirmation::AutoConfirmationResult,
  entity::{
    Persorg, Proposition, SentenceType, Statement, Url, UrlTargetAnchor, UserBlurb, Writ,
    WritQuote, parse_discriminator,
  },
};

use crate::{Error, Result, resolve::resolve_sentence};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

/// Read `{prefix}_{name}` from a row of aliased columns.
fn prefixed<T: rusqlite::types::FromSql>(
  row: &Row<'_>,
  prefix: &str,
  name: &str,
) -> rusqlite::Result<T> {
  row.get(format!("{prefix}_{name}").as_str())
}

// ─── Propositions ────────────────────────────────────────────────────────────

/// Raw values of a `propositions` row.
#[derive(Debug, Clone)]
pub struct RawProposition {
  pub proposition_id:  i64,
  pub text:            String,
  pub creator_user_id: i64,
  pub created:         String,
}

impl RawProposition {
  /// Columns `proposition_id, text, creator_user_id, created` in order.
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      proposition_id:  row.get(0)?,
      text:            row.get(1)?,
      creator_user_id: row.get(2)?,
      created:         row.get(3)?,
    })
  }

  /// Columns aliased `{prefix}_id, {prefix}_text, ...`; `None` when the
  /// left join found nothing.
  pub fn from_prefixed(row: &Row<'_>, prefix: &str) -> rusqlite::Result<Option<Self>> {
    let Some(proposition_id) = prefixed::<Option<i64>>(row, prefix, "id")? else {
      return Ok(None);
    };
    Ok(Some(Self {
      proposition_id,
      text: prefixed(row, prefix, "text")?,
      creator_user_id: prefixed(row, prefix, "creator_user_id")?,
      created: prefixed(row, prefix, "created")?,
    }))
  }

  pub fn into_proposition(self) -> Result<Proposition> {
    Ok(Proposition {
      proposition_id:  self.proposition_id,
      text:            self.text,
      creator_user_id: self.creator_user_id,
      created:         decode_dt(&self.created)?,
    })
  }
}

// ─── Writ quotes ─────────────────────────────────────────────────────────────

/// Raw values of a `writ_quotes` row joined with its writ.
#[derive(Debug, Clone)]
pub struct RawWritQuote {
  pub writ_quote_id:   i64,
  pub quote_text:      String,
  pub creator_user_id: i64,
  pub created:         String,
  pub writ_id:         i64,
  pub writ_title:      String,
}

impl RawWritQuote {
  /// `None` when either the quote or its writ is absent (deleted).
  pub fn from_prefixed(row: &Row<'_>, prefix: &str) -> rusqlite::Result<Option<Self>> {
    let (Some(writ_quote_id), Some(writ_id)) = (
      prefixed::<Option<i64>>(row, prefix, "id")?,
      prefixed::<Option<i64>>(row, prefix, "writ_id")?,
    ) else {
      return Ok(None);
    };
    Ok(Some(Self {
      writ_quote_id,
      quote_text: prefixed(row, prefix, "quote_text")?,
      creator_user_id: prefixed(row, prefix, "creator_user_id")?,
      created: prefixed(row, prefix, "created")?,
      writ_id,
      writ_title: prefixed(row, prefix, "writ_title")?,
    }))
  }

  pub fn into_writ_quote(self) -> Result<WritQuote> {
    Ok(WritQuote {
      writ_quote_id:   self.writ_quote_id,
      quote_text:      self.quote_text,
      writ:            Writ { writ_id: self.writ_id, title: self.writ_title },
      creator_user_id: self.creator_user_id,
      created:         decode_dt(&self.created)?,
      urls:            None,
    })
  }
}

// ─── Compounds ───────────────────────────────────────────────────────────────

/// The header columns shared by both compound kinds.
#[derive(Debug, Clone)]
pub struct RawCompoundHeader {
  pub compound_id:     i64,
  pub creator_user_id: i64,
  pub created:         String,
}

impl RawCompoundHeader {
  pub fn from_prefixed(row: &Row<'_>, prefix: &str) -> rusqlite::Result<Option<Self>> {
    let Some(compound_id) = prefixed::<Option<i64>>(row, prefix, "id")? else {
      return Ok(None);
    };
    Ok(Some(Self {
      compound_id,
      creator_user_id: prefixed(row, prefix, "creator_user_id")?,
      created: prefixed(row, prefix, "created")?,
    }))
  }
}

/// A justification basis compound atom and whichever entity columns the
/// type-guarded joins filled in.
#[derive(Debug, Clone)]
pub struct RawBasisCompoundAtom {
  pub atom_id:        i64,
  pub entity_type:    String,
  pub entity_id:      i64,
  pub order_position: i64,
  pub proposition:    Option<RawProposition>,
  pub paraphrase:     Option<RawParaphrase>,
}

#[derive(Debug, Clone)]
pub struct RawParaphrase {
  pub source_excerpt_paraphrase_id: i64,
  pub source_excerpt_type:          String,
  pub source_excerpt_id:            i64,
  pub paraphrasing_proposition_id:  i64,
  pub paraphrasing_proposition:     Option<RawProposition>,
  pub writ_quote:                   Option<RawWritQuote>,
}

// ─── Justification rows ──────────────────────────────────────────────────────

/// One physical row of the justification projection. A compound basis
/// produces one row per atom, repeating every other column.
#[derive(Debug, Clone)]
pub struct RawJustificationRow {
  pub justification_id:     i64,
  pub root_target_type:     String,
  pub root_target_id:       i64,
  pub root_polarity:        String,
  pub target_type:          String,
  pub target_id:            i64,
  pub basis_type:           String,
  pub basis_id:             i64,
  pub polarity:             String,
  pub creator_user_id:      i64,
  pub created:              String,
  // proposition compound join
  pub proposition_compound: Option<RawCompoundHeader>,
  pub pc_atom:              Option<(i64, RawProposition)>,
  // writ quote join
  pub writ_quote:           Option<RawWritQuote>,
  // justification basis compound join
  pub basis_compound:       Option<RawCompoundHeader>,
  pub basis_compound_atom:  Option<RawBasisCompoundAtom>,
}

impl RawJustificationRow {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    let pc_atom = match (
      row.get::<_, Option<i64>>("pca_order_position")?,
      RawProposition::from_prefixed(row, "pcap")?,
    ) {
      (Some(order_position), Some(proposition)) => Some((order_position, proposition)),
      _ => None,
    };

    let basis_compound_atom = match row.get::<_, Option<i64>>("jbca_id")? {
      Some(atom_id) => {
        let paraphrase = match row.get::<_, Option<i64>>("sep_id")? {
          Some(source_excerpt_paraphrase_id) => Some(RawParaphrase {
            source_excerpt_paraphrase_id,
            source_excerpt_type: row.get("sep_source_excerpt_type")?,
            source_excerpt_id: row.get("sep_source_excerpt_id")?,
            paraphrasing_proposition_id: row.get("sep_paraphrasing_proposition_id")?,
            paraphrasing_proposition: RawProposition::from_prefixed(row, "sepp")?,
            writ_quote: RawWritQuote::from_prefixed(row, "sepwq")?,
          }),
          None => None,
        };
        Some(RawBasisCompoundAtom {
          atom_id,
          entity_type: row.get("jbca_entity_type")?,
          entity_id: row.get("jbca_entity_id")?,
          order_position: row.get("jbca_order_position")?,
          proposition: RawProposition::from_prefixed(row, "jbcap")?,
          paraphrase,
        })
      }
      None => None,
    };

    Ok(Self {
      justification_id: row.get("justification_id")?,
      root_target_type: row.get("root_target_type")?,
      root_target_id: row.get("root_target_id")?,
      root_polarity: row.get("root_polarity")?,
      target_type: row.get("target_type")?,
      target_id: row.get("target_id")?,
      basis_type: row.get("basis_type")?,
      basis_id: row.get("basis_id")?,
      polarity: row.get("polarity")?,
      creator_user_id: row.get("creator_user_id")?,
      created: row.get("created")?,
      proposition_compound: RawCompoundHeader::from_prefixed(row, "pc")?,
      pc_atom,
      writ_quote: RawWritQuote::from_prefixed(row, "wq")?,
      basis_compound: RawCompoundHeader::from_prefixed(row, "jbc")?,
      basis_compound_atom,
    })
  }
}

// ─── Statements ──────────────────────────────────────────────────────────────

/// A `statements` row joined with its speaker and, for proposition
/// sentences, the proposition.
#[derive(Debug, Clone)]
pub struct RawStatement {
  pub statement_id:         i64,
  pub sentence_type:        String,
  pub sentence_id:          i64,
  pub creator_user_id:      i64,
  pub created:              String,
  pub speaker:              Persorg,
  pub sentence_proposition: Option<RawProposition>,
}

impl RawStatement {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      statement_id:         row.get("statement_id")?,
      sentence_type:        row.get("sentence_type")?,
      sentence_id:          row.get("sentence_id")?,
      creator_user_id:      row.get("creator_user_id")?,
      created:              row.get("created")?,
      speaker:              Persorg {
        persorg_id:      row.get("persorg_id")?,
        name:            row.get("persorg_name")?,
        is_organization: row.get("is_organization")?,
      },
      sentence_proposition: RawProposition::from_prefixed(row, "sp")?,
    })
  }

  /// Nested statement sentences stay as references.
  pub fn into_statement(self) -> Result<Statement> {
    let sentence_type: SentenceType = parse_discriminator("SentenceType", &self.sentence_type)?;
    let proposition = self.sentence_proposition.map(RawProposition::into_proposition).transpose()?;
    Ok(Statement {
      statement_id:    self.statement_id,
      speaker:         self.speaker,
      sentence:        resolve_sentence(sentence_type, self.sentence_id, proposition.as_ref()),
      creator_user_id: self.creator_user_id,
      created:         decode_dt(&self.created)?,
    })
  }
}

// ─── Media excerpts ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RawMediaExcerpt {
  pub media_excerpt_id: i64,
  pub quotation:        String,
  pub creator_user_id:  i64,
  pub created:          String,
}

#[derive(Debug, Clone)]
pub struct RawUrlLocator {
  pub url_locator_id:   i64,
  pub media_excerpt_id: i64,
  pub url:              Url,
}

#[derive(Debug, Clone)]
pub struct RawCitation {
  pub media_excerpt_id: i64,
  pub source_id:        i64,
  pub description:      String,
  pub pincite:          Option<String>,
}

// ─── URL targets ─────────────────────────────────────────────────────────────

/// A confirmed URL target row with at most one of its anchors.
#[derive(Debug, Clone)]
pub struct RawUrlTargetAnchor {
  pub url_target_id: i64,
  pub writ_quote_id: i64,
  pub url_id:        i64,
  pub anchor:        Option<UrlTargetAnchor>,
}

impl RawUrlTargetAnchor {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    let anchor = match row.get::<_, Option<String>>("exact_text")? {
      Some(exact_text) => Some(UrlTargetAnchor {
        exact_text,
        prefix_text: row.get("prefix_text")?,
        suffix_text: row.get("suffix_text")?,
        start_offset: row.get("start_offset")?,
        end_offset: row.get("end_offset")?,
      }),
      None => None,
    };
    Ok(Self {
      url_target_id: row.get("url_target_id")?,
      writ_quote_id: row.get("writ_quote_id")?,
      url_id: row.get("url_id")?,
      anchor,
    })
  }
}

// ─── Users ───────────────────────────────────────────────────────────────────

pub fn user_blurb_from_row(row: &Row<'_>) -> rusqlite::Result<UserBlurb> {
  Ok(UserBlurb { user_id: row.get(0)?, long_name: row.get(1)? })
}

// ─── Auto-confirmation results ───────────────────────────────────────────────

/// Raw values of a `url_locator_auto_confirmation_results` row.
#[derive(Debug, Clone)]
pub struct RawAutoConfirmationResult {
  pub result_id:       i64,
  pub url_locator_id:  i64,
  pub complete_at:     String,
  pub status:          String,
  pub quotation:       String,
  pub found_quotation: Option<String>,
  pub error_message:   Option<String>,
}

/// Column list matching [`RawAutoConfirmationResult::from_row`].
pub const AUTO_CONFIRMATION_RESULT_COLUMNS: &str = "result_id, url_locator_id, complete_at, \
                                                    status, quotation, found_quotation, \
                                                    error_message";

impl RawAutoConfirmationResult {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      result_id:       row.get(0)?,
      url_locator_id:  row.get(1)?,
      complete_at:     row.get(2)?,
      status:          row.get(3)?,
      quotation:       row.get(4)?,
      found_quotation: row.get(5)?,
      error_message:   row.get(6)?,
    })
  }

  pub fn into_result(self) -> Result<AutoConfirmationResult> {
    Ok(AutoConfirmationResult {
      result_id:       self.result_id,
      url_locator_id:  self.url_locator_id,
      complete_at:     decode_dt(&self.complete_at)?,
      status:          parse_discriminator("AutoConfirmationResultStatus", &self.status)?,
      quotation:       self.quotation,
      found_quotation: self.found_quotation,
      error_message:   self.error_message,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_round_trip_through_rfc3339() {
    let dt = Utc.with_ymd_and_hms(2024, 2, 29, 12, 30, 0).unwrap();
    assert_eq!(decode_dt(&encode_dt(dt)).unwrap(), dt);
  }

  #[test]
  fn bad_timestamps_are_reported() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }

  #[test]
  fn prefixed_columns_decode_left_join_misses_as_none() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    let (hit, miss) = conn
      .query_row(
        "SELECT 4 AS p_id, 'Water is wet' AS p_text, 1 AS p_creator_user_id,
                '2024-01-01T00:00:00+00:00' AS p_created,
                NULL AS q_id, NULL AS q_text, NULL AS q_creator_user_id, NULL AS q_created",
        [],
        |row| {
          Ok((
            RawProposition::from_prefixed(row, "p")?,
            RawProposition::from_prefixed(row, "q")?,
          ))
        },
      )
      .unwrap();
    let proposition = hit.unwrap().into_proposition().unwrap();
    assert_eq!(proposition.proposition_id, 4);
    assert_eq!(proposition.text, "Water is wet");
    assert!(miss.is_none());
  }
}
