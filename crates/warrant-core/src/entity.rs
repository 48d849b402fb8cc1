//! Entities that a justification can reference as its basis or target.
//!
//! Every relation in the justification graph is either hydrated (the full
//! entity was loaded) or a bare id reference; see [`EntityOrRef`].

use std::{str::FromStr, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::{Error, Result, auto_confirmation::AutoConfirmationStatus};

// ─── Hydration ───────────────────────────────────────────────────────────────

/// A relation that is either fully loaded or known only by its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EntityOrRef<T> {
  Entity(T),
  Ref(i64),
}

impl<T> EntityOrRef<T> {
  /// Hydrate from `lookup` when the id is present, otherwise keep the ref.
  pub fn from_lookup(id: i64, lookup: Option<&T>) -> Self
  where
    T: Clone,
  {
    match lookup {
      Some(entity) => Self::Entity(entity.clone()),
      None => Self::Ref(id),
    }
  }

  pub fn entity(&self) -> Option<&T> {
    match self {
      Self::Entity(entity) => Some(entity),
      Self::Ref(_) => None,
    }
  }

  pub fn is_hydrated(&self) -> bool { matches!(self, Self::Entity(_)) }
}

/// The kinds of entity a caller can look up by id, used in not-found errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
  Justification,
  Proposition,
  Statement,
  MediaExcerpt,
  WritQuote,
  UrlLocator,
  User,
}

/// Parse a stored discriminator, failing loudly on values this build does not
/// know about.
pub fn parse_discriminator<T: FromStr>(
  enum_name: &'static str,
  value: &str,
) -> Result<T> {
  value.parse().map_err(|_| Error::ExhaustedEnum {
    enum_name,
    value: value.to_owned(),
  })
}

// ─── People ──────────────────────────────────────────────────────────────────

/// The display-facing slice of a user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBlurb {
  pub user_id:   i64,
  pub long_name: String,
}

/// A person or organization that can be a statement's speaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persorg {
  pub persorg_id:      i64,
  pub name:            String,
  pub is_organization: bool,
}

// ─── Propositions and statements ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposition {
  pub proposition_id:  i64,
  pub text:            String,
  pub creator_user_id: i64,
  pub created:         DateTime<Utc>,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SentenceType {
  Proposition,
  Statement,
}

/// What a statement asserts was said: a proposition, or another statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sentence {
  Proposition(EntityOrRef<Proposition>),
  Statement(EntityOrRef<Box<Statement>>),
}

/// A persorg saying a sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
  pub statement_id:    i64,
  pub speaker:         Persorg,
  pub sentence:        Sentence,
  pub creator_user_id: i64,
  pub created:         DateTime<Utc>,
}

// ─── Writs and URLs ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Writ {
  pub writ_id: i64,
  pub title:   String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Url {
  pub url_id: i64,
  pub url:    String,
}

/// A text-quote anchor locating a quotation within a fetched page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlTargetAnchor {
  pub exact_text:   String,
  pub prefix_text:  String,
  pub suffix_text:  String,
  pub start_offset: i64,
  pub end_offset:   i64,
}

/// Where on a URL a writ quote was confirmed to appear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlTarget {
  pub url_target_id: i64,
  pub writ_quote_id: i64,
  pub url_id:        i64,
  pub anchors:       Vec<UrlTargetAnchor>,
}

/// A URL attached to a writ quote, plus its confirmed target if one exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WritQuoteUrl {
  pub url:    Url,
  pub target: Option<UrlTarget>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WritQuote {
  pub writ_quote_id:   i64,
  pub quote_text:      String,
  pub writ:            Writ,
  pub creator_user_id: i64,
  pub created:         DateTime<Utc>,
  /// Only populated when the read asked for URLs.
  pub urls:            Option<Vec<WritQuoteUrl>>,
}

// ─── Media excerpts ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlLocator {
  pub url_locator_id:           i64,
  pub url:                      Url,
  pub auto_confirmation_status: AutoConfirmationStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
  pub source_id:   i64,
  pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaExcerptCitation {
  pub source:  Source,
  pub pincite: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaExcerpt {
  pub media_excerpt_id: i64,
  pub quotation:        String,
  pub creator_user_id:  i64,
  pub created:          DateTime<Utc>,
  pub url_locators:     Vec<UrlLocator>,
  pub citations:        Vec<MediaExcerptCitation>,
}

// ─── Paraphrases ─────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceExcerptType {
  WritQuote,
  MediaExcerpt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceExcerpt {
  WritQuote(EntityOrRef<WritQuote>),
  MediaExcerpt(EntityOrRef<Arc<MediaExcerpt>>),
}

/// A proposition restating what a source excerpt says.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceExcerptParaphrase {
  pub source_excerpt_paraphrase_id: i64,
  pub paraphrasing_proposition:     EntityOrRef<Proposition>,
  pub source_excerpt:               SourceExcerpt,
}

// ─── Compounds ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropositionCompoundAtom {
  pub proposition:    Proposition,
  pub order_position: i64,
}

/// Propositions used together as a single basis, in `order_position` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropositionCompound {
  pub proposition_compound_id: i64,
  pub creator_user_id:         i64,
  pub created:                 DateTime<Utc>,
  pub atoms:                   Vec<PropositionCompoundAtom>,
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BasisCompoundAtomType {
  Proposition,
  SourceExcerptParaphrase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BasisCompoundAtomEntity {
  Proposition(EntityOrRef<Proposition>),
  SourceExcerptParaphrase(EntityOrRef<SourceExcerptParaphrase>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JustificationBasisCompoundAtom {
  pub atom_id:        i64,
  pub entity:         BasisCompoundAtomEntity,
  pub order_position: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JustificationBasisCompound {
  pub justification_basis_compound_id: i64,
  pub creator_user_id:                 i64,
  pub created:                         DateTime<Utc>,
  pub atoms:                           Vec<JustificationBasisCompoundAtom>,
}
