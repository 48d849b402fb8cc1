//! Justifications: the edges of the argument graph.
//!
//! A justification links a basis (evidence) to a target with a polarity.
//! Targets may themselves be justifications (counter-justifications), so the
//! graph is a forest rooted at propositions and statements.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::entity::{
  EntityOrRef, JustificationBasisCompound, MediaExcerpt, Proposition,
  PropositionCompound, Statement, UserBlurb, WritQuote,
};

// ─── Discriminators ──────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Polarity {
  Positive,
  Negative,
}

impl Polarity {
  pub fn negate(self) -> Self {
    match self {
      Self::Positive => Self::Negative,
      Self::Negative => Self::Positive,
    }
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BasisType {
  PropositionCompound,
  WritQuote,
  MediaExcerpt,
  JustificationBasisCompound,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetType {
  Proposition,
  Statement,
  Justification,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RootTargetType {
  Proposition,
  Statement,
}

// ─── Tagged unions ───────────────────────────────────────────────────────────

/// The evidence a justification rests on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JustificationBasis {
  PropositionCompound(EntityOrRef<PropositionCompound>),
  WritQuote(EntityOrRef<WritQuote>),
  /// Shared between every node of one read that references the same excerpt.
  MediaExcerpt(EntityOrRef<Arc<MediaExcerpt>>),
  JustificationBasisCompound(EntityOrRef<JustificationBasisCompound>),
}

impl JustificationBasis {
  pub fn basis_type(&self) -> BasisType {
    match self {
      Self::PropositionCompound(_) => BasisType::PropositionCompound,
      Self::WritQuote(_) => BasisType::WritQuote,
      Self::MediaExcerpt(_) => BasisType::MediaExcerpt,
      Self::JustificationBasisCompound(_) => BasisType::JustificationBasisCompound,
    }
  }

  pub fn basis_id(&self) -> i64 {
    match self {
      Self::PropositionCompound(EntityOrRef::Entity(c)) => c.proposition_compound_id,
      Self::WritQuote(EntityOrRef::Entity(wq)) => wq.writ_quote_id,
      Self::MediaExcerpt(EntityOrRef::Entity(me)) => me.media_excerpt_id,
      Self::JustificationBasisCompound(EntityOrRef::Entity(c)) => {
        c.justification_basis_compound_id
      }
      Self::PropositionCompound(EntityOrRef::Ref(id))
      | Self::WritQuote(EntityOrRef::Ref(id))
      | Self::MediaExcerpt(EntityOrRef::Ref(id))
      | Self::JustificationBasisCompound(EntityOrRef::Ref(id)) => *id,
    }
  }
}

/// What a justification supports or opposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JustificationTarget {
  Proposition(EntityOrRef<Proposition>),
  Statement(EntityOrRef<Statement>),
  Justification(EntityOrRef<Box<Justification>>),
}

impl JustificationTarget {
  pub fn target_type(&self) -> TargetType {
    match self {
      Self::Proposition(_) => TargetType::Proposition,
      Self::Statement(_) => TargetType::Statement,
      Self::Justification(_) => TargetType::Justification,
    }
  }

  pub fn target_id(&self) -> i64 {
    match self {
      Self::Proposition(EntityOrRef::Entity(p)) => p.proposition_id,
      Self::Statement(EntityOrRef::Entity(s)) => s.statement_id,
      Self::Justification(EntityOrRef::Entity(j)) => j.id,
      Self::Proposition(EntityOrRef::Ref(id))
      | Self::Statement(EntityOrRef::Ref(id))
      | Self::Justification(EntityOrRef::Ref(id)) => *id,
    }
  }
}

/// The proposition or statement at the root of a justification chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RootTarget {
  Proposition(EntityOrRef<Proposition>),
  Statement(EntityOrRef<Statement>),
}

impl RootTarget {
  pub fn root_target_type(&self) -> RootTargetType {
    match self {
      Self::Proposition(_) => RootTargetType::Proposition,
      Self::Statement(_) => RootTargetType::Statement,
    }
  }

  pub fn root_target_id(&self) -> i64 {
    match self {
      Self::Proposition(EntityOrRef::Entity(p)) => p.proposition_id,
      Self::Statement(EntityOrRef::Entity(s)) => s.statement_id,
      Self::Proposition(EntityOrRef::Ref(id)) | Self::Statement(EntityOrRef::Ref(id)) => {
        *id
      }
    }
  }
}

// ─── Justification ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Justification {
  pub id:                     i64,
  pub root_target:            RootTarget,
  pub root_polarity:          Polarity,
  pub target:                 JustificationTarget,
  pub basis:                  JustificationBasis,
  pub polarity:               Polarity,
  pub creator:                EntityOrRef<UserBlurb>,
  pub created:                DateTime<Utc>,
  /// Justifications targeting this one, oldest first.
  pub counter_justifications: Vec<Justification>,
}

/// A broken polarity rule found by [`Justification::polarity_violation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolarityViolation {
  /// Targets the root directly but disagrees with its own root polarity.
  RootMismatch,
  /// Counters another justification without being negative.
  NonNegativeCounter,
  /// Root polarity is not the negation of the countered justification's.
  UnnegatedRootPolarity,
}

impl Justification {
  pub fn is_counter_justification(&self) -> bool {
    matches!(self.target, JustificationTarget::Justification(_))
  }

  /// Check the polarity rules against the hydrated graph. A justification
  /// whose target is only a reference is checked as far as it can be.
  pub fn polarity_violation(&self) -> Option<PolarityViolation> {
    match &self.target {
      JustificationTarget::Proposition(_) | JustificationTarget::Statement(_) => {
        (self.root_polarity != self.polarity).then_some(PolarityViolation::RootMismatch)
      }
      JustificationTarget::Justification(target) => {
        if self.polarity != Polarity::Negative {
          return Some(PolarityViolation::NonNegativeCounter);
        }
        match target {
          EntityOrRef::Entity(countered)
            if countered.root_polarity.negate() != self.root_polarity =>
          {
            Some(PolarityViolation::UnnegatedRootPolarity)
          }
          _ => None,
        }
      }
    }
  }
}
