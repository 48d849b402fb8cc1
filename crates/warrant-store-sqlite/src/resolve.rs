//! Discriminator + id → tagged union.
//!
//! Stored discriminator strings are parsed once with
//! [`warrant_core::entity::parse_discriminator`]; everything here matches on
//! the parsed enums, so adding a basis or target kind fails to compile until
//! it is handled. Each resolver hydrates from the lookups it is given and
//! falls back to an id-only reference.

use std::{collections::HashMap, sync::Arc};

use warrant_core::{
  entity::{
    BasisCompoundAtomEntity, BasisCompoundAtomType, EntityOrRef, JustificationBasisCompound,
    MediaExcerpt, Proposition, PropositionCompound, Sentence, SentenceType, SourceExcerpt,
    SourceExcerptParaphrase, SourceExcerptType, Statement, WritQuote,
  },
  justification::{
    BasisType, Justification, JustificationBasis, JustificationTarget, RootTarget,
    RootTargetType, TargetType,
  },
};

fn lookup<'a, T>(map: Option<&'a HashMap<i64, T>>, id: i64) -> Option<&'a T> {
  map.and_then(|m| m.get(&id))
}

// ─── Basis ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy)]
pub struct BasisLookups<'a> {
  pub proposition_compounds:         Option<&'a HashMap<i64, PropositionCompound>>,
  pub writ_quotes:                   Option<&'a HashMap<i64, WritQuote>>,
  pub media_excerpts:                Option<&'a HashMap<i64, Arc<MediaExcerpt>>>,
  pub justification_basis_compounds: Option<&'a HashMap<i64, JustificationBasisCompound>>,
}

pub fn resolve_basis(
  basis_type: BasisType,
  basis_id: i64,
  lookups: &BasisLookups<'_>,
) -> JustificationBasis {
  match basis_type {
    BasisType::PropositionCompound => JustificationBasis::PropositionCompound(
      EntityOrRef::from_lookup(basis_id, lookup(lookups.proposition_compounds, basis_id)),
    ),
    BasisType::WritQuote => JustificationBasis::WritQuote(EntityOrRef::from_lookup(
      basis_id,
      lookup(lookups.writ_quotes, basis_id),
    )),
    BasisType::MediaExcerpt => JustificationBasis::MediaExcerpt(EntityOrRef::from_lookup(
      basis_id,
      lookup(lookups.media_excerpts, basis_id),
    )),
    BasisType::JustificationBasisCompound => {
      JustificationBasis::JustificationBasisCompound(EntityOrRef::from_lookup(
        basis_id,
        lookup(lookups.justification_basis_compounds, basis_id),
      ))
    }
  }
}

// ─── Targets ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy)]
pub struct TargetLookups<'a> {
  pub propositions:   Option<&'a HashMap<i64, Proposition>>,
  pub statements:     Option<&'a HashMap<i64, Statement>>,
  pub justifications: Option<&'a HashMap<i64, Justification>>,
}

pub fn resolve_target(
  target_type: TargetType,
  target_id: i64,
  lookups: &TargetLookups<'_>,
) -> JustificationTarget {
  match target_type {
    TargetType::Proposition => JustificationTarget::Proposition(EntityOrRef::from_lookup(
      target_id,
      lookup(lookups.propositions, target_id),
    )),
    TargetType::Statement => JustificationTarget::Statement(EntityOrRef::from_lookup(
      target_id,
      lookup(lookups.statements, target_id),
    )),
    TargetType::Justification => JustificationTarget::Justification(
      match lookup(lookups.justifications, target_id) {
        Some(justification) => EntityOrRef::Entity(Box::new(justification.clone())),
        None => EntityOrRef::Ref(target_id),
      },
    ),
  }
}

pub fn resolve_root_target(
  root_target_type: RootTargetType,
  root_target_id: i64,
  lookups: &TargetLookups<'_>,
) -> RootTarget {
  match root_target_type {
    RootTargetType::Proposition => RootTarget::Proposition(EntityOrRef::from_lookup(
      root_target_id,
      lookup(lookups.propositions, root_target_id),
    )),
    RootTargetType::Statement => RootTarget::Statement(EntityOrRef::from_lookup(
      root_target_id,
      lookup(lookups.statements, root_target_id),
    )),
  }
}

// ─── Compound atoms and excerpts ─────────────────────────────────────────────

pub fn resolve_atom_entity(
  entity_type: BasisCompoundAtomType,
  entity_id: i64,
  proposition: Option<&Proposition>,
  paraphrase: Option<&SourceExcerptParaphrase>,
) -> BasisCompoundAtomEntity {
  match entity_type {
    BasisCompoundAtomType::Proposition => {
      BasisCompoundAtomEntity::Proposition(EntityOrRef::from_lookup(entity_id, proposition))
    }
    BasisCompoundAtomType::SourceExcerptParaphrase => {
      BasisCompoundAtomEntity::SourceExcerptParaphrase(EntityOrRef::from_lookup(
        entity_id, paraphrase,
      ))
    }
  }
}

pub fn resolve_source_excerpt(
  source_excerpt_type: SourceExcerptType,
  source_excerpt_id: i64,
  writ_quote: Option<&WritQuote>,
  media_excerpts: Option<&HashMap<i64, Arc<MediaExcerpt>>>,
) -> SourceExcerpt {
  match source_excerpt_type {
    SourceExcerptType::WritQuote => {
      SourceExcerpt::WritQuote(EntityOrRef::from_lookup(source_excerpt_id, writ_quote))
    }
    SourceExcerptType::MediaExcerpt => SourceExcerpt::MediaExcerpt(EntityOrRef::from_lookup(
      source_excerpt_id,
      lookup(media_excerpts, source_excerpt_id),
    )),
  }
}

pub fn resolve_sentence(
  sentence_type: SentenceType,
  sentence_id: i64,
  proposition: Option<&Proposition>,
) -> Sentence {
  match sentence_type {
    SentenceType::Proposition => {
      Sentence::Proposition(EntityOrRef::from_lookup(sentence_id, proposition))
    }
    SentenceType::Statement => Sentence::Statement(EntityOrRef::Ref(sentence_id)),
  }
}
