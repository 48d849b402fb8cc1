//! Rebuild justifications from denormalized projection rows.
//!
//! A justification with a compound basis arrives as one row per atom, and
//! duplicate join rows may repeat an atom. The result holds exactly one
//! justification per id, in first-seen order, and one atom per
//! `(compound, entity)` pair, sorted by `order_position`.

use std::collections::{HashMap, hash_map::Entry};

use chrono::{DateTime, Utc};
use warrant_core::{
  entity::{
    BasisCompoundAtomType, EntityOrRef, JustificationBasisCompound,
    JustificationBasisCompoundAtom, PropositionCompound, PropositionCompoundAtom,
    SourceExcerptParaphrase, SourceExcerptType, WritQuote, parse_discriminator,
  },
  justification::{BasisType, Justification, Polarity, RootTargetType, TargetType},
};

use crate::{
  Result,
  encode::{RawBasisCompoundAtom, RawCompoundHeader, RawJustificationRow, decode_dt},
  resolve::{
    BasisLookups, TargetLookups, resolve_atom_entity, resolve_basis, resolve_root_target,
    resolve_source_excerpt, resolve_target,
  },
};

/// Reconstructed justifications in query order and keyed by id.
#[derive(Debug, Default)]
pub struct ReconstructedJustifications {
  pub ids:   Vec<i64>,
  pub by_id: HashMap<i64, Justification>,
}

impl ReconstructedJustifications {
  #[cfg(test)]
  pub fn into_ordered(mut self) -> Vec<Justification> {
    self.ids.iter().filter_map(|id| self.by_id.remove(id)).collect()
  }
}

// ─── Accumulators ────────────────────────────────────────────────────────────

/// The scalar columns of a justification, parsed once on first sight.
struct Shell {
  root_target_type: RootTargetType,
  root_target_id:   i64,
  root_polarity:    Polarity,
  target_type:      TargetType,
  target_id:        i64,
  basis_type:       BasisType,
  basis_id:         i64,
  polarity:         Polarity,
  creator_user_id:  i64,
  created:          DateTime<Utc>,
}

impl Shell {
  fn from_row(row: &RawJustificationRow) -> Result<Self> {
    Ok(Self {
      root_target_type: parse_discriminator("RootTargetType", &row.root_target_type)?,
      root_target_id:   row.root_target_id,
      root_polarity:    parse_discriminator("Polarity", &row.root_polarity)?,
      target_type:      parse_discriminator("TargetType", &row.target_type)?,
      target_id:        row.target_id,
      basis_type:       parse_discriminator("BasisType", &row.basis_type)?,
      basis_id:         row.basis_id,
      polarity:         parse_discriminator("Polarity", &row.polarity)?,
      creator_user_id:  row.creator_user_id,
      created:          decode_dt(&row.created)?,
    })
  }
}

struct CompoundAccumulator<K, A> {
  header: RawCompoundHeader,
  atoms:  HashMap<K, A>,
}

impl<K, A> CompoundAccumulator<K, A> {
  fn new(header: RawCompoundHeader) -> Self { Self { header, atoms: HashMap::new() } }
}

type PropositionCompoundAccumulator = CompoundAccumulator<i64, PropositionCompoundAtom>;
type BasisCompoundAccumulator =
  CompoundAccumulator<(BasisCompoundAtomType, i64), JustificationBasisCompoundAtom>;

/// Build one basis compound atom. `None` when the atom's entity was not
/// joined, which happens when it has been deleted.
fn basis_compound_atom(
  entity_type: BasisCompoundAtomType,
  raw: RawBasisCompoundAtom,
) -> Result<Option<JustificationBasisCompoundAtom>> {
  let entity = match entity_type {
    BasisCompoundAtomType::Proposition => {
      let Some(proposition) = raw.proposition else {
        return Ok(None);
      };
      let proposition = proposition.into_proposition()?;
      resolve_atom_entity(entity_type, raw.entity_id, Some(&proposition), None)
    }
    BasisCompoundAtomType::SourceExcerptParaphrase => {
      let Some(paraphrase) = raw.paraphrase else {
        return Ok(None);
      };
      let paraphrasing_proposition = paraphrase
        .paraphrasing_proposition
        .map(|p| p.into_proposition())
        .transpose()?;
      let source_excerpt_type: SourceExcerptType =
        parse_discriminator("SourceExcerptType", &paraphrase.source_excerpt_type)?;
      let writ_quote = paraphrase.writ_quote.map(|wq| wq.into_writ_quote()).transpose()?;
      let paraphrase = SourceExcerptParaphrase {
        source_excerpt_paraphrase_id: paraphrase.source_excerpt_paraphrase_id,
        paraphrasing_proposition:     EntityOrRef::from_lookup(
          paraphrase.paraphrasing_proposition_id,
          paraphrasing_proposition.as_ref(),
        ),
        source_excerpt:               resolve_source_excerpt(
          source_excerpt_type,
          paraphrase.source_excerpt_id,
          writ_quote.as_ref(),
          None,
        ),
      };
      resolve_atom_entity(entity_type, raw.entity_id, None, Some(&paraphrase))
    }
  };

  Ok(Some(JustificationBasisCompoundAtom {
    atom_id: raw.atom_id,
    entity,
    order_position: raw.order_position,
  }))
}

// ─── Reconstruction ──────────────────────────────────────────────────────────

/// Group projection rows into justifications. Targets, root targets,
/// creators and media excerpt bases are left as references for the
/// materializer to hydrate.
pub fn reconstruct_justifications(
  rows: Vec<RawJustificationRow>,
) -> Result<ReconstructedJustifications> {
  let mut ids = Vec::new();
  let mut shells: HashMap<i64, Shell> = HashMap::new();
  let mut proposition_compounds: HashMap<i64, PropositionCompoundAccumulator> = HashMap::new();
  let mut basis_compounds: HashMap<i64, BasisCompoundAccumulator> = HashMap::new();
  let mut writ_quotes: HashMap<i64, WritQuote> = HashMap::new();
  let row_count = rows.len();

  for row in rows {
    if let Entry::Vacant(slot) = shells.entry(row.justification_id) {
      slot.insert(Shell::from_row(&row)?);
      ids.push(row.justification_id);
    }

    if let Some(header) = row.proposition_compound {
      let compound = proposition_compounds
        .entry(header.compound_id)
        .or_insert_with(|| CompoundAccumulator::new(header));
      if let Some((order_position, proposition)) = row.pc_atom
        && let Entry::Vacant(slot) = compound.atoms.entry(proposition.proposition_id)
      {
        slot.insert(PropositionCompoundAtom {
          proposition: proposition.into_proposition()?,
          order_position,
        });
      }
    }

    if let Some(raw) = row.writ_quote
      && let Entry::Vacant(slot) = writ_quotes.entry(raw.writ_quote_id)
    {
      slot.insert(raw.into_writ_quote()?);
    }

    if let Some(header) = row.basis_compound {
      let compound = basis_compounds
        .entry(header.compound_id)
        .or_insert_with(|| CompoundAccumulator::new(header));
      if let Some(raw) = row.basis_compound_atom {
        let entity_type: BasisCompoundAtomType =
          parse_discriminator("BasisCompoundAtomType", &raw.entity_type)?;
        if let Entry::Vacant(slot) = compound.atoms.entry((entity_type, raw.entity_id)) {
          let atom_id = raw.atom_id;
          match basis_compound_atom(entity_type, raw)? {
            Some(atom) => {
              slot.insert(atom);
            }
            None => tracing::debug!(atom_id, "skipping basis compound atom without entity"),
          }
        }
      }
    }
  }

  let proposition_compounds: HashMap<i64, PropositionCompound> = proposition_compounds
    .into_iter()
    .map(|(id, compound)| -> Result<(i64, PropositionCompound)> {
      let mut atoms: Vec<_> = compound.atoms.into_values().collect();
      atoms.sort_by_key(|a| (a.order_position, a.proposition.proposition_id));
      Ok((id, PropositionCompound {
        proposition_compound_id: id,
        creator_user_id: compound.header.creator_user_id,
        created: decode_dt(&compound.header.created)?,
        atoms,
      }))
    })
    .collect::<Result<_>>()?;

  let basis_compounds: HashMap<i64, JustificationBasisCompound> = basis_compounds
    .into_iter()
    .map(|(id, compound)| -> Result<(i64, JustificationBasisCompound)> {
      let mut atoms: Vec<_> = compound.atoms.into_values().collect();
      atoms.sort_by_key(|a| (a.order_position, a.atom_id));
      Ok((id, JustificationBasisCompound {
        justification_basis_compound_id: id,
        creator_user_id: compound.header.creator_user_id,
        created: decode_dt(&compound.header.created)?,
        atoms,
      }))
    })
    .collect::<Result<_>>()?;

  let basis_lookups = BasisLookups {
    proposition_compounds: Some(&proposition_compounds),
    writ_quotes: Some(&writ_quotes),
    media_excerpts: None,
    justification_basis_compounds: Some(&basis_compounds),
  };
  let unresolved = TargetLookups::default();

  let by_id = shells
    .into_iter()
    .map(|(id, shell)| {
      let justification = Justification {
        id,
        root_target: resolve_root_target(
          shell.root_target_type,
          shell.root_target_id,
          &unresolved,
        ),
        root_polarity: shell.root_polarity,
        target: resolve_target(shell.target_type, shell.target_id, &unresolved),
        basis: resolve_basis(shell.basis_type, shell.basis_id, &basis_lookups),
        polarity: shell.polarity,
        creator: EntityOrRef::Ref(shell.creator_user_id),
        created: shell.created,
        counter_justifications: Vec::new(),
      };
      (id, justification)
    })
    .collect();

  tracing::debug!(rows = row_count, justifications = ids.len(), "reconstructed justifications");
  Ok(ReconstructedJustifications { ids, by_id })
}

#[cfg(test)]
mod tests {
  use warrant_core::{
    Error,
    entity::{BasisCompoundAtomEntity, SourceExcerpt},
    justification::{JustificationBasis, JustificationTarget, RootTarget},
  };

  use super::*;
  use crate::encode::{RawParaphrase, RawProposition, RawWritQuote};

  const CREATED: &str = "2024-03-01T09:00:00+00:00";

  fn row(id: i64, basis_type: &str, basis_id: i64) -> RawJustificationRow {
    RawJustificationRow {
      justification_id:     id,
      root_target_type:     "PROPOSITION".into(),
      root_target_id:       1,
      root_polarity:        "POSITIVE".into(),
      target_type:          "PROPOSITION".into(),
      target_id:            1,
      basis_type:           basis_type.into(),
      basis_id,
      polarity:             "POSITIVE".into(),
      creator_user_id:      1,
      created:              CREATED.into(),
      proposition_compound: None,
      pc_atom:              None,
      writ_quote:           None,
      basis_compound:       None,
      basis_compound_atom:  None,
    }
  }

  fn header(compound_id: i64) -> RawCompoundHeader {
    RawCompoundHeader { compound_id, creator_user_id: 1, created: CREATED.into() }
  }

  fn proposition(id: i64) -> RawProposition {
    RawProposition {
      proposition_id:  id,
      text:            format!("proposition {id}"),
      creator_user_id: 1,
      created:         CREATED.into(),
    }
  }

  fn pc_row(
    id: i64,
    compound_id: i64,
    order_position: i64,
    proposition_id: i64,
  ) -> RawJustificationRow {
    RawJustificationRow {
      proposition_compound: Some(header(compound_id)),
      pc_atom: Some((order_position, proposition(proposition_id))),
      ..row(id, "PROPOSITION_COMPOUND", compound_id)
    }
  }

  fn writ_quote(id: i64) -> RawWritQuote {
    RawWritQuote {
      writ_quote_id:   id,
      quote_text:      "It was the best of times".into(),
      creator_user_id: 1,
      created:         CREATED.into(),
      writ_id:         2,
      writ_title:      "A Tale of Two Cities".into(),
    }
  }

  #[test]
  fn duplicated_rows_collapse_into_ordered_justifications() {
    let rows = vec![
      pc_row(5, 10, 2, 102),
      pc_row(5, 10, 0, 100),
      RawJustificationRow {
        writ_quote: Some(writ_quote(30)),
        ..row(3, "WRIT_QUOTE", 30)
      },
      pc_row(5, 10, 1, 101),
      pc_row(5, 10, 0, 100),
    ];

    let reconstructed = reconstruct_justifications(rows).unwrap();
    assert_eq!(reconstructed.ids, vec![5, 3]);
    assert_eq!(reconstructed.by_id.len(), 2);

    let ordered = reconstructed.into_ordered();
    let JustificationBasis::PropositionCompound(EntityOrRef::Entity(compound)) =
      &ordered[0].basis
    else {
      panic!("expected hydrated proposition compound, got {:?}", ordered[0].basis);
    };
    let atom_ids: Vec<i64> =
      compound.atoms.iter().map(|a| a.proposition.proposition_id).collect();
    assert_eq!(atom_ids, vec![100, 101, 102]);

    assert!(matches!(
      &ordered[1].basis,
      JustificationBasis::WritQuote(EntityOrRef::Entity(wq))
        if wq.writ.title == "A Tale of Two Cities"
    ));
  }

  #[test]
  fn relations_start_as_references() {
    let reconstructed =
      reconstruct_justifications(vec![row(1, "MEDIA_EXCERPT", 40)]).unwrap();
    let j = &reconstructed.by_id[&1];
    assert_eq!(j.basis, JustificationBasis::MediaExcerpt(EntityOrRef::Ref(40)));
    assert_eq!(j.target, JustificationTarget::Proposition(EntityOrRef::Ref(1)));
    assert_eq!(j.root_target, RootTarget::Proposition(EntityOrRef::Ref(1)));
    assert_eq!(j.creator, EntityOrRef::Ref(1));
  }

  #[test]
  fn basis_compound_atoms_are_deduplicated_and_sorted() {
    let atom = |atom_id: i64, entity_type: &str, entity_id: i64, order_position: i64| {
      RawBasisCompoundAtom {
        atom_id,
        entity_type: entity_type.into(),
        entity_id,
        order_position,
        proposition: None,
        paraphrase: None,
      }
    };
    let jbc_row = |a: RawBasisCompoundAtom| RawJustificationRow {
      basis_compound: Some(header(20)),
      basis_compound_atom: Some(a),
      ..row(8, "JUSTIFICATION_BASIS_COMPOUND", 20)
    };

    let paraphrase = RawBasisCompoundAtom {
      paraphrase: Some(RawParaphrase {
        source_excerpt_paraphrase_id: 60,
        source_excerpt_type:          "WRIT_QUOTE".into(),
        source_excerpt_id:            30,
        paraphrasing_proposition_id:  61,
        paraphrasing_proposition:     Some(proposition(61)),
        writ_quote:                   Some(writ_quote(30)),
      }),
      ..atom(2, "SOURCE_EXCERPT_PARAPHRASE", 60, 0)
    };
    let kept = RawBasisCompoundAtom {
      proposition: Some(proposition(70)),
      ..atom(1, "PROPOSITION", 70, 1)
    };
    // A deleted proposition leaves the entity columns empty.
    let deleted = atom(3, "PROPOSITION", 71, 2);

    let rows = vec![
      jbc_row(kept.clone()),
      jbc_row(paraphrase.clone()),
      jbc_row(deleted),
      jbc_row(kept),
      jbc_row(paraphrase),
    ];
    let reconstructed = reconstruct_justifications(rows).unwrap();
    assert_eq!(reconstructed.ids, vec![8]);

    let JustificationBasis::JustificationBasisCompound(EntityOrRef::Entity(compound)) =
      &reconstructed.by_id[&8].basis
    else {
      panic!("expected hydrated basis compound");
    };
    assert_eq!(compound.atoms.len(), 2);
    assert_eq!(compound.atoms[0].atom_id, 2);
    assert_eq!(compound.atoms[1].atom_id, 1);

    let BasisCompoundAtomEntity::SourceExcerptParaphrase(EntityOrRef::Entity(sep)) =
      &compound.atoms[0].entity
    else {
      panic!("expected hydrated paraphrase");
    };
    assert!(sep.paraphrasing_proposition.is_hydrated());
    assert!(matches!(
      sep.source_excerpt,
      SourceExcerpt::WritQuote(EntityOrRef::Entity(ref wq)) if wq.writ_quote_id == 30
    ));
  }

  #[test]
  fn unknown_discriminators_fail_loudly() {
    let err = reconstruct_justifications(vec![row(1, "HEARSAY", 1)]).unwrap_err();
    assert!(matches!(
      err,
      crate::Error::Core(Error::ExhaustedEnum { enum_name: "BasisType", .. })
    ));
  }
}
