//! Filter fragments: one SELECT per way a justification can reach a filtered
//! entity.
//!
//! Every fragment projects `justification_id` followed by each sort column so
//! that the fragments can be combined with UNION and sorted outside it. All
//! fragments of all supplied filters are unioned, so supplying two filters
//! returns justifications matching either one.

use rusqlite::types::Value;
use warrant_core::{
  Error,
  entity::{BasisCompoundAtomType, SourceExcerptType},
  justification::BasisType,
  query::{FilterValue, JustificationFilterName, JustificationFilters},
};

use super::{
  args::{ArgList, SqlFragment},
  sort::SortColumn,
};
use crate::Result;

pub(crate) fn discriminator(value: impl Into<&'static str>) -> Value {
  Value::Text(value.into().to_owned())
}

/// `j.justification_id AS justification_id, j.created AS created, ...`
pub fn projection(columns: &[SortColumn]) -> String {
  let mut projected = vec!["j.justification_id AS justification_id".to_owned()];
  projected.extend(
    columns
      .iter()
      .filter(|c| c.column != "justification_id")
      .map(|c| format!("j.{0} AS {0}", c.column)),
  );
  projected.join(", ")
}

// ─── Derivation paths ────────────────────────────────────────────────────────

/// Joins from `justifications j` to the filtered entity, and the column the
/// filter values are matched against.
struct Path {
  joins:  String,
  column: &'static str,
}

type PathFn = fn(&mut ArgList) -> Path;

fn direct_id(_: &mut ArgList) -> Path {
  Path { joins: String::new(), column: "j.justification_id" }
}

fn proposition_compound_basis(args: &mut ArgList) -> Path {
  let pc = args.bind(discriminator(BasisType::PropositionCompound));
  Path {
    joins:  format!(
      "
       JOIN proposition_compounds pc
         ON j.basis_type = {pc}
        AND pc.proposition_compound_id = j.basis_id
        AND pc.deleted IS NULL"
    ),
    column: "pc.proposition_compound_id",
  }
}

fn proposition_compound_atom(args: &mut ArgList) -> Path {
  let Path { joins, .. } = proposition_compound_basis(args);
  Path {
    joins:  format!(
      "{joins}
       JOIN proposition_compound_atoms pca
         ON pca.proposition_compound_id = pc.proposition_compound_id
       JOIN propositions p
         ON p.proposition_id = pca.proposition_id
        AND p.deleted IS NULL"
    ),
    column: "p.proposition_id",
  }
}

fn basis_compound_atoms(args: &mut ArgList, atom_type: BasisCompoundAtomType) -> String {
  let jbc = args.bind(discriminator(BasisType::JustificationBasisCompound));
  let entity_type = args.bind(discriminator(atom_type));
  format!(
    "
     JOIN justification_basis_compounds jbc
       ON j.basis_type = {jbc}
      AND jbc.justification_basis_compound_id = j.basis_id
      AND jbc.deleted IS NULL
     JOIN justification_basis_compound_atoms jbca
       ON jbca.justification_basis_compound_id = jbc.justification_basis_compound_id
      AND jbca.entity_type = {entity_type}"
  )
}

fn basis_compound_proposition(args: &mut ArgList) -> Path {
  let atoms = basis_compound_atoms(args, BasisCompoundAtomType::Proposition);
  Path {
    joins:  format!(
      "{atoms}
       JOIN propositions p
         ON p.proposition_id = jbca.entity_id
        AND p.deleted IS NULL"
    ),
    column: "p.proposition_id",
  }
}

fn basis_compound_paraphrase(args: &mut ArgList) -> Path {
  let atoms = basis_compound_atoms(args, BasisCompoundAtomType::SourceExcerptParaphrase);
  Path {
    joins:  format!(
      "{atoms}
       JOIN source_excerpt_paraphrases sep
         ON sep.source_excerpt_paraphrase_id = jbca.entity_id
        AND sep.deleted IS NULL"
    ),
    column: "sep.source_excerpt_paraphrase_id",
  }
}

fn paraphrasing_proposition(args: &mut ArgList) -> Path {
  let Path { joins, .. } = basis_compound_paraphrase(args);
  Path {
    joins:  format!(
      "{joins}
       JOIN propositions p
         ON p.proposition_id = sep.paraphrasing_proposition_id
        AND p.deleted IS NULL"
    ),
    column: "p.proposition_id",
  }
}

fn writ_quote_basis(args: &mut ArgList) -> Path {
  let wq = args.bind(discriminator(BasisType::WritQuote));
  Path {
    joins:  format!(
      "
       JOIN writ_quotes wq
         ON j.basis_type = {wq}
        AND wq.writ_quote_id = j.basis_id
        AND wq.deleted IS NULL"
    ),
    column: "wq.writ_quote_id",
  }
}

fn paraphrased_writ_quote(args: &mut ArgList) -> Path {
  let Path { joins, .. } = basis_compound_paraphrase(args);
  let wq = args.bind(discriminator(SourceExcerptType::WritQuote));
  Path {
    joins:  format!(
      "{joins}
       JOIN writ_quotes wq
         ON sep.source_excerpt_type = {wq}
        AND wq.writ_quote_id = sep.source_excerpt_id
        AND wq.deleted IS NULL"
    ),
    column: "wq.writ_quote_id",
  }
}

fn with_writ(Path { joins, .. }: Path) -> Path {
  Path {
    joins:  format!(
      "{joins}
       JOIN writs w
         ON w.writ_id = wq.writ_id
        AND w.deleted IS NULL"
    ),
    column: "w.writ_id",
  }
}

fn writ_quote_basis_writ(args: &mut ArgList) -> Path { with_writ(writ_quote_basis(args)) }

fn paraphrased_writ_quote_writ(args: &mut ArgList) -> Path {
  with_writ(paraphrased_writ_quote(args))
}

fn media_excerpt_basis(args: &mut ArgList) -> Path {
  let me = args.bind(discriminator(BasisType::MediaExcerpt));
  Path {
    joins:  format!(
      "
       JOIN media_excerpts me
         ON j.basis_type = {me}
        AND me.media_excerpt_id = j.basis_id
        AND me.deleted IS NULL"
    ),
    column: "me.media_excerpt_id",
  }
}

fn paraphrased_media_excerpt(args: &mut ArgList) -> Path {
  let Path { joins, .. } = basis_compound_paraphrase(args);
  let me = args.bind(discriminator(SourceExcerptType::MediaExcerpt));
  Path {
    joins:  format!(
      "{joins}
       JOIN media_excerpts me
         ON sep.source_excerpt_type = {me}
        AND me.media_excerpt_id = sep.source_excerpt_id
        AND me.deleted IS NULL"
    ),
    column: "me.media_excerpt_id",
  }
}

fn with_writ_quote_url(Path { joins, .. }: Path) -> Path {
  Path {
    joins:  format!(
      "{joins}
       JOIN writ_quote_urls wqu
         ON wqu.writ_quote_id = wq.writ_quote_id
        AND wqu.deleted IS NULL
       JOIN urls u
         ON u.url_id = wqu.url_id
        AND u.deleted IS NULL"
    ),
    column: "u.url",
  }
}

fn writ_quote_basis_url(args: &mut ArgList) -> Path {
  with_writ_quote_url(writ_quote_basis(args))
}

fn paraphrased_writ_quote_url(args: &mut ArgList) -> Path {
  with_writ_quote_url(paraphrased_writ_quote(args))
}

fn media_excerpt_basis_url(args: &mut ArgList) -> Path {
  let Path { joins, .. } = media_excerpt_basis(args);
  Path {
    joins:  format!(
      "{joins}
       JOIN url_locators ul
         ON ul.media_excerpt_id = me.media_excerpt_id
        AND ul.deleted IS NULL
       JOIN urls u
         ON u.url_id = ul.url_id
        AND u.deleted IS NULL"
    ),
    column: "u.url",
  }
}

/// Every way a justification can reach an entity of the filtered kind.
fn derivation_paths(name: JustificationFilterName) -> &'static [PathFn] {
  match name {
    JustificationFilterName::JustificationId => &[direct_id],
    JustificationFilterName::PropositionId => &[
      proposition_compound_atom,
      basis_compound_proposition,
      paraphrasing_proposition,
    ],
    JustificationFilterName::PropositionCompoundId => &[proposition_compound_basis],
    JustificationFilterName::MediaExcerptId => {
      &[media_excerpt_basis, paraphrased_media_excerpt]
    }
    JustificationFilterName::WritQuoteId => &[writ_quote_basis, paraphrased_writ_quote],
    JustificationFilterName::WritId => {
      &[writ_quote_basis_writ, paraphrased_writ_quote_writ]
    }
    JustificationFilterName::SourceExcerptParaphraseId => &[basis_compound_paraphrase],
    JustificationFilterName::Url => &[
      writ_quote_basis_url,
      media_excerpt_basis_url,
      paraphrased_writ_quote_url,
    ],
  }
}

// ─── Compilation ─────────────────────────────────────────────────────────────

fn filter_values(name: JustificationFilterName, value: &FilterValue) -> Result<Vec<Value>> {
  let values = value.values();
  if values.is_empty() {
    return Err(Error::InvalidFilter(format!("{name} has no values")).into());
  }
  values
    .iter()
    .map(|raw| {
      if !name.takes_ids() {
        return Ok(Value::Text(raw.clone()));
      }
      raw.trim().parse::<i64>().map(Value::Integer).map_err(|_| {
        Error::InvalidFilter(format!("{name} expects integer ids, got {raw:?}")).into()
      })
    })
    .collect()
}

/// Compile one fragment per derivation path of every supplied filter, or a
/// single all-justifications fragment when there are no filters.
pub fn compile_filter_fragments(
  filters: &JustificationFilters,
  columns: &[SortColumn],
) -> Result<Vec<SqlFragment>> {
  let projection = projection(columns);

  if filters.is_empty() {
    return Ok(vec![SqlFragment::new(
      format!("SELECT {projection} FROM justifications j WHERE j.deleted IS NULL"),
      Vec::new(),
    )]);
  }

  let mut fragments = Vec::new();
  for (&name, value) in filters {
    let values = filter_values(name, value)?;
    for path_fn in derivation_paths(name) {
      let mut args = ArgList::new();
      let Path { joins, column } = path_fn(&mut args);
      let list = args.bind_all(values.iter().cloned());
      fragments.push(args.finish(format!(
        "SELECT DISTINCT {projection}
       FROM justifications j{joins}
      WHERE j.deleted IS NULL
        AND {column} IN ({list})"
      )));
    }
  }

  tracing::debug!(
    filters = filters.len(),
    fragments = fragments.len(),
    "compiled justification filter fragments"
  );
  Ok(fragments)
}
