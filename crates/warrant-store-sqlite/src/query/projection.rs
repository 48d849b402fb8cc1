//! Outer queries that reuse the candidate-id query.
//!
//! Each projection binds its own discriminator arguments first and then
//! splices the candidate SQL after them.

use warrant_core::{
  entity::{BasisCompoundAtomType, SourceExcerptType},
  justification::{BasisType, RootTargetType, TargetType},
};

use super::{
  args::{ArgList, SqlFragment},
  filter::discriminator,
  sort::{SortColumn, order_by_clause},
};

/// Columns read by [`crate::encode::RawJustificationRow`]. Basis columns are
/// type-guarded so only the matching kind's columns are non-null; compound
/// bases repeat the justification columns once per atom.
const JUSTIFICATION_COLUMNS: &str = "
         j.justification_id, j.root_target_type, j.root_target_id, j.root_polarity,
         j.target_type, j.target_id, j.basis_type, j.basis_id, j.polarity,
         j.creator_user_id, j.created,
         pc.proposition_compound_id AS pc_id,
         pc.creator_user_id         AS pc_creator_user_id,
         pc.created                 AS pc_created,
         pca.order_position         AS pca_order_position,
         pcap.proposition_id        AS pcap_id,
         pcap.text                  AS pcap_text,
         pcap.creator_user_id       AS pcap_creator_user_id,
         pcap.created               AS pcap_created,
         wq.writ_quote_id           AS wq_id,
         wq.quote_text              AS wq_quote_text,
         wq.creator_user_id         AS wq_creator_user_id,
         wq.created                 AS wq_created,
         w.writ_id                  AS wq_writ_id,
         w.title                    AS wq_writ_title,
         jbc.justification_basis_compound_id    AS jbc_id,
         jbc.creator_user_id                    AS jbc_creator_user_id,
         jbc.created                            AS jbc_created,
         jbca.justification_basis_compound_atom_id AS jbca_id,
         jbca.entity_type                       AS jbca_entity_type,
         jbca.entity_id                         AS jbca_entity_id,
         jbca.order_position                    AS jbca_order_position,
         jbcap.proposition_id       AS jbcap_id,
         jbcap.text                 AS jbcap_text,
         jbcap.creator_user_id      AS jbcap_creator_user_id,
         jbcap.created              AS jbcap_created,
         sep.source_excerpt_paraphrase_id AS sep_id,
         sep.source_excerpt_type          AS sep_source_excerpt_type,
         sep.source_excerpt_id            AS sep_source_excerpt_id,
         sep.paraphrasing_proposition_id  AS sep_paraphrasing_proposition_id,
         sepp.proposition_id        AS sepp_id,
         sepp.text                  AS sepp_text,
         sepp.creator_user_id       AS sepp_creator_user_id,
         sepp.created               AS sepp_created,
         sepwq.writ_quote_id        AS sepwq_id,
         sepwq.quote_text           AS sepwq_quote_text,
         sepwq.creator_user_id      AS sepwq_creator_user_id,
         sepwq.created              AS sepwq_created,
         sepw.writ_id               AS sepwq_writ_id,
         sepw.title                 AS sepwq_writ_title";

/// Full justification rows, with basis joins, for every id `source` selects.
fn justification_rows(source: &SqlFragment, order_by: &str) -> SqlFragment {
  let mut args = ArgList::new();
  let pc = args.bind(discriminator(BasisType::PropositionCompound));
  let wq = args.bind(discriminator(BasisType::WritQuote));
  let jbc = args.bind(discriminator(BasisType::JustificationBasisCompound));
  let atom_proposition = args.bind(discriminator(BasisCompoundAtomType::Proposition));
  let atom_paraphrase =
    args.bind(discriminator(BasisCompoundAtomType::SourceExcerptParaphrase));
  let excerpt_wq = args.bind(discriminator(SourceExcerptType::WritQuote));
  let source_sql = args.splice(source);

  args.finish(format!(
    "SELECT {JUSTIFICATION_COLUMNS}
       FROM ({source_sql}) AS src
       JOIN justifications j
         ON j.justification_id = src.justification_id
        AND j.deleted IS NULL
       LEFT JOIN proposition_compounds pc
         ON j.basis_type = {pc}
        AND pc.proposition_compound_id = j.basis_id
        AND pc.deleted IS NULL
       LEFT JOIN proposition_compound_atoms pca
         ON pca.proposition_compound_id = pc.proposition_compound_id
       LEFT JOIN propositions pcap
         ON pcap.proposition_id = pca.proposition_id
        AND pcap.deleted IS NULL
       LEFT JOIN writ_quotes wq
         ON j.basis_type = {wq}
        AND wq.writ_quote_id = j.basis_id
        AND wq.deleted IS NULL
       LEFT JOIN writs w
         ON w.writ_id = wq.writ_id
        AND w.deleted IS NULL
       LEFT JOIN justification_basis_compounds jbc
         ON j.basis_type = {jbc}
        AND jbc.justification_basis_compound_id = j.basis_id
        AND jbc.deleted IS NULL
       LEFT JOIN justification_basis_compound_atoms jbca
         ON jbca.justification_basis_compound_id = jbc.justification_basis_compound_id
       LEFT JOIN propositions jbcap
         ON jbca.entity_type = {atom_proposition}
        AND jbcap.proposition_id = jbca.entity_id
        AND jbcap.deleted IS NULL
       LEFT JOIN source_excerpt_paraphrases sep
         ON jbca.entity_type = {atom_paraphrase}
        AND sep.source_excerpt_paraphrase_id = jbca.entity_id
        AND sep.deleted IS NULL
       LEFT JOIN propositions sepp
         ON sepp.proposition_id = sep.paraphrasing_proposition_id
        AND sepp.deleted IS NULL
       LEFT JOIN writ_quotes sepwq
         ON sep.source_excerpt_type = {excerpt_wq}
        AND sepwq.writ_quote_id = sep.source_excerpt_id
        AND sepwq.deleted IS NULL
       LEFT JOIN writs sepw
         ON sepw.writ_id = sepwq.writ_id
        AND sepw.deleted IS NULL
      ORDER BY {order_by}"
  ))
}

/// The page itself, in the requested order.
pub fn candidate_justification_rows(
  candidates: &SqlFragment,
  columns: &[SortColumn],
) -> SqlFragment {
  justification_rows(candidates, &order_by_clause(columns, "j"))
}

/// Every justification reachable from a candidate by following
/// JUSTIFICATION-typed targets, however deep.
pub fn target_justification_rows(candidates: &SqlFragment) -> SqlFragment {
  let mut args = ArgList::new();
  let justification = args.bind(discriminator(TargetType::Justification));
  let candidate_sql = args.splice(candidates);
  let source = args.finish(format!(
    "WITH RECURSIVE target_chain(justification_id) AS (
       SELECT tj.target_id
         FROM justifications tj
        WHERE tj.target_type = {justification}
          AND tj.justification_id IN ({candidate_sql})
       UNION
       SELECT tj.target_id
         FROM justifications tj
         JOIN target_chain tc ON tc.justification_id = tj.justification_id
        WHERE tj.target_type = {justification}
     )
     SELECT justification_id FROM target_chain"
  ));
  justification_rows(&source, "j.justification_id")
}

/// Live justifications countering a candidate, oldest first.
pub fn counter_justification_rows(candidates: &SqlFragment) -> SqlFragment {
  let mut args = ArgList::new();
  let justification = args.bind(discriminator(TargetType::Justification));
  let candidate_sql = args.splice(candidates);
  let source = args.finish(format!(
    "SELECT cj.justification_id
       FROM justifications cj
      WHERE cj.deleted IS NULL
        AND cj.target_type = {justification}
        AND cj.target_id IN ({candidate_sql})"
  ));
  justification_rows(&source, "j.created, j.justification_id")
}

/// Propositions that candidates target directly or have as their root.
pub fn target_proposition_rows(candidates: &SqlFragment) -> SqlFragment {
  let mut args = ArgList::new();
  let target = args.bind(discriminator(TargetType::Proposition));
  let targets_sql = args.splice(candidates);
  let root = args.bind(discriminator(RootTargetType::Proposition));
  let roots_sql = args.splice(candidates);
  args.finish(format!(
    "SELECT p.proposition_id, p.text, p.creator_user_id, p.created
       FROM propositions p
      WHERE p.deleted IS NULL
        AND p.proposition_id IN (
              SELECT j.target_id
                FROM justifications j
               WHERE j.target_type = {target}
                 AND j.justification_id IN ({targets_sql})
              UNION
              SELECT j.root_target_id
                FROM justifications j
               WHERE j.root_target_type = {root}
                 AND j.justification_id IN ({roots_sql})
            )"
  ))
}

#[cfg(test)]
mod tests {
  use rusqlite::types::Value;

  use super::*;

  fn candidates() -> SqlFragment {
    SqlFragment::new(
      "SELECT justification_id FROM justifications WHERE justification_id IN (?1, ?2)",
      vec![Value::Integer(1), Value::Integer(2)],
    )
  }

  #[test]
  fn projections_bind_discriminators_before_the_candidates() {
    let rows = target_justification_rows(&candidates());
    assert_eq!(rows.args.len(), 6 + 1 + 2);
    assert_eq!(rows.args[6], Value::Text("JUSTIFICATION".into()));
    assert_eq!(&rows.args[7..], &[Value::Integer(1), Value::Integer(2)]);
    assert!(rows.sql.contains("justification_id IN (?8, ?9)"));
  }

  #[test]
  fn target_propositions_splice_the_candidates_twice() {
    let rows = target_proposition_rows(&candidates());
    assert_eq!(
      rows.args,
      vec![
        Value::Text("PROPOSITION".into()),
        Value::Integer(1),
        Value::Integer(2),
        Value::Text("PROPOSITION".into()),
        Value::Integer(1),
        Value::Integer(2),
      ]
    );
    assert!(rows.sql.contains("IN (?2, ?3)"));
    assert!(rows.sql.contains("IN (?5, ?6)"));
  }
}
