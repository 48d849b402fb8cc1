//! Integration tests for `SqliteStore` against an in-memory database.

use std::sync::Arc;

use chrono::{FixedOffset, SecondsFormat, TimeZone, Utc};
use warrant_core::{
  auto_confirmation::{
    AutoConfirmationResultStatus, AutoConfirmationStatus, NewAutoConfirmationResult,
  },
  entity::{
    BasisCompoundAtomEntity, EntityKind, EntityOrRef, MediaExcerpt, Sentence, SourceExcerpt,
  },
  justification::{Justification, JustificationBasis, JustificationTarget, RootTarget},
  query::{
    FilterValue, JustificationFilterName, ReadJustificationsRequest, SortDescription,
    SortDirection,
  },
  store::ArgumentStore,
};

use crate::{Error, SqliteStore};

const FIXTURE: &str = "
INSERT INTO users (user_id, long_name, created) VALUES
  (1, 'Ada Lovelace',    '2024-01-01T00:00:00+00:00'),
  (2, 'Charles Babbage', '2024-01-01T00:00:00+00:00');

INSERT INTO persorgs (persorg_id, name, is_organization, created) VALUES
  (1, 'Royal Society', 1, '2024-01-01T00:00:00+00:00');

INSERT INTO propositions (proposition_id, text, creator_user_id, created) VALUES
  (1, 'The engine could compose music',  1, '2024-01-01T00:00:00+00:00'),
  (2, 'The engine manipulates symbols',  1, '2024-01-01T00:00:00+00:00'),
  (3, 'Music is a system of symbols',    2, '2024-01-01T00:00:00+00:00'),
  (4, 'The engine is a kind of loom',    2, '2024-01-01T00:00:00+00:00'),
  (5, 'The loom analogy is deliberate',  1, '2024-01-01T00:00:00+00:00');

INSERT INTO statements (
  statement_id, speaker_persorg_id, sentence_type, sentence_id, creator_user_id, created
) VALUES
  (1, 1, 'PROPOSITION', 4, 1, '2024-01-01T00:00:00+00:00');

INSERT INTO writs (writ_id, title, creator_user_id, created) VALUES
  (1, 'Sketch of the Analytical Engine', 1, '2024-01-01T00:00:00+00:00');

INSERT INTO writ_quotes (writ_quote_id, writ_id, quote_text, creator_user_id, created) VALUES
  (1, 1, 'weaves algebraical patterns', 1, '2024-01-01T00:00:00+00:00');

INSERT INTO urls (url_id, url, created) VALUES
  (1, 'https://example.org/sketch', '2024-01-01T00:00:00+00:00'),
  (2, 'https://example.org/notes',  '2024-01-01T00:00:00+00:00');

INSERT INTO writ_quote_urls (writ_quote_id, url_id, created) VALUES
  (1, 1, '2024-01-01T00:00:00+00:00'),
  (1, 2, '2024-01-01T00:00:00+00:00');

INSERT INTO writ_quote_url_targets (url_target_id, writ_quote_id, url_id, created) VALUES
  (1, 1, 1, '2024-01-01T00:00:00+00:00');

INSERT INTO writ_quote_url_target_anchors (
  anchor_id, url_target_id, exact_text, prefix_text, suffix_text, start_offset, end_offset
) VALUES
  (1, 1, 'weaves algebraical patterns', 'the engine ', ' just as', 120, 147);

INSERT INTO media_excerpts (media_excerpt_id, quotation, creator_user_id, created) VALUES
  (1, 'the engine weaves', 2, '2024-01-01T00:00:00+00:00');

INSERT INTO url_locators (url_locator_id, media_excerpt_id, url_id, created) VALUES
  (1, 1, 2, '2024-01-01T00:00:00+00:00');

INSERT INTO sources (source_id, description, created) VALUES
  (1, 'Notes by the Translator', '2024-01-01T00:00:00+00:00');

INSERT INTO media_excerpt_citations (media_excerpt_id, source_id, pincite, created) VALUES
  (1, 1, 'Note A', '2024-01-01T00:00:00+00:00');

INSERT INTO source_excerpt_paraphrases (
  source_excerpt_paraphrase_id, paraphrasing_proposition_id, source_excerpt_type,
  source_excerpt_id, creator_user_id, created
) VALUES
  (1, 5, 'MEDIA_EXCERPT', 1, 1, '2024-01-01T00:00:00+00:00');

INSERT INTO proposition_compounds (proposition_compound_id, creator_user_id, created) VALUES
  (1, 1, '2024-01-01T00:00:00+00:00');

INSERT INTO proposition_compound_atoms (
  proposition_compound_id, proposition_id, order_position
) VALUES
  (1, 2, 1),
  (1, 3, 0);

INSERT INTO justification_basis_compounds (
  justification_basis_compound_id, creator_user_id, created
) VALUES
  (1, 2, '2024-01-01T00:00:00+00:00');

INSERT INTO justification_basis_compound_atoms (
  justification_basis_compound_atom_id, justification_basis_compound_id, entity_type,
  entity_id, order_position
) VALUES
  (1, 1, 'SOURCE_EXCERPT_PARAPHRASE', 1, 1),
  (2, 1, 'PROPOSITION',               3, 0);

INSERT INTO justifications (
  justification_id, root_target_type, root_target_id, root_polarity, target_type, target_id,
  basis_type, basis_id, polarity, creator_user_id, created
) VALUES
  (1, 'PROPOSITION', 1, 'POSITIVE', 'PROPOSITION',   1, 'PROPOSITION_COMPOUND',         1,
      'POSITIVE', 1, '2024-01-01T00:00:01+00:00'),
  (2, 'PROPOSITION', 1, 'NEGATIVE', 'PROPOSITION',   1, 'WRIT_QUOTE',                   1,
      'NEGATIVE', 2, '2024-01-01T00:00:02+00:00'),
  (3, 'PROPOSITION', 4, 'POSITIVE', 'PROPOSITION',   4, 'MEDIA_EXCERPT',                1,
      'POSITIVE', 2, '2024-01-01T00:00:03+00:00'),
  (4, 'STATEMENT',   1, 'POSITIVE', 'STATEMENT',     1, 'JUSTIFICATION_BASIS_COMPOUND', 1,
      'POSITIVE', 1, '2024-01-01T00:00:04+00:00'),
  (5, 'PROPOSITION', 4, 'NEGATIVE', 'JUSTIFICATION', 3, 'PROPOSITION_COMPOUND',         1,
      'NEGATIVE', 1, '2024-01-01T00:00:05+00:00'),
  (6, 'PROPOSITION', 4, 'POSITIVE', 'JUSTIFICATION', 5, 'WRIT_QUOTE',                   1,
      'NEGATIVE', 2, '2024-01-01T00:00:06+00:00');
";

async fn store() -> SqliteStore {
  let s = SqliteStore::open_in_memory()
    .await
    .expect("in-memory store");
  exec(&s, FIXTURE).await;
  s
}

async fn exec(store: &SqliteStore, sql: &str) {
  let sql = sql.to_owned();
  store
    .conn
    .call(move |conn| {
      conn.execute_batch(&sql)?;
      Ok(())
    })
    .await
    .expect("fixture sql");
}

fn ids(page: &[Justification]) -> Vec<i64> { page.iter().map(|j| j.id).collect() }

fn filtered(name: JustificationFilterName, values: &[&str]) -> ReadJustificationsRequest {
  let values = values.iter().map(|v| v.to_string()).collect();
  ReadJustificationsRequest::new(50).with_filter(name, FilterValue::Many(values))
}

fn media_excerpt(basis: &JustificationBasis) -> &Arc<MediaExcerpt> {
  match basis {
    JustificationBasis::MediaExcerpt(EntityOrRef::Entity(me)) => me,
    other => panic!("expected hydrated media excerpt, got {other:?}"),
  }
}

fn target(j: &Justification) -> &Justification {
  match &j.target {
    JustificationTarget::Justification(EntityOrRef::Entity(t)) => t,
    other => panic!("expected hydrated target justification, got {other:?}"),
  }
}

// ─── Reading pages ───────────────────────────────────────────────────────────

#[tokio::test]
async fn unfiltered_read_returns_every_live_justification_by_id() {
  let s = store().await;
  let page = s.read_justifications(&ReadJustificationsRequest::new(50)).await.unwrap();
  assert_eq!(ids(&page), vec![1, 2, 3, 4, 5, 6]);
}

#[tokio::test]
async fn zero_count_reads_nothing() {
  let s = store().await;
  let page = s.read_justifications(&ReadJustificationsRequest::new(0)).await.unwrap();
  assert!(page.is_empty());
}

#[tokio::test]
async fn continuations_walk_the_full_sorted_set() {
  let s = store().await;
  let mut seen = Vec::new();
  let mut request = ReadJustificationsRequest::new(2)
    .with_sort(SortDescription::new("created", SortDirection::Desc));

  loop {
    let page = s.read_justifications(&request).await.unwrap();
    let Some(last) = page.last() else { break };
    assert!(page.len() <= 2);
    seen.extend(ids(&page));

    request.is_continuation = true;
    request.sorts = vec![
      SortDescription::new("created", SortDirection::Desc)
        .continuing_after(last.created.to_rfc3339()),
    ];
  }

  assert_eq!(seen, vec![6, 5, 4, 3, 2, 1]);
}

#[tokio::test]
async fn created_continuations_accept_any_spelling_of_the_boundary_instant() {
  let s = store().await;
  let first = ReadJustificationsRequest::new(2)
    .with_sort(SortDescription::new("created", SortDirection::Desc));
  let page = s.read_justifications(&first).await.unwrap();
  assert_eq!(ids(&page), vec![6, 5]);
  let boundary = page[1].created;

  let plus_one = FixedOffset::east_opt(3600).unwrap();
  for spelling in [
    boundary.to_rfc3339_opts(SecondsFormat::AutoSi, true),
    boundary.to_rfc3339_opts(SecondsFormat::Millis, true),
    boundary.with_timezone(&plus_one).to_rfc3339(),
  ] {
    let mut next = ReadJustificationsRequest::new(2);
    next.is_continuation = true;
    next.sorts =
      vec![SortDescription::new("created", SortDirection::Desc).continuing_after(spelling.clone())];
    let page = s.read_justifications(&next).await.unwrap();
    assert_eq!(ids(&page), vec![4, 3], "continuing after {spelling}");
  }
}

#[tokio::test]
async fn created_continuation_must_be_a_timestamp() {
  let s = store().await;
  let mut request = ReadJustificationsRequest::new(2);
  request.is_continuation = true;
  request.sorts =
    vec![SortDescription::new("created", SortDirection::Desc).continuing_after("yesterday")];
  let err = s.read_justifications(&request).await.unwrap_err();
  assert!(matches!(err, Error::Core(warrant_core::Error::InvalidSort(_))));
}

#[tokio::test]
async fn unknown_sort_property_is_rejected() {
  let s = store().await;
  let request = ReadJustificationsRequest::new(5)
    .with_sort(SortDescription::new("favouriteColour", SortDirection::Asc));
  let err = s.read_justifications(&request).await.unwrap_err();
  assert!(matches!(err, Error::Core(warrant_core::Error::InvalidSort(_))));
}

// ─── Filters ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn filters_widen_the_result() {
  let s = store().await;
  let request = filtered(JustificationFilterName::WritQuoteId, &["1"]).with_filter(
    JustificationFilterName::PropositionCompoundId,
    FilterValue::One("1".into()),
  );
  let page = s.read_justifications(&request).await.unwrap();
  assert_eq!(ids(&page), vec![1, 2, 5, 6]);
}

#[tokio::test]
async fn media_excerpt_filter_reaches_paraphrased_excerpts() {
  let s = store().await;
  let page = s
    .read_justifications(&filtered(JustificationFilterName::MediaExcerptId, &["1"]))
    .await
    .unwrap();
  assert_eq!(ids(&page), vec![3, 4]);
}

#[tokio::test]
async fn url_filter_matches_writ_quote_and_locator_urls() {
  let s = store().await;
  let page = s
    .read_justifications(&filtered(
      JustificationFilterName::Url,
      &["https://example.org/notes"],
    ))
    .await
    .unwrap();
  assert_eq!(ids(&page), vec![2, 3, 6]);
}

#[tokio::test]
async fn proposition_filter_reaches_compound_atoms_and_paraphrases() {
  let s = store().await;
  let page = s
    .read_justifications(&filtered(JustificationFilterName::PropositionId, &["3"]))
    .await
    .unwrap();
  assert_eq!(ids(&page), vec![1, 4, 5]);

  let page = s
    .read_justifications(&filtered(JustificationFilterName::PropositionId, &["5"]))
    .await
    .unwrap();
  assert_eq!(ids(&page), vec![4]);
}

#[tokio::test]
async fn writ_and_paraphrase_filters_follow_their_joins() {
  let s = store().await;
  let page = s
    .read_justifications(&filtered(JustificationFilterName::WritId, &["1"]))
    .await
    .unwrap();
  assert_eq!(ids(&page), vec![2, 6]);

  let page = s
    .read_justifications(&filtered(JustificationFilterName::SourceExcerptParaphraseId, &["1"]))
    .await
    .unwrap();
  assert_eq!(ids(&page), vec![4]);
}

#[tokio::test]
async fn filters_reach_writ_quotes_through_paraphrases() {
  let s = store().await;
  exec(&s, "
    INSERT INTO source_excerpt_paraphrases (
      source_excerpt_paraphrase_id, paraphrasing_proposition_id, source_excerpt_type,
      source_excerpt_id, creator_user_id, created
    ) VALUES (2, 2, 'WRIT_QUOTE', 1, 2, '2024-01-01T00:00:00+00:00');
    INSERT INTO justification_basis_compounds (
      justification_basis_compound_id, creator_user_id, created
    ) VALUES (2, 2, '2024-01-01T00:00:00+00:00');
    INSERT INTO justification_basis_compound_atoms (
      justification_basis_compound_atom_id, justification_basis_compound_id, entity_type,
      entity_id, order_position
    ) VALUES (3, 2, 'SOURCE_EXCERPT_PARAPHRASE', 2, 0);
    INSERT INTO justifications (
      justification_id, root_target_type, root_target_id, root_polarity, target_type,
      target_id, basis_type, basis_id, polarity, creator_user_id, created
    ) VALUES (7, 'PROPOSITION', 2, 'POSITIVE', 'PROPOSITION', 2,
              'JUSTIFICATION_BASIS_COMPOUND', 2, 'POSITIVE', 2, '2024-01-01T00:00:07+00:00');
  ").await;

  let page = s
    .read_justifications(&filtered(
      JustificationFilterName::Url,
      &["https://example.org/sketch"],
    ))
    .await
    .unwrap();
  assert_eq!(ids(&page), vec![2, 6, 7]);

  for name in [JustificationFilterName::WritQuoteId, JustificationFilterName::WritId] {
    let page = s.read_justifications(&filtered(name, &["1"])).await.unwrap();
    assert_eq!(ids(&page), vec![2, 6, 7], "{name}");
  }
}

#[tokio::test]
async fn non_integer_filter_ids_are_rejected() {
  let s = store().await;
  let err = s
    .read_justifications(&filtered(JustificationFilterName::PropositionId, &["four"]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(warrant_core::Error::InvalidFilter(_))));
}

// ─── Soft deletion ───────────────────────────────────────────────────────────

#[tokio::test]
async fn deleted_justifications_are_invisible() {
  let s = store().await;
  exec(&s, "UPDATE justifications SET deleted = '2024-02-01T00:00:00+00:00'
            WHERE justification_id = 2").await;

  let page = s.read_justifications(&ReadJustificationsRequest::new(50)).await.unwrap();
  assert_eq!(ids(&page), vec![1, 3, 4, 5, 6]);

  let err = s.read_justification(2).await.unwrap_err();
  assert!(err.is_not_found());
}

#[tokio::test]
async fn deleted_compound_members_are_skipped() {
  let s = store().await;
  exec(&s, "UPDATE propositions SET deleted = '2024-02-01T00:00:00+00:00'
            WHERE proposition_id = 2").await;

  let j = s.read_justification(1).await.unwrap();
  let JustificationBasis::PropositionCompound(EntityOrRef::Entity(compound)) = &j.basis else {
    panic!("expected hydrated proposition compound, got {:?}", j.basis);
  };
  let atoms: Vec<i64> = compound.atoms.iter().map(|a| a.proposition.proposition_id).collect();
  assert_eq!(atoms, vec![3]);
}

// ─── Hydration ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn proposition_compound_atoms_follow_order_position() {
  let s = store().await;
  let j = s.read_justification(1).await.unwrap();

  let JustificationBasis::PropositionCompound(EntityOrRef::Entity(compound)) = &j.basis else {
    panic!("expected hydrated proposition compound, got {:?}", j.basis);
  };
  let atoms: Vec<(i64, i64)> = compound
    .atoms
    .iter()
    .map(|a| (a.order_position, a.proposition.proposition_id))
    .collect();
  assert_eq!(atoms, vec![(0, 3), (1, 2)]);

  let JustificationTarget::Proposition(EntityOrRef::Entity(p)) = &j.target else {
    panic!("expected hydrated proposition target, got {:?}", j.target);
  };
  assert_eq!(p.text, "The engine could compose music");
  assert_eq!(
    j.creator.entity().map(|u| u.long_name.as_str()),
    Some("Ada Lovelace")
  );
}

#[tokio::test]
async fn statement_targets_and_basis_compounds_hydrate() {
  let s = store().await;
  let j = s.read_justification(4).await.unwrap();

  let JustificationTarget::Statement(EntityOrRef::Entity(statement)) = &j.target else {
    panic!("expected hydrated statement target, got {:?}", j.target);
  };
  assert_eq!(statement.speaker.name, "Royal Society");
  assert!(statement.speaker.is_organization);
  assert!(matches!(
    &statement.sentence,
    Sentence::Proposition(EntityOrRef::Entity(p)) if p.proposition_id == 4
  ));
  assert!(matches!(j.root_target, RootTarget::Statement(EntityOrRef::Entity(_))));

  let JustificationBasis::JustificationBasisCompound(EntityOrRef::Entity(compound)) = &j.basis
  else {
    panic!("expected hydrated basis compound, got {:?}", j.basis);
  };
  assert_eq!(compound.atoms.len(), 2);
  assert!(matches!(
    &compound.atoms[0].entity,
    BasisCompoundAtomEntity::Proposition(EntityOrRef::Entity(p)) if p.proposition_id == 3
  ));
  let BasisCompoundAtomEntity::SourceExcerptParaphrase(EntityOrRef::Entity(sep)) =
    &compound.atoms[1].entity
  else {
    panic!("expected hydrated paraphrase, got {:?}", compound.atoms[1].entity);
  };
  assert_eq!(sep.paraphrasing_proposition.entity().map(|p| p.proposition_id), Some(5));
  let SourceExcerpt::MediaExcerpt(EntityOrRef::Entity(me)) = &sep.source_excerpt else {
    panic!("expected hydrated media excerpt, got {:?}", sep.source_excerpt);
  };
  assert_eq!(me.quotation, "the engine weaves");
}

#[tokio::test]
async fn media_excerpts_carry_locators_and_citations() {
  let s = store().await;
  let j = s.read_justification(3).await.unwrap();
  let me = media_excerpt(&j.basis);

  assert_eq!(me.url_locators.len(), 1);
  assert_eq!(me.url_locators[0].url.url, "https://example.org/notes");
  assert_eq!(me.url_locators[0].auto_confirmation_status, AutoConfirmationStatus::NeverTried);
  assert_eq!(me.citations.len(), 1);
  assert_eq!(me.citations[0].source.description, "Notes by the Translator");
  assert_eq!(me.citations[0].pincite.as_deref(), Some("Note A"));
}

#[tokio::test]
async fn writ_quote_urls_load_only_when_requested() {
  let s = store().await;

  let plain = s.read_justification(2).await.unwrap();
  let JustificationBasis::WritQuote(EntityOrRef::Entity(wq)) = &plain.basis else {
    panic!("expected hydrated writ quote, got {:?}", plain.basis);
  };
  assert_eq!(wq.writ.title, "Sketch of the Analytical Engine");
  assert!(wq.urls.is_none());

  let mut request = filtered(JustificationFilterName::JustificationId, &["2"]);
  request.include_urls = true;
  let page = s.read_justifications(&request).await.unwrap();
  let JustificationBasis::WritQuote(EntityOrRef::Entity(wq)) = &page[0].basis else {
    panic!("expected hydrated writ quote, got {:?}", page[0].basis);
  };
  let urls = wq.urls.as_ref().expect("urls requested");
  assert_eq!(urls.len(), 2);

  let sketch = &urls[0];
  assert_eq!(sketch.url.url, "https://example.org/sketch");
  let anchors = &sketch.target.as_ref().expect("confirmed target").anchors;
  assert_eq!(anchors.len(), 1);
  assert_eq!(anchors[0].start_offset, 120);
  assert!(urls[1].target.is_none());
}

// ─── Counters and chains ─────────────────────────────────────────────────────

#[tokio::test]
async fn counters_attach_one_level_deep() {
  let s = store().await;
  let j = s.read_justification(3).await.unwrap();

  assert_eq!(ids(&j.counter_justifications), vec![5]);
  let counter = &j.counter_justifications[0];
  assert_eq!(counter.target, JustificationTarget::Justification(EntityOrRef::Ref(3)));
  assert!(counter.counter_justifications.is_empty());
}

#[tokio::test]
async fn target_chains_share_one_media_excerpt() {
  let s = store().await;
  let page = s
    .read_justifications(&filtered(JustificationFilterName::JustificationId, &["3", "6"]))
    .await
    .unwrap();
  assert_eq!(ids(&page), vec![3, 6]);

  let j6 = &page[1];
  let j5 = target(j6);
  let j3_via_chain = target(j5);
  assert_eq!(j5.id, 5);
  assert_eq!(j3_via_chain.id, 3);
  assert!(Arc::ptr_eq(
    media_excerpt(&page[0].basis),
    media_excerpt(&j3_via_chain.basis)
  ));
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_justification_is_not_found() {
  let s = store().await;
  let err = s.read_justification(404).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(warrant_core::Error::EntityNotFound { kind: EntityKind::Justification, id: 404 })
  ));
}

#[tokio::test]
async fn unknown_basis_type_is_an_exhausted_enum() {
  let s = store().await;
  exec(&s, "INSERT INTO justifications (
              justification_id, root_target_type, root_target_id, root_polarity, target_type,
              target_id, basis_type, basis_id, polarity, creator_user_id, created
            ) VALUES (7, 'PROPOSITION', 1, 'POSITIVE', 'PROPOSITION', 1, 'VIDEO_CLIP', 1,
                      'POSITIVE', 1, '2024-01-01T00:00:07+00:00')").await;

  let err = s.read_justification(7).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(warrant_core::Error::ExhaustedEnum { enum_name: "BasisType", .. })
  ));
}

#[tokio::test]
async fn batched_readers_insist_on_every_id() {
  let s = store().await;
  let err = s.read_user_blurbs_for_ids(&[1, 99]).await.unwrap_err();
  assert!(matches!(err, Error::Core(warrant_core::Error::Impossible(_))));

  let urls = s.read_urls_for_writ_quote_ids(&[1, 42]).await.unwrap();
  assert_eq!(urls[&1].len(), 2);
  assert!(urls[&42].is_empty());
}

// ─── Auto-confirmation ───────────────────────────────────────────────────────

fn attempt(second: u32, status: AutoConfirmationResultStatus) -> NewAutoConfirmationResult {
  NewAutoConfirmationResult {
    url_locator_id:  1,
    complete_at:     Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, second).unwrap(),
    status,
    quotation:       "the engine weaves".into(),
    found_quotation: matches!(status, AutoConfirmationResultStatus::Found)
      .then(|| "The engine weaves".into()),
    error_message:   None,
  }
}

#[tokio::test]
async fn recorded_results_drive_locator_status() {
  let s = store().await;
  assert_eq!(
    s.read_auto_confirmation_status(1).await.unwrap(),
    AutoConfirmationStatus::NeverTried
  );

  let recorded = s
    .record_auto_confirmation_result(attempt(1, AutoConfirmationResultStatus::NotFound))
    .await
    .unwrap();
  assert_eq!(recorded.url_locator_id, 1);
  assert!(matches!(
    s.read_auto_confirmation_status(1).await.unwrap(),
    AutoConfirmationStatus::NeverFound { .. }
  ));

  s.record_auto_confirmation_result(attempt(2, AutoConfirmationResultStatus::Found))
    .await
    .unwrap();
  let status = s.read_auto_confirmation_status(1).await.unwrap();
  assert!(matches!(
    &status,
    AutoConfirmationStatus::Found { found_quotation: Some(q), .. } if q == "The engine weaves"
  ));

  let j = s.read_justification(3).await.unwrap();
  assert_eq!(media_excerpt(&j.basis).url_locators[0].auto_confirmation_status, status);
}

#[tokio::test]
async fn results_for_unknown_locators_are_not_found() {
  let s = store().await;
  let mut input = attempt(1, AutoConfirmationResultStatus::Error);
  input.url_locator_id = 9;

  let err = s.record_auto_confirmation_result(input).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(warrant_core::Error::EntityNotFound { kind: EntityKind::UrlLocator, id: 9 })
  ));
  assert!(s.read_auto_confirmation_status(9).await.unwrap_err().is_not_found());
}
