//! [`SqliteStore`], the SQLite implementation of [`ArgumentStore`].

use std::{
  collections::{BTreeSet, HashMap},
  path::Path,
  sync::Arc,
};

use rusqlite::{OptionalExtension as _, types::Value};
use warrant_core::{
  auto_confirmation::{
    AutoConfirmationResult, AutoConfirmationStatus, NewAutoConfirmationResult,
    derive_auto_confirmation_status,
  },
  entity::{
    EntityKind, MediaExcerpt, MediaExcerptCitation, Proposition, SentenceType, Source,
    Statement, Url, UrlLocator, UrlTarget, UserBlurb, WritQuoteUrl,
  },
  justification::Justification,
  query::{FilterValue, JustificationFilterName, ReadJustificationsRequest},
  store::ArgumentStore,
};

use crate::{
  Error, Result,
  encode::{
    AUTO_CONFIRMATION_RESULT_COLUMNS, RawAutoConfirmationResult, RawCitation,
    RawJustificationRow, RawMediaExcerpt, RawProposition, RawStatement, RawUrlLocator,
    RawUrlTargetAnchor, decode_dt, encode_dt, user_blurb_from_row,
  },
  materialize::{GraphLookups, JustificationIndex},
  query::{
    args::{ArgList, SqlFragment},
    filter::discriminator,
    limited::{LimitedJustifications, limited_justifications},
    projection::{
      candidate_justification_rows, counter_justification_rows, target_justification_rows,
      target_proposition_rows,
    },
  },
  reconstruct::{ReconstructedJustifications, reconstruct_justifications},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Warrant argument store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

/// Fail unless every requested id came back from a batched lookup.
fn ensure_all_found<V>(kind: EntityKind, ids: &[i64], found: &HashMap<i64, V>) -> Result<()> {
  match ids.iter().find(|id| !found.contains_key(id)) {
    Some(id) => Err(Error::impossible(format!("batched {kind} lookup is missing id {id}"))),
    None => Ok(()),
  }
}

fn id_args(ids: &[i64]) -> (ArgList, String) {
  let mut args = ArgList::new();
  let list = args.bind_all(ids.iter().copied().map(Value::Integer));
  (args, list)
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn query_justification_rows(
    &self,
    query: SqlFragment,
  ) -> Result<ReconstructedJustifications> {
    let raws: Vec<RawJustificationRow> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&query.sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(query.args.iter()),
            RawJustificationRow::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    reconstruct_justifications(raws)
  }

  async fn query_propositions(&self, query: SqlFragment) -> Result<HashMap<i64, Proposition>> {
    let raws: Vec<RawProposition> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&query.sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(query.args.iter()), RawProposition::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|raw| Ok((raw.proposition_id, raw.into_proposition()?)))
      .collect()
  }

  async fn url_locator_exists(&self, url_locator_id: i64) -> Result<bool> {
    let exists = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT 1 FROM url_locators WHERE url_locator_id = ?1 AND deleted IS NULL",
            rusqlite::params![url_locator_id],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false))
      })
      .await?;
    Ok(exists)
  }

  async fn read_auto_confirmation_history(
    &self,
    url_locator_ids: &[i64],
  ) -> Result<HashMap<i64, Vec<AutoConfirmationResult>>> {
    if url_locator_ids.is_empty() {
      return Ok(HashMap::new());
    }
    let (args, list) = id_args(url_locator_ids);
    let query = args.finish(format!(
      "SELECT {AUTO_CONFIRMATION_RESULT_COLUMNS}
         FROM url_locator_auto_confirmation_results
        WHERE url_locator_id IN ({list})
        ORDER BY complete_at, result_id"
    ));

    let raws: Vec<RawAutoConfirmationResult> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&query.sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(query.args.iter()),
            RawAutoConfirmationResult::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut history: HashMap<i64, Vec<AutoConfirmationResult>> = HashMap::new();
    for raw in raws {
      let result = raw.into_result()?;
      history.entry(result.url_locator_id).or_default().push(result);
    }
    Ok(history)
  }

  /// URLs and confirmed targets for each writ quote.
  async fn read_writ_quote_urls(
    &self,
    writ_quote_ids: &[i64],
  ) -> Result<HashMap<i64, Vec<WritQuoteUrl>>> {
    let urls = self.read_urls_for_writ_quote_ids(writ_quote_ids).await?;
    let pairs: Vec<(i64, i64)> = urls
      .iter()
      .flat_map(|(&wq_id, urls)| urls.iter().map(move |url| (wq_id, url.url_id)))
      .collect();
    let mut targets = self.read_url_targets_for_writ_quote_urls(&pairs).await?;

    Ok(
      urls
        .into_iter()
        .map(|(wq_id, urls)| {
          let urls = urls
            .into_iter()
            .map(|url| {
              let target = targets.remove(&(wq_id, url.url_id));
              WritQuoteUrl { url, target }
            })
            .collect();
          (wq_id, urls)
        })
        .collect(),
    )
  }

  /// Batched secondary lookups for everything `index` references.
  async fn load_graph_lookups(
    &self,
    index: &JustificationIndex,
    propositions: HashMap<i64, Proposition>,
    include_urls: bool,
  ) -> Result<GraphLookups> {
    let chains = index.media_excerpt_chains();
    let mut media_excerpt_ids: BTreeSet<i64> = chains.keys().copied().collect();
    media_excerpt_ids.extend(index.paraphrased_media_excerpt_ids());
    let media_excerpt_ids: Vec<i64> = media_excerpt_ids.into_iter().collect();

    let media_excerpts = self
      .read_media_excerpts_for_ids(&media_excerpt_ids)
      .await?
      .into_iter()
      .map(|(id, me)| (id, Arc::new(me)))
      .collect();
    let statements = self.read_statements_for_ids(&index.statement_ids()).await?;
    let users = self.read_user_blurbs_for_ids(&index.creator_ids()).await?;
    let writ_quote_urls = if include_urls {
      Some(self.read_writ_quote_urls(&index.writ_quote_ids()).await?)
    } else {
      None
    };

    Ok(GraphLookups {
      propositions,
      statements,
      media_excerpts,
      users,
      writ_quote_urls,
      chains,
    })
  }
}

// ─── ArgumentStore impl ──────────────────────────────────────────────────────

impl ArgumentStore for SqliteStore {
  type Error = Error;

  // ── Justifications ────────────────────────────────────────────────────────

  async fn read_justifications(
    &self,
    request: &ReadJustificationsRequest,
  ) -> Result<Vec<Justification>> {
    if request.effective_count() == 0 {
      return Ok(Vec::new());
    }

    let LimitedJustifications { candidates, columns } = limited_justifications(request)?;

    let primary = self
      .query_justification_rows(candidate_justification_rows(&candidates, &columns))
      .await?;
    if primary.ids.is_empty() {
      return Ok(Vec::new());
    }
    let targets = self
      .query_justification_rows(target_justification_rows(&candidates))
      .await?;
    let counters = self
      .query_justification_rows(counter_justification_rows(&candidates))
      .await?;
    let propositions = self.query_propositions(target_proposition_rows(&candidates)).await?;

    tracing::debug!(
      page = primary.ids.len(),
      targets = targets.ids.len(),
      counters = counters.ids.len(),
      propositions = propositions.len(),
      "loaded justification rows"
    );

    let index = JustificationIndex::new(primary, targets, counters);
    let lookups = self.load_graph_lookups(&index, propositions, request.include_urls).await?;
    index.assemble(&lookups)
  }

  async fn read_justification(&self, justification_id: i64) -> Result<Justification> {
    let request = ReadJustificationsRequest::new(1).with_filter(
      JustificationFilterName::JustificationId,
      FilterValue::One(justification_id.to_string()),
    );
    self
      .read_justifications(&request)
      .await?
      .into_iter()
      .next()
      .ok_or_else(|| Error::not_found(EntityKind::Justification, justification_id))
  }

  // ── Batched readers ───────────────────────────────────────────────────────

  async fn read_statements_for_ids(&self, ids: &[i64]) -> Result<HashMap<i64, Statement>> {
    if ids.is_empty() {
      return Ok(HashMap::new());
    }
    let mut args = ArgList::new();
    let proposition = args.bind(discriminator(SentenceType::Proposition));
    let list = args.bind_all(ids.iter().copied().map(Value::Integer));
    let query = args.finish(format!(
      "SELECT s.statement_id, s.sentence_type, s.sentence_id, s.creator_user_id, s.created,
              po.persorg_id, po.name AS persorg_name, po.is_organization,
              sp.proposition_id  AS sp_id,
              sp.text            AS sp_text,
              sp.creator_user_id AS sp_creator_user_id,
              sp.created         AS sp_created
         FROM statements s
         JOIN persorgs po
           ON po.persorg_id = s.speaker_persorg_id
          AND po.deleted IS NULL
         LEFT JOIN propositions sp
           ON s.sentence_type = {proposition}
          AND sp.proposition_id = s.sentence_id
          AND sp.deleted IS NULL
        WHERE s.deleted IS NULL
          AND s.statement_id IN ({list})"
    ));

    let raws: Vec<RawStatement> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&query.sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(query.args.iter()), RawStatement::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let statements = raws
      .into_iter()
      .map(|raw| Ok((raw.statement_id, raw.into_statement()?)))
      .collect::<Result<HashMap<_, _>>>()?;
    ensure_all_found(EntityKind::Statement, ids, &statements)?;
    Ok(statements)
  }

  async fn read_media_excerpts_for_ids(
    &self,
    ids: &[i64],
  ) -> Result<HashMap<i64, MediaExcerpt>> {
    if ids.is_empty() {
      return Ok(HashMap::new());
    }
    let (args, list) = id_args(ids);
    let ids_fragment = args.finish(list);

    let (excerpts, locators, citations) = self
      .conn
      .call(move |conn| {
        let params = || rusqlite::params_from_iter(ids_fragment.args.iter());
        let list = &ids_fragment.sql;

        let mut stmt = conn.prepare(&format!(
          "SELECT media_excerpt_id, quotation, creator_user_id, created
             FROM media_excerpts
            WHERE deleted IS NULL
              AND media_excerpt_id IN ({list})"
        ))?;
        let excerpts = stmt
          .query_map(params(), |row| {
            Ok(RawMediaExcerpt {
              media_excerpt_id: row.get(0)?,
              quotation:        row.get(1)?,
              creator_user_id:  row.get(2)?,
              created:          row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(&format!(
          "SELECT ul.url_locator_id, ul.media_excerpt_id, u.url_id, u.url
             FROM url_locators ul
             JOIN urls u
               ON u.url_id = ul.url_id
              AND u.deleted IS NULL
            WHERE ul.deleted IS NULL
              AND ul.media_excerpt_id IN ({list})
            ORDER BY ul.url_locator_id"
        ))?;
        let locators = stmt
          .query_map(params(), |row| {
            Ok(RawUrlLocator {
              url_locator_id:   row.get(0)?,
              media_excerpt_id: row.get(1)?,
              url:              Url { url_id: row.get(2)?, url: row.get(3)? },
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(&format!(
          "SELECT c.media_excerpt_id, s.source_id, s.description, c.pincite
             FROM media_excerpt_citations c
             JOIN sources s
               ON s.source_id = c.source_id
              AND s.deleted IS NULL
            WHERE c.deleted IS NULL
              AND c.media_excerpt_id IN ({list})
            ORDER BY c.media_excerpt_id, s.source_id"
        ))?;
        let citations = stmt
          .query_map(params(), |row| {
            Ok(RawCitation {
              media_excerpt_id: row.get(0)?,
              source_id:        row.get(1)?,
              description:      row.get(2)?,
              pincite:          row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((excerpts, locators, citations))
      })
      .await?;

    let locator_ids: Vec<i64> = locators.iter().map(|l| l.url_locator_id).collect();
    let mut history = self.read_auto_confirmation_history(&locator_ids).await?;

    let mut media_excerpts = excerpts
      .into_iter()
      .map(|raw| {
        Ok((raw.media_excerpt_id, MediaExcerpt {
          media_excerpt_id: raw.media_excerpt_id,
          quotation:        raw.quotation,
          creator_user_id:  raw.creator_user_id,
          created:          decode_dt(&raw.created)?,
          url_locators:     Vec::new(),
          citations:        Vec::new(),
        }))
      })
      .collect::<Result<HashMap<_, _>>>()?;

    for locator in locators {
      let attempts = history.remove(&locator.url_locator_id).unwrap_or_default();
      if let Some(me) = media_excerpts.get_mut(&locator.media_excerpt_id) {
        me.url_locators.push(UrlLocator {
          url_locator_id:           locator.url_locator_id,
          url:                      locator.url,
          auto_confirmation_status: derive_auto_confirmation_status(&attempts),
        });
      }
    }
    for citation in citations {
      if let Some(me) = media_excerpts.get_mut(&citation.media_excerpt_id) {
        me.citations.push(MediaExcerptCitation {
          source:  Source { source_id: citation.source_id, description: citation.description },
          pincite: citation.pincite,
        });
      }
    }

    ensure_all_found(EntityKind::MediaExcerpt, ids, &media_excerpts)?;
    tracing::debug!(count = media_excerpts.len(), "loaded media excerpts");
    Ok(media_excerpts)
  }

  async fn read_urls_for_writ_quote_ids(
    &self,
    writ_quote_ids: &[i64],
  ) -> Result<HashMap<i64, Vec<Url>>> {
    let mut urls: HashMap<i64, Vec<Url>> =
      writ_quote_ids.iter().map(|&id| (id, Vec::new())).collect();
    if writ_quote_ids.is_empty() {
      return Ok(urls);
    }
    let (args, list) = id_args(writ_quote_ids);
    let query = args.finish(format!(
      "SELECT wqu.writ_quote_id, u.url_id, u.url
         FROM writ_quote_urls wqu
         JOIN urls u
           ON u.url_id = wqu.url_id
          AND u.deleted IS NULL
        WHERE wqu.deleted IS NULL
          AND wqu.writ_quote_id IN ({list})
        ORDER BY wqu.writ_quote_id, u.url_id"
    ));

    let rows: Vec<(i64, Url)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&query.sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(query.args.iter()), |row| {
            Ok((row.get(0)?, Url { url_id: row.get(1)?, url: row.get(2)? }))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    for (writ_quote_id, url) in rows {
      urls.entry(writ_quote_id).or_default().push(url);
    }
    Ok(urls)
  }

  async fn read_url_targets_for_writ_quote_urls(
    &self,
    pairs: &[(i64, i64)],
  ) -> Result<HashMap<(i64, i64), UrlTarget>> {
    if pairs.is_empty() {
      return Ok(HashMap::new());
    }
    let mut args = ArgList::new();
    let values = pairs
      .iter()
      .map(|&(writ_quote_id, url_id)| {
        let wq = args.bind(Value::Integer(writ_quote_id));
        let url = args.bind(Value::Integer(url_id));
        format!("({wq}, {url})")
      })
      .collect::<Vec<_>>()
      .join(", ");
    // Newest target first; only the newest per pair is kept.
    let query = args.finish(format!(
      "SELECT t.url_target_id, t.writ_quote_id, t.url_id,
              a.exact_text, a.prefix_text, a.suffix_text, a.start_offset, a.end_offset
         FROM writ_quote_url_targets t
         LEFT JOIN writ_quote_url_target_anchors a
           ON a.url_target_id = t.url_target_id
          AND a.deleted IS NULL
        WHERE t.deleted IS NULL
          AND (t.writ_quote_id, t.url_id) IN (VALUES {values})
        ORDER BY t.url_target_id DESC, a.anchor_id"
    ));

    let rows: Vec<RawUrlTargetAnchor> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&query.sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(query.args.iter()),
            RawUrlTargetAnchor::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut targets: HashMap<(i64, i64), UrlTarget> = HashMap::new();
    for row in rows {
      let target = targets.entry((row.writ_quote_id, row.url_id)).or_insert_with(|| UrlTarget {
        url_target_id: row.url_target_id,
        writ_quote_id: row.writ_quote_id,
        url_id:        row.url_id,
        anchors:       Vec::new(),
      });
      if target.url_target_id == row.url_target_id
        && let Some(anchor) = row.anchor
      {
        target.anchors.push(anchor);
      }
    }
    Ok(targets)
  }

  async fn read_user_blurbs_for_ids(&self, ids: &[i64]) -> Result<HashMap<i64, UserBlurb>> {
    if ids.is_empty() {
      return Ok(HashMap::new());
    }
    let (args, list) = id_args(ids);
    let query = args.finish(format!(
      "SELECT user_id, long_name FROM users WHERE deleted IS NULL AND user_id IN ({list})"
    ));

    let blurbs: Vec<UserBlurb> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&query.sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(query.args.iter()), user_blurb_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let blurbs: HashMap<i64, UserBlurb> =
      blurbs.into_iter().map(|blurb| (blurb.user_id, blurb)).collect();
    ensure_all_found(EntityKind::User, ids, &blurbs)?;
    Ok(blurbs)
  }

  // ── Auto-confirmation ─────────────────────────────────────────────────────

  async fn record_auto_confirmation_result(
    &self,
    input: NewAutoConfirmationResult,
  ) -> Result<AutoConfirmationResult> {
    if !self.url_locator_exists(input.url_locator_id).await? {
      return Err(Error::not_found(EntityKind::UrlLocator, input.url_locator_id));
    }

    let url_locator_id  = input.url_locator_id;
    let complete_at_str = encode_dt(input.complete_at);
    let status_str      = input.status.to_string();
    let quotation       = input.quotation.clone();
    let found_quotation = input.found_quotation.clone();
    let error_message   = input.error_message.clone();

    let result_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO url_locator_auto_confirmation_results (
             url_locator_id, complete_at, status, quotation, found_quotation, error_message
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            url_locator_id,
            complete_at_str,
            status_str,
            quotation,
            found_quotation,
            error_message,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    tracing::debug!(
      url_locator_id,
      result_id,
      status = %input.status,
      "recorded auto-confirmation result"
    );

    Ok(AutoConfirmationResult {
      result_id,
      url_locator_id,
      complete_at: input.complete_at,
      status: input.status,
      quotation: input.quotation,
      found_quotation: input.found_quotation,
      error_message: input.error_message,
    })
  }

  async fn read_auto_confirmation_status(
    &self,
    url_locator_id: i64,
  ) -> Result<AutoConfirmationStatus> {
    if !self.url_locator_exists(url_locator_id).await? {
      return Err(Error::not_found(EntityKind::UrlLocator, url_locator_id));
    }
    let mut history = self.read_auto_confirmation_history(&[url_locator_id]).await?;
    let attempts = history.remove(&url_locator_id).unwrap_or_default();
    Ok(derive_auto_confirmation_status(&attempts))
  }
}
