//! Request types for [`ArgumentStore::read_justifications`].
//!
//! [`ArgumentStore::read_justifications`]: crate::store::ArgumentStore::read_justifications

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result};

/// Upper bound on the number of justifications returned by one read.
pub const MAX_JUSTIFICATION_COUNT: usize = 1024;

// ─── Filters ─────────────────────────────────────────────────────────────────

/// The entities a justification read can be filtered by.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum JustificationFilterName {
  JustificationId,
  PropositionId,
  PropositionCompoundId,
  MediaExcerptId,
  WritQuoteId,
  WritId,
  SourceExcerptParaphraseId,
  Url,
}

impl JustificationFilterName {
  /// Whether the filter's values are entity ids (as opposed to URL strings).
  pub fn takes_ids(self) -> bool { !matches!(self, Self::Url) }
}

/// One value or a list of values for a filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
  One(String),
  Many(Vec<String>),
}

impl FilterValue {
  pub fn values(&self) -> &[String] {
    match self {
      Self::One(value) => std::slice::from_ref(value),
      Self::Many(values) => values,
    }
  }
}

/// Filters keyed by name. Every supplied filter widens the result: a
/// justification matching any of them is returned.
pub type JustificationFilters = BTreeMap<JustificationFilterName, FilterValue>;

/// Parse `key=v1,v2` as used on the command line.
pub fn parse_filter_arg(arg: &str) -> Result<(JustificationFilterName, FilterValue)> {
  let (key, value) = arg
    .split_once('=')
    .ok_or_else(|| Error::InvalidFilter(format!("expected key=value, got {arg:?}")))?;
  let name: JustificationFilterName = key
    .parse()
    .map_err(|_| Error::InvalidFilter(format!("unknown filter {key:?}")))?;
  let mut values: Vec<String> = value.split(',').map(str::to_owned).collect();
  let value = if values.len() == 1 {
    FilterValue::One(values.remove(0))
  } else {
    FilterValue::Many(values)
  };
  Ok((name, value))
}

// ─── Sorting ─────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortDirection {
  #[default]
  #[strum(to_string = "asc", serialize = "ascending")]
  Asc,
  #[strum(to_string = "desc", serialize = "descending")]
  Desc,
}

/// One entry of an ordered sort specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDescription {
  /// A justification property, e.g. `created` or `id`.
  pub property:  String,
  /// Defaults to ascending.
  pub direction: Option<SortDirection>,
  /// The boundary row's value; only meaningful for continuations.
  pub value:     Option<String>,
}

impl SortDescription {
  pub fn new(property: impl Into<String>, direction: SortDirection) -> Self {
    Self { property: property.into(), direction: Some(direction), value: None }
  }

  pub fn continuing_after(mut self, value: impl Into<String>) -> Self {
    self.value = Some(value.into());
    self
  }

  /// Parse `property[:direction[:value]]`. The value may itself contain
  /// colons (timestamps do).
  pub fn parse_arg(arg: &str) -> Result<Self> {
    let mut parts = arg.splitn(3, ':');
    let property = parts
      .next()
      .filter(|p| !p.is_empty())
      .ok_or_else(|| Error::InvalidSort(format!("missing sort property in {arg:?}")))?;
    let direction = parts
      .next()
      .map(|d| {
        d.parse::<SortDirection>()
          .map_err(|_| Error::InvalidSort(format!("unknown sort direction {d:?}")))
      })
      .transpose()?;
    let value = parts.next().map(str::to_owned);
    Ok(Self { property: property.to_owned(), direction, value })
  }
}

// ─── Request ─────────────────────────────────────────────────────────────────

/// Parameters for [`crate::store::ArgumentStore::read_justifications`].
#[derive(Debug, Clone, Default)]
pub struct ReadJustificationsRequest {
  pub filters:         JustificationFilters,
  /// Ordered sort specification; empty means ascending by id.
  pub sorts:           Vec<SortDescription>,
  /// Clamped to [`MAX_JUSTIFICATION_COUNT`].
  pub count:           usize,
  /// Return only rows strictly after the boundary given by the sort values.
  pub is_continuation: bool,
  /// Attach URLs (and confirmed URL targets) to writ quote bases.
  pub include_urls:    bool,
}

impl ReadJustificationsRequest {
  pub fn new(count: usize) -> Self { Self { count, ..Self::default() } }

  pub fn with_filter(
    mut self,
    name: JustificationFilterName,
    value: FilterValue,
  ) -> Self {
    self.filters.insert(name, value);
    self
  }

  pub fn with_sort(mut self, sort: SortDescription) -> Self {
    self.sorts.push(sort);
    self
  }

  pub fn effective_count(&self) -> usize { self.count.min(MAX_JUSTIFICATION_COUNT) }
}
