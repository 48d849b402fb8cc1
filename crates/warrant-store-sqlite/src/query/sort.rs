//! ORDER BY and keyset-continuation clauses.
//!
//! A row whose value in any sort column is NULL is excluded from the result
//! altogether, so every clause here can assume non-null comparisons.

use rusqlite::types::Value;
use warrant_core::{
  Error,
  query::{SortDescription, SortDirection},
};

use super::args::{ArgList, SqlFragment};
use crate::{
  Result,
  encode::{decode_dt, encode_dt},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
  Integer,
  Text,
  /// Stored as `encode_dt` text; boundary values are re-encoded to match.
  Timestamp,
}

/// Columns of `justifications` that a read may be sorted by.
const SORTABLE_COLUMNS: &[(&str, ColumnKind)] = &[
  ("justification_id", ColumnKind::Integer),
  ("created", ColumnKind::Timestamp),
  ("polarity", ColumnKind::Text),
  ("root_polarity", ColumnKind::Text),
  ("root_target_type", ColumnKind::Text),
  ("root_target_id", ColumnKind::Integer),
  ("target_type", ColumnKind::Text),
  ("target_id", ColumnKind::Integer),
  ("basis_type", ColumnKind::Text),
  ("basis_id", ColumnKind::Integer),
  ("creator_user_id", ColumnKind::Integer),
];

/// A sort entry resolved to a concrete column.
#[derive(Debug, Clone, PartialEq)]
pub struct SortColumn {
  pub column:    &'static str,
  pub kind:      ColumnKind,
  pub direction: SortDirection,
  pub value:     Option<String>,
}

impl SortColumn {
  fn boundary_value(&self) -> Result<Value> {
    let raw = self.value.as_deref().ok_or_else(|| {
      Error::InvalidSort(format!("continuation is missing a value for {}", self.column))
    })?;
    match self.kind {
      ColumnKind::Text => Ok(Value::Text(raw.to_owned())),
      ColumnKind::Integer => raw.parse::<i64>().map(Value::Integer).map_err(|_| {
        Error::InvalidSort(format!("{} expects an integer, got {raw:?}", self.column)).into()
      }),
      ColumnKind::Timestamp => decode_dt(raw)
        .map(|dt| Value::Text(encode_dt(dt)))
        .map_err(|_| {
          Error::InvalidSort(format!("{} expects an RFC 3339 timestamp, got {raw:?}", self.column))
            .into()
        }),
    }
  }

  fn comparison(&self) -> &'static str {
    match self.direction {
      SortDirection::Asc => ">",
      SortDirection::Desc => "<",
    }
  }

  fn keyword(&self) -> &'static str {
    match self.direction {
      SortDirection::Asc => "ASC",
      SortDirection::Desc => "DESC",
    }
  }
}

/// `id` names the primary key; everything else is camelCase for a
/// snake_case column.
pub fn property_column_name(property: &str) -> String {
  if property == "id" {
    return "justification_id".to_owned();
  }
  let mut column = String::with_capacity(property.len() + 4);
  for c in property.chars() {
    if c.is_ascii_uppercase() {
      column.push('_');
      column.push(c.to_ascii_lowercase());
    } else {
      column.push(c);
    }
  }
  column
}

/// Resolve and validate a sort specification. An empty specification sorts
/// ascending by id.
pub fn resolve_sort_columns(sorts: &[SortDescription]) -> Result<Vec<SortColumn>> {
  if sorts.is_empty() {
    return Ok(vec![SortColumn {
      column:    "justification_id",
      kind:      ColumnKind::Integer,
      direction: SortDirection::Asc,
      value:     None,
    }]);
  }

  let mut columns: Vec<SortColumn> = Vec::with_capacity(sorts.len());
  for sort in sorts {
    let name = property_column_name(&sort.property);
    let &(column, kind) = SORTABLE_COLUMNS
      .iter()
      .find(|(column, _)| *column == name)
      .ok_or_else(|| Error::InvalidSort(format!("cannot sort by {:?}", sort.property)))?;
    if columns.iter().any(|c| c.column == column) {
      return Err(Error::InvalidSort(format!("{:?} is sorted twice", sort.property)).into());
    }
    columns.push(SortColumn {
      column,
      kind,
      direction: sort.direction.unwrap_or_default(),
      value: sort.value.clone(),
    });
  }
  Ok(columns)
}

/// `alias.column DIR, ...` in specification order.
pub fn order_by_clause(columns: &[SortColumn], alias: &str) -> String {
  columns
    .iter()
    .map(|c| format!("{alias}.{} {}", c.column, c.keyword()))
    .collect::<Vec<_>>()
    .join(", ")
}

/// The WHERE conditions for the sorted, optionally continued, read:
/// `IS NOT NULL` for every sort column and, for a continuation, the keyset
/// predicate selecting rows strictly after the boundary row.
pub fn sort_conditions(
  columns: &[SortColumn],
  alias: &str,
  is_continuation: bool,
) -> Result<SqlFragment> {
  let mut args = ArgList::new();
  let mut conditions: Vec<String> = columns
    .iter()
    .map(|c| format!("{alias}.{} IS NOT NULL", c.column))
    .collect();

  if is_continuation {
    // (c1 > v1) OR (c1 = v1 AND c2 > v2) OR ... with < for descending columns.
    let mut disjuncts = Vec::with_capacity(columns.len());
    for (k, column) in columns.iter().enumerate() {
      let mut conjuncts = Vec::with_capacity(k + 1);
      for prior in &columns[..k] {
        let placeholder = args.bind(prior.boundary_value()?);
        conjuncts.push(format!("{alias}.{} = {placeholder}", prior.column));
      }
      let placeholder = args.bind(column.boundary_value()?);
      conjuncts.push(format!(
        "{alias}.{} {} {placeholder}",
        column.column,
        column.comparison()
      ));
      disjuncts.push(format!("({})", conjuncts.join(" AND ")));
    }
    conditions.push(format!("({})", disjuncts.join(" OR ")));
  }

  Ok(args.finish(conditions.join(" AND ")))
}
