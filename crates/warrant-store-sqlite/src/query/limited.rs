//! The bounded candidate-id query shared by every projection of one read.

use rusqlite::types::Value;
use warrant_core::query::ReadJustificationsRequest;

use super::{
  args::{ArgList, SqlFragment},
  filter::compile_filter_fragments,
  sort::{SortColumn, order_by_clause, resolve_sort_columns, sort_conditions},
};
use crate::Result;

/// The candidate-id query and the sort columns it was ordered by.
#[derive(Debug, Clone)]
pub struct LimitedJustifications {
  /// Selects a single `justification_id` column, in result order.
  pub candidates: SqlFragment,
  pub columns:    Vec<SortColumn>,
}

/// `SELECT lj.justification_id FROM (f1 UNION f2 ...) lj WHERE ... ORDER BY ...
/// LIMIT n`.
pub fn limited_justifications(
  request: &ReadJustificationsRequest,
) -> Result<LimitedJustifications> {
  let columns = resolve_sort_columns(&request.sorts)?;
  let fragments = compile_filter_fragments(&request.filters, &columns)?;
  let conditions = sort_conditions(&columns, "lj", request.is_continuation)?;

  let mut args = ArgList::new();
  let union = fragments
    .iter()
    .map(|fragment| args.splice(fragment))
    .collect::<Vec<_>>()
    .join("\n      UNION\n      ");
  let where_sql = args.splice(&conditions);
  let limit = args.bind(Value::Integer(request.effective_count() as i64));

  let candidates = args.finish(format!(
    "SELECT lj.justification_id
       FROM (
      {union}
       ) AS lj
      WHERE {where_sql}
      ORDER BY {order_by}
      LIMIT {limit}",
    order_by = order_by_clause(&columns, "lj"),
  ));

  tracing::debug!(
    fragments = fragments.len(),
    args = candidates.args.len(),
    continuation = request.is_continuation,
    "assembled limited justification query"
  );
  Ok(LimitedJustifications { candidates, columns })
}

#[cfg(test)]
mod tests {
  use warrant_core::query::{
    FilterValue, JustificationFilterName, MAX_JUSTIFICATION_COUNT, SortDescription,
    SortDirection,
  };

  use super::*;

  #[test]
  fn unfiltered_query_limits_and_orders_by_id() {
    let limited = limited_justifications(&ReadJustificationsRequest::new(10)).unwrap();
    assert!(limited.candidates.sql.contains("ORDER BY lj.justification_id ASC"));
    assert!(limited.candidates.sql.contains("LIMIT ?1"));
    assert_eq!(limited.candidates.args, vec![Value::Integer(10)]);
  }

  #[test]
  fn fragments_are_unioned_and_arguments_follow_in_order() {
    let mut request = ReadJustificationsRequest::new(5)
      .with_filter(JustificationFilterName::JustificationId, FilterValue::One("7".into()))
      .with_filter(
        JustificationFilterName::PropositionCompoundId,
        FilterValue::One("3".into()),
      )
      .with_sort(SortDescription::new("id", SortDirection::Desc).continuing_after("20"));
    request.is_continuation = true;

    let limited = limited_justifications(&request).unwrap();
    let sql = &limited.candidates.sql;
    assert_eq!(sql.matches("UNION").count(), 1);
    assert!(sql.contains("j.justification_id IN (?1)"));
    assert!(sql.contains("pc.proposition_compound_id IN (?3)"));
    assert!(sql.contains("lj.justification_id < ?4"));
    assert!(sql.contains("LIMIT ?5"));
    assert_eq!(
      limited.candidates.args,
      vec![
        Value::Integer(7),
        Value::Text("PROPOSITION_COMPOUND".into()),
        Value::Integer(3),
        Value::Integer(20),
        Value::Integer(5),
      ]
    );
  }

  #[test]
  fn count_is_clamped() {
    let limited =
      limited_justifications(&ReadJustificationsRequest::new(1_000_000)).unwrap();
    assert_eq!(
      limited.candidates.args.last(),
      Some(&Value::Integer(MAX_JUSTIFICATION_COUNT as i64))
    );
  }
}
