//! Positional-argument bookkeeping for composed SQL.
//!
//! Fragments are written with their own `?1..?n` numbering. When one fragment
//! is embedded in a larger query that has already bound `k` arguments, its
//! placeholders are shifted by `k` and its arguments appended, so the composed
//! query binds `outer args ++ fragment args`.

use std::fmt::Write as _;

use rusqlite::types::Value;

// ─── Renumbering ─────────────────────────────────────────────────────────────

/// Shift every `?N` placeholder in `sql` up by `offset`. Text inside
/// single-quoted literals is left alone. An offset of zero returns the input
/// unchanged.
pub fn renumber_sql_args(sql: &str, offset: usize) -> String {
  if offset == 0 {
    return sql.to_owned();
  }

  let mut out = String::with_capacity(sql.len() + 8);
  let mut chars = sql.chars().peekable();
  let mut in_literal = false;

  while let Some(c) = chars.next() {
    if c == '\'' {
      in_literal = !in_literal;
      out.push(c);
      continue;
    }
    if in_literal || c != '?' {
      out.push(c);
      continue;
    }

    let mut digits = String::new();
    while let Some(&d) = chars.peek() {
      if !d.is_ascii_digit() {
        break;
      }
      digits.push(d);
      chars.next();
    }

    match digits.parse::<usize>() {
      Ok(index) => {
        let _ = write!(out, "?{}", index + offset);
      }
      // A bare `?` keeps its implicit numbering.
      Err(_) => out.push('?'),
    }
  }

  out
}

// ─── Fragments ───────────────────────────────────────────────────────────────

/// A SQL snippet and the arguments for its `?1..?n` placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlFragment {
  pub sql:  String,
  pub args: Vec<Value>,
}

impl SqlFragment {
  pub fn new(sql: impl Into<String>, args: Vec<Value>) -> Self {
    Self { sql: sql.into(), args }
  }
}

/// Accumulates arguments for a query under construction and hands back the
/// placeholders that refer to them.
#[derive(Debug, Default)]
pub struct ArgList {
  args: Vec<Value>,
}

impl ArgList {
  pub fn new() -> Self { Self::default() }

  /// Bind one argument and return its placeholder.
  pub fn bind(&mut self, value: Value) -> String {
    self.args.push(value);
    format!("?{}", self.args.len())
  }

  /// Bind a list of arguments and return their comma-separated placeholders,
  /// ready for an `IN (...)` list.
  pub fn bind_all(&mut self, values: impl IntoIterator<Item = Value>) -> String {
    values
      .into_iter()
      .map(|value| self.bind(value))
      .collect::<Vec<_>>()
      .join(", ")
  }

  /// Embed `fragment`: return its SQL renumbered past the arguments bound so
  /// far and append its arguments.
  pub fn splice(&mut self, fragment: &SqlFragment) -> String {
    let sql = renumber_sql_args(&fragment.sql, self.args.len());
    self.args.extend(fragment.args.iter().cloned());
    sql
  }

  pub fn finish(self, sql: String) -> SqlFragment { SqlFragment { sql, args: self.args } }
}
