//! Basic table operations
//!
//! Projection, derived columns, stable sorting and truncation: the glue that
//! follows a filter or an aggregation in every query.

use crate::error::{Error, Result};
use crate::table::{RowRef, Schema, Table};
use crate::value::Value;

/// Sort options for specifying column and direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOptions {
    /// Column name to sort by
    pub column: String,
    /// Whether to sort in descending order
    pub descending: bool,
}

impl SortOptions {
    /// Create ascending sort options for a column
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    /// Create descending sort options for a column
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }
}

/// Keep `columns`, in the given order
pub fn select(table: &Table, columns: &[String]) -> Result<Table> {
    let schema = select_schema(table.schema(), columns)?;
    let indices = table.schema().indices_of(columns, "select")?;
    let rows = table
        .raw_rows()
        .iter()
        .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
        .collect();
    Ok(Table::from_parts(schema, rows))
}

pub(crate) fn select_schema(schema: &Schema, columns: &[String]) -> Result<Schema> {
    schema.indices_of(columns, "select")?;
    Schema::new(columns.iter().cloned())
}

/// Append a column computed from each row, or replace it if `name` already exists
pub fn with_column<F>(table: &Table, name: &str, f: F) -> Result<Table>
where
    F: Fn(RowRef<'_>) -> Result<Value>,
{
    let schema = table.schema().with_column(name);
    let replace = table.schema().contains(name);
    let target = schema.index_of(name, "with_column")?;
    let mut rows = Vec::with_capacity(table.row_count());
    for row in table.rows() {
        let value = f(row)?;
        let mut out = row.values().to_vec();
        if replace {
            out[target] = value;
        } else {
            out.push(value);
        }
        rows.push(out);
    }
    Ok(Table::from_parts(schema, rows))
}

/// Stable multi-key sort. Missing sorts last in either direction.
pub fn sort_by(table: &Table, options: &[SortOptions]) -> Result<Table> {
    if options.is_empty() {
        return Err(Error::config("sort requires at least one key"));
    }
    let keys: Vec<(usize, bool)> = options
        .iter()
        .map(|o| Ok((table.schema().index_of(&o.column, "sort")?, o.descending)))
        .collect::<Result<_>>()?;

    let mut rows = table.raw_rows().to_vec();
    rows.sort_by(|a, b| {
        keys.iter()
            .map(|&(i, desc)| a[i].sort_cmp(&b[i], desc))
            .find(|o| o.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(Table::from_parts(table.schema().clone(), rows))
}

/// First `n` rows
#[must_use]
pub fn head(table: &Table, n: usize) -> Table {
    let rows = table.raw_rows().iter().take(n).cloned().collect();
    Table::from_parts(table.schema().clone(), rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table() -> Table {
        Table::from_rows(
            ["date", "city", "seconds"],
            vec![
                vec![Value::text("2001-01-01"), Value::text("a"), Value::Number(60.0)],
                vec![Value::text("2004-05-02"), Value::text("b"), Value::Missing],
                vec![Value::text("1999-12-31"), Value::text("c"), Value::Number(3600.0)],
                vec![Value::text("2004-05-02"), Value::text("d"), Value::Number(60.0)],
            ],
        )
        .unwrap()
    }

    fn cities(t: &Table) -> Vec<&str> {
        t.column("city")
            .unwrap()
            .into_iter()
            .map(|v| v.as_str().unwrap())
            .collect()
    }

    #[test]
    fn test_select_reorders_and_checks_columns() {
        let out = select(&table(), &["seconds".to_string(), "city".to_string()]).unwrap();
        assert_eq!(out.schema().names().collect::<Vec<_>>(), vec!["seconds", "city"]);
        assert_eq!(out.raw_rows()[0], vec![Value::Number(60.0), Value::text("a")]);

        let err = select(&table(), &["minutes".to_string()]).unwrap_err();
        assert_eq!(err, Error::unknown_column("minutes", "select"));
    }

    #[test]
    fn test_sort_desc_is_stable_with_missing_last() {
        let out = sort_by(&table(), &[SortOptions::desc("date")]).unwrap();
        assert_eq!(cities(&out), vec!["b", "d", "a", "c"]);

        let out = sort_by(&table(), &[SortOptions::desc("seconds")]).unwrap();
        assert_eq!(cities(&out), vec!["c", "a", "d", "b"]);

        let out = sort_by(&table(), &[SortOptions::asc("seconds")]).unwrap();
        assert_eq!(cities(&out), vec!["a", "d", "c", "b"]);
    }

    #[test]
    fn test_sort_multiple_keys() {
        let out = sort_by(
            &table(),
            &[SortOptions::asc("seconds"), SortOptions::desc("city")],
        )
        .unwrap();
        assert_eq!(cities(&out), vec!["d", "a", "c", "b"]);
    }

    #[test]
    fn test_with_column_appends_and_replaces() {
        let out = with_column(&table(), "minutes", |row| {
            Ok(row.get("seconds")?.div(60.0))
        })
        .unwrap();
        assert_eq!(
            out.column("minutes").unwrap(),
            vec![
                &Value::Number(1.0),
                &Value::Missing,
                &Value::Number(60.0),
                &Value::Number(1.0)
            ]
        );

        let replaced = with_column(&table(), "city", |_| Ok(Value::text("x"))).unwrap();
        assert_eq!(replaced.schema(), table().schema());
        assert_eq!(cities(&replaced), vec!["x", "x", "x", "x"]);
    }

    #[test]
    fn test_head() {
        assert_eq!(head(&table(), 2).row_count(), 2);
        assert_eq!(head(&table(), 10).row_count(), 4);
        assert!(head(&table(), 0).is_empty());
    }
}
