//! Window ranking within partitions
//!
//! [`rank_within`] numbers the rows of every partition by a measure column and
//! [`top_k`] keeps the best `k` ranks of each partition. Ties are resolved by a
//! [`TieMethod`]; the default, [`TieMethod::Min`], gives tied rows the same rank
//! and skips the ranks they would otherwise have taken (`1, 1, 3`).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::ops::aggregate::{partition, MissingKeys};
use crate::table::{Schema, Table};
use crate::value::Value;

/// How tied rows are ranked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieMethod {
    /// Lowest rank of the tie run; ranks skip afterwards
    #[default]
    Min,
    /// Lowest rank of the tie run; ranks do not skip
    Dense,
    /// Highest rank of the tie run
    Max,
    /// Position in the ordering, ties broken by original row order
    First,
}

impl FromStr for TieMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min" => Ok(TieMethod::Min),
            "dense" => Ok(TieMethod::Dense),
            "max" => Ok(TieMethod::Max),
            "first" => Ok(TieMethod::First),
            other => Err(Error::config(format!("unknown tie method '{other}'"))),
        }
    }
}

impl fmt::Display for TieMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TieMethod::Min => "min",
            TieMethod::Dense => "dense",
            TieMethod::Max => "max",
            TieMethod::First => "first",
        })
    }
}

/// Ranking configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankOptions {
    /// Partition columns; empty ranks the whole table as one partition
    pub group_columns: Vec<String>,
    /// Column whose values order each partition
    pub measure: String,
    /// Tie resolution
    pub method: TieMethod,
    /// Rank largest values first
    pub descending: bool,
    /// Name of the appended rank column
    pub output: String,
}

impl RankOptions {
    /// Ascending min-rank of `measure` within `group_columns`, written to `rank`
    pub fn new(group_columns: Vec<String>, measure: impl Into<String>) -> Self {
        Self {
            group_columns,
            measure: measure.into(),
            method: TieMethod::Min,
            descending: false,
            output: "rank".to_string(),
        }
    }

    #[must_use]
    pub fn descending(mut self) -> Self {
        self.descending = true;
        self
    }

    #[must_use]
    pub fn method(mut self, method: TieMethod) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn output(mut self, name: impl Into<String>) -> Self {
        self.output = name.into();
        self
    }
}

impl fmt::Display for RankOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rank {} {} by [{}] ({}) as {}",
            self.measure,
            if self.descending { "desc" } else { "asc" },
            self.group_columns.join(", "),
            self.method,
            self.output
        )
    }
}

/// A table carrying a rank column
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked {
    table: Table,
    rank_column: String,
}

impl Ranked {
    /// Wrap a table whose `rank_column` holds integer ranks
    pub fn new(table: Table, rank_column: impl Into<String>) -> Result<Self> {
        let rank_column = rank_column.into();
        table.schema().index_of(&rank_column, "top_k")?;
        Ok(Self { table, rank_column })
    }

    /// The ranked rows
    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Name of the rank column
    #[must_use]
    pub fn rank_column(&self) -> &str {
        &self.rank_column
    }

    /// Unwrap into the plain table
    #[must_use]
    pub fn into_table(self) -> Table {
        self.table
    }

    /// See [`top_k`]
    #[must_use]
    pub fn top_k(&self, k: usize) -> Table {
        top_k(self, k)
    }
}

/// Schema produced by [`rank_within`], validating the configuration
pub fn rank_schema(schema: &Schema, options: &RankOptions) -> Result<Schema> {
    schema.indices_of(&options.group_columns, "rank")?;
    schema.index_of(&options.measure, "rank")?;
    if options.output.is_empty() {
        return Err(Error::config("rank column name is empty"));
    }
    if schema.contains(&options.output) {
        return Err(Error::config(format!(
            "rank column '{}' already exists",
            options.output
        )));
    }
    Ok(schema.with_column(&options.output))
}

/// Rank every row within its partition.
///
/// Rows keep their input order and gain an integer rank column. Rows whose
/// measure is Missing cannot be ordered and are left out of the result. Text in
/// the measure column is [`Error::NonNumeric`].
pub fn rank_within(table: &Table, options: &RankOptions) -> Result<Ranked> {
    let schema = rank_schema(table.schema(), options)?;
    let key_columns = table.schema().indices_of(&options.group_columns, "rank")?;
    let measure = table.schema().index_of(&options.measure, "rank")?;
    let rows = table.raw_rows();

    if let Some(text) = rows.iter().find_map(|row| row[measure].as_str()) {
        return Err(Error::NonNumeric {
            column: options.measure.clone(),
            stage: "rank",
            value: text.to_string(),
        });
    }

    let mut ranks: Vec<Option<i64>> = vec![None; rows.len()];
    let mut excluded = 0usize;
    let groups = partition(table, &key_columns, MissingKeys::Group);
    let partitions = groups.len();
    for members in groups.into_values() {
        let mut ordered: Vec<usize> = members
            .into_iter()
            .filter(|&i| {
                let keep = !rows[i][measure].is_missing();
                if !keep {
                    excluded += 1;
                }
                keep
            })
            .collect();
        // stable: equal measures keep input order
        ordered.sort_by(|&a, &b| rows[a][measure].sort_cmp(&rows[b][measure], options.descending));
        assign_ranks(&ordered, options.method, &mut ranks, |a, b| {
            rows[a][measure].sort_cmp(&rows[b][measure], options.descending) == Ordering::Equal
        });
    }
    if excluded > 0 {
        log::warn!(
            "rank: {excluded} row(s) with missing '{}' left out of the ranking",
            options.measure
        );
    }

    let out: Vec<Vec<Value>> = rows
        .iter()
        .zip(&ranks)
        .filter_map(|(row, rank)| {
            rank.map(|r| {
                let mut row = row.clone();
                row.push(Value::Int(r));
                row
            })
        })
        .collect();
    log::debug!(
        "rank: {} row(s) ranked across {partitions} partition(s) by '{}'",
        out.len(),
        options.measure
    );

    Ok(Ranked {
        table: Table::from_parts(schema, out),
        rank_column: options.output.clone(),
    })
}

fn assign_ranks<F>(ordered: &[usize], method: TieMethod, ranks: &mut [Option<i64>], tied: F)
where
    F: Fn(usize, usize) -> bool,
{
    let mut start = 0;
    let mut dense = 0i64;
    while start < ordered.len() {
        let mut end = start + 1;
        while end < ordered.len() && tied(ordered[start], ordered[end]) {
            end += 1;
        }
        dense += 1;
        for (pos, &row) in ordered.iter().enumerate().take(end).skip(start) {
            let rank = match method {
                TieMethod::Min => start + 1,
                TieMethod::Max => end,
                TieMethod::First => pos + 1,
                TieMethod::Dense => dense as usize,
            };
            ranks[row] = Some(rank as i64);
        }
        start = end;
    }
}

/// Keep the rows ranked `k` or better.
///
/// Ties can make a partition contribute more than `k` rows. `k == 0` keeps
/// nothing.
#[must_use]
pub fn top_k(ranked: &Ranked, k: usize) -> Table {
    let table = ranked.table();
    let schema = table.schema().clone();
    let Ok(idx) = schema.index_of(ranked.rank_column(), "top_k") else {
        return Table::empty(schema);
    };
    let limit = i64::try_from(k).unwrap_or(i64::MAX);
    let rows = table
        .raw_rows()
        .iter()
        .filter(|row| row[idx].as_i64().is_some_and(|r| r <= limit))
        .cloned()
        .collect();
    Table::from_parts(schema, rows)
}
