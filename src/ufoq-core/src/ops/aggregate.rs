//! Grouped aggregation
//!
//! Rows are partitioned by the values of one or more key columns and each
//! partition is reduced to a single output row. Partitions appear in the
//! order their first row was seen, which keeps the output independent of any
//! hashing order.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::ops::basic::{head, sort_by, SortOptions};
use crate::ops::filter::{filter, Predicate};
use crate::table::{Schema, Table};
use crate::value::Value;

/// Number of decimal places aggregate statistics are rounded to by default
pub const PRESENTATION_DECIMALS: u32 = 2;

/// Rounding applied to presented statistics
pub const ROUNDING_MODE: RoundingMode = RoundingMode::HalfEven;

/// How a value exactly halfway between two representable results is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundingMode {
    /// Banker's rounding: halves go to the even neighbour
    HalfEven,
}

/// Round `x` to `decimals` places using [`ROUNDING_MODE`].
///
/// The value is scaled by `10^decimals` first, so inputs such as `2.675` that
/// are stored slightly below the halfway point round down. Values too large to
/// scale are returned unchanged.
#[must_use]
pub fn round_presentation(x: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    let scaled = x * scale;
    if !scaled.is_finite() {
        return x;
    }
    match ROUNDING_MODE {
        RoundingMode::HalfEven => scaled.round_ties_even() / scale,
    }
}

/// Statistic computed over a partition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    /// Rows in the partition
    Count,
    /// Sum of non-missing values
    Sum,
    /// Mean of non-missing values
    Mean,
    /// Smallest non-missing value
    Min,
    /// Largest non-missing value
    Max,
}

impl Stat {
    /// Short name used in derived column names
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Stat::Count => "count",
            Stat::Sum => "sum",
            Stat::Mean => "mean",
            Stat::Min => "min",
            Stat::Max => "max",
        }
    }
}

impl FromStr for Stat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "count" | "size" => Ok(Stat::Count),
            "sum" => Ok(Stat::Sum),
            "mean" | "avg" => Ok(Stat::Mean),
            "min" => Ok(Stat::Min),
            "max" => Ok(Stat::Max),
            other => Err(Error::config(format!("unknown statistic '{other}'"))),
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One requested output statistic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateSpec {
    /// Measured column; `None` means the partition itself (only valid for count)
    pub field: Option<String>,
    /// Statistic to compute
    pub stat: Stat,
    /// Output column name override
    pub alias: Option<String>,
}

impl AggregateSpec {
    /// Statistic over a column
    pub fn new(field: impl Into<String>, stat: Stat) -> Self {
        Self {
            field: Some(field.into()),
            stat,
            alias: None,
        }
    }

    /// Partition size
    #[must_use]
    pub fn count_rows() -> Self {
        Self {
            field: None,
            stat: Stat::Count,
            alias: None,
        }
    }

    /// Rename the output column
    #[must_use]
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.alias = Some(name.into());
        self
    }
}

impl fmt::Display for AggregateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}({field})", self.stat)?,
            None => write!(f, "{}(*)", self.stat)?,
        }
        if let Some(alias) = &self.alias {
            write!(f, " as {alias}")?;
        }
        Ok(())
    }
}

/// What to do with rows whose group key contains Missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingKeys {
    /// Missing is a key value like any other; all such rows share partitions
    #[default]
    Group,
    /// Rows with a Missing key value are left out
    Drop,
}

/// Post-processing applied to the aggregated table
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateOptions {
    /// Keep only output rows satisfying this predicate
    pub having: Option<Predicate>,
    /// Stable sort over output columns
    pub sort: Vec<SortOptions>,
    /// Keep at most this many rows after sorting
    pub limit: Option<usize>,
    /// Decimal places for sum/mean/min/max; `None` keeps full precision
    pub decimals: Option<u32>,
    /// Treatment of Missing key values
    pub missing_keys: MissingKeys,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            having: None,
            sort: Vec::new(),
            limit: None,
            decimals: Some(PRESENTATION_DECIMALS),
            missing_keys: MissingKeys::Group,
        }
    }
}

impl AggregateOptions {
    #[must_use]
    pub fn having(mut self, predicate: Predicate) -> Self {
        self.having = Some(predicate);
        self
    }

    #[must_use]
    pub fn sort(mut self, sort: Vec<SortOptions>) -> Self {
        self.sort = sort;
        self
    }

    #[must_use]
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    #[must_use]
    pub fn decimals(mut self, decimals: Option<u32>) -> Self {
        self.decimals = decimals;
        self
    }

    #[must_use]
    pub fn missing_keys(mut self, missing_keys: MissingKeys) -> Self {
        self.missing_keys = missing_keys;
        self
    }
}

/// Values of the group columns for one row
pub type GroupKey = SmallVec<[Value; 4]>;

/// Row indices of each partition, keyed in discovery order
pub(crate) fn partition(
    table: &Table,
    key_columns: &[usize],
    missing_keys: MissingKeys,
) -> IndexMap<GroupKey, Vec<usize>> {
    let mut groups: IndexMap<GroupKey, Vec<usize>> = IndexMap::new();
    for (i, row) in table.raw_rows().iter().enumerate() {
        let key: GroupKey = key_columns.iter().map(|&c| row[c].clone()).collect();
        if missing_keys == MissingKeys::Drop && key.iter().any(Value::is_missing) {
            continue;
        }
        groups.entry(key).or_default().push(i);
    }
    groups
}

/// Output column names, one per requested statistic
pub fn output_names(specs: &[AggregateSpec]) -> Vec<String> {
    specs
        .iter()
        .map(|spec| {
            if let Some(alias) = &spec.alias {
                return alias.clone();
            }
            match &spec.field {
                None => spec.stat.name().to_string(),
                Some(field) => {
                    let uses = specs
                        .iter()
                        .filter(|s| s.field.as_deref() == Some(field.as_str()))
                        .count();
                    if uses == 1 {
                        field.clone()
                    } else {
                        format!("{field}_{}", spec.stat)
                    }
                }
            }
        })
        .collect()
}

/// Schema produced by [`aggregate`], validating the whole configuration
pub fn aggregate_schema(
    schema: &Schema,
    group_columns: &[String],
    specs: &[AggregateSpec],
    options: &AggregateOptions,
) -> Result<Schema> {
    if group_columns.is_empty() {
        return Err(Error::config("aggregate requires at least one group column"));
    }
    if specs.is_empty() {
        return Err(Error::config("aggregate requires at least one statistic"));
    }
    schema.indices_of(group_columns, "aggregate")?;
    for spec in specs {
        match &spec.field {
            Some(field) => {
                schema.index_of(field, "aggregate")?;
            }
            None if spec.stat != Stat::Count => {
                return Err(Error::config(format!(
                    "statistic '{}' needs a column",
                    spec.stat
                )));
            }
            None => {}
        }
    }

    let names = group_columns.iter().cloned().chain(output_names(specs));
    let out = Schema::new(names).map_err(|e| match e {
        Error::DuplicateColumn(name) => {
            Error::config(format!("aggregate output column '{name}' is not unique"))
        }
        other => other,
    })?;

    if let Some(having) = &options.having {
        having.bind(&out)?;
    }
    for key in &options.sort {
        out.index_of(&key.column, "aggregate sort")?;
    }
    Ok(out)
}

/// Group `table` by `group_columns` and compute one row per partition.
///
/// Output columns are the group columns followed by one column per spec.
/// `count` counts rows; the other statistics skip Missing and are Missing for a
/// partition with no values. Text in a measured column is [`Error::NonNumeric`].
pub fn aggregate(
    table: &Table,
    group_columns: &[String],
    specs: &[AggregateSpec],
    options: &AggregateOptions,
) -> Result<Table> {
    let schema = aggregate_schema(table.schema(), group_columns, specs, options)?;
    let key_columns = table.schema().indices_of(group_columns, "aggregate")?;
    let fields = specs
        .iter()
        .map(|s| {
            s.field
                .as_deref()
                .map(|f| table.schema().index_of(f, "aggregate"))
                .transpose()
        })
        .collect::<Result<Vec<_>>>()?;

    let groups = partition(table, &key_columns, options.missing_keys);
    let mut rows = Vec::with_capacity(groups.len());
    for (key, members) in groups {
        let mut row: Vec<Value> = key.into_iter().collect();
        for (spec, field) in specs.iter().zip(&fields) {
            row.push(compute(table, spec, *field, &members, options.decimals)?);
        }
        rows.push(row);
    }
    log::debug!(
        "aggregate: {} row(s) into {} partition(s) by [{}]",
        table.row_count(),
        rows.len(),
        group_columns.join(", ")
    );

    let mut out = Table::from_parts(schema, rows);
    if let Some(having) = &options.having {
        out = filter(&out, having)?;
    }
    if !options.sort.is_empty() {
        out = sort_by(&out, &options.sort)?;
    }
    if let Some(n) = options.limit {
        out = head(&out, n);
    }
    Ok(out)
}

fn compute(
    table: &Table,
    spec: &AggregateSpec,
    field: Option<usize>,
    members: &[usize],
    decimals: Option<u32>,
) -> Result<Value> {
    let field = match field {
        Some(field) if spec.stat != Stat::Count => field,
        _ => return Ok(Value::Int(members.len() as i64)),
    };

    let rows = table.raw_rows();
    let mut values = Vec::with_capacity(members.len());
    for &i in members {
        match &rows[i][field] {
            Value::Missing => {}
            Value::Text(s) => {
                return Err(Error::NonNumeric {
                    column: table.schema().name_at(field).unwrap_or_default().to_string(),
                    stage: "aggregate",
                    value: s.clone(),
                })
            }
            v => values.extend(v.as_f64()),
        }
    }
    if values.is_empty() {
        return Ok(Value::Missing);
    }

    let result = match spec.stat {
        Stat::Count => return Ok(Value::Int(members.len() as i64)),
        Stat::Sum => values.iter().sum::<f64>(),
        Stat::Mean => values.iter().sum::<f64>() / values.len() as f64,
        Stat::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        Stat::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    };
    Ok(Value::number(match decimals {
        Some(d) => round_presentation(result, d),
        None => result,
    }))
}
