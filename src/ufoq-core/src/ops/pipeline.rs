use super::Operation;
use crate::error::{Error, Result};
use crate::ops::aggregate::{aggregate, aggregate_schema, AggregateOptions, AggregateSpec};
use crate::ops::basic::{head, select, select_schema, sort_by, with_column, SortOptions};
use crate::ops::coerce::coerce_numeric;
use crate::ops::filter::{filter, Predicate};
use crate::ops::rank::{rank_schema, rank_within, top_k, RankOptions, Ranked};
use crate::table::{RowRef, Schema, Table};
use crate::value::Value;

type RowFn = dyn Fn(RowRef<'_>) -> Result<Value> + Send + Sync;

/// A pipeline of operations that can be applied sequentially
///
/// # Examples
///
/// ```rust
/// use ufoq_core::ops::{OperationPipeline, Predicate, SortOptions};
/// use ufoq_core::{Table, Value};
///
/// let table = Table::from_rows(
///     ["city", "seconds"],
///     vec![
///         vec![Value::text("austin"), Value::text("60")],
///         vec![Value::text("boise"), Value::text("3600")],
///     ],
/// )
/// .unwrap();
///
/// let pipeline = OperationPipeline::new()
///     .coerce("seconds")
///     .filter(Predicate::ge("seconds", 1800.0))
///     .sort(vec![SortOptions::desc("seconds")])
///     .head(10);
///
/// let result = pipeline.execute(table).unwrap();
/// assert_eq!(result.row_count(), 1);
/// ```
#[derive(Default)]
pub struct OperationPipeline {
    operations: Vec<Box<dyn Operation + Send + Sync>>,
    rank_column: Option<String>,
}

impl OperationPipeline {
    /// Create a new empty operation pipeline
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a generic operation to the pipeline
    #[must_use]
    pub fn add_operation(mut self, op: Box<dyn Operation + Send + Sync>) -> Self {
        self.operations.push(op);
        self
    }

    /// Add a numeric coercion of one column
    #[must_use]
    pub fn coerce(self, column: impl Into<String>) -> Self {
        self.add_operation(Box::new(CoerceOperation {
            column: column.into(),
        }))
    }

    /// Add a filter operation
    #[must_use]
    pub fn filter(self, predicate: Predicate) -> Self {
        self.add_operation(Box::new(FilterOperation { predicate }))
    }

    /// Add a select columns operation
    #[must_use]
    pub fn select(self, columns: Vec<String>) -> Self {
        self.add_operation(Box::new(SelectOperation { columns }))
    }

    /// Add a derived column computed per row from the `inputs` columns
    #[must_use]
    pub fn with_column<F>(self, name: impl Into<String>, inputs: Vec<String>, f: F) -> Self
    where
        F: Fn(RowRef<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.add_operation(Box::new(WithColumnOperation {
            name: name.into(),
            inputs,
            f: Box::new(f),
        }))
    }

    /// Add a sort operation
    #[must_use]
    pub fn sort(self, options: Vec<SortOptions>) -> Self {
        self.add_operation(Box::new(SortOperation { options }))
    }

    /// Add a head operation (take first N rows)
    #[must_use]
    pub fn head(self, n: usize) -> Self {
        self.add_operation(Box::new(HeadOperation { n }))
    }

    /// Add an aggregation operation
    #[must_use]
    pub fn aggregate(
        self,
        group_columns: Vec<String>,
        specs: Vec<AggregateSpec>,
        options: AggregateOptions,
    ) -> Self {
        self.add_operation(Box::new(AggregateOperation {
            group_columns,
            specs,
            options,
        }))
    }

    /// Add a ranking operation
    #[must_use]
    pub fn rank(mut self, options: RankOptions) -> Self {
        self.rank_column = Some(options.output.clone());
        self.add_operation(Box::new(RankOperation { options }))
    }

    /// Keep rows ranked `k` or better by the most recent rank stage
    #[must_use]
    pub fn top_k(self, k: usize) -> Self {
        let rank_column = self.rank_column.clone();
        self.add_operation(Box::new(TopKOperation { rank_column, k }))
    }

    /// Check every stage against `schema` without touching any row
    pub fn validate(&self, schema: &Schema) -> Result<Schema> {
        self.operations
            .iter()
            .try_fold(schema.clone(), |current, op| op.output_schema(&current))
    }

    /// Execute the pipeline on a table
    ///
    /// The whole chain is validated first, so a configuration error never
    /// leaves a partially processed result behind.
    pub fn execute(&self, table: Table) -> Result<Table> {
        self.validate(table.schema())?;
        let mut table = table;
        for operation in &self.operations {
            table = operation.apply(&table)?;
            log::debug!(
                "{} -> {} row(s)",
                operation.description(),
                table.row_count()
            );
        }
        Ok(table)
    }

    /// Get the number of operations in the pipeline
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check if the pipeline is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Get descriptions of all operations in the pipeline
    #[must_use]
    pub fn describe(&self) -> Vec<String> {
        self.operations.iter().map(|op| op.description()).collect()
    }
}

// Concrete operation implementations for the pipeline

struct CoerceOperation {
    column: String,
}

impl Operation for CoerceOperation {
    fn output_schema(&self, input: &Schema) -> Result<Schema> {
        input.index_of(&self.column, "coerce")?;
        Ok(input.clone())
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        coerce_numeric(table, &self.column)
    }

    fn description(&self) -> String {
        format!("coerce to number: {}", self.column)
    }
}

struct FilterOperation {
    predicate: Predicate,
}

impl Operation for FilterOperation {
    fn output_schema(&self, input: &Schema) -> Result<Schema> {
        self.predicate.bind(input)?;
        Ok(input.clone())
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        filter(table, &self.predicate)
    }

    fn description(&self) -> String {
        format!("filter: {}", self.predicate)
    }
}

struct SelectOperation {
    columns: Vec<String>,
}

impl Operation for SelectOperation {
    fn output_schema(&self, input: &Schema) -> Result<Schema> {
        select_schema(input, &self.columns)
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        select(table, &self.columns)
    }

    fn description(&self) -> String {
        format!("select columns: {}", self.columns.join(", "))
    }
}

struct WithColumnOperation {
    name: String,
    inputs: Vec<String>,
    f: Box<RowFn>,
}

impl Operation for WithColumnOperation {
    fn output_schema(&self, input: &Schema) -> Result<Schema> {
        input.indices_of(&self.inputs, "with_column")?;
        Ok(input.with_column(&self.name))
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        with_column(table, &self.name, &self.f)
    }

    fn description(&self) -> String {
        format!("with column: {} from {}", self.name, self.inputs.join(", "))
    }
}

struct SortOperation {
    options: Vec<SortOptions>,
}

impl Operation for SortOperation {
    fn output_schema(&self, input: &Schema) -> Result<Schema> {
        if self.options.is_empty() {
            return Err(Error::config("sort requires at least one key"));
        }
        for key in &self.options {
            input.index_of(&key.column, "sort")?;
        }
        Ok(input.clone())
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        sort_by(table, &self.options)
    }

    fn description(&self) -> String {
        let keys: Vec<String> = self
            .options
            .iter()
            .map(|opt| {
                format!(
                    "{} {}",
                    opt.column,
                    if opt.descending { "desc" } else { "asc" }
                )
            })
            .collect();
        format!("sort by: {}", keys.join(", "))
    }
}

struct HeadOperation {
    n: usize,
}

impl Operation for HeadOperation {
    fn output_schema(&self, input: &Schema) -> Result<Schema> {
        Ok(input.clone())
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        Ok(head(table, self.n))
    }

    fn description(&self) -> String {
        format!("head: {}", self.n)
    }
}

struct AggregateOperation {
    group_columns: Vec<String>,
    specs: Vec<AggregateSpec>,
    options: AggregateOptions,
}

impl Operation for AggregateOperation {
    fn output_schema(&self, input: &Schema) -> Result<Schema> {
        aggregate_schema(input, &self.group_columns, &self.specs, &self.options)
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        aggregate(table, &self.group_columns, &self.specs, &self.options)
    }

    fn description(&self) -> String {
        let specs: Vec<String> = self.specs.iter().map(ToString::to_string).collect();
        format!(
            "aggregate by [{}]: {}",
            self.group_columns.join(", "),
            specs.join(", ")
        )
    }
}

struct RankOperation {
    options: RankOptions,
}

impl Operation for RankOperation {
    fn output_schema(&self, input: &Schema) -> Result<Schema> {
        rank_schema(input, &self.options)
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        Ok(rank_within(table, &self.options)?.into_table())
    }

    fn description(&self) -> String {
        self.options.to_string()
    }
}

struct TopKOperation {
    rank_column: Option<String>,
    k: usize,
}

impl TopKOperation {
    fn column(&self) -> Result<&str> {
        self.rank_column
            .as_deref()
            .ok_or_else(|| Error::config("top_k needs a preceding rank stage"))
    }
}

impl Operation for TopKOperation {
    fn output_schema(&self, input: &Schema) -> Result<Schema> {
        input.index_of(self.column()?, "top_k")?;
        Ok(input.clone())
    }

    fn apply(&self, table: &Table) -> Result<Table> {
        let ranked = Ranked::new(table.clone(), self.column()?)?;
        Ok(top_k(&ranked, self.k))
    }

    fn description(&self) -> String {
        match &self.rank_column {
            Some(column) => format!("top {} by {column}", self.k),
            None => format!("top {}", self.k),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::aggregate::Stat;
    use pretty_assertions::assert_eq;

    fn sightings() -> Table {
        Table::from_rows(
            ["country", "city", "seconds"],
            vec![
                vec![Value::text("us"), Value::text("austin"), Value::text("60")],
                vec![Value::text("us"), Value::text("boise"), Value::text("3600")],
                vec![Value::text("ca"), Value::text("ottawa"), Value::text("1800")],
                vec![Value::text("us"), Value::text("austin"), Value::text("oops")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_pipeline_chains_stages() {
        let pipeline = OperationPipeline::new()
            .coerce("seconds")
            .filter(Predicate::eq("country", "us"))
            .with_column("minutes", vec!["seconds".to_string()], |row| {
                Ok(row.get("seconds")?.div(60.0))
            })
            .sort(vec![SortOptions::desc("minutes")])
            .select(vec!["city".to_string(), "minutes".to_string()])
            .head(2);

        let out = pipeline.execute(sightings()).unwrap();
        assert_eq!(
            out.raw_rows(),
            &[
                vec![Value::text("boise"), Value::Number(60.0)],
                vec![Value::text("austin"), Value::Number(1.0)],
            ]
        );
        assert_eq!(pipeline.len(), 6);
    }

    #[test]
    fn test_validation_happens_before_rows() {
        // the unknown column sits in the last stage; nothing may run
        let pipeline = OperationPipeline::new()
            .coerce("seconds")
            .filter(Predicate::eq("country", "us"))
            .select(vec!["state".to_string()]);
        assert_eq!(
            pipeline.execute(sightings()).unwrap_err(),
            Error::unknown_column("state", "select")
        );
    }

    #[test]
    fn test_validate_tracks_derived_schemas() {
        let pipeline = OperationPipeline::new()
            .aggregate(
                vec!["country".to_string(), "city".to_string()],
                vec![AggregateSpec::count_rows().alias("n")],
                AggregateOptions::default(),
            )
            .rank(
                RankOptions::new(vec!["country".to_string()], "n")
                    .descending()
                    .output("city_rank"),
            )
            .top_k(1)
            .sort(vec![SortOptions::asc("country"), SortOptions::asc("city_rank")]);

        let schema = pipeline.validate(sightings().schema()).unwrap();
        assert_eq!(
            schema.names().collect::<Vec<_>>(),
            vec!["country", "city", "n", "city_rank"]
        );

        let out = pipeline.execute(sightings()).unwrap();
        assert_eq!(
            out.raw_rows(),
            &[
                vec![Value::text("ca"), Value::text("ottawa"), Value::Int(1), Value::Int(1)],
                vec![Value::text("us"), Value::text("austin"), Value::Int(2), Value::Int(1)],
            ]
        );
    }

    #[test]
    fn test_top_k_without_rank_is_rejected() {
        let pipeline = OperationPipeline::new().top_k(3);
        assert!(matches!(
            pipeline.execute(sightings()),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_describe() {
        let pipeline = OperationPipeline::new()
            .coerce("seconds")
            .aggregate(
                vec!["country".to_string()],
                vec![AggregateSpec::new("seconds", Stat::Mean)],
                AggregateOptions::default(),
            )
            .head(5);
        assert_eq!(
            pipeline.describe(),
            vec![
                "coerce to number: seconds".to_string(),
                "aggregate by [country]: mean(seconds)".to_string(),
                "head: 5".to_string(),
            ]
        );
        assert!(OperationPipeline::new().is_empty());
    }
}
