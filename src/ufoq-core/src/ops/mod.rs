//! Table operations for ufoq
//!
//! This module provides the operators the analysis queries are assembled from:
//!
//! - **Coercion** ([`coerce`]): text columns to numbers, unparseable values to Missing
//! - **Filtering** ([`filter`]): row predicates with stable output order
//! - **Basic operations** ([`basic`]): select, derived columns, sort, head
//! - **Aggregation** ([`aggregate`]): grouped statistics with having/sort/limit
//! - **Ranking** ([`rank`]): per-partition ranks and top-k selection
//! - **Pipelines** ([`pipeline`]): validated chains of the above
//!
//! Every operator takes a [`Table`] by reference and returns a new one.

pub mod aggregate;
pub mod basic;
pub mod coerce;
pub mod filter;
pub mod pipeline;
pub mod rank;

pub use aggregate::{
    aggregate, aggregate_schema, round_presentation, AggregateOptions, AggregateSpec, GroupKey,
    MissingKeys, RoundingMode, Stat, PRESENTATION_DECIMALS, ROUNDING_MODE,
};
pub use basic::{head, select, sort_by, with_column, SortOptions};
pub use coerce::{coerce_numeric, coerce_value, parse_number};
pub use filter::{filter, BoundPredicate, CompareOp, Predicate};
pub use pipeline::OperationPipeline;
pub use rank::{rank_schema, rank_within, top_k, RankOptions, Ranked, TieMethod};

use crate::error::Result;
use crate::table::{Schema, Table};

/// Trait for operations that can be applied to tables
///
/// `output_schema` lets a pipeline check a whole chain of operations against
/// the input schema before any row is processed.
pub trait Operation {
    /// Schema this operation produces from `input`, or the configuration error
    fn output_schema(&self, input: &Schema) -> Result<Schema>;

    /// Apply the operation to a table
    fn apply(&self, table: &Table) -> Result<Table>;

    /// Get a description of what this operation does
    fn description(&self) -> String;
}
