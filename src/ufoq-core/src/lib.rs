//! ufoq-core: table model and query operators for ufoq
//!
//! This crate holds the in-memory [`Table`], the [`Value`] cells it is made of and
//! the operators that turn one table into another: numeric coercion, predicate
//! filtering, grouped aggregation and per-partition ranking. The sighting
//! analyses in [`queries`] are built from these operators.
//!
//! # Quick Start
//!
//! ```rust
//! use ufoq_core::ops::{rank_within, top_k, RankOptions};
//! use ufoq_core::{Table, Value};
//!
//! let counts = Table::from_rows(
//!     ["state", "city", "sighting_count"],
//!     vec![
//!         vec![Value::text("tx"), Value::text("austin"), Value::int(50)],
//!         vec![Value::text("tx"), Value::text("dallas"), Value::int(50)],
//!         vec![Value::text("tx"), Value::text("waco"), Value::int(30)],
//!     ],
//! )?;
//!
//! let ranked = rank_within(
//!     &counts,
//!     &RankOptions::new(vec!["state".to_string()], "sighting_count")
//!         .descending()
//!         .output("city_rank"),
//! )?;
//! let top = top_k(&ranked, 1);
//! assert_eq!(top.row_count(), 2);
//! # Ok::<(), ufoq_core::Error>(())
//! ```
//!
//! # Architecture
//!
//! - [`value`] - Cell values and their equality/ordering rules
//! - [`table`] - Schema and row storage
//! - [`ops`] - Operators and the [`OperationPipeline`]
//! - [`queries`] - The named sighting analyses
//! - [`error`] - Error handling and result types

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::similar_names
)]

/// Error types and handling
pub mod error;
pub mod ops;
pub mod queries;
pub mod table;
pub mod value;

pub use crate::error::{Error, Result};
pub use crate::table::{RowRef, Schema, Table};
pub use crate::value::Value;

pub use ops::{Operation, OperationPipeline};
pub use queries::{Query, QueryParams};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::ops::{
        aggregate, coerce_numeric, filter, head, rank_within, select, sort_by, top_k,
        with_column, AggregateOptions, AggregateSpec, MissingKeys, Operation, OperationPipeline,
        Predicate, RankOptions, Ranked, SortOptions, Stat, TieMethod,
    };
    pub use crate::queries::{Query, QueryParams};
    pub use crate::table::{Schema, Table};
    pub use crate::value::Value;
}
