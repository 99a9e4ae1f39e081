//! ufoq: filtering, grouped aggregation and top-N-per-group ranking over
//! UFO sighting tables
//!
//! This crate bundles [`ufoq_core`] (tables, operations, the sighting
//! analyses) and [`ufoq_io`] (CSV reading and writing).
//!
//! ```rust,no_run
//! use ufoq::{run_query, Query, QueryParams};
//!
//! let cities = run_query(
//!     "ufo_sighting_data.csv",
//!     Query::TopCitiesByState,
//!     &QueryParams::default(),
//! )?;
//! ufoq::write_csv(&cities, "query_results/top_cities.csv")?;
//! # Ok::<(), ufoq::ufoq_io::Error>(())
//! ```

use std::path::Path;

pub use ufoq_core;
pub use ufoq_io;

pub use ufoq_core::{Error, Operation, OperationPipeline, Query, QueryParams, Schema, Table, Value};
pub use ufoq_io::{read_csv, write_csv, ReadOptions};

/// Read a sightings CSV with default options and run one analysis over it
pub fn run_query<P: AsRef<Path>>(
    path: P,
    query: Query,
    params: &QueryParams,
) -> ufoq_io::Result<Table> {
    let table = read_csv(path, &ReadOptions::default())?;
    Ok(query.pipeline(params).execute(table)?)
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use ufoq_core::prelude::*;
    pub use ufoq_io::{read_csv, write_csv, ReadOptions};

    pub use crate::run_query;
}
