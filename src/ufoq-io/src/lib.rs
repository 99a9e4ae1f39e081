//! ufoq-io: CSV input and output for ufoq tables
//!
//! Files are read and written through polars. Reading keeps every field as
//! text; writing picks a column type from the values the column holds.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ufoq_io::{read_csv, write_csv, ReadOptions};
//!
//! let table = read_csv("ufo_sighting_data.csv", &ReadOptions::default())?;
//! write_csv(&table, "query_results/copy.csv")?;
//! # Ok::<(), ufoq_io::Error>(())
//! ```

pub mod convert;
pub mod reader;
pub mod writer;

pub use convert::{from_dataframe, to_dataframe};
pub use reader::{read_csv, ReadOptions};
pub use writer::{render, write_csv};

/// Error type for I/O operations
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
    #[error(transparent)]
    Table(#[from] ufoq_core::Error),
}
