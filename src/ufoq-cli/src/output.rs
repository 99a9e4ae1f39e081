//! Output writing for the ufoq CLI
//!
//! A result goes to the configured output file, to `<output_dir>/<query>.csv`,
//! or to stdout as a formatted table.

use crate::config::Config;
use ufoq_core::{Query, Table};
use ufoq_io::{render, write_csv};

use std::io::Write;
use std::path::PathBuf;

/// Output writer for query results
pub struct OutputWriter<'a> {
    config: &'a Config,
}

impl<'a> OutputWriter<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// File the result of `query` is written to, if output goes to a file
    pub fn output_path(&self, query: Option<Query>) -> Option<PathBuf> {
        if let Some(path) = &self.config.io.output {
            return Some(path.clone());
        }
        match (&self.config.io.output_dir, query) {
            (Some(dir), Some(query)) => Some(dir.join(format!("{}.csv", query.slug()))),
            _ => None,
        }
    }

    /// Write a result to its destination
    pub fn emit(&self, table: &Table, query: Option<Query>) -> anyhow::Result<()> {
        match self.output_path(query) {
            Some(path) => write_csv(table, &path)?,
            None => self.write_to_stdout(table, query)?,
        }
        Ok(())
    }

    fn write_to_stdout(&self, table: &Table, query: Option<Query>) -> anyhow::Result<()> {
        let mut out = std::io::stdout().lock();
        if let Some(query) = query {
            writeln!(out, "{}", query.title())?;
        }
        writeln!(out, "{}", render(table)?)?;
        Ok(())
    }
}
