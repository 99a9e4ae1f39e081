use std::fs::{self, File};
use std::path::Path;

use polars::prelude::*;
use ufoq_core::Table;

use crate::convert::to_dataframe;
use crate::Result;

/// Write a table as CSV: header row, comma separated, quoted only where needed.
///
/// Missing values are written as empty fields. Parent directories are created.
pub fn write_csv<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut df = to_dataframe(table)?;
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(&mut df)?;
    log::info!("wrote {} row(s) to {}", table.row_count(), path.display());
    Ok(())
}

/// Render a table for the console
pub fn render(table: &Table) -> Result<String> {
    Ok(to_dataframe(table)?.to_string())
}
