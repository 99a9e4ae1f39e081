use std::path::Path;
use std::sync::Arc;

use polars::prelude::*;
use ufoq_core::Table;

use crate::convert::from_dataframe;
use crate::Result;

/// Options for reading delimited text
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Field separator
    pub separator: u8,
    /// Whether the first line names the columns
    pub has_header: bool,
    /// Maximum number of data rows to read
    pub max_rows: Option<usize>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            separator: b',',
            has_header: true,
            max_rows: None,
        }
    }
}

/// Read a CSV file into a table.
///
/// Every column is read as text: no types are inferred, so the schema is exactly
/// the header of the file. Empty fields become Missing. Turning text into
/// numbers is left to `ufoq_core::ops::coerce_numeric`.
pub fn read_csv<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<Table> {
    let df = read_csv_frame(path.as_ref(), options)?;
    let table = from_dataframe(&df)?;
    log::info!(
        "read {} row(s) x {} column(s) from {}",
        table.row_count(),
        table.schema().len(),
        path.as_ref().display()
    );
    Ok(table)
}

fn read_csv_frame(path: &Path, options: &ReadOptions) -> Result<DataFrame> {
    let mut csv_options = CsvReadOptions::default()
        .with_has_header(options.has_header)
        .with_infer_schema_length(Some(0));

    let mut parse_opts = (*csv_options.parse_options).clone();
    parse_opts.separator = options.separator;
    csv_options.parse_options = Arc::new(parse_opts);

    if let Some(n_rows) = options.max_rows {
        csv_options = csv_options.with_n_rows(Some(n_rows));
    }

    let reader = csv_options.try_into_reader_with_file_path(Some(path.to_path_buf()))?;
    Ok(reader.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use ufoq_core::Value;

    fn csv_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_everything_is_text() {
        let file = csv_file("city,seconds\naustin,60\nboise,\n\"dallas, tx\",1e3\n");
        let table = read_csv(file.path(), &ReadOptions::default()).unwrap();

        assert_eq!(table.schema().names().collect::<Vec<_>>(), vec!["city", "seconds"]);
        assert_eq!(
            table.raw_rows(),
            &[
                vec![Value::text("austin"), Value::text("60")],
                vec![Value::text("boise"), Value::Missing],
                vec![Value::text("dallas, tx"), Value::text("1e3")],
            ]
        );
    }

    #[test]
    fn test_separator_and_row_limit() {
        let file = csv_file("a;b\n1;2\n3;4\n5;6\n");
        let options = ReadOptions {
            separator: b';',
            max_rows: Some(2),
            ..ReadOptions::default()
        };
        let table = read_csv(file.path(), &options).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.row(1).unwrap().get("b").unwrap(), &Value::text("4"));
    }

    #[test]
    fn test_missing_file() {
        assert!(read_csv("/definitely/not/here.csv", &ReadOptions::default()).is_err());
    }
}
