//! In-memory relation: an ordered, duplicate-free [`Schema`] and rows aligned to it.

use indexmap::IndexSet;

use crate::error::{Error, Result};
use crate::value::Value;

/// Ordered set of column names
#[derive(Debug, Clone, Default)]
pub struct Schema {
    columns: IndexSet<String>,
}

// IndexSet equality ignores order; schemas must not.
impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.columns.iter().eq(other.columns.iter())
    }
}

impl Eq for Schema {}

impl Schema {
    /// Create a schema, rejecting duplicate names
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = IndexSet::new();
        for name in columns {
            let name = name.into();
            if set.contains(&name) {
                return Err(Error::DuplicateColumn(name));
            }
            set.insert(name);
        }
        Ok(Self { columns: set })
    }

    /// Number of columns
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Check whether a column exists
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    /// Position of a column, or `UnknownColumn` tagged with `stage`
    pub fn index_of(&self, name: &str, stage: &'static str) -> Result<usize> {
        self.columns
            .get_index_of(name)
            .ok_or_else(|| Error::unknown_column(name, stage))
    }

    /// Resolve several columns at once
    pub fn indices_of(&self, names: &[String], stage: &'static str) -> Result<Vec<usize>> {
        names.iter().map(|n| self.index_of(n, stage)).collect()
    }

    /// Column names in order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(String::as_str)
    }

    /// Name of the column at `index`
    #[must_use]
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.columns.get_index(index).map(String::as_str)
    }

    /// Schema with `name` appended, or unchanged if it already exists
    #[must_use]
    pub fn with_column(&self, name: &str) -> Schema {
        let mut columns = self.columns.clone();
        columns.insert(name.to_string());
        Schema { columns }
    }
}

/// A borrowed row, resolved through its table's schema
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    schema: &'a Schema,
    values: &'a [Value],
}

impl<'a> RowRef<'a> {
    /// Look up a value by column name
    pub fn get(&self, column: &str) -> Result<&'a Value> {
        let idx = self.schema.index_of(column, "row access")?;
        Ok(&self.values[idx])
    }

    /// Values in schema order
    #[must_use]
    pub fn values(&self) -> &'a [Value] {
        self.values
    }
}

/// Ordered rows sharing one schema.
///
/// Tables are never mutated after construction: every operation builds a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    schema: Schema,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Build a table, checking every row has one value per column
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != schema.len() {
                return Err(Error::RowWidth {
                    row: i,
                    expected: schema.len(),
                    actual: row.len(),
                });
            }
        }
        Ok(Self { schema, rows })
    }

    /// Convenience constructor from column names
    pub fn from_rows<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self> {
        Self::new(Schema::new(columns)?, rows)
    }

    /// Table with the given schema and no rows
    #[must_use]
    pub fn empty(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    // Rows produced by the operators always match the schema they derive.
    pub(crate) fn from_parts(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == schema.len()));
        Self { schema, rows }
    }

    /// The table's schema
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Borrow the row at `index`
    #[must_use]
    pub fn row(&self, index: usize) -> Option<RowRef<'_>> {
        self.rows.get(index).map(|values| RowRef {
            schema: &self.schema,
            values,
        })
    }

    /// Iterate over rows in order
    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_>> + '_ {
        self.rows.iter().map(|values| RowRef {
            schema: &self.schema,
            values,
        })
    }

    /// Raw row storage
    #[must_use]
    pub fn raw_rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Values of one column, top to bottom
    pub fn column(&self, name: &str) -> Result<Vec<&Value>> {
        let idx = self.schema.index_of(name, "column access")?;
        Ok(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Split into schema and rows
    #[must_use]
    pub fn into_parts(self) -> (Schema, Vec<Vec<Value>>) {
        (self.schema, self.rows)
    }
}
