//! Conversion between ufoq tables and polars `DataFrame`s

use polars::prelude::*;
use ufoq_core::{Schema, Table, Value};

use crate::Result;

/// Build a `DataFrame` from a table.
///
/// A column whose non-missing values are all integers becomes `Int64`, one whose
/// values are all numeric becomes `Float64`, anything else becomes `String`.
/// Missing is null in every case.
pub fn to_dataframe(table: &Table) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(table.schema().len());
    for (idx, name) in table.schema().names().enumerate() {
        let values: Vec<&Value> = table.raw_rows().iter().map(|row| &row[idx]).collect();
        columns.push(build_column(name, &values));
    }
    Ok(DataFrame::new(columns)?)
}

fn build_column(name: &str, values: &[&Value]) -> Column {
    let present = || values.iter().filter(|v| !v.is_missing());
    if present().all(|v| matches!(v, Value::Int(_))) && present().next().is_some() {
        let data: Vec<Option<i64>> = values.iter().map(|v| v.as_i64()).collect();
        Column::new(name.into(), data)
    } else if present().all(|v| v.is_numeric()) && present().next().is_some() {
        let data: Vec<Option<f64>> = values.iter().map(|v| v.as_f64()).collect();
        Column::new(name.into(), data)
    } else {
        let data: Vec<Option<String>> = values
            .iter()
            .map(|v| (!v.is_missing()).then(|| v.to_string()))
            .collect();
        Column::new(name.into(), data)
    }
}

/// Build a table from a `DataFrame`.
///
/// String columns become text, integer columns `Int`, float columns `Number`;
/// other types are rendered as text. Nulls become Missing.
pub fn from_dataframe(df: &DataFrame) -> Result<Table> {
    let schema = Schema::new(df.get_column_names().into_iter().map(|n| n.to_string()))?;
    let mut rows: Vec<Vec<Value>> = (0..df.height())
        .map(|_| Vec::with_capacity(schema.len()))
        .collect();

    for column in df.get_columns() {
        let values = column_values(column)?;
        for (row, value) in rows.iter_mut().zip(values) {
            row.push(value);
        }
    }
    Ok(Table::new(schema, rows)?)
}

fn column_values(column: &Column) -> Result<Vec<Value>> {
    let values = match column.dtype() {
        DataType::String => column
            .str()?
            .into_iter()
            .map(|v| v.map_or(Value::Missing, Value::text))
            .collect(),
        dt if dt.is_integer() => column
            .cast(&DataType::Int64)?
            .i64()?
            .into_iter()
            .map(|v| v.map_or(Value::Missing, Value::Int))
            .collect(),
        dt if dt.is_float() => column
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| v.map_or(Value::Missing, Value::number))
            .collect(),
        _ => column
            .cast(&DataType::String)?
            .str()?
            .into_iter()
            .map(|v| v.map_or(Value::Missing, Value::text))
            .collect(),
    };
    Ok(values)
}
