//! Numeric coercion.
//!
//! Unparseable cells become [`Value::Missing`]; coercion never fails on data.

use crate::error::Result;
use crate::table::Table;
use crate::value::Value;

/// Parse a single cell as a number.
///
/// Accepts an optional sign, decimal point and exponent, with surrounding
/// whitespace. Empty text, `NaN` and anything else that does not parse yield Missing.
#[must_use]
pub fn parse_number(text: &str) -> Value {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Value::Missing;
    }
    match trimmed.parse::<f64>() {
        Ok(f) => Value::number(f),
        Err(_) => Value::Missing,
    }
}

/// Coerce one value: numbers pass through, text is parsed, Missing stays Missing
#[must_use]
pub fn coerce_value(value: &Value) -> Value {
    match value {
        Value::Number(_) | Value::Int(_) => value.clone(),
        Value::Text(s) => parse_number(s),
        Value::Missing => Value::Missing,
    }
}

/// Replace `column` with its numeric coercion.
///
/// The column keeps its name and position. Only an unknown column is an error.
pub fn coerce_numeric(table: &Table, column: &str) -> Result<Table> {
    let idx = table.schema().index_of(column, "coerce")?;
    let mut coerced = 0usize;
    let rows = table
        .raw_rows()
        .iter()
        .map(|row| {
            let mut out = row.clone();
            out[idx] = coerce_value(&row[idx]);
            if out[idx].is_missing() && !row[idx].is_missing() {
                coerced += 1;
            }
            out
        })
        .collect();
    if coerced > 0 {
        log::debug!("coerce: {coerced} value(s) in '{column}' became missing");
    }
    Ok(Table::from_parts(table.schema().clone(), rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_number_grammar() {
        assert_eq!(parse_number("1800"), Value::Number(1800.0));
        assert_eq!(parse_number("  12.5 "), Value::Number(12.5));
        assert_eq!(parse_number("-3"), Value::Number(-3.0));
        assert_eq!(parse_number("1e3"), Value::Number(1000.0));
        assert_eq!(parse_number("2.5E-1"), Value::Number(0.25));
        assert_eq!(parse_number(".5"), Value::Number(0.5));
    }

    #[test]
    fn test_parse_number_failures_become_missing() {
        for bad in ["", "   ", "2`", "abc", "1,000", "NaN", "12 sec"] {
            assert!(parse_number(bad).is_missing(), "{bad:?} should be missing");
        }
    }

    #[test]
    fn test_coerce_numeric_column() {
        let table = Table::from_rows(
            ["city", "seconds"],
            vec![
                vec![Value::text("a"), Value::text("60")],
                vec![Value::text("b"), Value::text("oops")],
                vec![Value::text("c"), Value::Missing],
                vec![Value::text("d"), Value::Int(5)],
            ],
        )
        .unwrap();

        let out = coerce_numeric(&table, "seconds").unwrap();
        assert_eq!(out.schema(), table.schema());
        assert_eq!(
            out.column("seconds").unwrap(),
            vec![
                &Value::Number(60.0),
                &Value::Missing,
                &Value::Missing,
                &Value::Int(5)
            ]
        );
        // other columns untouched
        assert_eq!(out.column("city").unwrap(), table.column("city").unwrap());
    }

    #[test]
    fn test_coerce_unknown_column() {
        let table = Table::from_rows(["a"], vec![]).unwrap();
        assert_eq!(
            coerce_numeric(&table, "b").unwrap_err(),
            Error::unknown_column("b", "coerce")
        );
    }
}
