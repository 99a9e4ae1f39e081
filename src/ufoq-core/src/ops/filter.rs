//! Row predicates and stable filtering.
//!
//! A [`Predicate`] names columns; [`Predicate::bind`] resolves them against a schema
//! before any row is looked at, so an unknown column fails the stage up front.

use std::cmp::Ordering;
use std::fmt;

use crate::error::Result;
use crate::table::{Schema, Table};
use crate::value::Value;

/// Comparison operators for [`Predicate::Compare`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    fn holds(self, ord: Ordering) -> bool {
        match self {
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::Le => ord != Ordering::Greater,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Ge => ord != Ordering::Less,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// Boolean expression over a row
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `col == literal`
    Eq(String, Value),
    /// `col != literal` (false when the cell is Missing)
    Ne(String, Value),
    /// Ordered comparison against a literal
    Compare(String, CompareOp, Value),
    /// Membership in a literal set
    In(String, Vec<Value>),
    /// Cell is not Missing
    NotMissing(String),
    /// Cell is Missing
    IsMissing(String),
    /// Conjunction; empty is true
    And(Vec<Predicate>),
    /// Disjunction; empty is false
    Or(Vec<Predicate>),
    /// Negation
    Not(Box<Predicate>),
}

impl Predicate {
    /// `col == literal`
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Eq(column.into(), value.into())
    }

    /// `col != literal`
    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Ne(column.into(), value.into())
    }

    /// `col >= literal`
    pub fn ge(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Compare(column.into(), CompareOp::Ge, value.into())
    }

    /// `col > literal`
    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Compare(column.into(), CompareOp::Gt, value.into())
    }

    /// `col <= literal`
    pub fn le(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Compare(column.into(), CompareOp::Le, value.into())
    }

    /// `col < literal`
    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Compare(column.into(), CompareOp::Lt, value.into())
    }

    /// `col in [literals]`
    pub fn is_in<V: Into<Value>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Predicate::In(column.into(), values.into_iter().map(Into::into).collect())
    }

    /// Cell is present
    pub fn not_missing(column: impl Into<String>) -> Self {
        Predicate::NotMissing(column.into())
    }

    /// Cell is Missing
    pub fn is_missing(column: impl Into<String>) -> Self {
        Predicate::IsMissing(column.into())
    }

    /// Conjunction of predicates
    #[must_use]
    pub fn and(predicates: Vec<Predicate>) -> Self {
        Predicate::And(predicates)
    }

    /// Disjunction of predicates
    #[must_use]
    pub fn or(predicates: Vec<Predicate>) -> Self {
        Predicate::Or(predicates)
    }

    /// Negation of a predicate
    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn not(predicate: Predicate) -> Self {
        Predicate::Not(Box::new(predicate))
    }

    /// Every column the predicate references
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Predicate::Eq(c, _)
            | Predicate::Ne(c, _)
            | Predicate::Compare(c, _, _)
            | Predicate::In(c, _)
            | Predicate::NotMissing(c)
            | Predicate::IsMissing(c) => out.push(c),
            Predicate::And(ps) | Predicate::Or(ps) => {
                for p in ps {
                    p.collect_columns(out);
                }
            }
            Predicate::Not(p) => p.collect_columns(out),
        }
    }

    /// Resolve column names to positions
    pub fn bind(&self, schema: &Schema) -> Result<BoundPredicate> {
        let stage = "filter";
        Ok(match self {
            Predicate::Eq(c, v) => BoundPredicate::Eq(schema.index_of(c, stage)?, v.clone()),
            Predicate::Ne(c, v) => BoundPredicate::Ne(schema.index_of(c, stage)?, v.clone()),
            Predicate::Compare(c, op, v) => {
                BoundPredicate::Compare(schema.index_of(c, stage)?, *op, v.clone())
            }
            Predicate::In(c, vs) => BoundPredicate::In(schema.index_of(c, stage)?, vs.clone()),
            Predicate::NotMissing(c) => BoundPredicate::NotMissing(schema.index_of(c, stage)?),
            Predicate::IsMissing(c) => BoundPredicate::IsMissing(schema.index_of(c, stage)?),
            Predicate::And(ps) => BoundPredicate::And(
                ps.iter()
                    .map(|p| p.bind(schema))
                    .collect::<Result<Vec<_>>>()?,
            ),
            Predicate::Or(ps) => BoundPredicate::Or(
                ps.iter()
                    .map(|p| p.bind(schema))
                    .collect::<Result<Vec<_>>>()?,
            ),
            Predicate::Not(p) => BoundPredicate::Not(Box::new(p.bind(schema)?)),
        })
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, ps: &[Predicate], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, p) in ps.iter().enumerate() {
        if i > 0 {
            write!(f, " {sep} ")?;
        }
        write!(f, "{p}")?;
    }
    write!(f, ")")
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Eq(c, v) => write!(f, "{c} == {v:?}"),
            Predicate::Ne(c, v) => write!(f, "{c} != {v:?}"),
            Predicate::Compare(c, op, v) => write!(f, "{c} {} {v:?}", op.symbol()),
            Predicate::In(c, vs) => write!(f, "{c} in {vs:?}"),
            Predicate::NotMissing(c) => write!(f, "{c}.notna()"),
            Predicate::IsMissing(c) => write!(f, "{c}.isna()"),
            Predicate::And(ps) => write_joined(f, ps, "&"),
            Predicate::Or(ps) => write_joined(f, ps, "|"),
            Predicate::Not(p) => write!(f, "!{p}"),
        }
    }
}

/// A predicate whose columns are resolved to positions in one schema
#[derive(Debug, Clone)]
pub enum BoundPredicate {
    Eq(usize, Value),
    Ne(usize, Value),
    Compare(usize, CompareOp, Value),
    In(usize, Vec<Value>),
    NotMissing(usize),
    IsMissing(usize),
    And(Vec<BoundPredicate>),
    Or(Vec<BoundPredicate>),
    Not(Box<BoundPredicate>),
}

impl BoundPredicate {
    /// Evaluate against a row laid out in the bound schema
    #[must_use]
    pub fn eval(&self, row: &[Value]) -> bool {
        match self {
            BoundPredicate::Eq(i, v) => row[*i].matches(v),
            BoundPredicate::Ne(i, v) => {
                !row[*i].is_missing() && !v.is_missing() && !row[*i].matches(v)
            }
            BoundPredicate::Compare(i, op, v) => row[*i]
                .compare(v)
                .is_some_and(|ord| op.holds(ord)),
            BoundPredicate::In(i, vs) => vs.iter().any(|v| row[*i].matches(v)),
            BoundPredicate::NotMissing(i) => !row[*i].is_missing(),
            BoundPredicate::IsMissing(i) => row[*i].is_missing(),
            BoundPredicate::And(ps) => ps.iter().all(|p| p.eval(row)),
            BoundPredicate::Or(ps) => ps.iter().any(|p| p.eval(row)),
            BoundPredicate::Not(p) => !p.eval(row),
        }
    }
}

/// Keep the rows satisfying `predicate`, in their original order
pub fn filter(table: &Table, predicate: &Predicate) -> Result<Table> {
    let bound = predicate.bind(table.schema())?;
    let rows: Vec<Vec<Value>> = table
        .raw_rows()
        .iter()
        .filter(|row| bound.eval(row))
        .cloned()
        .collect();
    log::debug!(
        "filter {predicate}: kept {} of {} rows",
        rows.len(),
        table.row_count()
    );
    Ok(Table::from_parts(table.schema().clone(), rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    fn sightings() -> Table {
        Table::from_rows(
            ["country", "shape", "seconds"],
            vec![
                vec![Value::text("us"), Value::text("disk"), Value::Number(1800.0)],
                vec![Value::text("ca"), Value::text("disk"), Value::Number(60.0)],
                vec![Value::text("us"), Value::text("light"), Value::Missing],
                vec![Value::text("us"), Value::Missing, Value::Number(3600.0)],
                vec![Value::Missing, Value::text("disk"), Value::Number(10.0)],
            ],
        )
        .unwrap()
    }

    fn countries(t: &Table) -> Vec<Value> {
        t.column("country").unwrap().into_iter().cloned().collect()
    }

    #[test]
    fn test_equality_and_conjunction() {
        let p = Predicate::and(vec![
            Predicate::eq("country", "us"),
            Predicate::eq("shape", "disk"),
        ]);
        let out = filter(&sightings(), &p).unwrap();
        assert_eq!(out.row_count(), 1);
        assert_eq!(out.raw_rows()[0][2], Value::Number(1800.0));
    }

    #[test]
    fn test_comparison_false_on_missing() {
        let out = filter(&sightings(), &Predicate::ge("seconds", 1800.0)).unwrap();
        assert_eq!(out.row_count(), 2);
        let out = filter(&sightings(), &Predicate::lt("seconds", 1800.0)).unwrap();
        assert_eq!(out.row_count(), 2);
    }

    #[test]
    fn test_ne_and_not_differ_on_missing() {
        let ne = filter(&sightings(), &Predicate::ne("country", "us")).unwrap();
        assert_eq!(countries(&ne), vec![Value::text("ca")]);

        let not = filter(
            &sightings(),
            &Predicate::not(Predicate::eq("country", "us")),
        )
        .unwrap();
        assert_eq!(countries(&not), vec![Value::text("ca"), Value::Missing]);
    }

    #[test]
    fn test_membership_and_missing_checks() {
        let p = Predicate::is_in("country", ["us", "ca"]);
        assert_eq!(filter(&sightings(), &p).unwrap().row_count(), 4);

        let p = Predicate::and(vec![
            Predicate::not_missing("shape"),
            Predicate::not_missing("seconds"),
        ]);
        assert_eq!(filter(&sightings(), &p).unwrap().row_count(), 3);

        let p = Predicate::is_missing("country");
        assert_eq!(filter(&sightings(), &p).unwrap().row_count(), 1);
    }

    #[test]
    fn test_filter_is_stable_and_may_be_empty() {
        let out = filter(&sightings(), &Predicate::eq("country", "us")).unwrap();
        assert_eq!(
            out.column("seconds").unwrap(),
            vec![&Value::Number(1800.0), &Value::Missing, &Value::Number(3600.0)]
        );

        let none = filter(&sightings(), &Predicate::eq("country", "mx")).unwrap();
        assert!(none.is_empty());
        assert_eq!(none.schema(), sightings().schema());
    }

    #[test]
    fn test_empty_conjunction_keeps_everything() {
        let out = filter(&sightings(), &Predicate::and(vec![])).unwrap();
        assert_eq!(out, sightings());
    }

    #[test]
    fn test_unknown_column_fails_before_scan() {
        let p = Predicate::and(vec![
            Predicate::eq("country", "us"),
            Predicate::not_missing("city"),
        ]);
        assert_eq!(
            filter(&sightings(), &p).unwrap_err(),
            Error::unknown_column("city", "filter")
        );
        assert_eq!(p.columns(), vec!["country", "city"]);
    }

    #[test]
    fn test_display() {
        let p = Predicate::and(vec![
            Predicate::ge("seconds", 1800.0),
            Predicate::eq("country", "us"),
        ]);
        assert_eq!(
            p.to_string(),
            "(seconds >= Number(1800.0) & country == Text(\"us\"))"
        );
    }
}
