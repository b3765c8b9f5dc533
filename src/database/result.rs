use std::fmt;

use crate::error::{ShellError, ShellResult};

/// A single value returned by SQLite.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Integer(i64),
    Real(f64),
    Text(String),
    Null,
    Blob(Vec<u8>),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(i) => write!(f, "{}", i),
            // Integral reals print as `3.0` or `1e16`, never like an integer.
            CellValue::Real(r) if r.is_finite() && r.fract() == 0.0 => write!(f, "{:?}", r),
            CellValue::Real(r) => write!(f, "{}", r),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Null => f.write_str("NULL"),
            CellValue::Blob(bytes) => {
                f.write_str("X'")?;
                for b in bytes {
                    write!(f, "{:02X}", b)?;
                }
                f.write_str("'")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

pub type Row = Vec<CellValue>;

/// Columns plus column-aligned rows, as returned by a row-producing statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl ResultSet {
    pub fn new(columns: Vec<Column>, rows: Vec<Row>) -> ShellResult<Self> {
        let mut result = Self::with_columns(columns);
        for row in rows {
            result.push_row(row)?;
        }
        Ok(result)
    }

    pub fn with_columns(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Row) -> ShellResult<()> {
        if row.len() != self.columns.len() {
            return Err(ShellError::RowArity {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// What executing one statement produced.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementOutcome {
    Rows(ResultSet),
    Changed(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stringifies_every_variant() {
        assert_eq!(CellValue::Integer(-42).to_string(), "-42");
        assert_eq!(CellValue::Real(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Real(3.0).to_string(), "3.0");
        assert_eq!(CellValue::Real(-0.0).to_string(), "-0.0");
        assert_eq!(CellValue::Real(1e16).to_string(), "1e16");
        assert_eq!(CellValue::Real(123456789012345.0).to_string(), "123456789012345.0");
        assert_eq!(CellValue::Text("héllo".into()).to_string(), "héllo");
        assert_eq!(CellValue::Null.to_string(), "NULL");
        assert_eq!(CellValue::Blob(vec![0x01, 0xab]).to_string(), "X'01AB'");
    }

    #[test]
    fn rejects_rows_of_the_wrong_width() {
        let err = ResultSet::new(
            vec![Column::new("id"), Column::new("name")],
            vec![vec![CellValue::Integer(1)]],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ShellError::RowArity {
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn keeps_row_order() {
        let result = ResultSet::new(
            vec![Column::new("id")],
            vec![vec![CellValue::Integer(2)], vec![CellValue::Integer(1)]],
        )
        .unwrap();
        assert_eq!(result.rows()[0], vec![CellValue::Integer(2)]);
        assert!(!result.is_empty());
    }
}
