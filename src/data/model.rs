use std::collections::HashSet;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::error::PipelineError;

// ---------------------------------------------------------------------------
// CellValue – a single cell of an uploaded table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
/// Using `BTreeSet` / `HashSet` downstream so `CellValue` must be `Ord + Hash`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date string kept as text for simplicity.
    Date(String),
    String(String),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in sets --

// Equality follows `Ord` (and so `Hash`): NaN equals NaN, 0.0 and -0.0 differ.
impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) | (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) | CellValue::Date(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl CellValue {
    /// Infer the value of a text cell the way a CSV reader would.
    pub fn infer(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        match s {
            "true" | "True" | "TRUE" => return CellValue::Bool(true),
            "false" | "False" | "FALSE" => return CellValue::Bool(false),
            _ => {}
        }
        if looks_like_date(s) {
            return CellValue::Date(s.to_string());
        }
        CellValue::String(s.to_string())
    }

    /// Try to interpret the value as an `f64` for plotting.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

fn looks_like_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").is_ok()
}

// ---------------------------------------------------------------------------
// Column / Table – the decoded upload
// ---------------------------------------------------------------------------

/// One named column of a [`Table`].
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

/// Ordered named columns, rows aligned by position.
///
/// Invariants (checked by [`Table::new`]): all columns have the same length
/// and column names are unique.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self, PipelineError> {
        let row_count = columns.first().map_or(0, |c| c.values.len());

        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(PipelineError::InvalidTable(format!(
                    "duplicate column name '{}'",
                    col.name
                )));
            }
            if col.values.len() != row_count {
                return Err(PipelineError::InvalidTable(format!(
                    "column '{}' has {} values, expected {row_count}",
                    col.name,
                    col.values.len()
                )));
            }
        }

        Ok(Table { columns, row_count })
    }

    /// Build a table from a header and row-major records.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self, PipelineError> {
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|name| Column {
                name,
                values: Vec::with_capacity(rows.len()),
            })
            .collect();

        for (row_no, row) in rows.into_iter().enumerate() {
            if row.len() != columns.len() {
                return Err(PipelineError::InvalidTable(format!(
                    "row {row_no} has {} values, expected {}",
                    row.len(),
                    columns.len()
                )));
            }
            for (col, value) in columns.iter_mut().zip(row) {
                col.values.push(value);
            }
        }

        Table::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// The cell at `row` in column `name`.
    pub fn value(&self, name: &str, row: usize) -> Option<&CellValue> {
        self.column(name)?.values.get(row)
    }

    /// Keep the columns whose name satisfies `keep`, in table order.
    pub fn select_columns(&self, mut keep: impl FnMut(&str) -> bool) -> Table {
        let columns: Vec<Column> = self
            .columns
            .iter()
            .filter(|c| keep(&c.name))
            .cloned()
            .collect();
        let row_count = if columns.is_empty() { 0 } else { self.row_count };
        Table { columns, row_count }
    }

    /// Keep the given rows, in the order given.
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: indices.iter().map(|&i| c.values[i].clone()).collect(),
            })
            .collect();
        Table {
            columns,
            row_count: indices.len(),
        }
    }

    /// Re-serialize as comma-delimited text with a header row.
    pub fn to_csv(&self) -> Result<String, PipelineError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        let encode_err = |e: csv::Error| PipelineError::InvalidTable(e.to_string());

        writer
            .write_record(self.columns.iter().map(|c| c.name.as_str()))
            .map_err(encode_err)?;
        for row in 0..self.row_count {
            writer
                .write_record(self.columns.iter().map(|c| c.values[row].to_string()))
                .map_err(encode_err)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| PipelineError::InvalidTable(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| PipelineError::InvalidTable(e.to_string()))
    }
}
