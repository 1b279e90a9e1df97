use std::collections::HashMap;
use std::fmt;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use super::error::DecodeError;
use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// The parse strategy picked for an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Comma-delimited text.
    Csv,
    /// `.xls` / `.xlsx` workbook, first sheet.
    Spreadsheet,
    /// Text split on runs of whitespace.
    Whitespace,
}

impl FileKind {
    /// Pick a parser from the filename.
    ///
    /// Matching is a case-sensitive substring test checked in a fixed order:
    /// `csv`, then `xls`, then `txt` or `tsv`. The first hit wins, so
    /// `prices.csv.txt` decodes as CSV.
    pub fn detect(filename: &str) -> Option<FileKind> {
        if filename.contains("csv") {
            Some(FileKind::Csv)
        } else if filename.contains("xls") {
            Some(FileKind::Spreadsheet)
        } else if filename.contains("txt") || filename.contains("tsv") {
            Some(FileKind::Whitespace)
        } else {
            None
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Csv => write!(f, "CSV"),
            FileKind::Spreadsheet => write!(f, "spreadsheet"),
            FileKind::Whitespace => write!(f, "whitespace-delimited"),
        }
    }
}

/// Decode an uploaded file into a [`Table`].  Dispatch by filename.
///
/// Supported formats:
/// * `.csv`         – header row, comma separated
/// * `.xls`/`.xlsx` – first worksheet, first row holds the headers
/// * `.txt`/`.tsv`  – header row, fields separated by any run of whitespace
///
/// Nothing partial is returned: any failure yields a [`DecodeError`].
pub fn decode(bytes: &[u8], filename: &str) -> Result<Table, DecodeError> {
    let kind = FileKind::detect(filename)
        .ok_or_else(|| DecodeError::UnsupportedFileType(filename.to_string()))?;

    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let (headers, rows) = match kind {
        FileKind::Csv => read_csv(utf8(bytes)?)?,
        FileKind::Spreadsheet => read_spreadsheet(bytes)?,
        FileKind::Whitespace => read_whitespace(utf8(bytes)?)?,
    };

    let table = Table::from_rows(dedupe_headers(headers), rows).map_err(|e| {
        DecodeError::Malformed {
            kind,
            message: e.to_string(),
        }
    })?;

    log::info!(
        "Decoded '{filename}' as {kind}: {} rows, columns {:?}",
        table.row_count(),
        table.column_names()
    );
    Ok(table)
}

type Records = (Vec<String>, Vec<Vec<CellValue>>);

fn utf8(bytes: &[u8]) -> Result<&str, DecodeError> {
    let text = std::str::from_utf8(bytes).map_err(|e| DecodeError::Encoding(e.to_string()))?;
    // Spreadsheet exports often carry a byte-order mark.
    Ok(text.trim_start_matches('\u{feff}'))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn read_csv(text: &str) -> Result<Records, DecodeError> {
    let malformed = |message: String| DecodeError::Malformed {
        kind: FileKind::Csv,
        message,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| malformed(format!("reading headers: {e}")))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(DecodeError::Empty);
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| malformed(format!("row {row_no}: {e}")))?;
        let fields: Vec<&str> = record.iter().collect();
        rows.push(pad_row(&fields, headers.len(), row_no).map_err(malformed)?);
    }

    Ok((headers, rows))
}

// ---------------------------------------------------------------------------
// Whitespace-delimited loader
// ---------------------------------------------------------------------------

fn read_whitespace(text: &str) -> Result<Records, DecodeError> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let headers: Vec<String> = lines
        .next()
        .ok_or(DecodeError::Empty)?
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for (row_no, line) in lines.enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let row = pad_row(&fields, headers.len(), row_no).map_err(|message| {
            DecodeError::Malformed {
                kind: FileKind::Whitespace,
                message,
            }
        })?;
        rows.push(row);
    }

    Ok((headers, rows))
}

/// Short rows are padded with nulls; long rows are rejected.
fn pad_row(fields: &[&str], width: usize, row_no: usize) -> Result<Vec<CellValue>, String> {
    if fields.len() > width {
        return Err(format!(
            "row {row_no}: expected {width} fields, saw {}",
            fields.len()
        ));
    }
    let mut row: Vec<CellValue> = fields.iter().map(|f| CellValue::infer(f)).collect();
    row.resize(width, CellValue::Null);
    Ok(row)
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

fn read_spreadsheet(bytes: &[u8]) -> Result<Records, DecodeError> {
    let malformed = |message: String| DecodeError::Malformed {
        kind: FileKind::Spreadsheet,
        message,
    };

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| malformed(format!("opening workbook: {e}")))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| malformed("workbook has no worksheets".to_string()))?
        .map_err(|e| malformed(format!("reading first worksheet: {e}")))?;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = sheet_rows
        .next()
        .ok_or(DecodeError::Empty)?
        .iter()
        .map(|cell| cell_to_value(cell).to_string())
        .collect();

    let rows = sheet_rows
        .map(|r| {
            let mut row: Vec<CellValue> = r.iter().map(cell_to_value).collect();
            row.resize(headers.len(), CellValue::Null);
            row
        })
        .collect();

    Ok((headers, rows))
}

fn cell_to_value(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            CellValue::Integer(*f as i64)
        }
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::infer(s),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) if ndt.time() == chrono::NaiveTime::MIN => {
                CellValue::Date(ndt.format("%Y-%m-%d").to_string())
            }
            Some(ndt) => CellValue::Date(ndt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) => CellValue::Date(s.clone()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(format!("{e:?}")),
        Data::Empty => CellValue::Null,
    }
}

/// Rename repeated headers `A`, `A` → `A`, `A.1`, the way pandas does.
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<String> = Vec::with_capacity(headers.len());

    for name in headers {
        let mut candidate = name.clone();
        while out.contains(&candidate) {
            let n = counts.entry(name.clone()).or_insert(0);
            *n += 1;
            candidate = format!("{name}.{n}");
        }
        out.push(candidate);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRICES: &str = "Date,Stock,Price\n2020-01-01,A,10\n2020-01-01,B,20\n2020-01-02,A,11\n";

    #[test]
    fn detects_kind_by_substring_in_priority_order() {
        assert_eq!(FileKind::detect("prices.csv"), Some(FileKind::Csv));
        assert_eq!(FileKind::detect("prices.xlsx"), Some(FileKind::Spreadsheet));
        assert_eq!(FileKind::detect("prices.xls"), Some(FileKind::Spreadsheet));
        assert_eq!(FileKind::detect("prices.tsv"), Some(FileKind::Whitespace));
        assert_eq!(FileKind::detect("prices.txt"), Some(FileKind::Whitespace));
        assert_eq!(FileKind::detect("csv_export.xlsx"), Some(FileKind::Csv));
        assert_eq!(FileKind::detect("prices.CSV"), None);
        assert_eq!(FileKind::detect("prices.json"), None);
    }

    #[test]
    fn decodes_csv() {
        let table = decode(PRICES.as_bytes(), "prices.csv").unwrap();
        assert_eq!(table.column_names(), vec!["Date", "Stock", "Price"]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.value("Price", 2), Some(&CellValue::Integer(11)));
        assert_eq!(
            table.value("Date", 0),
            Some(&CellValue::Date("2020-01-01".into()))
        );
    }

    fn round_trip(csv: &str) -> (Table, Table) {
        let table = decode(csv.as_bytes(), "in.csv").unwrap();
        let text = table.to_csv().unwrap();
        let again = decode(text.as_bytes(), "out.csv").unwrap();
        assert_eq!(again.column_names(), table.column_names(), "written:\n{text}");
        assert_eq!(again.row_count(), table.row_count(), "written:\n{text}");
        (table, again)
    }

    #[test]
    fn csv_round_trips_names_and_row_count() {
        round_trip(PRICES);
    }

    #[test]
    fn csv_round_trips_quoted_fields() {
        let csv = "Name,Note,Price\n\"Acme, Inc.\",\"line one\nline two\",10.5\nPlain,\"say \"\"hi\"\"\",3\n";
        let (table, again) = round_trip(csv);
        assert_eq!(table.row_count(), 2);
        assert_eq!(again.value("Name", 0), Some(&CellValue::from("Acme, Inc.")));
        assert_eq!(
            again.value("Note", 0),
            Some(&CellValue::from("line one\nline two"))
        );
        assert_eq!(again.value("Note", 1), Some(&CellValue::from("say \"hi\"")));
        assert_eq!(again.value("Price", 0), Some(&CellValue::Float(10.5)));
    }

    #[test]
    fn csv_round_trips_single_column_with_empty_cells() {
        let (table, again) = round_trip("Stock\nA\n\"\"\nB\n");
        assert_eq!(table.row_count(), 3);
        assert_eq!(again.value("Stock", 1), Some(&CellValue::Null));
        assert_eq!(again.value("Stock", 2), Some(&CellValue::from("B")));
    }

    #[test]
    fn csv_round_trips_header_only() {
        let (table, _) = round_trip("Date,Stock,Price\n");
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_names(), vec!["Date", "Stock", "Price"]);
    }

    #[test]
    fn csv_round_trips_renamed_duplicate_headers() {
        let (table, again) = round_trip("A,A,B,A\n1,2,3,4\n");
        assert_eq!(table.column_names(), vec!["A", "A.1", "B", "A.2"]);
        assert_eq!(again.value("A.2", 0), Some(&CellValue::Integer(4)));
    }

    #[test]
    fn decodes_xlsx_workbook() {
        let bytes = include_bytes!("../../tests/data/prices.xlsx");
        let table = decode(bytes, "prices.xlsx").unwrap();

        assert_eq!(table.column_names(), vec!["Date", "Stock", "Price", "Volume"]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.value("Date", 0), Some(&CellValue::Date("2020-01-01".into())));
        assert_eq!(table.value("Date", 2), Some(&CellValue::Date("2020-01-02".into())));
        assert_eq!(table.value("Stock", 1), Some(&CellValue::from("B")));
        assert_eq!(table.value("Price", 0), Some(&CellValue::Float(10.5)));
        // Whole-number floats come back as integers.
        assert_eq!(table.value("Price", 1), Some(&CellValue::Integer(20)));
        assert_eq!(table.value("Volume", 0), Some(&CellValue::Integer(100)));
    }

    #[test]
    fn decodes_whitespace_text() {
        let text = "Date   Stock\tPrice\n\n2020-01-01 A 10\n  2020-01-02  B  12.5\n";
        let table = decode(text.as_bytes(), "prices.txt").unwrap();
        assert_eq!(table.column_names(), vec!["Date", "Stock", "Price"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.value("Price", 1), Some(&CellValue::Float(12.5)));
    }

    #[test]
    fn tsv_uses_whitespace_parser() {
        let table = decode(b"a\tb\n1\t2\n", "data.tsv").unwrap();
        assert_eq!(table.column_names(), vec!["a", "b"]);
    }

    #[test]
    fn pads_short_rows_and_rejects_long_ones() {
        let table = decode(b"a,b,c\n1,2\n", "short.csv").unwrap();
        assert_eq!(table.value("c", 0), Some(&CellValue::Null));

        let err = decode(b"a,b\n1,2,3\n", "long.csv").unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { kind: FileKind::Csv, .. }));
    }

    #[test]
    fn renames_duplicate_headers() {
        let table = decode(b"A,A,B,A\n1,2,3,4\n", "dup.csv").unwrap();
        assert_eq!(table.column_names(), vec!["A", "A.1", "B", "A.2"]);
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = decode(PRICES.as_bytes(), "prices.json").unwrap_err();
        assert_eq!(err, DecodeError::UnsupportedFileType("prices.json".into()));
    }

    #[test]
    fn rejects_empty_payload() {
        assert_eq!(decode(b"", "empty.csv").unwrap_err(), DecodeError::Empty);
        assert_eq!(decode(b"\n\n", "blank.txt").unwrap_err(), DecodeError::Empty);
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = decode(&[0x66, 0xff, 0xfe, 0x0a], "bad.csv").unwrap_err();
        assert!(matches!(err, DecodeError::Encoding(_)));
    }

    #[test]
    fn rejects_garbage_spreadsheet() {
        let err = decode(b"definitely not a workbook", "book.xlsx").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Malformed { kind: FileKind::Spreadsheet, .. }
        ));
    }
}
