use thiserror::Error;

use super::decoder::FileKind;

/// Why an upload could not be turned into a table. The user must re-upload.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("unsupported file type: '{0}' (expected .csv, .xls, .xlsx, .txt or .tsv)")]
    UnsupportedFileType(String),

    #[error("the uploaded file is empty")]
    Empty,

    #[error("the uploaded file is not valid UTF-8 text: {0}")]
    Encoding(String),

    #[error("could not parse {kind} file: {message}")]
    Malformed { kind: FileKind, message: String },
}

/// Every failure a pipeline stage can report.
///
/// Errors are `Clone` so the session can cache a failed stage result next to
/// the state it was derived from.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("every column must be assigned a data type or deleted")]
    InvalidSelection,

    #[error("the data has no '{0}' column to group by")]
    MissingCategoryColumn(String),

    #[error("select at least one value and a numerical column to plot")]
    EmptySelection,

    #[error("column '{0}' not found")]
    MissingColumn(String),

    #[error("invalid table: {0}")]
    InvalidTable(String),

    #[error("no file has been uploaded")]
    NoUpload,
}
