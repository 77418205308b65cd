use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("PDF text extraction failed for {}: {message}", .path.display())]
    Pdf { path: PathBuf, message: String },

    #[error("unsupported statement file {}: expected .csv or .pdf", .0.display())]
    UnsupportedKind(PathBuf),

    #[error("statement header not found, missing columns: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("line {line}: exactly one of Addebiti/Accrediti must be filled")]
    AmountColumns { line: u64 },

    #[error("line {line}: invalid amount {value:?}")]
    InvalidAmount { line: u64, value: String },

    #[error("line {line}: invalid date {value:?} (expected {format})")]
    InvalidDate {
        line: u64,
        value: String,
        format: String,
    },
}
