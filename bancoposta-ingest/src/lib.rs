//! bancoposta-ingest: BancoPosta statement readers (CSV export, PDF table text)
//! producing raw transactions for the classifier.

pub mod error;
pub mod parsers;
pub mod types;

use std::path::Path;

use bancoposta_core::RawTransaction;
use tracing::info;

pub use error::{IngestError, Result};
pub use types::{
    AmountFormat, REQUIRED_COLUMNS, ReaderOptions, StatementKind, StatementRow, parse_amount, parse_date,
    parse_italian_amount,
};

/// Read a statement file. `kind` overrides detection from the extension.
pub fn read_statement(
    path: impl AsRef<Path>,
    kind: Option<StatementKind>,
    opts: &ReaderOptions,
) -> Result<Vec<RawTransaction>> {
    let path = path.as_ref();
    let kind = kind
        .or_else(|| StatementKind::from_path(path))
        .ok_or_else(|| IngestError::UnsupportedKind(path.to_path_buf()))?;

    info!(path = %path.display(), ?kind, "reading statement");
    match kind {
        StatementKind::Csv => parsers::read_csv(path, opts),
        StatementKind::Pdf => parsers::read_pdf(path, opts),
    }
}
