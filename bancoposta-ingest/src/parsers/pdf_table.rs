//! BancoPosta PDF statement reader (text)
//!
//! Text is pulled out of the PDF, then the movements table is rebuilt from the
//! extracted lines:
//!
//!   Data      Valuta      Addebiti   Accrediti  Descrizione operazioni
//!   01/08/18  01/08/18                  200,00  POSTAGIRO DA Lorenzo Giudici
//!                                               PER Pizze
//!
//! The header line fixes where each column sits. Every word of a later line
//! goes to the column whose header label it overlaps, or else the nearest
//! one. A line with no Data cell continues the previous row's description;
//! a line whose Data cell is not a date is page furniture.
//! Each page repeats the header, which re-anchors the columns.

use std::path::Path;
use std::sync::OnceLock;

use bancoposta_core::RawTransaction;
use regex::Regex;
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::types::{AmountFormat, REQUIRED_COLUMNS, ReaderOptions, StatementRow, parse_date};

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\S+").expect("word regex"))
}

/// Character span of each header label, indexed like [`REQUIRED_COLUMNS`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnLayout {
    labels: [(usize, usize); 5],
}

impl ColumnLayout {
    /// Layout of a header line, if the line names all five columns
    fn from_header(line: &str) -> Option<Self> {
        let mut labels = [(0, 0); 5];
        for (slot, name) in labels.iter_mut().zip(REQUIRED_COLUMNS) {
            let byte = line.find(name)?;
            let start = line[..byte].chars().count();
            *slot = (start, start + name.chars().count());
        }
        Some(Self { labels })
    }

    /// Column a word spanning `start..end` (characters) belongs to
    fn column_of(&self, start: usize, end: usize) -> usize {
        self.labels
            .iter()
            .enumerate()
            .min_by_key(|&(_, &(lo, hi))| {
                let gap = if end <= lo {
                    lo - end
                } else if start >= hi {
                    start - hi
                } else {
                    0
                };
                let overlap = end.min(hi).saturating_sub(start.max(lo));
                (gap, std::cmp::Reverse(overlap))
            })
            .map(|(i, _)| i)
            .unwrap_or(REQUIRED_COLUMNS.len() - 1)
    }

    /// Split a table line into the five cells
    fn cells(&self, line: &str) -> [String; 5] {
        let mut cells: [Vec<&str>; 5] = Default::default();
        for m in word_re().find_iter(line) {
            let start = line[..m.start()].chars().count();
            let end = start + m.as_str().chars().count();
            cells[self.column_of(start, end)].push(m.as_str());
        }
        cells.map(|words| words.join(" "))
    }
}

/// Rebuild table rows from extracted statement text, continuation lines
/// merged. Balance rows are kept; callers filter them. Lines whose Data cell
/// is not a date in `date_format` (page numbers, footers) are dropped.
pub fn table_rows(text: &str, date_format: &str) -> Result<Vec<StatementRow>> {
    let mut layout: Option<ColumnLayout> = None;
    let mut fewest_missing: Vec<String> = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
    let mut rows: Vec<StatementRow> = Vec::new();

    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(found) = ColumnLayout::from_header(line) {
            layout = Some(found);
            continue;
        }
        let Some(columns) = &layout else {
            let missing: Vec<String> = REQUIRED_COLUMNS
                .iter()
                .filter(|name| !line.contains(*name))
                .map(|name| name.to_string())
                .collect();
            if missing.len() < fewest_missing.len() {
                fewest_missing = missing;
            }
            continue;
        };

        let [data, valuta, addebiti, accrediti, description] = columns.cells(line);
        if data.is_empty() {
            match rows.last_mut() {
                Some(prev) if !description.is_empty() => {
                    prev.description.push(' ');
                    prev.description.push_str(&description);
                }
                _ => debug!(line = i + 1, "ignoring line outside any row"),
            }
            continue;
        }
        if parse_date(&data, date_format).is_none() {
            debug!(line = i + 1, text = line.trim(), "ignoring page text");
            continue;
        }

        rows.push(StatementRow {
            line: (i + 1) as u64,
            data,
            valuta,
            addebiti,
            accrediti,
            description,
        });
    }

    if layout.is_none() {
        return Err(IngestError::MissingColumns { missing: fewest_missing });
    }
    Ok(rows)
}

/// Parse extracted statement text into transactions. Amount cells are
/// always Italian formatted, so `1.000` is one thousand.
pub fn parse_pdf_text(text: &str, opts: &ReaderOptions) -> Result<Vec<RawTransaction>> {
    let mut txns = Vec::new();
    for row in table_rows(text, &opts.date_format)? {
        if row.is_balance_row() {
            debug!(line = row.line, description = %row.description, "skipping row without value date");
            continue;
        }
        txns.push(row.into_raw(opts, AmountFormat::Italian)?);
    }
    debug!(count = txns.len(), "parsed PDF statement");
    Ok(txns)
}

/// Extract the text of a PDF statement and parse it
pub fn read_pdf(path: impl AsRef<Path>, opts: &ReaderOptions) -> Result<Vec<RawTransaction>> {
    let path = path.as_ref();
    let text = pdf_extract::extract_text(path).map_err(|e| IngestError::Pdf {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_pdf_text(&text, opts)
}
