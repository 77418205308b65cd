use std::path::Path;

use bancoposta_core::RawTransaction;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

/// Columns every BancoPosta export carries, in statement order
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "Data",
    "Valuta",
    "Addebiti",
    "Accrediti",
    "Descrizione operazioni",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Csv,
    Pdf,
}

impl StatementKind {
    /// Detect from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "txt" => Some(StatementKind::Csv),
            "pdf" => Some(StatementKind::Pdf),
            _ => None,
        }
    }
}

/// Reader settings shared by the CSV and PDF readers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderOptions {
    pub delimiter: u8,
    /// chrono format of the Data/Valuta cells
    pub date_format: String,
    pub currency: String,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            date_format: "%d/%m/%y".to_string(),
            currency: "EUR".to_string(),
        }
    }
}

/// How a reader's amount cells are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountFormat {
    /// Italian when the text has a comma, plain decimal otherwise (CSV exports)
    Auto,
    /// Always Italian: `.` groups thousands, `,` is the decimal mark (PDF tables)
    Italian,
}

impl AmountFormat {
    pub fn parse(self, text: &str) -> Option<Decimal> {
        match self {
            AmountFormat::Auto => parse_amount(text),
            AmountFormat::Italian => parse_italian_amount(text),
        }
    }
}

/// One statement row as text cells, before any parsing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementRow {
    /// 1-based source line, for error messages
    pub line: u64,
    pub data: String,
    pub valuta: String,
    pub addebiti: String,
    pub accrediti: String,
    pub description: String,
}

impl StatementRow {
    /// Opening/closing balance lines and repeated headers carry no value date
    pub fn is_balance_row(&self) -> bool {
        let valuta = self.valuta.trim();
        valuta.is_empty() || valuta == "Valuta"
    }

    /// Parse cells into a [`RawTransaction`].
    ///
    /// A blank Data cell falls back to the value date.
    pub fn into_raw(self, opts: &ReaderOptions, format: AmountFormat) -> Result<RawTransaction> {
        let settlement_date = self.parse_date(&self.valuta, opts)?;
        let transaction_date = if self.data.trim().is_empty() {
            settlement_date
        } else {
            self.parse_date(&self.data, opts)?
        };
        let amount = self.amount(format)?;

        Ok(RawTransaction::new(
            self.description.trim(),
            transaction_date,
            settlement_date,
            amount,
            opts.currency.as_str(),
        ))
    }

    /// Credit minus debit. Exactly one of the two cells must be filled.
    pub fn amount(&self, format: AmountFormat) -> Result<Decimal> {
        let debit = self.addebiti.trim();
        let credit = self.accrediti.trim();
        match (debit.is_empty(), credit.is_empty()) {
            (true, false) => Ok(self.parse_cell_amount(credit, format)?.abs()),
            (false, true) => Ok(-self.parse_cell_amount(debit, format)?.abs()),
            _ => Err(IngestError::AmountColumns { line: self.line }),
        }
    }

    fn parse_cell_amount(&self, text: &str, format: AmountFormat) -> Result<Decimal> {
        format.parse(text).ok_or_else(|| IngestError::InvalidAmount {
            line: self.line,
            value: text.to_string(),
        })
    }

    fn parse_date(&self, text: &str, opts: &ReaderOptions) -> Result<NaiveDate> {
        parse_date(text, &opts.date_format).ok_or_else(|| IngestError::InvalidDate {
            line: self.line,
            value: text.trim().to_string(),
            format: opts.date_format.clone(),
        })
    }
}

/// Parse an amount cell.
///
/// Spaces, NBSP and `€` are dropped. Text containing a comma is Italian
/// formatted (`1.234,56`); anything else is a plain decimal (`1234.56`).
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let cleaned = clean_amount(text)?;
    if cleaned.contains(',') {
        italian_to_decimal(&cleaned)
    } else {
        cleaned.parse::<Decimal>().ok()
    }
}

/// Parse an Italian-formatted amount cell; a `.` is always a thousands
/// separator, so `1.000` is one thousand.
pub fn parse_italian_amount(text: &str) -> Option<Decimal> {
    italian_to_decimal(&clean_amount(text)?)
}

fn clean_amount(text: &str) -> Option<String> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '€')
        .collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

fn italian_to_decimal(cleaned: &str) -> Option<Decimal> {
    cleaned.replace('.', "").replace(',', ".").parse::<Decimal>().ok()
}

pub fn parse_date(text: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), format).ok()
}

/// Required column names absent from `cells`
pub fn missing_columns<'a>(cells: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let present: Vec<&str> = cells.into_iter().map(header_cell).collect();
    REQUIRED_COLUMNS
        .iter()
        .filter(|name| !present.contains(*name))
        .map(|name| name.to_string())
        .collect()
}

/// Trim a header cell, including a UTF-8 byte-order mark on the first one
pub(crate) fn header_cell(cell: &str) -> &str {
    cell.trim_start_matches('\u{feff}').trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(addebiti: &str, accrediti: &str) -> StatementRow {
        StatementRow {
            line: 7,
            data: "03/01/18".to_string(),
            valuta: "03/01/18".to_string(),
            addebiti: addebiti.to_string(),
            accrediti: accrediti.to_string(),
            description: " IMPOSTA DI BOLLO ".to_string(),
        }
    }

    #[test]
    fn test_parse_amount_formats() {
        assert_eq!(parse_amount("2.90"), Some(Decimal::new(290, 2)));
        assert_eq!(parse_amount("2,90"), Some(Decimal::new(290, 2)));
        assert_eq!(parse_amount("1.234,56"), Some(Decimal::new(123456, 2)));
        assert_eq!(parse_amount("€ 1 234,56"), Some(Decimal::new(123456, 2)));
        assert_eq!(parse_amount("1\u{a0}000,00"), Some(Decimal::new(100000, 2)));
        assert_eq!(parse_amount("-250.00"), Some(Decimal::new(-25000, 2)));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("abc"), None);
    }

    #[test]
    fn test_italian_amount_dot_groups_thousands() {
        assert_eq!(parse_italian_amount("1.000"), Some(Decimal::new(1000, 0)));
        assert_eq!(parse_italian_amount("12.345.678"), Some(Decimal::new(12345678, 0)));
        assert_eq!(parse_italian_amount("1.234,56"), Some(Decimal::new(123456, 2)));
        assert_eq!(parse_italian_amount("2,00"), Some(Decimal::new(200, 2)));
        assert_eq!(parse_italian_amount(" "), None);

        // Auto keeps a lone dot as the decimal mark
        assert_eq!(AmountFormat::Auto.parse("1.000"), Some(Decimal::new(1000, 3)));
        assert_eq!(AmountFormat::Italian.parse("1.000"), Some(Decimal::new(1000, 0)));
    }

    #[test]
    fn test_amount_sign_from_column() {
        assert_eq!(row("2.90", "").amount(AmountFormat::Auto).unwrap(), Decimal::new(-290, 2));
        assert_eq!(row("-2.90", "").amount(AmountFormat::Auto).unwrap(), Decimal::new(-290, 2));
        assert_eq!(row("", "250.00").amount(AmountFormat::Auto).unwrap(), Decimal::new(25000, 2));
        assert_eq!(row("1.500", "").amount(AmountFormat::Italian).unwrap(), Decimal::new(-1500, 0));
    }

    #[test]
    fn test_amount_columns_must_be_exclusive() {
        let auto = AmountFormat::Auto;
        assert!(matches!(row("", "").amount(auto), Err(IngestError::AmountColumns { line: 7 })));
        assert!(matches!(row("1", "1").amount(auto), Err(IngestError::AmountColumns { line: 7 })));
        assert!(matches!(row("x", "").amount(auto), Err(IngestError::InvalidAmount { line: 7, .. })));
    }

    #[test]
    fn test_into_raw() {
        let raw = row("2.90", "").into_raw(&ReaderOptions::default(), AmountFormat::Auto).unwrap();
        assert_eq!(raw.narration, "IMPOSTA DI BOLLO");
        assert_eq!(raw.settlement_date, NaiveDate::from_ymd_opt(2018, 1, 3).unwrap());
        assert_eq!(raw.currency, "EUR");
    }

    #[test]
    fn test_into_raw_blank_data_uses_valuta() {
        let mut r = row("2.90", "");
        r.data.clear();
        let raw = r.into_raw(&ReaderOptions::default(), AmountFormat::Auto).unwrap();
        assert_eq!(raw.transaction_date, raw.settlement_date);
    }

    #[test]
    fn test_into_raw_bad_date() {
        let mut r = row("2.90", "");
        r.valuta = "2018-01-03".to_string();
        let err = r.into_raw(&ReaderOptions::default(), AmountFormat::Auto).unwrap_err();
        assert!(matches!(err, IngestError::InvalidDate { line: 7, .. }));
        assert!(err.to_string().contains("%d/%m/%y"));
    }

    #[test]
    fn test_balance_rows() {
        let mut r = row("", "");
        r.valuta = "  ".to_string();
        assert!(r.is_balance_row());
        r.valuta = "Valuta".to_string();
        assert!(r.is_balance_row());
    }

    #[test]
    fn test_missing_columns() {
        let header = ["\u{feff}Data", " Valuta ", "Addebiti", "Accrediti", "Descrizione operazioni", "Saldo"];
        assert!(missing_columns(header).is_empty());
        assert_eq!(missing_columns(["Data", "Valuta"]), vec!["Addebiti", "Accrediti", "Descrizione operazioni"]);
    }

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(StatementKind::from_path(Path::new("estratto.CSV")), Some(StatementKind::Csv));
        assert_eq!(StatementKind::from_path(Path::new("a/b/estratto.pdf")), Some(StatementKind::Pdf));
        assert_eq!(StatementKind::from_path(Path::new("estratto.xlsx")), None);
        assert_eq!(StatementKind::from_path(Path::new("estratto")), None);
    }
}
