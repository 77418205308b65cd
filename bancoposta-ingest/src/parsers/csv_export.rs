//! BancoPosta CSV export reader
//!
//! Exports open with a few account summary lines, then:
//!   Data,Valuta,Addebiti,Accrediti,Descrizione operazioni
//! followed by one row per movement. Opening/closing balance rows carry no
//! Valuta and are skipped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use bancoposta_core::RawTransaction;
use csv::StringRecord;
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::types::{AmountFormat, REQUIRED_COLUMNS, ReaderOptions, StatementRow, header_cell, missing_columns};

/// Position of each required column in the header record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndex {
    data: usize,
    valuta: usize,
    addebiti: usize,
    accrediti: usize,
    description: usize,
}

impl ColumnIndex {
    /// Locate all required columns, or return the names that are missing
    fn locate(record: &StringRecord) -> std::result::Result<Self, Vec<String>> {
        let position = |name: &str| record.iter().position(|cell| header_cell(cell) == name);
        match (
            position(REQUIRED_COLUMNS[0]),
            position(REQUIRED_COLUMNS[1]),
            position(REQUIRED_COLUMNS[2]),
            position(REQUIRED_COLUMNS[3]),
            position(REQUIRED_COLUMNS[4]),
        ) {
            (Some(data), Some(valuta), Some(addebiti), Some(accrediti), Some(description)) => Ok(Self {
                data,
                valuta,
                addebiti,
                accrediti,
                description,
            }),
            _ => Err(missing_columns(record.iter())),
        }
    }

    fn row(&self, record: &StringRecord, line: u64) -> StatementRow {
        let cell = |i: usize| record.get(i).unwrap_or("").trim().to_string();
        StatementRow {
            line,
            data: cell(self.data),
            valuta: cell(self.valuta),
            addebiti: cell(self.addebiti),
            accrediti: cell(self.accrediti),
            description: cell(self.description),
        }
    }
}

/// Read a CSV export from disk
pub fn read_csv(path: impl AsRef<Path>, opts: &ReaderOptions) -> Result<Vec<RawTransaction>> {
    let file = File::open(path.as_ref())?;
    parse_csv_reader(file, opts)
}

/// Parse CSV export text already in memory
pub fn parse_csv_text(text: &str, opts: &ReaderOptions) -> Result<Vec<RawTransaction>> {
    parse_csv_reader(text.as_bytes(), opts)
}

pub fn parse_csv_reader<R: Read>(reader: R, opts: &ReaderOptions) -> Result<Vec<RawTransaction>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .delimiter(opts.delimiter)
        .from_reader(reader);

    let mut columns: Option<ColumnIndex> = None;
    let mut best_missing: Vec<String> = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
    let mut txns = Vec::new();

    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        // Skip until we find the header row
        let Some(index) = &columns else {
            match ColumnIndex::locate(&record) {
                Ok(found) => columns = Some(found),
                Err(missing) if missing.len() < best_missing.len() => best_missing = missing,
                Err(_) => {}
            }
            continue;
        };

        let row = index.row(&record, line);
        if row.is_balance_row() {
            debug!(line, description = %row.description, "skipping row without value date");
            continue;
        }
        txns.push(row.into_raw(opts, AmountFormat::Auto)?);
    }

    if columns.is_none() {
        return Err(IngestError::MissingColumns { missing: best_missing });
    }

    debug!(count = txns.len(), "parsed CSV export");
    Ok(txns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    const EXPORT: &str = "\
Conto,BancoPosta
Intestatario,MARIO ROSSI
Data,Valuta,Addebiti,Accrediti,Descrizione operazioni
01/01/18,,,,SALDO INIZIALE
03/01/18,03/01/18,2.90,,IMPOSTA DI BOLLO
13/01/18,13/01/18,250.00,,ADDEBITO PER RICARICA CARTA PREPAGATA DA APP/WEB Ricarica Postepay da APP addebito su conto
13/01/18,13/01/18,1.00,,COMMISSIONE RICARICA PREPAGATA ADDEBITO PER RICARICA CARTA PREPAGATA DA APP/WEB Ricarica Postepay da APP addebito su conto
22/01/18,23/01/18,,250.00,BONIFICO A VOSTRO FAVORE TRN XXXX DA NOME_MITTENTE PER CAUSALE_BONIFICO
31/01/18,,,,SALDO FINALE
";

    #[test]
    fn test_parse_export() {
        let txns = parse_csv_text(EXPORT, &ReaderOptions::default()).unwrap();
        assert_eq!(txns.len(), 4);

        assert_eq!(txns[0].narration, "IMPOSTA DI BOLLO");
        assert_eq!(txns[0].amount, Decimal::new(-290, 2));
        assert_eq!(txns[0].settlement_date, NaiveDate::from_ymd_opt(2018, 1, 3).unwrap());

        assert_eq!(txns[3].amount, Decimal::new(25000, 2));
        assert_eq!(txns[3].transaction_date, NaiveDate::from_ymd_opt(2018, 1, 22).unwrap());
        assert_eq!(txns[3].settlement_date, NaiveDate::from_ymd_opt(2018, 1, 23).unwrap());
        assert!(txns.iter().all(|t| t.currency == "EUR"));
    }

    #[test]
    fn test_columns_in_any_order_with_extras() {
        let text = "\
Descrizione operazioni;Saldo;Accrediti;Addebiti;Valuta;Data
POSTAGIRO DA Lorenzo Giudici PER Pizze;1000,00;200,00;;01/08/2018;01/08/2018
";
        let opts = ReaderOptions {
            delimiter: b';',
            date_format: "%d/%m/%Y".to_string(),
            currency: "EUR".to_string(),
        };
        let txns = parse_csv_text(text, &opts).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].amount, Decimal::new(20000, 2));
        assert_eq!(txns[0].narration, "POSTAGIRO DA Lorenzo Giudici PER Pizze");
    }

    #[test]
    fn test_missing_header_reports_best_candidate() {
        let text = "Data,Valuta,Importo,Descrizione operazioni\n01/08/18,01/08/18,10.00,X\n";
        match parse_csv_text(text, &ReaderOptions::default()) {
            Err(IngestError::MissingColumns { missing }) => {
                assert_eq!(missing, vec!["Addebiti", "Accrediti"]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_both_amounts_is_an_error() {
        let text = "Data,Valuta,Addebiti,Accrediti,Descrizione operazioni\n01/08/18,01/08/18,1.00,2.00,X\n";
        let err = parse_csv_text(text, &ReaderOptions::default()).unwrap_err();
        assert!(matches!(err, IngestError::AmountColumns { line: 2 }));
    }

    #[test]
    fn test_quoted_description_with_delimiter() {
        let text = "Data,Valuta,Addebiti,Accrediti,Descrizione operazioni\n\
01/08/18,01/08/18,\"1.234,50\",,\"PAGAMENTO POSTAMAT 01/08/2018 10.27 BAR, CAFFE OPERAZIONE A CARTA 1\"\n";
        let txns = parse_csv_text(text, &ReaderOptions::default()).unwrap();
        assert_eq!(txns[0].amount, Decimal::new(-123450, 2));
        assert!(txns[0].narration.contains("BAR, CAFFE"));
    }
}
