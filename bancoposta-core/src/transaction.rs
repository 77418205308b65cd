//! Transaction records: reader input, extraction output and the canonical record

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::category::TrnType;

/// One statement row as handed over by a reader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    /// "Descrizione operazioni" as printed by the bank
    pub narration: String,
    /// Booking date ("Data")
    pub transaction_date: NaiveDate,
    /// Value date ("Valuta")
    pub settlement_date: NaiveDate,
    /// Positive = credit (money in), negative = debit
    pub amount: Decimal,
    pub currency: String,
}

impl RawTransaction {
    pub fn new(
        narration: impl Into<String>,
        transaction_date: NaiveDate,
        settlement_date: NaiveDate,
        amount: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            narration: narration.into(),
            transaction_date,
            settlement_date,
            amount,
            currency: currency.into(),
        }
    }
}

/// Payee and memo pulled out of a narration by a category extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub payee: String,
    pub memo: String,
    /// Bank reference carried by the narration (TRN, operation code)
    pub reference: Option<String>,
}

impl ExtractionResult {
    /// Build a result, trimming surrounding whitespace from both fields
    pub fn new(payee: impl AsRef<str>, memo: impl AsRef<str>) -> Self {
        Self {
            payee: payee.as_ref().trim().to_string(),
            memo: memo.as_ref().trim().to_string(),
            reference: None,
        }
    }

    /// Use the whole narration as both payee and memo
    pub fn echo(narration: &str) -> Self {
        Self::new(narration, narration)
    }

    pub fn with_reference(mut self, reference: Option<String>) -> Self {
        self.reference = reference
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        self
    }
}

/// Normalized record handed to the output writer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalTransaction {
    pub transaction_date: NaiveDate,
    pub settlement_date: NaiveDate,
    /// Positive = income, negative = expense
    pub amount: Decimal,
    pub currency: String,
    pub trn_type: TrnType,
    pub payee: String,
    pub memo: String,
    pub reference: Option<String>,
    /// Stable id derived from the record's own fields
    pub transaction_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_extraction_result_trims() {
        let r = ExtractionResult::new("  Lorenzo Giudici ", "\tPizze\n");
        assert_eq!(r.payee, "Lorenzo Giudici");
        assert_eq!(r.memo, "Pizze");
        assert_eq!(r.reference, None);
    }

    #[test]
    fn test_blank_reference_is_dropped() {
        let r = ExtractionResult::echo("X").with_reference(Some("   ".to_string()));
        assert_eq!(r.reference, None);

        let r = ExtractionResult::echo("X").with_reference(Some(" AB12 ".to_string()));
        assert_eq!(r.reference.as_deref(), Some("AB12"));
    }

    #[test]
    fn test_raw_transaction_new() {
        let raw = RawTransaction::new(
            "IMPOSTA DI BOLLO",
            date(2018, 1, 3),
            date(2018, 1, 4),
            Decimal::new(-290, 2),
            "EUR",
        );
        assert_eq!(raw.narration, "IMPOSTA DI BOLLO");
        assert_eq!(raw.transaction_date, date(2018, 1, 3));
        assert_eq!(raw.settlement_date, date(2018, 1, 4));
        assert_eq!(raw.currency, "EUR");
    }

    #[test]
    fn test_canonical_serializes_ofx_code() {
        let tx = CanonicalTransaction {
            transaction_date: date(2018, 8, 1),
            settlement_date: date(2018, 8, 1),
            amount: Decimal::new(20000, 2),
            currency: "EUR".to_string(),
            trn_type: TrnType::Xfer,
            payee: "Lorenzo Giudici".to_string(),
            memo: "Pizze".to_string(),
            reference: None,
            transaction_id: "abc".to_string(),
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["trn_type"], "XFER");
        assert_eq!(json["payee"], "Lorenzo Giudici");
    }
}
