//! Assembler: raw record + category + extraction -> canonical record

use bancoposta_core::{CanonicalTransaction, Category, ExtractionResult, RawTransaction};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

/// Build the canonical record. Pure: the same inputs always give the same
/// record, id included.
pub fn assemble(
    raw: &RawTransaction,
    category: Category,
    extraction: ExtractionResult,
) -> CanonicalTransaction {
    let transaction_id = transaction_id(
        raw.settlement_date,
        &extraction.payee,
        raw.amount,
        &extraction.memo,
    );

    CanonicalTransaction {
        transaction_date: raw.transaction_date,
        settlement_date: raw.settlement_date,
        amount: raw.amount,
        currency: raw.currency.clone(),
        trn_type: category.trn_type(),
        payee: extraction.payee,
        memo: extraction.memo,
        reference: extraction.reference,
        transaction_id,
    }
}

/// Lowercase hex SHA-256 of `settlement_date|payee|amount|memo`.
///
/// The amount is normalized first so `200.00` and `200` give the same id.
pub fn transaction_id(settlement_date: NaiveDate, payee: &str, amount: Decimal, memo: &str) -> String {
    let fingerprint = format!(
        "{}|{}|{}|{}",
        settlement_date.format("%Y-%m-%d"),
        payee,
        amount.normalize(),
        memo
    );

    let mut hasher = Sha256::new();
    hasher.update(fingerprint.as_bytes());
    format!("{:x}", hasher.finalize())
}
