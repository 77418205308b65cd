//! Per-category payee/memo extraction.
//!
//! Each category has one pure function from narration to [`ExtractionResult`].
//! None of them fail: when the markers a layout relies on are missing the
//! function falls back to a fixed, documented result (usually the whole
//! narration as both payee and memo).
//!
//! Delimiter words (`DA`, `BENEF`, `PER`, `TRN`, `OPERAZIONE`, `CARTA`) only
//! count when they stand alone between whitespace, so `DANIELE` or `PERUGIA`
//! never split a name. Literal markers (`Ricarica`, `CID`, `ADDEBITO`) are
//! plain substrings.

use std::sync::OnceLock;

use bancoposta_core::{Category, ExtractionResult};
use regex::Regex;

/// Signature shared by all category extractors
pub type Extractor = fn(&str) -> ExtractionResult;

/// Function table: the extractor responsible for a category
pub fn extractor_for(category: Category) -> Extractor {
    match category {
        Category::Transfer => transfer,
        Category::InternalTransfer => internal_transfer,
        Category::StampDuty => stamp_duty,
        Category::Fee => fee,
        Category::CardPayment => card_payment,
        Category::AtmCashOperation => atm_cash_operation,
        Category::DirectDebit => direct_debit,
        Category::PreauthorizedDebit => preauthorized_debit,
        Category::GenericCredit | Category::GenericDebit => generic,
    }
}

/// Run the extractor for `category` on `narration`
pub fn extract(category: Category, narration: &str) -> ExtractionResult {
    extractor_for(category)(narration)
}

// ---------------------------------------------------------------------------
// Token helpers
// ---------------------------------------------------------------------------

/// Byte span of the first occurrence of `word` delimited by whitespace or the
/// ends of `text`
fn find_word(text: &str, word: &str) -> Option<(usize, usize)> {
    text.match_indices(word)
        .map(|(start, _)| (start, start + word.len()))
        .find(|&(start, end)| {
            let before = text[..start].chars().next_back();
            let after = text[end..].chars().next();
            before.is_none_or(char::is_whitespace) && after.is_none_or(char::is_whitespace)
        })
}

/// The whitespace-delimited token right after `marker`
fn word_after(text: &str, marker: &str) -> Option<String> {
    let (_, end) = find_word(text, marker)?;
    text[end..].split_whitespace().next().map(str::to_string)
}

/// `"{head} - {tail}"`, or just `head` when there is no tail
fn join_dash(head: &str, tail: &str) -> String {
    if tail.is_empty() {
        head.to_string()
    } else {
        format!("{head} - {tail}")
    }
}

// ---------------------------------------------------------------------------
// Transfers
// ---------------------------------------------------------------------------

/// Counterparty and reason of a transfer narration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TransferParts<'a> {
    counterparty: &'a str,
    reason: &'a str,
}

/// Split "... DA|BENEF <counterparty> PER <reason>".
///
/// The earliest of the two start markers wins; the reason is free text and
/// may contain either word. Without `PER` the whole remainder is the
/// counterparty and the reason is empty. Without a start marker, or with
/// nothing after it, there is no split.
fn split_transfer(narration: &str) -> Option<TransferParts<'_>> {
    let (_, start) = ["DA", "BENEF"]
        .into_iter()
        .filter_map(|marker| find_word(narration, marker))
        .min_by_key(|&(marker_start, _)| marker_start)?;
    let rest = &narration[start..];

    let parts = match find_word(rest, "PER") {
        Some((per_start, per_end)) => TransferParts {
            counterparty: rest[..per_start].trim(),
            reason: rest[per_end..].trim(),
        },
        None => TransferParts {
            counterparty: rest.trim(),
            reason: "",
        },
    };

    if parts.counterparty.is_empty() {
        None
    } else {
        Some(parts)
    }
}

/// Bank transfer in either direction.
///
/// Payee is `"{counterparty} - {reason}"`, memo is the reason. The `TRN`
/// token becomes the reference.
pub fn transfer(narration: &str) -> ExtractionResult {
    let result = match split_transfer(narration) {
        Some(parts) => ExtractionResult::new(join_dash(parts.counterparty, parts.reason), parts.reason),
        None => ExtractionResult::echo(narration),
    };
    result.with_reference(word_after(narration, "TRN"))
}

/// Narration BancoPosta prints for online postagiro with no further detail
const POSTAGIRO_ONLINE: &str = "POSTAGIRO ONLINE";

/// Postagiro between two BancoPosta accounts; memo mirrors the payee
pub fn internal_transfer(narration: &str) -> ExtractionResult {
    if narration.trim() == POSTAGIRO_ONLINE {
        return ExtractionResult::new(POSTAGIRO_ONLINE, POSTAGIRO_ONLINE);
    }

    let result = match split_transfer(narration) {
        Some(parts) => {
            let payee = join_dash(parts.counterparty, parts.reason);
            ExtractionResult::new(&payee, &payee)
        }
        None => ExtractionResult::echo(narration),
    };
    result.with_reference(word_after(narration, "TRN"))
}

// ---------------------------------------------------------------------------
// Fees
// ---------------------------------------------------------------------------

const STAMP_DUTY_FINANCIAL_PRODUCTS: &str = "IMPOSTA DI BOLLO PRODOTTI FINANZIARI";

/// Stamp duty. The financial-products variant carries trailing period
/// details, so it collapses to its fixed label.
pub fn stamp_duty(narration: &str) -> ExtractionResult {
    if narration.contains(STAMP_DUTY_FINANCIAL_PRODUCTS) {
        ExtractionResult::new(STAMP_DUTY_FINANCIAL_PRODUCTS, STAMP_DUTY_FINANCIAL_PRODUCTS)
    } else {
        ExtractionResult::echo(narration)
    }
}

/// Commission narration, e.g.
/// `COMMISSIONE RICARICA PREPAGATA ADDEBITO PER RICARICA CARTA PREPAGATA DA APP/WEB Ricarica Postepay ...`
///
/// The label before `ADDEBITO` prefixes the channel found between `DA` and
/// `Ricarica`; the memo restates the commission from `Ricarica` onward.
/// Anything else, including a bare "COMMISSIONE BONIFICO INSTANT", is echoed.
pub fn fee(narration: &str) -> ExtractionResult {
    let Some(end) = narration.find("Ricarica") else {
        return ExtractionResult::echo(narration);
    };
    let head = &narration[..end];
    let Some((da_start, da_end)) = find_word(head, "DA") else {
        return ExtractionResult::echo(narration);
    };

    let channel = head[da_end..].trim();
    let label = head[..da_start]
        .find("ADDEBITO")
        .map(|i| head[..i].trim())
        .unwrap_or("");

    let payee = [label, channel]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if payee.is_empty() {
        return ExtractionResult::echo(narration);
    }

    let memo = format!("COMMISSIONE {}", narration[end..].trim());
    ExtractionResult::new(payee, memo)
}

// ---------------------------------------------------------------------------
// Card and cash
// ---------------------------------------------------------------------------

const CARD_PAYMENT_MEMO: &str = "PAGAMENTO POSTAMAT";

/// `DD/MM/YYYY HH.MM` stamp that precedes the merchant in card payments
fn card_timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{2}/\d{2}/\d{4} \d{2}\.\d{2}").expect("card timestamp regex"))
}

/// Postamat card payment:
/// `PAGAMENTO POSTAMAT 20/08/2020 10.27 <merchant> OPERAZIONE <op> CARTA <card>`
pub fn card_payment(narration: &str) -> ExtractionResult {
    let Some(stamp) = card_timestamp_re().find(narration) else {
        return ExtractionResult::new(narration, CARD_PAYMENT_MEMO);
    };

    let rest = &narration[stamp.end()..];
    let merchant = match find_word(rest, "OPERAZIONE") {
        Some((op_start, _)) => rest[..op_start].trim(),
        None => rest.trim(),
    };
    let payee = if merchant.is_empty() { narration } else { merchant };

    ExtractionResult::new(payee, CARD_PAYMENT_MEMO).with_reference(operation_code(rest))
}

/// Operation code between `OPERAZIONE` and `CARTA`
fn operation_code(text: &str) -> Option<String> {
    let (_, op_end) = find_word(text, "OPERAZIONE")?;
    let tail = &text[op_end..];
    let (card_start, _) = find_word(tail, "CARTA")?;
    Some(tail[..card_start].trim().to_string())
}

/// Cash withdrawal or deposit: the payee is the operation word itself
pub fn atm_cash_operation(narration: &str) -> ExtractionResult {
    let operation = ["PRELIEVO", "VERSAMENTO"]
        .into_iter()
        .find(|&op| narration.contains(op));
    match operation {
        Some(op) => ExtractionResult::new(op, narration),
        None => ExtractionResult::echo(narration),
    }
}

// ---------------------------------------------------------------------------
// Direct debits
// ---------------------------------------------------------------------------

/// Creditor between the mandate keyword and `CID`, with a leading `**`
/// stripped. Missing keyword or `CID` echoes the narration.
fn mandate_debit(narration: &str, keywords: &[&str]) -> ExtractionResult {
    let Some((keyword, start)) = keywords
        .iter()
        .find_map(|&k| narration.find(k).map(|i| (k, i + k.len())))
    else {
        return ExtractionResult::echo(narration);
    };

    let rest = &narration[start..];
    let Some(cid) = rest.find("CID") else {
        return ExtractionResult::echo(narration);
    };

    let creditor = rest[..cid].trim();
    let creditor = creditor.strip_prefix("**").unwrap_or(creditor).trim();
    if creditor.is_empty() {
        return ExtractionResult::echo(narration);
    }

    ExtractionResult::new(creditor, format!("{keyword} {creditor}"))
}

/// SEPA direct debit ("ADDEBITO DIRETTO SDD", older exports omit "SDD")
pub fn direct_debit(narration: &str) -> ExtractionResult {
    mandate_debit(narration, &["ADDEBITO DIRETTO SDD", "ADDEBITO DIRETTO"])
}

pub fn preauthorized_debit(narration: &str) -> ExtractionResult {
    mandate_debit(narration, &["ADDEBITO PREAUTORIZZATO"])
}

/// Generic credit/debit: nothing to extract
pub fn generic(narration: &str) -> ExtractionResult {
    ExtractionResult::echo(narration)
}
