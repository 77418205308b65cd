//! OFX 1.02 (SGML) statement writer
//!
//! Aggregates are closed explicitly; leaf elements are not, as the 1.02 DTD
//! allows.

use std::collections::HashSet;

use bancoposta_core::CanonicalTransaction;
use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

/// NAME is capped at 32 characters by the OFX 1.02 DTD
const MAX_NAME_LEN: usize = 32;

const HEADER: &str = "\
OFXHEADER:100
DATA:OFXSGML
VERSION:102
SECURITY:NONE
ENCODING:UTF-8
CHARSET:NONE
COMPRESSION:NONE
OLDFILEUID:NONE
NEWFILEUID:NONE
";

/// Account details written into the statement envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub bank_id: String,
    pub account_id: String,
    pub currency: String,
}

struct SgmlWriter {
    out: String,
    depth: usize,
}

impl SgmlWriter {
    fn new() -> Self {
        Self {
            out: String::from(HEADER),
            depth: 0,
        }
    }

    fn line(&mut self, text: &str) {
        self.out.push('\n');
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
    }

    fn open(&mut self, tag: &str) {
        self.line(&format!("<{tag}>"));
        self.depth += 1;
    }

    fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(&format!("</{tag}>"));
    }

    fn leaf(&mut self, tag: &str, value: &str) {
        self.line(&format!("<{tag}>{}", escape(value)));
    }

    fn finish(mut self) -> String {
        self.out.push('\n');
        self.out
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn ofx_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

/// Render a full OFX document. `server_time` fills DTSERVER; an empty
/// statement uses its date for the transaction list range too.
pub fn render_ofx(txns: &[CanonicalTransaction], account: &Account, server_time: NaiveDateTime) -> String {
    let mut w = SgmlWriter::new();
    w.open("OFX");

    w.open("SIGNONMSGSRSV1");
    w.open("SONRS");
    status(&mut w);
    w.leaf("DTSERVER", &server_time.format("%Y%m%d%H%M%S").to_string());
    w.leaf("LANGUAGE", "ITA");
    w.close("SONRS");
    w.close("SIGNONMSGSRSV1");

    w.open("BANKMSGSRSV1");
    w.open("STMTTRNRS");
    w.leaf("TRNUID", "0");
    status(&mut w);
    w.open("STMTRS");
    w.leaf("CURDEF", &account.currency);
    w.open("BANKACCTFROM");
    w.leaf("BANKID", &account.bank_id);
    w.leaf("ACCTID", &account.account_id);
    w.leaf("ACCTTYPE", "CHECKING");
    w.close("BANKACCTFROM");

    let start = txns.iter().map(|t| t.settlement_date).min().unwrap_or(server_time.date());
    let end = txns.iter().map(|t| t.settlement_date).max().unwrap_or(server_time.date());

    w.open("BANKTRANLIST");
    w.leaf("DTSTART", &ofx_date(start));
    w.leaf("DTEND", &ofx_date(end));

    let mut seen = HashSet::new();
    for tx in txns {
        if !seen.insert(tx.transaction_id.as_str()) {
            warn!(fitid = %tx.transaction_id, payee = %tx.payee, "duplicate transaction id in statement");
        }
        transaction(&mut w, tx);
    }

    w.close("BANKTRANLIST");
    w.close("STMTRS");
    w.close("STMTTRNRS");
    w.close("BANKMSGSRSV1");
    w.close("OFX");
    w.finish()
}

fn status(w: &mut SgmlWriter) {
    w.open("STATUS");
    w.leaf("CODE", "0");
    w.leaf("SEVERITY", "INFO");
    w.close("STATUS");
}

fn transaction(w: &mut SgmlWriter, tx: &CanonicalTransaction) {
    w.open("STMTTRN");
    w.leaf("TRNTYPE", tx.trn_type.as_str());
    w.leaf("DTPOSTED", &ofx_date(tx.settlement_date));
    w.leaf("DTUSER", &ofx_date(tx.transaction_date));
    w.leaf("TRNAMT", &tx.amount.to_string());
    w.leaf("FITID", &tx.transaction_id);
    if let Some(reference) = &tx.reference {
        w.leaf("REFNUM", reference);
    }
    if !tx.payee.is_empty() {
        w.leaf("NAME", truncate_chars(&tx.payee, MAX_NAME_LEN));
    }
    if !tx.memo.is_empty() {
        w.leaf("MEMO", &tx.memo);
    }
    w.close("STMTTRN");
}
