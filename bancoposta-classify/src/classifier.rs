//! Deterministic narration classifier.
//!
//! Keyword phrases are looked up in table order; the first phrase found in the
//! narration decides the category. Narrations matching nothing fall back to
//! the sign of the amount.

use bancoposta_core::Category;
use rust_decimal::Decimal;
use tracing::debug;

/// A keyword phrase and the category it selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordRule {
    pub phrase: &'static str,
    pub category: Category,
}

const fn rule(phrase: &'static str, category: Category) -> KeywordRule {
    KeywordRule { phrase, category }
}

/// Priority-ordered keyword table. Matching is by substring; the column on
/// the right records where the phrase normally sits in BancoPosta narrations.
///
/// Transfer prefixes come first: a reason is free text and may quote any
/// other keyword. Specific commission phrases follow so that a fee line
/// quoting another keyword ("COMMISSIONE SDD ... ADDEBITO DIRETTO") stays a
/// fee. The bare "COMMISSIONE" and the cash words sit at the bottom because
/// they also turn up inside postagiro reasons.
pub const KEYWORD_RULES: &[KeywordRule] = &[
    rule("BONIFICO A VOSTRO FAVORE", Category::Transfer),        // leading
    rule("VOSTRA DISPOS. DI BONIFICO", Category::Transfer),      // leading
    rule("COMMISSIONE RICARICA PREPAGATA", Category::Fee),       // leading
    rule("COMMISSIONE BONIFICO INSTANT", Category::Fee),         // leading
    rule("COMMISSIONE SDD", Category::Fee),                      // leading
    rule("POSTAGIRO", Category::InternalTransfer),               // leading
    rule("IMPOSTA DI BOLLO", Category::StampDuty),               // leading
    rule("PAGAMENTO POSTAMAT", Category::CardPayment),           // leading
    rule("ADDEBITO DIRETTO", Category::DirectDebit),             // leading
    rule("ADDEBITO PREAUTORIZZATO", Category::PreauthorizedDebit), // leading
    rule("COMMISSIONE", Category::Fee),                          // leading
    rule("PRELIEVO", Category::AtmCashOperation),                // leading or interior
    rule("VERSAMENTO", Category::AtmCashOperation),              // leading or interior
];

/// First keyword rule whose phrase occurs in the narration
pub fn matching_rule(narration: &str) -> Option<&'static KeywordRule> {
    KEYWORD_RULES
        .iter()
        .find(|rule| narration.contains(rule.phrase))
}

/// Classify a narration. Never fails: unknown text becomes a generic
/// credit (amount >= 0) or generic debit (amount < 0).
pub fn classify(narration: &str, amount: Decimal) -> Category {
    if let Some(rule) = matching_rule(narration) {
        return rule.category;
    }

    let fallback = if amount < Decimal::ZERO {
        Category::GenericDebit
    } else {
        Category::GenericCredit
    };
    debug!(narration, %amount, category = %fallback, "no keyword matched");
    fallback
}
