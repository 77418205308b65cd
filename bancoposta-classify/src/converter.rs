//! Per-record pipeline: classify -> extract -> assemble

use bancoposta_core::{CanonicalTransaction, RawTransaction};
use rayon::prelude::*;
use tracing::debug;

use crate::assembler::assemble;
use crate::classifier::classify;
use crate::extractors::extract;

/// Convert one raw record
pub fn convert(raw: &RawTransaction) -> CanonicalTransaction {
    let category = classify(&raw.narration, raw.amount);
    let extraction = extract(category, &raw.narration);
    debug!(%category, payee = %extraction.payee, "converted record");
    assemble(raw, category, extraction)
}

/// Convert a statement in input order
pub fn convert_all(raws: &[RawTransaction]) -> Vec<CanonicalTransaction> {
    raws.iter().map(convert).collect()
}

/// Same as [`convert_all`] but spread over the rayon pool. Indexed collection
/// keeps the output in input order.
pub fn convert_all_parallel(raws: &[RawTransaction]) -> Vec<CanonicalTransaction> {
    raws.par_iter().map(convert).collect()
}
