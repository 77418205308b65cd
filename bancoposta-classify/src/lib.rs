//! bancoposta-classify: narration classifier, category extractors and the
//! assembler that turns raw statement rows into canonical records

pub mod assembler;
pub mod classifier;
pub mod converter;
pub mod extractors;

pub use assembler::{assemble, transaction_id};
pub use classifier::{KEYWORD_RULES, KeywordRule, classify};
pub use converter::{convert, convert_all, convert_all_parallel};
pub use extractors::{extract, extractor_for};
