//! bancoposta-core: data model shared by the readers, the classification engine and the writers

pub mod category;
pub mod transaction;

pub use category::{Category, TrnType};
pub use transaction::{CanonicalTransaction, ExtractionResult, RawTransaction};
