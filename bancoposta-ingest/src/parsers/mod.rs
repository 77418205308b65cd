//! BancoPosta statement readers

pub mod csv_export;
pub mod pdf_table;

pub use csv_export::{parse_csv_text, read_csv};
pub use pdf_table::{parse_pdf_text, read_pdf};
