pub mod metadata;
pub mod document;
pub mod parser;

pub use crate::types::identifiers::{CompanyCode, DocumentId};
pub use metadata::{DocumentType, FiscalPeriod, Quarter};
pub use document::{Document, DEFAULT_PAGE_COUNT};
pub use parser::{extract_year, FilenameSignals};
