pub mod context_bundle;
pub mod identifiers;

pub use context_bundle::{
    DocumentScore, Query, ScoreDetails, SelectionError, SelectionMetadata, SelectionResult,
    SelectionStrategy,
};
pub use identifiers::{CatalogVersion, CompanyCode, DocumentId};
