//! Relevance selection of financial-report documents for LLM analysis.
//!
//! `report-context` reads a natural-language question, scores uploaded
//! quarterly and annual reports against it and picks the subset that fits a
//! provider page budget, with human-readable reasons for every decision.
//! For a fixed clock, identical inputs produce identical selections.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod delegate;
pub mod document;
pub mod query;
pub mod selection;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, SelectorConfig, YearAnchor};
pub use document::{Document, DocumentType, Quarter};
pub use selection::ReportSelector;
pub use types::{SelectionError, SelectionResult, SelectionStrategy};
