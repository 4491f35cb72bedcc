use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::query::{InformationType, Timeframe};
use crate::types::identifiers::CatalogVersion;

/// A user question.
/// Normalization rules:
/// - `normalized` is the lowercased text, used for vocabulary matching
/// - `raw` is kept for pattern extraction and reporting
#[derive(Debug, Clone)]
pub struct Query {
    pub raw: String,
    pub normalized: String,
}

impl Query {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let normalized = raw.to_lowercase();

        Self { raw, normalized }
    }
}

/// Which strategy produced a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Context filter, scoring, budgeted greedy scan.
    ContextFiltered,
    /// The context filter removed everything; the full pool was used.
    Unfiltered,
    /// One document per required year first, then remaining budget.
    YearCoverage,
    /// Chosen by the language-model delegate.
    Delegated,
}

/// The final result handed to the document-analysis collaborator.
///
/// `selected` and `dropped` partition the input pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionResult {
    pub selected: Vec<Document>,
    pub total_score: i64,
    pub selection_reasons: Vec<String>,
    pub dropped: Vec<Document>,
    pub selection: SelectionMetadata,
}

/// Metadata describing the outcome of the selection process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionMetadata {
    pub query: String,
    pub strategy: SelectionStrategy,
    pub information_type: InformationType,
    pub timeframe: Option<Timeframe>,
    pub relevant_years: Vec<i32>,

    pub max_pages: u32,
    pub pages_used: u32,

    pub documents_considered: usize,
    pub documents_after_filter: usize,
    pub documents_selected: usize,
    pub documents_excluded_by_budget: usize,

    pub input_version: CatalogVersion,
}

impl SelectionResult {
    pub fn selected_ids(&self) -> Vec<&str> {
        self.selected.iter().map(|d| d.id.as_str()).collect()
    }
}

/// Internal: a document that has been scored but not yet selected.
/// Holds a reference to the original document to avoid cloning prematurely.
#[derive(Debug, Clone)]
pub struct DocumentScore<'a> {
    /// Position in the caller's input list.
    pub index: usize,
    pub document: &'a Document,
    pub score: i32,
    pub details: ScoreDetails,
}

/// Sub-scores behind one document's relevance score.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreDetails {
    pub temporal: i32,
    pub content: i32,
    pub document_type: i32,
    /// Query-context alignment, added by the selector only.
    pub context_bonus: i32,
    pub reasons: Vec<String>,
}

impl ScoreDetails {
    pub fn total(&self) -> i32 {
        self.temporal + self.content + self.document_type + self.context_bonus
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("Invalid page budget: {0} (must be positive)")]
    InvalidBudget(u32),
}
