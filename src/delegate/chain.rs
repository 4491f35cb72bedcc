use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::prompt::{build_selection_prompt, summarize, DocumentSummary};
use super::response::{parse_delegate_response, DelegateSelection, ResponseParseError};
use crate::clock::{Clock, SystemClock};
use crate::document::Document;
use crate::query::{mentions_multi_year, relevant_years, QueryContext};
use crate::selection::{PageBudget, ReportSelector};
use crate::types::context_bundle::{
    Query, SelectionError, SelectionMetadata, SelectionResult, SelectionStrategy,
};
use crate::types::identifiers::CatalogVersion;

/// Outbound structured-generation request.
#[derive(Debug, Clone)]
pub struct DelegateRequest {
    pub prompt: String,
    pub query: String,
    pub documents: Vec<DocumentSummary>,
    pub max_pages: u32,
}

/// A language-model call that picks documents by number.
///
/// No timeout is imposed here; the implementation owns timeout and
/// cancellation policy.
#[async_trait]
pub trait SelectionDelegate: Send + Sync {
    async fn complete(&self, request: DelegateRequest) -> Result<String, DelegateError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DelegateError {
    #[error("Delegate request failed: {0}")]
    Request(String),

    #[error("Delegate returned an empty response")]
    EmptyResponse,

    #[error("Delegate request was cancelled")]
    Cancelled,
}

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// Every strategy failed; one entry per attempted strategy.
    #[error("All selection strategies failed: {}", .attempts.join("; "))]
    Exhausted { attempts: Vec<String> },

    #[error(transparent)]
    Selection(#[from] SelectionError),
}

#[derive(Debug, thiserror::Error)]
enum DelegatedFailure {
    #[error(transparent)]
    Delegate(#[from] DelegateError),

    #[error(transparent)]
    Parse(#[from] ResponseParseError),

    #[error("delegate selection admitted no documents")]
    NothingAdmitted,
}

/// Delegate first (when configured), then the algorithmic selector.
///
/// Without a delegate the chain is exactly [`ReportSelector::select`]. After a
/// failed delegate, multi-year questions ("last N years", N > 1) fall back to
/// year coverage and everything else to the standard selector.
pub struct SelectionChain<C = SystemClock> {
    selector: ReportSelector<C>,
    delegate: Option<Arc<dyn SelectionDelegate>>,
}

impl<C: Clock> SelectionChain<C> {
    pub fn new(selector: ReportSelector<C>) -> Self {
        Self {
            selector,
            delegate: None,
        }
    }

    pub fn with_delegate(mut self, delegate: Arc<dyn SelectionDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    pub fn selector(&self) -> &ReportSelector<C> {
        &self.selector
    }

    pub async fn select(
        &self,
        documents: &[Document],
        query: &str,
        max_pages: u32,
    ) -> Result<SelectionResult, ChainError> {
        if max_pages == 0 {
            return Err(SelectionError::InvalidBudget(max_pages).into());
        }

        let mut attempts = Vec::new();

        if let Some(delegate) = &self.delegate {
            match self
                .delegated(delegate.as_ref(), documents, query, max_pages)
                .await
            {
                Ok(result) => return Ok(result),
                Err(failure) => {
                    warn!(error = %failure, "delegated selection failed, falling back to algorithmic selection");
                    attempts.push(format!("delegated: {failure}"));
                }
            }
        }

        let fell_back = !attempts.is_empty();
        let (label, outcome) = if fell_back && mentions_multi_year(query) {
            warn!("multi-year question, falling back to year coverage");
            (
                "year_coverage",
                self.selector.select_year_coverage(documents, query, max_pages),
            )
        } else {
            (
                "context_filtered",
                self.selector.select(documents, query, max_pages),
            )
        };

        match outcome {
            Ok(mut result) => {
                if fell_back {
                    result
                        .selection_reasons
                        .insert(0, format!("Fallback after {}", attempts.join("; ")));
                }
                Ok(result)
            }
            Err(error) => {
                warn!(strategy = label, error = %error, "algorithmic selection failed");
                attempts.push(format!("{label}: {error}"));
                Err(ChainError::Exhausted { attempts })
            }
        }
    }

    async fn delegated(
        &self,
        delegate: &dyn SelectionDelegate,
        documents: &[Document],
        query: &str,
        max_pages: u32,
    ) -> Result<SelectionResult, DelegatedFailure> {
        let context = QueryContext::interpret(&Query::new(query));
        let request = DelegateRequest {
            prompt: build_selection_prompt(query, &context, documents, max_pages),
            query: query.to_string(),
            documents: summarize(documents),
            max_pages,
        };

        let text = delegate.complete(request).await?;
        if text.trim().is_empty() {
            return Err(DelegateError::EmptyResponse.into());
        }
        let reply = parse_delegate_response(&text)?;

        self.admit_delegated(documents, query, context, reply, max_pages)
    }

    /// Applies the delegate's picks in order while they fit the budget.
    fn admit_delegated(
        &self,
        documents: &[Document],
        query: &str,
        context: QueryContext,
        reply: DelegateSelection,
        max_pages: u32,
    ) -> Result<SelectionResult, DelegatedFailure> {
        let scores: HashMap<usize, i32> = self
            .selector
            .score_documents(documents, query)
            .into_iter()
            .map(|s| (s.index, s.score))
            .collect();

        let mut budget = PageBudget::new(max_pages);
        let mut admitted: Vec<usize> = Vec::new();
        let mut seen = HashSet::new();
        let mut excluded_by_budget = 0;
        let mut total_score = 0i64;
        let mut reasons = vec![
            format!("Delegate reasoning: {}", reply.reasoning),
            format!("Coverage: {}", reply.coverage_analysis),
        ];

        for number in reply.selected_documents {
            let Some(index) = usize::try_from(number)
                .ok()
                .and_then(|n| n.checked_sub(1))
                .filter(|i| *i < documents.len())
            else {
                reasons.push(format!(
                    "Ignoring document number {number}: out of range (1-{})",
                    documents.len()
                ));
                continue;
            };
            if !seen.insert(index) {
                reasons.push(format!("Ignoring duplicate document number {number}"));
                continue;
            }

            let doc = &documents[index];
            let pages = doc.pages();
            if !budget.fits(pages) {
                excluded_by_budget += 1;
                reasons.push(format!(
                    "Skipping {} ({} pages): would exceed page limit ({}/{})",
                    doc.display_name(),
                    pages,
                    budget.used(),
                    max_pages
                ));
                continue;
            }

            budget.charge(pages);
            admitted.push(index);
            total_score += i64::from(scores.get(&index).copied().unwrap_or(0));
            reasons.push(format!(
                "{}: Selected by delegate for relevance ({} pages)",
                doc.display_name(),
                pages
            ));
        }

        if admitted.is_empty() {
            return Err(DelegatedFailure::NothingAdmitted);
        }
        reasons.push(format!("Total pages used: {}/{}", budget.used(), max_pages));

        let selected: Vec<Document> = admitted.iter().map(|&i| documents[i].clone()).collect();
        let admitted: HashSet<usize> = admitted.into_iter().collect();
        let dropped: Vec<Document> = documents
            .iter()
            .enumerate()
            .filter(|(i, _)| !admitted.contains(i))
            .map(|(_, d)| d.clone())
            .collect();

        let anchor = self.selector.anchor_year(documents);
        let years = relevant_years(context.timeframe.as_ref(), anchor);

        info!(
            selected = selected.len(),
            pages_used = budget.used(),
            max_pages,
            "delegated selection complete"
        );

        Ok(SelectionResult {
            total_score,
            selection_reasons: reasons,
            selection: SelectionMetadata {
                query: query.to_string(),
                strategy: SelectionStrategy::Delegated,
                information_type: context.information_type,
                timeframe: context.timeframe,
                relevant_years: years,
                max_pages,
                pages_used: budget.used(),
                documents_considered: documents.len(),
                documents_after_filter: documents.len(),
                documents_selected: selected.len(),
                documents_excluded_by_budget: excluded_by_budget,
                input_version: CatalogVersion::of(documents),
            },
            selected,
            dropped,
        })
    }
}
