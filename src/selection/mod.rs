pub mod budgeting;
pub mod filters;
pub mod ranking;

use std::collections::HashSet;

use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::SelectorConfig;
use crate::document::Document;
use crate::query::{InformationType, QueryContext};
use crate::types::context_bundle::{
    DocumentScore, Query, SelectionError, SelectionMetadata, SelectionResult, SelectionStrategy,
};
use crate::types::identifiers::CatalogVersion;

pub use budgeting::{apply_budget, apply_year_coverage, Admission, BudgetResult, PageBudget};
pub use filters::{should_include, ContextFilter};
pub use ranking::{FinancialReportScorer, Scorer};

const ANNUAL_MATCH_BONUS: i32 = 25;
const YEAR_MATCH_BONUS: i32 = 15;

/// Budgeted document selection for one question at a time.
///
/// Holds no per-call state; one selector can serve concurrent requests.
pub struct ReportSelector<C = SystemClock> {
    clock: C,
    config: SelectorConfig,
}

impl Default for ReportSelector<SystemClock> {
    fn default() -> Self {
        Self {
            clock: SystemClock,
            config: SelectorConfig::v0(),
        }
    }
}

/// Query reading plus the candidate set a selection call works on.
struct Prepared {
    query: Query,
    context: QueryContext,
    relevant_years: Vec<i32>,
    candidates: Vec<usize>,
    documents_after_filter: usize,
    bypassed_filter: bool,
    reasons: Vec<String>,
}

impl<C: Clock> ReportSelector<C> {
    pub fn new(clock: C, config: SelectorConfig) -> Self {
        Self { clock, config }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Most recent complete fiscal year for this pool.
    pub fn anchor_year(&self, documents: &[Document]) -> i32 {
        self.config.year_anchor.resolve(documents, &self.clock)
    }

    /// Filter, score, then fill `max_pages` greedily. Multi-year trend
    /// questions take the year-coverage path.
    pub fn select(
        &self,
        documents: &[Document],
        query: &str,
        max_pages: u32,
    ) -> Result<SelectionResult, SelectionError> {
        self.run(documents, query, max_pages, false)
    }

    /// Always takes the year-coverage path: the best document for each
    /// relevant year first, then remaining budget by score.
    pub fn select_year_coverage(
        &self,
        documents: &[Document],
        query: &str,
        max_pages: u32,
    ) -> Result<SelectionResult, SelectionError> {
        self.run(documents, query, max_pages, true)
    }

    /// Every document scored against `query`, context bonus included, in
    /// descending score order (ties keep input order). No filtering.
    pub fn score_documents<'a>(&self, documents: &'a [Document], query: &str) -> Vec<DocumentScore<'a>> {
        let query = Query::new(query);
        let context = QueryContext::interpret(&query);
        let anchor = self.anchor_year(documents);
        let filter = ContextFilter::new(&context, anchor);

        self.score_candidates(
            documents,
            0..documents.len(),
            &query,
            &context,
            filter.relevant_years(),
        )
    }

    fn run(
        &self,
        documents: &[Document],
        query: &str,
        max_pages: u32,
        force_year_coverage: bool,
    ) -> Result<SelectionResult, SelectionError> {
        if max_pages == 0 {
            return Err(SelectionError::InvalidBudget(max_pages));
        }

        let Prepared {
            query,
            context,
            relevant_years,
            candidates,
            documents_after_filter,
            bypassed_filter,
            mut reasons,
        } = self.prepare(documents, query);

        let scored = self.score_candidates(
            documents,
            candidates.into_iter(),
            &query,
            &context,
            &relevant_years,
        );

        let year_coverage = force_year_coverage || context.is_multi_year_trend();
        let per_period = self.config.max_documents_per_period;
        let budget = if year_coverage {
            apply_year_coverage(&scored, &relevant_years, max_pages, per_period)
        } else {
            apply_budget(&scored, max_pages, per_period)
        };

        let strategy = if bypassed_filter {
            SelectionStrategy::Unfiltered
        } else if year_coverage {
            SelectionStrategy::YearCoverage
        } else {
            SelectionStrategy::ContextFiltered
        };

        reasons.extend(budget.reasons);
        reasons.push(format!("Total pages used: {}/{}", budget.pages_used, max_pages));

        let admitted: HashSet<usize> = budget.admitted.iter().map(|a| a.index).collect();
        let selected: Vec<Document> = budget
            .admitted
            .iter()
            .map(|a| a.document.clone())
            .collect();
        let dropped: Vec<Document> = documents
            .iter()
            .enumerate()
            .filter(|(i, _)| !admitted.contains(i))
            .map(|(_, d)| d.clone())
            .collect();

        debug_assert_eq!(selected.len() + dropped.len(), documents.len());
        debug_assert!(budget.pages_used <= max_pages);

        info!(
            strategy = ?strategy,
            information_type = %context.information_type,
            considered = documents.len(),
            after_filter = documents_after_filter,
            selected = selected.len(),
            pages_used = budget.pages_used,
            max_pages,
            "selection complete"
        );

        Ok(SelectionResult {
            total_score: budget.total_score,
            selection_reasons: reasons,
            selection: SelectionMetadata {
                query: query.raw,
                strategy,
                information_type: context.information_type,
                timeframe: context.timeframe,
                relevant_years,
                max_pages,
                pages_used: budget.pages_used,
                documents_considered: documents.len(),
                documents_after_filter,
                documents_selected: selected.len(),
                documents_excluded_by_budget: budget.documents_excluded_by_budget,
                input_version: CatalogVersion::of(documents),
            },
            selected,
            dropped,
        })
    }

    fn prepare(&self, documents: &[Document], query: &str) -> Prepared {
        let query = Query::new(query);
        let context = QueryContext::interpret(&query);
        let anchor = self.anchor_year(documents);
        let filter = ContextFilter::new(&context, anchor);
        let relevant_years = filter.relevant_years().to_vec();

        let mut reasons = vec![format!("Query context: {}", context.describe())];

        let (passing, filtered_out): (Vec<usize>, Vec<usize>) =
            (0..documents.len()).partition(|&i| filter.should_include(&documents[i]));
        let documents_after_filter = passing.len();

        // An over-eager filter must not produce an empty answer.
        if passing.is_empty() && !documents.is_empty() {
            warn!(
                information_type = %context.information_type,
                documents = documents.len(),
                "context filter excluded every document, selecting from the unfiltered set"
            );
            reasons.push(format!(
                "Context filter excluded all {} documents; falling back to the unfiltered set",
                documents.len()
            ));
            return Prepared {
                query,
                context,
                relevant_years,
                candidates: (0..documents.len()).collect(),
                documents_after_filter,
                bypassed_filter: true,
                reasons,
            };
        }

        reasons.push(format!(
            "Intelligent pre-filtering: {}/{} documents passed context analysis",
            passing.len(),
            documents.len()
        ));
        for i in filtered_out {
            reasons.push(format!(
                "Filtered out {}: outside query context",
                documents[i].display_name()
            ));
        }

        Prepared {
            query,
            context,
            relevant_years,
            candidates: passing,
            documents_after_filter,
            bypassed_filter: false,
            reasons,
        }
    }

    fn score_candidates<'a>(
        &self,
        documents: &'a [Document],
        candidates: impl Iterator<Item = usize>,
        query: &Query,
        context: &QueryContext,
        relevant_years: &[i32],
    ) -> Vec<DocumentScore<'a>> {
        let scorer = FinancialReportScorer::from_clock(&self.clock);

        let mut scored: Vec<DocumentScore<'a>> = candidates
            .map(|index| {
                let document = &documents[index];
                let mut details = scorer.score(document, query);
                details.context_bonus = context_bonus(document, context, relevant_years);
                if details.context_bonus > 0 {
                    details
                        .reasons
                        .push(format!("Context match bonus (+{})", details.context_bonus));
                }
                let score = scorer.score_value(&details);

                DocumentScore {
                    index,
                    document,
                    score,
                    details,
                }
            })
            .collect();

        // Stable: equal scores keep input order.
        scored.sort_by(|a, b| b.score.cmp(&a.score));

        debug_assert!(scored.windows(2).all(|w| {
            w[0].score > w[1].score || (w[0].score == w[1].score && w[0].index < w[1].index)
        }));

        scored
    }
}

fn context_bonus(doc: &Document, context: &QueryContext, relevant_years: &[i32]) -> i32 {
    let mut bonus = 0;
    if context.information_type == InformationType::AnnualSummary && doc.is_year_end() {
        bonus += ANNUAL_MATCH_BONUS;
    }
    if doc
        .resolved_year()
        .is_some_and(|year| relevant_years.contains(&year))
    {
        bonus += YEAR_MATCH_BONUS;
    }
    bonus
}
