use crate::clock::Clock;
use crate::document::{Document, DocumentType};
use crate::query::keywords::{category_matches, mentions_any, KeywordCategory};
use crate::types::context_bundle::{Query, ScoreDetails};

/// Reasons are attached only when a sub-score clears these thresholds.
const TEMPORAL_REASON_THRESHOLD: i32 = 20;
const CONTENT_REASON_THRESHOLD: i32 = 15;
const TYPE_REASON_THRESHOLD: i32 = 20;

pub trait Scorer {
    fn score(&self, doc: &Document, query: &Query) -> ScoreDetails;

    fn score_value(&self, details: &ScoreDetails) -> i32 {
        details.total()
    }
}

/// Temporal + content + document-type relevance for financial reports.
///
/// Scores are unbounded and only comparable within one selection call.
#[derive(Debug, Clone, Copy)]
pub struct FinancialReportScorer {
    current_year: i32,
}

impl FinancialReportScorer {
    pub fn new(current_year: i32) -> Self {
        Self { current_year }
    }

    pub fn from_clock(clock: &impl Clock) -> Self {
        Self::new(clock.current_year())
    }

    /// Recency by whole years of age. Documents without a resolvable year
    /// score 0 here; keeping them out of the window is the filter's job.
    pub fn temporal_score(&self, doc: &Document, query: &Query) -> i32 {
        let Some(year) = doc.resolved_year() else {
            return 0;
        };

        // Reports dated after "now" are treated as current.
        let age = (self.current_year - year).max(0);
        let mut score = match age {
            0 => 30,
            1 => 25,
            2 => 20,
            3 => 15,
            4..=5 => 10,
            _ => 5,
        };

        let lowered = query.normalized.as_str();
        if age > 2 && mentions_any(lowered, KeywordCategory::Historical.terms()) {
            score += 15;
        }
        if age <= 1 && mentions_any(lowered, KeywordCategory::Recent.terms()) {
            score += 20;
        }

        score
    }

    pub fn content_score(&self, doc: &Document, query: &Query) -> i32 {
        let mut score = 0;

        for (category, count) in category_matches(&query.normalized) {
            score += 5 * count as i32;

            match category {
                KeywordCategory::Quarterly if doc.is_quarterly_report() => score += 10,
                KeywordCategory::Annual if doc.is_annual_report() => score += 10,
                KeywordCategory::Revenue | KeywordCategory::Profit if doc.is_financial_report() => {
                    score += 15
                }
                _ => {}
            }
        }

        // Filename markers.
        let names = doc.name_signals();
        if names.contains_any(&["sonuc", "result"]) {
            score += 10;
        }
        if names.contains_any(&["sunum", "presentation"]) {
            score += 8;
        }
        if names.contains_any(&["finansal", "financial"]) {
            score += 12;
        }
        if names.contains_any(&["kar", "profit"]) {
            score += 10;
        }
        if names.contains_any(&["gelir", "revenue"]) {
            score += 10;
        }
        if names.has_year_end_phrase() {
            score += 15;
        }
        if names.has_year_end_date() {
            score += 15;
        }
        if names.contains("annual") && names.contains("report") {
            score += 12;
        }

        score
    }

    pub fn document_type_score(&self, doc: &Document, query: &Query) -> i32 {
        let lowered = query.normalized.as_str();
        match doc.declared_type() {
            DocumentType::Quarterly => {
                20 + if mentions_any(lowered, KeywordCategory::Quarterly.terms()) { 15 } else { 0 }
            }
            DocumentType::Annual => {
                25 + if mentions_any(lowered, KeywordCategory::Annual.terms()) { 20 } else { 0 }
            }
            DocumentType::Presentation => 15,
            DocumentType::Financial => 30,
            DocumentType::Other => 10,
        }
    }
}

impl Scorer for FinancialReportScorer {
    fn score(&self, doc: &Document, query: &Query) -> ScoreDetails {
        let temporal = self.temporal_score(doc, query);
        let content = self.content_score(doc, query);
        let document_type = self.document_type_score(doc, query);

        let mut reasons = Vec::new();
        if temporal > TEMPORAL_REASON_THRESHOLD {
            let year = doc
                .resolved_year()
                .map(|y| y.to_string())
                .unwrap_or_else(|| "unknown year".to_string());
            reasons.push(format!("Recent data ({year})"));
        }
        if content > CONTENT_REASON_THRESHOLD {
            reasons.push("High content relevance".to_string());
        }
        if document_type > TYPE_REASON_THRESHOLD {
            reasons.push(format!(
                "Relevant document type ({})",
                doc.declared_type().as_str()
            ));
        }

        ScoreDetails {
            temporal,
            content,
            document_type,
            context_bonus: 0,
            reasons,
        }
    }
}
