use std::fmt;

use serde::{Deserialize, Serialize};

use super::keywords::{mentions_any, KeywordCategory, MOVEMENT_TERMS, SUMMARY_TERMS};
use super::timeframe::{extract_timeframe, Timeframe};
use crate::types::Query;

/// What the user is really asking for. Exactly one applies per question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InformationType {
    AnnualSummary,
    TrendAnalysis,
    QuarterlyDetail,
    General,
}

impl InformationType {
    pub fn as_str(self) -> &'static str {
        match self {
            InformationType::AnnualSummary => "annual_summary",
            InformationType::TrendAnalysis => "trend_analysis",
            InformationType::QuarterlyDetail => "quarterly_detail",
            InformationType::General => "general",
        }
    }
}

impl fmt::Display for InformationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document kinds that best answer a given information type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferredDocument {
    Annual,
    YearEnd,
    Quarterly,
    QuarterlyQ1,
    QuarterlyQ2,
    QuarterlyQ3,
    QuarterlyQ4,
}

impl PreferredDocument {
    pub fn as_str(self) -> &'static str {
        match self {
            PreferredDocument::Annual => "annual",
            PreferredDocument::YearEnd => "year_end",
            PreferredDocument::Quarterly => "quarterly",
            PreferredDocument::QuarterlyQ1 => "quarterly_q1",
            PreferredDocument::QuarterlyQ2 => "quarterly_q2",
            PreferredDocument::QuarterlyQ3 => "quarterly_q3",
            PreferredDocument::QuarterlyQ4 => "quarterly_q4",
        }
    }
}

/// Structured reading of one question. Built per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryContext {
    pub timeframe: Option<Timeframe>,
    pub information_type: InformationType,
    pub preferred_document_types: Vec<PreferredDocument>,
    /// Whether many documents per period are useful, as opposed to one
    /// representative report per period.
    pub needs_comprehensive_data: bool,
}

impl QueryContext {
    /// Classification priority: annual summary, trend analysis, quarterly
    /// detail, general. Summary wins over trend so that "3-year profit trend"
    /// keeps the stricter year-end-only filter.
    pub fn interpret(query: &Query) -> Self {
        let lowered = query.normalized.as_str();
        let timeframe = extract_timeframe(&query.raw);
        let relative_years = timeframe.as_ref().and_then(Timeframe::relative_years);

        let has_summary_terms = mentions_any(lowered, KeywordCategory::Revenue.terms())
            || mentions_any(lowered, KeywordCategory::Profit.terms())
            || mentions_any(lowered, SUMMARY_TERMS);

        let has_trend_terms = mentions_any(lowered, KeywordCategory::Trend.terms())
            || mentions_any(lowered, KeywordCategory::Growth.terms())
            || mentions_any(lowered, KeywordCategory::Comparison.terms())
            || mentions_any(lowered, MOVEMENT_TERMS);

        let has_quarter_terms = mentions_any(lowered, KeywordCategory::Quarterly.terms());

        let (information_type, preferred_document_types, needs_comprehensive_data) =
            if has_summary_terms && relative_years.is_some() {
                (
                    InformationType::AnnualSummary,
                    vec![
                        PreferredDocument::Annual,
                        PreferredDocument::QuarterlyQ4,
                        PreferredDocument::YearEnd,
                    ],
                    false,
                )
            } else if has_trend_terms || relative_years.is_some() {
                (
                    InformationType::TrendAnalysis,
                    vec![PreferredDocument::Annual, PreferredDocument::QuarterlyQ4],
                    relative_years.is_some_and(|n| n > 3),
                )
            } else if has_quarter_terms {
                (
                    InformationType::QuarterlyDetail,
                    vec![
                        PreferredDocument::Quarterly,
                        PreferredDocument::QuarterlyQ1,
                        PreferredDocument::QuarterlyQ2,
                        PreferredDocument::QuarterlyQ3,
                        PreferredDocument::QuarterlyQ4,
                    ],
                    true,
                )
            } else {
                (
                    InformationType::General,
                    vec![PreferredDocument::Quarterly, PreferredDocument::Annual],
                    true,
                )
            };

        QueryContext {
            timeframe,
            information_type,
            preferred_document_types,
            needs_comprehensive_data,
        }
    }

    /// Trend question over an explicit "last N years" window with N > 1.
    pub fn is_multi_year_trend(&self) -> bool {
        self.information_type == InformationType::TrendAnalysis
            && self
                .timeframe
                .as_ref()
                .and_then(Timeframe::relative_years)
                .is_some_and(|n| n > 1)
    }

    pub fn describe(&self) -> String {
        match &self.timeframe {
            Some(timeframe) => format!("{} ({})", self.information_type, timeframe),
            None => format!("{} (no timeframe)", self.information_type),
        }
    }
}

/// Interpret a raw question.
pub fn interpret(query: &str) -> QueryContext {
    QueryContext::interpret(&Query::new(query))
}
