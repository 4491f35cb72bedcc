use tracing::trace;

use crate::document::{Document, Quarter};
use crate::query::{relevant_years, InformationType, QueryContext};

/// Pre-selection predicate over the inferred query context.
///
/// Annual-summary questions only admit year-end reports; a report whose
/// period cannot be established as Q4 or full-year is dropped.
#[derive(Debug, Clone)]
pub struct ContextFilter<'a> {
    context: &'a QueryContext,
    relevant_years: Vec<i32>,
}

impl<'a> ContextFilter<'a> {
    /// `anchor_year` is the most recent complete fiscal year.
    pub fn new(context: &'a QueryContext, anchor_year: i32) -> Self {
        Self {
            context,
            relevant_years: relevant_years(context.timeframe.as_ref(), anchor_year),
        }
    }

    pub fn relevant_years(&self) -> &[i32] {
        &self.relevant_years
    }

    pub fn should_include(&self, doc: &Document) -> bool {
        if !self.in_year_window(doc) {
            trace!(document = %doc.id, "outside relevant years");
            return false;
        }

        if self.context.information_type != InformationType::AnnualSummary {
            return true;
        }

        let included = passes_annual_strictness(doc);
        if !included {
            trace!(document = %doc.id, "not a year-end report");
        }
        included
    }

    /// Unknown years pass; an empty window filters nothing.
    fn in_year_window(&self, doc: &Document) -> bool {
        match doc.resolved_year() {
            Some(year) if !self.relevant_years.is_empty() => self.relevant_years.contains(&year),
            _ => true,
        }
    }
}

/// Year-end evidence, strongest first.
fn passes_annual_strictness(doc: &Document) -> bool {
    let names = doc.name_signals();

    if names.indicates_year_end() {
        return true;
    }

    // Quarter wording in the name excludes the report unless it is Q4.
    if names.has_quarter_markers() {
        return names.indicates_q4();
    }

    if let Some(quarter) = doc.quarter {
        return quarter == Quarter::Q4;
    }

    doc.is_annual_report()
}

/// Free-function form of [`ContextFilter::should_include`].
pub fn should_include(doc: &Document, context: &QueryContext, anchor_year: i32) -> bool {
    ContextFilter::new(context, anchor_year).should_include(doc)
}
