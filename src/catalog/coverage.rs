use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use crate::clock::Clock;
use crate::document::{Document, Quarter};
use crate::types::identifiers::CompanyCode;

/// Completed years tracked before the current one.
pub const COVERAGE_YEARS: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PeriodKey {
    pub year: i32,
    pub quarter: Quarter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyCoverage {
    pub company: CompanyCode,
    pub total_reports: usize,
    /// Newest first, one entry per period.
    pub periods_covered: Vec<PeriodKey>,
    /// Oldest first.
    pub missing_periods: Vec<PeriodKey>,
    pub year_range: Option<YearRange>,
    pub last_update: Option<DateTime<Utc>>,
    /// Share of [`possible_periods`] covered, rounded, 0 to 100.
    pub completion_percentage: u8,
}

/// Every quarter of the last five years and of the current year up to the
/// current quarter, oldest first.
pub fn possible_periods(now: DateTime<Utc>) -> Vec<PeriodKey> {
    let current_year = now.year();
    let current_quarter = now.month().div_ceil(3) as usize;
    let all: &'static [Quarter; 4] = &Quarter::ALL;

    (current_year - COVERAGE_YEARS..=current_year)
        .flat_map(move |year| {
            let quarters = if year == current_year {
                &all[..current_quarter]
            } else {
                &all[..]
            };
            quarters.iter().map(move |&quarter| PeriodKey { year, quarter })
        })
        .collect()
}

/// Coverage of `company` among `documents`; documents of other companies
/// are ignored.
pub fn company_coverage(
    company: &CompanyCode,
    documents: &[Document],
    clock: &impl Clock,
) -> CompanyCoverage {
    let own: Vec<&Document> = documents
        .iter()
        .filter(|d| d.company.as_ref() == Some(company))
        .collect();

    let covered: BTreeSet<PeriodKey> = own
        .iter()
        .filter_map(|d| {
            Some(PeriodKey {
                year: d.resolved_year()?,
                quarter: d.quarter?,
            })
        })
        .collect();

    let possible = possible_periods(clock.now());
    let missing_periods: Vec<PeriodKey> = possible
        .iter()
        .filter(|p| !covered.contains(p))
        .copied()
        .collect();

    let hit = possible.len() - missing_periods.len();
    let completion_percentage = if possible.is_empty() {
        0
    } else {
        ((hit as f64 / possible.len() as f64) * 100.0).round() as u8
    };

    let years = own.iter().filter_map(|d| d.resolved_year());
    let year_range = years
        .clone()
        .min()
        .zip(years.max())
        .map(|(start, end)| YearRange { start, end });

    CompanyCoverage {
        company: company.clone(),
        total_reports: own.len(),
        periods_covered: covered.into_iter().rev().collect(),
        missing_periods,
        year_range,
        last_update: own.iter().map(|d| d.upload_date).max(),
        completion_percentage,
    }
}
