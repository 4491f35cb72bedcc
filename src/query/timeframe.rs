use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Upper bound on the number of years a relative window may expand to.
pub const MAX_WINDOW_YEARS: u32 = 50;

/// Time window named in a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Timeframe {
    /// "last N years"
    Years { count: u32 },
    /// "last N months"
    Months { count: u32 },
    /// "last N quarters"
    Quarters { count: u32 },
    /// "2021-2023"
    YearRange { start: i32, end: i32 },
    /// "2023 yılı" / "2023 year"
    SingleYear { year: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeframeKind {
    Years,
    Months,
    Quarters,
    YearRange,
    SingleYear,
}

/// Ordered pattern table; the first pattern that matches decides.
const TIMEFRAME_PATTERNS: &[(TimeframeKind, &str)] = &[
    (TimeframeKind::Years, r"(?i)(?:son|last|past)\s+([0-9]+)\s+(?:yıl|years?)"),
    (TimeframeKind::Months, r"(?i)(?:son|last|past)\s+([0-9]+)\s+(?:ay|months?)"),
    (TimeframeKind::Quarters, r"(?i)(?:son|last|past)\s+([0-9]+)\s+(?:çeyrek|quarters?)"),
    (TimeframeKind::YearRange, r"([0-9]{4})\s*-\s*([0-9]{4})"),
    (TimeframeKind::SingleYear, r"(?i)([0-9]{4})\s+(?:yıl|year)"),
];

static COMPILED: Lazy<Vec<(TimeframeKind, Regex)>> = Lazy::new(|| {
    TIMEFRAME_PATTERNS
        .iter()
        .map(|(kind, pattern)| (*kind, Regex::new(pattern).expect("valid regex")))
        .collect()
});

impl Timeframe {
    pub fn relative_years(&self) -> Option<u32> {
        match self {
            Timeframe::Years { count } => Some(*count),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Timeframe::Years { .. } => "years",
            Timeframe::Months { .. } => "months",
            Timeframe::Quarters { .. } => "quarters",
            Timeframe::YearRange { .. } => "year_range",
            Timeframe::SingleYear { .. } => "single_year",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeframe::Years { count } | Timeframe::Months { count } | Timeframe::Quarters { count } => {
                write!(f, "{}: {}", self.kind(), count)
            }
            Timeframe::YearRange { start, end } => write!(f, "year_range: {start}-{end}"),
            Timeframe::SingleYear { year } => write!(f, "single_year: {year}"),
        }
    }
}

/// Extract the first timeframe the question names, if any.
pub fn extract_timeframe(query: &str) -> Option<Timeframe> {
    COMPILED
        .iter()
        .find_map(|(kind, re)| re.captures(query).and_then(|caps| build(*kind, &caps)))
}

fn build(kind: TimeframeKind, caps: &regex::Captures<'_>) -> Option<Timeframe> {
    let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    let year = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<i32>().ok());

    match kind {
        TimeframeKind::Years => number(1).map(|count| Timeframe::Years { count }),
        TimeframeKind::Months => number(1).map(|count| Timeframe::Months { count }),
        TimeframeKind::Quarters => number(1).map(|count| Timeframe::Quarters { count }),
        TimeframeKind::YearRange => {
            let (a, b) = (year(1)?, year(2)?);
            Some(Timeframe::YearRange {
                start: a.min(b),
                end: a.max(b),
            })
        }
        TimeframeKind::SingleYear => year(1).map(|year| Timeframe::SingleYear { year }),
    }
}

/// True when the question explicitly asks for "last N years" with N > 1.
pub fn mentions_multi_year(query: &str) -> bool {
    matches!(extract_timeframe(query), Some(Timeframe::Years { count }) if count > 1)
}

/// Fiscal years a timeframe covers, most relevant first.
///
/// `anchor_year` is the most recent complete fiscal year. Relative windows
/// count back from it; with no timeframe the window is the anchor year and
/// the one before it.
pub fn relevant_years(timeframe: Option<&Timeframe>, anchor_year: i32) -> Vec<i32> {
    let back_from_anchor = |n: u32| -> Vec<i32> {
        (0..n.min(MAX_WINDOW_YEARS) as i32)
            .map(|i| anchor_year - i)
            .collect()
    };

    match timeframe {
        None => vec![anchor_year, anchor_year - 1],
        Some(Timeframe::Years { count }) => back_from_anchor(*count),
        Some(Timeframe::Quarters { count }) => back_from_anchor(count.div_ceil(4)),
        Some(Timeframe::Months { count }) => back_from_anchor(count.div_ceil(12)),
        Some(Timeframe::YearRange { start, end }) => {
            let start = (*start).max(*end - MAX_WINDOW_YEARS as i32 + 1);
            (start..=*end).collect()
        }
        Some(Timeframe::SingleYear { year }) => vec![*year],
    }
}
