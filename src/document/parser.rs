//! Heuristics over report filenames.
//!
//! Stored filenames look like `1719999999999-THYAO_2024_Q4_Finansal_Rapor.pdf`:
//! a millisecond upload timestamp, then the uploader's sanitized name. The
//! original name keeps non-ASCII characters (`yıl sonu`), the stored one does
//! not, so both are inspected.

use once_cell::sync::Lazy;
use regex::Regex;

/// Leading upload-timestamp prefix added by the uploader.
static UPLOAD_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10,}[-_]").expect("valid regex"));

/// Ordered year patterns; the first match wins. Every pattern refuses to
/// start or end inside a longer digit run.
static YEAR_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // "2024-yıl", "2024_yil", "2024yıl"
        r"(?:^|[^0-9])((?:19|20)[0-9]{2})[-_ ]?y[ıi]l",
        // "31122024" (31.12.2024 without separators)
        r"(?:^|[^0-9])3112((?:19|20)[0-9]{2})(?:[^0-9]|$)",
        // ISO date "2024-12-31"
        r"(?:^|[^0-9])((?:19|20)[0-9]{2})-[0-9]{1,2}-[0-9]{1,2}(?:[^0-9]|$)",
        // "31.12.2024"
        r"(?:^|[^0-9])[0-9]{1,2}\.[0-9]{1,2}\.((?:19|20)[0-9]{2})(?:[^0-9]|$)",
        // any standalone year
        r"(?:^|[^0-9])((?:19|20)[0-9]{2})(?:[^0-9]|$)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

const YEAR_END_DATE_MARKERS: &[&str] = &["31122", "1231"];
const QUARTER_MARKERS: &[&str] = &[
    "çeyrek", "ceyrek", "quarter", "q1", "q2", "q3", "03.", "06.", "09.",
];
const Q4_MARKERS: &[&str] = &[
    "4.çeyrek", "4ceyrek", "4.ceyrek", "4-ceyrek", "q4", "12.", "december", "aralık", "aralik",
    "fourth quarter", "4th quarter",
];

/// Lowercased, prefix-stripped view over a document's names.
#[derive(Debug, Clone)]
pub struct FilenameSignals {
    text: String,
}

impl FilenameSignals {
    /// Combine the stored filename and the original upload name.
    pub fn new(names: &[&str]) -> Self {
        let text = names
            .iter()
            .filter(|n| !n.is_empty())
            .map(|n| UPLOAD_PREFIX.replace(n, "").to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");
        FilenameSignals { text }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.text.contains(needle)
    }

    pub fn contains_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.text.contains(n))
    }

    pub fn year(&self) -> Option<i32> {
        extract_year(&self.text)
    }

    /// "yıl sonu" / "year end" wording.
    pub fn has_year_end_phrase(&self) -> bool {
        ((self.contains("yıl") || self.contains("yil")) && self.contains("sonu"))
            || (self.contains("year") && self.contains("end"))
    }

    /// A 31 December date such as `31122024` or `...1231`.
    pub fn has_year_end_date(&self) -> bool {
        self.contains_any(YEAR_END_DATE_MARKERS)
    }

    /// Strong indication that the document covers a full fiscal year.
    pub fn indicates_year_end(&self) -> bool {
        self.has_year_end_phrase()
            || self.has_year_end_date()
            || self.contains_any(&["annual", "yıllık", "yillik", "yearly", "december", "aralık", "aralik"])
    }

    /// Any quarter wording or Q1-Q3 period-end date.
    pub fn has_quarter_markers(&self) -> bool {
        self.contains_any(QUARTER_MARKERS)
    }

    /// Fourth-quarter wording, treated as a year-end proxy.
    pub fn indicates_q4(&self) -> bool {
        self.contains_any(Q4_MARKERS)
    }
}

/// First plausible fiscal year found in `name`, trying the ordered patterns.
pub fn extract_year(name: &str) -> Option<i32> {
    let lower = name.to_lowercase();
    YEAR_PATTERNS.iter().find_map(|re| {
        re.captures(&lower)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<i32>().ok())
    })
}
