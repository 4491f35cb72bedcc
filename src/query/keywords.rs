//! Bilingual (Turkish / English) vocabulary tables.
//!
//! Matching is by substring on the lowercased query, so `"net kar"` also
//! counts as a `"kar"` hit. Adding a locale means extending these tables, not
//! the scoring code.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordCategory {
    Revenue,
    Profit,
    Loss,
    Financial,
    Quarterly,
    Annual,
    Growth,
    Comparison,
    Trend,
    Recent,
    Historical,
}

/// Every category in scoring order, paired with its synonyms.
pub const TAXONOMY: &[(KeywordCategory, &[&str])] = &[
    (KeywordCategory::Revenue, &["gelir", "revenue", "hasılat", "satış", "income"]),
    (KeywordCategory::Profit, &["kar", "profit", "net kar", "net profit", "kazanç"]),
    (KeywordCategory::Loss, &["zarar", "loss", "kayıp"]),
    (KeywordCategory::Financial, &["finansal", "financial", "mali", "economic"]),
    (
        KeywordCategory::Quarterly,
        &["çeyrek", "quarter", "quarterly", "q1", "q2", "q3", "q4"],
    ),
    (KeywordCategory::Annual, &["yıllık", "annual", "yearly", "senelik"]),
    (KeywordCategory::Growth, &["büyüme", "growth", "artış", "increase"]),
    (
        KeywordCategory::Comparison,
        &["karşılaştır", "compare", "vs", "göre", "compared"],
    ),
    (KeywordCategory::Trend, &["trend", "eğilim", "değişim", "change"]),
    (KeywordCategory::Recent, &["son", "recent", "latest", "güncel", "current"]),
    (
        KeywordCategory::Historical,
        &["geçmiş", "historical", "önceki", "previous", "eski"],
    ),
];

/// Whole-period wording that marks a summary request.
pub const SUMMARY_TERMS: &[&str] = &["toplam", "total", "genel", "overall", "summary", "özet"];

/// Directional wording that marks a movement-over-time request.
pub const MOVEMENT_TERMS: &[&str] = &["değişim", "change", "artış", "azalış", "increase", "decrease"];

impl KeywordCategory {
    pub fn terms(self) -> &'static [&'static str] {
        TAXONOMY
            .iter()
            .find(|(category, _)| *category == self)
            .map(|(_, terms)| *terms)
            .unwrap_or(&[])
    }

    pub fn as_str(self) -> &'static str {
        match self {
            KeywordCategory::Revenue => "revenue",
            KeywordCategory::Profit => "profit",
            KeywordCategory::Loss => "loss",
            KeywordCategory::Financial => "financial",
            KeywordCategory::Quarterly => "quarterly",
            KeywordCategory::Annual => "annual",
            KeywordCategory::Growth => "growth",
            KeywordCategory::Comparison => "comparison",
            KeywordCategory::Trend => "trend",
            KeywordCategory::Recent => "recent",
            KeywordCategory::Historical => "historical",
        }
    }
}

/// Number of `terms` occurring in `lowered`.
pub fn count_matches(lowered: &str, terms: &[&str]) -> usize {
    terms.iter().filter(|term| lowered.contains(*term)).count()
}

pub fn mentions_any(lowered: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| lowered.contains(term))
}

/// `(category, match count)` for every category the text touches, in
/// taxonomy order.
pub fn category_matches(lowered: &str) -> Vec<(KeywordCategory, usize)> {
    TAXONOMY
        .iter()
        .map(|(category, terms)| (*category, count_matches(lowered, terms)))
        .filter(|(_, count)| *count > 0)
        .collect()
}
