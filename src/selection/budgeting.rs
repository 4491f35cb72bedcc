use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use tracing::debug;

use crate::document::{Document, FiscalPeriod, Quarter};
use crate::types::context_bundle::DocumentScore;

/// Bonus for a document whose quarter is not yet represented.
const QUARTER_DIVERSITY_BONUS: i32 = 10;

/// Running page total against a hard maximum.
#[derive(Debug, Clone, Copy)]
pub struct PageBudget {
    max_pages: u32,
    used: u32,
}

impl PageBudget {
    pub fn new(max_pages: u32) -> Self {
        Self { max_pages, used: 0 }
    }

    pub fn fits(&self, pages: u32) -> bool {
        self.used
            .checked_add(pages)
            .is_some_and(|total| total <= self.max_pages)
    }

    pub fn charge(&mut self, pages: u32) {
        self.used += pages;
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }
}

/// A document accepted into the selection, with its effective score.
#[derive(Debug, Clone)]
pub struct Admission<'a> {
    pub index: usize,
    pub document: &'a Document,
    pub score: i32,
}

pub struct BudgetResult<'a> {
    /// In admission order.
    pub admitted: Vec<Admission<'a>>,
    pub pages_used: u32,
    pub total_score: i64,
    pub reasons: Vec<String>,
    pub documents_excluded_by_budget: usize,
}

/// Shared bookkeeping for both selection paths.
struct Admitter<'a> {
    budget: PageBudget,
    per_period_limit: Option<usize>,
    per_period: HashMap<FiscalPeriod, usize>,
    admitted: Vec<Admission<'a>>,
    admitted_indices: HashSet<usize>,
    over_budget: BTreeSet<usize>,
    total_score: i64,
    reasons: Vec<String>,
}

impl<'a> Admitter<'a> {
    fn new(max_pages: u32, per_period_limit: Option<usize>) -> Self {
        Self {
            budget: PageBudget::new(max_pages),
            per_period_limit,
            per_period: HashMap::new(),
            admitted: Vec::new(),
            admitted_indices: HashSet::new(),
            over_budget: BTreeSet::new(),
            total_score: 0,
            reasons: Vec::new(),
        }
    }

    fn is_admitted(&self, index: usize) -> bool {
        self.admitted_indices.contains(&index)
    }

    fn covered_quarters(&self) -> HashSet<Quarter> {
        self.admitted.iter().filter_map(|a| a.document.quarter).collect()
    }

    /// Records a reason and returns false when the period is already full.
    fn period_allows(&mut self, doc: &Document) -> bool {
        let (Some(limit), Some(period)) = (self.per_period_limit, doc.period()) else {
            return true;
        };
        let taken = self.per_period.get(&period).copied().unwrap_or(0);
        if taken < limit {
            return true;
        }

        let quarter = period.quarter.map(|q| q.as_str()).unwrap_or("annual");
        debug!(document = %doc.id, year = period.year, quarter, "period already covered");
        self.reasons.push(format!(
            "Skipping {}: period {} {} already has {} document(s)",
            doc.display_name(),
            period.year,
            quarter,
            taken
        ));
        false
    }

    /// Records a reason and returns false when the document would overflow.
    fn budget_allows(&mut self, scored: &DocumentScore<'a>) -> bool {
        let pages = scored.document.pages();
        if self.budget.fits(pages) {
            return true;
        }

        debug!(
            document = %scored.document.id,
            pages,
            used = self.budget.used(),
            max = self.budget.max_pages(),
            "skipping: would exceed page limit"
        );
        self.reasons.push(format!(
            "Skipping {} ({} pages): would exceed page limit ({}/{})",
            scored.document.display_name(),
            pages,
            self.budget.used(),
            self.budget.max_pages()
        ));
        self.over_budget.insert(scored.index);
        false
    }

    fn admit(&mut self, scored: &DocumentScore<'a>, score: i32, mut notes: Vec<String>) {
        let doc = scored.document;
        let pages = doc.pages();

        self.budget.charge(pages);
        if let Some(period) = doc.period() {
            *self.per_period.entry(period).or_insert(0) += 1;
        }
        self.admitted.push(Admission {
            index: scored.index,
            document: doc,
            score,
        });
        self.admitted_indices.insert(scored.index);
        self.total_score += i64::from(score);

        debug!(
            document = %doc.id,
            pages,
            used = self.budget.used(),
            max = self.budget.max_pages(),
            score,
            "selected"
        );

        let mut reasons = scored.details.reasons.clone();
        reasons.append(&mut notes);
        reasons.push(format!("{pages} pages"));
        self.reasons.push(format!(
            "{}: {} points ({})",
            doc.display_name(),
            score,
            reasons.join(", ")
        ));
    }

    fn finish(self) -> BudgetResult<'a> {
        let admitted_indices = self.admitted_indices;
        let documents_excluded_by_budget = self
            .over_budget
            .iter()
            .filter(|i| !admitted_indices.contains(i))
            .count();

        BudgetResult {
            admitted: self.admitted,
            pages_used: self.budget.used(),
            total_score: self.total_score,
            reasons: self.reasons,
            documents_excluded_by_budget,
        }
    }
}

/// Greedy scan over score-sorted documents. A document that does not fit is
/// skipped and the scan continues with the next one.
pub fn apply_budget<'a>(
    scored: &[DocumentScore<'a>],
    max_pages: u32,
    per_period_limit: Option<usize>,
) -> BudgetResult<'a> {
    let mut admitter = Admitter::new(max_pages, per_period_limit);

    for candidate in scored {
        if !admitter.period_allows(candidate.document) || !admitter.budget_allows(candidate) {
            continue;
        }

        // Recomputed per step: depends on what has been admitted so far.
        let diversity = match candidate.document.quarter {
            Some(q) if !admitter.covered_quarters().contains(&q) => QUARTER_DIVERSITY_BONUS,
            _ => 0,
        };

        let notes = if diversity > 0 {
            vec!["Adds quarter diversity".to_string()]
        } else {
            Vec::new()
        };
        admitter.admit(candidate, candidate.score + diversity, notes);
    }

    admitter.finish()
}

/// Year coverage before score depth: the best document of each required
/// year first (in `required_years` order), then any remaining documents by
/// score while budget remains. When a year's best document overflows, its
/// highest-scoring document that fits covers the year instead.
pub fn apply_year_coverage<'a>(
    scored: &[DocumentScore<'a>],
    required_years: &[i32],
    max_pages: u32,
    per_period_limit: Option<usize>,
) -> BudgetResult<'a> {
    let mut admitter = Admitter::new(max_pages, per_period_limit);

    // `scored` is sorted, so each year's first entry is its best document.
    let mut by_year: BTreeMap<i32, Vec<&DocumentScore<'a>>> = BTreeMap::new();
    for candidate in scored {
        if let Some(year) = candidate.document.resolved_year() {
            by_year.entry(year).or_default().push(candidate);
        }
    }

    for &year in required_years {
        let Some(candidates) = by_year.get(&year).filter(|docs| !docs.is_empty()) else {
            debug!(year, "no documents for required year");
            admitter
                .reasons
                .push(format!("No documents found for required year {year}"));
            continue;
        };

        let best = candidates[0];
        if admitter.budget.fits(best.document.pages()) {
            admitter.admit(best, best.score, vec![format!("Best {year} document")]);
            continue;
        }

        debug!(year, document = %best.document.id, "best document for year does not fit");
        admitter.reasons.push(format!(
            "Cannot fit {} document {} ({} pages): would exceed page limit",
            year,
            best.document.display_name(),
            best.document.pages()
        ));
        admitter.over_budget.insert(best.index);

        // Next-best document of the same year that still fits.
        let substitute = candidates
            .iter()
            .skip(1)
            .find(|c| admitter.budget.fits(c.document.pages()));
        if let Some(&substitute) = substitute {
            admitter.admit(
                substitute,
                substitute.score,
                vec![format!("Covers {year} within budget")],
            );
        }
    }

    for candidate in scored {
        if admitter.is_admitted(candidate.index) {
            continue;
        }
        if !admitter.period_allows(candidate.document) || !admitter.budget_allows(candidate) {
            continue;
        }
        admitter.admit(candidate, candidate.score, vec!["Additional context".to_string()]);
    }

    admitter.finish()
}
