use chrono::{TimeZone, Utc};
use report_context::document::{Document, DocumentType, Quarter};
use report_context::selection::{apply_budget, apply_year_coverage};
use report_context::types::SelectionStrategy;
use report_context::{FixedClock, ReportSelector, SelectorConfig};

fn make_doc(id: &str, year: i32, kind: DocumentType, pages: u32) -> Document {
    let uploaded = Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap();
    Document::new(id, format!("{id}.pdf"), "", uploaded)
        .with_year(year)
        .with_type(kind)
        .with_pages(pages)
}

fn selector() -> ReportSelector<FixedClock> {
    ReportSelector::new(FixedClock::in_year(2025).unwrap(), SelectorConfig::v0())
}

fn pool() -> Vec<Document> {
    vec![
        make_doc("fin-2024-a", 2024, DocumentType::Financial, 40),
        make_doc("fin-2024-b", 2024, DocumentType::Financial, 40),
        make_doc("quarterly-2023", 2023, DocumentType::Quarterly, 10),
        make_doc("other-2022", 2022, DocumentType::Other, 30),
    ]
}

#[test]
fn every_required_year_is_covered_before_depth() {
    let docs = pool();
    let result = selector().select(&docs, "last 3 years", 100).unwrap();

    assert_eq!(result.selection.strategy, SelectionStrategy::YearCoverage);
    assert_eq!(result.selection.relevant_years, vec![2024, 2023, 2022]);
    assert_eq!(
        result.selected_ids(),
        vec!["fin-2024-a", "quarterly-2023", "other-2022"]
    );
    assert_eq!(result.selection.pages_used, 80);
    assert!(result
        .selection_reasons
        .iter()
        .any(|r| r.contains("Best 2022 document")));

    let mut years: Vec<i32> = result
        .selected
        .iter()
        .filter_map(Document::resolved_year)
        .collect();
    years.sort();
    years.dedup();
    assert_eq!(years, vec![2022, 2023, 2024]);
}

#[test]
fn score_greedy_path_would_miss_the_oldest_year() {
    let docs = pool();
    let selector = selector();
    let scored = selector.score_documents(&docs, "last 3 years");

    let greedy = apply_budget(&scored, 100, None);
    let ids: Vec<&str> = greedy.admitted.iter().map(|a| a.document.id.as_str()).collect();
    assert_eq!(ids, vec!["fin-2024-a", "fin-2024-b", "quarterly-2023"]);

    let covered = apply_year_coverage(&scored, &[2024, 2023, 2022], 100, None);
    let ids: Vec<&str> = covered.admitted.iter().map(|a| a.document.id.as_str()).collect();
    assert_eq!(ids, vec!["fin-2024-a", "quarterly-2023", "other-2022"]);
}

#[test]
fn missing_year_is_recorded_not_fatal() {
    let docs = vec![
        make_doc("fin-2024", 2024, DocumentType::Financial, 10),
        make_doc("fin-2023", 2023, DocumentType::Financial, 10),
    ];

    let result = selector().select(&docs, "last 3 years", 100).unwrap();

    assert_eq!(result.selected.len(), 2);
    assert!(result
        .selection_reasons
        .contains(&"No documents found for required year 2022".to_string()));
}

#[test]
fn oversized_best_document_is_skipped_for_its_year() {
    let docs = vec![
        make_doc("fin-2024", 2024, DocumentType::Financial, 10),
        make_doc("fin-2023", 2023, DocumentType::Financial, 10),
        make_doc("huge-2022", 2022, DocumentType::Financial, 95),
    ];

    let result = selector().select(&docs, "last 3 years", 100).unwrap();

    assert_eq!(result.selected_ids(), vec!["fin-2024", "fin-2023"]);
    assert_eq!(result.selection.documents_excluded_by_budget, 1);
    assert!(result
        .selection_reasons
        .iter()
        .any(|r| r.starts_with("Cannot fit 2022 document huge-2022.pdf (95 pages)")));
}

#[test]
fn fill_pass_continues_past_an_overflow() {
    let docs = vec![
        make_doc("fin-2024", 2024, DocumentType::Financial, 50),
        make_doc("fin-2023", 2023, DocumentType::Financial, 30),
        make_doc("big-2024", 2024, DocumentType::Financial, 40),
        make_doc("small-2023", 2023, DocumentType::Quarterly, 10),
    ];

    let result = selector().select(&docs, "last 2 years", 100).unwrap();

    // fin-2024 + fin-2023 = 80; big-2024 would reach 120, small-2023 fits.
    assert_eq!(
        result.selected_ids(),
        vec!["fin-2024", "fin-2023", "small-2023"]
    );
    assert_eq!(result.selection.pages_used, 90);
    assert!(result
        .selection_reasons
        .iter()
        .any(|r| r.contains("Additional context")));
}

#[test]
fn explicit_year_coverage_on_annual_summary() {
    let docs = vec![
        make_doc("q4-2024", 2024, DocumentType::Quarterly, 10).with_quarter(Quarter::Q4),
        make_doc("q4-2023", 2023, DocumentType::Quarterly, 10).with_quarter(Quarter::Q4),
        make_doc("q1-2024", 2024, DocumentType::Quarterly, 10).with_quarter(Quarter::Q1),
    ];

    let result = selector()
        .select_year_coverage(&docs, "son 2 yıl gelir", 100)
        .unwrap();

    assert_eq!(result.selection.strategy, SelectionStrategy::YearCoverage);
    assert_eq!(result.selected_ids(), vec!["q4-2024", "q4-2023"]);
}

#[test]
fn smaller_document_covers_a_year_whose_best_overflows() {
    let docs = vec![
        make_doc("fin-2024", 2024, DocumentType::Financial, 60),
        make_doc("fin-2024-b", 2024, DocumentType::Financial, 25),
        make_doc("fin-2023-big", 2023, DocumentType::Financial, 50),
        make_doc("other-2023-small", 2023, DocumentType::Other, 10),
        make_doc("fin-2022", 2022, DocumentType::Financial, 10),
    ];

    let result = selector().select(&docs, "last 3 years", 100).unwrap();

    assert_eq!(
        result.selected_ids(),
        vec!["fin-2024", "other-2023-small", "fin-2022"]
    );
    assert_eq!(result.selection.pages_used, 80);
    assert_eq!(result.selection.documents_excluded_by_budget, 2);

    let mut years: Vec<i32> = result
        .selected
        .iter()
        .filter_map(Document::resolved_year)
        .collect();
    years.sort();
    assert_eq!(years, vec![2022, 2023, 2024]);
}
