use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use report_context::delegate::{
    ChainError, DelegateError, DelegateRequest, SelectionChain, SelectionDelegate,
};
use report_context::document::{Document, DocumentType, Quarter};
use report_context::types::{SelectionError, SelectionStrategy};
use report_context::{FixedClock, ReportSelector, SelectorConfig};

enum Script {
    Reply(&'static str),
    Fail(&'static str),
}

struct ScriptedDelegate {
    script: Script,
    seen: Mutex<Vec<DelegateRequest>>,
}

impl ScriptedDelegate {
    fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl SelectionDelegate for ScriptedDelegate {
    async fn complete(&self, request: DelegateRequest) -> Result<String, DelegateError> {
        self.seen.lock().unwrap().push(request);
        match self.script {
            Script::Reply(text) => Ok(text.to_string()),
            Script::Fail(message) => Err(DelegateError::Request(message.to_string())),
        }
    }
}

fn make_doc(id: &str, year: i32, quarter: Quarter) -> Document {
    let uploaded = Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap();
    let filename = format!("thyao_{year}_{}.pdf", quarter.as_str().to_lowercase());
    Document::new(id, filename, "", uploaded)
        .with_company("THYAO")
        .with_year(year)
        .with_quarter(quarter)
        .with_type(DocumentType::Quarterly)
        .with_pages(10)
}

fn pool() -> Vec<Document> {
    vec![
        make_doc("q4-2024", 2024, Quarter::Q4),
        make_doc("q4-2023", 2023, Quarter::Q4),
        make_doc("q1-2024", 2024, Quarter::Q1),
    ]
}

fn selector() -> ReportSelector<FixedClock> {
    ReportSelector::new(FixedClock::in_year(2025).unwrap(), SelectorConfig::v0())
}

fn chain_with(delegate: Arc<ScriptedDelegate>) -> SelectionChain<FixedClock> {
    SelectionChain::new(selector()).with_delegate(delegate)
}

#[tokio::test]
async fn valid_reply_is_used_as_is() {
    let docs = pool();
    let delegate = ScriptedDelegate::new(Script::Reply(
        r#"Here you go: {"reasoning": "Year-end reports", "selectedDocuments": [1, 2], "totalPages": 20, "coverageAnalysis": "2023 and 2024"}"#,
    ));
    let chain = chain_with(delegate);

    let result = chain.select(&docs, "son 2 yıl gelir", 100).await.unwrap();

    assert_eq!(result.selection.strategy, SelectionStrategy::Delegated);
    assert_eq!(result.selected_ids(), vec!["q4-2024", "q4-2023"]);
    assert_eq!(result.dropped.len(), 1);
    assert_eq!(result.dropped[0].id.as_str(), "q1-2024");
    assert_eq!(result.selection.pages_used, 20);
    assert_eq!(result.selection_reasons[0], "Delegate reasoning: Year-end reports");
    assert_eq!(result.selection_reasons[1], "Coverage: 2023 and 2024");
    assert!(result
        .selection_reasons
        .contains(&"thyao_2024_q4.pdf: Selected by delegate for relevance (10 pages)".to_string()));

    let expected: i64 = selector()
        .score_documents(&docs, "son 2 yıl gelir")
        .iter()
        .filter(|s| s.index < 2)
        .map(|s| i64::from(s.score))
        .sum();
    assert_eq!(result.total_score, expected);
}

#[tokio::test]
async fn fenced_reply_with_trailing_commas_is_repaired() {
    let docs = pool();
    let delegate = ScriptedDelegate::new(Script::Reply(
        "```json\n{\n  \"reasoning\": \"Latest quarter first\",\n  \"selectedDocuments\": [3, 1,],\n}\n```",
    ));
    let chain = chain_with(delegate);

    let result = chain.select(&docs, "Q1 2024 performance", 100).await.unwrap();

    assert_eq!(result.selection.strategy, SelectionStrategy::Delegated);
    assert_eq!(result.selected_ids(), vec!["q1-2024", "q4-2024"]);
}

#[tokio::test]
async fn unparseable_multi_year_reply_falls_back_to_year_coverage() {
    let docs = pool();
    let chain = chain_with(ScriptedDelegate::new(Script::Reply("I cannot help with that.")));

    let result = chain.select(&docs, "son 2 yıl gelir", 100).await.unwrap();

    assert_eq!(result.selection.strategy, SelectionStrategy::YearCoverage);
    assert_eq!(result.selected_ids(), vec!["q4-2024", "q4-2023"]);
    assert!(result.selection_reasons[0].starts_with("Fallback after delegated: "));
}

#[tokio::test]
async fn unparseable_reply_falls_back_to_context_selection() {
    let docs = pool();
    let chain = chain_with(ScriptedDelegate::new(Script::Reply("{ definitely not json }")));

    let result = chain.select(&docs, "Q1 2024 performance", 100).await.unwrap();

    assert_eq!(result.selection.strategy, SelectionStrategy::ContextFiltered);
    assert_eq!(result.selected.len(), 3);
    assert!(result.selection_reasons[0].starts_with("Fallback after delegated: "));
}

#[tokio::test]
async fn delegate_error_falls_back() {
    let docs = pool();
    let chain = chain_with(ScriptedDelegate::new(Script::Fail("timeout")));

    let result = chain.select(&docs, "son 2 yıl gelir", 100).await.unwrap();

    assert_eq!(result.selection.strategy, SelectionStrategy::YearCoverage);
    assert_eq!(
        result.selection_reasons[0],
        "Fallback after delegated: Delegate request failed: timeout"
    );
}

#[tokio::test]
async fn blank_reply_falls_back() {
    let docs = pool();
    let chain = chain_with(ScriptedDelegate::new(Script::Reply("   \n")));

    let result = chain.select(&docs, "son 2 yıl gelir", 100).await.unwrap();

    assert_eq!(result.selection.strategy, SelectionStrategy::YearCoverage);
    assert!(result.selection_reasons[0].contains("empty response"));
}

#[tokio::test]
async fn invalid_and_duplicate_numbers_are_ignored() {
    let docs = pool();
    let chain = chain_with(ScriptedDelegate::new(Script::Reply(
        r#"{"reasoning": "r", "selectedDocuments": [0, 5, -1, 2, 2]}"#,
    )));

    let result = chain.select(&docs, "son 2 yıl gelir", 100).await.unwrap();

    assert_eq!(result.selection.strategy, SelectionStrategy::Delegated);
    assert_eq!(result.selected_ids(), vec!["q4-2023"]);
    let reasons = &result.selection_reasons;
    assert!(reasons.contains(&"Ignoring document number 0: out of range (1-3)".to_string()));
    assert!(reasons.contains(&"Ignoring document number 5: out of range (1-3)".to_string()));
    assert!(reasons.contains(&"Ignoring document number -1: out of range (1-3)".to_string()));
    assert!(reasons.contains(&"Ignoring duplicate document number 2".to_string()));
}

#[tokio::test]
async fn delegate_picks_still_respect_the_budget() {
    let docs = pool();
    let chain = chain_with(ScriptedDelegate::new(Script::Reply(
        r#"{"reasoning": "all", "selectedDocuments": [1, 2, 3], "totalPages": 30}"#,
    )));

    let result = chain.select(&docs, "son 2 yıl gelir", 15).await.unwrap();

    assert_eq!(result.selected_ids(), vec!["q4-2024"]);
    assert_eq!(result.selection.pages_used, 10);
    assert_eq!(result.selection.documents_excluded_by_budget, 2);
    assert!(result.selection_reasons.contains(
        &"Skipping thyao_2023_q4.pdf (10 pages): would exceed page limit (10/15)".to_string()
    ));
}

#[tokio::test]
async fn reply_admitting_nothing_falls_back() {
    let docs = pool();
    let chain = chain_with(ScriptedDelegate::new(Script::Reply(
        r#"{"reasoning": "none fit", "selectedDocuments": [7]}"#,
    )));

    let result = chain.select(&docs, "Q1 2024 performance", 100).await.unwrap();

    assert_eq!(result.selection.strategy, SelectionStrategy::ContextFiltered);
    assert!(result.selection_reasons[0].contains("admitted no documents"));
}

#[tokio::test]
async fn without_delegate_the_chain_matches_the_selector() {
    let uploaded = Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap();
    let docs = vec![
        make_doc("q4-2024", 2024, Quarter::Q4).with_pages(40),
        Document::new("annual-2024", "thyao_2024_annual.pdf", "", uploaded)
            .with_company("THYAO")
            .with_year(2024)
            .with_type(DocumentType::Financial)
            .with_pages(40),
        make_doc("q4-2023", 2023, Quarter::Q4).with_pages(40),
    ];
    let chain = SelectionChain::new(selector());

    let chained = chain.select(&docs, "son 2 yıl gelir", 90).await.unwrap();
    let direct = selector().select(&docs, "son 2 yıl gelir", 90).unwrap();

    assert_eq!(chained.selection.strategy, SelectionStrategy::ContextFiltered);
    assert_eq!(chained.selection.strategy, direct.selection.strategy);
    assert_eq!(chained.selected_ids(), direct.selected_ids());
    assert_eq!(chained.selection_reasons, direct.selection_reasons);
}

#[tokio::test]
async fn zero_budget_fails_before_any_strategy() {
    let docs = pool();
    let delegate = ScriptedDelegate::new(Script::Reply("{}"));
    let chain = chain_with(delegate.clone());

    let err = chain.select(&docs, "son 2 yıl gelir", 0).await.unwrap_err();

    assert!(matches!(
        err,
        ChainError::Selection(SelectionError::InvalidBudget(0))
    ));
    assert!(delegate.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn request_carries_numbered_documents() {
    let docs = pool();
    let delegate = ScriptedDelegate::new(Script::Reply(r#"{"selectedDocuments": [1]}"#));
    let chain = chain_with(delegate.clone());

    chain.select(&docs, "son 2 yıl gelir", 100).await.unwrap();

    let seen = delegate.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let request = &seen[0];
    assert_eq!(request.max_pages, 100);
    assert_eq!(request.documents.len(), 3);
    assert!(request
        .prompt
        .contains("1. thyao_2024_q4.pdf (2024, Q4, 10 pages, Company: thyao)"));
    assert!(request
        .prompt
        .contains("3. thyao_2024_q1.pdf (2024, Q1, 10 pages, Company: thyao)"));
    assert!(request.prompt.contains("- Maximum total pages: 100"));
    assert!(request
        .prompt
        .contains("- Information type: annual_summary (years: 2)"));
}
