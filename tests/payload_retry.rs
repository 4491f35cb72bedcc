use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use report_context::delegate::{
    AnalysisError, DocumentAnalyzer, PayloadRetry, RetryError, RetryState,
};
use report_context::document::Document;
use report_context::SelectorConfig;
use serde_json::json;

/// Rejects any request above `limit` pages as too large.
struct PageLimitedAnalyzer {
    limit: u32,
    calls: Mutex<Vec<usize>>,
}

impl PageLimitedAnalyzer {
    fn new(limit: u32) -> Self {
        Self {
            limit,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DocumentAnalyzer for PageLimitedAnalyzer {
    type Output = Vec<String>;

    async fn analyze(&self, documents: &[Document]) -> Result<Self::Output, AnalysisError> {
        self.calls.lock().unwrap().push(documents.len());
        let pages: u32 = documents.iter().map(Document::pages).sum();
        if pages > self.limit {
            return Err(AnalysisError::PayloadTooLarge(format!(
                "{pages} pages exceeds {}",
                self.limit
            )));
        }
        Ok(documents.iter().map(|d| d.id.to_string()).collect())
    }
}

struct BrokenAnalyzer;

#[async_trait]
impl DocumentAnalyzer for BrokenAnalyzer {
    type Output = ();

    async fn analyze(&self, _documents: &[Document]) -> Result<Self::Output, AnalysisError> {
        Err(AnalysisError::Failed("provider unavailable".to_string()))
    }
}

fn make_doc(id: &str, pages: u32) -> Document {
    let uploaded = Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap();
    Document::new(id, format!("{id}.pdf"), "", uploaded).with_pages(pages)
}

fn selection(n: usize) -> Vec<Document> {
    (0..n).map(|i| make_doc(&format!("doc-{i}"), 10)).collect()
}

#[tokio::test]
async fn halving_keeps_the_highest_priority_prefix() {
    let analyzer = PageLimitedAnalyzer::new(25);
    let docs = selection(8);

    let outcome = PayloadRetry::default().run(&analyzer, &docs).await.unwrap();

    assert_eq!(outcome.output, vec!["doc-0", "doc-1"]);
    assert_eq!(outcome.documents_used.len(), 2);
    assert!(outcome.retried());
    assert_eq!(*analyzer.calls.lock().unwrap(), vec![8, 4, 2]);

    let states: Vec<RetryState> = outcome.attempts.iter().map(|a| a.state).collect();
    assert_eq!(
        states,
        vec![
            RetryState::Initial,
            RetryState::Retrying(1),
            RetryState::Retrying(2)
        ]
    );
    assert_eq!(outcome.attempts[0].pages, 80);
    assert_eq!(
        outcome.attempts[0].error.as_deref(),
        Some("80 pages exceeds 25")
    );
    assert_eq!(outcome.attempts[2].error, None);
}

#[tokio::test]
async fn first_try_success_is_not_a_retry() {
    let analyzer = PageLimitedAnalyzer::new(100);
    let docs = selection(3);

    let outcome = PayloadRetry::default().run(&analyzer, &docs).await.unwrap();

    assert!(!outcome.retried());
    assert_eq!(outcome.attempts.len(), 1);
    assert_eq!(outcome.attempts[0].state, RetryState::Initial);
}

#[tokio::test]
async fn odd_selections_round_down() {
    let analyzer = PageLimitedAnalyzer::new(20);
    let docs = selection(5);

    let outcome = PayloadRetry::default().run(&analyzer, &docs).await.unwrap();

    assert_eq!(*analyzer.calls.lock().unwrap(), vec![5, 2]);
    assert_eq!(outcome.documents_used.len(), 2);
}

#[tokio::test]
async fn single_oversized_document_is_content_too_large() {
    let analyzer = PageLimitedAnalyzer::new(25);
    let docs = vec![make_doc("big", 50), make_doc("small", 10)];

    let err = PayloadRetry::default()
        .run(&analyzer, &docs)
        .await
        .unwrap_err();

    match &err {
        RetryError::ContentTooLarge { document, attempts } => {
            assert_eq!(document, "big.pdf");
            assert_eq!(attempts.len(), 2);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        err.to_string(),
        "Content too large for analysis: big.pdf alone exceeds the provider limit"
    );
}

#[tokio::test]
async fn attempt_bound_is_respected() {
    let analyzer = PageLimitedAnalyzer::new(5);
    let docs = selection(8);

    let err = PayloadRetry::new(2).run(&analyzer, &docs).await.unwrap_err();

    assert!(matches!(err, RetryError::Exhausted { .. }));
    assert_eq!(err.attempts().len(), 2);
    assert_eq!(*analyzer.calls.lock().unwrap(), vec![8, 4]);
}

#[tokio::test]
async fn other_failures_are_not_retried() {
    let docs = selection(4);

    let err = PayloadRetry::default()
        .run(&BrokenAnalyzer, &docs)
        .await
        .unwrap_err();

    match err {
        RetryError::Analysis { source, attempts } => {
            assert_eq!(source, AnalysisError::Failed("provider unavailable".to_string()));
            assert_eq!(attempts.len(), 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn empty_selection_is_rejected() {
    let analyzer = PageLimitedAnalyzer::new(25);

    let err = PayloadRetry::default().run(&analyzer, &[]).await.unwrap_err();

    assert!(matches!(err, RetryError::EmptySelection));
    assert!(analyzer.calls.lock().unwrap().is_empty());
}

#[test]
fn attempt_bound_comes_from_config() {
    assert_eq!(PayloadRetry::default().max_attempts(), 8);
    assert_eq!(PayloadRetry::new(0).max_attempts(), 1);

    let config = SelectorConfig {
        max_payload_attempts: 3,
        ..SelectorConfig::v0()
    };
    assert_eq!(PayloadRetry::from_config(&config).max_attempts(), 3);
}

#[test]
fn retry_state_serialization() {
    assert_eq!(
        serde_json::to_value(RetryState::Retrying(2)).unwrap(),
        json!({ "state": "retrying", "retry": 2 })
    );
    assert_eq!(
        serde_json::to_value(RetryState::Initial).unwrap(),
        json!({ "state": "initial" })
    );
}
