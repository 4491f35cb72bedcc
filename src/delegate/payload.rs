use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::SelectorConfig;
use crate::document::Document;

/// The downstream analysis call that receives the selected documents.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    type Output: Send;

    async fn analyze(&self, documents: &[Document]) -> Result<Self::Output, AnalysisError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    /// The provider rejected the request size or page count.
    #[error("Request payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Analysis failed: {0}")]
    Failed(String),
}

/// Initial -> Retrying(n) -> Exhausted | Succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "retry")]
pub enum RetryState {
    Initial,
    Retrying(usize),
    Exhausted,
    Succeeded,
}

/// One call to the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadAttempt {
    /// State the attempt was made in.
    pub state: RetryState,
    pub documents: usize,
    pub pages: u32,
    /// `None` on success.
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct RetryOutcome<T> {
    pub output: T,
    /// The prefix of the selection that was finally analyzed.
    pub documents_used: Vec<Document>,
    pub attempts: Vec<PayloadAttempt>,
}

impl<T> RetryOutcome<T> {
    pub fn retried(&self) -> bool {
        self.attempts.len() > 1
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetryError {
    #[error("Content too large for analysis: {document} alone exceeds the provider limit")]
    ContentTooLarge {
        document: String,
        attempts: Vec<PayloadAttempt>,
    },

    #[error("Payload still too large after {} attempts", .attempts.len())]
    Exhausted { attempts: Vec<PayloadAttempt> },

    #[error("Analysis failed: {source}")]
    Analysis {
        source: AnalysisError,
        attempts: Vec<PayloadAttempt>,
    },

    #[error("Nothing to analyze: the selection is empty")]
    EmptySelection,
}

impl RetryError {
    pub fn attempts(&self) -> &[PayloadAttempt] {
        match self {
            RetryError::ContentTooLarge { attempts, .. }
            | RetryError::Exhausted { attempts }
            | RetryError::Analysis { attempts, .. } => attempts,
            RetryError::EmptySelection => &[],
        }
    }
}

/// Halves the selection on every "payload too large" rejection, keeping the
/// highest-priority prefix, until the call succeeds, a single document is
/// still rejected, or `max_attempts` calls have been made.
#[derive(Debug, Clone, Copy)]
pub struct PayloadRetry {
    max_attempts: usize,
}

impl Default for PayloadRetry {
    fn default() -> Self {
        Self::from_config(&SelectorConfig::v0())
    }
}

impl PayloadRetry {
    /// `max_attempts` below one is treated as one.
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn from_config(config: &SelectorConfig) -> Self {
        Self::new(config.max_payload_attempts)
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// `documents` must be in priority order, most important first.
    pub async fn run<A>(
        &self,
        analyzer: &A,
        documents: &[Document],
    ) -> Result<RetryOutcome<A::Output>, RetryError>
    where
        A: DocumentAnalyzer + ?Sized,
    {
        if documents.is_empty() {
            return Err(RetryError::EmptySelection);
        }

        let mut state = RetryState::Initial;
        let mut current = documents;
        let mut attempts: Vec<PayloadAttempt> = Vec::new();

        loop {
            let pages: u32 = current.iter().map(Document::pages).sum();
            debug!(state = ?state, documents = current.len(), pages, "analysis attempt");

            match analyzer.analyze(current).await {
                Ok(output) => {
                    attempts.push(PayloadAttempt {
                        state,
                        documents: current.len(),
                        pages,
                        error: None,
                    });
                    debug!(from = ?state, to = ?RetryState::Succeeded, "payload retry finished");
                    return Ok(RetryOutcome {
                        output,
                        documents_used: current.to_vec(),
                        attempts,
                    });
                }
                Err(AnalysisError::PayloadTooLarge(message)) => {
                    attempts.push(PayloadAttempt {
                        state,
                        documents: current.len(),
                        pages,
                        error: Some(message.clone()),
                    });

                    if current.len() == 1 {
                        warn!(from = ?state, to = ?RetryState::Exhausted, document = %current[0].id, "single document exceeds provider limit");
                        return Err(RetryError::ContentTooLarge {
                            document: current[0].display_name().to_string(),
                            attempts,
                        });
                    }
                    if attempts.len() >= self.max_attempts {
                        warn!(from = ?state, to = ?RetryState::Exhausted, attempts = attempts.len(), "payload retry bound reached");
                        return Err(RetryError::Exhausted { attempts });
                    }

                    let keep = current.len() / 2;
                    let next = RetryState::Retrying(attempts.len());
                    warn!(
                        from = ?state,
                        to = ?next,
                        reason = %message,
                        documents = current.len(),
                        keep,
                        "payload too large, retrying with fewer documents"
                    );
                    current = &current[..keep];
                    state = next;
                }
                Err(source) => {
                    attempts.push(PayloadAttempt {
                        state,
                        documents: current.len(),
                        pages,
                        error: Some(source.to_string()),
                    });
                    warn!(from = ?state, error = %source, "analysis failed, not retrying");
                    return Err(RetryError::Analysis { source, attempts });
                }
            }
        }
    }
}
