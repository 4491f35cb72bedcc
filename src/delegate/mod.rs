//! Language-model assisted selection and the recovery around it.

pub mod chain;
pub mod payload;
pub mod prompt;
pub mod response;

pub use chain::{ChainError, DelegateError, DelegateRequest, SelectionChain, SelectionDelegate};
pub use payload::{
    AnalysisError, DocumentAnalyzer, PayloadAttempt, PayloadRetry, RetryError, RetryOutcome,
    RetryState,
};
pub use prompt::{build_selection_prompt, summarize, DocumentSummary};
pub use response::{parse_delegate_response, DelegateSelection, ResponseParseError};
