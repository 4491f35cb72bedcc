use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

static TRAILING_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*([}\]])").expect("valid regex"));
static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[A-Za-z]*").expect("valid regex"));

/// The delegate's reply.
///
/// Indices are kept signed and unchecked here; range checks against the
/// document list happen where the list is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegateSelection {
    #[serde(default)]
    pub reasoning: String,
    pub selected_documents: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<f64>,
    #[serde(default)]
    pub coverage_analysis: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ResponseParseError {
    #[error("No JSON object found in delegate response")]
    NoJsonObject,

    #[error("Malformed delegate response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Parse the outermost `{...}` span of `text`; on failure retry once on a
/// cleaned copy (code fences, typographic quotes, trailing commas and raw
/// control characters removed).
pub fn parse_delegate_response(text: &str) -> Result<DelegateSelection, ResponseParseError> {
    let strict = json_span(text)
        .ok_or(ResponseParseError::NoJsonObject)
        .and_then(|span| serde_json::from_str(span).map_err(ResponseParseError::from));

    match strict {
        Ok(selection) => Ok(selection),
        Err(first) => {
            debug!(error = %first, "strict parse failed, retrying on cleaned text");
            let cleaned = clean(text);
            let span = json_span(&cleaned).ok_or(ResponseParseError::NoJsonObject)?;
            Ok(serde_json::from_str(span)?)
        }
    }
}

fn json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn clean(text: &str) -> String {
    let unfenced = CODE_FENCE.replace_all(text, "");
    let normalized: String = unfenced
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{00AB}' | '\u{00BB}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            // Raw newlines inside strings are invalid JSON; between tokens a
            // space is equivalent.
            c if c.is_control() => ' ',
            c => c,
        })
        .collect();

    TRAILING_COMMA.replace_all(&normalized, "$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_requires_open_before_close() {
        assert_eq!(json_span("} {"), None);
        assert_eq!(json_span("x {\"a\":1} y"), Some("{\"a\":1}"));
    }

    #[test]
    fn clean_strips_fences_and_trailing_commas() {
        let cleaned = clean("```json\n{\"selectedDocuments\": [1, 2,],}\n```");
        assert_eq!(cleaned.trim(), "{\"selectedDocuments\": [1, 2]}");
    }
}
