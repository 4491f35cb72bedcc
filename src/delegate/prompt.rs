use std::fmt::Write as _;

use serde::Serialize;

use crate::document::Document;
use crate::query::QueryContext;

/// One line of the numbered document list sent to the delegate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    /// 1-based position, the index the delegate answers with.
    pub number: usize,
    pub name: String,
    pub year: Option<i32>,
    pub quarter: Option<u32>,
    pub pages: u32,
    pub company: Option<String>,
}

impl DocumentSummary {
    pub fn of(number: usize, doc: &Document) -> Self {
        Self {
            number,
            name: doc.display_name().to_string(),
            year: doc.resolved_year(),
            quarter: doc.quarter.map(|q| q.number()),
            pages: doc.pages(),
            company: doc.company.as_ref().map(|c| c.as_str().to_string()),
        }
    }

    /// `N. name (2024, Q4, 12 pages, Company: thyao)`
    pub fn render(&self) -> String {
        let year = self
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "unknown year".to_string());
        let period = self
            .quarter
            .map(|q| format!("Q{q}"))
            .unwrap_or_else(|| "annual".to_string());
        let company = self.company.as_deref().unwrap_or("unknown");

        format!(
            "{}. {} ({}, {}, {} pages, Company: {})",
            self.number, self.name, year, period, self.pages, company
        )
    }
}

pub fn summarize(documents: &[Document]) -> Vec<DocumentSummary> {
    documents
        .iter()
        .enumerate()
        .map(|(i, doc)| DocumentSummary::of(i + 1, doc))
        .collect()
}

/// Renders the structured-generation request: query, numbered documents,
/// page budget, interpreted context and the reply schema.
pub fn build_selection_prompt(
    query: &str,
    context: &QueryContext,
    documents: &[Document],
    max_pages: u32,
) -> String {
    let mut prompt = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(
        prompt,
        "You are a financial analyst choosing the best documents for analysis."
    );
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "QUERY: \"{query}\"");
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "AVAILABLE DOCUMENTS:");
    for summary in summarize(documents) {
        let _ = writeln!(prompt, "{}", summary.render());
    }
    let _ = writeln!(prompt);

    let preferred: Vec<&str> = context
        .preferred_document_types
        .iter()
        .map(|p| p.as_str())
        .collect();
    let _ = writeln!(prompt, "QUERY CONTEXT:");
    let _ = writeln!(prompt, "- Information type: {}", context.describe());
    let _ = writeln!(prompt, "- Preferred documents: {}", preferred.join(", "));
    let _ = writeln!(prompt);

    let _ = writeln!(prompt, "CONSTRAINTS:");
    let _ = writeln!(prompt, "- Maximum total pages: {max_pages}");
    let _ = writeln!(
        prompt,
        "- Select documents that provide the BEST data for answering the query"
    );
    let _ = writeln!(
        prompt,
        "- For multi-year analysis, ensure coverage of all required years"
    );
    let _ = writeln!(
        prompt,
        "- Prioritize year-end/annual reports over quarterly for annual comparisons"
    );
    let _ = writeln!(prompt);

    let _ = writeln!(prompt, "Respond in this exact JSON format:");
    let _ = writeln!(prompt, "{{");
    let _ = writeln!(
        prompt,
        "  \"reasoning\": \"Explain your selection logic and why these documents are best\","
    );
    let _ = writeln!(prompt, "  \"selectedDocuments\": [1, 3, 5],");
    let _ = writeln!(prompt, "  \"totalPages\": 30,");
    let _ = writeln!(
        prompt,
        "  \"coverageAnalysis\": \"Explain what years/quarters are covered\""
    );
    let _ = write!(prompt, "}}");

    prompt
}
