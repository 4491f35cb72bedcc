use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metadata::{deserialize_quarter, DocumentType, FiscalPeriod, Quarter};
use super::parser::FilenameSignals;
use crate::query::keywords::KeywordCategory;
use crate::types::identifiers::{CompanyCode, DocumentId};

/// Page estimate for reports whose page count is unknown.
///
/// Never zero: a zero-page document would slip past every page budget.
pub const DEFAULT_PAGE_COUNT: u32 = 10;

/// An uploaded report, as recorded in its metadata sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    pub filename: String,
    #[serde(default)]
    pub original_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(
        default,
        deserialize_with = "deserialize_quarter",
        skip_serializing_if = "Option::is_none"
    )]
    pub quarter: Option<Quarter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<DocumentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    pub upload_date: DateTime<Utc>,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        filename: impl Into<String>,
        original_name: impl Into<String>,
        upload_date: DateTime<Utc>,
    ) -> Self {
        Document {
            id: DocumentId::new(id),
            filename: filename.into(),
            original_name: original_name.into(),
            company: None,
            year: None,
            quarter: None,
            document_type: None,
            page_count: None,
            upload_date,
        }
    }

    pub fn with_company(mut self, company: impl AsRef<str>) -> Self {
        self.company = Some(CompanyCode::new(company));
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_quarter(mut self, quarter: Quarter) -> Self {
        self.quarter = Some(quarter);
        self
    }

    pub fn with_type(mut self, document_type: DocumentType) -> Self {
        self.document_type = Some(document_type);
        self
    }

    pub fn with_pages(mut self, pages: u32) -> Self {
        self.page_count = Some(pages);
        self
    }

    /// Page count charged against a budget. Unknown or zero counts fall back
    /// to [`DEFAULT_PAGE_COUNT`].
    pub fn pages(&self) -> u32 {
        match self.page_count {
            Some(n) if n > 0 => n,
            _ => DEFAULT_PAGE_COUNT,
        }
    }

    /// Human-readable name for reasons and prompts.
    pub fn display_name(&self) -> &str {
        if self.original_name.is_empty() {
            &self.filename
        } else {
            &self.original_name
        }
    }

    pub fn name_signals(&self) -> FilenameSignals {
        FilenameSignals::new(&[self.filename.as_str(), self.original_name.as_str()])
    }

    /// Declared fiscal year, else the year parsed from the filename.
    pub fn resolved_year(&self) -> Option<i32> {
        self.year.or_else(|| self.name_signals().year())
    }

    pub fn period(&self) -> Option<FiscalPeriod> {
        self.resolved_year().map(|year| FiscalPeriod {
            company: self.company.clone(),
            year,
            quarter: self.quarter,
        })
    }

    pub fn declared_type(&self) -> DocumentType {
        self.document_type.unwrap_or(DocumentType::Other)
    }

    pub fn is_quarterly_report(&self) -> bool {
        self.quarter.is_some()
            || self
                .name_signals()
                .contains_any(KeywordCategory::Quarterly.terms())
    }

    pub fn is_annual_report(&self) -> bool {
        self.document_type == Some(DocumentType::Annual)
            || self
                .name_signals()
                .contains_any(KeywordCategory::Annual.terms())
    }

    pub fn is_financial_report(&self) -> bool {
        self.document_type == Some(DocumentType::Financial)
            || self
                .name_signals()
                .contains_any(&["finansal", "financial", "sonuc", "result"])
    }

    /// Fourth-quarter or full-year coverage.
    pub fn is_year_end(&self) -> bool {
        self.quarter == Some(Quarter::Q4) || self.is_annual_report()
    }

    /// Fill absent quarter and type from filename markers.
    pub fn with_inferred_metadata(mut self) -> Self {
        let names = format!("{} {}", self.filename, self.original_name);
        if self.quarter.is_none() {
            self.quarter = Quarter::infer_from_filename(&names);
        }
        if self.document_type.is_none() {
            self.document_type = DocumentType::infer_from_filename(&names);
        }
        self
    }
}
