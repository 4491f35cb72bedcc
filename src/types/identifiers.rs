use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::document::Document;

/// Stable identifier assigned by the uploader.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        DocumentId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Exchange ticker of the reporting company, normalized to lowercase.
///
/// Deserialization goes through [`CompanyCode::new`] so sidecars written with
/// `"THYAO"` and `"thyao"` name the same company.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CompanyCode(String);

impl CompanyCode {
    pub fn new(code: impl AsRef<str>) -> Self {
        CompanyCode(code.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CompanyCode {
    fn from(value: String) -> Self {
        CompanyCode::new(value)
    }
}

impl From<CompanyCode> for String {
    fn from(value: CompanyCode) -> Self {
        value.0
    }
}

impl fmt::Display for CompanyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content fingerprint of a document pool: `sha256:<hex>` over the
/// identity and classification of every document, independent of input order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogVersion(String);

impl CatalogVersion {
    pub fn of(documents: &[Document]) -> Self {
        let mut lines: Vec<String> = documents
            .iter()
            .map(|doc| {
                format!(
                    "{}:{}:{}:{}:{}:{}",
                    doc.id.as_str(),
                    doc.filename,
                    doc.year.map(|y| y.to_string()).unwrap_or_default(),
                    doc.quarter.map(|q| q.as_str()).unwrap_or(""),
                    doc.document_type.map(|t| t.as_str()).unwrap_or(""),
                    doc.pages(),
                )
            })
            .collect();
        lines.sort();

        let mut hasher = Sha256::new();
        for line in &lines {
            hasher.update(line.as_bytes());
            hasher.update(b"\n");
        }

        CatalogVersion(format!("sha256:{}", hex::encode(hasher.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
