// Read-only: the uploader owns writes, this side only lists.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::document::Document;
use crate::types::identifiers::CompanyCode;

pub const COMPANIES_DIR: &str = "companies";
pub const SIDECAR_SUFFIX: &str = ".meta.json";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Upload root is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Uploaded reports under `<root>/companies/<code>/`, one
/// `<storedFilename>.meta.json` sidecar next to each PDF.
#[derive(Debug, Clone)]
pub struct ReportCatalog {
    root: PathBuf,
}

impl ReportCatalog {
    /// The root does not need to exist yet; an absent root lists nothing.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let root = root.into();
        if root.exists() && !root.is_dir() {
            return Err(CatalogError::NotADirectory(root));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn companies_dir(&self) -> PathBuf {
        self.root.join(COMPANIES_DIR)
    }

    /// Company directories, sorted.
    pub fn companies(&self) -> Result<Vec<CompanyCode>, CatalogError> {
        let dir = self.companies_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut companies = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                companies.push(CompanyCode::new(name));
            }
        }
        companies.sort();
        companies.dedup();
        Ok(companies)
    }

    /// Every loadable report, newest upload first. Pass a company to list
    /// only that company's directory.
    ///
    /// Sidecars that cannot be read or parsed, and sidecars whose PDF is
    /// gone, are logged and skipped.
    pub fn list(&self, company: Option<&CompanyCode>) -> Result<Vec<Document>, CatalogError> {
        let companies = match company {
            Some(code) => vec![code.clone()],
            None => self.companies()?,
        };

        let mut documents = Vec::new();
        for code in &companies {
            let dir = self.companies_dir().join(code.as_str());
            if !dir.is_dir() {
                debug!(company = %code, "no directory for company");
                continue;
            }
            documents.extend(load_company(&dir, code)?);
        }

        documents.sort_by(|a, b| {
            b.upload_date
                .cmp(&a.upload_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(documents)
    }
}

fn load_company(dir: &Path, company: &CompanyCode) -> Result<Vec<Document>, CatalogError> {
    let mut sidecars: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_sidecar = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(SIDECAR_SUFFIX));
        if is_sidecar && path.is_file() {
            sidecars.push(path);
        }
    }
    sidecars.sort();

    let mut documents = Vec::with_capacity(sidecars.len());
    for path in sidecars {
        let doc = match load_sidecar(&path) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable sidecar");
                continue;
            }
        };

        // The stored filename must name a file in this directory.
        let plain_name = Path::new(&doc.filename).file_name().and_then(|n| n.to_str())
            == Some(doc.filename.as_str());
        if !plain_name || !dir.join(&doc.filename).is_file() {
            warn!(path = %path.display(), filename = %doc.filename, "skipping sidecar without its PDF");
            continue;
        }

        let mut doc = doc.with_inferred_metadata();
        doc.company = Some(company.clone());
        documents.push(doc);
    }

    debug!(company = %company, documents = documents.len(), "loaded company reports");
    Ok(documents)
}

pub fn load_sidecar(path: &Path) -> Result<Document, CatalogError> {
    let file = fs::File::open(path)?;
    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
}
