pub mod catalog;
pub mod coverage;

pub use catalog::{load_sidecar, CatalogError, ReportCatalog, COMPANIES_DIR, SIDECAR_SUFFIX};
pub use coverage::{
    company_coverage, possible_periods, CompanyCoverage, PeriodKey, YearRange, COVERAGE_YEARS,
};
pub use crate::types::identifiers::CatalogVersion;
