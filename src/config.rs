use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::document::Document;

pub const ENV_MAX_PAGES: &str = "REPORT_CONTEXT_MAX_PAGES";
pub const ENV_YEAR_ANCHOR: &str = "REPORT_CONTEXT_YEAR_ANCHOR";
pub const ENV_MAX_PER_PERIOD: &str = "REPORT_CONTEXT_MAX_PER_PERIOD";
pub const ENV_MAX_PAYLOAD_ATTEMPTS: &str = "REPORT_CONTEXT_MAX_PAYLOAD_ATTEMPTS";

/// How the "most recent complete fiscal year" is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearAnchor {
    /// Current calendar year minus one.
    #[default]
    CalendarPrevious,
    /// Latest year present in the pool, never past the current year.
    /// Falls back to [`YearAnchor::CalendarPrevious`] when no document has a
    /// resolvable year.
    LatestInPool,
}

impl YearAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            YearAnchor::CalendarPrevious => "calendar_previous",
            YearAnchor::LatestInPool => "latest_in_pool",
        }
    }

    pub fn resolve(self, documents: &[Document], clock: &impl Clock) -> i32 {
        let current = clock.current_year();
        let previous = current - 1;

        match self {
            YearAnchor::CalendarPrevious => previous,
            YearAnchor::LatestInPool => documents
                .iter()
                .filter_map(Document::resolved_year)
                .filter(|year| *year <= current)
                .max()
                .unwrap_or(previous),
        }
    }
}

impl FromStr for YearAnchor {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "calendar_previous" | "calendar-previous" => Ok(YearAnchor::CalendarPrevious),
            "latest_in_pool" | "latest-in-pool" => Ok(YearAnchor::LatestInPool),
            _ => Err(()),
        }
    }
}

/// Knobs for selection. Every field has a default, so partial JSON is fine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Provider page budget used when callers do not pass their own.
    pub max_pages: u32,
    pub year_anchor: YearAnchor,
    /// At most this many documents per `(company, year, quarter)`.
    pub max_documents_per_period: Option<usize>,
    /// Upper bound on payload-halving attempts.
    pub max_payload_attempts: usize,
}

impl SelectorConfig {
    pub fn v0() -> Self {
        Self {
            max_pages: 100,
            year_anchor: YearAnchor::CalendarPrevious,
            max_documents_per_period: None,
            max_payload_attempts: 8,
        }
    }

    /// `v0()` with `REPORT_CONTEXT_*` environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`SelectorConfig::from_env`], reading values through `lookup`.
    /// Unset and blank values keep the default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::v0();
        let read = |key: &'static str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .map(|value| (key, value))
        };

        if let Some((key, value)) = read(ENV_MAX_PAGES) {
            config.max_pages = parse_number(key, &value)?;
        }
        if let Some((key, value)) = read(ENV_YEAR_ANCHOR) {
            config.year_anchor = value
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key, value })?;
        }
        if let Some((key, value)) = read(ENV_MAX_PER_PERIOD) {
            config.max_documents_per_period = match value.as_str() {
                "none" | "off" | "0" => None,
                _ => Some(parse_number(key, &value)?),
            };
        }
        if let Some((key, value)) = read(ENV_MAX_PAYLOAD_ATTEMPTS) {
            config.max_payload_attempts = parse_number(key, &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pages == 0 {
            return Err(ConfigError::OutOfRange {
                key: ENV_MAX_PAGES,
                reason: "page budget must be positive",
            });
        }
        if self.max_payload_attempts == 0 {
            return Err(ConfigError::OutOfRange {
                key: ENV_MAX_PAYLOAD_ATTEMPTS,
                reason: "at least one attempt is required",
            });
        }
        Ok(())
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self::v0()
    }
}

fn parse_number<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{key} out of range: {reason}")]
    OutOfRange {
        key: &'static str,
        reason: &'static str,
    },
}
