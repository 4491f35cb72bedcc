use serde::{Deserialize, Deserializer, Serialize};

use crate::types::identifiers::CompanyCode;

/// Fiscal quarter. Absence on a document means annual / year-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    pub fn from_number(n: u32) -> Option<Self> {
        match n {
            1 => Some(Quarter::Q1),
            2 => Some(Quarter::Q2),
            3 => Some(Quarter::Q3),
            4 => Some(Quarter::Q4),
            _ => None,
        }
    }

    /// Accepts `"Q3"`, `"q3"` and `"3"`.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        let digits = trimmed
            .strip_prefix('Q')
            .or_else(|| trimmed.strip_prefix('q'))
            .unwrap_or(trimmed);
        digits.parse::<u32>().ok().and_then(Self::from_number)
    }

    pub fn number(self) -> u32 {
        match self {
            Quarter::Q1 => 1,
            Quarter::Q2 => 2,
            Quarter::Q3 => 3,
            Quarter::Q4 => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Quarter::Q1 => "Q1",
            Quarter::Q2 => "Q2",
            Quarter::Q3 => "Q3",
            Quarter::Q4 => "Q4",
        }
    }

    /// Quarter detection used when a report arrives without quarter metadata.
    ///
    /// Checked Q1 to Q4; the first quarter with a matching marker wins. Roman
    /// numerals other than `iv` are left out because `i.ceyrek` is a
    /// substring of `ii.ceyrek` and `iii.ceyrek`.
    pub fn infer_from_filename(filename: &str) -> Option<Self> {
        const MARKERS: [(Quarter, &[&str]); 4] = [
            (
                Quarter::Q1,
                &["q1", "1-ceyrek", "1ceyrek", "birinci", "first", "1.ceyrek", "1 ceyrek", "1.çeyrek"],
            ),
            (
                Quarter::Q2,
                &["q2", "2-ceyrek", "2ceyrek", "ikinci", "second", "2.ceyrek", "2 ceyrek", "2.çeyrek"],
            ),
            (
                Quarter::Q3,
                &[
                    "q3", "3-ceyrek", "3ceyrek", "ucuncu", "üçüncü", "third", "3.ceyrek",
                    "3 ceyrek", "3.çeyrek",
                ],
            ),
            (
                Quarter::Q4,
                &[
                    "q4", "4-ceyrek", "4ceyrek", "dorduncu", "dördüncü", "fourth", "iv.ceyrek", "4.ceyrek",
                    "4 ceyrek", "4.çeyrek",
                ],
            ),
        ];

        let lower = filename.to_lowercase();
        MARKERS
            .iter()
            .find(|(_, markers)| markers.iter().any(|m| lower.contains(m)))
            .map(|(quarter, _)| *quarter)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuarter {
    Number(i64),
    Text(String),
}

/// Sidecars written by different uploader versions store the quarter as
/// `"Q1"`, `"1"`, `1`, `""` or `null`. Anything unrecognised reads as absent.
pub(crate) fn deserialize_quarter<'de, D>(deserializer: D) -> Result<Option<Quarter>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawQuarter>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawQuarter::Number(n)) => u32::try_from(n).ok().and_then(Quarter::from_number),
        Some(RawQuarter::Text(s)) => Quarter::parse(&s),
        None => None,
    })
}

impl<'de> Deserialize<'de> for Quarter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Quarter::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid quarter: {raw}")))
    }
}

/// Closed set of report kinds the uploader can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Quarterly,
    Annual,
    Presentation,
    /// Financial statement.
    Financial,
    #[serde(other)]
    Other,
}

impl DocumentType {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentType::Quarterly => "quarterly",
            DocumentType::Annual => "annual",
            DocumentType::Presentation => "presentation",
            DocumentType::Financial => "financial",
            DocumentType::Other => "other",
        }
    }

    /// Type detection used when a report arrives without a declared type.
    pub fn infer_from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_lowercase();
        if lower.contains("sunum") || lower.contains("presentation") {
            Some(DocumentType::Presentation)
        } else if lower.contains("yillik") || lower.contains("yıllık") || lower.contains("annual") {
            Some(DocumentType::Annual)
        } else {
            None
        }
    }
}

/// The economic period a report covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FiscalPeriod {
    pub company: Option<CompanyCode>,
    pub year: i32,
    pub quarter: Option<Quarter>,
}
