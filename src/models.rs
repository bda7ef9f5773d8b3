use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Listing market of an issuer. Drives both the query shape and the title vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    /// Shanghai / Shenzhen / Beijing A-shares
    #[serde(rename = "szse")]
    Mainland,
    /// Hong Kong Exchange
    #[serde(rename = "hke")]
    HongKong,
}

impl Market {
    /// Value of the `column` field sent to the announcement query endpoint
    pub fn column(&self) -> &'static str {
        match self {
            Market::Mainland => "szse",
            Market::HongKong => "hke",
        }
    }

    /// Map a stock database tag to a market. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_lowercase().as_str() {
            "szse" | "sse" => Some(Market::Mainland),
            "hke" => Some(Market::HongKong),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Market::Mainland => "A-share",
            Market::HongKong => "Hong Kong",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A listed company as recorded in the stock database snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerRecord {
    pub code: String,
    pub name: String,
    /// cninfo organization id, required by the query endpoint
    pub org_id: String,
    pub market: Market,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodKind {
    Annual,
    Q1,
    SemiAnnual,
    Q3,
}

impl PeriodKind {
    /// Interim periods in filing order
    pub const PERIODIC: [PeriodKind; 3] = [PeriodKind::Q1, PeriodKind::SemiAnnual, PeriodKind::Q3];

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKind::Annual => "Annual Report",
            PeriodKind::Q1 => "Q1 Report",
            PeriodKind::SemiAnnual => "Semi-Annual Report",
            PeriodKind::Q3 => "Q3 Report",
        }
    }
}

/// A fiscal year paired with the kind of report filed for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportingPeriod {
    pub year: i32,
    pub kind: PeriodKind,
}

impl ReportingPeriod {
    pub fn new(year: i32, kind: PeriodKind) -> Self {
        Self { year, kind }
    }

    pub fn annual(year: i32) -> Self {
        Self::new(year, PeriodKind::Annual)
    }
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.year, self.kind.as_str())
    }
}

/// Result of a full run, handed to whatever consumes the downloaded files
#[derive(Debug, Clone, Serialize)]
pub struct FetchOutcome {
    pub stock_code: String,
    pub stock_name: String,
    pub market: Market,
    pub output_dir: PathBuf,
    pub files: Vec<PathBuf>,
}
