//! Company roster: the list of companies a run covers.
//!
//! Rosters are CSV files with `Symbol`, `Security` and `CIK` columns. Any
//! column may be blank or absent, but each row needs a symbol or a CIK.

use crate::error::{CampaignError, Result};
use factsheet_data::edgar::{Cik, Transport, normalize_symbol};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Companies previewed by the run summary and selected by `--golden-only`.
pub const GOLDEN_SET: [&str; 10] = [
    "AAPL", "MSFT", "AMZN", "JNJ", "JPM", "XOM", "PG", "BRK.B", "NVDA", "PEP",
];

/// One roster row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyRecord {
    /// Trading symbol as written in the roster (may be empty)
    pub symbol: String,
    /// Company name (may be empty)
    pub name: String,
    /// CIK, when the roster carries one
    pub identifier: Option<Cik>,
}

impl CompanyRecord {
    /// Create a record.
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, identifier: Option<Cik>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            identifier,
        }
    }

    /// Symbol if present, else the CIK. Used for logs and output rows.
    pub fn label(&self) -> String {
        if !self.symbol.is_empty() {
            return self.symbol.clone();
        }
        self.identifier
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Returns true if the symbol is in [`GOLDEN_SET`].
    pub fn is_golden(&self) -> bool {
        let symbol = normalize_symbol(&self.symbol);
        GOLDEN_SET.contains(&symbol.as_str())
    }

    /// Returns true if `marker` names this company, by symbol
    /// (case-insensitive) or by CIK.
    pub fn matches(&self, marker: &str, resolved: Option<&Cik>) -> bool {
        let marker = marker.trim();
        if marker.is_empty() {
            return false;
        }
        if !self.symbol.is_empty() && normalize_symbol(&self.symbol) == normalize_symbol(marker) {
            return true;
        }
        let Ok(cik) = Cik::parse(marker) else {
            return false;
        };
        self.identifier.as_ref().or(resolved) == Some(&cik)
    }
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "Symbol", default)]
    symbol: Option<String>,
    #[serde(rename = "Security", default)]
    security: Option<String>,
    #[serde(rename = "CIK", default)]
    cik: Option<String>,
}

/// Ordered list of companies to process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    companies: Vec<CompanyRecord>,
}

impl Roster {
    /// Build a roster from records. Fails if there are none.
    pub fn new(companies: Vec<CompanyRecord>) -> Result<Self> {
        if companies.is_empty() {
            return Err(CampaignError::EmptyRoster(
                "no rows with a symbol or CIK".to_string(),
            ));
        }
        Ok(Self { companies })
    }

    /// Parse roster CSV.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rows = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut companies = Vec::new();
        for (line, row) in rows.deserialize::<RosterRow>().enumerate() {
            let row = row?;
            let symbol = row.symbol.unwrap_or_default();
            let name = row.security.unwrap_or_default();
            let identifier = match row.cik.as_deref().filter(|c| !c.is_empty()) {
                None => None,
                Some(raw) => match Cik::parse(raw) {
                    Ok(cik) => Some(cik),
                    Err(e) => {
                        warn!(row = line + 1, %symbol, error = %e, "ignoring unparseable CIK");
                        None
                    }
                },
            };

            if symbol.is_empty() && identifier.is_none() {
                debug!(row = line + 1, "skipping row without symbol or CIK");
                continue;
            }
            companies.push(CompanyRecord::new(symbol, name, identifier));
        }

        Self::new(companies)
    }

    /// Read a roster from a local CSV file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| CampaignError::RosterSource {
            source_name: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_reader(file)
    }

    /// Download a roster CSV.
    pub async fn from_url(url: &str, transport: &dyn Transport) -> Result<Self> {
        let response = transport
            .get(url)
            .await
            .map_err(|e| CampaignError::RosterSource {
                source_name: url.to_string(),
                message: e.to_string(),
            })?;
        if !response.is_success() {
            return Err(CampaignError::RosterSource {
                source_name: url.to_string(),
                message: format!("HTTP status {}", response.status),
            });
        }
        Self::from_reader(response.body.as_bytes())
    }

    /// Load from a local path or an `http(s)://` URL.
    pub async fn load(source: &str, transport: &dyn Transport) -> Result<Self> {
        if is_url(source) {
            Self::from_url(source, transport).await
        } else {
            Self::from_path(source)
        }
    }

    /// Only the golden-set companies.
    pub fn golden_only(&self) -> Result<Self> {
        let companies = self
            .companies
            .iter()
            .filter(|c| c.is_golden())
            .cloned()
            .collect::<Vec<_>>();
        if companies.is_empty() {
            return Err(CampaignError::EmptyRoster(
                "no golden-set companies in roster".to_string(),
            ));
        }
        Ok(Self { companies })
    }

    /// Keep the first `limit` companies.
    pub fn truncate(&mut self, limit: usize) {
        self.companies.truncate(limit);
    }

    /// Companies, in roster order.
    pub fn companies(&self) -> &[CompanyRecord] {
        &self.companies
    }

    /// Number of companies.
    pub fn len(&self) -> usize {
        self.companies.len()
    }

    /// Returns true if the roster has no companies.
    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    /// Returns true if any company lacks a CIK and will need the resolver.
    pub fn needs_resolution(&self) -> bool {
        self.companies.iter().any(|c| c.identifier.is_none())
    }
}

fn is_url(source: &str) -> bool {
    let lower = source.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ROSTER: &str = "\
Symbol,Security,CIK
AAPL,Apple Inc.,320193
BRK.B,Berkshire Hathaway,
,Nameless Corp,0000000042
,,
XYZ,Broken CIK,not-a-number
";

    #[test]
    fn test_parse_roster() {
        let roster = Roster::from_reader(ROSTER.as_bytes()).unwrap();
        assert_eq!(roster.len(), 4);

        let apple = &roster.companies()[0];
        assert_eq!(apple.symbol, "AAPL");
        assert_eq!(apple.identifier.as_ref().map(Cik::number), Some(320193));

        assert_eq!(roster.companies()[1].identifier, None);
        assert_eq!(roster.companies()[2].label(), "0000000042");
        assert_eq!(roster.companies()[3].identifier, None);
        assert!(roster.needs_resolution());
    }

    #[test]
    fn test_missing_columns_allowed() {
        let roster = Roster::from_reader("Symbol\nMSFT\nPEP\n".as_bytes()).unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.companies()[1].name, "");
    }

    #[test]
    fn test_empty_roster_is_error() {
        assert!(matches!(
            Roster::from_reader("Symbol,Security,CIK\n,,\n".as_bytes()),
            Err(CampaignError::EmptyRoster(_))
        ));
    }

    #[test]
    fn test_golden_filter() {
        let roster = Roster::from_reader(ROSTER.as_bytes()).unwrap();
        let golden = roster.golden_only().unwrap();
        let symbols: Vec<&str> = golden.companies().iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "BRK.B"]);
    }

    #[rstest]
    #[case("aapl", None, true)]
    #[case("320193", None, true)]
    #[case("0000320193", None, true)]
    #[case("MSFT", None, false)]
    #[case("", None, false)]
    fn test_marker_matching(
        #[case] marker: &str,
        #[case] resolved: Option<Cik>,
        #[case] expected: bool,
    ) {
        let apple = CompanyRecord::new("AAPL", "Apple Inc.", Cik::parse("320193").ok());
        assert_eq!(apple.matches(marker, resolved.as_ref()), expected);
    }

    #[test]
    fn test_marker_matches_resolved_cik() {
        let record = CompanyRecord::new("BRK.B", "", None);
        let cik = Cik::parse("1067983").unwrap();
        assert!(record.matches("1067983", Some(&cik)));
        assert!(record.matches("brk-b", None));
    }

    #[rstest]
    #[case("https://example.com/sp500.csv", true)]
    #[case("HTTP://example.com/x.csv", true)]
    #[case("data/sp500.csv", false)]
    fn test_url_detection(#[case] source: &str, #[case] expected: bool) {
        assert_eq!(is_url(source), expected);
    }
}
