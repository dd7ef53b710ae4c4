//! SEC Central Index Key.

use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A company's SEC Central Index Key, always stored zero-padded to 10 digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cik(String);

impl Cik {
    /// Width of a padded CIK.
    pub const WIDTH: usize = 10;

    /// Parse a CIK from user or upstream input.
    ///
    /// Non-digit characters are stripped (so `"CIK0000320193"` and
    /// `"320193"` both parse) and the result is zero-padded.
    ///
    /// # Errors
    /// Returns `DataError::InvalidIdentifier` if no digits remain or the
    /// number is wider than 10 digits.
    pub fn parse(raw: &str) -> Result<Self> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        let digits = digits.trim_start_matches('0');
        if digits.is_empty() {
            return Err(DataError::InvalidIdentifier(raw.to_string()));
        }
        if digits.len() > Self::WIDTH {
            return Err(DataError::InvalidIdentifier(raw.to_string()));
        }
        Ok(Self(format!("{:0>10}", digits)))
    }

    /// Build a CIK from the numeric form used by the ticker table.
    pub fn from_number(number: u64) -> Result<Self> {
        Self::parse(&number.to_string())
    }

    /// Padded string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value, used to order competing identifiers.
    pub fn number(&self) -> u64 {
        self.0.parse().unwrap_or_default()
    }
}

impl fmt::Display for Cik {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Cik {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Cik {
    type Error = DataError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Cik> for String {
    fn from(cik: Cik) -> Self {
        cik.0
    }
}
