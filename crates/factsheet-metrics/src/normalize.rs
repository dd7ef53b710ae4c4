//! Unit normalization to millions of USD.

use factsheet_data::edgar::{FactInstance, currency_of};
use serde::{Deserialize, Serialize};

/// Divisor from units to millions.
pub const MILLION: f64 = 1_000_000.0;

/// The only currency values are reported in.
pub const BASE_CURRENCY: &str = "USD";

/// Currency of a normalized fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "code", rename_all = "snake_case")]
pub enum CurrencyFlag {
    /// Reported in USD
    Usd,
    /// Reported in another currency; the value is not used
    NonUsd(String),
    /// Unit is not a currency
    Unknown,
}

impl CurrencyFlag {
    /// Classify a raw unit string.
    pub fn of_unit(unit: &str) -> Self {
        match currency_of(unit) {
            Some(code) if code == BASE_CURRENCY => Self::Usd,
            Some(code) => Self::NonUsd(code),
            None => Self::Unknown,
        }
    }

    /// Returns true for USD.
    pub const fn is_usd(&self) -> bool {
        matches!(self, Self::Usd)
    }
}

/// A fact value scaled to millions of USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normalized {
    /// Value in millions of USD, `None` when the currency is not USD or
    /// the value is not a finite number
    pub value_musd: Option<f64>,
    /// Currency classification of the source unit
    pub currency: CurrencyFlag,
}

/// Normalize a selected fact.
pub fn normalize(fact: &FactInstance) -> Normalized {
    let currency = CurrencyFlag::of_unit(&fact.unit);
    let value_musd = if currency.is_usd() {
        fact.numeric_value().and_then(to_millions)
    } else {
        None
    };
    Normalized {
        value_musd,
        currency,
    }
}

/// Scale to millions, rounded to two decimals.
pub fn to_millions(value: f64) -> Option<f64> {
    let millions = (value / MILLION * 100.0).round() / 100.0;
    millions.is_finite().then_some(millions)
}
