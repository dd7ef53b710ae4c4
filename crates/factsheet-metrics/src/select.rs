//! Fact selection.
//!
//! Picks the single authoritative fact for a metric and fiscal year out of
//! everything a company has ever reported. The same fact is typically
//! repeated in several filings (the original 10-K, amendments, and later
//! 10-Ks that restate it as a comparative), so selection is a ranking
//! problem as much as a lookup.

use crate::metric::{MetricSpec, TagRule};
use crate::normalize::BASE_CURRENCY;
use factsheet_data::edgar::concepts::dei;
use factsheet_data::edgar::{FactInstance, FactsDocument, FiscalPeriod, UnitDimension};
use std::cmp::Ordering;

/// A fact chosen for a metric, with the rule that matched it.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFact {
    /// The chosen fact
    pub fact: FactInstance,
    /// Tag rule under which it was found
    pub rule: TagRule,
    /// Position of the rule in the priority list
    pub rule_index: usize,
}

impl SelectedFact {
    /// Reported numeric value.
    pub fn value(&self) -> f64 {
        self.fact.numeric_value().unwrap_or(f64::NAN)
    }
}

/// Outcome of selecting one metric.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// A fact was found
    Found(SelectedFact),
    /// No tag had a usable fact for the year
    NotFound,
}

impl Selection {
    /// Returns the selected fact, if any.
    pub const fn found(&self) -> Option<&SelectedFact> {
        match self {
            Self::Found(selected) => Some(selected),
            Self::NotFound => None,
        }
    }

    /// Returns true if a fact was selected.
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Select the authoritative fact for `spec` in `fiscal_year`.
///
/// Tags are tried in priority order and the first tag with any candidate
/// wins outright. Within that tag annual-report forms beat everything else,
/// then the latest filing date wins, then a USD unit beats other currencies;
/// remaining ties keep document order.
pub fn select(document: &FactsDocument, spec: &MetricSpec, fiscal_year: i32) -> Selection {
    for (rule_index, rule) in spec.rules.iter().enumerate() {
        let best = document
            .facts_for(&rule.tag)
            .iter()
            .filter(|fact| is_candidate(fact, spec.dimension, fiscal_year))
            .min_by(|a, b| preference(a, b));

        if let Some(fact) = best {
            return Selection::Found(SelectedFact {
                fact: fact.clone(),
                rule: rule.clone(),
                rule_index,
            });
        }
    }

    Selection::NotFound
}

fn is_candidate(fact: &FactInstance, dimension: UnitDimension, fiscal_year: i32) -> bool {
    fact.fiscal_year == Some(fiscal_year)
        && fact.fiscal_period == FiscalPeriod::Annual
        && fact.numeric_value().is_some_and(f64::is_finite)
        && UnitDimension::of(&fact.unit) == dimension
}

/// Ordering where `Less` means "preferred".
fn preference(a: &FactInstance, b: &FactInstance) -> Ordering {
    b.is_annual_report()
        .cmp(&a.is_annual_report())
        .then_with(|| match (a.filed_date, b.filed_date) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| is_base_currency(b).cmp(&is_base_currency(a)))
}

fn is_base_currency(fact: &FactInstance) -> bool {
    fact.unit.trim().eq_ignore_ascii_case(BASE_CURRENCY)
}

/// Reporting currency declared in the DEI cover-page facts, uppercased.
///
/// Checks the ISO reporting-currency tag first, then the common-currency
/// tags, taking the most recently filed non-empty text value.
pub fn reporting_currency(document: &FactsDocument) -> Option<String> {
    [
        dei::REPORTING_CURRENCY_ISO,
        dei::COMMON_CURRENCY_ISO,
        dei::COMMON_CURRENCY,
    ]
    .into_iter()
    .find_map(|tag| latest_text(document.facts_for(tag)))
}

fn latest_text(facts: &[FactInstance]) -> Option<String> {
    let mut best: Option<(&FactInstance, &str)> = None;
    for fact in facts {
        let Some(text) = fact.value.as_text().map(str::trim).filter(|t| !t.is_empty()) else {
            continue;
        };
        // strictly later filings replace; ties keep the first seen
        let newer = match best {
            None => true,
            Some((current, _)) => fact.filed_date > current.filed_date,
        };
        if newer {
            best = Some((fact, text));
        }
    }
    best.map(|(_, text)| text.to_ascii_uppercase())
}
