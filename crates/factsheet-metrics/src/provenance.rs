//! Audit trail of selected facts.

use crate::metric::Metric;
use crate::normalize::normalize;
use crate::select::SelectedFact;
use chrono::NaiveDate;
use factsheet_data::edgar::Cik;
use serde::{Deserialize, Serialize};

/// Where one metric value came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    /// Company symbol
    pub symbol: String,
    /// Company CIK
    pub identifier: Cik,
    /// Metric the fact was selected for
    pub metric: Metric,
    /// Concept tag of the fact
    pub tag: String,
    /// Reported unit
    pub unit: String,
    /// Raw reported value
    pub value: f64,
    /// Value in millions of USD
    pub value_musd: Option<f64>,
    /// Accession number of the carrying filing
    pub accession: Option<String>,
    /// Filing date
    pub filed: Option<NaiveDate>,
    /// Form type of the carrying filing
    pub form: Option<String>,
    /// Fiscal year the fact describes
    pub fiscal_year: Option<i32>,
    /// Reported fiscal period code
    pub fiscal_period: Option<String>,
    /// SEC frame
    pub frame: Option<String>,
    /// Selected through an approximate fallback tag
    pub approximate: bool,
    /// Note from the matching tag rule
    pub note: Option<String>,
}

impl ProvenanceRecord {
    /// Build a record for a selected fact.
    pub fn from_selection(
        symbol: &str,
        identifier: &Cik,
        metric: Metric,
        selected: &SelectedFact,
    ) -> Self {
        let fact = &selected.fact;
        Self {
            symbol: symbol.to_string(),
            identifier: identifier.clone(),
            metric,
            tag: fact.tag.clone(),
            unit: fact.unit.clone(),
            value: selected.value(),
            value_musd: normalize(fact).value_musd,
            accession: fact.accession_id.clone(),
            filed: fact.filed_date,
            form: fact.form_type.clone(),
            fiscal_year: fact.fiscal_year,
            fiscal_period: fact.reported_period.clone(),
            frame: fact.frame.clone(),
            approximate: selected.rule.approximate,
            note: selected.rule.note.clone(),
        }
    }
}

/// Append-only log of provenance records for a run.
#[derive(Debug, Clone, Default)]
pub struct ProvenanceLog {
    entries: Vec<ProvenanceRecord>,
}

impl ProvenanceLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a selected fact and return the stored entry.
    pub fn record(
        &mut self,
        symbol: &str,
        identifier: &Cik,
        metric: Metric,
        selected: &SelectedFact,
    ) -> &ProvenanceRecord {
        let index = self.entries.len();
        self.entries.push(ProvenanceRecord::from_selection(
            symbol, identifier, metric, selected,
        ));
        &self.entries[index]
    }

    /// Recorded entries, in insertion order.
    pub fn entries(&self) -> &[ProvenanceRecord] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
