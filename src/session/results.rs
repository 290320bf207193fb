//! Session Results
//!
//! One normalized record per completed variant, and a comparison of each
//! reported field against the population averages in the registry.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};

use crate::core::hash::StateHasher;
use crate::game::registry::Variant;
use crate::game::state::ResultRecord;

/// Results keyed by variant.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionResults {
    records: BTreeMap<Variant, ResultRecord>,
}

impl SessionResults {
    /// Empty results.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the record of a completed instance.
    pub fn insert(&mut self, variant: Variant, record: ResultRecord) {
        self.records.insert(variant, record);
    }

    /// Record for a variant.
    pub fn get(&self, variant: Variant) -> Option<&ResultRecord> {
        self.records.get(&variant)
    }

    /// Records in variant order.
    pub fn iter(&self) -> impl Iterator<Item = (Variant, &ResultRecord)> {
        self.records.iter().map(|(variant, record)| (*variant, record))
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// No records yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Compare every record against its variant's averages.
    pub fn compare_to_averages(&self) -> Vec<Comparison> {
        self.iter()
            .map(|(variant, record)| Comparison::against_average(variant, record))
            .collect()
    }

    pub(crate) fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_usize(self.records.len());
        for (variant, record) in &self.records {
            hasher.update_str(variant.as_str());
            record.hash_into(hasher);
        }
    }
}

/// Where a result sits relative to the average.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    /// Better than average.
    Above,
    /// Exactly average.
    Average,
    /// Worse than average.
    Below,
}

impl Standing {
    /// Standing of `value` where larger is better.
    pub fn higher_is_better(value: f64, average: f64) -> Self {
        match value.partial_cmp(&average) {
            Some(Ordering::Greater) => Standing::Above,
            Some(Ordering::Less) => Standing::Below,
            _ => Standing::Average,
        }
    }

    /// Standing of `value` where smaller is better.
    pub fn lower_is_better(value: f64, average: f64) -> Self {
        Self::higher_is_better(average, value)
    }

    /// Human label.
    pub fn label(self) -> &'static str {
        match self {
            Standing::Above => "above average",
            Standing::Average => "on average",
            Standing::Below => "below average",
        }
    }
}

/// Per-field standings of one variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    /// Variant.
    pub variant: Variant,
    /// Percentage correct standing.
    pub percentage: Option<Standing>,
    /// Average time standing; shorter ranks above.
    pub time: Option<Standing>,
    /// Span standing.
    pub span: Option<Standing>,
}

impl Comparison {
    /// Compare one record with the registry averages.
    ///
    /// A field is compared only when both the record and the average have it.
    pub fn against_average(variant: Variant, record: &ResultRecord) -> Self {
        let average = variant.info().average;

        let percentage = record
            .percentage_correct
            .zip(average.percentage_correct)
            .map(|(value, avg)| Standing::higher_is_better(value, avg));
        let time = record
            .average_response_time
            .zip(average.average_response_time)
            .map(|(value, avg)| Standing::lower_is_better(value, avg));
        let span = record
            .max_span
            .zip(average.max_span)
            .map(|(value, avg)| Standing::higher_is_better(value as f64, avg as f64));

        Self { variant, percentage, time, span }
    }
}
