use rustc_hash::FxHashMap;
use serde::Serialize;
use web_time::SystemTime;

use super::ParsedAs;
use crate::model::ResidueIndex;
use crate::options::Metric;
use crate::util::hash::hash_records;
use crate::util::rgb::Rgb;

/// Normalized quality annotation of one residue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResidueRecord {
    /// Numeric score (issue tier for outlier reports, metric value for
    /// score reports).
    pub score: f64,
    /// Reported issue tags, de-duplicated in insertion order.
    pub issue_types: Vec<String>,
    /// Single classification used for display.
    pub primary_type: String,
    /// Color to render the residue with.
    pub display_color: Rgb,
}

/// Provenance of a built store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreInfo {
    /// Content digest of the records.
    pub data_version: u64,
    /// When the store was built.
    pub timestamp: SystemTime,
}

/// Immutable ordinal → [`ResidueRecord`] index for one model.
///
/// Built once by [`StoreBuilder`] and shared behind an `Arc`; readers never
/// lock.
#[derive(Debug, Clone)]
pub struct ResidueIndexedStore {
    info: StoreInfo,
    parsed_as: ParsedAs,
    metric: Option<Metric>,
    records: FxHashMap<ResidueIndex, ResidueRecord>,
    issue_types: Vec<String>,
}

impl ResidueIndexedStore {
    /// Build info (data version and timestamp).
    #[must_use]
    pub fn info(&self) -> StoreInfo {
        self.info
    }

    /// Payload shape the store was parsed from.
    #[must_use]
    pub fn parsed_as(&self) -> ParsedAs {
        self.parsed_as
    }

    /// Metric the report was requested with.
    #[must_use]
    pub fn metric(&self) -> Option<Metric> {
        self.metric
    }

    /// Record for a residue ordinal.
    #[must_use]
    pub fn get(&self, index: ResidueIndex) -> Option<&ResidueRecord> {
        self.records.get(&index)
    }

    /// Number of annotated residues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no residue is annotated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Issue-type vocabulary observed across the whole payload.
    #[must_use]
    pub fn issue_types(&self) -> &[String] {
        &self.issue_types
    }

    /// Records ordered by residue ordinal.
    #[must_use]
    pub fn sorted_records(&self) -> Vec<(ResidueIndex, &ResidueRecord)> {
        let mut records: Vec<_> =
            self.records.iter().map(|(&i, r)| (i, r)).collect();
        records.sort_unstable_by_key(|&(i, _)| i);
        records
    }
}

/// Accumulates records before freezing them into a
/// [`ResidueIndexedStore`].
pub struct StoreBuilder {
    parsed_as: ParsedAs,
    metric: Option<Metric>,
    records: FxHashMap<ResidueIndex, ResidueRecord>,
    issue_types: Vec<String>,
}

impl StoreBuilder {
    /// Empty builder for a payload of shape `parsed_as`.
    #[must_use]
    pub fn new(parsed_as: ParsedAs, metric: Option<Metric>) -> Self {
        Self {
            parsed_as,
            metric,
            records: FxHashMap::default(),
            issue_types: Vec::new(),
        }
    }

    /// Set the record of `index`. A later insert for the same ordinal
    /// replaces the earlier one; returns the replaced record.
    pub fn insert(
        &mut self,
        index: ResidueIndex,
        record: ResidueRecord,
    ) -> Option<ResidueRecord> {
        self.observe_issue_types(&record.issue_types);
        self.records.insert(index, record)
    }

    /// Add tags to the vocabulary, keeping first-seen order.
    pub fn observe_issue_types(&mut self, tags: &[String]) {
        for tag in tags {
            push_unique(&mut self.issue_types, tag);
        }
    }

    /// Freeze into an immutable store.
    #[must_use]
    pub fn build(self) -> ResidueIndexedStore {
        let data_version = {
            let mut sorted: Vec<_> =
                self.records.iter().map(|(&i, r)| (i, r)).collect();
            sorted.sort_unstable_by_key(|&(i, _)| i);
            hash_records(&sorted)
        };
        ResidueIndexedStore {
            info: StoreInfo {
                data_version,
                timestamp: SystemTime::now(),
            },
            parsed_as: self.parsed_as,
            metric: self.metric,
            records: self.records,
            issue_types: self.issue_types,
        }
    }
}

/// Append `value` unless already present.
pub(crate) fn push_unique(set: &mut Vec<String>, value: &str) {
    if !set.iter().any(|v| v == value) {
        set.push(value.to_owned());
    }
}
