//! Per-residue quality reports: fetch, parse, resolve, index, cache.
//!
//! A report is requested per model from a remote validation service. The
//! JSON payload comes in one of two shapes (see [`parser`]) which normalize
//! into [`RawAnnotationEntry`] values. The [`resolver`] maps each entry's
//! author-facing identifiers onto the model's residue ordinals and the
//! result is frozen into a [`ResidueIndexedStore`]. The
//! [`QualityReportProvider`] caches one store per model with
//! reference-counted attach/detach.

pub mod fetch;
pub mod issues;
pub mod parser;
pub mod provider;
pub mod resolver;
mod store;

use std::fmt;

pub use fetch::ReportFetcher;
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;
pub use issues::IssueTier;
pub use parser::{parse_payload, ParsedPayload, RawAnnotationEntry};
pub use provider::{CacheEntry, QualityReportProvider};
pub use resolver::IdentifierResolver;
use serde::{Deserialize, Serialize};
pub use store::{ResidueIndexedStore, ResidueRecord, StoreBuilder, StoreInfo};

use crate::model::StructureModel;
use crate::options::Metric;

/// Which payload shape a store was parsed from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ParsedAs {
    /// Nested entity → chain → model → residue outlier tags.
    Issues,
    /// Flat per-residue score records.
    Score,
}

/// Failure to populate a report for one model.
///
/// `Clone` so that every attach waiting on the same fetch receives the same
/// outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// Transport failure or non-2xx response.
    Http(String),
    /// Empty payload, or no data for the requested entry.
    MissingData(String),
    /// Body is not valid JSON.
    Json(String),
    /// JSON present but not in a recognized shape.
    Schema(String),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(msg) => write!(f, "request failed: {msg}"),
            Self::MissingData(entry) => {
                write!(f, "missing data for entry {entry}")
            }
            Self::Json(msg) => write!(f, "invalid JSON: {msg}"),
            Self::Schema(msg) => write!(f, "unexpected report shape: {msg}"),
        }
    }
}

impl std::error::Error for ReportError {}

/// Build a store for `model` from a raw response body.
///
/// Entries whose identifiers do not resolve are dropped; the store may end
/// up with zero records.
///
/// # Errors
///
/// Propagates [`parse_payload`] failures.
pub fn build_store<M: StructureModel + ?Sized>(
    model: &M,
    body: &str,
    metric: Option<Metric>,
) -> Result<ResidueIndexedStore, ReportError> {
    let payload = parse_payload(body, model.entry_id(), model.model_num())?;
    let resolver = IdentifierResolver::new(model);
    let mut builder = StoreBuilder::new(payload.parsed_as, metric);
    builder.observe_issue_types(&payload.issue_types);

    let mut dropped = 0usize;
    for entry in &payload.entries {
        match resolver.resolve_entry(entry) {
            Some(index) => {
                let _ = builder.insert(index, entry.to_record());
            }
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        log::debug!(
            "{}: {dropped} of {} annotations did not resolve to a residue",
            model.entry_id(),
            payload.entries.len()
        );
    }
    Ok(builder.build())
}
