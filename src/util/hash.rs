//! Content hashing for store data versions.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use crate::model::ResidueIndex;
use crate::report::ResidueRecord;

/// Hash a single [`ResidueRecord`], converting the score to bits.
pub fn hash_record(record: &ResidueRecord, hasher: &mut impl Hasher) {
    record.score.to_bits().hash(hasher);
    record.issue_types.hash(hasher);
    record.primary_type.hash(hasher);
    record.display_color.hash(hasher);
}

/// Content digest of ordinal-sorted records.
///
/// Used as the store's data version: identical payloads resolved against
/// the same model produce the same digest.
pub fn hash_records(records: &[(ResidueIndex, &ResidueRecord)]) -> u64 {
    let mut hasher = FxHasher::default();
    records.len().hash(&mut hasher);
    for (index, record) in records {
        index.hash(&mut hasher);
        hash_record(record, &mut hasher);
    }
    hasher.finish()
}
