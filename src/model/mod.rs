//! Host structural-model interface.
//!
//! The annotation engine never owns a model. It consumes one through the
//! [`StructureModel`] trait, which exposes the chain/entity/residue index
//! primitives needed to translate author-facing identifiers into residue
//! ordinals. [`AtomicHierarchy`] is an in-memory implementation used by the
//! CLI and tests; [`mmcif`] builds one from an mmCIF `_atom_site` loop.

mod hierarchy;
pub mod mmcif;

use std::sync::atomic::{AtomicU64, Ordering};

pub use hierarchy::{
    AtomicHierarchy, HierarchyBuilder, ResidueInfo, ResidueSite,
};

/// Process-unique identity of a loaded model. Cache key for annotation
/// stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub u64);

impl ModelId {
    /// Allocate a fresh identity.
    #[must_use]
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Zero-based index of a residue within a model's atomic hierarchy.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct ResidueIndex(pub u32);

impl ResidueIndex {
    /// Index as `usize` for slice access.
    #[must_use]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Index primitives a host model must provide.
///
/// Chain indices are positions in the model's chain table. Entity indices
/// are 0-based positions in the entity table, while entity *ids* are the
/// strings the model was deposited with (conventionally `"1"`, `"2"`, ...).
pub trait StructureModel {
    /// Process-unique identity of this model.
    fn id(&self) -> ModelId;

    /// Entry identifier of the deposition (e.g. `1CBS`).
    fn entry_id(&self) -> &str;

    /// Model number within the entry (1 for single-model files).
    fn model_num(&self) -> i32;

    /// Number of residues in the atomic hierarchy.
    fn residue_count(&self) -> usize;

    /// Number of chains in the chain table.
    fn chain_count(&self) -> usize;

    /// Author chain label of chain `chain`.
    fn auth_asym_id(&self, chain: usize) -> &str;

    /// Internal chain label of chain `chain`.
    fn label_asym_id(&self, chain: usize) -> &str;

    /// 0-based index of the entity owning the chain with internal label
    /// `label_asym_id`.
    fn find_entity(&self, label_asym_id: &str) -> Option<usize>;

    /// Residue ordinal for an entity id, internal chain label, author
    /// sequence number and insertion code (`""` for none).
    fn find_residue(
        &self,
        entity_id: &str,
        label_asym_id: &str,
        auth_seq_id: i32,
        ins_code: &str,
    ) -> Option<ResidueIndex>;

    /// Display information for a residue ordinal.
    fn residue(&self, index: ResidueIndex) -> Option<ResidueInfo>;

    /// Whether the model has no residues.
    fn is_empty(&self) -> bool {
        self.residue_count() == 0
    }
}

/// Whether `entry_id` looks like a PDB accession: four alphanumeric
/// characters starting with a digit, or the extended `pdb_` + 8 form.
#[must_use]
pub fn is_pdb_id(entry_id: &str) -> bool {
    let id = entry_id.trim();
    if id.len() == 4 {
        return id.starts_with(|c: char| c.is_ascii_digit())
            && id.chars().all(|c| c.is_ascii_alphanumeric());
    }
    id.len() == 12
        && id.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("pdb_"))
        && id
            .get(4..)
            .is_some_and(|s| s.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// Whether quality reports can be requested for `model`.
pub fn is_applicable<M: StructureModel + ?Sized>(model: Option<&M>) -> bool {
    model.is_some_and(|m| is_pdb_id(m.entry_id()))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdb_id_forms() {
        assert!(is_pdb_id("1cbs"));
        assert!(is_pdb_id("7QRS"));
        assert!(is_pdb_id("pdb_00001cbs"));
        assert!(!is_pdb_id("abcd"));
        assert!(!is_pdb_id("1cb"));
        assert!(!is_pdb_id("1c-s"));
        assert!(!is_pdb_id(""));
    }

    #[test]
    fn model_ids_are_unique() {
        let a = ModelId::next();
        let b = ModelId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn applicability_requires_pdb_entry() {
        let model = HierarchyBuilder::new("1cbs", 1).build();
        assert!(is_applicable(Some(&model)));
        let local = HierarchyBuilder::new("my_model", 1).build();
        assert!(!is_applicable(Some(&local)));
        assert!(!is_applicable::<AtomicHierarchy>(None));
    }
}
