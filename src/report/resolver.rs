//! Translation of author-facing residue identifiers into residue ordinals.

use super::parser::RawAnnotationEntry;
use crate::model::{ResidueIndex, StructureModel};

/// Resolves `(entity, chain, author seq, insertion code)` tuples against
/// one model. Stateless: the same tuple always yields the same outcome.
pub struct IdentifierResolver<'a, M: ?Sized> {
    model: &'a M,
}

impl<'a, M: StructureModel + ?Sized> IdentifierResolver<'a, M> {
    /// Resolver over `model`.
    pub fn new(model: &'a M) -> Self {
        Self { model }
    }

    /// Internal chain label of the first chain whose author label is
    /// `auth_asym_id`.
    #[must_use]
    pub fn label_asym_id(&self, auth_asym_id: &str) -> Option<&'a str> {
        let model = self.model;
        (0..model.chain_count())
            .find(|&c| model.auth_asym_id(c) == auth_asym_id)
            .map(|c| model.label_asym_id(c))
    }

    /// External (1-based) entity id of the chain with internal label
    /// `label_asym_id`: the owning entity's 0-based index plus one.
    #[must_use]
    pub fn entity_id(&self, label_asym_id: &str) -> Option<String> {
        self.model
            .find_entity(label_asym_id)
            .map(|idx| (idx + 1).to_string())
    }

    /// Resolve one identifier tuple.
    ///
    /// With an `entity_id`, `chain_id` is taken as the internal chain
    /// label. Without one, `chain_id` is an author label that is translated
    /// first and the entity id is derived from the chain. Fractional
    /// positions are floored; a missing insertion code means `""`.
    #[must_use]
    pub fn resolve(
        &self,
        entity_id: Option<&str>,
        chain_id: &str,
        author_seq_id: f64,
        insertion_code: Option<&str>,
    ) -> Option<ResidueIndex> {
        let auth_seq_id = floor_seq_id(author_seq_id)?;
        let ins_code = insertion_code.unwrap_or("");

        match entity_id {
            Some(entity_id) => self.model.find_residue(
                entity_id,
                chain_id,
                auth_seq_id,
                ins_code,
            ),
            None => {
                let label_asym_id = self.label_asym_id(chain_id)?;
                let entity_id = self.entity_id(label_asym_id)?;
                self.model.find_residue(
                    &entity_id,
                    label_asym_id,
                    auth_seq_id,
                    ins_code,
                )
            }
        }
    }

    /// Resolve a parsed entry.
    #[must_use]
    pub fn resolve_entry(
        &self,
        entry: &RawAnnotationEntry,
    ) -> Option<ResidueIndex> {
        self.resolve(
            entry.entity_id.as_deref(),
            &entry.chain_id,
            entry.author_seq_id,
            entry.insertion_code.as_deref(),
        )
    }
}

fn floor_seq_id(value: f64) -> Option<i32> {
    let floored = value.floor();
    if !floored.is_finite()
        || floored < f64::from(i32::MIN)
        || floored > f64::from(i32::MAX)
    {
        return None;
    }
    Some(floored as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::two_chain_model;

    #[test]
    fn author_chain_translates_to_label_and_entity() {
        let model = two_chain_model();
        let resolver = IdentifierResolver::new(&model);
        assert_eq!(resolver.label_asym_id("B"), Some("C"));
        assert_eq!(resolver.label_asym_id("C"), None);
        // chain C belongs to entity index 1 → external id "2"
        assert_eq!(resolver.entity_id("C").as_deref(), Some("2"));
        assert_eq!(resolver.entity_id("A").as_deref(), Some("1"));
        assert_eq!(
            resolver.resolve(None, "B", 3.0, None),
            Some(ResidueIndex(8))
        );
    }

    #[test]
    fn entity_given_uses_internal_label() {
        let model = two_chain_model();
        let resolver = IdentifierResolver::new(&model);
        assert_eq!(
            resolver.resolve(Some("2"), "C", 1.0, Some("")),
            Some(ResidueIndex(6))
        );
        // author label is not accepted when the entity id is supplied
        assert_eq!(resolver.resolve(Some("2"), "B", 1.0, None), None);
    }

    #[test]
    fn positions_floor_and_insertion_codes_default() {
        let model = two_chain_model();
        let resolver = IdentifierResolver::new(&model);
        assert_eq!(
            resolver.resolve(None, "A", 12.9, None),
            Some(ResidueIndex(2))
        );
        assert_eq!(
            resolver.resolve(None, "A", 12.0, Some("A")),
            Some(ResidueIndex(3))
        );
        assert_eq!(resolver.resolve(None, "A", 99.0, None), None);
        assert_eq!(resolver.resolve(None, "A", f64::NAN, None), None);
        assert_eq!(resolver.resolve(None, "A", 1e12, None), None);
    }

    #[test]
    fn resolution_is_idempotent() {
        let model = two_chain_model();
        let resolver = IdentifierResolver::new(&model);
        for (chain, seq) in [("A", 11.0), ("B", 2.0), ("X", 1.0)] {
            assert_eq!(
                resolver.resolve(None, chain, seq, None),
                resolver.resolve(None, chain, seq, None)
            );
        }
    }

    #[test]
    fn first_matching_author_chain_wins() {
        use crate::model::{HierarchyBuilder, ResidueSite};

        let site = |entity: &'static str, label: &'static str| ResidueSite {
            entity_id: entity,
            label_asym_id: label,
            auth_asym_id: "A",
            auth_seq_id: 1,
            ins_code: "",
            comp_id: "HOH",
        };
        // two internal chains share author label A
        let model = HierarchyBuilder::new("1abc", 1)
            .with(&site("1", "A"))
            .with(&site("3", "B"))
            .build();
        let resolver = IdentifierResolver::new(&model);
        assert_eq!(resolver.label_asym_id("A"), Some("A"));
        assert_eq!(
            resolver.resolve(None, "A", 1.0, None),
            Some(ResidueIndex(0))
        );
    }
}
