use crate::picking::PickTarget;
use crate::report::{ParsedAs, ResidueIndexedStore, ResidueRecord};

/// Hover text for `target`.
///
/// `None` when tooltips are off, the target is not a residue of an atomic
/// model, or no store is attached. Unannotated residues get the shape's
/// "nothing to report" text.
#[must_use]
pub fn label_for(
    target: &PickTarget,
    store: Option<&ResidueIndexedStore>,
    show_tooltip: bool,
) -> Option<String> {
    if !show_tooltip {
        return None;
    }
    let residue = target.residue()?;
    let store = store?;
    let record = store.get(residue);
    Some(match store.parsed_as() {
        ParsedAs::Issues => issues_label(record),
        ParsedAs::Score => score_label(record),
    })
}

fn issues_label(record: Option<&ResidueRecord>) -> String {
    match record {
        None => "Validation: No Issues".to_owned(),
        Some(r) if r.issue_types.is_empty() => {
            format!("Validation: {}", r.primary_type)
        }
        Some(r) => format!(
            "Validation: {} ({})",
            r.primary_type,
            r.issue_types.join(", ")
        ),
    }
}

fn score_label(record: Option<&ResidueRecord>) -> String {
    match record {
        None => "Score: 0".to_owned(),
        Some(r) if r.primary_type.is_empty() => format!("Score: {}", r.score),
        Some(r) => format!("Score: {} ({})", r.score, r.primary_type),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::two_chain_model;
    use crate::model::{ModelId, ResidueIndex};
    use crate::report::build_store;

    const CLASH: &str = r#"{"1abc": {"molecules": [{"entity_id": "1", "chains": [
        {"struct_asym_id": "A", "models": [{"model_id": "1", "residues": [
            {"author_residue_number": 12, "outlier_types": ["clashes"]}
        ]}]}
    ]}]}}"#;

    const SCORES: &str = r##"{"emd-1": [
        {"type": "qscore", "chain": "B", "position": 1, "score": 0.5, "color": "#7A8484"},
        {"chain": "B", "position": 2, "score": 3}
    ]}"##;

    fn residue(i: u32) -> PickTarget {
        PickTarget::Residue {
            model: ModelId(1),
            residue: ResidueIndex(i),
        }
    }

    #[test]
    fn clash_label_names_the_issue() {
        let model = two_chain_model();
        let store = build_store(&model, CLASH, None).unwrap();

        let label = label_for(&residue(2), Some(&store), true).unwrap();
        assert!(label.contains("Clashes"), "{label}");
        assert_eq!(label, "Validation: Clashes (clashes)");
        assert_eq!(
            label_for(&residue(0), Some(&store), true).as_deref(),
            Some("Validation: No Issues")
        );
        assert_eq!(label_for(&residue(2), Some(&store), false), None);
    }

    #[test]
    fn score_labels() {
        let model = two_chain_model();
        let store = build_store(&model, SCORES, None).unwrap();
        assert_eq!(
            label_for(&residue(6), Some(&store), true).as_deref(),
            Some("Score: 0.5 (qscore)")
        );
        assert_eq!(
            label_for(&residue(7), Some(&store), true).as_deref(),
            Some("Score: 3")
        );
        assert_eq!(
            label_for(&residue(8), Some(&store), true).as_deref(),
            Some("Score: 0")
        );
    }

    #[test]
    fn non_residue_targets_and_missing_store_have_no_label() {
        let model = two_chain_model();
        let store = build_store(&model, CLASH, None).unwrap();
        let coarse = PickTarget::Coarse {
            model: ModelId(1),
            element: 2,
        };
        assert_eq!(label_for(&coarse, Some(&store), true), None);
        assert_eq!(label_for(&PickTarget::None, Some(&store), true), None);
        assert_eq!(label_for(&residue(2), None, true), None);
    }
}
