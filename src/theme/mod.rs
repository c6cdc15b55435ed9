//! Per-residue colors and hover labels derived from a report store.
//!
//! Derivations are pure functions of `(store, residue ordinal)`. A missing
//! store or an unannotated residue falls back to
//! [`NEUTRAL_GRAY`](crate::report::parser::NEUTRAL_GRAY) for colors and to
//! a "no issues" text for labels; nothing here fails.

mod color;
mod label;

use std::sync::Arc;

pub use color::color_for;
pub use label::label_for;

use crate::model::{ResidueIndex, StructureModel};
use crate::options::Metric;
use crate::report::parser::NEUTRAL_GRAY;
use crate::report::ResidueIndexedStore;
use crate::util::rgb::Rgb;

/// Theme description shown next to the theme picker.
pub const DESCRIPTION: &str = "Assigns residue colors according to the \
    number of quality issues or a specific quality issue. Data from wwPDB \
    Validation Report, obtained via EMDB.";

/// Level at which a color theme assigns colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// One color for the whole structure.
    Uniform,
    /// One color per residue group.
    Group,
}

/// One legend row: scores at or above `threshold` use `color`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendEntry {
    /// Lower score bound of the row.
    pub threshold: f64,
    /// Row swatch.
    pub color: Rgb,
}

const fn legend_entry(threshold: f64, hex: u32) -> LegendEntry {
    LegendEntry {
        threshold,
        color: Rgb::from_hex(hex),
    }
}

/// Score legend in ascending threshold order. The service colors the
/// residues itself; the legend only explains its palette.
pub const LEGEND: [LegendEntry; 10] = [
    legend_entry(0.0, 0xFF_00FF),
    legend_entry(0.094, 0x7A_1717),
    legend_entry(0.109, 0x7A_1B1B),
    legend_entry(0.212, 0x7A_3636),
    legend_entry(0.347, 0x7A_5858),
    legend_entry(0.518, 0x7A_8484),
    legend_entry(0.607, 0x7A_9A9A),
    legend_entry(0.733, 0x7A_BABA),
    legend_entry(0.817, 0x7A_D0D0),
    legend_entry(0.99, 0x7A_FCFC),
];

/// Legend row label, e.g. `>= 0` or `0.347`.
#[must_use]
pub fn legend_label(index: usize) -> Option<String> {
    let entry = LEGEND.get(index)?;
    Some(if index == 0 {
        format!(">= {}", entry.threshold)
    } else {
        entry.threshold.to_string()
    })
}

/// Color theme over one model's report store.
#[derive(Debug, Clone)]
pub struct QualityColorTheme {
    metric: Metric,
    store: Option<Arc<ResidueIndexedStore>>,
    granularity: Granularity,
}

impl QualityColorTheme {
    /// Theme for `model`. Without a store, or for a model with no residues,
    /// the theme colors everything neutral gray.
    pub fn new<M: StructureModel + ?Sized>(
        metric: Metric,
        store: Option<Arc<ResidueIndexedStore>>,
        model: Option<&M>,
    ) -> Self {
        let has_residues = model.is_some_and(|m| !m.is_empty());
        let store = store.filter(|_| has_residues);
        let granularity = if store.is_some() {
            Granularity::Group
        } else {
            Granularity::Uniform
        };
        Self {
            metric,
            store,
            granularity,
        }
    }

    /// Metric the theme was created for.
    #[must_use]
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Color assignment level.
    #[must_use]
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Colors should be blended across neighbouring residues.
    #[must_use]
    pub fn prefer_smoothing(&self) -> bool {
        true
    }

    /// Theme description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        DESCRIPTION
    }

    /// Legend rows.
    #[must_use]
    pub fn legend(&self) -> &'static [LegendEntry] {
        &LEGEND
    }

    /// Store backing the theme, if any.
    #[must_use]
    pub fn store(&self) -> Option<&ResidueIndexedStore> {
        self.store.as_deref()
    }

    /// Color of one residue.
    #[must_use]
    pub fn color(&self, index: ResidueIndex) -> Rgb {
        match self.granularity {
            Granularity::Uniform => NEUTRAL_GRAY,
            Granularity::Group => color_for(self.store(), index),
        }
    }

    /// Normalized colors for residues `0..residue_count`, ready for a
    /// per-residue color buffer.
    #[must_use]
    pub fn per_residue_colors(&self, residue_count: usize) -> Vec<[f32; 3]> {
        (0..residue_count)
            .map(|i| {
                u32::try_from(i)
                    .map_or(NEUTRAL_GRAY, |i| self.color(ResidueIndex(i)))
                    .to_f32()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::two_chain_model;
    use crate::model::{AtomicHierarchy, HierarchyBuilder};
    use crate::report::build_store;

    const CLASH: &str = r#"{"1abc": {"molecules": [{"entity_id": 1, "chains": [
        {"struct_asym_id": "A", "models": [{"model_id": 1, "residues": [
            {"author_residue_number": 12, "author_insertion_code": "",
             "outlier_types": ["clashes"]}
        ]}]}
    ]}]}}"#;

    #[test]
    fn legend_is_ascending() {
        assert!(LEGEND.windows(2).all(|w| w[0].threshold < w[1].threshold));
        assert_eq!(legend_label(0).as_deref(), Some(">= 0"));
        assert_eq!(legend_label(4).as_deref(), Some("0.347"));
        assert_eq!(legend_label(10), None);
        assert_eq!(LEGEND[9].color.to_string(), "#7AFCFC");
    }

    #[test]
    fn clash_residue_is_colored_and_others_fall_back() {
        let model = two_chain_model();
        let store = Arc::new(build_store(&model, CLASH, None).unwrap());
        let theme =
            QualityColorTheme::new(Metric::Qscore, Some(store), Some(&model));
        assert_eq!(theme.granularity(), Granularity::Group);
        assert!(theme.prefer_smoothing());

        let colors = theme.per_residue_colors(model.residue_count());
        assert_eq!(colors.len(), 9);
        assert_eq!(colors[2], Rgb::from_hex(0xAA_4A44).to_f32());
        for (i, color) in colors.iter().enumerate().filter(|&(i, _)| i != 2) {
            assert_eq!(*color, NEUTRAL_GRAY.to_f32(), "residue {i}");
        }
    }

    #[test]
    fn missing_store_or_empty_model_is_uniform() {
        let model = two_chain_model();
        let theme = QualityColorTheme::new(Metric::Ai, None, Some(&model));
        assert_eq!(theme.granularity(), Granularity::Uniform);
        assert_eq!(theme.color(ResidueIndex(0)), NEUTRAL_GRAY);

        let store = Arc::new(build_store(&model, CLASH, None).unwrap());
        let empty = HierarchyBuilder::new("1abc", 1).build();
        let theme =
            QualityColorTheme::new(Metric::Ai, Some(store), Some(&empty));
        assert!(theme.store().is_none());
        assert_eq!(theme.description(), DESCRIPTION);

        let none = QualityColorTheme::new::<AtomicHierarchy>(
            Metric::Ai,
            None,
            None,
        );
        assert!(none.per_residue_colors(3).iter().all(|c| {
            *c == NEUTRAL_GRAY.to_f32()
        }));
    }
}
