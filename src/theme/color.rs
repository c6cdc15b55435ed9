use crate::model::ResidueIndex;
use crate::report::parser::NEUTRAL_GRAY;
use crate::report::ResidueIndexedStore;
use crate::util::rgb::Rgb;

/// Color of residue `index`: the record's display color, or neutral gray
/// when there is no store or no record.
#[must_use]
pub fn color_for(store: Option<&ResidueIndexedStore>, index: ResidueIndex) -> Rgb {
    store
        .and_then(|s| s.get(index))
        .map_or(NEUTRAL_GRAY, |r| r.display_color)
}
