//! Typed pick-target resolution from raw pick IDs.
//!
//! The host viewer reports hovered elements as flat integer IDs. Labels
//! need to know which model and which residue ordinal the ID refers to,
//! and whether the element is part of the atomic hierarchy at all.

use crate::model::{ModelId, ResidueIndex};

/// A typed pick target resolved from a raw pick ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickTarget {
    /// No target (background or no hover).
    None,
    /// A residue of a model's atomic hierarchy.
    Residue {
        /// Owning model.
        model: ModelId,
        /// Residue ordinal within the model.
        residue: ResidueIndex,
    },
    /// A coarse-grained element (sphere or gaussian bead), which carries
    /// no residue annotation.
    Coarse {
        /// Owning model.
        model: ModelId,
        /// Element index within the model's coarse representation.
        element: u32,
    },
}

impl PickTarget {
    /// Owning model, if any.
    #[must_use]
    pub fn model(&self) -> Option<ModelId> {
        match *self {
            Self::None => None,
            Self::Residue { model, .. } | Self::Coarse { model, .. } => {
                Some(model)
            }
        }
    }

    /// Residue ordinal for atomic targets.
    #[must_use]
    pub fn residue(&self) -> Option<ResidueIndex> {
        match *self {
            Self::Residue { residue, .. } => Some(residue),
            _ => None,
        }
    }

    /// Returns `true` if this target is `None`.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

#[derive(Debug, Clone, Copy)]
enum SegmentKind {
    Residues,
    Coarse,
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    model: ModelId,
    kind: SegmentKind,
    len: u32,
}

/// Maps raw pick IDs to typed [`PickTarget`] values.
///
/// Pick IDs are contiguous and 1-based; `0` means no hit. Each pushed
/// segment claims the next `len` IDs in push order. The total never
/// exceeds `u32::MAX - 1` so every claimed ID is representable.
#[derive(Debug, Clone, Default)]
pub struct PickMap {
    segments: Vec<Segment>,
    total: u32,
}

impl PickMap {
    /// Empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim IDs for `residue_count` residues of `model`. Returns the first
    /// raw ID assigned, or `None` if the ID space is exhausted.
    pub fn push_residues(
        &mut self,
        model: ModelId,
        residue_count: u32,
    ) -> Option<u32> {
        self.push(model, SegmentKind::Residues, residue_count)
    }

    /// Claim IDs for `count` coarse elements of `model`. Returns the first
    /// raw ID assigned, or `None` if the ID space is exhausted.
    pub fn push_coarse(&mut self, model: ModelId, count: u32) -> Option<u32> {
        self.push(model, SegmentKind::Coarse, count)
    }

    fn push(
        &mut self,
        model: ModelId,
        kind: SegmentKind,
        len: u32,
    ) -> Option<u32> {
        let first = self.total.checked_add(1)?;
        let total = self.total.checked_add(len).filter(|&t| t < u32::MAX)?;
        self.segments.push(Segment { model, kind, len });
        self.total = total;
        Some(first)
    }

    /// Total number of IDs claimed.
    #[must_use]
    pub fn len(&self) -> u32 {
        self.total
    }

    /// Whether no IDs are claimed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Resolve a raw pick ID to a typed target.
    #[must_use]
    pub fn resolve(&self, raw_id: u32) -> PickTarget {
        if raw_id == 0 {
            return PickTarget::None;
        }
        let mut local = raw_id - 1;
        for segment in &self.segments {
            if local < segment.len {
                return match segment.kind {
                    SegmentKind::Residues => PickTarget::Residue {
                        model: segment.model,
                        residue: ResidueIndex(local),
                    },
                    SegmentKind::Coarse => PickTarget::Coarse {
                        model: segment.model,
                        element: local,
                    },
                };
            }
            local -= segment.len;
        }
        PickTarget::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_segments_in_push_order() {
        let a = ModelId(1);
        let b = ModelId(2);
        let mut map = PickMap::new();
        assert_eq!(map.push_residues(a, 3), Some(1));
        assert_eq!(map.push_coarse(a, 2), Some(4));
        assert_eq!(map.push_residues(b, 1), Some(6));
        assert_eq!(map.len(), 6);

        assert_eq!(map.resolve(0), PickTarget::None);
        assert_eq!(
            map.resolve(3),
            PickTarget::Residue {
                model: a,
                residue: ResidueIndex(2)
            }
        );
        assert_eq!(
            map.resolve(5),
            PickTarget::Coarse {
                model: a,
                element: 1
            }
        );
        assert_eq!(map.resolve(6).residue(), Some(ResidueIndex(0)));
        assert_eq!(map.resolve(6).model(), Some(b));
        assert!(map.resolve(7).is_none());
    }

    #[test]
    fn exhausted_id_space_is_refused() {
        let a = ModelId(1);
        let mut map = PickMap::new();
        assert_eq!(map.push_residues(a, u32::MAX - 2), Some(1));
        assert_eq!(map.push_coarse(a, 2), None);
        assert_eq!(map.len(), u32::MAX - 2);
        assert_eq!(map.push_coarse(a, 1), Some(u32::MAX - 1));
        assert_eq!(map.len(), u32::MAX - 1);
        assert_eq!(map.push_residues(a, 2), None);

        assert_eq!(
            map.resolve(u32::MAX - 1),
            PickTarget::Coarse {
                model: a,
                element: 0
            }
        );
        assert!(map.resolve(u32::MAX).is_none());
    }

    #[test]
    fn coarse_targets_have_no_residue() {
        let target = PickTarget::Coarse {
            model: ModelId(9),
            element: 0,
        };
        assert_eq!(target.residue(), None);
        assert_eq!(target.model(), Some(ModelId(9)));
        assert!(PickMap::new().is_empty());
    }
}
