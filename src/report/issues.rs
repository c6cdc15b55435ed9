//! Classification of outlier tags into a single display tier.
//!
//! A residue can carry several outlier tags at once. The tier is chosen by
//! a fixed priority, highest first: side-chain outliers, backbone
//! (Ramachandran / bond length) outliers, bond-angle outliers, clashes.

use crate::util::rgb::Rgb;

/// Display tier of an outlier-tagged residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IssueTier {
    /// No recognized outlier tag.
    NoIssues,
    /// Steric clash.
    Clash,
    /// Bond-angle outlier.
    BondAngle,
    /// Ramachandran or bond-length outlier.
    Backbone,
    /// Side-chain rotamer outlier.
    Sidechain,
}

impl IssueTier {
    /// Tiers in classification priority order.
    pub const PRIORITY: [Self; 4] =
        [Self::Sidechain, Self::Backbone, Self::BondAngle, Self::Clash];

    /// Classify a residue's tags; first tier in [`Self::PRIORITY`] with a
    /// matching tag wins.
    #[must_use]
    pub fn classify<S: AsRef<str>>(tags: &[S]) -> Self {
        Self::PRIORITY
            .into_iter()
            .find(|tier| {
                tags.iter().any(|t| tier.tags().contains(&t.as_ref()))
            })
            .unwrap_or(Self::NoIssues)
    }

    /// Service tags that select this tier.
    #[must_use]
    pub fn tags(self) -> &'static [&'static str] {
        match self {
            Self::Sidechain => &["sidechain_outliers"],
            Self::Backbone => &["ramachandran_outliers", "bond_lengths"],
            Self::BondAngle => &["bond_angles"],
            Self::Clash => &["clashes"],
            Self::NoIssues => &[],
        }
    }

    /// Numeric score (0 for no issues, 4 for side-chain outliers).
    #[must_use]
    pub fn score(self) -> f64 {
        match self {
            Self::NoIssues => 0.0,
            Self::Clash => 1.0,
            Self::BondAngle => 2.0,
            Self::Backbone => 3.0,
            Self::Sidechain => 4.0,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::NoIssues => "No Issues",
            Self::Clash => "Clashes",
            Self::BondAngle => "Bond Angles",
            Self::Backbone => "Backbone Outliers",
            Self::Sidechain => "Sidechain Outliers",
        }
    }

    /// Fixed tier color.
    #[must_use]
    pub fn color(self) -> Rgb {
        match self {
            Self::NoIssues => Rgb::from_hex(0x00_00FF),
            Self::Clash => Rgb::from_hex(0xAA_4A44),
            Self::BondAngle => Rgb::from_hex(0xFF_A500),
            Self::Backbone => Rgb::from_hex(0xEA_DDCA),
            Self::Sidechain => Rgb::from_hex(0x00_FF00),
        }
    }
}
