// polar-roll/src/grid/draft.rs

use crate::control::RepresentativeDrafts;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Mean draft (m) above which a vessel counts as scantling when no control
/// file provides representative drafts.
pub const FALLBACK_SCANTLING_THRESHOLD: f64 = 8.0;
/// Mean draft (m) above which a vessel counts as design when no control file
/// provides representative drafts.
pub const FALLBACK_DESIGN_THRESHOLD: f64 = 6.0;

/// Loading condition; also the top-level directory of the dataset tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DraftCategory {
    #[default]
    Scantling,
    Design,
    Intermediate,
}

impl DraftCategory {
    pub const ALL: [DraftCategory; 3] = [
        DraftCategory::Scantling,
        DraftCategory::Design,
        DraftCategory::Intermediate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DraftCategory::Scantling => "scantling",
            DraftCategory::Design => "design",
            DraftCategory::Intermediate => "intermediate",
        }
    }

    /// Classify a mean draft. Thresholds are the midpoints between adjacent
    /// representative drafts, or the fixed fallbacks without them. A draft
    /// exactly on a midpoint falls into the lighter category.
    pub fn from_mean_draft(mean_draft: f64, drafts: Option<&RepresentativeDrafts>) -> Self {
        let (scantling_above, design_above) = match drafts {
            Some(rd) => (
                0.5 * (rd.scantling + rd.design),
                0.5 * (rd.design + rd.intermediate),
            ),
            None => (FALLBACK_SCANTLING_THRESHOLD, FALLBACK_DESIGN_THRESHOLD),
        };
        if mean_draft > scantling_above {
            DraftCategory::Scantling
        } else if mean_draft > design_above {
            DraftCategory::Design
        } else {
            DraftCategory::Intermediate
        }
    }
}

impl fmt::Display for DraftCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DraftCategory {
    type Err = UnknownDraftCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DraftCategory::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownDraftCategory(s.to_string()))
    }
}

#[derive(Error, Debug)]
#[error("Unknown draft category {0:?} (expected scantling, design or intermediate)")]
pub struct UnknownDraftCategory(pub String);
