// polar-roll/src/grid/fitter.rs

use super::draft::DraftCategory;
use super::key::GridKey;
use crate::control::ControlFileData;
use derive_builder::Builder;
use log::trace;

/// Spacing of the stored GM/Hs/Tz grid.
pub const GRID_STEP: f64 = 0.5;

/// Operating parameters as entered by the user.
///
/// The draft category comes from the peak drafts when both are present and
/// positive, otherwise from `draft_hint` (scantling when unset).
#[derive(Builder, Clone, Debug, PartialEq)]
#[builder(default)]
pub struct FitParams {
    #[builder(setter(strip_option))]
    pub draft_hint: Option<DraftCategory>,
    #[builder(setter(strip_option))]
    pub draft_aft_peak: Option<f64>,
    #[builder(setter(strip_option))]
    pub draft_fore_peak: Option<f64>,
    pub gm: f64,
    pub hs: f64,
    pub tz: f64,
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            draft_hint: None,
            draft_aft_peak: None,
            draft_fore_peak: None,
            gm: 1.5,
            hs: 5.5,
            tz: 7.5,
        }
    }
}

/// Snap to the nearest multiple of 0.5, ties away from zero
/// (`1.75 -> 2.0`, `-0.25 -> -0.5`). Negative zero comes back as `0.0`.
pub fn snap_half(value: f64) -> f64 {
    libm::round(value / GRID_STEP) * GRID_STEP + 0.0
}

pub fn resolve_draft(params: &FitParams, control: Option<&ControlFileData>) -> DraftCategory {
    match (params.draft_aft_peak, params.draft_fore_peak) {
        (Some(aft), Some(fore)) if aft > 0.0 && fore > 0.0 => {
            let mean_draft = 0.5 * (aft + fore);
            let category =
                DraftCategory::from_mean_draft(mean_draft, control.map(|data| &data.drafts));
            trace!("Mean draft {} resolved to {}", mean_draft, category);
            category
        }
        _ => params.draft_hint.unwrap_or_default(),
    }
}

/// Map continuous parameters onto the stored dataset grid.
pub fn fit(params: &FitParams, control: Option<&ControlFileData>) -> GridKey {
    GridKey::new(
        resolve_draft(params, control),
        snap_half(params.gm),
        snap_half(params.hs),
        snap_half(params.tz),
    )
}
