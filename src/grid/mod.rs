// polar-roll/src/grid/mod.rs

mod catalog;
mod draft;
mod fitter;
mod key;

pub use catalog::{half_steps, GridCatalog};
pub use draft::{
    DraftCategory, UnknownDraftCategory, FALLBACK_DESIGN_THRESHOLD, FALLBACK_SCANTLING_THRESHOLD,
};
pub use fitter::{
    fit, resolve_draft, snap_half, FitParams, FitParamsBuilder, FitParamsBuilderError, GRID_STEP,
};
pub use key::GridKey;
