use pretty_env_logger;
use std::sync::Once;

static INIT: Once = Once::new();

pub fn _setup_pretty_env_logger_default() {
    INIT.call_once(|| {
        pretty_env_logger::init();
    });
}

pub use bpolar::{BpolarError, ResponseMatrix};
pub use control::{ControlFileData, ControlFileError, ParameterBound};
pub use dataset::{DatasetStore, DirectoryStore, PolarLoad, PolarLoadError, PolarService};
pub use grid::{fit, DraftCategory, FitParams, FitParamsBuilder, GridKey};
pub use interp::{densify, Blend, DenseGrid, DensifyOptions, PolarInterpolator};
pub mod bpolar;
pub mod control;
pub mod dataset;
pub mod grid;
pub mod interp;
