// polar-roll/src/interp/mod.rs

mod dense;
mod errors;
mod polar;

pub use dense::DenseGrid;
pub use errors::PolarInterpolatorBuilderError;
pub use polar::{
    circular_distance, densify, AngleNeighbors, Blend, DensifyOptions, PolarInterpolator,
    PolarInterpolatorBuilder, FULL_CIRCLE,
};
