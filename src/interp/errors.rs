// polar-roll/src/interp/errors.rs

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum PolarInterpolatorBuilderError {
    #[error("Unitialized field on PolarInterpolatorBuilder: {0}")]
    UninitializedFieldError(String),
    #[error("angles must not be empty")]
    EmptyAngles,
    #[error("radii must not be empty")]
    EmptyRadii,
    #[error("angle at index {0} is not finite: {1}")]
    NonFiniteAngle(usize, f64),
    #[error("radius at index {0} is not finite: {1}")]
    NonFiniteRadius(usize, f64),
    #[error("radii must be ascending, but radii[{0}]={1} > radii[{2}]={3}")]
    DescendingRadii(usize, f64, usize, f64),
}
