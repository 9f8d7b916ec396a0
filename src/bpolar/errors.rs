// polar-roll/src/bpolar/errors.rs

use std::fmt;
use thiserror::Error;

/// Which header dimension of a `.bpolar` file a count refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatrixDimension {
    Speed,
    Heading,
}

impl MatrixDimension {
    pub fn max_count(&self) -> i32 {
        match self {
            MatrixDimension::Speed => 100,
            MatrixDimension::Heading => 360,
        }
    }
}

impl fmt::Display for MatrixDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixDimension::Speed => write!(f, "speed"),
            MatrixDimension::Heading => write!(f, "heading"),
        }
    }
}

#[derive(Error, Debug)]
pub enum BpolarError {
    #[error("Polar file not found: {0}")]
    NotFound(String),
    #[error("Invalid {dimension} count: {count} (must be in [1, {}])", .dimension.max_count())]
    InvalidDimensions {
        dimension: MatrixDimension,
        count: i32,
    },
    #[error("max_roll shape {rows}x{cols} does not match {speeds} speeds x {headings} headings")]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        speeds: usize,
        headings: usize,
    },
    #[error("Unexpected end of data while reading the {0}")]
    Truncated(&'static str),
    #[error("Error reading polar data: {0}")]
    ReadFailure(#[source] std::io::Error),
}
