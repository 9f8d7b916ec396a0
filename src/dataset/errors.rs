// polar-roll/src/dataset/errors.rs

use crate::bpolar::BpolarError;
use crate::control::ControlFileError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Data file not found: {0}")]
    NotFound(String),
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
    #[error("Error reading '{key}': {source}")]
    ReadFailure {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum PolarLoadError {
    #[error(transparent)]
    StoreError(#[from] StoreError),
    #[error("Error decoding '{key}': {source}")]
    BpolarError {
        key: String,
        #[source]
        source: BpolarError,
    },
    #[error(transparent)]
    ControlFileError(#[from] ControlFileError),
}
