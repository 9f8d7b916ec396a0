// polar-roll/src/dataset/mod.rs

mod errors;
mod service;
mod store;

pub use errors::{PolarLoadError, StoreError};
pub use service::{PolarLoad, PolarService};
pub use store::{DatasetStore, DirectoryStore, MemoryStore, DEFAULT_DATA_ROOT};
