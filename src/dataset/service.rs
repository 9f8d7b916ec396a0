// polar-roll/src/dataset/service.rs

use super::errors::{PolarLoadError, StoreError};
use super::store::DatasetStore;
use crate::bpolar::{decode_keyed, ResponseMatrix};
use crate::control::{ControlFileData, ParameterBound};
use crate::grid::{fit, FitParams, GridCatalog, GridKey};
use humantime::format_duration;
use log::{debug, info, warn};
use std::time::Instant;

/// A decoded dataset together with the keys it was resolved to.
#[derive(Clone, Debug)]
pub struct PolarLoad {
    pub key: GridKey,
    pub storage_key: String,
    pub image_key: String,
    pub matrix: ResponseMatrix,
}

/// Resolves operating parameters to stored datasets.
///
/// Without a control file the draft category falls back to fixed mean-draft
/// thresholds and the wide default parameter bounds apply.
pub struct PolarService<S: DatasetStore> {
    store: S,
    control: Option<ControlFileData>,
    catalog: GridCatalog,
}

impl<S: DatasetStore> PolarService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            control: None,
            catalog: GridCatalog::default(),
        }
    }

    pub fn with_catalog(mut self, catalog: GridCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &GridCatalog {
        &self.catalog
    }

    /// Read and parse the control file stored under `key`. On failure the
    /// previously loaded control data, if any, is kept.
    pub fn load_control_file(&mut self, key: &str) -> Result<&ControlFileData, PolarLoadError> {
        let bytes = self.store.read(key)?;
        let text = String::from_utf8_lossy(&bytes);
        let data = ControlFileData::parse(&text)?;
        info!(
            "Loaded control file {} for IMO {} ({})",
            key, data.vessel_imo, data.vessel_name
        );
        Ok(&*self.control.insert(data))
    }

    pub fn set_control(&mut self, control: Option<ControlFileData>) {
        self.control = control;
    }

    pub fn control(&self) -> Option<&ControlFileData> {
        self.control.as_ref()
    }

    pub fn is_control_file_loaded(&self) -> bool {
        self.control.is_some()
    }

    pub fn parameter_bounds(&self) -> ParameterBound {
        self.control
            .as_ref()
            .map(|data| data.bounds)
            .unwrap_or_default()
    }

    pub fn fit(&self, params: &FitParams) -> GridKey {
        fit(params, self.control.as_ref())
    }

    pub fn load_polar(&self, params: &FitParams) -> Result<PolarLoad, PolarLoadError> {
        let now = Instant::now();
        let key = self.fit(params);
        debug!("Fitted {:?} to {}", params, key);
        if !self.parameter_bounds().contains(&key) {
            warn!("{} lies outside the parameter bounds", key);
        } else if !self.catalog.contains(&key) {
            warn!("{} is not part of the dataset catalog", key);
        }

        let storage_key = key.storage_key();
        info!("Looking for {}", storage_key);
        let bytes = self.store.read(&storage_key)?;
        if bytes.is_empty() {
            return Err(StoreError::NotFound(storage_key).into());
        }
        let matrix =
            decode_keyed(&bytes, &storage_key).map_err(|source| PolarLoadError::BpolarError {
                key: storage_key.clone(),
                source,
            })?;
        debug!(
            "Decoded {} ({} speeds x {} headings) in {}",
            storage_key,
            matrix.speed_count(),
            matrix.heading_count(),
            format_duration(now.elapsed())
        );

        Ok(PolarLoad {
            key,
            storage_key,
            image_key: key.image_key(),
            matrix,
        })
    }

    /// Image key of the companion plot, if the store holds it.
    pub fn find_image_key(&self, params: &FitParams) -> Option<String> {
        let image_key = self.fit(params).image_key();
        self.store.contains(&image_key).then_some(image_key)
    }
}
