// polar-roll/src/interp/dense.rs

use ndarray::{Array1, Array2};
use ndarray_stats::QuantileExt;
use std::io::Write;

/// Interpolated surface on a regular angle × radius lattice.
///
/// `values` is indexed `[radius_index, angle_index]`.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseGrid {
    angles: Array1<f64>,
    radii: Array1<f64>,
    values: Array2<f64>,
}

impl DenseGrid {
    pub(crate) fn new(angles: Array1<f64>, radii: Array1<f64>, values: Array2<f64>) -> Self {
        Self {
            angles,
            radii,
            values,
        }
    }

    pub fn angles(&self) -> &Array1<f64> {
        &self.angles
    }

    pub fn radii(&self) -> &Array1<f64> {
        &self.radii
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn value_at(&self, radius_index: usize, angle_index: usize) -> Option<f64> {
        self.values.get((radius_index, angle_index)).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(min, max)` of the interpolated values; `None` when the grid is empty
    /// or holds NaN.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let min = *self.values.min().ok()?;
        let max = *self.values.max().ok()?;
        Some((min, max))
    }

    /// `(angle, radius, value)` for every cell, radius-major.
    pub fn iter_cells(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.values
            .indexed_iter()
            .map(move |((i, j), &value)| (self.angles[j], self.radii[i], value))
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(["angle", "radius", "roll"])?;
        for (angle, radius, value) in self.iter_cells() {
            writer.write_record(&[angle.to_string(), radius.to_string(), value.to_string()])?;
        }
        writer.flush()?;
        Ok(())
    }
}
