// polar-roll/src/interp/polar.rs

use super::dense::DenseGrid;
use super::errors::PolarInterpolatorBuilderError;
use crate::bpolar::ResponseMatrix;
use humantime::format_duration;
use log::debug;
use ndarray::{Array1, Array2, Axis, Zip};
use std::time::Instant;

pub const FULL_CIRCLE: f64 = 360.0;

/// How the two angular neighbours of a query are combined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Blend {
    /// Unweighted mean of the two angular neighbours, whatever their
    /// distances. This matches the existing chart output.
    #[default]
    Midpoint,
    /// Each neighbour weighted by the other neighbour's circular distance, so
    /// a query sitting on a stored angle returns that angle's value.
    AngleWeighted,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DensifyOptions {
    /// Number of uniformly spaced output angles over the full circle.
    pub angle_count: usize,
    /// Output radii per stored radius.
    pub radial_density: usize,
}

impl Default for DensifyOptions {
    fn default() -> Self {
        Self {
            angle_count: 360,
            radial_density: 3,
        }
    }
}

/// Nearest and second-nearest stored angles under the circular metric.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngleNeighbors {
    pub nearest: usize,
    pub nearest_distance: f64,
    pub second: usize,
    pub second_distance: f64,
}

/// Distance in degrees between two headings, going the short way round.
pub fn circular_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(FULL_CIRCLE);
    d.min(FULL_CIRCLE - d)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// Bilinear resampling of a sparse polar matrix.
///
/// `values` is indexed `[radius_index, angle_index]`; cells outside its shape
/// read as `0.0`. Radii are ascending; angles are in degrees in any order.
#[derive(Clone, Debug)]
pub struct PolarInterpolator {
    angles: Vec<f64>,
    radii: Vec<f64>,
    values: Array2<f64>,
    blend: Blend,
}

impl PolarInterpolator {
    /// Treats speeds as radii and headings as angles. Rows are reordered by
    /// ascending speed.
    pub fn from_response_matrix(
        matrix: &ResponseMatrix,
    ) -> Result<Self, PolarInterpolatorBuilderError> {
        let speeds = matrix.speeds();
        let mut order: Vec<usize> = (0..speeds.len()).collect();
        order.sort_by(|&a, &b| speeds[a].total_cmp(&speeds[b]));
        let radii: Vec<f64> = order.iter().map(|&i| speeds[i]).collect();
        let values = matrix.max_roll().select(Axis(0), &order);
        PolarInterpolatorBuilder::default()
            .angles(matrix.headings())
            .radii(&radii)
            .values(&values)
            .build()
    }

    pub fn with_blend(mut self, blend: Blend) -> Self {
        self.blend = blend;
        self
    }

    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    pub fn radii(&self) -> &[f64] {
        &self.radii
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn blend(&self) -> Blend {
        self.blend
    }

    /// Ties go to the lower index. With a single stored angle both
    /// neighbours are that angle.
    pub fn angle_neighbors(&self, angle: f64) -> AngleNeighbors {
        let (nearest, nearest_distance) = self.closest_angle(angle, None);
        let (second, second_distance) = if self.angles.len() > 1 {
            self.closest_angle(angle, Some(nearest))
        } else {
            (nearest, nearest_distance)
        };
        AngleNeighbors {
            nearest,
            nearest_distance,
            second,
            second_distance,
        }
    }

    fn closest_angle(&self, angle: f64, skip: Option<usize>) -> (usize, f64) {
        let mut best = (skip.map_or(0, |s| if s == 0 { 1 } else { 0 }), f64::INFINITY);
        for (i, &stored) in self.angles.iter().enumerate() {
            if Some(i) == skip {
                continue;
            }
            let distance = circular_distance(stored, angle);
            if distance < best.1 {
                best = (i, distance);
            }
        }
        best
    }

    /// Indices of the stored radii bracketing `radius`, clamped to the first
    /// or last radius outside the stored range.
    pub fn radius_neighbors(&self, radius: f64) -> (usize, usize) {
        let last = self.radii.len() - 1;
        if radius < self.radii[0] {
            return (0, 0);
        }
        if radius > self.radii[last] {
            return (last, last);
        }
        self.radii
            .windows(2)
            .position(|pair| pair[0] <= radius && radius <= pair[1])
            .map_or((0, 0), |i| (i, i + 1))
    }

    fn cell(&self, radius_index: usize, angle_index: usize) -> f64 {
        self.values
            .get((radius_index, angle_index))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn interpolate(&self, angle: f64, radius: f64) -> f64 {
        let neighbors = self.angle_neighbors(angle);
        let (r1, r2) = self.radius_neighbors(radius);
        let (lo, hi) = (self.radii[r1], self.radii[r2]);
        let t = if hi > lo { (radius - lo) / (hi - lo) } else { 0.0 };

        let v1 = lerp(
            self.cell(r1, neighbors.nearest),
            self.cell(r2, neighbors.nearest),
            t,
        );
        let v2 = lerp(
            self.cell(r1, neighbors.second),
            self.cell(r2, neighbors.second),
            t,
        );

        match self.blend {
            Blend::Midpoint => (v1 + v2) / 2.0,
            Blend::AngleWeighted => {
                let span = neighbors.nearest_distance + neighbors.second_distance;
                if span > 0.0 {
                    (v1 * neighbors.second_distance + v2 * neighbors.nearest_distance) / span
                } else {
                    v1
                }
            }
        }
    }

    /// Output radii: `count` points evenly spaced from the smallest to the
    /// largest stored radius.
    pub fn dense_radii(&self, count: usize) -> Array1<f64> {
        let min = self.radii[0];
        let max = self.radii[self.radii.len() - 1];
        match count {
            0 => Array1::zeros(0),
            1 => Array1::from_elem(1, min),
            _ => Array1::linspace(min, max, count),
        }
    }

    pub fn densify(&self, options: &DensifyOptions) -> DenseGrid {
        let now = Instant::now();
        let step = FULL_CIRCLE / options.angle_count.max(1) as f64;
        let angles = Array1::from_shape_fn(options.angle_count, |k| k as f64 * step);
        let radii = self.dense_radii(self.radii.len() * options.radial_density);

        let mut values = Array2::<f64>::zeros((radii.len(), angles.len()));
        Zip::from(values.rows_mut())
            .and(&radii)
            .par_for_each(|mut row, &radius| {
                for (cell, &angle) in row.iter_mut().zip(angles.iter()) {
                    *cell = self.interpolate(angle, radius);
                }
            });

        debug!(
            "Densified {}x{} samples to {}x{} in {}",
            self.radii.len(),
            self.angles.len(),
            radii.len(),
            angles.len(),
            format_duration(now.elapsed())
        );
        DenseGrid::new(angles, radii, values)
    }
}

#[derive(Default)]
pub struct PolarInterpolatorBuilder<'a> {
    angles: Option<&'a [f64]>,
    radii: Option<&'a [f64]>,
    values: Option<&'a Array2<f64>>,
    blend: Option<Blend>,
}

impl<'a> PolarInterpolatorBuilder<'a> {
    pub fn build(&self) -> Result<PolarInterpolator, PolarInterpolatorBuilderError> {
        let angles = self.angles.ok_or_else(|| {
            PolarInterpolatorBuilderError::UninitializedFieldError("angles".to_string())
        })?;
        Self::validate_angles(angles)?;
        let radii = self.radii.ok_or_else(|| {
            PolarInterpolatorBuilderError::UninitializedFieldError("radii".to_string())
        })?;
        Self::validate_radii(radii)?;
        let values = self.values.ok_or_else(|| {
            PolarInterpolatorBuilderError::UninitializedFieldError("values".to_string())
        })?;
        Ok(PolarInterpolator {
            angles: angles.to_vec(),
            radii: radii.to_vec(),
            values: values.to_owned(),
            blend: self.blend.unwrap_or_default(),
        })
    }

    fn validate_angles(angles: &[f64]) -> Result<(), PolarInterpolatorBuilderError> {
        if angles.is_empty() {
            return Err(PolarInterpolatorBuilderError::EmptyAngles);
        }
        if let Some((i, &angle)) = angles.iter().enumerate().find(|(_, a)| !a.is_finite()) {
            return Err(PolarInterpolatorBuilderError::NonFiniteAngle(i, angle));
        }
        Ok(())
    }

    fn validate_radii(radii: &[f64]) -> Result<(), PolarInterpolatorBuilderError> {
        if radii.is_empty() {
            return Err(PolarInterpolatorBuilderError::EmptyRadii);
        }
        if let Some((i, &radius)) = radii.iter().enumerate().find(|(_, r)| !r.is_finite()) {
            return Err(PolarInterpolatorBuilderError::NonFiniteRadius(i, radius));
        }
        if let Some(i) = radii.windows(2).position(|pair| pair[0] > pair[1]) {
            return Err(PolarInterpolatorBuilderError::DescendingRadii(
                i,
                radii[i],
                i + 1,
                radii[i + 1],
            ));
        }
        Ok(())
    }

    pub fn angles(&mut self, angles: &'a [f64]) -> &mut Self {
        self.angles = Some(angles);
        self
    }
    pub fn radii(&mut self, radii: &'a [f64]) -> &mut Self {
        self.radii = Some(radii);
        self
    }
    pub fn values(&mut self, values: &'a Array2<f64>) -> &mut Self {
        self.values = Some(values);
        self
    }
    pub fn blend(&mut self, blend: Blend) -> &mut Self {
        self.blend = Some(blend);
        self
    }
}

/// One-shot densification of a sparse `[radius][angle]` matrix onto
/// `target_angle_count` angles and `radii.len() * radial_density_factor`
/// radii, with the default midpoint blend.
pub fn densify(
    angles: &[f64],
    radii: &[f64],
    values: &Array2<f64>,
    target_angle_count: usize,
    radial_density_factor: usize,
) -> Result<DenseGrid, PolarInterpolatorBuilderError> {
    let interpolator = PolarInterpolatorBuilder::default()
        .angles(angles)
        .radii(radii)
        .values(values)
        .build()?;
    Ok(interpolator.densify(&DensifyOptions {
        angle_count: target_angle_count,
        radial_density: radial_density_factor,
    }))
}
