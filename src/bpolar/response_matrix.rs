// polar-roll/src/bpolar/response_matrix.rs

use super::errors::{BpolarError, MatrixDimension};
use ndarray::Array2;
use ndarray_stats::QuantileExt;

/// Maximum roll angle (degrees) as a function of vessel speed and relative
/// heading, for one fixed draft/GM/Hs/Tz combination.
///
/// `max_roll` is indexed `[speed_index, heading_index]`. Speeds and headings
/// are kept in stored order; neither is required to be sorted.
#[derive(Clone, Debug)]
pub struct ResponseMatrix {
    speeds: Vec<f64>,
    headings: Vec<f64>,
    max_roll: Array2<f64>,
    metadata: [String; 2],
    status: String,
    source_key: String,
}

impl ResponseMatrix {
    pub fn new(
        speeds: Vec<f64>,
        headings: Vec<f64>,
        max_roll: Array2<f64>,
    ) -> Result<Self, BpolarError> {
        validate_count(MatrixDimension::Speed, speeds.len())?;
        validate_count(MatrixDimension::Heading, headings.len())?;
        let (rows, cols) = max_roll.dim();
        if rows != speeds.len() || cols != headings.len() {
            return Err(BpolarError::ShapeMismatch {
                rows,
                cols,
                speeds: speeds.len(),
                headings: headings.len(),
            });
        }
        Ok(Self::from_parts(
            speeds,
            headings,
            max_roll,
            [String::new(), String::new()],
            String::new(),
            String::new(),
        ))
    }

    /// Assembles a matrix whose dimensions the caller has already checked.
    pub(crate) fn from_parts(
        speeds: Vec<f64>,
        headings: Vec<f64>,
        max_roll: Array2<f64>,
        metadata: [String; 2],
        status: String,
        source_key: String,
    ) -> Self {
        Self {
            speeds,
            headings,
            max_roll,
            metadata,
            status,
            source_key,
        }
    }

    pub fn with_metadata(mut self, first: impl Into<String>, second: impl Into<String>) -> Self {
        self.metadata = [first.into(), second.into()];
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_source_key(mut self, source_key: impl Into<String>) -> Self {
        self.source_key = source_key.into();
        self
    }

    pub fn speed_count(&self) -> usize {
        self.speeds.len()
    }

    pub fn heading_count(&self) -> usize {
        self.headings.len()
    }

    pub fn speeds(&self) -> &[f64] {
        &self.speeds
    }

    pub fn headings(&self) -> &[f64] {
        &self.headings
    }

    pub fn max_roll(&self) -> &Array2<f64> {
        &self.max_roll
    }

    pub fn roll_at(&self, speed_index: usize, heading_index: usize) -> Option<f64> {
        self.max_roll.get((speed_index, heading_index)).copied()
    }

    /// The two uninterpreted header strings preceding the dimensions.
    pub fn metadata(&self) -> &[String; 2] {
        &self.metadata
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn source_key(&self) -> &str {
        &self.source_key
    }

    /// Largest roll value in the matrix, `None` if any cell is NaN.
    pub fn peak_roll(&self) -> Option<f64> {
        self.max_roll.max().ok().copied()
    }

    pub fn speed_range(&self) -> Option<(f64, f64)> {
        finite_range(&self.speeds)
    }

    pub fn heading_range(&self) -> Option<(f64, f64)> {
        finite_range(&self.headings)
    }
}

// Floats compare by bit pattern so NaN cells equal themselves. source_key is
// provenance only and does not take part in equality.
impl PartialEq for ResponseMatrix {
    fn eq(&self, other: &Self) -> bool {
        same_bits(&self.speeds, &other.speeds)
            && same_bits(&self.headings, &other.headings)
            && self.max_roll.dim() == other.max_roll.dim()
            && self
                .max_roll
                .iter()
                .zip(other.max_roll.iter())
                .all(|(a, b)| a.to_bits() == b.to_bits())
            && self.metadata == other.metadata
            && self.status == other.status
    }
}

fn same_bits(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
}

pub(crate) fn validate_count(dimension: MatrixDimension, count: usize) -> Result<(), BpolarError> {
    let max = dimension.max_count();
    match i32::try_from(count) {
        Ok(count) if count >= 1 && count <= max => Ok(()),
        Ok(count) => Err(BpolarError::InvalidDimensions { dimension, count }),
        Err(_) => Err(BpolarError::InvalidDimensions {
            dimension,
            count: i32::MAX,
        }),
    }
}

fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_new_rejects_mismatched_shape() {
        let err = ResponseMatrix::new(vec![0.0, 5.0], vec![0.0, 90.0, 180.0], Array2::zeros((2, 2)))
            .unwrap_err();
        assert!(matches!(
            err,
            BpolarError::ShapeMismatch {
                rows: 2,
                cols: 2,
                speeds: 2,
                headings: 3
            }
        ));
    }

    #[test]
    fn test_new_rejects_out_of_range_counts() {
        let err = ResponseMatrix::new(vec![], vec![0.0], Array2::zeros((0, 1))).unwrap_err();
        assert!(matches!(
            err,
            BpolarError::InvalidDimensions {
                dimension: MatrixDimension::Speed,
                count: 0
            }
        ));

        let headings: Vec<f64> = (0..361).map(|h| h as f64).collect();
        let err = ResponseMatrix::new(vec![0.0], headings, Array2::zeros((1, 361))).unwrap_err();
        assert!(matches!(
            err,
            BpolarError::InvalidDimensions {
                dimension: MatrixDimension::Heading,
                count: 361
            }
        ));
    }

    #[test]
    fn test_equality_ignores_source_key() {
        let m = ResponseMatrix::new(vec![0.0, 10.0], vec![0.0], array![[1.0], [2.0]]).unwrap();
        let a = m.clone().with_source_key("a.bpolar");
        let b = m.with_source_key("b.bpolar");
        assert_eq!(a, b);
        assert_ne!(a, b.clone().with_status("changed"));
    }

    #[test]
    fn test_equality_with_nan_cells() {
        let m = ResponseMatrix::new(vec![0.0], vec![0.0, 90.0], array![[1.0, f64::NAN]]).unwrap();
        assert_eq!(m, m.clone());
        let other = ResponseMatrix::new(vec![0.0], vec![0.0, 90.0], array![[1.0, 2.0]]).unwrap();
        assert_ne!(m, other);
    }

    #[test]
    fn test_peak_roll_and_ranges() {
        let m = ResponseMatrix::new(
            vec![10.0, 0.0, 5.0],
            vec![90.0, 0.0],
            array![[3.0, 4.5], [1.0, 2.0], [12.25, 0.5]],
        )
        .unwrap();
        assert_eq!(m.peak_roll(), Some(12.25));
        assert_eq!(m.speed_range(), Some((0.0, 10.0)));
        assert_eq!(m.heading_range(), Some((0.0, 90.0)));
        assert_eq!(m.roll_at(2, 0), Some(12.25));
        assert_eq!(m.roll_at(3, 0), None);
    }
}
