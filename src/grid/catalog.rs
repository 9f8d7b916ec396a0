// polar-roll/src/grid/catalog.rs

use super::fitter::GRID_STEP;
use super::key::GridKey;

/// Parameter values for which datasets are stored, per draft category.
#[derive(Clone, Debug, PartialEq)]
pub struct GridCatalog {
    pub gm: Vec<f64>,
    pub hs: Vec<f64>,
    pub tz: Vec<f64>,
}

impl GridCatalog {
    pub fn new(gm: Vec<f64>, hs: Vec<f64>, tz: Vec<f64>) -> Self {
        Self { gm, hs, tz }
    }

    pub fn contains(&self, key: &GridKey) -> bool {
        self.gm.contains(&key.gm) && self.hs.contains(&key.hs) && self.tz.contains(&key.tz)
    }

    pub fn len(&self) -> usize {
        self.gm.len() * self.hs.len() * self.tz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for GridCatalog {
    fn default() -> Self {
        Self::new(
            vec![1.0, 1.5, 2.0],
            half_steps(3.0, 12.0),
            half_steps(5.0, 18.0),
        )
    }
}

/// Every multiple of 0.5 in `[lower, upper]`.
pub fn half_steps(lower: f64, upper: f64) -> Vec<f64> {
    let first = (lower / GRID_STEP).ceil() as i64;
    let last = (upper / GRID_STEP).floor() as i64;
    (first..=last).map(|k| k as f64 * GRID_STEP).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::DraftCategory;

    #[test]
    fn test_default_catalog() {
        let catalog = GridCatalog::default();
        assert_eq!(catalog.gm, vec![1.0, 1.5, 2.0]);
        assert_eq!(catalog.hs.len(), 19);
        assert_eq!(catalog.hs.first(), Some(&3.0));
        assert_eq!(catalog.hs.last(), Some(&12.0));
        assert_eq!(catalog.tz.len(), 27);
        assert_eq!(catalog.tz.last(), Some(&18.0));
        assert_eq!(catalog.len(), 3 * 19 * 27);
    }

    #[test]
    fn test_half_steps_inside_unaligned_bounds() {
        assert_eq!(half_steps(0.7, 2.2), vec![1.0, 1.5, 2.0]);
        assert!(half_steps(2.1, 2.2).is_empty());
    }

    #[test]
    fn test_catalog_contains() {
        let catalog = GridCatalog::default();
        assert!(catalog.contains(&GridKey::new(DraftCategory::Design, 1.5, 5.5, 7.5)));
        assert!(!catalog.contains(&GridKey::new(DraftCategory::Design, 2.5, 5.5, 7.5)));
        assert!(!catalog.contains(&GridKey::new(DraftCategory::Design, 1.5, 12.5, 7.5)));
    }
}
