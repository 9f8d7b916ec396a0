// polar-roll/src/grid/key.rs

use super::draft::DraftCategory;
use std::fmt;

/// Identifies one stored dataset. `gm`, `hs` and `tz` are multiples of 0.5
/// when produced by [`fit`](super::fit).
///
/// All derived names use a fixed `.` decimal point and exactly one fraction
/// digit; Rust formatting never consults a locale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridKey {
    pub draft_category: DraftCategory,
    pub gm: f64,
    pub hs: f64,
    pub tz: f64,
}

impl GridKey {
    pub fn new(draft_category: DraftCategory, gm: f64, hs: f64, tz: f64) -> Self {
        Self {
            draft_category,
            gm,
            hs,
            tz,
        }
    }

    /// `MAXROLL_H{hs}_T{tz}.bpolar`
    pub fn dataset_file_name(&self) -> String {
        format!("MAXROLL_H{:.1}_T{:.1}.bpolar", self.hs, self.tz)
    }

    /// `POLAR_ROLL_H{hs}_T{tz}_polarplot.gif`
    pub fn image_file_name(&self) -> String {
        format!("POLAR_ROLL_H{:.1}_T{:.1}_polarplot.gif", self.hs, self.tz)
    }

    /// `{draft}/GM={gm}m`
    pub fn gm_directory(&self) -> String {
        format!("{}/GM={:.1}m", self.draft_category, self.gm)
    }

    /// `{draft}/GM={gm}m/bin/MAXROLL_H{hs}_T{tz}.bpolar`
    pub fn storage_key(&self) -> String {
        format!("{}/bin/{}", self.gm_directory(), self.dataset_file_name())
    }

    /// `{draft}/GM={gm}m/plots/POLAR_ROLL_H{hs}_T{tz}_polarplot.gif`
    pub fn image_key(&self) -> String {
        format!("{}/plots/{}", self.gm_directory(), self.image_file_name())
    }
}

impl fmt::Display for GridKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} GM={:.1} Hs={:.1} Tz={:.1}",
            self.draft_category, self.gm, self.hs, self.tz
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_names() {
        let key = GridKey::new(DraftCategory::Design, 2.0, 10.0, 12.5);
        assert_eq!(key.dataset_file_name(), "MAXROLL_H10.0_T12.5.bpolar");
        assert_eq!(key.storage_key(), "design/GM=2.0m/bin/MAXROLL_H10.0_T12.5.bpolar");
        assert_eq!(
            key.image_key(),
            "design/GM=2.0m/plots/POLAR_ROLL_H10.0_T12.5_polarplot.gif"
        );
        assert_eq!(key.to_string(), "design GM=2.0 Hs=10.0 Tz=12.5");
    }

    #[test]
    fn test_whole_numbers_keep_one_fraction_digit() {
        let key = GridKey::new(DraftCategory::Intermediate, 1.0, 3.0, 5.0);
        assert_eq!(
            key.storage_key(),
            "intermediate/GM=1.0m/bin/MAXROLL_H3.0_T5.0.bpolar"
        );
    }
}
