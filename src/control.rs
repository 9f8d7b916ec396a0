// polar-roll/src/control.rs
//
// Control file layout (whitespace separated, blank lines ignored):
//
//   <IMO> <vessel name ...>
//   <T scantling> <T design> <T intermediate>

use crate::grid::GridKey;
use log::debug;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_CONTROL_FILE: &str = "proll.ctl";

/// Inclusive `[lower, upper]` range of one operating parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bound {
    pub lower: f64,
    pub upper: f64,
}

impl Bound {
    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParameterBound {
    pub gm: Bound,
    pub hs: Bound,
    pub tz: Bound,
}

impl ParameterBound {
    /// Bounds offered while no control file is loaded.
    pub const UNLOADED: ParameterBound = ParameterBound {
        gm: Bound::new(0.5, 5.0),
        hs: Bound::new(3.0, 12.0),
        tz: Bound::new(5.0, 18.0),
    };

    /// Bounds of the stored datasets, used once a control file is loaded.
    pub const DATASET: ParameterBound = ParameterBound {
        gm: Bound::new(1.0, 2.0),
        hs: Bound::new(3.0, 12.0),
        tz: Bound::new(5.0, 18.0),
    };

    pub fn contains(&self, key: &GridKey) -> bool {
        self.gm.contains(key.gm) && self.hs.contains(key.hs) && self.tz.contains(key.tz)
    }
}

impl Default for ParameterBound {
    fn default() -> Self {
        Self::UNLOADED
    }
}

/// Mean drafts (m) of the three stored loading conditions.
#[derive(Clone, Debug, PartialEq)]
pub struct RepresentativeDrafts {
    pub scantling: f64,
    pub design: f64,
    pub intermediate: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ControlFileData {
    pub vessel_imo: String,
    pub vessel_name: String,
    pub drafts: RepresentativeDrafts,
    pub bounds: ParameterBound,
}

impl ControlFileData {
    pub fn parse(text: &str) -> Result<Self, ControlFileError> {
        let lines: Vec<&str> = text
            .split(['\r', '\n'])
            .filter(|line| !line.trim().is_empty())
            .collect();
        if lines.len() < 2 {
            return Err(ControlFileError::MalformedControlFile(format!(
                "expected at least 2 non-empty lines, found {}",
                lines.len()
            )));
        }

        let mut identity = tokens(lines[0]);
        let vessel_imo = identity.next().unwrap_or_default().to_string();
        let vessel_name = identity.collect::<Vec<_>>().join(" ");

        let draft_tokens: Vec<&str> = tokens(lines[1]).collect();
        if draft_tokens.len() != 3 {
            return Err(ControlFileError::MalformedControlFile(format!(
                "draft line must hold 3 values (scantling, design, intermediate), found {}",
                draft_tokens.len()
            )));
        }
        let drafts = RepresentativeDrafts {
            scantling: parse_draft(draft_tokens[0], "scantling")?,
            design: parse_draft(draft_tokens[1], "design")?,
            intermediate: parse_draft(draft_tokens[2], "intermediate")?,
        };

        debug!(
            "Parsed control file for IMO {} ({}): drafts {:?}",
            vessel_imo, vessel_name, drafts
        );
        Ok(Self {
            vessel_imo,
            vessel_name,
            drafts,
            bounds: ParameterBound::DATASET,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ControlFileError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ControlFileError::NotFound(path.display().to_string()))
            }
            Err(e) => return Err(ControlFileError::ReadFailure(e)),
        };
        Self::parse(&text)
    }
}

fn tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split([' ', '\t']).filter(|token| !token.is_empty())
}

// str::parse never consults a locale: "7.5" is accepted, "7,5" is not.
fn parse_draft(token: &str, name: &str) -> Result<f64, ControlFileError> {
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ControlFileError::MalformedControlFile(format!(
            "invalid {} draft: {:?}",
            name, token
        ))),
    }
}

#[derive(Error, Debug)]
pub enum ControlFileError {
    #[error("Control file not found: {0}")]
    NotFound(String),
    #[error("Malformed control file: {0}")]
    MalformedControlFile(String),
    #[error("Error reading control file: {0}")]
    ReadFailure(#[source] io::Error),
}
