//! Beam element - a 2D frame member between two nodes

use serde::{Deserialize, Serialize};

/// Cross-section stiffness of a beam
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionStiffness {
    /// Axial stiffness EA
    pub ea: f64,
    /// Bending stiffness EI
    pub ei: f64,
    /// Shear stiffness GA (None or zero = rigid in shear)
    #[serde(default)]
    pub ga: Option<f64>,
}

impl SectionStiffness {
    /// Create a stiffness without shear deformation
    pub fn new(ea: f64, ei: f64) -> Self {
        Self { ea, ei, ga: None }
    }

    /// Add a finite shear stiffness (Timoshenko beam)
    pub fn with_shear(mut self, ga: f64) -> Self {
        self.ga = Some(ga);
        self
    }

    /// Shear stiffness if the section deforms in shear
    pub fn shear_stiffness(&self) -> Option<f64> {
        self.ga.filter(|ga| *ga > 0.0 && ga.is_finite())
    }
}

/// Moment releases (hinges) at the ends of a beam
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[bool; 2]", into = "[bool; 2]")]
pub struct BeamReleases {
    /// Hinge at the start node
    pub start: bool,
    /// Hinge at the end node
    pub end: bool,
}

impl BeamReleases {
    /// Rigid connections at both ends
    pub fn none() -> Self {
        Self::default()
    }

    /// Hinge at the start node
    pub fn pin_start() -> Self {
        Self { start: true, end: false }
    }

    /// Hinge at the end node
    pub fn pin_end() -> Self {
        Self { start: false, end: true }
    }

    /// Hinges at both ends (pendulum / truss member)
    pub fn pin_both() -> Self {
        Self { start: true, end: true }
    }

    pub fn any(&self) -> bool {
        self.start || self.end
    }
}

impl From<[bool; 2]> for BeamReleases {
    fn from(flags: [bool; 2]) -> Self {
        Self {
            start: flags[0],
            end: flags[1],
        }
    }
}

impl From<BeamReleases> for [bool; 2] {
    fn from(releases: BeamReleases) -> Self {
        [releases.start, releases.end]
    }
}

/// A 2D frame member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    /// Index of the start node
    pub start: usize,
    /// Index of the end node
    pub end: usize,
    /// Section stiffness
    pub stiffness: SectionStiffness,
    /// End releases
    #[serde(default)]
    pub releases: BeamReleases,
}

impl Beam {
    /// Create a new beam with rigid end connections
    pub fn new(start: usize, end: usize, stiffness: SectionStiffness) -> Self {
        Self {
            start,
            end,
            stiffness,
            releases: BeamReleases::none(),
        }
    }

    /// Set beam end releases
    pub fn with_releases(mut self, releases: BeamReleases) -> Self {
        self.releases = releases;
        self
    }

    /// Whether the beam is attached to `node`
    pub fn touches(&self, node: usize) -> bool {
        self.start == node || self.end == node
    }
}
