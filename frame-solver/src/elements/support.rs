//! Support conditions: restrained degrees of freedom and elastic springs

use serde::{Deserialize, Serialize};

/// Restrained degrees of freedom at a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RestrictedDegree {
    /// Restrained node
    pub node: usize,
    /// Restrained in (possibly skewed) x translation
    #[serde(default)]
    pub x: bool,
    /// Restrained in (possibly skewed) y translation
    #[serde(default)]
    pub y: bool,
    /// Restrained in rotation
    #[serde(default)]
    pub rotation: bool,
    /// Counter-clockwise angle (radians) of the restraint axes against the global axes
    #[serde(default)]
    pub skew: Option<f64>,
}

impl RestrictedDegree {
    /// Create a restraint with explicit flags
    pub fn new(node: usize, x: bool, y: bool, rotation: bool) -> Self {
        Self {
            node,
            x,
            y,
            rotation,
            skew: None,
        }
    }

    /// Fully fixed (clamped) support
    pub fn fixed(node: usize) -> Self {
        Self::new(node, true, true, true)
    }

    /// Pinned support (translations restrained, rotation free)
    pub fn pinned(node: usize) -> Self {
        Self::new(node, true, true, false)
    }

    /// Roller restraining the y translation only
    pub fn roller_y(node: usize) -> Self {
        Self::new(node, false, true, false)
    }

    /// Roller restraining the x translation only
    pub fn roller_x(node: usize) -> Self {
        Self::new(node, true, false, false)
    }

    /// Rotate the restraint axes by `angle` (radians, counter-clockwise)
    pub fn with_skew(mut self, angle: f64) -> Self {
        self.skew = Some(angle);
        self
    }

    /// Restraint flags as [x, y, rotation]
    pub fn flags(&self) -> [bool; 3] {
        [self.x, self.y, self.rotation]
    }

    /// Skew angle if it actually rotates the x/y pair
    pub fn skew_angle(&self) -> Option<f64> {
        self.skew.filter(|angle| *angle != 0.0)
    }

    /// Merge another restraint on the same node into this one (logical OR of flags)
    pub fn merge(&mut self, other: &RestrictedDegree) {
        self.x |= other.x;
        self.y |= other.y;
        self.rotation |= other.rotation;
        if self.skew.is_none() {
            self.skew = other.skew;
        }
    }
}

/// Elastic spring support in global axes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spring {
    /// Supported node
    pub node: usize,
    /// Translational stiffness in global X
    #[serde(default)]
    pub kx: f64,
    /// Translational stiffness in global Y
    #[serde(default)]
    pub ky: f64,
    /// Rotational stiffness
    #[serde(default)]
    pub krz: f64,
}

impl Spring {
    pub fn new(node: usize, kx: f64, ky: f64, krz: f64) -> Self {
        Self { node, kx, ky, krz }
    }

    /// Stiffness values as [kx, ky, krz]
    pub fn stiffness(&self) -> [f64; 3] {
        [self.kx, self.ky, self.krz]
    }
}

/// All support conditions of a model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundaryConditions {
    #[serde(default)]
    pub restricted_degrees: Vec<RestrictedDegree>,
    #[serde(default)]
    pub springs: Vec<Spring>,
}

impl BoundaryConditions {
    pub fn new() -> Self {
        Self::default()
    }
}
