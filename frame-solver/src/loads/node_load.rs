//! Nodal loads - forces and moments applied directly to nodes

use serde::{Deserialize, Serialize};

/// A load applied directly to a node, in global axes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodalLoad {
    /// Loaded node
    pub node: usize,
    /// Force in global X direction
    #[serde(default)]
    pub fx: f64,
    /// Force in global Y direction
    #[serde(default)]
    pub fy: f64,
    /// Moment about Z (counter-clockwise positive)
    #[serde(default)]
    pub mz: f64,
}

impl NodalLoad {
    pub fn new(node: usize, fx: f64, fy: f64, mz: f64) -> Self {
        Self { node, fx, fy, mz }
    }

    /// Force-only nodal load
    pub fn force(node: usize, fx: f64, fy: f64) -> Self {
        Self::new(node, fx, fy, 0.0)
    }

    /// Moment-only nodal load
    pub fn moment(node: usize, mz: f64) -> Self {
        Self::new(node, 0.0, 0.0, mz)
    }

    /// Get the load as an array [FX, FY, MZ]
    pub fn as_array(&self) -> [f64; 3] {
        [self.fx, self.fy, self.mz]
    }
}
