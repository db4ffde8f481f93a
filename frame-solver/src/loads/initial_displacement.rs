//! Prescribed (initial) nodal displacements, e.g. support settlements

use serde::{Deserialize, Serialize};

/// A prescribed displacement of a node in global axes
///
/// Only components acting on restrained degrees of freedom change the
/// solution; the others are reported as ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialDisplacement {
    pub node: usize,
    #[serde(default)]
    pub dx: f64,
    #[serde(default)]
    pub dy: f64,
    #[serde(default)]
    pub drz: f64,
}

impl InitialDisplacement {
    pub fn new(node: usize, dx: f64, dy: f64, drz: f64) -> Self {
        Self { node, dx, dy, drz }
    }

    /// Pure translation of a node
    pub fn translation(node: usize, dx: f64, dy: f64) -> Self {
        Self::new(node, dx, dy, 0.0)
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.dx, self.dy, self.drz]
    }
}
