//! Point loads on beams

use serde::{Deserialize, Serialize};

/// Axis system a beam load is expressed in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadAxes {
    /// Beam axes: x along the beam, y rotated +90 degrees from it
    #[default]
    Local,
    /// Global X/Y axes
    Global,
}

impl LoadAxes {
    /// Convert an (x, y) pair given in these axes to beam-local components
    pub fn to_local(self, fx: f64, fy: f64, cos: f64, sin: f64) -> (f64, f64) {
        match self {
            LoadAxes::Local => (fx, fy),
            LoadAxes::Global => (cos * fx + sin * fy, -sin * fx + cos * fy),
        }
    }
}

/// A concentrated force/moment on a beam
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLoad {
    /// Loaded beam
    pub beam: usize,
    /// Distance from the beam start (negative = measured from the beam end)
    pub distance: f64,
    #[serde(default)]
    pub fx: f64,
    #[serde(default)]
    pub fy: f64,
    #[serde(default)]
    pub mz: f64,
    #[serde(default)]
    pub axes: LoadAxes,
}

impl PointLoad {
    /// Create a new point load in beam-local axes
    pub fn new(beam: usize, distance: f64, fx: f64, fy: f64, mz: f64) -> Self {
        Self {
            beam,
            distance,
            fx,
            fy,
            mz,
            axes: LoadAxes::Local,
        }
    }

    /// Transverse force in beam-local y
    pub fn transverse(beam: usize, distance: f64, fy: f64) -> Self {
        Self::new(beam, distance, 0.0, fy, 0.0)
    }

    /// Concentrated moment
    pub fn moment(beam: usize, distance: f64, mz: f64) -> Self {
        Self::new(beam, distance, 0.0, 0.0, mz)
    }

    /// Express the force components in global axes
    pub fn in_global_axes(mut self) -> Self {
        self.axes = LoadAxes::Global;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_global_to_local_on_vertical_beam() {
        // Beam pointing up: local x = global Y, local y = -global X
        let (lx, ly) = LoadAxes::Global.to_local(0.0, -10.0, 0.0, 1.0);
        assert_relative_eq!(lx, -10.0);
        assert_relative_eq!(ly, 0.0);

        let (lx, ly) = LoadAxes::Global.to_local(5.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(lx, 0.0);
        assert_relative_eq!(ly, -5.0);
    }

    #[test]
    fn test_local_is_identity() {
        assert_eq!(LoadAxes::Local.to_local(1.0, 2.0, 0.6, 0.8), (1.0, 2.0));
    }
}
