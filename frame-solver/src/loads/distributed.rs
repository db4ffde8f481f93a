//! Linearly varying distributed loads on beams

use serde::{Deserialize, Serialize};
use super::point_load::LoadAxes;

/// Load intensities (per unit beam length) at one end of a distributed load
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LineLoad {
    #[serde(default)]
    pub qx: f64,
    #[serde(default)]
    pub qy: f64,
    #[serde(default)]
    pub mz: f64,
}

impl LineLoad {
    pub fn new(qx: f64, qy: f64, mz: f64) -> Self {
        Self { qx, qy, mz }
    }

    /// Transverse intensity only
    pub fn transverse(qy: f64) -> Self {
        Self::new(0.0, qy, 0.0)
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.qx, self.qy, self.mz]
    }

    /// Linear interpolation towards `other`
    pub fn lerp(&self, other: &LineLoad, t: f64) -> LineLoad {
        LineLoad::new(
            self.qx + (other.qx - self.qx) * t,
            self.qy + (other.qy - self.qy) * t,
            self.mz + (other.mz - self.mz) * t,
        )
    }
}

/// A distributed (line) load on part of a beam, linear between its ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributedLoad {
    /// Loaded beam
    pub beam: usize,
    /// Start position (distance from beam start; negative = from beam end)
    #[serde(default)]
    pub from: f64,
    /// End position (distance from beam start; negative = from beam end; 0 = beam end)
    #[serde(default)]
    pub to: f64,
    /// Intensities at `from`
    pub start: LineLoad,
    /// Intensities at `to`
    pub end: LineLoad,
    #[serde(default)]
    pub axes: LoadAxes,
}

impl DistributedLoad {
    /// Create a new distributed load in beam-local axes
    pub fn new(beam: usize, from: f64, to: f64, start: LineLoad, end: LineLoad) -> Self {
        Self {
            beam,
            from,
            to,
            start,
            end,
            axes: LoadAxes::Local,
        }
    }

    /// Constant intensity over the full beam length
    pub fn uniform(beam: usize, load: LineLoad) -> Self {
        Self::new(beam, 0.0, 0.0, load, load)
    }

    /// Self-weight style load: `w` per unit beam length in negative global Y
    pub fn self_weight(beam: usize, w: f64) -> Self {
        Self::uniform(beam, LineLoad::transverse(-w.abs())).in_global_axes()
    }

    /// Express the intensities in global axes
    pub fn in_global_axes(mut self) -> Self {
        self.axes = LoadAxes::Global;
        self
    }
}
