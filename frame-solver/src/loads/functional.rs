//! Distributed loads given as arbitrary functions of the position along a beam

use std::fmt;
use std::sync::Arc;

use super::point_load::LoadAxes;

/// Load intensity as a function of the distance from the beam start
pub type LoadFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// A distributed load with arbitrary intensity functions
///
/// Functional loads are code-only: closures cannot be serialized, so they are
/// skipped by the JSON bundle.
#[derive(Clone)]
pub struct FunctionalLoad {
    pub beam: usize,
    /// Start position (distance from beam start; negative = from beam end)
    pub from: f64,
    /// End position (negative = from beam end; 0 = beam end)
    pub to: f64,
    pub qx: Option<LoadFn>,
    pub qy: Option<LoadFn>,
    pub mz: Option<LoadFn>,
    pub axes: LoadAxes,
}

impl FunctionalLoad {
    /// Create an empty functional load over [from, to]
    pub fn new(beam: usize, from: f64, to: f64) -> Self {
        Self {
            beam,
            from,
            to,
            qx: None,
            qy: None,
            mz: None,
            axes: LoadAxes::Local,
        }
    }

    pub fn with_qx(mut self, f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        self.qx = Some(Arc::new(f));
        self
    }

    pub fn with_qy(mut self, f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        self.qy = Some(Arc::new(f));
        self
    }

    pub fn with_mz(mut self, f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        self.mz = Some(Arc::new(f));
        self
    }

    /// Express the force intensities in global axes
    pub fn in_global_axes(mut self) -> Self {
        self.axes = LoadAxes::Global;
        self
    }

    /// Intensities [qx, qy, mz] at a distance from the beam start, in the load's own axes
    pub fn intensity(&self, x: f64) -> [f64; 3] {
        let eval = |f: &Option<LoadFn>| f.as_ref().map_or(0.0, |f| f(x));
        [eval(&self.qx), eval(&self.qy), eval(&self.mz)]
    }
}

impl fmt::Debug for FunctionalLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionalLoad")
            .field("beam", &self.beam)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("qx", &self.qx.is_some())
            .field("qy", &self.qy.is_some())
            .field("mz", &self.mz.is_some())
            .field("axes", &self.axes)
            .finish()
    }
}
