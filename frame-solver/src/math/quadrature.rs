//! Adaptive Simpson quadrature for vector-valued integrands

use nalgebra::SVector;
use serde::{Deserialize, Serialize};

/// Settings of the adaptive quadrature used for functional loads
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quadrature {
    /// Tolerance relative to the magnitude of the integral
    pub tolerance: f64,
    /// Maximum bisection depth
    pub max_depth: u32,
}

impl Default for Quadrature {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_depth: 24,
        }
    }
}

/// Bisections performed regardless of the error estimate
const MIN_DEPTH: u32 = 3;

/// Integrate `f` over `[a, b]` component by component
pub fn adaptive_simpson<const D: usize, F>(
    f: &F,
    a: f64,
    b: f64,
    settings: &Quadrature,
) -> SVector<f64, D>
where
    F: Fn(f64) -> SVector<f64, D>,
{
    if b <= a {
        return SVector::zeros();
    }
    let fa = f(a);
    let fb = f(b);
    let m = 0.5 * (a + b);
    let fm = f(m);
    let whole = simpson(a, b, &fa, &fm, &fb);
    let tol = settings.tolerance * (1.0 + whole.amax());
    refine(f, a, b, fa, fm, fb, whole, tol, settings.max_depth, 0)
}

fn simpson<const D: usize>(
    a: f64,
    b: f64,
    fa: &SVector<f64, D>,
    fm: &SVector<f64, D>,
    fb: &SVector<f64, D>,
) -> SVector<f64, D> {
    (fa + fm * 4.0 + fb) * ((b - a) / 6.0)
}

#[allow(clippy::too_many_arguments)]
fn refine<const D: usize, F>(
    f: &F,
    a: f64,
    b: f64,
    fa: SVector<f64, D>,
    fm: SVector<f64, D>,
    fb: SVector<f64, D>,
    whole: SVector<f64, D>,
    tol: f64,
    max_depth: u32,
    depth: u32,
) -> SVector<f64, D>
where
    F: Fn(f64) -> SVector<f64, D>,
{
    let m = 0.5 * (a + b);
    let lm = 0.5 * (a + m);
    let rm = 0.5 * (m + b);
    let flm = f(lm);
    let frm = f(rm);
    let left = simpson(a, m, &fa, &flm, &fm);
    let right = simpson(m, b, &fm, &frm, &fb);
    let delta = left + right - whole;

    if depth >= max_depth || (depth >= MIN_DEPTH && delta.amax() <= 15.0 * tol) {
        return left + right + delta / 15.0;
    }

    refine(f, a, m, fa, flm, fm, left, 0.5 * tol, max_depth, depth + 1)
        + refine(f, m, b, fm, frm, fb, right, 0.5 * tol, max_depth, depth + 1)
}
