//! Consistent (work-equivalent) nodal loads of element span loads
//!
//! All vectors are in element-local axes and follow `q = ∫ Nᵀ p ds`; they are
//! positive in the direction of the load. Load intensities are given as
//! `[qx, qy, mz]` (axial, transverse, distributed moment).

use super::quadrature::{adaptive_simpson, Quadrature};
use super::{shape_coefficients, shape_functions, shape_slopes, slope_coefficients, Vec6};

/// Spans shorter than this fraction of the element length carry no load
const SPAN_TOLERANCE: f64 = 1e-12;

/// Compute the equivalent nodal loads of a point load
///
/// # Arguments
/// * `length` - Element length
/// * `a` - Distance from the element start
/// * `load` - `[Px, Py, Mz]` in local axes
pub fn point_load_vector(length: f64, a: f64, load: [f64; 3]) -> Vec6 {
    let [px, py, mz] = load;
    let n = shape_functions(a, length);
    let dn = shape_slopes(a, length);

    Vec6::new(
        px * n[0],
        py * n[1] + mz * dn[1],
        py * n[2] + mz * dn[2],
        px * n[3],
        py * n[4] + mz * dn[4],
        py * n[5] + mz * dn[5],
    )
}

/// Compute the equivalent nodal loads of a linearly varying load over `[a, b]`
///
/// A load covering the full element uses the closed-form expressions; partial
/// coverage integrates the shape-function polynomials exactly.
pub fn linear_load_vector(length: f64, a: f64, b: f64, start: [f64; 3], end: [f64; 3]) -> Vec6 {
    if b - a <= SPAN_TOLERANCE * length {
        return Vec6::zeros();
    }
    if a <= SPAN_TOLERANCE * length && b >= length * (1.0 - SPAN_TOLERANCE) {
        return full_span_vector(length, start, end);
    }

    let shape = shape_coefficients(length);
    let slope = slope_coefficients(length);
    let mut q = Vec6::zeros();
    for (component, coefficients) in [(0, &shape), (1, &shape), (2, &slope)] {
        // p(s) = p0 + p1 * s
        let p1 = (end[component] - start[component]) / (b - a);
        let p0 = start[component] - p1 * a;
        if p0 == 0.0 && p1 == 0.0 {
            continue;
        }
        for &i in affected_dofs(component) {
            q[i] += integrate_linear_times_cubic(p0, p1, &coefficients[i], a, b);
        }
    }
    q
}

/// Closed-form equivalent loads of a linear load over the whole element
fn full_span_vector(length: f64, start: [f64; 3], end: [f64; 3]) -> Vec6 {
    let l = length;
    let l2 = l * l;
    let [xa, ya, ma] = start;
    let [xb, yb, mb] = end;

    Vec6::new(
        l * (2.0 * xa + xb) / 6.0,
        l * (7.0 * ya + 3.0 * yb) / 20.0 - (ma + mb) / 2.0,
        l2 * (3.0 * ya + 2.0 * yb) / 60.0 + l * (ma - mb) / 12.0,
        l * (xa + 2.0 * xb) / 6.0,
        l * (3.0 * ya + 7.0 * yb) / 20.0 + (ma + mb) / 2.0,
        -l2 * (2.0 * ya + 3.0 * yb) / 60.0 + l * (mb - ma) / 12.0,
    )
}

/// DOFs receiving work from load component 0 (axial), 1 (transverse) or 2 (moment)
fn affected_dofs(component: usize) -> &'static [usize] {
    match component {
        0 => &[0, 3],
        _ => &[1, 2, 4, 5],
    }
}

/// ∫ₐᵇ (p0 + p1 s) · Σ c_k s^k ds
fn integrate_linear_times_cubic(p0: f64, p1: f64, c: &[f64; 4], a: f64, b: f64) -> f64 {
    let antiderivative = |s: f64| {
        let mut sum = 0.0;
        let mut power = s;
        for (k, ck) in c.iter().enumerate() {
            let k = k as f64;
            sum += ck * (p0 * power / (k + 1.0) + p1 * power * s / (k + 2.0));
            power *= s;
        }
        sum
    };
    antiderivative(b) - antiderivative(a)
}

/// Compute the equivalent nodal loads of arbitrary intensities over `[a, b]`
///
/// `intensity` receives the distance from the element start and returns
/// `[qx, qy, mz]` in local axes.
pub fn function_load_vector<F>(
    length: f64,
    a: f64,
    b: f64,
    intensity: F,
    settings: &Quadrature,
) -> Vec6
where
    F: Fn(f64) -> [f64; 3],
{
    if b - a <= SPAN_TOLERANCE * length {
        return Vec6::zeros();
    }
    let integrand = |s: f64| {
        let [qx, qy, mz] = intensity(s);
        let n = shape_functions(s, length);
        let dn = shape_slopes(s, length);
        Vec6::new(
            qx * n[0],
            qy * n[1] + mz * dn[1],
            qy * n[2] + mz * dn[2],
            qx * n[3],
            qy * n[4] + mz * dn[4],
            qy * n[5] + mz * dn[5],
        )
    };
    adaptive_simpson(&integrand, a, b, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_load_fixed_end_values() {
        let (w, l) = (-3.0, 4.0);
        let q = linear_load_vector(l, 0.0, l, [0.0, w, 0.0], [0.0, w, 0.0]);
        assert_relative_eq!(q[1], w * l / 2.0);
        assert_relative_eq!(q[2], w * l * l / 12.0);
        assert_relative_eq!(q[4], w * l / 2.0);
        assert_relative_eq!(q[5], -w * l * l / 12.0);
    }

    #[test]
    fn test_closed_form_matches_exact_integration() {
        let l = 3.0;
        let start = [1.5, -2.0, 0.7];
        let end = [-0.5, 4.0, -1.1];
        let closed = full_span_vector(l, start, end);

        // Integrate the full span as two partial pieces
        let mid = [
            0.5 * (start[0] + end[0]),
            0.5 * (start[1] + end[1]),
            0.5 * (start[2] + end[2]),
        ];
        let pieces =
            linear_load_vector(l, 0.0, 1.5, start, mid) + linear_load_vector(l, 1.5, 3.0, mid, end);
        assert_relative_eq!(closed, pieces, epsilon = 1e-12);
    }

    #[test]
    fn test_point_load_at_midspan() {
        let (p, l) = (10.0, 2.0);
        let q = point_load_vector(l, 1.0, [0.0, p, 0.0]);
        assert_relative_eq!(q[1], p / 2.0);
        assert_relative_eq!(q[2], p * l / 8.0);
        assert_relative_eq!(q[5], -p * l / 8.0);
    }

    #[test]
    fn test_point_moment_at_end_goes_to_rotation() {
        let q = point_load_vector(2.0, 2.0, [0.0, 0.0, 5.0]);
        assert_relative_eq!(q, Vec6::new(0.0, 0.0, 0.0, 0.0, 0.0, 5.0), epsilon = 1e-12);
    }

    #[test]
    fn test_function_matches_linear_load() {
        let l = 5.0;
        let linear = linear_load_vector(l, 1.0, 4.0, [0.0, -1.0, 0.0], [2.0, -4.0, 0.5]);
        let func = function_load_vector(
            l,
            1.0,
            4.0,
            |s| {
                let t = (s - 1.0) / 3.0;
                [2.0 * t, -1.0 - 3.0 * t, 0.5 * t]
            },
            &Quadrature::default(),
        );
        assert_relative_eq!(linear, func, epsilon = 1e-8);
    }
}
