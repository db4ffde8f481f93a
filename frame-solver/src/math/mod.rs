//! Mathematical utilities for 2D frame element calculations
//!
//! Element vectors are ordered `[u1, v1, θ1, u2, v2, θ2]` in the element's local
//! axes (x along the element from its start node, y rotated +90 degrees).

pub mod fixed_end;
pub mod quadrature;
pub mod sparse;

use nalgebra::{Matrix3, Matrix6, Vector6};

pub use fixed_end::{function_load_vector, linear_load_vector, point_load_vector};
pub use quadrature::{adaptive_simpson, Quadrature};
pub use sparse::{reverse_cuthill_mckee, SparseCholeskySolver, SparseMatrixBuilder};

pub type Mat3 = Matrix3<f64>;
/// 6x6 matrix for element stiffness / rotation
pub type Mat6 = Matrix6<f64>;
/// 6-element vector for element forces/displacements
pub type Vec6 = Vector6<f64>;

/// Direction cosines smaller than this are snapped to exactly zero
pub const ANGLE_TOLERANCE: f64 = 1e-12;

/// Rotational DOF of the element start / end
pub const START_ROTATION: usize = 2;
pub const END_ROTATION: usize = 5;

/// Sign flip from element end forces to internal forces (N, V, M at both ends)
pub fn internal_force_signs() -> Vec6 {
    Vec6::new(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0)
}

/// Length and orientation of a member from its projections
///
/// Members whose horizontal projection vanishes relative to their length get an
/// angle of exactly ±π/2.
pub fn member_orientation(dx: f64, dy: f64) -> (f64, f64) {
    let length = dx.hypot(dy);
    let angle = if dx.abs() <= ANGLE_TOLERANCE * length {
        if dy >= 0.0 {
            std::f64::consts::FRAC_PI_2
        } else {
            -std::f64::consts::FRAC_PI_2
        }
    } else {
        dy.atan2(dx)
    };
    (length, angle)
}

/// (cos, sin) of an angle with near-axis values snapped onto the axis
pub fn direction_cosines(angle: f64) -> (f64, f64) {
    let (mut sin, mut cos) = angle.sin_cos();
    if cos.abs() < ANGLE_TOLERANCE {
        cos = 0.0;
        sin = sin.signum();
    } else if sin.abs() < ANGLE_TOLERANCE {
        sin = 0.0;
        cos = cos.signum();
    }
    (cos, sin)
}

/// Rotation from element-local to global components
///
/// `K_global = R K_local Rᵀ`, `q_global = R q_local` and `d_local = Rᵀ d_global`.
pub fn rotation_matrix(cos: f64, sin: f64) -> Mat6 {
    let block = Mat3::new(
        cos, -sin, 0.0,
        sin, cos, 0.0,
        0.0, 0.0, 1.0,
    );
    let mut r = Mat6::zeros();
    r.fixed_view_mut::<3, 3>(0, 0).copy_from(&block);
    r.fixed_view_mut::<3, 3>(3, 3).copy_from(&block);
    r
}

/// Compute the local stiffness matrix of a 2D frame element
///
/// # Arguments
/// * `ea` - Axial stiffness
/// * `ei` - Bending stiffness
/// * `ga` - Shear stiffness, `None` for a shear-rigid (Euler-Bernoulli) element
/// * `length` - Element length
pub fn element_local_stiffness(ea: f64, ei: f64, ga: Option<f64>, length: f64) -> Mat6 {
    let l = length;
    let l2 = l * l;
    let l3 = l2 * l;

    let phi = ga.map_or(0.0, |ga| 12.0 * ei / (ga * l2));

    let ea_l = ea / l;
    let k22 = 12.0 * ei / (l3 * (1.0 + phi));
    let k23 = 6.0 * ei / (l2 * (1.0 + phi));
    let k33 = (4.0 + phi) * ei / (l * (1.0 + phi));
    let k36 = (2.0 - phi) * ei / (l * (1.0 + phi));

    #[rustfmt::skip]
    let data = [
        // Row 0: axial at start
        ea_l,   0.0,   0.0,   -ea_l,  0.0,   0.0,
        // Row 1: shear at start
        0.0,    k22,   k23,   0.0,    -k22,  k23,
        // Row 2: moment at start
        0.0,    k23,   k33,   0.0,    -k23,  k36,
        // Row 3: axial at end
        -ea_l,  0.0,   0.0,   ea_l,   0.0,   0.0,
        // Row 4: shear at end
        0.0,    -k22,  -k23,  0.0,    k22,   -k23,
        // Row 5: moment at end
        0.0,    k23,   k36,   0.0,    -k23,  k33,
    ];

    Mat6::from_row_slice(&data)
}

/// Statically condense one DOF out of an element stiffness and its load vector
///
/// `K ← K − K[:,k] K[k,:] / K[k,k]` and `q ← q − K[:,k] q[k] / K[k,k]`. The
/// condensed row and column are exactly zero afterwards.
pub fn condense_dof(k: &Mat6, q: &Vec6, dof: usize) -> (Mat6, Vec6) {
    let pivot = k[(dof, dof)];
    if pivot.abs() < f64::MIN_POSITIVE {
        return (*k, *q);
    }

    let column: Vec6 = k.column(dof).into_owned();
    let mut k_c = k - column * column.transpose() / pivot;
    let mut q_c = q - column * (q[dof] / pivot);

    for i in 0..6 {
        k_c[(dof, i)] = 0.0;
        k_c[(i, dof)] = 0.0;
    }
    q_c[dof] = 0.0;

    (k_c, q_c)
}

/// Apply end releases (start hinge, end hinge) by sequential condensation
pub fn apply_releases(k: &Mat6, q: &Vec6, releases: [bool; 2]) -> (Mat6, Vec6) {
    let mut k_c = *k;
    let mut q_c = *q;
    for (released, dof) in releases.into_iter().zip([START_ROTATION, END_ROTATION]) {
        if released {
            (k_c, q_c) = condense_dof(&k_c, &q_c, dof);
        }
    }
    (k_c, q_c)
}

/// Polynomial coefficients (powers of s) of the six element shape functions
///
/// Linear functions for the axial DOFs, cubic Hermite functions for bending.
#[rustfmt::skip]
pub fn shape_coefficients(length: f64) -> [[f64; 4]; 6] {
    let l = length;
    let l2 = l * l;
    let l3 = l2 * l;
    [
        [1.0, -1.0 / l, 0.0,       0.0],
        [1.0, 0.0,      -3.0 / l2, 2.0 / l3],
        [0.0, 1.0,      -2.0 / l,  1.0 / l2],
        [0.0, 1.0 / l,  0.0,       0.0],
        [0.0, 0.0,      3.0 / l2,  -2.0 / l3],
        [0.0, 0.0,      -1.0 / l,  1.0 / l2],
    ]
}

/// Derivative coefficients of the bending shape functions; axial entries are zero
///
/// Used to distribute moments: a moment M at `s` does work on `M · v'(s)`.
pub fn slope_coefficients(length: f64) -> [[f64; 4]; 6] {
    let mut slopes = [[0.0; 4]; 6];
    let shape = shape_coefficients(length);
    for i in [1, 2, 4, 5] {
        for k in 1..4 {
            slopes[i][k - 1] = k as f64 * shape[i][k];
        }
    }
    slopes
}

fn eval_poly(c: &[f64; 4], s: f64) -> f64 {
    c[0] + s * (c[1] + s * (c[2] + s * c[3]))
}

/// Shape function values `[N1..N6]` at distance `s` from the element start
pub fn shape_functions(s: f64, length: f64) -> Vec6 {
    let c = shape_coefficients(length);
    Vec6::from_fn(|i, _| eval_poly(&c[i], s))
}

/// Bending slope functions `[0, N2', N3', 0, N5', N6']` at `s`
pub fn shape_slopes(s: f64, length: f64) -> Vec6 {
    let c = slope_coefficients(length);
    Vec6::from_fn(|i, _| eval_poly(&c[i], s))
}
