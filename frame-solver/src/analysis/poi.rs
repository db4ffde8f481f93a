//! Points of interest: displacement and internal force anywhere along a beam

use nalgebra::{DMatrix, Vector4};

use super::assembly::ElementStiffness;
use super::back_calc::{element_displacements, element_internal_forces};
use super::discretize::{BeamMesh, Discretization, Element};
use super::loading::{ElementLoad, SpanLoad};
use crate::loads::POSITION_TOLERANCE;
use crate::math::{self, adaptive_simpson, Quadrature, Vec6, END_ROTATION, START_ROTATION};
use crate::results::{Displacement, InternalForce};

/// Solved state of one load group, borrowed from a solution
pub(crate) struct GroupState<'a> {
    pub mesh: &'a Discretization,
    pub elements: &'a [ElementStiffness],
    pub loads: &'a [ElementLoad],
    pub displacements: &'a DMatrix<f64>,
    pub group: usize,
    pub quadrature: &'a Quadrature,
}

impl GroupState<'_> {
    /// Displacement and internal force at `distance` (already normalized) along `beam`
    pub fn evaluate(&self, beam: usize, distance: f64) -> (Displacement, InternalForce) {
        let mesh = &self.mesh.beams[beam];
        if let Some(k) = node_at(mesh, distance) {
            return self.nodal_state(mesh, k);
        }

        let (e, x) = mesh.locate(distance);
        let element = &self.mesh.elements[e];
        let stiffness = &self.elements[e];
        let load = &self.loads[e];
        let d_global = element_displacements(element, self.displacements, self.group);
        let ends = element_internal_forces(stiffness, load, &d_global);

        let displacement = interpolate_displacement(element, stiffness, load, &d_global, x);
        let force = self.integrate_statics(load, [ends[0], ends[1], ends[2]], x);
        (displacement, force)
    }

    /// Values exactly as reported in the per-beam results
    fn nodal_state(&self, mesh: &BeamMesh, k: usize) -> (Displacement, InternalForce) {
        let n = mesh.nodes[k];
        let g = self.group;
        let displacement = Displacement::new(
            self.displacements[(3 * n, g)],
            self.displacements[(3 * n + 1, g)],
            self.displacements[(3 * n + 2, g)],
        );

        let (e, offset) = if k < mesh.element_count() {
            (mesh.elements.start + k, 0)
        } else {
            (mesh.elements.end - 1, 3)
        };
        let element = &self.mesh.elements[e];
        let d_global = element_displacements(element, self.displacements, g);
        let f = element_internal_forces(&self.elements[e], &self.loads[e], &d_global);
        (
            displacement,
            InternalForce::new(f[offset], f[offset + 1], f[offset + 2]),
        )
    }

    /// Statics from the element's left end:
    /// `N = N0 − ΣPx − ∫qx`, `V = V0 + ΣPy + ∫qy`,
    /// `M = M0 + V0·x + Σ[(x − a)·Py − Mz] + ∫(x − s)·qy ds − ∫mz ds`
    fn integrate_statics(&self, load: &ElementLoad, start: [f64; 3], x: f64) -> InternalForce {
        let [n0, v0, m0] = start;
        let mut axial = 0.0;
        let mut shear = 0.0;
        let mut moment = 0.0;

        for span in &load.spans {
            let [a, s, m] = span_resultants(span, x, self.quadrature);
            axial += a;
            shear += s;
            moment += m;
        }

        InternalForce::new(n0 - axial, v0 + shear, m0 + v0 * x + moment)
    }
}

/// Index along the beam of the node at `distance`, if any
fn node_at(mesh: &BeamMesh, distance: f64) -> Option<usize> {
    let h = mesh.element_length;
    let k = (distance / h).round();
    ((distance - k * h).abs() <= POSITION_TOLERANCE * h)
        .then(|| (k as usize).min(mesh.element_count()))
}

/// Contributions of one span load to (ΣPx + ∫qx, ΣPy + ∫qy, moment terms) up to `x`
fn span_resultants(span: &SpanLoad, x: f64, quadrature: &Quadrature) -> [f64; 3] {
    match span {
        SpanLoad::Point { at, load } => {
            if *at < x {
                let [px, py, mz] = *load;
                [px, py, (x - at) * py - mz]
            } else {
                [0.0; 3]
            }
        }
        SpanLoad::Linear { from, to, start, end } => {
            let upper = x.min(*to);
            if upper <= *from {
                return [0.0; 3];
            }
            let (a, u) = (*from, upper);
            // ∫ p and ∫ s·p over [a, u] for p(s) = p0 + p1·s
            let integrals = |i: usize| {
                let p1 = (end[i] - start[i]) / (to - from);
                let p0 = start[i] - p1 * a;
                let i0 = p0 * (u - a) + p1 * (u * u - a * a) / 2.0;
                let i1 = p0 * (u * u - a * a) / 2.0 + p1 * (u * u * u - a * a * a) / 3.0;
                (i0, i1)
            };
            let (qx, _) = integrals(0);
            let (qy, sqy) = integrals(1);
            let (mz, _) = integrals(2);
            [qx, qy, x * qy - sqy - mz]
        }
        SpanLoad::Function(function) => {
            let upper = x.min(function.to);
            if upper <= function.from {
                return [0.0; 3];
            }
            let integrand = |s: f64| {
                let [qx, qy, mz] = function.intensity(s);
                Vector4::new(qx, qy, (x - s) * qy, mz)
            };
            let r = adaptive_simpson(&integrand, function.from, upper, quadrature);
            [r[0], r[1], r[2] - r[3]]
        }
    }
}

/// Hermite interpolation of the element displacements at `x`, in global axes
///
/// Rotations at released ends are not the node rotations; they are recovered
/// from the uncondensed element equations `K_rr θ_r = q_r − K_rf d_f`.
fn interpolate_displacement(
    element: &Element,
    stiffness: &ElementStiffness,
    load: &ElementLoad,
    d_global: &Vec6,
    x: f64,
) -> Displacement {
    let mut d = stiffness.rotation.transpose() * d_global;
    recover_released_rotations(stiffness, load, &mut d);

    let n = math::shape_functions(x, element.length);
    let dn = math::shape_slopes(x, element.length);
    let u = n[0] * d[0] + n[3] * d[3];
    let v = n[1] * d[1] + n[2] * d[2] + n[4] * d[4] + n[5] * d[5];
    let theta = dn[1] * d[1] + dn[2] * d[2] + dn[4] * d[4] + dn[5] * d[5];

    Displacement::new(
        element.cos * u - element.sin * v,
        element.sin * u + element.cos * v,
        theta,
    )
}

fn recover_released_rotations(stiffness: &ElementStiffness, load: &ElementLoad, d: &mut Vec6) {
    let released: Vec<usize> = [START_ROTATION, END_ROTATION]
        .into_iter()
        .zip(stiffness.releases)
        .filter_map(|(dof, r)| r.then_some(dof))
        .collect();
    if released.is_empty() {
        return;
    }

    let k = &stiffness.local;
    let q = &load.fixed_end;
    let rhs = |r: usize| {
        let coupled: f64 = (0..6)
            .filter(|j| !released.contains(j))
            .map(|j| k[(r, j)] * d[j])
            .sum();
        q[r] - coupled
    };

    match released.as_slice() {
        [r] => {
            d[*r] = rhs(*r) / k[(*r, *r)];
        }
        [r1, r2] => {
            let (b1, b2) = (rhs(*r1), rhs(*r2));
            let (a11, a12, a22) = (k[(*r1, *r1)], k[(*r1, *r2)], k[(*r2, *r2)]);
            let det = a11 * a22 - a12 * a12;
            d[*r1] = (b1 * a22 - a12 * b2) / det;
            d[*r2] = (a11 * b2 - a12 * b1) / det;
        }
        _ => {}
    }
}
