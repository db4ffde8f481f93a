//! Boundary conditions: restraint merging, release checks, skewed supports and
//! partitioning of the global system into free and restricted DOFs

use std::collections::HashMap;

use nalgebra::DMatrix;
use nalgebra_sparse::CsrMatrix;

use super::discretize::Discretization;
use crate::elements::{BeamReleases, RestrictedDegree};
use crate::math::{self, sparse, SparseMatrixBuilder};
use crate::model::Model;
use crate::results::SolveWarning;

/// Free-axis components below this fraction of the node's prescribed translation are round-off
const PRESCRIBED_TOLERANCE: f64 = 1e-9;

/// Merge restraints on the same node (OR of flags, first skew angle wins)
///
/// The result keeps the order of first appearance.
pub(crate) fn merge_restraints(
    restraints: &[RestrictedDegree],
    warnings: &mut Vec<SolveWarning>,
) -> Vec<RestrictedDegree> {
    let mut merged: Vec<RestrictedDegree> = Vec::with_capacity(restraints.len());
    let mut position: HashMap<usize, usize> = HashMap::new();

    for restraint in restraints {
        match position.get(&restraint.node) {
            Some(&i) => {
                merged[i].merge(restraint);
                let warning = SolveWarning::DuplicateRestraint { node: restraint.node };
                if !warnings.contains(&warning) {
                    warnings.push(warning);
                }
            }
            None => {
                position.insert(restraint.node, merged.len());
                merged.push(*restraint);
            }
        }
    }
    merged
}

/// Beam releases with orphaned hinges removed
///
/// A node where every attached beam end is released and whose rotation is held
/// by neither a restraint nor a rotational spring would have no rotational
/// stiffness at all. The release of the lowest-index beam end there is dropped.
pub(crate) fn resolve_orphaned_releases(
    model: &Model,
    restraints: &[RestrictedDegree],
    warnings: &mut Vec<SolveWarning>,
) -> Vec<BeamReleases> {
    let mut releases: Vec<BeamReleases> = model.beams.iter().map(|b| b.releases).collect();

    // (beam, is start) per node
    let mut ends: Vec<Vec<(usize, bool)>> = vec![Vec::new(); model.nodes.len()];
    for (b, beam) in model.beams.iter().enumerate() {
        ends[beam.start].push((b, true));
        ends[beam.end].push((b, false));
    }

    let mut rotation_held = vec![false; model.nodes.len()];
    for restraint in restraints {
        rotation_held[restraint.node] |= restraint.rotation;
    }
    for spring in &model.boundary_conditions.springs {
        rotation_held[spring.node] |= spring.krz > 0.0;
    }

    for (node, node_ends) in ends.iter().enumerate() {
        if node_ends.is_empty() || rotation_held[node] {
            continue;
        }
        let is_released = |&(b, start): &(usize, bool)| {
            if start {
                releases[b].start
            } else {
                releases[b].end
            }
        };
        if !node_ends.iter().all(is_released) {
            continue;
        }
        // Ends are pushed in beam order, so the first one has the lowest index
        let (beam, start) = node_ends[0];
        if start {
            releases[beam].start = false;
        } else {
            releases[beam].end = false;
        }
        warnings.push(SolveWarning::OrphanedRelease { node, beam });
    }

    releases
}

/// Global system split into free and restricted DOFs
///
/// Skewed restraints rotate the (x, y) pair of their node; all matrices here
/// are in those rotated axes.
pub(crate) struct ReducedSystem {
    pub dof_count: usize,
    pub free: Vec<usize>,
    pub restricted: Vec<usize>,
    pub free_map: Vec<Option<usize>>,
    pub restricted_map: Vec<Option<usize>>,
    /// (cos, sin) of skewed nodes
    pub skews: HashMap<usize, (f64, f64)>,
    pub k_ff: CsrMatrix<f64>,
    pub k_fr: CsrMatrix<f64>,
    pub k_rf: CsrMatrix<f64>,
    pub k_rr: CsrMatrix<f64>,
}

impl ReducedSystem {
    pub fn new(
        mesh: &Discretization,
        restraints: &[RestrictedDegree],
        k_global: &CsrMatrix<f64>,
    ) -> Self {
        let dof_count = mesh.dof_count();

        let mut is_restricted = vec![false; dof_count];
        let mut skews = HashMap::new();
        for restraint in restraints {
            for (i, flag) in restraint.flags().into_iter().enumerate() {
                is_restricted[3 * restraint.node + i] |= flag;
            }
            if let Some(angle) = restraint.skew_angle() {
                skews.insert(restraint.node, math::direction_cosines(angle));
            }
        }

        let mut free = Vec::new();
        let mut restricted = Vec::new();
        let mut free_map = vec![None; dof_count];
        let mut restricted_map = vec![None; dof_count];
        for dof in 0..dof_count {
            if is_restricted[dof] {
                restricted_map[dof] = Some(restricted.len());
                restricted.push(dof);
            } else {
                free_map[dof] = Some(free.len());
                free.push(dof);
            }
        }

        let mut system = Self {
            dof_count,
            free,
            restricted,
            free_map,
            restricted_map,
            skews,
            k_ff: CsrMatrix::zeros(0, 0),
            k_fr: CsrMatrix::zeros(0, 0),
            k_rf: CsrMatrix::zeros(0, 0),
            k_rr: CsrMatrix::zeros(0, 0),
        };

        let k = if system.skews.is_empty() {
            k_global.clone()
        } else {
            system.rotate_stiffness(k_global)
        };

        let (nf, nr) = (system.free.len(), system.restricted.len());
        system.k_ff = sparse::submatrix(&k, &system.free_map, nf, &system.free_map, nf);
        system.k_fr = sparse::submatrix(&k, &system.free_map, nf, &system.restricted_map, nr);
        system.k_rf = sparse::submatrix(&k, &system.restricted_map, nr, &system.free_map, nf);
        system.k_rr = sparse::submatrix(&k, &system.restricted_map, nr, &system.restricted_map, nr);

        log::debug!(
            "Partitioned system: {} free, {} restricted, {} skewed nodes",
            nf,
            nr,
            system.skews.len()
        );
        system
    }

    /// Non-zero entries `(row, T[row, dof])` of column `dof` of the rotation T
    fn rotation_column(&self, dof: usize) -> [(usize, f64); 2] {
        let node = dof / 3;
        match (self.skews.get(&node), dof % 3) {
            (Some(&(c, s)), 0) => [(dof, c), (dof + 1, -s)],
            (Some(&(c, s)), 1) => [(dof - 1, s), (dof, c)],
            _ => [(dof, 1.0), (dof, 0.0)],
        }
    }

    /// `K' = T K Tᵀ`, applied per triplet
    fn rotate_stiffness(&self, k: &CsrMatrix<f64>) -> CsrMatrix<f64> {
        let mut builder = SparseMatrixBuilder::new(self.dof_count);
        for (row, col, &val) in k.triplet_iter() {
            for (a, ta) in self.rotation_column(row) {
                for (b, tb) in self.rotation_column(col) {
                    builder.add(a, b, ta * val * tb);
                }
            }
        }
        builder.to_csr()
    }

    /// Row-wise `T m` (global to restraint axes)
    pub fn to_restraint_axes(&self, m: &DMatrix<f64>) -> DMatrix<f64> {
        self.rotate_rows(m, 1.0)
    }

    /// Row-wise `Tᵀ m` (restraint to global axes)
    pub fn to_global_axes(&self, m: &DMatrix<f64>) -> DMatrix<f64> {
        self.rotate_rows(m, -1.0)
    }

    fn rotate_rows(&self, m: &DMatrix<f64>, direction: f64) -> DMatrix<f64> {
        let mut out = m.clone();
        for (&node, &(c, s)) in &self.skews {
            let s = direction * s;
            let (x, y) = (3 * node, 3 * node + 1);
            for col in 0..m.ncols() {
                out[(x, col)] = c * m[(x, col)] + s * m[(y, col)];
                out[(y, col)] = -s * m[(x, col)] + c * m[(y, col)];
            }
        }
        out
    }

    /// Rows of `m` belonging to the given DOF list
    pub fn select_rows(m: &DMatrix<f64>, dofs: &[usize]) -> DMatrix<f64> {
        DMatrix::from_fn(dofs.len(), m.ncols(), |i, j| m[(dofs[i], j)])
    }
}

/// Prescribed displacements per load group, in restraint axes
///
/// Components on free DOFs cannot be imposed; they are dropped with a warning.
pub(crate) fn prescribed_displacements(
    model: &Model,
    mesh: &Discretization,
    system: &ReducedSystem,
    warnings: &mut Vec<SolveWarning>,
) -> DMatrix<f64> {
    let mut u0 = DMatrix::zeros(mesh.dof_count(), model.loads.len());
    for (g, group) in model.loads.iter().enumerate() {
        for displacement in &group.initial_displacements {
            for (i, value) in displacement.as_array().into_iter().enumerate() {
                u0[(3 * displacement.node + i, g)] += value;
            }
        }
    }

    // Skew rotation leaves round-off on the free axis of an exactly aligned value
    let translation = |m: &DMatrix<f64>, dof: usize, g: usize| {
        let x = 3 * (dof / 3);
        m[(x, g)].abs().max(m[(x + 1, g)].abs())
    };
    let global = u0;
    let mut u0 = system.to_restraint_axes(&global);
    for &dof in &system.free {
        for g in 0..u0.ncols() {
            let noise = if dof % 3 < 2 {
                PRESCRIBED_TOLERANCE * translation(&global, dof, g)
            } else {
                0.0
            };
            if u0[(dof, g)].abs() > noise {
                warnings.push(SolveWarning::IgnoredInitialDisplacement {
                    group: g,
                    node: dof / 3,
                    dof: dof % 3,
                });
            }
            u0[(dof, g)] = 0.0;
        }
    }
    u0
}
