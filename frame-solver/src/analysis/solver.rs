//! Batched linear solve over all load groups and reaction recovery

use nalgebra::DMatrix;

use super::boundary::ReducedSystem;
use crate::elements::{RestrictedDegree, Spring};
use crate::error::{FrameError, FrameResult};
use crate::math::sparse::{self, SparseCholeskySolver};
use crate::results::Reaction;

const DOF_NAMES: [&str; 3] = ["x translation", "y translation", "rotation"];

/// Displacements and restricted-DOF reactions of every load group
pub(crate) struct SolvedSystem {
    /// Global displacements, one column per load group
    pub displacements: DMatrix<f64>,
    /// Reactions on restricted DOFs in restraint axes
    pub reactions: DMatrix<f64>,
}

/// Solve `K'_ff D'_f = F'_f − K'_fr U'_r` for all columns with one factorization
pub(crate) fn solve(
    system: &ReducedSystem,
    forces: &DMatrix<f64>,
    prescribed: &DMatrix<f64>,
    pivot_tolerance: f64,
) -> FrameResult<SolvedSystem> {
    let groups = forces.ncols();
    let forces = system.to_restraint_axes(forces);
    let f_f = ReducedSystem::select_rows(&forces, &system.free);
    let f_r = ReducedSystem::select_rows(&forces, &system.restricted);
    let u_r = ReducedSystem::select_rows(prescribed, &system.restricted);

    let d_f = if system.free.is_empty() {
        DMatrix::zeros(0, groups)
    } else {
        let rhs = f_f - sparse::sparse_matmul(&system.k_fr, &u_r);
        factor_and_solve(system, &rhs, pivot_tolerance)?
    };

    // Full displacement vector in restraint axes, then back to global axes
    let mut d = DMatrix::zeros(system.dof_count, groups);
    for (i, &dof) in system.free.iter().enumerate() {
        d.row_mut(dof).copy_from(&d_f.row(i));
    }
    for (i, &dof) in system.restricted.iter().enumerate() {
        d.row_mut(dof).copy_from(&u_r.row(i));
    }
    let displacements = system.to_global_axes(&d);

    if let Some(index) = displacements.iter().position(|v| !v.is_finite()) {
        let dof = index % system.dof_count;
        return Err(instability(dof, "non-finite displacement"));
    }

    let reactions =
        sparse::sparse_matmul(&system.k_rf, &d_f) + sparse::sparse_matmul(&system.k_rr, &u_r) - f_r;

    Ok(SolvedSystem {
        displacements,
        reactions,
    })
}

fn factor_and_solve(
    system: &ReducedSystem,
    rhs: &DMatrix<f64>,
    pivot_tolerance: f64,
) -> FrameResult<DMatrix<f64>> {
    let perm = sparse::reverse_cuthill_mckee(&system.k_ff);
    let permuted = sparse::permute_symmetric(&system.k_ff, &perm);

    let mut cholesky = SparseCholeskySolver::new(&permuted);
    log::debug!(
        "Factorizing {} equations (profile {})",
        cholesky.size(),
        cholesky.profile()
    );
    cholesky.factorize(pivot_tolerance).map_err(|failure| {
        let dof = system.free[perm[failure.index]];
        instability(dof, &format!("pivot {:.3e}", failure.pivot))
    })?;

    let rhs_perm = DMatrix::from_fn(rhs.nrows(), rhs.ncols(), |i, j| rhs[(perm[i], j)]);
    let x_perm = cholesky.solve_many(&rhs_perm);

    let mut x = DMatrix::zeros(rhs.nrows(), rhs.ncols());
    for (i, &old) in perm.iter().enumerate() {
        x.row_mut(old).copy_from(&x_perm.row(i));
    }
    Ok(x)
}

fn instability(dof: usize, detail: &str) -> FrameError {
    FrameError::KinematicInstability(format!(
        "node {} is not held in {} ({})",
        dof / 3,
        DOF_NAMES[dof % 3],
        detail
    ))
}

fn round_to(value: f64, decimals: Option<u32>) -> f64 {
    match decimals {
        Some(d) => {
            let factor = 10f64.powi(d as i32);
            let rounded = (value * factor).round() / factor;
            // Avoid -0.0 in the output
            if rounded == 0.0 {
                0.0
            } else {
                rounded
            }
        }
        None => value,
    }
}

/// Support reactions per load group, parallel to the merged restraints
pub(crate) fn support_reactions(
    system: &ReducedSystem,
    restraints: &[RestrictedDegree],
    solved: &SolvedSystem,
    decimals: Option<u32>,
) -> Vec<Vec<Reaction>> {
    (0..solved.reactions.ncols())
        .map(|g| {
            restraints
                .iter()
                .map(|restraint| {
                    let mut values = [0.0; 3];
                    for (i, value) in values.iter_mut().enumerate() {
                        if let Some(r) = system.restricted_map[3 * restraint.node + i] {
                            *value = solved.reactions[(r, g)];
                        }
                    }
                    if let Some(&(c, s)) = system.skews.get(&restraint.node) {
                        let [rx, ry, _] = values;
                        values[0] = c * rx - s * ry;
                        values[1] = s * rx + c * ry;
                    }
                    Reaction::new(restraint.node, values.map(|v| round_to(v, decimals)))
                })
                .collect()
        })
        .collect()
}

/// Spring reactions per load group: `−k · d` in global axes, rounded like support reactions
pub(crate) fn spring_reactions(
    springs: &[Spring],
    displacements: &DMatrix<f64>,
    decimals: Option<u32>,
) -> Vec<Vec<Reaction>> {
    (0..displacements.ncols())
        .map(|g| {
            springs
                .iter()
                .map(|spring| {
                    let k = spring.stiffness();
                    let values = [0, 1, 2].map(|i| {
                        round_to(-k[i] * displacements[(3 * spring.node + i, g)], decimals)
                    });
                    Reaction::new(spring.node, values)
                })
                .collect()
        })
        .collect()
}
