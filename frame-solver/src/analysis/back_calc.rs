//! Back-calculation of internal forces from the solved displacements

use nalgebra::DMatrix;

use super::assembly::ElementStiffness;
use super::discretize::{Discretization, Element};
use super::loading::ElementLoad;
use crate::math::{self, Vec6};
use crate::results::{Displacement, GroupResult, InternalForce, Reaction};

/// Global displacements of an element's two nodes for load group `g`
pub(crate) fn element_displacements(
    element: &Element,
    displacements: &DMatrix<f64>,
    g: usize,
) -> Vec6 {
    let dofs = element.dofs();
    Vec6::from_fn(|i, _| displacements[(dofs[i], g)])
}

/// Internal forces `[N, V, M]` at both element ends
///
/// `S · (K' Rᵀ d − q')`: the displacement-implied end forces minus the
/// fixed-end baseline of the span loads.
pub(crate) fn element_internal_forces(
    stiffness: &ElementStiffness,
    load: &ElementLoad,
    global_displacements: &Vec6,
) -> Vec6 {
    let local = stiffness.rotation.transpose() * global_displacements;
    let end_forces = stiffness.condensed * local - load.condensed;
    end_forces.component_mul(&math::internal_force_signs())
}

/// Assemble per-beam results of every load group
#[allow(clippy::too_many_arguments)]
pub(crate) fn group_results(
    names: &[String],
    mesh: &Discretization,
    elements: &[ElementStiffness],
    loads: &[Vec<ElementLoad>],
    displacements: &DMatrix<f64>,
    support_reactions: Vec<Vec<Reaction>>,
    spring_reactions: Vec<Vec<Reaction>>,
) -> Vec<GroupResult> {
    names
        .iter()
        .zip(loads)
        .zip(support_reactions.into_iter().zip(spring_reactions))
        .enumerate()
        .map(|(g, ((name, group_loads), (supports, springs)))| {
            let element_forces: Vec<Vec6> = mesh
                .elements
                .iter()
                .zip(elements)
                .zip(group_loads)
                .map(|((element, stiffness), load)| {
                    let d = element_displacements(element, displacements, g);
                    element_internal_forces(stiffness, load, &d)
                })
                .collect();

            let beam_displacements = mesh
                .beams
                .iter()
                .map(|beam| {
                    beam.nodes
                        .iter()
                        .map(|&n| {
                            Displacement::new(
                                displacements[(3 * n, g)],
                                displacements[(3 * n + 1, g)],
                                displacements[(3 * n + 2, g)],
                            )
                        })
                        .collect()
                })
                .collect();

            // Left end of each element plus the right end of the last one
            let beam_forces = mesh
                .beams
                .iter()
                .map(|beam| {
                    let mut forces: Vec<InternalForce> = beam
                        .elements
                        .clone()
                        .map(|e| {
                            let f = &element_forces[e];
                            InternalForce::new(f[0], f[1], f[2])
                        })
                        .collect();
                    if let Some(last) = beam.elements.clone().last() {
                        let f = &element_forces[last];
                        forces.push(InternalForce::new(f[3], f[4], f[5]));
                    }
                    forces
                })
                .collect();

            GroupResult {
                name: name.clone(),
                displacements: beam_displacements,
                internal_forces: beam_forces,
                support_reactions: supports,
                spring_reactions: springs,
            }
        })
        .collect()
}
