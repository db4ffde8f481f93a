//! Solved state of a model: per-group results, warnings and point queries

use nalgebra::DMatrix;

use crate::analysis::poi::GroupState;
use crate::analysis::{Discretization, ElementLoad, ElementStiffness};
use crate::elements::RestrictedDegree;
use crate::error::{FrameError, FrameResult};
use crate::loads::{normalize_position, Combination, CombinationCache};
use crate::math::Quadrature;
use crate::results::{GroupResult, PointResult, SolveWarning};

/// Result of one `Model::solve` call
///
/// Owns the per-group results plus the discretized state needed to evaluate
/// points of interest and load combinations after the solve.
pub struct Solution {
    groups: Vec<GroupResult>,
    warnings: Vec<SolveWarning>,
    restraints: Vec<RestrictedDegree>,
    mesh: Discretization,
    elements: Vec<ElementStiffness>,
    element_loads: Vec<Vec<ElementLoad>>,
    displacements: DMatrix<f64>,
    quadrature: Quadrature,
    combinations: CombinationCache,
}

impl Solution {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        groups: Vec<GroupResult>,
        warnings: Vec<SolveWarning>,
        restraints: Vec<RestrictedDegree>,
        mesh: Discretization,
        elements: Vec<ElementStiffness>,
        element_loads: Vec<Vec<ElementLoad>>,
        displacements: DMatrix<f64>,
        quadrature: Quadrature,
    ) -> Self {
        Self {
            groups,
            warnings,
            restraints,
            mesh,
            elements,
            element_loads,
            displacements,
            quadrature,
            combinations: CombinationCache::new(),
        }
    }

    /// Results of every load group, in model order
    pub fn groups(&self) -> &[GroupResult] {
        &self.groups
    }

    /// Results of the named load group
    pub fn group(&self, name: &str) -> FrameResult<&GroupResult> {
        self.groups
            .iter()
            .find(|g| g.name == name)
            .ok_or_else(|| FrameError::UnknownLoadGroup(name.to_string()))
    }

    /// Recoverable conditions found while solving
    pub fn warnings(&self) -> &[SolveWarning] {
        &self.warnings
    }

    /// Merged restraints; support reactions are parallel to these
    pub fn restraints(&self) -> &[RestrictedDegree] {
        &self.restraints
    }

    /// Number of nodes after discretization
    pub fn node_count(&self) -> usize {
        self.mesh.nodes.len()
    }

    /// Number of elements after discretization
    pub fn element_count(&self) -> usize {
        self.mesh.elements.len()
    }

    /// Displacement and internal force at `distance` along `beam` for a load group
    ///
    /// Negative distances are measured from the beam end.
    pub fn point(&self, group: &str, beam: usize, distance: f64) -> FrameResult<PointResult> {
        let g = self
            .groups
            .iter()
            .position(|r| r.name == group)
            .ok_or_else(|| FrameError::UnknownLoadGroup(group.to_string()))?;
        let beam_mesh = self.mesh.beams.get(beam).ok_or_else(|| {
            FrameError::InvalidQuery(format!(
                "beam {} does not exist ({} beams)",
                beam,
                self.mesh.beams.len()
            ))
        })?;
        let x = normalize_position(beam, distance, beam_mesh.length).map_err(|_| {
            FrameError::InvalidQuery(format!(
                "distance {} lies outside beam {} of length {}",
                distance, beam, beam_mesh.length
            ))
        })?;

        let state = GroupState {
            mesh: &self.mesh,
            elements: &self.elements,
            loads: &self.element_loads[g],
            displacements: &self.displacements,
            group: g,
            quadrature: &self.quadrature,
        };
        let (displacement, force) = state.evaluate(beam, x);
        Ok(PointResult {
            beam,
            distance: x,
            displacement,
            force,
        })
    }

    /// Points of interest for several (beam, distance) pairs
    pub fn points(&self, group: &str, queries: &[(usize, f64)]) -> FrameResult<Vec<PointResult>> {
        queries
            .iter()
            .map(|&(beam, distance)| self.point(group, beam, distance))
            .collect()
    }

    /// Register a named load combination
    pub fn define_combination(&mut self, name: &str, combination: Combination) {
        self.combinations.define(name, combination);
    }

    /// Evaluate a registered combination (cached after the first call)
    pub fn combination(&mut self, name: &str) -> FrameResult<&GroupResult> {
        self.combinations.evaluate(name, &self.groups)
    }

    /// Evaluate a combination at a point of interest
    pub fn combined_point(
        &self,
        name: &str,
        combination: &Combination,
        beam: usize,
        distance: f64,
    ) -> FrameResult<PointResult> {
        combination.evaluate_with(name, &|group: &str| self.point(group, beam, distance))
    }
}

impl std::fmt::Debug for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Solution")
            .field("groups", &self.groups.len())
            .field("warnings", &self.warnings)
            .field("nodes", &self.mesh.nodes.len())
            .field("elements", &self.mesh.elements.len())
            .finish()
    }
}
