//! Analysis options and the linear static analysis pipeline
//!
//! The pipeline runs, per call: validation, discretization, element stiffness
//! and global assembly, load assembly, boundary-condition reduction, one
//! factorization with a solve per load group, reactions, and back-calculation
//! of internal forces.

mod assembly;
mod back_calc;
mod boundary;
mod discretize;
mod loading;
pub(crate) mod poi;
mod solver;

use serde::{Deserialize, Serialize};

use crate::error::{FrameError, FrameResult};
use crate::math::Quadrature;
use crate::model::Model;
use crate::solution::Solution;

pub(crate) use assembly::ElementStiffness;
pub(crate) use discretize::Discretization;
pub(crate) use loading::ElementLoad;

/// How beams are split into elements
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Meshing {
    /// The same number of elements on every beam
    FixedCount(usize),
    /// Elements no longer than this length
    MaxLength(f64),
}

impl Default for Meshing {
    fn default() -> Self {
        Self::FixedCount(1)
    }
}

impl Meshing {
    /// Number of elements for a beam of `length`
    pub fn element_count(&self, length: f64) -> usize {
        match *self {
            Meshing::FixedCount(n) => n.max(1),
            Meshing::MaxLength(h) if h > 0.0 && h.is_finite() => {
                // Guard against 4.0000000001 / 1.0 rounding up to 5
                let ratio = length / h;
                let count = if (ratio - ratio.round()).abs() < 1e-9 * ratio.max(1.0) {
                    ratio.round()
                } else {
                    ratio.ceil()
                };
                (count as usize).max(1)
            }
            Meshing::MaxLength(_) => 1,
        }
    }

    /// Reject element counts of zero and non-positive or non-finite lengths
    pub fn validate(&self) -> FrameResult<()> {
        match *self {
            Meshing::FixedCount(0) => Err(FrameError::InputConsistency(
                "meshing needs at least one element per beam".to_string(),
            )),
            Meshing::MaxLength(h) if !(h > 0.0 && h.is_finite()) => {
                Err(FrameError::InputConsistency(format!(
                    "meshing needs a positive, finite maximum element length (got {})",
                    h
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Options for structural analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Beam subdivision
    pub meshing: Meshing,
    /// Decimals support reactions are rounded to (None = no rounding)
    pub reaction_decimals: Option<u32>,
    /// Pivots at or below this fraction of their original diagonal are singular
    pub pivot_tolerance: f64,
    /// Quadrature settings for functional loads
    pub quadrature: Quadrature,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            meshing: Meshing::default(),
            reaction_decimals: Some(6),
            pivot_tolerance: 1e-12,
            quadrature: Quadrature::default(),
        }
    }
}

impl AnalysisOptions {
    /// Create default options (one element per beam)
    pub fn new() -> Self {
        Self::default()
    }

    /// Split every beam into `n` elements
    pub fn with_elements(mut self, n: usize) -> Self {
        self.meshing = Meshing::FixedCount(n);
        self
    }

    /// Split beams into elements no longer than `length`
    pub fn with_max_length(mut self, length: f64) -> Self {
        self.meshing = Meshing::MaxLength(length);
        self
    }

    /// Round reactions to `decimals` (None disables rounding)
    pub fn with_reaction_decimals(mut self, decimals: Option<u32>) -> Self {
        self.reaction_decimals = decimals;
        self
    }

    /// Set quadrature tolerance for functional loads
    pub fn with_quadrature_tolerance(mut self, tol: f64) -> Self {
        self.quadrature.tolerance = tol;
        self
    }
}

/// Run a linear static analysis of every load group in `model`
pub fn analyze(model: &Model, options: &AnalysisOptions) -> FrameResult<Solution> {
    model.validate()?;
    options.meshing.validate()?;
    for (g, group) in model.loads.iter().enumerate() {
        if group.is_empty() {
            log::debug!("Load group '{}' carries no loads", group.label(g));
        }
    }
    log::debug!(
        "Analyzing model: {} nodes, {} beams, {} load groups",
        model.nodes.len(),
        model.beams.len(),
        model.loads.len()
    );

    let mut warnings = Vec::new();

    // Supports and releases
    let restraints =
        boundary::merge_restraints(&model.boundary_conditions.restricted_degrees, &mut warnings);
    let releases = boundary::resolve_orphaned_releases(model, &restraints, &mut warnings);

    // Discretization
    let mesh = Discretization::build(model, &releases, &options.meshing);
    log::debug!(
        "Discretized into {} nodes and {} elements",
        mesh.nodes.len(),
        mesh.elements.len()
    );

    // Stiffness
    let elements: Vec<ElementStiffness> = mesh.elements.iter().map(ElementStiffness::new).collect();
    let k_global =
        assembly::assemble_stiffness(&mesh, &elements, &model.boundary_conditions.springs);

    // Loads
    let loads = loading::assemble_loads(model, &mesh, &elements, &options.quadrature)?;

    // Boundary conditions, solve and reactions
    let system = boundary::ReducedSystem::new(&mesh, &restraints, &k_global);
    let prescribed = boundary::prescribed_displacements(model, &mesh, &system, &mut warnings);
    let solved = solver::solve(&system, &loads.forces, &prescribed, options.pivot_tolerance)?;
    let support_reactions =
        solver::support_reactions(&system, &restraints, &solved, options.reaction_decimals);
    let spring_reactions = solver::spring_reactions(
        &model.boundary_conditions.springs,
        &solved.displacements,
        options.reaction_decimals,
    );

    // Back-calculation
    let groups = back_calc::group_results(
        &model.group_names(),
        &mesh,
        &elements,
        &loads.elements,
        &solved.displacements,
        support_reactions,
        spring_reactions,
    );

    for warning in &warnings {
        log::warn!("{}", warning);
    }
    log::info!(
        "Solved {} load groups ({} free DOFs, {} restrained)",
        groups.len(),
        system.free.len(),
        system.restricted.len()
    );

    Ok(Solution::new(
        groups,
        warnings,
        restraints,
        mesh,
        elements,
        loads.elements,
        solved.displacements,
        options.quadrature,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_count() {
        assert_eq!(Meshing::FixedCount(0).element_count(3.0), 1);
        assert_eq!(Meshing::FixedCount(4).element_count(3.0), 4);
        assert_eq!(Meshing::MaxLength(1.0).element_count(3.5), 4);
        assert_eq!(Meshing::MaxLength(1.0).element_count(4.0 + 1e-12), 4);
        assert_eq!(Meshing::MaxLength(10.0).element_count(3.0), 1);
    }

    #[test]
    fn test_invalid_meshing_rejected() {
        assert!(Meshing::FixedCount(1).validate().is_ok());
        assert!(Meshing::MaxLength(0.25).validate().is_ok());
        for meshing in [
            Meshing::FixedCount(0),
            Meshing::MaxLength(0.0),
            Meshing::MaxLength(-1.0),
            Meshing::MaxLength(f64::NAN),
            Meshing::MaxLength(f64::INFINITY),
        ] {
            assert!(matches!(meshing.validate(), Err(FrameError::InputConsistency(_))));
        }
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: AnalysisOptions =
            serde_json::from_str(r#"{"meshing": {"max_length": 0.5}}"#).unwrap();
        assert_eq!(options.meshing, Meshing::MaxLength(0.5));
        assert_eq!(options.reaction_decimals, Some(6));
    }
}
