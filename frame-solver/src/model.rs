//! Frame model - nodes, beams, load groups and boundary conditions

use serde::{Deserialize, Serialize};

use crate::analysis::{self, AnalysisOptions};
use crate::elements::{Beam, BoundaryConditions, Node, RestrictedDegree, Spring};
use crate::error::{FrameError, FrameResult};
use crate::loads::{normalize_position, normalize_span, LoadGroup};
use crate::math;
use crate::solution::Solution;

/// The 2D frame model
///
/// Nodes live in one array; every other entity refers to nodes and beams by
/// index. A model is plain input data: solving never mutates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Model {
    /// Nodes in the model
    pub nodes: Vec<Node>,
    /// Beams (frame members) in the model
    pub beams: Vec<Beam>,
    /// Load groups, solved simultaneously
    #[serde(default)]
    pub loads: Vec<LoadGroup>,
    /// Support conditions
    #[serde(default)]
    pub boundary_conditions: BoundaryConditions,
}

impl Model {
    /// Create a new empty model
    pub fn new() -> Self {
        Self::default()
    }

    // ========================
    // Model Building Methods
    // ========================

    /// Add a node and return its index
    pub fn add_node(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Add a beam and return its index
    pub fn add_beam(&mut self, beam: Beam) -> FrameResult<usize> {
        let index = self.beams.len();
        for node in [beam.start, beam.end] {
            self.check_node(node, || format!("beam {}", index))?;
        }
        self.beams.push(beam);
        Ok(index)
    }

    /// Add a load group and return its index
    pub fn add_load_group(&mut self, group: LoadGroup) -> usize {
        self.loads.push(group);
        self.loads.len() - 1
    }

    /// Add a restraint
    pub fn add_restraint(&mut self, restraint: RestrictedDegree) -> FrameResult<()> {
        self.check_node(restraint.node, || "restraint".to_string())?;
        self.boundary_conditions.restricted_degrees.push(restraint);
        Ok(())
    }

    /// Add an elastic spring support
    pub fn add_spring(&mut self, spring: Spring) -> FrameResult<()> {
        self.check_node(spring.node, || "spring".to_string())?;
        self.boundary_conditions.springs.push(spring);
        Ok(())
    }

    // ========================
    // Queries
    // ========================

    /// Length and angle of a beam
    pub fn beam_geometry(&self, beam: usize) -> FrameResult<(f64, f64)> {
        let b = self
            .beams
            .get(beam)
            .ok_or_else(|| FrameError::beam_reference("query", beam, self.beams.len()))?;
        let (start, end) = (self.node(b.start)?, self.node(b.end)?);
        Ok(math::member_orientation(end.x - start.x, end.y - start.y))
    }

    fn node(&self, index: usize) -> FrameResult<&Node> {
        self.nodes
            .get(index)
            .ok_or_else(|| FrameError::node_reference("query", index, self.nodes.len()))
    }

    /// Names of all load groups in order (explicit name or default `G<index>` label)
    pub fn group_names(&self) -> Vec<String> {
        self.loads.iter().enumerate().map(|(i, g)| g.label(i)).collect()
    }

    // ========================
    // Validation
    // ========================

    fn check_node(&self, node: usize, entity: impl FnOnce() -> String) -> FrameResult<()> {
        if node >= self.nodes.len() {
            return Err(FrameError::node_reference(entity(), node, self.nodes.len()));
        }
        Ok(())
    }

    fn check_beam(&self, beam: usize, entity: impl FnOnce() -> String) -> FrameResult<()> {
        if beam >= self.beams.len() {
            return Err(FrameError::beam_reference(entity(), beam, self.beams.len()));
        }
        Ok(())
    }

    /// Check references, stiffness values and load positions
    ///
    /// Runs before any assembly so that bad input fails fast.
    pub fn validate(&self) -> FrameResult<()> {
        for (i, node) in self.nodes.iter().enumerate() {
            if !node.x.is_finite() || !node.y.is_finite() {
                return Err(FrameError::InputConsistency(format!(
                    "node {} has non-finite coordinates",
                    i
                )));
            }
        }

        for (i, beam) in self.beams.iter().enumerate() {
            self.check_node(beam.start, || format!("beam {}", i))?;
            self.check_node(beam.end, || format!("beam {}", i))?;

            let s = &beam.stiffness;
            if s.ea == 0.0 || !s.ea.is_finite() || s.ei == 0.0 || !s.ei.is_finite() {
                return Err(FrameError::InputConsistency(format!(
                    "beam {} needs finite, non-zero EA and EI (got EA = {}, EI = {})",
                    i, s.ea, s.ei
                )));
            }
            if let Some(ga) = s.ga {
                if ga.is_nan() || ga < 0.0 {
                    return Err(FrameError::InputConsistency(format!(
                        "beam {} has invalid shear stiffness GA = {}",
                        i, ga
                    )));
                }
            }

            let (length, _) = self.beam_geometry(i)?;
            if length <= 0.0 {
                return Err(FrameError::InputConsistency(format!(
                    "beam {} has zero length (nodes {} and {} coincide)",
                    i, beam.start, beam.end
                )));
            }
        }

        for restraint in &self.boundary_conditions.restricted_degrees {
            self.check_node(restraint.node, || "restraint".to_string())?;
        }
        for (i, spring) in self.boundary_conditions.springs.iter().enumerate() {
            self.check_node(spring.node, || format!("spring {}", i))?;
            if spring.stiffness().iter().any(|k| !k.is_finite() || *k < 0.0) {
                return Err(FrameError::InputConsistency(format!(
                    "spring {} needs finite, non-negative stiffness",
                    i
                )));
            }
        }

        let names = self.group_names();
        for (g, name) in names.iter().enumerate() {
            if let Some(first) = names[..g].iter().position(|n| n == name) {
                return Err(FrameError::InputConsistency(format!(
                    "load groups {} and {} share the label '{}'",
                    first, g, name
                )));
            }
        }
        for (g, group) in self.loads.iter().enumerate() {
            self.validate_group(g, group)?;
        }

        self.check_connectivity()
    }

    fn validate_group(&self, g: usize, group: &LoadGroup) -> FrameResult<()> {
        for load in &group.nodal {
            self.check_node(load.node, || format!("nodal load in group {}", g))?;
        }
        for load in &group.initial_displacements {
            self.check_node(load.node, || format!("initial displacement in group {}", g))?;
        }
        for load in &group.point {
            self.check_beam(load.beam, || format!("point load in group {}", g))?;
            let (length, _) = self.beam_geometry(load.beam)?;
            normalize_position(load.beam, load.distance, length)?;
        }
        for load in &group.distributed {
            self.check_beam(load.beam, || format!("distributed load in group {}", g))?;
            let (length, _) = self.beam_geometry(load.beam)?;
            normalize_span(load.beam, load.from, load.to, length)?;
        }
        for load in &group.functions {
            self.check_beam(load.beam, || format!("functional load in group {}", g))?;
            let (length, _) = self.beam_geometry(load.beam)?;
            normalize_span(load.beam, load.from, load.to, length)?;
        }
        Ok(())
    }

    /// Every node needs a beam, unless it is held in all three directions
    fn check_connectivity(&self) -> FrameResult<()> {
        let mut connected = vec![false; self.nodes.len()];
        for beam in &self.beams {
            connected[beam.start] = true;
            connected[beam.end] = true;
        }

        let mut held = vec![[false; 3]; self.nodes.len()];
        for restraint in &self.boundary_conditions.restricted_degrees {
            for (h, f) in held[restraint.node].iter_mut().zip(restraint.flags()) {
                *h |= f;
            }
        }
        for spring in &self.boundary_conditions.springs {
            for (h, k) in held[spring.node].iter_mut().zip(spring.stiffness()) {
                *h |= k > 0.0;
            }
        }

        match (0..self.nodes.len()).find(|&n| !connected[n] && !held[n].iter().all(|&h| h)) {
            Some(node) => Err(FrameError::KinematicInstability(format!(
                "node {} is not connected to any beam",
                node
            ))),
            None => Ok(()),
        }
    }

    // ========================
    // Snapshots
    // ========================

    /// A copy of the model without beam `index`
    ///
    /// Loads on the removed beam are dropped and later beams move down by one.
    /// Nodes are kept, so a node that loses its last beam must be supported
    /// otherwise for the snapshot to solve.
    pub fn without_beam(&self, index: usize) -> FrameResult<Model> {
        self.check_beam(index, || "without_beam".to_string())?;

        let reindex = |beam: usize| if beam > index { beam - 1 } else { beam };
        let mut model = self.clone();
        model.beams.remove(index);

        for group in &mut model.loads {
            group.point.retain(|l| l.beam != index);
            group.distributed.retain(|l| l.beam != index);
            group.functions.retain(|l| l.beam != index);
            group.point.iter_mut().for_each(|l| l.beam = reindex(l.beam));
            group.distributed.iter_mut().for_each(|l| l.beam = reindex(l.beam));
            group.functions.iter_mut().for_each(|l| l.beam = reindex(l.beam));
        }

        log::debug!("Created model snapshot without beam {}", index);
        Ok(model)
    }

    // ========================
    // Analysis
    // ========================

    /// Run a linear static analysis of all load groups
    pub fn solve(&self, options: &AnalysisOptions) -> FrameResult<Solution> {
        analysis::analyze(self, options)
    }

    /// Run a linear static analysis with default options
    pub fn solve_default(&self) -> FrameResult<Solution> {
        self.solve(&AnalysisOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::SectionStiffness;
    use crate::loads::{DistributedLoad, LineLoad, PointLoad};

    fn two_span() -> Model {
        let mut model = Model::new();
        let n0 = model.add_node(Node::new(0.0, 0.0));
        let n1 = model.add_node(Node::new(4.0, 0.0));
        let n2 = model.add_node(Node::new(8.0, 0.0));
        let stiffness = SectionStiffness::new(1e6, 1e4);
        model.add_beam(Beam::new(n0, n1, stiffness)).unwrap();
        model.add_beam(Beam::new(n1, n2, stiffness)).unwrap();
        model.add_restraint(RestrictedDegree::pinned(n0)).unwrap();
        model.add_restraint(RestrictedDegree::roller_y(n2)).unwrap();
        model
    }

    #[test]
    fn test_add_beam_checks_nodes() {
        let mut model = two_span();
        let err = model
            .add_beam(Beam::new(0, 7, SectionStiffness::new(1.0, 1.0)))
            .unwrap_err();
        assert!(err.is_reference_error());
    }

    #[test]
    fn test_validate_rejects_zero_length_beam() {
        let mut model = two_span();
        model.beams.push(Beam::new(1, 1, SectionStiffness::new(1.0, 1.0)));
        assert!(matches!(model.validate(), Err(FrameError::InputConsistency(_))));
    }

    #[test]
    fn test_validate_rejects_zero_ei() {
        let mut model = two_span();
        model.beams[0].stiffness.ei = 0.0;
        assert!(matches!(model.validate(), Err(FrameError::InputConsistency(_))));
    }

    #[test]
    fn test_validate_load_range() {
        let mut model = two_span();
        model.add_load_group(LoadGroup::new().with_point(PointLoad::transverse(1, 4.5, -1.0)));
        assert!(matches!(
            model.validate(),
            Err(FrameError::LoadRange { beam: 1, .. })
        ));
    }

    #[test]
    fn test_validate_load_reference() {
        let mut model = two_span();
        model.add_load_group(
            LoadGroup::new()
                .with_distributed(DistributedLoad::uniform(5, LineLoad::transverse(-1.0))),
        );
        assert!(matches!(
            model.validate(),
            Err(FrameError::BeamReference { beam: 5, .. })
        ));
    }

    #[test]
    fn test_unconnected_node_is_unstable() {
        let mut model = two_span();
        model.add_node(Node::new(20.0, 0.0));
        assert!(matches!(
            model.validate(),
            Err(FrameError::KinematicInstability(_))
        ));
    }

    #[test]
    fn test_without_beam_reindexes_loads() {
        let mut model = two_span();
        model.add_load_group(
            LoadGroup::named("LL")
                .with_point(PointLoad::transverse(0, 1.0, -1.0))
                .with_point(PointLoad::transverse(1, 2.0, -2.0)),
        );

        let snapshot = model.without_beam(0).unwrap();
        assert_eq!(snapshot.beams.len(), 1);
        assert_eq!(snapshot.loads[0].point.len(), 1);
        assert_eq!(snapshot.loads[0].point[0].beam, 0);
        assert_eq!(snapshot.loads[0].point[0].fy, -2.0);
        // Original untouched
        assert_eq!(model.beams.len(), 2);
        assert_eq!(model.loads[0].point.len(), 2);
    }

    #[test]
    fn test_group_names_use_default_labels() {
        let mut model = two_span();
        model.add_load_group(LoadGroup::named("DC"));
        model.add_load_group(LoadGroup::new());
        assert_eq!(model.group_names(), vec!["DC".to_string(), "G1".to_string()]);
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_duplicate_group_labels_rejected() {
        let mut model = two_span();
        model.add_load_group(LoadGroup::named("G1"));
        model.add_load_group(LoadGroup::new());
        assert!(matches!(
            model.validate(),
            Err(FrameError::InputConsistency(msg)) if msg.contains("'G1'")
        ));

        let mut model = two_span();
        model.add_load_group(LoadGroup::named("DC"));
        model.add_load_group(LoadGroup::named("DC"));
        assert!(matches!(model.validate(), Err(FrameError::InputConsistency(_))));
    }
}
