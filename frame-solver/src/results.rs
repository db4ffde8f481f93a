//! Result types for frame analysis

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FrameError, FrameResult};
use crate::loads::Combinable;

/// Displacement of a point in global axes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Displacement {
    /// Displacement in global X
    pub dx: f64,
    /// Displacement in global Y
    pub dy: f64,
    /// Rotation about Z
    pub drz: f64,
}

impl Displacement {
    pub fn new(dx: f64, dy: f64, drz: f64) -> Self {
        Self { dx, dy, drz }
    }

    /// Create from array [DX, DY, RZ]
    pub fn from_array(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.dx, self.dy, self.drz]
    }

    /// Get translation magnitude
    pub fn translation_magnitude(&self) -> f64 {
        self.dx.hypot(self.dy)
    }
}

/// Internal force of a cross-section
///
/// Normal force is positive in tension; the moment is positive when it puts
/// the local -y fibre in tension (sagging for a beam running in +X), and
/// shear satisfies dM/dx = V.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InternalForce {
    /// Normal force
    pub n: f64,
    /// Shear force
    pub v: f64,
    /// Bending moment
    pub m: f64,
}

impl InternalForce {
    pub fn new(n: f64, v: f64, m: f64) -> Self {
        Self { n, v, m }
    }

    pub fn from_array(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.n, self.v, self.m]
    }
}

/// Reaction of a support or spring in global axes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    /// Supported node
    pub node: usize,
    pub fx: f64,
    pub fy: f64,
    pub mz: f64,
}

impl Reaction {
    pub fn new(node: usize, values: [f64; 3]) -> Self {
        Self {
            node,
            fx: values[0],
            fy: values[1],
            mz: values[2],
        }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.fx, self.fy, self.mz]
    }
}

/// Results of one load group (or one evaluated load combination)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupResult {
    /// Load group or combination name
    pub name: String,
    /// Per beam, one entry per node along the beam
    pub displacements: Vec<Vec<Displacement>>,
    /// Per beam, one entry per node along the beam
    pub internal_forces: Vec<Vec<InternalForce>>,
    /// Parallel to the merged restricted degrees
    pub support_reactions: Vec<Reaction>,
    /// Parallel to the springs
    pub spring_reactions: Vec<Reaction>,
}

impl Combinable for GroupResult {
    fn zip_with(
        &self,
        other: &GroupResult,
        name: &str,
        f: impl Fn(f64, f64) -> f64,
    ) -> FrameResult<GroupResult> {
        let shapes_match = self.displacements.len() == other.displacements.len()
            && self
                .displacements
                .iter()
                .zip(&other.displacements)
                .all(|(a, b)| a.len() == b.len())
            && self.support_reactions.len() == other.support_reactions.len()
            && self.spring_reactions.len() == other.spring_reactions.len();
        if !shapes_match {
            return Err(FrameError::InvalidQuery(format!(
                "results '{}' and '{}' do not belong to the same model",
                self.name, other.name
            )));
        }

        let zip3 = |a: [f64; 3], b: [f64; 3]| [f(a[0], b[0]), f(a[1], b[1]), f(a[2], b[2])];

        let displacements = self
            .displacements
            .iter()
            .zip(&other.displacements)
            .map(|(a, b)| {
                a.iter()
                    .zip(b)
                    .map(|(a, b)| Displacement::from_array(zip3(a.as_array(), b.as_array())))
                    .collect()
            })
            .collect();
        let internal_forces = self
            .internal_forces
            .iter()
            .zip(&other.internal_forces)
            .map(|(a, b)| {
                a.iter()
                    .zip(b)
                    .map(|(a, b)| InternalForce::from_array(zip3(a.as_array(), b.as_array())))
                    .collect()
            })
            .collect();
        let zip_reactions = |a: &[Reaction], b: &[Reaction]| -> Vec<Reaction> {
            a.iter()
                .zip(b)
                .map(|(a, b)| Reaction::new(a.node, zip3(a.as_array(), b.as_array())))
                .collect()
        };

        Ok(GroupResult {
            name: name.to_string(),
            displacements,
            internal_forces,
            support_reactions: zip_reactions(&self.support_reactions, &other.support_reactions),
            spring_reactions: zip_reactions(&self.spring_reactions, &other.spring_reactions),
        })
    }

    fn map(&self, name: &str, f: impl Fn(f64) -> f64) -> GroupResult {
        let map3 = |a: [f64; 3]| [f(a[0]), f(a[1]), f(a[2])];
        GroupResult {
            name: name.to_string(),
            displacements: self
                .displacements
                .iter()
                .map(|beam| {
                    beam.iter()
                        .map(|d| Displacement::from_array(map3(d.as_array())))
                        .collect()
                })
                .collect(),
            internal_forces: self
                .internal_forces
                .iter()
                .map(|beam| {
                    beam.iter()
                        .map(|q| InternalForce::from_array(map3(q.as_array())))
                        .collect()
                })
                .collect(),
            support_reactions: self
                .support_reactions
                .iter()
                .map(|r| Reaction::new(r.node, map3(r.as_array())))
                .collect(),
            spring_reactions: self
                .spring_reactions
                .iter()
                .map(|r| Reaction::new(r.node, map3(r.as_array())))
                .collect(),
        }
    }
}

impl GroupResult {
    /// Get summary of extreme values
    pub fn summary(&self) -> ResultSummary {
        let mut summary = ResultSummary::default();

        for (beam, values) in self.displacements.iter().enumerate() {
            for d in values {
                let mag = d.translation_magnitude();
                if mag > summary.max_displacement {
                    summary.max_displacement = mag;
                    summary.max_displacement_beam = beam;
                }
            }
        }

        for (beam, values) in self.internal_forces.iter().enumerate() {
            for q in values {
                if q.n.abs() > summary.max_normal_force {
                    summary.max_normal_force = q.n.abs();
                    summary.max_normal_force_beam = beam;
                }
                if q.m.abs() > summary.max_moment {
                    summary.max_moment = q.m.abs();
                    summary.max_moment_beam = beam;
                }
            }
        }

        summary
    }
}

/// Summary of the extreme values of a result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub max_displacement: f64,
    pub max_displacement_beam: usize,
    pub max_normal_force: f64,
    pub max_normal_force_beam: usize,
    pub max_moment: f64,
    pub max_moment_beam: usize,
}

/// State at a point of interest
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointResult {
    pub beam: usize,
    /// Distance from the beam start
    pub distance: f64,
    pub displacement: Displacement,
    pub force: InternalForce,
}

impl Combinable for PointResult {
    fn zip_with(
        &self,
        other: &PointResult,
        _name: &str,
        f: impl Fn(f64, f64) -> f64,
    ) -> FrameResult<PointResult> {
        if self.beam != other.beam || self.distance != other.distance {
            return Err(FrameError::InvalidQuery(format!(
                "cannot combine point {}@{} with point {}@{}",
                self.beam, self.distance, other.beam, other.distance
            )));
        }
        let (d, e) = (self.displacement, other.displacement);
        let (q, r) = (self.force, other.force);
        Ok(PointResult {
            displacement: Displacement::new(f(d.dx, e.dx), f(d.dy, e.dy), f(d.drz, e.drz)),
            force: InternalForce::new(f(q.n, r.n), f(q.v, r.v), f(q.m, r.m)),
            ..*self
        })
    }

    fn map(&self, _name: &str, f: impl Fn(f64) -> f64) -> PointResult {
        let d = self.displacement;
        let q = self.force;
        PointResult {
            displacement: Displacement::new(f(d.dx), f(d.dy), f(d.drz)),
            force: InternalForce::new(f(q.n), f(q.v), f(q.m)),
            ..*self
        }
    }
}

/// Recoverable conditions found while solving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SolveWarning {
    /// Several restraints on one node were merged
    DuplicateRestraint { node: usize },
    /// The release of a beam end was removed to keep the node rotation stable
    OrphanedRelease { node: usize, beam: usize },
    /// Prescribed displacement on an unrestrained degree of freedom
    IgnoredInitialDisplacement { group: usize, node: usize, dof: usize },
}

impl fmt::Display for SolveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateRestraint { node } => {
                write!(f, "node {} has several restraints, merged by OR of their flags", node)
            }
            Self::OrphanedRelease { node, beam } => write!(
                f,
                "all beam ends at node {} are released; keeping beam {} rigidly connected",
                node, beam
            ),
            Self::IgnoredInitialDisplacement { group, node, dof } => write!(
                f,
                "load group {}: prescribed displacement of node {} (dof {}) is not restrained \
                 and has no effect",
                group, node, dof
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &str, scale: f64) -> GroupResult {
        GroupResult {
            name: name.to_string(),
            displacements: vec![vec![Displacement::new(1.0, 2.0, 3.0).scaled(scale)]],
            internal_forces: vec![vec![InternalForce::new(-4.0 * scale, 5.0 * scale, 6.0 * scale)]],
            support_reactions: vec![Reaction::new(0, [1.0 * scale, 0.0, -1.0 * scale])],
            spring_reactions: vec![],
        }
    }

    impl Displacement {
        fn scaled(self, f: f64) -> Self {
            Self::new(self.dx * f, self.dy * f, self.drz * f)
        }
    }

    #[test]
    fn test_zip_with_adds_values() {
        let sum = sample("a", 1.0).zip_with(&sample("b", 2.0), "a+b", |x, y| x + y).unwrap();
        assert_eq!(sum.name, "a+b");
        assert_eq!(sum.displacements[0][0], Displacement::new(3.0, 6.0, 9.0));
        assert_eq!(sum.internal_forces[0][0], InternalForce::new(-12.0, 15.0, 18.0));
        assert_eq!(sum.support_reactions[0].as_array(), [3.0, 0.0, -3.0]);
    }

    #[test]
    fn test_zip_with_rejects_shape_mismatch() {
        let mut other = sample("b", 1.0);
        other.support_reactions.clear();
        assert!(sample("a", 1.0).zip_with(&other, "x", |a, _| a).is_err());
    }

    #[test]
    fn test_summary_finds_extremes() {
        let summary = sample("a", 1.0).summary();
        assert_eq!(summary.max_moment, 6.0);
        assert_eq!(summary.max_normal_force, 4.0);
    }
}
