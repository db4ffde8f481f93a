//! JSON bundles: the parallel-list model description and solve requests
//!
//! A bundle mirrors the dictionary layout used by client code:
//!
//! ```json
//! {
//!   "nodes": [[0.0, 0.0], [10.0, 0.0]],
//!   "beams": [[0, 1]],
//!   "stiffness": [[2.1e7, 4.2e5]],
//!   "loads": [{"name": "LL", "nodal": [{"node": 1, "fy": -10.0}]}],
//!   "boundary_conditions": {
//!     "restricted_degrees": [{"node": 0, "x": true, "y": true, "rotation": true}]
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::analysis::AnalysisOptions;
use crate::elements::{Beam, BeamReleases, BoundaryConditions, Node, SectionStiffness};
use crate::error::{FrameError, FrameResult};
use crate::loads::{Combination, LoadGroup};
use crate::model::Model;
use crate::results::{GroupResult, PointResult, ResultSummary, SolveWarning};

/// Model as parallel lists
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelBundle {
    /// `[x, y]` per node
    pub nodes: Vec<[f64; 2]>,
    /// `[start, end]` node indices per beam
    pub beams: Vec<[usize; 2]>,
    /// `[EA, EI]` or `[EA, EI, GA]` per beam
    pub stiffness: Vec<Vec<f64>>,
    /// `[start_released, end_released]` per beam
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub releases: Option<Vec<[bool; 2]>>,
    #[serde(default)]
    pub loads: Vec<LoadGroup>,
    #[serde(default)]
    pub boundary_conditions: BoundaryConditions,
}

impl ModelBundle {
    /// Read a bundle from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> FrameResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn section(index: usize, values: &[f64]) -> FrameResult<SectionStiffness> {
        match *values {
            [ea, ei] => Ok(SectionStiffness::new(ea, ei)),
            [ea, ei, ga] => Ok(SectionStiffness::new(ea, ei).with_shear(ga)),
            _ => Err(FrameError::InputConsistency(format!(
                "stiffness of beam {} needs [EA, EI] or [EA, EI, GA], got {} values",
                index,
                values.len()
            ))),
        }
    }
}

impl TryFrom<ModelBundle> for Model {
    type Error = FrameError;

    fn try_from(bundle: ModelBundle) -> FrameResult<Model> {
        let beam_count = bundle.beams.len();
        if bundle.stiffness.len() != beam_count {
            return Err(FrameError::InputConsistency(format!(
                "{} beams but {} stiffness entries",
                beam_count,
                bundle.stiffness.len()
            )));
        }
        let releases = match bundle.releases {
            Some(releases) if releases.len() != beam_count => {
                return Err(FrameError::InputConsistency(format!(
                    "{} beams but {} release entries",
                    beam_count,
                    releases.len()
                )));
            }
            Some(releases) => releases.into_iter().map(BeamReleases::from).collect(),
            None => vec![BeamReleases::none(); beam_count],
        };

        let mut model = Model::new();
        for [x, y] in bundle.nodes {
            model.add_node(Node::new(x, y));
        }
        for (i, (([start, end], stiffness), releases)) in bundle
            .beams
            .into_iter()
            .zip(&bundle.stiffness)
            .zip(releases)
            .enumerate()
        {
            let section = ModelBundle::section(i, stiffness)?;
            model.add_beam(Beam::new(start, end, section).with_releases(releases))?;
        }
        model.loads = bundle.loads;
        model.boundary_conditions = bundle.boundary_conditions;
        Ok(model)
    }
}

impl From<&Model> for ModelBundle {
    /// Functional loads are dropped: closures have no JSON form
    fn from(model: &Model) -> Self {
        let stiffness = model
            .beams
            .iter()
            .map(|b| {
                let s = b.stiffness;
                match s.ga {
                    Some(ga) => vec![s.ea, s.ei, ga],
                    None => vec![s.ea, s.ei],
                }
            })
            .collect();
        let releases = model
            .beams
            .iter()
            .any(|b| b.releases.any())
            .then(|| model.beams.iter().map(|b| b.releases.into()).collect());

        ModelBundle {
            nodes: model.nodes.iter().map(Node::coords).collect(),
            beams: model.beams.iter().map(|b| [b.start, b.end]).collect(),
            stiffness,
            releases,
            loads: model.loads.clone(),
            boundary_conditions: model.boundary_conditions.clone(),
        }
    }
}

/// A point of interest along a beam
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointQuery {
    pub beam: usize,
    /// Distance from the beam start (negative = from the beam end)
    pub distance: f64,
}

/// A model plus everything to compute from it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveRequest {
    pub model: ModelBundle,
    #[serde(default)]
    pub options: AnalysisOptions,
    /// Named load combinations to evaluate
    #[serde(default)]
    pub combinations: BTreeMap<String, Combination>,
    /// Points evaluated for every load group and combination
    #[serde(default)]
    pub points: Vec<PointQuery>,
}

/// Point results of one load group or combination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointReport {
    pub name: String,
    pub points: Vec<PointResult>,
}

/// Everything computed for a `SolveRequest`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResponse {
    pub groups: Vec<GroupResult>,
    pub combinations: Vec<GroupResult>,
    pub points: Vec<PointReport>,
    pub summaries: BTreeMap<String, ResultSummary>,
    pub warnings: Vec<SolveWarning>,
}

impl SolveRequest {
    /// Read a request from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> FrameResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Solve the model and evaluate combinations and points of interest
    pub fn run(self) -> FrameResult<SolveResponse> {
        let model = Model::try_from(self.model)?;
        let mut solution = model.solve(&self.options)?;

        for (name, combination) in &self.combinations {
            solution.define_combination(name, combination.clone());
        }
        let mut combinations = Vec::with_capacity(self.combinations.len());
        for name in self.combinations.keys() {
            combinations.push(solution.combination(name)?.clone());
        }

        let mut points = Vec::new();
        if !self.points.is_empty() {
            for group in solution.groups() {
                let results = self
                    .points
                    .iter()
                    .map(|q| solution.point(&group.name, q.beam, q.distance))
                    .collect::<FrameResult<Vec<_>>>()?;
                points.push(PointReport {
                    name: group.name.clone(),
                    points: results,
                });
            }
            for (name, combination) in &self.combinations {
                let results = self
                    .points
                    .iter()
                    .map(|q| solution.combined_point(name, combination, q.beam, q.distance))
                    .collect::<FrameResult<Vec<_>>>()?;
                points.push(PointReport {
                    name: name.clone(),
                    points: results,
                });
            }
        }

        let groups = solution.groups().to_vec();
        let summaries = groups
            .iter()
            .chain(&combinations)
            .map(|r| (r.name.clone(), r.summary()))
            .collect();

        Ok(SolveResponse {
            groups,
            combinations,
            points,
            summaries,
            warnings: solution.warnings().to_vec(),
        })
    }
}
