//! Discretization of beams into elements

use std::collections::BTreeMap;
use std::ops::Range;

use crate::analysis::Meshing;
use crate::elements::{BeamReleases, Node, SectionStiffness};
use crate::math;
use crate::model::Model;

/// A beam split into equal elements
#[derive(Debug, Clone)]
pub(crate) struct BeamMesh {
    /// Global node indices along the beam, start to end
    pub nodes: Vec<usize>,
    /// Global element indices, start to end
    pub elements: Range<usize>,
    pub length: f64,
    pub angle: f64,
    pub element_length: f64,
}

impl BeamMesh {
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Element containing `distance` and the position inside it
    ///
    /// Distances on an inner element boundary resolve to the element on the right.
    pub fn locate(&self, distance: f64) -> (usize, f64) {
        let n = self.element_count();
        let k = ((distance / self.element_length).floor().max(0.0) as usize).min(n - 1);
        let s = (distance - k as f64 * self.element_length).clamp(0.0, self.element_length);
        (self.elements.start + k, s)
    }
}

/// A single frame element
#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub beam: usize,
    pub start: usize,
    pub end: usize,
    /// Distance of the element start from the beam start
    pub offset: f64,
    pub length: f64,
    pub cos: f64,
    pub sin: f64,
    pub stiffness: SectionStiffness,
    pub releases: [bool; 2],
}

impl Element {
    /// Global DOF indices [u1, v1, θ1, u2, v2, θ2]
    pub fn dofs(&self) -> [usize; 6] {
        let (s, e) = (3 * self.start, 3 * self.end);
        [s, s + 1, s + 2, e, e + 1, e + 2]
    }
}

/// Discretized model: original plus interior nodes, elements in beam order
#[derive(Debug, Clone)]
pub(crate) struct Discretization {
    pub nodes: Vec<Node>,
    pub beams: Vec<BeamMesh>,
    pub elements: Vec<Element>,
    /// Releases keyed by element index (only edge elements of a beam)
    pub releases: BTreeMap<usize, BeamReleases>,
}

impl Discretization {
    /// Split every beam of a validated model
    ///
    /// Interior nodes are appended after the original nodes, beam by beam.
    pub fn build(model: &Model, releases: &[BeamReleases], meshing: &Meshing) -> Self {
        let mut nodes = model.nodes.clone();
        let mut beams = Vec::with_capacity(model.beams.len());
        let mut elements = Vec::new();
        let mut release_map = BTreeMap::new();

        for (b, beam) in model.beams.iter().enumerate() {
            let start = model.nodes[beam.start];
            let end = model.nodes[beam.end];
            let (length, angle) = math::member_orientation(end.x - start.x, end.y - start.y);
            let (cos, sin) = math::direction_cosines(angle);
            let n = meshing.element_count(length);
            let h = length / n as f64;

            let mut beam_nodes = Vec::with_capacity(n + 1);
            beam_nodes.push(beam.start);
            for i in 1..n {
                nodes.push(start.lerp(&end, i as f64 / n as f64));
                beam_nodes.push(nodes.len() - 1);
            }
            beam_nodes.push(beam.end);

            let first = elements.len();
            for (i, pair) in beam_nodes.windows(2).enumerate() {
                let beam_releases = releases.get(b).copied().unwrap_or_default();
                let element_releases = [
                    i == 0 && beam_releases.start,
                    i == n - 1 && beam_releases.end,
                ];
                if element_releases.iter().any(|&r| r) {
                    release_map.insert(elements.len(), BeamReleases::from(element_releases));
                }
                elements.push(Element {
                    beam: b,
                    start: pair[0],
                    end: pair[1],
                    offset: i as f64 * h,
                    length: h,
                    cos,
                    sin,
                    stiffness: beam.stiffness,
                    releases: element_releases,
                });
            }

            beams.push(BeamMesh {
                nodes: beam_nodes,
                elements: first..elements.len(),
                length,
                angle,
                element_length: h,
            });
        }

        Self {
            nodes,
            beams,
            elements,
            releases: release_map,
        }
    }

    /// Total number of DOFs
    pub fn dof_count(&self) -> usize {
        3 * self.nodes.len()
    }
}
