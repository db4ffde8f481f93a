//! Load assembly: global nodal forces and per-element fixed-end vectors

use nalgebra::DMatrix;

use super::assembly::ElementStiffness;
use super::discretize::{BeamMesh, Discretization};
use crate::error::FrameResult;
use crate::loads::{
    normalize_position, normalize_span, DistributedLoad, FunctionalLoad, LoadGroup, PointLoad,
    POSITION_TOLERANCE,
};
use crate::math::{self, Quadrature, Vec6};
use crate::model::Model;

/// A functional load restricted to one element
#[derive(Debug, Clone)]
pub(crate) struct FunctionSpan {
    pub load: FunctionalLoad,
    /// Distance of the element start from the beam start
    pub offset: f64,
    pub from: f64,
    pub to: f64,
    pub cos: f64,
    pub sin: f64,
}

impl FunctionSpan {
    /// Local intensities `[qx, qy, mz]` at `s` from the element start
    pub fn intensity(&self, s: f64) -> [f64; 3] {
        let [qx, qy, mz] = self.load.intensity(self.offset + s);
        let (lx, ly) = self.load.axes.to_local(qx, qy, self.cos, self.sin);
        [lx, ly, mz]
    }
}

/// A span load on one element, in element-local axes and positions
#[derive(Debug, Clone)]
pub(crate) enum SpanLoad {
    Point { at: f64, load: [f64; 3] },
    Linear { from: f64, to: f64, start: [f64; 3], end: [f64; 3] },
    Function(FunctionSpan),
}

/// Loads acting on one element in one load group
#[derive(Debug, Clone, Default)]
pub(crate) struct ElementLoad {
    /// Fixed-end vector without releases
    pub fixed_end: Vec6,
    /// Fixed-end vector with released rotations condensed out
    pub condensed: Vec6,
    pub spans: Vec<SpanLoad>,
}

impl ElementLoad {
    fn add(&mut self, q: Vec6, span: SpanLoad) {
        self.fixed_end += q;
        self.spans.push(span);
    }
}

/// Global load matrix (one column per load group) and element loads
pub(crate) struct AssembledLoads {
    pub forces: DMatrix<f64>,
    /// Indexed `[group][element]`
    pub elements: Vec<Vec<ElementLoad>>,
}

/// Convert all load groups into global forces and element fixed-end vectors
pub(crate) fn assemble_loads(
    model: &Model,
    mesh: &Discretization,
    stiffness: &[ElementStiffness],
    quadrature: &Quadrature,
) -> FrameResult<AssembledLoads> {
    let mut forces = DMatrix::zeros(mesh.dof_count(), model.loads.len());
    let mut elements = Vec::with_capacity(model.loads.len());

    for (g, group) in model.loads.iter().enumerate() {
        let mut column = vec![ElementLoad::default(); mesh.elements.len()];

        for load in &group.nodal {
            for (i, value) in load.as_array().into_iter().enumerate() {
                forces[(3 * load.node + i, g)] += value;
            }
        }
        add_beam_loads(group, mesh, quadrature, &mut column)?;

        let per_element = mesh.elements.iter().zip(stiffness).zip(&mut column);
        for ((element, element_stiffness), load) in per_element {
            if load.spans.is_empty() {
                continue;
            }
            load.condensed = element_stiffness.condense_loads(&load.fixed_end);
            let global = element_stiffness.rotation * load.condensed;
            for (i, dof) in element.dofs().into_iter().enumerate() {
                forces[(dof, g)] += global[i];
            }
        }

        log::debug!(
            "Load group {}: {} nodal, {} point, {} distributed, {} functional loads",
            group.label(g),
            group.nodal.len(),
            group.point.len(),
            group.distributed.len(),
            group.functions.len()
        );
        elements.push(column);
    }

    Ok(AssembledLoads { forces, elements })
}

fn add_beam_loads(
    group: &LoadGroup,
    mesh: &Discretization,
    quadrature: &Quadrature,
    column: &mut [ElementLoad],
) -> FrameResult<()> {
    for load in &group.point {
        add_point_load(load, mesh, column)?;
    }
    for load in &group.distributed {
        add_distributed_load(load, mesh, column)?;
    }
    for load in &group.functions {
        add_functional_load(load, mesh, quadrature, column)?;
    }
    Ok(())
}

/// Elements receiving a point load at `distance` with their share
///
/// A load on an inner element boundary is split evenly between both elements.
fn point_targets(beam: &BeamMesh, distance: f64) -> Vec<(usize, f64, f64)> {
    let h = beam.element_length;
    let n = beam.element_count();
    let k = (distance / h).round();
    if (distance - k * h).abs() <= POSITION_TOLERANCE * h {
        let k = k as usize;
        let first = beam.elements.start;
        return match k {
            0 => vec![(first, 0.0, 1.0)],
            k if k >= n => vec![(first + n - 1, h, 1.0)],
            k => vec![(first + k - 1, h, 0.5), (first + k, 0.0, 0.5)],
        };
    }
    let (element, s) = beam.locate(distance);
    vec![(element, s, 1.0)]
}

fn add_point_load(
    load: &PointLoad,
    mesh: &Discretization,
    column: &mut [ElementLoad],
) -> FrameResult<()> {
    let beam = &mesh.beams[load.beam];
    let distance = normalize_position(load.beam, load.distance, beam.length)?;

    for (e, at, share) in point_targets(beam, distance) {
        let element = &mesh.elements[e];
        let (px, py) = load.axes.to_local(load.fx, load.fy, element.cos, element.sin);
        let local = [px * share, py * share, load.mz * share];
        let q = math::point_load_vector(element.length, at, local);
        column[e].add(q, SpanLoad::Point { at, load: local });
    }
    Ok(())
}

fn add_distributed_load(
    load: &DistributedLoad,
    mesh: &Discretization,
    column: &mut [ElementLoad],
) -> FrameResult<()> {
    let beam = &mesh.beams[load.beam];
    let (a, b) = normalize_span(load.beam, load.from, load.to, beam.length)?;
    if b - a <= POSITION_TOLERANCE * beam.length {
        return Ok(());
    }

    let intensity_at = |x: f64, cos: f64, sin: f64| {
        let line = load.start.lerp(&load.end, (x - a) / (b - a));
        let (qx, qy) = load.axes.to_local(line.qx, line.qy, cos, sin);
        [qx, qy, line.mz]
    };

    for e in beam.elements.clone() {
        let element = &mesh.elements[e];
        let lo = a.max(element.offset);
        let hi = b.min(element.offset + element.length);
        if hi - lo <= POSITION_TOLERANCE * element.length {
            continue;
        }
        let start = intensity_at(lo, element.cos, element.sin);
        let end = intensity_at(hi, element.cos, element.sin);
        let (from, to) = (lo - element.offset, hi - element.offset);
        let q = math::linear_load_vector(element.length, from, to, start, end);
        column[e].add(q, SpanLoad::Linear { from, to, start, end });
    }
    Ok(())
}

fn add_functional_load(
    load: &FunctionalLoad,
    mesh: &Discretization,
    quadrature: &Quadrature,
    column: &mut [ElementLoad],
) -> FrameResult<()> {
    let beam = &mesh.beams[load.beam];
    let (a, b) = normalize_span(load.beam, load.from, load.to, beam.length)?;

    for e in beam.elements.clone() {
        let element = &mesh.elements[e];
        let lo = a.max(element.offset);
        let hi = b.min(element.offset + element.length);
        if hi - lo <= POSITION_TOLERANCE * element.length {
            continue;
        }
        let span = FunctionSpan {
            load: load.clone(),
            offset: element.offset,
            from: lo - element.offset,
            to: hi - element.offset,
            cos: element.cos,
            sin: element.sin,
        };
        let q = math::function_load_vector(
            element.length,
            span.from,
            span.to,
            |s| span.intensity(s),
            quadrature,
        );
        column[e].add(q, SpanLoad::Function(span));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Meshing;
    use crate::elements::{Beam, BeamReleases, Node, SectionStiffness};
    use crate::loads::{LineLoad, NodalLoad};
    use approx::assert_relative_eq;

    fn beam_model(length: f64, group: LoadGroup) -> Model {
        let mut model = Model::new();
        let a = model.add_node(Node::new(0.0, 0.0));
        let b = model.add_node(Node::new(length, 0.0));
        model.add_beam(Beam::new(a, b, SectionStiffness::new(1.0, 1.0))).unwrap();
        model.add_load_group(group);
        model
    }

    fn assemble(model: &Model, n: usize) -> (Discretization, AssembledLoads) {
        let releases: Vec<_> = model.beams.iter().map(|b| b.releases).collect();
        let mesh = Discretization::build(model, &releases, &Meshing::FixedCount(n));
        let stiffness: Vec<_> = mesh.elements.iter().map(ElementStiffness::new).collect();
        let loads = assemble_loads(model, &mesh, &stiffness, &Quadrature::default()).unwrap();
        (mesh, loads)
    }

    #[test]
    fn test_point_load_on_boundary_is_split() {
        let group = LoadGroup::new().with_point(PointLoad::transverse(0, 2.0, -10.0));
        let model = beam_model(4.0, group);
        let (mesh, loads) = assemble(&model, 2);

        let spans = |e: usize| loads.elements[0][e].spans.len();
        assert_eq!((spans(0), spans(1)), (1, 1));
        // All of the load lands on the middle node
        let middle = mesh.beams[0].nodes[1];
        assert_relative_eq!(loads.forces[(3 * middle + 1, 0)], -10.0, epsilon = 1e-12);
        assert_relative_eq!(loads.forces[(3 * middle + 2, 0)], 0.0, epsilon = 1e-12);
        assert_relative_eq!(loads.forces.column(0).sum(), -10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_total_distributed_load_is_preserved() {
        let (start, end) = (LineLoad::transverse(-2.0), LineLoad::transverse(-4.0));
        let load = DistributedLoad::new(0, 1.0, -0.5, start, end);
        let model = beam_model(6.0, LoadGroup::new().with_distributed(load));
        let (mesh, loads) = assemble(&model, 4);

        let total_fy: f64 = (0..mesh.nodes.len()).map(|n| loads.forces[(3 * n + 1, 0)]).sum();
        assert_relative_eq!(total_fy, -3.0 * 4.5, epsilon = 1e-12);
    }

    #[test]
    fn test_global_load_on_inclined_beam() {
        let mut model = Model::new();
        let a = model.add_node(Node::new(0.0, 0.0));
        let b = model.add_node(Node::new(3.0, 4.0));
        model.add_beam(Beam::new(a, b, SectionStiffness::new(1.0, 1.0))).unwrap();
        model.add_load_group(
            LoadGroup::new().with_distributed(DistributedLoad::self_weight(0, 2.0)),
        );
        let (_, loads) = assemble(&model, 1);

        // Gravity per unit beam length over L = 5
        assert_relative_eq!(loads.forces[(1, 0)] + loads.forces[(4, 0)], -10.0, epsilon = 1e-12);
        assert_relative_eq!(loads.forces[(0, 0)] + loads.forces[(3, 0)], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_released_end_moment_is_condensed() {
        let load = DistributedLoad::uniform(0, LineLoad::transverse(-1.0));
        let group = LoadGroup::new().with_distributed(load);
        let mut model = beam_model(4.0, group);
        model.beams[0].releases = BeamReleases::pin_end();
        let (_, loads) = assemble(&model, 1);
        let element = &loads.elements[0][0];
        assert_eq!(element.condensed[5], 0.0);
        // Propped cantilever: fixed-end moment wL²/8
        assert_relative_eq!(element.condensed[2], -16.0 / 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_nodal_loads_go_straight_to_forces() {
        let model = beam_model(1.0, LoadGroup::new().with_nodal(NodalLoad::new(1, 3.0, -2.0, 1.5)));
        let (_, loads) = assemble(&model, 1);
        let column: Vec<f64> = loads.forces.column(0).iter().copied().collect();
        assert_eq!(column, vec![0.0, 0.0, 0.0, 3.0, -2.0, 1.5]);
        assert!(loads.elements[0][0].spans.is_empty());
    }
}
