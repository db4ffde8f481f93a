//! Element stiffness and global stiffness assembly

use nalgebra_sparse::CsrMatrix;

use super::discretize::{Discretization, Element};
use crate::elements::Spring;
use crate::math::{self, Mat6, SparseMatrixBuilder, Vec6};

/// Stiffness of one element in local and global axes
#[derive(Debug, Clone)]
pub(crate) struct ElementStiffness {
    /// Local stiffness without releases
    pub local: Mat6,
    /// Local stiffness with released rotations condensed out
    pub condensed: Mat6,
    /// Local to global rotation
    pub rotation: Mat6,
    pub releases: [bool; 2],
}

impl ElementStiffness {
    pub fn new(element: &Element) -> Self {
        let s = &element.stiffness;
        let local = math::element_local_stiffness(s.ea, s.ei, s.shear_stiffness(), element.length);
        let (condensed, _) = math::apply_releases(&local, &Vec6::zeros(), element.releases);
        Self {
            local,
            condensed,
            rotation: math::rotation_matrix(element.cos, element.sin),
            releases: element.releases,
        }
    }

    /// Condensed stiffness in global axes
    pub fn global(&self) -> Mat6 {
        self.rotation * self.condensed * self.rotation.transpose()
    }

    /// Condense a local fixed-end vector consistently with the stiffness
    pub fn condense_loads(&self, q: &Vec6) -> Vec6 {
        math::apply_releases(&self.local, q, self.releases).1
    }
}

/// Assemble the global stiffness matrix (springs on the diagonal, global axes)
pub(crate) fn assemble_stiffness(
    mesh: &Discretization,
    elements: &[ElementStiffness],
    springs: &[Spring],
) -> CsrMatrix<f64> {
    let mut builder = SparseMatrixBuilder::new(mesh.dof_count());

    for (element, stiffness) in mesh.elements.iter().zip(elements) {
        builder.add_element_matrix(&element.dofs(), &stiffness.global());
    }

    for spring in springs {
        for (i, k) in spring.stiffness().into_iter().enumerate() {
            builder.add(3 * spring.node + i, 3 * spring.node + i, k);
        }
    }

    log::debug!("Assembled global stiffness: {} triplets", builder.nnz());
    builder.to_csr()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Meshing;
    use crate::elements::{Beam, BeamReleases, Node, SectionStiffness};
    use crate::model::Model;
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    #[test]
    fn test_global_stiffness_is_symmetric_and_singular_without_supports() {
        let mut model = Model::new();
        let a = model.add_node(Node::new(0.0, 0.0));
        let b = model.add_node(Node::new(3.0, 4.0));
        model.add_beam(Beam::new(a, b, SectionStiffness::new(100.0, 10.0))).unwrap();
        let mesh = Discretization::build(&model, &[BeamReleases::none()], &Meshing::FixedCount(2));
        let elements: Vec<_> = mesh.elements.iter().map(ElementStiffness::new).collect();
        let k = DMatrix::from(&assemble_stiffness(&mesh, &elements, &[]));

        assert_relative_eq!(k, k.transpose(), epsilon = 1e-9);
        // Rigid translation along the beam produces no force
        let mut d = nalgebra::DVector::zeros(mesh.dof_count());
        for node in 0..mesh.nodes.len() {
            d[3 * node] = 0.6;
            d[3 * node + 1] = 0.8;
        }
        assert_relative_eq!((&k * &d).norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_springs_add_to_diagonal() {
        let mut model = Model::new();
        let a = model.add_node(Node::new(0.0, 0.0));
        let b = model.add_node(Node::new(2.0, 0.0));
        model.add_beam(Beam::new(a, b, SectionStiffness::new(1.0, 1.0))).unwrap();
        let mesh = Discretization::build(&model, &[BeamReleases::none()], &Meshing::FixedCount(1));
        let elements: Vec<_> = mesh.elements.iter().map(ElementStiffness::new).collect();
        let springs = [Spring::new(1, 0.0, 7.0, 0.0)];
        let k = DMatrix::from(&assemble_stiffness(&mesh, &elements, &springs));
        assert_relative_eq!(k[(4, 4)], 12.0 / 8.0 + 7.0);
    }
}
