//! Frame Solver - A 2D linear-elastic frame and truss finite element library
//!
//! Built for bridge design studies that solve the same structure many times
//! under many load groups:
//! - Beams with axial, bending and optional shear deformation (Timoshenko)
//! - Moment releases (hinges) at beam ends
//! - Nodal, point, linearly distributed and functional loads
//! - Fixed, skewed and prescribed-displacement supports, elastic springs
//! - One factorization for all load groups
//! - Internal forces and displacements at arbitrary points along a beam
//! - Load combinations and envelopes
//!
//! ## Example
//! ```rust
//! use frame_solver::prelude::*;
//!
//! let mut model = Model::new();
//!
//! // Nodes
//! let a = model.add_node(Node::new(0.0, 0.0));
//! let b = model.add_node(Node::new(10.0, 0.0));
//!
//! // Beam with EA and EI
//! let beam = model.add_beam(Beam::new(a, b, SectionStiffness::new(2.0e7, 4.0e5))).unwrap();
//!
//! // Supports
//! model.add_restraint(RestrictedDegree::pinned(a)).unwrap();
//! model.add_restraint(RestrictedDegree::roller_y(b)).unwrap();
//!
//! // Loads
//! model.add_load_group(
//!     LoadGroup::named("LL")
//!         .with_distributed(DistributedLoad::uniform(beam, LineLoad::transverse(-2.0))),
//! );
//!
//! // Analyze
//! let solution = model.solve(&AnalysisOptions::new().with_elements(4)).unwrap();
//!
//! // Mid-span moment q·L²/8
//! let mid = solution.point("LL", beam, 5.0).unwrap();
//! assert!((mid.force.m - 25.0).abs() < 1e-6);
//! ```

pub mod analysis;
pub mod bundle;
pub mod elements;
pub mod error;
pub mod loads;
pub mod math;
pub mod model;
pub mod results;
pub mod solution;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{AnalysisOptions, Meshing};
    pub use crate::bundle::{ModelBundle, PointQuery, SolveRequest, SolveResponse};
    pub use crate::elements::{
        Beam, BeamReleases, BoundaryConditions, Node, RestrictedDegree, SectionStiffness, Spring,
    };
    pub use crate::error::{FrameError, FrameResult};
    pub use crate::loads::{
        Combination, DistributedLoad, FunctionalLoad, InitialDisplacement, LineLoad, LoadAxes,
        LoadGroup, NodalLoad, PointLoad,
    };
    pub use crate::model::Model;
    pub use crate::results::{
        Displacement, GroupResult, InternalForce, PointResult, Reaction, SolveWarning,
    };
    pub use crate::solution::Solution;
}
