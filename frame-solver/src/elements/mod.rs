//! Structural elements module

mod beam;
mod node;
mod support;

pub use beam::{Beam, BeamReleases, SectionStiffness};
pub use node::Node;
pub use support::{BoundaryConditions, RestrictedDegree, Spring};
