//! Load types, load groups and load combinations

mod distributed;
mod functional;
mod initial_displacement;
mod load_combo;
mod load_group;
mod node_load;
mod point_load;

pub use distributed::{DistributedLoad, LineLoad};
pub use functional::{FunctionalLoad, LoadFn};
pub use initial_displacement::InitialDisplacement;
pub use load_combo::{Combinable, Combination, CombinationCache};
pub use load_group::LoadGroup;
pub use node_load::NodalLoad;
pub use point_load::{LoadAxes, PointLoad};

use crate::error::{FrameError, FrameResult};

/// Relative tolerance on load positions
pub(crate) const POSITION_TOLERANCE: f64 = 1e-9;

/// Resolve a position along a beam of `length`: negative values count back from the end
///
/// Values slightly outside `[0, length]` are clamped; anything further out is a
/// [`FrameError::LoadRange`].
pub(crate) fn normalize_position(beam: usize, value: f64, length: f64) -> FrameResult<f64> {
    let x = if value < 0.0 { length + value } else { value };
    let tol = POSITION_TOLERANCE * length.max(1.0);
    if !x.is_finite() || x < -tol || x > length + tol {
        return Err(FrameError::LoadRange {
            beam,
            position: value,
            length,
        });
    }
    Ok(x.clamp(0.0, length))
}

/// Resolve the `[from, to]` span of a line load; `to == 0` means the full length
pub(crate) fn normalize_span(
    beam: usize,
    from: f64,
    to: f64,
    length: f64,
) -> FrameResult<(f64, f64)> {
    let start = normalize_position(beam, from, length)?;
    let end = if to == 0.0 {
        length
    } else {
        normalize_position(beam, to, length)?
    };
    if end < start {
        return Err(FrameError::LoadRange {
            beam,
            position: to,
            length,
        });
    }
    Ok((start, end))
}
