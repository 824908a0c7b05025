//! Combines the kernel's individual boundary tests into the single "what
//! happens next" answer a particle's replan step needs.

use crate::geometry::{Geometry, Side};
use crate::kernel::{earliest, time_to_hit_bridge, time_to_hit_circle, time_to_hit_gate_arc, time_to_hit_gate_flat, time_to_hit_middle, Impact};
use crate::vec::vec2::Vec2;

/// The earliest of: the two bridge rails, the current-side reservoir wall,
/// the current-side gate aperture, and the synthetic mid-line resync.
/// `None` means every candidate came back empty -- a numerical degeneracy
/// `spec.md` §4.3 handles by resetting the particle and retrying.
pub fn evaluate_impacts(pos: Vec2, dir: f64, geometry: &Geometry) -> Option<Impact> {
    let side = Side::of_x(pos.x);

    let gate = if geometry.gate_is_flat {
        time_to_hit_gate_flat(pos, dir, geometry)
    } else {
        time_to_hit_gate_arc(pos, dir, geometry, side)
    };

    earliest([
        time_to_hit_bridge(pos, dir, geometry),
        time_to_hit_circle(pos, dir, geometry, side),
        gate,
        time_to_hit_middle(pos, dir, geometry),
    ])
}
