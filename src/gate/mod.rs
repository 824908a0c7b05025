//! The gate admission/departure/explosion protocol (`spec.md` §4.6) and
//! the ordered per-side occupancy list it operates on.
//!
//! `GateContents` plays the role the teacher crate's
//! `physics::simulation::contact::StaticContactList` plays for static
//! contacts: a small ordered collection that preserves insertion order
//! (required here so an explosion retracts residents in the order they
//! arrived, per `spec.md` §5's ordering guarantee) backed by a plain
//! `Vec` rather than a fixed-capacity array, since gate capacities are a
//! runtime configuration value rather than a compile-time constant.

use std::f64::consts::PI;

use crate::geometry::Side;
use crate::kernel::normalize_angle;
use crate::random::UniformSource;

#[derive(Debug, Clone)]
pub struct GateContents {
    capacity: usize,
    occupants: Vec<usize>,
}

impl GateContents {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            occupants: Vec::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.occupants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.occupants.len() >= self.capacity
    }

    pub fn contains(&self, index: usize) -> bool {
        self.occupants.contains(&index)
    }

    /// Admits `index`, assuming the caller has already checked
    /// `!is_full()`. Returns `false` (a no-op) if `index` is already a
    /// resident, matching `spec.md`'s "If `i not in gate_contents[s]`"
    /// admission guard.
    pub fn admit(&mut self, index: usize) -> bool {
        if self.contains(index) {
            return false;
        }

        self.occupants.push(index);

        true
    }

    /// Removes `index` if present; preserves the relative order of the
    /// remaining occupants.
    pub fn remove(&mut self, index: usize) -> bool {
        if let Some(position) = self.occupants.iter().position(|&i| i == index) {
            self.occupants.remove(position);
            true
        } else {
            false
        }
    }

    /// The current residents, in arrival order. Used by explosion
    /// processing, which needs a stable snapshot to iterate while the
    /// underlying list is mutated.
    pub fn occupants(&self) -> &[usize] {
        &self.occupants
    }

    pub fn clear(&mut self) {
        self.occupants.clear();
    }
}

/// The heading a particle leaves an exploding gate with.
///
/// Random mode samples uniformly within the half-plane that points into
/// the correct reservoir (`[-pi/2, pi/2]` on the right, `[pi/2, 3pi/2]` on
/// the left) so the retraction always flies the particle back into its
/// own side. Deterministic mode only flips particles that were headed
/// toward the *opposite* side; particles already headed into their own
/// reservoir are left alone.
pub fn retraction_angle<R: UniformSource>(
    side: Side,
    dir: f64,
    pos_x: f64,
    explosion_direction_is_random: bool,
    rng: &mut R,
) -> f64 {
    if explosion_direction_is_random {
        let sampled = match side {
            Side::Right => rng.sample_range(-PI / 2.0, PI / 2.0),
            Side::Left => rng.sample_range(PI / 2.0, 3.0 * PI / 2.0),
        };

        normalize_angle(sampled)
    } else if dir.cos() * pos_x < 0.0 {
        normalize_angle(dir + PI)
    } else {
        dir
    }
}
