//! The static, process-wide domain description: two circular reservoirs of
//! radius `R` joined by a rectangular bridge of height `h`, and the
//! membership predicates particles are tested against every event.
//!
//! Everything here is pure and immutable after construction -- `Geometry`
//! is computed once by [`Geometry::new`] (spec.md's `couple_bridge` fit-up)
//! and then shared by reference for the lifetime of a `Simulation`.

use crate::error::ConfigError;
use crate::vec::vec2::Vec2;

/// Which reservoir (and which half of the bridge/gate) a quantity refers
/// to. `spec.md` writes this as "side" throughout; `sign()` recovers the
/// `sign(side)` used in the gate predicate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn sign(self) -> f64 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// The side whose reservoir a point's x-coordinate falls toward.
    /// `x == 0.0` is the boundary and is not meaningful here -- callers on
    /// the degenerate mid-line crossing path handle that case explicitly
    /// (spec.md §4.5 step 4).
    pub fn of_x(x: f64) -> Side {
        if x < 0.0 {
            Side::Left
        } else {
            Side::Right
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    /// `0` for `Left`, `1` for `Right` -- the index into the crate's
    /// per-side `[u64; 2]`/`[i64; 4]` counters.
    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub struct Geometry {
    pub num_particles: usize,
    pub circle_radius: f64,
    /// The gap between the reservoir circles along the x-axis, after
    /// `couple_bridge` has possibly adjusted it (see `distance_as_channel_length`).
    pub circle_distance: f64,
    pub bridge_height: f64,
    /// The bridge's full length along the x-axis, after `couple_bridge`.
    pub bridge_length: f64,
    pub left_center_x: f64,
    pub right_center_x: f64,
    /// A conservative upper bound on any single-event travel distance;
    /// used as the "no collision this step" sentinel by the kernel.
    pub max_path: f64,
    pub gate_is_flat: bool,
    pub left_gate_capacity: usize,
    pub right_gate_capacity: usize,
    pub explosion_direction_is_random: bool,
    pub distance_as_channel_length: bool,
}

impl Geometry {
    pub fn new(
        num_particles: usize,
        circle_radius: f64,
        circle_distance: f64,
        bridge_height: f64,
        gate_is_flat: bool,
        distance_as_channel_length: bool,
        left_gate_capacity: usize,
        right_gate_capacity: usize,
        explosion_direction_is_random: bool,
    ) -> Result<Self, ConfigError> {
        if circle_radius <= 0.0 {
            return Err(ConfigError::NonPositiveGeometry {
                field: "circle_radius",
                value: circle_radius,
            });
        }

        if circle_distance <= 0.0 {
            return Err(ConfigError::NonPositiveGeometry {
                field: "circle_distance",
                value: circle_distance,
            });
        }

        if bridge_height <= 0.0 {
            return Err(ConfigError::NonPositiveGeometry {
                field: "bridge_height",
                value: bridge_height,
            });
        }

        if bridge_height >= 2.0 * circle_radius {
            return Err(ConfigError::BridgeTallerThanReservoir {
                bridge_height,
                circle_radius,
            });
        }

        if distance_as_channel_length && !gate_is_flat {
            return Err(ConfigError::ChannelLengthRequiresFlatGate);
        }

        if left_gate_capacity == 0 {
            return Err(ConfigError::ZeroGateCapacity { side: "left" });
        }

        if right_gate_capacity == 0 {
            return Err(ConfigError::ZeroGateCapacity { side: "right" });
        }

        let (bridge_length, circle_distance) = couple_bridge(
            circle_distance,
            circle_radius,
            bridge_height,
            distance_as_channel_length,
        );

        let left_center_x = -circle_distance / 2.0 - circle_radius;
        let right_center_x = circle_distance / 2.0 + circle_radius;

        let max_path = circle_distance + bridge_height + 4.0 * circle_radius;

        Ok(Self {
            num_particles,
            circle_radius,
            circle_distance,
            bridge_height,
            bridge_length,
            left_center_x,
            right_center_x,
            max_path,
            gate_is_flat,
            left_gate_capacity,
            right_gate_capacity,
            explosion_direction_is_random,
            distance_as_channel_length,
        })
    }

    pub fn center_x(&self, side: Side) -> f64 {
        match side {
            Side::Left => self.left_center_x,
            Side::Right => self.right_center_x,
        }
    }

    pub fn gate_capacity(&self, side: Side) -> usize {
        match side {
            Side::Left => self.left_gate_capacity,
            Side::Right => self.right_gate_capacity,
        }
    }

    /// `(x - c_side)^2 + y^2 < R^2`, strict.
    pub fn in_circle(&self, p: Vec2, side: Side) -> bool {
        let c = self.center_x(side);
        (p.x - c).powi(2) + p.y.powi(2) < self.circle_radius.powi(2)
    }

    /// `|x| <= L/2 && |y| <= h/2`.
    pub fn in_bridge(&self, p: Vec2) -> bool {
        p.x.abs() <= self.bridge_length / 2.0 && p.y.abs() <= self.bridge_height / 2.0
    }

    pub fn in_domain(&self, p: Vec2) -> bool {
        self.in_bridge(p) || self.in_circle(p, Side::of_x(p.x))
    }

    /// The portion of the bridge adjacent to `side` whose occupancy is
    /// capped: a flat segment when `gate_is_flat`, otherwise the cap
    /// carved out of the reservoir's arc by the bridge rectangle.
    pub fn in_gate(&self, p: Vec2, side: Side) -> bool {
        let facing = side.sign() * p.x >= 0.0;

        if !facing {
            return false;
        }

        if self.gate_is_flat {
            p.x.abs() <= self.bridge_length / 2.0
        } else {
            !self.in_circle(p, side)
        }
    }

    /// The position a particle is snapped to when a safety repair finds it
    /// has drifted outside the domain: the reservoir center on its current
    /// side, per spec.md §4.5 step 3.
    pub fn nominal_reservoir_position(&self, side: Side) -> Vec2 {
        Vec2::new(side.sign() * (self.circle_distance / 2.0 + self.circle_radius), 0.0)
    }
}

/// Lengthens (or, under `distance_as_channel_length`, shrinks) the bridge
/// so its flat rails meet the circular reservoir arcs exactly.
///
/// The circle's arc bulges into the nominal bridge rectangle by
/// `R - sqrt(R^2 - (h/2)^2)` on each side; `delta` below is twice that
/// penetration, negated, i.e. the (negative) correction needed so the
/// rails' endpoints land exactly on the arcs rather than inside them.
fn couple_bridge(
    circle_distance: f64,
    circle_radius: f64,
    bridge_height: f64,
    distance_as_channel_length: bool,
) -> (f64, f64) {
    let half_height = bridge_height / 2.0;

    let delta = 2.0 * (circle_radius.powi(2) - half_height.powi(2)).sqrt() - 2.0 * circle_radius;

    if distance_as_channel_length {
        (circle_distance, circle_distance + delta)
    } else {
        (circle_distance - delta, circle_distance)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn geometry(gate_is_flat: bool, distance_as_channel_length: bool) -> Geometry {
        Geometry::new(1, 1.0, 0.5, 0.1, gate_is_flat, distance_as_channel_length, 3, 3, false)
            .unwrap()
    }

    #[test]
    fn rejects_bridge_taller_than_reservoir() {
        let err = Geometry::new(1, 1.0, 0.5, 2.5, false, false, 3, 3, false).unwrap_err();
        assert!(matches!(err, ConfigError::BridgeTallerThanReservoir { .. }));
    }

    #[test]
    fn rejects_channel_length_mode_without_flat_gate() {
        let err = Geometry::new(1, 1.0, 0.5, 0.1, false, true, 3, 3, false).unwrap_err();
        assert_eq!(err, ConfigError::ChannelLengthRequiresFlatGate);
    }

    #[test]
    fn rejects_zero_capacity() {
        let err = Geometry::new(1, 1.0, 0.5, 0.1, false, false, 0, 3, false).unwrap_err();
        assert_eq!(err, ConfigError::ZeroGateCapacity { side: "left" });
    }

    #[test]
    fn bridge_length_exceeds_nominal_distance_when_not_channel_length() {
        let g = geometry(false, false);
        assert!(g.bridge_length > g.circle_distance);
    }

    #[test]
    fn reservoir_center_is_in_circle_but_bridge_center_is_not_double_counted() {
        let g = geometry(true, false);
        assert!(g.in_circle(Vec2::new(g.left_center_x, 0.0), Side::Left));
        assert!(!g.in_circle(Vec2::new(g.left_center_x, 0.0), Side::Right));
    }

    #[test]
    fn domain_membership_covers_bridge_and_both_reservoirs() {
        let g = geometry(true, false);
        assert!(g.in_domain(Vec2::new(0.0, 0.0)));
        assert!(g.in_domain(Vec2::new(g.left_center_x, 0.0)));
        assert!(g.in_domain(Vec2::new(g.right_center_x, 0.0)));
        assert!(!g.in_domain(Vec2::new(0.0, g.bridge_height)));
    }

    #[test]
    fn flat_gate_is_a_vertical_strip_at_the_bridge_ends() {
        let g = geometry(true, false);
        let half_l = g.bridge_length / 2.0;
        assert!(g.in_gate(Vec2::new(half_l, 0.0), Side::Right));
        assert!(!g.in_gate(Vec2::new(-half_l, 0.0), Side::Right));
        assert!(g.in_gate(Vec2::new(-half_l, 0.0), Side::Left));
    }

    #[test]
    fn arc_gate_is_the_bridge_cap_carved_from_the_circle() {
        let g = geometry(false, false);
        // A point just inside the bridge, near the right rail, facing the
        // right reservoir but not yet inside its circle, is in the right gate.
        let p = Vec2::new(g.bridge_length / 2.0 - 1e-6, 0.0);
        assert!(g.in_gate(p, Side::Right));
        assert!(!g.in_gate(p, Side::Left));
    }
}
