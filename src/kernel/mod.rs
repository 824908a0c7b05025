//! Closed-form time-to-impact against every boundary a particle can meet,
//! plus the specular reflection law. Every function here is pure: given a
//! position, a heading, and the (immutable) domain geometry, it answers
//! "when, if ever, does this ray meet this surface" without touching any
//! simulator state.
//!
//! `spec.md` §4.2 describes five event types: the two bridge rails, the
//! current-side reservoir arc, the gate aperture, and the synthetic
//! mid-line resync. The tolerance and bias conventions below (`EPSILON`,
//! `bias`) are shared by every boundary and by the planner that combines
//! them.

use std::f64::consts::PI;

use crate::geometry::{Geometry, Side};
use crate::vec::vec2::Vec2;

/// Every accepted event time is nudged by this much so the post-event
/// position lands strictly on the correct side of the boundary it just
/// crossed. `spec.md` §4.2 calls this out explicitly: smaller risks
/// re-hitting the same surface next step, larger lets particles drift
/// outside the domain.
pub const EPSILON: f64 = 1e-14;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ImpactKind {
    /// The heading changes at impact (bridge rails, reservoir arc walls).
    Reflective,
    /// The heading is unchanged; the event exists only to force a
    /// recompute/resync at an exact boundary crossing (gate aperture,
    /// mid-line).
    NonReflective,
}

impl ImpactKind {
    /// The sign of the `EPSILON` nudge applied to this event's committed
    /// time: `-EPSILON` for reflective events, `+EPSILON` otherwise.
    pub fn bias(self) -> f64 {
        match self {
            ImpactKind::Reflective => -EPSILON,
            ImpactKind::NonReflective => EPSILON,
        }
    }
}

/// A candidate (or chosen) collision: when it happens, what heading it
/// leaves the particle with, and whether that heading change occurred at
/// all.
#[derive(Debug, Copy, Clone)]
pub struct Impact {
    pub time: f64,
    pub out_angle: f64,
    pub kind: ImpactKind,
}

/// Wraps an angle into `(-pi, pi]`.
pub fn normalize_angle(angle: f64) -> f64 {
    let two_pi = 2.0 * PI;
    let mut wrapped = angle % two_pi;

    if wrapped <= -PI {
        wrapped += two_pi;
    } else if wrapped > PI {
        wrapped -= two_pi;
    }

    wrapped
}

/// `alpha_out = (2n - alpha_in + pi) mod 2*pi`.
pub fn reflect(incoming: f64, normal: f64) -> f64 {
    normalize_angle(2.0 * normal - incoming + PI)
}

fn nearer(a: Option<Impact>, b: Option<Impact>) -> Option<Impact> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if a.time <= b.time { a } else { b }),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

/// Folds any number of candidate events down to the single earliest one.
/// The simulation planner uses this to combine the bridge, wall, gate, and
/// mid-line candidates into the one event that actually happens next.
pub(crate) fn earliest<I: IntoIterator<Item = Option<Impact>>>(candidates: I) -> Option<Impact> {
    candidates.into_iter().fold(None, nearer)
}

/// Time to hit whichever of the two bridge rails (`y = +h/2`, `y = -h/2`)
/// comes first, restricted to the rail's horizontal extent
/// `|x| <= bridge_length / 2`. The bottom rail's inward normal is `+pi/2`;
/// the top rail's is `-pi/2`.
pub fn time_to_hit_bridge(pos: Vec2, dir: f64, geometry: &Geometry) -> Option<Impact> {
    let half_height = geometry.bridge_height / 2.0;
    let half_length = geometry.bridge_length / 2.0;

    let rail = |rail_y: f64, normal: f64| -> Option<Impact> {
        let sin_dir = dir.sin();

        if sin_dir.abs() < EPSILON {
            return None;
        }

        let t = (rail_y - pos.y) / sin_dir;

        if !(t > EPSILON && t <= geometry.max_path) {
            return None;
        }

        let x_hit = pos.x + t * dir.cos();

        if x_hit.abs() > half_length {
            return None;
        }

        Some(Impact {
            time: t,
            out_angle: reflect(dir, normal),
            kind: ImpactKind::Reflective,
        })
    };

    nearer(rail(half_height, -PI / 2.0), rail(-half_height, PI / 2.0))
}

/// The smaller positive real root of the ray-circle quadratic for `side`'s
/// reservoir, along with the impact point and the inward-pointing normal
/// angle (toward the circle's center -- the correct reflection normal for
/// a particle bouncing off the inside of the arc).
fn circle_forward_root(pos: Vec2, dir: f64, geometry: &Geometry, side: Side) -> Option<(f64, Vec2)> {
    let center_x = geometry.center_x(side);

    let dx = pos.x - center_x;
    let dy = pos.y;

    let dir_x = dir.cos();
    let dir_y = dir.sin();

    let a = dir_x * dir_x + dir_y * dir_y;
    let b = 2.0 * (dx * dir_x + dy * dir_y);
    let c = dx * dx + dy * dy - geometry.circle_radius * geometry.circle_radius;

    let discriminant = b * b - 4.0 * a * c;

    if discriminant < 0.0 {
        return None;
    }

    let sqrt_discriminant = discriminant.sqrt();

    let t1 = (-b - sqrt_discriminant) / (2.0 * a);
    let t2 = (-b + sqrt_discriminant) / (2.0 * a);

    for t in [t1.min(t2), t1.max(t2)] {
        if t > EPSILON && t <= geometry.max_path {
            let hit = Vec2::new(pos.x + t * dir_x, pos.y + t * dir_y);

            return Some((t, hit));
        }
    }

    None
}

/// Time to hit `side`'s reservoir wall -- the portion of its arc that
/// lies *outside* the bridge rectangle (the portion inside it is the gate
/// cap, handled by [`time_to_hit_gate_arc`]).
pub fn time_to_hit_circle(pos: Vec2, dir: f64, geometry: &Geometry, side: Side) -> Option<Impact> {
    let (t, hit) = circle_forward_root(pos, dir, geometry, side)?;

    if geometry.in_bridge(hit) {
        return None;
    }

    let center_x = geometry.center_x(side);
    let normal = (0.0 - hit.y).atan2(center_x - hit.x);

    Some(Impact {
        time: t,
        out_angle: reflect(dir, normal),
        kind: ImpactKind::Reflective,
    })
}

/// Flat-mode gate aperture: the planes `x = +bridge_length/2` and
/// `x = -bridge_length/2`, i.e. the bridge/reservoir seam. Non-reflective:
/// crossing it doesn't change heading, it only forces a recompute at the
/// exact moment gate membership (`Geometry::in_gate`) flips.
pub fn time_to_hit_gate_flat(pos: Vec2, dir: f64, geometry: &Geometry) -> Option<Impact> {
    let half_length = geometry.bridge_length / 2.0;
    let cos_dir = dir.cos();

    if cos_dir.abs() < EPSILON {
        return None;
    }

    let mut best: Option<f64> = None;

    for plane_x in [half_length, -half_length] {
        let t = (plane_x - pos.x) / cos_dir;

        if t > EPSILON && t <= geometry.max_path {
            best = Some(match best {
                Some(current) => current.min(t),
                None => t,
            });
        }
    }

    best.map(|time| Impact {
        time,
        out_angle: dir,
        kind: ImpactKind::NonReflective,
    })
}

/// Arc-mode gate aperture: the portion of `side`'s reservoir arc that
/// lies *inside* the bridge rectangle.
pub fn time_to_hit_gate_arc(pos: Vec2, dir: f64, geometry: &Geometry, side: Side) -> Option<Impact> {
    let (t, hit) = circle_forward_root(pos, dir, geometry, side)?;

    if !geometry.in_bridge(hit) {
        return None;
    }

    Some(Impact {
        time: t,
        out_angle: dir,
        kind: ImpactKind::NonReflective,
    })
}

/// The synthetic mid-line event: a vertical "barrier" at `x = 0` spanning
/// `|y| <= h/2`, used solely to force a recompute at the instant a
/// particle crosses from one side of the bridge to the other, so the
/// `in_left` cache and gate membership flip exactly on time.
pub fn time_to_hit_middle(pos: Vec2, dir: f64, geometry: &Geometry) -> Option<Impact> {
    let cos_dir = dir.cos();

    if cos_dir.abs() < EPSILON {
        return None;
    }

    let t = -pos.x / cos_dir;

    if !(t > EPSILON && t <= geometry.max_path) {
        return None;
    }

    let y_hit = pos.y + t * dir.sin();

    if y_hit.abs() > geometry.bridge_height / 2.0 {
        return None;
    }

    Some(Impact {
        time: t,
        out_angle: dir,
        kind: ImpactKind::NonReflective,
    })
}
