//! Crate-wide error types.
//!
//! Hand-rolled `Display`/`Error` impls, not `thiserror`: the teacher crate
//! never pulls in a derive-macro error library (see `mem::arena::error`),
//! so this crate follows the same convention.

use std::error::Error;
use std::fmt;

/// A precondition failure detected at `Simulation::start`. Per `spec.md`
/// §7, configuration errors fail fast; the caller must construct a new
/// simulator rather than recover in place.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `bridge_height >= 2 * circle_radius`: the bridge would be taller
    /// than the reservoirs it connects.
    BridgeTallerThanReservoir { bridge_height: f64, circle_radius: f64 },
    /// `left_ratio` was outside `[0, 1]`.
    LeftRatioOutOfRange { left_ratio: f64 },
    /// `distance_as_channel_length` was set while `gate_is_flat` was not.
    ChannelLengthRequiresFlatGate,
    /// A geometric parameter that must be strictly positive was not.
    NonPositiveGeometry { field: &'static str, value: f64 },
    /// A gate capacity of zero would make the gate permanently impassable.
    ZeroGateCapacity { side: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::BridgeTallerThanReservoir {
                bridge_height,
                circle_radius,
            } => write!(
                f,
                "bridge_height ({bridge_height}) must be less than 2 * circle_radius ({})",
                2.0 * circle_radius
            ),
            ConfigError::LeftRatioOutOfRange { left_ratio } => {
                write!(f, "left_ratio ({left_ratio}) must lie in [0, 1]")
            }
            ConfigError::ChannelLengthRequiresFlatGate => write!(
                f,
                "distance_as_channel_length requires gate_is_flat (arc gates have no fixed channel length)"
            ),
            ConfigError::NonPositiveGeometry { field, value } => {
                write!(f, "{field} ({value}) must be strictly positive")
            }
            ConfigError::ZeroGateCapacity { side } => {
                write!(f, "{side} gate capacity must be at least 1")
            }
        }
    }
}

impl Error for ConfigError {}

/// An error surfaced from `Simulation::update`.
///
/// Numerical degeneracies (a particle with no event inside `max_path`, a
/// commit landing outside the domain) are *not* represented here -- per
/// `spec.md` §7 they are recovered locally and only counted. This type
/// covers the two failure modes `update` cannot recover from by itself:
/// a broken scheduler invariant, and an error from a caller-supplied
/// output sink.
#[derive(Debug)]
pub enum SimulationError<E: Error> {
    /// A particle index was not found in the event scheduler where the
    /// bookkeeping guarantees it should have been. This is a programmer
    /// error in scheduler bookkeeping, not a numerical glitch, and has no
    /// automatic recovery.
    InvariantBroken(String),
    /// Propagated verbatim from a `TotalsSink`/`SnapshotSink`/`ChiSink`
    /// write. Core state remains valid; the caller decides whether to
    /// retry or abort.
    Sink(E),
}

impl<E: Error> fmt::Display for SimulationError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::InvariantBroken(message) => {
                write!(f, "simulator invariant broken: {message}")
            }
            SimulationError::Sink(err) => write!(f, "output sink error: {err}"),
        }
    }
}

impl<E: Error + 'static> Error for SimulationError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SimulationError::InvariantBroken(_) => None,
            SimulationError::Sink(err) => Some(err),
        }
    }
}
