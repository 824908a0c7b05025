//! The orchestrator: owns the geometry, the particle population, the event
//! scheduler, and both gates, and drives the `setup -> start -> update* ->
//! finish` lifecycle `spec.md` §4 describes.
//!
//! Grounded on the teacher crate's `physics::simulation::Simulation`, which
//! plays the same role for a force-integration loop -- a struct that owns
//! every piece of mutable world state and exposes a small number of
//! lifecycle methods, with the actual physics pushed down into free
//! functions (`kernel`, here; `force`/`integration` there).

mod planner;

use crate::error::{ConfigError, SimulationError};
use crate::gate::{retraction_angle, GateContents};
use crate::geometry::{Geometry, Side};
use crate::io::{ResultsHeader, SnapshotFrame, SnapshotSink, Totals};
use crate::particle::Particle;
use crate::random::UniformSource;
use crate::scheduler::EventScheduler;
use crate::vec::vec2::Vec2;

use planner::evaluate_impacts;

/// Construction-time parameters for a [`Simulation`]. Everything here maps
/// directly onto a `Geometry::new` argument or a piece of run bookkeeping;
/// see `spec.md` §3 for the meaning of each field.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub num_particles: usize,
    pub circle_radius: f64,
    pub circle_distance: f64,
    pub bridge_height: f64,
    pub gate_is_flat: bool,
    pub distance_as_channel_length: bool,
    pub left_gate_capacity: usize,
    pub right_gate_capacity: usize,
    pub explosion_direction_is_random: bool,
    /// A hint for pre-sizing the `measuring_times`/`total_left` series, if
    /// the caller has an expectation for how many events a run will take.
    /// Purely an allocation optimization; has no effect on results.
    pub expected_collisions: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_particles: 1000,
            circle_radius: 1.0,
            circle_distance: 0.5,
            bridge_height: 0.2,
            gate_is_flat: false,
            distance_as_channel_length: false,
            left_gate_capacity: 3,
            right_gate_capacity: 3,
            explosion_direction_is_random: false,
            expected_collisions: None,
        }
    }
}

/// What a single [`Simulation::update`] call did.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StepOutcome {
    pub particle_index: usize,
    pub time: f64,
    /// `Some(side)` if this step's gate admission check found the gate
    /// full and triggered an explosion on `side`.
    pub explosion_side: Option<Side>,
    pub snapshots_written: usize,
}

#[derive(Debug, Clone)]
pub struct Simulation<R: UniformSource> {
    geometry: Geometry,
    particles: Vec<Particle>,
    scheduler: EventScheduler,
    left_gate: GateContents,
    right_gate: GateContents,
    rng: R,

    time: f64,
    in_left: usize,

    measuring_times: Vec<f64>,
    total_left: Vec<usize>,

    num_collisions: u64,
    reset_counter: u64,
    explosion_counter: [u64; 2],
    /// Signed mid-line crossings by direction: `[0]` left-to-right,
    /// `[1]` right-to-left. `[2]` and `[3]` are reserved for a second
    /// bridge channel, which this crate does not model; `spec.md`'s data
    /// model declares all four up front so a future second channel is a
    /// pure addition rather than a reshape.
    current_counters: [i64; 4],

    last_written_time: f64,
    started: bool,
}

impl<R: UniformSource> Simulation<R> {
    /// Builds the (immutable) domain geometry and empties every piece of
    /// run state. Particles are not placed until [`Simulation::start`].
    pub fn setup(config: SimulationConfig, rng: R) -> Result<Self, ConfigError> {
        let geometry = Geometry::new(
            config.num_particles,
            config.circle_radius,
            config.circle_distance,
            config.bridge_height,
            config.gate_is_flat,
            config.distance_as_channel_length,
            config.left_gate_capacity,
            config.right_gate_capacity,
            config.explosion_direction_is_random,
        )?;

        let capacity = config.expected_collisions.unwrap_or(0);

        Ok(Self {
            geometry,
            particles: Vec::with_capacity(config.num_particles),
            scheduler: EventScheduler::new(),
            left_gate: GateContents::new(config.left_gate_capacity),
            right_gate: GateContents::new(config.right_gate_capacity),
            rng,
            time: 0.0,
            in_left: 0,
            measuring_times: Vec::with_capacity(capacity),
            total_left: Vec::with_capacity(capacity),
            num_collisions: 0,
            reset_counter: 0,
            explosion_counter: [0, 0],
            current_counters: [0; 4],
            last_written_time: 0.0,
            started: false,
        })
    }

    /// Places every particle, `left_ratio` of them (rounded) in the left
    /// reservoir and the rest in the right, with a uniformly random
    /// position (rejection-sampled, per `spec.md` §4.1) and heading, then
    /// primes the event scheduler. Re-callable: starts a fresh run from
    /// the same geometry.
    pub fn start(&mut self, left_ratio: f64) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&left_ratio) {
            return Err(ConfigError::LeftRatioOutOfRange { left_ratio });
        }

        self.particles.clear();
        self.scheduler = EventScheduler::new();
        self.left_gate.clear();
        self.right_gate.clear();
        self.measuring_times.clear();
        self.total_left.clear();
        self.time = 0.0;
        self.in_left = 0;
        self.num_collisions = 0;
        self.reset_counter = 0;
        self.explosion_counter = [0, 0];
        self.current_counters = [0; 4];
        self.last_written_time = 0.0;

        let num_left = ((self.geometry.num_particles as f64) * left_ratio).round() as usize;

        for i in 0..self.geometry.num_particles {
            let side = if i < num_left { Side::Left } else { Side::Right };
            let pos = self.sample_start_position(side);
            let dir = self.rng.sample_angle_uniform();

            self.particles.push(Particle::new(pos, dir, 0.0));

            if pos.x < 0.0 {
                self.in_left += 1;
            }

            self.compute_next_impact(i);
            self.scheduler.insert(i, self.particles[i].next_impact_time);
        }

        self.measure();
        self.started = true;

        #[cfg(feature = "print_init_info")]
        println!(
            "simulation started: {} particles, left_ratio={left_ratio}, bridge_length={:.6}, gate_capacities=({}, {})",
            self.geometry.num_particles, self.geometry.bridge_length, self.geometry.left_gate_capacity, self.geometry.right_gate_capacity
        );

        Ok(())
    }

    /// Advances the simulation by exactly one event: pops the globally
    /// earliest pending impact, commits it, runs gate admission/departure
    /// (possibly triggering an explosion), replans the stepped particle,
    /// and records a measurement. Implements `spec.md` §4.5's eight steps.
    ///
    /// `write_dt`, when positive, asks for interpolated snapshots at every
    /// multiple of `write_dt` strictly before this event's time; pass
    /// [`crate::io::NullSink`] and `0.0` to skip this entirely.
    pub fn update<S: SnapshotSink>(&mut self, write_dt: f64, sink: &mut S) -> Result<StepOutcome, SimulationError<S::Error>> {
        debug_assert!(self.started, "update called before start");

        let (i, t_star) = self
            .scheduler
            .pop_min()
            .ok_or_else(|| SimulationError::InvariantBroken("event scheduler is empty".to_string()))?;

        if self.particles[i].next_impact_time != t_star {
            return Err(SimulationError::InvariantBroken(format!(
                "particle {i}: scheduler time {t_star} does not match next_impact_time {}",
                self.particles[i].next_impact_time
            )));
        }

        let mut snapshots_written = 0usize;

        if write_dt > 0.0 {
            while t_star > self.last_written_time + write_dt {
                let sample_time = self.last_written_time + write_dt;
                self.write_snapshot(sample_time, sink)?;
                self.last_written_time = sample_time;
                snapshots_written += 1;
            }
        }

        let mut particle = self.particles[i];

        if !self.geometry.in_domain(particle.next_pos) {
            #[cfg(feature = "print_warnings")]
            println!("particle {i}: next_pos {} left the domain at t={t_star}, snapping to reservoir center", particle.next_pos);

            particle.next_pos = self.geometry.nominal_reservoir_position(Side::of_x(particle.next_pos.x));
        }

        let old_x = particle.pos.x;
        let new_x = particle.next_pos.x;

        if old_x == 0.0 {
            #[cfg(feature = "print_warnings")]
            println!("particle {i}: degenerate mid-crossing departing exactly from x = 0");
        } else if old_x * new_x < 0.0 {
            if new_x < 0.0 {
                self.in_left += 1;
                self.current_counters[1] += 1;
            } else {
                self.in_left -= 1;
                self.current_counters[0] += 1;
            }
        }

        particle.pos = particle.next_pos;
        particle.dir = particle.next_dir;
        particle.impact_time = t_star;
        self.time = t_star;

        self.particles[i] = particle;

        let mut explosion_side = None;

        for side in [Side::Left, Side::Right] {
            let current = self.particles[i];
            let in_gate_now = self.geometry.in_gate(current.pos, side);
            let going_in = current.is_going_in();

            if in_gate_now && going_in {
                if self
                    .check_gate_admission(i, side)
                    .map_err(SimulationError::InvariantBroken)?
                {
                    explosion_side = Some(side);
                }
            } else {
                self.check_gate_departure(i, side);
            }
        }

        self.compute_next_impact(i);
        self.scheduler.insert(i, self.particles[i].next_impact_time);

        self.measure();
        self.num_collisions += 1;

        #[cfg(feature = "print_timing_info")]
        if self.num_collisions % 10_000 == 0 {
            println!("{} events processed, simulation time {:.6}", self.num_collisions, self.time);
        }

        Ok(StepOutcome {
            particle_index: i,
            time: self.time,
            explosion_side,
            snapshots_written,
        })
    }

    /// The accumulated `(measuring_times, total_left, total_right)` series,
    /// ready to hand to a `TotalsSink`.
    pub fn finish(&self) -> Totals {
        let total_right = self
            .total_left
            .iter()
            .map(|&left| self.geometry.num_particles - left)
            .collect();

        Totals {
            measuring_times: self.measuring_times.clone(),
            total_left: self.total_left.clone(),
            total_right,
        }
    }

    pub fn results_header(&self) -> ResultsHeader {
        ResultsHeader {
            num_particles: self.geometry.num_particles,
            circle_radius: self.geometry.circle_radius,
            circle_distance: self.geometry.circle_distance,
            bridge_height: self.geometry.bridge_height,
            bridge_length: self.geometry.bridge_length,
        }
    }

    /// `|2 * total_left[last] - N| / N`: how far the current split deviates
    /// from an even 50/50 partition.
    pub fn get_mass_spread(&self) -> f64 {
        let n = self.geometry.num_particles as f64;

        if n == 0.0 {
            return 0.0;
        }

        let last_left = *self.total_left.last().unwrap_or(&0) as f64;

        (2.0 * last_left - n).abs() / n
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn num_collisions(&self) -> u64 {
        self.num_collisions
    }

    pub fn reset_counter(&self) -> u64 {
        self.reset_counter
    }

    pub fn explosion_counter(&self, side: Side) -> u64 {
        self.explosion_counter[side.index()]
    }

    pub fn current_counters(&self) -> [i64; 4] {
        self.current_counters
    }

    pub fn in_left(&self) -> usize {
        self.in_left
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn left_gate(&self) -> &GateContents {
        &self.left_gate
    }

    pub fn right_gate(&self) -> &GateContents {
        &self.right_gate
    }

    fn gate_ref(&self, side: Side) -> &GateContents {
        match side {
            Side::Left => &self.left_gate,
            Side::Right => &self.right_gate,
        }
    }

    fn gate_mut(&mut self, side: Side) -> &mut GateContents {
        match side {
            Side::Left => &mut self.left_gate,
            Side::Right => &mut self.right_gate,
        }
    }

    fn set_gate_flag(&mut self, i: usize, side: Side, value: bool) {
        match side {
            Side::Left => self.particles[i].gates.in_left_gate = value,
            Side::Right => self.particles[i].gates.in_right_gate = value,
        }
    }

    /// Admits particle `i` into `side`'s gate if there is room; otherwise
    /// triggers an explosion and reports it to the caller. A no-op (and
    /// reports no explosion) if `i` is already a resident. `Err` only if
    /// the explosion finds the event scheduler inconsistent (`spec.md`
    /// §7's "logical invariant break", never recovered locally).
    fn check_gate_admission(&mut self, i: usize, side: Side) -> Result<bool, String> {
        if self.gate_ref(side).contains(i) {
            return Ok(false);
        }

        if !self.gate_ref(side).is_full() {
            self.gate_mut(side).admit(i);
            self.set_gate_flag(i, side, true);
            Ok(false)
        } else {
            self.explode(side, i)?;
            Ok(true)
        }
    }

    fn check_gate_departure(&mut self, i: usize, side: Side) {
        if self.gate_mut(side).remove(i) {
            self.set_gate_flag(i, side, false);
        }
    }

    /// `spec.md` §4.6: `side`'s gate is full and particle `trigger_i` just
    /// tried to enter it. The trigger is retracted (its heading resampled
    /// until it has a valid in-domain continuation) and every existing
    /// resident is interpolated to the current instant and retracted too.
    /// Per `spec.md` §9's recommended resolution of its own open question,
    /// the trigger is never itself admitted on this event.
    ///
    /// `Err` if a resident's entry has gone missing from the event
    /// scheduler -- `spec.md` §7's "particle lost from `sorted_indices`"
    /// fatal case, not a numerical glitch to recover from in place.
    fn explode(&mut self, side: Side, trigger_i: usize) -> Result<(), String> {
        self.explosion_counter[side.index()] += 1;

        let residents: Vec<usize> = self.gate_ref(side).occupants().to_vec();

        loop {
            let particle = self.particles[trigger_i];

            let new_dir = retraction_angle(
                side,
                particle.dir,
                particle.pos.x,
                self.geometry.explosion_direction_is_random,
                &mut self.rng,
            );

            if let Some(impact) = evaluate_impacts(particle.pos, new_dir, &self.geometry) {
                let next_pos = particle.pos + Vec2::from_angle(new_dir) * impact.time;

                if self.geometry.in_domain(next_pos) {
                    let mut p = particle;
                    p.dir = new_dir;
                    self.particles[trigger_i] = p;
                    break;
                }
            }
        }

        for resident_i in residents {
            let resident = self.particles[resident_i];

            let alpha = if resident.next_impact_time > resident.impact_time {
                ((self.time - resident.impact_time) / (resident.next_impact_time - resident.impact_time)).clamp(0.0, 1.0)
            } else {
                0.0
            };

            let interpolated = Vec2::interpolate(resident.pos, resident.next_pos, alpha);

            if !self.geometry.in_domain(interpolated) {
                #[cfg(feature = "print_warnings")]
                println!("explosion on {}: resident {resident_i} interpolated outside the domain, dropping from gate", side.label());

                self.gate_mut(side).remove(resident_i);
                self.set_gate_flag(resident_i, side, false);
                continue;
            }

            if !self.geometry.in_gate(interpolated, side) {
                self.gate_mut(side).remove(resident_i);
                self.set_gate_flag(resident_i, side, false);
                continue;
            }

            let old_next_impact_time = resident.next_impact_time;

            let mut p = resident;
            p.pos = interpolated;
            p.dir = retraction_angle(side, p.dir, p.pos.x, self.geometry.explosion_direction_is_random, &mut self.rng);
            p.impact_time = self.time;
            self.particles[resident_i] = p;

            self.compute_next_impact(resident_i);

            let reinserted =
                self.scheduler
                    .reinsert(resident_i, old_next_impact_time, self.particles[resident_i].next_impact_time, false);

            if !reinserted {
                return Err(format!(
                    "particle {resident_i}: missing from event scheduler during explosion on {}'s gate",
                    side.label()
                ));
            }
        }

        Ok(())
    }

    /// Evaluates every boundary candidate for particle `i`'s current
    /// `(pos, dir)` and stages the winner as its `next_*` fields. If every
    /// candidate comes back empty -- a numerical degeneracy, not a
    /// modeled outcome -- the particle is reset in place (fresh
    /// rejection-sampled position and heading on its current side) and
    /// the attempt is retried, per `spec.md` §4.3.
    fn compute_next_impact(&mut self, i: usize) {
        loop {
            let particle = self.particles[i];

            if let Some(impact) = evaluate_impacts(particle.pos, particle.dir, &self.geometry) {
                let biased_time = impact.time + impact.kind.bias();

                let mut p = particle;
                p.next_pos = p.pos + Vec2::from_angle(p.dir) * biased_time;
                p.next_dir = impact.out_angle;
                p.next_impact_time = self.time + biased_time;
                self.particles[i] = p;
                return;
            }

            self.reset_counter += 1;

            #[cfg(feature = "print_warnings")]
            println!("particle {i}: no boundary candidate within max_path, resetting in place");

            let side = Side::of_x(particle.pos.x);
            let mut p = particle;
            p.pos = self.sample_start_position(side);
            p.dir = self.rng.sample_angle_uniform();
            self.particles[i] = p;
        }
    }

    /// Uniform rejection sampling within `side`'s reservoir bounding box,
    /// excluding the bridge and both gates, per `spec.md` §4.1.
    fn sample_start_position(&mut self, side: Side) -> Vec2 {
        let center = self.geometry.center_x(side);
        let r = self.geometry.circle_radius;

        loop {
            let x = center + self.rng.sample_range(-r, r);
            let y = self.rng.sample_range(-r, r);
            let p = Vec2::new(x, y);

            if self.geometry.in_circle(p, side)
                && !self.geometry.in_bridge(p)
                && !self.geometry.in_gate(p, Side::Left)
                && !self.geometry.in_gate(p, Side::Right)
            {
                return p;
            }
        }
    }

    fn measure(&mut self) {
        self.measuring_times.push(self.time);
        self.total_left.push(self.in_left);
    }

    fn write_snapshot<S: SnapshotSink>(&self, sample_time: f64, sink: &mut S) -> Result<(), SimulationError<S::Error>> {
        let mut x = Vec::with_capacity(self.particles.len());
        let mut y = Vec::with_capacity(self.particles.len());
        let mut dir = Vec::with_capacity(self.particles.len());

        for p in &self.particles {
            let alpha = if p.next_impact_time > p.impact_time {
                ((sample_time - p.impact_time) / (p.next_impact_time - p.impact_time)).clamp(0.0, 1.0)
            } else {
                0.0
            };

            let interpolated = Vec2::interpolate(p.pos, p.next_pos, alpha);

            x.push(interpolated.x);
            y.push(interpolated.y);
            dir.push(p.dir);
        }

        sink.write_frame(&SnapshotFrame { time: sample_time, x, y, dir })
            .map_err(SimulationError::Sink)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::io::NullSink;
    use crate::random::StdRngSource;

    fn small_config() -> SimulationConfig {
        SimulationConfig {
            num_particles: 40,
            circle_radius: 1.0,
            circle_distance: 0.5,
            bridge_height: 0.2,
            gate_is_flat: false,
            distance_as_channel_length: false,
            left_gate_capacity: 2,
            right_gate_capacity: 2,
            explosion_direction_is_random: false,
            expected_collisions: None,
        }
    }

    #[test]
    fn start_places_every_particle_inside_the_domain() {
        let mut sim = Simulation::setup(small_config(), StdRngSource::from_seed(1)).unwrap();
        sim.start(0.5).unwrap();

        for p in sim.particles() {
            assert!(sim.geometry().in_domain(p.pos));
        }
    }

    #[test]
    fn start_respects_left_ratio_at_the_extremes() {
        let mut sim = Simulation::setup(small_config(), StdRngSource::from_seed(2)).unwrap();

        sim.start(1.0).unwrap();
        assert_eq!(sim.in_left(), sim.geometry().num_particles);

        sim.start(0.0).unwrap();
        assert_eq!(sim.in_left(), 0);
    }

    #[test]
    fn start_rejects_out_of_range_left_ratio() {
        let mut sim = Simulation::setup(small_config(), StdRngSource::from_seed(3)).unwrap();
        assert!(sim.start(1.5).is_err());
    }

    #[test]
    fn time_is_monotonically_nondecreasing_across_updates() {
        let mut sim = Simulation::setup(small_config(), StdRngSource::from_seed(4)).unwrap();
        sim.start(0.5).unwrap();

        let mut sink = NullSink;
        let mut last_time = sim.time();

        for _ in 0..500 {
            sim.update(0.0, &mut sink).unwrap();
            assert!(sim.time() >= last_time);
            last_time = sim.time();
        }
    }

    #[test]
    fn particle_mass_is_conserved_across_updates() {
        let mut sim = Simulation::setup(small_config(), StdRngSource::from_seed(5)).unwrap();
        sim.start(0.5).unwrap();

        let total = sim.geometry().num_particles;
        let mut sink = NullSink;

        for _ in 0..500 {
            sim.update(0.0, &mut sink).unwrap();
            assert!(sim.in_left() <= total);
        }
    }

    #[test]
    fn gate_occupancy_never_exceeds_capacity() {
        let mut sim = Simulation::setup(small_config(), StdRngSource::from_seed(6)).unwrap();
        sim.start(0.5).unwrap();

        let mut sink = NullSink;

        for _ in 0..2000 {
            sim.update(0.0, &mut sink).unwrap();
            assert!(sim.left_gate().len() <= sim.left_gate().capacity());
            assert!(sim.right_gate().len() <= sim.right_gate().capacity());
        }
    }

    #[test]
    fn same_seed_produces_the_same_event_stream() {
        let mut a = Simulation::setup(small_config(), StdRngSource::from_seed(99)).unwrap();
        let mut b = Simulation::setup(small_config(), StdRngSource::from_seed(99)).unwrap();
        a.start(0.5).unwrap();
        b.start(0.5).unwrap();

        let mut sink_a = NullSink;
        let mut sink_b = NullSink;

        for _ in 0..200 {
            let outcome_a = a.update(0.0, &mut sink_a).unwrap();
            let outcome_b = b.update(0.0, &mut sink_b).unwrap();

            assert_eq!(outcome_a.particle_index, outcome_b.particle_index);
            assert_eq!(outcome_a.time, outcome_b.time);
        }
    }

    #[test]
    fn explosions_never_leave_a_gate_over_capacity() {
        let mut config = small_config();
        config.left_gate_capacity = 1;
        config.right_gate_capacity = 1;

        let mut sim = Simulation::setup(config, StdRngSource::from_seed(11)).unwrap();
        sim.start(0.5).unwrap();

        let mut sink = NullSink;
        let mut saw_explosion = false;

        for _ in 0..3000 {
            let outcome = sim.update(0.0, &mut sink).unwrap();

            if outcome.explosion_side.is_some() {
                saw_explosion = true;
            }

            assert!(sim.left_gate().len() <= 1);
            assert!(sim.right_gate().len() <= 1);
        }

        assert!(saw_explosion, "expected at least one explosion at capacity 1");
    }

    #[test]
    fn reset_counter_never_decreases_and_mass_spread_stays_normalized() {
        let mut sim = Simulation::setup(small_config(), StdRngSource::from_seed(13)).unwrap();
        sim.start(0.5).unwrap();

        let mut sink = NullSink;
        let mut last_reset_counter = sim.reset_counter();

        for _ in 0..1000 {
            sim.update(0.0, &mut sink).unwrap();

            assert!(sim.reset_counter() >= last_reset_counter);
            last_reset_counter = sim.reset_counter();

            assert!((0.0..=1.0).contains(&sim.get_mass_spread()));
        }
    }

    #[test]
    fn finish_returns_totals_summing_to_particle_count() {
        let mut sim = Simulation::setup(small_config(), StdRngSource::from_seed(12)).unwrap();
        sim.start(0.5).unwrap();

        let mut sink = NullSink;
        for _ in 0..100 {
            sim.update(0.0, &mut sink).unwrap();
        }

        let totals = sim.finish();

        for (&left, &right) in totals.total_left.iter().zip(totals.total_right.iter()) {
            assert_eq!(left + right, sim.geometry().num_particles);
        }
    }

    /// Forces a single particle into a specific `(pos, dir)` and re-primes
    /// the scheduler for it. `start` only ever places particles by
    /// rejection sampling, which the exact-position scenarios below can't
    /// use, so this goes straight at the (private, same-crate-visible)
    /// fields instead.
    fn pin_particle(sim: &mut Simulation<StdRngSource>, pos: Vec2, dir: f64) {
        sim.particles[0] = Particle::new(pos, dir, 0.0);
        sim.scheduler = EventScheduler::new();
        sim.time = 0.0;
        sim.compute_next_impact(0);
        sim.scheduler.insert(0, sim.particles[0].next_impact_time);
    }

    /// `spec.md` §8 scenario 1: a particle at the left reservoir's center
    /// heading straight down hits the far arc at distance `R` and leaves
    /// heading straight up.
    #[test]
    fn scenario_1_straight_down_bounce_off_far_wall() {
        use std::f64::consts::PI;

        let config = SimulationConfig {
            num_particles: 1,
            circle_radius: 1.0,
            circle_distance: 0.5,
            bridge_height: 0.1,
            gate_is_flat: false,
            distance_as_channel_length: false,
            left_gate_capacity: 1,
            right_gate_capacity: 1,
            explosion_direction_is_random: false,
            expected_collisions: None,
        };

        let mut sim = Simulation::setup(config, StdRngSource::from_seed(42)).unwrap();
        sim.start(1.0).unwrap();

        let left_center_x = sim.geometry().left_center_x;
        let radius = sim.geometry().circle_radius;

        pin_particle(&mut sim, Vec2::new(left_center_x, 0.0), -PI / 2.0);

        let mut sink = NullSink;
        sim.update(0.0, &mut sink).unwrap();

        let p = sim.particles()[0];

        assert!((p.pos.x - left_center_x).abs() < 1e-9, "x = {}", p.pos.x);
        assert!((p.pos.y - (-radius)).abs() < 1e-9, "y = {}", p.pos.y);
        assert!(
            (crate::kernel::normalize_angle(p.dir - PI / 2.0)).abs() < 1e-9,
            "dir = {}",
            p.dir
        );
    }

    /// `spec.md` §8 scenario 2: a particle launched from inside the right
    /// reservoir at `(center - R/sqrt(2), 0)` heading `+pi/2` traces an
    /// inscribed square, its post-bounce heading cycling through
    /// `{0, -pi/2, pi, pi/2}` over four successive `update`s, and its
    /// fifth bounce lands back on the first corner it visited.
    #[test]
    fn scenario_2_inscribed_square_orbit_through_update() {
        use std::f64::consts::PI;

        let config = SimulationConfig {
            num_particles: 1,
            circle_radius: 1.0,
            circle_distance: 0.5,
            bridge_height: 0.1,
            gate_is_flat: false,
            distance_as_channel_length: false,
            left_gate_capacity: 1,
            right_gate_capacity: 1,
            explosion_direction_is_random: false,
            expected_collisions: None,
        };

        let mut sim = Simulation::setup(config, StdRngSource::from_seed(7)).unwrap();
        sim.start(0.0).unwrap();

        let side = Side::Right;
        let center = sim.geometry().center_x(side);
        let leg = sim.geometry().circle_radius / 2.0_f64.sqrt();

        pin_particle(&mut sim, Vec2::new(center - leg, 0.0), PI / 2.0);

        let expected_out_angles = [0.0, -PI / 2.0, PI, PI / 2.0];
        let mut sink = NullSink;
        let mut corners = Vec::with_capacity(4);

        for &expected in &expected_out_angles {
            sim.update(0.0, &mut sink).unwrap();

            let p = sim.particles()[0];
            assert!(
                (crate::kernel::normalize_angle(p.dir - expected)).abs() < 1e-9,
                "expected dir {expected}, got {}",
                p.dir
            );

            corners.push(p.pos);
        }

        sim.update(0.0, &mut sink).unwrap();
        let closing = sim.particles()[0].pos;

        assert!((closing.x - corners[0].x).abs() < 1e-9, "x = {}", closing.x);
        assert!((closing.y - corners[0].y).abs() < 1e-9, "y = {}", closing.y);
    }
}
