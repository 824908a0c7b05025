//! Output interfaces.
//!
//! `spec.md` treats file output as an external collaborator: the core
//! produces the *data* behind `totals.dat`, `results.dat`, `<id>.chi` and
//! `<id>.out` (§6), but never opens a file itself. These sink traits
//! mirror each format's fields one-to-one; a batch-runner binary (outside
//! this crate) implements them against real files. [`RecordingSink`] is
//! an in-memory implementation used by this crate's own tests and by
//! callers who want the data without touching disk.

use std::convert::Infallible;
use std::error::Error;

/// One interpolated snapshot: a time, and every particle's `(x, y, dir)`
/// at that time, matching `results.dat`'s per-snapshot row group.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotFrame {
    pub time: f64,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub dir: Vec<f64>,
}

/// The geometry header `results.dat` carries ahead of its snapshots.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ResultsHeader {
    pub num_particles: usize,
    pub circle_radius: f64,
    pub circle_distance: f64,
    pub bridge_height: f64,
    pub bridge_length: f64,
}

/// The final `(measuring_times, total_left, total_right)` series written
/// by `finish`.
#[derive(Debug, Clone, PartialEq)]
pub struct Totals {
    pub measuring_times: Vec<f64>,
    pub total_left: Vec<usize>,
    pub total_right: Vec<usize>,
}

/// One row of the optional per-step `<id>.chi` CSV.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ChiRow {
    pub num_collisions: u64,
    pub time: f64,
    pub in_left: usize,
    pub mass_spread: f64,
}

/// The optional final `<id>.out` summary line.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub sim_id: String,
    pub avg_chi: f64,
    pub current: [f64; 4],
}

pub trait SnapshotSink {
    type Error: Error;

    fn write_header(&mut self, header: &ResultsHeader) -> Result<(), Self::Error>;
    fn write_frame(&mut self, frame: &SnapshotFrame) -> Result<(), Self::Error>;
}

pub trait TotalsSink {
    type Error: Error;

    fn write_totals(&mut self, totals: &Totals) -> Result<(), Self::Error>;
}

pub trait ChiSink {
    type Error: Error;

    fn write_row(&mut self, row: &ChiRow) -> Result<(), Self::Error>;
}

pub trait SummarySink {
    type Error: Error;

    fn write_summary(&mut self, summary: &Summary) -> Result<(), Self::Error>;
}

/// An in-memory implementation of every sink trait, for tests and for
/// callers who want the raw data without a driver binary.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub header: Option<ResultsHeader>,
    pub frames: Vec<SnapshotFrame>,
    pub totals: Option<Totals>,
    pub chi_rows: Vec<ChiRow>,
    pub summary: Option<Summary>,
}

impl SnapshotSink for RecordingSink {
    type Error = Infallible;

    fn write_header(&mut self, header: &ResultsHeader) -> Result<(), Self::Error> {
        self.header = Some(*header);
        Ok(())
    }

    fn write_frame(&mut self, frame: &SnapshotFrame) -> Result<(), Self::Error> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

impl TotalsSink for RecordingSink {
    type Error = Infallible;

    fn write_totals(&mut self, totals: &Totals) -> Result<(), Self::Error> {
        self.totals = Some(totals.clone());
        Ok(())
    }
}

impl ChiSink for RecordingSink {
    type Error = Infallible;

    fn write_row(&mut self, row: &ChiRow) -> Result<(), Self::Error> {
        self.chi_rows.push(*row);
        Ok(())
    }
}

impl SummarySink for RecordingSink {
    type Error = Infallible;

    fn write_summary(&mut self, summary: &Summary) -> Result<(), Self::Error> {
        self.summary = Some(summary.clone());
        Ok(())
    }
}

/// A sink that discards everything. Useful for `update` calls made with
/// `write_dt <= 0.0`, where no snapshot will ever actually be written but
/// a concrete `SnapshotSink` type is still needed to call it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SnapshotSink for NullSink {
    type Error = Infallible;

    fn write_header(&mut self, _header: &ResultsHeader) -> Result<(), Self::Error> {
        Ok(())
    }

    fn write_frame(&mut self, _frame: &SnapshotFrame) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn recording_sink_accumulates_frames_in_order() {
        let mut sink = RecordingSink::default();

        sink.write_frame(&SnapshotFrame {
            time: 1.0,
            x: vec![0.0],
            y: vec![0.0],
            dir: vec![0.0],
        })
        .unwrap();

        sink.write_frame(&SnapshotFrame {
            time: 2.0,
            x: vec![1.0],
            y: vec![1.0],
            dir: vec![0.0],
        })
        .unwrap();

        assert_eq!(sink.frames.len(), 2);
        assert_eq!(sink.frames[0].time, 1.0);
        assert_eq!(sink.frames[1].time, 2.0);
    }
}
