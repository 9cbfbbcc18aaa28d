//! `ResultsObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use std::collections::BTreeSet;

use dm_agent::World;
use dm_core::ModelDate;
use dm_sim::{NeighborhoodSnapshot, SimObserver, StepReport};
use tracing::info;

use crate::row::{NeighborhoodRow, PersonRow, StepSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes step summaries, neighborhood snapshots, and
/// the final person table to any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].  Rows written before a failure stay in
/// the output for inspection.
pub struct ResultsObserver<W: OutputWriter> {
    writer:     W,
    summarized: BTreeSet<u64>,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> ResultsObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, summarized: BTreeSet::new(), last_error: None }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn summarize(&mut self, report: &StepReport) -> OutputResult<()> {
        if !self.summarized.insert(report.step) {
            return Err(OutputError::DuplicateStep(report.step));
        }
        self.writer.write_step_summary(&StepSummaryRow::from_report(report))
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for ResultsObserver<W> {
    fn on_step_end(&mut self, report: &StepReport) {
        let result = self.summarize(report);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, step: u64, date: ModelDate, neighborhoods: &[NeighborhoodSnapshot]) {
        let rows: Vec<NeighborhoodRow> = neighborhoods
            .iter()
            .map(|snap| NeighborhoodRow::new(step, date.year, date.month, snap))
            .collect();
        let result = self.writer.write_neighborhoods(&rows);
        self.store_err(result);
    }

    fn on_sim_end(&mut self, date: ModelDate, world: &World) {
        let rows: Vec<PersonRow> = world.persons().map(|p| PersonRow::of(world, p)).collect();
        let result = self.writer.write_persons(&rows);
        self.store_err(result);
        let result = self.writer.finish();
        self.store_err(result);
        info!(%date, steps = self.summarized.len(), persons = rows.len(), "results written");
    }
}
