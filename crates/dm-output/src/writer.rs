//! The `OutputWriter` trait implemented by all backend writers.

use crate::{NeighborhoodRow, OutputResult, PersonRow, StepSummaryRow};

/// Trait implemented by the CSV and SQLite writers.
///
/// The observer never sees these errors directly; they are stored and
/// retrieved with [`ResultsObserver::take_error`][crate::ResultsObserver::take_error].
pub trait OutputWriter {
    /// Write one step summary row.
    fn write_step_summary(&mut self, row: &StepSummaryRow) -> OutputResult<()>;

    /// Write the per-neighborhood rows of one snapshot step.
    fn write_neighborhoods(&mut self, rows: &[NeighborhoodRow]) -> OutputResult<()>;

    /// Write the final state of every person.
    fn write_persons(&mut self, rows: &[PersonRow]) -> OutputResult<()>;

    /// Flush and close all underlying handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
