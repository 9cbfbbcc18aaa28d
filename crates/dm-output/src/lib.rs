//! `dm-output` — results collector for the demographic model.
//!
//! Two backends are provided:
//!
//! | Feature   | Backend | Files created                                                      |
//! |-----------|---------|--------------------------------------------------------------------|
//! | *(none)*  | CSV     | `step_summaries.csv`, `neighborhood_snapshots.csv`, `persons.csv`  |
//! | `sqlite`  | SQLite  | `output.db`                                                        |
//!
//! Both implement [`OutputWriter`] and are driven by [`ResultsObserver`],
//! which implements `dm_sim::SimObserver`.  The person table is written
//! once, when the run ends.
//!
//! # Usage
//!
//! ```rust,ignore
//! use dm_output::{CsvWriter, ResultsObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = ResultsObserver::new(writer);
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::ResultsObserver;
pub use row::{NeighborhoodRow, PersonRow, StepSummaryRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
