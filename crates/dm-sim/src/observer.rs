//! Simulation observer trait for progress reporting and data collection.

use dm_agent::World;
use dm_core::ModelDate;

use crate::{NeighborhoodSnapshot, StepReport};

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// step loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.  Observers only ever see the world
/// read-only; the results they collect play no part in the simulation.
///
/// # Example — yearly population printer
///
/// ```rust,ignore
/// struct Printer;
///
/// impl SimObserver for Printer {
///     fn on_step_end(&mut self, report: &StepReport) {
///         if report.date.month == 1 {
///             println!("{}: {} persons", report.date, report.persons);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each step, before any event phase.
    fn on_step_start(&mut self, _step: u64, _date: ModelDate) {}

    /// Called after all event phases of a step, with its counts.
    fn on_step_end(&mut self, _report: &StepReport) {}

    /// Called at snapshot steps (every `config.output_interval_steps`),
    /// after `on_step_end`.
    fn on_snapshot(&mut self, _step: u64, _date: ModelDate, _neighborhoods: &[NeighborhoodSnapshot]) {}

    /// Called once when [`Sim::run`][crate::Sim::run] returns, either at the
    /// end date or on extinction.  `run_steps` does not call it.
    fn on_sim_end(&mut self, _date: ModelDate, _world: &World) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
