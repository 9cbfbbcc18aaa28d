//! Model time.
//!
//! # Design
//!
//! The calendar position of the scheduler is a [`ModelDate`] `(year, month)`.
//! Every timestamp stored on an agent (birthdate, marriage time, return
//! time, ...) is a [`Tick`]: an absolute month count
//!
//!   tick = year * 12 + (month - 1)
//!
//! so elapsed-time arithmetic is exact integer subtraction and comparisons
//! are O(1).  Ages are kept in months for the same reason.

use std::fmt;

use crate::{CoreError, CoreResult};

/// Earliest and latest calendar years accepted in a configuration.
pub const MIN_YEAR: u32 = 1900;
pub const MAX_YEAR: u32 = 2100;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute month counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    /// Return the tick `months` after `self`.
    #[inline]
    pub fn offset(self, months: u64) -> Tick {
        Tick(self.0 + months)
    }

    /// Return the tick `months` before `self`, stopping at zero.
    #[inline]
    pub fn rewind(self, months: u64) -> Tick {
        Tick(self.0.saturating_sub(months))
    }

    /// Months elapsed from `earlier` to `self`, zero if `earlier` is later.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    #[inline]
    pub fn date(self) -> ModelDate {
        ModelDate {
            year:  (self.0 / 12) as u32,
            month: (self.0 % 12) as u32 + 1,
        }
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.date().fmt(f)
    }
}

// ── ModelDate ────────────────────────────────────────────────────────────────

/// A calendar `(year, month)` pair, `month` in `1..=12`.
///
/// Field order makes the derived `Ord` chronological.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelDate {
    pub year:  u32,
    pub month: u32,
}

impl ModelDate {
    pub fn new(year: u32, month: u32) -> CoreResult<Self> {
        let date = ModelDate { year, month };
        date.validate()?;
        Ok(date)
    }

    /// Check the month range and the accepted year window.
    pub fn validate(&self) -> CoreResult<()> {
        if !(1..=12).contains(&self.month) {
            return Err(CoreError::Config(format!(
                "month {} outside 1..=12",
                self.month
            )));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&self.year) {
            return Err(CoreError::Config(format!(
                "year {} outside {MIN_YEAR}..={MAX_YEAR}",
                self.year
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn tick(self) -> Tick {
        Tick(self.year as u64 * 12 + (self.month as u64 - 1))
    }

    /// Fractional year, e.g. July 1997 -> 1997.5.
    #[inline]
    pub fn decimal_year(self) -> f64 {
        self.year as f64 + (self.month as f64 - 1.0) / 12.0
    }
}

impl fmt::Display for ModelDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// The scheduler's calendar: `(year, month)` advanced by a fixed number of
/// months per step.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    pub start:       ModelDate,
    pub end:         ModelDate,
    /// Months per step.
    pub step_months: u32,
    pub current:     ModelDate,
    /// Number of completed `advance()` calls.
    pub steps:       u64,
}

impl SimClock {
    pub fn new(start: ModelDate, end: ModelDate, step_months: u32) -> Self {
        Self {
            start,
            end,
            step_months,
            current: start,
            steps: 0,
        }
    }

    /// Add one step to the month, carrying overflow into the year.
    pub fn advance(&mut self) {
        let month = self.current.month + self.step_months;
        let carry = (month - 1) / 12;
        self.current = ModelDate {
            year:  self.current.year + carry,
            month: month - carry * 12,
        };
        self.steps += 1;
    }

    /// `false` once the end date has been reached or passed.
    #[inline]
    pub fn in_bounds(&self) -> bool {
        self.current < self.end
    }

    /// The current date as a [`Tick`].
    #[inline]
    pub fn now(&self) -> Tick {
        self.current.tick()
    }

    #[inline]
    pub fn decimal_year(&self) -> f64 {
        self.current.decimal_year()
    }

    /// Number of steps between start and end (rounded up).
    pub fn total_steps(&self) -> u64 {
        let span = self.end.tick().since(self.start.tick());
        span.div_ceil(self.step_months.max(1) as u64)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (step {})", self.current, self.steps)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Run-level configuration: calendar bounds, step size, seed, and output
/// cadence.
///
/// Typically loaded from a JSON file by the application crate (enable the
/// `serde` feature) and passed to the simulation builder.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    pub start: ModelDate,

    /// Exclusive end of the run.
    pub end: ModelDate,

    /// Months per step.  Default: 1.
    pub timestep_months: u32,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Emit neighborhood snapshots every N steps.  0 disables snapshots.
    pub output_interval_steps: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start:                 ModelDate { year: 1997, month: 1 },
            end:                   ModelDate { year: 2007, month: 1 },
            timestep_months:       1,
            seed:                  0,
            output_interval_steps: 12,
        }
    }
}

impl SimConfig {
    /// Validate dates, ordering, and step size.
    pub fn validate(&self) -> CoreResult<()> {
        self.start.validate()?;
        self.end.validate()?;
        if self.end <= self.start {
            return Err(CoreError::Config(format!(
                "end date {} must be after start date {}",
                self.end, self.start
            )));
        }
        if self.timestep_months == 0 {
            return Err(CoreError::Config("timestep_months must be at least 1".into()));
        }
        Ok(())
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.start, self.end, self.timestep_months)
    }

    /// `true` if step number `step` should emit a snapshot.
    #[inline]
    pub fn is_snapshot_step(&self, step: u64) -> bool {
        self.output_interval_steps > 0 && step.is_multiple_of(self.output_interval_steps)
    }
}
