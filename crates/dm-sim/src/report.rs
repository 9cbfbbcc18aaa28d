//! Per-step statistics handed to [`SimObserver`][crate::SimObserver]s.

use std::collections::BTreeMap;

use dm_agent::LandLedger;
use dm_core::{ModelDate, NeighborhoodId};

/// Event counts keyed by the neighborhood the event is attributed to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NeighborhoodCounts(BTreeMap<NeighborhoodId, u32>);

impl NeighborhoodCounts {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record(&mut self, neighborhood: NeighborhoodId) {
        *self.0.entry(neighborhood).or_default() += 1;
    }

    pub fn get(&self, neighborhood: NeighborhoodId) -> u32 {
        self.0.get(&neighborhood).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Neighborhoods with at least one event, ascending by ID.
    pub fn iter(&self) -> impl Iterator<Item = (NeighborhoodId, u32)> + '_ {
        self.0.iter().map(|(&n, &c)| (n, c))
    }

    /// Add every count in `other` into `self`.
    pub fn merge(&mut self, other: &NeighborhoodCounts) {
        for (n, c) in other.iter() {
            *self.0.entry(n).or_default() += c;
        }
    }
}

/// Results of the migration phase.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MigrationCounts {
    /// Counted at the neighborhood the migrant left.
    pub out:           NeighborhoodCounts,
    /// Counted at the neighborhood the migrant returned to.
    pub returns:       NeighborhoodCounts,
    /// In-migrant households, counted where they were placed.
    pub in_households: NeighborhoodCounts,
}

/// Results of the education phase.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchoolingCounts {
    pub entries: NeighborhoodCounts,
    pub exits:   NeighborhoodCounts,
}

/// Everything that happened in one step, plus population totals after it.
#[derive(Clone, Debug, PartialEq)]
pub struct StepReport {
    /// Zero-based step number.
    pub step:           u64,
    /// Date the step was processed at.
    pub date:           ModelDate,

    pub births:         NeighborhoodCounts,
    pub deaths:         NeighborhoodCounts,
    pub marriages:      NeighborhoodCounts,
    pub divorces:       NeighborhoodCounts,
    pub schooling:      SchoolingCounts,
    pub migrations:     MigrationCounts,

    /// Resident persons after the step.
    pub persons:        usize,
    pub households:     usize,
    pub neighborhoods:  usize,
    /// Resident persons with a spouse.
    pub married:        usize,
    /// Persons away in migration stores.
    pub away:           usize,
}

impl StepReport {
    pub(crate) fn new(step: u64, date: ModelDate) -> Self {
        Self {
            step,
            date,
            births:        NeighborhoodCounts::new(),
            deaths:        NeighborhoodCounts::new(),
            marriages:     NeighborhoodCounts::new(),
            divorces:      NeighborhoodCounts::new(),
            schooling:     SchoolingCounts::default(),
            migrations:    MigrationCounts::default(),
            persons:       0,
            households:    0,
            neighborhoods: 0,
            married:       0,
            away:          0,
        }
    }
}

/// State of one neighborhood at a snapshot step.
#[derive(Clone, Debug, PartialEq)]
pub struct NeighborhoodSnapshot {
    pub neighborhood: NeighborhoodId,
    pub persons:      usize,
    pub households:   usize,
    pub married:      usize,
    pub land:         LandLedger,
    /// Summed household fuelwood demand; `None` when fuelwood is disabled.
    pub fuelwood:     Option<f64>,
}
