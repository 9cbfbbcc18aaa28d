//! Binned empirical distributions and age-banded probability tables.

use dm_core::SimRng;
use serde::{Deserialize, Serialize};

use crate::{BehaviorError, BehaviorResult};
use crate::error::check_unit;

// ── ProbDist ──────────────────────────────────────────────────────────────────

/// Piecewise-uniform distribution: `limits` has one more entry than
/// `weights`, and bin `i` covers `[limits[i], limits[i+1])`.
///
/// Weights need not sum to one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProbDist {
    pub limits:  Vec<f64>,
    pub weights: Vec<f64>,
}

impl ProbDist {
    pub fn new(limits: Vec<f64>, weights: Vec<f64>) -> Self {
        Self { limits, weights }
    }

    /// A single bin `[low, high)`.
    pub fn uniform(low: f64, high: f64) -> Self {
        Self { limits: vec![low, high], weights: vec![1.0] }
    }

    pub fn validate(&self, name: &str) -> BehaviorResult<()> {
        let bad = |reason| Err(BehaviorError::BadDistribution { name: name.to_owned(), reason });
        if self.weights.is_empty() {
            return bad("no bins");
        }
        if self.limits.len() != self.weights.len() + 1 {
            return bad("needs exactly one more limit than weights");
        }
        if self.limits.windows(2).any(|w| !(w[0] < w[1])) {
            return bad("limits must be strictly increasing");
        }
        if self.weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return bad("weights must be finite and non-negative");
        }
        if self.weights.iter().sum::<f64>() <= 0.0 {
            return bad("weights sum to zero");
        }
        Ok(())
    }

    /// Pick a bin by cumulative weight, then a uniform value inside it.
    pub fn draw(&self, rng: &mut SimRng) -> f64 {
        let total: f64 = self.weights.iter().sum();
        let target = rng.random::<f64>() * total;
        let mut cumulative = 0.0;
        let mut bin = self.weights.len().saturating_sub(1);
        for (i, w) in self.weights.iter().enumerate() {
            cumulative += w;
            if target < cumulative {
                bin = i;
                break;
            }
        }
        rng.uniform(self.limits[bin], self.limits[bin + 1])
    }

    /// `draw` rounded down to a non-negative integer.
    #[inline]
    pub fn draw_floor(&self, rng: &mut SimRng) -> u32 {
        self.draw(rng).floor().max(0.0) as u32
    }

    /// Weighted mean of the bin midpoints.
    pub fn mean(&self) -> f64 {
        let total: f64 = self.weights.iter().sum();
        if total <= 0.0 {
            return 0.0;
        }
        self.weights
            .iter()
            .zip(self.limits.windows(2))
            .map(|(w, lim)| w * (lim[0] + lim[1]) / 2.0)
            .sum::<f64>()
            / total
    }
}

// ── Time units ────────────────────────────────────────────────────────────────

/// Unit in which configured probabilities and age bands are expressed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Months,
    #[default]
    Years,
    Decades,
}

impl TimeUnit {
    pub fn months(self) -> f64 {
        match self {
            TimeUnit::Months => 1.0,
            TimeUnit::Years => 12.0,
            TimeUnit::Decades => 120.0,
        }
    }
}

/// Convert a probability over `unit_months` into one over `step_months`,
/// assuming a constant hazard across the interval.
#[inline]
pub fn per_step(p: f64, unit_months: f64, step_months: u32) -> f64 {
    if unit_months == step_months as f64 {
        return p;
    }
    1.0 - (1.0 - p).powf(step_months as f64 / unit_months)
}

// ── AgeTable ──────────────────────────────────────────────────────────────────

/// One age band `[lower, upper)`, in the configured time unit.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgeBand {
    pub lower: f64,
    pub upper: f64,
    pub prob:  f64,
}

/// Contiguous age bands starting at zero, each with a probability per
/// time unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgeTable {
    pub bands: Vec<AgeBand>,
}

impl AgeTable {
    /// Build from `(lower, upper, prob)` triples.
    pub fn from_bands(bands: &[(f64, f64, f64)]) -> Self {
        Self {
            bands: bands.iter().map(|&(lower, upper, prob)| AgeBand { lower, upper, prob }).collect(),
        }
    }

    /// Same probability at every age.
    pub fn flat(prob: f64) -> Self {
        Self::from_bands(&[(0.0, 200.0, prob)])
    }

    pub fn validate(&self, name: &str) -> BehaviorResult<()> {
        let bad = |reason| Err(BehaviorError::BadAgeTable { name: name.to_owned(), reason });
        let Some(first) = self.bands.first() else {
            return bad("no bands");
        };
        if first.lower != 0.0 {
            return bad("first band must start at zero");
        }
        if self.bands.iter().any(|b| !(b.lower < b.upper)) {
            return bad("every band needs lower < upper");
        }
        if self.bands.windows(2).any(|w| w[0].upper != w[1].lower) {
            return bad("bands must be contiguous");
        }
        for band in &self.bands {
            check_unit(name, band.prob)?;
        }
        Ok(())
    }

    /// Convert every band to a per-step probability.
    pub fn resolve(&self, unit: TimeUnit, step_months: u32) -> StepTable {
        StepTable {
            unit_months: unit.months(),
            bands: self
                .bands
                .iter()
                .map(|b| AgeBand { prob: per_step(b.prob, unit.months(), step_months), ..*b })
                .collect(),
        }
    }
}

/// An [`AgeTable`] already converted to per-step probabilities.
#[derive(Clone, Debug, PartialEq)]
pub struct StepTable {
    unit_months: f64,
    bands:       Vec<AgeBand>,
}

impl StepTable {
    /// Probability for an age in months.  The age is rounded to whole units;
    /// ages past the last band use the last band.
    pub fn lookup(&self, age_months: u32) -> f64 {
        let index = (age_months as f64 / self.unit_months).round();
        self.bands
            .iter()
            .find(|b| index < b.upper)
            .or(self.bands.last())
            .map_or(0.0, |b| b.prob)
    }
}
