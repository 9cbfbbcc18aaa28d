//! The `DemographicModel` trait — the statistics/probability collaborator
//! consulted by the event engine.

use dm_agent::{DesiredChildren, Ethnicity, Fertility, HouseholdTraits, Sex};
use dm_core::{SimRng, Tick};

use crate::{HouseholdView, PersonView};

/// Attributes of one in-migrant household, drawn before it is created.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InMigrantDraw {
    /// Total members, at least one.
    pub size:            u32,
    pub head_age_months: u32,
    pub head_sex:        Sex,
    pub ethnicity:       Ethnicity,
}

/// Maps agent state to per-step probabilities and random draws.
///
/// Probabilities are already converted to the run's timestep.  Every
/// method that draws takes the run's single [`SimRng`], and must consume
/// it the same way for the same inputs so runs replay exactly.
///
/// The event engine only calls a method when its own eligibility rules
/// pass (age bounds, marital status, ...); implementations need not repeat
/// those checks.
pub trait DemographicModel {
    // ── Event probabilities ───────────────────────────────────────────────

    fn death_probability(&self, p: PersonView<'_>) -> f64;

    fn marriage_probability(&self, p: PersonView<'_>) -> f64;

    fn divorce_probability(&self, p: PersonView<'_>) -> f64;

    fn migration_probability(&self, p: PersonView<'_>) -> f64;

    /// Whether a married woman with no children has her first birth this
    /// step.  May draw.
    fn first_birth_due(&self, p: PersonView<'_>, now: Tick, rng: &mut SimRng) -> bool;

    // ── Person draws ──────────────────────────────────────────────────────

    fn draw_sex(&self, rng: &mut SimRng) -> Sex;

    /// Months from marriage to first birth, if the timing policy uses one.
    fn draw_first_birth_timing(&self, rng: &mut SimRng) -> Option<u32>;

    fn draw_birth_interval(&self, rng: &mut SimRng) -> u32;

    fn draw_desired_children(&self, rng: &mut SimRng) -> DesiredChildren;

    /// Months away for an out-migrant, at least one.
    fn draw_migration_months(&self, p: PersonView<'_>, rng: &mut SimRng) -> u32;

    /// Final years of schooling for a person starting school.
    fn draw_schooling_level(&self, p: PersonView<'_>, rng: &mut SimRng) -> f64;

    /// Husband's age minus wife's age, in months, for an in-migrant spouse.
    fn draw_spouse_age_gap_months(&self, rng: &mut SimRng) -> i64;

    /// Index into `candidates` of `p`'s spouse, or `None` if no candidate is
    /// compatible (opposite sex, same ethnicity).
    fn choose_spouse(&self, p: PersonView<'_>, candidates: &[PersonView<'_>], rng: &mut SimRng) -> Option<usize>;

    /// Fertility timers for a newly created person.
    fn draw_fertility(&self, sex: Sex, rng: &mut SimRng) -> Fertility {
        match sex {
            Sex::Female => Fertility {
                birth_interval: Some(self.draw_birth_interval(rng)),
                first_birth_timing: self.draw_first_birth_timing(rng),
                ..Fertility::default()
            },
            Sex::Male => Fertility::default(),
        }
    }

    // ── Household draws ───────────────────────────────────────────────────

    /// Plot area claimed by a new household.
    fn draw_household_area(&self, rng: &mut SimRng) -> f64;

    fn draw_household_traits(&self, rng: &mut SimRng) -> HouseholdTraits;

    fn draw_inmigrant_households(&self, rng: &mut SimRng) -> u32;

    fn draw_inmigrant_household(&self, rng: &mut SimRng) -> InMigrantDraw;

    /// Fuelwood demand of one household.
    fn fuelwood_usage(&self, hh: HouseholdView<'_>, now: Tick, rng: &mut SimRng) -> f64;
}
