//! `StandardModel` — the configured parameterizations.
//!
//! Strategy selection happens once in [`StandardModel::new`]: age tables
//! are converted to per-step probabilities and each tagged variant is
//! resolved, so no configuration lookup happens per call.

use dm_agent::{Agent, DesiredChildren, Ethnicity, HouseholdTraits, Person, Sex};
use dm_core::{SimRng, Tick};

use crate::dist::StepTable;
use crate::params::ethnicity_term;
use crate::{
    BehaviorError, BehaviorResult, DemographicModel, FirstBirthCoefficients, FirstBirthTiming,
    FuelwoodCoefficients, FuelwoodModel, HouseholdView, InMigrantDraw, MarriageCoefficients,
    MarriageModel, MigrationModel, Parameters, PersonView, per_step,
};

/// No first birth within this many months of marriage under the logistic
/// policy.
pub const MIN_FIRST_BIRTH_MONTHS: u64 = 9;

/// Logistic models yield monthly probabilities.
const MONTH: f64 = 1.0;

struct SexTables {
    female: StepTable,
    male:   StepTable,
}

impl SexTables {
    fn lookup(&self, person: &Person) -> f64 {
        match person.sex() {
            Sex::Female => self.female.lookup(person.age_months()),
            Sex::Male => self.male.lookup(person.age_months()),
        }
    }
}

enum MarriageRule {
    Table(SexTables),
    Logistic(MarriageCoefficients),
}

enum MigrationRule {
    Table(SexTables),
    Flat(f64),
}

pub struct StandardModel {
    params:      Parameters,
    step_months: u32,
    death:       SexTables,
    marriage:    MarriageRule,
    migration:   MigrationRule,
    divorce:     f64,
}

impl StandardModel {
    /// Validate `params` and resolve every strategy for a `step_months`
    /// timestep.
    pub fn new(params: Parameters, step_months: u32) -> BehaviorResult<Self> {
        params.validate()?;
        if step_months == 0 {
            return Err(BehaviorError::Config("timestep must be at least one month".into()));
        }
        let unit = params.time_units;
        let death = SexTables {
            female: params.death.female.resolve(unit, step_months),
            male:   params.death.male.resolve(unit, step_months),
        };
        let marriage = match &params.marriage.model {
            MarriageModel::AgeTable { female, male } => MarriageRule::Table(SexTables {
                female: female.resolve(unit, step_months),
                male:   male.resolve(unit, step_months),
            }),
            MarriageModel::Logistic(c) => MarriageRule::Logistic(c.clone()),
        };
        let migration = match &params.migration.model {
            MigrationModel::AgeTable { female, male } => MigrationRule::Table(SexTables {
                female: female.resolve(unit, step_months),
                male:   male.resolve(unit, step_months),
            }),
            MigrationModel::Flat { probability } => {
                MigrationRule::Flat(per_step(*probability, unit.months(), step_months))
            }
        };
        let divorce = per_step(params.divorce.probability, unit.months(), step_months);
        Ok(Self { params, step_months, death, marriage, migration, divorce })
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    pub fn step_months(&self) -> u32 {
        self.step_months
    }
}

// ── Logistic terms ────────────────────────────────────────────────────────────

#[inline]
fn flag(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

/// Monthly first-birth probability `1 / (1 + e^inner)`.
pub fn first_birth_probability(c: &FirstBirthCoefficients, p: PersonView<'_>, months_married: u64) -> f64 {
    let person = p.person;
    let mut inner = c.intercept;

    if let Some(n) = p.neighborhood {
        inner += c.percent_agveg * n.land().percent_agveg();
        inner += c.avg_years_nonfamily * n.profile.avg_years_nonfamily_services;
        inner += c.dist_urban_center * n.profile.dist_urban_center;
        inner += c.elec_available * flag(n.profile.elec_available);
    }

    let child = &person.childhood;
    inner += c.child_school_1hr * flag(child.school_within_1hr);
    inner += c.child_health_1hr * flag(child.health_within_1hr);
    inner += c.child_bus_1hr * flag(child.bus_within_1hr);
    inner += c.child_employer_1hr * flag(child.employer_within_1hr);

    inner += ethnicity_term(&c.ethnicity, person.ethnicity().0);

    inner += match person.schooling.years {
        y if y < 4.0 => 0.0,
        y if y < 8.0 => c.schooling_4,
        y if y < 11.0 => c.schooling_8,
        _ => c.schooling_11,
    };

    let bg = &person.background;
    inner += c.parents_contraception_ever * flag(person.parents_contraception_ever);
    inner += c.father_work * flag(bg.father_work);
    inner += c.father_school * flag(bg.father_schooled);
    inner += c.mother_work * flag(bg.mother_work);
    inner += c.mother_school * flag(bg.mother_schooled);
    inner += c.mother_num_children * bg.mother_num_children as f64;

    let bin = (months_married.saturating_sub(1) / 6).min(6) as usize;
    inner += c.hazard_duration[bin];

    1.0 / (1.0 + inner.exp())
}

/// Monthly marriage probability `1 / (1 + e^-inner)`.
pub fn marriage_probability(c: &MarriageCoefficients, p: PersonView<'_>) -> f64 {
    let person = p.person;
    let mut inner = c.intercept;

    if let Some(n) = p.neighborhood {
        let percent = n.land().percent_agveg();
        let log_percent = if percent > 0.0 { percent.ln() } else { 0.0 };
        inner += c.log_percent_agveg * log_percent;
        let s = n.services();
        inner += c.school_min * s.school_min;
        inner += c.health_min * s.health_min;
        inner += c.bus_min * s.bus_min;
        inner += c.market_min * s.market_min;
        inner += c.employer_min * s.employer_min;
    }

    inner += c.female * flag(person.is_female());
    inner += ethnicity_term(&c.ethnicity, person.ethnicity().0);

    let age = person.age_years();
    inner += c.age * age + c.age_squared * age * age;

    1.0 / (1.0 + (-inner).exp())
}

/// Household fuelwood demand from the regression, floored at zero.
pub fn fuelwood_regression(c: &FuelwoodCoefficients, hh: HouseholdView<'_>, rng: &mut SimRng) -> f64 {
    if hh.size == 0 {
        return 0.0;
    }
    let size = hh.size as f64;
    let mut usage = c.intercept + c.hh_size * size + c.hh_size_squared * size * size;
    if hh.head_ethnicity == Some(Ethnicity(c.ethnic_code)) {
        usage += c.ethnic;
    }
    usage += c.own_non_wood_stove * flag(hh.household.traits.any_non_wood_fuel);
    usage += c.residual_sd * rng.standard_normal();
    usage.max(0.0)
}

// ── DemographicModel ──────────────────────────────────────────────────────────

impl DemographicModel for StandardModel {
    fn death_probability(&self, p: PersonView<'_>) -> f64 {
        self.death.lookup(p.person)
    }

    fn marriage_probability(&self, p: PersonView<'_>) -> f64 {
        match &self.marriage {
            MarriageRule::Table(t) => t.lookup(p.person),
            MarriageRule::Logistic(c) => per_step(marriage_probability(c, p), MONTH, self.step_months),
        }
    }

    fn divorce_probability(&self, _p: PersonView<'_>) -> f64 {
        self.divorce
    }

    fn migration_probability(&self, p: PersonView<'_>) -> f64 {
        match &self.migration {
            MigrationRule::Table(t) => t.lookup(p.person),
            MigrationRule::Flat(prob) => *prob,
        }
    }

    fn first_birth_due(&self, p: PersonView<'_>, now: Tick, rng: &mut SimRng) -> bool {
        let Some(married_at) = p.person.marriage_time() else {
            return false;
        };
        let months_married = now.since(married_at);
        match &self.params.birth.first_birth {
            FirstBirthTiming::Simple { .. } => p
                .person
                .fertility
                .first_birth_timing
                .is_none_or(|timing| months_married >= timing as u64),
            FirstBirthTiming::Logistic(c) => {
                if months_married < MIN_FIRST_BIRTH_MONTHS {
                    return false;
                }
                let prob = per_step(first_birth_probability(c, p, months_married), MONTH, self.step_months);
                rng.gen_bool(prob)
            }
        }
    }

    fn draw_sex(&self, rng: &mut SimRng) -> Sex {
        if rng.gen_bool(0.5) { Sex::Female } else { Sex::Male }
    }

    fn draw_first_birth_timing(&self, rng: &mut SimRng) -> Option<u32> {
        match &self.params.birth.first_birth {
            FirstBirthTiming::Simple { timing } => Some(timing.draw_floor(rng)),
            FirstBirthTiming::Logistic(_) => None,
        }
    }

    fn draw_birth_interval(&self, rng: &mut SimRng) -> u32 {
        self.params.birth.birth_interval.draw_floor(rng)
    }

    fn draw_desired_children(&self, rng: &mut SimRng) -> DesiredChildren {
        let birth = &self.params.birth;
        if birth.no_preference_probability > 0.0 && rng.gen_bool(birth.no_preference_probability) {
            return DesiredChildren::NoPreference;
        }
        DesiredChildren::Count(birth.desired_children.draw_floor(rng))
    }

    fn draw_migration_months(&self, _p: PersonView<'_>, rng: &mut SimRng) -> u32 {
        self.params.migration.duration_months.draw_floor(rng).max(1)
    }

    fn draw_schooling_level(&self, _p: PersonView<'_>, rng: &mut SimRng) -> f64 {
        self.params.education.schooling_level.draw(rng)
    }

    fn draw_spouse_age_gap_months(&self, rng: &mut SimRng) -> i64 {
        (self.params.marriage.spouse_age_diff.draw(rng) * 12.0).round() as i64
    }

    fn choose_spouse(&self, p: PersonView<'_>, candidates: &[PersonView<'_>], rng: &mut SimRng) -> Option<usize> {
        let choice = &self.params.marriage.spouse_choice;
        let me = p.person;
        let weights: Vec<f64> = candidates
            .iter()
            .map(|c| {
                let other = c.person;
                if other.sex() == me.sex() || other.ethnicity() != me.ethnicity() || other.id() == me.id() {
                    return 0.0;
                }
                if me.is_sibling(other) {
                    return 0.0;
                }
                let (husband, wife) = if me.is_female() { (other, me) } else { (me, other) };
                let gap = husband.age_years() - wife.age_years();
                let z = (gap - choice.preferred_gap_years) / choice.sd_years;
                (-0.5 * z * z).exp()
            })
            .collect();
        rng.weighted_index(&weights)
    }

    fn draw_household_area(&self, rng: &mut SimRng) -> f64 {
        self.params.land_use.household_area.draw(rng)
    }

    fn draw_household_traits(&self, rng: &mut SimRng) -> HouseholdTraits {
        let h = &self.params.household;
        HouseholdTraits {
            any_non_wood_fuel: rng.gen_bool(h.any_non_wood_fuel),
            own_house_plot:    rng.gen_bool(h.own_house_plot),
            own_land:          rng.gen_bool(h.own_land),
            rented_out_land:   rng.gen_bool(h.rented_out_land),
        }
    }

    fn draw_inmigrant_households(&self, rng: &mut SimRng) -> u32 {
        self.params.inmigration.households_per_step.draw_floor(rng)
    }

    fn draw_inmigrant_household(&self, rng: &mut SimRng) -> InMigrantDraw {
        let m = &self.params.inmigration;
        let size = m.household_size.draw_floor(rng).max(1);
        let head_age_months = (m.head_age_years.draw(rng) * 12.0).round().max(0.0) as u32;
        let head_sex = if rng.gen_bool(m.male_head_probability) { Sex::Male } else { Sex::Female };
        let codes: Vec<u8> = m.ethnicity_weights.keys().copied().collect();
        let weights: Vec<f64> = m.ethnicity_weights.values().copied().collect();
        let ethnicity = rng
            .weighted_index(&weights)
            .and_then(|i| codes.get(i).copied())
            .map_or(Ethnicity(0), Ethnicity);
        InMigrantDraw { size, head_age_months, head_sex, ethnicity }
    }

    fn fuelwood_usage(&self, hh: HouseholdView<'_>, now: Tick, rng: &mut SimRng) -> f64 {
        match &self.params.fuelwood.model {
            FuelwoodModel::Regression(c) => fuelwood_regression(c, hh, rng),
            FuelwoodModel::MigrationFeedback { coefficients, window_months, multiplier } => {
                let usage = fuelwood_regression(coefficients, hh, rng);
                if hh.household.had_recent_migrant(now, *window_months as u64) {
                    usage * multiplier
                } else {
                    usage
                }
            }
        }
    }
}
