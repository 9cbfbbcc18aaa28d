//! The typed parameter tree.
//!
//! Every group has a `Default` that produces a runnable (if uncalibrated)
//! model, and every struct is `#[serde(default)]`, so a configuration file
//! only needs the values it changes.  Parameterization variants are
//! internally tagged enums keyed by `"model"`; an unknown name fails
//! deserialization.
//!
//! ```json
//! {
//!   "time_units": "years",
//!   "marriage": { "model": { "model": "logistic", "intercept": -7.1, "age": 0.3 } },
//!   "placement": { "divorce": "current_neighborhood" }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::check_unit;
use crate::{AgeTable, BehaviorError, BehaviorResult, ProbDist, TimeUnit};

// ── Root ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Parameters {
    /// Unit of every age table and per-unit probability below.
    pub time_units:  TimeUnit,
    pub birth:       BirthParams,
    pub death:       DeathParams,
    pub marriage:    MarriageParams,
    pub divorce:     DivorceParams,
    pub migration:   MigrationParams,
    pub education:   EducationParams,
    pub land_use:    LandUseParams,
    pub household:   HouseholdParams,
    pub inmigration: InMigrationParams,
    pub fuelwood:    FuelwoodParams,
    pub placement:   PlacementParams,
}

impl Parameters {
    /// Check every group.  Runs once before the first step.
    pub fn validate(&self) -> BehaviorResult<()> {
        self.birth.validate()?;
        self.death.female.validate("death.female")?;
        self.death.male.validate("death.male")?;
        self.marriage.validate()?;
        check_unit("divorce.probability", self.divorce.probability)?;
        self.migration.validate()?;
        self.education.validate()?;
        self.land_use.validate()?;
        self.household.validate()?;
        self.inmigration.validate()?;
        self.fuelwood.validate()?;
        Ok(())
    }
}

fn check_ages(name: &str, min_years: f64, max_years: f64) -> BehaviorResult<()> {
    if min_years < 0.0 || min_years > max_years {
        return Err(BehaviorError::Config(format!(
            "{name}: age bounds [{min_years}, {max_years}] are not a valid range"
        )));
    }
    Ok(())
}

// ── Birth ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BirthParams {
    pub min_age_years:             f64,
    pub max_age_years:             f64,
    pub first_birth:               FirstBirthTiming,
    /// Months between births.
    pub birth_interval:            ProbDist,
    pub desired_children:          ProbDist,
    /// Chance that a woman states no family-size preference.
    pub no_preference_probability: f64,
}

impl Default for BirthParams {
    fn default() -> Self {
        Self {
            min_age_years:             15.0,
            max_age_years:             45.0,
            first_birth:               FirstBirthTiming::default(),
            birth_interval:            ProbDist::new(vec![9.0, 18.0, 24.0, 36.0, 60.0], vec![0.2, 0.4, 0.3, 0.1]),
            desired_children:          ProbDist::new(vec![0.0, 1.0, 2.0, 3.0, 4.0, 6.0], vec![0.02, 0.13, 0.45, 0.25, 0.15]),
            no_preference_probability: 0.0,
        }
    }
}

impl BirthParams {
    fn validate(&self) -> BehaviorResult<()> {
        check_ages("birth", self.min_age_years, self.max_age_years)?;
        self.first_birth.validate()?;
        self.birth_interval.validate("birth.birth_interval")?;
        self.desired_children.validate("birth.desired_children")?;
        check_unit("birth.no_preference_probability", self.no_preference_probability)
    }
}

/// How the wait from marriage to a first birth is decided.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum FirstBirthTiming {
    /// Each wife draws a waiting time (months) at marriage; the first
    /// birth is due once it has elapsed.
    Simple { timing: ProbDist },
    /// A monthly logistic hazard, evaluated after a minimum gestation.
    Logistic(FirstBirthCoefficients),
}

impl Default for FirstBirthTiming {
    fn default() -> Self {
        FirstBirthTiming::Simple {
            timing: ProbDist::new(vec![9.0, 12.0, 24.0, 36.0, 60.0], vec![0.3, 0.4, 0.2, 0.1]),
        }
    }
}

impl FirstBirthTiming {
    fn validate(&self) -> BehaviorResult<()> {
        match self {
            FirstBirthTiming::Simple { timing } => timing.validate("birth.first_birth.timing"),
            FirstBirthTiming::Logistic(_) => Ok(()),
        }
    }
}

/// Coefficients of the first-birth logistic hazard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FirstBirthCoefficients {
    pub intercept:                 f64,
    pub percent_agveg:             f64,
    pub avg_years_nonfamily:       f64,
    pub dist_urban_center:         f64,
    pub elec_available:            f64,
    pub child_school_1hr:          f64,
    pub child_health_1hr:          f64,
    pub child_bus_1hr:             f64,
    pub child_employer_1hr:        f64,
    /// Additive term per ethnicity code; missing codes are the reference.
    pub ethnicity:                 Vec<EthnicityTerm>,
    pub schooling_4:               f64,
    pub schooling_8:               f64,
    pub schooling_11:              f64,
    pub parents_contraception_ever: f64,
    pub father_work:               f64,
    pub father_school:             f64,
    pub mother_work:               f64,
    pub mother_school:             f64,
    pub mother_num_children:       f64,
    /// Hazard-duration terms for months since marriage
    /// `<=6, <=12, <=18, <=24, <=30, <=36, >36`.
    pub hazard_duration:           [f64; 7],
}

/// Additive coefficient for one ethnicity code.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EthnicityTerm {
    pub code: u8,
    pub coef: f64,
}

/// Sum of the terms matching `code` (zero for the reference group).
pub(crate) fn ethnicity_term(terms: &[EthnicityTerm], code: u8) -> f64 {
    terms.iter().filter(|t| t.code == code).map(|t| t.coef).sum()
}

// ── Death ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeathParams {
    pub female: AgeTable,
    pub male:   AgeTable,
}

impl Default for DeathParams {
    fn default() -> Self {
        let bands = [
            (0.0, 1.0, 0.05),
            (1.0, 5.0, 0.005),
            (5.0, 15.0, 0.001),
            (15.0, 50.0, 0.003),
            (50.0, 65.0, 0.01),
            (65.0, 80.0, 0.04),
            (80.0, 200.0, 0.15),
        ];
        Self { female: AgeTable::from_bands(&bands), male: AgeTable::from_bands(&bands) }
    }
}

// ── Marriage ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarriageParams {
    pub min_age_years:       f64,
    pub max_age_years:       f64,
    pub model:               MarriageModel,
    /// Chance a new couple founds its own household instead of the bride
    /// joining the groom's.
    pub moveout_probability: f64,
    /// Husband's age minus wife's age, in years, for in-migrant spouses.
    pub spouse_age_diff:     ProbDist,
    pub spouse_choice:       SpouseChoice,
}

impl Default for MarriageParams {
    fn default() -> Self {
        Self {
            min_age_years:       15.0,
            max_age_years:       40.0,
            model:               MarriageModel::default(),
            moveout_probability: 0.1,
            spouse_age_diff:     ProbDist::new(vec![-2.0, 0.0, 3.0, 6.0, 10.0], vec![0.1, 0.5, 0.3, 0.1]),
            spouse_choice:       SpouseChoice::default(),
        }
    }
}

impl MarriageParams {
    fn validate(&self) -> BehaviorResult<()> {
        check_ages("marriage", self.min_age_years, self.max_age_years)?;
        match &self.model {
            MarriageModel::AgeTable { female, male } => {
                female.validate("marriage.model.female")?;
                male.validate("marriage.model.male")?;
            }
            MarriageModel::Logistic(_) => {}
        }
        check_unit("marriage.moveout_probability", self.moveout_probability)?;
        self.spouse_age_diff.validate("marriage.spouse_age_diff")?;
        if !(self.spouse_choice.sd_years > 0.0) {
            return Err(BehaviorError::Config("marriage.spouse_choice.sd_years must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum MarriageModel {
    AgeTable { female: AgeTable, male: AgeTable },
    Logistic(MarriageCoefficients),
}

impl Default for MarriageModel {
    fn default() -> Self {
        MarriageModel::AgeTable {
            female: AgeTable::from_bands(&[
                (0.0, 15.0, 0.0),
                (15.0, 20.0, 0.15),
                (20.0, 25.0, 0.2),
                (25.0, 30.0, 0.15),
                (30.0, 200.0, 0.05),
            ]),
            male: AgeTable::from_bands(&[
                (0.0, 17.0, 0.0),
                (17.0, 22.0, 0.1),
                (22.0, 27.0, 0.2),
                (27.0, 32.0, 0.15),
                (32.0, 200.0, 0.05),
            ]),
        }
    }
}

/// Coefficients of the marriage logistic model (monthly probability).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MarriageCoefficients {
    pub intercept:         f64,
    pub log_percent_agveg: f64,
    pub school_min:        f64,
    pub health_min:        f64,
    pub bus_min:           f64,
    pub market_min:        f64,
    pub employer_min:      f64,
    pub female:            f64,
    pub ethnicity:         Vec<EthnicityTerm>,
    pub age:               f64,
    pub age_squared:       f64,
}

/// Spouse choice among resident candidates: Gaussian weight on the gap
/// between the candidate couple's age difference and the preferred gap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpouseChoice {
    /// Preferred husband-minus-wife age difference.
    pub preferred_gap_years: f64,
    pub sd_years:            f64,
}

impl Default for SpouseChoice {
    fn default() -> Self {
        Self { preferred_gap_years: 2.0, sd_years: 3.0 }
    }
}

// ── Divorce ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DivorceParams {
    /// Per time unit, per married couple.
    pub probability: f64,
}

impl Default for DivorceParams {
    fn default() -> Self {
        Self { probability: 0.002 }
    }
}

// ── Migration ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationParams {
    pub model:            MigrationModel,
    /// Months away.
    pub duration_months:  ProbDist,
    /// Absences up to this many months go to the local store.
    pub local_max_months: u32,
}

impl Default for MigrationParams {
    fn default() -> Self {
        Self {
            model:            MigrationModel::default(),
            duration_months:  ProbDist::new(vec![1.0, 6.0, 12.0, 36.0, 120.0], vec![0.3, 0.3, 0.3, 0.1]),
            local_max_months: 12,
        }
    }
}

impl MigrationParams {
    fn validate(&self) -> BehaviorResult<()> {
        match &self.model {
            MigrationModel::AgeTable { female, male } => {
                female.validate("migration.model.female")?;
                male.validate("migration.model.male")?;
            }
            MigrationModel::Flat { probability } => check_unit("migration.model.probability", *probability)?,
        }
        self.duration_months.validate("migration.duration_months")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum MigrationModel {
    AgeTable { female: AgeTable, male: AgeTable },
    Flat { probability: f64 },
}

impl Default for MigrationModel {
    fn default() -> Self {
        let bands = [(0.0, 15.0, 0.005), (15.0, 35.0, 0.05), (35.0, 200.0, 0.01)];
        MigrationModel::AgeTable { female: AgeTable::from_bands(&bands), male: AgeTable::from_bands(&bands) }
    }
}

// ── Education ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationParams {
    pub start_school_age_years: f64,
    /// Final years of schooling.
    pub schooling_level:        ProbDist,
}

impl Default for EducationParams {
    fn default() -> Self {
        Self {
            start_school_age_years: 6.0,
            schooling_level:        ProbDist::new(vec![0.0, 4.0, 8.0, 11.0, 16.0], vec![0.2, 0.3, 0.3, 0.2]),
        }
    }
}

impl EducationParams {
    fn validate(&self) -> BehaviorResult<()> {
        if self.start_school_age_years < 0.0 {
            return Err(BehaviorError::Config("education.start_school_age_years is negative".into()));
        }
        self.schooling_level.validate("education.schooling_level")
    }
}

// ── Land use ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandUseParams {
    /// Plot area claimed by a new household.
    pub household_area: ProbDist,
    pub birth_feedback: BirthFeedback,
}

impl Default for LandUseParams {
    fn default() -> Self {
        Self {
            household_area: ProbDist::new(vec![50.0, 100.0, 200.0, 400.0], vec![0.3, 0.5, 0.2]),
            birth_feedback: BirthFeedback::default(),
        }
    }
}

impl LandUseParams {
    fn validate(&self) -> BehaviorResult<()> {
        self.household_area.validate("land_use.household_area")?;
        if self.household_area.limits.first().is_some_and(|&low| low < 0.0) {
            return Err(BehaviorError::Config("land_use.household_area allows negative areas".into()));
        }
        if self.birth_feedback.area < 0.0 {
            return Err(BehaviorError::Config("land_use.birth_feedback.area is negative".into()));
        }
        Ok(())
    }
}

/// Each birth converts `area` of non-agricultural vegetation to "other".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BirthFeedback {
    pub enabled: bool,
    pub area:    f64,
}

// ── Household attributes ──────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HouseholdParams {
    pub any_non_wood_fuel: f64,
    pub own_house_plot:    f64,
    pub own_land:          f64,
    pub rented_out_land:   f64,
}

impl Default for HouseholdParams {
    fn default() -> Self {
        Self { any_non_wood_fuel: 0.93, own_house_plot: 0.829, own_land: 0.61, rented_out_land: 0.11 }
    }
}

impl HouseholdParams {
    fn validate(&self) -> BehaviorResult<()> {
        check_unit("household.any_non_wood_fuel", self.any_non_wood_fuel)?;
        check_unit("household.own_house_plot", self.own_house_plot)?;
        check_unit("household.own_land", self.own_land)?;
        check_unit("household.rented_out_land", self.rented_out_land)
    }
}

// ── In-migration ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InMigrationParams {
    pub households_per_step:   ProbDist,
    pub household_size:        ProbDist,
    pub head_age_years:        ProbDist,
    pub male_head_probability: f64,
    /// Relative weight of each ethnicity code among in-migrant households.
    pub ethnicity_weights:     BTreeMap<u8, f64>,
}

impl Default for InMigrationParams {
    fn default() -> Self {
        Self {
            households_per_step:   ProbDist::new(vec![0.0, 1.0, 2.0], vec![0.8, 0.2]),
            household_size:        ProbDist::new(vec![1.0, 2.0, 4.0, 7.0], vec![0.2, 0.5, 0.3]),
            head_age_years:        ProbDist::new(vec![18.0, 25.0, 40.0, 60.0], vec![0.4, 0.4, 0.2]),
            male_head_probability: 0.85,
            ethnicity_weights:     BTreeMap::from([(1, 0.5), (2, 0.2), (3, 0.1), (4, 0.1), (5, 0.1)]),
        }
    }
}

impl InMigrationParams {
    fn validate(&self) -> BehaviorResult<()> {
        self.households_per_step.validate("inmigration.households_per_step")?;
        self.household_size.validate("inmigration.household_size")?;
        self.head_age_years.validate("inmigration.head_age_years")?;
        check_unit("inmigration.male_head_probability", self.male_head_probability)?;
        let weights: Vec<f64> = self.ethnicity_weights.values().copied().collect();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) || weights.iter().sum::<f64>() <= 0.0 {
            return Err(BehaviorError::Config(
                "inmigration.ethnicity_weights needs at least one positive weight".into(),
            ));
        }
        Ok(())
    }
}

// ── Fuelwood ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FuelwoodParams {
    /// Compute per-neighborhood fuelwood demand at snapshot steps.
    pub enabled: bool,
    pub model:   FuelwoodModel,
}

impl FuelwoodParams {
    fn validate(&self) -> BehaviorResult<()> {
        let coefficients = match &self.model {
            FuelwoodModel::Regression(c) => c,
            FuelwoodModel::MigrationFeedback { coefficients, multiplier, .. } => {
                if *multiplier < 0.0 {
                    return Err(BehaviorError::Config("fuelwood.model.multiplier is negative".into()));
                }
                coefficients
            }
        };
        if coefficients.residual_sd < 0.0 {
            return Err(BehaviorError::Config("fuelwood residual_sd is negative".into()));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum FuelwoodModel {
    Regression(FuelwoodCoefficients),
    /// The regression, scaled by `multiplier` for households that had a
    /// migrant leave within `window_months`.
    MigrationFeedback {
        coefficients:  FuelwoodCoefficients,
        window_months: u32,
        multiplier:    f64,
    },
}

impl Default for FuelwoodModel {
    fn default() -> Self {
        FuelwoodModel::Regression(FuelwoodCoefficients::default())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelwoodCoefficients {
    pub intercept:          f64,
    pub hh_size:            f64,
    pub hh_size_squared:    f64,
    /// Ethnicity of the household head that receives `ethnic`.
    pub ethnic_code:        u8,
    pub ethnic:             f64,
    pub own_non_wood_stove: f64,
    pub residual_sd:        f64,
}

impl Default for FuelwoodCoefficients {
    fn default() -> Self {
        Self {
            intercept:          2.0,
            hh_size:            0.5,
            hh_size_squared:    -0.01,
            ethnic_code:        1,
            ethnic:             0.3,
            own_non_wood_stove: -0.8,
            residual_sd:        1.0,
        }
    }
}

// ── Placement policies ────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PlacementParams {
    pub divorce: DivorcePlacement,
    #[serde(rename = "return")]
    pub return_: ReturnPlacement,
}

/// Where a divorced wife goes when her mother's household is gone.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DivorcePlacement {
    /// New household, searched outward from a random neighborhood.
    #[default]
    RandomNeighborhood,
    /// New household, searched outward from her current neighborhood.
    CurrentNeighborhood,
}

/// Where a returning migrant goes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReturnPlacement {
    /// Back to the origin household if it still exists, else a new one.
    #[default]
    OriginHouseholdOrNew,
    AlwaysNewHousehold,
}
