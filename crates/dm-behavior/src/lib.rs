//! `dm-behavior` — the statistics/probability collaborator.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                          |
//! |--------------|-------------------------------------------------------------------|
//! | [`dist`]     | `ProbDist` binned draws, `AgeTable`, per-step unit conversion     |
//! | [`params`]   | `Parameters` — the serde parameter tree with startup validation   |
//! | [`context`]  | `PersonView`, `HouseholdView` — read-only inputs to the model     |
//! | [`model`]    | `DemographicModel` trait                                          |
//! | [`standard`] | `StandardModel` — the configured parameterizations               |
//! | [`error`]    | `BehaviorError`, `BehaviorResult<T>`                              |
//!
//! # Design notes
//!
//! The event engine in `dm-sim` owns eligibility rules (age bounds, marital
//! status, timers); this crate only answers "with what probability" and
//! "what value", drawing from the caller's `SimRng`.  Probabilities leave
//! the model already scaled to the run's timestep.

pub mod context;
pub mod dist;
pub mod error;
pub mod model;
pub mod params;
pub mod standard;

#[cfg(test)]
mod tests;

pub use context::{HouseholdView, PersonView};
pub use dist::{AgeBand, AgeTable, ProbDist, StepTable, TimeUnit, per_step};
pub use error::{BehaviorError, BehaviorResult};
pub use model::{DemographicModel, InMigrantDraw};
pub use params::{
    BirthFeedback, BirthParams, DeathParams, DivorceParams, DivorcePlacement, EducationParams,
    EthnicityTerm, FirstBirthCoefficients, FirstBirthTiming, FuelwoodCoefficients, FuelwoodModel,
    FuelwoodParams, HouseholdParams, InMigrationParams, LandUseParams, MarriageCoefficients,
    MarriageModel, MarriageParams, MigrationModel, MigrationParams, Parameters, PlacementParams,
    ReturnPlacement, SpouseChoice,
};
pub use standard::{MIN_FIRST_BIRTH_MONTHS, StandardModel};
