//! `dm-sim` — step loop and demographic event engine.
//!
//! # Step loop
//!
//! ```text
//! while clock.in_bounds() and population not extinct:
//!   for region in ascending RegionId:
//!     ① Births      — eligible married women give birth; optional land feedback
//!     ② Deaths      — residents die; emptied households are dissolved
//!     ③ Marriages   — eligible singles paired, others wed in-migrants; couples housed
//!     ④ Divorces    — each couple considered once; the wife is rehoused
//!     ⑤ Education   — undetermined → inschool → outofschool
//!     ⑥ Migrations  — out-migration, returns due now, in-migrant households
//!     ⑦ Age         — every person (residents and stored) ages one step
//!   observer.on_step_end(report); snapshot every `output_interval_steps`
//!   clock.advance()
//! ```
//!
//! All randomness flows through the single [`SimRng`][dm_core::SimRng] held by
//! the [`Sim`], so a fixed seed and input reproduce a run exactly.
//!
//! # Modules
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`builder`]   | [`SimBuilder`] — validates inputs, produces a [`Sim`]   |
//! | [`events`]    | The seven per-step phases                               |
//! | [`placement`] | Nearest-first land search for new households            |
//! | [`report`]    | [`StepReport`], [`NeighborhoodSnapshot`], counters      |
//! | [`observer`]  | [`SimObserver`] hooks, [`NoopObserver`]                 |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use dm_behavior::{Parameters, StandardModel};
//! use dm_sim::{NoopObserver, SimBuilder};
//!
//! let model = StandardModel::new(params.clone(), config.timestep_months)?;
//! let mut sim = SimBuilder::new(config, world, params, model).build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod events;
pub mod observer;
pub mod placement;
pub mod report;
pub mod sim;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use placement::{find_land, new_household_near, random_neighborhood};
pub use report::{MigrationCounts, NeighborhoodCounts, NeighborhoodSnapshot, SchoolingCounts, StepReport};
pub use sim::Sim;
