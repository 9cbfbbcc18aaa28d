//! `dm-core` — foundational types for the demographic model.
//!
//! This crate is a dependency of every other `dm-*` crate.  It has no `dm-*`
//! dependencies and few external ones (`rand`, `rustc-hash`, `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `PersonId`, `HouseholdId`, `NeighborhoodId`, `RegionId`   |
//! | [`id_gen`]      | `IdGenerator` — unique, never-reused IDs per agent kind   |
//! | [`geo`]         | `Coords`, planar distance                                 |
//! | [`time`]        | `Tick`, `ModelDate`, `SimClock`, `SimConfig`              |
//! | [`rng`]         | `SimRng` — the single seeded random stream               |
//! | [`error`]       | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod id_gen;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::Coords;
pub use id_gen::IdGenerator;
pub use ids::{HouseholdId, NeighborhoodId, PersonId, RegionId, TypedId};
pub use rng::SimRng;
pub use time::{ModelDate, SimClock, SimConfig, Tick};
