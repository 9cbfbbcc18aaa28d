//! `dm-agent` — the agent hierarchy and its registry.
//!
//! Persons live in households, households in neighborhoods, neighborhoods
//! in regions.  Regions also hold two migration stores for persons who are
//! temporarily away.  All records are owned by the [`World`]; containers
//! and cross-references hold IDs only.
//!
//! # What lives here
//!
//! | Module           | Contents                                                     |
//! |------------------|--------------------------------------------------------------|
//! | [`agent`]        | `Agent`, `Container` (with add/remove hooks), `AgentSet`     |
//! | [`person`]       | `Person`, `Sex`, fertility/schooling attribute groups        |
//! | [`household`]    | `Household`, `HouseholdTraits`                               |
//! | [`neighborhood`] | `Neighborhood`, `LandLedger`, `ServiceAccess`                |
//! | [`region`]       | `Region`, `MigrationKind`                                    |
//! | [`store`]        | `AgentStore` — out-migrants keyed by return time             |
//! | [`proximity`]    | R-tree nearest-first neighborhood ranking                    |
//! | [`builder`]      | `PersonBuilder`, `NewHousehold`, `NewNeighborhood`           |
//! | [`world`]        | `World` — factory, membership, and lifecycle operations      |
//! | [`error`]        | `AgentError`, `AgentResult`                                  |
//!
//! # Iteration order
//!
//! Every container iterates in insertion order and every registry is a
//! `BTreeMap`, so a fixed seed and a fixed input replay the same random
//! stream.

pub mod agent;
pub mod builder;
pub mod error;
pub mod household;
pub mod neighborhood;
pub mod person;
pub mod proximity;
pub mod region;
pub mod store;
pub mod world;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use agent::{Agent, AgentSet, Container, Occupancy};
pub use builder::{NewHousehold, NewNeighborhood, PersonBuilder};
pub use error::{AgentError, AgentResult};
pub use household::{Household, HouseholdTraits};
pub use neighborhood::{
    LandClaim, LandCover, LandLedger, Neighborhood, NeighborhoodProfile, ServiceAccess,
};
pub use person::{
    ChildhoodContext, DesiredChildren, Ethnicity, FertileAges, Fertility, ParentalBackground,
    Person, SchoolStatus, Schooling, Sex, StoreRef,
};
pub use proximity::rank_by_distance;
pub use region::{MigrationKind, Region};
pub use store::{AgentStore, StoredPerson};
pub use world::{HouseholdExit, Newborn, World};
