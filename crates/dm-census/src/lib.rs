//! `dm-census` — loads a region's initial population from CSV tables.
//!
//! | Module     | Contents                                                  |
//! |------------|-----------------------------------------------------------|
//! | [`loader`] | `CensusLoader`, `CensusSources`, `CensusSummary`, formats |
//! | [`error`]  | `CensusError`, `CensusResult<T>`                          |

pub mod error;
pub mod loader;


pub use error::{CensusError, CensusResult};
pub use loader::{
    CensusLoader, CensusSources, CensusSummary, HOUSEHOLDS_FILE, NEIGHBORHOODS_FILE, PERSONS_FILE,
};
