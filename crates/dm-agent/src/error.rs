//! Error types for dm-agent.
//!
//! Almost every variant is an invariant violation: the event engine only
//! calls these operations after checking eligibility, so reaching one means
//! a logic defect.  The exception is [`AgentError::InsufficientLand`], which
//! placement search in `dm-sim` treats as "try the next neighborhood".

use dm_core::{CoreError, HouseholdId, NeighborhoodId, PersonId, RegionId, Tick};
use thiserror::Error;

use crate::MigrationKind;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("{0} not found")]
    UnknownPerson(PersonId),

    #[error("{0} not found")]
    UnknownHousehold(HouseholdId),

    #[error("{0} not found")]
    UnknownNeighborhood(NeighborhoodId),

    #[error("{0} not found")]
    UnknownRegion(RegionId),

    #[error("{container} already contains {member}")]
    DuplicateMember { container: String, member: String },

    #[error("{container} does not contain {member}")]
    NotAMember { container: String, member: String },

    #[error("{0} is not resident in any household")]
    NotResident(PersonId),

    #[error("{0} already belongs to {1}")]
    AlreadyResident(PersonId, HouseholdId),

    #[error("{0} already belongs to {1}")]
    AlreadyPlaced(HouseholdId, NeighborhoodId),

    #[error("{0} is dead")]
    Dead(PersonId),

    #[error("invalid marriage of {a} and {b}: {reason}")]
    InvalidMarriage {
        a:      PersonId,
        b:      PersonId,
        reason: &'static str,
    },

    #[error("{0} is not married")]
    NotMarried(PersonId),

    #[error("spouse link of {0} is not symmetric")]
    AsymmetricSpouse(PersonId),

    #[error("invalid birth to {mother}: {reason}")]
    InvalidBirth {
        mother: PersonId,
        reason: &'static str,
    },

    #[error("{person} already aged at {at}")]
    DoubleAgeIncrement { person: PersonId, at: Tick },

    #[error("{person} is already held in the {kind:?} store of {region}")]
    AlreadyStored {
        person: PersonId,
        region: RegionId,
        kind:   MigrationKind,
    },

    #[error("{neighborhood} has no vegetated land for a {area} plot")]
    InsufficientLand {
        neighborhood: NeighborhoodId,
        area:         f64,
    },
}

/// Shorthand result type for `dm-agent`.
pub type AgentResult<T> = Result<T, AgentError>;
