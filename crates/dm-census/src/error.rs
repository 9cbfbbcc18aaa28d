use dm_agent::AgentError;
use dm_core::{HouseholdId, PersonId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CensusError {
    #[error("census parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Agent(#[from] AgentError),

    /// `person` names `spouse`, but `spouse` does not name `person` back.
    #[error("{person} lists {spouse} as spouse, but the link is not mutual")]
    AsymmetricSpouse { person: PersonId, spouse: PersonId },

    #[error("{0} has no members in the persons file")]
    EmptyHousehold(HouseholdId),
}

pub type CensusResult<T> = Result<T, CensusError>;
