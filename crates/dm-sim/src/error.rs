use dm_agent::AgentError;
use dm_behavior::BehaviorError;
use dm_core::{CoreError, NeighborhoodId, RegionId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Behavior(#[from] BehaviorError),

    /// Placement search visited every neighborhood reachable from `start`
    /// and none could supply the plot.
    #[error("no neighborhood reachable from {start} has {area} m² of free land")]
    CapacityExhausted { start: NeighborhoodId, area: f64 },

    #[error("{0} has no neighborhoods to place a household in")]
    NoNeighborhoods(RegionId),
}

pub type SimResult<T> = Result<T, SimError>;
