//! The `Region` container: neighborhoods plus the migration stores.

use dm_core::{NeighborhoodId, RegionId};

use crate::{Agent, AgentSet, AgentStore, Container};

/// Migration class, selecting which store holds an out-migrant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MigrationKind {
    /// Short absence, returning within the local threshold.
    Local,
    /// Long absence.
    Distant,
}

impl MigrationKind {
    pub const ALL: [MigrationKind; 2] = [MigrationKind::Local, MigrationKind::Distant];
}

#[derive(Clone, Debug)]
pub struct Region {
    pub(crate) id:            RegionId,
    pub(crate) members:       AgentSet<NeighborhoodId>,
    pub(crate) initial_agent: bool,
    pub(crate) local:         AgentStore,
    pub(crate) distant:       AgentStore,
}

impl Region {
    pub(crate) fn new(id: RegionId, initial_agent: bool) -> Self {
        Self {
            id,
            members: AgentSet::new(),
            initial_agent,
            local: AgentStore::new(),
            distant: AgentStore::new(),
        }
    }

    pub fn store(&self, kind: MigrationKind) -> &AgentStore {
        match kind {
            MigrationKind::Local => &self.local,
            MigrationKind::Distant => &self.distant,
        }
    }

    pub(crate) fn store_mut(&mut self, kind: MigrationKind) -> &mut AgentStore {
        match kind {
            MigrationKind::Local => &mut self.local,
            MigrationKind::Distant => &mut self.distant,
        }
    }

    /// Stores in `MigrationKind::ALL` order.
    pub fn stores(&self) -> impl Iterator<Item = (MigrationKind, &AgentStore)> + '_ {
        MigrationKind::ALL.into_iter().map(|kind| (kind, self.store(kind)))
    }

    /// Total persons held across all stores.
    pub fn num_stored(&self) -> usize {
        self.local.len() + self.distant.len()
    }
}

impl Agent for Region {
    type Id = RegionId;

    #[inline]
    fn id(&self) -> RegionId {
        self.id
    }

    #[inline]
    fn is_initial_agent(&self) -> bool {
        self.initial_agent
    }
}

impl Container for Region {
    type Member = NeighborhoodId;
    type Admission = ();

    #[inline]
    fn members(&self) -> &AgentSet<NeighborhoodId> {
        &self.members
    }

    #[inline]
    fn members_mut(&mut self) -> &mut AgentSet<NeighborhoodId> {
        &mut self.members
    }
}
