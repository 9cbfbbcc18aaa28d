//! The `Household` container.

use dm_core::{HouseholdId, NeighborhoodId, PersonId, Tick};

use crate::{Agent, AgentSet, Container, Occupancy};

/// Socioeconomic attributes drawn when a household is created.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct HouseholdTraits {
    pub any_non_wood_fuel: bool,
    pub own_house_plot:    bool,
    pub own_land:          bool,
    pub rented_out_land:   bool,
}

/// A group of co-resident persons.
///
/// A household can never be observed empty: when the last member leaves,
/// `after_remove` reports [`Occupancy::Empty`] and the `World` dissolves it
/// in the same operation.
#[derive(Clone, Debug)]
pub struct Household {
    pub(crate) id:            HouseholdId,
    pub(crate) members:       AgentSet<PersonId>,
    pub(crate) neighborhood:  Option<NeighborhoodId>,
    pub(crate) initial_agent: bool,
    pub(crate) plot_area:     f64,

    pub traits:               HouseholdTraits,
    pub last_migration:       Option<Tick>,
}

impl Household {
    pub(crate) fn new(id: HouseholdId, traits: HouseholdTraits, plot_area: f64, initial_agent: bool) -> Self {
        Self {
            id,
            members: AgentSet::new(),
            neighborhood: None,
            initial_agent,
            plot_area,
            traits,
            last_migration: None,
        }
    }

    /// The neighborhood this household is placed in, `None` until placed.
    #[inline]
    pub fn neighborhood(&self) -> Option<NeighborhoodId> {
        self.neighborhood
    }

    /// House-plot area claimed from the neighborhood on placement.
    #[inline]
    pub fn plot_area(&self) -> f64 {
        self.plot_area
    }

    /// `true` if a member migrated out within `window` months before `now`.
    pub fn had_recent_migrant(&self, now: Tick, window: u64) -> bool {
        self.last_migration.is_some_and(|t| now.since(t) <= window)
    }
}

impl Agent for Household {
    type Id = HouseholdId;

    #[inline]
    fn id(&self) -> HouseholdId {
        self.id
    }

    #[inline]
    fn is_initial_agent(&self) -> bool {
        self.initial_agent
    }
}

impl Container for Household {
    type Member = PersonId;
    type Admission = ();

    #[inline]
    fn members(&self) -> &AgentSet<PersonId> {
        &self.members
    }

    #[inline]
    fn members_mut(&mut self) -> &mut AgentSet<PersonId> {
        &mut self.members
    }

    fn after_remove(&mut self, _member: PersonId) -> Occupancy {
        if self.members.is_empty() {
            Occupancy::Empty
        } else {
            Occupancy::Occupied
        }
    }
}
