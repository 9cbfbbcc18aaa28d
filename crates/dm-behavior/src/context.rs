//! Read-only views passed to every [`DemographicModel`][crate::DemographicModel] call.

use dm_agent::{Container, Ethnicity, Household, Neighborhood, Person, World};
use dm_core::{HouseholdId, PersonId};

/// A person together with the household and neighborhood it lives in.
///
/// Stored migrants have neither; models fall back to person-only terms.
#[derive(Copy, Clone, Debug)]
pub struct PersonView<'a> {
    pub person:       &'a Person,
    pub household:    Option<&'a Household>,
    pub neighborhood: Option<&'a Neighborhood>,
}

impl<'a> PersonView<'a> {
    pub fn of(world: &'a World, id: PersonId) -> Option<Self> {
        let person = world.person(id)?;
        let household = person.household().and_then(|h| world.household(h));
        let neighborhood = household.and_then(|h| h.neighborhood()).and_then(|n| world.neighborhood(n));
        Some(Self { person, household, neighborhood })
    }
}

/// The inputs of the fuelwood regression.
#[derive(Copy, Clone, Debug)]
pub struct HouseholdView<'a> {
    pub household:      &'a Household,
    pub size:           usize,
    pub head_ethnicity: Option<Ethnicity>,
}

impl<'a> HouseholdView<'a> {
    pub fn of(world: &'a World, id: HouseholdId) -> Option<Self> {
        let household = world.household(id)?;
        let head_ethnicity = world
            .household_head(id)
            .and_then(|pid| world.person(pid))
            .map(Person::ethnicity);
        Some(Self { household, size: household.num_members(), head_ethnicity })
    }
}
