//! Construction inputs for the `World` factory methods.
//!
//! # Example
//!
//! ```rust,ignore
//! let pid = world.new_person(
//!     PersonBuilder::new(Sex::Female, Ethnicity(1), 24 * 12, now)
//!         .initial_agent()
//!         .fertility(Fertility { birth_interval: Some(20), ..Default::default() }),
//! )?;
//! ```

use dm_core::{HouseholdId, NeighborhoodId, PersonId, Tick};

use crate::{
    ChildhoodContext, Ethnicity, Fertility, HouseholdTraits, LandLedger, NeighborhoodProfile,
    ParentalBackground, Person, Schooling, Sex,
};

// ── PersonBuilder ─────────────────────────────────────────────────────────────

/// Fluent description of a person to create with
/// [`World::new_person`][crate::World::new_person].
#[derive(Clone, Debug)]
pub struct PersonBuilder {
    pub(crate) id:       Option<PersonId>,
    pub(crate) mother:   Option<PersonId>,
    pub(crate) father:   Option<PersonId>,
    pub(crate) person:   Person,
}

impl PersonBuilder {
    /// A person of `age_months` at `now`; the birthdate is derived.
    pub fn new(sex: Sex, ethnicity: Ethnicity, age_months: u32, now: Tick) -> Self {
        Self {
            id:     None,
            mother: None,
            father: None,
            person: Person {
                // Placeholder until the World assigns the ID.
                id:                         PersonId(0),
                birthdate:                  now.rewind(age_months as u64),
                age_months,
                sex,
                ethnicity,
                mother:                     None,
                father:                     None,
                spouse:                     None,
                children:                   Vec::new(),
                marriage_time:              None,
                alive:                      true,
                death_time:                 None,
                initial_agent:              false,
                in_migrant:                 false,
                household:                  None,
                birth_household:            None,
                birth_neighborhood:         None,
                stores:                     Vec::new(),
                last_aged:                  None,
                fertility:                  Fertility::default(),
                schooling:                  Schooling::default(),
                work:                       false,
                parents_contraception_ever: false,
                childhood:                  ChildhoodContext::default(),
                background:                 ParentalBackground::default(),
            },
        }
    }

    /// Use an externally assigned ID (registered against the generator).
    pub fn id(mut self, id: PersonId) -> Self {
        self.id = Some(id);
        self
    }

    /// Link to existing parents.  The child is appended to each parent's
    /// child list on creation.
    pub fn parents(mut self, mother: Option<PersonId>, father: Option<PersonId>) -> Self {
        self.mother = mother;
        self.father = father;
        self
    }

    pub fn initial_agent(mut self) -> Self {
        self.person.initial_agent = true;
        self
    }

    pub fn in_migrant(mut self) -> Self {
        self.person.in_migrant = true;
        self
    }

    pub fn fertility(mut self, fertility: Fertility) -> Self {
        self.person.fertility = fertility;
        self
    }

    pub fn schooling(mut self, schooling: Schooling) -> Self {
        self.person.schooling = schooling;
        self
    }

    pub fn work(mut self, work: bool) -> Self {
        self.person.work = work;
        self
    }

    pub fn parents_contraception_ever(mut self, ever: bool) -> Self {
        self.person.parents_contraception_ever = ever;
        self
    }

    pub fn childhood(mut self, childhood: ChildhoodContext) -> Self {
        self.person.childhood = childhood;
        self
    }

    pub fn background(mut self, background: ParentalBackground) -> Self {
        self.person.background = background;
        self
    }

    pub(crate) fn born_in(mut self, household: HouseholdId, neighborhood: Option<NeighborhoodId>) -> Self {
        self.person.birth_household = Some(household);
        self.person.birth_neighborhood = neighborhood;
        self
    }
}

// ── Household / neighborhood inputs ───────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct NewHousehold {
    pub id:            Option<HouseholdId>,
    pub traits:        HouseholdTraits,
    /// Plot area claimed on placement (ignored for exempt placements).
    pub plot_area:     f64,
    pub initial_agent: bool,
}

#[derive(Clone, Debug, Default)]
pub struct NewNeighborhood {
    pub id:            Option<NeighborhoodId>,
    pub profile:       NeighborhoodProfile,
    pub land:          LandLedger,
    pub initial_agent: bool,
}
