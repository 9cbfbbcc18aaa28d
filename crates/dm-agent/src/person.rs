//! The `Person` leaf agent and its biography state.
//!
//! Relational links (mother, father, spouse, children, household, stores)
//! are plain IDs looked up through the [`World`][crate::World].  They are
//! private and only changed by `World` lifecycle operations, which keep the
//! spouse link symmetric and the household link consistent with the
//! household's member set.  Plain attribute groups (fertility, schooling,
//! ...) are public and may be updated by the event engine directly.

use dm_core::{HouseholdId, NeighborhoodId, PersonId, RegionId, Tick};

use crate::{Agent, MigrationKind};

// ── Attribute types ───────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    #[inline]
    pub fn opposite(self) -> Sex {
        match self {
            Sex::Female => Sex::Male,
            Sex::Male => Sex::Female,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Female => "female",
            Sex::Male => "male",
        }
    }
}

/// Ethnic group code.  Codes are defined by the input data; the model only
/// compares them for equality and uses them to key coefficient tables.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ethnicity(pub u8);

/// Desired completed family size.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DesiredChildren {
    /// No stated preference: the count never blocks a further birth.
    NoPreference,
    Count(u32),
}

impl DesiredChildren {
    /// `true` if a person with `have` children still wants another.
    #[inline]
    pub fn wants_more(self, have: usize) -> bool {
        match self {
            DesiredChildren::NoPreference => true,
            DesiredChildren::Count(n) => have < n as usize,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum SchoolStatus {
    #[default]
    Undetermined,
    InSchool,
    OutOfSchool,
}

impl SchoolStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SchoolStatus::Undetermined => "undetermined",
            SchoolStatus::InSchool => "inschool",
            SchoolStatus::OutOfSchool => "outofschool",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Schooling {
    /// Completed years of schooling.
    pub years:       f64,
    pub status:      SchoolStatus,
    /// Drawn when the person starts school.
    pub final_level: Option<f64>,
}

/// Fertility timers.  All durations are in months.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Fertility {
    pub desired_children:   Option<DesiredChildren>,
    /// Months from marriage to first birth (threshold policy only).
    pub first_birth_timing: Option<u32>,
    /// Minimum spacing before the next birth.
    pub birth_interval:     Option<u32>,
    pub last_birth:         Option<Tick>,
}

/// Services within one hour's walk of where the person grew up.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct ChildhoodContext {
    pub school_within_1hr:   bool,
    pub health_within_1hr:   bool,
    pub bus_within_1hr:      bool,
    pub market_within_1hr:   bool,
    pub employer_within_1hr: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct ParentalBackground {
    pub mother_work:         bool,
    pub father_work:         bool,
    pub mother_schooled:     bool,
    pub father_schooled:     bool,
    pub mother_num_children: u32,
}

/// Where a person currently is held while away from the hierarchy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct StoreRef {
    pub region: RegionId,
    pub kind:   MigrationKind,
}

/// Fertile age window in months, inclusive at both ends.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FertileAges {
    pub min_months: u32,
    pub max_months: u32,
}

impl FertileAges {
    pub fn from_years(min_years: f64, max_years: f64) -> Self {
        Self {
            min_months: (min_years * 12.0).round() as u32,
            max_months: (max_years * 12.0).round() as u32,
        }
    }

    #[inline]
    pub fn contains(&self, age_months: u32) -> bool {
        (self.min_months..=self.max_months).contains(&age_months)
    }
}

// ── Person ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Person {
    pub(crate) id:                 PersonId,
    pub(crate) birthdate:          Tick,
    pub(crate) age_months:         u32,
    pub(crate) sex:                Sex,
    pub(crate) ethnicity:          Ethnicity,
    pub(crate) mother:             Option<PersonId>,
    pub(crate) father:             Option<PersonId>,
    pub(crate) spouse:             Option<PersonId>,
    pub(crate) children:           Vec<PersonId>,
    pub(crate) marriage_time:      Option<Tick>,
    pub(crate) alive:              bool,
    pub(crate) death_time:         Option<Tick>,
    pub(crate) initial_agent:      bool,
    pub(crate) in_migrant:         bool,
    pub(crate) household:          Option<HouseholdId>,
    pub(crate) birth_household:    Option<HouseholdId>,
    pub(crate) birth_neighborhood: Option<NeighborhoodId>,
    pub(crate) stores:             Vec<StoreRef>,
    pub(crate) last_aged:          Option<Tick>,

    pub fertility:                 Fertility,
    pub schooling:                 Schooling,
    pub work:                      bool,
    pub parents_contraception_ever: bool,
    pub childhood:                 ChildhoodContext,
    pub background:                ParentalBackground,
}

impl Agent for Person {
    type Id = PersonId;

    #[inline]
    fn id(&self) -> PersonId {
        self.id
    }

    #[inline]
    fn is_initial_agent(&self) -> bool {
        self.initial_agent
    }
}

impl Person {
    #[inline]
    pub fn birthdate(&self) -> Tick {
        self.birthdate
    }

    #[inline]
    pub fn age_months(&self) -> u32 {
        self.age_months
    }

    #[inline]
    pub fn age_years(&self) -> f64 {
        self.age_months as f64 / 12.0
    }

    #[inline]
    pub fn sex(&self) -> Sex {
        self.sex
    }

    #[inline]
    pub fn is_female(&self) -> bool {
        self.sex == Sex::Female
    }

    #[inline]
    pub fn ethnicity(&self) -> Ethnicity {
        self.ethnicity
    }

    pub fn mother(&self) -> Option<PersonId> {
        self.mother
    }

    pub fn father(&self) -> Option<PersonId> {
        self.father
    }

    #[inline]
    pub fn spouse(&self) -> Option<PersonId> {
        self.spouse
    }

    #[inline]
    pub fn is_married(&self) -> bool {
        self.spouse.is_some()
    }

    pub fn marriage_time(&self) -> Option<Tick> {
        self.marriage_time
    }

    /// Children in birth order.
    pub fn children(&self) -> &[PersonId] {
        &self.children
    }

    #[inline]
    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn death_time(&self) -> Option<Tick> {
        self.death_time
    }

    pub fn is_in_migrant(&self) -> bool {
        self.in_migrant
    }

    /// Current household; `None` while away in a store or after death.
    #[inline]
    pub fn household(&self) -> Option<HouseholdId> {
        self.household
    }

    pub fn birth_household(&self) -> Option<HouseholdId> {
        self.birth_household
    }

    pub fn birth_neighborhood(&self) -> Option<NeighborhoodId> {
        self.birth_neighborhood
    }

    pub fn stores(&self) -> &[StoreRef] {
        &self.stores
    }

    /// `true` while held in at least one migration store.
    pub fn is_stored(&self) -> bool {
        !self.stores.is_empty()
    }

    /// `true` if both people share at least one recorded parent.
    ///
    /// In-migrants have no recorded family in the model and are never
    /// siblings of anyone.
    pub fn is_sibling(&self, other: &Person) -> bool {
        if self.in_migrant || other.in_migrant {
            return false;
        }
        let shared = |a: Option<PersonId>, b: Option<PersonId>| matches!((a, b), (Some(x), Some(y)) if x == y);
        self.id != other.id
            && (shared(self.mother, other.mother) || shared(self.father, other.father))
    }

    /// Birth eligibility for this timestep.
    ///
    /// A first birth is delegated to `first_birth_due`, which applies the
    /// configured timing policy (and may consume random draws).  Later births
    /// require the birth interval to have elapsed since the last birth and
    /// the desired family size not to be reached.
    pub fn is_eligible_for_birth(
        &self,
        now: Tick,
        ages: FertileAges,
        first_birth_due: impl FnOnce(&Person) -> bool,
    ) -> bool {
        if !self.alive || !self.is_female() || !self.is_married() {
            return false;
        }
        if !ages.contains(self.age_months) {
            return false;
        }
        if self.children.is_empty() {
            return first_birth_due(self);
        }
        if let (Some(last), Some(interval)) = (self.fertility.last_birth, self.fertility.birth_interval)
            && now.since(last) <= interval as u64
        {
            return false;
        }
        self.fertility
            .desired_children
            .is_none_or(|desired| desired.wants_more(self.children.len()))
    }
}
