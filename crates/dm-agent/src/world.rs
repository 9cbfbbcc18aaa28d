//! The `World`: root registry, agent factory, and lifecycle operations.
//!
//! # Ownership model
//!
//! The `World` owns every agent record in ID-keyed registries.  Containers
//! hold only member IDs, and every cross-reference (spouse, parents,
//! household, store) is an ID resolved through the registries, so a
//! destroyed household is simply "not found".
//!
//! | Relation              | Stored as                                         |
//! |-----------------------|---------------------------------------------------|
//! | region → neighborhood | `Region::members` + `Neighborhood::region`       |
//! | neighborhood → hh     | `Neighborhood::members` + `Household::neighborhood` |
//! | household → person    | `Household::members` + `Person::household`        |
//! | store → person        | `AgentStore` entry + `Person::stores`             |
//!
//! Each pair is only updated here, together, so the two sides never
//! disagree.  Re-parenting is always remove-then-add within one call.
//! Dead persons stay in the registry for output but are unreachable from
//! any container.

use std::collections::BTreeMap;

use dm_core::{HouseholdId, IdGenerator, NeighborhoodId, PersonId, RegionId, Tick};
use tracing::debug;

use crate::proximity::rank_by_distance;
use crate::{
    AgentError, AgentResult, AgentSet, Container, DesiredChildren,
    Fertility, Household, LandClaim, MigrationKind, Neighborhood, NewHousehold, NewNeighborhood,
    Occupancy, ParentalBackground, Person, PersonBuilder, Region, Sex, StoreRef, StoredPerson,
};

/// What happened to the household a person just left.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HouseholdExit {
    pub household:    HouseholdId,
    pub neighborhood: Option<NeighborhoodId>,
    /// The person was the last member and the household no longer exists.
    pub dissolved:    bool,
}

/// Random draws for a birth, taken by the caller before `give_birth`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Newborn {
    pub sex:                   Sex,
    pub fertility:             Fertility,
    /// Replaces the mother's current birth-interval draw.
    pub mother_birth_interval: u32,
}

#[derive(Debug, Default)]
pub struct World {
    persons:          BTreeMap<PersonId, Person>,
    households:       BTreeMap<HouseholdId, Household>,
    neighborhoods:    BTreeMap<NeighborhoodId, Neighborhood>,
    regions:          BTreeMap<RegionId, Region>,
    members:          AgentSet<RegionId>,
    person_ids:       IdGenerator<PersonId>,
    household_ids:    IdGenerator<HouseholdId>,
    neighborhood_ids: IdGenerator<NeighborhoodId>,
    region_ids:       IdGenerator<RegionId>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Factory ───────────────────────────────────────────────────────────

    pub fn new_region(&mut self, id: Option<RegionId>, initial_agent: bool) -> AgentResult<RegionId> {
        let id = match id {
            Some(id) => self.region_ids.use_id(id)?,
            None => self.region_ids.next()?,
        };
        self.regions.insert(id, Region::new(id, initial_agent));
        self.members.insert(id);
        Ok(id)
    }

    /// Create a neighborhood and add it to `region`.
    pub fn new_neighborhood(&mut self, region: RegionId, spec: NewNeighborhood) -> AgentResult<NeighborhoodId> {
        if !self.regions.contains_key(&region) {
            return Err(AgentError::UnknownRegion(region));
        }
        let id = match spec.id {
            Some(id) => self.neighborhood_ids.use_id(id)?,
            None => self.neighborhood_ids.next()?,
        };
        let mut nbh = Neighborhood::new(id, spec.profile, spec.land, spec.initial_agent);
        nbh.region = Some(region);
        self.region_mut(region)?.add_agent(id, ())?;
        self.neighborhoods.insert(id, nbh);
        Ok(id)
    }

    /// Recompute every neighborhood's nearest-first list within `region`.
    pub fn index_distances(&mut self, region: RegionId) -> AgentResult<()> {
        let points: Vec<_> = self
            .region(region)
            .ok_or(AgentError::UnknownRegion(region))?
            .iter_agents()
            .filter_map(|nid| self.neighborhoods.get(&nid).map(|n| (nid, n.profile.coords)))
            .collect();
        for (nid, ranked) in rank_by_distance(&points) {
            if let Some(nbh) = self.neighborhoods.get_mut(&nid) {
                nbh.by_distance = ranked;
            }
        }
        Ok(())
    }

    /// Create an unplaced household; see [`place_household`][Self::place_household].
    pub fn new_household(&mut self, spec: NewHousehold) -> AgentResult<HouseholdId> {
        let id = match spec.id {
            Some(id) => self.household_ids.use_id(id)?,
            None => self.household_ids.next()?,
        };
        self.households
            .insert(id, Household::new(id, spec.traits, spec.plot_area, spec.initial_agent));
        Ok(id)
    }

    /// Add an unplaced household to `neighborhood`.
    ///
    /// With [`LandClaim::Plot`] this fails with
    /// [`AgentError::InsufficientLand`] when the neighborhood cannot supply
    /// the plot; the household stays unplaced and may be tried elsewhere.
    pub fn place_household(
        &mut self,
        household: HouseholdId,
        neighborhood: NeighborhoodId,
        claim: LandClaim,
    ) -> AgentResult<()> {
        let hh = self.households.get(&household).ok_or(AgentError::UnknownHousehold(household))?;
        if let Some(current) = hh.neighborhood {
            return Err(AgentError::AlreadyPlaced(household, current));
        }
        self.neighborhood_mut(neighborhood)?.add_agent(household, claim)?;
        if let Some(hh) = self.households.get_mut(&household) {
            hh.neighborhood = Some(neighborhood);
        }
        Ok(())
    }

    /// Create a person record.  The person is not yet in any household.
    pub fn new_person(&mut self, builder: PersonBuilder) -> AgentResult<PersonId> {
        for parent in [builder.mother, builder.father].into_iter().flatten() {
            if !self.persons.contains_key(&parent) {
                return Err(AgentError::UnknownPerson(parent));
            }
        }
        let id = match builder.id {
            Some(id) => self.person_ids.use_id(id)?,
            None => self.person_ids.next()?,
        };
        let mut person = builder.person;
        person.id = id;
        self.persons.insert(id, person);
        self.set_parents(id, builder.mother, builder.father)?;
        Ok(id)
    }

    /// Record `mother`/`father` on `child` and append `child` to their
    /// child lists.  Used by `new_person` and by population loaders that
    /// link parents after all records exist.
    ///
    /// The mother's last birth becomes the child's birthdate when the child
    /// is her youngest, so linked children count toward birth spacing.
    pub fn set_parents(
        &mut self,
        child: PersonId,
        mother: Option<PersonId>,
        father: Option<PersonId>,
    ) -> AgentResult<()> {
        let born = self.req_person(child)?.birthdate;
        for parent in [mother, father].into_iter().flatten() {
            if parent == child {
                return Err(AgentError::InvalidBirth { mother: parent, reason: "person cannot be their own parent" });
            }
            let p = self.person_mut(parent)?;
            if !p.children.contains(&child) {
                p.children.push(child);
            }
        }
        if let Some(mother) = mother {
            let m = self.person_mut(mother)?;
            if m.fertility.last_birth.is_none_or(|last| last < born) {
                m.fertility.last_birth = Some(born);
            }
        }
        let c = self.person_mut(child)?;
        c.mother = mother.or(c.mother);
        c.father = father.or(c.father);
        Ok(())
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    #[inline]
    pub fn person(&self, id: PersonId) -> Option<&Person> {
        self.persons.get(&id)
    }

    /// Mutable access to a person's public attributes.
    pub fn person_mut(&mut self, id: PersonId) -> AgentResult<&mut Person> {
        self.persons.get_mut(&id).ok_or(AgentError::UnknownPerson(id))
    }

    #[inline]
    pub fn household(&self, id: HouseholdId) -> Option<&Household> {
        self.households.get(&id)
    }

    pub fn household_mut(&mut self, id: HouseholdId) -> AgentResult<&mut Household> {
        self.households.get_mut(&id).ok_or(AgentError::UnknownHousehold(id))
    }

    #[inline]
    pub fn neighborhood(&self, id: NeighborhoodId) -> Option<&Neighborhood> {
        self.neighborhoods.get(&id)
    }

    pub fn neighborhood_mut(&mut self, id: NeighborhoodId) -> AgentResult<&mut Neighborhood> {
        self.neighborhoods.get_mut(&id).ok_or(AgentError::UnknownNeighborhood(id))
    }

    #[inline]
    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(&id)
    }

    fn region_mut(&mut self, id: RegionId) -> AgentResult<&mut Region> {
        self.regions.get_mut(&id).ok_or(AgentError::UnknownRegion(id))
    }

    fn req_person(&self, id: PersonId) -> AgentResult<&Person> {
        self.persons.get(&id).ok_or(AgentError::UnknownPerson(id))
    }

    /// Neighborhood of the household `person` lives in.
    pub fn neighborhood_of(&self, person: PersonId) -> Option<NeighborhoodId> {
        let hid = self.persons.get(&person)?.household?;
        self.households.get(&hid)?.neighborhood
    }

    /// Oldest member of `household`; ties go to the earliest member.
    pub fn household_head(&self, household: HouseholdId) -> Option<PersonId> {
        let hh = self.households.get(&household)?;
        let mut head: Option<(PersonId, u32)> = None;
        for pid in hh.iter_agents() {
            let age = self.persons.get(&pid).map_or(0, |p| p.age_months);
            if head.is_none_or(|(_, best)| age > best) {
                head = Some((pid, age));
            }
        }
        head.map(|(pid, _)| pid)
    }

    // ── Iteration ─────────────────────────────────────────────────────────

    /// Region IDs in insertion order.
    pub fn region_ids(&self) -> Vec<RegionId> {
        self.members.snapshot()
    }

    /// Every person record ever created, including the dead.
    pub fn persons(&self) -> impl Iterator<Item = &Person> + '_ {
        self.persons.values()
    }

    pub fn households(&self) -> impl Iterator<Item = &Household> + '_ {
        self.households.values()
    }

    pub fn neighborhoods(&self) -> impl Iterator<Item = &Neighborhood> + '_ {
        self.neighborhoods.values()
    }

    pub fn iter_neighborhoods(&self, region: RegionId) -> impl Iterator<Item = NeighborhoodId> + '_ {
        self.regions.get(&region).into_iter().flat_map(|r| r.iter_agents())
    }

    /// Placed households of `region`, neighborhood by neighborhood.
    pub fn iter_households(&self, region: RegionId) -> impl Iterator<Item = HouseholdId> + '_ {
        self.iter_neighborhoods(region)
            .filter_map(move |nid| self.neighborhoods.get(&nid))
            .flat_map(|n| n.iter_agents())
    }

    /// The resident population of `region` (excludes stored migrants).
    pub fn iter_residents(&self, region: RegionId) -> impl Iterator<Item = PersonId> + '_ {
        self.iter_households(region)
            .filter_map(move |hid| self.households.get(&hid))
            .flat_map(|h| h.iter_agents())
    }

    /// Residents followed by everyone held in the region's stores.
    pub fn iter_all_persons(&self, region: RegionId) -> impl Iterator<Item = PersonId> + '_ {
        let stored = self
            .regions
            .get(&region)
            .into_iter()
            .flat_map(|r| r.stores().flat_map(|(_, store)| store.iter().map(|e| e.person)));
        self.iter_residents(region).chain(stored)
    }

    /// Owned snapshot of [`iter_residents`][Self::iter_residents].
    pub fn residents(&self, region: RegionId) -> Vec<PersonId> {
        self.iter_residents(region).collect()
    }

    /// `true` if `person` is alive and belongs to a placed household.
    pub fn is_resident(&self, person: PersonId) -> bool {
        self.persons.get(&person).is_some_and(|p| p.alive) && self.neighborhood_of(person).is_some()
    }

    // ── Counts ────────────────────────────────────────────────────────────

    pub fn num_persons(&self, region: RegionId) -> usize {
        self.iter_households(region)
            .filter_map(|hid| self.households.get(&hid))
            .map(|h| h.num_members())
            .sum()
    }

    pub fn num_households(&self, region: RegionId) -> usize {
        self.iter_households(region).count()
    }

    pub fn num_neighborhoods(&self, region: RegionId) -> usize {
        self.regions.get(&region).map_or(0, |r| r.num_members())
    }

    /// Resident persons currently married (each couple counts twice if
    /// both spouses are resident).
    pub fn num_married(&self, region: RegionId) -> usize {
        self.iter_residents(region)
            .filter(|pid| self.persons.get(pid).is_some_and(Person::is_married))
            .count()
    }

    /// Resident population across all regions.
    pub fn population(&self) -> usize {
        self.members.iter().map(|rid| self.num_persons(rid)).sum()
    }

    // ── Membership ────────────────────────────────────────────────────────

    /// Add a living, household-less person to `household`.
    pub fn add_to_household(&mut self, person: PersonId, household: HouseholdId) -> AgentResult<()> {
        let p = self.req_person(person)?;
        if !p.alive {
            return Err(AgentError::Dead(person));
        }
        if let Some(current) = p.household {
            return Err(AgentError::AlreadyResident(person, current));
        }
        self.household_mut(household)?.add_agent(person, ())?;
        self.person_mut(person)?.household = Some(household);
        Ok(())
    }

    /// Remove `person` from its household, dissolving the household if it
    /// becomes empty.
    pub fn remove_from_household(&mut self, person: PersonId) -> AgentResult<HouseholdExit> {
        let household = self.req_person(person)?.household.ok_or(AgentError::NotResident(person))?;
        let hh = self.household_mut(household)?;
        let occupancy = hh.remove_agent(person)?;
        let neighborhood = hh.neighborhood;
        self.person_mut(person)?.household = None;
        let dissolved = occupancy == Occupancy::Empty;
        if dissolved {
            self.dissolve_household(household)?;
        }
        Ok(HouseholdExit { household, neighborhood, dissolved })
    }

    /// Move `person` to `household` (remove from the old one first).
    /// Returns the exit from the previous household, if any.
    pub fn move_to_household(&mut self, person: PersonId, household: HouseholdId) -> AgentResult<Option<HouseholdExit>> {
        let current = self.req_person(person)?.household;
        if current == Some(household) {
            return Ok(None);
        }
        if !self.households.contains_key(&household) {
            return Err(AgentError::UnknownHousehold(household));
        }
        let exit = match current {
            Some(_) => Some(self.remove_from_household(person)?),
            None => None,
        };
        self.add_to_household(person, household)?;
        Ok(exit)
    }

    /// Drop an empty household from its neighborhood and the registry.
    ///
    /// The household's plot stays in the private-building ledger.
    fn dissolve_household(&mut self, household: HouseholdId) -> AgentResult<()> {
        let hh = self.households.remove(&household).ok_or(AgentError::UnknownHousehold(household))?;
        if let Some(nid) = hh.neighborhood {
            self.neighborhood_mut(nid)?.remove_agent(household)?;
        }
        debug!(%household, "household dissolved");
        Ok(())
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Marry `a` and `b` at `now`.
    ///
    /// Both must be alive, unmarried, of opposite sex, and share an
    /// ethnicity.  If the wife has no desired family size yet,
    /// `draw_desired` supplies one.
    pub fn marry(
        &mut self,
        a: PersonId,
        b: PersonId,
        now: Tick,
        draw_desired: impl FnOnce() -> DesiredChildren,
    ) -> AgentResult<()> {
        let invalid = |reason| AgentError::InvalidMarriage { a, b, reason };
        if a == b {
            return Err(invalid("a person cannot marry themselves"));
        }
        let (pa, pb) = (self.req_person(a)?, self.req_person(b)?);
        if !pa.alive || !pb.alive {
            return Err(invalid("both persons must be alive"));
        }
        if pa.is_married() || pb.is_married() {
            return Err(invalid("both persons must be unmarried"));
        }
        if pa.sex == pb.sex {
            return Err(invalid("persons must be of opposite sex"));
        }
        if pa.ethnicity != pb.ethnicity {
            return Err(invalid("persons must share an ethnicity"));
        }
        let wife = if pa.is_female() { a } else { b };

        for (me, other) in [(a, b), (b, a)] {
            let p = self.person_mut(me)?;
            p.spouse = Some(other);
            p.marriage_time = Some(now);
        }
        let w = self.person_mut(wife)?;
        if w.fertility.desired_children.is_none() {
            w.fertility.desired_children = Some(draw_desired());
        }
        Ok(())
    }

    /// Clear the spouse link of `person` and its spouse.  Returns the former
    /// spouse.
    pub fn divorce(&mut self, person: PersonId) -> AgentResult<PersonId> {
        let spouse = self.req_person(person)?.spouse.ok_or(AgentError::NotMarried(person))?;
        if self.req_person(spouse)?.spouse != Some(person) {
            return Err(AgentError::AsymmetricSpouse(person));
        }
        self.person_mut(person)?.spouse = None;
        self.person_mut(spouse)?.spouse = None;
        Ok(spouse)
    }

    /// Mark `person` dead at `now`, divorcing first if married and
    /// detaching from its household and any store.
    pub fn kill(&mut self, person: PersonId, now: Tick) -> AgentResult<Option<HouseholdExit>> {
        let p = self.req_person(person)?;
        if !p.alive {
            return Err(AgentError::Dead(person));
        }
        let married = p.is_married();
        let resident = p.household.is_some();
        let stores = p.stores.clone();

        if married {
            self.divorce(person)?;
        }
        let exit = if resident { Some(self.remove_from_household(person)?) } else { None };
        for store in stores {
            self.region_mut(store.region)?.store_mut(store.kind).remove(person);
        }
        let p = self.person_mut(person)?;
        p.stores.clear();
        p.alive = false;
        p.death_time = Some(now);
        Ok(exit)
    }

    /// Create a child of `mother` and her husband in the mother's household.
    ///
    /// The child inherits the mother's ethnicity, records the birth
    /// household and neighborhood, and snapshots the neighborhood's
    /// service access and the parents' background.  The mother's last
    /// birth time and birth interval are reset.
    pub fn give_birth(&mut self, mother: PersonId, now: Tick, newborn: Newborn) -> AgentResult<PersonId> {
        let invalid = |reason| AgentError::InvalidBirth { mother, reason };
        let m = self.req_person(mother)?;
        if !m.alive {
            return Err(invalid("mother is dead"));
        }
        if !m.is_female() {
            return Err(invalid("mother is not female"));
        }
        let father = m.spouse.ok_or(invalid("mother is not married"))?;
        if father == mother {
            return Err(invalid("mother and father are the same person"));
        }
        let f = self.req_person(father)?;
        if f.spouse != Some(mother) {
            return Err(AgentError::AsymmetricSpouse(mother));
        }
        let household = m.household.ok_or(AgentError::NotResident(mother))?;
        let neighborhood = self.households.get(&household).and_then(|h| h.neighborhood);

        let childhood = neighborhood
            .and_then(|nid| self.neighborhoods.get(&nid))
            .map(|n| n.services().within_one_hour())
            .unwrap_or_default();
        let background = ParentalBackground {
            mother_work:         m.work,
            father_work:         f.work,
            mother_schooled:     m.schooling.years > 0.0,
            father_schooled:     f.schooling.years > 0.0,
            mother_num_children: m.children.len() as u32,
        };

        let builder = PersonBuilder::new(newborn.sex, m.ethnicity, 0, now)
            .parents(Some(mother), Some(father))
            .fertility(newborn.fertility)
            .childhood(childhood)
            .background(background)
            .born_in(household, neighborhood);
        let child = self.new_person(builder)?;
        self.add_to_household(child, household)?;

        let m = self.person_mut(mother)?;
        m.fertility.last_birth = Some(now);
        m.fertility.birth_interval = Some(newborn.mother_birth_interval);
        Ok(child)
    }

    /// Send `person` away: update its household's last-migration time,
    /// remove it from the household, and hold it in the `kind` store of
    /// `region` until `return_time`.
    pub fn store_person(
        &mut self,
        person: PersonId,
        region: RegionId,
        kind: MigrationKind,
        now: Tick,
        return_time: Tick,
    ) -> AgentResult<HouseholdExit> {
        let p = self.req_person(person)?;
        if !p.alive {
            return Err(AgentError::Dead(person));
        }
        if self.region(region).ok_or(AgentError::UnknownRegion(region))?.store(kind).contains(person) {
            return Err(AgentError::AlreadyStored { person, region, kind });
        }
        let household = p.household.ok_or(AgentError::NotResident(person))?;
        self.household_mut(household)?.last_migration = Some(now);
        let exit = self.remove_from_household(person)?;

        let entry = StoredPerson {
            person,
            left_at: now,
            origin_household: Some(exit.household),
            origin_neighborhood: exit.neighborhood,
        };
        self.region_mut(region)?.store_mut(kind).add_agent(entry, return_time);
        self.person_mut(person)?.stores.push(StoreRef { region, kind });
        Ok(exit)
    }

    /// Release everyone in the `kind` store of `region` due by `now`.
    ///
    /// Released persons are household-less; placing them is the caller's
    /// decision.
    pub fn release_persons(&mut self, region: RegionId, kind: MigrationKind, now: Tick) -> AgentResult<Vec<StoredPerson>> {
        let released = self.region_mut(region)?.store_mut(kind).release_agents(now);
        let store = StoreRef { region, kind };
        for entry in &released {
            self.person_mut(entry.person)?.stores.retain(|s| *s != store);
        }
        if !released.is_empty() {
            debug!(%region, ?kind, count = released.len(), "migrants released");
        }
        Ok(released)
    }

    /// Advance `person`'s age by `months` for the step at `now`.
    ///
    /// Fails with [`AgentError::DoubleAgeIncrement`] if the person was
    /// already aged for `now`.
    pub fn increment_age(&mut self, person: PersonId, months: u32, now: Tick) -> AgentResult<()> {
        let p = self.person_mut(person)?;
        if !p.alive {
            return Err(AgentError::Dead(person));
        }
        if p.last_aged == Some(now) {
            return Err(AgentError::DoubleAgeIncrement { person, at: now });
        }
        p.age_months += months;
        p.last_aged = Some(now);
        Ok(())
    }
}
