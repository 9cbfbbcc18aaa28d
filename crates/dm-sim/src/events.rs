//! The per-step event phases.
//!
//! Each phase takes an owned snapshot of the region's residents before it
//! mutates anything, re-checks residency where an earlier iteration may
//! have moved or killed someone, and returns per-neighborhood counts.
//! Random draws happen in iteration order, one decision at a time.

use dm_agent::{
    AgentError, Ethnicity, LandCover, MigrationKind, Newborn, PersonBuilder, SchoolStatus, Sex,
    StoredPerson, World,
};
use dm_behavior::{DemographicModel, DivorcePlacement, PersonView, ReturnPlacement};
use dm_core::{NeighborhoodId, PersonId, RegionId, Tick};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::placement::{new_household_near, random_neighborhood};
use crate::{MigrationCounts, NeighborhoodCounts, SchoolingCounts, Sim, SimResult};

/// Oldest age given to a child of an in-migrant household.
const MAX_CHILD_AGE_MONTHS: u32 = 18 * 12 - 1;

fn view_of(world: &World, person: PersonId) -> SimResult<PersonView<'_>> {
    Ok(PersonView::of(world, person).ok_or(AgentError::UnknownPerson(person))?)
}

impl<M: DemographicModel> Sim<M> {
    // ── 1. Births ─────────────────────────────────────────────────────────

    /// Eligible women give birth; counted at the mother's neighborhood.
    pub fn births(&mut self, region: RegionId, now: Tick) -> SimResult<NeighborhoodCounts> {
        let mut counts = NeighborhoodCounts::new();
        let fertile = self.policy.fertile;
        let feedback = self.params.land_use.birth_feedback.enabled.then_some(self.params.land_use.birth_feedback.area);

        for pid in self.world.residents(region) {
            let Some(nid) = self.world.neighborhood_of(pid) else { continue };
            let view = view_of(&self.world, pid)?;
            let (model, rng) = (&self.model, &mut self.rng);
            if !view.person.is_eligible_for_birth(now, fertile, |_| model.first_birth_due(view, now, rng)) {
                continue;
            }

            let sex = self.model.draw_sex(&mut self.rng);
            let fertility = self.model.draw_fertility(sex, &mut self.rng);
            let mother_birth_interval = self.model.draw_birth_interval(&mut self.rng);
            self.world.give_birth(pid, now, Newborn { sex, fertility, mother_birth_interval })?;

            if let Some(area) = feedback {
                // Skipped when the neighborhood has no vegetation left to convert.
                self.world.neighborhood_mut(nid)?.convert_land(LandCover::NonAgVeg, LandCover::Other, area);
            }
            counts.record(nid);
        }
        Ok(counts)
    }

    // ── 2. Deaths ─────────────────────────────────────────────────────────

    pub fn deaths(&mut self, region: RegionId, now: Tick) -> SimResult<NeighborhoodCounts> {
        let mut counts = NeighborhoodCounts::new();
        for pid in self.world.residents(region) {
            let Some(nid) = self.world.neighborhood_of(pid) else { continue };
            let p = self.model.death_probability(view_of(&self.world, pid)?);
            if self.rng.gen_bool(p) {
                self.world.kill(pid, now)?;
                counts.record(nid);
            }
        }
        Ok(counts)
    }

    // ── 3. Marriages ──────────────────────────────────────────────────────

    /// Pair eligible singles and house each new couple.
    ///
    /// Eligible: unmarried, of marriageable age, and passing the model's
    /// marriage draw.  Men are offered a spouse first, then women; anyone
    /// left unpaired marries an in-migrant.  Counted at the couple's
    /// resulting neighborhood.
    pub fn marriages(&mut self, region: RegionId, now: Tick) -> SimResult<NeighborhoodCounts> {
        let mut men = Vec::new();
        let mut women = Vec::new();
        for pid in self.world.residents(region) {
            let view = view_of(&self.world, pid)?;
            let p = view.person;
            if p.is_married() || !self.policy.marriage.contains(p.age_months()) {
                continue;
            }
            if !self.rng.gen_bool(self.model.marriage_probability(view)) {
                continue;
            }
            if p.is_female() { women.push(pid) } else { men.push(pid) }
        }
        let pool: Vec<PersonId> = men.into_iter().chain(women).collect();

        // ── Pairing ───────────────────────────────────────────────────────
        let mut taken = vec![false; pool.len()];
        let mut couples: Vec<(PersonId, PersonId)> = Vec::new();
        for i in 0..pool.len() {
            if taken[i] {
                continue;
            }
            let open: Vec<usize> = (0..pool.len()).filter(|&j| j != i && !taken[j]).collect();
            let me = view_of(&self.world, pool[i])?;
            let candidates = open
                .iter()
                .map(|&j| view_of(&self.world, pool[j]))
                .collect::<SimResult<Vec<_>>>()?;
            let Some(k) = self.model.choose_spouse(me, &candidates, &mut self.rng) else { continue };
            let j = open[k];
            taken[i] = true;
            taken[j] = true;
            couples.push(if me.person.is_female() { (pool[j], pool[i]) } else { (pool[i], pool[j]) });
        }
        let paired = couples.len();

        for (i, &pid) in pool.iter().enumerate() {
            if taken[i] {
                continue;
            }
            let spouse = self.new_inmigrant_spouse(pid, now)?;
            let p = self.world.person(pid).ok_or(AgentError::UnknownPerson(pid))?;
            couples.push(if p.is_female() { (spouse, pid) } else { (pid, spouse) });
        }
        debug!(%region, eligible = pool.len(), paired, with_inmigrants = couples.len() - paired, "marriage pool");

        // ── Housing ───────────────────────────────────────────────────────
        let mut counts = NeighborhoodCounts::new();
        for (husband, wife) in couples {
            let (model, rng) = (&self.model, &mut self.rng);
            self.world.marry(husband, wife, now, || model.draw_desired_children(rng))?;
            let timing = self.model.draw_first_birth_timing(&mut self.rng);
            self.world.person_mut(wife)?.fertility.first_birth_timing = timing;

            let moves_out = self.rng.gen_bool(self.params.marriage.moveout_probability);
            let husband_home = self.world.person(husband).and_then(|p| p.household());
            let nid = match husband_home {
                Some(home) if !moves_out => {
                    self.world.move_to_household(wife, home)?;
                    self.world.neighborhood_of(husband).ok_or(AgentError::NotResident(husband))?
                }
                _ => {
                    let start = match [husband, wife].into_iter().find_map(|p| self.world.neighborhood_of(p)) {
                        Some(nid) => nid,
                        None => random_neighborhood(&self.world, region, &mut self.rng)?,
                    };
                    let (home, nid) = new_household_near(&mut self.world, &self.model, &mut self.rng, start)?;
                    self.world.move_to_household(husband, home)?;
                    self.world.move_to_household(wife, home)?;
                    nid
                }
            };
            counts.record(nid);
        }
        Ok(counts)
    }

    /// Create an in-migrant partner for `pid`, not yet in any household.
    fn new_inmigrant_spouse(&mut self, pid: PersonId, now: Tick) -> SimResult<PersonId> {
        let p = self.world.person(pid).ok_or(AgentError::UnknownPerson(pid))?;
        let (sex, ethnicity, age) = (p.sex().opposite(), p.ethnicity(), p.age_months());
        let gap = self.model.draw_spouse_age_gap_months(&mut self.rng);
        let spouse_age = self.partner_age(age, sex, gap);
        self.new_inmigrant(sex, ethnicity, spouse_age, now)
    }

    /// Age of a partner of `sex` for someone aged `age` months, given a
    /// husband-minus-wife gap, never below the minimum marriage age.
    fn partner_age(&self, age: u32, sex: Sex, gap_months: i64) -> u32 {
        let age = age as i64;
        let partner = match sex {
            Sex::Male => age + gap_months,
            Sex::Female => age - gap_months,
        };
        partner.max(self.policy.marriage.min_months as i64) as u32
    }

    fn new_inmigrant(&mut self, sex: Sex, ethnicity: Ethnicity, age_months: u32, now: Tick) -> SimResult<PersonId> {
        let fertility = self.model.draw_fertility(sex, &mut self.rng);
        let builder = PersonBuilder::new(sex, ethnicity, age_months, now).in_migrant().fertility(fertility);
        Ok(self.world.new_person(builder)?)
    }

    // ── 4. Divorces ───────────────────────────────────────────────────────

    /// Each couple is considered once, from whichever spouse is visited
    /// first.  On divorce the wife moves out; counted at the neighborhood
    /// of the spouse that was visited.
    pub fn divorces(&mut self, region: RegionId) -> SimResult<NeighborhoodCounts> {
        let mut counts = NeighborhoodCounts::new();
        let mut checked: FxHashSet<PersonId> = FxHashSet::default();
        for pid in self.world.residents(region) {
            let Some(nid) = self.world.neighborhood_of(pid) else { continue };
            let view = view_of(&self.world, pid)?;
            let Some(spouse) = view.person.spouse() else { continue };
            if !checked.insert(pid) {
                continue;
            }
            checked.insert(spouse);
            if !self.rng.gen_bool(self.model.divorce_probability(view)) {
                continue;
            }

            let wife = if view.person.is_female() { pid } else { spouse };
            self.world.divorce(pid)?;
            // A wife away in a migration store keeps her place there.
            if self.world.is_resident(wife) {
                self.rehouse_divorcee(region, wife)?;
            }
            counts.record(nid);
        }
        Ok(counts)
    }

    /// Move `wife` to her mother's household, or to a new household placed
    /// according to `placement.divorce`.
    fn rehouse_divorcee(&mut self, region: RegionId, wife: PersonId) -> SimResult<()> {
        let mother_home = self
            .world
            .person(wife)
            .and_then(|w| w.mother())
            .and_then(|m| self.world.person(m))
            .filter(|m| m.is_alive())
            .and_then(|m| m.household());
        if let Some(home) = mother_home {
            self.world.move_to_household(wife, home)?;
            return Ok(());
        }
        let start = match self.params.placement.divorce {
            DivorcePlacement::RandomNeighborhood => random_neighborhood(&self.world, region, &mut self.rng)?,
            DivorcePlacement::CurrentNeighborhood => {
                self.world.neighborhood_of(wife).ok_or(AgentError::NotResident(wife))?
            }
        };
        let (home, _) = new_household_near(&mut self.world, &self.model, &mut self.rng, start)?;
        self.world.move_to_household(wife, home)?;
        Ok(())
    }

    // ── 5. Education ──────────────────────────────────────────────────────

    /// Advance each resident's schooling by one step.
    ///
    /// `undetermined` becomes `inschool` at the start age (drawing a final
    /// level); `inschool` gains `step / 12` years per step and becomes
    /// `outofschool` once the final level is reached.
    pub fn education(&mut self, region: RegionId) -> SimResult<SchoolingCounts> {
        let mut counts = SchoolingCounts::default();
        let step_years = self.policy.step_months as f64 / 12.0;
        for pid in self.world.residents(region) {
            let Some(nid) = self.world.neighborhood_of(pid) else { continue };
            let view = view_of(&self.world, pid)?;
            let schooling = view.person.schooling;
            match schooling.status {
                SchoolStatus::OutOfSchool => {}
                SchoolStatus::Undetermined => {
                    if view.person.age_months() < self.policy.school_start_months {
                        continue;
                    }
                    let level = self.model.draw_schooling_level(view, &mut self.rng);
                    let s = &mut self.world.person_mut(pid)?.schooling;
                    s.status = SchoolStatus::InSchool;
                    s.final_level = Some(level);
                    s.years = step_years;
                    counts.entries.record(nid);
                }
                SchoolStatus::InSchool => {
                    let level = match schooling.final_level {
                        Some(level) => level,
                        None => self.model.draw_schooling_level(view, &mut self.rng),
                    };
                    let s = &mut self.world.person_mut(pid)?.schooling;
                    s.final_level = Some(level);
                    if s.years >= level {
                        s.status = SchoolStatus::OutOfSchool;
                        counts.exits.record(nid);
                    } else {
                        s.years += step_years;
                    }
                }
            }
        }
        Ok(counts)
    }

    // ── 6. Migrations ─────────────────────────────────────────────────────

    /// Out-migration, then returns due now, then in-migrant households.
    pub fn migrations(&mut self, region: RegionId, now: Tick) -> SimResult<MigrationCounts> {
        let mut counts = MigrationCounts::default();
        let local_max = self.params.migration.local_max_months;

        for pid in self.world.residents(region) {
            let Some(nid) = self.world.neighborhood_of(pid) else { continue };
            let view = view_of(&self.world, pid)?;
            if !self.rng.gen_bool(self.model.migration_probability(view)) {
                continue;
            }
            let months = self.model.draw_migration_months(view, &mut self.rng).max(1);
            let kind = if months <= local_max { MigrationKind::Local } else { MigrationKind::Distant };
            self.world.store_person(pid, region, kind, now, now.offset(months as u64))?;
            counts.out.record(nid);
        }

        for kind in MigrationKind::ALL {
            for entry in self.world.release_persons(region, kind, now)? {
                let nid = self.rehouse_returnee(region, &entry)?;
                counts.returns.record(nid);
            }
        }

        let arriving = self.model.draw_inmigrant_households(&mut self.rng);
        for _ in 0..arriving {
            let nid = self.settle_inmigrant_household(region, now)?;
            counts.in_households.record(nid);
        }
        Ok(counts)
    }

    /// Place a returning migrant according to `placement.return`.
    fn rehouse_returnee(&mut self, region: RegionId, entry: &StoredPerson) -> SimResult<NeighborhoodId> {
        let origin = match self.params.placement.return_ {
            ReturnPlacement::OriginHouseholdOrNew => entry.origin_household.filter(|&h| self.world.household(h).is_some()),
            ReturnPlacement::AlwaysNewHousehold => None,
        };
        if let Some(home) = origin {
            self.world.add_to_household(entry.person, home)?;
            return Ok(self.world.neighborhood_of(entry.person).ok_or(AgentError::NotResident(entry.person))?);
        }
        let start = match entry.origin_neighborhood.filter(|&n| self.world.neighborhood(n).is_some()) {
            Some(nid) => nid,
            None => random_neighborhood(&self.world, region, &mut self.rng)?,
        };
        let (home, nid) = new_household_near(&mut self.world, &self.model, &mut self.rng, start)?;
        self.world.add_to_household(entry.person, home)?;
        Ok(nid)
    }

    /// Create one in-migrant household: a head, then (for two or more
    /// members) a spouse, then children of the couple.
    fn settle_inmigrant_household(&mut self, region: RegionId, now: Tick) -> SimResult<NeighborhoodId> {
        let draw = self.model.draw_inmigrant_household(&mut self.rng);
        let start = random_neighborhood(&self.world, region, &mut self.rng)?;
        let (home, nid) = new_household_near(&mut self.world, &self.model, &mut self.rng, start)?;

        // A head who arrives with a spouse is of marriageable age.
        let head_age = match draw.size {
            0 | 1 => draw.head_age_months,
            _ => draw.head_age_months.max(self.policy.marriage.min_months),
        };
        let head = self.new_inmigrant(draw.head_sex, draw.ethnicity, head_age, now)?;
        self.world.add_to_household(head, home)?;
        if draw.size < 2 {
            return Ok(nid);
        }

        let gap = self.model.draw_spouse_age_gap_months(&mut self.rng);
        let spouse_sex = draw.head_sex.opposite();
        let spouse_age = self.partner_age(head_age, spouse_sex, gap);
        let spouse = self.new_inmigrant(spouse_sex, draw.ethnicity, spouse_age, now)?;
        self.world.add_to_household(spouse, home)?;
        let (model, rng) = (&self.model, &mut self.rng);
        self.world.marry(head, spouse, now, || model.draw_desired_children(rng))?;

        let (mother, father) = match draw.head_sex {
            Sex::Female => (head, spouse),
            Sex::Male => (spouse, head),
        };
        let mother_age = if mother == head { head_age } else { spouse_age };
        let max_child_age = mother_age.saturating_sub(self.policy.fertile.min_months).min(MAX_CHILD_AGE_MONTHS);
        for _ in 2..draw.size {
            let age = self.rng.gen_range(0..=max_child_age);
            let sex = self.model.draw_sex(&mut self.rng);
            let fertility = self.model.draw_fertility(sex, &mut self.rng);
            let builder = PersonBuilder::new(sex, draw.ethnicity, age, now)
                .parents(Some(mother), Some(father))
                .in_migrant()
                .fertility(fertility);
            let child = self.world.new_person(builder)?;
            self.world.add_to_household(child, home)?;
        }
        Ok(nid)
    }

    // ── 7. Age increment ──────────────────────────────────────────────────

    /// Age every person of `region`, residents and stored migrants, by one
    /// step.  Returns how many were aged.
    pub fn increment_ages(&mut self, region: RegionId, now: Tick) -> SimResult<usize> {
        let everyone: Vec<PersonId> = self.world.iter_all_persons(region).collect();
        for &pid in &everyone {
            self.world.increment_age(pid, self.policy.step_months, now)?;
        }
        Ok(everyone.len())
    }
}
