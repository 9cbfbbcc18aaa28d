//! CSV census loader.
//!
//! # CSV formats
//!
//! Three files describe one region's initial population.  IDs are the
//! survey's own and are registered with the `World`'s generators, so later
//! agents never collide with them.
//!
//! `neighborhoods.csv`, areas in square metres, service times in minutes:
//!
//! ```csv
//! id,x,y,elevation,dist_urban_center,elec_available,avg_years_nonfamily_services,school_min,health_min,bus_min,market_min,employer_min,agveg,nonagveg,private_building,public_building,other
//! 1,0,0,1200,5000,1,3.5,20,45,15,30,90,40000,20000,3000,500,1500
//! ```
//!
//! `households.csv`, flags are `0`/`1` and `plot_area` may be empty:
//!
//! ```csv
//! id,neighborhood,any_non_wood_fuel,own_house_plot,own_land,rented_out_land,plot_area
//! 10,1,1,1,0,0,250
//! ```
//!
//! `persons.csv`, relatives and optional columns may be empty:
//!
//! ```csv
//! id,household,sex,age_months,ethnicity,mother,father,spouse,marriage_age_months,schooling_years,school_status,work,desired_children
//! 100,10,male,420,1,,,101,252,6,outofschool,1,
//! 101,10,female,396,1,,,100,228,4,outofschool,0,3
//! 102,10,female,60,1,101,100,,,0,,,
//! ```
//!
//! `school_status` is `undetermined`, `inschool` or `outofschool`.
//! `desired_children` is a count or `none` for no stated preference.
//!
//! # Linking
//!
//! Persons are created in file order, then linked: parents (a parent absent
//! from the files is skipped with a warning), then spouses (links must be
//! mutual; each couple is married once, at the time implied by
//! `marriage_age_months`).  Households are placed without claiming land:
//! their plots are already part of the neighborhood ledgers.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use dm_agent::{
    Container, DesiredChildren, Ethnicity, HouseholdTraits, LandClaim, LandLedger, NewHousehold,
    NewNeighborhood, NeighborhoodProfile, PersonBuilder, SchoolStatus, Schooling, ServiceAccess,
    Sex, World,
};
use dm_behavior::{DemographicModel, PersonView};
use dm_core::{Coords, HouseholdId, NeighborhoodId, PersonId, RegionId, SimRng, Tick};

use crate::{CensusError, CensusResult};

pub const NEIGHBORHOODS_FILE: &str = "neighborhoods.csv";
pub const HOUSEHOLDS_FILE: &str = "households.csv";
pub const PERSONS_FILE: &str = "persons.csv";

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NeighborhoodRecord {
    id:                           u32,
    x:                            f64,
    y:                            f64,
    elevation:                    f64,
    dist_urban_center:            f64,
    elec_available:               u8,
    avg_years_nonfamily_services: f64,
    school_min:                   f64,
    health_min:                   f64,
    bus_min:                      f64,
    market_min:                   f64,
    employer_min:                 f64,
    agveg:                        f64,
    nonagveg:                     f64,
    private_building:             f64,
    public_building:              f64,
    other:                        f64,
}

#[derive(Deserialize)]
struct HouseholdRecord {
    id:                u32,
    neighborhood:      u32,
    any_non_wood_fuel: u8,
    own_house_plot:    u8,
    own_land:          u8,
    rented_out_land:   u8,
    plot_area:         Option<f64>,
}

#[derive(Deserialize)]
struct PersonRecord {
    id:                  u32,
    household:           u32,
    sex:                 String,
    age_months:          u32,
    ethnicity:           u8,
    mother:              Option<u32>,
    father:              Option<u32>,
    spouse:              Option<u32>,
    marriage_age_months: Option<u32>,
    schooling_years:     f64,
    school_status:       Option<String>,
    work:                Option<u8>,
    desired_children:    Option<String>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// The three census tables, as any `Read` sources.
pub struct CensusSources<N, H, P> {
    pub neighborhoods: N,
    pub households:    H,
    pub persons:       P,
}

/// Counts of what a load created.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CensusSummary {
    pub neighborhoods:      usize,
    pub households:         usize,
    pub persons:            usize,
    /// Couples married during linking.
    pub marriages:          usize,
    /// Parent references naming a person absent from the files.
    pub unresolved_parents: usize,
    /// Spouse references naming a person absent from the files.
    pub unresolved_spouses: usize,
}

/// Builds a region's initial population from census tables.
///
/// Attributes the census does not record (fertility timers, desired family
/// size when the column is empty, final schooling level of pupils) are
/// drawn from `model`.
pub struct CensusLoader<'a> {
    model: &'a dyn DemographicModel,
    now:   Tick,
}

impl<'a> CensusLoader<'a> {
    /// `now` is the census date: ages in the files are ages at `now`.
    pub fn new(model: &'a dyn DemographicModel, now: Tick) -> Self {
        Self { model, now }
    }

    /// Load `neighborhoods.csv`, `households.csv` and `persons.csv` from `dir`.
    pub fn load_dir(
        &self,
        dir: &Path,
        world: &mut World,
        region: RegionId,
        rng: &mut SimRng,
    ) -> CensusResult<CensusSummary> {
        let sources = CensusSources {
            neighborhoods: File::open(dir.join(NEIGHBORHOODS_FILE))?,
            households:    File::open(dir.join(HOUSEHOLDS_FILE))?,
            persons:       File::open(dir.join(PERSONS_FILE))?,
        };
        self.load(sources, world, region, rng)
    }

    /// Like [`load_dir`][Self::load_dir] but accepts any `Read` sources.
    ///
    /// Useful for testing (pass `std::io::Cursor`s).
    pub fn load<N: Read, H: Read, P: Read>(
        &self,
        sources: CensusSources<N, H, P>,
        world: &mut World,
        region: RegionId,
        rng: &mut SimRng,
    ) -> CensusResult<CensusSummary> {
        let neighborhoods: Vec<NeighborhoodRecord> = read_records(sources.neighborhoods)?;
        let households: Vec<HouseholdRecord> = read_records(sources.households)?;
        let persons: Vec<PersonRecord> = read_records(sources.persons)?;

        let mut summary = CensusSummary::default();

        // ── Neighborhoods ─────────────────────────────────────────────────
        for r in &neighborhoods {
            world.new_neighborhood(region, neighborhood_spec(r))?;
            summary.neighborhoods += 1;
        }
        world.index_distances(region)?;

        // ── Households ────────────────────────────────────────────────────
        let mut loaded_households = Vec::with_capacity(households.len());
        for r in &households {
            let hid = world.new_household(NewHousehold {
                id:            Some(HouseholdId(r.id)),
                traits:        HouseholdTraits {
                    any_non_wood_fuel: r.any_non_wood_fuel != 0,
                    own_house_plot:    r.own_house_plot != 0,
                    own_land:          r.own_land != 0,
                    rented_out_land:   r.rented_out_land != 0,
                },
                plot_area:     r.plot_area.unwrap_or(0.0),
                initial_agent: true,
            })?;
            world.place_household(hid, NeighborhoodId(r.neighborhood), LandClaim::Exempt)?;
            loaded_households.push(hid);
            summary.households += 1;
        }

        // ── Persons ───────────────────────────────────────────────────────
        for r in &persons {
            self.create_person(r, world, rng)?;
            summary.persons += 1;
        }

        // ── Parents ───────────────────────────────────────────────────────
        for r in &persons {
            let child = PersonId(r.id);
            let mut resolve = |parent: Option<u32>| {
                let pid = PersonId(parent?);
                if world.person(pid).is_some() {
                    Some(pid)
                } else {
                    warn!(%child, parent = %pid, "parent not in census; link skipped");
                    summary.unresolved_parents += 1;
                    None
                }
            };
            let (mother, father) = (resolve(r.mother), resolve(r.father));
            if mother.is_some() || father.is_some() {
                world.set_parents(child, mother, father)?;
            }
        }

        // ── Spouses ───────────────────────────────────────────────────────
        let spouse_of: BTreeMap<u32, Option<u32>> = persons.iter().map(|r| (r.id, r.spouse)).collect();
        for r in &persons {
            let Some(spouse) = r.spouse else { continue };
            let (person, spouse_id) = (PersonId(r.id), PersonId(spouse));
            match spouse_of.get(&spouse) {
                None => {
                    warn!(%person, spouse = %spouse_id, "spouse not in census; link skipped");
                    summary.unresolved_spouses += 1;
                    continue;
                }
                Some(back) if *back != Some(r.id) => {
                    return Err(CensusError::AsymmetricSpouse { person, spouse: spouse_id });
                }
                Some(_) => {}
            }
            // Each couple is married once, from the lower ID's row.
            if r.id > spouse {
                continue;
            }
            let months_married = r.marriage_age_months.map_or(0, |m| r.age_months.saturating_sub(m));
            let married_at = self.now.rewind(months_married as u64);
            let model = self.model;
            world.marry(person, spouse_id, married_at, || model.draw_desired_children(rng))?;
            summary.marriages += 1;
        }

        for hid in loaded_households {
            if world.household(hid).is_none_or(|h| h.num_members() == 0) {
                return Err(CensusError::EmptyHousehold(hid));
            }
        }

        info!(
            %region,
            neighborhoods = summary.neighborhoods,
            households = summary.households,
            persons = summary.persons,
            marriages = summary.marriages,
            "census loaded"
        );
        Ok(summary)
    }

    fn create_person(&self, r: &PersonRecord, world: &mut World, rng: &mut SimRng) -> CensusResult<()> {
        let sex = parse_sex(&r.sex)?;
        let household = HouseholdId(r.household);
        let childhood = world
            .household(household)
            .and_then(|h| h.neighborhood())
            .and_then(|nid| world.neighborhood(nid))
            .map(|n| n.services().within_one_hour())
            .unwrap_or_default();

        let mut fertility = self.model.draw_fertility(sex, rng);
        if let Some(desired) = r.desired_children.as_deref() {
            fertility.desired_children = parse_desired(desired)?;
        }
        let status = r.school_status.as_deref().map(parse_school_status).transpose()?.unwrap_or_default();

        let builder = PersonBuilder::new(sex, Ethnicity(r.ethnicity), r.age_months, self.now)
            .id(PersonId(r.id))
            .initial_agent()
            .fertility(fertility)
            .schooling(Schooling { years: r.schooling_years, status, final_level: None })
            .work(r.work.is_some_and(|w| w != 0))
            .childhood(childhood);
        let pid = world.new_person(builder)?;
        world.add_to_household(pid, household)?;

        if status == SchoolStatus::InSchool {
            let level = PersonView::of(world, pid).map(|view| self.model.draw_schooling_level(view, rng));
            world.person_mut(pid)?.schooling.final_level = level;
        }
        Ok(())
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn read_records<T: for<'de> Deserialize<'de>, R: Read>(reader: R) -> CensusResult<Vec<T>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize::<T>()
        .map(|row| row.map_err(|e| CensusError::Parse(e.to_string())))
        .collect()
}

fn neighborhood_spec(r: &NeighborhoodRecord) -> NewNeighborhood {
    NewNeighborhood {
        id:            Some(NeighborhoodId(r.id)),
        profile:       NeighborhoodProfile {
            coords:                       Coords::new(r.x, r.y),
            elevation:                    r.elevation,
            dist_urban_center:            r.dist_urban_center,
            elec_available:               r.elec_available != 0,
            avg_years_nonfamily_services: r.avg_years_nonfamily_services,
            services:                     ServiceAccess {
                school_min:   r.school_min,
                health_min:   r.health_min,
                bus_min:      r.bus_min,
                market_min:   r.market_min,
                employer_min: r.employer_min,
            },
        },
        land:          LandLedger {
            agveg:            r.agveg,
            nonagveg:         r.nonagveg,
            private_building: r.private_building,
            public_building:  r.public_building,
            other:            r.other,
        },
        initial_agent: true,
    }
}

fn parse_sex(s: &str) -> CensusResult<Sex> {
    match s.trim().to_ascii_lowercase().as_str() {
        "female" | "f" => Ok(Sex::Female),
        "male" | "m" => Ok(Sex::Male),
        other => Err(CensusError::Parse(format!(
            "invalid sex {other:?}: expected \"female\" or \"male\""
        ))),
    }
}

fn parse_school_status(s: &str) -> CensusResult<SchoolStatus> {
    match s.trim() {
        "" | "undetermined" => Ok(SchoolStatus::Undetermined),
        "inschool" => Ok(SchoolStatus::InSchool),
        "outofschool" => Ok(SchoolStatus::OutOfSchool),
        other => Err(CensusError::Parse(format!(
            "invalid school_status {other:?}: expected \"undetermined\", \"inschool\" or \"outofschool\""
        ))),
    }
}

fn parse_desired(s: &str) -> CensusResult<Option<DesiredChildren>> {
    match s.trim() {
        "" => Ok(None),
        "none" => Ok(Some(DesiredChildren::NoPreference)),
        n => n
            .parse::<u32>()
            .map(|count| Some(DesiredChildren::Count(count)))
            .map_err(|_| CensusError::Parse(format!("invalid desired_children {n:?}: expected a count or \"none\""))),
    }
}
