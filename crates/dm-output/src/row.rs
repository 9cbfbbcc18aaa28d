//! Plain data row types written by output backends.

use dm_agent::{Agent, Person, World};
use dm_sim::{NeighborhoodSnapshot, StepReport};

/// Event counts and population totals for one simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepSummaryRow {
    pub step:                  u64,
    pub year:                  u32,
    pub month:                 u32,
    pub births:                u32,
    pub deaths:                u32,
    pub marriages:             u32,
    pub divorces:              u32,
    pub school_entries:        u32,
    pub school_exits:          u32,
    pub out_migrations:        u32,
    pub returns:               u32,
    pub inmigrant_households:  u32,
    pub persons:               u64,
    pub households:            u64,
    pub neighborhoods:         u64,
    pub married:               u64,
    /// Persons held in migration stores.
    pub away:                  u64,
}

impl StepSummaryRow {
    pub fn from_report(report: &StepReport) -> Self {
        Self {
            step:                 report.step,
            year:                 report.date.year,
            month:                report.date.month,
            births:               report.births.total(),
            deaths:               report.deaths.total(),
            marriages:            report.marriages.total(),
            divorces:             report.divorces.total(),
            school_entries:       report.schooling.entries.total(),
            school_exits:         report.schooling.exits.total(),
            out_migrations:       report.migrations.out.total(),
            returns:              report.migrations.returns.total(),
            inmigrant_households: report.migrations.in_households.total(),
            persons:              report.persons as u64,
            households:           report.households as u64,
            neighborhoods:        report.neighborhoods as u64,
            married:              report.married as u64,
            away:                 report.away as u64,
        }
    }
}

/// Population and land use of one neighborhood at a snapshot step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborhoodRow {
    pub step:             u64,
    pub year:             u32,
    pub month:            u32,
    pub neighborhood:     u32,
    pub persons:          u64,
    pub households:       u64,
    pub married:          u64,
    pub agveg:            f64,
    pub nonagveg:         f64,
    pub private_building: f64,
    pub public_building:  f64,
    pub other:            f64,
    /// `None` when fuelwood demand is not computed.
    pub fuelwood:         Option<f64>,
}

impl NeighborhoodRow {
    pub fn new(step: u64, year: u32, month: u32, snap: &NeighborhoodSnapshot) -> Self {
        Self {
            step,
            year,
            month,
            neighborhood:     snap.neighborhood.0,
            persons:          snap.persons as u64,
            households:       snap.households as u64,
            married:          snap.married as u64,
            agveg:            snap.land.agveg,
            nonagveg:         snap.land.nonagveg,
            private_building: snap.land.private_building,
            public_building:  snap.land.public_building,
            other:            snap.land.other,
            fuelwood:         snap.fuelwood,
        }
    }
}

/// Final state of one person, dead or alive.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonRow {
    pub person:          u32,
    pub alive:           bool,
    pub sex:             &'static str,
    pub age_months:      u32,
    pub ethnicity:       u8,
    pub household:       Option<u32>,
    pub neighborhood:    Option<u32>,
    pub spouse:          Option<u32>,
    pub mother:          Option<u32>,
    pub father:          Option<u32>,
    pub children:        u32,
    pub schooling_years: f64,
    pub school_status:   &'static str,
    pub in_migrant:      bool,
    /// Away in a migration store when the run ended.
    pub away:            bool,
}

impl PersonRow {
    pub fn of(world: &World, p: &Person) -> Self {
        Self {
            person:          p.id().0,
            alive:           p.is_alive(),
            sex:             p.sex().as_str(),
            age_months:      p.age_months(),
            ethnicity:       p.ethnicity().0,
            household:       p.household().map(|h| h.0),
            neighborhood:    world.neighborhood_of(p.id()).map(|n| n.0),
            spouse:          p.spouse().map(|s| s.0),
            mother:          p.mother().map(|m| m.0),
            father:          p.father().map(|f| f.0),
            children:        p.num_children() as u32,
            schooling_years: p.schooling.years,
            school_status:   p.schooling.status.as_str(),
            in_migrant:      p.is_in_migrant(),
            away:            p.is_stored(),
        }
    }
}
