//! The `Sim` struct and its step loop.

use dm_agent::{Container, FertileAges, Person, World};
use dm_behavior::{DemographicModel, HouseholdView, Parameters};
use dm_core::{ModelDate, SimClock, SimConfig, SimRng, Tick};
use tracing::{debug, info};

use crate::{NeighborhoodSnapshot, SimObserver, SimResult, StepReport};

/// Age thresholds resolved to months once, at build time.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Policy {
    pub(crate) step_months:         u32,
    pub(crate) fertile:             FertileAges,
    /// Marriageable age window.
    pub(crate) marriage:            FertileAges,
    pub(crate) school_start_months: u32,
}

impl Policy {
    pub(crate) fn resolve(params: &Parameters, step_months: u32) -> Self {
        Self {
            step_months,
            fertile: FertileAges::from_years(params.birth.min_age_years, params.birth.max_age_years),
            marriage: FertileAges::from_years(params.marriage.min_age_years, params.marriage.max_age_years),
            school_start_months: (params.education.start_school_age_years * 12.0).round() as u32,
        }
    }
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim<M>` holds the world, the single random stream, and the model, and
/// drives one step per `timestep_months`.  Each step runs, region by
/// region, the event phases in this fixed order:
///
/// 1. **Births** — eligible married women give birth in their household.
/// 2. **Deaths** — residents die with the model's death probability.
/// 3. **Marriages** — eligible singles are paired (or given an in-migrant
///    spouse) and housed.
/// 4. **Divorces** — each couple is considered once; the wife moves out.
/// 5. **Education** — the schooling state machine advances.
/// 6. **Migrations** — out-migration, returns, then in-migrant households.
/// 7. **Age increment** — every person, residents and migrants alike,
///    ages by one step exactly once.
///
/// Every phase iterates a snapshot of the residents taken when the phase
/// starts, so persons created mid-phase are not visited until the next
/// phase.  With a fixed seed and input the run replays exactly.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<M: DemographicModel> {
    /// Run configuration (dates, step size, seed, snapshot cadence).
    pub config: SimConfig,

    /// Scheduler calendar; advanced once per step.
    pub clock: SimClock,

    /// The agent hierarchy.
    pub world: World,

    /// Policy parameters consulted directly by the event phases.
    pub params: Parameters,

    /// Probabilities and draws for every stochastic decision.
    pub model: M,

    /// The run's only random stream.
    pub rng: SimRng,

    pub(crate) policy:           Policy,
    pub(crate) extinct:          bool,
    pub(crate) last_logged_year: Option<u32>,
}

impl<M: DemographicModel> Sim<M> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run until the end date or until the resident population is extinct.
    ///
    /// Calls observer hooks at every step boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.clock.in_bounds() && !self.extinct {
            self.step(observer)?;
        }
        observer.on_sim_end(self.clock.current, &self.world);
        Ok(())
    }

    /// Run at most `n` steps from the current position (ignores the end
    /// date; still stops on extinction).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_steps<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            if self.extinct {
                break;
            }
            self.step(observer)?;
        }
        Ok(())
    }

    /// `true` once a step ended with no resident population.
    pub fn is_extinct(&self) -> bool {
        self.extinct
    }

    /// Current simulation time.
    #[inline]
    pub fn now(&self) -> Tick {
        self.clock.now()
    }

    // ── Step processing ───────────────────────────────────────────────────

    fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let step = self.clock.steps;
        let date = self.clock.current;
        let now = self.clock.now();

        observer.on_step_start(step, date);
        let report = self.process_step(step, date, now)?;
        observer.on_step_end(&report);

        if self.config.is_snapshot_step(step) {
            let snapshots = self.snapshot(now);
            observer.on_snapshot(step, date, &snapshots);
        }

        self.log_progress(&report);
        if report.persons == 0 {
            info!(%date, step, "resident population extinct; stopping");
            self.extinct = true;
        }

        self.clock.advance();
        Ok(())
    }

    fn process_step(&mut self, step: u64, date: ModelDate, now: Tick) -> SimResult<StepReport> {
        let mut report = StepReport::new(step, date);

        for region in self.world.region_ids() {
            let births = self.births(region, now)?;
            debug!(%region, births = births.total(), "births");
            report.births.merge(&births);

            let deaths = self.deaths(region, now)?;
            debug!(%region, deaths = deaths.total(), "deaths");
            report.deaths.merge(&deaths);

            let marriages = self.marriages(region, now)?;
            debug!(%region, marriages = marriages.total(), "marriages");
            report.marriages.merge(&marriages);

            let divorces = self.divorces(region)?;
            debug!(%region, divorces = divorces.total(), "divorces");
            report.divorces.merge(&divorces);

            let schooling = self.education(region)?;
            debug!(
                %region,
                entries = schooling.entries.total(),
                exits = schooling.exits.total(),
                "education"
            );
            report.schooling.entries.merge(&schooling.entries);
            report.schooling.exits.merge(&schooling.exits);

            let migrations = self.migrations(region, now)?;
            debug!(
                %region,
                out = migrations.out.total(),
                returns = migrations.returns.total(),
                in_households = migrations.in_households.total(),
                "migrations"
            );
            report.migrations.out.merge(&migrations.out);
            report.migrations.returns.merge(&migrations.returns);
            report.migrations.in_households.merge(&migrations.in_households);

            let aged = self.increment_ages(region, now)?;
            debug!(%region, aged, "ages incremented");

            report.persons += self.world.num_persons(region);
            report.households += self.world.num_households(region);
            report.neighborhoods += self.world.num_neighborhoods(region);
            report.married += self.world.num_married(region);
            report.away += self.world.region(region).map_or(0, |r| r.num_stored());
        }
        Ok(report)
    }

    /// Per-neighborhood population, land use, and (when enabled) fuelwood
    /// demand.  Fuelwood draws residual noise from the run's stream.
    fn snapshot(&mut self, now: Tick) -> Vec<NeighborhoodSnapshot> {
        let fuelwood = self.params.fuelwood.enabled;
        let mut out = Vec::new();
        for region in self.world.region_ids() {
            for nid in self.world.iter_neighborhoods(region).collect::<Vec<_>>() {
                let Some(nbh) = self.world.neighborhood(nid) else { continue };
                let mut snap = NeighborhoodSnapshot {
                    neighborhood: nid,
                    persons:      0,
                    households:   nbh.num_members(),
                    married:      0,
                    land:         *nbh.land(),
                    fuelwood:     fuelwood.then_some(0.0),
                };
                for hid in nbh.iter_agents() {
                    let Some(hh) = self.world.household(hid) else { continue };
                    snap.persons += hh.num_members();
                    snap.married += hh
                        .iter_agents()
                        .filter(|&pid| self.world.person(pid).is_some_and(Person::is_married))
                        .count();
                    if let (Some(total), Some(view)) = (snap.fuelwood.as_mut(), HouseholdView::of(&self.world, hid)) {
                        *total += self.model.fuelwood_usage(view, now, &mut self.rng);
                    }
                }
                out.push(snap);
            }
        }
        out
    }

    fn log_progress(&mut self, report: &StepReport) {
        let year = report.date.year;
        if self.last_logged_year.is_some_and(|y| y >= year) {
            return;
        }
        self.last_logged_year = Some(year);
        info!(
            year,
            persons = report.persons,
            households = report.households,
            married = report.married,
            away = report.away,
            "simulated year"
        );
    }
}
