//! Fluent builder for constructing a [`Sim`].

use dm_agent::World;
use dm_behavior::{DemographicModel, Parameters};
use dm_core::{SimConfig, SimRng};

use crate::sim::Policy;
use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim<M>`].
///
/// # Required inputs
///
/// - [`SimConfig`] — start/end dates, step size, seed, snapshot cadence
/// - [`World`] — the initial population (e.g. from `dm-census`)
/// - [`Parameters`] — policy values read by the event phases
/// - `M: DemographicModel` — probabilities and draws
///
/// # Optional inputs (have defaults)
///
/// | Method     | Default                       |
/// |------------|-------------------------------|
/// | `.rng(r)`  | `SimRng::new(config.seed)`    |
///
/// Pass `.rng(r)` when the same stream already seeded the population
/// loading, so the whole run draws from one sequence.
///
/// # Example
///
/// ```rust,ignore
/// let model = StandardModel::new(params.clone(), config.timestep_months)?;
/// let mut sim = SimBuilder::new(config, world, params, model).rng(rng).build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<M: DemographicModel> {
    config: SimConfig,
    world:  World,
    params: Parameters,
    model:  M,
    rng:    Option<SimRng>,
}

impl<M: DemographicModel> SimBuilder<M> {
    /// Create a builder with all required inputs.
    pub fn new(config: SimConfig, world: World, params: Parameters, model: M) -> Self {
        Self { config, world, params, model, rng: None }
    }

    /// Continue an existing random stream instead of seeding a new one.
    pub fn rng(mut self, rng: SimRng) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Validate the configuration and parameters and return a ready-to-run
    /// [`Sim`].  Every configuration error surfaces here, before any step.
    pub fn build(self) -> SimResult<Sim<M>> {
        self.config.validate()?;
        self.params.validate()?;
        if self.world.region_ids().is_empty() {
            return Err(SimError::Config("the world has no regions".into()));
        }
        if let Some(seed) = self.rng.as_ref().map(SimRng::seed).filter(|&s| s != self.config.seed) {
            return Err(SimError::Config(format!(
                "random stream was seeded with {seed} but the configuration says {}",
                self.config.seed
            )));
        }

        let policy = Policy::resolve(&self.params, self.config.timestep_months);
        let rng = self.rng.unwrap_or_else(|| SimRng::new(self.config.seed));
        Ok(Sim {
            clock: self.config.make_clock(),
            config: self.config,
            world: self.world,
            params: self.params,
            model: self.model,
            rng,
            policy,
            extinct: false,
            last_logged_year: None,
        })
    }
}
