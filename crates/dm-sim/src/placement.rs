//! New-household placement search.
//!
//! A new household claims a plot from the first neighborhood that can
//! supply it, trying the preferred neighborhood first and then the rest of
//! its region nearest-first (the precomputed `by_distance` order).  The
//! search visits each neighborhood at most once, so it always terminates;
//! if none has room the result is [`SimError::CapacityExhausted`].

use dm_agent::{AgentError, LandClaim, NewHousehold, World};
use dm_behavior::DemographicModel;
use dm_core::{HouseholdId, NeighborhoodId, RegionId, SimRng};
use tracing::warn;

use crate::{SimError, SimResult};

/// The first neighborhood, starting at `start`, whose vegetated ledgers can
/// cover a plot of `area`.
pub fn find_land(world: &World, start: NeighborhoodId, area: f64) -> SimResult<NeighborhoodId> {
    let origin = world
        .neighborhood(start)
        .ok_or(AgentError::UnknownNeighborhood(start))?;
    let candidates = std::iter::once(start).chain(origin.by_distance().iter().copied());
    for (hops, nid) in candidates.enumerate() {
        let Some(nbh) = world.neighborhood(nid) else { continue };
        let mut trial = *nbh.land();
        if trial.claim_plot(area).is_some() {
            if hops > 0 {
                warn!(%start, chosen = %nid, hops, area, "no land at preferred neighborhood; placed farther away");
            }
            return Ok(nid);
        }
    }
    Err(SimError::CapacityExhausted { start, area })
}

/// A neighborhood of `region` chosen uniformly at random.
pub fn random_neighborhood(world: &World, region: RegionId, rng: &mut SimRng) -> SimResult<NeighborhoodId> {
    let all: Vec<NeighborhoodId> = world.iter_neighborhoods(region).collect();
    rng.choose(&all).copied().ok_or(SimError::NoNeighborhoods(region))
}

/// Create an empty household with drawn plot area and traits, placed by
/// search from `start`.
///
/// Returns the household and the neighborhood it landed in.  The caller
/// moves members in straight away.
pub fn new_household_near<M: DemographicModel + ?Sized>(
    world: &mut World,
    model: &M,
    rng: &mut SimRng,
    start: NeighborhoodId,
) -> SimResult<(HouseholdId, NeighborhoodId)> {
    let area = model.draw_household_area(rng);
    let traits = model.draw_household_traits(rng);
    let nid = find_land(world, start, area)?;
    let hid = world.new_household(NewHousehold { id: None, traits, plot_area: area, initial_agent: false })?;
    world.place_household(hid, nid, LandClaim::Plot(area))?;
    Ok((hid, nid))
}
