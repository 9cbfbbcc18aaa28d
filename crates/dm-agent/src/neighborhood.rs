//! The `Neighborhood` container and its land-use ledger.
//!
//! # Land accounting
//!
//! Five mutually exclusive ledgers partition a neighborhood's area.  Placing
//! a household moves its plot area into `private_building`, taken from
//! agricultural vegetation when that ledger can cover the whole plot, else
//! from non-agricultural vegetation.  If neither can, placement fails with
//! [`AgentError::InsufficientLand`] and nothing changes.  The ledger total
//! is conserved by every operation in this module.

use dm_core::{Coords, HouseholdId, NeighborhoodId, RegionId};

use crate::{Agent, AgentError, AgentResult, AgentSet, ChildhoodContext, Container};

// ── Land ─────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LandCover {
    AgVeg,
    NonAgVeg,
    PrivateBuilding,
    PublicBuilding,
    Other,
}

/// Area per land-cover class, in square metres.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct LandLedger {
    pub agveg:            f64,
    pub nonagveg:         f64,
    pub private_building: f64,
    pub public_building:  f64,
    pub other:            f64,
}

impl LandLedger {
    #[inline]
    pub fn total(&self) -> f64 {
        self.agveg + self.nonagveg + self.private_building + self.public_building + self.other
    }

    #[inline]
    pub fn get(&self, cover: LandCover) -> f64 {
        match cover {
            LandCover::AgVeg => self.agveg,
            LandCover::NonAgVeg => self.nonagveg,
            LandCover::PrivateBuilding => self.private_building,
            LandCover::PublicBuilding => self.public_building,
            LandCover::Other => self.other,
        }
    }

    fn slot(&mut self, cover: LandCover) -> &mut f64 {
        match cover {
            LandCover::AgVeg => &mut self.agveg,
            LandCover::NonAgVeg => &mut self.nonagveg,
            LandCover::PrivateBuilding => &mut self.private_building,
            LandCover::PublicBuilding => &mut self.public_building,
            LandCover::Other => &mut self.other,
        }
    }

    /// Move `area` from `from` to `to`.  Returns `false` (and changes
    /// nothing) if `from` holds less than `area`.
    pub fn convert(&mut self, from: LandCover, to: LandCover, area: f64) -> bool {
        if area < 0.0 || self.get(from) < area {
            return false;
        }
        *self.slot(from) -= area;
        *self.slot(to) += area;
        true
    }

    /// Move a house plot into `private_building`, returning the ledger it
    /// was taken from, or `None` if no vegetated ledger can cover it.
    pub fn claim_plot(&mut self, area: f64) -> Option<LandCover> {
        [LandCover::AgVeg, LandCover::NonAgVeg]
            .into_iter()
            .find(|&source| self.convert(source, LandCover::PrivateBuilding, area))
    }

    /// Agricultural vegetation as a percentage of the total area.
    pub fn percent_agveg(&self) -> f64 {
        let total = self.total();
        if total > 0.0 { self.agveg / total * 100.0 } else { 0.0 }
    }
}

/// How a household is admitted to a neighborhood.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LandClaim {
    /// Population initialization: the plot already exists in the ledgers.
    Exempt,
    /// Claim a new plot of this area.
    Plot(f64),
}

// ── Attributes ────────────────────────────────────────────────────────────────

/// Walking time in minutes to the nearest service of each kind.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct ServiceAccess {
    pub school_min:   f64,
    pub health_min:   f64,
    pub bus_min:      f64,
    pub market_min:   f64,
    pub employer_min: f64,
}

impl ServiceAccess {
    /// Travel time under which a service counts as "within one hour".
    pub const ONE_HOUR_MIN: f64 = 60.0;

    /// Which services a child growing up here has within one hour.
    pub fn within_one_hour(&self) -> ChildhoodContext {
        ChildhoodContext {
            school_within_1hr:   self.school_min < Self::ONE_HOUR_MIN,
            health_within_1hr:   self.health_min < Self::ONE_HOUR_MIN,
            bus_within_1hr:      self.bus_min < Self::ONE_HOUR_MIN,
            market_within_1hr:   self.market_min < Self::ONE_HOUR_MIN,
            employer_within_1hr: self.employer_min < Self::ONE_HOUR_MIN,
        }
    }
}

/// Fixed attributes supplied when a neighborhood is created.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct NeighborhoodProfile {
    pub coords:                       Coords,
    pub elevation:                    f64,
    pub dist_urban_center:            f64,
    pub elec_available:               bool,
    pub avg_years_nonfamily_services: f64,
    pub services:                     ServiceAccess,
}

// ── Neighborhood ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Neighborhood {
    pub(crate) id:            NeighborhoodId,
    pub(crate) members:       AgentSet<HouseholdId>,
    pub(crate) region:        Option<RegionId>,
    pub(crate) initial_agent: bool,
    pub(crate) land:          LandLedger,
    /// Other neighborhoods of the same region, nearest first.
    pub(crate) by_distance:   Vec<NeighborhoodId>,

    pub profile:              NeighborhoodProfile,
}

impl Neighborhood {
    pub(crate) fn new(
        id: NeighborhoodId,
        profile: NeighborhoodProfile,
        land: LandLedger,
        initial_agent: bool,
    ) -> Self {
        Self {
            id,
            members: AgentSet::new(),
            region: None,
            initial_agent,
            land,
            by_distance: Vec::new(),
            profile,
        }
    }

    #[inline]
    pub fn region(&self) -> Option<RegionId> {
        self.region
    }

    #[inline]
    pub fn land(&self) -> &LandLedger {
        &self.land
    }

    /// Apply externally driven land-use change (e.g. birth feedback).
    pub fn convert_land(&mut self, from: LandCover, to: LandCover, area: f64) -> bool {
        self.land.convert(from, to, area)
    }

    #[inline]
    pub fn by_distance(&self) -> &[NeighborhoodId] {
        &self.by_distance
    }

    #[inline]
    pub fn services(&self) -> &ServiceAccess {
        &self.profile.services
    }
}

impl Agent for Neighborhood {
    type Id = NeighborhoodId;

    #[inline]
    fn id(&self) -> NeighborhoodId {
        self.id
    }

    #[inline]
    fn is_initial_agent(&self) -> bool {
        self.initial_agent
    }
}

impl Container for Neighborhood {
    type Member = HouseholdId;
    type Admission = LandClaim;

    #[inline]
    fn members(&self) -> &AgentSet<HouseholdId> {
        &self.members
    }

    #[inline]
    fn members_mut(&mut self) -> &mut AgentSet<HouseholdId> {
        &mut self.members
    }

    fn before_add(&mut self, _member: HouseholdId, admission: &LandClaim) -> AgentResult<()> {
        match *admission {
            LandClaim::Exempt => Ok(()),
            LandClaim::Plot(area) => match self.land.claim_plot(area) {
                Some(_) => Ok(()),
                None => Err(AgentError::InsufficientLand { neighborhood: self.id, area }),
            },
        }
    }
}
