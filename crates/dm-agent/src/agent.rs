//! Agent and container roles.
//!
//! Every simulated entity is an [`Agent`]: it has a typed ID and knows
//! whether it came from population initialization.  Households,
//! neighborhoods, and regions are additionally [`Container`]s that own a
//! keyed [`AgentSet`] of child IDs.
//!
//! # Hooks
//!
//! `Container::add_agent` / `Container::remove_agent` are the single choke
//! point for re-parenting.  Side effects are attached through two hooks
//! instead of overriding the insertion itself:
//!
//! | Hook           | Used by        | Effect                                  |
//! |----------------|----------------|-----------------------------------------|
//! | `before_add`   | `Neighborhood` | claims land for the incoming household  |
//! | `after_remove` | `Household`    | reports `Occupancy::Empty` when vacated |
//!
//! A failing `before_add` leaves the member set untouched.

use std::collections::BTreeMap;

use dm_core::TypedId;
use rustc_hash::FxHashMap;

use crate::{AgentError, AgentResult};

// ── Agent ─────────────────────────────────────────────────────────────────────

pub trait Agent {
    type Id: TypedId;

    fn id(&self) -> Self::Id;

    /// `true` for agents created while loading the initial population.
    fn is_initial_agent(&self) -> bool;
}

// ── AgentSet ──────────────────────────────────────────────────────────────────

/// Insertion-ordered set of member IDs.
///
/// Iteration follows insertion order, which keeps random-stream consumption
/// reproducible for a fixed member history.  Removal is O(log n).
#[derive(Clone, Debug)]
pub struct AgentSet<K: TypedId> {
    order:    BTreeMap<u64, K>,
    slots:    FxHashMap<K, u64>,
    next_seq: u64,
}

impl<K: TypedId> Default for AgentSet<K> {
    fn default() -> Self {
        Self {
            order:    BTreeMap::new(),
            slots:    FxHashMap::default(),
            next_seq: 0,
        }
    }
}

impl<K: TypedId> AgentSet<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `member` at the end of the order.  Returns `false` if it was
    /// already present (the set is unchanged).
    pub fn insert(&mut self, member: K) -> bool {
        if self.slots.contains_key(&member) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, member);
        self.slots.insert(member, seq);
        true
    }

    /// Returns `false` if `member` was absent.
    pub fn remove(&mut self, member: K) -> bool {
        match self.slots.remove(&member) {
            Some(seq) => {
                self.order.remove(&seq);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn contains(&self, member: K) -> bool {
        self.slots.contains_key(&member)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Lazy iterator over members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = K> + Clone + '_ {
        self.order.values().copied()
    }

    /// Owned copy of the current members, for iterating while mutating.
    pub fn snapshot(&self) -> Vec<K> {
        self.iter().collect()
    }
}

// ── Container ─────────────────────────────────────────────────────────────────

/// Result of a removal, as reported by the `after_remove` hook.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Occupancy {
    Occupied,
    /// The container may no longer exist; the owner must dissolve it.
    Empty,
}

/// An agent that owns a keyed set of child agents.
pub trait Container: Agent {
    type Member: TypedId;

    /// Per-insertion data consumed by [`before_add`][Self::before_add]
    /// (e.g. the plot a household claims in a neighborhood).
    type Admission;

    fn members(&self) -> &AgentSet<Self::Member>;

    fn members_mut(&mut self) -> &mut AgentSet<Self::Member>;

    /// Runs before insertion, after the duplicate check.  An error aborts
    /// the insertion.
    fn before_add(&mut self, _member: Self::Member, _admission: &Self::Admission) -> AgentResult<()> {
        Ok(())
    }

    /// Runs after a successful removal.
    fn after_remove(&mut self, _member: Self::Member) -> Occupancy {
        Occupancy::Occupied
    }

    fn add_agent(&mut self, member: Self::Member, admission: Self::Admission) -> AgentResult<()> {
        if self.members().contains(member) {
            return Err(AgentError::DuplicateMember {
                container: self.id().to_string(),
                member:    member.to_string(),
            });
        }
        self.before_add(member, &admission)?;
        self.members_mut().insert(member);
        Ok(())
    }

    fn remove_agent(&mut self, member: Self::Member) -> AgentResult<Occupancy> {
        if !self.members_mut().remove(member) {
            return Err(AgentError::NotAMember {
                container: self.id().to_string(),
                member:    member.to_string(),
            });
        }
        Ok(self.after_remove(member))
    }

    #[inline]
    fn contains(&self, member: Self::Member) -> bool {
        self.members().contains(member)
    }

    #[inline]
    fn num_members(&self) -> usize {
        self.members().len()
    }

    fn iter_agents(&self) -> impl Iterator<Item = Self::Member> + '_ {
        self.members().iter()
    }
}
