//! `AgentStore` — holding area for persons temporarily away from the
//! household hierarchy (out-migrants), keyed by scheduled return time.
//!
//! The store itself is a time-ordered queue.  Detaching the person from its
//! household and updating its store references happens in
//! [`World::store_person`][crate::World::store_person] and
//! [`World::release_persons`][crate::World::release_persons], which are the
//! entry points the event engine uses.
//!
//! `BTreeMap` keyed by return tick gives O(log T) insert and release, where
//! T is the number of distinct pending return ticks.

use std::collections::BTreeMap;

use dm_core::{HouseholdId, NeighborhoodId, PersonId, Tick};
use rustc_hash::FxHashSet;

/// One person held in a store, with where they left from.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StoredPerson {
    pub person:              PersonId,
    pub left_at:             Tick,
    pub origin_household:    Option<HouseholdId>,
    pub origin_neighborhood: Option<NeighborhoodId>,
}

#[derive(Clone, Debug, Default)]
pub struct AgentStore {
    inner:   BTreeMap<Tick, Vec<StoredPerson>>,
    members: FxHashSet<PersonId>,
}

impl AgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold `entry` until `return_time`.  Returns `false` (store unchanged)
    /// if the person is already held here.
    pub fn add_agent(&mut self, entry: StoredPerson, return_time: Tick) -> bool {
        if !self.members.insert(entry.person) {
            return false;
        }
        self.inner.entry(return_time).or_default().push(entry);
        true
    }

    /// Remove and return everyone due at or before `now`, ordered by return
    /// time and then by insertion order.
    pub fn release_agents(&mut self, now: Tick) -> Vec<StoredPerson> {
        let mut released = Vec::new();
        while let Some(entry) = self.inner.first_entry() {
            if *entry.key() > now {
                break;
            }
            released.extend(entry.remove());
        }
        for stored in &released {
            self.members.remove(&stored.person);
        }
        released
    }

    /// Remove one person regardless of return time (e.g. on death).
    pub fn remove(&mut self, person: PersonId) -> Option<StoredPerson> {
        if !self.members.remove(&person) {
            return None;
        }
        let mut found = None;
        self.inner.retain(|_, entries| {
            if let Some(pos) = entries.iter().position(|e| e.person == person) {
                found = Some(entries.remove(pos));
            }
            !entries.is_empty()
        });
        found
    }

    #[inline]
    pub fn contains(&self, person: PersonId) -> bool {
        self.members.contains(&person)
    }

    /// Scheduled return time of `person`, if held here.
    pub fn return_time(&self, person: PersonId) -> Option<Tick> {
        if !self.contains(person) {
            return None;
        }
        self.inner
            .iter()
            .find(|(_, entries)| entries.iter().any(|e| e.person == person))
            .map(|(&tick, _)| tick)
    }

    /// All held persons, by return time then insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &StoredPerson> + '_ {
        self.inner.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The earliest pending return time, or `None` if empty.
    pub fn next_return(&self) -> Option<Tick> {
        self.inner.keys().next().copied()
    }
}
