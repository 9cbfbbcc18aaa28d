//! Per-kind unique ID allocation.
//!
//! Each agent kind owns one [`IdGenerator`].  Generated IDs and externally
//! registered IDs share a single "used" pool, so a value can never be issued
//! twice during the generator's lifetime.  The pool only grows.

use std::marker::PhantomData;

use rustc_hash::FxHashSet;

use crate::ids::TypedId;
use crate::{CoreError, CoreResult};

/// Issues unique IDs of type `I`.
#[derive(Clone, Debug)]
pub struct IdGenerator<I: TypedId> {
    /// Last value returned by `next`; `None` before the first call.
    last: Option<u32>,
    used: FxHashSet<u32>,
    _kind: PhantomData<I>,
}

impl<I: TypedId> Default for IdGenerator<I> {
    fn default() -> Self {
        Self {
            last:  None,
            used:  FxHashSet::default(),
            _kind: PhantomData,
        }
    }
}

impl<I: TypedId> IdGenerator<I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the smallest unused value above the last issued one and mark
    /// it used.  The first call starts the search at zero.
    ///
    /// # Errors
    /// [`CoreError::IdSpaceExhausted`] if the `u32` range is used up.
    pub fn next(&mut self) -> CoreResult<I> {
        let mut candidate = match self.last {
            None => 0,
            Some(last) => last.checked_add(1).ok_or(CoreError::IdSpaceExhausted(I::KIND))?,
        };
        while self.used.contains(&candidate) {
            candidate = candidate
                .checked_add(1)
                .ok_or(CoreError::IdSpaceExhausted(I::KIND))?;
        }
        self.used.insert(candidate);
        self.last = Some(candidate);
        Ok(I::from_raw(candidate))
    }

    /// Register an externally assigned ID.
    ///
    /// # Errors
    /// [`CoreError::DuplicateId`] if `id` was already issued or registered.
    pub fn use_id(&mut self, id: I) -> CoreResult<I> {
        if !self.used.insert(id.raw()) {
            return Err(CoreError::DuplicateId { kind: I::KIND, id: id.raw() });
        }
        Ok(id)
    }

    /// `true` if `id` has been issued or registered.
    #[inline]
    pub fn is_used(&self, id: I) -> bool {
        self.used.contains(&id.raw())
    }

    /// Number of values in the used pool.
    pub fn used_count(&self) -> usize {
        self.used.len()
    }
}
