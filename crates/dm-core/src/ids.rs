//! Strongly typed identifiers for the four agent kinds.
//!
//! All IDs are `Copy + Ord + Hash` so they can key ordered maps and hash
//! sets directly.  Absence is always expressed as `Option<Id>`; there is no
//! sentinel value.

use std::fmt;

/// Common surface of every typed ID, used by [`IdGenerator`][crate::IdGenerator]
/// and by the generic container code in `dm-agent`.
pub trait TypedId: Copy + Eq + Ord + std::hash::Hash + fmt::Debug + fmt::Display {
    /// Human-readable agent kind, used in error messages.
    const KIND: &'static str;

    fn from_raw(raw: u32) -> Self;

    fn raw(self) -> u32;
}

/// Generate a typed ID wrapper around a `u32`.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($kind:literal);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub u32);

        impl $name {
            /// Cast to `usize`, e.g. for indexing a dense side table.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl TypedId for $name {
            const KIND: &'static str = $kind;

            #[inline(always)]
            fn from_raw(raw: u32) -> Self {
                $name(raw)
            }

            #[inline(always)]
            fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for u32 {
            #[inline(always)]
            fn from(id: $name) -> u32 {
                id.0
            }
        }
    };
}

typed_id! {
    /// Identifier of a person.
    pub struct PersonId("person");
}

typed_id! {
    /// Identifier of a household.
    pub struct HouseholdId("household");
}

typed_id! {
    /// Identifier of a neighborhood.
    pub struct NeighborhoodId("neighborhood");
}

typed_id! {
    /// Identifier of a region.
    pub struct RegionId("region");
}
