//! Strongly typed identifier wrappers.
//!
//! Every id is `Copy + Ord + Hash` so it can key a dictionary store or sit in
//! a heap without ceremony.  Ids that address dense storage (`CellId`,
//! `NodeId`) expose `.index()` for direct `Vec` indexing.

use std::fmt;

/// Generate a typed id wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel for "no such id".
            pub const INVALID: $name = $name(<$inner>::MAX);

            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// A zone connector in the sparse inter-zone graph.
    pub struct NodeId(u32);
}

typed_id! {
    /// A cell of one bounded local grid (row-major index within that grid).
    pub struct CellId(u32);
}

typed_id! {
    /// A region of the map.  Connectors link exactly two zones.
    pub struct ZoneId(u16);
}

typed_id! {
    /// An agent driving a planner or a path search.
    pub struct AgentId(u32);
}

typed_id! {
    /// Registration slot of a task in a `TaskRegistry`.
    pub struct TaskId(u16);
}
