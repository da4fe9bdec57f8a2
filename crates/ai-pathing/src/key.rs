//! Two-part queue keys and their tolerant lexicographic order.

use ai_heap::Comparator;

/// `(min(g, rhs) + h(start, node) + km, min(g, rhs))`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriorityKey(pub f32, pub f32);

/// Lexicographic order on [`PriorityKey`] where components closer than
/// `tolerance` compare equal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct KeyOrder {
    pub tolerance: f32,
}

impl KeyOrder {
    pub fn new(tolerance: f32) -> Self {
        Self { tolerance }
    }
}

impl Comparator<PriorityKey> for KeyOrder {
    #[inline]
    fn precedes(&self, a: &PriorityKey, b: &PriorityKey) -> bool {
        if a.0 < b.0 - self.tolerance {
            return true;
        }
        if b.0 < a.0 - self.tolerance {
            return false;
        }
        a.1 < b.1 - self.tolerance
    }
}
