//! Injected orderings for [`PairingHeap`][crate::PairingHeap].

/// Decides which of two keys leaves the heap first.
///
/// Implementations must be a strict weak ordering: `precedes(a, a)` is
/// `false`, and `precedes(a, b)` implies `!precedes(b, a)`.  The heap does
/// not check this; a comparator that violates it yields an arbitrary pop
/// order.
pub trait Comparator<K> {
    /// `true` if `a` must be popped before `b`.
    fn precedes(&self, a: &K, b: &K) -> bool;
}

/// Smallest key first.  Incomparable keys (NaN) never precede anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct MinOrder;

impl<K: PartialOrd> Comparator<K> for MinOrder {
    #[inline]
    fn precedes(&self, a: &K, b: &K) -> bool {
        a < b
    }
}

/// Largest key first.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaxOrder;

impl<K: PartialOrd> Comparator<K> for MaxOrder {
    #[inline]
    fn precedes(&self, a: &K, b: &K) -> bool {
        a > b
    }
}
