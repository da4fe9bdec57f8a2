//! `ai-heap` — decrease-key priority queue shared by both search layers.
//!
//! # Crate layout
//!
//! | Module    | Contents                                              |
//! |-----------|-------------------------------------------------------|
//! | [`heap`]  | `PairingHeap<T, K, C>`, `Handle`                      |
//! | [`order`] | `Comparator` trait, `MinOrder`, `MaxOrder`            |
//!
//! The path search keys nodes by a two-part tolerance-compared priority and
//! supplies its own [`Comparator`]; the task planner uses [`MaxOrder`] over
//! utility-per-time ratios.
//!
//! # Example
//!
//! ```
//! use ai_heap::{MaxOrder, PairingHeap};
//!
//! let mut heap: PairingHeap<&str, u32, MaxOrder> = PairingHeap::new();
//! let a = heap.push("a", 1);
//! heap.push("b", 5);
//! heap.change_priority(a, 9);
//! assert_eq!(heap.pop(), Some("a"));
//! assert_eq!(heap.pop(), Some("b"));
//! ```

pub mod heap;
pub mod order;


pub use heap::{Handle, PairingHeap};
pub use order::{Comparator, MaxOrder, MinOrder};
