//! Segment tree over a fixed-size sequence, parameterised by a user-supplied
//! combining function instead of a fixed operator.
//!
//! ```
//! use segtree::{SegTree, combine::Concat};
//!
//! let words = ["abc", "def", "xyz", "uuu", "fff"].map(String::from).to_vec();
//! let mut tree = SegTree::new(words, Concat).unwrap();
//! assert_eq!(tree.query(1..=3).unwrap(), "defxyzuuu");
//!
//! tree.update(2, "-".to_string()).unwrap();
//! assert_eq!(tree.query(..).unwrap(), "abcdef-uuufff");
//! ```
//!
//! Any `Fn(&[T]) -> T` works as a combiner:
//!
//! ```
//! use segtree::SegTree;
//!
//! let gcd = |values: &[u64]| {
//!     values.iter().fold(0, |mut a, &b| {
//!         let mut b = b;
//!         while b != 0 {
//!             (a, b) = (b, a % b);
//!         }
//!         a
//!     })
//! };
//! let tree = SegTree::new(vec![12, 18, 24, 9], gcd).unwrap();
//! assert_eq!(tree.query(0..3), Ok(6));
//! assert_eq!(tree.query(..), Ok(3));
//! ```

pub mod combine;
mod error;
mod node;
mod range;
mod tree;

pub use combine::Combiner;
pub use error::SegTreeError;
pub use tree::SegTree;
