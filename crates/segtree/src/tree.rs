use std::fmt;
use std::ops::RangeBounds;

use crate::SegTreeError;
use crate::combine::Combiner;
use crate::node::{Id, Nodes};
use crate::range::{check_index, inclusive_bounds};

/// Segment tree over a fixed-length, non-empty sequence.
///
/// - Point and range updates recombine only the ancestors of the touched
///   leaves, `O(log n)` combiner calls per leaf path.
/// - Queries combine the canonical decomposition of the range with a single
///   combiner call, fragments in ascending index order.
/// - Ranges are inclusive once normalised; `a..b`, `a..=b`, `a..` and `..`
///   are all accepted.
///
/// The shape of the tree is fixed at build time. Only leaf values change, so
/// the leaf table used by [`get`](Self::get), [`iter`](Self::iter) and
/// [`to_vec`](Self::to_vec) stays valid until the next [`rebuild`](Self::rebuild).
#[derive(Clone)]
pub struct SegTree<T, C> {
    combiner: C,
    nodes: Nodes<T>,
    leaves: Vec<Id>,
}

impl<T, C> SegTree<T, C>
where
    T: Clone,
    C: Combiner<T>,
{
    /// Builds a tree over `values`.
    ///
    /// Makes `n - 1` combiner calls of two values each.
    pub fn new(values: Vec<T>, combiner: C) -> Result<Self, SegTreeError> {
        if values.is_empty() {
            return Err(reject("build", SegTreeError::EmptyInput));
        }

        let (nodes, leaves) = Nodes::build(values, &combiner);
        let tree = Self {
            combiner,
            nodes,
            leaves,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            len = tree.len(),
            height = tree.height(),
            nodes = tree.node_count(),
            "segment tree built"
        );
        Ok(tree)
    }

    pub fn from_slice(values: &[T], combiner: C) -> Result<Self, SegTreeError> {
        Self::new(values.to_vec(), combiner)
    }

    /// Discards the current tree and builds a new one over `values` with the
    /// same combiner. The length may differ from the previous one.
    ///
    /// On error the current tree is kept as it was.
    pub fn rebuild(&mut self, values: Vec<T>) -> Result<(), SegTreeError> {
        if values.is_empty() {
            return Err(reject("rebuild", SegTreeError::EmptyInput));
        }

        let (nodes, leaves) = Nodes::build(values, &self.combiner);
        self.nodes = nodes;
        self.leaves = leaves;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            len = self.len(),
            height = self.height(),
            "segment tree rebuilt"
        );
        Ok(())
    }

    /// Replaces the value at `index`.
    pub fn update(&mut self, index: usize, value: T) -> Result<(), SegTreeError> {
        check_index(index, self.len()).map_err(|err| reject("update", err))?;

        #[cfg(feature = "tracing")]
        tracing::trace!(index, "point update");
        self.nodes.set(index, value, &self.combiner);
        Ok(())
    }

    /// Overwrites the values in `range` with `values`, in index order.
    ///
    /// `values` must yield exactly one item per index in `range`; nothing is
    /// written otherwise.
    pub fn update_range<R, I>(&mut self, range: R, values: I) -> Result<(), SegTreeError>
    where
        R: RangeBounds<usize>,
        I: IntoIterator<Item = T>,
    {
        let (start, end) =
            inclusive_bounds(&range, self.len()).map_err(|err| reject("update_range", err))?;

        let values: Vec<T> = values.into_iter().collect();
        let expected = end - start + 1;
        if values.len() != expected {
            let err = SegTreeError::LengthMismatch {
                expected,
                actual: values.len(),
            };
            return Err(reject("update_range", err));
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(start, end, "range update");
        self.nodes
            .assign(start, end, &mut values.into_iter(), &self.combiner);
        Ok(())
    }

    /// Combines the values in `range`.
    ///
    /// The combiner is called exactly once, with the aggregates of the maximal
    /// nodes covering `range` in ascending index order. A single-index range
    /// still goes through the combiner (with one value).
    pub fn query<R: RangeBounds<usize>>(&self, range: R) -> Result<T, SegTreeError> {
        let (left, right) =
            inclusive_bounds(&range, self.len()).map_err(|err| reject("query", err))?;

        #[cfg(feature = "tracing")]
        tracing::trace!(left, right, "range query");
        Ok(self.nodes.query(left, right, &self.combiner))
    }

    /// Recombines every internal node from its children and checks the result
    /// against the stored aggregate. Intended for tests and debugging.
    pub fn is_consistent(&self) -> bool
    where
        T: PartialEq,
    {
        self.nodes.is_consistent(&self.combiner)
    }
}

impl<T, C> SegTree<T, C> {
    /// Number of elements. Never zero.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Always `false`: a tree cannot be built over an empty sequence.
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Edges on the longest root-to-leaf path, `ceil(log2(len))`.
    pub fn height(&self) -> usize {
        self.nodes.height()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn combiner(&self) -> &C {
        &self.combiner
    }

    /// Aggregate of the whole sequence, as stored at the root.
    pub fn total(&self) -> &T {
        &self.nodes.root().value
    }

    /// Current value at `index`, `O(1)`.
    pub fn get(&self, index: usize) -> Option<&T> {
        let &x = self.leaves.get(index)?;
        Some(&self.nodes.node(x).value)
    }

    /// Current values in index order, read through the leaf table.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + '_ {
        self.leaves.iter().map(move |&x| &self.nodes.node(x).value)
    }

    /// Copies out the current sequence.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }
}

impl<T: fmt::Debug, C> fmt::Debug for SegTree<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegTree")
            .field("values", &self.iter().collect::<Vec<_>>())
            .field("total", self.total())
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}

#[inline]
fn reject(op: &'static str, err: SegTreeError) -> SegTreeError {
    #[cfg(feature = "tracing")]
    tracing::debug!(op, error = %err, "segment tree call rejected");
    #[cfg(not(feature = "tracing"))]
    let _ = op;
    err
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::SegTree;
    use crate::SegTreeError;
    use crate::combine::{Concat, Max, MaxBy, Min, Product, Sum};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn sum_queries() {
        let tree = SegTree::new(vec![5, 3, 4, 2, 1], Sum).unwrap();
        assert_eq!(tree.query(0..=4), Ok(15));
        assert_eq!(tree.query(1..=3), Ok(9));
        assert_eq!(tree.query(2..=4), Ok(7));
        assert_eq!(tree.query(..), Ok(15));
        assert_eq!(tree.query(1..4), Ok(9));
        assert_eq!(*tree.total(), 15);
    }

    #[test]
    fn min_queries_over_floats() {
        let values = vec![4.0, 1.5, 15.032, 8.66, 0.101, 15.16, 3.005];
        let tree = SegTree::new(values, Min).unwrap();
        assert_eq!(tree.query(0..=6), Ok(0.101));
        assert_eq!(tree.query(2..=3), Ok(8.66));
        assert_eq!(tree.query(3..=5), Ok(0.101));
    }

    #[test]
    fn concat_queries_keep_order() {
        let tree = SegTree::new(strings(&["abc", "def", "xyz", "uuu", "fff"]), Concat).unwrap();
        assert_eq!(tree.query(0..=1).unwrap(), "abcdef");
        assert_eq!(tree.query(1..=3).unwrap(), "defxyzuuu");
        assert_eq!(tree.query(2..=4).unwrap(), "xyzuuufff");
    }

    #[test]
    fn max_by_key_queries() {
        fn chebyshev(p: &(i32, i32)) -> i32 {
            p.0.abs().max(p.1.abs())
        }

        let points = vec![(1, 1), (2, 4), (-1, -1), (5, 3)];
        let tree = SegTree::new(points, MaxBy(chebyshev)).unwrap();
        assert_eq!(tree.query(0..=3), Ok((5, 3)));
        assert_eq!(tree.query(1..=2), Ok((2, 4)));
    }

    #[test]
    fn point_and_range_updates_propagate() {
        let mut tree = SegTree::new(vec![2_i64, 3, 7, 2, 6, 4], Product).unwrap();
        assert_eq!(tree.query(0..=2), Ok(42));

        tree.update(2, 3).unwrap();
        assert_eq!(tree.query(0..=2), Ok(18));
        assert_eq!(tree.to_vec()[2], 3);

        tree.update_range(3..=5, vec![3, 3, 3]).unwrap();
        assert_eq!(tree.to_vec(), vec![2, 3, 3, 3, 3, 3]);
        assert_eq!(tree.query(0..=5), Ok(486));
        assert!(tree.is_consistent());
    }

    #[test]
    fn repeated_point_update_is_idempotent() {
        let mut once = SegTree::new(vec![1, 2, 3, 4, 5, 6, 7], Max).unwrap();
        once.update(4, 11).unwrap();
        let mut twice = once.clone();
        twice.update(4, 11).unwrap();

        assert_eq!(once.to_vec(), twice.to_vec());
        for l in 0..7 {
            for r in l..7 {
                assert_eq!(once.query(l..=r), twice.query(l..=r), "l={l} r={r}");
            }
        }
    }

    #[test]
    fn single_index_queries_match_values() {
        let tree = SegTree::new(strings(&["p", "q", "r", "s", "t", "u"]), Concat).unwrap();
        for i in 0..tree.len() {
            assert_eq!(tree.query(i..=i).as_ref(), Ok(&tree.to_vec()[i]));
            assert_eq!(tree.get(i), Some(&tree.to_vec()[i]));
        }
        assert_eq!(tree.get(tree.len()), None);
    }

    #[test]
    fn singleton_tree() {
        let mut tree = SegTree::new(vec![9], Sum).unwrap();
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.query(0..=0), Ok(9));
        tree.update(0, 4).unwrap();
        assert_eq!(tree.query(..), Ok(4));
        tree.update_range(.., [6]).unwrap();
        assert_eq!(tree.to_vec(), vec![6]);
    }

    #[test]
    fn rejects_invalid_input() {
        assert_eq!(
            SegTree::new(Vec::<i32>::new(), Sum).err(),
            Some(SegTreeError::EmptyInput)
        );

        let mut tree = SegTree::new(vec![1, 2, 3, 4], Sum).unwrap();
        assert_eq!(
            tree.query(3..=1),
            Err(SegTreeError::InvalidRange {
                start: 3,
                end: Some(1),
                len: 4
            })
        );
        assert_eq!(
            tree.query(2..=4),
            Err(SegTreeError::InvalidRange {
                start: 2,
                end: Some(4),
                len: 4
            })
        );
        assert_eq!(
            tree.update(4, 0),
            Err(SegTreeError::IndexOutOfRange { index: 4, len: 4 })
        );
        assert_eq!(
            tree.update_range(1..=2, vec![7]),
            Err(SegTreeError::LengthMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            tree.update_range(2..=5, vec![0; 4]),
            Err(SegTreeError::InvalidRange {
                start: 2,
                end: Some(5),
                len: 4
            })
        );

        // Rejected calls leave the tree untouched.
        assert_eq!(tree.to_vec(), vec![1, 2, 3, 4]);
        assert_eq!(tree.query(..), Ok(10));
        assert_eq!(tree.rebuild(Vec::new()), Err(SegTreeError::EmptyInput));
        assert_eq!(tree.to_vec(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn rebuild_replaces_everything() {
        let mut tree = SegTree::new(vec![1, 2, 3], Sum).unwrap();
        tree.update(1, 20).unwrap();
        tree.rebuild(vec![5, 5, 5, 5, 5, 5, 5, 5]).unwrap();

        assert_eq!(tree.len(), 8);
        assert_eq!(tree.height(), 3);
        assert_eq!(tree.node_count(), 15);
        assert_eq!(tree.to_vec(), vec![5; 8]);
        assert_eq!(tree.query(6..), Ok(10));
        assert!(tree.is_consistent());
    }

    #[test]
    fn combiner_call_pattern() {
        let calls = RefCell::new(Vec::<Vec<i64>>::new());
        let sum = |values: &[i64]| {
            calls.borrow_mut().push(values.to_vec());
            values.iter().sum::<i64>()
        };

        let mut tree = SegTree::new((0..8_i64).collect::<Vec<_>>(), sum).unwrap();
        {
            let calls = calls.borrow();
            assert_eq!(calls.len(), 7);
            assert!(calls.iter().all(|args| args.len() == 2));
        }

        // Build and updates combine pairs; a query combines its whole
        // decomposition at once, left to right.
        calls.borrow_mut().clear();
        assert_eq!(tree.query(1..=6), Ok(21));
        assert_eq!(*calls.borrow(), vec![vec![1, 5, 9, 6]]);

        calls.borrow_mut().clear();
        assert_eq!(tree.query(3..=3), Ok(3));
        assert_eq!(*calls.borrow(), vec![vec![3]]);

        calls.borrow_mut().clear();
        tree.update(5, 50).unwrap();
        assert_eq!(*calls.borrow(), vec![vec![4, 50], vec![54, 13], vec![6, 67]]);

        calls.borrow_mut().clear();
        tree.update_range(2..=5, vec![1, 1, 1, 1]).unwrap();
        assert_eq!(
            *calls.borrow(),
            vec![
                vec![1, 1],
                vec![1, 2],
                vec![1, 1],
                vec![2, 13],
                vec![3, 15],
            ]
        );
        assert_eq!(tree.to_vec(), vec![0, 1, 1, 1, 1, 1, 6, 7]);
    }

    #[test]
    fn iterators_read_the_leaf_table() {
        let mut tree = SegTree::from_slice(&[3, 1, 4, 1, 5], Max).unwrap();
        tree.update_range(1..3, [9, 2]).unwrap();

        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![3, 9, 2, 1, 5]);
        assert_eq!(tree.iter().rev().next(), Some(&5));
        assert_eq!(tree.iter().len(), 5);
        assert_eq!(tree.iter().max(), Some(&9));
        assert_eq!(*tree.total(), 9);
    }

    #[test]
    fn debug_lists_values() {
        let tree = SegTree::new(vec![1, 2], Sum).unwrap();
        assert_eq!(
            format!("{tree:?}"),
            "SegTree { values: [1, 2], total: 3, height: 1, .. }"
        );
    }
}
