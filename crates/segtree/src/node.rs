//! Node storage and the recursive tree algorithms.
//!
//! Nodes live in one arena owned by the tree; a parent refers to its children
//! by [`Id`]. Nodes are only ever appended during a build and never moved or
//! replaced afterwards, so an `Id` handed out by [`Nodes::build`] stays valid
//! until the arena is dropped or rebuilt.

use crate::combine::Combiner;

#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Id(u32);

impl Id {
    #[inline(always)]
    fn idx(self) -> usize {
        self.0 as usize
    }
}

#[inline(always)]
fn id(v: usize) -> Id {
    debug_assert!(v < u32::MAX as usize);
    Id(v as u32)
}

/// A node covering the inclusive index range `[lo, hi]`.
///
/// `children` is `Some` iff `lo < hi`. The left child covers `[lo, mid]` and
/// the right child `[mid + 1, hi]` with `mid = (lo + hi) / 2`.
#[derive(Clone, Debug)]
pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) lo: usize,
    pub(crate) hi: usize,
    children: Option<(Id, Id)>,
}

impl<T> Node<T> {
    #[inline(always)]
    fn mid(&self) -> usize {
        self.lo + (self.hi - self.lo) / 2
    }

    #[inline(always)]
    fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Nodes<T> {
    nodes: Vec<Node<T>>,
    root: Id,
}

impl<T: Clone> Nodes<T> {
    /// Builds the tree over `values` by recursive bisection.
    ///
    /// Returns the arena together with the id of the leaf for every index,
    /// in index order. `values` must not be empty.
    pub(crate) fn build<C: Combiner<T>>(values: Vec<T>, combiner: &C) -> (Self, Vec<Id>) {
        debug_assert!(!values.is_empty());
        let n = values.len();
        let mut nodes = Vec::with_capacity(2 * n - 1);
        let mut leaves = Vec::with_capacity(n);
        for (i, value) in values.into_iter().enumerate() {
            leaves.push(id(nodes.len()));
            nodes.push(Node {
                value,
                lo: i,
                hi: i,
                children: None,
            });
        }

        let root = build_rec(&mut nodes, &leaves, 0, n - 1, combiner);
        (Self { nodes, root }, leaves)
    }

    #[inline(always)]
    fn join<C: Combiner<T>>(&self, l: Id, r: Id, combiner: &C) -> T {
        combiner.combine(&[self.node(l).value.clone(), self.node(r).value.clone()])
    }

    /// Overwrites the leaf at `index` and recombines every ancestor on the
    /// way back to the root. `index` must be in bounds.
    pub(crate) fn set<C: Combiner<T>>(&mut self, index: usize, value: T, combiner: &C) {
        self.set_rec(self.root, index, value, combiner);
    }

    fn set_rec<C: Combiner<T>>(&mut self, x: Id, index: usize, value: T, combiner: &C) {
        let node = self.node(x);
        let Some((l, r)) = node.children else {
            debug_assert_eq!((node.lo, node.hi), (index, index));
            self.node_mut(x).value = value;
            return;
        };

        if index <= node.mid() {
            self.set_rec(l, index, value, combiner);
        } else {
            self.set_rec(r, index, value, combiner);
        }
        self.node_mut(x).value = self.join(l, r, combiner);
    }

    /// Writes `values` into the leaves `[start, end]` in index order and
    /// recombines their ancestors. Subtrees disjoint from the range are not
    /// visited. `values` must yield exactly `end - start + 1` items.
    pub(crate) fn assign<C, I>(&mut self, start: usize, end: usize, values: &mut I, combiner: &C)
    where
        C: Combiner<T>,
        I: Iterator<Item = T>,
    {
        self.assign_rec(self.root, start, end, values, combiner);
    }

    fn assign_rec<C, I>(&mut self, x: Id, start: usize, end: usize, values: &mut I, combiner: &C)
    where
        C: Combiner<T>,
        I: Iterator<Item = T>,
    {
        let node = self.node(x);
        if node.hi < start || end < node.lo {
            return;
        }

        match node.children {
            None => {
                let value = values.next();
                debug_assert!(value.is_some());
                if let Some(value) = value {
                    self.node_mut(x).value = value;
                }
            }
            Some((l, r)) => {
                self.assign_rec(l, start, end, values, combiner);
                self.assign_rec(r, start, end, values, combiner);
                self.node_mut(x).value = self.join(l, r, combiner);
            }
        }
    }

    /// Combines `[left, right]` from its canonical decomposition with a single
    /// combiner call. The range must lie inside the root's range.
    pub(crate) fn query<C: Combiner<T>>(&self, left: usize, right: usize, combiner: &C) -> T {
        let mut parts = Vec::new();
        self.collect(self.root, left, right, &mut parts);
        debug_assert!(!parts.is_empty());
        combiner.combine(&parts)
    }

    // Descent relies on `[left, right]` lying inside the root's range: a child
    // is entered as soon as the query reaches past its inner edge.
    fn collect(&self, x: Id, left: usize, right: usize, parts: &mut Vec<T>) {
        let node = self.node(x);
        if left <= node.lo && node.hi <= right {
            parts.push(node.value.clone());
            return;
        }

        if let Some((l, r)) = node.children {
            if left <= self.node(l).hi {
                self.collect(l, left, right, parts);
            }
            if self.node(r).lo <= right {
                self.collect(r, left, right, parts);
            }
        }
    }

    /// Recombines every internal node from its children and compares the
    /// result with the stored aggregate. Also checks the range partition.
    pub(crate) fn is_consistent<C: Combiner<T>>(&self, combiner: &C) -> bool
    where
        T: PartialEq,
    {
        self.nodes.iter().all(|node| match node.children {
            None => node.lo == node.hi,
            Some((l, r)) => {
                let (left, right) = (self.node(l), self.node(r));
                node.lo < node.hi
                    && left.lo == node.lo
                    && left.hi + 1 == right.lo
                    && right.hi == node.hi
                    && node.value == self.join(l, r, combiner)
            }
        })
    }
}

impl<T> Nodes<T> {
    #[inline(always)]
    pub(crate) fn node(&self, x: Id) -> &Node<T> {
        &self.nodes[x.idx()]
    }

    #[inline(always)]
    fn node_mut(&mut self, x: Id) -> &mut Node<T> {
        &mut self.nodes[x.idx()]
    }

    #[inline(always)]
    pub(crate) fn root(&self) -> &Node<T> {
        self.node(self.root)
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges on the longest root-to-leaf path.
    pub(crate) fn height(&self) -> usize {
        let mut height = 0;
        let mut x = self.root;
        // The left child is never shorter than the right one.
        while let Some((l, _)) = self.node(x).children {
            height += 1;
            x = l;
        }
        debug_assert!(self.node(x).is_leaf());
        height
    }
}

fn build_rec<T, C>(
    nodes: &mut Vec<Node<T>>,
    leaves: &[Id],
    lo: usize,
    hi: usize,
    combiner: &C,
) -> Id
where
    T: Clone,
    C: Combiner<T>,
{
    if lo == hi {
        return leaves[lo];
    }

    let mid = lo + (hi - lo) / 2;
    let l = build_rec(nodes, leaves, lo, mid, combiner);
    let r = build_rec(nodes, leaves, mid + 1, hi, combiner);
    let value = combiner.combine(&[
        nodes[l.idx()].value.clone(),
        nodes[r.idx()].value.clone(),
    ]);

    let x = id(nodes.len());
    nodes.push(Node {
        value,
        lo,
        hi,
        children: Some((l, r)),
    });
    x
}
