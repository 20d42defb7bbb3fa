//! Combining functions.
//!
//! A [`Combiner`] folds an ordered, non-empty run of values into one value.
//! The tree calls it with exactly two values while building and updating, and
//! with the whole canonical decomposition of a range (one or more values, in
//! index order) when answering a query. It must therefore be associative, but
//! it need not be commutative.

use std::iter;

pub trait Combiner<T> {
    /// Combines `values` (never empty, in ascending index order) into one value.
    fn combine(&self, values: &[T]) -> T;
}

impl<T, F> Combiner<T> for F
where
    F: Fn(&[T]) -> T,
{
    #[inline(always)]
    fn combine(&self, values: &[T]) -> T {
        self(values)
    }
}

/// Sum of all values.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sum;

impl<T> Combiner<T> for Sum
where
    T: Clone + iter::Sum<T>,
{
    fn combine(&self, values: &[T]) -> T {
        values.iter().cloned().sum()
    }
}

/// Product of all values.
#[derive(Clone, Copy, Debug, Default)]
pub struct Product;

impl<T> Combiner<T> for Product
where
    T: Clone + iter::Product<T>,
{
    fn combine(&self, values: &[T]) -> T {
        values.iter().cloned().product()
    }
}

/// Smallest value; the leftmost one wins ties. Works for `PartialOrd` types
/// such as `f64`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Min;

impl<T: Clone + PartialOrd> Combiner<T> for Min {
    fn combine(&self, values: &[T]) -> T {
        let mut best = &values[0];
        for v in &values[1..] {
            if v < best {
                best = v;
            }
        }
        best.clone()
    }
}

/// Largest value; the leftmost one wins ties.
#[derive(Clone, Copy, Debug, Default)]
pub struct Max;

impl<T: Clone + PartialOrd> Combiner<T> for Max {
    fn combine(&self, values: &[T]) -> T {
        let mut best = &values[0];
        for v in &values[1..] {
            if v > best {
                best = v;
            }
        }
        best.clone()
    }
}

/// Concatenation in index order.
#[derive(Clone, Copy, Debug, Default)]
pub struct Concat;

impl Combiner<String> for Concat {
    fn combine(&self, values: &[String]) -> String {
        values.concat()
    }
}

impl<U: Clone> Combiner<Vec<U>> for Concat {
    fn combine(&self, values: &[Vec<U>]) -> Vec<U> {
        values.concat()
    }
}

/// The value with the largest key; the leftmost one wins ties.
#[derive(Clone, Copy, Debug)]
pub struct MaxBy<F>(pub F);

impl<T, K, F> Combiner<T> for MaxBy<F>
where
    T: Clone,
    K: Ord,
    F: Fn(&T) -> K,
{
    fn combine(&self, values: &[T]) -> T {
        let key = &self.0;
        let mut best = &values[0];
        let mut best_key = key(best);
        for v in &values[1..] {
            let k = key(v);
            if k > best_key {
                best = v;
                best_key = k;
            }
        }
        best.clone()
    }
}
