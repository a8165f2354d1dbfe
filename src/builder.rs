//! One-shot construction of a [`Vector`].

use crate::vector::Vector;
use crate::{Const, ValidBranchingConstant};

/// Accumulates elements, and whole vectors, into a single [`Vector`].
///
/// Elements go through an owned vector whose tree nobody else references,
/// so every push writes in place. Splicing in a whole vector with
/// [`Builder::append_vector`] finalizes the run of elements gathered so
/// far, concatenates it and the argument onto the accumulated result with
/// the logarithmic merge, and starts a fresh run.
///
/// # Examples
///
/// ```rust
/// # use relaxed_vector::{Builder, Vector};
/// let mut builder = Builder::<_, 32>::new();
/// for i in 0..3 {
///     builder.push(i);
/// }
/// builder.append_vector(Vector::from_iter(3..1000));
/// builder.push(1000);
/// let vec = builder.finish();
/// assert_eq!(vec.len(), 1001);
/// assert_eq!(vec[500], 500);
/// ```
pub struct Builder<T, const N: usize>
where
    Const<N>: ValidBranchingConstant,
{
    acc: Option<Vector<T, N>>,
    current: Vector<T, N>,
}

impl<T: Clone, const N: usize> Builder<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    pub fn new() -> Self {
        Builder {
            acc: None,
            current: Vector::new(),
        }
    }

    /// The number of elements gathered so far.
    pub fn len(&self) -> usize {
        self.acc.as_ref().map_or(0, Vector::len) + self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Adds one element to the end.
    pub fn push(&mut self, elt: T) {
        self.current.push_back(elt);
    }

    /// Splices a whole vector onto the end, reusing its tree instead of
    /// copying its elements.
    pub fn append_vector(&mut self, other: Vector<T, N>) {
        let current = std::mem::take(&mut self.current);
        let mut acc = self.acc.take().unwrap_or_default();
        acc.append(current);
        acc.append(other);
        self.acc = Some(acc);
    }

    /// Finalizes into a vector.
    pub fn finish(self) -> Vector<T, N> {
        match self.acc {
            Some(mut acc) => {
                acc.append(self.current);
                acc
            }
            None => self.current,
        }
    }

    /// Discards everything gathered so far.
    pub fn clear(&mut self) {
        self.acc = None;
        self.current = Vector::new();
    }
}

impl<T: Clone, const N: usize> Default for Builder<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, const N: usize> Extend<T> for Builder<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.current.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_only() {
        let mut builder = Builder::<u32, 4>::new();
        for i in 0..100 {
            builder.push(i);
        }
        assert_eq!(builder.len(), 100);
        let vec = builder.finish();
        vec.check_invariants();
        assert!(vec.iter().copied().eq(0..100));
    }

    #[test]
    fn mixed_pushes_and_vectors() {
        let mut builder = Builder::<u32, 4>::new();
        builder.extend(0..10);
        builder.append_vector((10..200).collect());
        builder.push(200);
        builder.append_vector((201..500).collect());
        builder.extend(500..512);
        assert_eq!(builder.len(), 512);
        let vec = builder.finish();
        vec.check_invariants();
        assert!(vec.iter().copied().eq(0..512));
    }

    #[test]
    fn append_vector_into_empty() {
        let mut builder = Builder::<u32, 4>::new();
        builder.append_vector((0..50).collect());
        let vec = builder.finish();
        vec.check_invariants();
        assert!(vec.iter().copied().eq(0..50));
    }

    #[test]
    fn clear_discards() {
        let mut builder = Builder::<u32, 4>::new();
        builder.extend(0..100);
        builder.append_vector((100..200).collect());
        builder.clear();
        assert!(builder.is_empty());
        builder.push(7);
        let vec = builder.finish();
        assert_eq!(vec.len(), 1);
        assert_eq!(vec[0], 7);
    }
}
