use std::rc::Rc;

use imbl_sized_chunks::Chunk;

use crate::{Const, ValidBranchingConstant};

pub(crate) type Interior<T, const N: usize> = Chunk<Rc<Node<T, N>>, N>;
pub(crate) type SizeTable<const N: usize> = Chunk<usize, N>;

// `N` must be a power of 2 so that navigation below balanced nodes can be
// done with shifts and masks; the `ValidBranchingConstant` bound on the
// impl enforces it.
//
// A node at height `h` (leaves are at height 0) covers at most `N^(h+1)`
// elements, and each of its children covers at most `N^h` — its "stride".
// An interior node either is *balanced* (`sizes: None`), meaning every
// child except the last is a complete subtree of exactly one stride, or
// carries a table of cumulative child sizes. The table is behind an `Rc`
// so that cloning a node stays cheap.
#[derive(Debug, Clone)]
pub(crate) enum Node<T, const N: usize> {
    Leaf {
        data: Chunk<T, N>,
    },
    Interior {
        children: Interior<T, N>,
        sizes: Option<Rc<SizeTable<N>>>,
    },
}

/// The maximum number of elements under each child of a node at `height`.
pub(crate) fn stride<const N: usize>(height: u8) -> usize {
    1usize << (N.ilog2() * u32::from(height))
}

/// Locate the child owning the subtree-local index `idx`, returning the
/// child's position and the index to pass down into it.
///
/// A balanced node resolves this with a shift and a mask; a relaxed node
/// searches its cumulative size table for the first entry past `idx`.
fn locate<const N: usize>(sizes: &Option<Rc<SizeTable<N>>>, height: u8, idx: usize) -> (usize, usize) {
    match sizes {
        Some(table) => {
            let bucket = table.partition_point(|&s| s <= idx);
            let before = if bucket == 0 { 0 } else { table[bucket - 1] };
            (bucket, idx - before)
        }
        None => {
            let shift = N.ilog2() * u32::from(height);
            (idx >> shift, idx & ((1usize << shift) - 1))
        }
    }
}

impl<T: Clone, const N: usize> Node<T, N>
where
    Const<N>: ValidBranchingConstant,
{
    /// Number of elements in this subtree. Constant time for leaves and
    /// relaxed nodes; descends the rightmost spine of a balanced node.
    pub(crate) fn size(&self, height: u8) -> usize {
        match self {
            Node::Leaf { data } => data.len(),
            Node::Interior { sizes: Some(table), .. } => {
                *table.last().expect("empty size table")
            }
            Node::Interior { children, sizes: None } => {
                let full = children.len() - 1;
                full * stride::<N>(height)
                    + children
                        .last()
                        .expect("empty interior node")
                        .size(height - 1)
            }
        }
    }

    /// Whether this subtree holds the maximum `N^(height+1)` elements.
    pub(crate) fn is_complete(&self, height: u8) -> bool {
        self.size(height) == stride::<N>(height + 1)
    }

    pub(crate) fn get(&self, height: u8, idx: usize) -> Option<&T> {
        match self {
            Node::Leaf { data } => data.get(idx),
            Node::Interior { children, sizes } => {
                let (bucket, sub) = locate::<N>(sizes, height, idx);
                children
                    .get(bucket)
                    .and_then(|child| child.get(height - 1, sub))
            }
        }
    }

    /// Copy-on-write access: shared nodes along the path are cloned, nodes
    /// owned by a single vector are mutated in place.
    pub(crate) fn get_mut(&mut self, height: u8, idx: usize) -> Option<&mut T> {
        match self {
            Node::Leaf { data } => data.get_mut(idx),
            Node::Interior { children, sizes } => {
                let (bucket, sub) = locate::<N>(sizes, height, idx);
                children
                    .get_mut(bucket)
                    .and_then(|child| Rc::make_mut(child).get_mut(height - 1, sub))
            }
        }
    }

    /// The size table for `children`, or `None` when the node they form is
    /// balanced (every child but the last complete). `children` must be
    /// non-empty.
    pub(crate) fn relaxed_sizes(children: &Interior<T, N>, height: u8) -> Option<Rc<SizeTable<N>>> {
        let stride = stride::<N>(height);
        let balanced = children
            .iter()
            .take(children.len() - 1)
            .all(|child| child.size(height - 1) == stride);
        if balanced {
            return None;
        }
        let mut table = SizeTable::<N>::new();
        let mut total = 0;
        for child in children.iter() {
            total += child.size(height - 1);
            table.push_back(total);
        }
        Some(Rc::new(table))
    }

    /// An interior node at `height` over `children`, with a size table iff
    /// one is needed.
    pub(crate) fn interior(children: Interior<T, N>, height: u8) -> Node<T, N> {
        let sizes = Self::relaxed_sizes(&children, height);
        Node::Interior { children, sizes }
    }

    /// A chain of single-child nodes from `height` down to a leaf holding
    /// `data`.
    pub(crate) fn single_path(data: Chunk<T, N>, height: u8) -> Node<T, N> {
        let mut node = Node::Leaf { data };
        for _ in 0..height {
            let mut children = Interior::<T, N>::new();
            children.push_back(Rc::new(node));
            node = Node::Interior { children, sizes: None };
        }
        node
    }

    /// Hang `chunk` off the right spine as the new rightmost leaf, merging
    /// into the current rightmost leaf when it has room. `Err` hands the
    /// chunk back when the subtree is saturated and the caller must grow
    /// the tree instead.
    pub(crate) fn push_chunk_back(&mut self, height: u8, chunk: Chunk<T, N>) -> Result<(), Chunk<T, N>> {
        match self {
            Node::Leaf { data } => {
                if data.len() + chunk.len() <= N {
                    data.extend(chunk);
                    Ok(())
                } else {
                    Err(chunk)
                }
            }
            Node::Interior { children, sizes } => {
                let added = chunk.len();
                let last = children.last_mut().expect("empty interior node");
                match Rc::make_mut(last).push_chunk_back(height - 1, chunk) {
                    Ok(()) => {
                        if let Some(table) = sizes {
                            let table = Rc::make_mut(table);
                            let k = table.len();
                            table[k - 1] += added;
                        }
                        Ok(())
                    }
                    Err(chunk) => {
                        if children.is_full() {
                            return Err(chunk);
                        }
                        // A saturated rightmost child is not necessarily a
                        // complete one; appending a sibling after an
                        // incomplete child forces a size table.
                        let aligned = children
                            .last()
                            .expect("empty interior node")
                            .is_complete(height - 1);
                        children.push_back(Rc::new(Node::single_path(chunk, height - 1)));
                        match sizes {
                            Some(table) => {
                                let total = *table.last().expect("empty size table");
                                Rc::make_mut(table).push_back(total + added);
                            }
                            None => {
                                if !aligned {
                                    *sizes = Self::relaxed_sizes(children, height);
                                }
                            }
                        }
                        Ok(())
                    }
                }
            }
        }
    }

    /// Mirror of [`Node::push_chunk_back`] on the left spine. Prepending a
    /// partial block in front of complete siblings is what introduces
    /// relaxation on this side.
    pub(crate) fn push_chunk_front(&mut self, height: u8, chunk: Chunk<T, N>) -> Result<(), Chunk<T, N>> {
        match self {
            Node::Leaf { data } => {
                if data.len() + chunk.len() <= N {
                    let mut merged = chunk;
                    merged.extend(std::mem::replace(data, Chunk::new()));
                    *data = merged;
                    Ok(())
                } else {
                    Err(chunk)
                }
            }
            Node::Interior { children, sizes } => {
                let added = chunk.len();
                let first = children.first_mut().expect("empty interior node");
                match Rc::make_mut(first).push_chunk_front(height - 1, chunk) {
                    Ok(()) => {
                        match sizes {
                            Some(table) => {
                                for entry in Rc::make_mut(table).iter_mut() {
                                    *entry += added;
                                }
                            }
                            // A balanced node with siblings has a complete
                            // first child, which can't absorb anything; only
                            // a lone child can grow in place.
                            None => debug_assert_eq!(children.len(), 1),
                        }
                        Ok(())
                    }
                    Err(chunk) => {
                        if children.is_full() {
                            return Err(chunk);
                        }
                        let node = Node::single_path(chunk, height - 1);
                        let complete = node.is_complete(height - 1);
                        children.push_front(Rc::new(node));
                        match sizes {
                            Some(table) => {
                                let mut rebuilt = SizeTable::<N>::new();
                                rebuilt.push_back(added);
                                for &s in table.iter() {
                                    rebuilt.push_back(s + added);
                                }
                                *table = Rc::new(rebuilt);
                            }
                            None => {
                                if !complete {
                                    *sizes = Self::relaxed_sizes(children, height);
                                }
                            }
                        }
                        Ok(())
                    }
                }
            }
        }
    }

    /// Detach the rightmost leaf of this subtree. Returns the leaf's data
    /// and whether the subtree is now empty (in which case the caller
    /// removes it).
    pub(crate) fn pop_chunk_back(&mut self, height: u8) -> (Chunk<T, N>, bool) {
        let Node::Interior { children, sizes } = self else {
            unreachable!("pop_chunk_back on a leaf");
        };
        let last = Rc::make_mut(children.last_mut().expect("empty interior node"));
        let (chunk, child_empty) = if height == 1 {
            let Node::Leaf { data } = last else {
                unreachable!("non-leaf at height 0");
            };
            (std::mem::replace(data, Chunk::new()), true)
        } else {
            last.pop_chunk_back(height - 1)
        };
        if child_empty {
            children.pop_back();
        }
        if let Some(table) = sizes {
            let table = Rc::make_mut(table);
            if child_empty {
                table.pop_back();
            } else {
                let k = table.len();
                table[k - 1] -= chunk.len();
            }
        }
        (chunk, children.is_empty())
    }

    /// Detach the leftmost leaf of this subtree.
    pub(crate) fn pop_chunk_front(&mut self, height: u8) -> (Chunk<T, N>, bool) {
        let Node::Interior { children, sizes } = self else {
            unreachable!("pop_chunk_front on a leaf");
        };
        let first = Rc::make_mut(children.first_mut().expect("empty interior node"));
        let (chunk, child_empty) = if height == 1 {
            let Node::Leaf { data } = first else {
                unreachable!("non-leaf at height 0");
            };
            (std::mem::replace(data, Chunk::new()), true)
        } else {
            first.pop_chunk_front(height - 1)
        };
        if child_empty {
            children.pop_front();
        }
        let removed = chunk.len();
        match sizes {
            Some(table) => {
                let mut rebuilt = SizeTable::<N>::new();
                let skip = usize::from(child_empty);
                for &s in table.iter().skip(skip) {
                    rebuilt.push_back(s - removed);
                }
                *table = Rc::new(rebuilt);
            }
            None => {
                // Dropping a whole complete front child keeps the node
                // balanced; shrinking the front child does not.
                if !child_empty && !children.is_empty() {
                    *sizes = Self::relaxed_sizes(children, height);
                }
            }
        }
        (chunk, children.is_empty())
    }

    /// Shrink this subtree to its first `len` elements, `0 < len < size`.
    pub(crate) fn truncate(&mut self, height: u8, len: usize) {
        debug_assert!(len > 0);
        match self {
            Node::Leaf { data } => data.drop_right(len),
            Node::Interior { children, sizes } => {
                let (bucket, before, child_size) = match sizes {
                    Some(table) => {
                        let b = table.partition_point(|&s| s <= len - 1);
                        let before = if b == 0 { 0 } else { table[b - 1] };
                        (b, before, table[b] - before)
                    }
                    None => {
                        let shift = N.ilog2() * u32::from(height);
                        let b = (len - 1) >> shift;
                        let size = if b + 1 == children.len() {
                            children[b].size(height - 1)
                        } else {
                            1usize << shift
                        };
                        (b, b << shift, size)
                    }
                };
                children.drop_right(bucket + 1);
                let keep = len - before;
                if keep < child_size {
                    Rc::make_mut(children.last_mut().expect("empty interior node"))
                        .truncate(height - 1, keep);
                }
                if let Some(table) = sizes {
                    let table = Rc::make_mut(table);
                    table.drop_right(bucket);
                    table.push_back(len);
                }
            }
        }
    }

    /// Remove the first `n` elements of this subtree, `0 < n < size`.
    pub(crate) fn skip(&mut self, height: u8, n: usize) {
        debug_assert!(n > 0);
        match self {
            Node::Leaf { data } => data.drop_left(n),
            Node::Interior { children, sizes } => {
                let (bucket, before) = match sizes {
                    Some(table) => {
                        let b = table.partition_point(|&s| s <= n);
                        let before = if b == 0 { 0 } else { table[b - 1] };
                        (b, before)
                    }
                    None => {
                        let shift = N.ilog2() * u32::from(height);
                        ((n >> shift), (n >> shift) << shift)
                    }
                };
                children.drop_left(bucket);
                let sub = n - before;
                if sub > 0 {
                    Rc::make_mut(children.first_mut().expect("empty interior node"))
                        .skip(height - 1, sub);
                }
                match sizes {
                    Some(table) => {
                        let mut rebuilt = SizeTable::<N>::new();
                        for &s in table.iter().skip(bucket) {
                            rebuilt.push_back(s - n);
                        }
                        *table = Rc::new(rebuilt);
                    }
                    None => {
                        // A cut at a child boundary leaves the node
                        // balanced; a mid-child cut relaxes it.
                        if sub > 0 {
                            *sizes = Self::relaxed_sizes(children, height);
                        }
                    }
                }
            }
        }
    }

    /// Assert every structural invariant of this subtree and return its
    /// size. Test support; not called on any production path.
    pub(crate) fn check(&self, height: u8) -> usize {
        match self {
            Node::Leaf { data } => {
                assert_eq!(height, 0);
                assert!(!data.is_empty());
                data.len()
            }
            Node::Interior { children, sizes } => {
                assert!(height >= 1);
                assert!(!children.is_empty());
                let child_sizes: Vec<usize> =
                    children.iter().map(|c| c.check(height - 1)).collect();
                match sizes {
                    Some(table) => {
                        assert_eq!(table.len(), children.len());
                        let mut total = 0;
                        for (entry, size) in table.iter().zip(&child_sizes) {
                            total += size;
                            assert_eq!(*entry, total);
                        }
                    }
                    None => {
                        let stride = stride::<N>(height);
                        for &s in &child_sizes[..child_sizes.len() - 1] {
                            assert_eq!(s, stride);
                        }
                    }
                }
                child_sizes.iter().sum()
            }
        }
    }
}
