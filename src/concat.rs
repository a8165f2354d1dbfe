//! Concatenation of two trees by level-wise rebalancing.
//!
//! Two same-height trees are merged bottom-up along their facing spines:
//! the two boundary leaves combine first, then at each level above, the
//! surviving children of both sides plus the merged middle are reflowed so
//! that every emitted node is full except possibly the last. Reflowing one
//! level of grandchildren per level keeps the result within the tree's
//! balance bounds while touching only the nodes along the seam (plus one
//! row of copies per level), which is what makes concatenation
//! logarithmic-ish rather than linear.

use std::rc::Rc;

use imbl_sized_chunks::Chunk;

use crate::node::{Interior, Node};
use crate::{Const, ValidBranchingConstant};

/// Join two trees of heights `lh` and `rh` into a single root, returning
/// it with its height. The result may carry a single-child chain at the
/// top; the caller prunes.
pub(crate) fn join<T: Clone, const N: usize>(
    left: Rc<Node<T, N>>,
    lh: u8,
    right: Rc<Node<T, N>>,
    rh: u8,
) -> (Rc<Node<T, N>>, u8)
where
    Const<N>: ValidBranchingConstant,
{
    let height = lh.max(rh);
    let left = elevate(left, lh, height);
    let right = elevate(right, rh, height);
    let merged = merge(&left, &right, height);
    if merged.len() == 1 {
        (merged.into_iter().next().expect("empty merge"), height)
    } else {
        let children: Interior<T, N> = merged.into_iter().collect();
        (Rc::new(Node::interior(children, height + 1)), height + 1)
    }
}

/// Wrap `node` in single-child nodes until it sits at height `to`.
fn elevate<T: Clone, const N: usize>(node: Rc<Node<T, N>>, from: u8, to: u8) -> Rc<Node<T, N>>
where
    Const<N>: ValidBranchingConstant,
{
    let mut node = node;
    for _ in from..to {
        let mut children = Interior::<T, N>::new();
        children.push_back(node);
        node = Rc::new(Node::Interior {
            children,
            sizes: None,
        });
    }
    node
}

/// Merge two subtrees of the same height into one or two nodes at that
/// height (two when the combined children overflow a single node).
fn merge<T: Clone, const N: usize>(
    left: &Node<T, N>,
    right: &Node<T, N>,
    height: u8,
) -> Vec<Rc<Node<T, N>>>
where
    Const<N>: ValidBranchingConstant,
{
    if height == 0 {
        let (Node::Leaf { data: ld }, Node::Leaf { data: rd }) = (left, right) else {
            unreachable!("non-leaf at height 0");
        };
        return pack_leaves(ld.iter().chain(rd.iter()));
    }
    let Node::Interior { children: lc, .. } = left else {
        unreachable!("leaf above height 0");
    };
    let Node::Interior { children: rc, .. } = right else {
        unreachable!("leaf above height 0");
    };
    let middle = merge(
        lc.last().expect("empty interior node"),
        rc.first().expect("empty interior node"),
        height - 1,
    );
    let mut all: Vec<Rc<Node<T, N>>> = Vec::with_capacity(lc.len() + rc.len());
    all.extend(lc.iter().take(lc.len() - 1).cloned());
    all.extend(middle);
    all.extend(rc.iter().skip(1).cloned());
    let packed = repack(&all, height - 1);
    group(packed, height)
}

/// Reflow `nodes` (all at `height`) so that every emitted node is full
/// except possibly the last, preserving element order. A node that is
/// already full and lands on a slot boundary is reused without copying.
fn repack<T: Clone, const N: usize>(nodes: &[Rc<Node<T, N>>], height: u8) -> Vec<Rc<Node<T, N>>>
where
    Const<N>: ValidBranchingConstant,
{
    if height == 0 {
        let mut out = Vec::with_capacity(nodes.len());
        let mut filling: Chunk<T, N> = Chunk::new();
        for node in nodes {
            let Node::Leaf { data } = node.as_ref() else {
                unreachable!("non-leaf at height 0");
            };
            if filling.is_empty() && data.is_full() {
                out.push(Rc::clone(node));
                continue;
            }
            for elem in data.iter() {
                filling.push_back(elem.clone());
                if filling.is_full() {
                    out.push(Rc::new(Node::Leaf {
                        data: std::mem::replace(&mut filling, Chunk::new()),
                    }));
                }
            }
        }
        if !filling.is_empty() {
            out.push(Rc::new(Node::Leaf { data: filling }));
        }
        out
    } else {
        let mut out = Vec::with_capacity(nodes.len());
        let mut filling: Interior<T, N> = Interior::new();
        for node in nodes {
            let Node::Interior { children, .. } = node.as_ref() else {
                unreachable!("leaf above height 0");
            };
            if filling.is_empty() && children.is_full() {
                out.push(Rc::clone(node));
                continue;
            }
            for child in children.iter() {
                filling.push_back(Rc::clone(child));
                if filling.is_full() {
                    out.push(Rc::new(Node::interior(
                        std::mem::replace(&mut filling, Interior::new()),
                        height,
                    )));
                }
            }
        }
        if !filling.is_empty() {
            out.push(Rc::new(Node::interior(filling, height)));
        }
        out
    }
}

fn pack_leaves<'a, T: Clone + 'a, const N: usize>(
    elems: impl Iterator<Item = &'a T>,
) -> Vec<Rc<Node<T, N>>> {
    let mut out = Vec::new();
    let mut filling: Chunk<T, N> = Chunk::new();
    for elem in elems {
        filling.push_back(elem.clone());
        if filling.is_full() {
            out.push(Rc::new(Node::Leaf {
                data: std::mem::replace(&mut filling, Chunk::new()),
            }));
        }
    }
    if !filling.is_empty() {
        out.push(Rc::new(Node::Leaf { data: filling }));
    }
    out
}

/// Group packed children into a node, or two when they overflow one.
fn group<T: Clone, const N: usize>(mut packed: Vec<Rc<Node<T, N>>>, height: u8) -> Vec<Rc<Node<T, N>>>
where
    Const<N>: ValidBranchingConstant,
{
    debug_assert!(!packed.is_empty() && packed.len() <= 2 * N);
    if packed.len() <= N {
        let children: Interior<T, N> = packed.into_iter().collect();
        vec![Rc::new(Node::interior(children, height))]
    } else {
        let rest = packed.split_off(N);
        vec![
            Rc::new(Node::interior(packed.into_iter().collect(), height)),
            Rc::new(Node::interior(rest.into_iter().collect(), height)),
        ]
    }
}
