//! This crate provides a persistent vector with relaxed radix balancing
//! (an "RRB tree").
//!
//! [`Vector`] is an indexed sequence with cheap clones and copy-on-write
//! modifications: random access and update are effectively constant time,
//! push/pop on either end is amortized constant time, and concatenation of
//! two vectors is logarithmic in their combined length. Slicing a vector
//! produces a new vector that shares structure with the original, so taking
//! a million-element prefix costs a handful of node copies, not a million
//! element copies.
//!
//! The "relaxed" part is what makes concatenation and slicing cheap: unlike
//! a plain bitmapped vector trie, interior nodes are allowed to hold
//! children of uneven size, and carry a small table of cumulative sizes when
//! they do. Navigation below an even ("balanced") node is pure bit
//! arithmetic; at an uneven node it is a short search of the size table.
//!
//! [`Focus`] is a read cursor that caches the path to the most recently
//! accessed leaf, making clustered random access nearly free. [`Builder`]
//! assembles a vector from a stream of elements and spliced-in vectors.

// Not yet implemented (do we need them?)
// - insertion/deletion at arbitrary indices
// - mutable iteration

pub mod builder;
pub mod focus;
pub mod iter;
pub mod vector;

mod concat;
mod node;

/// [`Vector`] takes a "branching factor" parameter, which must be a
/// reasonably-sized power of two. We use this trait to enforce that.
pub trait ValidBranchingConstant {}
pub struct Const<const N: usize> {}

impl ValidBranchingConstant for Const<2> {}
impl ValidBranchingConstant for Const<4> {}
impl ValidBranchingConstant for Const<8> {}
impl ValidBranchingConstant for Const<16> {}
impl ValidBranchingConstant for Const<32> {}
impl ValidBranchingConstant for Const<64> {}
impl ValidBranchingConstant for Const<128> {}

pub use builder::Builder;
pub use focus::Focus;
pub use iter::{IntoIter, Iter, RevIter};
pub use vector::Vector;
