//! Implements a perfect binary merkle tree over an arena of nodes, padded to a power of two,
//! with positional inclusion proofs.

/// Defines the node arena which owns every node of a tree.
pub mod arena;
/// Renders a tree for human inspection.
pub mod display;
/// Defines errors that might arise while building trees and checking proofs.
pub mod error;
/// Defines proofs on the tree.
pub mod proof;
/// Defines the merkle tree itself.
pub mod tree;
/// Utilities for computing facts about trees from their sizes and leaf indices.
pub mod utils;
