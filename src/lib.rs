#![cfg_attr(not(feature = "std"), no_std)]
//! This crate implements a perfect binary merkle tree with positional inclusion proofs.
//!
//! A tree is built once from an ordered list of byte blocks. The block count is padded up to a power
//! of two with an out-of-band padding digest, so every internal node has exactly two children. Any
//! real leaf can then be proven, and a proof can be checked against a root digest by anyone holding
//! the same hasher, without the rest of the data.
//!
//! ```
//! use pmt_rs::{DefaultMerkleTree, MerkleHash, Sha2Hasher};
//!
//! let tree = DefaultMerkleTree::build(["a", "b", "c"]).unwrap();
//! let proof = tree.prove_index(1).unwrap();
//! assert!(proof.verify(tree.root(), &Sha2Hasher.hash_leaf(b"b")));
//! ```

#[cfg(not(feature = "std"))]
extern crate alloc;

mod maybestd {
    #[cfg(not(feature = "std"))]
    pub use alloc::vec;
    #[cfg(feature = "std")]
    pub use std::vec;

    pub use core::{fmt, hash};
}

mod sha2_hash;
pub mod simple_merkle;
mod sorted_hash;

pub use sha2_hash::{
    Sha2Hasher, HASH_LEN, INTERNAL_NODE_DOMAIN_SEPARATOR, LEAF_DOMAIN_SEPARATOR,
    PADDING_DOMAIN_SEPARATOR,
};
pub use simple_merkle::{
    arena::LeafWithHash,
    display::TreeDisplay,
    error::{LeafError, MerkleError, ProofError},
    proof::{verify, Proof, Side, Sibling},
    tree::{MerkleHash, MerkleTree, NodeId, NodeRef, TreeId, MAX_LEAVES},
};
pub use sorted_hash::SortedPairHasher;

/// A merkle tree using the sha256 hasher
pub type DefaultMerkleTree = MerkleTree<Sha2Hasher>;
