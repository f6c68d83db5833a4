use super::{
    error::ProofError,
    tree::MerkleHash,
    utils::{compute_depth, sibling_side},
};
use crate::maybestd::vec::Vec;

/// The position of a sibling relative to the node on the path from the leaf to the root.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(
    feature = "borsh",
    derive(borsh::BorshSerialize, borsh::BorshDeserialize)
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    /// The sibling is the left child, so it is hashed first
    Left,
    /// The sibling is the right child, so it is hashed second
    Right,
}

/// One level of an inclusion proof.
#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(
    feature = "borsh",
    derive(borsh::BorshSerialize, borsh::BorshDeserialize)
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sibling<H> {
    /// The digest of the sibling node
    pub hash: H,
    /// Which side of the path node the sibling sits on
    pub side: Side,
}

/// An inclusion proof for a single leaf of a merkle tree.
#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(
    feature = "borsh",
    derive(borsh::BorshSerialize, borsh::BorshDeserialize)
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Proof<M: MerkleHash> {
    /// The siblings to be used to build the path to the root, starting next to the leaf.
    pub siblings: Vec<Sibling<M::Output>>,
    /// The index of the proven leaf.
    pub leaf_index: u32,
}

impl<M: MerkleHash> Default for Proof<M> {
    fn default() -> Self {
        Self {
            siblings: Default::default(),
            leaf_index: 0,
        }
    }
}

impl<M> Proof<M>
where
    M: MerkleHash + Default,
{
    /// Verify that the leaf with the given digest is included under `root`
    pub fn verify(&self, root: &M::Output, leaf_hash: &M::Output) -> bool {
        self.verify_with_hasher(root, leaf_hash, &M::default())
    }

    /// Hash the raw leaf and verify that it is included under `root`
    pub fn verify_leaf(&self, root: &M::Output, raw_leaf: &[u8]) -> bool {
        let hasher = M::default();
        let leaf_hash = hasher.hash_leaf(raw_leaf);
        self.verify_with_hasher(root, &leaf_hash, &hasher)
    }
}

impl<M> Proof<M>
where
    M: MerkleHash,
{
    /// Verify that the leaf with the given digest is included under `root` at position `leaf_index`.
    ///
    /// The side tags must spell out `leaf_index`, so a proof carrying a forged index is rejected.
    /// A proof of the wrong length or with corrupted digests simply fails to match, so this cannot
    /// tell a malformed proof from a proof of some other leaf. Use [`Proof::check_shape`] first if
    /// that distinction matters.
    pub fn verify_with_hasher(&self, root: &M::Output, leaf_hash: &M::Output, hasher: &M) -> bool {
        if !self.path_matches_index() {
            log::debug!(
                "proof side tags do not match leaf index {}",
                self.leaf_index
            );
            return false;
        }
        let computed_root = self.compute_root(leaf_hash, hasher);
        if &computed_root != root {
            log::debug!(
                "proof for leaf {} does not match root: expected {:?}, computed {:?}",
                self.leaf_index,
                root,
                computed_root
            );
            return false;
        }
        true
    }

    /// Returns true if the side tags are exactly the bits of `leaf_index`, with no index bits left above the top level
    fn path_matches_index(&self) -> bool {
        let index = self.leaf_index as usize;
        let depth = self.siblings.len();
        if depth < usize::BITS as usize && index >> depth != 0 {
            return false;
        }
        self.siblings
            .iter()
            .enumerate()
            .all(|(level, sibling)| sibling.side == sibling_side(index, level))
    }

    /// Recompute the root implied by this proof for the leaf with the given digest
    pub fn compute_root(&self, leaf_hash: &M::Output, hasher: &M) -> M::Output {
        self.siblings
            .iter()
            .fold(leaf_hash.clone(), |current, sibling| match sibling.side {
                Side::Left => hasher.hash_nodes(&sibling.hash, &current),
                Side::Right => hasher.hash_nodes(&current, &sibling.hash),
            })
    }

    /// Check that this proof has the shape of an inclusion proof in a tree with `leaf_count` real leaves:
    /// the proven index exists, there is one sibling per level, and every side tag agrees with the index.
    pub fn check_shape(&self, leaf_count: usize) -> Result<(), ProofError> {
        let index = self.leaf_index as usize;
        if index >= leaf_count {
            return Err(ProofError::LeafIndexOutOfRange { index, leaf_count });
        }
        let expected = compute_depth(leaf_count);
        if self.siblings.len() != expected {
            return Err(ProofError::WrongLength {
                expected,
                actual: self.siblings.len(),
            });
        }
        for (level, sibling) in self.siblings.iter().enumerate() {
            if sibling.side != sibling_side(index, level) {
                return Err(ProofError::PathMismatch { level });
            }
        }
        Ok(())
    }

    /// Returns the siblings provided as part of the proof.
    pub fn siblings(&self) -> &[Sibling<M::Output>] {
        &self.siblings
    }

    /// Returns the sibling digests in order, without their side tags.
    pub fn digests(&self) -> impl Iterator<Item = &M::Output> {
        self.siblings.iter().map(|sibling| &sibling.hash)
    }

    /// Returns the index of the proven leaf.
    pub fn leaf_index(&self) -> u32 {
        self.leaf_index
    }

    /// Returns the number of levels covered by the proof.
    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    /// Returns true for the proof of a single-leaf tree, whose leaf is its own root.
    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }
}

/// Verify that the leaf with the given digest is included under `root`, using a default hasher
pub fn verify<M>(root: &M::Output, leaf_hash: &M::Output, proof: &Proof<M>) -> bool
where
    M: MerkleHash + Default,
{
    proof.verify(root, leaf_hash)
}
