use thiserror::Error;

/// An error that occurred while building a tree or requesting a proof from it.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
pub enum MerkleError {
    /// A tree needs at least one leaf. No power-of-two padding target exists for zero leaves.
    #[error("cannot build a merkle tree from an empty set of leaves")]
    EmptyInput,
    /// The padded leaf count would exceed [`MAX_LEAVES`](super::tree::MAX_LEAVES)
    #[error("too many leaves: {0}")]
    TooManyLeaves(usize),
    /// The requested leaf cannot be proven against this tree
    #[error("invalid leaf: {0}")]
    InvalidLeaf(LeafError),
    /// The node arena is missing a link that every built tree has
    #[error("malformed tree")]
    MalformedTree,
}

impl From<LeafError> for MerkleError {
    fn from(err: LeafError) -> Self {
        MerkleError::InvalidLeaf(err)
    }
}

/// The reason a leaf handle or index was rejected.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
pub enum LeafError {
    /// The index is past the last real leaf
    #[error("leaf index {index} out of range for a tree with {leaf_count} leaves")]
    IndexOutOfRange {
        /// The requested index
        index: usize,
        /// The number of real leaves in the tree
        leaf_count: usize,
    },
    /// The handle was issued by a different tree
    #[error("node belongs to a different tree")]
    ForeignTree,
    /// The handle names an internal node
    #[error("node is not a leaf")]
    NotALeaf,
    /// The handle names a leaf that was added to pad the tree
    #[error("node is a padding leaf")]
    PaddingLeaf,
}

/// A structural defect found when checking a proof against an expected tree size.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
pub enum ProofError {
    /// The proven index does not exist in a tree of the expected size
    #[error("leaf index {index} out of range for a tree with {leaf_count} leaves")]
    LeafIndexOutOfRange {
        /// The index carried by the proof
        index: usize,
        /// The expected number of real leaves
        leaf_count: usize,
    },
    /// The proof does not have one sibling per level
    #[error("expected {expected} siblings, found {actual}")]
    WrongLength {
        /// The depth of a tree with the expected leaf count
        expected: usize,
        /// The number of siblings in the proof
        actual: usize,
    },
    /// A sibling's side tag disagrees with the path implied by the leaf index
    #[error("sibling at level {level} is on the wrong side")]
    PathMismatch {
        /// The level (0 being the leaves) of the offending sibling
        level: usize,
    },
}
