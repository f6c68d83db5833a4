use crate::simple_merkle::tree::MerkleHash;

/// Wraps a hasher so that internal nodes hash their children in ascending order of digest,
/// rather than in tree order.
///
/// This turns the tree into an order-independent accumulator: `hash_nodes(a, b) == hash_nodes(b, a)`,
/// so swapping any two sibling subtrees leaves the root unchanged, and a proof still verifies when its
/// side tags and `leaf_index` are mirrored to claim another position. Inclusion is still proven, but
/// the *position* of the leaf is not. Only use this to interoperate with sorted-pair trees; prefer the
/// inner hasher directly otherwise.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SortedPairHasher<M>(pub M);

impl<M> SortedPairHasher<M> {
    /// Wrap the given hasher
    pub fn new(inner: M) -> Self {
        Self(inner)
    }

    /// Returns the wrapped hasher
    pub fn inner(&self) -> &M {
        &self.0
    }
}

impl<M: MerkleHash> MerkleHash for SortedPairHasher<M> {
    type Output = M::Output;

    fn hash_leaf(&self, data: &[u8]) -> Self::Output {
        self.0.hash_leaf(data)
    }

    fn hash_nodes(&self, l: &Self::Output, r: &Self::Output) -> Self::Output {
        if l <= r {
            self.0.hash_nodes(l, r)
        } else {
            self.0.hash_nodes(r, l)
        }
    }

    fn hash_padding(&self) -> Self::Output {
        self.0.hash_padding()
    }
}
