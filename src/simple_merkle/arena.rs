use bytes::Bytes;

use super::tree::MerkleHash;
use crate::maybestd::{fmt, vec::Vec};

/// The position of a node inside a tree's [`NodeArena`].
pub type NodeIndex = u32;

/// A single vertex of the tree. Links are indices into the owning arena.
#[derive(PartialEq, Clone, Debug)]
pub struct Node<H> {
    /// The digest of this node
    pub hash: H,
    /// The left and right children. `None` exactly for leaves.
    pub children: Option<(NodeIndex, NodeIndex)>,
    /// The parent. `None` exactly for the root.
    pub parent: Option<NodeIndex>,
}

impl<H> Node<H> {
    fn new(hash: H) -> Self {
        Self {
            hash,
            children: None,
            parent: None,
        }
    }
}

/// Owns every node of a tree. Nodes are only ever appended, and only while the tree is being built.
#[derive(Clone, Debug)]
pub struct NodeArena<H>(Vec<Node<H>>);

impl<H> NodeArena<H> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Appends a childless node and returns its index
    pub(crate) fn push_leaf(&mut self, hash: H) -> NodeIndex {
        let idx = self.0.len() as NodeIndex;
        self.0.push(Node::new(hash));
        idx
    }

    /// Appends a parent of the two given nodes and links them to it
    pub(crate) fn push_parent(&mut self, hash: H, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        let idx = self.0.len() as NodeIndex;
        let mut parent = Node::new(hash);
        parent.children = Some((left, right));
        self.0.push(parent);
        self.0[left as usize].parent = Some(idx);
        self.0[right as usize].parent = Some(idx);
        idx
    }

    /// Returns the node at the given index
    pub fn get(&self, idx: NodeIndex) -> Option<&Node<H>> {
        self.0.get(idx as usize)
    }

    /// Returns the number of nodes, including padding leaves
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no node was ever pushed
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A real (non-padding) leaf along with its digest.
pub struct LeafWithHash<M: MerkleHash> {
    data: Bytes,
    hash: M::Output,
}

impl<M: MerkleHash> LeafWithHash<M> {
    /// Create a new leaf with the provided hasher
    pub fn with_hasher(data: &[u8], hasher: &M) -> Self {
        let hash = hasher.hash_leaf(data);
        Self {
            data: Bytes::copy_from_slice(data),
            hash,
        }
    }

    /// Returns the raw data of the leaf
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns a handle to the raw data which shares its allocation with the tree
    pub fn bytes(&self) -> Bytes {
        self.data.clone()
    }

    /// Returns the digest of the leaf
    pub fn hash(&self) -> &M::Output {
        &self.hash
    }
}

impl<M: MerkleHash> Clone for LeafWithHash<M> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            hash: self.hash.clone(),
        }
    }
}

impl<M: MerkleHash> fmt::Debug for LeafWithHash<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafWithHash")
            .field("data", &self.data)
            .field("hash", &self.hash)
            .finish()
    }
}
