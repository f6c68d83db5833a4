use core::sync::atomic::{AtomicUsize, Ordering};

use super::arena::{LeafWithHash, Node, NodeArena, NodeIndex};
use super::error::{LeafError, MerkleError};
use super::proof::{Proof, Side, Sibling};
use super::utils::{compute_depth, padded_len};
use crate::maybestd::{fmt::Debug, hash::Hash, vec::Vec};

/// The largest number of leaves (including padding) a tree may hold. Keeps every node index within a `u32`.
pub const MAX_LEAVES: usize = 1 << 31;

/// Pads `leaf_count` to a power of two, failing if the result would not fit in a tree.
fn checked_padded_len(leaf_count: usize) -> Result<usize, MerkleError> {
    padded_len(leaf_count)
        .filter(|len| *len <= MAX_LEAVES)
        .ok_or(MerkleError::TooManyLeaves(leaf_count))
}

/// A trait for hashing data into a merkle tree
pub trait MerkleHash {
    /// The output of this hasher.
    #[cfg(all(not(feature = "serde"), not(feature = "borsh")))]
    type Output: Debug + PartialEq + Eq + Clone + Default + Hash + Ord;

    /// The output of this hasher.
    #[cfg(all(feature = "serde", not(feature = "borsh")))]
    type Output: Debug
        + PartialEq
        + Eq
        + Clone
        + Default
        + Hash
        + Ord
        + serde::Serialize
        + serde::de::DeserializeOwned;

    /// The output of this hasher.
    #[cfg(all(not(feature = "serde"), feature = "borsh"))]
    type Output: Debug
        + PartialEq
        + Eq
        + Clone
        + Default
        + Hash
        + Ord
        + borsh::BorshSerialize
        + borsh::BorshDeserialize;

    /// The output of this hasher.
    #[cfg(all(feature = "serde", feature = "borsh"))]
    type Output: Debug
        + PartialEq
        + Eq
        + Clone
        + Default
        + Hash
        + Ord
        + serde::Serialize
        + serde::de::DeserializeOwned
        + borsh::BorshSerialize
        + borsh::BorshDeserialize;

    /// Hashes data as a "leaf" of the tree. This operation *should* be domain separated.
    fn hash_leaf(&self, data: &[u8]) -> Self::Output;
    /// Hashes two digests into one. This operation *should* be domain separated, and
    /// `hash_nodes(a, b)` should differ from `hash_nodes(b, a)`.
    fn hash_nodes(&self, l: &Self::Output, r: &Self::Output) -> Self::Output;
    /// The digest given to the leaves which pad the tree to a power of two. This digest must
    /// not be reachable through `hash_leaf`.
    fn hash_padding(&self) -> Self::Output;
}

/// Distinguishes the trees of one process, so that a [`NodeId`] can't be used on a tree that didn't issue it.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct TreeId(usize);

impl TreeId {
    fn next() -> Self {
        static NEXT_TREE_ID: AtomicUsize = AtomicUsize::new(0);
        TreeId(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A handle to a node of a particular [`MerkleTree`].
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct NodeId {
    tree: TreeId,
    index: NodeIndex,
}

impl NodeId {
    /// The position of the node in its tree's arena. Leaves come first, in input order.
    pub fn index(&self) -> NodeIndex {
        self.index
    }

    /// The tree which issued this handle
    pub fn tree(&self) -> TreeId {
        self.tree
    }
}

/// A borrowed view of one node, allowing navigation of the tree.
pub struct NodeRef<'a, M: MerkleHash> {
    tree: &'a MerkleTree<M>,
    id: NodeId,
    node: &'a Node<M::Output>,
}

impl<'a, M: MerkleHash> NodeRef<'a, M> {
    /// The handle of this node
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The digest of this node
    pub fn hash(&self) -> &'a M::Output {
        &self.node.hash
    }

    /// Returns true if the node has no children
    pub fn is_leaf(&self) -> bool {
        self.node.children.is_none()
    }

    /// Returns true if the node is a leaf which was added to pad the tree
    pub fn is_padding(&self) -> bool {
        self.is_leaf() && self.id.index as usize >= self.tree.leaf_count()
    }

    /// Returns true if this node is the root of the tree
    pub fn is_root(&self) -> bool {
        self.node.parent.is_none()
    }

    /// The parent of this node, or `None` at the root
    pub fn parent(&self) -> Option<NodeRef<'a, M>> {
        self.node.parent.and_then(|idx| self.tree.node_at(idx))
    }

    /// The left child of this node, or `None` for a leaf
    pub fn left(&self) -> Option<NodeRef<'a, M>> {
        self.node
            .children
            .and_then(|(left, _)| self.tree.node_at(left))
    }

    /// The right child of this node, or `None` for a leaf
    pub fn right(&self) -> Option<NodeRef<'a, M>> {
        self.node
            .children
            .and_then(|(_, right)| self.tree.node_at(right))
    }
}

/// A perfect binary merkle tree, built once from an ordered set of leaves and read-only afterwards.
///
/// The leaf set is padded to the next power of two with leaves carrying [`MerkleHash::hash_padding`],
/// so every internal node has exactly two children. The number of real leaves is tracked alongside the
/// padding, and no proof is ever issued for a padding leaf.
///
/// Example: a tree with leaves [C, D, E] is padded with one leaf P
/// ```ascii
///          root
///        /      \
///       A        B
///      / \      /  \
///     C   D    E    P
///
/// ```
pub struct MerkleTree<M>
where
    M: MerkleHash,
{
    id: TreeId,
    leaves: Vec<LeafWithHash<M>>,
    nodes: NodeArena<M::Output>,
    root: NodeIndex,
    root_hash: M::Output,
    padded_len: usize,
    hasher: M,
}

impl<M> MerkleTree<M>
where
    M: MerkleHash + Default,
{
    /// Builds a tree over the given leaves with a default hasher
    pub fn build<I, B>(raw_leaves: I) -> Result<Self, MerkleError>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        Self::build_with_hasher(raw_leaves, Default::default())
    }
}

impl<M> MerkleTree<M>
where
    M: MerkleHash,
{
    /// Builds a tree over the given leaves with the given hasher. Fails if there are no leaves.
    pub fn build_with_hasher<I, B>(raw_leaves: I, hasher: M) -> Result<Self, MerkleError>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let leaves: Vec<LeafWithHash<M>> = raw_leaves
            .into_iter()
            .map(|raw| LeafWithHash::with_hasher(raw.as_ref(), &hasher))
            .collect();
        if leaves.is_empty() {
            return Err(MerkleError::EmptyInput);
        }
        let padded_len = checked_padded_len(leaves.len())?;

        let mut nodes = NodeArena::with_capacity(padded_len + (padded_len - 1));
        let mut level: Vec<NodeIndex> = Vec::with_capacity(padded_len);
        for leaf in leaves.iter() {
            level.push(nodes.push_leaf(leaf.hash().clone()));
        }
        let padding = hasher.hash_padding();
        while level.len() < padded_len {
            level.push(nodes.push_leaf(padding.clone()));
        }

        // Each pass consumes the current level in pairs, left to right
        let mut height = 0;
        while level.len() > 1 {
            let mut next_level = Vec::with_capacity(level.len() / 2);
            for pair in level.chunks_exact(2) {
                let (left, right) = (pair[0], pair[1]);
                let hash = match (nodes.get(left), nodes.get(right)) {
                    (Some(l), Some(r)) => hasher.hash_nodes(&l.hash, &r.hash),
                    _ => return Err(MerkleError::MalformedTree),
                };
                next_level.push(nodes.push_parent(hash, left, right));
            }
            height += 1;
            log::trace!("built level {} with {} nodes", height, next_level.len());
            level = next_level;
        }
        let root = level[0];
        let root_hash = nodes
            .get(root)
            .map(|node| node.hash.clone())
            .ok_or(MerkleError::MalformedTree)?;

        log::debug!(
            "built merkle tree with {} leaves ({} after padding), depth {}",
            leaves.len(),
            padded_len,
            height
        );

        Ok(Self {
            id: TreeId::next(),
            leaves,
            nodes,
            root,
            root_hash,
            padded_len,
            hasher,
        })
    }

    /// Returns the root of the tree
    pub fn root(&self) -> &M::Output {
        &self.root_hash
    }

    /// Returns a handle to the root node
    pub fn root_id(&self) -> NodeId {
        self.node_id(self.root)
    }

    /// Returns the number of real (non-padding) leaves
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Returns the number of leaves after padding. Always a power of two.
    pub fn padded_len(&self) -> usize {
        self.padded_len
    }

    /// Returns the number of levels between the leaves and the root, which is also the length of every proof
    pub fn depth(&self) -> usize {
        compute_depth(self.leaf_count())
    }

    /// Returns all real leaves in the tree
    pub fn leaves(&self) -> &[LeafWithHash<M>] {
        &self.leaves[..]
    }

    /// Returns the real leaf at the given index
    pub fn get_leaf(&self, idx: usize) -> Result<&LeafWithHash<M>, MerkleError> {
        self.leaves.get(idx).ok_or_else(|| {
            MerkleError::InvalidLeaf(LeafError::IndexOutOfRange {
                index: idx,
                leaf_count: self.leaf_count(),
            })
        })
    }

    /// Returns the hasher used by this tree
    pub fn hasher(&self) -> &M {
        &self.hasher
    }

    /// Returns a handle to the leaf built from the input at the given index
    pub fn leaf_id(&self, idx: usize) -> Result<NodeId, MerkleError> {
        self.get_leaf(idx)?;
        Ok(self.node_id(idx as NodeIndex))
    }

    /// Looks up a node by handle
    pub fn node(&self, id: NodeId) -> Result<NodeRef<'_, M>, MerkleError> {
        if id.tree != self.id {
            return Err(LeafError::ForeignTree.into());
        }
        self.node_at(id.index).ok_or(MerkleError::MalformedTree)
    }

    fn node_at(&self, idx: NodeIndex) -> Option<NodeRef<'_, M>> {
        let node = self.nodes.get(idx)?;
        Some(NodeRef {
            tree: self,
            id: self.node_id(idx),
            node,
        })
    }

    fn node_id(&self, index: NodeIndex) -> NodeId {
        NodeId {
            tree: self.id,
            index,
        }
    }

    /// Creates an inclusion proof for the given leaf by walking its parent links up to the root.
    /// At each level the proof records the digest of the node's sibling and the side it sits on,
    /// ordered from the leaf's immediate sibling up to the last sibling below the root.
    ///
    /// Example: consider the following merkle tree with leaves [C, D, E, F]
    /// ```ascii
    ///          root
    ///        /      \
    ///       A        B
    ///      / \      /  \
    ///     C   D    E    F
    ///
    /// ```
    ///
    /// The proof for D is [(C, Left), (B, Right)].
    pub fn generate_proof(&self, leaf: NodeId) -> Result<Proof<M>, MerkleError> {
        let start = self.node(leaf)?;
        if !start.is_leaf() {
            return Err(LeafError::NotALeaf.into());
        }
        if start.is_padding() {
            return Err(LeafError::PaddingLeaf.into());
        }

        let mut siblings = Vec::with_capacity(self.depth());
        let mut current = leaf.index;
        let mut parent = start.node.parent;
        while let Some(parent_idx) = parent {
            let parent_node = self.nodes.get(parent_idx).ok_or(MerkleError::MalformedTree)?;
            let (sibling_idx, side) = match parent_node.children {
                Some((left, right)) if left == current => (right, Side::Right),
                Some((left, right)) if right == current => (left, Side::Left),
                _ => return Err(MerkleError::MalformedTree),
            };
            let sibling = self.nodes.get(sibling_idx).ok_or(MerkleError::MalformedTree)?;
            siblings.push(Sibling {
                hash: sibling.hash.clone(),
                side,
            });
            current = parent_idx;
            parent = parent_node.parent;
        }

        log::trace!(
            "generated proof with {} siblings for leaf {}",
            siblings.len(),
            leaf.index
        );
        Ok(Proof {
            siblings,
            leaf_index: leaf.index,
        })
    }

    /// Creates an inclusion proof for the leaf built from the input at the given index
    pub fn prove_index(&self, idx: usize) -> Result<Proof<M>, MerkleError> {
        self.generate_proof(self.leaf_id(idx)?)
    }

    /// Fetches the leaf at the given index, along with a proof of inclusion.
    pub fn get_index_with_proof(&self, idx: usize) -> Result<(&[u8], Proof<M>), MerkleError> {
        let proof = self.prove_index(idx)?;
        Ok((self.leaves[idx].data(), proof))
    }
}

impl<M> Clone for MerkleTree<M>
where
    M: MerkleHash + Clone,
{
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            leaves: self.leaves.clone(),
            nodes: self.nodes.clone(),
            root: self.root,
            root_hash: self.root_hash.clone(),
            padded_len: self.padded_len,
            hasher: self.hasher.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sha2Hasher;

    fn tree_with_n_leaves(n: usize) -> MerkleTree<Sha2Hasher> {
        MerkleTree::build((0..n).map(|i| (i as u64).to_be_bytes())).unwrap()
    }

    #[test]
    fn test_tree() {
        let blocks = (1..17u8).map(|i| [i]);
        let tree: MerkleTree<Sha2Hasher> = MerkleTree::build(blocks).unwrap();
        assert_eq!(
            hex::encode(tree.root()),
            "451f071b539a1b912ead47ff3ba769147903a3a23a1d466f93656f4933934ca8"
        );
        let (data, proof) = tree.get_index_with_proof(2).unwrap();
        assert_eq!(data, &[3]);
        assert_eq!(proof.siblings().len(), 4);
        assert!(proof.verify(tree.root(), tree.leaves()[2].hash()));
    }

    #[test]
    fn test_empty_input() {
        let blocks: Vec<Vec<u8>> = Vec::new();
        let res = MerkleTree::<Sha2Hasher>::build(blocks);
        assert_eq!(res.err(), Some(MerkleError::EmptyInput));
    }

    #[test]
    fn test_single_leaf() {
        let tree: MerkleTree<Sha2Hasher> = MerkleTree::build(["a"]).unwrap();
        assert_eq!(tree.padded_len(), 1);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.root(), &Sha2Hasher.hash_leaf(b"a"));
        assert!(tree.root_id() == tree.leaf_id(0).unwrap());

        let proof = tree.prove_index(0).unwrap();
        assert!(proof.siblings().is_empty());
        assert!(proof.verify(tree.root(), &Sha2Hasher.hash_leaf(b"a")));
    }

    #[test]
    fn test_padding_shape() {
        for (n, padded, depth) in [(2, 2, 1), (3, 4, 2), (4, 4, 2), (5, 8, 3), (9, 16, 4)] {
            let tree = tree_with_n_leaves(n);
            assert_eq!(tree.leaf_count(), n);
            assert_eq!(tree.padded_len(), padded);
            assert_eq!(tree.depth(), depth);
            assert_eq!(tree.nodes.len(), 2 * padded - 1);
            assert_eq!(tree.prove_index(n - 1).unwrap().siblings().len(), depth);
            for i in 0..n {
                let id = tree.leaf_id(i).unwrap();
                assert_eq!(id.index() as usize, i);
                assert_eq!(id.tree(), tree.root_id().tree());
            }
            assert_eq!(tree.root_id().index() as usize, 2 * padded - 2);
        }
    }

    #[test]
    fn test_leaf_limit() {
        assert_eq!(checked_padded_len(MAX_LEAVES), Ok(MAX_LEAVES));
        assert_eq!(checked_padded_len(MAX_LEAVES - 1), Ok(MAX_LEAVES));
        assert_eq!(
            checked_padded_len(MAX_LEAVES + 1),
            Err(MerkleError::TooManyLeaves(MAX_LEAVES + 1))
        );
        assert_eq!(
            checked_padded_len(usize::MAX),
            Err(MerkleError::TooManyLeaves(usize::MAX))
        );
    }

    #[test]
    fn test_leaf_bytes_share_data() {
        let tree = tree_with_n_leaves(3);
        let leaf = tree.get_leaf(1).unwrap();
        assert_eq!(&leaf.bytes()[..], leaf.data());
        assert_eq!(&leaf.bytes()[..], &1u64.to_be_bytes());
    }

    #[test]
    fn test_links_are_consistent() {
        let tree = tree_with_n_leaves(6);
        let root = tree.node(tree.root_id()).unwrap();
        assert!(root.is_root());
        assert!(root.parent().is_none());

        let mut stack = vec![root];
        let mut visited = 0;
        while let Some(node) = stack.pop() {
            visited += 1;
            match (node.left(), node.right()) {
                (Some(left), Some(right)) => {
                    assert_eq!(
                        node.hash(),
                        &Sha2Hasher.hash_nodes(left.hash(), right.hash())
                    );
                    assert_eq!(left.parent().map(|p| p.id()), Some(node.id()));
                    assert_eq!(right.parent().map(|p| p.id()), Some(node.id()));
                    stack.push(left);
                    stack.push(right);
                }
                (None, None) => assert!(node.is_leaf()),
                _ => panic!("internal node with a single child"),
            }
        }
        assert_eq!(visited, 15);
    }

    #[test]
    fn test_padding_leaves() {
        let tree = tree_with_n_leaves(3);
        let padding = tree.node_at(3).unwrap();
        assert!(padding.is_leaf());
        assert!(padding.is_padding());
        assert_eq!(padding.hash(), &Sha2Hasher.hash_padding());
        assert!(!tree.node_at(2).unwrap().is_padding());
    }

    #[test]
    fn test_rejects_invalid_leaves() {
        let tree = tree_with_n_leaves(3);
        let other = tree_with_n_leaves(3);

        let foreign = other.leaf_id(0).unwrap();
        assert_ne!(foreign.tree(), tree.leaf_id(0).unwrap().tree());
        assert_eq!(
            tree.generate_proof(foreign).err(),
            Some(MerkleError::InvalidLeaf(LeafError::ForeignTree))
        );
        assert_eq!(
            tree.generate_proof(tree.root_id()).err(),
            Some(MerkleError::InvalidLeaf(LeafError::NotALeaf))
        );
        assert_eq!(
            tree.generate_proof(tree.node_id(3)).err(),
            Some(MerkleError::InvalidLeaf(LeafError::PaddingLeaf))
        );
        assert_eq!(
            tree.prove_index(3).err(),
            Some(MerkleError::InvalidLeaf(LeafError::IndexOutOfRange {
                index: 3,
                leaf_count: 3
            }))
        );
    }

    #[test]
    fn test_clone_shares_identity() {
        let tree = tree_with_n_leaves(4);
        let copy = tree.clone();
        let leaf = tree.leaf_id(1).unwrap();
        assert_eq!(copy.generate_proof(leaf), tree.generate_proof(leaf));
    }
}
