use super::tree::{MerkleHash, MerkleTree, NodeRef};
use crate::maybestd::{fmt, vec::Vec};

/// Renders a tree one node per line, parents above their left then right subtrees.
///
/// ```ascii
/// |-- <root>
///     |-- <left child>
///         |-- ...
///     |-- <right child>
/// ```
pub struct TreeDisplay<'a, M: MerkleHash> {
    tree: &'a MerkleTree<M>,
}

impl<M: MerkleHash> MerkleTree<M> {
    /// Returns a renderer for the tree. Only meant for debugging.
    pub fn display(&self) -> TreeDisplay<'_, M> {
        TreeDisplay { tree: self }
    }
}

impl<M> fmt::Display for TreeDisplay<'_, M>
where
    M: MerkleHash,
    M::Output: AsRef<[u8]>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = self.tree.node(self.tree.root_id()).map_err(|_| fmt::Error)?;
        let mut stack: Vec<(NodeRef<'_, M>, usize)> = Vec::new();
        stack.push((root, 0));
        while let Some((node, level)) = stack.pop() {
            for _ in 0..level {
                f.write_str("    ")?;
            }
            write!(f, "|-- {}", hex::encode(node.hash()))?;
            if node.is_padding() {
                f.write_str(" (padding)")?;
            }
            f.write_str("\n")?;
            // Right first, so the left subtree is printed first
            if let Some(right) = node.right() {
                stack.push((right, level + 1));
            }
            if let Some(left) = node.left() {
                stack.push((left, level + 1));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{MerkleHash, MerkleTree, Sha2Hasher};

    #[test]
    fn test_display() {
        let tree: MerkleTree<Sha2Hasher> = MerkleTree::build(["a", "b", "c"]).unwrap();
        let rendered = tree.display().to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], format!("|-- {}", hex::encode(tree.root())));
        assert_eq!(
            lines[2],
            format!("        |-- {}", hex::encode(Sha2Hasher.hash_leaf(b"a")))
        );
        assert!(lines[6].ends_with(" (padding)"));
        assert_eq!(rendered.matches("(padding)").count(), 1);
    }
}
