use super::proof::Side;

/// The number of leaves in a tree holding `leaf_count` real leaves, once padded to a power of two.
/// Returns `None` on overflow.
pub fn padded_len(leaf_count: usize) -> Option<usize> {
    leaf_count.checked_next_power_of_two()
}

/// The number of levels between the leaves and the root of a tree with `leaf_count` real leaves.
/// This is also the length of every inclusion proof in that tree.
pub fn compute_depth(leaf_count: usize) -> usize {
    match padded_len(leaf_count) {
        Some(len) => len.trailing_zeros() as usize,
        None => usize::BITS as usize,
    }
}

/// The side on which the sibling of the path node sits at the given level.
/// This trick works by interpreting the binary representation of the leaf index as a *path*
/// from the root: bit `level` is set exactly when the path node is a right child at that level,
/// which puts its sibling on the left.
pub fn sibling_side(leaf_index: usize, level: usize) -> Side {
    let shifted = u32::try_from(level)
        .ok()
        .and_then(|level| leaf_index.checked_shr(level))
        .unwrap_or(0);
    if shifted & 1 == 1 {
        Side::Left
    } else {
        Side::Right
    }
}
