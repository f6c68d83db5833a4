use sha2::{Digest, Sha256};

use crate::simple_merkle::tree::MerkleHash;

/// The length of a hash in bytes
pub const HASH_LEN: usize = 32;

/// A domain separator indicating that a node is a leaf
pub const LEAF_DOMAIN_SEPARATOR: [u8; 1] = [0u8];
/// A domain separator indicating that a node is internal
pub const INTERNAL_NODE_DOMAIN_SEPARATOR: [u8; 1] = [1u8];
/// A domain separator reserved for padding leaves. No leaf or internal node preimage starts with it.
pub const PADDING_DOMAIN_SEPARATOR: [u8; 1] = [2u8];

fn hash(parts: &[&[u8]]) -> [u8; HASH_LEN] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// A sha256 hasher. For trees whose size is a power of two, roots are compatible
/// with [Tendermint merkle hash](https://github.com/informalsystems/tendermint-rs/blob/979456c9f33463944f97f7ea3900640e59f7ea6d/tendermint/src/merkle.rs)
/// and RFC 6962.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sha2Hasher;

impl Sha2Hasher {
    /// Create a new instance of the hasher
    pub fn new() -> Self {
        Sha2Hasher
    }
}

impl MerkleHash for Sha2Hasher {
    type Output = [u8; HASH_LEN];

    fn hash_leaf(&self, data: &[u8]) -> Self::Output {
        hash(&[LEAF_DOMAIN_SEPARATOR.as_slice(), data])
    }

    fn hash_nodes(&self, left: &Self::Output, right: &Self::Output) -> Self::Output {
        hash(&[
            INTERNAL_NODE_DOMAIN_SEPARATOR.as_slice(),
            left.as_slice(),
            right.as_slice(),
        ])
    }

    fn hash_padding(&self) -> Self::Output {
        hash(&[PADDING_DOMAIN_SEPARATOR.as_slice()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_separation() {
        let hasher = Sha2Hasher::new();
        assert_ne!(hasher.hash_leaf(b""), hasher.hash_padding());
        assert_ne!(hasher.hash_leaf(&PADDING_DOMAIN_SEPARATOR), hasher.hash_padding());

        let a = hasher.hash_leaf(b"a");
        let b = hasher.hash_leaf(b"b");
        assert_ne!(hasher.hash_nodes(&a, &b), hasher.hash_nodes(&b, &a));
    }

    #[test]
    fn test_empty_leaf_vector() {
        // sha256(0x00)
        assert_eq!(
            hex::encode(Sha2Hasher.hash_leaf(b"")),
            "6e340b9cffb37a989ca544e6bb780a2c78901d3fb33738768511a30617afa01d"
        );
    }
}
