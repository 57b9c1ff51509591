#![no_main]

use bst::{BinaryStateTree, Blake3Hasher, TreeKey};
use libfuzzer_sys::fuzz_target;

/// Fuzz arbitrary tree operations
/// Each record is `op || key (32) || len || value (len % 40 bytes)`. No
/// sequence may panic, and every proof produced along the way must verify.
fuzz_target!(|data: &[u8]| {
    let mut tree: BinaryStateTree<Blake3Hasher> = BinaryStateTree::new();
    let mut rest = data;

    while rest.len() >= 34 {
        let op = rest[0];
        let key_bytes = &rest[1..33];
        let value_len = (rest[33] as usize % 40).min(rest.len() - 34);
        let value = &rest[34..34 + value_len];
        rest = &rest[34 + value_len..];

        match op % 4 {
            0 => {
                // Raw insert, empty values must be rejected
                let result = tree.insert_slice(key_bytes, value);
                assert_eq!(result.is_err(), value.is_empty());
            }
            1 => {
                let _ = tree.get(&TreeKey::try_from_slice(key_bytes).unwrap());
            }
            2 => {
                let key = TreeKey::try_from_slice(key_bytes).unwrap();
                let proof = tree.prove(&key);
                assert!(proof.verify(tree.hasher(), &tree.merkelize()).unwrap());
            }
            3 => {
                // Truncated keys never reach the tree
                assert!(tree.insert_slice(&key_bytes[..op as usize % 32], b"v").is_err());
            }
            _ => unreachable!(),
        }
    }

    let _ = tree.merkelize();
});
