#![no_main]

use bst::{Blake3Hasher, Bytes, Direction, Proof, ProofNode, Stem, TreeKey, B256};
use libfuzzer_sys::fuzz_target;

/// Fuzz proof verification with arbitrary proof data
/// Tests that malformed proofs don't cause panics
fuzz_target!(|data: &[u8]| {
    if data.len() < 33 {
        return;
    }

    let key = TreeKey::try_from_slice(&data[..32]).unwrap();
    let value_len = data[32] as usize % 40;
    let value = (value_len > 0 && data.len() >= 33 + value_len)
        .then(|| Bytes::copy_from_slice(&data[33..33 + value_len]));

    let mut path = Vec::new();
    let mut i = 33 + value_len;

    while i + 33 <= data.len() {
        let tag = data[i];
        let body = &data[i + 1..i + 33];
        match tag % 3 {
            0 => {
                let direction = if tag & 0x80 != 0 {
                    Direction::Right
                } else {
                    Direction::Left
                };
                path.push(ProofNode::Internal {
                    sibling: B256::from_slice(body),
                    direction,
                });
                i += 33;
            }
            1 => {
                let Ok(stem) = Stem::try_from_slice(&body[..31]) else {
                    return;
                };
                path.push(ProofNode::Extension {
                    stem,
                    subtree_root: B256::repeat_byte(body[31]),
                });
                i += 33;
            }
            2 => {
                let Ok(stem) = Stem::try_from_slice(&body[..31]) else {
                    return;
                };
                path.push(ProofNode::Stem {
                    stem,
                    subtree_siblings: [B256::repeat_byte(body[31]); 8],
                });
                i += 33;
            }
            _ => unreachable!(),
        }
    }

    let proof = Proof::new(key, value, path);
    let _ = proof.verify(&Blake3Hasher, &B256::ZERO);
    let _ = proof.size();
});
