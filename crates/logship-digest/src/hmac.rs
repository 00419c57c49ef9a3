use crate::md5::{md5, Md5, BLOCK_SIZE};
use crate::Digest;

const INNER_PAD: u8 = 0x36;
const OUTER_PAD: u8 = 0x5c;

/// HMAC-MD5 of `message` under `key`.
///
/// Keys longer than one block are first reduced with the plain digest,
/// then zero-padded to a full block.
pub fn hmac_md5(key: &[u8], message: &[u8]) -> Digest {
    let mut key_block = [0u8; BLOCK_SIZE];
    if key.len() > BLOCK_SIZE {
        tracing::trace!(key_len = key.len(), "reducing oversized hmac key");
        let reduced = md5(key);
        key_block[..reduced.as_bytes().len()].copy_from_slice(reduced.as_bytes());
    } else {
        key_block[..key.len()].copy_from_slice(key);
    }

    let mut inner_block = [0u8; BLOCK_SIZE];
    let mut outer_block = [0u8; BLOCK_SIZE];
    for (i, byte) in key_block.iter().enumerate() {
        inner_block[i] = byte ^ INNER_PAD;
        outer_block[i] = byte ^ OUTER_PAD;
    }

    let mut inner = Md5::new();
    inner.update(&inner_block);
    inner.update(message);
    let inner = inner.finalize();

    let mut outer = Md5::new();
    outer.update(&outer_block);
    outer.update(inner.as_bytes());
    outer.finalize()
}
