//! Keyed and unkeyed 128-bit digests used to sign log submissions.
//!
//! Two modes are provided:
//! - [`md5`]: the plain MD5 digest over a byte string
//! - [`hmac_md5`]: HMAC-MD5 message authentication with a secret key
//!
//! Text inputs are always digested as their UTF-8 bytes. Both modes are
//! total: any input produces a digest, nothing here can fail.

pub mod hmac;
pub mod md5;

use std::fmt;

pub use hmac::hmac_md5;
pub use md5::{md5, Md5, BLOCK_SIZE, DIGEST_SIZE};

/// A 128-bit digest value.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; DIGEST_SIZE]);

impl Digest {
    /// Wrap raw digest bytes.
    pub const fn from_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }

    /// The raw 16 digest bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }

    /// Lowercase hexadecimal rendering (always 32 characters).
    pub fn to_hex(&self) -> String {
        const HEX: &[u8; 16] = b"0123456789abcdef";
        let mut out = String::with_capacity(DIGEST_SIZE * 2);
        for byte in self.0 {
            out.push(HEX[(byte >> 4) as usize] as char);
            out.push(HEX[(byte & 0x0F) as usize] as char);
        }
        out
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Requested rendering of a digest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Output {
    /// Lowercase hexadecimal text.
    #[default]
    Hex,
    /// The 16 raw digest bytes.
    Raw,
}

/// A rendered digest, as produced by [`digest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Hex(String),
    Raw([u8; DIGEST_SIZE]),
}

impl Rendered {
    /// Rendered length: 32 for hex, 16 for raw.
    pub fn len(&self) -> usize {
        match self {
            Rendered::Hex(hex) => hex.len(),
            Rendered::Raw(raw) => raw.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Digest `input`, keyed when a non-empty `key` is supplied.
///
/// An absent or empty key selects the plain digest, matching the way
/// collectors verify unsigned submissions.
pub fn digest(input: &str, key: Option<&str>, output: Output) -> Rendered {
    let value = match key {
        Some(key) if !key.is_empty() => hmac_md5(key.as_bytes(), input.as_bytes()),
        _ => md5(input.as_bytes()),
    };
    match output {
        Output::Hex => Rendered::Hex(value.to_hex()),
        Output::Raw => Rendered::Raw(*value.as_bytes()),
    }
}

/// Hex digest of `input`, keyed when `key` is non-empty.
pub fn hex_digest(input: &str, key: Option<&str>) -> String {
    match digest(input, key, Output::Hex) {
        Rendered::Hex(hex) => hex,
        Rendered::Raw(raw) => Digest::from_bytes(raw).to_hex(),
    }
}
