//! Cryptographic commitment binding a logged paddle position to a seed.
//!
//! `commitment = SHA-256(seed[32] || LE32(index) || LE64(paddle_y))`. This is
//! the only place SHA-256 is used in the core; everything else is integer
//! arithmetic.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use sha2::{Digest, Sha256};

pub const SEED_LEN: usize = 32;
pub const COMMITMENT_LEN: usize = 32;

pub fn compute_commitment(seed: &[u8; SEED_LEN], index: u32, paddle_y_q16: i64) -> [u8; COMMITMENT_LEN] {
    let mut buf = [0u8; SEED_LEN + 4 + 8];
    buf[..SEED_LEN].copy_from_slice(seed);
    buf[SEED_LEN..SEED_LEN + 4].copy_from_slice(&index.to_le_bytes());
    buf[SEED_LEN + 4..].copy_from_slice(&paddle_y_q16.to_le_bytes());

    let mut hasher = Sha256::new();
    hasher.update(&buf);
    let digest = hasher.finalize();
    let mut out = [0u8; COMMITMENT_LEN];
    out.copy_from_slice(&digest);
    out
}

pub fn to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        s.push_str(&format!("{b:02x}"));
    }
    s
}

pub fn from_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    let mut out = Vec::with_capacity(s.len() / 2);
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let hi = (bytes[i] as char).to_digit(16)?;
        let lo = (bytes[i + 1] as char).to_digit(16)?;
        out.push(((hi << 4) | lo) as u8);
        i += 2;
    }
    Some(out)
}
