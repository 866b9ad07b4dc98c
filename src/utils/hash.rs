// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Content hashing helpers.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of a byte slice as lowercase hex.
///
/// Used to recognise identical images, e.g. when the same reference face is
/// added twice.
pub fn hash_bytes(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
