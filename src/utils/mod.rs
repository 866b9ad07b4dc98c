// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Shared helper utilities reused by UI and editing logic.

pub mod file_name;
pub mod hash;

/// Sanitize artifact names into download file names.
pub use file_name::{ensure_extension, suggested_download_name};
/// Compute the SHA-256 hash of a byte slice.
pub use hash::hash_bytes;
