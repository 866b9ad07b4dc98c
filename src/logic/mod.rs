// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Editing logic: cropping, prompt construction, the generation client and
//! the reference store.

pub mod crop;
pub mod generation;
pub mod prompts;
pub mod references;

/// Milliseconds since the Unix epoch, used to make artifact names unique.
pub fn unix_millis() -> i128 {
    time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000
}
