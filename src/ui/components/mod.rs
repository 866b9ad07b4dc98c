// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Reusable egui components structured for MVU-style updates.

pub mod credential;
pub mod crop;
pub mod previews;
pub mod references;
pub mod toggle;
pub mod tools;

pub use toggle::toggle_switch;
