// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Domain layer: pure data types shared between the UI and the editing logic.

pub mod artifact;
pub mod credential;
pub mod crop;
pub mod history;
pub mod hotspot;
