// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Filesystem-safe names for exported images.

use std::path::PathBuf;

/// Turn an artifact name into a safe file stem.
///
/// Unicode is transliterated with `deunicode`; anything outside ASCII
/// alphanumerics, `-` and `_` becomes a single `_`. Empty results fall back to
/// `image`.
pub fn sanitize_stem(value: &str) -> String {
    let ascii = deunicode::deunicode(value);
    let mut out = String::with_capacity(ascii.len());
    for ch in ascii.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' {
            out.push(ch);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "image".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Suggest a download file name such as `edited-beach.png`.
///
/// The original extension of `name` is dropped in favour of `extension`.
pub fn suggested_download_name(name: &str, extension: &str) -> String {
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    let stem = sanitize_stem(stem);
    let stem = stem.strip_prefix("edited-").unwrap_or(&stem);
    format!("edited-{stem}.{extension}")
}

/// Force a specific extension onto a path when it is missing or different.
///
/// Keeps an existing matching extension (case-insensitive); otherwise replaces it.
pub fn ensure_extension(mut path: PathBuf, extension: &str) -> PathBuf {
    let matches = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
    if !matches {
        path.set_extension(extension);
    }
    path
}
