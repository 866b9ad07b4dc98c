// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Session-only API credential.

use std::fmt;

/// Opaque API key supplied by the user. Never persisted or logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Accept a user-entered key, trimming surrounding whitespace.
    ///
    /// Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::Credential;

    #[test]
    fn blank_input_is_rejected() {
        assert!(Credential::parse("").is_none());
        assert!(Credential::parse("   \n").is_none());
    }

    #[test]
    fn input_is_trimmed_and_debug_is_redacted() {
        let key = Credential::parse("  abc123 ").unwrap();
        assert_eq!(key.expose(), "abc123");
        assert_eq!(format!("{key:?}"), "Credential(***)");
    }
}
