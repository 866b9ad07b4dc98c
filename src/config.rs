// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Application configuration loaded from the user's config directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::logic::references::STORE_FILE;
use crate::models::credential::Credential;

/// Directory name under the platform config dir.
pub const APP_DIR: &str = "retouch";

/// Config file name inside [`APP_DIR`].
pub const CONFIG_FILE: &str = "config.json";

/// User-tunable settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the generation API, without the `/models/...` suffix.
    pub api_base_url: String,
    /// Image model identifier.
    pub model: String,
    /// HTTP timeout for one generation call.
    pub request_timeout_secs: u64,
    /// Override for the reference store location.
    pub reference_store_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash-image-preview".to_string(),
            request_timeout_secs: 120,
            reference_store_path: None,
        }
    }
}

impl AppConfig {
    /// Load from the default location, then apply environment overrides.
    ///
    /// Never fails: problems are logged and defaults are used instead.
    pub fn load() -> Self {
        let mut config = match config_dir() {
            Some(dir) => Self::load_from(&dir.join(CONFIG_FILE)).unwrap_or_else(|err| {
                log::warn!("using default configuration: {err:#}");
                Self::default()
            }),
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        if let Err(err) = config.validate() {
            log::warn!("invalid configuration, falling back to defaults: {err:#}");
            config = Self::default();
        }
        config
    }

    /// Read a JSON config file; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        log::info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply `RETOUCH_API_BASE_URL` and `RETOUCH_MODEL` overrides.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("RETOUCH_API_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(model) = var("RETOUCH_MODEL").filter(|v| !v.trim().is_empty()) {
            self.model = model.trim().to_string();
        }
    }

    /// Check that the base URL is an absolute http(s) URL and the model is set.
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api_base_url)
            .with_context(|| format!("Invalid API base URL: {}", self.api_base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("API base URL must use http or https: {}", self.api_base_url);
        }
        if self.model.trim().is_empty() {
            bail!("Model name must not be empty");
        }
        if self.request_timeout_secs == 0 {
            bail!("Request timeout must be positive");
        }
        Ok(())
    }

    /// Where reference faces are stored.
    pub fn reference_store_path(&self) -> Option<PathBuf> {
        self.reference_store_path
            .clone()
            .or_else(|| config_dir().map(|dir| dir.join(STORE_FILE)))
    }
}

/// Per-user directory holding config and the reference store.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR))
}

/// Session credential supplied through `RETOUCH_API_KEY`, if any.
pub fn credential_from_env() -> Option<Credential> {
    std::env::var("RETOUCH_API_KEY")
        .ok()
        .and_then(|raw| Credential::parse(&raw))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let cfg = AppConfig::load_from(&tmp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, r#"{ "model": "custom-model", "request_timeout_secs": 30 }"#).unwrap();

        let cfg = AppConfig::load_from(&path).unwrap();

        assert_eq!(cfg.model, "custom-model");
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.api_base_url, AppConfig::default().api_base_url);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, "model = toml").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn env_overrides_apply_and_ignore_blank_values() {
        let vars: HashMap<&str, &str> = [
            ("RETOUCH_API_BASE_URL", " http://localhost:8080/v1 "),
            ("RETOUCH_MODEL", "  "),
        ]
        .into_iter()
        .collect();

        let mut cfg = AppConfig::default();
        cfg.apply_env(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.api_base_url, "http://localhost:8080/v1");
        assert_eq!(cfg.model, AppConfig::default().model);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let cfg = AppConfig {
            api_base_url: "ftp://example.com".into(),
            ..AppConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = AppConfig {
            api_base_url: "not a url".into(),
            ..AppConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = AppConfig {
            model: " ".into(),
            ..AppConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn explicit_reference_path_wins() {
        let cfg = AppConfig {
            reference_store_path: Some(PathBuf::from("/tmp/faces.json")),
            ..AppConfig::default()
        };
        assert_eq!(
            cfg.reference_store_path(),
            Some(PathBuf::from("/tmp/faces.json"))
        );
    }
}
