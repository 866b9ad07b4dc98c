// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Persistent, bounded list of reference face images.
//!
//! References are stored newest-first as data URLs in a single JSON file under
//! the application's config directory. The list never holds more than
//! [`MAX_REFERENCES`] entries; adding beyond that evicts the oldest.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::models::artifact::Artifact;

/// Upper bound on stored references.
pub const MAX_REFERENCES: usize = 5;

/// File name of the store inside the config directory.
pub const STORE_FILE: &str = "reference_faces.json";

/// A stored reference face.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceImage {
    pub artifact: Artifact,
    pub added_at: OffsetDateTime,
    /// Whether the reference is attached to generation requests.
    pub in_use: bool,
}

/// On-disk shape of one reference.
#[derive(Serialize, Deserialize)]
struct StoredReference {
    name: String,
    data_url: String,
    added_at: String,
    #[serde(default)]
    in_use: bool,
}

/// Result of [`ReferenceList::add`].
#[derive(Debug, PartialEq)]
pub enum AddOutcome {
    Added { evicted: Option<ReferenceImage> },
    Duplicate,
}

/// Newest-first list of references, bounded at [`MAX_REFERENCES`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReferenceList {
    items: Vec<ReferenceImage>,
}

impl ReferenceList {
    /// Insert `artifact` at the front unless an identical image is stored.
    pub fn add(&mut self, artifact: Artifact, added_at: OffsetDateTime) -> AddOutcome {
        if self
            .items
            .iter()
            .any(|r| r.artifact.sha256() == artifact.sha256())
        {
            return AddOutcome::Duplicate;
        }
        self.items.insert(
            0,
            ReferenceImage {
                artifact,
                added_at,
                in_use: true,
            },
        );
        let evicted = if self.items.len() > MAX_REFERENCES {
            self.items.pop()
        } else {
            None
        };
        AddOutcome::Added { evicted }
    }

    pub fn remove(&mut self, index: usize) -> Option<ReferenceImage> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Flip the in-use flag. Returns the new state, or `None` for a bad index.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let item = self.items.get_mut(index)?;
        item.in_use = !item.in_use;
        Some(item.in_use)
    }

    /// Fold a list read from disk into this one.
    ///
    /// Entries already held stay in front since they were added after the
    /// store was written. Duplicates are skipped and the bound is kept; the
    /// number of dropped overflow entries is returned.
    pub fn merge(&mut self, loaded: ReferenceList) -> usize {
        for reference in loaded.items {
            if !self
                .items
                .iter()
                .any(|r| r.artifact.sha256() == reference.artifact.sha256())
            {
                self.items.push(reference);
            }
        }
        let overflow = self.items.len().saturating_sub(MAX_REFERENCES);
        self.items.truncate(MAX_REFERENCES);
        overflow
    }

    pub fn items(&self) -> &[ReferenceImage] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Artifacts currently attached to generation requests.
    pub fn in_use(&self) -> Vec<Artifact> {
        self.items
            .iter()
            .filter(|r| r.in_use)
            .map(|r| r.artifact.clone())
            .collect()
    }
}

/// Load the store at `path`.
///
/// A missing file or unparsable JSON yields an empty list; entries that fail
/// to decode are skipped. Only IO errors other than "not found" are returned.
pub fn load(path: &Path) -> Result<ReferenceList> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("no reference store at {}", path.display());
            return Ok(ReferenceList::default());
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("Failed to read reference store: {}", path.display()));
        }
    };

    let stored: Vec<StoredReference> = match serde_json::from_str(&raw) {
        Ok(stored) => stored,
        Err(err) => {
            log::warn!("ignoring unreadable reference store {}: {err}", path.display());
            return Ok(ReferenceList::default());
        }
    };

    let mut items = Vec::with_capacity(stored.len().min(MAX_REFERENCES));
    for entry in stored {
        if items.len() == MAX_REFERENCES {
            break;
        }
        let artifact = match Artifact::from_data_url(&entry.data_url, entry.name.clone()) {
            Ok(artifact) => artifact,
            Err(err) => {
                log::warn!("skipping reference '{}': {err}", entry.name);
                continue;
            }
        };
        let added_at = OffsetDateTime::parse(&entry.added_at, &Rfc3339)
            .unwrap_or(OffsetDateTime::UNIX_EPOCH);
        items.push(ReferenceImage {
            artifact,
            added_at,
            in_use: entry.in_use,
        });
    }
    log::info!("loaded {} reference image(s)", items.len());
    Ok(ReferenceList { items })
}

/// Persist `list` to `path`, replacing the previous file atomically.
pub fn save(path: &Path, list: &ReferenceList) -> Result<()> {
    let stored = list
        .items
        .iter()
        .map(|r| {
            Ok(StoredReference {
                name: r.artifact.name().to_string(),
                data_url: r.artifact.to_data_url(),
                added_at: r
                    .added_at
                    .format(&Rfc3339)
                    .context("Failed to format reference timestamp")?,
                in_use: r.in_use,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let json = serde_json::to_vec_pretty(&stored).context("Failed to serialize references")?;

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    // Each save gets its own temp file so concurrent writers never share one.
    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;
    tmp.write_all(&json)
        .with_context(|| format!("Failed to write: {}", tmp.path().display()))?;
    tmp.persist(path)
        .with_context(|| format!("Failed to replace reference store: {}", path.display()))?;
    log::debug!("saved {} reference image(s) to {}", list.len(), path.display());
    Ok(())
}
