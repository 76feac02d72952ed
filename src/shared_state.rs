//! File-backed store for the currently pointed element(s)
//!
//! Every relay instance on a machine shares one state file: the elected
//! leader writes it, every instance's MCP server reads it. The file holds the
//! JSON-serialized selection: `null` after a clear, otherwise an array of
//! elements. A single object is also accepted on read.
//!
//! Reads never fail. Missing or corrupted storage reads as
//! [`Selection::Unset`], and the next write replaces it regardless.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{PointerError, Result};
use crate::fs_utils::atomic_write;
use crate::schema::{elements_from_payload, Selection, TargetedElement};

/// Shared state store backed by a single JSON file
#[derive(Debug, Clone)]
pub struct SharedStateStore {
    path: PathBuf,
}

impl SharedStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `elements` as the current selection. An empty slice clears it.
    ///
    /// The file is replaced atomically, so concurrent readers see either the
    /// previous or the new selection.
    pub async fn write(&self, elements: &[TargetedElement]) -> Result<()> {
        let json = if elements.is_empty() {
            "null".to_string()
        } else {
            serde_json::to_string_pretty(elements).map_err(|e| PointerError::StateWrite {
                path: self.path.clone(),
                source: e.into(),
            })?
        };

        atomic_write(&self.path, json.as_bytes())
            .await
            .map_err(|source| PointerError::StateWrite {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(
            "Saved {} element(s) to shared state file {}",
            elements.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Clear the current selection
    pub async fn clear(&self) -> Result<()> {
        self.write(&[]).await
    }

    /// Load the most recently written selection
    pub async fn read(&self) -> Selection {
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("Shared state file {} does not exist", self.path.display());
                return Selection::Unset;
            }
            Err(e) => {
                tracing::error!(
                    "Failed to read shared state file {}: {}",
                    self.path.display(),
                    e
                );
                return Selection::Unset;
            }
        };

        match parse_selection(&json) {
            Some(selection) => selection,
            None => {
                tracing::warn!(
                    "Shared state file {} is corrupted, treating as no selection",
                    self.path.display()
                );
                Selection::Unset
            }
        }
    }
}

/// Parse persisted JSON; `None` when the content is not a valid selection
fn parse_selection(json: &str) -> Option<Selection> {
    let value: Value = serde_json::from_str(json).ok()?;
    match value {
        Value::Null => Some(Selection::Cleared),
        Value::Array(ref items) if items.is_empty() => Some(Selection::Cleared),
        Value::Array(_) | Value::Object(_) => {
            let elements = elements_from_payload(value).ok()?;
            Some(Selection::from_elements(elements))
        }
        _ => None,
    }
}
