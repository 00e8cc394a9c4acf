//! Technique catalog sources.
//!
//! The engine never loads techniques itself; it is handed a pool that a
//! catalog has already filtered down to the selected entries.

use super::types::{Technique, selectable};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Errors raised while loading a catalog file
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Unsupported catalog format: {0}")]
    UnsupportedFormat(String),
}

/// Source of the techniques a session may draw from
pub trait TechniqueCatalog: Send + Sync {
    /// Every technique the catalog knows about, selected or not
    fn techniques(&self) -> Vec<Technique>;

    /// Techniques currently marked as selected
    fn selected_techniques(&self) -> Vec<Technique> {
        selectable(&self.techniques())
    }
}

/// In-memory catalog
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    techniques: Vec<Technique>,
}

impl StaticCatalog {
    pub fn new(techniques: Vec<Technique>) -> Self {
        Self { techniques }
    }

    /// Toggle the `selected` flag of every technique with the given name
    pub fn set_selected(&mut self, name: &str, selected: bool) -> usize {
        let mut changed = 0;
        for technique in self.techniques.iter_mut().filter(|t| t.name == name) {
            technique.selected = selected;
            changed += 1;
        }
        changed
    }
}

impl TechniqueCatalog for StaticCatalog {
    fn techniques(&self) -> Vec<Technique> {
        self.techniques.clone()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    techniques: Vec<Technique>,
}

/// Catalog loaded from a TOML (`[[techniques]]`) or JSON (array) file
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
    inner: StaticCatalog,
}

impl FileCatalog {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|source| CatalogError::Io {
            path: path.clone(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let techniques = match extension.as_str() {
            "toml" => Self::parse_toml(&content).map_err(|message| CatalogError::Parse {
                path: path.clone(),
                message,
            })?,
            "json" => Self::parse_json(&content).map_err(|message| CatalogError::Parse {
                path: path.clone(),
                message,
            })?,
            other => return Err(CatalogError::UnsupportedFormat(other.to_string())),
        };

        info!(
            "Loaded {} techniques from catalog {}",
            techniques.len(),
            path.display()
        );

        Ok(Self {
            path,
            inner: StaticCatalog::new(techniques),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse_toml(content: &str) -> Result<Vec<Technique>, String> {
        let document: CatalogDocument = toml::from_str(content).map_err(|e| e.to_string())?;
        Ok(document.techniques)
    }

    fn parse_json(content: &str) -> Result<Vec<Technique>, String> {
        // Accept either a bare array or an object with a `techniques` field
        match serde_json::from_str::<Vec<Technique>>(content) {
            Ok(techniques) => Ok(techniques),
            Err(array_err) => {
                debug!("Catalog is not a bare array ({}), trying document form", array_err);
                let document: CatalogDocument =
                    serde_json::from_str(content).map_err(|e| e.to_string())?;
                Ok(document.techniques)
            }
        }
    }
}

impl TechniqueCatalog for FileCatalog {
    fn techniques(&self) -> Vec<Technique> {
        self.inner.techniques()
    }
}
