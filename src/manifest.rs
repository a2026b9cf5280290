use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{IndexError, Result};

/// Per-directory listing of the images it directly contains
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub count: usize,
    pub files: Vec<String>,
    #[serde(rename = "relativePath")]
    pub relative_path: String,
}

impl Manifest {
    pub fn new(files: Vec<String>, relative_path: String) -> Self {
        Manifest {
            count: files.len(),
            files,
            relative_path,
        }
    }

    /// Pretty-printed JSON with two-space indentation
    pub fn to_json(&self, dir: &Path) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|source| IndexError::Serialize {
            path: dir.to_path_buf(),
            source,
        })
    }

    /// Overwrite `dir/<manifest_name>` with this manifest, returning the path written
    pub fn write(&self, dir: &Path, manifest_name: &str) -> Result<PathBuf> {
        let json = self.to_json(dir)?;
        let manifest_path = dir.join(manifest_name);

        fs::write(&manifest_path, json).map_err(|source| IndexError::ManifestWrite {
            path: manifest_path.clone(),
            source,
        })?;

        Ok(manifest_path)
    }
}

/// Path of `dir` relative to `root`, `/`-separated; the root itself is `""`.
///
/// The walk never descends into directories with non UTF-8 names, so the
/// lossy conversion only matters for callers passing arbitrary paths.
pub fn relative_path(root: &Path, dir: &Path) -> String {
    let rel = dir.strip_prefix(root).unwrap_or(dir);

    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
