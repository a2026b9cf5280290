use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub const DEFAULT_ROOT: &str = "static/img";
pub const DEFAULT_MANIFEST_NAME: &str = "index.json";

/// Extensions treated as images, lower-case and without the leading dot
pub const DEFAULT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "svg"];

#[derive(Debug, Clone)]
pub struct IndexerConfig {
    pub root: PathBuf,
    pub manifest_name: String,
    pub extensions: BTreeSet<String>,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        IndexerConfig::new(DEFAULT_ROOT)
    }
}

impl IndexerConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        IndexerConfig {
            root: root.into(),
            manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
            extensions: normalize_extensions(DEFAULT_EXTENSIONS.iter().copied()),
        }
    }

    pub fn with_manifest_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_name = name.into();
        self
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = normalize_extensions(extensions);
        self
    }

    /// True if `file_name` has an allowed extension and is not the manifest itself
    pub fn is_image(&self, file_name: &str) -> bool {
        if file_name == self.manifest_name {
            return false;
        }

        Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.contains(&e.to_lowercase()))
            .unwrap_or(false)
    }
}

/// Strip leading dots and lower-case, dropping anything left empty
pub fn normalize_extensions<I, S>(extensions: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    extensions
        .into_iter()
        .map(|e| e.as_ref().trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}
