use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::IndexerConfig;
use crate::error::{IndexError, Result};
use crate::manifest::{relative_path, Manifest};
use crate::sink::ProgressSink;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexStats {
    pub directories: usize,
    pub images: usize,
    pub read_failures: usize,
    pub write_failures: usize,
}

impl IndexStats {
    pub fn has_failures(&self) -> bool {
        self.read_failures > 0 || self.write_failures > 0
    }

    /// End-of-run summary, one line per entry
    pub fn summary(&self) -> Vec<String> {
        let mut lines = vec![
            "=== INDEXING COMPLETE ===".to_string(),
            format!("Directories indexed: {}", self.directories),
            format!("Images listed: {}", self.images),
        ];

        if self.has_failures() {
            lines.push(format!("Unreadable directories: {}", self.read_failures));
            lines.push(format!("Failed manifest writes: {}", self.write_failures));
        }

        lines
    }
}

/// Direct contents of one directory, in filesystem order
#[derive(Debug, Default)]
struct Listing {
    images: Vec<String>,
    subdirs: Vec<PathBuf>,
}

pub struct Indexer<S: ProgressSink> {
    config: IndexerConfig,
    sink: S,
}

impl<S: ProgressSink> Indexer<S> {
    pub fn new(config: IndexerConfig, sink: S) -> Self {
        Indexer { config, sink }
    }

    /// Create the root if needed, then write a manifest into every directory below it.
    ///
    /// Only a failure to set up the root is returned as an error. Directories that
    /// cannot be read or whose manifest cannot be written are reported to the sink
    /// and counted in the returned stats.
    pub fn index(&self) -> Result<IndexStats> {
        let root = &self.config.root;
        self.ensure_root()?;

        self.sink
            .info(&format!("Indexing image directory: {}", root.display()));

        let mut stats = IndexStats::default();
        self.visit(root, &mut stats);

        self.sink
            .info(&format!("Finished indexing {}", root.display()));

        Ok(stats)
    }

    fn ensure_root(&self) -> Result<()> {
        let root = &self.config.root;

        match fs::metadata(root) {
            Ok(metadata) if metadata.is_dir() => Ok(()),
            Ok(_) => Err(IndexError::RootSetup {
                path: root.clone(),
                source: io::Error::new(ErrorKind::Other, "root path is not a directory"),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fs::create_dir_all(root).map_err(|source| IndexError::RootSetup {
                    path: root.clone(),
                    source,
                })?;
                self.sink
                    .info(&format!("Created root directory: {}", root.display()));
                Ok(())
            }
            Err(source) => Err(IndexError::RootSetup {
                path: root.clone(),
                source,
            }),
        }
    }

    /// Index `dir`, then each of its subdirectories depth-first.
    ///
    /// A directory that cannot be listed gets no manifest and its children are not
    /// visited. A failed manifest write still descends into the subdirectories that
    /// were already listed.
    pub fn visit(&self, dir: &Path, stats: &mut IndexStats) {
        let listing = match self.list_directory(dir) {
            Ok(listing) => listing,
            Err(e) => {
                stats.read_failures += 1;
                self.sink.error(&format!("✗ {}", e));
                return;
            }
        };

        let manifest = Manifest::new(listing.images, relative_path(&self.config.root, dir));

        match manifest.write(dir, &self.config.manifest_name) {
            Ok(_) => {
                stats.directories += 1;
                stats.images += manifest.count;
                self.sink.info(&format!(
                    "✓ Indexed {} ({} images)",
                    dir.display(),
                    manifest.count
                ));
            }
            Err(e) => {
                stats.write_failures += 1;
                self.sink.error(&format!("✗ {}", e));
            }
        }

        for subdir in &listing.subdirs {
            self.visit(subdir, stats);
        }
    }

    fn list_directory(&self, dir: &Path) -> Result<Listing> {
        let mut listing = Listing::default();

        for entry_result in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .into_iter()
        {
            let entry = match entry_result {
                Ok(e) => e,
                // Depth 0 means the directory itself could not be opened
                Err(err) if err.depth() == 0 => {
                    return Err(IndexError::DirectoryRead {
                        path: dir.to_path_buf(),
                        source: err,
                    });
                }
                Err(err) => {
                    log::warn!("Skipping unreadable entry in {}: {}", dir.display(), err);
                    continue;
                }
            };

            // Manifests only hold UTF-8, for file names and relative paths alike
            let Some(name) = entry.file_name().to_str() else {
                log::warn!("Skipping non UTF-8 name: {}", entry.path().display());
                continue;
            };

            let file_type = entry.file_type();

            if file_type.is_dir() {
                listing.subdirs.push(entry.into_path());
            } else if !file_type.is_file() {
                // Symlinks and special files are neither images nor subdirectories
                log::debug!("Ignoring non-regular entry: {}", entry.path().display());
            } else if self.config.is_image(name) {
                listing.images.push(name.to_string());
            }
        }

        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        infos: Mutex<Vec<String>>,
        errors: Mutex<Vec<String>>,
    }

    impl ProgressSink for Recorder {
        fn info(&self, message: &str) {
            self.infos.lock().unwrap().push(message.to_string());
        }

        fn error(&self, message: &str) {
            self.errors.lock().unwrap().push(message.to_string());
        }
    }

    #[test]
    fn test_list_directory_splits_entries() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.png"), b"").unwrap();
        fs::write(tmp.path().join("b.txt"), b"").unwrap();
        fs::write(tmp.path().join("index.json"), b"{}").unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();

        let indexer = Indexer::new(IndexerConfig::new(tmp.path()), Recorder::default());
        let listing = indexer.list_directory(tmp.path()).unwrap();

        assert_eq!(listing.images, vec!["a.png".to_string()]);
        assert_eq!(listing.subdirs, vec![tmp.path().join("sub")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_ignored() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("real.png"), b"").unwrap();
        fs::create_dir(tmp.path().join("dir")).unwrap();
        std::os::unix::fs::symlink(tmp.path().join("real.png"), tmp.path().join("link.png"))
            .unwrap();
        std::os::unix::fs::symlink(tmp.path().join("dir"), tmp.path().join("linkdir")).unwrap();

        let indexer = Indexer::new(IndexerConfig::new(tmp.path()), Recorder::default());
        let listing = indexer.list_directory(tmp.path()).unwrap();

        assert_eq!(listing.images, vec!["real.png".to_string()]);
        assert_eq!(listing.subdirs, vec![tmp.path().join("dir")]);
    }

    #[test]
    fn test_visit_missing_directory_reports_read_failure() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing");
        let recorder = Recorder::default();
        let indexer = Indexer::new(IndexerConfig::new(tmp.path()), &recorder);

        let mut stats = IndexStats::default();
        indexer.visit(&missing, &mut stats);

        assert_eq!(stats.read_failures, 1);
        assert_eq!(stats.directories, 0);
        assert!(!missing.exists());
        let errors = recorder.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("missing"));
    }

    #[test]
    fn test_index_creates_root() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("static").join("img");
        let recorder = Recorder::default();
        let indexer = Indexer::new(IndexerConfig::new(&root), &recorder);

        let stats = indexer.index().unwrap();

        assert!(root.is_dir());
        assert_eq!(stats.directories, 1);
        assert_eq!(stats.images, 0);
        let infos = recorder.infos.lock().unwrap();
        assert!(infos[0].starts_with("Created root directory"));
    }

    #[test]
    fn test_root_setup_failure_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, b"not a directory").unwrap();

        let indexer = Indexer::new(
            IndexerConfig::new(blocker.join("img")),
            Recorder::default(),
        );
        let err = indexer.index().unwrap_err();
        assert!(matches!(err, IndexError::RootSetup { .. }));
    }

    #[test]
    fn test_root_that_is_a_file_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("img");
        fs::write(&root, b"not a directory").unwrap();

        let recorder = Recorder::default();
        let err = Indexer::new(IndexerConfig::new(&root), &recorder)
            .index()
            .unwrap_err();

        assert!(matches!(err, IndexError::RootSetup { .. }));
        assert!(err.to_string().contains("img"));
        assert!(recorder.infos.lock().unwrap().is_empty());
        assert!(!tmp.path().join("index.json").exists());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_names_are_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = TempDir::new().unwrap();
        let bad = OsStr::from_bytes(b"bad\xff");
        fs::create_dir(tmp.path().join(bad)).unwrap();
        fs::write(tmp.path().join(bad).join("inner.png"), b"").unwrap();
        fs::write(tmp.path().join(OsStr::from_bytes(b"pic\xff.png")), b"").unwrap();
        fs::write(tmp.path().join("ok.png"), b"").unwrap();

        let recorder = Recorder::default();
        let indexer = Indexer::new(IndexerConfig::new(tmp.path()), &recorder);
        let listing = indexer.list_directory(tmp.path()).unwrap();
        assert_eq!(listing.images, vec!["ok.png".to_string()]);
        assert!(listing.subdirs.is_empty());

        let stats = indexer.index().unwrap();
        assert_eq!(stats.directories, 1);
        assert!(!tmp.path().join(bad).join("index.json").exists());
    }

    #[test]
    fn test_stats_has_failures() {
        let mut stats = IndexStats::default();
        assert!(!stats.has_failures());
        stats.write_failures = 1;
        assert!(stats.has_failures());
    }

    #[test]
    fn test_summary_lists_failures_only_when_present() {
        let mut stats = IndexStats {
            directories: 4,
            images: 9,
            ..Default::default()
        };
        assert_eq!(
            stats.summary(),
            vec![
                "=== INDEXING COMPLETE ===",
                "Directories indexed: 4",
                "Images listed: 9",
            ]
        );

        stats.read_failures = 2;
        let summary = stats.summary();
        assert_eq!(summary.len(), 5);
        assert_eq!(summary[3], "Unreadable directories: 2");
        assert_eq!(summary[4], "Failed manifest writes: 0");
    }
}
