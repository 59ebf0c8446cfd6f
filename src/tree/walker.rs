//! Filesystem walker for bottom-up directory traversal

use crate::error::StorageError;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};
use walkdir::{DirEntry, WalkDir};

/// An immediate child of a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Child {
    pub name: OsString,
    pub path: PathBuf,
}

/// Immediate children of one directory, each list sorted by name bytes
#[derive(Debug, Clone, Default)]
pub struct DirectoryListing {
    pub subdirectories: Vec<Child>,
    pub files: Vec<Child>,
}

/// Filesystem walker configuration
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Descend into symlinked directories (symlinked files are always read)
    pub follow_symlinks: bool,
    /// Entry names to leave out of the walk and of every composition
    pub ignore_patterns: Vec<String>,
}

/// Filesystem walker
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given root path
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            config: WalkerConfig::default(),
        }
    }

    /// Create a walker with custom configuration
    pub fn with_config(root: PathBuf, config: WalkerConfig) -> Self {
        Self { root, config }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check that the root exists and is a directory.
    pub fn check_root(&self) -> Result<(), StorageError> {
        match fs::metadata(&self.root) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(StorageError::NotWalkable(self.root.clone())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(self.root.clone()))
            }
            Err(_) => Err(StorageError::NotWalkable(self.root.clone())),
        }
    }

    /// Every directory under the root, root included, deepest first.
    ///
    /// A directory always comes after all of its subdirectories, and
    /// siblings come in name order, so repeated walks see the same sequence.
    pub fn directories_bottom_up(&self) -> Result<Vec<PathBuf>, StorageError> {
        self.check_root()?;

        let walker = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .contents_first(true)
            .sort_by_file_name();

        let mut directories = Vec::new();
        for entry in walker
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !self.should_ignore(e))
        {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf);
                if e.depth() == 0 {
                    return StorageError::NotWalkable(self.root.clone());
                }
                let source = e.into_io_error().unwrap_or_else(|| {
                    std::io::Error::new(ErrorKind::Other, "filesystem loop detected")
                });
                StorageError::read(path.unwrap_or_else(|| self.root.clone()), source)
            })?;

            if entry.file_type().is_dir() {
                trace!(path = %entry.path().display(), "Queued directory");
                directories.push(entry.into_path());
            }
        }

        if directories.is_empty() {
            return Err(StorageError::NotWalkable(self.root.clone()));
        }
        Ok(directories)
    }

    /// List the immediate subdirectories and files of `dir`.
    pub fn list_children(&self, dir: &Path) -> Result<DirectoryListing, StorageError> {
        let entries = fs::read_dir(dir).map_err(|e| StorageError::read(dir, e))?;

        let mut listing = DirectoryListing::default();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::read(dir, e))?;
            let name = entry.file_name();
            if self.is_ignored_name(&name.to_string_lossy()) {
                continue;
            }
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| StorageError::read(&path, e))?;

            let is_dir = if file_type.is_symlink() {
                match fs::metadata(&path) {
                    Ok(target) if target.is_dir() => {
                        if !self.config.follow_symlinks {
                            warn!(path = %path.display(), "Skipping symlinked directory");
                            continue;
                        }
                        true
                    }
                    // Dangling links are listed as files and fail when read
                    _ => false,
                }
            } else {
                file_type.is_dir()
            };

            let child = Child { name, path };
            if is_dir {
                listing.subdirectories.push(child);
            } else {
                listing.files.push(child);
            }
        }

        listing.subdirectories.sort_by(|a, b| a.name.cmp(&b.name));
        listing.files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listing)
    }

    fn should_ignore(&self, entry: &DirEntry) -> bool {
        self.is_ignored_name(&entry.file_name().to_string_lossy())
    }

    fn is_ignored_name(&self, name: &str) -> bool {
        self.config.ignore_patterns.iter().any(|p| p == name)
    }
}
