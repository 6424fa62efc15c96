use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// A base directory plus a set of files relative to it.
///
/// Used for the application resources: the base is the application output
/// folder and the set holds every file the launcher bundle has to contain.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct RelativeFileSet {
    base_dir: PathBuf,
    files: BTreeSet<PathBuf>,
}

impl RelativeFileSet {
    /// Creates a file set from relative file names.
    pub fn new(base_dir: impl Into<PathBuf>, files: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            files: files.into_iter().collect(),
        }
    }

    /// Base folder the files are relative to.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Relative file names, sorted.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    /// Returns true when the relative file is part of the set.
    pub fn contains(&self, file: &Path) -> bool {
        self.files.contains(file)
    }

    /// Adds a relative file name. Returns false if it was already present.
    pub fn insert(&mut self, file: impl Into<PathBuf>) -> bool {
        self.files.insert(file.into())
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true when the set holds no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
