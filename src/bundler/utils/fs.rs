//! File system utilities for bundling.
//!
//! Provides the tolerant recursive copy used for application and bundler
//! resources, plus directory listings used by the parameter model and the
//! webstart workarounds. Blocking directory walks run on the blocking pool.

use crate::bundler::error::{Error, ErrorExt, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Copies a regular file from one path to another, creating any parent
/// directories of the destination path as necessary.
///
/// Fails if the source path is a directory or doesn't exist.
pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.is_file() {
        return Err(Error::GenericError(format!(
            "{from:?} does not exist or is not a file"
        )));
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir)
            .await
            .fs_context("creating directory", dest_dir)?;
    }
    fs::copy(from, to).await.fs_context("copying file", from)?;
    Ok(())
}

/// Recursively copies `from` into `to`, overwriting existing files.
///
/// Individual file failures are logged as warnings and do not abort the copy.
/// Returns the number of files that could not be copied. Fails only when the
/// source folder itself cannot be walked.
pub async fn copy_recursive(from: &Path, to: &Path) -> Result<usize> {
    if !from.is_dir() {
        return Err(Error::GenericError(format!(
            "{from:?} does not exist or is not a directory"
        )));
    }

    let from = from.to_path_buf();
    let to = to.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<usize> {
        std::fs::create_dir_all(&to).fs_context("creating directory", &to)?;

        let mut failed = 0;
        for entry in walkdir::WalkDir::new(&from).min_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Couldn't read resource entry: {e}");
                    failed += 1;
                    continue;
                }
            };
            let rel_path = entry.path().strip_prefix(&from)?;
            let dest_path = to.join(rel_path);

            let outcome = if entry.file_type().is_dir() {
                std::fs::create_dir_all(&dest_path)
            } else {
                dest_path
                    .parent()
                    .map_or(Ok(()), std::fs::create_dir_all)
                    .and_then(|_| std::fs::copy(entry.path(), &dest_path).map(|_| ()))
            };
            if let Err(e) = outcome {
                log::warn!("Couldn't copy file {}: {e}", entry.path().display());
                failed += 1;
            }
        }
        Ok(failed)
    })
    .await
    .map_err(|e| Error::GenericError(format!("Directory copy task panicked: {e}")))?
}

/// Lists every regular file below `dir`, relative to `dir`, in sorted order.
///
/// A missing folder yields an empty list.
pub async fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let dir = dir.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(&dir).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() {
                files.push(entry.path().strip_prefix(&dir)?.to_path_buf());
            }
        }
        Ok(files)
    })
    .await
    .map_err(|e| Error::GenericError(format!("Directory listing task panicked: {e}")))?
}

/// Finds files directly inside `dir` whose extension matches `extension`.
pub async fn find_by_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(found),
        Err(e) => return Err(e).fs_context("reading directory", dir),
    };
    while let Some(entry) = entries
        .next_entry()
        .await
        .fs_context("reading directory", dir)?
    {
        let path = entry.path();
        let matches = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches && path.is_file() {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_copy_recursive_merges_into_existing_tree() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(src.path().join("nested/deeper")).unwrap();
        std::fs::write(src.path().join("top.txt"), "top").unwrap();
        std::fs::write(src.path().join("nested/deeper/leaf.txt"), "leaf").unwrap();
        std::fs::write(dst.path().join("existing.txt"), "keep").unwrap();

        let failed = copy_recursive(src.path(), dst.path()).await.unwrap();

        assert_eq!(failed, 0);
        assert_eq!(std::fs::read_to_string(dst.path().join("top.txt")).unwrap(), "top");
        assert!(dst.path().join("nested/deeper/leaf.txt").is_file());
        assert!(dst.path().join("existing.txt").is_file());
    }

    #[tokio::test]
    async fn test_copy_recursive_rejects_missing_source() {
        let dst = tempfile::tempdir().unwrap();
        let missing = dst.path().join("nope");
        assert!(copy_recursive(&missing, dst.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_list_files_is_relative_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("lib")).unwrap();
        std::fs::write(dir.path().join("b.jar"), "").unwrap();
        std::fs::write(dir.path().join("lib/a.jar"), "").unwrap();

        let files = list_files(dir.path()).await.unwrap();
        assert_eq!(files, vec![PathBuf::from("b.jar"), PathBuf::from("lib/a.jar")]);
    }

    #[tokio::test]
    async fn test_find_by_extension_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.jnlp"), "").unwrap();
        std::fs::write(dir.path().join("app.html"), "").unwrap();

        let found = find_by_extension(dir.path(), "jnlp").await.unwrap();
        assert_eq!(found, vec![dir.path().join("app.jnlp")]);
        assert!(find_by_extension(&dir.path().join("missing"), "jnlp").await.unwrap().is_empty());
    }
}
