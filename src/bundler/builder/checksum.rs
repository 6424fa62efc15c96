//! Artifact size and checksum calculation.
//!
//! Backends produce single files (installers, descriptors) as well as folder
//! trees (application images), so both are supported.

use crate::{bail, bundler::Result, bundler::error::ErrorExt};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// Hex-encoded SHA-256 of a file, or of a folder tree.
///
/// Folder trees hash every file's relative path followed by its content, in
/// sorted path order, so the result does not depend on directory iteration
/// order.
pub async fn calculate_sha256(path: &Path) -> Result<String> {
    let metadata = tokio::fs::metadata(path)
        .await
        .fs_context("reading artifact metadata", path)?;

    let mut hasher = Sha256::new();
    if metadata.is_file() {
        hash_file(&mut hasher, path).await?;
    } else if metadata.is_dir() {
        for file in sorted_files(path).await? {
            if let Ok(relative) = file.strip_prefix(path) {
                hasher.update(relative.to_string_lossy().as_bytes());
            }
            hash_file(&mut hasher, &file).await?;
        }
    } else {
        bail!("Path is neither file nor directory: {}", path.display())
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Size in bytes of a file, or the sum of all files below a folder.
pub async fn calculate_size(path: &Path) -> Result<u64> {
    let metadata = tokio::fs::metadata(path)
        .await
        .fs_context("reading artifact metadata", path)?;
    if !metadata.is_dir() {
        return Ok(metadata.len());
    }
    let mut total = 0;
    for file in sorted_files(path).await? {
        total += tokio::fs::metadata(&file)
            .await
            .fs_context("reading artifact metadata", &file)?
            .len();
    }
    Ok(total)
}

async fn hash_file(hasher: &mut Sha256, path: &Path) -> Result<()> {
    let mut file = tokio::fs::File::open(path)
        .await
        .fs_context("opening file for hashing", path)?;
    let mut buffer = vec![0u8; 8192];
    loop {
        let n = file
            .read(&mut buffer)
            .await
            .fs_context("reading file for hash calculation", path)?;
        if n == 0 {
            return Ok(());
        }
        hasher.update(&buffer[..n]);
    }
}

async fn sorted_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let dir = dir.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(&dir)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect();
        files.sort();
        files
    })
    .await
    .map_err(|e| crate::bundler::Error::GenericError(format!("Directory walk task panicked: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_checksum_matches_known_digest() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "abc").unwrap();

        assert_eq!(
            calculate_sha256(&file).await.unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(calculate_size(&file).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_folder_size_and_checksum_cover_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("app/lib")).unwrap();
        std::fs::write(dir.path().join("app/demo.cfg"), "12345").unwrap();
        std::fs::write(dir.path().join("app/lib/a.jar"), "1234567").unwrap();

        assert_eq!(calculate_size(dir.path()).await.unwrap(), 12);
        let first = calculate_sha256(dir.path()).await.unwrap();
        std::fs::write(dir.path().join("app/demo.cfg"), "54321").unwrap();
        assert_ne!(calculate_sha256(dir.path()).await.unwrap(), first);
    }
}
