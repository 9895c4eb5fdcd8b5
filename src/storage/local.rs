//! Local filesystem store for downloaded files.
//!
//! Files land directly in the destination directory under their URL
//! basename. A name that is already taken is compared by SHA-256 digest:
//! identical content is skipped, different content moves on to
//! `stem_1.ext`, `stem_2.ext`, ... until a free name or a match turns up.
//!
//! ```text
//! {root}/
//! ├── report.pdf
//! ├── report_1.pdf          # same name, different bytes
//! └── contact.vcf
//! ```

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::storage::StoreOutcome;

/// Hex-encoded SHA-256 of a byte slice.
pub fn content_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Destination directory for downloads.
#[derive(Debug)]
pub struct LocalStore {
    root_dir: PathBuf,
    /// Serializes name resolution and writes within the directory.
    write_lock: Mutex<()>,
}

impl LocalStore {
    /// Open the destination directory, creating it if needed.
    pub async fn open(root_dir: impl Into<PathBuf>) -> Result<Self> {
        let root_dir = root_dir.into();

        if tokio::fs::metadata(&root_dir)
            .await
            .is_ok_and(|meta| !meta.is_dir())
        {
            return Err(AppError::config(format!(
                "download destination {} is not a directory",
                root_dir.display()
            )));
        }
        tokio::fs::create_dir_all(&root_dir).await.map_err(|e| {
            AppError::config(format!(
                "cannot create download destination {}: {e}",
                root_dir.display()
            ))
        })?;

        Ok(Self {
            root_dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Store `bytes` under `file_name` unless identical content already sits there.
    pub async fn store(&self, file_name: &str, bytes: &[u8]) -> Result<StoreOutcome> {
        let file_name = sanitize_file_name(file_name);
        let digest = content_digest(bytes);

        let _guard = self.write_lock.lock().await;

        let mut suffix = 0;
        loop {
            let path = self.root_dir.join(candidate_name(&file_name, suffix));

            match tokio::fs::read(&path).await {
                Ok(existing) if content_digest(&existing) == digest => {
                    return Ok(StoreOutcome::Duplicate { path, digest });
                }
                Ok(_) => suffix += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    write_atomic(&path, bytes).await?;
                    return Ok(StoreOutcome::Saved { path, digest });
                }
                Err(e) => return Err(AppError::Io(e)),
            }
        }
    }
}

/// Write bytes atomically (write to temp, then rename).
///
/// The temp file is removed if any step fails.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".part");
    let tmp = PathBuf::from(tmp_name);

    let written = async {
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    if let Err(e) = written {
        if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Failed to remove {}: {}", tmp.display(), cleanup);
            }
        }
        return Err(e.into());
    }
    Ok(())
}

/// `name` for suffix 0, then `stem_1.ext`, `stem_2.ext`, ...
fn candidate_name(file_name: &str, suffix: u64) -> String {
    if suffix == 0 {
        return file_name.to_string();
    }
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{suffix}.{ext}"),
        _ => format!("{file_name}_{suffix}"),
    }
}

/// Keep a URL basename from escaping the destination directory.
fn sanitize_file_name(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();

    match cleaned.trim() {
        "" | "." | ".." => "download".to_string(),
        name => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_candidate_name() {
        let names: Vec<_> = (0..3).map(|n| candidate_name("report.pdf", n)).collect();
        assert_eq!(names, vec!["report.pdf", "report_1.pdf", "report_2.pdf"]);

        assert_eq!(candidate_name("archive.tar.gz", 1), "archive.tar_1.gz");
        assert_eq!(candidate_name("README", 1), "README_1");
        assert_eq!(candidate_name(".hidden", 2), ".hidden_2");
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("report.pdf"), "report.pdf");
        assert_eq!(sanitize_file_name("..\\evil.pdf"), ".._evil.pdf");
        assert_eq!(sanitize_file_name(".."), "download");
    }

    #[test]
    fn test_content_digest() {
        assert_eq!(
            content_digest(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[tokio::test]
    async fn test_store_new_file() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::open(tmp.path()).await.unwrap();

        let outcome = store.store("report.pdf", b"v1").await.unwrap();
        assert!(matches!(&outcome, StoreOutcome::Saved { path, .. } if path.ends_with("report.pdf")));
        assert_eq!(std::fs::read(tmp.path().join("report.pdf")).unwrap(), b"v1");
        assert!(!tmp.path().join("report.pdf.part").exists());
    }

    #[tokio::test]
    async fn test_identical_content_is_not_rewritten() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::open(tmp.path()).await.unwrap();

        store.store("report.pdf", b"same").await.unwrap();
        let second = store.store("report.pdf", b"same").await.unwrap();

        assert!(matches!(second, StoreOutcome::Duplicate { .. }));
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_different_content_gets_suffix() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::open(tmp.path()).await.unwrap();

        store.store("report.pdf", b"first").await.unwrap();
        let second = store.store("report.pdf", b"second").await.unwrap();
        let third = store.store("report.pdf", b"second").await.unwrap();

        assert!(matches!(&second, StoreOutcome::Saved { path, .. } if path.ends_with("report_1.pdf")));
        assert!(matches!(&third, StoreOutcome::Duplicate { path, .. } if path.ends_with("report_1.pdf")));
        assert_eq!(std::fs::read(tmp.path().join("report.pdf")).unwrap(), b"first");
        assert_eq!(std::fs::read(tmp.path().join("report_1.pdf")).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_concurrent_writers_never_collide() {
        let tmp = TempDir::new().unwrap();
        let store = std::sync::Arc::new(LocalStore::open(tmp.path()).await.unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = std::sync::Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .store("data.csv", format!("row {}", i % 4).as_bytes())
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut saved = 0;
        for handle in handles {
            if matches!(handle.await.unwrap(), StoreOutcome::Saved { .. }) {
                saved += 1;
            }
        }

        assert_eq!(saved, 4);
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 4);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        // A directory at the target path makes the final rename fail.
        let target = tmp.path().join("report.pdf");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("occupied"), b"x").unwrap();

        assert!(write_atomic(&target, b"data").await.is_err());
        assert!(!tmp.path().join("report.pdf.part").exists());
        assert!(target.is_dir());
    }

    #[tokio::test]
    async fn test_open_rejects_file_path() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let result = LocalStore::open(tmp.path()).await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_open_creates_missing_dir() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a/b");
        let store = LocalStore::open(&nested).await.unwrap();
        assert!(store.root_dir().is_dir());
    }
}
