use super::{ContentStore, StoreError};
use crate::content::ContentDocument;
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Single pretty-printed JSON file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

fn persist_atomically(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl ContentStore for FileStore {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn read(&self) -> Result<Option<ContentDocument>, StoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let value: serde_json::Value = serde_json::from_str(&contents)?;
        Ok(Some(ContentDocument::from_value(value)?))
    }

    async fn write(&self, document: &ContentDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(document)?;

        // Each writer gets its own temp file beside the target, then renames
        // it into place. Overlapping saves end with one complete document.
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || persist_atomically(&path, json.as_bytes()))
            .await
            .map_err(|e| self.io_error(std::io::Error::other(e)))?
            .map_err(|e| self.io_error(e))?;

        debug!("Wrote content to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::defaults::default_document;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileStore::new(temp_dir.path().join("data").join("content.json"));
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_read_missing_file_is_empty() {
        let (store, _temp_dir) = create_test_store();
        assert!(store.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let (store, _temp_dir) = create_test_store();
        let document = default_document();

        store.write(&document).await.expect("write");
        let loaded = store.read().await.expect("read").expect("document stored");

        assert_eq!(loaded, document);
    }

    #[tokio::test]
    async fn test_write_is_pretty_printed() {
        let (store, _temp_dir) = create_test_store();
        store.write(&default_document()).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\n  \"jp\""));

        let leftovers = std::fs::read_dir(store.path().parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_all_succeed() {
        let (store, _temp_dir) = create_test_store();
        let store = Arc::new(store);

        for round in 0..20 {
            let writers: Vec<_> = (0..8)
                .map(|writer| {
                    let store = store.clone();
                    tokio::spawn(async move {
                        let document = ContentDocument::from_value(json!({
                            "jp": { "hero": { "title": format!("{}-{}", round, writer) } },
                            "vn": {}
                        }))
                        .unwrap();
                        store.write(&document).await
                    })
                })
                .collect();

            for writer in writers {
                writer.await.unwrap().expect("overlapping write failed");
            }

            let loaded = store.read().await.unwrap().expect("document stored");
            let title = loaded.get("jp.hero.title", json!(""));
            assert!(title.as_str().unwrap().starts_with(&format!("{}-", round)));
        }
    }

    #[tokio::test]
    async fn test_read_invalid_json() {
        let (store, _temp_dir) = create_test_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{ not json").unwrap();

        let err = store.read().await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_read_missing_language() {
        let (store, _temp_dir) = create_test_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), json!({ "jp": {} }).to_string()).unwrap();

        let err = store.read().await.unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)));
    }
}
