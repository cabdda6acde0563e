use super::{ImageUpload, MediaStore, StoredMedia, UploadError};
use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Replace every character outside `[A-Za-z0-9.-]` with `_`.
pub fn sanitize_filename(name: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let unsafe_chars = UNSAFE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9.\-]").expect("static regex"));
    unsafe_chars.replace_all(name, "_").into_owned()
}

/// Writes uploads into a directory served as static assets.
pub struct LocalMediaStore {
    dir: PathBuf,
    public_prefix: String,
}

impl LocalMediaStore {
    pub fn new(dir: impl AsRef<Path>, public_prefix: &str) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn store(&self, upload: &ImageUpload) -> Result<StoredMedia, UploadError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(UploadError::Local)?;

        let filename = format!(
            "{}_{}",
            Utc::now().timestamp_millis(),
            sanitize_filename(&upload.original_name)
        );
        tokio::fs::write(self.dir.join(&filename), &upload.bytes)
            .await
            .map_err(UploadError::Local)?;

        Ok(StoredMedia {
            url: format!("{}/{}", self.public_prefix, filename),
            filename,
            hosted: false,
        })
    }
}
