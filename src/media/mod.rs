//! Image uploads for slides and partner logos.
//!
//! Uploads are validated before any storage side effect: only four image
//! MIME types are accepted and files are capped at 5 MiB. Accepted files go
//! to the hosted media service in production (when fully configured) and to
//! the local public directory otherwise. Either way the caller gets back a
//! URL that can be written straight into the content document.

mod cloudinary;
mod local;

pub use cloudinary::CloudinaryStore;
pub use local::LocalMediaStore;

use crate::config::Config;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Largest accepted upload, inclusive.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Accepted `Content-Type` values.
pub const ALLOWED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/gif"];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Invalid file type. Only JPG, PNG, and GIF are allowed.")]
    InvalidType(String),

    #[error("File too large. Maximum size is 5MB.")]
    TooLarge(usize),

    #[error("Failed to save file locally: {0}")]
    Local(#[source] std::io::Error),

    #[error("Failed to upload to media service: {0}")]
    Hosted(String),
}

/// An uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub declared_mime_type: String,
    pub original_name: String,
}

impl ImageUpload {
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Check type and size. Nothing is stored when this fails.
    pub fn validate(&self) -> Result<(), UploadError> {
        let mime = self.declared_mime_type.trim().to_ascii_lowercase();
        if !ALLOWED_MIME_TYPES.contains(&mime.as_str()) {
            return Err(UploadError::InvalidType(self.declared_mime_type.clone()));
        }
        if self.size_bytes() > MAX_UPLOAD_BYTES {
            return Err(UploadError::TooLarge(self.size_bytes()));
        }
        Ok(())
    }
}

/// Where an accepted upload ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    /// Public URL, usable as a content value.
    pub url: String,
    /// Stored filename or hosted identifier.
    pub filename: String,
    /// `true` when stored by the hosted media service.
    pub hosted: bool,
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    fn name(&self) -> &'static str;

    /// Persist an already validated upload.
    async fn store(&self, upload: &ImageUpload) -> Result<StoredMedia, UploadError>;
}

/// Validates uploads and hands them to the selected backend.
#[derive(Clone)]
pub struct MediaService {
    store: Arc<dyn MediaStore>,
}

impl MediaService {
    pub fn new(store: Arc<dyn MediaStore>) -> Self {
        Self { store }
    }

    /// Hosted storage only in production with all credentials present.
    pub fn from_config(config: &Config) -> Self {
        let store: Arc<dyn MediaStore> = match &config.cloudinary {
            Some(cloudinary) if config.mode.is_production() => {
                Arc::new(CloudinaryStore::new(cloudinary.clone()))
            }
            _ => Arc::new(LocalMediaStore::new(
                &config.upload_dir,
                &config.upload_public_prefix,
            )),
        };
        Self::new(store)
    }

    /// Name of the backend uploads go to.
    pub fn backend_name(&self) -> &'static str {
        self.store.name()
    }

    pub async fn upload(&self, upload: &ImageUpload) -> Result<StoredMedia, UploadError> {
        if let Err(e) = upload.validate() {
            warn!("Rejected upload '{}': {}", upload.original_name, e);
            return Err(e);
        }

        let stored = self.store.store(upload).await.map_err(|e| {
            warn!("{} upload failed: {}", self.store.name(), e);
            e
        })?;

        info!(
            "Stored upload '{}' ({} bytes) at {}",
            upload.original_name,
            upload.size_bytes(),
            stored.url
        );
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn upload(mime: &str, size: usize) -> ImageUpload {
        ImageUpload {
            bytes: vec![0u8; size],
            declared_mime_type: mime.to_string(),
            original_name: "slide.png".to_string(),
        }
    }

    fn create_test_service() -> (MediaService, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = LocalMediaStore::new(temp_dir.path().join("slides"), "/slides");
        (MediaService::new(Arc::new(store)), temp_dir)
    }

    fn stored_files(temp_dir: &TempDir) -> usize {
        std::fs::read_dir(temp_dir.path().join("slides"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    // ==================== Validation Tests ====================

    #[test]
    fn test_allowed_types_validate() {
        for mime in ALLOWED_MIME_TYPES {
            assert!(upload(mime, 10).validate().is_ok(), "{} should be allowed", mime);
        }
    }

    #[test]
    fn test_size_boundary() {
        assert!(upload("image/png", MAX_UPLOAD_BYTES).validate().is_ok());
        assert!(matches!(
            upload("image/png", MAX_UPLOAD_BYTES + 1).validate(),
            Err(UploadError::TooLarge(n)) if n == MAX_UPLOAD_BYTES + 1
        ));
    }

    #[test]
    fn test_rejected_types() {
        for mime in ["image/webp", "image/svg+xml", "application/pdf", "text/plain", ""] {
            assert!(matches!(
                upload(mime, 10).validate(),
                Err(UploadError::InvalidType(_))
            ));
        }
    }

    #[test]
    fn test_type_check_ignores_case() {
        assert!(upload("IMAGE/PNG", 10).validate().is_ok());
    }

    // ==================== Service Tests ====================

    #[tokio::test]
    async fn test_upload_stores_valid_file() {
        let (service, temp_dir) = create_test_service();
        let stored = service.upload(&upload("image/png", 2_000_000)).await.unwrap();

        assert!(stored.url.starts_with("/slides/"));
        assert!(!stored.hosted);
        assert_eq!(stored_files(&temp_dir), 1);
    }

    #[tokio::test]
    async fn test_upload_invalid_type_has_no_side_effect() {
        let (service, temp_dir) = create_test_service();
        let err = service.upload(&upload("image/webp", 10)).await.unwrap_err();

        assert!(matches!(err, UploadError::InvalidType(_)));
        assert_eq!(stored_files(&temp_dir), 0);
    }

    #[tokio::test]
    async fn test_upload_too_large_has_no_side_effect() {
        let (service, temp_dir) = create_test_service();
        let err = service
            .upload(&upload("image/jpeg", MAX_UPLOAD_BYTES + 1))
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::TooLarge(_)));
        assert_eq!(stored_files(&temp_dir), 0);
    }

    // ==================== Backend Selection ====================

    fn config(pairs: &[(&str, &str)]) -> Config {
        Config::from_lookup(|key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
        .unwrap()
    }

    const CLOUDINARY: [(&str, &str); 3] = [
        ("CLOUDINARY_CLOUD_NAME", "demo"),
        ("CLOUDINARY_API_KEY", "key"),
        ("CLOUDINARY_API_SECRET", "secret"),
    ];

    #[test]
    fn test_from_config_hosted_in_production() {
        let mut pairs = CLOUDINARY.to_vec();
        pairs.push(("APP_ENV", "production"));
        assert_eq!(MediaService::from_config(&config(&pairs)).backend_name(), "cloudinary");
    }

    #[test]
    fn test_from_config_local_in_development() {
        let service = MediaService::from_config(&config(&CLOUDINARY));
        assert_eq!(service.backend_name(), "local");
    }

    #[test]
    fn test_from_config_local_with_partial_credentials() {
        let pairs = [
            ("APP_ENV", "production"),
            ("CLOUDINARY_CLOUD_NAME", "demo"),
            ("CLOUDINARY_API_KEY", "key"),
        ];
        assert_eq!(MediaService::from_config(&config(&pairs)).backend_name(), "local");
    }

    proptest! {
        #[test]
        fn prop_non_image_types_rejected(mime in "[a-z]{1,12}/[a-z0-9.+-]{1,12}") {
            prop_assume!(!ALLOWED_MIME_TYPES.contains(&mime.as_str()));
            let (service, temp_dir) = create_test_service();
            let result = tokio_test::block_on(service.upload(&upload(&mime, 16)));
            prop_assert!(matches!(result, Err(UploadError::InvalidType(_))));
            prop_assert_eq!(stored_files(&temp_dir), 0);
        }
    }
}
