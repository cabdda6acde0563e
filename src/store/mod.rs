//! Content persistence.
//!
//! Every backend implements [`ContentStore`]: read the whole document (or
//! report that none is stored yet) and overwrite the whole document. There
//! is no partial update and no version check; the last writer wins.
//!
//! [`ContentService`] wires the backends into a fallback chain once at
//! startup. Loads never fail: the chain ends in the built-in default
//! document. Saves report a distinguishable error once every permitted
//! backend has failed.

mod document;
mod file;
mod kv;

pub use document::DocumentStore;
pub use file::FileStore;
pub use kv::KvStore;

use crate::config::{Config, ExecutionMode};
use crate::content::defaults::default_document;
use crate::content::{ContentDocument, ContentError};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stored content is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Stored content is malformed: {0}")]
    Malformed(#[from] ContentError),

    #[error("Request to {backend} failed: {source}")]
    Http {
        backend: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{backend} URL is not usable: {url}")]
    InvalidUrl { backend: &'static str, url: String },

    #[error("{backend} returned {status}: {body}")]
    Backend {
        backend: &'static str,
        status: u16,
        body: String,
    },
}

/// A whole-document persistence backend.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Read the stored document. `Ok(None)` means nothing is stored yet.
    async fn read(&self) -> Result<Option<ContentDocument>, StoreError>;

    /// Overwrite the stored document.
    async fn write(&self, document: &ContentDocument) -> Result<(), StoreError>;
}

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written to the primary backend.
    Saved,
    /// The primary backend failed but the local file took the write.
    SavedToFallback { warning: String },
}

impl SaveOutcome {
    pub fn warning(&self) -> Option<&str> {
        match self {
            SaveOutcome::Saved => None,
            SaveOutcome::SavedToFallback { warning } => Some(warning),
        }
    }
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("{0}")]
    Invalid(#[from] ContentError),

    #[error("Failed to save content: {0}")]
    AllBackendsFailed(StoreError),
}

/// Fallback chain over the configured backends.
#[derive(Clone)]
pub struct ContentService {
    primary: Arc<dyn ContentStore>,
    local: Option<Arc<dyn ContentStore>>,
    mode: ExecutionMode,
}

impl ContentService {
    /// Compose a chain explicitly. `local` is consulted only in development.
    pub fn new(
        primary: Arc<dyn ContentStore>,
        local: Option<Arc<dyn ContentStore>>,
        mode: ExecutionMode,
    ) -> Self {
        Self {
            primary,
            local,
            mode,
        }
    }

    /// Pick backends from the configuration.
    ///
    /// The hosted key-value store wins over the document database; with
    /// neither configured the content file is the primary and there is no
    /// separate local fallback.
    pub fn from_config(config: &Config) -> Self {
        let file: Arc<dyn ContentStore> = Arc::new(FileStore::new(&config.content_file));

        let hosted: Option<Arc<dyn ContentStore>> = if let Some(kv) = &config.kv {
            Some(Arc::new(KvStore::new(kv.clone())))
        } else if let Some(db) = &config.document_db {
            Some(Arc::new(DocumentStore::new(db.clone())))
        } else {
            None
        };

        match hosted {
            Some(primary) => Self::new(primary, Some(file), config.mode),
            None => Self::new(file, None, config.mode),
        }
    }

    /// Name of the backend that answers first.
    pub fn primary_name(&self) -> &'static str {
        self.primary.name()
    }

    /// Name of the fallback backend. `None` when there is none or the
    /// service runs in production.
    pub fn local_name(&self) -> Option<&'static str> {
        self.local().map(|local| local.name())
    }

    fn local(&self) -> Option<&Arc<dyn ContentStore>> {
        if self.mode.is_production() {
            None
        } else {
            self.local.as_ref()
        }
    }

    /// Load the document, falling back until something answers.
    pub async fn load(&self) -> ContentDocument {
        match self.primary.read().await {
            Ok(Some(document)) if !document.is_empty() => return document,
            Ok(_) => info!("No content stored in {}", self.primary.name()),
            Err(e) => warn!("Failed to read content from {}: {}", self.primary.name(), e),
        }

        if let Some(local) = self.local() {
            match local.read().await {
                Ok(Some(document)) if !document.is_empty() => {
                    info!("Loaded content from {}, warming {}", local.name(), self.primary.name());
                    if let Err(e) = self.primary.write(&document).await {
                        warn!("Failed to warm {}: {}", self.primary.name(), e);
                    }
                    return document;
                }
                Ok(_) => info!("No content stored in {}", local.name()),
                Err(e) => warn!("Failed to read content from {}: {}", local.name(), e),
            }
        }

        info!("Serving built-in default content");
        default_document()
    }

    /// Validate raw JSON and save it. Invalid input never reaches a backend.
    pub async fn save_value(&self, value: Value) -> Result<SaveOutcome, SaveError> {
        let document = ContentDocument::from_value(value)?;
        self.save(&document).await
    }

    /// Save the whole document.
    pub async fn save(&self, document: &ContentDocument) -> Result<SaveOutcome, SaveError> {
        let primary_error = match self.primary.write(document).await {
            Ok(()) => {
                if let Some(local) = self.local() {
                    if let Err(e) = local.write(document).await {
                        warn!("Backup write to {} failed: {}", local.name(), e);
                    }
                }
                return Ok(SaveOutcome::Saved);
            }
            Err(e) => e,
        };

        warn!("Failed to save content to {}: {}", self.primary.name(), primary_error);

        let Some(local) = self.local() else {
            return Err(SaveError::AllBackendsFailed(primary_error));
        };

        match local.write(document).await {
            Ok(()) => Ok(SaveOutcome::SavedToFallback {
                warning: format!(
                    "{} unavailable, content saved to {} only",
                    self.primary.name(),
                    local.name()
                ),
            }),
            Err(e) => {
                warn!("Fallback write to {} failed: {}", local.name(), e);
                Err(SaveError::AllBackendsFailed(primary_error))
            }
        }
    }

    /// Copy the local file document into the primary backend.
    ///
    /// Returns `false` when there is no separate local backend or it holds
    /// no document.
    pub async fn seed_from_file(&self) -> Result<bool, StoreError> {
        let Some(local) = self.local.as_ref() else {
            return Ok(false);
        };
        let Some(document) = local.read().await? else {
            return Ok(false);
        };
        self.primary.write(&document).await?;
        info!("Seeded {} from {}", self.primary.name(), local.name());
        Ok(true)
    }
}
