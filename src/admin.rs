//! Admin editing workflow.
//!
//! An [`AdminEditor`] holds a draft copy of the content document and the
//! language being edited. Field edits replace the draft with a new document
//! built by the content mutators; nothing is persisted until [`AdminEditor::save`]
//! or [`upload_and_persist`] writes the whole draft back.

use crate::content::{ContentDocument, ContentError, Language};
use crate::media::{ImageUpload, MediaService, StoredMedia, UploadError};
use crate::store::{ContentService, SaveError, SaveOutcome};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Save(#[from] SaveError),
}

/// Where an uploaded image goes inside a sequence field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Replace the element at this index (`len` appends).
    At(usize),
    /// Push after the last element.
    Append,
}

/// Destination of an uploaded image in the content tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub language: Language,
    pub section: String,
    pub field: String,
    pub slot: Slot,
}

/// What [`upload_and_persist`] produced.
#[derive(Debug, Clone)]
pub struct PersistedUpload {
    pub media: StoredMedia,
    pub outcome: SaveOutcome,
}

pub struct AdminEditor {
    language: Language,
    draft: ContentDocument,
}

impl AdminEditor {
    pub fn new(draft: ContentDocument, language: Language) -> Self {
        Self { language, draft }
    }

    /// Start editing from a freshly loaded document.
    pub async fn open(content: &ContentService, language: Language) -> Self {
        Self::new(content.load().await, language)
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn draft(&self) -> &ContentDocument {
        &self.draft
    }

    /// Read `section.field[.sub]` from the current language.
    pub fn get(&self, path: &str, default: Value) -> Value {
        self.draft
            .get(&format!("{}.{}", self.language.code(), path), default)
    }

    pub fn update(&mut self, section: &str, field: &str, value: Value, sub_field: Option<&str>) {
        self.draft = self
            .draft
            .with_field(self.language, section, field, value, sub_field);
    }

    pub fn set_entry(
        &mut self,
        section: &str,
        field: &str,
        index: usize,
        value: Value,
    ) -> Result<(), ContentError> {
        self.draft = self
            .draft
            .with_entry(self.language, section, field, index, value)?;
        Ok(())
    }

    pub fn append_entry(&mut self, section: &str, field: &str, value: Value) -> Result<(), ContentError> {
        self.draft = self.draft.with_appended(self.language, section, field, value)?;
        Ok(())
    }

    pub fn remove_entry(&mut self, section: &str, field: &str, index: usize) -> Result<(), ContentError> {
        self.draft = self.draft.with_removed(self.language, section, field, index)?;
        Ok(())
    }

    /// Swap the entry at `index` with its predecessor.
    pub fn move_up(&mut self, section: &str, field: &str, index: usize) -> Result<(), ContentError> {
        let Some(previous) = index.checked_sub(1) else {
            return Err(ContentError::IndexOutOfRange {
                section: section.to_string(),
                field: field.to_string(),
                index,
                len: self.draft.sequence(self.language, section, field)?.len(),
            });
        };
        self.draft = self
            .draft
            .with_swapped(self.language, section, field, previous, index)?;
        Ok(())
    }

    /// Swap the entry at `index` with its successor.
    pub fn move_down(&mut self, section: &str, field: &str, index: usize) -> Result<(), ContentError> {
        let Some(next) = index.checked_add(1) else {
            return Err(ContentError::IndexOutOfRange {
                section: section.to_string(),
                field: field.to_string(),
                index,
                len: self.draft.sequence(self.language, section, field)?.len(),
            });
        };
        self.draft = self
            .draft
            .with_swapped(self.language, section, field, index, next)?;
        Ok(())
    }

    /// Persist the whole draft.
    pub async fn save(&self, content: &ContentService) -> Result<SaveOutcome, SaveError> {
        content.save(&self.draft).await
    }
}

/// Upload an image, write its URL into the draft, and save the document.
///
/// If the upload is rejected or fails, the draft is untouched and nothing is
/// saved. If the save fails the draft keeps the new URL so the operator can
/// retry the save.
pub async fn upload_and_persist(
    editor: &mut AdminEditor,
    media: &MediaService,
    content: &ContentService,
    upload: &ImageUpload,
    target: &UploadTarget,
) -> Result<PersistedUpload, AdminError> {
    // Validate the target before anything is stored.
    let len = editor
        .draft
        .sequence(target.language, &target.section, &target.field)?
        .len();
    if let Slot::At(index) = target.slot {
        if index > len {
            return Err(ContentError::IndexOutOfRange {
                section: target.section.clone(),
                field: target.field.clone(),
                index,
                len,
            }
            .into());
        }
    }

    let stored = media.upload(upload).await?;
    let url = Value::String(stored.url.clone());

    editor.draft = match target.slot {
        Slot::At(index) => editor.draft.with_entry(
            target.language,
            &target.section,
            &target.field,
            index,
            url,
        )?,
        Slot::Append => {
            editor
                .draft
                .with_appended(target.language, &target.section, &target.field, url)?
        }
    };

    let outcome = editor.save(content).await?;
    info!(
        "Persisted {} into {}.{}.{}",
        stored.url, target.language, target.section, target.field
    );

    Ok(PersistedUpload {
        media: stored,
        outcome,
    })
}
