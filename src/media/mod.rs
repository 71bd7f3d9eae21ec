//! Media binding workflow: the lifecycle of an attached image.
//!
//! Each binding (one for the reusable template, one for the disposable test
//! image) is a small state machine: `Empty -> Pending(file) -> Bound(id)`,
//! with removal allowed from any state. A freshly attached file always
//! supersedes a server-confirmed binding id, and a pending local file is
//! never overwritten by late server hydration.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;
use thiserror::Error;

use crate::humanize::ByteSize;

/// Media kind reported alongside template uploads.
pub const TEMPLATE_MEDIA_KIND: &str = "style_reference";
pub const TEST_MEDIA_KIND: &str = "test_image";

/// Allowed upload formats, checked by declared MIME type or, when the type
/// is absent or generic, by filename suffix.
const ALLOWED_SUBTYPES: &[&str] = &["jpeg", "jpg", "png", "webp"];
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

#[derive(Debug, Error)]
pub enum AttachError {
    #[error("unsupported format: {0} (allowed: JPG/PNG/WebP)")]
    UnsupportedFormat(String),

    #[error("file is {size} which exceeds the {limit} upload limit")]
    TooLarge { size: ByteSize, limit: ByteSize },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload endpoint rejected the file: {0}")]
    Rejected(String),

    #[error("template upload failed: {0}")]
    Failed(String),
}

/// An image file held in memory until it is uploaded or discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaFile {
    pub file_name: String,
    /// Declared MIME type, when known. `None` falls back to the suffix check.
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl MediaFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: Option<String>,
        bytes: Bytes,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        }
    }

    /// Read a file from disk. The MIME type is left undeclared so validation
    /// falls back to the filename suffix.
    pub fn from_path(path: &Path) -> Result<Self, AttachError> {
        let bytes = std::fs::read(path).map_err(|source| AttachError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "template-image.png".to_string());
        Ok(Self::new(file_name, None, Bytes::from(bytes)))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// MIME type sent with multipart uploads, derived from the declared type
    /// or the suffix.
    pub fn mime_type(&self) -> &'static str {
        if let Some(declared) = self.declared_image_subtype() {
            return match declared.as_str() {
                "png" => "image/png",
                "webp" => "image/webp",
                _ => "image/jpeg",
            };
        }
        let name = self.file_name.to_ascii_lowercase();
        if name.ends_with(".png") {
            "image/png"
        } else if name.ends_with(".webp") {
            "image/webp"
        } else {
            "image/jpeg"
        }
    }

    fn declared_image_subtype(&self) -> Option<String> {
        let declared = self.content_type.as_deref()?;
        let parsed: mime::Mime = declared.trim().to_ascii_lowercase().parse().ok()?;
        if parsed.type_() != mime::IMAGE {
            return None;
        }
        Some(parsed.subtype().as_str().to_string())
    }

    fn is_supported_image(&self) -> bool {
        if let Some(subtype) = self.declared_image_subtype() {
            return ALLOWED_SUBTYPES.contains(&subtype.as_str());
        }
        // Absent or generic type (e.g. application/octet-stream): check the
        // filename suffix instead.
        let name = self.file_name.to_ascii_lowercase();
        ALLOWED_EXTENSIONS
            .iter()
            .any(|ext| name.ends_with(&format!(".{ext}")))
    }

    fn format_description(&self) -> String {
        self.content_type
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| self.file_name.clone())
    }
}

/// Transport used to register a pending template file with the service.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    /// Upload the file and return the server-assigned media object id.
    async fn upload_template(
        &self,
        slot_id: &str,
        media_kind: &str,
        file: &MediaFile,
    ) -> Result<String, UploadError>;
}

/// The active source of truth for one attachment slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum BindingState {
    #[default]
    Empty,
    /// A locally attached file awaiting upload.
    Pending(MediaFile),
    /// A server-confirmed media object id.
    Bound(String),
}

/// Resolution outcome of [`MediaBinding::resolve_for_submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Bound(String),
    /// Nothing attached; the caller decides whether that is acceptable.
    NoBinding,
}

/// One attachment slot (template or test image).
#[derive(Debug)]
pub struct MediaBinding {
    kind: &'static str,
    state: BindingState,
}

impl MediaBinding {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            state: BindingState::Empty,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn state(&self) -> &BindingState {
        &self.state
    }

    pub fn bound_id(&self) -> Option<&str> {
        match &self.state {
            BindingState::Bound(id) => Some(id),
            _ => None,
        }
    }

    pub fn pending_file(&self) -> Option<&MediaFile> {
        match &self.state {
            BindingState::Pending(file) => Some(file),
            _ => None,
        }
    }

    /// Anything attached, confirmed or not.
    pub fn is_present(&self) -> bool {
        !matches!(self.state, BindingState::Empty)
    }

    /// Attach a new file. Validates format and size; on success any previous
    /// pending file is released and a stale bound id is cleared — a new file
    /// always invalidates a prior binding.
    pub fn attach(&mut self, file: MediaFile, limit: ByteSize) -> Result<(), AttachError> {
        if !file.is_supported_image() {
            return Err(AttachError::UnsupportedFormat(file.format_description()));
        }
        if file.size() > limit.as_u64() {
            return Err(AttachError::TooLarge {
                size: ByteSize(file.size()),
                limit,
            });
        }
        tracing::debug!(
            kind = self.kind,
            file = %file.file_name,
            size = file.size(),
            "Attached media file"
        );
        // Replacing the state drops the previous preview buffer.
        self.state = BindingState::Pending(file);
        Ok(())
    }

    /// Clear the attachment entirely, releasing any pending file.
    pub fn remove(&mut self) {
        if self.is_present() {
            tracing::debug!(kind = self.kind, "Removed media binding");
        }
        self.state = BindingState::Empty;
    }

    /// Apply a server-reported binding id. A locally pending file wins over
    /// hydration that arrives late; returns whether the id was applied.
    pub fn hydrate_bound(&mut self, media_object_id: impl Into<String>) -> bool {
        if matches!(self.state, BindingState::Pending(_)) {
            tracing::debug!(
                kind = self.kind,
                "Ignoring hydrated binding: a local file is pending"
            );
            return false;
        }
        self.state = BindingState::Bound(media_object_id.into());
        true
    }

    /// Resolve the binding for submission. Uploads a pending file (moving to
    /// `Bound` on success), is a no-op when already bound, and reports
    /// [`Resolution::NoBinding`] when empty.
    pub async fn resolve_for_submit(
        &mut self,
        slot_id: &str,
        uploader: &dyn MediaUploader,
    ) -> Result<Resolution, UploadError> {
        match &self.state {
            BindingState::Empty => Ok(Resolution::NoBinding),
            BindingState::Bound(id) => Ok(Resolution::Bound(id.clone())),
            BindingState::Pending(file) => {
                let id = uploader.upload_template(slot_id, self.kind, file).await?;
                tracing::info!(
                    kind = self.kind,
                    media_object_id = %id,
                    "Template media registered"
                );
                self.state = BindingState::Bound(id.clone());
                Ok(Resolution::Bound(id))
            }
        }
    }
}
