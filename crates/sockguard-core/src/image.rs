//! Photo validation for the add form.
//!
//! The same limits are enforced by the backend, which remains the authority;
//! checking them here rejects a bad upload before any network traffic.

use std::path::Path;

/// MIME types accepted for sock photos.
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/jpg", "image/webp"];

/// Largest accepted photo, in bytes (16 MiB).
pub const MAX_IMAGE_SIZE: u64 = 1 << 24;

/// An image chosen for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Build an image from a file name and contents, guessing the MIME type
    /// from the extension.
    pub fn from_named_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_for_path(Path::new(&file_name)).to_string();
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

// Photo bytes are omitted so logs stay readable.
impl std::fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Check a MIME type and size against the upload limits.
pub fn is_valid_image(mime_type: &str, size: u64) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&mime_type) && size <= MAX_IMAGE_SIZE
}

/// Check whether `file` may be uploaded as a sock photo.
pub fn is_valid_image_file(file: &ImageFile) -> bool {
    is_valid_image(&file.mime_type, file.size())
}

/// MIME type for a path, judged by its extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}
