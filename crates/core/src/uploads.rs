//! Direct-upload rules: accepted content types, per-kind size limits, and
//! storage key construction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Largest accepted image upload (4 MiB).
pub const MAX_IMAGE_BYTES: usize = 4 * 1024 * 1024;

/// Largest accepted video upload (64 MiB).
pub const MAX_VIDEO_BYTES: usize = 64 * 1024 * 1024;

/// Content types accepted by `POST /api/v1/uploads`, with their file extension.
const ALLOWED_CONTENT_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("video/mp4", "mp4"),
    ("video/webm", "webm"),
];

/// Folder (under the configured key prefix) for saved edit results.
pub const EDITED_FOLDER: &str = "edited";

// ---------------------------------------------------------------------------
// MediaType
// ---------------------------------------------------------------------------

/// Kind of media held by an upload row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }

    /// Size ceiling for this kind of media.
    pub fn max_bytes(self) -> usize {
        match self {
            MediaType::Image => MAX_IMAGE_BYTES,
            MediaType::Video => MAX_VIDEO_BYTES,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(MediaType::Image),
            "video" => Ok(MediaType::Video),
            other => Err(CoreError::Validation(format!(
                "Unknown media type '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Outcome of validating an incoming file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedUpload {
    pub media_type: MediaType,
    pub extension: &'static str,
}

/// Check the content type and size of an incoming file.
pub fn validate_upload(content_type: &str, size_bytes: usize) -> Result<AcceptedUpload, CoreError> {
    let (ct, extension) = ALLOWED_CONTENT_TYPES
        .iter()
        .find(|(ct, _)| *ct == content_type)
        .ok_or_else(|| {
            CoreError::Validation(format!("Invalid file type '{content_type}'"))
        })?;

    let media_type = if ct.starts_with("image/") {
        MediaType::Image
    } else {
        MediaType::Video
    };

    if size_bytes == 0 {
        return Err(CoreError::Validation("File is empty".into()));
    }
    if size_bytes > media_type.max_bytes() {
        return Err(CoreError::Validation(format!(
            "File too large: {size_bytes} bytes exceeds the {} byte limit for {media_type} uploads",
            media_type.max_bytes()
        )));
    }

    Ok(AcceptedUpload {
        media_type,
        extension,
    })
}

/// Build an object key `{prefix}/{folder?}/{uuid}.{ext}`.
pub fn object_key(prefix: &str, folder: Option<&str>, extension: &str) -> String {
    let id = uuid::Uuid::new_v4();
    let prefix = prefix.trim_end_matches('/');
    match folder {
        Some(folder) => format!("{prefix}/{folder}/{id}.{extension}"),
        None => format!("{prefix}/{id}.{extension}"),
    }
}
