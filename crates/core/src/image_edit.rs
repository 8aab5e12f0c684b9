//! Image-edit request rules.
//!
//! Defines the ten edit functions the remote service offers, the request DTO
//! accepted by `POST /api/v1/tasks`, and the bounds it is validated against.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lower bound for the optional edit strength.
pub const MIN_STRENGTH: f64 = 0.1;

/// Upper bound for the optional edit strength.
pub const MAX_STRENGTH: f64 = 1.0;

/// Minimum number of images requested per task.
pub const MIN_IMAGE_COUNT: i32 = 1;

/// Maximum number of images requested per task.
pub const MAX_IMAGE_COUNT: i32 = 4;

/// Image count used when the request omits one.
pub const DEFAULT_IMAGE_COUNT: i32 = 1;

/// Longest prompt accepted, in characters.
pub const MAX_PROMPT_CHARS: u64 = 800;

// ---------------------------------------------------------------------------
// EditFunction
// ---------------------------------------------------------------------------

/// Edit operation understood by the remote image-edit service.
///
/// The snake_case names are the wire values of both our API and the remote
/// API, and are what the `edit_function` column stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditFunction {
    StylizationAll,
    StylizationLocal,
    DescriptionEdit,
    DescriptionEditWithMask,
    RemoveWatermark,
    Expand,
    SuperResolution,
    Colorization,
    Doodle,
    ControlCartoonFeature,
}

impl EditFunction {
    pub const ALL: [EditFunction; 10] = [
        EditFunction::StylizationAll,
        EditFunction::StylizationLocal,
        EditFunction::DescriptionEdit,
        EditFunction::DescriptionEditWithMask,
        EditFunction::RemoveWatermark,
        EditFunction::Expand,
        EditFunction::SuperResolution,
        EditFunction::Colorization,
        EditFunction::Doodle,
        EditFunction::ControlCartoonFeature,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EditFunction::StylizationAll => "stylization_all",
            EditFunction::StylizationLocal => "stylization_local",
            EditFunction::DescriptionEdit => "description_edit",
            EditFunction::DescriptionEditWithMask => "description_edit_with_mask",
            EditFunction::RemoveWatermark => "remove_watermark",
            EditFunction::Expand => "expand",
            EditFunction::SuperResolution => "super_resolution",
            EditFunction::Colorization => "colorization",
            EditFunction::Doodle => "doodle",
            EditFunction::ControlCartoonFeature => "control_cartoon_feature",
        }
    }
}

impl fmt::Display for EditFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditFunction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EditFunction::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown edit function '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Request DTO
// ---------------------------------------------------------------------------

/// Body of `POST /api/v1/tasks`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateImageEditTask {
    pub edit_function: EditFunction,
    pub original_image_id: DbId,
    #[validate(length(min = 1, max = MAX_PROMPT_CHARS, message = "must be 1-800 characters"))]
    pub prompt: String,
    #[validate(url(message = "must be a valid URL"))]
    pub mask_image_url: Option<String>,
    #[validate(range(min = MIN_STRENGTH, max = MAX_STRENGTH, message = "must be between 0.1 and 1.0"))]
    pub strength: Option<f64>,
    #[validate(range(min = MIN_IMAGE_COUNT, max = MAX_IMAGE_COUNT, message = "must be between 1 and 4"))]
    pub image_count: Option<i32>,
}

impl CreateImageEditTask {
    /// Requested image count with the default applied.
    pub fn image_count_or_default(&self) -> i32 {
        self.image_count.unwrap_or(DEFAULT_IMAGE_COUNT)
    }
}

/// Run every field rule on a create request.
pub fn validate_create_request(input: &CreateImageEditTask) -> Result<(), CoreError> {
    input.validate()?;
    if input.prompt.trim().is_empty() {
        return Err(CoreError::Validation("prompt: must not be blank".into()));
    }
    Ok(())
}
