//! Wire types for SnapEdit responses and caller-facing results
//!
//! One struct per endpoint. Required fields are enforced by serde, so a
//! payload of the wrong shape surfaces as
//! [`SnapEditError::InvalidResponse`](crate::SnapEditError::InvalidResponse)
//! instead of a silently empty result.

use crate::image_data::EncodedImage;
use serde::{Deserialize, Serialize};

/// `POST /api/background_removal/v1/erase`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackgroundRemovalResponse {
    /// Base64 PNG mask at upload resolution
    pub output: String,
}

/// `POST /api/image_enhancement/v1/enhance`
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct EnhanceResponse {
    /// Fully enhanced images, base64
    #[serde(default)]
    pub output_images: Vec<String>,
    /// Restored face patches to paste over the upload
    #[serde(default)]
    pub faces: Option<Vec<FacePatch>>,
}

/// A restored face and where it goes
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FacePatch {
    /// `[x, y, width, height]` in upload pixels
    #[serde(rename = "box")]
    pub bounding_box: [f64; 4],
    /// Base64 PNG renderings; the first one is used
    pub png: Vec<String>,
}

impl FacePatch {
    /// Top-left corner rounded to whole pixels
    #[must_use]
    pub fn origin(&self) -> (i64, i64) {
        let [x, y, _, _] = self.bounding_box;
        (x.round() as i64, y.round() as i64)
    }
}

/// Category of a detected object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Person,
    Object,
}

/// Axis-aligned box in upload pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A single object suggested for removal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    /// Confidence score
    pub accuracy: f64,
    #[serde(rename = "box")]
    pub bounding_box: BoundingBox,
    pub object_description: String,
    pub object_type: ObjectType,
}

/// `POST /api/object_removal/v1/auto_suggest`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResponse {
    pub detected_objects: Vec<DetectedObject>,
}

/// `POST /api/object_removal/v1/erase` and `/super_erase`
///
/// `erase` names the image `edited_image`, `super_erase` names it `image`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObjectRemovalResponse {
    #[serde(alias = "edited_image")]
    pub image: String,
    pub mask: String,
}

/// Decoded object removal output before compositing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErasedRegion {
    /// Inpainted image at upload resolution
    pub image: EncodedImage,
    /// Refined mask of the erased area
    pub mask: EncodedImage,
}
