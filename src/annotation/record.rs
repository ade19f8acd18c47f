//! Persisted annotation records.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::kind::AnnotationKind;

/// One placed mark as it is stored, in scale-1.0 page pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// 1-based page the mark belongs to
    pub page_number: u32,
    pub kind: AnnotationKind,
    /// Kind-specific serialized primitive (JSON of [`super::Shape`])
    pub geometry: String,
    /// Top-left of the primitive's bounding box
    pub position: Vec2,
    /// Stroke or fill color as `[r, g, b, a]`
    pub color: [f32; 4],
    /// Grader who created the mark; never rewritten after the first save
    pub author_id: String,
}
