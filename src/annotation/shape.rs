//! Vector primitives that draw annotations.
//!
//! All coordinates are local to the owning object's origin, which is the
//! top-left corner of the primitive's bounding box. Surface pixels are y-down.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Glyph width as a fraction of the font size (approximate text metrics)
const GLYPH_WIDTH_RATIO: f32 = 0.55;
/// Line height as a fraction of the font size
const LINE_HEIGHT_RATIO: f32 = 1.25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// One or more open polylines drawn with the same stroke
    Path {
        strokes: Vec<Vec<Vec2>>,
        stroke_width: f32,
    },
    /// Axis-aligned ellipse outline; its center sits at `(rx, ry)`
    Ellipse { rx: f32, ry: f32, stroke_width: f32 },
    /// A single text block anchored at its top-left corner
    Text { content: String, font_size: f32 },
}

impl Shape {
    /// Build a path from strokes given in absolute surface coordinates.
    ///
    /// Returns the origin (bounding-box top-left) and the shape expressed
    /// relative to it, or `None` when no stroke has a point.
    pub fn path_from_absolute(strokes: Vec<Vec<Vec2>>, stroke_width: f32) -> Option<(Vec2, Shape)> {
        let mut points = strokes.iter().flatten();
        let first = *points.next()?;
        let origin = points.fold(first, |min, p| min.min(*p));

        let strokes = strokes
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.into_iter().map(|p| p - origin).collect())
            .collect();

        Some((
            origin,
            Shape::Path {
                strokes,
                stroke_width,
            },
        ))
    }

    /// Width and height of the bounding box in local coordinates.
    pub fn extent(&self) -> Vec2 {
        match self {
            Shape::Path { strokes, .. } => strokes
                .iter()
                .flatten()
                .fold(Vec2::ZERO, |max, p| max.max(*p)),
            Shape::Ellipse { rx, ry, .. } => Vec2::new(rx * 2.0, ry * 2.0),
            Shape::Text { content, font_size } => text_extent(content, *font_size),
        }
    }

    pub fn stroke_width(&self) -> f32 {
        match self {
            Shape::Path { stroke_width, .. } | Shape::Ellipse { stroke_width, .. } => *stroke_width,
            Shape::Text { .. } => 0.0,
        }
    }

    /// Uniformly scale every length in the primitive.
    pub fn scaled(&self, factor: f32) -> Shape {
        match self {
            Shape::Path {
                strokes,
                stroke_width,
            } => Shape::Path {
                strokes: strokes
                    .iter()
                    .map(|s| s.iter().map(|p| *p * factor).collect())
                    .collect(),
                stroke_width: stroke_width * factor,
            },
            Shape::Ellipse { rx, ry, stroke_width } => Shape::Ellipse {
                rx: rx * factor,
                ry: ry * factor,
                stroke_width: stroke_width * factor,
            },
            Shape::Text { content, font_size } => Shape::Text {
                content: content.clone(),
                font_size: font_size * factor,
            },
        }
    }

    /// Whether every number in the primitive is finite and sizes are non-negative.
    pub fn is_well_formed(&self) -> bool {
        match self {
            Shape::Path {
                strokes,
                stroke_width,
            } => {
                stroke_width.is_finite()
                    && *stroke_width >= 0.0
                    && strokes.iter().any(|s| !s.is_empty())
                    && strokes.iter().flatten().all(|p| p.is_finite())
            }
            Shape::Ellipse { rx, ry, stroke_width } => [*rx, *ry, *stroke_width]
                .iter()
                .all(|v| v.is_finite() && *v >= 0.0),
            Shape::Text { font_size, .. } => font_size.is_finite() && *font_size > 0.0,
        }
    }

    /// Hit test against a point given in the shape's local coordinates.
    pub fn hit(&self, local: Vec2) -> bool {
        match self {
            Shape::Path {
                strokes,
                stroke_width,
            } => {
                let threshold = (stroke_width * 2.0).max(8.0); // Hit area is at least 8px
                strokes.iter().any(|stroke| match stroke.as_slice() {
                    [single] => local.distance(*single) <= threshold,
                    _ => stroke
                        .windows(2)
                        .any(|w| point_near_segment(local, w[0], w[1], threshold)),
                })
            }
            Shape::Ellipse { rx, ry, stroke_width } => {
                let pad = stroke_width.max(4.0);
                let (rx, ry) = (rx + pad, ry + pad);
                if rx <= 0.0 || ry <= 0.0 {
                    return false;
                }
                let d = local - Vec2::new(rx - pad, ry - pad);
                (d.x / rx).powi(2) + (d.y / ry).powi(2) <= 1.0
            }
            Shape::Text { .. } => {
                let extent = self.extent();
                local.x >= 0.0 && local.y >= 0.0 && local.x <= extent.x && local.y <= extent.y
            }
        }
    }
}

/// Approximate rendered size of a text block.
pub fn text_extent(content: &str, font_size: f32) -> Vec2 {
    let longest = content
        .lines()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);
    let lines = content.lines().count().max(1);
    let width = (longest as f32 * font_size * GLYPH_WIDTH_RATIO).max(font_size * 2.0);
    Vec2::new(width, lines as f32 * font_size * LINE_HEIGHT_RATIO)
}

/// Check if a point is within a given distance of a line segment
fn point_near_segment(point: Vec2, seg_start: Vec2, seg_end: Vec2, threshold: f32) -> bool {
    let line_vec = seg_end - seg_start;
    let line_len_sq = line_vec.length_squared();

    if line_len_sq < 0.0001 {
        // Segment is essentially a point
        return point.distance(seg_start) <= threshold;
    }

    // Project point onto line, clamped to segment
    let t = ((point - seg_start).dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
    let projection = seg_start + line_vec * t;

    point.distance(projection) <= threshold
}
