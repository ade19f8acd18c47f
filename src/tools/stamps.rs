//! Preset marks placed with a single click.
//!
//! Every builder works in surface pixels of the current render and returns a
//! fully formed object centered on the click point, nudged inward so its
//! bounding box stays on the page.

use bevy::prelude::*;

use crate::annotation::{text_extent, AnnotationKind, Shape};
use crate::constants::{STAMP_SIZE, STAMP_STROKE_WIDTH, TEXT_FONT_SIZE};
use crate::surface::{NewObject, PageViewport};

use super::GradingTool;

/// Tick drawn in a unit square centered on the origin (y-down)
const TICK: [Vec2; 3] = [
    Vec2::new(-0.5, 0.0),
    Vec2::new(-0.15, 0.4),
    Vec2::new(0.5, -0.45),
];

/// Oval proportions relative to the stamp size
const OVAL_RADII: Vec2 = Vec2::new(0.9, 0.55);

fn unit_to_surface(points: &[Vec2], center: Vec2, size: f32) -> Vec<Vec2> {
    points.iter().map(|p| center + *p * size).collect()
}

/// Build the preset object a stamp tool places at `center`.
///
/// Returns `None` for freehand tools.
pub fn build_stamp(
    tool: GradingTool,
    center: Vec2,
    scale: f32,
    color: Color,
) -> Option<NewObject> {
    let size = STAMP_SIZE * scale;
    let stroke_width = STAMP_STROKE_WIDTH * scale;

    let (kind, origin, shape) = match tool {
        GradingTool::Tick => {
            let (origin, shape) =
                Shape::path_from_absolute(vec![unit_to_surface(&TICK, center, size)], stroke_width)?;
            (AnnotationKind::Check, origin, shape)
        }
        GradingTool::Cross => {
            let a = [Vec2::new(-0.5, -0.5), Vec2::new(0.5, 0.5)];
            let b = [Vec2::new(0.5, -0.5), Vec2::new(-0.5, 0.5)];
            let (origin, shape) = Shape::path_from_absolute(
                vec![
                    unit_to_surface(&a, center, size),
                    unit_to_surface(&b, center, size),
                ],
                stroke_width,
            )?;
            (AnnotationKind::Cross, origin, shape)
        }
        GradingTool::Oval => {
            let radii = OVAL_RADII * size;
            (
                AnnotationKind::Circle,
                center - radii,
                Shape::Ellipse {
                    rx: radii.x,
                    ry: radii.y,
                    stroke_width,
                },
            )
        }
        GradingTool::TextBox => {
            let font_size = TEXT_FONT_SIZE * scale;
            (
                AnnotationKind::Text,
                center - text_extent("", font_size) / 2.0,
                Shape::Text {
                    content: String::new(),
                    font_size,
                },
            )
        }
        GradingTool::Pen | GradingTool::Eraser => return None,
    };

    Some(NewObject {
        kind,
        shape,
        origin,
        color,
        author_id: None,
    })
}

/// Shift an object so its bounding box lies inside the viewport where it fits.
pub fn fit_on_surface(mut object: NewObject, viewport: &PageViewport) -> NewObject {
    let max_origin = (viewport.size() - object.shape.extent()).max(Vec2::ZERO);
    object.origin = object.origin.clamp(Vec2::ZERO, max_origin);
    object
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme;

    #[test]
    fn test_stamps_are_centered_on_the_click() {
        for tool in [GradingTool::Tick, GradingTool::Cross, GradingTool::Oval] {
            let obj = build_stamp(tool, Vec2::new(100.0, 200.0), 1.0, theme::EMPHASIS).unwrap();
            let center = obj.origin + obj.shape.extent() / 2.0;
            // Tick is asymmetric; stay within a few pixels of the click
            assert!(center.distance(Vec2::new(100.0, 200.0)) < 5.0, "{tool:?}: {center:?}");
        }
    }

    #[test]
    fn test_stamp_kinds() {
        let at = Vec2::new(50.0, 50.0);
        let kind = |t| build_stamp(t, at, 1.0, theme::EMPHASIS).unwrap().kind;
        assert_eq!(kind(GradingTool::Tick), AnnotationKind::Check);
        assert_eq!(kind(GradingTool::Cross), AnnotationKind::Cross);
        assert_eq!(kind(GradingTool::Oval), AnnotationKind::Circle);
        assert_eq!(kind(GradingTool::TextBox), AnnotationKind::Text);
        assert!(build_stamp(GradingTool::Pen, at, 1.0, theme::EMPHASIS).is_none());
        assert!(build_stamp(GradingTool::Eraser, at, 1.0, theme::EMPHASIS).is_none());
    }

    #[test]
    fn test_stamp_size_follows_scale() {
        let small = build_stamp(GradingTool::Oval, Vec2::ZERO, 1.0, theme::EMPHASIS).unwrap();
        let large = build_stamp(GradingTool::Oval, Vec2::ZERO, 2.0, theme::EMPHASIS).unwrap();
        assert_eq!(large.shape.extent(), small.shape.extent() * 2.0);
        assert_eq!(large.shape.stroke_width(), small.shape.stroke_width() * 2.0);
    }

    #[test]
    fn test_text_box_starts_empty() {
        let obj = build_stamp(GradingTool::TextBox, Vec2::new(80.0, 80.0), 1.0, theme::EMPHASIS)
            .unwrap();
        assert!(matches!(obj.shape, Shape::Text { ref content, .. } if content.is_empty()));
    }

    #[test]
    fn test_fit_on_surface_keeps_stamp_on_page() {
        let viewport = PageViewport::new(1, 600.0, 800.0, 1.0);
        let obj = build_stamp(GradingTool::Oval, Vec2::new(2.0, 798.0), 1.0, theme::EMPHASIS)
            .unwrap();
        let fitted = fit_on_surface(obj, &viewport);
        let (min, max) = (fitted.origin, fitted.origin + fitted.shape.extent());
        assert!(min.x >= 0.0 && min.y >= 0.0);
        assert!(max.x <= 600.0 && max.y <= 800.0);
    }
}
