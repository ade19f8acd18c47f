//! Live vector objects on a page surface.

use bevy::prelude::*;

use crate::annotation::{AnnotationKind, Shape};

/// Surface-local object handle; never reused within one surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

/// Everything needed to put a new object on a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct NewObject {
    pub kind: AnnotationKind,
    pub shape: Shape,
    /// Top-left of the bounding box, in surface pixels
    pub origin: Vec2,
    pub color: Color,
    /// `None` for marks placed in this session (the grader is filled in on encode)
    pub author_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceObject {
    pub id: ObjectId,
    pub kind: AnnotationKind,
    pub shape: Shape,
    pub origin: Vec2,
    pub color: Color,
    pub author_id: Option<String>,
    /// Selectable and movable; false on read-only surfaces
    pub interactive: bool,
}

impl SurfaceObject {
    /// Bounding box as (min, max) corners in surface pixels.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        (self.origin, self.origin + self.shape.extent())
    }

    pub fn center(&self) -> Vec2 {
        self.origin + self.shape.extent() / 2.0
    }

    /// Hit test with a point in surface pixels.
    pub fn contains(&self, point: Vec2) -> bool {
        self.shape.hit(point - self.origin)
    }

    /// Text boxes with nothing typed into them.
    pub fn is_blank_text(&self) -> bool {
        matches!(&self.shape, Shape::Text { content, .. } if content.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ellipse_at(origin: Vec2) -> SurfaceObject {
        SurfaceObject {
            id: ObjectId(1),
            kind: AnnotationKind::Circle,
            shape: Shape::Ellipse {
                rx: 30.0,
                ry: 20.0,
                stroke_width: 3.0,
            },
            origin,
            color: Color::BLACK,
            author_id: None,
            interactive: true,
        }
    }

    #[test]
    fn test_bounds_and_center() {
        let obj = ellipse_at(Vec2::new(100.0, 50.0));
        assert_eq!(obj.bounds(), (Vec2::new(100.0, 50.0), Vec2::new(160.0, 90.0)));
        assert_eq!(obj.center(), Vec2::new(130.0, 70.0));
    }

    #[test]
    fn test_contains_uses_surface_coordinates() {
        let obj = ellipse_at(Vec2::new(100.0, 50.0));
        assert!(obj.contains(Vec2::new(130.0, 70.0)));
        assert!(!obj.contains(Vec2::new(10.0, 10.0)));
    }

    #[test]
    fn test_blank_text() {
        let mut obj = ellipse_at(Vec2::ZERO);
        assert!(!obj.is_blank_text());
        obj.shape = Shape::Text {
            content: "  ".to_string(),
            font_size: 20.0,
        };
        assert!(obj.is_blank_text());
    }
}
