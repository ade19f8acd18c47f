//! Page viewport geometry: the rendered page's size and how surface pixels
//! map onto Bevy world space.
//!
//! Surface pixels have a top-left origin and grow downward, matching the
//! renderer's report. The page sprite is centered on the world origin and
//! world space is y-up, so the two frames differ by a flip and a half-size
//! offset.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageViewport {
    pub page_number: u32,
    /// Rendered width in surface pixels (already multiplied by `scale`)
    pub width: f32,
    pub height: f32,
    /// Render scale relative to the page's natural size
    pub scale: f32,
}

impl PageViewport {
    pub fn new(page_number: u32, width: f32, height: f32, scale: f32) -> Self {
        Self {
            page_number,
            width,
            height,
            scale,
        }
    }

    /// A surface is usable only once the renderer reported a real size.
    pub fn is_sized(&self) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && self.width.is_finite()
            && self.height.is_finite()
            && self.scale > 0.0
            && self.scale.is_finite()
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x <= self.width && point.y <= self.height
    }

    pub fn clamp(&self, point: Vec2) -> Vec2 {
        point.clamp(Vec2::ZERO, self.size())
    }

    pub fn surface_to_world(&self, point: Vec2) -> Vec2 {
        Vec2::new(point.x - self.width / 2.0, self.height / 2.0 - point.y)
    }

    pub fn world_to_surface(&self, world: Vec2) -> Vec2 {
        Vec2::new(world.x + self.width / 2.0, self.height / 2.0 - world.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsized_viewport() {
        assert!(!PageViewport::new(1, 0.0, 0.0, 1.0).is_sized());
        assert!(!PageViewport::new(1, 600.0, 800.0, 0.0).is_sized());
        assert!(PageViewport::new(1, 600.0, 800.0, 1.0).is_sized());
    }

    #[test]
    fn test_surface_world_roundtrip() {
        let vp = PageViewport::new(1, 600.0, 800.0, 1.5);
        let p = Vec2::new(100.0, 200.0);
        let world = vp.surface_to_world(p);
        assert_eq!(world, Vec2::new(-200.0, 200.0));
        assert_eq!(vp.world_to_surface(world), p);
    }

    #[test]
    fn test_top_left_maps_to_upper_left_world_corner() {
        let vp = PageViewport::new(1, 600.0, 800.0, 1.0);
        assert_eq!(vp.surface_to_world(Vec2::ZERO), Vec2::new(-300.0, 400.0));
    }

    #[test]
    fn test_contains_and_clamp() {
        let vp = PageViewport::new(1, 600.0, 800.0, 1.0);
        assert!(vp.contains(Vec2::new(600.0, 800.0)));
        assert!(!vp.contains(Vec2::new(-1.0, 10.0)));
        assert_eq!(vp.clamp(Vec2::new(700.0, -5.0)), Vec2::new(600.0, 0.0));
    }
}
