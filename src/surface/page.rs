//! The annotation surface for one rendered page.

use bevy::prelude::*;

use crate::annotation::Shape;
use crate::constants::PEN_WIDTH;
use crate::theme;

use super::object::{NewObject, ObjectId, SurfaceObject};
use super::viewport::PageViewport;

/// Whether objects on a surface can be picked up and edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceMode {
    /// Grader's surface: objects are selectable and movable
    #[default]
    Grading,
    /// Student viewer: objects are display-only and pointer input is ignored
    ReadOnly,
}

/// Parameters of the freehand brush currently armed on the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushParams {
    pub color: Color,
    /// Width in surface pixels
    pub width: f32,
}

impl Default for BrushParams {
    fn default() -> Self {
        Self {
            color: theme::EMPHASIS,
            width: PEN_WIDTH,
        }
    }
}

#[derive(Debug)]
pub struct PageSurface {
    viewport: PageViewport,
    mode: SurfaceMode,
    objects: Vec<SurfaceObject>,
    next_id: u64,
    selected: Option<ObjectId>,
    brush: BrushParams,
}

impl PageSurface {
    pub fn new(viewport: PageViewport, mode: SurfaceMode) -> Self {
        Self {
            viewport,
            mode,
            objects: Vec::new(),
            next_id: 1,
            selected: None,
            brush: BrushParams::default(),
        }
    }

    pub fn viewport(&self) -> &PageViewport {
        &self.viewport
    }

    pub fn page_number(&self) -> u32 {
        self.viewport.page_number
    }

    pub fn scale(&self) -> f32 {
        self.viewport.scale
    }

    pub fn mode(&self) -> SurfaceMode {
        self.mode
    }

    pub fn is_sized(&self) -> bool {
        self.viewport.is_sized()
    }

    /// Whether pointer input may create or edit objects here.
    pub fn accepts_input(&self) -> bool {
        self.mode == SurfaceMode::Grading && self.is_sized()
    }

    pub fn brush(&self) -> BrushParams {
        self.brush
    }

    /// Re-arm the freehand brush. Existing objects are untouched.
    pub fn set_brush(&mut self, brush: BrushParams) {
        self.brush = brush;
    }

    /// Add an object. Interactivity follows the surface mode.
    ///
    /// Returns `None` on an unsized surface.
    pub fn add(&mut self, object: NewObject) -> Option<ObjectId> {
        if !self.is_sized() {
            return None;
        }

        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.push(SurfaceObject {
            id,
            kind: object.kind,
            shape: object.shape,
            origin: object.origin,
            color: object.color,
            author_id: object.author_id,
            interactive: self.mode == SurfaceMode::Grading,
        });
        Some(id)
    }

    pub fn objects(&self) -> &[SurfaceObject] {
        &self.objects
    }

    pub fn get(&self, id: ObjectId) -> Option<&SurfaceObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Topmost interactive object under the point, if any.
    pub fn object_at(&self, point: Vec2) -> Option<ObjectId> {
        self.objects
            .iter()
            .rev()
            .find(|o| o.interactive && o.contains(point))
            .map(|o| o.id)
    }

    pub fn selected(&self) -> Option<ObjectId> {
        self.selected
    }

    /// Select an interactive object, or clear the selection with `None`.
    pub fn select(&mut self, id: Option<ObjectId>) -> bool {
        match id {
            None => {
                self.selected = None;
                true
            }
            Some(id) if self.get(id).is_some_and(|o| o.interactive) => {
                self.selected = Some(id);
                true
            }
            Some(_) => false,
        }
    }

    /// Translate an interactive object.
    pub fn move_by(&mut self, id: ObjectId, delta: Vec2) -> bool {
        match self.objects.iter_mut().find(|o| o.id == id) {
            Some(obj) if obj.interactive => {
                obj.origin += delta;
                true
            }
            _ => false,
        }
    }

    /// Replace the content of a text object, keeping its top-left anchor.
    pub fn set_text(&mut self, id: ObjectId, text: &str) -> bool {
        let Some(obj) = self.objects.iter_mut().find(|o| o.id == id && o.interactive) else {
            return false;
        };
        match &mut obj.shape {
            Shape::Text { content, .. } => {
                *content = text.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<SurfaceObject> {
        let index = self.objects.iter().position(|o| o.id == id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Some(self.objects.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use crate::annotation::AnnotationKind;

    use super::*;

    fn viewport() -> PageViewport {
        PageViewport::new(1, 600.0, 800.0, 1.0)
    }

    fn oval(origin: Vec2) -> NewObject {
        NewObject {
            kind: AnnotationKind::Circle,
            shape: Shape::Ellipse {
                rx: 30.0,
                ry: 20.0,
                stroke_width: 3.0,
            },
            origin,
            color: theme::EMPHASIS,
            author_id: None,
        }
    }

    #[test]
    fn test_add_assigns_unique_ids() {
        let mut surface = PageSurface::new(viewport(), SurfaceMode::Grading);
        let a = surface.add(oval(Vec2::ZERO)).unwrap();
        let b = surface.add(oval(Vec2::ZERO)).unwrap();
        assert_ne!(a, b);
        assert_eq!(surface.len(), 2);
    }

    #[test]
    fn test_add_on_unsized_surface_is_ignored() {
        let mut surface =
            PageSurface::new(PageViewport::new(2, 0.0, 0.0, 1.0), SurfaceMode::Grading);
        assert!(surface.add(oval(Vec2::ZERO)).is_none());
        assert!(surface.is_empty());
    }

    #[test]
    fn test_read_only_objects_are_not_interactive() {
        let mut surface = PageSurface::new(viewport(), SurfaceMode::ReadOnly);
        let id = surface.add(oval(Vec2::new(10.0, 10.0))).unwrap();

        assert!(!surface.get(id).unwrap().interactive);
        assert!(!surface.accepts_input());
        assert!(surface.object_at(Vec2::new(40.0, 30.0)).is_none());
        assert!(!surface.select(Some(id)));
        assert!(!surface.move_by(id, Vec2::ONE));
    }

    #[test]
    fn test_object_at_prefers_topmost() {
        let mut surface = PageSurface::new(viewport(), SurfaceMode::Grading);
        let _below = surface.add(oval(Vec2::new(10.0, 10.0))).unwrap();
        let above = surface.add(oval(Vec2::new(20.0, 10.0))).unwrap();
        assert_eq!(surface.object_at(Vec2::new(45.0, 30.0)), Some(above));
    }

    #[test]
    fn test_move_by() {
        let mut surface = PageSurface::new(viewport(), SurfaceMode::Grading);
        let id = surface.add(oval(Vec2::new(10.0, 10.0))).unwrap();
        assert!(surface.move_by(id, Vec2::new(5.0, -5.0)));
        assert_eq!(surface.get(id).unwrap().origin, Vec2::new(15.0, 5.0));
    }

    #[test]
    fn test_remove_clears_selection() {
        let mut surface = PageSurface::new(viewport(), SurfaceMode::Grading);
        let id = surface.add(oval(Vec2::ZERO)).unwrap();
        assert!(surface.select(Some(id)));
        assert!(surface.remove(id).is_some());
        assert!(surface.selected().is_none());
        assert!(surface.remove(id).is_none());
    }

    #[test]
    fn test_set_brush_keeps_objects() {
        let mut surface = PageSurface::new(viewport(), SurfaceMode::Grading);
        surface.add(oval(Vec2::ZERO));
        surface.set_brush(BrushParams {
            color: theme::PAPER,
            width: 20.0,
        });
        assert_eq!(surface.len(), 1);
        assert_eq!(surface.brush().width, 20.0);
    }

    #[test]
    fn test_set_text_only_on_text_objects() {
        let mut surface = PageSurface::new(viewport(), SurfaceMode::Grading);
        let oval_id = surface.add(oval(Vec2::ZERO)).unwrap();
        assert!(!surface.set_text(oval_id, "nope"));

        let text_id = surface
            .add(NewObject {
                kind: AnnotationKind::Text,
                shape: Shape::Text {
                    content: String::new(),
                    font_size: 20.0,
                },
                origin: Vec2::new(50.0, 50.0),
                color: theme::EMPHASIS,
                author_id: None,
            })
            .unwrap();
        assert!(surface.set_text(text_id, "See margin"));
        assert!(matches!(
            &surface.get(text_id).unwrap().shape,
            Shape::Text { content, .. } if content == "See margin"
        ));
    }
}
