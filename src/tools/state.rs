//! Tool state machine: how pointer input on the page surface is interpreted.
//!
//! A tool is always selected. What is in progress under it is tracked by
//! [`ToolPhase`]; `Idle` is the resting phase between gestures. Every method
//! that may alter the surface returns `true` when it did, so callers can mark
//! the session dirty.

use bevy::prelude::*;

use crate::annotation::{AnnotationKind, Shape};
use crate::constants::{ERASER_WIDTH, MIN_POINT_SPACING, PEN_WIDTH};
use crate::surface::{BrushParams, NewObject, ObjectId, PageSurface};
use crate::theme;

use super::{build_stamp, fit_on_surface, GradingTool};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ToolPhase {
    #[default]
    Idle,
    /// Freehand ink being captured, in surface pixels
    Stroking { points: Vec<Vec2> },
    /// An existing object picked up by a stamp tool
    Dragging { object: ObjectId, last: Vec2 },
    /// A text box has keyboard focus
    EditingText { object: ObjectId },
}

#[derive(Resource, Debug)]
pub struct ToolState {
    tool: GradingTool,
    phase: ToolPhase,
    ink: Color,
    /// Content of the text box being edited
    pub text_buffer: String,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            tool: GradingTool::default(),
            phase: ToolPhase::Idle,
            ink: theme::EMPHASIS,
            text_buffer: String::new(),
        }
    }
}

impl ToolState {
    pub fn tool(&self) -> GradingTool {
        self.tool
    }

    pub fn phase(&self) -> &ToolPhase {
        &self.phase
    }

    pub fn ink(&self) -> Color {
        self.ink
    }

    pub fn editing_text(&self) -> Option<ObjectId> {
        match self.phase {
            ToolPhase::EditingText { object } => Some(object),
            _ => None,
        }
    }

    /// Brush the selected tool draws with at the given render scale.
    pub fn brush(&self, scale: f32) -> BrushParams {
        match self.tool {
            GradingTool::Eraser => BrushParams {
                color: theme::PAPER,
                width: ERASER_WIDTH * scale,
            },
            _ => BrushParams {
                color: self.ink,
                width: PEN_WIDTH * scale,
            },
        }
    }

    /// Push the current brush to a surface. Objects are untouched.
    pub fn arm(&self, surface: &mut PageSurface) {
        let brush = self.brush(surface.scale());
        if surface.brush() != brush {
            surface.set_brush(brush);
        }
    }

    /// Switch tools. An in-progress gesture is finished first.
    pub fn select(&mut self, tool: GradingTool, surface: Option<&mut PageSurface>) -> bool {
        let changed = match surface {
            Some(surface) => {
                let changed = self.finish_gesture(surface);
                self.tool = tool;
                self.arm(surface);
                changed
            }
            None => {
                self.phase = ToolPhase::Idle;
                self.tool = tool;
                false
            }
        };
        if changed {
            debug!("Finished in-progress gesture on switch to {:?}", tool);
        }
        changed
    }

    pub fn set_ink(&mut self, ink: Color, surface: Option<&mut PageSurface>) {
        self.ink = ink;
        if let Some(surface) = surface {
            self.arm(surface);
        }
    }

    /// Complete whatever is in progress: a stroke with at least two points is
    /// committed, a shorter one is dropped, a text edit is confirmed.
    pub fn finish_gesture(&mut self, surface: &mut PageSurface) -> bool {
        match std::mem::take(&mut self.phase) {
            ToolPhase::Stroking { points } => self.commit_stroke(surface, points),
            ToolPhase::EditingText { object } => self.confirm_text(surface, object),
            ToolPhase::Dragging { .. } | ToolPhase::Idle => false,
        }
    }

    /// Forget in-progress work without touching any surface.
    pub fn reset(&mut self) {
        self.phase = ToolPhase::Idle;
        self.text_buffer.clear();
    }

    pub fn pointer_down(&mut self, surface: &mut PageSurface, pos: Vec2) -> bool {
        if !surface.accepts_input() {
            debug!(
                "Ignoring {:?} at ({}, {}): page {} surface is not ready",
                self.tool,
                pos.x,
                pos.y,
                surface.page_number()
            );
            return false;
        }
        if !surface.viewport().contains(pos) {
            return false;
        }

        // Clicking away from a text box confirms it
        let mut changed = match self.phase {
            ToolPhase::EditingText { .. } => self.finish_gesture(surface),
            _ => false,
        };

        if self.tool.is_freehand() {
            self.arm(surface);
            surface.select(None);
            self.phase = ToolPhase::Stroking { points: vec![pos] };
            return changed;
        }

        if let Some(object) = surface.object_at(pos) {
            surface.select(Some(object));
            self.phase = ToolPhase::Dragging { object, last: pos };
            return changed;
        }

        let Some(stamp) = build_stamp(self.tool, pos, surface.scale(), self.ink) else {
            return changed;
        };
        let stamp = fit_on_surface(stamp, surface.viewport());
        if let Some(object) = surface.add(stamp) {
            changed = true;
            if self.tool == GradingTool::TextBox {
                surface.select(Some(object));
                self.text_buffer.clear();
                self.phase = ToolPhase::EditingText { object };
            } else {
                surface.select(None);
                self.phase = ToolPhase::Idle;
            }
        }
        changed
    }

    pub fn pointer_drag(&mut self, surface: &mut PageSurface, pos: Vec2) -> bool {
        let pos = surface.viewport().clamp(pos);
        match &mut self.phase {
            ToolPhase::Stroking { points } => {
                if points
                    .last()
                    .is_none_or(|last| pos.distance(*last) > MIN_POINT_SPACING)
                {
                    points.push(pos);
                }
                false
            }
            ToolPhase::Dragging { object, last } => {
                let delta = pos - *last;
                *last = pos;
                delta != Vec2::ZERO && surface.move_by(*object, delta)
            }
            _ => false,
        }
    }

    pub fn pointer_up(&mut self, surface: &mut PageSurface) -> bool {
        match self.phase {
            ToolPhase::Stroking { .. } | ToolPhase::Dragging { .. } => self.finish_gesture(surface),
            _ => false,
        }
    }

    /// Remove the selected object from the surface.
    pub fn delete_selected(&mut self, surface: &mut PageSurface) -> bool {
        if !surface.accepts_input() {
            return false;
        }
        let Some(id) = surface.selected() else {
            return false;
        };
        if self.editing_text() == Some(id) {
            self.reset();
        }
        surface.remove(id).is_some()
    }

    /// Abandon the text edit. A box that never received text is removed.
    pub fn cancel_text(&mut self, surface: &mut PageSurface) -> bool {
        let Some(object) = self.editing_text() else {
            return false;
        };
        self.reset();
        surface.select(None);
        if surface.get(object).is_some_and(|o| o.is_blank_text()) {
            return surface.remove(object).is_some();
        }
        false
    }

    /// Apply the typed text; blank text removes the box.
    pub fn confirm_text_edit(&mut self, surface: &mut PageSurface) -> bool {
        match self.phase {
            ToolPhase::EditingText { object } => {
                self.phase = ToolPhase::Idle;
                self.confirm_text(surface, object)
            }
            _ => false,
        }
    }

    fn confirm_text(&mut self, surface: &mut PageSurface, object: ObjectId) -> bool {
        let text = std::mem::take(&mut self.text_buffer);
        surface.select(None);
        if text.trim().is_empty() {
            return surface.remove(object).is_some();
        }
        surface.set_text(object, &text)
    }

    fn commit_stroke(&self, surface: &mut PageSurface, points: Vec<Vec2>) -> bool {
        if points.len() < 2 {
            return false;
        }
        let brush = surface.brush();
        let Some((origin, shape)) = Shape::path_from_absolute(vec![points], brush.width) else {
            return false;
        };
        surface
            .add(NewObject {
                kind: AnnotationKind::Pen,
                shape,
                origin,
                color: brush.color,
                author_id: None,
            })
            .is_some()
    }
}
