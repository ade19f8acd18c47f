//! Grading tools: freehand pen and eraser plus the stamp tools.
//!
//! ## Module Structure
//!
//! - [`state`] - [`ToolState`], the tool state machine driven by pointer input
//! - [`stamps`] - Preset tick/cross/oval/text builders
//! - [`systems`] - Keyboard and pointer systems feeding the state machine
//! - [`text_edit`] - In-place egui editor for text boxes

mod stamps;
mod state;
mod systems;
mod text_edit;

use bevy::prelude::*;
use bevy::window::{CursorIcon, SystemCursorIcon};
use bevy_egui::EguiPrimaryContextPass;

pub use stamps::{build_stamp, fit_on_surface};
pub use state::{ToolPhase, ToolState};

/// Emitted whenever a tool changed objects on the live surface.
#[derive(Message, Debug, Clone, Copy)]
pub struct SurfaceEdited {
    pub page_number: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GradingTool {
    #[default]
    Pen,
    Eraser,
    Tick,
    Cross,
    Oval,
    TextBox,
}

impl GradingTool {
    pub fn display_name(&self) -> &'static str {
        match self {
            GradingTool::Pen => "Pen (P)",
            GradingTool::Eraser => "Eraser (E)",
            GradingTool::Tick => "Tick (K)",
            GradingTool::Cross => "Cross (X)",
            GradingTool::Oval => "Oval (O)",
            GradingTool::TextBox => "Text (T)",
        }
    }

    pub fn shortcut(&self) -> KeyCode {
        match self {
            GradingTool::Pen => KeyCode::KeyP,
            GradingTool::Eraser => KeyCode::KeyE,
            GradingTool::Tick => KeyCode::KeyK,
            GradingTool::Cross => KeyCode::KeyX,
            GradingTool::Oval => KeyCode::KeyO,
            GradingTool::TextBox => KeyCode::KeyT,
        }
    }

    pub fn cursor_icon(&self) -> CursorIcon {
        match self {
            GradingTool::TextBox => CursorIcon::System(SystemCursorIcon::Text),
            _ => CursorIcon::System(SystemCursorIcon::Crosshair),
        }
    }

    pub fn all() -> &'static [GradingTool] {
        &[
            GradingTool::Pen,
            GradingTool::Eraser,
            GradingTool::Tick,
            GradingTool::Cross,
            GradingTool::Oval,
            GradingTool::TextBox,
        ]
    }

    /// Pen and eraser draw continuously; the rest stamp on click.
    pub fn is_freehand(&self) -> bool {
        matches!(self, GradingTool::Pen | GradingTool::Eraser)
    }
}

pub struct ToolsPlugin;

impl Plugin for ToolsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ToolState>()
            .add_message::<SurfaceEdited>()
            .add_systems(
                Update,
                (
                    systems::follow_surface_changes,
                    systems::handle_tool_shortcuts,
                    systems::handle_pointer,
                    systems::handle_delete_key,
                    systems::update_cursor_icon,
                )
                    .chain()
                    .run_if(systems::grading_surface_active),
            )
            .add_systems(
                EguiPrimaryContextPass,
                text_edit::text_edit_overlay.run_if(systems::grading_surface_active),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_contain_shortcuts() {
        for tool in GradingTool::all() {
            let name = tool.display_name();
            assert!(name.contains('('), "Display name should contain shortcut: {}", name);
            assert!(name.contains(')'), "Display name should contain shortcut: {}", name);
        }
    }

    #[test]
    fn test_shortcuts_are_unique() {
        let all = GradingTool::all();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.shortcut(), b.shortcut(), "{a:?} and {b:?} share a key");
            }
        }
    }

    #[test]
    fn test_freehand_tools() {
        assert!(GradingTool::Pen.is_freehand());
        assert!(GradingTool::Eraser.is_freehand());
        assert!(!GradingTool::Tick.is_freehand());
        assert!(!GradingTool::TextBox.is_freehand());
    }

    #[test]
    fn test_default_tool_is_pen() {
        assert_eq!(GradingTool::default(), GradingTool::Pen);
    }
}
