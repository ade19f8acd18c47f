use bevy::prelude::*;
use bevy::window::{CursorIcon, PrimaryWindow, SystemCursorIcon};
use bevy_egui::EguiContexts;

use crate::session::GradingSession;
use crate::surface::{is_cursor_over_ui, CameraParams, SurfaceTable};

use super::{GradingTool, SurfaceEdited, ToolState};

/// Run condition: the live surface shows the session's current page and the
/// session takes edits (not read-only, not saving).
pub fn grading_surface_active(table: Res<SurfaceTable>, session: Res<GradingSession>) -> bool {
    session.takes_surface_edits(table.active())
}

/// Drop in-progress state when the surface was replaced underneath us and
/// arm the new surface with the current brush.
pub fn follow_surface_changes(
    mut state: ResMut<ToolState>,
    mut table: ResMut<SurfaceTable>,
    mut seen_generation: Local<u64>,
) {
    if *seen_generation == table.generation() {
        return;
    }
    *seen_generation = table.generation();

    state.reset();
    if let Some(surface) = table.active_mut() {
        state.arm(surface);
    }
}

pub fn handle_tool_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut state: ResMut<ToolState>,
    mut table: ResMut<SurfaceTable>,
    mut edited: MessageWriter<SurfaceEdited>,
    mut contexts: EguiContexts,
) {
    // Don't change tools if typing in a text field
    if let Ok(ctx) = contexts.ctx_mut()
        && ctx.wants_keyboard_input()
    {
        return;
    }

    let Some(tool) = GradingTool::all()
        .iter()
        .copied()
        .find(|t| keyboard.just_pressed(t.shortcut()))
    else {
        return;
    };

    let Some(surface) = table.active_mut() else {
        return;
    };
    let page_number = surface.page_number();
    if state.select(tool, Some(surface)) {
        edited.write(SurfaceEdited { page_number });
    }
}

pub fn handle_pointer(
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut state: ResMut<ToolState>,
    mut table: ResMut<SurfaceTable>,
    camera: CameraParams,
    mut contexts: EguiContexts,
    mut edited: MessageWriter<SurfaceEdited>,
) {
    let Some(surface) = table.active_mut() else {
        return;
    };
    let page_number = surface.page_number();

    let changed = if mouse_button.just_released(MouseButton::Left) {
        if let Some(pos) = camera.cursor_surface_pos(surface.viewport()) {
            state.pointer_drag(surface, pos);
        }
        state.pointer_up(surface)
    } else if mouse_button.just_pressed(MouseButton::Left) {
        if is_cursor_over_ui(&mut contexts) {
            return;
        }
        let Some(pos) = camera.cursor_surface_pos(surface.viewport()) else {
            return;
        };
        state.pointer_down(surface, pos)
    } else if mouse_button.pressed(MouseButton::Left) {
        let Some(pos) = camera.cursor_surface_pos(surface.viewport()) else {
            return;
        };
        state.pointer_drag(surface, pos)
    } else {
        false
    };

    if changed {
        edited.write(SurfaceEdited { page_number });
    }
}

pub fn handle_delete_key(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut state: ResMut<ToolState>,
    mut table: ResMut<SurfaceTable>,
    mut contexts: EguiContexts,
    mut edited: MessageWriter<SurfaceEdited>,
) {
    if !keyboard.any_just_pressed([KeyCode::Delete, KeyCode::Backspace]) {
        return;
    }
    if let Ok(ctx) = contexts.ctx_mut()
        && ctx.wants_keyboard_input()
    {
        return;
    }

    let Some(surface) = table.active_mut() else {
        return;
    };
    if state.delete_selected(surface) {
        edited.write(SurfaceEdited {
            page_number: surface.page_number(),
        });
    }
}

pub fn update_cursor_icon(
    state: Res<ToolState>,
    window_query: Query<Entity, With<PrimaryWindow>>,
    mut commands: Commands,
    mut contexts: EguiContexts,
) {
    let Ok(entity) = window_query.single() else {
        return;
    };

    // Use default cursor over UI, tool cursor over the page
    if let Ok(ctx) = contexts.ctx_mut()
        && ctx.is_pointer_over_area()
    {
        commands
            .entity(entity)
            .insert(CursorIcon::System(SystemCursorIcon::Default));
        return;
    }

    commands.entity(entity).insert(state.tool().cursor_icon());
}
