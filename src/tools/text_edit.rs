//! In-place editor for the text box that has focus.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::surface::{CameraParams, SurfaceTable};

use super::{SurfaceEdited, ToolState};

/// Shows an egui text field over the focused text box.
pub fn text_edit_overlay(
    mut contexts: EguiContexts,
    mut state: ResMut<ToolState>,
    mut table: ResMut<SurfaceTable>,
    camera: CameraParams,
    mut edited: MessageWriter<SurfaceEdited>,
) {
    let Some(object) = state.editing_text() else {
        return;
    };
    let Some(surface) = table.active_mut() else {
        return;
    };
    let page_number = surface.page_number();

    let Some(origin) = surface.get(object).map(|o| o.origin) else {
        // Object vanished (deleted or surface replaced)
        state.reset();
        return;
    };
    let Some(screen_pos) = camera.surface_to_screen(surface.viewport(), origin) else {
        return;
    };

    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        if state.cancel_text(surface) {
            edited.write(SurfaceEdited { page_number });
        }
        return;
    }

    let mut should_confirm = false;

    egui::Area::new(egui::Id::new("text_box_input"))
        .fixed_pos(egui::pos2(screen_pos.x, screen_pos.y))
        .pivot(egui::Align2::LEFT_TOP)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                let response = ui.add(
                    egui::TextEdit::singleline(&mut state.text_buffer)
                        .hint_text("Comment...")
                        .desired_width(220.0),
                );

                if !response.has_focus() && !response.lost_focus() {
                    response.request_focus();
                }

                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    should_confirm = true;
                }

                ui.label(
                    egui::RichText::new("Enter to place, Esc to cancel")
                        .small()
                        .color(crate::theme::ui::HINT_TEXT),
                );
            });
        });

    if should_confirm && state.confirm_text_edit(surface) {
        edited.write(SurfaceEdited { page_number });
    }
}
