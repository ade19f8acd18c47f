//! Help popup window and keyboard shortcut handling.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::session::GradingSession;
use crate::tools::GradingTool;

/// Resource to track whether the help window is open.
#[derive(Resource, Default)]
pub struct HelpWindowState {
    pub is_open: bool,
}

/// What each grading tool does, for the help window.
fn tool_description(tool: GradingTool) -> &'static str {
    match tool {
        GradingTool::Pen => "Freehand ink",
        GradingTool::Eraser => "Paint over marks with the paper color",
        GradingTool::Tick => "Stamp a tick",
        GradingTool::Cross => "Stamp a cross",
        GradingTool::Oval => "Stamp an oval around an answer",
        GradingTool::TextBox => "Place a text box and type into it",
    }
}

fn key_name(key: KeyCode) -> String {
    format!("{:?}", key).trim_start_matches("Key").to_string()
}

pub fn help_popup_ui(
    mut contexts: EguiContexts,
    mut help_state: ResMut<HelpWindowState>,
    session: Res<GradingSession>,
) -> Result {
    if !help_state.is_open {
        return Ok(());
    }

    let ctx = contexts.ctx_mut()?;

    egui::Window::new("Help")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .default_width(380.0)
        .show(ctx, |ui| {
            ui.heading("Papermark");
            ui.horizontal(|ui| {
                ui.label("Version:");
                ui.strong(env!("CARGO_PKG_VERSION"));
            });
            ui.separator();

            if !session.is_read_only() {
                ui.heading("Tools");
                egui::Grid::new("tools_grid")
                    .num_columns(2)
                    .spacing([20.0, 4.0])
                    .show(ui, |ui| {
                        for tool in GradingTool::all() {
                            ui.strong(key_name(tool.shortcut()));
                            ui.label(tool_description(*tool));
                            ui.end_row();
                        }

                        ui.strong("Delete / Backspace");
                        ui.label("Remove the selected mark");
                        ui.end_row();

                        ui.strong("Enter / Escape");
                        ui.label("Confirm / cancel a text box");
                        ui.end_row();
                    });

                ui.add_space(10.0);
                ui.separator();
            }

            ui.heading("Navigation");
            egui::Grid::new("navigation_grid")
                .num_columns(2)
                .spacing([20.0, 4.0])
                .show(ui, |ui| {
                    ui.strong("PgUp / PgDn");
                    ui.label("Previous / next page");
                    ui.end_row();

                    ui.strong("+ / -");
                    ui.label("Zoom in / out");
                    ui.end_row();

                    ui.strong("Mouse wheel");
                    ui.label("Scroll the page");
                    ui.end_row();

                    ui.strong("Middle drag");
                    ui.label("Pan");
                    ui.end_row();

                    ui.strong("H");
                    ui.label("Toggle this window");
                    ui.end_row();
                });

            ui.add_space(10.0);

            ui.with_layout(egui::Layout::right_to_left(egui::Align::TOP), |ui| {
                if ui.button("Close").clicked() {
                    help_state.is_open = false;
                }
            });
        });

    // Close on Escape key
    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        help_state.is_open = false;
    }

    Ok(())
}

pub fn handle_help_shortcut(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut help_state: ResMut<HelpWindowState>,
    mut contexts: EguiContexts,
) {
    // Don't toggle if typing in a text field
    if let Ok(ctx) = contexts.ctx_mut()
        && ctx.wants_keyboard_input()
    {
        return;
    }

    if keyboard.just_pressed(KeyCode::KeyH) {
        help_state.is_open = !help_state.is_open;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_name_strips_prefix() {
        assert_eq!(key_name(KeyCode::KeyP), "P");
        assert_eq!(key_name(GradingTool::TextBox.shortcut()), "T");
    }
}
