//! Notification bar and startup warning dialogs.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::config::{ConfigResetNotification, MissingPagesWarning};
use crate::session::SessionNotice;
use crate::theme;

/// Bottom bar with the latest session message
pub fn notice_bar_ui(mut contexts: EguiContexts, mut notice: ResMut<SessionNotice>) -> Result {
    let Some(message) = notice.message.clone() else {
        return Ok(());
    };

    egui::TopBottomPanel::bottom("session_notice")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 6)),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                let color = if notice.is_error {
                    theme::ui::ERROR_TEXT
                } else {
                    theme::ui::SUCCESS_TEXT
                };
                ui.colored_label(color, message);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("Dismiss").clicked() {
                        notice.clear();
                    }
                });
            });
        });
    Ok(())
}

/// Shown at startup when the page image directory is missing
pub fn missing_pages_warning_ui(
    mut contexts: EguiContexts,
    mut warning: ResMut<MissingPagesWarning>,
) -> Result {
    if !warning.show {
        return Ok(());
    }

    egui::Window::new("Page Images Not Found")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.label("The page image directory does not exist:");

            if let Some(ref path) = warning.path {
                ui.add_space(5.0);
                let path_str = path.to_string_lossy();
                let char_count = path_str.chars().count();
                let display_path = if char_count > 50 {
                    let tail: String = path_str.chars().skip(char_count - 47).collect();
                    format!("...{}", tail)
                } else {
                    path_str.to_string()
                };
                ui.label(egui::RichText::new(display_path).weak())
                    .on_hover_text(path_str.as_ref());
                ui.add_space(10.0);
            }

            ui.label(
                egui::RichText::new("Answer sheets cannot be displayed until it is created.")
                    .color(theme::ui::HINT_TEXT),
            );
            ui.add_space(6.0);

            if ui.button("OK").clicked() {
                warning.show = false;
            }
        });
    Ok(())
}

/// Shown when the config file could not be read and defaults were used
pub fn config_reset_notification_ui(
    mut contexts: EguiContexts,
    mut notification: ResMut<ConfigResetNotification>,
) -> Result {
    if !notification.show {
        return Ok(());
    }

    egui::Window::new("Configuration Reset")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.label("Your settings could not be loaded and were reset to defaults.");
            if let Some(reason) = &notification.reason {
                ui.add_space(5.0);
                egui::ScrollArea::vertical().max_height(120.0).show(ui, |ui| {
                    ui.colored_label(theme::ui::ERROR_TEXT, reason);
                });
            }
            ui.add_space(10.0);
            if ui.button("OK").clicked() {
                notification.show = false;
                notification.reason = None;
            }
        });
    Ok(())
}
