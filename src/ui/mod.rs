//! egui panels and dialogs.
//!
//! ## Module Structure
//!
//! - [`sheet_list`] - Left panel with the exam's answer sheets
//! - [`marks_panel`] - Right panel with mark entry or the saved breakdown
//! - [`toolbar`] - Tool buttons, ink picker, page navigation and zoom
//! - [`dialogs`] - Notification bar and startup warnings
//! - [`help`] - Help popup and its keyboard shortcut

mod dialogs;
mod help;
mod marks_panel;
mod sheet_list;
mod toolbar;

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<help::HelpWindowState>()
            // Side panels must render first so top panels fit between them
            .add_systems(
                EguiPrimaryContextPass,
                (sheet_list::sheet_list_ui, marks_panel::marks_panel_ui).chain(),
            )
            .add_systems(
                EguiPrimaryContextPass,
                (
                    toolbar::toolbar_ui,
                    toolbar::tool_settings_ui,
                    dialogs::notice_bar_ui,
                )
                    .chain()
                    .after(marks_panel::marks_panel_ui),
            )
            .add_systems(
                EguiPrimaryContextPass,
                (
                    dialogs::missing_pages_warning_ui,
                    dialogs::config_reset_notification_ui,
                    help::help_popup_ui,
                )
                    .after(dialogs::notice_bar_ui),
            )
            .add_systems(Update, help::handle_help_shortcut);
    }
}
