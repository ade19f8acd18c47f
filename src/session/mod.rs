//! Grading session: one answer sheet from selection to save.
//!
//! ## Module Structure
//!
//! - [`controller`] - [`GradingSession`] state machine and the blocking
//!   load/save routines run on the IO pool
//! - [`messages`] - Requests from the UI and keyboard
//! - [`systems`] - Request handlers, task polling, render-to-surface sync
//!
//! ## Flow
//!
//! Selecting a sheet fetches the assignment and stored annotations, then asks
//! for page 1. Each `RenderComplete` rebuilds the live surface from the
//! buffered records. Page and zoom changes snapshot the live surface into the
//! buffer first. Submit writes question rows, the total and status, then
//! replaces the annotation set.

mod controller;
mod messages;
mod systems;

use bevy::prelude::*;

use crate::config::ConfigLoaded;
use crate::render::render_requested_pages;

pub use controller::{GradingSession, SessionPhase};
pub use messages::{
    ChangePageRequest, ChangeScaleRequest, RefreshSheetsRequest, SelectSheetRequest,
    SubmitGradingRequest,
};
pub use systems::{SessionNotice, SheetDirectory};

pub struct GradingPlugin;

impl Plugin for GradingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GradingSession>()
            .init_resource::<SheetDirectory>()
            .init_resource::<SessionNotice>()
            .add_message::<SelectSheetRequest>()
            .add_message::<SubmitGradingRequest>()
            .add_message::<ChangePageRequest>()
            .add_message::<ChangeScaleRequest>()
            .add_message::<RefreshSheetsRequest>()
            .add_systems(Startup, systems::setup_backends.after(ConfigLoaded))
            .add_systems(
                Update,
                (
                    systems::refresh_sheets_system,
                    systems::poll_list_tasks,
                    systems::select_sheet_system,
                    systems::poll_load_tasks,
                    systems::track_surface_edits,
                    systems::navigation_shortcuts,
                    systems::change_page_system,
                    systems::change_scale_system,
                    systems::submit_grading_system,
                    systems::poll_save_tasks,
                )
                    .chain()
                    .before(render_requested_pages),
            )
            .add_systems(
                Update,
                (
                    systems::sync_surface_on_render,
                    systems::report_render_failures,
                )
                    .after(render_requested_pages),
            );
    }
}
