//! The annotation surface laid over the rendered page.
//!
//! ## Module Structure
//!
//! - [`viewport`] - Page size/scale and surface <-> world mapping
//! - [`object`] - Live vector objects
//! - [`page`] - [`PageSurface`], the object container for one rendered page
//! - [`table`] - [`SurfaceTable`], which owns the single live surface
//! - [`camera`] - Page camera with pan and scroll
//! - [`params`] - Cursor conversion SystemParams
//! - [`rendering`] - Retained gizmo ink per object, outlines, egui text

mod camera;
mod object;
mod page;
mod params;
mod rendering;
mod table;
mod viewport;

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

pub use object::{NewObject, ObjectId, SurfaceObject};
pub use page::{BrushParams, PageSurface, SurfaceMode};
pub use params::{is_cursor_over_ui, CameraParams};
pub use table::SurfaceTable;
pub use viewport::PageViewport;

pub struct SurfacePlugin;

impl Plugin for SurfacePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SurfaceTable>()
            .init_gizmo_group::<rendering::OutlineGizmos>()
            .init_gizmo_group::<rendering::StrokePreviewGizmos>()
            .add_systems(
                Startup,
                (camera::spawn_camera, rendering::configure_surface_gizmos),
            )
            .add_systems(
                Update,
                (
                    camera::recenter_on_new_surface,
                    camera::camera_pan,
                    camera::camera_scroll,
                    rendering::sync_surface_ink,
                    rendering::render_surface_outlines,
                    rendering::update_preview_width,
                    rendering::render_stroke_preview,
                ),
            )
            .add_systems(EguiPrimaryContextPass, rendering::render_surface_text);
    }
}
