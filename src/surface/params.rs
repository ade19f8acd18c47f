//! SystemParam bundles for pointer handling over the page.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

use super::camera::PageCamera;
use super::viewport::PageViewport;

/// Camera and window access for cursor-to-surface conversion
#[derive(SystemParam)]
pub struct CameraParams<'w, 's> {
    pub window: Query<'w, 's, &'static Window, With<PrimaryWindow>>,
    pub camera: Query<'w, 's, (&'static Camera, &'static GlobalTransform), With<PageCamera>>,
}

impl CameraParams<'_, '_> {
    pub fn cursor_world_pos(&self) -> Option<Vec2> {
        let window = self.window.single().ok()?;
        let (camera, transform) = self.camera.single().ok()?;
        let cursor_pos = window.cursor_position()?;
        camera.viewport_to_world_2d(transform, cursor_pos).ok()
    }

    /// Cursor in surface pixels of the given viewport (may lie outside it).
    pub fn cursor_surface_pos(&self, viewport: &PageViewport) -> Option<Vec2> {
        self.cursor_world_pos()
            .map(|world| viewport.world_to_surface(world))
    }

    /// Screen position of a point in surface pixels, for egui overlays.
    pub fn surface_to_screen(&self, viewport: &PageViewport, point: Vec2) -> Option<Vec2> {
        let (camera, transform) = self.camera.single().ok()?;
        let world = viewport.surface_to_world(point);
        camera.world_to_viewport(transform, world.extend(0.0)).ok()
    }
}

pub fn is_cursor_over_ui(contexts: &mut EguiContexts) -> bool {
    contexts
        .ctx_mut()
        .map(|ctx| ctx.is_pointer_over_area())
        .unwrap_or(false)
}
