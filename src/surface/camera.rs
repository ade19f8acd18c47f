use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use super::table::SurfaceTable;

#[derive(Component)]
pub struct PageCamera;

/// Surface generation the camera was last centered for.
#[derive(Component, Default)]
pub struct CameraAnchor {
    generation: u64,
}

pub fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        PageCamera,
        CameraAnchor::default(),
        Transform::from_translation(Vec3::new(0.0, 0.0, 1000.0)),
    ));
}

/// Middle-drag pans the page.
pub fn camera_pan(
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: MessageReader<bevy::input::mouse::MouseMotion>,
    mut camera_query: Query<&mut Transform, With<PageCamera>>,
) {
    if !mouse_button.pressed(MouseButton::Middle) {
        mouse_motion.clear();
        return;
    }

    let Ok(mut transform) = camera_query.single_mut() else {
        return;
    };

    for event in mouse_motion.read() {
        transform.translation.x -= event.delta.x;
        transform.translation.y += event.delta.y;
    }
}

/// Wheel scrolls the page vertically. Zoom goes through a re-render instead
/// of the projection so annotations stay in surface pixels.
pub fn camera_scroll(
    mut scroll_events: MessageReader<MouseWheel>,
    mut camera_query: Query<&mut Transform, With<PageCamera>>,
    table: Res<SurfaceTable>,
) {
    let Ok(mut transform) = camera_query.single_mut() else {
        return;
    };

    let limit = table
        .active()
        .map(|s| s.viewport().height / 2.0)
        .unwrap_or(0.0);

    for event in scroll_events.read() {
        let amount = match event.unit {
            MouseScrollUnit::Line => event.y * 40.0,
            MouseScrollUnit::Pixel => event.y,
        };
        transform.translation.y = (transform.translation.y + amount).clamp(-limit, limit);
    }
}

/// Bring a freshly created surface to the top of the window.
pub fn recenter_on_new_surface(
    table: Res<SurfaceTable>,
    windows: Query<&Window>,
    mut camera_query: Query<(&mut Transform, &mut CameraAnchor), With<PageCamera>>,
) {
    let Ok((mut transform, mut anchor)) = camera_query.single_mut() else {
        return;
    };
    if anchor.generation == table.generation() {
        return;
    }
    anchor.generation = table.generation();

    let Some(surface) = table.active() else {
        return;
    };
    let window_height = windows.iter().next().map(|w| w.height()).unwrap_or(0.0);
    let page_height = surface.viewport().height;

    transform.translation.x = 0.0;
    transform.translation.y = if page_height > window_height {
        (page_height - window_height) / 2.0
    } else {
        0.0
    };
}
