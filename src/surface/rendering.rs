//! Drawing the live surface: vector objects as retained gizmos, each at its
//! own stroke width, text through egui labels.

use bevy::camera::visibility::RenderLayers;
use bevy::gizmos::config::{GizmoConfigGroup, GizmoConfigStore, GizmoLineConfig, GizmoLineJoint};
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::annotation::Shape;
use crate::theme;
use crate::tools::{ToolPhase, ToolState};

use super::object::SurfaceObject;
use super::params::CameraParams;
use super::table::SurfaceTable;
use super::viewport::PageViewport;

/// Page outline and selection box
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct OutlineGizmos;

/// The stroke being drawn; its width follows the armed brush
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct StrokePreviewGizmos;

/// Marker for the retained gizmo drawing one surface object.
#[derive(Component)]
pub struct SurfaceInk;

const OUTLINE_WIDTH: f32 = 1.5;

/// Gizmo lines thinner than this vanish on screen
const MIN_LINE_WIDTH: f32 = 1.0;

/// Ink sits just above the page sprite
const INK_Z: f32 = 1.0;

/// What the retained ink entities currently show.
#[derive(Default)]
pub struct DrawnInk {
    generation: u64,
    objects: Vec<SurfaceObject>,
}

pub fn configure_surface_gizmos(mut config_store: ResMut<GizmoConfigStore>) {
    let (outline, _) = config_store.config_mut::<OutlineGizmos>();
    outline.render_layers = RenderLayers::layer(0);
    outline.line.width = OUTLINE_WIDTH;

    let (preview, _) = config_store.config_mut::<StrokePreviewGizmos>();
    preview.render_layers = RenderLayers::layer(0);
    preview.line.joints = GizmoLineJoint::Round(8);
}

/// Screen width of an object's lines: its own stroke width, already in
/// surface pixels of the current render. Text has no lines.
fn line_width(shape: &Shape) -> Option<f32> {
    match shape {
        Shape::Path { stroke_width, .. } | Shape::Ellipse { stroke_width, .. } => {
            Some(stroke_width.max(MIN_LINE_WIDTH))
        }
        Shape::Text { .. } => None,
    }
}

fn ink_line_config(width: f32) -> GizmoLineConfig {
    GizmoLineConfig {
        width,
        joints: GizmoLineJoint::Round(8),
        ..default()
    }
}

fn build_ink(viewport: &PageViewport, object: &SurfaceObject) -> Option<(GizmoAsset, f32)> {
    let width = line_width(&object.shape)?;
    let mut gizmo = GizmoAsset::new();
    match &object.shape {
        Shape::Path { strokes, .. } => {
            for stroke in strokes {
                gizmo.linestrip_2d(
                    stroke
                        .iter()
                        .map(|p| viewport.surface_to_world(object.origin + *p)),
                    object.color,
                );
            }
        }
        Shape::Ellipse { rx, ry, .. } => {
            gizmo.ellipse_2d(
                Isometry2d::from_translation(viewport.surface_to_world(object.center())),
                Vec2::new(*rx, *ry),
                object.color,
            );
        }
        Shape::Text { .. } => return None,
    }
    Some((gizmo, width))
}

/// Rebuild the retained ink whenever the surface or its objects changed.
pub fn sync_surface_ink(
    mut commands: Commands,
    table: Res<SurfaceTable>,
    mut gizmo_assets: ResMut<Assets<GizmoAsset>>,
    existing: Query<Entity, With<SurfaceInk>>,
    mut drawn: Local<DrawnInk>,
) {
    let objects = table.active().map(|s| s.objects()).unwrap_or_default();
    if drawn.generation == table.generation() && drawn.objects.as_slice() == objects {
        return;
    }
    drawn.generation = table.generation();
    drawn.objects = objects.to_vec();

    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }
    let Some(surface) = table.active() else {
        return;
    };

    for object in surface.objects() {
        let Some((gizmo, width)) = build_ink(surface.viewport(), object) else {
            continue;
        };
        commands.spawn((
            Gizmo {
                handle: gizmo_assets.add(gizmo),
                line_config: ink_line_config(width),
                ..default()
            },
            Transform::from_xyz(0.0, 0.0, INK_Z),
            SurfaceInk,
        ));
    }
}

pub fn render_surface_outlines(mut outline: Gizmos<OutlineGizmos>, table: Res<SurfaceTable>) {
    let Some(surface) = table.active() else {
        return;
    };
    let viewport = surface.viewport();

    outline.rect_2d(
        Isometry2d::IDENTITY,
        viewport.size(),
        theme::SURFACE_OUTLINE,
    );

    if let Some(selected) = surface.selected().and_then(|id| surface.get(id)) {
        let (min, max) = selected.bounds();
        let pad = Vec2::splat(4.0);
        let center = viewport.surface_to_world((min + max) / 2.0);
        outline.rect_2d(
            Isometry2d::from_translation(center),
            max - min + pad * 2.0,
            theme::SELECTION_COLOR,
        );
    }
}

/// Match the preview line width to the armed brush.
pub fn update_preview_width(
    table: Res<SurfaceTable>,
    state: Res<ToolState>,
    mut config_store: ResMut<GizmoConfigStore>,
) {
    if !state.is_changed() && !table.is_changed() {
        return;
    }
    let scale = table.active().map(|s| s.scale()).unwrap_or(1.0);
    let (config, _) = config_store.config_mut::<StrokePreviewGizmos>();
    config.line.width = state.brush(scale).width.max(MIN_LINE_WIDTH);
}

/// Live ink of the stroke being drawn.
pub fn render_stroke_preview(
    mut preview: Gizmos<StrokePreviewGizmos>,
    table: Res<SurfaceTable>,
    state: Res<ToolState>,
) {
    let ToolPhase::Stroking { points } = state.phase() else {
        return;
    };
    let Some(surface) = table.active() else {
        return;
    };
    if points.len() < 2 {
        return;
    }

    let viewport = surface.viewport();
    preview.linestrip_2d(
        points.iter().map(|p| viewport.surface_to_world(*p)),
        state.brush(viewport.scale).color,
    );
}

/// Text annotations as egui labels pinned to their surface position.
pub fn render_surface_text(
    mut contexts: EguiContexts,
    camera: CameraParams,
    table: Res<SurfaceTable>,
    state: Res<ToolState>,
) {
    let Some(surface) = table.active() else {
        return;
    };
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };
    let editing = state.editing_text();

    for object in surface.objects() {
        let Shape::Text { content, font_size } = &object.shape else {
            continue;
        };
        if content.is_empty() || editing == Some(object.id) {
            continue;
        }
        let Some(screen_pos) = camera.surface_to_screen(surface.viewport(), object.origin) else {
            continue;
        };

        egui::Area::new(egui::Id::new(("surface_text", object.id.0)))
            .fixed_pos(egui::pos2(screen_pos.x, screen_pos.y))
            .pivot(egui::Align2::LEFT_TOP)
            .order(egui::Order::Background)
            .interactable(false)
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new(content)
                        .color(theme::bevy_to_egui(object.color))
                        .size(*font_size),
                );
            });
    }
}
