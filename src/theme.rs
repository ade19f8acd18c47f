//! Centralized color theme for the grading portal.
//!
//! Holds the annotation palette (ink colors persisted with each mark) and the
//! egui colors used by the panels.

use bevy::prelude::Color;
use bevy_egui::egui;

// ============================================================================
// Annotation Palette
// ============================================================================

/// Emphasis red used for grader ink by default
pub const EMPHASIS: Color = Color::srgb(0.86, 0.08, 0.16);

/// Paper white; the eraser paints with this
pub const PAPER: Color = Color::srgb(1.0, 1.0, 1.0);

/// Ink colors offered by the toolbar picker
pub fn ink_colors() -> [(Color, &'static str, egui::Color32); 4] {
    [
        (EMPHASIS, "Red", egui::Color32::from_rgb(219, 20, 41)),
        (Color::srgb(0.0, 0.35, 0.8), "Blue", egui::Color32::from_rgb(0, 89, 204)),
        (Color::srgb(0.0, 0.55, 0.2), "Green", egui::Color32::from_rgb(0, 140, 51)),
        (Color::srgb(0.0, 0.0, 0.0), "Black", egui::Color32::BLACK),
    ]
}

// ============================================================================
// Overlay Chrome
// ============================================================================

/// Selection outline drawn around the selected annotation
pub const SELECTION_COLOR: Color = Color::srgb(0.2, 0.6, 1.0);

/// Thin outline marking the sized overlay surface
pub const SURFACE_OUTLINE: Color = Color::srgba(0.2, 0.6, 1.0, 0.25);

/// Window clear color behind the page
pub const BACKDROP: Color = Color::srgb(0.18, 0.18, 0.2);

// ============================================================================
// UI Colors (egui)
// ============================================================================

pub mod ui {
    use bevy_egui::egui;

    /// Dark grey panel background (tool settings bar)
    pub const PANEL_BACKGROUND: egui::Color32 = egui::Color32::from_rgb(45, 45, 48);

    /// Light grey for label text
    pub const LABEL_TEXT: egui::Color32 = egui::Color32::LIGHT_GRAY;

    /// Grey for help/hint text
    pub const HINT_TEXT: egui::Color32 = egui::Color32::GRAY;

    /// Red for error messages
    pub const ERROR_TEXT: egui::Color32 = egui::Color32::RED;

    /// Green for completed sheets and successful saves
    pub const SUCCESS_TEXT: egui::Color32 = egui::Color32::from_rgb(100, 200, 100);

    /// Amber for sheets still waiting to be graded
    pub const PENDING_TEXT: egui::Color32 = egui::Color32::from_rgb(230, 170, 60);
}

// ============================================================================
// Color Conversion Utilities
// ============================================================================

/// Convert a Bevy Color to egui Color32 (preserving alpha)
pub fn bevy_to_egui(color: Color) -> egui::Color32 {
    let srgba = color.to_srgba();
    egui::Color32::from_rgba_unmultiplied(
        (srgba.red * 255.0) as u8,
        (srgba.green * 255.0) as u8,
        (srgba.blue * 255.0) as u8,
        (srgba.alpha * 255.0) as u8,
    )
}

/// Flatten a Bevy Color into the `[r, g, b, a]` form persisted in records
pub fn color_to_array(color: Color) -> [f32; 4] {
    let srgba = color.to_srgba();
    [srgba.red, srgba.green, srgba.blue, srgba.alpha]
}

/// Rebuild a Bevy Color from its persisted `[r, g, b, a]` form
pub fn array_to_color(arr: [f32; 4]) -> Color {
    Color::srgba(arr[0], arr[1], arr[2], arr[3])
}
