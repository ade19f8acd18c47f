//! Centralized constants used across the application.
//!
//! This module contains magic numbers and configuration values that are used
//! in multiple places or would benefit from being named constants.

/// Default window width in pixels
pub const DEFAULT_WINDOW_WIDTH: f32 = 1600.0;

/// Default window height in pixels
pub const DEFAULT_WINDOW_HEIGHT: f32 = 1000.0;

/// Pen stroke width in surface pixels at scale 1.0
pub const PEN_WIDTH: f32 = 2.0;

/// Eraser stroke width in surface pixels at scale 1.0
pub const ERASER_WIDTH: f32 = 20.0;

/// Stroke width used by tick/cross/oval stamps
pub const STAMP_STROKE_WIDTH: f32 = 3.0;

/// Edge length of the square a tick or cross stamp is drawn in
pub const STAMP_SIZE: f32 = 40.0;

/// Default font size of a placed text box
pub const TEXT_FONT_SIZE: f32 = 20.0;

/// Minimum distance between consecutive freehand points (reduces point count)
pub const MIN_POINT_SPACING: f32 = 2.0;

/// Render scale limits and step for zooming
pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 3.0;
pub const SCALE_STEP: f32 = 0.25;
