//! Message types for grading session operations.

use bevy::prelude::*;

/// Open an answer sheet from the sheet list.
#[derive(Message)]
pub struct SelectSheetRequest {
    pub sheet_id: String,
}

#[derive(Message)]
pub struct SubmitGradingRequest;

/// Show another page of the open sheet (clamped to the page range).
#[derive(Message)]
pub struct ChangePageRequest {
    pub page_number: u32,
}

/// Re-render the open page at another scale (clamped to the zoom range).
#[derive(Message)]
pub struct ChangeScaleRequest {
    pub scale: f32,
}

#[derive(Message)]
pub struct RefreshSheetsRequest;
