use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::constants::{MAX_SCALE, MIN_SCALE, SCALE_STEP};
use crate::session::{ChangePageRequest, ChangeScaleRequest, GradingSession, SessionPhase};
use crate::surface::SurfaceTable;
use crate::theme;
use crate::tools::{GradingTool, SurfaceEdited, ToolState};

/// Main toolbar: grading tools, page navigation and zoom
pub fn toolbar_ui(
    mut contexts: EguiContexts,
    mut tools: ResMut<ToolState>,
    mut table: ResMut<SurfaceTable>,
    session: Res<GradingSession>,
    mut pages: MessageWriter<ChangePageRequest>,
    mut scales: MessageWriter<ChangeScaleRequest>,
    mut edited: MessageWriter<SurfaceEdited>,
) -> Result {
    egui::TopBottomPanel::top("main_toolbar")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 8)),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = 4.0;

                // Students get navigation only
                if !session.is_read_only() {
                    for tool in GradingTool::all() {
                        let selected = tools.tool() == *tool;
                        let button = egui::Button::new(
                            egui::RichText::new(tool.display_name()).size(14.0).strong(),
                        )
                        .min_size(egui::vec2(0.0, 28.0))
                        .selected(selected);

                        if ui.add_enabled(session.accepts_edits(), button).clicked() {
                            let surface = table.active_mut();
                            let page_number = surface.as_ref().map(|s| s.page_number());
                            if tools.select(*tool, surface)
                                && let Some(page_number) = page_number
                            {
                                edited.write(SurfaceEdited { page_number });
                            }
                        }
                    }

                    ui.add_space(8.0);
                    ui.separator();
                    ui.add_space(8.0);
                }

                let has_sheet = session.sheet().is_some() && session.page_count() > 0;
                let page = session.current_page();

                ui.add_enabled_ui(has_sheet, |ui| {
                    if ui.button("<").on_hover_text("Previous page (PgUp)").clicked() && page > 1 {
                        pages.write(ChangePageRequest {
                            page_number: page - 1,
                        });
                    }
                    ui.label(format!("Page {} / {}", page, session.page_count().max(1)));
                    if ui.button(">").on_hover_text("Next page (PgDn)").clicked() {
                        pages.write(ChangePageRequest {
                            page_number: page + 1,
                        });
                    }

                    ui.add_space(8.0);
                    ui.separator();
                    ui.add_space(8.0);

                    let scale = session.scale();
                    if ui
                        .add_enabled(scale > MIN_SCALE, egui::Button::new("-"))
                        .on_hover_text("Zoom out (-)")
                        .clicked()
                    {
                        scales.write(ChangeScaleRequest {
                            scale: scale - SCALE_STEP,
                        });
                    }
                    ui.label(format!("{:.0}%", scale * 100.0));
                    if ui
                        .add_enabled(scale < MAX_SCALE, egui::Button::new("+"))
                        .on_hover_text("Zoom in (+)")
                        .clicked()
                    {
                        scales.write(ChangeScaleRequest {
                            scale: scale + SCALE_STEP,
                        });
                    }
                });

                // Right-aligned session status
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let (text, color) = phase_label(session.phase());
                    if !text.is_empty() {
                        ui.colored_label(color, egui::RichText::new(text).strong());
                    }
                    if let Some(sheet) = session.sheet() {
                        ui.label(
                            egui::RichText::new(format!("{} / {}", sheet.exam_id, sheet.student_id))
                                .color(theme::ui::LABEL_TEXT),
                        );
                    }
                });
            });
        });
    Ok(())
}

fn phase_label(phase: SessionPhase) -> (&'static str, egui::Color32) {
    match phase {
        SessionPhase::Unselected => ("", theme::ui::HINT_TEXT),
        SessionPhase::Loaded => ("Loaded", theme::ui::LABEL_TEXT),
        SessionPhase::Dirty => ("Unsaved changes", theme::ui::PENDING_TEXT),
        SessionPhase::Saving => ("Saving...", theme::ui::PENDING_TEXT),
        SessionPhase::Saved => ("Saved", theme::ui::SUCCESS_TEXT),
        SessionPhase::Failed => ("Save failed", theme::ui::ERROR_TEXT),
    }
}

/// Secondary toolbar with the ink picker for tools that draw in color
pub fn tool_settings_ui(
    mut contexts: EguiContexts,
    mut tools: ResMut<ToolState>,
    mut table: ResMut<SurfaceTable>,
    session: Res<GradingSession>,
) -> Result {
    if session.is_read_only() || session.sheet().is_none() {
        return Ok(());
    }

    egui::TopBottomPanel::top("tool_settings")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 6))
                .fill(theme::ui::PANEL_BACKGROUND),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = 6.0;

                if tools.tool() == GradingTool::Eraser {
                    ui.label(
                        egui::RichText::new("Eraser paints over marks with the paper color")
                            .color(theme::ui::HINT_TEXT),
                    );
                    return;
                }

                ui.label(egui::RichText::new("Ink:").color(theme::ui::LABEL_TEXT));

                for (color, name, egui_color) in theme::ink_colors() {
                    let current = tools.ink().to_srgba();
                    let srgba = color.to_srgba();
                    let is_selected = (current.red - srgba.red).abs() < 0.01
                        && (current.green - srgba.green).abs() < 0.01
                        && (current.blue - srgba.blue).abs() < 0.01;

                    let button = egui::Button::new("")
                        .fill(egui_color)
                        .min_size(egui::vec2(18.0, 18.0))
                        .stroke(if is_selected {
                            egui::Stroke::new(2.0, egui::Color32::WHITE)
                        } else {
                            egui::Stroke::new(1.0, egui::Color32::DARK_GRAY)
                        });

                    let response = ui.add(button);
                    if response.clicked() {
                        tools.set_ink(color, table.active_mut());
                    }
                    response.on_hover_text(name);
                }

                ui.add_space(12.0);
                ui.separator();
                ui.add_space(12.0);

                let hint = if tools.tool().is_freehand() {
                    "Drag to draw"
                } else {
                    "Click to stamp, drag a mark to move it, Delete removes it"
                };
                ui.label(egui::RichText::new(hint).color(theme::ui::HINT_TEXT).size(11.0));
            });
        });
    Ok(())
}
