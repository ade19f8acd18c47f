//! Left panel listing the answer sheets of the configured exam.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::config::AppConfig;
use crate::session::{GradingSession, RefreshSheetsRequest, SelectSheetRequest, SheetDirectory};
use crate::store::{AnswerSheet, GradingStatus};
use crate::theme;

fn status_label(sheet: &AnswerSheet) -> (String, egui::Color32) {
    match (sheet.status, sheet.total_marks) {
        (GradingStatus::Completed, Some(total)) => {
            (format!("Graded ({})", total), theme::ui::SUCCESS_TEXT)
        }
        (GradingStatus::Completed, None) => ("Graded".to_string(), theme::ui::SUCCESS_TEXT),
        (GradingStatus::Pending, _) => ("Pending".to_string(), theme::ui::PENDING_TEXT),
    }
}

pub fn sheet_list_ui(
    mut contexts: EguiContexts,
    directory: Res<SheetDirectory>,
    session: Res<GradingSession>,
    config: Res<AppConfig>,
    mut select: MessageWriter<SelectSheetRequest>,
    mut refresh: MessageWriter<RefreshSheetsRequest>,
) -> Result {
    egui::SidePanel::left("sheet_list")
        .default_width(220.0)
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Answer Sheets");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .add_enabled(!directory.loading, egui::Button::new("Refresh"))
                        .clicked()
                    {
                        refresh.write(RefreshSheetsRequest);
                    }
                });
            });

            if !config.data.exam_id.is_empty() {
                ui.label(
                    egui::RichText::new(format!("Exam: {}", config.data.exam_id))
                        .color(theme::ui::LABEL_TEXT),
                );
            }
            ui.separator();

            if let Some(error) = &directory.error {
                ui.colored_label(theme::ui::ERROR_TEXT, error);
                ui.separator();
            }

            if directory.loading {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading...");
                });
            } else if directory.sheets.is_empty() {
                ui.label(egui::RichText::new("No answer sheets").color(theme::ui::HINT_TEXT));
            }

            let open_id = session
                .sheet()
                .map(|s| s.id.as_str())
                .or(session.pending_load());
            let last_id = config.data.last_sheet_id.as_deref();

            egui::ScrollArea::vertical().show(ui, |ui| {
                for sheet in &directory.sheets {
                    let is_open = open_id == Some(sheet.id.as_str());
                    let mut title = egui::RichText::new(&sheet.student_id).strong();
                    if last_id == Some(sheet.id.as_str()) && !is_open {
                        title = title.italics();
                    }

                    let response = ui.selectable_label(is_open, title);
                    let (status, color) = status_label(sheet);
                    ui.horizontal(|ui| {
                        ui.add_space(8.0);
                        ui.colored_label(color, egui::RichText::new(status).size(11.0));
                        if session.is_saving(&sheet.id) {
                            ui.spinner();
                        }
                    });

                    if response.clicked() && !is_open {
                        select.write(SelectSheetRequest {
                            sheet_id: sheet.id.clone(),
                        });
                    }
                    response.on_hover_text(format!("Sheet {}", sheet.id));
                    ui.add_space(4.0);
                }
            });
        });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_label_shows_total_when_graded() {
        let mut sheet = AnswerSheet::new("s1", "exam", "stu", "doc");
        assert_eq!(status_label(&sheet).0, "Pending");
        sheet.status = GradingStatus::Completed;
        sheet.total_marks = Some(17.5);
        assert_eq!(status_label(&sheet).0, "Graded (17.5)");
    }
}
