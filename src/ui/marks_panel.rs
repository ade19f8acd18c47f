//! Right panel: per-question marks for graders, the saved breakdown for students.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::marks::QuestionMark;
use crate::session::{GradingSession, SubmitGradingRequest};
use crate::theme;

/// Format a mark without trailing zeros ("7", "7.5").
fn format_mark(value: f32) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

fn format_out_of(obtained: f32, max: Option<f32>) -> String {
    match max {
        Some(max) => format!("{} / {}", format_mark(obtained), format_mark(max)),
        None => format_mark(obtained),
    }
}

pub fn marks_panel_ui(
    mut contexts: EguiContexts,
    mut session: ResMut<GradingSession>,
    mut submit: MessageWriter<SubmitGradingRequest>,
) -> Result {
    egui::SidePanel::right("marks_panel")
        .default_width(260.0)
        .show(contexts.ctx_mut()?, |ui| {
            ui.heading("Marks");
            ui.separator();

            if session.sheet().is_none() {
                let hint = if session.pending_load().is_some() {
                    "Opening answer sheet..."
                } else {
                    "Select an answer sheet"
                };
                ui.label(egui::RichText::new(hint).color(theme::ui::HINT_TEXT));
                return;
            }

            if session.is_read_only() {
                render_breakdown(
                    ui,
                    session.saved_marks(),
                    session.sheet().and_then(|s| s.total_marks),
                );
            } else {
                render_mark_entry(ui, &mut session, &mut submit);
            }
        });
    Ok(())
}

fn render_mark_entry(
    ui: &mut egui::Ui,
    session: &mut GradingSession,
    submit: &mut MessageWriter<SubmitGradingRequest>,
) {
    let questions = session.marks().assignment().question_numbers.clone();
    let editable = session.accepts_edits();

    if questions.is_empty() {
        ui.colored_label(
            theme::ui::PENDING_TEXT,
            "No questions are assigned to you for this exam.",
        );
    }

    egui::ScrollArea::vertical()
        .max_height((ui.available_height() - 90.0).max(120.0))
        .show(ui, |ui| {
            for question in &questions {
                let question = *question;
                let max = session.marks().assignment().max_for(question);

                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(format!("Q{}", question)).strong());

                    let mut value = session.marks().mark(question).unwrap_or(0.0);
                    let mut drag = egui::DragValue::new(&mut value).speed(0.25);
                    drag = match max {
                        Some(max) => drag.range(0.0..=max),
                        None => drag.range(0.0..=f32::MAX),
                    };
                    if ui.add_enabled(editable, drag).changed() {
                        session.set_question_mark(question, value);
                    }

                    if let Some(max) = max {
                        ui.label(
                            egui::RichText::new(format!("/ {}", format_mark(max)))
                                .color(theme::ui::LABEL_TEXT),
                        );
                    }
                });

                let mut comment = session.marks().comment(question).unwrap_or("").to_string();
                let edit = egui::TextEdit::singleline(&mut comment)
                    .hint_text("Comment")
                    .desired_width(f32::INFINITY);
                if ui.add_enabled(editable, edit).changed() {
                    session.set_comment(question, &comment);
                }
                ui.add_space(6.0);
            }
        });

    ui.separator();

    let marks = session.marks();
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("Total").strong());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(
                egui::RichText::new(format_out_of(
                    marks.total_obtained_marks(),
                    Some(marks.total_max_marks()),
                ))
                .strong(),
            );
        });
    });

    if let Some(error) = session.last_error() {
        ui.colored_label(theme::ui::ERROR_TEXT, error);
    }

    ui.add_space(6.0);
    let blocked = session.can_submit().err();
    let response = ui.add_enabled(
        blocked.is_none(),
        egui::Button::new(egui::RichText::new("Submit Grading").strong())
            .min_size(egui::vec2(ui.available_width(), 32.0)),
    );
    if response.clicked() {
        submit.write(SubmitGradingRequest);
    }
    if let Some(blocked) = blocked {
        response.on_disabled_hover_text(blocked.reason());
    }
}

/// Total shown to the student: the sheet's recorded total, falling back to
/// the rows when the sheet carries none.
fn breakdown_total(rows: &[QuestionMark], sheet_total: Option<f32>) -> (f32, Option<f32>) {
    let obtained = sheet_total.unwrap_or_else(|| rows.iter().map(|r| r.obtained_marks).sum());
    let max = rows.iter().map(|r| r.max_marks).sum();
    (obtained, max)
}

fn render_breakdown(ui: &mut egui::Ui, rows: &[QuestionMark], sheet_total: Option<f32>) {
    if rows.is_empty() {
        ui.label(egui::RichText::new("No marks recorded yet").color(theme::ui::HINT_TEXT));
        return;
    }

    egui::Grid::new("marks_breakdown")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui| {
            for row in rows {
                ui.label(egui::RichText::new(format!("Q{}", row.question_number)).strong());
                ui.label(format_out_of(row.obtained_marks, row.max_marks));
                ui.end_row();
                if let Some(comment) = &row.comment {
                    ui.label("");
                    ui.label(egui::RichText::new(comment).italics().color(theme::ui::LABEL_TEXT));
                    ui.end_row();
                }
            }
        });

    ui.separator();
    let (obtained, max) = breakdown_total(rows, sheet_total);
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("Total").strong());
        ui.label(egui::RichText::new(format_out_of(obtained, max)).strong());
    });
}
