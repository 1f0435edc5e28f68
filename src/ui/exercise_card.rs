use crate::theme::Theme;
use crate::workout::{ExerciseLog, WeightUnit};
use eframe::egui::{self, RichText};

const MAX_WEIGHT: f64 = 500.0;
const MAX_REPS: u32 = 10_000;

/// Pending weight/reps edit for one exercise card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditDraft {
    pub weight: f64,
    pub reps: u32,
}

impl EditDraft {
    pub fn from_exercise(exercise: &ExerciseLog) -> Self {
        Self {
            weight: exercise.weight,
            reps: exercise.reps,
        }
    }

    pub fn apply(&self, exercise: &ExerciseLog) -> ExerciseLog {
        exercise.with_load(self.weight.clamp(0.0, MAX_WEIGHT), self.reps.min(MAX_REPS))
    }
}

/// Renders one exercise and returns the replacement record when the user
/// toggles completion or saves an edit.
pub fn exercise_card(
    ui: &mut egui::Ui,
    theme: &Theme,
    exercise: &ExerciseLog,
    unit: WeightUnit,
    draft: &mut Option<EditDraft>,
) -> Option<ExerciseLog> {
    let frame = if exercise.completed {
        theme.completed_card_frame()
    } else {
        theme.card_frame()
    };

    let mut update = None;
    frame.show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                let title_color = if exercise.completed {
                    theme.success
                } else {
                    theme.text_primary
                };
                ui.label(RichText::new(&exercise.name).strong().size(16.0).color(title_color));
                ui.label(
                    RichText::new(format!("{} sets target", exercise.sets))
                        .small()
                        .color(theme.text_muted),
                );
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                if draft.is_none() && ui.small_button("Edit").clicked() {
                    *draft = Some(EditDraft::from_exercise(exercise));
                }
            });
        });

        if let Some(current) = draft.as_mut() {
            let mut close = false;
            egui::Grid::new(("exercise_edit", exercise.id.as_str()))
                .num_columns(2)
                .spacing([theme.spacing_16, theme.spacing_8])
                .show(ui, |ui| {
                    ui.label(
                        RichText::new(format!("Weight ({})", unit.label())).color(theme.text_muted),
                    );
                    ui.label(RichText::new("Total Reps").color(theme.text_muted));
                    ui.end_row();

                    ui.add(
                        egui::DragValue::new(&mut current.weight)
                            .range(0.0..=MAX_WEIGHT)
                            .speed(0.5),
                    );
                    ui.add(egui::DragValue::new(&mut current.reps).range(0..=MAX_REPS));
                    ui.end_row();
                });
            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    close = true;
                }
                let save = egui::Button::new(RichText::new("Save").color(theme.text_primary))
                    .fill(theme.accent_muted);
                if ui.add(save).clicked() {
                    update = Some(current.apply(exercise));
                    close = true;
                }
            });
            if close {
                *draft = None;
            }
        } else {
            ui.horizontal(|ui| {
                ui.label(RichText::new(format_weight(exercise.weight)).size(24.0).strong());
                ui.label(RichText::new(unit.label()).color(theme.text_muted));
                ui.add_space(theme.spacing_16);
                ui.label(RichText::new(exercise.reps.to_string()).size(24.0).strong());
                ui.label(RichText::new("reps").color(theme.text_muted));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let (label, fill) = if exercise.completed {
                        ("✔ Done", theme.success.gamma_multiply(0.35))
                    } else {
                        ("Mark done", theme.surface_2)
                    };
                    if ui.add(egui::Button::new(label).fill(fill)).clicked() {
                        update = Some(exercise.toggled());
                    }
                });
            });
        }
    });

    update
}

fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{weight:.0}")
    } else {
        format!("{weight:.1}")
    }
}
