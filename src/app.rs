use crate::coach::{ChatMessage, ChatRole, CoachClient, CoachStatus, DEMO_MODE_NOTICE};
use crate::event::AppEvent;
use crate::progress::{aggregate, ProgressPoint};
use crate::theme::Theme;
use crate::ui::chart::{LineChart, LineShape, Series};
use crate::ui::exercise_card::{exercise_card, EditDraft};
use crate::workout::{DailyWorkout, ExerciseLog, UserSettings, WorkoutStore};
use chrono::{Local, NaiveDate};
use eframe::egui::{self, Color32, RichText, ScrollArea};
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::mpsc::{Receiver, TryRecvError};

const MAX_DIAGNOSTICS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Workout,
    Progress,
    Coach,
}

impl View {
    const ALL: [View; 3] = [View::Workout, View::Progress, View::Coach];

    fn label(self) -> &'static str {
        match self {
            View::Workout => "Workout",
            View::Progress => "Progress",
            View::Coach => "Coach",
        }
    }
}

pub struct SinisterApp {
    rx: Receiver<AppEvent>,
    theme: Theme,
    view: View,
    settings: UserSettings,
    store: WorkoutStore,
    today: DailyWorkout,
    drafts: HashMap<String, EditDraft>,
    coach: CoachClient,
    coach_status: CoachStatus,
    transcript: Vec<ChatMessage>,
    input_buffer: String,
    awaiting_reply: bool,
    diagnostics_log: Vec<String>,
    scroll_to_bottom: bool,
}

impl SinisterApp {
    pub fn new(
        rx: Receiver<AppEvent>,
        coach: CoachClient,
        mut store: WorkoutStore,
        settings: UserSettings,
    ) -> Self {
        let today = store.get_or_create(Self::current_date(), &settings);
        Self {
            rx,
            theme: Theme::default(),
            view: View::Workout,
            settings,
            store,
            today,
            drafts: HashMap::new(),
            coach_status: coach.initial_status(),
            coach,
            transcript: vec![ChatMessage::welcome()],
            input_buffer: String::new(),
            awaiting_reply: false,
            diagnostics_log: Vec::new(),
            scroll_to_bottom: false,
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    fn current_date() -> NaiveDate {
        Local::now().date_naive()
    }

    fn log_diagnostic(&mut self, message: impl Into<String>) {
        let entry = format!("[{}] {}", Local::now().format("%H:%M:%S"), message.into());
        self.diagnostics_log.push(entry);
        if self.diagnostics_log.len() > MAX_DIAGNOSTICS {
            let excess = self.diagnostics_log.len() - MAX_DIAGNOSTICS;
            self.diagnostics_log.drain(..excess);
        }
    }

    /// Switches to a fresh day when the calendar date changes under a running app.
    fn roll_over_to(&mut self, date: NaiveDate) {
        if self.today.date == date {
            return;
        }
        debug!("day changed from {} to {date}", self.today.date);
        self.drafts.clear();
        self.today = self.store.get_or_create(date, &self.settings);
    }

    fn update_exercise(&mut self, updated: ExerciseLog) {
        let date = self.today.date;
        match self.store.apply_exercise_update(date, updated) {
            Ok(workout) => self.today = workout,
            Err(err) => {
                warn!("ignored exercise update: {err}");
                self.log_diagnostic(format!("ignored exercise update: {err}"));
            }
        }
    }

    fn submit_prompt(&mut self) -> bool {
        let prompt = self.input_buffer.trim().to_string();
        if prompt.is_empty() || self.awaiting_reply {
            return false;
        }
        if !self.coach.send(prompt.clone()) {
            self.log_diagnostic("coach is still answering, prompt not sent");
            return false;
        }

        self.transcript.push(ChatMessage::new(ChatRole::User, prompt));
        self.input_buffer.clear();
        self.awaiting_reply = true;
        self.scroll_to_bottom = true;
        true
    }

    fn drain_events(&mut self, ctx: &egui::Context) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    self.apply_event(event);
                    ctx.request_repaint();
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.log_diagnostic("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::CoachReply(text) => {
                self.transcript.push(ChatMessage::new(ChatRole::Model, text));
                self.awaiting_reply = false;
                self.scroll_to_bottom = true;
            }
            AppEvent::CoachStatus(status) => {
                if status != self.coach_status {
                    self.log_diagnostic(format!("coach status: {status:?}"));
                }
                self.coach_status = status;
            }
            AppEvent::Diagnostic(message) => self.log_diagnostic(message),
        }
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        let theme = &self.theme;
        egui::TopBottomPanel::top("top_bar")
            .frame(egui::Frame::new().fill(theme.surface_0).inner_margin(theme.spacing_12))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("S").strong().size(20.0).color(theme.accent_primary));
                    ui.label(RichText::new("&").strong().size(20.0));
                    ui.label(RichText::new("S").strong().size(20.0).color(theme.accent_primary));
                    ui.label(RichText::new("Tracker").strong().size(20.0));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            RichText::new("v1.0")
                                .monospace()
                                .color(theme.text_muted),
                        );
                    });
                });
            });
    }

    fn render_bottom_nav(&mut self, ctx: &egui::Context) {
        let theme = self.theme.clone();
        egui::TopBottomPanel::bottom("bottom_nav")
            .frame(egui::Frame::new().fill(theme.surface_0).inner_margin(theme.spacing_8))
            .show(ctx, |ui| {
                ui.columns(View::ALL.len(), |columns| {
                    for (column, view) in columns.iter_mut().zip(View::ALL) {
                        column.vertical_centered(|ui| {
                            let color = if self.view == view {
                                theme.accent_primary
                            } else {
                                theme.text_muted
                            };
                            let label = RichText::new(view.label()).color(color).strong();
                            if ui.selectable_label(self.view == view, label).clicked() {
                                self.view = view;
                            }
                        });
                    }
                });
            });
    }

    fn render_workout(&mut self, ui: &mut egui::Ui) {
        let theme = self.theme.clone();
        ui.label(
            RichText::new(self.today.date.format("%A, %b %-d").to_string())
                .heading()
                .strong(),
        );
        ui.label(RichText::new("Simple & Sinister Protocol").color(theme.accent_primary));
        ui.add(
            egui::ProgressBar::new(self.today.progress_percent() / 100.0)
                .desired_height(6.0)
                .fill(theme.accent_primary),
        );
        ui.add_space(theme.spacing_8);

        let unit = self.settings.weight_unit;
        let mut updates = Vec::new();
        for exercise in &self.today.exercises {
            let mut draft = self.drafts.remove(&exercise.id);
            if let Some(updated) = exercise_card(ui, &theme, exercise, unit, &mut draft) {
                updates.push(updated);
            }
            if let Some(draft) = draft {
                self.drafts.insert(exercise.id.clone(), draft);
            }
            ui.add_space(theme.spacing_8);
        }
        for updated in updates {
            self.update_exercise(updated);
        }

        if self.today.completed() {
            ui.add_space(theme.spacing_16);
            theme.card_frame().fill(theme.surface_2).show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new("Protocol Complete").heading().strong());
                    ui.label(
                        RichText::new("Strong work today, comrade. Rest and recover.")
                            .color(theme.text_muted),
                    );
                });
            });
        }
    }

    fn render_progress(&mut self, ui: &mut egui::Ui) {
        let theme = self.theme.clone();
        let points = aggregate(self.store.history());
        if points.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(60.0);
                ui.label("No workout data yet.");
                ui.label(
                    RichText::new("Complete a workout to see your progress.")
                        .small()
                        .color(theme.text_muted),
                );
            });
            return;
        }

        let labels: Vec<String> = points.iter().map(ProgressPoint::axis_label).collect();
        let hover_labels: Vec<String> = points
            .iter()
            .map(|point| point.date.format("%b %-d, %Y").to_string())
            .collect();
        let unit = self.settings.weight_unit.label().to_string();
        let series = |name: &str, color: Color32, values: Vec<f64>, shape, unit: Option<String>| {
            Series {
                name: name.to_string(),
                color,
                values,
                shape,
                unit,
            }
        };

        ui.label(RichText::new("Weight Progression").heading().strong());
        LineChart::new(&labels, &hover_labels)
            .series(series(
                &format!("Swing ({unit})"),
                theme.series_swing_weight,
                points.iter().map(|point| point.swing_weight).collect(),
                LineShape::Monotone,
                Some(unit.clone()),
            ))
            .series(series(
                &format!("TGU ({unit})"),
                theme.series_tgu_weight,
                points.iter().map(|point| point.tgu_weight).collect(),
                LineShape::Monotone,
                Some(unit.clone()),
            ))
            .show(ui, &theme);

        ui.add_space(theme.spacing_16);
        ui.label(RichText::new("Volume Consistency").heading().strong());
        LineChart::new(&labels, &hover_labels)
            .zero_based(true)
            .series(series(
                "Swing Reps",
                theme.series_swing_reps,
                points.iter().map(|point| f64::from(point.swing_reps)).collect(),
                LineShape::Step,
                None,
            ))
            .series(series(
                "TGU Reps",
                theme.series_tgu_reps,
                points.iter().map(|point| f64::from(point.tgu_reps)).collect(),
                LineShape::Step,
                None,
            ))
            .show(ui, &theme);
    }

    fn render_coach(&mut self, ui: &mut egui::Ui) {
        let theme = self.theme.clone();
        ui.label(RichText::new("Comrade Coach").heading().strong());

        let transcript_height = (ui.available_height() - 140.0).max(120.0);
        ScrollArea::vertical()
            .id_salt("coach_transcript")
            .max_height(transcript_height)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                for message in &self.transcript {
                    let (speaker, fill, layout) = match message.role {
                        ChatRole::User => (
                            "You",
                            theme.user_bubble,
                            egui::Layout::right_to_left(egui::Align::Min),
                        ),
                        ChatRole::Model => (
                            "Coach",
                            theme.surface_2,
                            egui::Layout::left_to_right(egui::Align::Min),
                        ),
                    };
                    ui.with_layout(layout, |ui| {
                        theme.bubble_frame(fill).show(ui, |ui| {
                            ui.set_max_width(ui.available_width() * 0.8);
                            ui.label(RichText::new(speaker).small().color(theme.text_muted));
                            ui.label(&message.text);
                        });
                    });
                }

                if self.awaiting_reply {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(RichText::new("Coach is thinking...").color(theme.text_muted));
                    });
                }

                if self.scroll_to_bottom {
                    ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                }
            });
        self.scroll_to_bottom = false;

        ui.separator();
        let input_enabled = !self.awaiting_reply && !self.coach.is_busy();
        let hint = if self.awaiting_reply {
            "Waiting for the coach..."
        } else {
            "Ask about technique, pain, or schedule..."
        };

        let mut send_now = false;
        theme.composer_frame().show(ui, |ui| {
            ui.horizontal(|ui| {
                let response = ui.add_enabled(
                    input_enabled,
                    egui::TextEdit::singleline(&mut self.input_buffer)
                        .desired_width(ui.available_width() - 70.0)
                        .hint_text(hint),
                );
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    send_now = true;
                }

                let clicked = ui
                    .add_enabled(
                        input_enabled && !self.input_buffer.trim().is_empty(),
                        egui::Button::new("Send").fill(theme.accent_muted),
                    )
                    .clicked();
                send_now |= clicked;
            });
        });

        if self.coach_status == CoachStatus::Unavailable {
            ui.label(RichText::new(format!("⚠ {DEMO_MODE_NOTICE}")).small().color(theme.warning));
        }

        if send_now {
            self.submit_prompt();
        }

        egui::CollapsingHeader::new("Diagnostics")
            .default_open(false)
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .id_salt("diagnostics_log")
                    .max_height(90.0)
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for entry in &self.diagnostics_log {
                            ui.label(RichText::new(entry).small());
                        }
                    });
            });
    }

    fn render_center_panel(&mut self, ctx: &egui::Context) {
        let fill = self.theme.surface_0;
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(fill).inner_margin(self.theme.spacing_16))
            .show(ctx, |ui| {
                let max_width = ui.available_width().min(480.0);
                ui.vertical_centered(|ui| {
                    ui.set_max_width(max_width);
                    ui.with_layout(egui::Layout::top_down(egui::Align::Min), |ui| {
                        match self.view {
                            View::Workout => {
                                ScrollArea::vertical()
                                    .id_salt("workout_view")
                                    .show(ui, |ui| self.render_workout(ui));
                            }
                            View::Progress => {
                                ScrollArea::vertical()
                                    .id_salt("progress_view")
                                    .show(ui, |ui| self.render_progress(ui));
                            }
                            View::Coach => self.render_coach(ui),
                        }
                    });
                });
            });
    }
}

impl eframe::App for SinisterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events(ctx);
        self.roll_over_to(Self::current_date());
        self.render_top_bar(ctx);
        self.render_bottom_nav(ctx);
        self.render_center_panel(ctx);
        if self.awaiting_reply {
            ctx.request_repaint_after(std::time::Duration::from_millis(250));
        }
    }
}
