//! The single-window control surface.

use crate::schedule;

use std::time::Duration;

use auto_repeat_core::{
    CapturedAction, INTERVAL_MILLIS_RANGE, Notification, REPEAT_COUNT_RANGE, RunCoordinator,
    RunSettings, RunState, START_DELAY_SECS_RANGE, TerminalStatus,
};
use chrono::{Local, NaiveTime, Timelike};
use tracing::warn;

/// Repaint cadence so background notifications surface without input events.
const REPAINT_INTERVAL: Duration = Duration::from_millis(100);

/// Window state plus the core coordinator.
pub struct App {
    coordinator: RunCoordinator,
    repeat_count: u32,
    interval_millis: u64,
    start_delay_secs: u32,
    schedule_enabled: bool,
    schedule_hms: (u32, u32, u32),
    captured: CapturedAction,
    capturing: bool,
    status: String,
}

impl App {
    /// Fresh window state with default run settings and the current time
    /// prefilled in the schedule field.
    pub(crate) fn new() -> Self {
        let now = Local::now().time();

        Self {
            coordinator: RunCoordinator::new(),
            repeat_count: 10,
            interval_millis: 50,
            start_delay_secs: 3,
            schedule_enabled: false,
            schedule_hms: (now.hour(), now.minute(), now.second()),
            captured: CapturedAction::default(),
            capturing: false,
            status: "Ready".to_owned(),
        }
    }

    fn drain_notifications(&mut self) {
        for notification in self.coordinator.poll() {
            match notification {
                Notification::Captured(action) => {
                    self.capturing = false;
                    self.status = format!("Captured {}", action.label());
                    self.captured = action;
                }
                Notification::Progress(text) => self.status = text,
                Notification::Started => self.status = "Running...".to_owned(),
                Notification::Finished(status) => self.status = terminal_text(&status),
            }
        }
    }

    fn capture_clicked(&mut self) {
        match self.coordinator.request_capture() {
            Ok(()) => {
                self.capturing = true;
                self.status = "Press the input to repeat...".to_owned();
            }
            Err(e) => {
                warn!(error = %e, "capture request rejected");
                self.status = e.to_string();
            }
        }
    }

    fn start_clicked(&mut self) {
        let scheduled_at = if self.schedule_enabled {
            let (h, m, s) = self.schedule_hms;
            match NaiveTime::from_hms_opt(h, m, s).and_then(schedule::today_at) {
                Some(at) => Some(at),
                None => {
                    self.status = "Start time is not a valid local time".to_owned();
                    return;
                }
            }
        } else {
            None
        };

        let settings = RunSettings {
            repeat_count: self.repeat_count,
            interval_millis: self.interval_millis,
            start_delay_secs: self.start_delay_secs,
            action: self.captured.clone(),
        };

        match self.coordinator.request_run(settings, scheduled_at) {
            Ok(()) => {
                self.status = if scheduled_at.is_some() {
                    "Waiting for scheduled start...".to_owned()
                } else {
                    "Starting...".to_owned()
                };
            }
            Err(e) => {
                warn!(error = %e, "run request rejected");
                self.status = e.to_string();
            }
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_notifications();

        let state = self.coordinator.state();
        let idle = state == RunState::Idle;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                let caption = if self.capturing {
                    "Press the input to repeat...".to_owned()
                } else {
                    format!("Captured: {}", self.captured.label())
                };
                ui.label(caption);
                if ui
                    .add_enabled(idle && !self.capturing, egui::Button::new("Capture"))
                    .clicked()
                {
                    self.capture_clicked();
                }
            });

            ui.separator();

            ui.add_enabled_ui(idle, |ui| {
                egui::Grid::new("run-settings").num_columns(2).show(ui, |ui| {
                    ui.label("Repeat count");
                    ui.add(
                        egui::DragValue::new(&mut self.repeat_count)
                            .clamp_range(REPEAT_COUNT_RANGE),
                    );
                    ui.end_row();

                    ui.label("Interval (ms)");
                    ui.add(
                        egui::DragValue::new(&mut self.interval_millis)
                            .clamp_range(INTERVAL_MILLIS_RANGE),
                    );
                    ui.end_row();

                    ui.label("Start delay (s)");
                    ui.add(
                        egui::DragValue::new(&mut self.start_delay_secs)
                            .clamp_range(START_DELAY_SECS_RANGE),
                    );
                    ui.end_row();
                });
            });

            ui.horizontal(|ui| {
                ui.add_enabled(idle, egui::Checkbox::new(&mut self.schedule_enabled, "Start at"));

                let before = self.schedule_hms;
                // The time stays editable while a scheduled start is pending.
                ui.add_enabled_ui(idle || state == RunState::AwaitingScheduledStart, |ui| {
                    ui.add(egui::DragValue::new(&mut self.schedule_hms.0).clamp_range(0..=23));
                    ui.label(":");
                    ui.add(egui::DragValue::new(&mut self.schedule_hms.1).clamp_range(0..=59));
                    ui.label(":");
                    ui.add(egui::DragValue::new(&mut self.schedule_hms.2).clamp_range(0..=59));
                });
                if self.schedule_hms != before && state == RunState::AwaitingScheduledStart {
                    self.coordinator.request_stop();
                    self.status = "Scheduled start cancelled: start time changed".to_owned();
                }
            });

            ui.separator();

            let toggle_label = match state {
                RunState::Idle => "Start",
                RunState::AwaitingScheduledStart => "Cancel scheduled start",
                _ => "Stop",
            };
            if ui.button(toggle_label).clicked() {
                if idle {
                    self.start_clicked();
                } else {
                    self.coordinator.request_stop();
                }
            }

            ui.separator();
            ui.label(&self.status);
        });

        ctx.request_repaint_after(REPAINT_INTERVAL);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.coordinator.shutdown();
    }
}

/// Status line for a terminal status.
pub(crate) fn terminal_text(status: &TerminalStatus) -> String {
    match status {
        TerminalStatus::Completed => "Finished".to_owned(),
        TerminalStatus::Cancelled => "Cancelled".to_owned(),
        TerminalStatus::Failed(reason) => format!("Failed: {reason}"),
    }
}
