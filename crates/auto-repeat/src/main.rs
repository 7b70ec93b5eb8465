//! Auto-Repeat: replay a single captured mouse or keyboard action on a timer.

mod app;
mod schedule;

pub(crate) use app::App;

/// Application entry point.
fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("auto_repeat=debug,auto_repeat_core=debug")
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([360.0, 320.0])
            .with_resizable(false),
        ..Default::default()
    };

    eframe::run_native(
        "Auto Repeat",
        options,
        Box::new(|_cc| Box::new(App::new())),
    )
}
