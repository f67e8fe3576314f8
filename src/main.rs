mod app;
mod color;
mod data;
mod settings;
mod state;
mod ui;

use app::MainsViewerApp;
use eframe::egui;
use settings::ViewerSettings;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = ViewerSettings::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(settings.window_size)
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Mains Viewer – Electrical Readings",
        options,
        Box::new(|_cc| Ok(Box::new(MainsViewerApp::new(settings)))),
    )
}
