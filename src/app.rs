use eframe::egui;

use crate::settings::ViewerSettings;
use crate::state::AppState;
use crate::ui::chart::presenter_for;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct MainsViewerApp {
    pub state: AppState,
}

impl MainsViewerApp {
    pub fn new(settings: ViewerSettings) -> Self {
        Self {
            state: AppState::new(settings),
        }
    }
}

impl eframe::App for MainsViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_load();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Summary line under the toolbar ----
        egui::TopBottomPanel::top("max_sum").show(ctx, |ui| {
            panels::summary_bar(ui, &self.state);
        });

        // ---- Central panel: chart ----
        let presenter = presenter_for(self.state.chart_kind);
        let threshold = self.state.settings.large_threshold;
        egui::CentralPanel::default().show(ctx, |ui| {
            self.state.chart.show(ui, presenter, threshold);
        });
    }
}
