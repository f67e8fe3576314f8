use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::AppState;
use crate::ui::chart::{ChartKind, presenter_for};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            let open = ui.add_enabled(!state.is_loading(), egui::Button::new("Open…"));
            if open.clicked() {
                open_file_dialog(ui.ctx(), state);
                ui.close_menu();
            }
        });

        ui.separator();

        let active = presenter_for(state.chart_kind).kind();
        for kind in ChartKind::ALL {
            if ui
                .selectable_label(active == kind, kind.to_string())
                .clicked()
            {
                state.chart_kind = kind;
            }
        }

        ui.separator();

        let can_reset = state.chart.series().is_some() && !state.chart.reset_pending();
        if ui
            .add_enabled(can_reset, egui::Button::new("Reset zoom"))
            .clicked()
        {
            state.chart.request_reset();
        }

        ui.separator();

        if let Some(stats) = &state.stats {
            ui.label(format!(
                "{} rows charted, {} skipped",
                stats.rows_kept, stats.rows_skipped
            ));
        }

        if state.is_loading() {
            ui.separator();
            ui.spinner();
            match &state.progress {
                Some(p) => ui.label(format!("{} rows read…", p.rows_read)),
                None => ui.label("Loading…"),
            };
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Summary line
// ---------------------------------------------------------------------------

/// The max-sum summary for the charted file.
pub fn summary_bar(ui: &mut Ui, state: &AppState) {
    if let Some(series) = state.chart.series() {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.heading(series.summary_text());
        });
    }
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(ctx: &egui::Context, state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open mains readings")
        .add_filter("CSV", &["csv"])
        .pick_file();

    let Some(path) = file else {
        return;
    };

    let repaint = ctx.clone();
    if let Err(e) = state.begin_load(path, move || repaint.request_repaint()) {
        log::warn!("Not loading file: {e:#}");
        state.status_message = Some(format!("Error: {e:#}"));
    }
}
