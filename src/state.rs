use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use crate::data::extract::ExtractStats;
use crate::data::loader::{LoadEvent, LoadHandle};
use crate::settings::ViewerSettings;
use crate::ui::chart::{ChartKind, ChartView};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub settings: ViewerSettings,

    /// Presenter used to draw the chart.
    pub chart_kind: ChartKind,

    /// The one live chart (None inside until a file has loaded).
    pub chart: ChartView,

    /// In-flight extraction. Only one at a time.
    pub load: Option<LoadHandle>,

    /// Latest progress of the in-flight extraction.
    pub progress: Option<ExtractStats>,

    /// Row counters of the file currently charted.
    pub stats: Option<ExtractStats>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(settings: ViewerSettings) -> Self {
        Self {
            chart_kind: settings.chart_kind,
            settings,
            chart: ChartView::default(),
            load: None,
            progress: None,
            stats: None,
            status_message: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.load.is_some()
    }

    /// Start extracting `path` in the background.
    ///
    /// Refused while another file is still loading; that file's result is
    /// the next thing the chart will show.
    pub fn begin_load(&mut self, path: PathBuf, notify: impl Fn() + Send + 'static) -> Result<()> {
        if let Some(current) = &self.load {
            bail!("still loading {}", current.path.display());
        }
        let handle = LoadHandle::spawn(path, self.settings.progress_interval, notify)
            .context("starting extraction worker")?;
        log::info!("Loading {}", handle.path.display());
        self.load = Some(handle);
        self.progress = None;
        self.status_message = None;
        Ok(())
    }

    /// Collect events from the in-flight load, if any.
    pub fn poll_load(&mut self) {
        let Some(handle) = &self.load else {
            return;
        };
        for event in handle.poll() {
            self.apply_event(event);
        }
    }

    /// Fold one loader event into the state.
    ///
    /// Only a finished load touches the chart. A failed load leaves the
    /// previous chart and summary in place.
    pub fn apply_event(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Progress(stats) => {
                self.progress = Some(stats);
            }
            LoadEvent::Finished(series, stats) => {
                let path = self.load.take().map(|h| h.path);
                log::info!(
                    "Loaded {} of {} rows from {} (max sum {:.4})",
                    stats.rows_kept,
                    stats.rows_read,
                    path.as_deref().map(|p| p.display().to_string()).unwrap_or_default(),
                    series.max_sum
                );
                self.chart.replace(series);
                self.stats = Some(stats);
                self.progress = None;
                self.status_message = None;
            }
            LoadEvent::Failed(message) => {
                self.load = None;
                self.progress = None;
                log::error!("Error parsing CSV file: {message}");
                self.status_message = Some(format!("Error: {message}"));
            }
        }
    }
}
