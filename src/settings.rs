use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::ui::chart::ChartKind;

/// Environment variable naming an optional JSON settings file.
pub const SETTINGS_ENV: &str = "MAINS_VIEWER_SETTINGS";

// ---------------------------------------------------------------------------
// Viewer settings
// ---------------------------------------------------------------------------

/// Start-up configuration. Every field has a default so a settings file
/// only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    /// Presenter used for new charts.
    pub chart_kind: ChartKind,

    /// Points per channel above which the chart is decimated.
    pub large_threshold: usize,

    /// Rows between progress updates while a file is loading (0 = off).
    pub progress_interval: usize,

    /// Initial window size in points.
    pub window_size: [f32; 2],
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            chart_kind: ChartKind::Bar,
            large_threshold: 1000,
            progress_interval: 10_000,
            window_size: [1200.0, 800.0],
        }
    }
}

impl ViewerSettings {
    /// Parse settings from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        serde_json::from_str(&text).context("parsing settings JSON")
    }

    /// Settings from `MAINS_VIEWER_SETTINGS` if set, defaults otherwise.
    /// A broken settings file is logged and ignored.
    pub fn load() -> Self {
        let Some(path) = std::env::var_os(SETTINGS_ENV) else {
            return Self::default();
        };
        match Self::from_file(Path::new(&path)) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", Path::new(&path).display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings: {e:#}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "chart_kind": "line", "large_threshold": 500 }}"#).unwrap();
        file.flush().unwrap();

        let s = ViewerSettings::from_file(file.path()).unwrap();
        assert_eq!(s.chart_kind, ChartKind::Line);
        assert_eq!(s.large_threshold, 500);
        assert_eq!(s.progress_interval, 10_000);
        assert_eq!(s.window_size, [1200.0, 800.0]);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        file.flush().unwrap();
        assert!(ViewerSettings::from_file(file.path()).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = ViewerSettings::from_file(Path::new("/nonexistent/settings.json")).unwrap_err();
        assert!(format!("{err:#}").contains("reading settings file"));
    }
}
