use std::fmt::{self, Write as _};
use std::ops::Range;
use std::sync::Arc;

use eframe::egui::{self, Stroke, Ui, Vec2b};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotBounds, PlotPoints};
use serde::{Deserialize, Serialize};

use crate::color::{ChannelPalette, outline};
use crate::data::model::{Channel, SeriesSet};

// ---------------------------------------------------------------------------
// Chart kinds and the presenter interface
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
}

impl ChartKind {
    pub const ALL: [ChartKind; 2] = [ChartKind::Bar, ChartKind::Line];
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartKind::Bar => write!(f, "Bar"),
            ChartKind::Line => write!(f, "Line"),
        }
    }
}

/// Everything a presenter needs to draw one frame of the live chart.
pub struct ChartFrame<'a> {
    /// Identity of the live chart instance; a new id means a fresh plot.
    pub id: u64,
    pub series: &'a Arc<SeriesSet>,
    /// Restore the full data range this frame.
    pub reset: bool,
    pub large_threshold: usize,
}

/// Renders a [`SeriesSet`] as an interactive chart.
pub trait Presenter {
    fn kind(&self) -> ChartKind;
    fn show(&self, ui: &mut Ui, frame: ChartFrame<'_>);
}

/// Presenter registered for `kind`.
pub fn presenter_for(kind: ChartKind) -> &'static dyn Presenter {
    static BAR: BarPresenter = BarPresenter;
    static LINE: LinePresenter = LinePresenter;
    match kind {
        ChartKind::Bar => &BAR,
        ChartKind::Line => &LINE,
    }
}

// ---------------------------------------------------------------------------
// ChartView – the single live chart instance
// ---------------------------------------------------------------------------

struct ChartInstance {
    id: u64,
    series: Arc<SeriesSet>,
    reset_requested: bool,
}

/// Owns at most one chart. Replacing it drops the old series and gives the
/// plot a new identity, so no zoom or pan state survives from the previous
/// file.
#[derive(Default)]
pub struct ChartView {
    instance: Option<ChartInstance>,
    next_id: u64,
}

impl ChartView {
    pub fn replace(&mut self, series: SeriesSet) {
        self.next_id += 1;
        self.instance = Some(ChartInstance {
            id: self.next_id,
            series: Arc::new(series),
            reset_requested: false,
        });
    }

    pub fn series(&self) -> Option<&SeriesSet> {
        self.instance.as_ref().map(|i| &*i.series)
    }

    pub fn instance_id(&self) -> Option<u64> {
        self.instance.as_ref().map(|i| i.id)
    }

    /// Return to the default view (full data range) on the next frame.
    pub fn request_reset(&mut self) {
        if let Some(instance) = &mut self.instance {
            instance.reset_requested = true;
        }
    }

    pub fn reset_pending(&self) -> bool {
        self.instance.as_ref().is_some_and(|i| i.reset_requested)
    }

    pub fn show(&mut self, ui: &mut Ui, presenter: &dyn Presenter, large_threshold: usize) {
        let Some(instance) = &mut self.instance else {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a CSV file to chart mains readings  (File → Open…)");
            });
            return;
        };

        let reset = std::mem::take(&mut instance.reset_requested);
        presenter.show(
            ui,
            ChartFrame {
                id: instance.id,
                series: &instance.series,
                reset,
                large_threshold,
            },
        );
    }
}

// ---------------------------------------------------------------------------
// Visible window and decimation for large series
// ---------------------------------------------------------------------------

/// Rows whose slot on the category axis (`row ± 0.5`) overlaps
/// `[min_x, max_x]`. Non-finite or inverted bounds select every row.
pub fn visible_rows(min_x: f64, max_x: f64, len: usize) -> Range<usize> {
    if !(min_x.is_finite() && max_x.is_finite()) || max_x < min_x {
        return 0..len;
    }
    let start = ((min_x - 0.5).ceil().max(0.0) as usize).min(len);
    let end = (((max_x + 0.5).floor() + 1.0).max(0.0) as usize).min(len);
    start..end.max(start)
}

/// Rows to draw this frame: the current view, or everything while the plot
/// is being reset or has no usable bounds yet.
fn draw_window(bounds: &PlotBounds, reset: bool, len: usize) -> Range<usize> {
    if reset || !bounds.is_valid() {
        return 0..len;
    }
    visible_rows(bounds.min()[0], bounds.max()[0], len)
}

/// Points to draw for one channel after decimation.
#[derive(Debug, Clone, PartialEq)]
pub struct Decimated {
    /// `(row index, value)` pairs, NaN readings omitted. Every pair is a
    /// real reading at its own row.
    pub points: Vec<(usize, f64)>,
    /// Rows represented by each point.
    pub stride: usize,
}

/// Points for the rows in `window`, reduced to at most `max_points`.
///
/// When the window is larger than `max_points`, each bucket of rows is
/// represented by its largest reading, kept at the row it came from. A
/// threshold of zero disables reduction.
pub fn decimate(values: &[f64], window: Range<usize>, max_points: usize) -> Decimated {
    let start = window.start.min(values.len());
    let end = window.end.clamp(start, values.len());
    let slice = &values[start..end];

    if max_points == 0 || slice.len() <= max_points {
        return Decimated {
            points: slice
                .iter()
                .enumerate()
                .filter(|(_, v)| !v.is_nan())
                .map(|(i, &v)| (start + i, v))
                .collect(),
            stride: 1,
        };
    }

    let stride = slice.len().div_ceil(max_points);
    let points = slice
        .chunks(stride)
        .enumerate()
        .filter_map(|(bucket, chunk)| {
            chunk
                .iter()
                .enumerate()
                .filter(|(_, v)| !v.is_nan())
                .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
                    Some((_, top)) if top >= v => best,
                    _ => Some((i, v)),
                })
                .map(|(i, v)| (start + bucket * stride + i, v))
        })
        .collect();

    Decimated { points, stride }
}

// -- Axis and tooltip text shared by both presenters --

/// Label for a grid mark on the category axis; blank between rows.
fn category_label(labels: &[String], value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

/// Timestamp and all three readings of the row nearest `x`.
fn axis_hover_label(series: &SeriesSet, x: f64) -> String {
    let rounded = x.round();
    if rounded.is_nan() || rounded < 0.0 {
        return String::new();
    }
    let row = rounded as usize;
    let Some(label) = series.labels.get(row) else {
        return String::new();
    };

    let mut text = label.clone();
    for channel in Channel::ALL {
        let _ = write!(
            text,
            "\n{}: {:.4}",
            channel.display_name(),
            series.channel(channel)[row]
        );
    }
    text
}

// ---------------------------------------------------------------------------
// Bar presenter
// ---------------------------------------------------------------------------

/// Grouped bars, horizontal pan/zoom only.
pub struct BarPresenter;

const BAR_OFFSETS: [f64; 3] = [-0.25, 0.0, 0.25];
const BAR_WIDTH: f64 = 0.25;

impl Presenter for BarPresenter {
    fn kind(&self) -> ChartKind {
        ChartKind::Bar
    }

    fn show(&self, ui: &mut Ui, frame: ChartFrame<'_>) {
        let series: &SeriesSet = frame.series;
        let labels = &series.labels;
        let palette = ChannelPalette::RGB;

        let mut plot = Plot::new(egui::Id::new(("mains_bar", frame.id)))
            .legend(Legend::default())
            .x_axis_label("Timestamp")
            .y_axis_label("kWhs")
            .x_axis_formatter(move |mark, _range| category_label(labels, mark.value))
            .label_formatter(move |_name, value| axis_hover_label(series, value.x))
            .allow_boxed_zoom(false)
            .allow_drag(Vec2b::new(true, false))
            .allow_scroll(Vec2b::new(true, false))
            .allow_zoom(Vec2b::new(true, false));
        if !series.is_empty() {
            plot = plot.include_x(-0.5).include_x(series.len() as f64 - 0.5);
        }
        if frame.reset {
            plot = plot.reset();
        }

        plot.show(ui, |plot_ui| {
            let window = draw_window(&plot_ui.plot_bounds(), frame.reset, series.len());

            for (channel, offset) in Channel::ALL.into_iter().zip(BAR_OFFSETS) {
                let color = palette.color_for(channel);
                let decimated = decimate(
                    series.channel(channel),
                    window.clone(),
                    frame.large_threshold,
                );
                let stride = decimated.stride as f64;

                let bars: Vec<Bar> = decimated
                    .points
                    .iter()
                    .map(|&(i, v)| {
                        Bar::new(i as f64 + offset * stride, v)
                            .width(BAR_WIDTH * stride)
                            .fill(color)
                            .stroke(Stroke::new(1.0, outline(color)))
                    })
                    .collect();

                let tooltip_series = Arc::clone(frame.series);
                let chart = BarChart::new(bars)
                    .name(channel.display_name())
                    .color(color)
                    .element_formatter(Box::new(move |bar, _chart| {
                        axis_hover_label(&tooltip_series, bar.argument - offset * stride)
                    }));
                plot_ui.bar_chart(chart);
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Line presenter
// ---------------------------------------------------------------------------

/// One line per channel, pan/zoom on both axes.
pub struct LinePresenter;

impl Presenter for LinePresenter {
    fn kind(&self) -> ChartKind {
        ChartKind::Line
    }

    fn show(&self, ui: &mut Ui, frame: ChartFrame<'_>) {
        let series: &SeriesSet = frame.series;
        let labels = &series.labels;
        let palette = ChannelPalette::RBG;

        let mut plot = Plot::new(egui::Id::new(("mains_line", frame.id)))
            .legend(Legend::default())
            .x_axis_label("Timestamp")
            .y_axis_label("kWhs")
            .x_axis_formatter(move |mark, _range| category_label(labels, mark.value))
            .label_formatter(move |_name, value| axis_hover_label(series, value.x))
            .allow_boxed_zoom(true)
            .allow_drag(true)
            .allow_scroll(true)
            .allow_zoom(true);
        if !series.is_empty() {
            plot = plot.include_x(0.0).include_x(series.len() as f64 - 1.0);
        }
        if frame.reset {
            plot = plot.reset();
        }

        plot.show(ui, |plot_ui| {
            let window = draw_window(&plot_ui.plot_bounds(), frame.reset, series.len());

            for channel in Channel::ALL {
                let decimated = decimate(
                    series.channel(channel),
                    window.clone(),
                    frame.large_threshold,
                );
                let points: PlotPoints = decimated
                    .points
                    .iter()
                    .map(|&(i, v)| [i as f64, v])
                    .collect();

                let line = Line::new(points)
                    .name(channel.display_name())
                    .color(palette.color_for(channel))
                    .width(1.5);

                plot_ui.line(line);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(n: usize) -> SeriesSet {
        let mut s = SeriesSet::default();
        for i in 0..n {
            s.push(format!("t{i}"), i as f64, 0.0, 0.0);
        }
        s
    }

    #[test]
    fn replace_keeps_exactly_one_instance() {
        let mut view = ChartView::default();
        assert!(view.series().is_none());

        view.replace(series(3));
        let first = view.instance_id().unwrap();
        view.request_reset();
        assert!(view.reset_pending());

        view.replace(series(5));
        let second = view.instance_id().unwrap();
        assert_ne!(first, second);
        assert_eq!(view.series().map(SeriesSet::len), Some(5));
        assert!(!view.reset_pending());
    }

    #[test]
    fn reset_without_chart_is_a_no_op() {
        let mut view = ChartView::default();
        view.request_reset();
        assert!(!view.reset_pending());
    }

    #[test]
    fn decimate_below_threshold_drops_only_nan() {
        let d = decimate(&[1.0, f64::NAN, 3.0], 0..3, 10);
        assert_eq!(d.stride, 1);
        assert_eq!(d.points, vec![(0, 1.0), (2, 3.0)]);
    }

    #[test]
    fn decimate_keeps_bucket_maximum_at_its_row() {
        let values = [1.0, 5.0, 2.0, f64::NAN, 4.0, 3.0, 9.0];
        let d = decimate(&values, 0..values.len(), 3);
        assert_eq!(d.stride, 3);
        assert_eq!(d.points, vec![(1, 5.0), (4, 4.0), (6, 9.0)]);
    }

    #[test]
    fn decimate_skips_all_nan_bucket() {
        let values = [f64::NAN, f64::NAN, 1.0, 2.0];
        let d = decimate(&values, 0..4, 2);
        assert_eq!(d.points, vec![(3, 2.0)]);
    }

    #[test]
    fn zero_threshold_disables_decimation() {
        let values: Vec<f64> = (0..50).map(f64::from).collect();
        assert_eq!(decimate(&values, 0..50, 0).points.len(), 50);
    }

    #[test]
    fn zoomed_window_below_threshold_shows_every_row() {
        let values: Vec<f64> = (0..20_000).map(|i| (i % 7) as f64).collect();

        let zoomed = decimate(&values, 100..150, 1000);
        assert_eq!(zoomed.stride, 1);
        assert_eq!(zoomed.points.len(), 50);
        assert_eq!(zoomed.points[20], (120, 1.0));
        assert!(zoomed.points.iter().all(|&(i, v)| values[i] == v));
    }

    #[test]
    fn decimated_points_are_real_readings() {
        let values: Vec<f64> = (0..20_000).map(|i| (i % 7) as f64).collect();
        let full = decimate(&values, 0..values.len(), 1000);
        assert_eq!(full.stride, 20);
        assert!(full.points.len() <= 1000);
        assert!(full.points.iter().all(|&(i, v)| values[i] == v));
    }

    #[test]
    fn decimate_clamps_window_to_series() {
        let d = decimate(&[1.0, 2.0, 3.0], 2..10, 10);
        assert_eq!(d.points, vec![(2, 3.0)]);
        assert!(decimate(&[1.0], 5..9, 10).points.is_empty());
    }

    #[test]
    fn visible_rows_follow_view_bounds() {
        assert_eq!(visible_rows(99.6, 149.4, 20_000), 100..150);
        assert_eq!(visible_rows(-10.0, 3.2, 100), 0..4);
        assert_eq!(visible_rows(95.0, 500.0, 100), 95..100);
        assert_eq!(visible_rows(200.0, 300.0, 100), 100..100);
        assert_eq!(visible_rows(f64::NAN, 3.0, 10), 0..10);
        assert_eq!(visible_rows(5.0, 1.0, 10), 0..10);
    }

    #[test]
    fn category_axis_labels_only_whole_rows() {
        let labels = vec!["a".to_string(), "b".to_string()];
        assert_eq!(category_label(&labels, 1.0), "b");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, -1.0), "");
        assert_eq!(category_label(&labels, 7.0), "");
    }

    #[test]
    fn hover_text_lists_every_channel_for_the_row() {
        let mut s = SeriesSet::default();
        s.push("t0".into(), 1.5, 2.5, f64::NAN);
        s.push("t1".into(), 0.0, 0.0, 10.0);

        assert_eq!(
            axis_hover_label(&s, 0.9),
            "t1\nMains A (kWhs): 0.0000\nMains B (kWhs): 0.0000\nMains C (kWhs): 10.0000"
        );
        assert_eq!(
            axis_hover_label(&s, -0.2),
            "t0\nMains A (kWhs): 1.5000\nMains B (kWhs): 2.5000\nMains C (kWhs): NaN"
        );
        assert_eq!(axis_hover_label(&s, 5.0), "");
        assert_eq!(axis_hover_label(&s, -3.0), "");
    }

    #[test]
    fn presenters_registered_by_kind() {
        for kind in ChartKind::ALL {
            assert_eq!(presenter_for(kind).kind(), kind);
        }
    }
}
