//! Live altitude chart using egui_plot
//!
//! Renders the display buffer as a line with per-tick markers so each
//! refresh tick stays individually visible.

use crate::types::Sample;
use egui::Ui;
use egui_plot::{Corner, Legend, Line, Plot, PlotPoints, Points};

/// Renders the display series as a time/altitude chart
pub struct AltitudePlot {
    line_width: f32,
    marker_radius: f32,
    show_markers: bool,
}

impl Default for AltitudePlot {
    fn default() -> Self {
        Self {
            line_width: 1.5,
            marker_radius: 2.5,
            show_markers: true,
        }
    }
}

impl AltitudePlot {
    /// Render the chart; x is seconds since the first display point
    pub fn render(&self, ui: &mut Ui, display: &[Sample]) {
        let points = Self::as_plot_points(display);

        Plot::new("altitude_plot")
            .legend(Legend::default().position(Corner::LeftBottom))
            .x_axis_label("Time (s)")
            .y_axis_label("Altitude (ft)")
            .show_axes(true)
            .show_grid(true)
            .show(ui, |plot_ui| {
                if points.is_empty() {
                    return;
                }

                let line = Line::new("Altitude", PlotPoints::from(points.clone()))
                    .width(self.line_width);
                plot_ui.line(line);

                if self.show_markers {
                    let markers = Points::new("Altitude", PlotPoints::from(points))
                        .radius(self.marker_radius);
                    plot_ui.points(markers);
                }
            });
    }

    fn as_plot_points(display: &[Sample]) -> Vec<[f64; 2]> {
        let Some(first) = display.first() else {
            return Vec::new();
        };
        let base = first.timestamp;

        display
            .iter()
            .map(|s| {
                let elapsed = (s.timestamp - base).num_milliseconds() as f64 / 1_000.0;
                [elapsed, s.value]
            })
            .collect()
    }
}
