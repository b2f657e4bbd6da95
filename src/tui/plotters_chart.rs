//! Plotters-powered chart widget for Ratatui.
//!
//! The widget is render-only: series, bars and bounds are computed from the
//! view model outside the render call (`tui::chart_data`), so `render()` only
//! draws. Output goes into the Ratatui buffer via `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color as TermColor, Style},
    widgets::Widget,
};

/// Scatter points sharing one color (one series per country).
#[derive(Debug, Clone, PartialEq)]
pub struct PointSeries {
    pub color: RGBColor,
    pub points: Vec<(f64, f64)>,
}

/// One horizontal stacked bar: `(x_start, x_end, color)` segments at height `slot`.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedBar {
    pub slot: f64,
    pub segments: Vec<(f64, f64, RGBColor)>,
}

#[derive(Clone, Copy)]
pub enum ChartBody<'a> {
    Scatter(&'a [PointSeries]),
    Bars(&'a [StackedBar]),
}

pub struct ViewPlottersChart<'a> {
    pub body: ChartBody<'a>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for ViewPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a chart in a tiny area; show a hint instead.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(TermColor::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 7)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Mesh lines are too noisy at terminal resolution; axes + labels only.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            match self.body {
                ChartBody::Scatter(series) => {
                    // `Pixel` rather than `Circle`: the backend maps circle radii to
                    // canvas units and draws oversized markers.
                    for s in series {
                        chart.draw_series(s.points.iter().map(|&(x, y)| Pixel::new((x, y), s.color)))?;
                    }
                }
                ChartBody::Bars(bars) => {
                    chart.draw_series(bars.iter().flat_map(|bar| {
                        bar.segments.iter().map(move |&(start, end, color)| {
                            Rectangle::new([(start, bar.slot - 0.35), (end, bar.slot + 0.35)], color.filled())
                        })
                    }))?;
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
