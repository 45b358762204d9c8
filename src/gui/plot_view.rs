/// Interactive plot view — renders a `ComposedPlot` with egui_plot.
///
/// The intensity axis is logarithmic: values are mapped through log10 onto
/// a linear axis and the y tick labels are suppressed, which is the
/// intended presentation — absolute intensity is not meaningful across
/// normalized or stacked traces.

use egui_plot::{
    Corner, GridInput, GridMark, Legend, Line, LineStyle as PlotLineStyle, Plot, PlotBounds,
    PlotPoints, PlotUi, Points, Text, VLine,
};

use crate::config::LegendPosition;
use crate::data::reference::LineStyle;
use crate::pipeline::compose::ComposedPlot;
use super::theme::ThemeColors;

/// State for the plot view
#[derive(Debug, Clone, Default)]
pub struct PlotViewState {
    /// Incremented on recompose to give the plot a fresh ID.
    pub plot_generation: u32,
    /// Set to re-apply the configured axis bounds on the next frame.
    pub apply_bounds: bool,
}

impl PlotViewState {
    pub fn reset_view(&mut self) {
        self.plot_generation = self.plot_generation.wrapping_add(1);
        self.apply_bounds = true;
    }
}

/// Show the composed plot, or a placeholder when there is nothing to draw.
pub fn show_plot_view(
    ui: &mut egui::Ui,
    composed: Option<&ComposedPlot>,
    state: &mut PlotViewState,
    colors: &ThemeColors,
) {
    let Some(plot) = composed else {
        placeholder(ui, "Select scan files to begin", colors);
        return;
    };
    if !plot.has_drawable_series() {
        placeholder(ui, "No data above the current threshold", colors);
        return;
    }

    let config = &plot.config;
    let (y_min, y_max) = plot.y_range;
    let log_lo = y_min.max(1e-12).log10();
    let log_hi = y_max.max(1e-12).log10().max(log_lo + 0.1);

    let mut plot_widget = Plot::new(format!("xrd_plot_{}", state.plot_generation))
        .height(ui.available_height() - 4.0)
        .x_axis_label(config.x_label.clone())
        .y_axis_label(config.y_label.clone())
        .show_axes([true, false])
        .show_grid([config.show_grid, false])
        .allow_drag(true)
        .allow_zoom(true)
        .allow_scroll(true)
        .allow_boxed_zoom(true);

    // Tick marks at the configured multiples, with optional minor marks.
    let major = config.x_major_tick_spacing;
    let minor = config.x_minor_tick_spacing;
    if major > 0.0 {
        plot_widget = plot_widget.x_grid_spacer(move |input: GridInput| {
            let mut marks = multiples_in(input.bounds, major, major);
            if let Some(minor_step) = minor {
                if minor_step > 0.0 && minor_step < major {
                    marks.extend(
                        multiples_in(input.bounds, minor_step, minor_step)
                            .into_iter()
                            .filter(|m| (m.value / major).fract().abs() > 1e-6),
                    );
                }
            }
            marks
        });
    }

    if config.show_legend && !config.stacked {
        let corner = match config.legend_position {
            LegendPosition::UpperLeft => Corner::LeftTop,
            LegendPosition::LowerLeft => Corner::LeftBottom,
            LegendPosition::LowerRight => Corner::RightBottom,
            LegendPosition::Auto | LegendPosition::UpperRight => Corner::RightTop,
        };
        plot_widget = plot_widget.legend(
            Legend::default()
                .position(corner)
                .background_alpha(0.6)
                .text_style(egui::TextStyle::Small),
        );
    }

    let apply_bounds = std::mem::take(&mut state.apply_bounds);
    let data_range = plot.x_data_range().unwrap_or((0.0, 100.0));
    let x_lo = config.x_min.unwrap_or(data_range.0);
    let x_hi = config.x_max.unwrap_or(data_range.1).max(x_lo + 1e-6);
    let peak_label_color = colors.peak_label;

    plot_widget.show(ui, |plot_ui: &mut PlotUi| {
        if apply_bounds {
            plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                [x_lo, log_lo],
                [x_hi, log_hi],
            ));
        }

        // ── Data traces ──
        for series in &plot.series {
            let color = {
                let [r, g, b] = series.color();
                egui::Color32::from_rgb(r, g, b)
            };
            for segment in series.segments() {
                let points: PlotPoints = segment
                    .iter()
                    .map(|p| [p[0], p[1].max(1e-12).log10()])
                    .collect();
                // Segments share the series name; the legend shows one
                // entry per name.
                plot_ui.line(
                    Line::new(points)
                        .name(&series.label)
                        .color(color)
                        .width(config.line_width),
                );
            }

            // ── Detected peak markers and labels ──
            if !series.peaks.is_empty() {
                let marker_points: PlotPoints = series
                    .peaks
                    .iter()
                    .map(|p| [p.angle, p.intensity.max(1e-12).log10()])
                    .collect();
                plot_ui.points(
                    Points::new(marker_points)
                        .color(color)
                        .radius(2.5)
                        .shape(egui_plot::MarkerShape::Down),
                );
                for peak in &series.peaks {
                    let label = Text::new(
                        [peak.angle, peak.intensity.max(1e-12).log10() + 0.05].into(),
                        egui::RichText::new(peak.label())
                            .size(10.0)
                            .color(peak_label_color),
                    )
                    .anchor(egui::Align2::CENTER_BOTTOM);
                    plot_ui.text(label);
                }
            }
        }

        // ── Reference peaks, drawn above the traces ──
        let label_y = (y_max * 0.9).max(1e-12).log10();
        for peak in plot.drawable_reference_peaks() {
            let [r, g, b] = peak.color;
            let color = egui::Color32::from_rgb(r, g, b);
            plot_ui.vline(
                VLine::new(peak.angle)
                    .color(color)
                    .width(1.2)
                    .style(marker_line_style(peak.style)),
            );
            // egui_plot cannot rotate text; the exported figure draws this
            // label vertically.
            let label = Text::new(
                [peak.angle + config.reference_label_offset, label_y].into(),
                egui::RichText::new(&peak.name)
                    .size(config.reference_label_font_size)
                    .strong()
                    .color(color),
            )
            .anchor(egui::Align2::LEFT_TOP);
            plot_ui.text(label);
        }
    });
}

fn placeholder(ui: &mut egui::Ui, message: &str, colors: &ThemeColors) {
    ui.centered_and_justified(|ui| {
        ui.heading(
            egui::RichText::new(message)
                .size(16.0)
                .color(colors.text_muted),
        );
    });
}

/// Grid marks at every multiple of `step` inside the visible bounds.
fn multiples_in(bounds: (f64, f64), step: f64, step_size: f64) -> Vec<GridMark> {
    let mut marks = Vec::new();
    if step <= 0.0 {
        return marks;
    }
    let mut value = (bounds.0 / step).ceil() * step;
    // Cap the mark count so extreme zoom-out stays responsive.
    let max_marks = 512;
    while value <= bounds.1 && marks.len() < max_marks {
        marks.push(GridMark { value, step_size });
        value += step;
    }
    marks
}

fn marker_line_style(style: LineStyle) -> PlotLineStyle {
    match style {
        LineStyle::Solid => PlotLineStyle::Solid,
        LineStyle::Dashed => PlotLineStyle::dashed_loose(),
        LineStyle::Dotted => PlotLineStyle::dotted_dense(),
        // egui_plot has no dash-dot stroke; dense dashes read closest.
        LineStyle::DashDot => PlotLineStyle::dashed_dense(),
    }
}
