/// Vector figure export — hand-assembled SVG markup.
///
/// The document records its physical size in inches and lays pixels out at
/// the configured DPI, so the drawing matches the PNG export one-for-one.

use std::fmt::Write as _;
use std::path::Path;

use crate::config::{LegendPosition, TickDirection};
use crate::pipeline::compose::ComposedPlot;
use super::{tick_label, ExportError, ExportSettings, Layout};

pub(crate) fn render_svg(
    plot: &ComposedPlot,
    settings: &ExportSettings,
    path: &Path,
) -> Result<(), ExportError> {
    let doc = svg_document(plot, settings);
    std::fs::write(path, doc).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn rgb(color: [u8; 3]) -> String {
    format!("#{:02X}{:02X}{:02X}", color[0], color[1], color[2])
}

/// Font size in pixels for a point size at the document DPI.
fn font_px(size_pt: f32, dpi: u32) -> f64 {
    f64::from(size_pt) * f64::from(dpi) / 72.0
}

pub(crate) fn svg_document(plot: &ComposedPlot, settings: &ExportSettings) -> String {
    let width = settings.pixel_width();
    let height = settings.pixel_height();
    let layout = Layout::new(plot, width, height);
    let config = &plot.config;

    let tick_font = font_px(config.tick_label_font_size, settings.dpi);
    let axis_font = font_px(config.axis_label_font_size, settings.dpi);
    let legend_font = font_px(config.legend_font_size, settings.dpi);
    let ref_font = font_px(config.reference_label_font_size, settings.dpi);
    let stroke_w = (f64::from(config.line_width) * f64::from(settings.dpi) / 150.0).max(1.0);

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        "<svg xmlns='http://www.w3.org/2000/svg' width='{}in' height='{}in' viewBox='0 0 {} {}'>",
        settings.width_in, settings.height_in, width, height
    );
    svg.push_str("<rect width='100%' height='100%' fill='white'/>\n");

    let axis_y = (layout.margin_top + layout.plot_h) as f64;
    let plot_top = layout.margin_top as f64;

    // ── X grid (x axis only) ──
    if config.show_grid {
        for tick in layout.x_ticks(config.x_major_tick_spacing) {
            let gx = layout.x_px(tick);
            let _ = writeln!(
                svg,
                "<line x1='{gx:.1}' y1='{plot_top:.1}' x2='{gx:.1}' y2='{axis_y:.1}' \
                 stroke='#D2D2DA' stroke-width='1' stroke-dasharray='3,3'/>"
            );
        }
    }

    // ── Data traces ──
    for series in &plot.series {
        let color = rgb(series.color());
        for segment in series.segments() {
            let mut points = String::new();
            for point in segment {
                if !layout.contains_x(point[0]) {
                    continue;
                }
                let _ = write!(
                    points,
                    "{:.1},{:.1} ",
                    layout.x_px(point[0]),
                    layout.y_px(point[1])
                );
            }
            if !points.trim().is_empty() {
                let _ = writeln!(
                    svg,
                    "<polyline fill='none' stroke='{color}' stroke-width='{stroke_w:.1}' \
                     points='{points}'/>"
                );
            }
        }

        // Peak annotations: marker triangle plus angle label.
        for peak in &series.peaks {
            if !layout.contains_x(peak.angle) {
                continue;
            }
            let px = layout.x_px(peak.angle);
            let py = layout.y_px(peak.intensity);
            let m = (legend_font * 0.35).max(3.0);
            let _ = writeln!(
                svg,
                "<polygon points='{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}' fill='{color}'/>",
                px,
                py - 3.0,
                px - m,
                py - 3.0 - 1.6 * m,
                px + m,
                py - 3.0 - 1.6 * m,
            );
            let _ = writeln!(
                svg,
                "<text x='{:.1}' y='{:.1}' font-family='sans-serif' font-size='{:.1}' \
                 fill='#282830' text-anchor='middle'>{}</text>",
                px,
                py - 6.0 - 1.6 * m,
                legend_font,
                escape(&peak.label()),
            );
        }
    }

    // ── Plot frame ──
    let _ = writeln!(
        svg,
        "<rect x='{}' y='{}' width='{}' height='{}' fill='none' stroke='#50505A' stroke-width='1'/>",
        layout.margin_left, layout.margin_top, layout.plot_w, layout.plot_h
    );

    // ── X ticks and labels (y tick labels are suppressed by design) ──
    let tick_len = (tick_font * 0.4).max(4.0);
    if let Some(minor_step) = config.x_minor_tick_spacing {
        for tick in layout.x_ticks(minor_step) {
            let gx = layout.x_px(tick);
            let (y1, y2) = match config.tick_direction {
                TickDirection::In => (axis_y - tick_len / 2.0, axis_y),
                TickDirection::Out => (axis_y, axis_y + tick_len / 2.0),
            };
            let _ = writeln!(
                svg,
                "<line x1='{gx:.1}' y1='{y1:.1}' x2='{gx:.1}' y2='{y2:.1}' \
                 stroke='#50505A' stroke-width='1'/>"
            );
        }
    }
    for tick in layout.x_ticks(config.x_major_tick_spacing) {
        let gx = layout.x_px(tick);
        let (y1, y2) = match config.tick_direction {
            TickDirection::In => (axis_y - tick_len, axis_y),
            TickDirection::Out => (axis_y, axis_y + tick_len),
        };
        let _ = writeln!(
            svg,
            "<line x1='{gx:.1}' y1='{y1:.1}' x2='{gx:.1}' y2='{y2:.1}' \
             stroke='#50505A' stroke-width='1.5'/>"
        );
        if config.tick_direction == TickDirection::In {
            let _ = writeln!(
                svg,
                "<line x1='{gx:.1}' y1='{plot_top:.1}' x2='{gx:.1}' y2='{:.1}' \
                 stroke='#50505A' stroke-width='1.5'/>",
                plot_top + tick_len
            );
        }
        let _ = writeln!(
            svg,
            "<text x='{gx:.1}' y='{:.1}' font-family='sans-serif' font-size='{tick_font:.1}' \
             fill='#282830' text-anchor='middle'>{}</text>",
            axis_y + tick_len + tick_font,
            tick_label(tick, config.x_major_tick_spacing),
        );
    }

    // ── Axis labels ──
    let _ = writeln!(
        svg,
        "<text x='{:.1}' y='{:.1}' font-family='sans-serif' font-size='{axis_font:.1}' \
         fill='#282830' text-anchor='middle'>{}</text>",
        layout.margin_left as f64 + layout.plot_w as f64 / 2.0,
        layout.height as f64 - axis_font * 0.4,
        escape(&config.x_label),
    );
    let y_label_x = axis_font;
    let y_label_y = layout.margin_top as f64 + layout.plot_h as f64 / 2.0;
    let _ = writeln!(
        svg,
        "<text x='{y_label_x:.1}' y='{y_label_y:.1}' font-family='sans-serif' \
         font-size='{axis_font:.1}' fill='#282830' text-anchor='middle' \
         transform='rotate(-90 {y_label_x:.1} {y_label_y:.1})'>{}</text>",
        escape(&config.y_label),
    );

    // ── Legend ──
    if config.show_legend && !config.stacked && !plot.series.is_empty() {
        write_legend(&mut svg, plot, &layout, legend_font);
    }

    // ── Reference peaks, drawn last so they sit above the traces ──
    for peak in plot.drawable_reference_peaks() {
        if !layout.contains_x(peak.angle) {
            continue;
        }
        let color = rgb(peak.color);
        let px = layout.x_px(peak.angle);
        let dash = peak
            .style
            .dash_array()
            .map(|d| format!(" stroke-dasharray='{d}'"))
            .unwrap_or_default();
        let _ = writeln!(
            svg,
            "<line x1='{px:.1}' y1='{plot_top:.1}' x2='{px:.1}' y2='{axis_y:.1}' \
             stroke='{color}' stroke-width='1.2'{dash}/>"
        );

        let lx = layout.x_px(peak.angle + config.reference_label_offset);
        let ly = plot_top + ref_font;
        let _ = writeln!(
            svg,
            "<text x='{lx:.1}' y='{ly:.1}' font-family='sans-serif' font-size='{ref_font:.1}' \
             fill='{color}' font-weight='bold' text-anchor='end' \
             transform='rotate(-90 {lx:.1} {ly:.1})'>{}</text>",
            escape(&peak.name),
        );
    }

    svg.push_str("</svg>\n");
    svg
}

fn write_legend(svg: &mut String, plot: &ComposedPlot, layout: &Layout, font: f64) {
    let pad = font * 0.5;
    let row_h = font * 1.4;
    let sample_w = font * 2.0;
    let longest = plot
        .series
        .iter()
        .map(|s| s.label.chars().count())
        .max()
        .unwrap_or(0) as f64;
    let box_w = sample_w + pad * 3.0 + longest * font * 0.6;
    let box_h = plot.series.len() as f64 * row_h + pad;

    let right = (layout.margin_left + layout.plot_w) as f64;
    let bottom = (layout.margin_top + layout.plot_h) as f64;
    let (bx, by) = match plot.config.legend_position {
        LegendPosition::UpperLeft => (layout.margin_left as f64 + 8.0, layout.margin_top as f64 + 8.0),
        LegendPosition::LowerLeft => (layout.margin_left as f64 + 8.0, bottom - box_h - 8.0),
        LegendPosition::LowerRight => (right - box_w - 8.0, bottom - box_h - 8.0),
        LegendPosition::Auto | LegendPosition::UpperRight => {
            (right - box_w - 8.0, layout.margin_top as f64 + 8.0)
        }
    };

    let _ = writeln!(
        svg,
        "<rect x='{bx:.1}' y='{by:.1}' width='{box_w:.1}' height='{box_h:.1}' \
         fill='white' fill-opacity='0.85' stroke='#50505A' stroke-width='1'/>"
    );
    for (i, series) in plot.series.iter().enumerate() {
        let row_y = by + pad + i as f64 * row_h + font * 0.5;
        let color = rgb(series.color());
        let _ = writeln!(
            svg,
            "<line x1='{:.1}' y1='{row_y:.1}' x2='{:.1}' y2='{row_y:.1}' \
             stroke='{color}' stroke-width='2'/>",
            bx + pad,
            bx + pad + sample_w,
        );
        let _ = writeln!(
            svg,
            "<text x='{:.1}' y='{:.1}' font-family='sans-serif' font-size='{font:.1}' \
             fill='#282830'>{}</text>",
            bx + pad * 2.0 + sample_w,
            row_y + font * 0.35,
            escape(&series.label),
        );
    }
}

/// Escape the XML-reserved characters in label text.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
