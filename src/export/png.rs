/// Raster figure export — software rendering into an `image::RgbImage`.
///
/// Lines are Bresenham-drawn, text uses an embedded 3×5 bitmap font scaled
/// from the configured font sizes and DPI. Reference peak labels are drawn
/// rotated; overlapping labels overlap.

use std::path::Path;

use image::{Rgb, RgbImage};

use crate::config::{LegendPosition, TickDirection};
use crate::pipeline::compose::ComposedPlot;
use super::{font_scale, tick_label, ExportError, ExportSettings, Layout};

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const FRAME: Rgb<u8> = Rgb([80, 80, 90]);
const GRID: Rgb<u8> = Rgb([210, 210, 218]);
const TEXT: Rgb<u8> = Rgb([40, 40, 48]);

pub(crate) fn render_png(
    plot: &ComposedPlot,
    settings: &ExportSettings,
    path: &Path,
) -> Result<(), ExportError> {
    let width = settings.pixel_width();
    let height = settings.pixel_height();
    let layout = Layout::new(plot, width, height);
    let config = &plot.config;

    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);

    let tick_scale = font_scale(config.tick_label_font_size, settings.dpi);
    let axis_scale = font_scale(config.axis_label_font_size, settings.dpi);
    let legend_scale = font_scale(config.legend_font_size, settings.dpi);
    let ref_scale = font_scale(config.reference_label_font_size, settings.dpi);
    let stroke = ((config.line_width * settings.dpi as f32 / 150.0).round() as u32).max(1);

    draw_grid_and_ticks(&mut img, &layout, plot, tick_scale);
    draw_frame(&mut img, &layout);
    draw_series(&mut img, &layout, plot, stroke);
    draw_peak_annotations(&mut img, &layout, plot, legend_scale);
    draw_axis_labels(&mut img, &layout, config, axis_scale);
    if config.show_legend && !config.stacked && !plot.series.is_empty() {
        draw_legend(&mut img, &layout, plot, legend_scale);
    }
    // Reference peaks last, above the data traces.
    draw_reference_peaks(&mut img, &layout, plot, ref_scale);

    img.save(path)?;
    Ok(())
}

// =========================================================================
//  Frame, Grid, Ticks
// =========================================================================

fn draw_frame(img: &mut RgbImage, layout: &Layout) {
    let (w, h) = (layout.width, layout.height);
    for x in layout.margin_left..=layout.margin_left + layout.plot_w {
        if x < w {
            img.put_pixel(x, layout.margin_top, FRAME);
            img.put_pixel(x, layout.margin_top + layout.plot_h, FRAME);
        }
    }
    for y in layout.margin_top..=layout.margin_top + layout.plot_h {
        if y < h {
            img.put_pixel(layout.margin_left, y, FRAME);
            img.put_pixel(layout.margin_left + layout.plot_w, y, FRAME);
        }
    }
}

fn draw_grid_and_ticks(
    img: &mut RgbImage,
    layout: &Layout,
    plot: &ComposedPlot,
    tick_scale: u32,
) {
    let config = &plot.config;
    let major_step = config.x_major_tick_spacing;
    let axis_y = layout.margin_top + layout.plot_h;
    let tick_len = (3 * tick_scale).max(4);
    let minor_len = tick_len / 2;

    // Grid lines apply to the x axis only.
    if config.show_grid {
        for tick in layout.x_ticks(major_step) {
            let gx = layout.x_px(tick).round() as i32;
            draw_dashed_segment(
                img,
                gx,
                layout.margin_top as i32 + 1,
                axis_y as i32 - 1,
                GRID,
                &[(3, 3)],
            );
        }
    }

    // Minor ticks first so major marks draw over them.
    if let Some(minor_step) = config.x_minor_tick_spacing {
        for tick in layout.x_ticks(minor_step) {
            let gx = layout.x_px(tick).round() as u32;
            draw_tick_mark(img, layout, gx, axis_y, minor_len, config.tick_direction);
        }
    }

    for tick in layout.x_ticks(major_step) {
        let gx = layout.x_px(tick).round() as u32;
        draw_tick_mark(img, layout, gx, axis_y, tick_len, config.tick_direction);

        let label = tick_label(tick, major_step);
        let label_w = label.len() as u32 * 4 * tick_scale;
        let label_y = axis_y
            + match config.tick_direction {
                TickDirection::In => 4,
                TickDirection::Out => tick_len + 3,
            };
        draw_text(
            img,
            &label,
            gx.saturating_sub(label_w / 2),
            label_y,
            TEXT,
            tick_scale,
        );
    }
}

fn draw_tick_mark(
    img: &mut RgbImage,
    layout: &Layout,
    x: u32,
    axis_y: u32,
    len: u32,
    direction: TickDirection,
) {
    if x >= layout.width {
        return;
    }
    for d in 0..len {
        let y = match direction {
            TickDirection::In => axis_y.saturating_sub(d + 1),
            TickDirection::Out => axis_y + d,
        };
        if y < layout.height {
            img.put_pixel(x, y, FRAME);
        }
        // Inward ticks also mark the top spine.
        if direction == TickDirection::In {
            let ty = layout.margin_top + d + 1;
            if ty < layout.height {
                img.put_pixel(x, ty, FRAME);
            }
        }
    }
}

// =========================================================================
//  Data Traces
// =========================================================================

fn draw_series(img: &mut RgbImage, layout: &Layout, plot: &ComposedPlot, stroke: u32) {
    for series in &plot.series {
        let color = Rgb(series.color());
        for segment in series.segments() {
            let mut prev: Option<(i32, i32)> = None;
            for point in segment {
                if !layout.contains_x(point[0]) {
                    prev = None;
                    continue;
                }
                let px = layout.x_px(point[0]).round() as i32;
                let py = layout.y_px(point[1]).round() as i32;
                if let Some((x0, y0)) = prev {
                    draw_thick_line(img, x0, y0, px, py, color, stroke);
                }
                prev = Some((px, py));
            }
        }
    }
}

fn draw_peak_annotations(
    img: &mut RgbImage,
    layout: &Layout,
    plot: &ComposedPlot,
    text_scale: u32,
) {
    let marker = (2 * text_scale).max(3) as i32;
    for series in &plot.series {
        let color = Rgb(series.color());
        for peak in &series.peaks {
            if !layout.contains_x(peak.angle) {
                continue;
            }
            let px = layout.x_px(peak.angle).round() as i32;
            let py = layout.y_px(peak.intensity).round() as i32;

            // Small downward triangle just above the peak.
            for dy in 0..=marker {
                for dx in -dy..=dy {
                    let mx = px + dx;
                    let my = py - 3 - (marker - dy);
                    if mx >= 0
                        && my >= 0
                        && (mx as u32) < layout.width
                        && (my as u32) < layout.height
                    {
                        img.put_pixel(mx as u32, my as u32, color);
                    }
                }
            }

            let label = peak.label();
            let label_w = label.chars().count() as i32 * 4 * text_scale as i32;
            let label_y = py - 4 - marker - 2 - 5 * text_scale as i32;
            draw_text(
                img,
                &label,
                (px - label_w / 2).max(0) as u32,
                label_y.max(0) as u32,
                TEXT,
                text_scale,
            );
        }
    }
}

// =========================================================================
//  Decorations
// =========================================================================

fn draw_axis_labels(
    img: &mut RgbImage,
    layout: &Layout,
    config: &crate::config::PlotConfiguration,
    axis_scale: u32,
) {
    // X label centered under the tick labels.
    let label_w = config.x_label.chars().count() as u32 * 4 * axis_scale;
    let x = (layout.margin_left + layout.plot_w / 2).saturating_sub(label_w / 2);
    let y = layout.height.saturating_sub(5 * axis_scale + 4);
    draw_text(img, &config.x_label, x, y, TEXT, axis_scale);

    // Y label rotated along the left margin, centered vertically.
    let label_h = config.y_label.chars().count() as u32 * 4 * axis_scale;
    let yx = 4;
    let yy = (layout.margin_top + layout.plot_h / 2).saturating_sub(label_h / 2);
    draw_vertical_text(img, &config.y_label, yx, yy, TEXT, axis_scale);
}

fn draw_legend(img: &mut RgbImage, layout: &Layout, plot: &ComposedPlot, text_scale: u32) {
    let pad = (2 * text_scale).max(4);
    let row_h = 5 * text_scale + pad;
    let sample_w = 12 * text_scale;
    let longest = plot
        .series
        .iter()
        .map(|s| s.label.chars().count())
        .max()
        .unwrap_or(0) as u32;
    let box_w = sample_w + pad + longest * 4 * text_scale + 2 * pad;
    let box_h = plot.series.len() as u32 * row_h + pad;

    let (bx, by) = match plot.config.legend_position {
        LegendPosition::UpperLeft => (layout.margin_left + 8, layout.margin_top + 8),
        LegendPosition::LowerLeft => (
            layout.margin_left + 8,
            (layout.margin_top + layout.plot_h).saturating_sub(box_h + 8),
        ),
        LegendPosition::LowerRight => (
            (layout.margin_left + layout.plot_w).saturating_sub(box_w + 8),
            (layout.margin_top + layout.plot_h).saturating_sub(box_h + 8),
        ),
        // Automatic placement pins to the upper right, where XRD traces
        // (decaying with angle) usually leave room.
        LegendPosition::Auto | LegendPosition::UpperRight => (
            (layout.margin_left + layout.plot_w).saturating_sub(box_w + 8),
            layout.margin_top + 8,
        ),
    };

    // Opaque background so the legend stays readable over traces.
    for y in by..(by + box_h).min(layout.height) {
        for x in bx..(bx + box_w).min(layout.width) {
            img.put_pixel(x, y, BACKGROUND);
        }
    }
    for x in bx..(bx + box_w).min(layout.width) {
        img.put_pixel(x, by, FRAME);
        if by + box_h < layout.height {
            img.put_pixel(x, by + box_h, FRAME);
        }
    }
    for y in by..(by + box_h).min(layout.height) {
        img.put_pixel(bx, y, FRAME);
        if bx + box_w < layout.width {
            img.put_pixel(bx + box_w, y, FRAME);
        }
    }

    for (i, series) in plot.series.iter().enumerate() {
        let row_y = by + pad + i as u32 * row_h;
        let mid = row_y + (5 * text_scale) / 2;
        let color = Rgb(series.color());
        for x in bx + pad..(bx + pad + sample_w).min(layout.width) {
            if mid < layout.height {
                img.put_pixel(x, mid, color);
            }
        }
        draw_text(
            img,
            &series.label,
            bx + pad + sample_w + pad,
            row_y,
            TEXT,
            text_scale,
        );
    }
}

fn draw_reference_peaks(
    img: &mut RgbImage,
    layout: &Layout,
    plot: &ComposedPlot,
    text_scale: u32,
) {
    let offset = plot.config.reference_label_offset;
    for peak in plot.drawable_reference_peaks() {
        if !layout.contains_x(peak.angle) {
            continue;
        }
        let color = Rgb(peak.color);
        let px = layout.x_px(peak.angle).round() as i32;
        draw_dashed_segment(
            img,
            px,
            layout.margin_top as i32 + 1,
            (layout.margin_top + layout.plot_h) as i32 - 1,
            color,
            peak.style.dash_pattern(),
        );

        let lx = layout.x_px(peak.angle + offset).round().max(0.0) as u32;
        let ly = layout.margin_top + 3 * text_scale;
        draw_vertical_text(img, &peak.name, lx, ly, color, text_scale);
    }
}

// =========================================================================
//  Raster Primitives
// =========================================================================

/// Bresenham line clipped to the image bounds.
fn draw_line(img: &mut RgbImage, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb<u8>) {
    let (w, h) = (img.width() as i32, img.height() as i32);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx: i32 = if x0 < x1 { 1 } else { -1 };
    let sy: i32 = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let mut cx = x0;
    let mut cy = y0;
    loop {
        if cx >= 0 && cx < w && cy >= 0 && cy < h {
            img.put_pixel(cx as u32, cy as u32, color);
        }
        if cx == x1 && cy == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            cx += sx;
        }
        if e2 <= dx {
            err += dx;
            cy += sy;
        }
    }
}

/// Line with a pixel stroke width, thickened perpendicular-ish by
/// offsetting along the minor axis.
fn draw_thick_line(
    img: &mut RgbImage,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    color: Rgb<u8>,
    stroke: u32,
) {
    let steep = (y1 - y0).abs() > (x1 - x0).abs();
    let half = stroke as i32 / 2;
    for t in -half..=(stroke as i32 - 1 - half) {
        if steep {
            draw_line(img, x0 + t, y0, x1 + t, y1, color);
        } else {
            draw_line(img, x0, y0 + t, x1, y1 + t, color);
        }
    }
}

/// Vertical dashed segment following an on/off run-length pattern.
fn draw_dashed_segment(
    img: &mut RgbImage,
    x0: i32,
    y0: i32,
    y1: i32,
    color: Rgb<u8>,
    pattern: &[(u32, u32)],
) {
    let cycle: u32 = pattern.iter().map(|(on, off)| on + off).sum::<u32>().max(1);
    let (w, h) = (img.width() as i32, img.height() as i32);
    if x0 < 0 || x0 >= w {
        return;
    }
    for y in y0.max(0)..=y1.min(h - 1) {
        let mut phase = (y - y0) as u32 % cycle;
        let mut on = false;
        for &(run_on, run_off) in pattern {
            if phase < run_on {
                on = true;
                break;
            }
            phase -= run_on;
            if phase < run_off {
                break;
            }
            phase -= run_off;
        }
        if on {
            img.put_pixel(x0 as u32, y as u32, color);
        }
    }
}

/// Minimal 3×5 bitmap glyph set: digits, basic Latin, and the handful of
/// symbols the default axis labels use. Unknown characters fall back to a
/// small dot.
fn glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        '-' | '—' | '–' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        '°' => [0b010, 0b101, 0b010, 0b000, 0b000],
        'θ' => [0b010, 0b101, 0b111, 0b101, 0b010],
        'ω' => [0b000, 0b000, 0b101, 0b101, 0b111],
        'A' | 'a' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' | 'b' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' | 'c' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' | 'd' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' | 'e' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' | 'f' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' | 'g' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'H' | 'h' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' | 'i' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' | 'j' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'K' | 'k' => [0b101, 0b110, 0b100, 0b110, 0b101],
        'L' | 'l' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' | 'm' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' | 'n' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'O' | 'o' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' | 'p' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' | 'q' => [0b010, 0b101, 0b101, 0b110, 0b011],
        'R' | 'r' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' | 's' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' | 't' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' | 'u' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' | 'v' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' | 'w' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' | 'x' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' | 'y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' | 'z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        _ => [0b000, 0b000, 0b010, 0b000, 0b000],
    }
}

/// Draw text horizontally. Each glyph cell is 4×6 scaled pixels.
fn draw_text(img: &mut RgbImage, text: &str, x: u32, y: u32, color: Rgb<u8>, scale: u32) {
    let scale = scale.max(1);
    let mut cx = x;
    for ch in text.chars() {
        let g = glyph(ch);
        for (row, &bits) in g.iter().enumerate() {
            for col in 0..3u32 {
                if (bits >> (2 - col)) & 1 == 1 {
                    fill_cell(img, cx + col * scale, y + row as u32 * scale, scale, color);
                }
            }
        }
        cx += 4 * scale;
    }
}

/// Draw text rotated a quarter turn, running downward from the anchor.
fn draw_vertical_text(
    img: &mut RgbImage,
    text: &str,
    x: u32,
    y: u32,
    color: Rgb<u8>,
    scale: u32,
) {
    let scale = scale.max(1);
    let mut cy = y;
    for ch in text.chars() {
        let g = glyph(ch);
        for (row, &bits) in g.iter().enumerate() {
            for col in 0..3u32 {
                if (bits >> (2 - col)) & 1 == 1 {
                    // Rotate the cell clockwise: glyph rows run left→right,
                    // glyph columns run top→bottom.
                    let px = x + (4 - row as u32) * scale;
                    let py = cy + col * scale;
                    fill_cell(img, px, py, scale, color);
                }
            }
        }
        cy += 4 * scale;
    }
}

fn fill_cell(img: &mut RgbImage, x: u32, y: u32, scale: u32, color: Rgb<u8>) {
    for dy in 0..scale {
        for dx in 0..scale {
            let px = x + dx;
            let py = y + dy;
            if px < img.width() && py < img.height() {
                img.put_pixel(px, py, color);
            }
        }
    }
}
