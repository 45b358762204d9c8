/// Reference peak editor — a fixed grid of ten annotation rows.

use crate::data::reference::{LineStyle, ReferencePeak, MAX_REFERENCE_PEAKS};

/// Render the reference peak table. Returns true when any field changed.
pub fn show_reference_panel(ui: &mut egui::Ui, peaks: &mut Vec<ReferencePeak>) -> bool {
    let mut changed = false;

    // The editor always presents the full set of rows.
    if peaks.len() < MAX_REFERENCE_PEAKS {
        peaks.resize(MAX_REFERENCE_PEAKS, ReferencePeak::default());
    }

    ui.collapsing("📍 Reference Peaks", |ui| {
        egui::Grid::new("reference_peaks")
            .num_columns(6)
            .spacing([6.0, 3.0])
            .show(ui, |ui| {
                ui.label("");
                ui.label(egui::RichText::new("Show").size(11.0));
                ui.label(egui::RichText::new("Phase").size(11.0));
                ui.label(egui::RichText::new("2θ (°)").size(11.0));
                ui.label(egui::RichText::new("Color").size(11.0));
                ui.label(egui::RichText::new("Style").size(11.0));
                ui.end_row();

                for (i, peak) in peaks.iter_mut().enumerate() {
                    ui.label(
                        egui::RichText::new(format!("#{}", i + 1))
                            .size(11.0)
                            .color(egui::Color32::from_rgb(0x88, 0x8C, 0x94)),
                    );
                    changed |= ui.checkbox(&mut peak.visible, "").changed();
                    changed |= ui
                        .add(egui::TextEdit::singleline(&mut peak.name).desired_width(90.0))
                        .changed();
                    changed |= ui
                        .add(
                            egui::DragValue::new(&mut peak.angle)
                                .speed(0.05)
                                .fixed_decimals(3),
                        )
                        .changed();
                    changed |= ui.color_edit_button_srgb(&mut peak.color).changed();
                    egui::ComboBox::from_id_salt(("ref_peak_style", i))
                        .selected_text(peak.style.label())
                        .width(80.0)
                        .show_ui(ui, |ui| {
                            for style in LineStyle::ALL {
                                changed |= ui
                                    .selectable_value(&mut peak.style, style, style.label())
                                    .changed();
                            }
                        });
                    ui.end_row();
                }
            });
    });

    changed
}
