#![allow(dead_code)]

mod app;
mod config;
mod data;
mod export;
mod gui;
mod pipeline;

use app::XrdApp;

fn main() -> eframe::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    ::log::info!("Starting XRD Data Plotter v{}", env!("CARGO_PKG_VERSION"));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([900.0, 560.0])
            .with_title("XRD Data Plotter")
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "XRD Data Plotter",
        options,
        Box::new(|cc| Ok(Box::new(XrdApp::new(cc)))),
    )
}
